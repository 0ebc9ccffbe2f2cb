//! ORDNANCE server application.
//!
//! Runs the simulation engine on its own thread and connects clients to it
//! over ordered channels. A scripted demo client exercises the full
//! register, detonate and refund round trip.

pub mod demo;
pub mod game_loop;
pub mod state;

pub use ordnance_core as core;
