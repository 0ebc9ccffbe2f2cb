//! Core types and definitions for the ORDNANCE detonation engine.
//!
//! This crate defines the vocabulary shared across all other crates:
//! capability components, wire messages, dispatch events, configuration
//! and constants. It has no simulation logic of its own.

pub mod commands;
pub mod components;
pub mod config;
pub mod constants;
pub mod enums;
pub mod events;
pub mod types;
