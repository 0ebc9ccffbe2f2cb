//! Messages sent from a client to the authoritative simulation.
//!
//! Commands are queued and processed at the next tick boundary. The caller
//! never receives a return value; outcomes arrive later as server messages.

use serde::{Deserialize, Serialize};

use crate::types::ActorId;

/// All remote-callable actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Detonate every munition tracked for `actor`.
    RequestDetonate { actor: ActorId },
}
