//! Replication bridge between the authoritative engine and clients.
//!
//! Server side: [`ServerBridge`] turns tracker state changes and detonate
//! requests into [`ServerMessage`]s, and [`ServerEndpoint`] moves messages over
//! ordered `mpsc` channels. Client side: [`ClientSession`] keeps a read-only
//! [`ReadinessReplica`] and owns its actor's stock, applying refunds.

use std::collections::HashMap;
use std::sync::mpsc;

use hecs::World;
use tracing::{debug, info};

use ordnance_core::commands::ClientMessage;
use ordnance_core::components::Loadout;
use ordnance_core::enums::{SkillSlot, SoundCue};
use ordnance_core::events::{ServerMessage, SoundRequest};
use ordnance_core::types::{ActorId, Position};

use crate::detonation::DetonationEngine;
use crate::dispatch::{DispatchBuffer, Dispatcher};
use crate::error::{Result, SimError};
use crate::stock::StockAccess;
use crate::tracker::Tracker;

/// Authoritative half of the bridge. Accumulates the tick's outbound messages.
#[derive(Debug)]
pub struct ServerBridge {
    outbox: Vec<ServerMessage>,
    refund_slot: SkillSlot,
}

impl ServerBridge {
    pub fn new(refund_slot: SkillSlot) -> Self {
        Self {
            outbox: Vec::new(),
            refund_slot,
        }
    }

    /// Push the tracker's readiness if it changed since the last push.
    pub fn publish_readiness(&mut self, tracker: &mut Tracker) {
        if let Some(ready) = tracker.take_readiness_change() {
            debug!(actor = %tracker.actor(), ready, "readiness changed");
            self.outbox.push(ServerMessage::ReadinessChanged {
                actor: tracker.actor(),
                ready,
            });
        }
    }

    /// Run a remote detonate request to completion.
    ///
    /// Feedback sound keyed on the outcome goes out either way; a stock refund
    /// goes out only when nothing detonated.
    pub fn serve_detonate(
        &mut self,
        world: &mut World,
        tracker: &mut Tracker,
        detonator: &DetonationEngine,
        dispatch: &mut DispatchBuffer,
        actor_position: Position,
    ) -> bool {
        let actor = tracker.actor();
        let success = tracker.detonate_all(world, detonator, dispatch);

        let cue = if success {
            SoundCue::DetonateSuccess
        } else {
            SoundCue::DetonateFail
        };
        dispatch.play_sound(SoundRequest {
            cue,
            position: actor_position,
        });
        self.forward_feedback(dispatch);

        if !success {
            info!(%actor, slot = ?self.refund_slot, "nothing to detonate, refunding stock");
            self.outbox.push(ServerMessage::StockRefund {
                actor,
                slot: self.refund_slot,
            });
        }
        self.publish_readiness(tracker);
        success
    }

    /// The actor is gone; clear any readiness clients still hold for it.
    pub fn retire_actor(&mut self, actor: ActorId, last_published: bool) {
        if last_published {
            self.outbox.push(ServerMessage::ReadinessChanged { actor, ready: false });
        }
    }

    /// Move buffered effects and sounds into the outbox for observers.
    /// Blasts and submunition requests stay in the buffer.
    pub fn forward_feedback(&mut self, dispatch: &mut DispatchBuffer) {
        self.outbox
            .extend(dispatch.effects.drain(..).map(ServerMessage::Effect));
        self.outbox
            .extend(dispatch.sounds.drain(..).map(ServerMessage::Sound));
    }

    pub fn take_outbox(&mut self) -> Vec<ServerMessage> {
        std::mem::take(&mut self.outbox)
    }
}

/// Read-only cached copy of every actor's readiness, updated only by pushes.
#[derive(Debug, Clone, Default)]
pub struct ReadinessReplica {
    flags: HashMap<ActorId, bool>,
}

impl ReadinessReplica {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, message: &ServerMessage) {
        if let ServerMessage::ReadinessChanged { actor, ready } = message {
            self.flags.insert(*actor, *ready);
        }
    }

    /// Unknown actors read as not ready.
    pub fn is_ready(&self, actor: ActorId) -> bool {
        self.flags.get(&actor).copied().unwrap_or(false)
    }
}

/// Client half of the bridge for one controlled actor.
#[derive(Debug)]
pub struct ClientSession {
    actor: ActorId,
    loadout: Loadout,
    replica: ReadinessReplica,
    feedback: Vec<SoundRequest>,
    to_server: mpsc::Sender<ClientMessage>,
    from_server: mpsc::Receiver<ServerMessage>,
}

impl ClientSession {
    pub fn actor(&self) -> ActorId {
        self.actor
    }

    pub fn loadout(&self) -> &Loadout {
        &self.loadout
    }

    /// Stock is client-owned; the skill state machine spends it through here.
    pub fn loadout_mut(&mut self) -> &mut Loadout {
        &mut self.loadout
    }

    pub fn is_ready(&self, actor: ActorId) -> bool {
        self.replica.is_ready(actor)
    }

    /// Fire-and-forget detonate request for this session's actor.
    pub fn request_detonate(&self) -> Result<()> {
        self.to_server
            .send(ClientMessage::RequestDetonate { actor: self.actor })
            .map_err(|_| SimError::Disconnected)
    }

    /// Drain and apply everything the server has sent so far.
    /// Returns the number of messages applied.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(message) = self.from_server.try_recv() {
            self.apply(&message);
            applied += 1;
        }
        applied
    }

    pub fn apply(&mut self, message: &ServerMessage) {
        self.replica.apply(message);
        match message {
            ServerMessage::StockRefund { actor, slot } if *actor == self.actor => {
                if self.loadout.add_one_stock(*slot) {
                    debug!(%actor, ?slot, "stock refunded");
                }
            }
            ServerMessage::Sound(sound) => self.feedback.push(*sound),
            _ => {}
        }
    }

    /// Feedback sounds received since the last call.
    pub fn take_feedback(&mut self) -> Vec<SoundRequest> {
        std::mem::take(&mut self.feedback)
    }
}

/// Server end of the message substrate: one shared inbound queue, one
/// outbound channel per connected client.
#[derive(Debug)]
pub struct ServerEndpoint {
    inbound_tx: mpsc::Sender<ClientMessage>,
    inbound_rx: mpsc::Receiver<ClientMessage>,
    clients: Vec<(ActorId, mpsc::Sender<ServerMessage>)>,
}

impl Default for ServerEndpoint {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerEndpoint {
    pub fn new() -> Self {
        let (inbound_tx, inbound_rx) = mpsc::channel();
        Self {
            inbound_tx,
            inbound_rx,
            clients: Vec::new(),
        }
    }

    /// Open a session for the client controlling `actor`.
    ///
    /// `readiness` is the current state of every actor. Ready actors are queued
    /// to the new session ahead of any later broadcast, since readiness is
    /// otherwise only sent on change.
    pub fn connect(
        &mut self,
        actor: ActorId,
        loadout: Loadout,
        readiness: &[(ActorId, bool)],
    ) -> Result<ClientSession> {
        if self.clients.iter().any(|(a, _)| *a == actor) {
            return Err(SimError::DuplicateSession(actor));
        }
        let (to_client, from_server) = mpsc::channel();
        for &(other, ready) in readiness.iter().filter(|(_, ready)| *ready) {
            let _ = to_client.send(ServerMessage::ReadinessChanged { actor: other, ready });
        }
        self.clients.push((actor, to_client));
        Ok(ClientSession {
            actor,
            loadout,
            replica: ReadinessReplica::new(),
            feedback: Vec::new(),
            to_server: self.inbound_tx.clone(),
            from_server,
        })
    }

    /// Drain every request received so far, in arrival order.
    pub fn drain_requests(&self) -> Vec<ClientMessage> {
        self.inbound_rx.try_iter().collect()
    }

    /// Send messages to every client. Clients whose session was dropped are
    /// disconnected.
    pub fn broadcast(&mut self, messages: &[ServerMessage]) {
        if messages.is_empty() {
            return;
        }
        self.clients.retain(|(actor, tx)| {
            let alive = messages.iter().all(|m| tx.send(m.clone()).is_ok());
            if !alive {
                info!(%actor, "client disconnected");
            }
            alive
        });
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }
}
