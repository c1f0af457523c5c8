use libp2p::PeerId;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Instant;

/// State machine driving one peer's set-reconciliation session
/// (component G).
///
/// `None` is the absence of a session entry at all; once a `PeerEntry`
/// exists it starts `Idle` and only moves forward (a finished exchange
/// returns it to `Idle`, ready to be scheduled again).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Scheduled,
    Exchanging,
}

/// Whether the local node or the remote peer opens the reconciliation
/// exchange. Decided once per session by comparing the hash of each side's
/// identity — deterministic, so both peers agree on who initiates without
/// needing an extra round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRole {
    Initiator,
    Receiver,
}

pub struct PeerEntry {
    pub peer_id: PeerId,
    pub state: SessionState,
    pub role: SessionRole,
    /// When a `Scheduled` session should move to `Exchanging` — the fixed
    /// stagger delay gives the other side's message time to arrive before
    /// both peers race to open the same exchange twice.
    pub scheduled_at: Option<Instant>,
}

fn hash_peer_id(peer_id: &PeerId) -> u64 {
    let mut hasher = DefaultHasher::new();
    peer_id.hash(&mut hasher);
    hasher.finish()
}

impl PeerEntry {
    pub fn new(local_peer_id: PeerId, remote_peer_id: PeerId) -> Self {
        let role = if hash_peer_id(&local_peer_id) > hash_peer_id(&remote_peer_id) {
            SessionRole::Initiator
        } else {
            SessionRole::Receiver
        };
        Self {
            peer_id: remote_peer_id,
            state: SessionState::Idle,
            role,
            scheduled_at: None,
        }
    }

    /// Move `Idle -> Scheduled`, arming the stagger delay.
    pub fn schedule(&mut self, now: Instant, stagger: std::time::Duration) {
        if self.state == SessionState::Idle {
            self.state = SessionState::Scheduled;
            self.scheduled_at = Some(now + stagger);
        }
    }

    /// True once the stagger delay has elapsed and the caller should move
    /// this session to `Exchanging`.
    pub fn is_due(&self, now: Instant) -> bool {
        matches!(self.state, SessionState::Scheduled)
            && self.scheduled_at.map(|at| now >= at).unwrap_or(false)
    }

    pub fn begin_exchange(&mut self) {
        self.state = SessionState::Exchanging;
    }

    pub fn finish_exchange(&mut self) {
        self.state = SessionState::Idle;
        self.scheduled_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn random_peer_id() -> PeerId {
        PeerId::from(libp2p::identity::Keypair::generate_ed25519().public())
    }

    #[test]
    fn tie_break_is_consistent_both_directions() {
        let a = random_peer_id();
        let b = random_peer_id();

        let entry_ab = PeerEntry::new(a, b);
        let entry_ba = PeerEntry::new(b, a);

        // Exactly one side sees itself as initiator.
        assert_ne!(entry_ab.role, entry_ba.role);
    }

    #[test]
    fn state_machine_progresses_in_order() {
        let a = random_peer_id();
        let b = random_peer_id();
        let mut entry = PeerEntry::new(a, b);
        assert_eq!(entry.state, SessionState::Idle);

        let now = Instant::now();
        entry.schedule(now, Duration::from_millis(10));
        assert_eq!(entry.state, SessionState::Scheduled);
        assert!(!entry.is_due(now));
        assert!(entry.is_due(now + Duration::from_millis(20)));

        entry.begin_exchange();
        assert_eq!(entry.state, SessionState::Exchanging);

        entry.finish_exchange();
        assert_eq!(entry.state, SessionState::Idle);
    }
}
