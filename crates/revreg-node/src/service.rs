use crate::config::RevRegConfig;
use libp2p::PeerId;
use revreg_block::{now_micros, BlockGroup, BlockPlugin, EvalResult, RevocationBlockPlugin};
use revreg_core::constants::RECONCILIATION_STAGGER_MILLIS;
use revreg_core::error::RevRegError;
use revreg_core::record::RevocationRecord;
use revreg_core::types::KeyHash;
use revreg_p2p::{
    flood, reconcile::application_id, LocalSetReconciler, P2pConfig, P2pNetwork, P2pNetworkEvent, P2pRequest,
    P2pResponse, PeerEntry, RecordOrigin, SetReconciler,
};
use revreg_rpc::RpcCommand;
use revreg_store::{apply, RevocationIndex, RevocationLog};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Owns every piece of mutable state the registry core touches: the durable
/// log, the in-memory index, the peer table, and the P2P network — all
/// mutated only from within `run`'s event loop, never shared across tasks.
pub struct Service {
    config: RevRegConfig,
    log: RevocationLog,
    index: RevocationIndex,
    network: P2pNetwork,
    peers: HashMap<PeerId, PeerEntry>,
    block_plugin: RevocationBlockPlugin,
    peer_groups: HashMap<PeerId, BlockGroup>,
    reconciler: LocalSetReconciler,
    rpc_addr: String,
    rpc_commands: mpsc::Receiver<RpcCommand>,
    rpc_sender: mpsc::Sender<RpcCommand>,
}

impl Service {
    /// Ordered start-up: open (or create) the log, replay it into the index
    /// and the reconciliation set, stand up the P2P network, and prepare the
    /// client command channel. The RPC listener itself is started in `run`.
    pub fn start(config: RevRegConfig, p2p_config: P2pConfig, rpc_addr: String) -> Result<Self, RevRegError> {
        let mut index = RevocationIndex::new();
        let mut reconciler = LocalSetReconciler::new();

        let log = RevocationLog::open(&config.database_path)?;
        for record in RevocationLog::replay(&config.database_path)? {
            let key_hash = record.key_hash();
            reconciler.insert(key_hash);
            index.insert_from_replay(record);
        }
        info!(entries = index.len(), "replayed revocation log");

        let network =
            P2pNetwork::new(&p2p_config).map_err(|e| RevRegError::Other(format!("building p2p network: {e}")))?;
        info!(peer_id = %network.local_peer_id(), "p2p identity");

        let block_plugin = RevocationBlockPlugin {
            difficulty: config.workbits,
            epoch_duration_secs: config.epoch_duration_secs,
        };

        let (rpc_sender, rpc_commands) = mpsc::channel(256);

        Ok(Self {
            config,
            log,
            index,
            network,
            peers: HashMap::new(),
            block_plugin,
            peer_groups: HashMap::new(),
            reconciler,
            rpc_addr,
            rpc_commands,
            rpc_sender,
        })
    }

    /// Run the single-threaded cooperative event loop until ctrl-C.
    pub async fn run(mut self) -> Result<(), RevRegError> {
        let rpc_addr = self.rpc_addr.clone();
        let rpc_sender = self.rpc_sender.clone();
        let rpc_task = tokio::spawn(async move { revreg_rpc::serve(&rpc_addr, rpc_sender).await });
        let mut reconcile_tick = tokio::time::interval(Duration::from_millis(200));

        info!("service ready");
        loop {
            tokio::select! {
                event = self.network.next_event() => {
                    self.handle_p2p_event(event);
                }
                Some(command) = self.rpc_commands.recv() => {
                    self.handle_rpc_command(command);
                }
                _ = reconcile_tick.tick() => {
                    self.drive_due_sessions();
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("shutdown requested");
                    break;
                }
            }
        }

        rpc_task.abort();
        self.log.flush()?;
        info!("service stopped");
        Ok(())
    }

    pub fn local_peer_id(&self) -> PeerId {
        self.network.local_peer_id()
    }

    fn handle_p2p_event(&mut self, event: P2pNetworkEvent) {
        match event {
            P2pNetworkEvent::Listening(addr) => {
                info!(%addr, "p2p listening");
            }
            P2pNetworkEvent::PeerConnected(peer) => {
                info!(%peer, "peer connected");
                let local = self.local_peer_id();
                let mut entry = PeerEntry::new(local, peer);
                entry.schedule(Instant::now(), Duration::from_millis(RECONCILIATION_STAGGER_MILLIS));
                self.peers.insert(peer, entry);
                self.peer_groups.insert(peer, self.block_plugin.create_group());
            }
            P2pNetworkEvent::PeerDisconnected(peer) => {
                info!(%peer, "peer disconnected");
                self.peers.remove(&peer);
                self.peer_groups.remove(&peer);
            }
            P2pNetworkEvent::IncomingRequest { peer, request, channel } => match request {
                P2pRequest::Flood { record_bytes } => {
                    self.handle_incoming_flood(peer, &record_bytes);
                    self.network.respond(channel, P2pResponse::Ack);
                }
                P2pRequest::ReconcileOpen { app_id } => {
                    if app_id != application_id() {
                        warn!(%peer, "reconciliation application id mismatch");
                    }
                    if let Some(entry) = self.peers.get_mut(&peer) {
                        entry.begin_exchange();
                    }
                    self.network
                        .respond(channel, P2pResponse::ReconcileElements { elements: self.reconciler.local_elements() });
                }
                P2pRequest::ReconcileElements { elements } => {
                    self.push_missing_records(peer, &elements);
                    self.network.respond(channel, P2pResponse::ReconcileDone);
                    if let Some(entry) = self.peers.get_mut(&peer) {
                        entry.finish_exchange();
                    }
                }
            },
            P2pNetworkEvent::Response { peer, response } => match response {
                P2pResponse::Ack => {
                    debug!(%peer, "peer acked");
                }
                P2pResponse::ReconcileElements { elements } => {
                    self.push_missing_records(peer, &elements);
                    let local_elements = self.reconciler.local_elements();
                    self.network
                        .send_request(&peer, P2pRequest::ReconcileElements { elements: local_elements });
                    if let Some(entry) = self.peers.get_mut(&peer) {
                        entry.finish_exchange();
                    }
                }
                P2pResponse::ReconcileDone => {
                    debug!(%peer, "reconciliation closed");
                }
            },
        }
    }

    /// Send every record we hold that `offered` didn't mention, directly to
    /// `peer` — this is how a reconciliation round actually closes the gap,
    /// since `SetReconciler` only deals in `KeyHash`es, not record bytes.
    fn push_missing_records(&mut self, peer: PeerId, offered: &[KeyHash]) {
        let missing = self.reconciler.reconcile(offered);
        for key_hash in missing {
            if let Some(record) = self.index.get(&key_hash) {
                self.network.send_request(
                    &peer,
                    P2pRequest::Flood {
                        record_bytes: record.to_bytes().to_vec(),
                    },
                );
            }
        }
    }

    fn drive_due_sessions(&mut self) {
        use revreg_p2p::SessionRole;
        let now = Instant::now();
        let due: Vec<PeerId> = self
            .peers
            .iter()
            .filter(|(_, entry)| entry.is_due(now) && entry.role == SessionRole::Initiator)
            .map(|(peer, _)| *peer)
            .collect();

        for peer in due {
            if let Some(entry) = self.peers.get_mut(&peer) {
                entry.begin_exchange();
            }
            self.network
                .send_request(&peer, P2pRequest::ReconcileOpen { app_id: application_id() });
        }
    }

    fn handle_incoming_flood(&mut self, peer: PeerId, record_bytes: &[u8]) {
        let record = match RevocationRecord::from_bytes(record_bytes) {
            Ok(record) => record,
            Err(e) => {
                debug!(%peer, error = %e, "malformed flood record");
                return;
            }
        };

        let key = self.block_plugin.get_key(&record);
        if !self.peer_groups.contains_key(&peer) {
            let fresh = self.block_plugin.create_group();
            self.peer_groups.insert(peer, fresh);
        }
        let group = self.peer_groups.get_mut(&peer).expect("just inserted above");
        match self.block_plugin.evaluate(&key, &record, group) {
            EvalResult::Accept => {}
            EvalResult::Duplicate => return,
            EvalResult::KeyMismatch => {
                warn!(%peer, "flood record key mismatch (corrupt wire image)");
                return;
            }
            EvalResult::Invalid(e) => {
                debug!(%peer, error = %e, "rejected flood record");
                return;
            }
        }

        let _ = self.accept_record(record, RecordOrigin::Peer(peer));
    }

    /// Run the atomic validate→append→insert pipeline and, on success, flood
    /// to every peer per component H's origin-skip rule, and fold the new
    /// key into the reconciliation set.
    fn accept_record(&mut self, record: RevocationRecord, origin: RecordOrigin) -> Result<(), RevRegError> {
        let now = now_micros();
        let key_hash = record.key_hash();
        match apply(
            &mut self.log,
            &mut self.index,
            record.clone(),
            self.config.workbits,
            self.config.epoch_duration_secs,
            now,
        ) {
            Ok(()) => {
                self.reconciler.insert(key_hash);
                let peers: Vec<PeerId> = self.peers.keys().copied().collect();
                flood(&mut self.network, &peers, &record, origin);
                Ok(())
            }
            Err(RevRegError::Duplicate(hex)) => {
                debug!(key = %hex, "duplicate revocation, not re-flooding");
                Err(RevRegError::Duplicate(hex))
            }
            Err(e) => Err(e),
        }
    }

    fn handle_rpc_command(&mut self, command: RpcCommand) {
        match command {
            RpcCommand::Query { public_key, respond_to } => {
                let key_hash = revreg_crypto::hash::key_hash(&public_key);
                let revoked = self.index.contains(&key_hash);
                let _ = respond_to.send(revoked);
            }
            RpcCommand::Revoke { record, respond_to } => {
                let result = self.accept_record(record, RecordOrigin::Client);
                let _ = respond_to.send(result);
            }
        }
    }
}
