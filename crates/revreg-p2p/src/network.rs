use libp2p::request_response::{self, cbor, ProtocolSupport, ResponseChannel};
use libp2p::swarm::NetworkBehaviour;
use libp2p::swarm::SwarmEvent;
use libp2p::{identify, noise, ping, tcp, yamux, Multiaddr, PeerId, StreamProtocol, Swarm};
use tracing::{debug, info};

use crate::config::P2pConfig;
use crate::message::{P2pRequest, P2pResponse};

/// Combined libp2p behaviour: `identify`/`ping` for peer liveness and
/// discovery, `request_response` for the application's flood-push and
/// set-reconciliation traffic. No gossipsub/kademlia — flood fan-out and
/// set reconciliation are driven explicitly by component G/H, not by a
/// topic-broadcast primitive.
#[derive(NetworkBehaviour)]
pub struct RevRegBehaviour {
    pub identify: identify::Behaviour,
    pub ping: ping::Behaviour,
    pub reqres: cbor::Behaviour<P2pRequest, P2pResponse>,
}

/// Events surfaced by `P2pNetwork::next_event`, for the caller to fold into
/// its own `tokio::select!` loop — there is no separately spawned task here,
/// so the Swarm's mutable state stays owned by exactly one place.
pub enum P2pNetworkEvent {
    Listening(Multiaddr),
    PeerConnected(PeerId),
    PeerDisconnected(PeerId),
    IncomingRequest {
        peer: PeerId,
        request: P2pRequest,
        channel: ResponseChannel<P2pResponse>,
    },
    Response {
        peer: PeerId,
        response: P2pResponse,
    },
}

pub struct P2pNetwork {
    swarm: Swarm<RevRegBehaviour>,
}

impl P2pNetwork {
    pub fn new(config: &P2pConfig) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let mut swarm = libp2p::SwarmBuilder::with_new_identity()
            .with_tokio()
            .with_tcp(
                tcp::Config::default(),
                noise::Config::new,
                yamux::Config::default,
            )?
            .with_behaviour(|key: &libp2p::identity::Keypair| {
                let identify = identify::Behaviour::new(identify::Config::new(
                    config.protocol_version.clone(),
                    key.public(),
                ));
                let ping = ping::Behaviour::default();
                let reqres = cbor::Behaviour::new(
                    [(
                        StreamProtocol::new("/revreg/reqres/1.0.0"),
                        ProtocolSupport::Full,
                    )],
                    request_response::Config::default(),
                );
                Ok(RevRegBehaviour { identify, ping, reqres })
            })?
            .build();

        let listen_addr: Multiaddr = config.listen_addr.parse()?;
        swarm.listen_on(listen_addr)?;

        for addr_str in &config.bootstrap_peers {
            if let Ok(addr) = addr_str.parse::<Multiaddr>() {
                if let Err(e) = swarm.dial(addr.clone()) {
                    debug!(addr = %addr, error = %e, "failed to dial bootstrap peer");
                }
            }
        }

        Ok(Self { swarm })
    }

    pub fn local_peer_id(&self) -> PeerId {
        *self.swarm.local_peer_id()
    }

    /// Push a request to `peer`. Used both for flood pushes (component H)
    /// and for opening/continuing a set-reconciliation exchange
    /// (component G).
    pub fn send_request(&mut self, peer: &PeerId, request: P2pRequest) {
        self.swarm.behaviour_mut().reqres.send_request(peer, request);
    }

    pub fn respond(&mut self, channel: ResponseChannel<P2pResponse>, response: P2pResponse) {
        let _ = self
            .swarm
            .behaviour_mut()
            .reqres
            .send_response(channel, response);
    }

    /// Drive the swarm until the next event worth surfacing to the caller's
    /// own event loop.
    pub async fn next_event(&mut self) -> P2pNetworkEvent {
        use futures::StreamExt;
        loop {
            match self.swarm.select_next_some().await {
                SwarmEvent::NewListenAddr { address, .. } => {
                    info!(addr = %address, "p2p listening on");
                    return P2pNetworkEvent::Listening(address);
                }
                SwarmEvent::ConnectionEstablished { peer_id, .. } => {
                    return P2pNetworkEvent::PeerConnected(peer_id);
                }
                SwarmEvent::ConnectionClosed { peer_id, .. } => {
                    return P2pNetworkEvent::PeerDisconnected(peer_id);
                }
                SwarmEvent::Behaviour(RevRegBehaviourEvent::Reqres(
                    request_response::Event::Message { peer, message },
                )) => match message {
                    request_response::Message::Request {
                        request, channel, ..
                    } => {
                        return P2pNetworkEvent::IncomingRequest {
                            peer,
                            request,
                            channel,
                        }
                    }
                    request_response::Message::Response { response, .. } => {
                        return P2pNetworkEvent::Response { peer, response }
                    }
                },
                SwarmEvent::Behaviour(RevRegBehaviourEvent::Identify(
                    identify::Event::Received { peer_id, .. },
                )) => {
                    debug!(peer = %peer_id, "received identify info");
                }
                _ => {}
            }
        }
    }
}
