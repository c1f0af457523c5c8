use crate::message::P2pRequest;
use crate::network::P2pNetwork;
use libp2p::PeerId;
use revreg_core::record::RevocationRecord;

/// Where a just-accepted record came from. Determines whether the
/// originating peer is skipped during flood (component H) — a purely
/// bandwidth-saving optimization: a client-originated record was never seen
/// by any peer, so every peer must receive it; a peer-originated record is
/// skipped back to its source only because that peer already has it, not
/// because skipping is required for correctness.
pub enum RecordOrigin {
    Client,
    Peer(PeerId),
}

/// Push `record` to every known peer, skipping the originating peer only
/// when the record came from a peer in the first place.
pub fn flood(network: &mut P2pNetwork, peers: &[PeerId], record: &RevocationRecord, origin: RecordOrigin) {
    let record_bytes = record.to_bytes().to_vec();
    let skip = match origin {
        RecordOrigin::Client => None,
        RecordOrigin::Peer(source) => Some(source),
    };

    for peer in peers {
        if Some(*peer) == skip {
            continue;
        }
        network.send_request(
            peer,
            P2pRequest::Flood {
                record_bytes: record_bytes.clone(),
            },
        );
    }
}
