//! P2P integration test for revreg-node.
//!
//! Starts two node processes:
//!   Node A — bootstrap node (no peers)
//!   Node B — joins by dialing node A
//!
//! Submits a revocation to node A via the client RPC and verifies node B
//! sees the same key reported revoked after flood propagation.
//!
//! Run with:
//!   cargo test -p revreg-node --test p2p

use std::io::{BufRead, BufReader};
use std::net::TcpListener as StdTcpListener;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use revreg_core::constants::{POW_COUNT, RPC_MSG_QUERY, RPC_MSG_REVOKE};
use revreg_core::record::RevocationRecord;
use revreg_core::types::PublicKey;
use revreg_crypto::KeyPair;
use revreg_pow::PowEngine;
use revreg_rpc::frame::{read_frame, write_frame};
use revreg_rpc::types::{encode_query, encode_revoke, IsValid};
use tokio::net::TcpStream;

struct NodeGuard {
    child: Child,
    data_dir: PathBuf,
}

impl Drop for NodeGuard {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        let _ = std::fs::remove_dir_all(&self.data_dir);
    }
}

fn free_port() -> u16 {
    StdTcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port()
}

fn spawn_node(data_dir: &PathBuf, rpc_addr: &str, p2p_listen: &str, bootstrap: Option<&str>, capture_stdout: bool) -> Child {
    let node_bin = env!("CARGO_BIN_EXE_revreg-node");
    let mut cmd = Command::new(node_bin);
    cmd.args([
        "--data-dir",
        data_dir.to_str().unwrap(),
        "--rpc-addr",
        rpc_addr,
        "--p2p-listen",
        p2p_listen,
        "--workbits",
        "0",
        "--epoch-duration",
        "3600",
    ]);
    if let Some(bs) = bootstrap {
        cmd.args(["--bootstrap", bs]);
    }
    cmd.stdout(if capture_stdout { Stdio::piped() } else { Stdio::null() })
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to spawn revreg-node")
}

/// Block (in a blocking thread) on node A's stdout until it prints its
/// dialable multiaddr, which it does once before entering the main loop.
fn read_multiaddr(child: &mut Child) -> String {
    let stdout = child.stdout.take().expect("piped stdout");
    let mut lines = BufReader::new(stdout).lines();
    for line in &mut lines {
        let line = line.expect("read stdout line");
        if let Some(addr) = line.strip_prefix("P2P_MULTIADDR=") {
            return addr.to_string();
        }
    }
    panic!("node exited before printing its multiaddr");
}

fn mined_record(timestamp: i64) -> (KeyPair, RevocationRecord) {
    let signer = KeyPair::generate();
    let mut engine = PowEngine::new(signer.public_key.clone(), timestamp);
    for _ in 0..(POW_COUNT * 8) {
        engine.round();
    }
    let record = engine.finish(&signer, 0.0, 3_600);
    (signer, record)
}

async fn connect_with_retry(addr: &str, timeout: Duration) -> TcpStream {
    let deadline = Instant::now() + timeout;
    loop {
        if let Ok(stream) = TcpStream::connect(addr).await {
            return stream;
        }
        if Instant::now() > deadline {
            panic!("node did not accept RPC connections within {timeout:?}");
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
}

async fn query(stream: &mut TcpStream, public_key: &PublicKey) -> IsValid {
    write_frame(stream, RPC_MSG_QUERY, &encode_query(public_key)).await.unwrap();
    let (_, payload) = read_frame(stream).await.unwrap();
    IsValid::from_bytes(&payload).unwrap()
}

async fn revoke(stream: &mut TcpStream, record: &RevocationRecord) -> IsValid {
    write_frame(stream, RPC_MSG_REVOKE, &encode_revoke(record)).await.unwrap();
    let (_, payload) = read_frame(stream).await.unwrap();
    IsValid::from_bytes(&payload).unwrap()
}

#[tokio::test]
async fn p2p_flood_propagation() {
    let base_dir = std::env::temp_dir().join(format!("revreg_p2p_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&base_dir);
    let dir_a = base_dir.join("node_a");
    let dir_b = base_dir.join("node_b");
    std::fs::create_dir_all(&dir_a).unwrap();
    std::fs::create_dir_all(&dir_b).unwrap();

    let rpc_a = format!("127.0.0.1:{}", free_port());
    let p2p_a = format!("/ip4/127.0.0.1/tcp/{}", free_port());
    let mut child_a = spawn_node(&dir_a, &rpc_a, &p2p_a, None, true);
    let multiaddr_a = read_multiaddr(&mut child_a);
    let _guard_a = NodeGuard {
        child: child_a,
        data_dir: dir_a,
    };

    let rpc_b = format!("127.0.0.1:{}", free_port());
    let p2p_b = format!("/ip4/127.0.0.1/tcp/{}", free_port());
    let child_b = spawn_node(&dir_b, &rpc_b, &p2p_b, Some(&multiaddr_a), false);
    let _guard_b = NodeGuard {
        child: child_b,
        data_dir: base_dir,
    };

    let mut stream_a = connect_with_retry(&rpc_a, Duration::from_secs(20)).await;
    let mut stream_b = connect_with_retry(&rpc_b, Duration::from_secs(20)).await;

    // Give the two nodes a moment to dial and identify each other.
    tokio::time::sleep(Duration::from_secs(2)).await;

    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_micros() as i64;
    let (signer, record) = mined_record(now);

    assert_eq!(revoke(&mut stream_a, &record).await, IsValid::Revoked);

    // Poll node B until the flood push lands.
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        if query(&mut stream_b, &signer.public_key).await == IsValid::Revoked {
            break;
        }
        if Instant::now() > deadline {
            panic!("node B did not learn the revocation via flood within 10 seconds");
        }
        tokio::time::sleep(Duration::from_millis(300)).await;
    }
}
