//! Integration tests for timegated
//!
//! These tests exercise the full path: SQLite store, manager, gate, TCP
//! session host, and the enforcement loop working against each other.

use chrono::Duration as ChronoDuration;
use std::sync::Arc;
use std::time::Duration;
use timegate_core::{AccessManager, AccessStatus, EnforcementLoop, GateDecision, Messages};
use timegate_host_api::SessionHost;
use timegate_host_tcp::TcpSessionHost;
use timegate_store::SqliteStore;
use timegate_util::{DEFAULT_BYPASS_IDENTITY, IdentityId, now};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

struct Harness {
    manager: Arc<AccessManager>,
    host: Arc<TcpSessionHost>,
    sweep: EnforcementLoop,
    addr: std::net::SocketAddr,
}

async fn harness(store: Arc<SqliteStore>) -> Harness {
    let manager = Arc::new(AccessManager::new(store));
    let messages = Messages::new(Some("admin@example.org".into()));
    let gate = Arc::new(GateDecision::new(
        manager.clone(),
        DEFAULT_BYPASS_IDENTITY,
        messages.clone(),
    ));

    let mut host = TcpSessionHost::new("127.0.0.1:0".parse().unwrap(), gate);
    host.start().await.unwrap();
    let addr = host.local_addr().unwrap();
    let host = Arc::new(host);

    let runner = host.clone();
    tokio::spawn(async move {
        let _ = runner.run().await;
    });

    let sweep = EnforcementLoop::new(
        manager.clone(),
        host.clone(),
        DEFAULT_BYPASS_IDENTITY,
        messages,
    );

    Harness {
        manager,
        host,
        sweep,
        addr,
    }
}

async fn connect(addr: std::net::SocketAddr, identity: IdentityId, name: &str) -> (TcpStream, String) {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(format!("HELLO {} {}\n", identity, name).as_bytes())
        .await
        .unwrap();

    let mut reader = BufReader::new(&mut stream);
    let mut reply = String::new();
    reader.read_line(&mut reply).await.unwrap();
    (stream, reply)
}

#[tokio::test]
async fn granted_identity_connects_and_survives_sweeps() {
    let h = harness(Arc::new(SqliteStore::in_memory().unwrap())).await;
    let id = IdentityId::random();
    let t = now();

    h.manager
        .create_access(id, "alice", t - ChronoDuration::hours(1), t + ChronoDuration::hours(1), false)
        .unwrap();

    let (_stream, reply) = connect(h.addr, id, "alice").await;
    assert_eq!(reply, "OK\n");

    assert_eq!(h.sweep.sweep_once().await, 0);
    assert!(h.host.connected_identities().contains(&id));
}

#[tokio::test]
async fn revocation_is_enforced_by_the_next_sweep() {
    let h = harness(Arc::new(SqliteStore::in_memory().unwrap())).await;
    let id = IdentityId::random();
    let t = now();

    h.manager
        .create_access(id, "alice", t - ChronoDuration::hours(1), t + ChronoDuration::hours(1), false)
        .unwrap();

    let (mut stream, reply) = connect(h.addr, id, "alice").await;
    assert_eq!(reply, "OK\n");

    assert!(h.manager.remove_access(&id));
    assert_eq!(h.sweep.sweep_once().await, 1);
    assert!(h.host.connected_identities().is_empty());

    let mut rest = String::new();
    stream.read_to_string(&mut rest).await.unwrap();
    assert!(rest.starts_with("KICK "));
    assert!(rest.contains("no access on record"));
    assert!(rest.contains("admin@example.org"));
}

#[tokio::test]
async fn expired_record_denies_login_and_is_reconciled() {
    let h = harness(Arc::new(SqliteStore::in_memory().unwrap())).await;
    let id = IdentityId::random();
    let t = now();

    h.manager
        .create_access(id, "alice", t - ChronoDuration::hours(2), t - ChronoDuration::minutes(5), false)
        .unwrap();

    let (_stream, reply) = connect(h.addr, id, "alice").await;
    assert!(reply.starts_with("DENY "));
    assert!(reply.contains("expired"));

    // The denied login observed the expiry and deleted the record
    assert!(h.manager.get_access(&id).is_none());
    assert!(h.host.connected_identities().is_empty());
}

#[tokio::test]
async fn unknown_identity_is_denied_at_login() {
    let h = harness(Arc::new(SqliteStore::in_memory().unwrap())).await;

    let (_stream, reply) = connect(h.addr, IdentityId::random(), "stranger").await;
    assert!(reply.starts_with("DENY "));
    assert!(reply.contains("no access on record"));
}

#[tokio::test]
async fn bypass_identity_connects_without_a_record() {
    let h = harness(Arc::new(SqliteStore::in_memory().unwrap())).await;

    let (_stream, reply) = connect(h.addr, DEFAULT_BYPASS_IDENTITY, "operator").await;
    assert_eq!(reply, "OK\n");

    // And the sweep leaves it alone
    assert_eq!(h.sweep.sweep_once().await, 0);
    assert!(h.host.connected_identities().contains(&DEFAULT_BYPASS_IDENTITY));
}

#[tokio::test]
async fn running_sweep_evicts_after_revocation() {
    let store = Arc::new(SqliteStore::in_memory().unwrap());
    let mut h = harness(store).await;
    let id = IdentityId::random();
    let t = now();

    h.manager
        .create_access(id, "alice", t - ChronoDuration::hours(1), t + ChronoDuration::hours(1), false)
        .unwrap();

    let (mut stream, reply) = connect(h.addr, id, "alice").await;
    assert_eq!(reply, "OK\n");

    h.sweep.start();
    h.manager.remove_access(&id);

    // The 1-second loop should observe the revocation shortly
    let mut evicted = false;
    for _ in 0..40 {
        if h.host.connected_identities().is_empty() {
            evicted = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    h.sweep.cancel();
    assert!(evicted);

    let mut rest = String::new();
    stream.read_to_string(&mut rest).await.unwrap();
    assert!(rest.starts_with("KICK "));
}

#[tokio::test]
async fn records_persist_across_store_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("timegate.db");
    let id = IdentityId::random();
    let t = now();

    {
        let manager = AccessManager::new(Arc::new(SqliteStore::open(&db_path).unwrap()));
        manager
            .create_access(id, "alice", t, t + ChronoDuration::hours(4), false)
            .unwrap();
    }

    let manager = AccessManager::new(Arc::new(SqliteStore::open(&db_path).unwrap()));
    let (status, record) = manager.check_access(&id);
    assert_eq!(status, AccessStatus::Valid);
    assert_eq!(record.unwrap().display_name, "alice");
}

#[tokio::test]
async fn startup_purge_clears_stale_records() {
    let store = Arc::new(SqliteStore::in_memory().unwrap());
    let manager = AccessManager::new(store);
    let t = now();

    manager
        .create_access(
            IdentityId::random(),
            "stale",
            t - ChronoDuration::days(2),
            t - ChronoDuration::days(1),
            false,
        )
        .unwrap();
    manager
        .create_access(
            IdentityId::random(),
            "live",
            t - ChronoDuration::hours(1),
            t + ChronoDuration::hours(1),
            false,
        )
        .unwrap();
    manager
        .create_access(IdentityId::random(), "forever", t, t, true)
        .unwrap();

    assert_eq!(manager.purge_expired(), 1);
    assert_eq!(manager.purge_expired(), 0);
}
