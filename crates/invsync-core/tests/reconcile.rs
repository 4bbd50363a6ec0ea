mod common;

use std::sync::Arc;

use common::MockStore;
use invsync_core::{
    ComponentSelection, CoreError, ReconcileOptions, Reconciler, SingletonOptions,
};
use invsync_inventory::{
    BaseObject, ComponentKind, DiffAction, Ethernet, Memory, ObservedSnapshot, ScanTarget,
};
use serde_json::json;

fn target() -> ScanTarget {
    ScanTarget::from_ip("10.0.0.1".parse().unwrap())
}

fn options(components: &str) -> ReconcileOptions {
    ReconcileOptions {
        components: components.parse::<ComponentSelection>().unwrap(),
        ..ReconcileOptions::default()
    }
}

fn snapshot() -> ObservedSnapshot {
    ObservedSnapshot {
        serial_number: "SN1".to_string(),
        ..ObservedSnapshot::default()
    }
}

fn observed_eth(mac: &str, firmware: &str) -> Ethernet {
    Ethernet {
        id: None,
        base_object: BaseObject::default(),
        mac: mac.parse().unwrap(),
        model_name: String::new(),
        speed: "10 Gbps".to_string(),
        firmware_version: firmware.to_string(),
    }
}

fn observed_mem() -> Memory {
    Memory {
        id: None,
        base_object: BaseObject::default(),
        model_name: "Samsung DDR3 DIMM".to_string(),
        size: 16384,
        speed: 1600,
    }
}

fn stored_mem(id: u64) -> serde_json::Value {
    json!({"id": id, "base_object": {"id": 1}, "model_name": "Samsung DDR3 DIMM", "size": 16384, "speed": 1600})
}

async fn run(store: &Arc<MockStore>, options: ReconcileOptions, snapshot: &ObservedSnapshot) -> invsync_core::ReconcileReport {
    Reconciler::new(store.clone(), options)
        .unwrap()
        .run(&target(), snapshot)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_interface_firmware_update() {
    let store = Arc::new(MockStore::with_host().stored(
        ComponentKind::Ethernet,
        vec![json!({
            "id": 1, "base_object": {"id": 1}, "mac": "aa:bb:cc:dd:ee:ff",
            "model_name": "", "speed": 4, "firmware_version": "1.1.1"
        })],
    ));
    let mut observed = snapshot();
    observed.ethernets = vec![observed_eth("aa:bb:cc:dd:ee:ff", "2.2.2")];

    let report = run(&store, options("eth"), &observed).await;

    assert!(report.changes_detected);
    let calls = store.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].action, DiffAction::Update);
    assert_eq!(calls[0].kind, ComponentKind::Ethernet);
    assert_eq!(calls[0].id, Some(1));
    assert_eq!(
        calls[0].payload,
        json!({"id": 1, "base_object": 1, "mac": "aa:bb:cc:dd:ee:ff", "model_name": "", "speed": 4, "firmware_version": "2.2.2"})
    );
}

#[tokio::test]
async fn test_memory_create() {
    let store = Arc::new(
        MockStore::with_host().stored(ComponentKind::Memory, vec![stored_mem(1), stored_mem(2)]),
    );
    let mut observed = snapshot();
    observed.memory = vec![observed_mem(), observed_mem(), observed_mem()];

    let report = run(&store, options("mem"), &observed).await;

    assert!(report.changes_detected);
    let calls = store.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].action, DiffAction::Create);
    assert_eq!(
        calls[0].payload,
        json!({"base_object": 1, "model_name": "Samsung DDR3 DIMM", "size": 16384, "speed": 1600})
    );
}

#[tokio::test]
async fn test_duplicate_memory_delete() {
    let store = Arc::new(MockStore::with_host().stored(
        ComponentKind::Memory,
        vec![stored_mem(7), stored_mem(3), stored_mem(5)],
    ));
    let mut observed = snapshot();
    observed.memory = vec![observed_mem()];

    let report = run(&store, options("mem"), &observed).await;

    assert_eq!(report.applied.count(DiffAction::Delete), 2);
    let deleted: Vec<_> = store.calls().iter().map(|c| (c.action, c.id)).collect();
    assert_eq!(
        deleted,
        vec![(DiffAction::Delete, Some(3)), (DiffAction::Delete, Some(5))]
    );
}

#[tokio::test]
async fn test_remarks_append() {
    let mut store = MockStore::with_host();
    store
        .assets
        .insert(1, json!({"id": 1, "sn": "SN1", "remarks": "rack 4", "firmware_version": "1.0"}));
    let store = Arc::new(store);

    let mut observed = snapshot();
    observed.model_name = "Dell PowerEdge R620".to_string();
    let mut opts = options("none");
    opts.singleton = SingletonOptions {
        firmware_and_bios: false,
        model_name: true,
    };

    let report = run(&store, opts, &observed).await;

    assert!(report.changes_detected);
    let calls = store.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].kind, ComponentKind::DataCenterAsset);
    assert_eq!(calls[0].id, Some(1));
    assert_eq!(
        calls[0].payload,
        json!({"id": 1, "remarks": "rack 4\n>>> invsync: detected model name: Dell PowerEdge R620 <<<"})
    );
}

#[tokio::test]
async fn test_dhcp_exposed_interface_not_deleted() {
    let store = Arc::new(
        MockStore::with_host()
            .stored(
                ComponentKind::Ethernet,
                vec![json!({"id": 9, "base_object": 1, "mac": "aa:bb:cc:dd:ee:ff", "speed": 11})],
            )
            .ip("10.0.0.50", Some((9, "aa:bb:cc:dd:ee:ff")), false, true),
    );

    let report = run(&store, options("eth"), &snapshot()).await;

    assert!(report.changes_detected);
    assert!(store.calls().is_empty());
    assert_eq!(report.dhcp_excluded.len(), 1);
    assert_eq!(report.dhcp_excluded[0].address, "10.0.0.50");
}

#[tokio::test]
async fn test_management_interface_survives_missing_scan() {
    let store = Arc::new(
        MockStore::with_host()
            .stored(
                ComponentKind::Ethernet,
                vec![json!({"id": 4, "base_object": 1, "mac": "74:86:7a:ee:20:e8", "speed": 3})],
            )
            .ip("10.0.0.1", Some((4, "74:86:7a:ee:20:e8")), true, false),
    );

    let report = run(&store, options("eth"), &snapshot()).await;

    assert!(!report.changes_detected);
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_dry_run_sends_nothing() {
    let store = Arc::new(
        MockStore::with_host().stored(ComponentKind::Memory, vec![stored_mem(1)]),
    );
    let mut observed = snapshot();
    observed.memory = vec![observed_mem(), observed_mem()];
    observed.firmware_version = "2.0".to_string();

    let mut opts = options("all");
    opts.dry_run = true;
    opts.singleton.firmware_and_bios = true;

    let report = run(&store, opts, &observed).await;

    assert!(report.changes_detected);
    assert!(report.applied.dry_run);
    assert_eq!(report.applied.changes.len(), 2);
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_no_changes() {
    let store = Arc::new(
        MockStore::with_host().stored(ComponentKind::Memory, vec![stored_mem(1)]),
    );
    let mut observed = snapshot();
    observed.memory = vec![observed_mem()];

    let report = run(&store, options("all"), &observed).await;

    assert!(!report.changes_detected);
    assert!(report.applied.is_empty());
}

#[tokio::test]
async fn test_serial_mismatch_counts_as_change() {
    let store = Arc::new(MockStore::with_host());
    let mut observed = snapshot();
    observed.serial_number = "OTHER".to_string();

    let report = run(&store, options("none"), &observed).await;

    assert!(report.changes_detected);
    assert_eq!(report.serial_mismatch.as_deref(), Some("SN1"));
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_unknown_host_is_an_error() {
    let store = Arc::new(MockStore::default());
    let err = Reconciler::new(store, options("all"))
        .unwrap()
        .run(&target(), &snapshot())
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NoBaseObject { .. }));
    assert_eq!(err.to_string(), "IP address 10.0.0.1 doesn't have any base objects");
}

#[tokio::test]
async fn test_ambiguous_host_is_an_error() {
    let mut store = MockStore::with_host();
    store.base_objects.insert("10.0.0.1".to_string(), vec![1, 2]);
    let err = Reconciler::new(Arc::new(store), options("all"))
        .unwrap()
        .run(&target(), &snapshot())
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::AmbiguousBaseObject { count: 2, .. }));
}

#[tokio::test]
async fn test_ip_lookup_failure_aborts_before_later_kinds() {
    let store = Arc::new(
        MockStore::with_host()
            .stored(ComponentKind::Memory, vec![stored_mem(1)])
            .failing_ip_lookups(),
    );
    let mut observed = snapshot();
    observed.ethernets = vec![observed_eth("aa:bb:cc:dd:ee:ff", "2.2.2")];
    observed.memory = vec![observed_mem(), observed_mem()];

    let err = Reconciler::new(store.clone(), options("eth,mem"))
        .unwrap()
        .run(&target(), &observed)
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Client(_)));
    assert!(store.calls().is_empty());
}
