use agent_storage::{
    CacheDb, RouterStore, ServiceStore, SqliteRouterStore, SqliteServiceStore, StorageError,
};
use domain::{NetworkDevice, ReplyRule, SubscriberService};

fn router(ip: &str, radius_ip: Option<&str>, name: &str) -> NetworkDevice {
    NetworkDevice {
        id: format!("id-{ip}"),
        name: name.to_string(),
        ip: ip.to_string(),
        radius_ip: radius_ip.map(str::to_string),
        radius_secret: "s3cret".to_string(),
        external_identifiers: serde_json::json!({"netbox": 7}),
        ..NetworkDevice::default()
    }
}

fn service(username: &str, value: &str) -> SubscriberService {
    SubscriberService {
        id: format!("svc-{username}"),
        username: username.to_string(),
        password: "pw".to_string(),
        radreply: vec![ReplyRule::new("Mikrotik-Rate-Limit", ":=", value)],
        ..SubscriberService::default()
    }
}

#[tokio::test]
async fn open_creates_database_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let nested = dir.path().join("cache");
    let db = CacheDb::open(&nested).await.expect("open");
    assert!(db.path().ends_with("radius.db"));
    assert!(nested.join("radius.db").exists());
}

#[tokio::test]
async fn router_lookup_by_radius_ip_and_fallback() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = CacheDb::open(dir.path()).await.expect("open");
    let store = SqliteRouterStore::new(db.pool());

    store
        .put_router(&router("10.0.0.1", Some("100.64.0.1"), "a"))
        .await
        .expect("put a");
    store
        .put_router(&router("10.0.0.2", None, "b"))
        .await
        .expect("put b");

    let a = store.get_router("100.64.0.1").await.expect("get a");
    assert_eq!(a.name, "a");
    assert_eq!(a.external_identifiers["netbox"], 7);
    let b = store.get_router("10.0.0.2").await.expect("get b");
    assert_eq!(b.name, "b");
    assert!(matches!(
        store.get_router("10.9.9.9").await,
        Err(StorageError::NotFound)
    ));
}

#[tokio::test]
async fn upsert_replaces_record_without_duplicating() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = CacheDb::open(dir.path()).await.expect("open");
    let routers = SqliteRouterStore::new(db.pool());
    let services = SqliteServiceStore::new(db.pool());

    routers
        .put_router(&router("10.0.0.1", None, "old"))
        .await
        .expect("put");
    routers
        .put_router(&router("10.0.0.1", None, "new"))
        .await
        .expect("put");
    services.put_service(&service("alice", "1M/1M")).await.expect("put");
    services.put_service(&service("alice", "1M/1M")).await.expect("put");

    assert_eq!(routers.count().await.expect("count"), 1);
    assert_eq!(services.count().await.expect("count"), 1);
    assert_eq!(routers.get_router("10.0.0.1").await.expect("get").name, "new");
}

#[tokio::test]
async fn reopened_directory_serves_cached_records() {
    let dir = tempfile::tempdir().expect("tempdir");
    {
        let db = CacheDb::open(dir.path()).await.expect("open");
        SqliteServiceStore::new(db.pool())
            .put_service(&service("bob", "10M/10M"))
            .await
            .expect("put");
        SqliteRouterStore::new(db.pool())
            .put_router(&router("10.0.0.3", Some("100.64.0.3"), "c"))
            .await
            .expect("put");
        db.close().await;
    }

    let db = CacheDb::open(dir.path()).await.expect("reopen");
    let bob = SqliteServiceStore::new(db.pool())
        .get_service("bob")
        .await
        .expect("get");
    assert_eq!(bob.radreply[0].value, "10M/10M");
    assert_eq!(bob.password, "pw");
    assert!(
        SqliteRouterStore::new(db.pool())
            .get_router("100.64.0.3")
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn service_without_username_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = CacheDb::open(dir.path()).await.expect("open");
    let store = SqliteServiceStore::new(db.pool());
    let err = store
        .put_service(&service("", "x"))
        .await
        .expect_err("empty username");
    assert!(matches!(err, StorageError::EmptyKey));
}
