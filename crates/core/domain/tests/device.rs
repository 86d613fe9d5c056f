use domain::NetworkDevice;

fn device(ip: &str, radius_ip: Option<&str>) -> NetworkDevice {
    NetworkDevice {
        id: "rtr-1".to_string(),
        name: "core-1".to_string(),
        ip: ip.to_string(),
        radius_ip: radius_ip.map(str::to_string),
        radius_secret: "s3cret".to_string(),
        ..NetworkDevice::default()
    }
}

#[test]
fn cache_key_prefers_radius_ip() {
    let device = device("10.0.0.1", Some("100.64.0.1"));
    assert_eq!(device.cache_key(), "100.64.0.1");
}

#[test]
fn cache_key_falls_back_to_management_ip() {
    assert_eq!(device("10.0.0.1", None).cache_key(), "10.0.0.1");
    assert_eq!(device("10.0.0.1", Some("")).cache_key(), "10.0.0.1");
}

#[test]
fn cache_key_never_uses_record_id() {
    let device = device("", None);
    assert_eq!(device.cache_key(), "");
    assert_ne!(device.cache_key(), device.id);
}

#[test]
fn decodes_backend_payload_with_nulls() {
    let json = r#"{
        "id": "01hx",
        "point_of_presence_id": "pop-1",
        "vendor_id": null,
        "name": "edge-router",
        "ip": "10.1.1.1",
        "model": null,
        "serial": "SN1",
        "radius_ip": null,
        "radius_secret": "secret",
        "authorization_type": "radius",
        "accounting_type": "radius",
        "created_at": "2024-05-01T10:00:00Z",
        "updated_at": "2024-05-02T10:00:00.000000Z",
        "deleted_at": null,
        "external_identifiers": {"netbox": 12}
    }"#;
    let device: NetworkDevice = serde_json::from_str(json).expect("decode");
    assert_eq!(device.vendor_id, "");
    assert_eq!(device.model, "");
    assert!(device.radius_ip.is_none());
    assert!(device.deleted_at.is_none());
    assert!(device.created_at.is_some());
    assert_eq!(device.cache_key(), "10.1.1.1");
    assert_eq!(device.external_identifiers["netbox"], 12);
}

#[test]
fn debug_output_hides_secret() {
    let rendered = format!("{:?}", device("10.0.0.1", None));
    assert!(!rendered.contains("s3cret"));
    assert!(rendered.contains("core-1"));
}
