use std::path::PathBuf;

use agent_config::{AppConfig, ConfigError, RpcEndpoint, gateway_url};

fn base_config() -> AppConfig {
    AppConfig {
        domain: "backend.example.net".to_string(),
        token: "token".to_string(),
        cache_dir: PathBuf::from("/tmp/radius-agent"),
        insecure: false,
        http_addr: "127.0.0.1:9999".to_string(),
        rpc_topic_prefix: "radius/rpc".to_string(),
        rpc_timeout_seconds: 30,
        sync_interval_seconds: 60,
        daemon_enabled: true,
        daemon_image: "freeradius/freeradius-server:latest".to_string(),
        daemon_api_url: "http://127.0.0.1:9999".to_string(),
    }
}

// 环境变量为进程级状态，所有读取 env 的断言放在同一个测试里。
#[test]
fn load_config_from_env() {
    // Rust 2024 中 set_var 需要显式标注 unsafe（测试进程内可控）。
    unsafe {
        std::env::remove_var("RADIUS_AGENT_DOMAIN");
        std::env::set_var("RADIUS_AGENT_TOKEN", "secret-token");
    }
    let err = AppConfig::from_env().expect_err("domain missing");
    assert!(matches!(err, ConfigError::Missing(key) if key == "RADIUS_AGENT_DOMAIN"));

    unsafe {
        std::env::set_var("RADIUS_AGENT_DOMAIN", "backend.example.net");
        std::env::set_var("RADIUS_AGENT_SYNC_INTERVAL_SECONDS", "abc");
    }
    let err = AppConfig::from_env().expect_err("invalid interval");
    assert!(matches!(err, ConfigError::Invalid(key, _) if key == "RADIUS_AGENT_SYNC_INTERVAL_SECONDS"));

    unsafe {
        std::env::set_var("RADIUS_AGENT_SYNC_INTERVAL_SECONDS", "15");
        std::env::set_var("RADIUS_AGENT_CACHE_DIR", "/srv/radius");
        std::env::set_var("RADIUS_AGENT_DAEMON", "false");
    }
    let config = AppConfig::from_env().expect("config");
    assert_eq!(config.sync_interval_seconds, 15);
    assert_eq!(config.rpc_timeout_seconds, 30);
    assert_eq!(config.http_addr, "127.0.0.1:9999");
    assert_eq!(config.rpc_topic_prefix, "radius/rpc");
    assert!(!config.daemon_enabled);
    assert!(!config.insecure);
    assert_eq!(config.daemon_api_url, "http://127.0.0.1:9999");
    assert_eq!(config.logs_dir(), PathBuf::from("/srv/radius/logs"));
    assert!(!format!("{:?}", config).contains("secret-token"));
}

#[test]
fn endpoint_defaults_to_tls_port() {
    let endpoint = base_config().rpc_endpoint().expect("endpoint");
    assert_eq!(
        endpoint,
        RpcEndpoint {
            host: "backend.example.net".to_string(),
            port: 8883,
            secure: true,
        }
    );
}

#[test]
fn insecure_endpoint_uses_plain_port() {
    let config = AppConfig {
        insecure: true,
        ..base_config()
    };
    let endpoint = config.rpc_endpoint().expect("endpoint");
    assert_eq!(endpoint.port, 1883);
    assert!(!endpoint.secure);
}

#[test]
fn explicit_port_in_domain_wins() {
    let config = AppConfig {
        domain: "10.1.1.1:18830".to_string(),
        ..base_config()
    };
    let endpoint = config.rpc_endpoint().expect("endpoint");
    assert_eq!(endpoint.host, "10.1.1.1");
    assert_eq!(endpoint.port, 18830);
}

#[test]
fn malformed_domain_port_is_invalid() {
    let config = AppConfig {
        domain: "backend:notaport".to_string(),
        ..base_config()
    };
    assert!(matches!(
        config.rpc_endpoint(),
        Err(ConfigError::Invalid(_, _))
    ));
}

#[test]
fn bracketed_ipv6_domain_uses_default_port() {
    let config = AppConfig {
        domain: "[2001:db8::1]".to_string(),
        ..base_config()
    };
    let endpoint = config.rpc_endpoint().expect("endpoint");
    assert_eq!(endpoint.host, "2001:db8::1");
    assert_eq!(endpoint.port, 8883);
}

#[test]
fn ipv6_domain_forms() {
    let with_port = AppConfig {
        domain: "mqtts://[2001:db8::1]:18830".to_string(),
        ..base_config()
    };
    let endpoint = with_port.rpc_endpoint().expect("endpoint");
    assert_eq!(endpoint.host, "2001:db8::1");
    assert_eq!(endpoint.port, 18830);

    let bare = AppConfig {
        domain: "2001:db8::1".to_string(),
        ..base_config()
    };
    assert_eq!(bare.rpc_endpoint().expect("endpoint").port, 8883);

    for domain in ["[2001:db8::1", "[2001:db8::1]x", "[]:8883"] {
        let config = AppConfig {
            domain: domain.to_string(),
            ..base_config()
        };
        assert!(
            matches!(config.rpc_endpoint(), Err(ConfigError::Invalid(_, _))),
            "{domain}"
        );
    }
}

#[test]
fn gateway_url_maps_wildcard_to_loopback() {
    assert_eq!(gateway_url("127.0.0.1:9999"), "http://127.0.0.1:9999");
    assert_eq!(gateway_url("0.0.0.0:8080"), "http://127.0.0.1:8080");
    assert_eq!(gateway_url("[::]:9999"), "http://[::1]:9999");
}
