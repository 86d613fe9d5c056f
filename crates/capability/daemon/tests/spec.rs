use std::path::PathBuf;

use agent_config::{AppConfig, gateway_url};
use agent_daemon::{
    DaemonError, HOST_NETWORK, PortBinding, Protocol, ServiceSpec, radius_daemon_spec,
};

fn config() -> AppConfig {
    AppConfig {
        domain: "backend.example.net".to_string(),
        token: "token".to_string(),
        cache_dir: PathBuf::from("/var/lib/radius-agent"),
        insecure: false,
        http_addr: "127.0.0.1:9999".to_string(),
        rpc_topic_prefix: "radius/rpc".to_string(),
        rpc_timeout_seconds: 30,
        sync_interval_seconds: 60,
        daemon_enabled: true,
        daemon_image: "freeradius/freeradius-server:3.2".to_string(),
        daemon_api_url: gateway_url("127.0.0.1:9999"),
    }
}

#[test]
fn radius_daemon_publishes_auth_and_accounting_ports() {
    let spec = radius_daemon_spec(&config());
    assert_eq!(spec.name, "freeradius");
    assert_eq!(spec.image, "freeradius/freeradius-server:3.2");
    assert_eq!(
        spec.env,
        vec![(
            "FREERADIUS_API_URL".to_string(),
            "http://127.0.0.1:9999".to_string()
        )]
    );
    let published: Vec<String> = spec.ports.iter().map(PortBinding::publish_arg).collect();
    assert_eq!(
        published,
        vec![
            "0.0.0.0:1812:1812/tcp",
            "0.0.0.0:1812:1812/udp",
            "0.0.0.0:1813:1813/tcp",
            "0.0.0.0:1813:1813/udp",
        ]
    );
}

#[test]
fn run_args_carry_env_ports_and_image_last() {
    let spec = ServiceSpec {
        name: "freeradius".to_string(),
        image: "img:1".to_string(),
        env: vec![("A".to_string(), "b=c".to_string())],
        ports: vec![PortBinding {
            container_port: 1812,
            protocol: Protocol::Udp,
            host_ip: "127.0.0.1".to_string(),
            host_port: 11812,
        }],
        network: None,
    };
    let args = spec.run_args();
    assert_eq!(&args[..4], ["run", "-d", "--name", "freeradius"]);
    assert!(args.windows(2).any(|w| w == ["--restart", "unless-stopped"]));
    assert!(args.windows(2).any(|w| w == ["-e", "A=b=c"]));
    assert!(args.windows(2).any(|w| w == ["-p", "127.0.0.1:11812:1812/udp"]));
    assert_eq!(args.last().map(String::as_str), Some("img:1"));
}

#[test]
fn validate_rejects_incomplete_specs() {
    let mut spec = radius_daemon_spec(&config());
    spec.image = " ".to_string();
    assert!(matches!(spec.validate(), Err(DaemonError::InvalidSpec(_))));

    let mut spec = radius_daemon_spec(&config());
    spec.env.push(("BAD=KEY".to_string(), "x".to_string()));
    assert!(matches!(spec.validate(), Err(DaemonError::InvalidSpec(_))));
}

#[test]
fn radius_daemon_reaches_loopback_gateway_over_host_network() {
    let config = config();
    let spec = radius_daemon_spec(&config);
    assert_eq!(spec.network.as_deref(), Some(HOST_NETWORK));

    // 守护进程与网关共享宿主机网络栈，URL 指向网关实际监听的地址
    let (_, api_url) = &spec.env[0];
    assert_eq!(api_url, &format!("http://{}", config.http_addr));

    let args = spec.run_args();
    assert!(args.windows(2).any(|w| w == ["--network", "host"]));
    assert!(!args.iter().any(|arg| arg == "-p" || arg == "--add-host"));
    assert_eq!(args.last().map(String::as_str), Some("freeradius/freeradius-server:3.2"));
}
