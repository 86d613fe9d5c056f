//! 服务声明。

use agent_config::AppConfig;

use crate::DaemonError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Udp => "udp",
        }
    }
}

/// 端口映射：`host_ip:host_port -> container_port/protocol`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortBinding {
    pub container_port: u16,
    pub protocol: Protocol,
    pub host_ip: String,
    pub host_port: u16,
}

impl PortBinding {
    /// 同端口号对外发布。
    pub fn same(port: u16, protocol: Protocol, host_ip: &str) -> Self {
        Self {
            container_port: port,
            protocol,
            host_ip: host_ip.to_string(),
            host_port: port,
        }
    }

    /// `docker run -p` 参数值。
    pub fn publish_arg(&self) -> String {
        format!(
            "{}:{}:{}/{}",
            self.host_ip,
            self.host_port,
            self.container_port,
            self.protocol.as_str()
        )
    }
}

/// 宿主机网络模式名。
pub const HOST_NETWORK: &str = "host";

/// 容器化服务声明。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSpec {
    pub name: String,
    pub image: String,
    pub env: Vec<(String, String)>,
    /// 宿主机网络下只作为声明，不生成 `-p`
    pub ports: Vec<PortBinding>,
    /// `docker run --network`；None 为默认 bridge
    pub network: Option<String>,
}

impl ServiceSpec {
    pub fn validate(&self) -> Result<(), DaemonError> {
        if self.name.trim().is_empty() {
            return Err(DaemonError::InvalidSpec("empty name".to_string()));
        }
        if self.image.trim().is_empty() {
            return Err(DaemonError::InvalidSpec("empty image".to_string()));
        }
        if let Some((key, _)) = self.env.iter().find(|(key, _)| key.is_empty() || key.contains('=')) {
            return Err(DaemonError::InvalidSpec(format!("bad env key {key:?}")));
        }
        Ok(())
    }

    pub fn uses_host_network(&self) -> bool {
        self.network.as_deref() == Some(HOST_NETWORK)
    }

    /// `docker run` 的完整参数（不含程序名）。
    pub fn run_args(&self) -> Vec<String> {
        let mut args = vec![
            "run".to_string(),
            "-d".to_string(),
            "--name".to_string(),
            self.name.clone(),
            "--restart".to_string(),
            "unless-stopped".to_string(),
        ];
        if let Some(network) = &self.network {
            args.push("--network".to_string());
            args.push(network.clone());
        }
        for (key, value) in &self.env {
            args.push("-e".to_string());
            args.push(format!("{key}={value}"));
        }
        if !self.uses_host_network() {
            for port in &self.ports {
                args.push("-p".to_string());
                args.push(port.publish_arg());
            }
        }
        args.push(self.image.clone());
        args
    }
}

/// RADIUS 守护进程声明：认证/计费端口 1812/1813（TCP+UDP）对外开放。
///
/// 使用宿主机网络，守护进程经回环地址访问只监听本机的认证网关。
pub fn radius_daemon_spec(config: &AppConfig) -> ServiceSpec {
    let ports = [1812, 1813]
        .into_iter()
        .flat_map(|port| {
            [
                PortBinding::same(port, Protocol::Tcp, "0.0.0.0"),
                PortBinding::same(port, Protocol::Udp, "0.0.0.0"),
            ]
        })
        .collect();
    ServiceSpec {
        name: "freeradius".to_string(),
        image: config.daemon_image.clone(),
        env: vec![(
            "FREERADIUS_API_URL".to_string(),
            config.daemon_api_url.clone(),
        )],
        ports,
        network: Some(HOST_NETWORK.to_string()),
    }
}
