//! 边缘代理运行配置加载。

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env: {0}")]
    Missing(String),
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// MQTT/TLS 默认端口。
pub const SECURE_RPC_PORT: u16 = 8883;
/// 明文 MQTT 默认端口（仅 insecure 模式）。
pub const INSECURE_RPC_PORT: u16 = 1883;

/// 后端 RPC 端点。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcEndpoint {
    pub host: String,
    pub port: u16,
    pub secure: bool,
}

/// 应用运行配置。
#[derive(Clone)]
pub struct AppConfig {
    /// 后端域名，`host[:port]`
    pub domain: String,
    /// 后端令牌，禁止写入日志
    pub token: String,
    pub cache_dir: PathBuf,
    pub insecure: bool,
    pub http_addr: String,
    pub rpc_topic_prefix: String,
    pub rpc_timeout_seconds: u64,
    pub sync_interval_seconds: u64,
    pub daemon_enabled: bool,
    pub daemon_image: String,
    pub daemon_api_url: String,
}

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        let domain = read_required("RADIUS_AGENT_DOMAIN")?;
        let token = read_required("RADIUS_AGENT_TOKEN")?;
        let cache_dir = env::var("RADIUS_AGENT_CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/var/lib/radius-agent"));
        let insecure = read_bool_with_default("RADIUS_AGENT_INSECURE", false);
        let http_addr =
            env::var("RADIUS_AGENT_HTTP_ADDR").unwrap_or_else(|_| "127.0.0.1:9999".to_string());
        let rpc_topic_prefix = env::var("RADIUS_AGENT_RPC_TOPIC_PREFIX")
            .map(|value| value.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| "radius/rpc".to_string());
        let rpc_timeout_seconds =
            read_positive_u64_with_default("RADIUS_AGENT_RPC_TIMEOUT_SECONDS", 30)?;
        let sync_interval_seconds =
            read_positive_u64_with_default("RADIUS_AGENT_SYNC_INTERVAL_SECONDS", 60)?;
        let daemon_enabled = read_bool_with_default("RADIUS_AGENT_DAEMON", true);
        let daemon_image = env::var("RADIUS_AGENT_DAEMON_IMAGE")
            .unwrap_or_else(|_| "freeradius/freeradius-server:latest".to_string());
        let daemon_api_url = env::var("RADIUS_AGENT_DAEMON_API_URL")
            .unwrap_or_else(|_| gateway_url(&http_addr));

        let config = Self {
            domain,
            token,
            cache_dir,
            insecure,
            http_addr,
            rpc_topic_prefix,
            rpc_timeout_seconds,
            sync_interval_seconds,
            daemon_enabled,
            daemon_image,
            daemon_api_url,
        };
        // 启动时即校验域名格式
        config.rpc_endpoint()?;
        Ok(config)
    }

    /// 由域名推导 RPC 端点；未显式给出端口时按 TLS 与否选择默认端口。
    pub fn rpc_endpoint(&self) -> Result<RpcEndpoint, ConfigError> {
        let domain = self
            .domain
            .trim()
            .trim_start_matches("mqtts://")
            .trim_start_matches("mqtt://")
            .trim_end_matches('/');
        let default_port = if self.insecure {
            INSECURE_RPC_PORT
        } else {
            SECURE_RPC_PORT
        };
        let invalid =
            || ConfigError::Invalid("RADIUS_AGENT_DOMAIN".to_string(), self.domain.clone());
        let parse_port = |port: &str| port.parse::<u16>().map_err(|_| invalid());
        // `[v6]`、`[v6]:port`；未加括号的 IPv6 字面量不含端口
        let (host, port) = if let Some(rest) = domain.strip_prefix('[') {
            let (host, tail) = rest.split_once(']').ok_or_else(invalid)?;
            match tail {
                "" => (host, default_port),
                _ => (host, parse_port(tail.strip_prefix(':').ok_or_else(invalid)?)?),
            }
        } else if domain.matches(':').count() > 1 {
            (domain, default_port)
        } else {
            match domain.rsplit_once(':') {
                Some((host, port)) => (host, parse_port(port)?),
                None => (domain, default_port),
            }
        };
        if host.is_empty() {
            return Err(ConfigError::Invalid(
                "RADIUS_AGENT_DOMAIN".to_string(),
                self.domain.clone(),
            ));
        }
        Ok(RpcEndpoint {
            host: host.to_string(),
            port,
            secure: !self.insecure,
        })
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_seconds)
    }

    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_seconds)
    }

    /// 守护进程日志目录。
    pub fn logs_dir(&self) -> PathBuf {
        self.cache_dir.join("logs")
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("domain", &self.domain)
            .field("token", &"<redacted>")
            .field("cache_dir", &self.cache_dir)
            .field("insecure", &self.insecure)
            .field("http_addr", &self.http_addr)
            .field("rpc_topic_prefix", &self.rpc_topic_prefix)
            .field("rpc_timeout_seconds", &self.rpc_timeout_seconds)
            .field("sync_interval_seconds", &self.sync_interval_seconds)
            .field("daemon_enabled", &self.daemon_enabled)
            .field("daemon_image", &self.daemon_image)
            .field("daemon_api_url", &self.daemon_api_url)
            .finish()
    }
}

/// 网关监听地址对应的本机访问 URL；通配地址换成回环地址。
pub fn gateway_url(http_addr: &str) -> String {
    let (host, port) = http_addr.rsplit_once(':').unwrap_or((http_addr, "80"));
    let host = match host {
        "" | "0.0.0.0" => "127.0.0.1",
        "[::]" => "[::1]",
        other => other,
    };
    format!("http://{host}:{port}")
}

fn read_required(key: &str) -> Result<String, ConfigError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(key.to_string())),
    }
}

fn read_positive_u64_with_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    match value.parse::<u64>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => Err(ConfigError::Invalid(key.to_string(), value)),
    }
}

fn read_bool_with_default(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "on"),
        Err(_) => default,
    }
}
