use rand::Rng;
use shared::CLIENT_VERSION;
use std::time::Duration;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8766;
pub const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(20);
pub const DEFAULT_PING_TIMEOUT: Duration = Duration::from_secs(20);

/// Where to connect and who to connect as
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub nickname: String,
    pub client_version: String,
    /// How often to ping the server while the session is active
    pub ping_interval: Duration,
    /// How long a ping may go unanswered before the connection is dropped
    pub ping_timeout: Duration,
}

impl ConnectionConfig {
    pub fn new(host: impl Into<String>, port: u16, nickname: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            nickname: nickname.into(),
            client_version: CLIENT_VERSION.to_string(),
            ping_interval: DEFAULT_PING_INTERVAL,
            ping_timeout: DEFAULT_PING_TIMEOUT,
        }
    }

    pub fn url(&self) -> String {
        format!("ws://{}:{}", self.host, self.port)
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT, generate_nickname())
    }
}

// Randomized once per process; not persisted.
pub fn generate_nickname() -> String {
    format!("CoolCat{}", rand::thread_rng().gen_range(100..=999))
}
