use std::time::Duration;

use tracing::warn;

/// Process configuration, resolved once at startup and threaded through the
/// endpoint and workers via shared state.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Raw server identity as configured, if any. Kept unparsed so the
    /// display page can show whatever was set even when it is not a number.
    pub server_identity: Option<String>,
    pub num_workers: usize,
    pub worker_delay: Duration,
    /// Server ids that get a dedicated store; anything else routes to the
    /// default store.
    pub configured_servers: Vec<i64>,
    pub bind_addr: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_identity: None,
            num_workers: 2,
            worker_delay: Duration::from_millis(10_000),
            configured_servers: vec![1, 2],
            bind_addr: "[::]:8080".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let server_identity = std::env::var("SERVER_ID").ok();
        let num_workers = parse_env("NUM_WORKERS", defaults.num_workers);
        let delay_ms = parse_env("WORKER_DELAY_MS", 10_000u64);
        let configured_servers = match std::env::var("CONFIGURED_SERVERS") {
            Ok(raw) => parse_server_list(&raw).unwrap_or_else(|| {
                warn!("CONFIGURED_SERVERS {:?} is not a comma-separated id list, using defaults", raw);
                defaults.configured_servers.clone()
            }),
            Err(_) => defaults.configured_servers.clone(),
        };
        let bind_addr = std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr);
        Self {
            server_identity,
            num_workers,
            worker_delay: Duration::from_millis(delay_ms),
            configured_servers,
            bind_addr,
        }
    }

    /// Server identity as an integer, if the configured value parses as one.
    pub fn server_id(&self) -> Option<i64> {
        self.server_identity.as_deref().and_then(|raw| raw.trim().parse().ok())
    }

    /// Server id used when enqueuing a task. Unset identity submits as server 1.
    pub fn submit_server_id(&self) -> i64 {
        self.server_id().unwrap_or(1)
    }

    /// Identity shown on the display page.
    pub fn server_label(&self) -> String {
        self.server_identity.clone().unwrap_or_else(|| "Unknown".to_string())
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} {:?} did not parse, using default", name, raw);
            default
        }),
        Err(_) => default,
    }
}

fn parse_server_list(raw: &str) -> Option<Vec<i64>> {
    raw.split(',')
        .map(|part| part.trim().parse().ok())
        .collect()
}
