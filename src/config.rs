//! Process configuration from the environment.

use std::env;
use std::net::SocketAddr;

use tracing::warn;

pub const BIND_VAR: &str = "TAX_GATEWAY_BIND";
pub const BLOCKING_THREADS_VAR: &str = "TAX_GATEWAY_BLOCKING_THREADS";
pub const PRELOAD_VAR: &str = "TAX_GATEWAY_PRELOAD";

const DEFAULT_BLOCKING_THREADS: usize = 64;

/// A period named in the preload list. Month 0 is the whole year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Listen address
    pub bind_addr: SocketAddr,
    /// Upper bound of the worker pool running request units
    pub blocking_threads: usize,
    /// Periods resolved into the schema cache at startup
    pub preload: Vec<Period>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            blocking_threads: DEFAULT_BLOCKING_THREADS,
            preload: Vec::new(),
        }
    }
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable source. Unparseable values keep
    /// their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let bind_addr = lookup(BIND_VAR)
            .and_then(|raw| match raw.trim().parse::<SocketAddr>() {
                Ok(addr) => Some(addr),
                Err(_) => {
                    warn!("Ignoring invalid {}='{}'", BIND_VAR, raw);
                    None
                }
            })
            .unwrap_or(defaults.bind_addr);

        let blocking_threads = lookup(BLOCKING_THREADS_VAR)
            .and_then(|raw| {
                let parsed = raw.trim().parse::<usize>().ok().filter(|n| (1..=1024).contains(n));
                if parsed.is_none() {
                    warn!("Ignoring invalid {}='{}'", BLOCKING_THREADS_VAR, raw);
                }
                parsed
            })
            .unwrap_or(defaults.blocking_threads);

        let preload = lookup(PRELOAD_VAR)
            .map(|raw| parse_preload(&raw))
            .unwrap_or_default();

        Self {
            bind_addr,
            blocking_threads,
            preload,
        }
    }
}

/// Parses `2021,2023/7`. Malformed entries are skipped.
pub fn parse_preload(raw: &str) -> Vec<Period> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| {
            let period = parse_period(entry);
            if period.is_none() {
                warn!("Skipping malformed preload entry '{}'", entry);
            }
            period
        })
        .collect()
}

fn parse_period(entry: &str) -> Option<Period> {
    let (year, month) = match entry.split_once('/') {
        Some((year, month)) => (year, month.parse().ok()?),
        None => (entry, 0),
    };
    Some(Period {
        year: year.parse().ok()?,
        month,
    })
}
