//! Logging setup.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

pub const DEFAULT_FILTER: &str = "tax_gateway=info,taxcalc_core=info,tower_http=info";

/// Installs the global subscriber. `RUST_LOG` overrides [`DEFAULT_FILTER`].
/// Calling it again once a subscriber is set is a no-op.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = Registry::default()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init();
}
