use std::sync::Arc;

use anyhow::Result;
use taxcalc_core::{CalculatorRegistry, PeriodKey};
use tracing::{info, warn};

use tax_gateway::{server, telemetry, GatewayConfig, SchemaCache, Translator};

fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();
    telemetry::init_tracing();

    let config = GatewayConfig::from_env();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .max_blocking_threads(config.blocking_threads)
        .build()?;

    runtime.block_on(serve(config))
}

async fn serve(config: GatewayConfig) -> Result<()> {
    let registry = Arc::new(CalculatorRegistry::with_defaults());
    let supported: Vec<String> = registry
        .supported_periods()
        .iter()
        .map(ToString::to_string)
        .collect();
    info!("🧮 Calculators available: {}", supported.join(", "));

    let schemas = Arc::new(SchemaCache::new(registry.clone()));
    preload(&schemas, &config);

    let translator = Translator::new(schemas, registry);
    server::run_server(&config, translator).await
}

fn preload(schemas: &SchemaCache, config: &GatewayConfig) {
    for period in &config.preload {
        let resolved = PeriodKey::for_period(period.year, period.month)
            .map_err(anyhow::Error::from)
            .and_then(|key| schemas.schema(&key).map_err(anyhow::Error::from));
        match resolved {
            Ok(_) => info!("Preloaded schema for {}/{}", period.year, period.month),
            Err(e) => warn!("Could not preload {}/{}: {}", period.year, period.month, e),
        }
    }
}
