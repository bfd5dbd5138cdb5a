//! Demo command - writes a value through each provider and reads it back

use std::time::Duration;

use clap::Args;
use tracing::info;

use crate::domain::cache::{CacheProvider, CacheProviderExt};
use crate::infrastructure::observability::{MetricsConfig, init_metrics};

const DEMO_TTL: Duration = Duration::from_secs(60);

#[derive(Args, Debug, Default)]
pub struct DemoArgs {
    /// Print a Prometheus snapshot after the run
    #[arg(long)]
    pub metrics: bool,
}

pub async fn run(args: DemoArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;

    let metrics = if args.metrics {
        init_metrics(&MetricsConfig { enabled: true })
    } else {
        None
    };

    let factory = crate::build_factory(&config)?;

    for (index, name) in factory.names().iter().enumerate() {
        let key = format!("key{}", index + 1);

        match factory.get_provider(name.as_str()).await {
            Ok(provider) => {
                if let Err(error) = round_trip(provider, &key).await {
                    println!("{name}: {error}");
                }
            }
            Err(error) => println!("{name}: {error}"),
        }
    }

    if let Some(metrics) = metrics {
        println!("{}", metrics.render());
    }

    factory.shutdown();
    info!("Demo complete");

    Ok(())
}

async fn round_trip(provider: &dyn CacheProvider, key: &str) -> anyhow::Result<()> {
    let value = format!("{}-{}", provider.name(), key);

    provider.set(key, &value, Some(DEMO_TTL)).await?;
    let stored: Option<String> = provider.get(key).await?;
    let present = provider.exists(key).await?;

    println!(
        "{}: set {key}={value:?} (ttl {}s), get -> {stored:?}, exists -> {present}",
        provider.name(),
        DEMO_TTL.as_secs()
    );

    Ok(())
}
