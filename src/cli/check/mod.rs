//! Check command - eagerly constructs every provider

use anyhow::bail;
use tracing::info;

pub async fn run() -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let factory = crate::build_factory(&config)?;

    let results = factory.warm_up().await;
    let mut failed = 0;

    for (name, result) in &results {
        let kind = factory
            .definition_kind(name.as_str())
            .map(|kind| kind.to_string())
            .unwrap_or_default();

        match result {
            Ok(()) => println!("ok      {name} ({kind})"),
            Err(error) => {
                failed += 1;
                println!("failed  {name} ({kind}): {error}");
            }
        }
    }

    factory.shutdown();

    if failed > 0 {
        bail!("{failed} of {} cache providers failed to start", results.len());
    }

    info!(providers = results.len(), "All cache providers constructed");
    Ok(())
}
