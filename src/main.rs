use coreguide::GuidanceConfig;
use coreguide::GuidanceDispatcher;

/// Diagnostic entry point: detect providers and print status plus the
/// available model list as JSON. The interactive questionnaire UI drives the
/// library directly; this binary exists for configuration troubleshooting.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    dotenvy::dotenv().ok();

    let config = GuidanceConfig::detect().await;
    let dispatcher = GuidanceDispatcher::new(config);

    let status = dispatcher.provider_status();
    println!("{}", serde_json::to_string_pretty(&status)?);

    match dispatcher.list_available_models().await {
        Ok(models) => {
            println!("{}", serde_json::to_string_pretty(&models)?);
        }
        Err(e) => {
            tracing::warn!("could not list models: {}", e.user_message());
        }
    }

    Ok(())
}
