use anyhow::Context;
use livraria_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load livraria settings")?;
    livraria_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        backend = ?settings.database.backend,
        "livraria-app bootstrap starting"
    );

    livraria_app::bootstrap::run(settings).await
}
