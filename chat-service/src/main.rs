use chat_service::config::ChatConfig;
use chat_service::handlers::health::SERVICE_NAME;
use chat_service::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ChatConfig::load()?;

    init_tracing(
        SERVICE_NAME,
        &config.common.log_level,
        config.common.otlp_endpoint.as_deref(),
    );

    let application = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to start chat-service: {}", e);
        e
    })?;
    application.run_until_stopped().await?;

    Ok(())
}
