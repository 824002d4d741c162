use shortlink_service::{config, server, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = config::load_from_env()?;
    config.validate_server()?;

    telemetry::init(&config.log_level, &config.log_format);
    config.print_summary();

    server::run(config).await
}
