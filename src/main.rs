use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vk_telegram_relay::config::Config;
use vk_telegram_relay::relay::Relay;
use vk_telegram_relay::telegram::TelegramClient;
use vk_telegram_relay::vk::VkClient;
use vk_telegram_relay::watermark::Watermark;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    init_tracing()?;

    info!("Starting vk-telegram-relay");

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    info!(
        domain = %config.domain,
        channel = %config.channel,
        count = config.count,
        include_link = config.include_link,
        preview_link = config.preview_link,
        reposts = config.reposts,
        "Configuration loaded"
    );

    let watermark = Watermark::load(config.watermark_key, &config.last_post_path)
        .await
        .context("Failed to load watermark")?;
    info!(
        path = %watermark.path().display(),
        value = ?watermark.value(),
        "Watermark ready"
    );

    let vk = Arc::new(VkClient::new(&config));
    let telegram = Arc::new(TelegramClient::new(&config));
    let mut relay = Relay::new(config.clone(), vk.clone(), telegram, vk);

    if !config.resend_posts.is_empty() {
        match relay.resend_posts(&config.resend_posts).await {
            Ok(sent) => info!(sent, "Resend finished"),
            Err(e) => warn!("Resend failed: {e:#}"),
        }
    }

    tokio::select! {
        () = relay.run(watermark) => {},
        () = shutdown_signal() => info!("Shutting down..."),
    }

    info!("Shutdown complete");

    Ok(())
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,vk_telegram_relay=debug"));

    let use_json = matches!(
        std::env::var("LOG_FORMAT").map(|v| v.to_lowercase()).as_deref(),
        Ok("json" | "structured")
    );
    let (json_layer, text_layer) = if use_json {
        (Some(tracing_subscriber::fmt::layer().json()), None)
    } else {
        (None, Some(tracing_subscriber::fmt::layer()))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .context("Failed to initialize tracing")?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
