use std::sync::Arc;

use anyhow::Result;
use chat_relay::{logger, start_web_server, AppConfig, MessageRelay};
use clap::Parser;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    logger::init();

    let cfg = AppConfig::parse();
    info!(version = chat_relay::VERSION, "starting chat relay");

    let relay = Arc::new(MessageRelay::from_config(cfg.providers.clone())?);
    start_web_server(&cfg.bind_addr(), relay).await?;

    info!("chat relay stopped");
    Ok(())
}
