pub mod cli;
pub mod core;
pub mod providers;

use crate::core::config::AppConfig;
use crate::core::market::MarketDataProvider;
use crate::core::view::Tab;
use crate::providers::data912::Data912Provider;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub enum AppCommand {
    Show { tab: Tab, search: Option<String> },
    Calc { amount: String },
    Watch,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("argdash starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let provider: Arc<dyn MarketDataProvider> = Arc::new(Data912Provider::new(config.base_url())?);

    match command {
        AppCommand::Show { tab, search } => {
            cli::show::run(provider.as_ref(), &config, tab, search.as_deref()).await
        }
        AppCommand::Calc { amount } => cli::show::calc(provider.as_ref(), &config, &amount).await,
        AppCommand::Watch => cli::dashboard::run(provider, &config).await,
    }
}
