mod assets;
mod builder;
mod card;
mod config;
mod layout;
mod publish;
mod rarity;
mod shop;
mod util;

use std::time::Duration;

use tracing::{error, info};

use crate::config::Config;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    info!("Athena - Fortnite item shop generator");

    let config = match Config::load(None) {
        Ok(config) => {
            info!("Loaded configuration");
            config
        }
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    if config.delay_start > 0 {
        info!("Delaying process start for {}s...", config.delay_start);
        tokio::time::sleep(Duration::from_secs(config.delay_start)).await;
    }

    let http = reqwest::Client::new();

    let response = match shop::fetch(&http, &config.fortnite_api.api_key, &config.language).await {
        Ok(response) => response,
        Err(e) => {
            error!("failed to fetch item shop: {e}");
            std::process::exit(1);
        }
    };

    let date = util::human_date(chrono::Local::now().date_naive());
    info!("Retrieved item shop for {date}");

    if let Err(e) = builder::build(&http, &date, response).await {
        error!("{e}");
        std::process::exit(1);
    }

    if config.twitter.enabled {
        if let Err(e) = publish::tweet(
            &http,
            &config.twitter,
            &date,
            config.support_a_creator.as_deref(),
            builder::OUTPUT_FILE,
        )
        .await
        {
            error!("failed to publish item shop: {e}");
        }
    }
}
