use reqwest::Client;
use std::time::Duration;

use crate::config::HttpConfig;

pub const DEFAULT_USER_AGENT: &str = "RelayStash/1.0";

/// Client used by teloxide to talk to the Bot API.
pub fn create_telegram_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    let builder = Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .pool_idle_timeout(Duration::from_secs(60))
        .tcp_keepalive(Duration::from_secs(30))
        .user_agent(DEFAULT_USER_AGENT);

    build_client(builder, config.proxy.as_deref())
}

/// Plain client for uploads outside the bot's own traffic.
pub fn create_upload_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    let builder = Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs.max(30)))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .user_agent(DEFAULT_USER_AGENT);

    build_client(builder, config.proxy.as_deref())
}

fn build_client(builder: reqwest::ClientBuilder, proxy: Option<&str>) -> Result<Client, reqwest::Error> {
    match proxy {
        Some(proxy_url) => {
            info!("Configuring client with proxy {}", proxy_url);
            builder.proxy(reqwest::Proxy::all(proxy_url)?).build()
        }
        None => builder.build(),
    }
}
