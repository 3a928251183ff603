use std::{sync::Arc, time::Duration};

use reqwest::{
    header::{self, HeaderMap, HeaderValue},
    Client, RequestBuilder, Response,
};
use url::Url;

use crate::config::{HttpConfig, RetryPolicy};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:97.0) Gecko/20100101 Firefox/97.0";

/// Shared client for the scraping endpoints. Requests look like they come
/// from a desktop browser and timeouts are retried.
#[derive(Clone)]
pub struct HttpService {
    client: Client,
    retry: RetryPolicy,
}

impl HttpService {
    pub fn new(config: &HttpConfig, retry: RetryPolicy) -> Result<Self, reqwest::Error> {
        let cookie_jar = Arc::new(reqwest::cookie::Jar::default());

        let mut builder = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .cookie_provider(cookie_jar)
            .default_headers(Self::browser_headers());

        if let Some(proxy) = &config.proxy {
            info!("Routing provider requests through {}", proxy);
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }

        Ok(Self {
            client: builder.build()?,
            retry,
        })
    }

    fn browser_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
        headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Sends `request`, sleeping and retrying while it times out.
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, reqwest::Error> {
        let mut attempt = 1;
        loop {
            let Some(current) = request.try_clone() else {
                // Streaming bodies can't be replayed
                return request.send().await;
            };

            match current.send().await {
                Err(e) if e.is_timeout() && attempt < self.retry.attempts => {
                    warn!(
                        "Request timed out (attempt {}/{}), retrying in {:?}",
                        attempt, self.retry.attempts, self.retry.delay
                    );
                    tokio::time::sleep(self.retry.delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    /// Size in bytes advertised by a `HEAD` request, 0 when unknown.
    pub async fn file_size(&self, url: &Url) -> u64 {
        let response = match self.send(self.client.head(url.as_str())).await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                debug!("HEAD {} returned {}", url, response.status());
                return 0;
            }
            Err(e) => {
                debug!("HEAD {} failed: {}", url, e);
                return 0;
            }
        };

        content_length(response.headers())
    }
}

fn content_length(headers: &HeaderMap) -> u64 {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0)
}
