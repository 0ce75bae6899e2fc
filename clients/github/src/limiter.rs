use crate::payload::RateLimit;
use crate::payload::RateWindow;
use chrono::Utc;
use log::debug;
use log::info;
use log::warn;
use reqwest::Client;
use std::time::Duration;

/// Remaining-quota floor below which we wait for the window to reset.
const QUOTA_FLOOR: u32 = 10;

/// Best-effort throttle. Polls the live `/rate_limit` endpoint before every
/// outbound call and sleeps until the reported reset when the window is
/// nearly exhausted. A race between the check and the following call can
/// still exceed the quota; nothing here is a hard guarantee.
pub(crate) struct RateLimiter {
    client: Client,
    rate_limit_url: String,
}

impl RateLimiter {
    pub(crate) fn new(client: Client, github_url: &str) -> Self {
        RateLimiter {
            client,
            rate_limit_url: format!("{}/rate_limit", github_url),
        }
    }

    pub(crate) async fn wait_for_quota(&self) {
        match self.current_window().await {
            Ok(window) if window.remaining < QUOTA_FLOOR => {
                let delay = window.reset - Utc::now().timestamp();
                if delay > 0 {
                    info!(
                        "Rate limit nearly exhausted ({} remaining). Sleeping {} sec until reset.",
                        window.remaining, delay
                    );
                    tokio::time::sleep(Duration::from_secs(delay as u64)).await;
                }
            }
            Ok(window) => debug!("Remaining limit {}. Not waiting.", window.remaining),
            // Quota state is advisory; a failed read must not block the run.
            Err(error) => warn!("Could not read rate limit, proceeding: {}", error),
        }
    }

    async fn current_window(&self) -> reqwest::Result<RateWindow> {
        let response = self
            .client
            .get(&self.rate_limit_url)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json::<RateLimit>().await?.rate)
    }
}
