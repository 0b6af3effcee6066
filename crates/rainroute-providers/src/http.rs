//! Shared HTTP plumbing for the provider clients.

use crate::backoff::Backoff;
use crate::error::ProviderError;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// GET a JSON payload with a per-call timeout and bounded retries.
///
/// Only transient failures (transport, 5xx, 429) are retried; everything
/// else returns immediately. The timeout applies per attempt, never to the
/// whole retry sequence.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    params: &[(&str, String)],
    timeout: Duration,
    retry_attempts: u32,
) -> Result<T, ProviderError> {
    let mut backoff = Backoff::new(Duration::from_millis(500), Duration::from_secs(8));
    let mut attempt = 0u32;
    loop {
        match get_json_once(client, url, params, timeout).await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < retry_attempts => {
                attempt += 1;
                let delay = backoff.fail();
                tracing::warn!(
                    url,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "transient provider error, retrying: {err}"
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}

async fn get_json_once<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    params: &[(&str, String)],
    timeout: Duration,
) -> Result<T, ProviderError> {
    let response = client
        .get(url)
        .query(params)
        .timeout(timeout)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::Http(status));
    }

    response
        .json::<T>()
        .await
        .map_err(|err| ProviderError::Malformed(err.to_string()))
}
