use std::time::Duration;

use serde::de::DeserializeOwned;

use veracity_common::types::ProviderId;

use crate::outcome::ProviderFailure;

/// Send a provider request and decode its JSON body.
///
/// Every failure mode (transport, timeout, non-2xx, bad body) maps onto a
/// `ProviderFailure`; nothing here panics.
pub(crate) async fn send_json<T: DeserializeOwned>(
    provider: ProviderId,
    request: reqwest::RequestBuilder,
    timeout: Duration,
) -> Result<T, ProviderFailure> {
    let start = std::time::Instant::now();

    let response = request.timeout(timeout).send().await.map_err(map_reqwest)?;

    let status = response.status();
    let latency = start.elapsed().as_secs_f64();
    metrics::histogram!("evidence.provider.latency", "provider" => provider.as_str())
        .record(latency);

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(
            provider = %provider,
            status = status.as_u16(),
            body = %body.chars().take(200).collect::<String>(),
            "Provider returned error status"
        );
        return Err(ProviderFailure::Status(status.as_u16()));
    }

    let body = response.text().await.map_err(map_reqwest)?;

    serde_json::from_str(&body).map_err(|e| ProviderFailure::Decode(e.to_string()))
}

fn map_reqwest(e: reqwest::Error) -> ProviderFailure {
    if e.is_timeout() {
        ProviderFailure::Timeout
    } else {
        ProviderFailure::Http(e.to_string())
    }
}
