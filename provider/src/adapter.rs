pub mod open_meteo;

use serde::de::DeserializeOwned;
use std::{sync::LazyLock, time::Duration};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

static HTTP_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|e| {
            log::warn!("Falling back to default HTTP client: {e}");
            reqwest::Client::new()
        })
});

#[derive(thiserror::Error, Debug)]
pub enum AdapterError {
    #[error("{0}")]
    FetchError(#[from] reqwest::Error),
    #[error("Parsing: {0}")]
    ParseError(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl AdapterError {
    pub fn to_user_message(&self) -> &'static str {
        match self {
            AdapterError::InvalidRequest(err) => {
                log::error!("Adapter invalid request: {err}");
                "Weather service rejected the request. Check logs for details."
            }
            AdapterError::FetchError(err) => {
                log::error!("Adapter fetch error: {err}");
                "Network error while contacting the weather service."
            }
            AdapterError::ParseError(err) => {
                log::error!("Adapter parse error: {err}");
                "Unexpected response from the weather service. Check logs for details."
            }
        }
    }
}

async fn get_json<T: DeserializeOwned>(
    url: &str,
    query: &[(&str, String)],
) -> Result<T, AdapterError> {
    let resp = HTTP_CLIENT.get(url).query(query).send().await?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(AdapterError::InvalidRequest(format!(
            "{url} HTTP {status}: {body}"
        )));
    }

    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| AdapterError::ParseError(e.to_string()))
}
