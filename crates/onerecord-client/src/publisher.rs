use std::time::Duration;

use reqwest::{Client, Response};
use serde::Deserialize;
use url::Url;
use uuid::Uuid;

use onerecord_core::error::AppError;
use onerecord_core::logistics::{LogisticsObjectType, type_of};
use onerecord_core::subscription::{SUBSCRIPTION_SECRET_HEADER, Subscription};

/// What a subscriber answers to a delivery.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryReceipt {
    pub id: Uuid,
    pub topic: String,
    pub duplicate: bool,
}

/// HTTP client for the publishing side of publish/subscribe.
///
/// Asks a subscriber server for its subscription information, then pushes
/// logistics objects to the callback URL it returned.
#[derive(Clone)]
pub struct SubscriberClient {
    client: Client,
    timeout_secs: u64,
}

impl SubscriberClient {
    pub fn new() -> Result<Self, AppError> {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, AppError> {
        let timeout_secs = timeout.as_secs();
        let client = Client::builder()
            .user_agent(concat!("onerecord-client/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            timeout_secs,
        })
    }

    /// `GET {server_url}/serverInformation?topic=...`
    pub async fn fetch_subscription(
        &self,
        server_url: &str,
        topic: LogisticsObjectType,
    ) -> Result<Subscription, AppError> {
        let mut url = parse_http_url(server_url)?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        let mut url = url
            .join("serverInformation")
            .map_err(|e| AppError::HttpError(format!("Invalid URL: {e}")))?;
        url.query_pairs_mut().append_pair("topic", topic.as_str());

        tracing::debug!(%url, "Fetching subscription information");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        let response = ensure_success(response, &url).await?;

        let subscription: Subscription = response.json().await.map_err(|e| {
            AppError::HttpError(format!("Invalid subscription information from {url}: {e}"))
        })?;

        if subscription.topic != topic {
            return Err(AppError::HttpError(format!(
                "Subscriber answered for topic {} instead of {topic}",
                subscription.topic
            )));
        }

        Ok(subscription)
    }

    /// POST a logistics object to the subscription's callback URL.
    pub async fn deliver(
        &self,
        subscription: &Subscription,
        document: &serde_json::Value,
    ) -> Result<DeliveryReceipt, AppError> {
        let lo_type = type_of(document)?;
        if lo_type != subscription.topic {
            return Err(AppError::ValidationError(format!(
                "Logistics object is a {lo_type}, but the subscription is for {}",
                subscription.topic
            )));
        }

        let url = parse_http_url(&subscription.callback_url)?;

        let response = self
            .client
            .post(url.clone())
            .header(SUBSCRIPTION_SECRET_HEADER, &subscription.secret)
            .json(document)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        let response = ensure_success(response, &url).await?;

        let receipt: DeliveryReceipt = response
            .json()
            .await
            .map_err(|e| AppError::HttpError(format!("Invalid delivery receipt from {url}: {e}")))?;

        tracing::info!(
            %url,
            id = %receipt.id,
            duplicate = receipt.duplicate,
            "Logistics object delivered"
        );

        Ok(receipt)
    }

    fn map_send_error(&self, e: reqwest::Error) -> AppError {
        if e.is_timeout() {
            AppError::Timeout(self.timeout_secs)
        } else if e.is_connect() {
            AppError::NetworkError(format!("Connection failed: {e}"))
        } else {
            AppError::HttpError(e.to_string())
        }
    }
}

async fn ensure_success(response: Response, url: &Url) -> Result<Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(AppError::HttpError(format!(
        "HTTP {} from {url}: {}",
        status.as_u16(),
        body.trim()
    )))
}

/// Parse a URL, accepting only `http` and `https`.
fn parse_http_url(raw: &str) -> Result<Url, AppError> {
    let parsed = Url::parse(raw).map_err(|e| AppError::HttpError(format!("Invalid URL: {e}")))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(AppError::HttpError(format!(
            "URL scheme '{scheme}' is not allowed (only http/https)"
        ))),
    }
}
