use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::AppError;
use crate::logistics::LogisticsObjectType;

/// Path on which a subscriber receives published logistics objects.
pub const CALLBACK_PATH: &str = "callbackUrl";

/// Header carrying the subscription secret on callback deliveries.
pub const SUBSCRIPTION_SECRET_HEADER: &str = "x-subscription-secret";

/// What a publisher needs to push logistics objects of one topic to a subscriber.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub topic: LogisticsObjectType,
    pub callback_url: String,
    pub secret: String,
    pub subscribe_to_status_updates: bool,
    pub send_logistics_object_body: bool,
}

impl Subscription {
    /// Describe this server's subscription for `topic`.
    pub fn for_topic(
        public_url: &Url,
        topic: LogisticsObjectType,
        secret: &str,
    ) -> Result<Self, AppError> {
        let callback_url = public_url
            .join(CALLBACK_PATH)
            .map_err(|e| AppError::ConfigError(format!("Invalid public URL: {e}")))?;

        Ok(Self {
            topic,
            callback_url: callback_url.to_string(),
            secret: secret.to_string(),
            subscribe_to_status_updates: false,
            send_logistics_object_body: true,
        })
    }
}
