pub mod publisher;

pub use publisher::{DeliveryReceipt, SubscriberClient};
