pub mod company_repository;
pub mod config;
pub mod database;
mod error;
pub mod inbound_repository;
pub mod logistics_object_repository;
pub mod user_repository;

pub use company_repository::CompanyRepository;
pub use config::DatabaseConfig;
pub use database::Database;
pub use inbound_repository::{InboundRepository, SaveOutcome};
pub use logistics_object_repository::LogisticsObjectRepository;
pub use user_repository::UserRepository;
