pub mod credentials;
pub mod error;
pub mod logistics;
pub mod models;
pub mod subscription;

pub use credentials::{Claims, IssuedToken, TokenIssuer};
pub use error::AppError;
pub use logistics::LogisticsObjectType;
pub use models::{
    Company, InboundLogisticsObject, LogisticsObject, NewCompany, NewInboundLogisticsObject,
    NewLogisticsObject, NewUser, User, compute_hash,
};
pub use subscription::Subscription;
