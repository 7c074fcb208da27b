pub mod notification;
pub mod provider;
pub mod request;
pub mod transaction;
pub mod user;

pub use notification::Notification;
pub use provider::{JobCategory, ProviderCard, ProviderInfos};
pub use request::{RequestStatus, ServiceRequest};
pub use transaction::{Transaction, TransactionStatus};
pub use user::{User, UserRole};
