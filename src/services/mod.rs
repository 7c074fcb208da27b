pub mod accounts;
pub mod booking;
pub mod catalog;
pub mod dashboard;
pub mod lifecycle;
pub mod notify;
pub mod payment;
