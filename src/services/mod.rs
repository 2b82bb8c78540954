pub mod account;
pub mod categories;
pub mod errors;
pub mod products;
pub mod submission;
pub mod uploads;

pub use errors::{ServiceError, ServiceResult};
