pub mod category;
pub mod notice;
pub mod pricing;
pub mod product;
pub mod types;
pub mod upload;
pub mod user;
