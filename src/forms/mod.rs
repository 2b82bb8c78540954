#[cfg(feature = "client")]
pub mod draft;
pub mod products;
