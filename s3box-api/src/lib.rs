pub mod error;
pub use error::ApiError;

pub mod files;
pub mod identity;

#[cfg(feature = "client")]
pub mod client;
