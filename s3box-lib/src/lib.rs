pub mod error;
pub mod validation;
pub mod captcha;
pub mod role;
pub mod format;
