//! HTTP handlers.

pub mod convert;
pub mod form;
pub mod health;

pub use convert::convert;
pub use form::index;
pub use health::health;
