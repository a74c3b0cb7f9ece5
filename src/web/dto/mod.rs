//! Data Transfer Objects for Web API.

pub mod request;
pub mod response;
pub mod validation;

pub use request::*;
pub use response::*;
pub use validation::{ValidatedJson, ValidatedJsonOrDefault};
