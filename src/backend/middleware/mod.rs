//! Middleware Module
//!
//! Request extractors shared by the handlers.
//!
//! - **`auth`** - [`AuthUser`] bearer token extractor
//! - **`extract`** - `Json`/`Path`/`Query` wrappers rejecting with
//!   [`BackendError`](crate::backend::error::BackendError)

pub mod auth;
pub mod extract;

pub use auth::{bearer_token, AuthUser};
pub use extract::{ApiJson, ApiPath, ApiQuery};
