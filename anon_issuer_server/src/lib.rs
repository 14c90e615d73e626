//! HTTP front end for [`anon_issuer`]
//!
//! Exposes a single issuance endpoint. A `POST` carrying an
//! [`IssuanceRequest`][anon_issuer::IssuanceRequest] body is answered with
//! `{"accessToken": ..., "expireAt": ...}`; failures are answered with
//! `{"message": ...}` and a status chosen by the step that failed.

#![warn(
    missing_docs,
    unused_import_braces,
    unused_imports,
    unused_qualifications
)]
#![deny(
    missing_debug_implementations,
    trivial_numeric_casts,
    unsafe_code,
    unused_must_use
)]

mod app;
pub mod config;
mod error;

pub use app::{router, AppState};
pub use config::Opts;
pub use error::ApiError;
