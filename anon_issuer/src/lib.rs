//! Access tokens for anonymous callers
//!
//! This library grants the fixed `anonymous` identity a scope read from a
//! permission document on disk, asks an authorization authority to mint a token
//! for that scope, and hands the token back to the caller. The authority is not
//! configured statically; it is looked up in a routing directory on every
//! request.
//!
//! Each call to [`AnonymousIssuer::issue`] runs the same sequence:
//!
//! 1. the caller's `code` is checked for markup and script payloads,
//! 2. the permission document is loaded from a [`ScopeSource`],
//! 3. the token lifetime is resolved (caller, then service default, then none),
//! 4. the authority is located through an [`AuthorityLocator`],
//! 5. the scope is exchanged for a token with the located [`IssuingAuthority`].
//!
//! The first failing step ends the call with an [`IssueError`]. Nothing is
//! retried and no state is shared between calls.
//!
//! ```no_run
//! use anon_issuer::{
//!     authority::RouterLocator, scope::FileScopeSource, AnonymousIssuer, IssuanceRequest,
//!     IssuerConfig, Ttl,
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let locator = RouterLocator::new(
//!     reqwest::Client::new(),
//!     reqwest::Url::parse("http://router.local/")?,
//!     None,
//! );
//!
//! let issuer = AnonymousIssuer::new(
//!     FileScopeSource::new("./permissions.json"),
//!     locator,
//!     IssuerConfig::default().with_default_ttl(Some(Ttl::from_secs(3600))),
//! );
//!
//! let response = issuer.issue(&IssuanceRequest::default()).await?;
//! tracing::info!(token = %response.answer.access_token, "issued");
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
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

pub mod authority;
mod braids;
pub mod dto;
mod issuer;
pub mod scope;
pub mod signature;
mod ttl;
pub mod validate;

#[cfg(test)]
mod test_util;

pub use authority::{AuthorityLocator, IssuingAuthority};
pub use braids::*;
pub use dto::{
    AccessTokenAnswer, CredentialScopeRequest, ExpireAt, IssuanceRequest, IssuanceResponse,
};
pub use issuer::{AnonymousIssuer, IssueError, IssuerConfig, ANONYMOUS, AUTH_SERVICE};
pub use scope::{ScopeDocument, ScopeError, ScopeSource};
pub use ttl::{resolve_ttl, Ttl};
