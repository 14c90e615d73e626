//! Locating the authorization authority and exchanging scopes for tokens

use async_trait::async_trait;
use serde::Serialize;

use crate::{signature, AccessTokenAnswer, CredentialScopeRequest, SecureKeyRef, ServiceNameRef};

pub mod remote;
pub mod router;

pub use remote::{RemoteAuthority, TokenRequestError};
pub use router::{LocateError, RouteRecord, RouterLocator};

/// An authority able to mint tokens for a scope
#[async_trait]
pub trait IssuingAuthority: Send + Sync {
    /// Asks the authority for a token granting the requested scope
    async fn issue(
        &self,
        request: &CredentialScopeRequest,
    ) -> Result<AccessTokenAnswer, TokenRequestError>;
}

/// Finds a live instance of a service
#[async_trait]
pub trait AuthorityLocator: Send + Sync {
    /// The client handle produced for a located instance
    type Authority: IssuingAuthority;

    /// Looks up a live instance of `service`
    async fn locate(&self, service: &ServiceNameRef) -> Result<Self::Authority, LocateError>;
}

/// Serializes `payload` as the JSON body of `request`, signing it when a
/// secret is known
fn attach_signed_json<S: Serialize>(
    request: reqwest::RequestBuilder,
    payload: &S,
    secret: Option<&SecureKeyRef>,
) -> Result<reqwest::RequestBuilder, serde_json::Error> {
    let body = serde_json::to_vec(payload)?;

    let request = match secret {
        Some(secret) => request.header(signature::SIGNATURE_HEADER, signature::sign(secret, &body)),
        None => request,
    };

    Ok(request
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body(body))
}
