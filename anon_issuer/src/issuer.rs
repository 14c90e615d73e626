use std::{error, io};

use thiserror::Error;

use crate::{
    authority::{LocateError, TokenRequestError},
    resolve_ttl,
    validate::ValidationError,
    AuthorityLocator, CredentialScopeRequest, IssuanceRequest, IssuanceResponse, IssuingAuthority,
    ScopeError, ScopeSource, ServiceName, Ttl,
};

/// The login every token is issued to
pub const ANONYMOUS: &str = "anonymous";

/// The service name the authority registers under by default
pub const AUTH_SERVICE: &str = "auth";

/// The reason an issuance did not produce a token
#[derive(Debug, Error)]
pub enum IssueError {
    /// The caller's input was rejected
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The permission document could not be read
    #[error(transparent)]
    ScopeUnavailable(io::Error),
    /// The permission document could not be parsed
    #[error("failed to load role permissions")]
    ScopeMalformed,
    /// No instance of the authority could be located
    #[error("authorization authority unreachable: {0}")]
    AuthorityUnreachable(LocateError),
    /// The authority was reached but did not issue a token
    #[error("authority failed to issue token")]
    IssuanceFailed(#[source] TokenRequestError),
}

impl From<ScopeError> for IssueError {
    fn from(err: ScopeError) -> Self {
        match err {
            ScopeError::Unavailable(err) => Self::ScopeUnavailable(err),
            ScopeError::Malformed => Self::ScopeMalformed,
        }
    }
}

impl From<LocateError> for IssueError {
    fn from(err: LocateError) -> Self {
        Self::AuthorityUnreachable(err)
    }
}

/// Service-wide settings for issuing anonymous tokens
#[derive(Clone, Debug)]
pub struct IssuerConfig {
    default_ttl: Option<Ttl>,
    authority_service: ServiceName,
}

impl Default for IssuerConfig {
    /// No default lifetime, with the authority registered as `auth`
    fn default() -> Self {
        Self {
            default_ttl: None,
            authority_service: ServiceName::from_static(AUTH_SERVICE),
        }
    }
}

impl IssuerConfig {
    /// Sets the lifetime requested when the caller does not ask for one
    pub fn with_default_ttl(mut self, default_ttl: Option<Ttl>) -> Self {
        self.default_ttl = default_ttl;
        self
    }

    /// Sets the name the authority is registered under
    pub fn with_authority_service(mut self, service: ServiceName) -> Self {
        self.authority_service = service;
        self
    }

    /// The lifetime requested when the caller does not ask for one
    pub fn default_ttl(&self) -> Option<Ttl> {
        self.default_ttl
    }

    /// The name the authority is registered under
    pub fn authority_service(&self) -> &ServiceName {
        &self.authority_service
    }
}

/// Issues tokens for anonymous callers
///
/// The issuer holds no per-request state and can be shared freely between
/// concurrent requests.
#[derive(Debug)]
pub struct AnonymousIssuer<S, L> {
    scope_source: S,
    locator: L,
    config: IssuerConfig,
}

impl<S, L> AnonymousIssuer<S, L> {
    /// Constructs a new issuer
    pub fn new(scope_source: S, locator: L, config: IssuerConfig) -> Self {
        Self {
            scope_source,
            locator,
            config,
        }
    }

    /// The service-wide settings in use
    pub fn config(&self) -> &IssuerConfig {
        &self.config
    }
}

impl<S: ScopeSource, L: AuthorityLocator> AnonymousIssuer<S, L> {
    /// Runs one issuance from validation to the authority's answer
    ///
    /// # Errors
    ///
    /// Returns the first failure encountered. Later steps do not run once one
    /// has failed.
    #[tracing::instrument(
        skip_all,
        fields(
            ttl.requested = request.requested_ttl().map(Ttl::as_secs),
            ttl.resolved = tracing::field::Empty,
        ),
    )]
    pub async fn issue(&self, request: &IssuanceRequest) -> Result<IssuanceResponse, IssueError> {
        request.validate().map_err(|error| {
            tracing::debug!(%error, "rejected issuance request");
            error
        })?;

        let scope = self.scope_source.load_scope().await?;

        let ttl = resolve_ttl(request.requested_ttl(), self.config.default_ttl);
        if let Some(ttl) = ttl {
            tracing::Span::current().record("ttl.resolved", ttl.as_secs());
        }
        let scope_request = CredentialScopeRequest::anonymous(scope).with_ttl(ttl);

        let authority = self.locator.locate(&self.config.authority_service).await?;

        let answer = authority.issue(&scope_request).await.map_err(|error| {
            tracing::info!("authority rejected token issuance");
            tracing::debug!(
                error = (&error as &dyn error::Error),
                detail = ?error,
                "authority token issuance failure detail"
            );
            IssueError::IssuanceFailed(error)
        })?;

        tracing::info!(expire_at = %answer.expire_at.0, "issued anonymous token");

        Ok(IssuanceResponse::ok(answer))
    }
}
