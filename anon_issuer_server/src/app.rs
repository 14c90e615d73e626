use std::sync::Arc;

use anon_issuer::{
    signature::{self, SignatureError},
    AnonymousIssuer, AuthorityLocator, IssuanceRequest, ScopeSource, SecureKey,
};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};

use crate::error::ApiError;

/// Shared state handed to every request
#[derive(Debug)]
pub struct AppState<S, L> {
    issuer: AnonymousIssuer<S, L>,
    secure_key: Option<SecureKey>,
}

impl<S, L> AppState<S, L> {
    /// Constructs the state for the issuer
    ///
    /// When `secure_key` is set, inbound requests must carry a matching
    /// signature.
    pub fn new(issuer: AnonymousIssuer<S, L>, secure_key: Option<SecureKey>) -> Self {
        Self { issuer, secure_key }
    }
}

/// Builds the router answering issuance requests
///
/// Requests are accepted on `/` and, when given, on `self_path`.
pub fn router<S, L>(state: AppState<S, L>, self_path: Option<&str>) -> Router
where
    S: ScopeSource + 'static,
    L: AuthorityLocator + 'static,
    L::Authority: 'static,
{
    let state = Arc::new(state);
    let endpoint = || post(issue_token::<S, L>).options(options);

    let mut router = Router::new().route("/", endpoint());

    if let Some(path) = self_path.map(|p| p.trim_matches('/')).filter(|p| !p.is_empty()) {
        router = router.route(&format!("/{path}"), endpoint());
    }

    router.with_state(state)
}

#[tracing::instrument(skip_all, fields(request.len = body.len()))]
async fn issue_token<S, L>(
    State(state): State<Arc<AppState<S, L>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError>
where
    S: ScopeSource,
    L: AuthorityLocator,
{
    if let Some(secret) = &state.secure_key {
        let provided = headers
            .get(signature::SIGNATURE_HEADER)
            .ok_or(SignatureError::Missing)?
            .to_str()
            .map_err(|_| SignatureError::Encoding)?;
        signature::verify(secret, &body, provided)?;
    }

    let request: IssuanceRequest = serde_json::from_slice(&body).map_err(ApiError::Body)?;

    let issued = state.issuer.issue(&request).await?;
    let status = StatusCode::from_u16(issued.code).unwrap_or(StatusCode::OK);

    Ok((status, Json(issued.answer)).into_response())
}

async fn options() -> impl IntoResponse {
    (StatusCode::NO_CONTENT, [(header::ALLOW, "OPTIONS, POST")])
}
