//! DTOs exchanged with callers and with the authorization authority

use serde::{Deserialize, Serialize};

use crate::{validate, AccessToken, Login, ScopeDocument, Ttl, ANONYMOUS};

/// A caller's request for an anonymous token
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct IssuanceRequest {
    /// Opaque caller-supplied value, checked for unsafe content
    #[serde(default)]
    pub code: String,

    /// The lifetime the caller would like the token to have
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<Ttl>,
}

impl IssuanceRequest {
    /// Checks caller-supplied fields for markup and script payloads
    pub fn validate(&self) -> Result<(), validate::ValidationError> {
        validate::check_code(&self.code)
    }

    /// The lifetime requested by the caller
    ///
    /// A zero lifetime counts as no request.
    pub fn requested_ttl(&self) -> Option<Ttl> {
        self.ttl.filter(|ttl| !ttl.is_zero())
    }
}

/// The login the authority sees
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Credentials {
    /// The login name
    pub login: Login,
}

/// A request asking the authority to mint a token for a scope
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct CredentialScopeRequest {
    /// Who the token is for
    pub credentials: Credentials,

    /// What the token grants
    pub scope: ScopeDocument,

    /// How long the token should live; omitted to let the authority decide
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<Ttl>,
}

impl CredentialScopeRequest {
    /// Constructs a request granting `scope` to the anonymous login
    pub fn anonymous(scope: ScopeDocument) -> Self {
        Self {
            credentials: Credentials {
                login: Login::from_static(ANONYMOUS),
            },
            scope,
            ttl: None,
        }
    }

    /// Sets the lifetime to request
    pub fn with_ttl(mut self, ttl: Option<Ttl>) -> Self {
        self.ttl = ttl;
        self
    }
}

/// Token expiry, exactly as reported by the authority
///
/// The authority decides the representation; the value is relayed without
/// being interpreted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ExpireAt(pub serde_json::Value);

/// The parts of the authority's answer that are relayed to the caller
///
/// Anything else the authority sends back is dropped when deserializing.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenAnswer {
    /// The minted token
    pub access_token: AccessToken,

    /// When the token stops being valid
    pub expire_at: ExpireAt,
}

/// The caller-facing result of a successful issuance
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct IssuanceResponse {
    /// Status code to report to the caller
    pub code: u16,

    /// The token and its expiry
    pub answer: AccessTokenAnswer,
}

impl IssuanceResponse {
    /// Status code reported with every successful issuance
    pub const OK: u16 = 200;

    /// Wraps an answer from the authority with the success status
    pub fn ok(answer: AccessTokenAnswer) -> Self {
        Self {
            code: Self::OK,
            answer,
        }
    }
}
