//! An authority reached over HTTP

use async_trait::async_trait;
use thiserror::Error;

use super::{attach_signed_json, IssuingAuthority};
use crate::{AccessTokenAnswer, CredentialScopeRequest, SecureKey};

/// An error while asking the authority to issue a token
#[derive(Debug, Error)]
pub enum TokenRequestError {
    /// The authority answered with an error status
    #[error("authority responded with status {status}")]
    ErrorWithBody {
        /// The HTTP status code
        status: u16,
        /// The body of the error
        body: String,
    },
    /// The authority's answer could not be deserialized
    #[error("error deserializing token body from authority")]
    TokenBodyError(#[source] serde_json::Error),
    /// The request could not be serialized
    #[error("error serializing token request")]
    RequestBodyError(#[source] serde_json::Error),
    /// Unable to read the response
    #[error("error reading response body")]
    BodyReadError(#[source] reqwest::Error),
    /// Unable to send a token request to the authority
    #[error("error sending request to authority")]
    RequestSend(#[source] reqwest::Error),
}

/// A client bound to one located instance of the authority
#[derive(Clone, Debug)]
pub struct RemoteAuthority {
    client: reqwest::Client,
    url: reqwest::Url,
    secure_key: Option<SecureKey>,
}

impl RemoteAuthority {
    /// Constructs a client for the authority at `url`
    ///
    /// When `secure_key` is set, requests are signed with it.
    pub fn new(client: reqwest::Client, url: reqwest::Url, secure_key: Option<SecureKey>) -> Self {
        Self {
            client,
            url,
            secure_key,
        }
    }

    /// The authority's address
    pub fn url(&self) -> &reqwest::Url {
        &self.url
    }
}

#[async_trait]
impl IssuingAuthority for RemoteAuthority {
    #[tracing::instrument(
        skip(self, request),
        fields(
            authority.url = %self.url,
            credentials.login = %request.credentials.login,
            ttl = request.ttl.map(|ttl| ttl.as_secs()),
        ),
    )]
    async fn issue(
        &self,
        request: &CredentialScopeRequest,
    ) -> Result<AccessTokenAnswer, TokenRequestError> {
        tracing::trace!("requesting token from authority");

        let req = attach_signed_json(
            self.client.post(self.url.clone()),
            request,
            self.secure_key.as_deref(),
        )
        .map_err(TokenRequestError::RequestBodyError)?;
        let resp = req.send().await.map_err(TokenRequestError::RequestSend)?;

        let status = resp.status();
        tracing::debug!(
            response.status = status.as_u16(),
            "received token response from issuing authority"
        );

        let body = resp
            .bytes()
            .await
            .map_err(TokenRequestError::BodyReadError)?;

        if !status.is_success() {
            return Err(TokenRequestError::ErrorWithBody {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let answer: AccessTokenAnswer =
            serde_json::from_slice(&body).map_err(TokenRequestError::TokenBodyError)?;

        tracing::debug!(expire_at = %answer.expire_at.0, "received new access token");

        Ok(answer)
    }
}
