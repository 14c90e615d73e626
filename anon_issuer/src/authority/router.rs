//! Locating services through the routing directory

use async_trait::async_trait;
use once_cell::sync::Lazy;
use rand::Rng;
use reqwest::Method;
use serde::Deserialize;
use thiserror::Error;

use super::{attach_signed_json, AuthorityLocator, RemoteAuthority};
use crate::{SecureKey, ServiceName, ServiceNameRef};

static SEARCH: Lazy<Method> =
    Lazy::new(|| Method::from_bytes(b"SEARCH").expect("SEARCH is a valid method token"));

/// An error while looking up a service in the routing directory
#[derive(Debug, Error)]
pub enum LocateError {
    /// The directory answered with an error status
    #[error("routing directory responded with status {status}")]
    ErrorWithBody {
        /// The HTTP status code
        status: u16,
        /// The body of the error
        body: String,
    },
    /// The directory's answer could not be deserialized
    #[error("error deserializing routes from directory")]
    RoutesBodyError(#[source] serde_json::Error),
    /// The lookup request could not be serialized
    #[error("error serializing directory lookup")]
    RequestBodyError(#[source] serde_json::Error),
    /// Unable to read the response
    #[error("error reading directory response body")]
    BodyReadError(#[source] reqwest::Error),
    /// Unable to reach the directory
    #[error("error sending request to routing directory")]
    RequestSend(#[source] reqwest::Error),
    /// The directory knows of no instance serving the requested path
    #[error("no live instance registered for `{service}`")]
    NoRoute {
        /// The service that was looked up
        service: ServiceName,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PathsDto {
    One(String),
    Many(Vec<String>),
}

impl From<PathsDto> for Vec<String> {
    fn from(dto: PathsDto) -> Self {
        match dto {
            PathsDto::One(path) => vec![path],
            PathsDto::Many(paths) => paths,
        }
    }
}

fn deserialize_paths<'de, D: serde::Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    PathsDto::deserialize(d).map(Into::into)
}

/// A service instance as advertised in the routing directory
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRecord {
    /// The paths served by the instance
    #[serde(deserialize_with = "deserialize_paths")]
    pub path: Vec<String>,

    /// Where the instance can be reached
    pub url: reqwest::Url,

    /// The secret the instance expects requests to be signed with
    #[serde(default)]
    pub secure_key: Option<SecureKey>,
}

impl RouteRecord {
    /// Whether this instance serves `service`
    pub fn serves(&self, service: &ServiceNameRef) -> bool {
        let wanted = service.as_str().trim_matches('/');
        self.path.iter().any(|p| p.trim_matches('/') == wanted)
    }
}

/// Finds authorities by asking the routing directory for registered routes
#[derive(Clone, Debug)]
pub struct RouterLocator {
    client: reqwest::Client,
    router_url: reqwest::Url,
    router_secret: Option<SecureKey>,
}

impl RouterLocator {
    /// Constructs a locator for the directory at `router_url`
    ///
    /// When `router_secret` is set, directory lookups are signed with it.
    pub fn new(
        client: reqwest::Client,
        router_url: reqwest::Url,
        router_secret: Option<SecureKey>,
    ) -> Self {
        Self {
            client,
            router_url,
            router_secret,
        }
    }

    /// Fetches every route currently registered with the directory
    #[tracing::instrument(skip(self), fields(router.url = %self.router_url), err)]
    pub async fn routes(&self) -> Result<Vec<RouteRecord>, LocateError> {
        let req = attach_signed_json(
            self.client
                .request(SEARCH.clone(), self.router_url.clone()),
            &serde_json::Map::new(),
            self.router_secret.as_deref(),
        )
        .map_err(LocateError::RequestBodyError)?;
        let resp = req.send().await.map_err(LocateError::RequestSend)?;

        let status = resp.status();
        let body = resp.bytes().await.map_err(LocateError::BodyReadError)?;

        if !status.is_success() {
            return Err(LocateError::ErrorWithBody {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let routes: Vec<RouteRecord> =
            serde_json::from_slice(&body).map_err(LocateError::RoutesBodyError)?;
        tracing::trace!(routes = routes.len(), "received routes from directory");

        Ok(routes)
    }
}

#[async_trait]
impl AuthorityLocator for RouterLocator {
    type Authority = RemoteAuthority;

    #[tracing::instrument(skip(self), fields(service = %service))]
    async fn locate(&self, service: &ServiceNameRef) -> Result<RemoteAuthority, LocateError> {
        let mut candidates: Vec<RouteRecord> = self
            .routes()
            .await?
            .into_iter()
            .filter(|route| route.serves(service))
            .collect();

        if candidates.is_empty() {
            tracing::warn!("no instance registered for service");
            return Err(LocateError::NoRoute {
                service: service.to_owned(),
            });
        }

        let pick = rand::thread_rng().gen_range(0..candidates.len());
        let route = candidates.swap_remove(pick);

        tracing::debug!(
            instance.url = %route.url,
            candidates = candidates.len() + 1,
            "located service instance"
        );

        Ok(RemoteAuthority::new(
            self.client.clone(),
            route.url,
            route.secure_key,
        ))
    }
}
