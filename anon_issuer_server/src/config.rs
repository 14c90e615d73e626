//! Command line and environment configuration

use std::{convert::Infallible, path::PathBuf, time::Duration};

use anon_issuer::{
    scope::{file::DEFAULT_PERMISSION_PATH, CachedScopeSource, FileScopeSource},
    IssuerConfig, ScopeSource, SecureKey, ServiceName, Ttl, AUTH_SERVICE,
};
use clap::Parser;

fn secure_key(s: &str) -> Result<SecureKey, Infallible> {
    Ok(SecureKey::new(s.to_owned()))
}

fn service_name(s: &str) -> Result<ServiceName, Infallible> {
    Ok(ServiceName::new(s.to_owned()))
}

/// Issues access tokens to anonymous callers
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Opts {
    /// The address to listen on
    #[arg(long, env, default_value = "0.0.0.0")]
    pub hostname: String,

    /// The port to listen on
    #[arg(short, long, env, default_value_t = 8080)]
    pub port: u16,

    /// An additional path this service answers on, as advertised in the directory
    #[arg(long, env)]
    pub self_path: Option<String>,

    /// The routing directory used to locate the authorization authority
    #[arg(long, env)]
    pub router_url: reqwest::Url,

    /// The secret used to sign directory lookups
    #[arg(long, env, value_parser = secure_key, hide_env_values = true)]
    pub router_secret: Option<SecureKey>,

    /// The secret inbound requests must be signed with
    #[arg(long, env, value_parser = secure_key, hide_env_values = true)]
    pub secure_key: Option<SecureKey>,

    /// The token lifetime, in seconds, to request when the caller does not ask for one
    #[arg(long, env)]
    pub default_ttl: Option<Ttl>,

    /// The permission document granted to anonymous callers
    #[arg(long, env, default_value = DEFAULT_PERMISSION_PATH)]
    pub permission_path: PathBuf,

    /// Only re-read the permission document when it changes on disk
    #[arg(long, env)]
    pub scope_cache: bool,

    /// The name the authorization authority is registered under
    #[arg(long, env, value_parser = service_name, default_value = AUTH_SERVICE)]
    pub auth_service: ServiceName,

    /// Timeout, in seconds, for calls to the directory and the authority
    #[arg(long, env, default_value_t = 30)]
    pub request_timeout: u64,
}

impl Opts {
    /// Service-wide issuance settings
    pub fn issuer_config(&self) -> IssuerConfig {
        IssuerConfig::default()
            .with_default_ttl(self.default_ttl)
            .with_authority_service(self.auth_service.clone())
    }

    /// The configured permission document source
    pub fn scope_source(&self) -> Box<dyn ScopeSource> {
        if self.scope_cache {
            Box::new(CachedScopeSource::new(&self.permission_path))
        } else {
            Box::new(FileScopeSource::new(&self.permission_path))
        }
    }

    /// Timeout applied to outbound calls
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Opts, clap::Error> {
        let mut argv = vec!["anon-issuer", "--router-url", "http://router.local/"];
        argv.extend_from_slice(args);
        Opts::try_parse_from(argv)
    }

    #[test]
    fn defaults_follow_the_deployment_conventions() {
        let opts = parse(&[]).unwrap();

        assert_eq!(opts.permission_path, PathBuf::from("./permissions.json"));
        assert_eq!(opts.auth_service.as_str(), "auth");
        assert_eq!(opts.issuer_config().authority_service().as_str(), "auth");
        assert!(!opts.scope_cache);
        assert_eq!(opts.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn default_ttl_is_parsed_once_as_seconds() {
        let opts = parse(&["--default-ttl", "3600"]).unwrap();

        assert_eq!(opts.default_ttl, Some(Ttl(3600)));
        assert_eq!(opts.issuer_config().default_ttl(), Some(Ttl(3600)));
    }

    #[test]
    fn non_numeric_default_ttl_is_rejected() {
        assert!(parse(&["--default-ttl", "one hour"]).is_err());
    }

    #[test]
    fn router_url_is_required() {
        assert!(Opts::try_parse_from(["anon-issuer"]).is_err());
    }

    #[test]
    fn secrets_are_redacted_in_debug_output() {
        let opts = parse(&["--secure-key", "hunter2-hunter2"]).unwrap();

        let rendered = format!("{opts:?}");
        assert!(!rendered.contains("hunter2"));
        assert_eq!(opts.secure_key.as_deref().map(|k| k.as_str()), Some("hunter2-hunter2"));
    }
}
