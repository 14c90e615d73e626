use anon_issuer::{authority::RouterLocator, AnonymousIssuer};
use anon_issuer_server::{router, AppState, Opts};
use clap::Parser;
use color_eyre::eyre::WrapErr;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    dotenvy::dotenv().ok();
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let opts = Opts::parse();

    let client = reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .timeout(opts.request_timeout())
        .build()?;

    let locator = RouterLocator::new(client, opts.router_url.clone(), opts.router_secret.clone());
    let issuer = AnonymousIssuer::new(opts.scope_source(), locator, opts.issuer_config());

    tracing::debug!(
        authority = %issuer.config().authority_service(),
        default_ttl = issuer.config().default_ttl().map(|ttl| ttl.as_secs()),
        "issuer configured"
    );

    let app = router(
        AppState::new(issuer, opts.secure_key.clone()),
        opts.self_path.as_deref(),
    );

    let listener = TcpListener::bind((opts.hostname.as_str(), opts.port))
        .await
        .wrap_err_with(|| format!("unable to listen on {}:{}", opts.hostname, opts.port))?;

    tracing::info!(
        address = %listener.local_addr()?,
        permissions = %opts.permission_path.display(),
        "anonymous issuer listening"
    );

    axum::serve(listener, app).await?;

    Ok(())
}
