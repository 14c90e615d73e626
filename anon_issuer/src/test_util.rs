use tokio::net::TcpListener;

/// Serves `router` on an ephemeral local port for the rest of the test
pub(crate) async fn serve(router: axum::Router) -> reqwest::Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    reqwest::Url::parse(&format!("http://{addr}/")).unwrap()
}

/// A local address nothing is listening on
pub(crate) async fn unused_url() -> reqwest::Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    reqwest::Url::parse(&format!("http://{addr}/")).unwrap()
}
