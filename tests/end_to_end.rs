//! Real socket, real client.

use std::time::Duration;

use tokio::net::TcpListener;

use httpbin::http::HttpServer;
use httpbin::lifecycle::Shutdown;

mod common;

#[tokio::test]
async fn test_serve_and_shutdown() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(common::test_config()).unwrap();
    let server_shutdown = shutdown.clone();
    let handle = tokio::spawn(async move { server.run(listener, &server_shutdown).await });

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    let resp = client.get(format!("http://{addr}/ip")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = serde_json::from_str(&resp.text().await.unwrap()).unwrap();
    assert_eq!(body["origin"], "127.0.0.1");

    let resp = client
        .get(format!("http://{addr}/get?k=v"))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_str(&resp.text().await.unwrap()).unwrap();
    assert_eq!(body["url"], format!("http://{addr}/get?k=v"));

    let resp = client
        .get(format!("http://{addr}/redirect/2"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 302);
    assert_eq!(resp.headers()["location"], "/relative-redirect/1");

    shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok());
}
