//! Endpoint behaviour through the full router.

use std::io::Read;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use flate2::read::GzDecoder;
use serde_json::json;

use httpbin::handlers::digest::Algorithm;

mod common;
use common::{app, app_with, get, request, send, test_config};

#[tokio::test]
async fn test_get_echoes_request() {
    let resp = send(
        app(),
        Request::builder()
            .uri("/get?foo=bar&foo=baz")
            .header("host", "example.com")
            .header("x-forwarded-for", "203.0.113.7")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.header("content-type"), Some("application/json; encoding=utf-8"));
    let body = resp.json();
    assert_eq!(body["args"]["foo"], json!(["bar", "baz"]));
    assert_eq!(body["headers"]["Host"], json!(["example.com"]));
    assert_eq!(body["origin"], "203.0.113.7");
    assert_eq!(body["url"], "http://example.com/get?foo=bar&foo=baz");
}

#[tokio::test]
async fn test_method_endpoints() {
    for (method, path) in [
        (Method::POST, "/post"),
        (Method::PUT, "/put"),
        (Method::PATCH, "/patch"),
        (Method::DELETE, "/delete"),
    ] {
        let resp = send(app(), request(method.clone(), path)).await;
        assert_eq!(resp.status, StatusCode::OK, "{method} {path}");

        let resp = get(app(), path).await;
        assert_eq!(resp.status, StatusCode::METHOD_NOT_ALLOWED, "GET {path}");
        assert_eq!(resp.header("allow"), Some(method.as_str()));
    }
}

#[tokio::test]
async fn test_post_json_body() {
    let resp = send(
        app(),
        Request::builder()
            .method(Method::POST)
            .uri("/post?x=1")
            .header("host", "example.com")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"hello":"world"}"#))
            .unwrap(),
    )
    .await;

    let body = resp.json();
    assert_eq!(body["json"]["hello"], "world");
    assert_eq!(body["data"], r#"{"hello":"world"}"#);
    assert_eq!(body["args"]["x"], json!(["1"]));
    assert_eq!(body["form"], json!({}));
}

#[tokio::test]
async fn test_post_invalid_json_is_bad_request() {
    let resp = send(
        app(),
        Request::builder()
            .method(Method::POST)
            .uri("/post")
            .header("content-type", "application/json")
            .body(Body::from("{oops"))
            .unwrap(),
    )
    .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_anything_accepts_every_method() {
    for method in [Method::GET, Method::POST, Method::PUT, Method::DELETE] {
        let resp = send(app(), request(method, "/anything/a/b")).await;
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.json()["url"], "http://example.com/anything/a/b");
    }

    let resp = send(app(), request(Method::POST, "/anything/")).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["url"], "http://example.com/anything/");
}

#[tokio::test]
async fn test_simple_echo_endpoints() {
    let resp = send(
        app(),
        Request::builder()
            .uri("/user-agent")
            .header("user-agent", "test-agent/1.0")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(resp.json(), json!({"user-agent": "test-agent/1.0"}));

    let resp = get(app(), "/hostname").await;
    assert_eq!(resp.json(), json!({"hostname": "go-httpbin"}));

    let resp = get(app(), "/ip").await;
    assert_eq!(resp.json(), json!({"origin": "unknown"}));
}

#[tokio::test]
async fn test_excluded_headers_hidden() {
    let mut config = test_config();
    config.headers.exclude = vec!["x-secret-*".into()];

    let resp = send(
        app_with(config),
        Request::builder()
            .uri("/headers")
            .header("x-secret-token", "hunter2")
            .header("x-visible", "yes")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    let headers = &resp.json()["headers"];
    assert!(headers.get("X-Secret-Token").is_none());
    assert_eq!(headers["X-Visible"], json!(["yes"]));
}

#[tokio::test]
async fn test_response_headers() {
    let resp = get(app(), "/response-headers?X-Foo=bar&X-Foo=baz").await;
    assert_eq!(resp.status, StatusCode::OK);
    let values: Vec<_> = resp.headers.get_all("x-foo").iter().collect();
    assert_eq!(values, ["bar", "baz"]);
    assert_eq!(resp.json()["X-Foo"], json!(["bar", "baz"]));
}

#[tokio::test]
async fn test_status_codes() {
    let resp = get(app(), "/status/418").await;
    assert_eq!(resp.status, StatusCode::IM_A_TEAPOT);
    assert_eq!(resp.text(), "I'm a teapot!");
    assert_eq!(resp.header("x-more-info"), Some("http://tools.ietf.org/html/rfc2324"));

    let resp = get(app(), "/status/204").await;
    assert_eq!(resp.status, StatusCode::NO_CONTENT);

    let resp = get(app(), "/status/200:0,503:1").await;
    assert_eq!(resp.status, StatusCode::SERVICE_UNAVAILABLE);

    let resp = get(app(), "/status/abc").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_bare_prefixes_are_not_found() {
    for path in ["/status", "/delay", "/bytes", "/links", "/basic-auth", "/redirect"] {
        let resp = get(app(), path).await;
        assert_eq!(resp.status, StatusCode::NOT_FOUND, "{path}");
        assert_eq!(resp.text(), "404 page not found\n");
    }
}

#[tokio::test]
async fn test_unstable() {
    assert_eq!(get(app(), "/unstable?failure_rate=1").await.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(get(app(), "/unstable?failure_rate=0").await.status, StatusCode::OK);
    assert_eq!(get(app(), "/unstable?failure_rate=2").await.status, StatusCode::BAD_REQUEST);

    let first = get(app(), "/unstable?seed=99").await.status;
    for _ in 0..5 {
        assert_eq!(get(app(), "/unstable?seed=99").await.status, first);
    }
}

#[tokio::test]
async fn test_redirect_chains() {
    let resp = get(app(), "/redirect/3").await;
    assert_eq!(resp.status, StatusCode::FOUND);
    assert_eq!(resp.header("location"), Some("/relative-redirect/2"));

    let resp = get(app(), "/redirect/1").await;
    assert_eq!(resp.header("location"), Some("/get"));

    let resp = get(app(), "/absolute-redirect/2").await;
    assert_eq!(resp.header("location"), Some("http://example.com/absolute-redirect/1"));

    let resp = get(app(), "/redirect/2?absolute=true").await;
    assert_eq!(resp.header("location"), Some("http://example.com/absolute-redirect/1"));

    assert_eq!(get(app(), "/redirect/0").await.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_redirect_to_allow_list() {
    let mut config = test_config();
    config.redirects.allowed_domains.insert("example.org".into());

    let resp = get(app_with(config.clone()), "/redirect-to?url=http://evil.com/").await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);
    assert!(resp.text().contains("- example.org"));

    let resp = get(
        app_with(config.clone()),
        "/redirect-to?url=https://example.org/x&status_code=307",
    )
    .await;
    assert_eq!(resp.status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(resp.header("location"), Some("https://example.org/x"));

    let resp = get(app_with(config.clone()), "/redirect-to?url=/get").await;
    assert_eq!(resp.status, StatusCode::FOUND);
    assert_eq!(resp.header("location"), Some("/get"));

    // Scheme-relative targets still name a host.
    for target in ["//evil.example/x", "/%5Cevil.example", "%5C%5Cevil.example", "%5C/evil.example"] {
        let resp = get(app_with(config.clone()), &format!("/redirect-to?url={target}")).await;
        assert_eq!(resp.status, StatusCode::FORBIDDEN, "url={target}");
    }

    let resp = get(app_with(config), "/redirect-to?url=//example.org/ok").await;
    assert_eq!(resp.status, StatusCode::FOUND);
    assert_eq!(resp.header("location"), Some("//example.org/ok"));
}

#[tokio::test]
async fn test_redirect_to_validation() {
    assert_eq!(get(app(), "/redirect-to").await.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        get(app(), "/redirect-to?url=/get&status_code=200").await.status,
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn test_cookies() {
    let resp = get(app(), "/cookies/set?flavor=oat").await;
    assert_eq!(resp.status, StatusCode::FOUND);
    assert_eq!(resp.header("location"), Some("/cookies"));
    let set_cookie = resp.header("set-cookie").unwrap();
    assert!(set_cookie.starts_with("flavor=oat"));
    assert!(set_cookie.contains("HttpOnly"));

    let resp = send(
        app(),
        Request::builder()
            .uri("/cookies")
            .header(header::COOKIE, "flavor=oat; size=large")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(resp.json(), json!({"cookies": {"flavor": "oat", "size": "large"}}));

    let resp = get(app(), "/cookies/delete?flavor").await;
    assert!(resp.header("set-cookie").unwrap().contains("Max-Age=0"));
}

fn with_auth(uri: &str, auth: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, auth)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_basic_auth() {
    // user:passwd
    let resp = send(app(), with_auth("/basic-auth/user/passwd", "Basic dXNlcjpwYXNzd2Q=")).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json(), json!({"authorized": true, "user": "user"}));

    let resp = get(app(), "/basic-auth/user/passwd").await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.header("www-authenticate"), Some(r#"Basic realm="Fake Realm""#));

    let resp = get(app(), "/hidden-basic-auth/user/passwd").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bearer() {
    let resp = send(app(), with_auth("/bearer", "Bearer token123")).await;
    assert_eq!(resp.json(), json!({"authenticated": true, "token": "token123"}));
    assert_eq!(get(app(), "/bearer").await.status, StatusCode::UNAUTHORIZED);
}

fn challenge_param<'a>(challenge: &'a str, name: &str) -> &'a str {
    let start = challenge.find(&format!("{name}=\"")).unwrap() + name.len() + 2;
    let end = start + challenge[start..].find('"').unwrap();
    &challenge[start..end]
}

#[tokio::test]
async fn test_digest_auth_handshake() {
    let uri = "/digest-auth/auth/user/passwd/SHA-256";
    let resp = get(app(), uri).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    let challenge = resp.header("www-authenticate").unwrap().to_string();
    assert!(challenge.starts_with("Digest "));
    assert!(challenge.contains("algorithm=SHA-256"));
    let nonce = challenge_param(&challenge, "nonce");
    assert_eq!(challenge_param(&challenge, "realm"), "go-httpbin");

    let alg = Algorithm::Sha256;
    let ha1 = alg.hash(b"user:go-httpbin:passwd");
    let ha2 = alg.hash(format!("GET:{uri}").as_bytes());
    let response = alg.hash(format!("{ha1}:{nonce}:00000001:abcdef:auth:{ha2}").as_bytes());
    let auth = format!(
        r#"Digest username="user", realm="go-httpbin", nonce="{nonce}", uri="{uri}", algorithm=SHA-256, qop=auth, nc=00000001, cnonce="abcdef", response="{response}""#
    );

    let resp = send(app(), with_auth(uri, &auth)).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json(), json!({"authenticated": true, "user": "user"}));

    let resp = get(app(), "/digest-auth/bogus/user/passwd").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_digest_auth_over_head() {
    let uri = "/digest-auth/auth/user/passwd";
    let resp = send(app(), request(Method::HEAD, uri)).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    let challenge = resp.header("www-authenticate").unwrap().to_string();
    let nonce = challenge_param(&challenge, "nonce");

    let alg = Algorithm::Md5;
    let ha1 = alg.hash(b"user:go-httpbin:passwd");
    let ha2 = alg.hash(format!("HEAD:{uri}").as_bytes());
    let response = alg.hash(format!("{ha1}:{nonce}:00000001:abcdef:auth:{ha2}").as_bytes());
    let auth = format!(
        r#"Digest username="user", realm="go-httpbin", nonce="{nonce}", uri="{uri}", qop=auth, nc=00000001, cnonce="abcdef", response="{response}""#
    );

    let mut req = with_auth(uri, &auth);
    *req.method_mut() = Method::HEAD;
    let resp = send(app(), req).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.is_empty());

    // The same credentials do not verify for GET.
    let resp = send(app(), with_auth(uri, &auth)).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_gzip() {
    let resp = get(app(), "/gzip").await;
    assert_eq!(resp.header("content-encoding"), Some("gzip"));
    let mut decoded = String::new();
    GzDecoder::new(&resp.body[..]).read_to_string(&mut decoded).unwrap();
    let body: serde_json::Value = serde_json::from_str(&decoded).unwrap();
    assert_eq!(body["gzipped"], true);

    let resp = get(app(), "/deflate").await;
    assert_eq!(resp.header("content-encoding"), Some("deflate"));

    assert_eq!(get(app(), "/brotli").await.status, StatusCode::NOT_IMPLEMENTED);
}

#[tokio::test]
async fn test_stream_lines_capped() {
    let resp = get(app(), "/stream/3").await;
    let lines: Vec<_> = resp.text().lines().map(str::to_string).collect();
    assert_eq!(lines.len(), 3);
    let last: serde_json::Value = serde_json::from_str(&lines[2]).unwrap();
    assert_eq!(last["id"], 2);

    let resp = get(app(), "/stream/500").await;
    assert_eq!(resp.text().lines().count(), 100);
}

#[tokio::test]
async fn test_bytes() {
    let a = get(app(), "/bytes/64?seed=42").await;
    let b = get(app(), "/bytes/64?seed=42").await;
    assert_eq!(a.status, StatusCode::OK);
    assert_eq!(a.body.len(), 64);
    assert_eq!(a.body, b.body);
    assert_eq!(a.header("content-type"), Some("application/octet-stream"));

    let resp = get(app(), "/stream-bytes/100?chunk_size=7&seed=1").await;
    assert_eq!(resp.body.len(), 100);

    assert_eq!(get(app(), "/bytes/0").await.status, StatusCode::BAD_REQUEST);
    let too_big = format!("/bytes/{}", test_config().limits.max_body_size + 1);
    assert_eq!(get(app(), &too_big).await.status, StatusCode::BAD_REQUEST);
}

fn with_header(uri: &str, name: header::HeaderName, value: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(name, value)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_range() {
    let resp = get(app(), "/range/26").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.text(), "abcdefghijklmnopqrstuvwxyz");
    assert_eq!(resp.header("accept-ranges"), Some("bytes"));
    assert_eq!(resp.header("etag"), Some("range26"));

    let resp = send(app(), with_header("/range/26", header::RANGE, "bytes=0-4")).await;
    assert_eq!(resp.status, StatusCode::PARTIAL_CONTENT);
    assert_eq!(resp.text(), "abcde");
    assert_eq!(resp.header("content-range"), Some("bytes 0-4/26"));

    let resp = send(app(), with_header("/range/26", header::RANGE, "bytes=30-")).await;
    assert_eq!(resp.status, StatusCode::RANGE_NOT_SATISFIABLE);
    assert_eq!(resp.header("content-range"), Some("bytes */26"));
}

#[tokio::test]
async fn test_cache_endpoints() {
    let resp = get(app(), "/cache").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.header("last-modified").is_some());
    assert!(resp.header("etag").is_some());

    let resp = send(app(), with_header("/cache", header::IF_NONE_MATCH, "\"x\"")).await;
    assert_eq!(resp.status, StatusCode::NOT_MODIFIED);

    let resp = get(app(), "/cache/60").await;
    assert_eq!(resp.header("cache-control"), Some("public, max-age=60"));

    let resp = send(app(), with_header("/etag/abc", header::IF_NONE_MATCH, "\"abc\"")).await;
    assert_eq!(resp.status, StatusCode::NOT_MODIFIED);

    let resp = send(app(), with_header("/etag/abc", header::IF_MATCH, "\"xyz\"")).await;
    assert_eq!(resp.status, StatusCode::PRECONDITION_FAILED);

    let resp = get(app(), "/etag/abc").await;
    assert_eq!(resp.header("etag"), Some("\"abc\""));
}

#[tokio::test]
async fn test_links() {
    let resp = get(app(), "/links/10").await;
    assert_eq!(resp.status, StatusCode::FOUND);
    assert_eq!(resp.header("location"), Some("/links/10/0"));

    let resp = get(app(), "/links/3/1").await;
    assert!(resp.text().contains("<a href='/links/3/0'>0</a>"));

    assert_eq!(get(app(), "/links/300/0").await.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_images() {
    let resp = send(app(), with_header("/image", header::ACCEPT, "text/html")).await;
    assert_eq!(resp.status, StatusCode::NOT_ACCEPTABLE);

    let resp = send(app(), with_header("/image", header::ACCEPT, "image/webp")).await;
    assert_eq!(resp.header("content-type"), Some("image/webp"));

    let resp = get(app(), "/image/png").await;
    assert_eq!(resp.header("content-type"), Some("image/png"));

    assert_eq!(get(app(), "/image/gif").await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_base64_and_uuid() {
    let resp = get(app(), "/base64/SFRUUEJJTiBpcyBhd2Vzb21l").await;
    assert_eq!(resp.text(), "HTTPBIN is awesome");

    let resp = get(app(), "/base64/!!!").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(resp.text().starts_with("Incorrect Base64 data"));

    let resp = get(app(), "/uuid").await;
    let value = resp.json()["uuid"].as_str().unwrap().to_string();
    assert!(uuid::Uuid::parse_str(&value).is_ok());
}

#[tokio::test]
async fn test_static_documents() {
    let resp = get(app(), "/robots.txt").await;
    assert_eq!(resp.text(), "User-agent: *\nDisallow: /deny\n");

    let resp = get(app(), "/").await;
    assert!(resp.header("content-type").unwrap().starts_with("text/html"));

    let resp = get(app(), "/json").await;
    assert_eq!(resp.json()["slideshow"]["author"], "Yours Truly");

    let resp = get(app(), "/xml").await;
    assert_eq!(resp.header("content-type"), Some("application/xml"));
}

#[tokio::test]
async fn test_dump_request() {
    let resp = get(app(), "/dump/request?x=1").await;
    let text = resp.text();
    assert!(text.starts_with("GET /dump/request?x=1 HTTP/1.1\r\n"));
    assert!(text.contains("Host: example.com\r\n"));
}
