use std::time::Duration;

use url::Url;
use wikigrab_engine::rules::USER_AGENT;
use wikigrab_engine::{FailureKind, FetchRequest, FetchSettings, Fetcher, ReqwestFetcher};
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher(settings: FetchSettings) -> ReqwestFetcher {
    ReqwestFetcher::new(settings).expect("client builds")
}

fn page(server: &MockServer, route: &str) -> FetchRequest {
    FetchRequest::page(Url::parse(&format!("{}{route}", server.uri())).unwrap())
}

#[tokio::test]
async fn fetcher_returns_body_and_sends_browser_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/index.php"))
        .and(header("user-agent", USER_AGENT))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<html>ok</html>", "text/html; charset=utf-8"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let request = page(&server, "/index.php?cmd=list");
    let output = fetcher(FetchSettings::default())
        .fetch(&request)
        .await
        .expect("fetch ok");

    assert_eq!(output.metadata.original_url, request.url.to_string());
    assert_eq!(output.metadata.final_url, output.metadata.original_url);
    assert!(output
        .metadata
        .content_type
        .unwrap()
        .starts_with("text/html"));
    assert_eq!(&output.bytes[..], b"<html>ok</html>");
    assert_eq!(output.metadata.byte_len, 15);
}

#[tokio::test]
async fn image_requests_carry_referer_and_accept() {
    let server = MockServer::start().await;
    let referer = format!("{}/index.php?FrontPage", server.uri());
    Mock::given(method("GET"))
        .and(path("/image/photo.png"))
        .and(header("referer", referer.as_str()))
        .and(header_exists("accept"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"PNG".to_vec(), "image/png"))
        .expect(1)
        .mount(&server)
        .await;

    let request = FetchRequest::image(
        Url::parse(&format!("{}/image/photo.png", server.uri())).unwrap(),
        Url::parse(&referer).unwrap(),
    );
    let output = fetcher(FetchSettings::default())
        .fetch(&request)
        .await
        .expect("fetch ok");
    assert_eq!(&output.bytes[..], b"PNG");
}

#[tokio::test]
async fn fetcher_fails_on_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = fetcher(FetchSettings::default())
        .fetch(&page(&server, "/missing"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(404));
}

#[tokio::test]
async fn fetcher_times_out_on_slow_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_string("slow"),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        request_timeout: Duration::from_millis(50),
        ..FetchSettings::default()
    };
    let err = fetcher(settings)
        .fetch(&page(&server, "/slow"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn fetcher_rejects_too_large_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/large"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "image/png")
                .set_body_string("01234567890"),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        max_bytes: 10,
        ..FetchSettings::default()
    };
    let err = fetcher(settings)
        .fetch(&page(&server, "/large"))
        .await
        .unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::TooLarge {
            max_bytes: 10,
            actual: Some(11)
        }
    );
}

#[tokio::test]
async fn non_http_schemes_are_invalid() {
    let request = FetchRequest::page(Url::parse("file:///etc/passwd").unwrap());
    let err = fetcher(FetchSettings::default())
        .fetch(&request)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}
