use std::fs;
use std::sync::Mutex;

use tempfile::TempDir;
use url::Url;
use wikigrab_engine::{
    Downloader, DownloadOutcome, EngineEvent, FailureKind, FetchSettings, ProgressSink,
    ReqwestFetcher, SkipFilter,
};
use wiremock::matchers::{header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<EngineEvent>>,
}

impl ProgressSink for RecordingSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

struct Fixture {
    server: MockServer,
    fetcher: ReqwestFetcher,
    skip_filter: SkipFilter,
    dest: TempDir,
}

impl Fixture {
    async fn new() -> Self {
        Self {
            server: MockServer::start().await,
            fetcher: ReqwestFetcher::new(FetchSettings::default()).unwrap(),
            skip_filter: SkipFilter::default(),
            dest: TempDir::new().unwrap(),
        }
    }

    fn url(&self, route: &str) -> Url {
        Url::parse(&format!("{}{route}", self.server.uri())).unwrap()
    }

    fn page(&self) -> Url {
        self.url("/index.php?Gallery")
    }

    async fn download(&self, route: &str) -> (String, DownloadOutcome) {
        let sink = RecordingSink::default();
        let report = Downloader::new(&self.fetcher, &self.skip_filter)
            .download(&self.url(route), &self.page(), self.dest.path(), &sink)
            .await
            .expect("no filesystem error");
        (report.filename, report.outcome)
    }
}

#[tokio::test]
async fn image_is_saved_with_referer_and_exact_bytes() {
    let fx = Fixture::new().await;
    let body = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
    Mock::given(method("GET"))
        .and(path("/index.php"))
        .and(query_param("src", "cat.png"))
        .and(header("referer", fx.page().as_str()))
        .and(header_exists("accept"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.clone(), "image/png"))
        .expect(1)
        .mount(&fx.server)
        .await;

    let (filename, outcome) = fx.download("/index.php?plugin=ref&src=cat.png").await;

    assert_eq!(filename, "cat.png");
    let target = fx.dest.path().join("cat.png");
    assert_eq!(
        outcome,
        DownloadOutcome::Saved {
            bytes: body.len() as u64,
            path: target.clone(),
        }
    );
    assert_eq!(fs::read(target).unwrap(), body);
}

#[tokio::test]
async fn existing_file_is_never_overwritten_or_refetched() {
    let fx = Fixture::new().await;
    fs::write(fx.dest.path().join("cat.jpg"), b"original").unwrap();
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"new".to_vec(), "image/jpeg"))
        .expect(0)
        .mount(&fx.server)
        .await;

    let (filename, outcome) = fx.download("/attach.php?src=cat.jpg&amp;x=1").await;

    assert_eq!(filename, "cat.jpg");
    assert_eq!(outcome, DownloadOutcome::SkippedDuplicate);
    assert_eq!(fs::read(fx.dest.path().join("cat.jpg")).unwrap(), b"original");
}

#[tokio::test]
async fn html_response_is_classified_and_not_written() {
    let fx = Fixture::new().await;
    Mock::given(method("GET"))
        .and(path("/attach.php"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html>please log in</html>", "text/html; charset=UTF-8"),
        )
        .mount(&fx.server)
        .await;

    let (filename, outcome) = fx.download("/attach.php?src=secret.png").await;

    assert_eq!(filename, "secret.png");
    assert_eq!(
        outcome,
        DownloadOutcome::SkippedNonImageResponse {
            content_type: "text/html; charset=utf-8".to_string()
        }
    );
    assert!(!fx.dest.path().join("secret.png").exists());
}

#[tokio::test]
async fn non_html_non_image_responses_are_still_saved() {
    let fx = Fixture::new().await;
    Mock::given(method("GET"))
        .and(path("/files/scan.jpg"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"JFIF".to_vec(), "application/octet-stream"),
        )
        .mount(&fx.server)
        .await;

    let (_, outcome) = fx.download("/files/scan.jpg").await;

    assert!(matches!(outcome, DownloadOutcome::Saved { bytes: 4, .. }));
    assert!(fx.dest.path().join("scan.jpg").exists());
}

#[tokio::test]
async fn chrome_icons_are_skipped_before_any_request() {
    let fx = Fixture::new().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"x".to_vec(), "image/png"))
        .expect(0)
        .mount(&fx.server)
        .await;

    let (filename, outcome) = fx.download("/image/TOP_1.PNG").await;

    assert_eq!(filename, "TOP_1.PNG");
    assert_eq!(outcome, DownloadOutcome::SkippedPattern);
    assert!(fs::read_dir(fx.dest.path()).unwrap().next().is_none());
}

#[tokio::test]
async fn fetch_failures_become_failed_outcomes() {
    let fx = Fixture::new().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&fx.server)
        .await;

    let (_, outcome) = fx.download("/image/gone.png").await;

    match outcome {
        DownloadOutcome::Failed(err) => assert_eq!(err.kind, FailureKind::HttpStatus(404)),
        other => panic!("unexpected outcome {other:?}"),
    }
    assert!(!fx.dest.path().join("gone.png").exists());
}

#[tokio::test]
async fn download_start_is_reported_only_when_a_request_is_made() {
    let fx = Fixture::new().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"x".to_vec(), "image/png"))
        .mount(&fx.server)
        .await;

    let sink = RecordingSink::default();
    let downloader = Downloader::new(&fx.fetcher, &fx.skip_filter);
    downloader
        .download(&fx.url("/image/top_2.png"), &fx.page(), fx.dest.path(), &sink)
        .await
        .unwrap();
    downloader
        .download(&fx.url("/image/kept.png"), &fx.page(), fx.dest.path(), &sink)
        .await
        .unwrap();

    let events = sink.events.into_inner().unwrap();
    assert_eq!(
        events,
        vec![EngineEvent::ImageDownloadStarted {
            filename: "kept.png".to_string(),
            image_url: fx.url("/image/kept.png").to_string(),
        }]
    );
}

#[tokio::test]
async fn size_cap_comes_from_fetch_settings() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0u8; 64], "image/png"))
        .mount(&server)
        .await;
    let dest = TempDir::new().unwrap();
    let skip_filter = SkipFilter::default();
    let page = Url::parse(&format!("{}/index.php?Gallery", server.uri())).unwrap();
    let image = Url::parse(&format!("{}/image/huge.png", server.uri())).unwrap();

    let small = ReqwestFetcher::new(FetchSettings {
        max_bytes: 16,
        ..FetchSettings::default()
    })
    .unwrap();
    let report = Downloader::new(&small, &skip_filter)
        .download(&image, &page, dest.path(), &RecordingSink::default())
        .await
        .unwrap();
    assert!(matches!(
        report.outcome,
        DownloadOutcome::Failed(ref err) if matches!(err.kind, FailureKind::TooLarge { max_bytes: 16, .. })
    ));

    let roomy = ReqwestFetcher::new(FetchSettings::default()).unwrap();
    let report = Downloader::new(&roomy, &skip_filter)
        .download(&image, &page, dest.path(), &RecordingSink::default())
        .await
        .unwrap();
    assert!(matches!(report.outcome, DownloadOutcome::Saved { bytes: 64, .. }));
}
