use reqwest::{StatusCode, Url};
use vodl::{hls::PlaylistType, VodlError};
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};

use super::{test_fetcher, HlsMock};

fn url(server: &MockServer, path: &str) -> Url {
    format!("{}{path}", server.uri()).parse().unwrap()
}

#[tokio::test]
async fn fetch_returns_body_and_final_url() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    server.mock("/seg.ts", b"\x47\x40\x00\x10").await;

    let result = test_fetcher(0).fetch(url(&server, "/seg.ts")).await?;
    assert_eq!(result.url, url(&server, "/seg.ts"));
    assert_eq!(&result.body[..], b"\x47\x40\x00\x10");
    Ok(())
}

#[tokio::test]
async fn fetch_follows_redirects() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old/master.m3u8"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/vod/master.m3u8"))
        .mount(&server)
        .await;
    server
        .mock_master_playlist("/vod/master.m3u8", &[(500000, "low/index.m3u8")])
        .await;

    let (final_url, master) = test_fetcher(0)
        .fetch_master_manifest(url(&server, "/old/master.m3u8"))
        .await?;
    assert_eq!(final_url, url(&server, "/vod/master.m3u8"));
    assert_eq!(master.variants.len(), 1);
    Ok(())
}

#[tokio::test]
async fn fetch_retries_server_errors() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky.ts"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    server.mock("/flaky.ts", "finally").await;

    let body = test_fetcher(3)
        .fetch_segment(url(&server, "/flaky.ts"))
        .await?;
    assert_eq!(&body[..], b"finally");
    Ok(())
}

#[tokio::test]
async fn fetch_gives_up_after_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/down.ts"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let result = test_fetcher(2).fetch(url(&server, "/down.ts")).await;
    match result {
        Err(e @ VodlError::HttpError(StatusCode::INTERNAL_SERVER_ERROR)) => {
            assert!(e.is_fetch_error())
        }
        other => panic!("expected HTTP 500, got {other:?}"),
    }
}

#[tokio::test]
async fn fetch_does_not_retry_client_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing.ts"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let result = test_fetcher(3).fetch(url(&server, "/missing.ts")).await;
    assert!(matches!(
        result,
        Err(VodlError::HttpError(StatusCode::NOT_FOUND))
    ));
}

#[tokio::test]
async fn fetch_rejects_non_ok_success_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/partial.ts"))
        .respond_with(ResponseTemplate::new(206).set_body_string("part"))
        .expect(1)
        .mount(&server)
        .await;

    let result = test_fetcher(3).fetch(url(&server, "/partial.ts")).await;
    assert!(matches!(
        result,
        Err(VodlError::HttpError(StatusCode::PARTIAL_CONTENT))
    ));
}

#[tokio::test]
async fn fetch_transport_error() {
    // nothing listens on the discard port
    let result = test_fetcher(1)
        .fetch("http://127.0.0.1:9/index.m3u8".parse().unwrap())
        .await;
    match result {
        Err(e @ VodlError::RequestError(_)) => assert!(e.is_fetch_error()),
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn fetch_master_rejects_media_playlist() {
    let server = MockServer::start().await;
    server
        .mock_media_playlist("/index.m3u8", &["seg0.ts"])
        .await;

    let result = test_fetcher(0)
        .fetch_master_manifest(url(&server, "/index.m3u8"))
        .await;
    assert!(matches!(
        result,
        Err(VodlError::UnexpectedPlaylistType {
            expected: PlaylistType::Master,
            actual: PlaylistType::Media,
        })
    ));
}

#[tokio::test]
async fn fetch_media_rejects_master_playlist() {
    let server = MockServer::start().await;
    server
        .mock_master_playlist("/master.m3u8", &[(500000, "low.m3u8")])
        .await;

    let result = test_fetcher(0)
        .fetch_media_manifest(url(&server, "/master.m3u8"))
        .await;
    assert!(matches!(
        result,
        Err(VodlError::UnexpectedPlaylistType {
            expected: PlaylistType::Media,
            actual: PlaylistType::Master,
        })
    ));
}

#[tokio::test]
async fn fetch_manifest_decode_error() {
    let server = MockServer::start().await;
    server.mock("/index.m3u8", "<html>gone</html>").await;

    let result = test_fetcher(0)
        .fetch_media_manifest(url(&server, "/index.m3u8"))
        .await;
    assert!(matches!(result, Err(VodlError::M3u8ParseError(_))));
}

#[tokio::test]
async fn fetch_keeps_cookies_between_requests() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/index.m3u8"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Set-Cookie", "token=abc; Path=/")
                .set_body_string("#EXTM3U\n#EXTINF:4,\nseg.ts\n#EXT-X-ENDLIST\n"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/seg.ts"))
        .and(header("cookie", "token=abc"))
        .respond_with(ResponseTemplate::new(200).set_body_string("authorized"))
        .mount(&server)
        .await;

    let fetcher = test_fetcher(0);
    fetcher.fetch_media_manifest(url(&server, "/index.m3u8")).await?;
    let body = fetcher.fetch_segment(url(&server, "/seg.ts")).await?;
    assert_eq!(&body[..], b"authorized");

    let cookies = fetcher.client().cookies();
    let store = cookies.lock().unwrap();
    assert!(store.iter_any().any(|cookie| cookie.name() == "token"));
    Ok(())
}
