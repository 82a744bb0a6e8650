mod fetch;

use std::time::Duration;

use vodl::{Fetcher, HttpClient, RetryPolicy};
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

pub fn test_fetcher(retries: u32) -> Fetcher {
    Fetcher::new(
        HttpClient::default(),
        RetryPolicy {
            retries,
            backoff: Duration::from_millis(10),
            max_backoff: Duration::from_millis(50),
        },
    )
}

pub trait HlsMock {
    async fn mock<S>(&self, mock_path: &str, body: S) -> &Self
    where
        S: AsRef<[u8]>;

    async fn mock_master_playlist(&self, mock_path: &str, variants: &[(u64, &str)]) -> &Self;

    async fn mock_media_playlist(&self, mock_path: &str, segments: &[&str]) -> &Self;
}

impl HlsMock for MockServer {
    async fn mock<S>(&self, mock_path: &str, body: S) -> &Self
    where
        S: AsRef<[u8]>,
    {
        Mock::given(method("GET"))
            .and(path(mock_path))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.as_ref()))
            .mount(self)
            .await;
        self
    }

    async fn mock_master_playlist(&self, mock_path: &str, variants: &[(u64, &str)]) -> &Self {
        let mut body = String::from("#EXTM3U\n");
        for (bandwidth, uri) in variants {
            body.push_str(&format!("#EXT-X-STREAM-INF:BANDWIDTH={bandwidth}\n{uri}\n"));
        }
        self.mock(mock_path, body).await
    }

    async fn mock_media_playlist(&self, mock_path: &str, segments: &[&str]) -> &Self {
        let mut body = String::from("#EXTM3U\n#EXT-X-TARGETDURATION:10\n#EXT-X-VERSION:3\n");
        for segment in segments {
            body.push_str(&format!("#EXTINF:9.009,\n{segment}\n"));
        }
        body.push_str("#EXT-X-ENDLIST\n");
        self.mock(mock_path, body).await
    }
}


