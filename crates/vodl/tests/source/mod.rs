use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use bytes::Bytes;
use reqwest::{StatusCode, Url};
use tokio::sync::{Notify, Semaphore};
use vodl::{download::SegmentSource, VodlError, VodlResult};

/// In-memory segment source recording how many fetches run at once.
#[derive(Clone, Default)]
pub struct TestSource {
    failing: Arc<HashSet<String>>,
    delay: Duration,
    gate: Option<Arc<Semaphore>>,
    entered: Arc<Notify>,

    started: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    fetched: Arc<AtomicUsize>,
}

impl TestSource {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            ..Default::default()
        }
    }

    /// Every fetch blocks until [TestSource::release] lets it through.
    pub fn gated() -> Self {
        Self {
            gate: Some(Arc::new(Semaphore::new(0))),
            ..Default::default()
        }
    }

    /// Let `n` blocked fetches finish.
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    /// Wait until at least `n` fetches have started.
    pub async fn wait_started(&self, n: usize) {
        while self.started() < n {
            self.entered.notified().await;
        }
    }

    /// Fetching any of `urls` fails with `404 Not Found`.
    pub fn with_failing<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.failing = Arc::new(urls.into_iter().map(Into::into).collect());
        self
    }

    pub fn body_of(url: &str) -> String {
        format!("data of {url}")
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn fetched(&self) -> usize {
        self.fetched.load(Ordering::SeqCst)
    }
}

impl SegmentSource for TestSource {
    async fn fetch_segment(&self, url: &Url) -> VodlResult<Bytes> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        self.started.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();

        if let Some(gate) = &self.gate {
            gate.acquire().await?.forget();
        }
        tokio::time::sleep(self.delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.fetched.fetch_add(1, Ordering::SeqCst);

        if self.failing.contains(url.as_str()) {
            return Err(VodlError::HttpError(StatusCode::NOT_FOUND));
        }
        Ok(Bytes::from(Self::body_of(url.as_str())))
    }
}
