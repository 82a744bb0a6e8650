mod parallel;

use std::future::Future;

use bytes::Bytes;
use reqwest::Url;

use crate::error::VodlResult;

pub use parallel::*;

/// Something segment bodies can be fetched from.
pub trait SegmentSource {
    fn fetch_segment(&self, url: &Url) -> impl Future<Output = VodlResult<Bytes>> + Send;
}
