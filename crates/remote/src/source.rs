//! The page fetch capability.

use std::time::Duration;

use async_trait::async_trait;
use exn::ResultExt;
use tracing::instrument;
use url::Url;

use crate::error::{ErrorKind, Result};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const READ_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("modwatch/", env!("CARGO_PKG_VERSION"));

/// Fetches one document by URL.
///
/// The reconciler only ever needs "give me the text of this page", so that
/// is the whole contract. Keeping it a trait lets tests feed literal HTML
/// fixtures through the same code path the real client uses.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<String>;
}

/// Plain HTTPS GET page source.
///
/// One client, shared timeouts, fixed user-agent, no authentication and no
/// retries: a failed fetch is reported once and the next reconcile run
/// tries again. A hung remote stalls the current mod until the read
/// timeout fires.
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(READ_TIMEOUT)
            .build()
            .or_raise(|| ErrorKind::Fetch)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageSource for HttpSource {
    #[instrument(skip(self), fields(url = %url))]
    async fn fetch(&self, url: &Url) -> Result<String> {
        let response = self.client.get(url.clone()).send().await.or_raise(|| ErrorKind::Fetch)?;
        let status = response.status();
        if !status.is_success() {
            exn::bail!(ErrorKind::Status(status.as_u16()));
        }
        response.text().await.or_raise(|| ErrorKind::Fetch)
    }
}
