//! Fetching from a seismic feed.
//!
//! One GET per call, no pagination, no retry: the caller decides what to do on failure.
//!

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use clap::{crate_name, crate_version};
use reqwest::{Client, StatusCode};
use tracing::{debug, info, trace};

use terremoto_common::TimeWindow;
use terremoto_formats::SeismicEvent;

use crate::{FetchError, Site};

/// Default timeout for every network call
pub const DEF_TIMEOUT: Duration = Duration::from_secs(30);

/// Result of one fetch.
///
#[derive(Clone, Debug, Default)]
pub struct Feed {
    /// Normalized events, in provider order
    pub events: Vec<SeismicEvent>,
    /// Number of events before any radius filtering
    pub total: usize,
}

impl From<Vec<SeismicEvent>> for Feed {
    fn from(events: Vec<SeismicEvent>) -> Self {
        let total = events.len();
        Feed { events, total }
    }
}

/// This trait enables us to manage different feeds under a single interface.
///
#[async_trait]
pub trait Fetchable: Debug + Send + Sync {
    /// Return site's name
    fn name(&self) -> String;
    /// Fetch and normalize all events within `window`
    async fn fetch(&self, window: &TimeWindow) -> Result<Feed, FetchError>;
}

/// HTTP client for one FDSN event site.
///
#[derive(Clone, Debug)]
pub struct FeedClient {
    /// Which site we talk to
    pub site: Site,
    /// Minimum magnitude, 0 means everything
    pub min_magnitude: f64,
    /// Timeout for the whole request
    pub timeout: Duration,
    /// reqwest client
    client: Client,
}

impl FeedClient {
    #[tracing::instrument]
    pub fn new(site: Site, timeout: Duration, min_magnitude: f64) -> Result<Self, FetchError> {
        trace!("feed::new({})", site.name);

        let client = Client::builder().timeout(timeout).build()?;
        Ok(FeedClient {
            site,
            min_magnitude,
            timeout,
            client,
        })
    }

    /// Query parameters for `window`.
    ///
    pub fn query(&self, window: &TimeWindow) -> Vec<(String, String)> {
        vec![
            ("format".to_string(), self.site.output.clone()),
            ("starttime".to_string(), window.query_begin()),
            ("endtime".to_string(), window.query_end()),
            (self.site.min_mag.clone(), self.min_magnitude.to_string()),
        ]
    }

    fn map_err(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout(self.timeout.as_secs())
        } else {
            FetchError::HTTP(e)
        }
    }
}

#[async_trait]
impl Fetchable for FeedClient {
    fn name(&self) -> String {
        self.site.name.clone()
    }

    #[tracing::instrument(skip(self), fields(site = %self.site.name))]
    async fn fetch(&self, window: &TimeWindow) -> Result<Feed, FetchError> {
        info!("Querying earthquakes from {}", window);

        let url = self.site.base_url.as_str();
        let query = self.query(window);
        trace!("Fetching data from {} with {:?}…", url, query);

        let resp = http_get_query!(self, url, &query)
            .await
            .map_err(|e| self.map_err(e))?;

        // Check status
        //
        let code = resp.status();
        if code != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                code: code.as_u16(),
                body,
            });
        }

        let body = resp.text().await.map_err(|e| self.map_err(e))?;
        debug!("got {} bytes", body.len());

        let feed = Feed::from(self.site.format.normalize(&body)?);
        info!("Found {} earthquakes in the time period", feed.total);
        Ok(feed)
    }
}
