//! One alert cycle: fetch, filter, format, send.
//!
//! A cycle is all-or-nothing as far as the user is concerned: if fetching fails, nothing is
//! sent.  Errors never escape `run_logged()`, the scheduler keeps going no matter what.
//!

use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{error, info};

use terremoto_common::TimeWindow;
use terremoto_sources::{Fetchable, Notifier};

use crate::{filter_by_radius, format_message, CycleError, HomeLocation};

/// Upper bound for a whole cycle, individual requests have their own timeout
pub const CYCLE_TIMEOUT: Duration = Duration::from_secs(300);

/// What happened during one cycle.
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CycleStats {
    /// Events returned by the feed
    pub total: usize,
    /// Events within radius
    pub found: usize,
    /// Wall time
    pub elapsed: Duration,
}

impl Display for CycleStats {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} nearby out of {} in {}ms",
            self.found,
            self.total,
            self.elapsed.as_millis()
        )
    }
}

/// Everything needed to run a cycle.
///
#[derive(Clone, Debug)]
pub struct Alert {
    feed: Arc<dyn Fetchable>,
    notifier: Arc<dyn Notifier>,
    home: HomeLocation,
    window_hours: u32,
    timeout: Duration,
}

impl Alert {
    pub fn new(
        feed: Arc<dyn Fetchable>,
        notifier: Arc<dyn Notifier>,
        home: HomeLocation,
        window_hours: u32,
    ) -> Self {
        Alert {
            feed,
            notifier,
            home,
            window_hours,
            timeout: CYCLE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run one cycle for the window ending at `now`.
    ///
    #[tracing::instrument(
        skip(self),
        fields(feed = %self.feed.name(), notifier = %self.notifier.name())
    )]
    pub async fn run_cycle(&self, now: DateTime<Utc>) -> Result<CycleStats, CycleError> {
        let start = Instant::now();

        let window = TimeWindow::last(self.window_hours, now)?;
        let feed = self.feed.fetch(&window).await?;
        let total = feed.total;

        let nearby = filter_by_radius(feed.events, &self.home);
        info!(
            "Found {} earthquakes within {:.1}km radius",
            nearby.len(),
            self.home.radius_km
        );

        let message = format_message(&nearby, total, &self.home, &window);
        self.notifier.send(&message).await?;

        Ok(CycleStats {
            total,
            found: nearby.len(),
            elapsed: start.elapsed(),
        })
    }

    /// Same as `run_cycle()` but bounded in time, with errors logged instead of returned.
    ///
    pub async fn run_logged(&self, now: DateTime<Utc>) -> Option<CycleStats> {
        info!("Starting daily earthquake alert check");

        let res = match tokio::time::timeout(self.timeout, self.run_cycle(now)).await {
            Ok(res) => res,
            Err(_) => Err(CycleError::Timeout(self.timeout.as_secs())),
        };
        match res {
            Ok(stats) => {
                info!("Daily earthquake alert completed successfully: {}", stats);
                Some(stats)
            }
            Err(e) => {
                error!("{}", e);
                None
            }
        }
    }
}
