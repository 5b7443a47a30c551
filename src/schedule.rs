//! Daily trigger for the alert cycle.
//!
//! The scheduler fires once per day at a fixed UTC wall-clock time.  Cycles never overlap: the
//! next trigger is computed only after the previous cycle has returned, so a trigger that would
//! have fired while a cycle was running is skipped, not queued.
//!
//! Time is read through the `Clock` trait so tests can drive days in milliseconds.
//!

use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Days, NaiveTime, Utc};
use strum::EnumString;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, trace, warn};

use crate::Alert;

/// Errors when parsing the alert time.
///
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ScheduleError {
    #[error("invalid alert time format: {0:?} (expected HH:MM)")]
    Format(String),
    #[error("invalid hour: {0} (must be 0-23)")]
    Hour(u32),
    #[error("invalid minute: {0} (must be 0-59)")]
    Minute(u32),
}

/// Time of day, UTC, at which the alert is sent.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AlertSchedule {
    hour: u32,
    minute: u32,
}

impl Default for AlertSchedule {
    /// 08:00
    ///
    fn default() -> Self {
        AlertSchedule { hour: 8, minute: 0 }
    }
}

impl AlertSchedule {
    pub fn new(hour: u32, minute: u32) -> Result<Self, ScheduleError> {
        if hour > 23 {
            return Err(ScheduleError::Hour(hour));
        }
        if minute > 59 {
            return Err(ScheduleError::Minute(minute));
        }
        Ok(AlertSchedule { hour, minute })
    }

    /// First trigger strictly after `now`.
    ///
    pub fn next_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        // Both are checked in `new()`
        //
        let at = NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or_default();

        let today = now.date_naive().and_time(at).and_utc();
        if today > now {
            today
        } else {
            today + Days::new(1)
        }
    }
}

impl FromStr for AlertSchedule {
    type Err = ScheduleError;

    /// Parse "HH:MM", leading zeroes optional.
    ///
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ScheduleError::Format(s.to_string());

        let (h, m) = s.trim().split_once(':').ok_or_else(bad)?;
        let hour = h.parse::<u32>().map_err(|_| bad())?;
        let minute = m.parse::<u32>().map_err(|_| bad())?;
        AlertSchedule::new(hour, minute)
    }
}

impl Display for AlertSchedule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Source of time.
///
#[async_trait]
pub trait Clock: Debug + Send + Sync {
    fn now(&self) -> DateTime<Utc>;
    /// Return once `deadline` is reached, immediately if it is in the past
    async fn sleep_until(&self, deadline: DateTime<Utc>);
}

/// The real thing.
///
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep_until(&self, deadline: DateTime<Utc>) {
        // The wall clock may be stepped back while we sleep, check again on wakeup
        //
        while let Ok(left) = (deadline - Utc::now()).to_std() {
            if left.is_zero() {
                break;
            }
            tokio::time::sleep(left).await;
        }
    }
}

/// Lifecycle of the scheduler.
///
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, EnumString, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum SchedulerState {
    /// Created, not started
    #[default]
    Idle,
    /// Waiting for the next trigger
    Armed,
    /// One cycle in progress
    Running,
    /// Terminal
    Stopped,
}

/// Outside view of a scheduler: watch its state, ask it to stop.
///
/// Dropping the handle stops the scheduler as well.
///
#[derive(Debug)]
pub struct SchedulerHandle {
    state: watch::Receiver<SchedulerState>,
    stop: watch::Sender<bool>,
}

impl SchedulerHandle {
    /// Request shutdown.  An in-flight cycle is abandoned.
    ///
    pub fn stop(&self) {
        let _ = self.stop.send(true);
    }

    pub fn state(&self) -> SchedulerState {
        *self.state.borrow()
    }

    /// Wait until the scheduler reaches `state`.  Returns false if it is gone before that.
    ///
    pub async fn wait_for(&mut self, state: SchedulerState) -> bool {
        self.state.wait_for(|s| *s == state).await.is_ok()
    }
}

/// Runs `alert` every day at `schedule`.
///
#[derive(Debug)]
pub struct Scheduler<C: Clock> {
    schedule: AlertSchedule,
    run_immediately: bool,
    alert: Alert,
    clock: C,
    state: watch::Sender<SchedulerState>,
    stop: watch::Receiver<bool>,
}

impl<C: Clock> Scheduler<C> {
    pub fn new(
        schedule: AlertSchedule,
        run_immediately: bool,
        alert: Alert,
        clock: C,
    ) -> (Self, SchedulerHandle) {
        let (state_tx, state_rx) = watch::channel(SchedulerState::Idle);
        let (stop_tx, stop_rx) = watch::channel(false);

        let sched = Scheduler {
            schedule,
            run_immediately,
            alert,
            clock,
            state: state_tx,
            stop: stop_rx,
        };
        let handle = SchedulerHandle {
            state: state_rx,
            stop: stop_tx,
        };
        (sched, handle)
    }

    fn set(&self, state: SchedulerState) {
        trace!("scheduler is {}", state);
        self.state.send_replace(state);
    }

    fn stopping(&self) -> bool {
        *self.stop.borrow()
    }

    /// Run one cycle unless stopped in the middle.  Returns `false` if stop was requested.
    ///
    async fn cycle(&mut self) -> bool {
        self.set(SchedulerState::Running);

        let now = self.clock.now();
        tokio::select! {
            _ = self.alert.run_logged(now) => true,
            _ = self.stop.changed() => {
                warn!("Stop requested, abandoning current check");
                false
            }
        }
    }

    /// Main loop, returns only once stopped.
    ///
    #[tracing::instrument(skip(self))]
    pub async fn run(mut self) {
        info!(
            "Earthquake alert system started. Daily alerts scheduled for {} UTC",
            self.schedule
        );

        let mut running = true;
        if self.run_immediately && !self.stopping() {
            info!("Running immediate check...");
            running = self.cycle().await;
        }

        while running && !self.stopping() {
            let next = self.schedule.next_after(self.clock.now());
            self.set(SchedulerState::Armed);
            info!("Next check at {}", next.format("%Y-%m-%d %H:%M UTC"));

            running = tokio::select! {
                _ = self.clock.sleep_until(next) => true,
                _ = self.stop.changed() => false,
            };
            if running {
                running = self.cycle().await;
            }
        }

        self.set(SchedulerState::Stopped);
        info!("Earthquake alert system stopped");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use chrono::TimeZone;
    use rstest::rstest;
    use tokio::sync::Notify;

    use terremoto_common::TimeWindow;
    use terremoto_formats::SeismicEvent;
    use terremoto_sources::{Feed, FetchError, Fetchable, NotificationError, Notifier};

    use crate::HomeLocation;

    use super::*;

    #[rstest]
    #[case("08:00", 8, 0)]
    #[case("00:00", 0, 0)]
    #[case("23:59", 23, 59)]
    #[case("8:5", 8, 5)]
    #[case(" 07:30 ", 7, 30)]
    fn test_schedule_parse_ok(#[case] s: &str, #[case] hour: u32, #[case] minute: u32) {
        assert_eq!(AlertSchedule::new(hour, minute), s.parse());
    }

    #[rstest]
    #[case("24:00", ScheduleError::Hour(24))]
    #[case("00:60", ScheduleError::Minute(60))]
    #[case("0800", ScheduleError::Format("0800".to_string()))]
    #[case("aa:bb", ScheduleError::Format("aa:bb".to_string()))]
    #[case("-1:00", ScheduleError::Format("-1:00".to_string()))]
    #[case("", ScheduleError::Format("".to_string()))]
    fn test_schedule_parse_bad(#[case] s: &str, #[case] err: ScheduleError) {
        assert_eq!(Err(err), s.parse::<AlertSchedule>());
    }

    #[test]
    fn test_schedule_display() {
        assert_eq!("08:05", AlertSchedule::new(8, 5).unwrap().to_string());
    }

    #[rstest]
    #[case((7, 59, 59), (2024, 3, 1, 8, 0))]
    #[case((8, 0, 0), (2024, 3, 2, 8, 0))]
    #[case((12, 0, 0), (2024, 3, 2, 8, 0))]
    #[case((0, 0, 0), (2024, 3, 1, 8, 0))]
    fn test_schedule_next_after(
        #[case] now: (u32, u32, u32),
        #[case] next: (i32, u32, u32, u32, u32),
    ) {
        let s = AlertSchedule::default();
        let now = Utc.with_ymd_and_hms(2024, 3, 1, now.0, now.1, now.2).unwrap();
        let next = Utc
            .with_ymd_and_hms(next.0, next.1, next.2, next.3, next.4, 0)
            .unwrap();
        assert_eq!(next, s.next_after(now));
    }

    #[test]
    fn test_schedule_next_after_month_end() {
        let s = AlertSchedule::default();
        let now = Utc.with_ymd_and_hms(2024, 2, 29, 9, 0, 0).unwrap();
        assert_eq!(
            Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap(),
            s.next_after(now)
        );
    }

    /// Clock that jumps straight to the deadline.
    ///
    #[derive(Debug)]
    struct FakeClock {
        now: Mutex<DateTime<Utc>>,
        wakeups: Mutex<Vec<DateTime<Utc>>>,
        /// Stop sleeping after that many wakeups
        max: usize,
    }

    impl FakeClock {
        fn new(now: DateTime<Utc>, max: usize) -> Arc<Self> {
            Arc::new(FakeClock {
                now: Mutex::new(now),
                wakeups: Mutex::new(vec![]),
                max,
            })
        }

        fn wakeups(&self) -> Vec<DateTime<Utc>> {
            self.wakeups.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Clock for Arc<FakeClock> {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }

        async fn sleep_until(&self, deadline: DateTime<Utc>) {
            let exhausted = self.wakeups.lock().unwrap().len() >= self.max;
            if exhausted {
                std::future::pending::<()>().await;
            }
            *self.now.lock().unwrap() = deadline;
            self.wakeups.lock().unwrap().push(deadline);
        }
    }

    #[derive(Debug)]
    struct FakeFeed {
        fail: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Fetchable for FakeFeed {
        fn name(&self) -> String {
            "fake".to_string()
        }

        async fn fetch(&self, _window: &TimeWindow) -> Result<Feed, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(FetchError::Status {
                    code: 503,
                    body: "down".to_string(),
                });
            }
            Ok(Feed::from(vec![SeismicEvent {
                magnitude: 3.,
                latitude: 40.7128,
                longitude: -74.0060,
                ..SeismicEvent::default()
            }]))
        }
    }

    #[derive(Debug, Default)]
    struct FakeNotifier {
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Notifier for FakeNotifier {
        fn name(&self) -> String {
            "fake".to_string()
        }

        async fn send(&self, message: &str) -> Result<(), NotificationError> {
            self.sent.lock().unwrap().push(message.to_string());
            Ok(())
        }
    }

    /// Fetch that never returns until told to.
    ///
    #[derive(Debug, Default)]
    struct StuckFeed {
        entered: Notify,
    }

    #[async_trait]
    impl Fetchable for StuckFeed {
        fn name(&self) -> String {
            "stuck".to_string()
        }

        async fn fetch(&self, _window: &TimeWindow) -> Result<Feed, FetchError> {
            self.entered.notify_one();
            std::future::pending().await
        }
    }

    fn alert(feed: Arc<dyn Fetchable>, notifier: Arc<FakeNotifier>) -> Alert {
        let home = HomeLocation::new(40.7128, -74.0060, 100.).unwrap();
        Alert::new(feed, notifier, home, 24)
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 7, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_scheduler_fires_daily() {
        let clock = FakeClock::new(start(), 2);
        let feed = Arc::new(FakeFeed {
            fail: false,
            calls: AtomicUsize::new(0),
        });
        let notifier = Arc::new(FakeNotifier::default());

        let (sched, mut handle) = Scheduler::new(
            AlertSchedule::default(),
            false,
            alert(feed.clone(), notifier.clone()),
            clock.clone(),
        );
        assert_eq!(SchedulerState::Idle, handle.state());

        let task = tokio::spawn(sched.run());

        // Two wakeups then the fake clock blocks forever while Armed
        //
        while clock.wakeups().len() < 2 || notifier.sent.lock().unwrap().len() < 2 {
            tokio::task::yield_now().await;
        }
        assert!(handle.wait_for(SchedulerState::Armed).await);

        assert_eq!(
            vec![
                Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 3, 2, 8, 0, 0).unwrap(),
            ],
            clock.wakeups()
        );
        assert_eq!(2, feed.calls.load(Ordering::SeqCst));

        handle.stop();
        task.await.unwrap();
        assert_eq!(SchedulerState::Stopped, handle.state());
    }

    #[tokio::test]
    async fn test_scheduler_fetch_error_sends_nothing() {
        let clock = FakeClock::new(start(), 1);
        let feed = Arc::new(FakeFeed {
            fail: true,
            calls: AtomicUsize::new(0),
        });
        let notifier = Arc::new(FakeNotifier::default());

        let (sched, mut handle) = Scheduler::new(
            AlertSchedule::default(),
            false,
            alert(feed.clone(), notifier.clone()),
            clock.clone(),
        );
        let task = tokio::spawn(sched.run());

        while feed.calls.load(Ordering::SeqCst) < 1 {
            tokio::task::yield_now().await;
        }

        // Failed cycle, back to waiting for tomorrow
        //
        assert!(handle.wait_for(SchedulerState::Armed).await);
        assert!(notifier.sent.lock().unwrap().is_empty());

        handle.stop();
        task.await.unwrap();
        assert_eq!(SchedulerState::Stopped, handle.state());
    }

    #[tokio::test]
    async fn test_scheduler_run_immediately() {
        let clock = FakeClock::new(start(), 0);
        let feed = Arc::new(FakeFeed {
            fail: false,
            calls: AtomicUsize::new(0),
        });
        let notifier = Arc::new(FakeNotifier::default());

        let (sched, mut handle) = Scheduler::new(
            AlertSchedule::default(),
            true,
            alert(feed.clone(), notifier.clone()),
            clock.clone(),
        );
        let task = tokio::spawn(sched.run());

        while notifier.sent.lock().unwrap().is_empty() {
            tokio::task::yield_now().await;
        }
        assert!(handle.wait_for(SchedulerState::Armed).await);
        assert!(clock.wakeups().is_empty());

        handle.stop();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_scheduler_stop_aborts_cycle() {
        let clock = FakeClock::new(start(), 0);
        let feed = Arc::new(StuckFeed::default());
        let notifier = Arc::new(FakeNotifier::default());

        let (sched, handle) = Scheduler::new(
            AlertSchedule::default(),
            true,
            alert(feed.clone(), notifier.clone()),
            clock,
        );
        let task = tokio::spawn(sched.run());

        feed.entered.notified().await;
        assert_eq!(SchedulerState::Running, handle.state());

        handle.stop();
        task.await.unwrap();
        assert_eq!(SchedulerState::Stopped, handle.state());
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scheduler_stop_before_start() {
        let clock = FakeClock::new(start(), 0);
        let feed = Arc::new(FakeFeed {
            fail: false,
            calls: AtomicUsize::new(0),
        });
        let notifier = Arc::new(FakeNotifier::default());

        let (sched, handle) = Scheduler::new(
            AlertSchedule::default(),
            true,
            alert(feed.clone(), notifier),
            clock,
        );
        handle.stop();
        sched.run().await;

        assert_eq!(SchedulerState::Stopped, handle.state());
        assert_eq!(0, feed.calls.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_system_clock_past_deadline() {
        let deadline = Utc::now() - chrono::Duration::hours(1);
        tokio::time::timeout(std::time::Duration::from_secs(1), SystemClock.sleep_until(deadline))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_system_clock_reaches_deadline() {
        let deadline = Utc::now() + chrono::Duration::milliseconds(30);
        SystemClock.sleep_until(deadline).await;
        assert!(Utc::now() >= deadline);
    }
}
