//! The one timing primitive used by both binaries: "run X after duration D", where D comes from
//! a [`Cadence`]. The collector registers a twice-daily wall-clock cadence, the viewer a fixed
//! auto-refresh interval.

use chrono::{
    DateTime,
    Days,
    Local,
    NaiveTime,
    TimeZone,
};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cadence {
    /// A fixed period between runs.
    Every(Duration),
    /// Wall-clock times of day, in the time zone of the instant passed to [`Cadence::delay_from`].
    DailyAt(Vec<NaiveTime>),
}

impl Cadence {
    /// `00:00` and `12:00`.
    pub fn twice_daily() -> Self {
        Cadence::DailyAt(vec![NaiveTime::MIN, NaiveTime::MIN + chrono::Duration::hours(12)])
    }

    /// Time until the next run strictly after `now`. `None` if the cadence never fires.
    pub fn delay_from<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<Duration> {
        match self {
            Cadence::Every(period) => (!period.is_zero()).then_some(*period),
            Cadence::DailyAt(times) => {
                let tz = now.timezone();
                let today = now.date_naive();
                // Two extra days cover a time that falls into a DST gap tomorrow.
                (0..=2)
                    .filter_map(|offset| today.checked_add_days(Days::new(offset)))
                    .flat_map(|date| times.iter().map(move |time| date.and_time(*time)))
                    .filter_map(|naive| tz.from_local_datetime(&naive).earliest())
                    .filter(|at| at > now)
                    .min()
                    .and_then(|at| (at - now.clone()).to_std().ok())
            }
        }
    }
}

/// Sleeps until the next firing of a cadence, measured against the local clock.
///
/// `tick` is cancel safe: an interrupted tick keeps its deadline for the next call.
#[derive(Debug)]
pub struct Ticker {
    cadence: Cadence,
    deadline: Option<Instant>,
}

impl Ticker {
    pub fn new(cadence: Cadence) -> Self {
        Self {
            cadence,
            deadline: None,
        }
    }

    pub fn cadence(&self) -> &Cadence {
        &self.cadence
    }

    pub async fn tick(&mut self) {
        let deadline = match self.deadline {
            Some(deadline) => deadline,
            None => match self.cadence.delay_from(&Local::now()) {
                Some(delay) => {
                    debug!(delay = %humantime::format_duration(delay), "next run scheduled");
                    let deadline = Instant::now() + delay;
                    self.deadline = Some(deadline);
                    deadline
                }
                None => {
                    warn!(cadence = ?self.cadence, "cadence never fires");
                    return std::future::pending().await;
                }
            },
        };
        tokio::time::sleep_until(deadline).await;
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{
        FixedOffset,
        Utc,
    };

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, h, m, 0).unwrap()
    }

    #[test]
    fn every_is_constant() {
        let cadence = Cadence::Every(Duration::from_secs(1800));
        assert_eq!(cadence.delay_from(&at(9, 0)), Some(Duration::from_secs(1800)));
        assert_eq!(Cadence::Every(Duration::ZERO).delay_from(&at(9, 0)), None);
    }

    #[test]
    fn twice_daily_fires_at_midnight_and_noon() {
        let cadence = Cadence::twice_daily();
        assert_eq!(cadence.delay_from(&at(9, 30)), Some(Duration::from_secs(150 * 60)));
        assert_eq!(cadence.delay_from(&at(12, 0)), Some(Duration::from_secs(12 * 3600)));
        assert_eq!(cadence.delay_from(&at(23, 0)), Some(Duration::from_secs(3600)));
        assert_eq!(cadence.delay_from(&at(0, 0)), Some(Duration::from_secs(12 * 3600)));
    }

    #[test]
    fn daily_times_use_the_instants_zone() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        // 10:00 UTC is 12:00 at +02:00, so the next run is midnight local.
        let now = at(10, 0).with_timezone(&plus_two);
        assert_eq!(
            Cadence::twice_daily().delay_from(&now),
            Some(Duration::from_secs(12 * 3600))
        );
    }

    #[test]
    fn empty_daily_never_fires() {
        assert_eq!(Cadence::DailyAt(Vec::new()).delay_from(&at(1, 0)), None);
    }

    #[tokio::test]
    async fn ticker_waits_for_each_period() {
        let mut ticker = Ticker::new(Cadence::Every(Duration::from_millis(20)));
        let started = Instant::now();
        ticker.tick().await;
        ticker.tick().await;
        assert!(started.elapsed() >= Duration::from_millis(40));
    }
}
