use chrono::{DateTime, Duration, Local, NaiveTime, TimeZone};

/// Source of "now" on the device clock
pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Local>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Local> {
    Local::now()
  }
}

/// Next instant at wall-clock `at` strictly after `now`.
///
/// Today's occurrence if it is still ahead, otherwise tomorrow's. A wall-clock
/// time skipped by a DST jump on a given day moves on to the following day.
pub fn next_fire_at<Tz: TimeZone>(now: &DateTime<Tz>, at: NaiveTime) -> DateTime<Tz> {
  let tz = now.timezone();
  let mut day = now.date_naive();

  for _ in 0..3 {
    if let Some(candidate) = tz.from_local_datetime(&day.and_time(at)).earliest() {
      if candidate > *now {
        return candidate;
      }
    }
    match day.succ_opt() {
      Some(next) => day = next,
      None => break,
    }
  }

  now.clone() + Duration::days(1)
}

/// Whole seconds from `now` until `fire_at`, rounded up so the trigger never
/// fires before `fire_at`. Never less than one.
pub fn seconds_until<Tz: TimeZone>(now: &DateTime<Tz>, fire_at: &DateTime<Tz>) -> u64 {
  let delta = fire_at.clone().signed_duration_since(now.clone());
  let mut seconds = delta.num_seconds();
  if delta > Duration::seconds(seconds) {
    seconds += 1;
  }
  seconds.max(1) as u64
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::{FixedOffset, NaiveDate, Timelike};

  fn seven() -> NaiveTime {
    NaiveTime::from_hms_opt(7, 0, 0).unwrap()
  }

  fn at(h: u32, m: u32, s: u32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(2 * 3600)
      .unwrap()
      .with_ymd_and_hms(2025, 6, 1, h, m, s)
      .unwrap()
  }

  #[test]
  fn test_before_seven_fires_same_day() {
    let fire = next_fire_at(&at(6, 0, 0), seven());
    assert_eq!(fire.date_naive(), NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
    assert_eq!((fire.hour(), fire.minute(), fire.second()), (7, 0, 0));
    assert_eq!(fire.nanosecond(), 0);
  }

  #[test]
  fn test_after_seven_fires_next_day() {
    let fire = next_fire_at(&at(8, 0, 0), seven());
    assert_eq!(fire.date_naive(), NaiveDate::from_ymd_opt(2025, 6, 2).unwrap());
    assert_eq!(fire.hour(), 7);
  }

  #[test]
  fn test_exactly_seven_is_not_strictly_future() {
    let fire = next_fire_at(&at(7, 0, 0), seven());
    assert_eq!(fire.date_naive(), NaiveDate::from_ymd_opt(2025, 6, 2).unwrap());
  }

  #[test]
  fn test_month_boundary_rolls_over() {
    let now = FixedOffset::east_opt(0)
      .unwrap()
      .with_ymd_and_hms(2025, 6, 30, 23, 59, 59)
      .unwrap();
    let fire = next_fire_at(&now, seven());
    assert_eq!(fire.date_naive(), NaiveDate::from_ymd_opt(2025, 7, 1).unwrap());
  }

  #[test]
  fn test_seconds_until() {
    let now = at(6, 0, 0);
    let fire = next_fire_at(&now, seven());
    assert_eq!(seconds_until(&now, &fire), 3600);

    // Delivered a few seconds after 07:00, the next one is just under a day away
    let now = at(7, 0, 3);
    let fire = next_fire_at(&now, seven());
    assert_eq!(seconds_until(&now, &fire), 24 * 3600 - 3);
  }

  #[test]
  fn test_seconds_until_rounds_partial_seconds_up() {
    let now = at(6, 0, 0) + Duration::milliseconds(700);
    let fire = next_fire_at(&now, seven());
    assert_eq!(seconds_until(&now, &fire), 3600);

    let now = at(6, 59, 59) + Duration::milliseconds(700);
    let fire = next_fire_at(&now, seven());
    assert_eq!(seconds_until(&now, &fire), 1);
    assert!(now + Duration::seconds(1) >= fire);
  }

  #[test]
  fn test_seconds_until_is_at_least_one() {
    let now = at(6, 59, 59);
    assert_eq!(seconds_until(&now, &now), 1);
  }
}
