//! Send-time calculation — race start time plus lead time, in a fixed zone.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;

use puntbot_core::config::DEFAULT_TIMEZONE;
use puntbot_core::types::RaceRecord;

/// Converts a record's `HH:MM` start time into absolute start and fire
/// instants on today's date in the configured zone. All "now" comparisons
/// downstream use the same zone; no conversion happens after this point.
#[derive(Debug, Clone)]
pub struct SendTimeCalculator {
    tz: Tz,
    lead: Duration,
}

impl SendTimeCalculator {
    /// Build a calculator for the named IANA zone. An unknown or empty name
    /// falls back to the default zone with a warning rather than failing.
    pub fn new(timezone: &str, lead_minutes: u32) -> Self {
        let tz = match timezone.parse::<Tz>() {
            Ok(tz) => tz,
            Err(_) => {
                tracing::warn!(
                    "Unknown timezone '{timezone}', falling back to {DEFAULT_TIMEZONE}"
                );
                DEFAULT_TIMEZONE.parse().expect("default timezone is valid")
            }
        };
        Self {
            tz,
            lead: Duration::minutes(i64::from(lead_minutes)),
        }
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    /// Current wall-clock time in the configured zone.
    pub fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.tz)
    }

    /// Today's calendar date in the configured zone.
    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// `(start, fire)` instants for a record on today's date, or `None` when
    /// the time string does not match strict `HH:MM` (the record is skipped).
    pub fn schedule_for(&self, record: &RaceRecord) -> Option<(DateTime<Tz>, DateTime<Tz>)> {
        self.schedule_on(self.today(), record)
    }

    /// Same as `schedule_for` with an explicit date.
    pub fn schedule_on(
        &self,
        date: NaiveDate,
        record: &RaceRecord,
    ) -> Option<(DateTime<Tz>, DateTime<Tz>)> {
        let time = parse_race_time(&record.race_time)?;
        // earliest() resolves the ambiguous side of a DST transition and is
        // None for times skipped by one.
        let start = date.and_time(time).and_local_timezone(self.tz).earliest()?;
        let fire = start - self.lead;
        Some((start, fire))
    }
}

/// Strict 24-hour `HH:MM`: exactly two digits, a colon, two digits.
fn parse_race_time(s: &str) -> Option<NaiveTime> {
    let bytes = s.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return None;
    }
    if !bytes[..2].iter().chain(&bytes[3..]).all(u8::is_ascii_digit) {
        return None;
    }
    NaiveTime::parse_from_str(s, "%H:%M").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn record(time: &str) -> RaceRecord {
        RaceRecord {
            track: "Flemington".into(),
            race: "7".into(),
            race_time: time.into(),
            selection: "4".into(),
            selection_name: "Fast Lad".into(),
            units: 2.0,
            channel_override: None,
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 29).unwrap()
    }

    #[test]
    fn test_fire_is_start_minus_lead() {
        let calc = SendTimeCalculator::new("Australia/Sydney", 10);
        let (start, fire) = calc.schedule_on(date(), &record("14:30")).unwrap();
        assert_eq!(start.hour(), 14);
        assert_eq!(start.minute(), 30);
        assert_eq!(fire.hour(), 14);
        assert_eq!(fire.minute(), 20);
        assert_eq!(start - fire, Duration::minutes(10));
    }

    #[test]
    fn test_zero_lead() {
        let calc = SendTimeCalculator::new("Australia/Sydney", 0);
        let (start, fire) = calc.schedule_on(date(), &record("14:30")).unwrap();
        assert_eq!(start, fire);
    }

    #[test]
    fn test_strict_time_format() {
        let calc = SendTimeCalculator::new("Australia/Sydney", 10);
        for bad in ["9:30", "14.30", "14:30:00", "24:00", "14:65", "", "ab:cd"] {
            assert!(
                calc.schedule_on(date(), &record(bad)).is_none(),
                "expected rejection of '{bad}'"
            );
        }
    }

    #[test]
    fn test_computed_in_configured_zone() {
        let sydney = SendTimeCalculator::new("Australia/Sydney", 10);
        let perth = SendTimeCalculator::new("Australia/Perth", 10);
        let (s1, _) = sydney.schedule_on(date(), &record("14:30")).unwrap();
        let (s2, _) = perth.schedule_on(date(), &record("14:30")).unwrap();
        // Same wall-clock time, different instants.
        assert_ne!(s1.with_timezone(&Utc), s2.with_timezone(&Utc));
    }

    #[test]
    fn test_unknown_zone_falls_back() {
        let calc = SendTimeCalculator::new("Mars/Olympus_Mons", 10);
        assert_eq!(calc.tz(), chrono_tz::Australia::Sydney);
    }
}
