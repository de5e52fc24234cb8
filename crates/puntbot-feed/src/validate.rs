//! Row validation — filters raw feed rows down to well-formed records.

use puntbot_core::types::RaceRecord;

use crate::source::FeedRow;

/// Validate a batch of raw rows. Pure and order-preserving: each surviving
/// row becomes exactly one `RaceRecord`, rows failing any check are dropped
/// silently (debug log only), and no partial record is ever produced.
pub fn validate_rows(rows: Vec<FeedRow>) -> Vec<RaceRecord> {
    rows.into_iter().filter_map(validate_row).collect()
}

fn validate_row(row: FeedRow) -> Option<RaceRecord> {
    let track = required(&row.track)?;
    let race_time = required(&row.race_time)?;
    let selection_name = required(&row.selection_name)?;
    let selection = required(&row.selection)?;
    let units_raw = required(&row.units)?;

    if !selection.chars().all(|c| c.is_ascii_digit()) {
        tracing::debug!("Dropping row: non-digit selection '{selection}'");
        return None;
    }
    if !is_decimal(&units_raw) {
        tracing::debug!("Dropping row: non-numeric units '{units_raw}'");
        return None;
    }
    let units: f64 = units_raw.parse().ok()?;

    // Race number is informational only; a missing one renders blank.
    let race = required(&row.race).unwrap_or_default();

    let channel_override = row
        .channel_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from);

    Some(RaceRecord {
        track,
        race,
        race_time,
        selection,
        selection_name,
        units,
        channel_override,
    })
}

fn required(field: &Option<String>) -> Option<String> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Non-negative decimal: digits with at most one decimal point. Rejects
/// signs, exponents, and bare dots.
fn is_decimal(s: &str) -> bool {
    let mut dots = 0;
    let mut digits = 0;
    for c in s.chars() {
        match c {
            '.' => dots += 1,
            d if d.is_ascii_digit() => digits += 1,
            _ => return false,
        }
    }
    digits > 0 && dots <= 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> FeedRow {
        FeedRow {
            track: Some("Flemington".into()),
            race: Some("7".into()),
            race_time: Some("14:30".into()),
            selection_name: Some("Fast Lad".into()),
            selection: Some("4".into()),
            units: Some("2.0".into()),
            channel_id: None,
        }
    }

    #[test]
    fn test_valid_row_passes() {
        let records = validate_rows(vec![row()]);
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.track, "Flemington");
        assert_eq!(r.units, 2.0);
        assert_eq!(r.channel_override, None);
    }

    #[test]
    fn test_missing_required_field_dropped() {
        for strip in ["track", "race_time", "selection_name", "selection", "units"] {
            let mut r = row();
            match strip {
                "track" => r.track = None,
                "race_time" => r.race_time = Some("  ".into()),
                "selection_name" => r.selection_name = Some(String::new()),
                "selection" => r.selection = None,
                "units" => r.units = None,
                _ => unreachable!(),
            }
            assert!(validate_rows(vec![r]).is_empty(), "expected drop for {strip}");
        }
    }

    #[test]
    fn test_missing_race_number_still_validates() {
        for race in [None, Some(String::new()), Some("  ".into())] {
            let mut r = row();
            r.race = race;
            let records = validate_rows(vec![r]);
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].race, "");
        }
    }

    #[test]
    fn test_non_digit_selection_dropped() {
        for bad in ["4a", "-4", "4.0", ""] {
            let mut r = row();
            r.selection = Some(bad.into());
            assert!(validate_rows(vec![r]).is_empty(), "selection '{bad}'");
        }
    }

    #[test]
    fn test_bad_units_dropped() {
        for bad in ["abc", "-1", "1.2.3", ".", "1e3"] {
            let mut r = row();
            r.units = Some(bad.into());
            assert!(validate_rows(vec![r]).is_empty(), "units '{bad}'");
        }
    }

    #[test]
    fn test_integer_units_accepted() {
        let mut r = row();
        r.units = Some("3".into());
        assert_eq!(validate_rows(vec![r])[0].units, 3.0);
    }

    #[test]
    fn test_order_preserved() {
        let mut second = row();
        second.track = Some("Randwick".into());
        let mut bad = row();
        bad.units = Some("x".into());
        let records = validate_rows(vec![row(), bad, second]);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].track, "Flemington");
        assert_eq!(records[1].track, "Randwick");
    }

    #[test]
    fn test_channel_override_blank_is_none() {
        let mut r = row();
        r.channel_id = Some("  ".into());
        assert_eq!(validate_rows(vec![r])[0].channel_override, None);
    }
}
