//! Calendar arithmetic for the differential transform.

use chrono::NaiveDate;

use crate::error::SeriesError;

const ISO_DATE: &str = "%Y-%m-%d";

/// The calendar day before `date`.
pub fn previous_day(date: NaiveDate) -> Result<NaiveDate, SeriesError> {
    date.pred_opt().ok_or(SeriesError::DateOutOfRange(date))
}

/// String form of [`previous_day`]: `"2021-03-01"` -> `"2021-02-28"`.
pub fn previous_calendar_day(date: &str) -> Result<String, SeriesError> {
    let parsed = parse_iso_date(date)?;
    Ok(previous_day(parsed)?.format(ISO_DATE).to_string())
}

/// Parse a strict `YYYY-MM-DD` date.
pub fn parse_iso_date(raw: &str) -> Result<NaiveDate, SeriesError> {
    NaiveDate::parse_from_str(raw.trim(), ISO_DATE).map_err(|e| {
        SeriesError::malformed(format!("invalid date '{raw}' (expected YYYY-MM-DD): {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_rollover_uses_real_month_length() {
        assert_eq!(previous_calendar_day("2021-03-01").unwrap(), "2021-02-28");
        assert_eq!(previous_calendar_day("2020-03-01").unwrap(), "2020-02-29");
        assert_eq!(previous_calendar_day("2020-05-01").unwrap(), "2020-04-30");
        assert_eq!(previous_calendar_day("2021-01-01").unwrap(), "2020-12-31");
        assert_eq!(previous_calendar_day("2020-04-15").unwrap(), "2020-04-14");
    }

    #[test]
    fn malformed_dates_are_rejected() {
        for bad in ["2020-04-31", "2020/04/01", "yesterday", ""] {
            let err = previous_calendar_day(bad).unwrap_err();
            assert!(matches!(err, SeriesError::MalformedInput(_)), "{bad}: {err:?}");
        }
    }

    #[test]
    fn minimum_date_has_no_predecessor() {
        assert_eq!(
            previous_day(NaiveDate::MIN),
            Err(SeriesError::DateOutOfRange(NaiveDate::MIN))
        );
    }
}
