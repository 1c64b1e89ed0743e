use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;

const DATE_LABEL: &str = r"(?i)\b(?:Date\s+of\s+Report|Report\s+Date|Date)[\s:]*";

static MONTH_NAME_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{DATE_LABEL}(\d{{1,2}})-([a-z]{{3}})-(\d{{4}})")).unwrap()
});
static SLASH_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{DATE_LABEL}(\d{{1,2}})/(\d{{1,2}})/(\d{{4}})")).unwrap()
});
static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{DATE_LABEL}(\d{{4}})-(\d{{1,2}})-(\d{{1,2}})")).unwrap()
});

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

fn month_from_name(name: &str) -> Option<u32> {
    let lower = name.to_ascii_lowercase();
    MONTHS.iter().position(|m| *m == lower).map(|i| i as u32 + 1)
}

fn num<T: std::str::FromStr>(caps: &regex::Captures<'_>, idx: usize) -> Option<T> {
    caps.get(idx)?.as_str().parse().ok()
}

/// Find the labelled report date in free text.
///
/// Tried in order: `DD-Mon-YYYY`, `DD/MM/YYYY` (then `MM/DD/YYYY`),
/// `YYYY-MM-DD`. The first match that is a real calendar date wins.
pub fn extract_report_date(text: &str) -> Option<NaiveDate> {
    for caps in MONTH_NAME_DATE.captures_iter(text) {
        let date = (|| {
            let month = month_from_name(caps.get(2)?.as_str())?;
            NaiveDate::from_ymd_opt(num(&caps, 3)?, month, num(&caps, 1)?)
        })();
        if date.is_some() {
            return date;
        }
    }

    for caps in SLASH_DATE.captures_iter(text) {
        let (Some(first), Some(second), Some(year)) =
            (num::<u32>(&caps, 1), num::<u32>(&caps, 2), num::<i32>(&caps, 3))
        else {
            continue;
        };
        let date = NaiveDate::from_ymd_opt(year, second, first)
            .or_else(|| NaiveDate::from_ymd_opt(year, first, second));
        if date.is_some() {
            return date;
        }
    }

    for caps in ISO_DATE.captures_iter(text) {
        let date = (|| NaiveDate::from_ymd_opt(num(&caps, 1)?, num(&caps, 2)?, num(&caps, 3)?))();
        if date.is_some() {
            return date;
        }
    }

    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSource {
    ReportText,
    UploadTimestamp,
}

/// The date a report is filed under on the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedDate {
    pub at: DateTime<Utc>,
    pub source: DateSource,
}

impl ResolvedDate {
    /// Short axis label, e.g. `Jan 2024`.
    pub fn label(&self) -> String {
        self.at.format("%b %Y").to_string()
    }
}

/// In-text report date if there is one, the upload time otherwise.
pub fn resolve_report_date(text: Option<&str>, uploaded_at: DateTime<Utc>) -> ResolvedDate {
    match text.and_then(extract_report_date) {
        Some(date) => ResolvedDate {
            at: date.and_time(chrono::NaiveTime::MIN).and_utc(),
            source: DateSource::ReportText,
        },
        None => ResolvedDate {
            at: uploaded_at,
            source: DateSource::UploadTimestamp,
        },
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn month_name_format() {
        assert_eq!(extract_report_date("Report Date: 15-Jan-2024"), ymd(2024, 1, 15));
        assert_eq!(extract_report_date("date of report 3-sep-2023"), ymd(2023, 9, 3));
    }

    #[test]
    fn slash_format_prefers_day_first() {
        assert_eq!(extract_report_date("Date: 05/03/2024"), ymd(2024, 3, 5));
    }

    #[test]
    fn slash_format_falls_back_to_month_first() {
        assert_eq!(extract_report_date("Date: 03/25/2024"), ymd(2024, 3, 25));
    }

    #[test]
    fn iso_format() {
        assert_eq!(extract_report_date("Report Date: 2023-11-02"), ymd(2023, 11, 2));
    }

    #[test]
    fn invalid_month_name_is_skipped() {
        assert_eq!(extract_report_date("Date: 10-Foo-2024"), None);
        assert_eq!(
            extract_report_date("Date: 10-Foo-2024\nReport Date: 2024-02-29"),
            ymd(2024, 2, 29)
        );
    }

    #[test]
    fn impossible_dates_are_rejected() {
        assert_eq!(extract_report_date("Date: 31/31/2024"), None);
        assert_eq!(extract_report_date("Date: 2023-02-30"), None);
    }

    #[test]
    fn unlabelled_dates_are_ignored() {
        assert_eq!(extract_report_date("Collected 15-Jan-2024"), None);
    }

    #[test]
    fn falls_back_to_upload_time() {
        let uploaded = Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap();

        let resolved = resolve_report_date(Some("HbA1c: 6.0"), uploaded);
        assert_eq!(resolved.at, uploaded);
        assert_eq!(resolved.source, DateSource::UploadTimestamp);

        let resolved = resolve_report_date(None, uploaded);
        assert_eq!(resolved.source, DateSource::UploadTimestamp);
    }

    #[test]
    fn text_date_beats_upload_time() {
        let uploaded = Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap();
        let resolved = resolve_report_date(Some("Report Date: 15-Jan-2024"), uploaded);
        assert_eq!(resolved.at, Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap());
        assert_eq!(resolved.source, DateSource::ReportText);
        assert_eq!(resolved.label(), "Jan 2024");
    }
}
