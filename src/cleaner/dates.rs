use chrono::{NaiveDate, NaiveDateTime};

/// Date-only layouts seen in the dataset variants and in pandas/CSV round-trips.
const DATE_FORMATS: &[&str] = &[
    "%B %d, %Y", // August 14, 2020
    "%b %d, %Y", // Aug 14, 2020
    "%Y-%m-%d",  // 2020-08-14
    "%m/%d/%Y",  // 08/14/2020
    "%d-%b-%y",  // 14-Aug-20
    "%d %B %Y",  // 14 August 2020
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse a free-text date. Returns `None` for blank or unparsable text.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Canonical text form, always accepted by [`parse_date`].
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a year cell. Accepts "2019" and the "2019.0" pandas writes for
/// nullable integer columns.
pub fn parse_year(raw: &str) -> Option<i32> {
    let s = raw.trim();
    let year = s.parse::<i32>().ok().or_else(|| {
        s.parse::<f64>()
            .ok()
            .filter(|f| f.fract() == 0.0)
            .map(|f| f as i32)
    })?;
    (1800..=2200).contains(&year).then_some(year)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_long_month_names() {
        assert_eq!(parse_date("August 14, 2020"), Some(ymd(2020, 8, 14)));
        assert_eq!(parse_date(" January 1, 2020 "), Some(ymd(2020, 1, 1)));
        assert_eq!(parse_date("Aug 4, 2017"), Some(ymd(2017, 8, 4)));
    }

    #[test]
    fn test_numeric_layouts() {
        assert_eq!(parse_date("2019-05-01"), Some(ymd(2019, 5, 1)));
        assert_eq!(parse_date("05/01/2019"), Some(ymd(2019, 5, 1)));
        assert_eq!(parse_date("1-Jan-20"), Some(ymd(2020, 1, 1)));
        assert_eq!(parse_date("2019-05-01 00:00:00"), Some(ymd(2019, 5, 1)));
        assert_eq!(parse_date("2019-05-01T13:45:00"), Some(ymd(2019, 5, 1)));
    }

    #[test]
    fn test_unparsable_is_none() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("   "), None);
        assert_eq!(parse_date("N/A"), None);
        assert_eq!(parse_date("2019-13-45"), None);
    }

    #[test]
    fn test_format_round_trips() {
        let d = ymd(2021, 9, 25);
        assert_eq!(format_date(d), "2021-09-25");
        assert_eq!(parse_date(&format_date(d)), Some(d));
    }

    #[test]
    fn test_parse_year() {
        assert_eq!(parse_year("2019"), Some(2019));
        assert_eq!(parse_year("2019.0"), Some(2019));
        assert_eq!(parse_year(" 1999 "), Some(1999));
        assert_eq!(parse_year("2019.5"), None);
        assert_eq!(parse_year("nan"), None);
        assert_eq!(parse_year(""), None);
        assert_eq!(parse_year("90"), None);
    }
}
