//! Seasonal Candidates
//!
//! Current season, its three months and the recent years, as of a reference
//! date. Uses the northern-hemisphere mapping (Mar-May is the first season).

use chrono::{Datelike, NaiveDate};

use crate::locale::LocaleData;
use crate::variation::title_case;

const FALLBACK_SEASONS: [&str; 4] = ["spring", "summer", "fall", "winter"];
const FALLBACK_MONTHS: [&str; 12] = [
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december",
];

/// Season index (into a 4-element season list) and month indices (into a
/// 12-element month list) for a 1-based calendar month.
pub fn season_window(month: u32) -> (usize, [usize; 3]) {
    match month {
        3..=5 => (0, [2, 3, 4]),
        6..=8 => (1, [5, 6, 7]),
        9..=11 => (2, [8, 9, 10]),
        _ => (3, [11, 0, 1]),
    }
}

/// Seasonal candidates for `reference`: season and month names in lowercase
/// and title case, the current and previous year in 4 and 2 digits, and each
/// name followed by each year form. Locale lists that are too short are
/// replaced by the English names.
pub fn seasonal_candidates(locale: &LocaleData, reference: NaiveDate) -> Vec<String> {
    let seasons: Vec<String> = match locale.seasons() {
        Some(list) => list.to_vec(),
        None => FALLBACK_SEASONS.iter().map(|s| s.to_string()).collect(),
    };
    let months: Vec<String> = match locale.months() {
        Some(list) => list.to_vec(),
        None => FALLBACK_MONTHS.iter().map(|s| s.to_string()).collect(),
    };

    let (season_idx, month_idx) = season_window(reference.month());
    let year = reference.year();
    let years = [
        year.to_string(),
        format!("{:02}", year.rem_euclid(100)),
        (year - 1).to_string(),
        format!("{:02}", (year - 1).rem_euclid(100)),
    ];

    let mut names = vec![seasons[season_idx].to_lowercase()];
    names.extend(month_idx.iter().map(|&i| months[i].to_lowercase()));

    let mut out = Vec::new();
    for name in &names {
        out.push(name.clone());
        out.push(title_case(name));
    }
    out.extend(years.iter().cloned());
    for name in &names {
        let titled = title_case(name);
        for y in &years {
            out.push(format!("{}{}", name, y));
            out.push(format!("{}{}", titled, y));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_season_window_boundaries() {
        assert_eq!(season_window(3), (0, [2, 3, 4]));
        assert_eq!(season_window(8), (1, [5, 6, 7]));
        assert_eq!(season_window(11), (2, [8, 9, 10]));
        assert_eq!(season_window(12), (3, [11, 0, 1]));
        assert_eq!(season_window(1), (3, [11, 0, 1]));
    }

    #[test]
    fn test_winter_spans_year_boundary() {
        let out = seasonal_candidates(&LocaleData::default(), date(2025, 1, 15));
        for expected in [
            "winter", "Winter", "december", "January", "february", "2025", "25", "2024", "24",
            "Winter2025", "december24", "February2024",
        ] {
            assert!(out.contains(&expected.to_string()), "missing {}", expected);
        }
        assert!(!out.iter().any(|c| c.starts_with("summer")));
    }

    #[test]
    fn test_locale_names_used() {
        let locale = LocaleData::load("pt_br").unwrap();
        let out = seasonal_candidates(&locale, date(2024, 7, 1));
        assert!(out.contains(&"verao".to_string()));
        assert!(out.contains(&"Julho2024".to_string()));
        assert!(out.contains(&"agosto23".to_string()));
    }

    #[test]
    fn test_candidate_count() {
        let out = seasonal_candidates(&LocaleData::default(), date(2024, 4, 1));
        // 4 names x 2 cases, 4 year forms, 4 names x 2 cases x 4 years
        assert_eq!(out.len(), 8 + 4 + 32);
    }
}
