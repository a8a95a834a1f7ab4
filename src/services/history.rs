//! Month-end closes from a historical quote table
//!
//! Historical pages list one row per business day. Only the last quote of
//! each month is kept.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::html::HtmlTable;
use crate::services::normalizer::parse_amount;

/// Last observation of a calendar month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthEndClose {
    /// "YYYY-MM"
    pub month: String,
    pub date: NaiveDate,
    pub value: f64,
}

/// Keep the latest observation per month, sorted by date ascending.
///
/// When the same date appears twice the later one in input order wins.
pub fn month_end_closes(observations: &[(NaiveDate, f64)]) -> Vec<MonthEndClose> {
    let mut by_month: BTreeMap<(i32, u32), (NaiveDate, f64)> = BTreeMap::new();

    for &(date, value) in observations {
        let key = (date.year(), date.month());
        match by_month.get(&key) {
            Some((kept, _)) if *kept > date => {}
            _ => {
                by_month.insert(key, (date, value));
            }
        }
    }

    by_month
        .into_iter()
        .map(|((year, month), (date, value))| MonthEndClose {
            month: format!("{:04}-{:02}", year, month),
            date,
            value,
        })
        .collect()
}

/// Parse a date written day-first ("31/01/2025", "31-01-2025") or ISO ("2025-01-31").
pub fn parse_day_first(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    ["%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

/// Collect (date, sell) observations from every table having a "fecha" and a
/// "venta" column. Rows whose date or amount does not parse are dropped.
pub fn observations_from_tables(tables: &[HtmlTable]) -> Vec<(NaiveDate, f64)> {
    let mut out = Vec::new();

    for table in tables {
        let (Some(date_col), Some(value_col)) = (table.column("fecha"), table.column("venta"))
        else {
            continue;
        };

        for row in &table.rows {
            let date = row.get(date_col).and_then(|d| parse_day_first(d));
            let value = row.get(value_col).and_then(|v| parse_amount(v));
            if let (Some(date), Some(value)) = (date, value) {
                out.push((date, value));
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_month_end_keeps_latest_date() {
        let obs = vec![
            (d(2025, 1, 30), 1060.0),
            (d(2025, 1, 31), 1063.5),
            (d(2025, 1, 2), 1040.0),
            (d(2025, 2, 28), 1083.0),
            (d(2025, 2, 27), 1082.0),
        ];
        let closes = month_end_closes(&obs);

        assert_eq!(closes.len(), 2);
        assert_eq!(closes[0].month, "2025-01");
        assert_eq!(closes[0].date, d(2025, 1, 31));
        assert_eq!(closes[0].value, 1063.5);
        assert_eq!(closes[1].month, "2025-02");
        assert_eq!(closes[1].value, 1083.0);
    }

    #[test]
    fn test_month_end_sorted_across_years() {
        let obs = vec![(d(2025, 1, 31), 2.0), (d(2024, 12, 30), 1.0)];
        let closes = month_end_closes(&obs);
        assert_eq!(closes[0].month, "2024-12");
        assert_eq!(closes[1].month, "2025-01");
    }

    #[test]
    fn test_month_end_duplicate_date_later_wins() {
        let obs = vec![(d(2025, 3, 31), 1.0), (d(2025, 3, 31), 2.0)];
        assert_eq!(month_end_closes(&obs)[0].value, 2.0);
    }

    #[test]
    fn test_month_end_empty() {
        assert!(month_end_closes(&[]).is_empty());
    }

    #[test]
    fn test_parse_day_first_formats() {
        assert_eq!(parse_day_first("31/01/2025"), Some(d(2025, 1, 31)));
        assert_eq!(parse_day_first("01-02-2025"), Some(d(2025, 2, 1)));
        assert_eq!(parse_day_first("2025-02-01"), Some(d(2025, 2, 1)));
        assert_eq!(parse_day_first(" 05/03/2025 "), Some(d(2025, 3, 5)));
        assert_eq!(parse_day_first("31/02/2025"), None);
        assert_eq!(parse_day_first("ayer"), None);
    }

    #[test]
    fn test_observations_from_matching_tables_only() {
        let tables = vec![
            HtmlTable {
                headers: vec!["Mes".into(), "Inflación mensual".into()],
                rows: vec![vec!["Enero".into(), "2,2".into()]],
            },
            HtmlTable {
                headers: vec!["Fecha".into(), "Compra".into(), "Venta".into()],
                rows: vec![
                    vec!["30/01/2025".into(), "1.020,00".into(), "1.062,00".into()],
                    vec!["31/01/2025".into(), "1.021,50".into(), "1.063,50".into()],
                    vec!["Total".into(), "".into(), "".into()],
                ],
            },
            HtmlTable {
                headers: vec!["Fecha".into(), "Venta BNA".into()],
                rows: vec![vec!["28/02/2025".into(), "1.083,00".into()]],
            },
        ];

        let obs = observations_from_tables(&tables);
        assert_eq!(
            obs,
            vec![
                (d(2025, 1, 30), 1062.0),
                (d(2025, 1, 31), 1063.5),
                (d(2025, 2, 28), 1083.0),
            ]
        );
    }
}
