//! Monthly inflation from a published CPI table
//!
//! Pages list one row per month with the monthly and year-to-date change.
//! Header wording varies ("Mes", "Inflación mensual", "Inflación acumulada
//! 2025"), so columns are found by keyword.

use serde::Serialize;

use crate::html::HtmlTable;
use crate::services::normalizer::{normalize_name, parse_percent};
use crate::types::{PizarraError, Result};

/// One month of the CPI table. Unparseable percentages are kept as `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyInflation {
    #[serde(rename = "Mes")]
    pub month: String,
    #[serde(rename = "Inflación mensual (%)")]
    pub monthly_pct: Option<f64>,
    #[serde(rename = "Inflación acumulada (%)")]
    pub cumulative_pct: Option<f64>,
}

struct InflationColumns {
    month: usize,
    monthly: usize,
    cumulative: Option<usize>,
}

fn locate_columns(table: &HtmlTable) -> Option<InflationColumns> {
    let headers: Vec<String> = table.headers.iter().map(|h| normalize_name(h)).collect();
    let month = headers
        .iter()
        .position(|h| h == "mes" || h.starts_with("mes ") || h == "período" || h == "periodo")?;
    let monthly = headers.iter().position(|h| h.contains("mensual"))?;
    let cumulative = headers.iter().position(|h| h.contains("acumulada"));

    Some(InflationColumns {
        month,
        monthly,
        cumulative,
    })
}

/// Rows of the first table having a month and a monthly-change column.
///
/// Rows with an empty month cell are skipped.
pub fn inflation_from_tables(tables: &[HtmlTable]) -> Result<Vec<MonthlyInflation>> {
    let (table, cols) = tables
        .iter()
        .find_map(|t| Some((t, locate_columns(t)?)))
        .ok_or_else(|| {
            PizarraError::Inflation(format!(
                "no table with mes/mensual columns ({} tables on page)",
                tables.len()
            ))
        })?;

    let rows = table
        .rows
        .iter()
        .filter_map(|row| {
            let month = row.get(cols.month).map(|m| m.trim()).filter(|m| !m.is_empty())?;
            let pct = |idx: Option<usize>| idx.and_then(|i| row.get(i)).and_then(|v| parse_percent(v));
            Some(MonthlyInflation {
                month: month.to_string(),
                monthly_pct: pct(Some(cols.monthly)),
                cumulative_pct: pct(cols.cumulative),
            })
        })
        .collect();

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> HtmlTable {
        HtmlTable {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn test_inflation_rows_with_renamed_columns() {
        let tables = vec![
            table(&["Fecha", "Venta"], &[&["31/01/2025", "1.063,50"]]),
            table(
                &[" Mes ", "Inflación mensual", "Inflación  acumulada 2025"],
                &[&["Enero", "2,2%", "2,2%"], &["Febrero", "2,4 %", "4,7 %"]],
            ),
        ];

        let rows = inflation_from_tables(&tables).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].month, "Febrero");
        assert_eq!(rows[1].monthly_pct, Some(2.4));
        assert_eq!(rows[1].cumulative_pct, Some(4.7));
    }

    #[test]
    fn test_inflation_without_cumulative_column() {
        let tables = vec![table(&["Período", "Variación mensual"], &[&["Marzo", "3,7%"]])];

        let rows = inflation_from_tables(&tables).unwrap();
        assert_eq!(rows[0].monthly_pct, Some(3.7));
        assert_eq!(rows[0].cumulative_pct, None);
    }

    #[test]
    fn test_inflation_keeps_unpublished_months() {
        let tables = vec![table(
            &["Mes", "Inflación mensual", "Inflación acumulada"],
            &[&["Abril", "s/d", ""], &["", "1,0%", "1,0%"], &["Mayo"]],
        )];

        let rows = inflation_from_tables(&tables).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].monthly_pct, None);
        assert_eq!(rows[1].month, "Mayo");
        assert_eq!(rows[1].cumulative_pct, None);
    }

    #[test]
    fn test_mensual_header_is_not_the_month_column() {
        // Month column is matched by word, not substring
        let tables = vec![table(&["Inflación mensual", "Mes"], &[&["2,2%", "Enero"]])];

        let rows = inflation_from_tables(&tables).unwrap();
        assert_eq!(rows[0].month, "Enero");
        assert_eq!(rows[0].monthly_pct, Some(2.2));
    }

    #[test]
    fn test_inflation_without_table_fails() {
        let tables = vec![table(&["Fecha", "Venta"], &[])];
        let err = inflation_from_tables(&tables).unwrap_err();
        assert!(matches!(err, PizarraError::Inflation(ref m) if m.contains("1 tables")));
    }

    #[test]
    fn test_inflation_json_keys() {
        let row = MonthlyInflation {
            month: "Enero".into(),
            monthly_pct: Some(2.2),
            cumulative_pct: None,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["Mes"], "Enero");
        assert_eq!(json["Inflación mensual (%)"], 2.2);
        assert!(json["Inflación acumulada (%)"].is_null());
    }
}
