use crate::dates::DateContext;
use crate::error::{Result, SicoError};
use crate::importer::{find_date_column, DISTRICT_COLUMN, DISTRICT_TOTAL_COLUMN};
use crate::models::{LongRow, WideTable};

const NULL_MARKERS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL", "-"];

pub fn is_null(raw: &str) -> bool {
    NULL_MARKERS.contains(&raw.trim())
}

/// Coerce a count cell to an integer. Accepts `12` and `12.0`.
pub fn parse_total(raw: &str, context: &str) -> Result<i64> {
    let s = raw.trim();
    if let Ok(v) = s.parse::<i64>() {
        return Ok(v);
    }
    match s.parse::<f64>() {
        // i64::MAX as f64 rounds up to 2^63, which is already out of range.
        Ok(v) if v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 => Ok(v as i64),
        _ => Err(SicoError::InvalidTotal {
            value: raw.to_string(),
            context: context.to_string(),
        }),
    }
}

/// Where the year of each reconstructed date comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearSource {
    /// One year for the whole file; categories are kept.
    Fixed(i32),
    /// Each category column is itself a year; categories are dropped.
    FromHeader,
}

/// Pivot every column except `date_col` into (date, category, total) rows.
///
/// Rows come out category-major (column order), then in file row order.
/// Null cells are skipped before their dates are parsed.
pub fn unstack(
    table: &WideTable,
    date_col: usize,
    years: YearSource,
    ctx: &DateContext,
) -> Result<Vec<LongRow>> {
    let mut out = Vec::new();
    for (col, header) in table.headers.iter().enumerate() {
        if col == date_col {
            continue;
        }
        let (year, category) = match years {
            YearSource::Fixed(y) => (y, Some(header.clone())),
            YearSource::FromHeader => {
                let y = header
                    .trim()
                    .parse::<i32>()
                    .map_err(|_| SicoError::InvalidYear(header.clone()))?;
                (y, None)
            }
        };
        for row in 0..table.rows.len() {
            let cell = table.cell(row, col);
            if is_null(cell) {
                continue;
            }
            let month_day = table.cell(row, date_col);
            let date = ctx.resolve(year, month_day)?;
            let total = parse_total(cell, &format!("{header} {month_day}"))?;
            out.push(LongRow { date, category: category.clone(), total });
        }
    }
    Ok(out)
}

/// Extract (date, district, total) rows from a district download.
///
/// The DGS export is already long (date column + `Distrito` + `Óbitos`);
/// a table without a date column is read as one row per district with one
/// `"<Mon>-<dd>"` column per date.
pub fn district_rows(table: &WideTable, year: i32, ctx: &DateContext) -> Result<Vec<LongRow>> {
    let district_col = table
        .column(DISTRICT_COLUMN)
        .ok_or_else(|| SicoError::MissingColumn(DISTRICT_COLUMN.to_string()))?;

    let Some(date_name) = find_date_column(&table.headers) else {
        return district_rows_wide(table, district_col, year, ctx);
    };
    let date_col = table
        .column(date_name)
        .ok_or_else(|| SicoError::MissingColumn(date_name.to_string()))?;
    let total_col = table
        .column(DISTRICT_TOTAL_COLUMN)
        .ok_or_else(|| SicoError::MissingColumn(DISTRICT_TOTAL_COLUMN.to_string()))?;

    let mut out = Vec::with_capacity(table.rows.len());
    for row in 0..table.rows.len() {
        let cell = table.cell(row, total_col);
        if is_null(cell) {
            continue;
        }
        let district = table.cell(row, district_col).trim().to_string();
        let month_day = table.cell(row, date_col);
        let date = ctx.resolve(year, month_day)?;
        let total = parse_total(cell, &format!("{district} {month_day}"))?;
        out.push(LongRow { date, category: Some(district), total });
    }
    Ok(out)
}

fn district_rows_wide(
    table: &WideTable,
    district_col: usize,
    year: i32,
    ctx: &DateContext,
) -> Result<Vec<LongRow>> {
    let mut out = Vec::new();
    for row in 0..table.rows.len() {
        let district = table.cell(row, district_col).trim().to_string();
        for (col, header) in table.headers.iter().enumerate() {
            if col == district_col {
                continue;
            }
            let cell = table.cell(row, col);
            if is_null(cell) {
                continue;
            }
            let date = ctx.resolve(year, header)?;
            let total = parse_total(cell, &format!("{district} {header}"))?;
            out.push(LongRow { date, category: Some(district.clone()), total });
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashSet};

    use chrono::NaiveDate;

    use super::*;
    use crate::settings::default_month_aliases;

    fn table(headers: &[&str], rows: &[&[&str]]) -> WideTable {
        WideTable {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ctx(aliases: &BTreeMap<String, String>) -> DateContext<'_> {
        DateContext { aliases, strict: false }
    }

    #[test]
    fn test_parse_total() {
        assert_eq!(parse_total("12", "x").unwrap(), 12);
        assert_eq!(parse_total(" 7.0 ", "x").unwrap(), 7);
        assert!(matches!(parse_total("7.5", "x"), Err(SicoError::InvalidTotal { .. })));
        assert!(parse_total("abc", "x").is_err());
    }

    #[test]
    fn test_parse_total_rejects_out_of_range() {
        for raw in ["1e30", "-1e30", "99999999999999999999", "inf", "NaN"] {
            assert!(
                matches!(parse_total(raw, "x"), Err(SicoError::InvalidTotal { .. })),
                "{raw} should be rejected"
            );
        }
        assert_eq!(parse_total("9223372036854775807", "x").unwrap(), i64::MAX);
    }

    #[test]
    fn test_is_null() {
        assert!(is_null(""));
        assert!(is_null("  "));
        assert!(is_null("NaN"));
        assert!(!is_null("0"));
    }

    #[test]
    fn test_unstack_drops_nulls_and_keeps_each_value_once() {
        let aliases = default_month_aliases();
        let t = table(
            &["Data (mm-dd)", "1-4 anos", "5-14 anos"],
            &[&["Jan-01", "3", ""], &["Fev-01", "", "2.0"], &["Dez-31", "1", "4"]],
        );
        let rows = unstack(&t, 0, YearSource::Fixed(2021), &ctx(&aliases)).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(
            rows[0],
            LongRow { date: ymd(2021, 1, 1), category: Some("1-4 anos".into()), total: 3 }
        );
        assert_eq!(
            rows[1],
            LongRow { date: ymd(2021, 12, 31), category: Some("1-4 anos".into()), total: 1 }
        );
        assert_eq!(
            rows[2],
            LongRow { date: ymd(2021, 2, 1), category: Some("5-14 anos".into()), total: 2 }
        );
        let keys: HashSet<_> = rows.iter().map(|r| r.key()).collect();
        assert_eq!(keys.len(), rows.len());
    }

    #[test]
    fn test_unstack_global_takes_year_from_header() {
        let aliases = default_month_aliases();
        let t = table(
            &["Data (mm-dd)", "2020", "2021"],
            &[&["Fev-28", "300", "310"], &["Fev-29", "290", ""]],
        );
        let rows = unstack(&t, 0, YearSource::FromHeader, &ctx(&aliases)).unwrap();
        assert_eq!(
            rows,
            vec![
                LongRow { date: ymd(2020, 2, 28), category: None, total: 300 },
                LongRow { date: ymd(2020, 2, 29), category: None, total: 290 },
                LongRow { date: ymd(2021, 2, 28), category: None, total: 310 },
            ]
        );
    }

    #[test]
    fn test_unstack_global_rejects_non_year_header() {
        let aliases = default_month_aliases();
        let t = table(&["Data", "total"], &[&["Jan-01", "1"]]);
        let err = unstack(&t, 0, YearSource::FromHeader, &ctx(&aliases)).unwrap_err();
        assert!(matches!(err, SicoError::InvalidYear(_)));
    }

    #[test]
    fn test_district_rows_long_form() {
        let aliases = default_month_aliases();
        let t = table(
            &["Data (mm-dd)", "Distrito", "Óbitos"],
            &[&["Mai-01", "Porto", "40"], &["Mai-01", "Lisboa", ""], &["Mai-02", "Lisboa", "51"]],
        );
        let rows = district_rows(&t, 2022, &ctx(&aliases)).unwrap();
        assert_eq!(
            rows,
            vec![
                LongRow { date: ymd(2022, 5, 1), category: Some("Porto".into()), total: 40 },
                LongRow { date: ymd(2022, 5, 2), category: Some("Lisboa".into()), total: 51 },
            ]
        );
    }

    #[test]
    fn test_district_rows_wide_form() {
        let aliases = default_month_aliases();
        let t = table(&["Distrito", "Jan-01", "Jan-02"], &[&["Lisboa", "10", "12"]]);
        let rows = district_rows(&t, 2021, &ctx(&aliases)).unwrap();
        assert_eq!(
            rows,
            vec![
                LongRow { date: ymd(2021, 1, 1), category: Some("Lisboa".into()), total: 10 },
                LongRow { date: ymd(2021, 1, 2), category: Some("Lisboa".into()), total: 12 },
            ]
        );
    }

    #[test]
    fn test_district_rows_requires_total_column() {
        let aliases = default_month_aliases();
        let t = table(&["Data", "Distrito"], &[&["Jan-01", "Porto"]]);
        let err = district_rows(&t, 2021, &ctx(&aliases)).unwrap_err();
        assert!(matches!(err, SicoError::MissingColumn(c) if c == "Óbitos"));
    }
}
