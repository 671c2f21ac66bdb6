use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::dates::DateContext;
use crate::error::{Result, SicoError};
use crate::models::{LongRow, WideTable};
use crate::reconciler::reconcile;
use crate::reshaper::{district_rows, unstack, YearSource};
use crate::settings::Settings;
use crate::store::read_snapshot;

pub const DATE_COLUMNS: &[&str] = &["Data (mm-dd)", "Data"];
pub const DISTRICT_COLUMN: &str = "Distrito";
pub const DISTRICT_TOTAL_COLUMN: &str = "Óbitos";
const AGE_GROUP_MARKER: &str = "1-4 anos";
const LOCATION_MARKER: &str = "No domicilio";

const MIN_YEAR: i32 = 2020;
const MAX_YEAR: i32 = 2030;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Year embedded in a SICO download name, or 0 when there is none.
pub fn extract_year(filename: &str) -> i32 {
    static YEAR_RE: OnceLock<Regex> = OnceLock::new();
    let re = YEAR_RE.get_or_init(|| Regex::new(r"Dados_SICO_(202\d)").expect("valid regex"));
    re.captures(filename)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

pub fn require_year(year: i32) -> Result<i32> {
    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
        Ok(year)
    } else {
        Err(SicoError::InvalidYear(format!(
            "{year} (expected {MIN_YEAR}..={MAX_YEAR}; pass --year or use a Dados_SICO_<year> file name)"
        )))
    }
}

pub fn find_date_column(headers: &[String]) -> Option<&'static str> {
    DATE_COLUMNS
        .iter()
        .find(|name| headers.iter().any(|h| h == *name))
        .copied()
}

pub fn detect_date_column(headers: &[String]) -> Result<&'static str> {
    find_date_column(headers).ok_or_else(|| {
        SicoError::UnsupportedSchema(format!(
            "no date column (expected one of {:?}, found {:?})",
            DATE_COLUMNS, headers
        ))
    })
}

pub fn read_wide_table(file_path: &Path) -> Result<WideTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(file_path)?;
    let headers = rdr
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(WideTable { headers, rows })
}

// ---------------------------------------------------------------------------
// Shape kinds: enum dispatch over the four download layouts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    District,
    AgeGroup,
    Location,
    Global,
}

const ALL_SHAPES: &[ShapeKind] = &[
    ShapeKind::District,
    ShapeKind::AgeGroup,
    ShapeKind::Location,
    ShapeKind::Global,
];

impl ShapeKind {
    pub fn key(&self) -> &'static str {
        match self {
            Self::District => "district",
            Self::AgeGroup => "age_group",
            Self::Location => "location",
            Self::Global => "global",
        }
    }

    /// Whether a table with these headers has this layout.
    pub fn detect(&self, headers: &[String]) -> bool {
        let has = |name: &str| headers.iter().any(|h| h == name);
        match self {
            Self::District => has(DISTRICT_COLUMN),
            Self::AgeGroup => has(AGE_GROUP_MARKER),
            Self::Location => has(LOCATION_MARKER),
            Self::Global => true,
        }
    }

    /// First layout whose marker column is present.
    pub fn classify(headers: &[String]) -> ShapeKind {
        ALL_SHAPES
            .iter()
            .find(|k| k.detect(headers))
            .copied()
            .unwrap_or(ShapeKind::Global)
    }

    pub fn output_name(&self, year: i32) -> String {
        match self {
            Self::District => format!("mortalidade_distritos_{year}.csv"),
            Self::AgeGroup => format!("mortalidade_grupo_etario_{year}.csv"),
            Self::Location => format!("mortalidade_local_{year}.csv"),
            Self::Global => "mortalidade.csv".to_string(),
        }
    }

    /// Output name for a download whose file name gave `year`. Every shape
    /// except the global one needs a valid year.
    pub fn target_name(&self, year: i32) -> Result<String> {
        match self {
            Self::Global => Ok(self.output_name(year)),
            _ => require_year(year).map(|y| self.output_name(y)),
        }
    }

    pub fn category_header(&self) -> Option<&'static str> {
        match self {
            Self::District => Some(DISTRICT_COLUMN),
            Self::AgeGroup => Some("grupo_etario"),
            Self::Location => Some("local"),
            Self::Global => None,
        }
    }

    pub fn total_header(&self) -> &'static str {
        match self {
            Self::District => DISTRICT_TOTAL_COLUMN,
            _ => "total",
        }
    }
}

// ---------------------------------------------------------------------------
// process_file
// ---------------------------------------------------------------------------

pub struct Processed {
    pub kind: ShapeKind,
    pub output_name: String,
    pub rows: Vec<LongRow>,
    pub reinstated: Vec<LongRow>,
}

/// Read a download, reshape it to long rows and, for district files,
/// reconcile against the output already in `settings.base_dir`.
pub fn process_file(
    file_path: &Path,
    settings: &Settings,
    year_override: Option<i32>,
) -> Result<Processed> {
    let filename = file_path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let year = year_override.unwrap_or_else(|| extract_year(filename));
    let table = read_wide_table(file_path)?;
    let kind = ShapeKind::classify(&table.headers);
    tracing::info!(file = filename, shape = kind.key(), year, rows = table.rows.len(), "read download");

    let ctx = DateContext {
        aliases: &settings.month_aliases,
        strict: settings.strict_months,
    };

    let (output_name, rows, reinstated) = match kind {
        ShapeKind::District => {
            let year = require_year(year)?;
            let output_name = kind.output_name(year);
            let fresh = district_rows(&table, year, &ctx)?;
            let snapshot = read_snapshot(&settings.base_path().join(&output_name), kind)?;
            let result = reconcile(fresh, &snapshot)?;
            (output_name, result.rows, result.reinstated)
        }
        ShapeKind::AgeGroup | ShapeKind::Location => {
            let year = require_year(year)?;
            let date_col = date_column_index(&table)?;
            let rows = unstack(&table, date_col, YearSource::Fixed(year), &ctx)?;
            (kind.output_name(year), rows, Vec::new())
        }
        ShapeKind::Global => {
            let date_col = date_column_index(&table)?;
            let rows = unstack(&table, date_col, YearSource::FromHeader, &ctx)?;
            (kind.output_name(year), rows, Vec::new())
        }
    };

    Ok(Processed {
        kind,
        output_name,
        rows,
        reinstated,
    })
}

fn date_column_index(table: &WideTable) -> Result<usize> {
    let name = detect_date_column(&table.headers)?;
    table
        .column(name)
        .ok_or_else(|| SicoError::MissingColumn(name.to_string()))
}
