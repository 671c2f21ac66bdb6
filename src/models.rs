use chrono::NaiveDate;

/// Raw table as downloaded: a header row and string cells.
#[derive(Debug, Clone, Default)]
pub struct WideTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl WideTable {
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell at (row, col); short rows read as empty.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// One normalized output row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongRow {
    pub date: NaiveDate,
    pub category: Option<String>,
    pub total: i64,
}

impl LongRow {
    pub fn key(&self) -> (NaiveDate, String) {
        (self.date, self.category.clone().unwrap_or_default())
    }
}
