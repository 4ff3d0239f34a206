use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============ Column Names ============

/// Row number column inserted on load.
pub const SERIAL_NUMBER: &str = "SNo";
pub const RECORD_ID: &str = "Record ID";
pub const PHONE_NUMBER: &str = "Phone Number";
pub const EMAIL: &str = "Email";
pub const COUNTRY: &str = "Country/Region";
pub const LEAD_SOURCE: &str = "Lead Source";
pub const CONTACT_OWNER: &str = "Contact owner";
pub const LEAD_STATUS: &str = "Lead Status";
pub const CREATE_DATE: &str = "Create Date";
pub const CHILD_AGE: &str = "Age of your Child";
/// Derived from `Create Date` and appended on load.
pub const YEAR: &str = "Year";

// ============ Cells ============

/// A single spreadsheet value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Empty,
    Bool(bool),
    Int(i64),
    Float(f64),
    DateTime(NaiveDateTime),
    Text(String),
}

static EMPTY_CELL: Cell = Cell::Empty;

impl Cell {
    /// True for empty cells and whitespace-only text.
    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(text) => text.trim().is_empty(),
            Cell::Float(value) => value.is_nan(),
            _ => false,
        }
    }

    /// Text rendering used for grouping and matching; `None` when missing.
    pub fn as_text(&self) -> Option<String> {
        if self.is_missing() {
            return None;
        }
        match self {
            Cell::Text(text) => Some(text.trim().to_string()),
            other => Some(other.to_string()),
        }
    }

    /// Numeric coercion. Text is parsed after trimming; anything else is `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(value) => Some(*value as f64),
            Cell::Float(value) if value.is_finite() => Some(*value),
            Cell::Text(text) => text.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Bool(value) => write!(f, "{}", value),
            Cell::Int(value) => write!(f, "{}", value),
            Cell::Float(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
                write!(f, "{}", *value as i64)
            }
            Cell::Float(value) => write!(f, "{}", value),
            Cell::DateTime(value) => write!(f, "{}", value.format("%Y-%m-%d %H:%M:%S")),
            Cell::Text(text) => f.write_str(text),
        }
    }
}

// ============ Lead Table ============

/// One lead record. Cells line up with `LeadTable::columns`.
#[derive(Debug, Clone, PartialEq)]
pub struct LeadRow {
    pub cells: Vec<Cell>,
    /// Parsed `Create Date`, filled in by normalization.
    pub created_at: Option<NaiveDateTime>,
}

impl LeadRow {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            created_at: None,
        }
    }
}

/// Row-oriented table of lead records with ordered, named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadTable {
    pub columns: Vec<String>,
    pub rows: Vec<LeadRow>,
}

impl LeadTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cell of `row` under `column`; absent columns read as empty.
    pub fn cell<'a>(&self, row: &'a LeadRow, column: &str) -> &'a Cell {
        self.column_index(column)
            .and_then(|index| row.cells.get(index))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Looks a record up by its `Record ID`.
    pub fn find(&self, record_id: &str) -> Option<&LeadRow> {
        let index = self.column_index(RECORD_ID)?;
        self.rows.iter().find(|row| {
            row.cells
                .get(index)
                .and_then(Cell::as_text)
                .is_some_and(|id| id == record_id)
        })
    }

    /// Same columns, only the rows matching `keep`.
    pub fn retain_rows<F>(&self, mut keep: F) -> LeadTable
    where
        F: FnMut(&LeadRow) -> bool,
    {
        LeadTable {
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|row| keep(row)).cloned().collect(),
        }
    }
}

// ============ API Models ============

/// Upload payload as produced by a browser file input (`data:` URL).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadRequest {
    pub contents: String,
    #[serde(default)]
    pub filename: Option<String>,
}

/// Period and paging query parameters shared by the report endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportQuery {
    pub year: Option<i32>,
    /// `"03"` and `"3"` are both accepted; empty means no month filter.
    pub month: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// Describes which upload and which period a report was computed from.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReportMeta {
    pub fingerprint: String,
    pub year: i32,
    pub month: Option<u32>,
    pub total_rows: usize,
    pub filtered_rows: usize,
}

/// Envelope every report endpoint returns.
#[derive(Debug, Clone, Serialize)]
pub struct ReportResponse<T: Serialize> {
    pub meta: ReportMeta,
    #[serde(flatten)]
    pub report: T,
}
