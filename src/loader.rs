use crate::errors::AppError;
use crate::models::{Cell, LeadRow, LeadTable, RECORD_ID};
use crate::upload::Upload;
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use std::io::Cursor;

/// Maximum number of data rows accepted from one upload.
const MAX_ROWS: usize = 1_048_575;

/// Detected upload format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Zip container: xlsx, xlsm, xlsb or ods.
    Zipped,
    /// Legacy OLE compound document (xls).
    Compound,
    Csv,
}

/// Sniffs the format from magic bytes, falling back to the declared type.
pub fn detect_format(upload: &Upload) -> SourceFormat {
    if upload.bytes.starts_with(b"PK\x03\x04") {
        return SourceFormat::Zipped;
    }
    if upload.bytes.starts_with(&[0xD0, 0xCF, 0x11, 0xE0]) {
        return SourceFormat::Compound;
    }
    SourceFormat::Csv
}

/// Parses an upload into a raw (not yet normalized) lead table.
pub fn load_table(upload: &Upload) -> Result<LeadTable, AppError> {
    let format = detect_format(upload);
    tracing::debug!(
        "Loading {:?} upload ({} bytes, declared {:?})",
        format,
        upload.len(),
        upload.content_type
    );

    let table = match format {
        SourceFormat::Zipped | SourceFormat::Compound => load_workbook(&upload.bytes)?,
        SourceFormat::Csv => load_csv(&upload.bytes)?,
    };

    if !table.has_column(RECORD_ID) {
        return Err(AppError::UnprocessableEntity(format!(
            "Upload has no '{}' column",
            RECORD_ID
        )));
    }

    tracing::info!(
        "Loaded {} rows across {} columns",
        table.len(),
        table.columns.len()
    );
    Ok(table)
}

/// Reads the first worksheet of an office workbook.
pub fn load_workbook(bytes: &[u8]) -> Result<LeadTable, AppError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| AppError::UnprocessableEntity("Workbook contains no sheets".to_string()))?;

    let range = workbook.worksheet_range(&sheet_name)?;
    table_from_range(&range)
}

fn table_from_range(range: &Range<Data>) -> Result<LeadTable, AppError> {
    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| AppError::UnprocessableEntity("Worksheet is empty".to_string()))?;

    let columns = header_columns(header.iter().map(|value| data_to_cell(value).to_string()));
    if columns.is_empty() {
        return Err(AppError::UnprocessableEntity(
            "Worksheet has no header row".to_string(),
        ));
    }

    let mut table = LeadTable::new(columns);
    for row in rows {
        let cells: Vec<Cell> = (0..table.columns.len())
            .map(|index| row.get(index).map(data_to_cell).unwrap_or(Cell::Empty))
            .collect();
        push_row(&mut table, cells)?;
    }
    Ok(table)
}

/// Reads comma separated text with a header row.
pub fn load_csv(bytes: &[u8]) -> Result<LeadTable, AppError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let columns = header_columns(reader.headers()?.iter().map(str::to_string));
    if columns.is_empty() {
        return Err(AppError::UnprocessableEntity(
            "CSV has no header row".to_string(),
        ));
    }

    let mut table = LeadTable::new(columns);
    for record in reader.records() {
        let record = record?;
        let cells: Vec<Cell> = (0..table.columns.len())
            .map(|index| match record.get(index) {
                Some(value) if !value.trim().is_empty() => Cell::Text(value.to_string()),
                _ => Cell::Empty,
            })
            .collect();
        push_row(&mut table, cells)?;
    }
    Ok(table)
}

/// Trims header names and drops blank trailing headers.
fn header_columns<I>(names: I) -> Vec<String>
where
    I: Iterator<Item = String>,
{
    let mut columns: Vec<String> = names.map(|name| name.trim().to_string()).collect();
    while columns.last().is_some_and(|name| name.is_empty()) {
        columns.pop();
    }
    columns
}

fn push_row(table: &mut LeadTable, cells: Vec<Cell>) -> Result<(), AppError> {
    if cells.iter().all(Cell::is_missing) {
        return Ok(());
    }
    if table.rows.len() >= MAX_ROWS {
        return Err(AppError::UnprocessableEntity(format!(
            "Upload has more than {} rows",
            MAX_ROWS
        )));
    }
    table.rows.push(LeadRow::new(cells));
    Ok(())
}

fn data_to_cell(value: &Data) -> Cell {
    match value {
        Data::Empty => Cell::Empty,
        Data::String(text) if text.trim().is_empty() => Cell::Empty,
        Data::String(text) => Cell::Text(text.clone()),
        Data::Int(value) => Cell::Int(*value),
        Data::Float(value) => Cell::Float(*value),
        Data::Bool(value) => Cell::Bool(*value),
        Data::DateTime(value) => value
            .as_datetime()
            .map(Cell::DateTime)
            .unwrap_or_else(|| Cell::Float(value.as_f64())),
        Data::DateTimeIso(text) | Data::DurationIso(text) => Cell::Text(text.clone()),
        Data::Error(err) => {
            tracing::debug!("Spreadsheet error cell treated as empty: {:?}", err);
            Cell::Empty
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EMAIL;

    fn upload(bytes: &[u8]) -> Upload {
        Upload {
            bytes: bytes.to_vec(),
            content_type: None,
            filename: None,
        }
    }

    #[test]
    fn csv_rows_are_padded_and_blank_rows_skipped() {
        let table = load_table(&upload(
            b"Record ID,Email,Phone Number\n1,a@example.com\n,,\n2,b@example.com,98765 43210\n",
        ))
        .unwrap();
        assert_eq!(table.columns, vec!["Record ID", "Email", "Phone Number"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].cells[2], Cell::Empty);
        assert_eq!(
            table.cell(&table.rows[1], EMAIL),
            &Cell::Text("b@example.com".into())
        );
    }

    #[test]
    fn csv_bom_is_ignored() {
        let table = load_table(&upload(b"\xEF\xBB\xBFRecord ID\n7\n")).unwrap();
        assert_eq!(table.columns, vec!["Record ID"]);
    }

    #[test]
    fn missing_record_id_column_is_rejected() {
        let err = load_table(&upload(b"Email\na@example.com\n")).unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));
    }

    #[test]
    fn zip_magic_is_detected() {
        assert_eq!(detect_format(&upload(b"PK\x03\x04rest")), SourceFormat::Zipped);
        assert_eq!(
            detect_format(&upload(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1])),
            SourceFormat::Compound
        );
        assert_eq!(detect_format(&upload(b"Record ID\n")), SourceFormat::Csv);
    }

    #[test]
    fn truncated_zip_is_a_bad_request() {
        let err = load_table(&upload(b"PK\x03\x04not really a workbook")).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn trailing_blank_headers_dropped() {
        let columns = header_columns(
            vec!["Record ID".to_string(), " Email ".to_string(), "".to_string()].into_iter(),
        );
        assert_eq!(columns, vec!["Record ID", "Email"]);
    }
}
