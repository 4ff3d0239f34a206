use crate::errors::AppError;
use crate::models::{Cell, LeadTable};
use crate::reports::missing_contact_owner_table;
use rust_xlsxwriter::{Format, Workbook};

/// Download name for the missing-contact-owner workbook.
pub const MISSING_OWNER_FILENAME: &str = "missing_contact_owner_records.xlsx";
pub const SHEET_NAME: &str = "sheet1";

/// Last row index an xlsx worksheet can address.
const MAX_SHEET_ROW: usize = 1_048_575;
const MAX_SHEET_COLUMNS: usize = 16_384;

/// Rows of `table` lacking a contact owner, as xlsx bytes.
pub fn missing_contact_owner_xlsx(table: &LeadTable) -> Result<Vec<u8>, AppError> {
    let missing = missing_contact_owner_table(table);
    tracing::info!("Exporting {} missing contact owner rows", missing.len());
    table_to_xlsx(&missing, SHEET_NAME)
}

/// Writes a header row plus every data row, without an index column.
pub fn table_to_xlsx(table: &LeadTable, sheet_name: &str) -> Result<Vec<u8>, AppError> {
    if table.len() > MAX_SHEET_ROW {
        return Err(AppError::UnprocessableEntity(format!(
            "{} rows do not fit in one worksheet",
            table.len()
        )));
    }
    if table.columns.len() > MAX_SHEET_COLUMNS {
        return Err(AppError::UnprocessableEntity(format!(
            "{} columns do not fit in one worksheet",
            table.columns.len()
        )));
    }

    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet_name)?;

        for (col, name) in table.columns.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, name, &header)?;
        }

        for (index, row) in table.rows.iter().enumerate() {
            let sheet_row = index as u32 + 1;
            for (col, cell) in row.cells.iter().enumerate() {
                let col = col as u16;
                match cell {
                    Cell::Empty => {}
                    Cell::Bool(value) => {
                        worksheet.write_boolean(sheet_row, col, *value)?;
                    }
                    Cell::Int(value) => {
                        worksheet.write_number(sheet_row, col, *value as f64)?;
                    }
                    Cell::Float(value) if value.is_finite() => {
                        worksheet.write_number(sheet_row, col, *value)?;
                    }
                    Cell::Float(_) => {}
                    Cell::DateTime(_) | Cell::Text(_) => {
                        worksheet.write_string(sheet_row, col, &cell.to_string())?;
                    }
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}
