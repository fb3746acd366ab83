use anyhow::Result;
use std::io::Write;

use crate::models::ReportTable;

/// Write the table as delimited text, one record per row
pub fn generate<W: Write>(table: &ReportTable, writer: W, delimiter: u8) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    for row in table.all_rows() {
        wtr.write_record(row.iter().map(|cell| cell.to_string()))?;
    }

    wtr.flush()?;
    Ok(())
}

/// Generate delimited text as string
pub fn generate_string(table: &ReportTable, delimiter: u8) -> Result<String> {
    let mut buffer = Vec::new();
    generate(table, &mut buffer, delimiter)?;
    Ok(String::from_utf8(buffer)?)
}
