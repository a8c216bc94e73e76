//! Reading uploaded patient tables from delimited text

use crate::error::InputError;
use crate::schema::RawTable;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Read a header-led delimited table from any reader.
///
/// Cells are kept as text; typing happens during schema validation so that
/// extra columns of any kind pass through untouched.
pub fn read_table<R: Read>(reader: R, delimiter: u8) -> Result<RawTable, InputError> {
    let mut csv = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv.headers()?.iter().map(str::to_string).collect::<Vec<_>>();

    let mut rows = Vec::new();
    for record in csv.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    debug!(columns = headers.len(), rows = rows.len(), "Table read");
    Ok(RawTable::new(headers, rows))
}

/// Read a delimited table from a file.
pub fn read_table_path<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<RawTable, InputError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_table(file, delimiter)
}
