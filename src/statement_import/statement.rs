//! Dispatches statement files to the parser matching their extension.

use std::path::Path;

use crate::{
    Error,
    statement_import::{
        date::DateFormat, models::StatementTransaction, ofx::parse_ofx, qif::parse_qif,
    },
};

/// Parse a statement file into transaction records, choosing a parser by
/// the file's extension.
///
/// # Errors
///
/// Returns [Error::UnsupportedFileType] when the file name does not end in
/// `.qif` or `.ofx` (ignoring case), and [Error::InvalidOfx] when an OFX
/// file contains no transaction records.
pub fn parse_statement(
    file_name: &str,
    text: &str,
    date_format: DateFormat,
) -> Result<Vec<StatementTransaction>, Error> {
    if has_extension(file_name, "qif") {
        return Ok(parse_qif(text, date_format));
    }

    if has_extension(file_name, "ofx") {
        return parse_ofx(text);
    }

    Err(Error::UnsupportedFileType(file_name.to_owned()))
}

fn has_extension(file_name: &str, extension: &str) -> bool {
    Path::new(file_name)
        .extension()
        .is_some_and(|file_extension| file_extension.eq_ignore_ascii_case(extension))
}
