//! A parser for OFX (Open Financial Exchange) bank statements.
//!
//! OFX statements are SGML documents, but real bank exports are messy
//! enough that a full SGML parse is counterproductive. Instead every
//! `<STMTTRN>...</STMTTRN>` block is located and the fields of interest
//! are scanned out of each block.

use crate::{
    Error,
    statement_import::{
        models::StatementTransaction,
        scan::{find_tag_blocks, tag_value},
    },
};

const TRANSACTION_TAG: &str = "STMTTRN";

/// Parse every transaction record from OFX statement text.
///
/// Blocks missing a usable date, amount, or description are dropped. OFX
/// timestamps carry their own `YYYYMMDD` date order, so no date format hint
/// is needed.
///
/// # Errors
///
/// Returns [Error::InvalidOfx] when the text contains no transaction blocks
/// at all, which usually means the file is not an OFX statement.
pub fn parse_ofx(text: &str) -> Result<Vec<StatementTransaction>, Error> {
    let blocks = find_tag_blocks(text, TRANSACTION_TAG);

    if blocks.is_empty() {
        return Err(Error::InvalidOfx(
            "no transaction records were found".to_owned(),
        ));
    }

    let records = blocks
        .into_iter()
        .filter_map(parse_transaction_block)
        .collect();

    Ok(records)
}

fn parse_transaction_block(block: &str) -> Option<StatementTransaction> {
    let date = tag_value(block, "DTPOSTED").and_then(parse_posted_date)?;
    let amount = tag_value(block, "TRNAMT").and_then(parse_amount)?;
    let description = describe(tag_value(block, "NAME"), tag_value(block, "MEMO"))?;
    let check_number = tag_value(block, "CHECKNUM")
        .or_else(|| tag_value(block, "REFNUM"))
        .map(str::to_owned);

    Some(StatementTransaction {
        date,
        amount,
        description,
        check_number,
    })
}

/// OFX timestamps start with `YYYYMMDD` and may carry time and timezone
/// suffixes, e.g. `20250314120000.000[-5:EST]`. Only the date part is kept.
fn parse_posted_date(value: &str) -> Option<String> {
    let date_digits = value.get(..8)?;

    if !date_digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }

    Some(format!(
        "{}-{}-{}",
        &date_digits[..4],
        &date_digits[4..6],
        &date_digits[6..8]
    ))
}

fn parse_amount(value: &str) -> Option<f64> {
    value.replace(',', "").parse().ok()
}

fn describe(name: Option<&str>, memo: Option<&str>) -> Option<String> {
    match (name, memo) {
        (Some(name), Some(memo)) if name != memo => Some(format!("{name} - {memo}")),
        (Some(name), _) => Some(name.to_owned()),
        (None, Some(memo)) => Some(memo.to_owned()),
        (None, None) => None,
    }
}
