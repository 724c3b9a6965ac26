//! Regex patterns shared by the invoice text extractors.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // "label: value", split at the first colon
    pub static ref HEADER_LINE: Regex = Regex::new(
        r"^(.*?):\s*(.*)$"
    ).unwrap();

    // Non-alphanumeric label characters, replaced one by one
    pub static ref NON_ALNUM: Regex = Regex::new(
        r"[^a-zA-Z0-9]"
    ).unwrap();

    // Table cells are separated by two or more whitespace characters
    pub static ref CELL_SEPARATOR: Regex = Regex::new(
        r"\s{2,}"
    ).unwrap();

    pub static ref LEADING_INTEGER: Regex = Regex::new(
        r"^[+-]?[0-9]+"
    ).unwrap();

    // sign, mantissa, exponent
    pub static ref LEADING_DECIMAL: Regex = Regex::new(
        r"^([+-])?([0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE]([+-]?[0-9]+))?"
    ).unwrap();
}
