use crate::core::canonical::fold_width;
use bigdecimal::BigDecimal;
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;

static LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(\.\d*)?|\.\d+)").expect("valid regex"));
static PLAIN_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(\.\d+)?$").expect("valid regex"));

/// Parses the leading number of a credit cell ("3", "2.5", "3 學分").
/// Returns `None` when the text does not start with a digit, so signed
/// values are never counted.
pub fn parse_credit(text: &str) -> Option<BigDecimal> {
    let folded = fold_width(text);
    let m = LEADING_NUMBER.find(folded.trim())?;
    BigDecimal::from_str(m.as_str().trim_end_matches('.')).ok()
}

/// True when the whole cell is a plain non-negative number.
pub fn is_plain_number(text: &str) -> bool {
    PLAIN_NUMBER.is_match(fold_width(text).trim())
}
