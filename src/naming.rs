//! Table names, output paths and number formatting

use std::path::{Path, PathBuf};

/// Table name used for an empty key
pub const UNNAMED_TABLE: &str = "unnamed";

/// Significant digits used for numbers unless configured otherwise
pub const DEFAULT_PRECISION: usize = 6;

/// Turn a JSON key into a table name.
///
/// Every byte that is not an ASCII letter, digit or underscore becomes `_`,
/// so a multi-byte character yields one underscore per byte.
pub fn sanitize_name(key: &str) -> String {
    if key.is_empty() {
        return UNNAMED_TABLE.to_string();
    }

    key.bytes()
        .map(|b| {
            if b.is_ascii_alphanumeric() || b == b'_' {
                b as char
            } else {
                '_'
            }
        })
        .collect()
}

/// Name of the column pointing at a row of `parent_table`
pub fn foreign_key_column(parent_table: &str) -> String {
    format!("{}_id", parent_table)
}

/// Output file for a table: `{dir}/{table}.csv`, or `{table}.csv` when the
/// directory is empty or `.`
pub fn csv_path(dir: &Path, table: &str) -> PathBuf {
    let filename = format!("{}.csv", table);
    if is_current_dir(dir) {
        PathBuf::from(filename)
    } else {
        dir.join(filename)
    }
}

pub(crate) fn is_current_dir(dir: &Path) -> bool {
    dir.as_os_str().is_empty() || dir == Path::new(".")
}

/// Format a number the way C's `%g` does with `precision` significant digits
pub fn format_number(value: f64, precision: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let precision = precision.max(1);

    // Round to the requested significant digits first; the exponent of the
    // rounded value decides between fixed and exponential notation.
    let scientific = format!("{:.*e}", precision - 1, value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some(parts) => parts,
        None => return scientific,
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= precision as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            strip_fraction_zeros(mantissa),
            sign,
            exponent.unsigned_abs()
        )
    } else {
        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        strip_fraction_zeros(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn strip_fraction_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
