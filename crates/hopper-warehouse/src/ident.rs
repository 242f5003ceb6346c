//! SQL identifier and literal rendering.

use hopper_core::CatalogPath;

use crate::WarehouseError;

/// Double-quote `name`, doubling embedded quotes. Quoted names keep their case.
#[must_use]
pub fn quote(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Emit `name` unquoted after checking it is a plain identifier
/// (`[A-Za-z_][A-Za-z0-9_$]*`).
///
/// # Errors
///
/// Returns [`WarehouseError::InvalidIdentifier`] for anything else.
pub fn bare(name: &str) -> Result<String, WarehouseError> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if valid_start && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$') {
        Ok(name.to_string())
    } else {
        Err(WarehouseError::InvalidIdentifier(name.to_string()))
    }
}

/// Render a column identifier, quoted or bare.
///
/// # Errors
///
/// Returns [`WarehouseError::InvalidIdentifier`] if `quoted` is false and
/// `name` is not a plain identifier.
pub fn column(name: &str, quoted: bool) -> Result<String, WarehouseError> {
    if quoted { Ok(quote(name)) } else { bare(name) }
}

/// `"db"."schema"."table"`.
#[must_use]
pub fn qualified(path: &CatalogPath) -> String {
    path.parts().map(quote).join(".")
}

/// Single-quoted SQL string literal.
#[must_use]
pub fn literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// `INSERT INTO "db"."schema"."table" (c1, c2) VALUES (?, ?)`.
///
/// # Errors
///
/// Propagates [`column`] failures.
pub fn insert_statement(
    path: &CatalogPath,
    columns: &[String],
    quote_columns: bool,
) -> Result<String, WarehouseError> {
    let names = columns
        .iter()
        .map(|name| column(name, quote_columns))
        .collect::<Result<Vec<_>, _>>()?;
    let placeholders = vec!["?"; columns.len()].join(", ");
    Ok(format!(
        "INSERT INTO {} ({}) VALUES ({placeholders})",
        qualified(path),
        names.join(", ")
    ))
}
