//! SQL identifier quoting utilities
//!
//! Provides safe quoting for SQL identifiers and qualified names so that
//! configured table names can be interpolated into DDL and DML statements.

/// Quote a SQL identifier to prevent injection.
///
/// Wraps the identifier in double quotes and escapes any embedded double quotes
/// by doubling them, following the SQL standard.
///
/// # Examples
/// ```
/// use ld_core::sql_utils::quote_ident;
/// assert_eq!(quote_ident("schema_version"), r#""schema_version""#);
/// assert_eq!(quote_ident(r#"my"table"#), r#""my""table""#);
/// ```
pub fn quote_ident(ident: &str) -> String {
    quote_ident_with(ident, '"')
}

/// Quote an identifier with an engine-specific delimiter.
///
/// The delimiter is doubled wherever it appears inside the identifier.
///
/// # Examples
/// ```
/// use ld_core::sql_utils::quote_ident_with;
/// assert_eq!(quote_ident_with("order", '`'), "`order`");
/// assert_eq!(quote_ident_with("a`b", '`'), "`a``b`");
/// ```
pub fn quote_ident_with(ident: &str, delimiter: char) -> String {
    let doubled: String = [delimiter, delimiter].iter().collect();
    format!(
        "{delimiter}{}{delimiter}",
        ident.replace(delimiter, &doubled)
    )
}

/// Quote a potentially schema-qualified name (e.g. `schema.table`).
///
/// Splits on `.` and individually quotes each component.
///
/// # Examples
/// ```
/// use ld_core::sql_utils::quote_qualified;
/// assert_eq!(quote_qualified("schema_version"), r#""schema_version""#);
/// assert_eq!(quote_qualified("meta.schema_version"), r#""meta"."schema_version""#);
/// ```
pub fn quote_qualified(name: &str) -> String {
    name.split('.')
        .map(quote_ident)
        .collect::<Vec<_>>()
        .join(".")
}

/// Split a potentially schema-qualified table name into (schema, table).
///
/// Uses the last `.` as the separator. If no `.` is present, returns
/// `("main", name)`; `main` is the default schema of both DuckDB and SQLite.
///
/// # Examples
/// ```
/// use ld_core::sql_utils::split_qualified_name;
/// assert_eq!(split_qualified_name("schema_version"), ("main", "schema_version"));
/// assert_eq!(split_qualified_name("meta.schema_version"), ("meta", "schema_version"));
/// ```
pub fn split_qualified_name(name: &str) -> (&str, &str) {
    if let Some(pos) = name.rfind('.') {
        (&name[..pos], &name[pos + 1..])
    } else {
        ("main", name)
    }
}

#[cfg(test)]
#[path = "sql_utils_test.rs"]
mod tests;
