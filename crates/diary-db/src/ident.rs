//! MySQL identifier quoting.

/// Wraps an identifier in backticks, doubling any embedded backtick.
///
/// Dotted names (`schema.table`) are quoted per segment. `*` is passed
/// through so it can be used as a select list.
pub fn escape_identifier(identifier: &str) -> String {
    if identifier == "*" {
        return identifier.to_string();
    }

    identifier
        .split('.')
        .map(|part| format!("`{}`", part.replace('`', "``")))
        .collect::<Vec<_>>()
        .join(".")
}

/// Comma-separated select list; an empty list selects every column.
pub fn compile_select(columns: &[&str]) -> String {
    if columns.is_empty() {
        return "*".to_string();
    }

    columns
        .iter()
        .map(|c| escape_identifier(c))
        .collect::<Vec<_>>()
        .join(", ")
}
