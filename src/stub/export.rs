//! PHP literal rendering in the layout `var_export()` produces.
//!
//! Archive runtimes and tooling compare stubs textually, so the layout here
//! has to match byte for byte: `NULL`, single-quoted strings, and
//! `array (` blocks with two-space indented `key => value,` rows.

pub(crate) const NULL: &str = "NULL";

pub(crate) fn string(value: &str) -> String {
    format!("'{}'", single_quoted(value))
}

/// Escapes `value` for splicing into an existing single-quoted literal.
pub(crate) fn single_quoted(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\0', "' . \"\\0\" . '")
}

/// Escapes `value` for splicing into a double-quoted literal, so `$` never
/// interpolates.
pub(crate) fn double_quoted(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('$', "\\$")
}

pub(crate) fn optional(value: Option<&str>) -> String {
    value.map_or_else(|| NULL.to_string(), string)
}

/// Renders pre-exported `(key, value)` pairs as a PHP array literal.
pub(crate) fn array<I>(entries: I) -> String
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut out = String::from("array (\n");
    for (key, value) in entries {
        out.push_str(&format!("  {key} => {value},\n"));
    }
    out.push(')');
    out
}

/// A zero-indexed list, rendered with explicit integer keys.
pub(crate) fn list<S: AsRef<str>>(items: &[S]) -> String {
    array(
        items
            .iter()
            .enumerate()
            .map(|(i, item)| (i.to_string(), string(item.as_ref()))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_are_single_quoted() {
        assert_eq!(string("test.phar"), "'test.phar'");
    }

    #[test]
    fn quotes_and_backslashes_are_escaped() {
        assert_eq!(string(r"it's C:\dir"), r"'it\'s C:\\dir'");
    }

    #[test]
    fn nul_bytes_break_out_of_the_literal() {
        assert_eq!(string("a\0b"), "'a' . \"\\0\" . 'b'");
    }

    #[test]
    fn single_quoted_body_has_no_outer_quotes() {
        assert_eq!(single_quoted("it's"), r"it\'s");
    }

    #[test]
    fn double_quoted_body_blocks_interpolation() {
        assert_eq!(double_quoted(r#"a"$x\b"#), r#"a\"\$x\\b"#);
    }

    #[test]
    fn missing_values_export_as_null() {
        assert_eq!(optional(None), "NULL");
        assert_eq!(optional(Some("index.php")), "'index.php'");
    }

    #[test]
    fn empty_array_keeps_its_frame() {
        assert_eq!(array(Vec::new()), "array (\n)");
    }

    #[test]
    fn list_uses_integer_keys() {
        assert_eq!(
            list(&["REQUEST_URI", "PHP_SELF"]),
            "array (\n  0 => 'REQUEST_URI',\n  1 => 'PHP_SELF',\n)"
        );
    }
}
