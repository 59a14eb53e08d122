//! Small pure normalization helpers used across the pipeline.

/// Coerce a human/API truth value to `bool`.
///
/// Accepts the usual spellings in either case: `true/t/1/yes/y/on` and
/// `false/f/0/no/n/off`, plus the empty string as false (upstream APIs
/// send it for "not applicable").
///
/// # Errors
///
/// Returns the offending value as the error reason when it matches
/// neither set.
pub fn parse_bool(val: &str) -> Result<bool, String> {
    match val.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" | "on" => Ok(true),
        "false" | "f" | "0" | "no" | "n" | "off" | "" => Ok(false),
        other => Err(format!("invalid truth value: {other:?}")),
    }
}

/// Upload format, dispatched purely on the declared filename extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Csv,
    Json,
}

/// Detect the import format from a filename. Case-insensitive on the
/// extension; anything other than `.csv`/`.json` is unsupported.
#[must_use]
pub fn detect_import_format(filename: &str) -> Option<ImportFormat> {
    let ext = filename.rsplit_once('.').map(|(_, ext)| ext)?;
    match ext.to_ascii_lowercase().as_str() {
        "csv" => Some(ImportFormat::Csv),
        "json" => Some(ImportFormat::Json),
        _ => None,
    }
}

/// Clean a numeric string carrying locale punctuation or comparison
/// prefixes (`"< 3"`, `"4,5 g/l"`) and parse the trailing token as `f64`.
///
/// The retailer's detail payloads write decimals with commas and prefix
/// below-threshold figures with `<`; units ride along as a leading word.
#[must_use]
pub fn clean_decimal(raw: &str) -> Option<f64> {
    let cleaned = raw.replace('<', " ").replace(',', ".");
    cleaned
        .split_whitespace()
        .last()
        .and_then(|token| token.parse::<f64>().ok())
}

/// Trailing path segment of a URL, ignoring a trailing slash.
///
/// This is how both external sources embed their numeric ids in links.
#[must_use]
pub fn trailing_segment(url: &str) -> Option<&str> {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
}

/// Trailing path segment parsed as an id, or `None` if non-numeric.
#[must_use]
pub fn trailing_id(url: &str) -> Option<i64> {
    trailing_segment(url).and_then(|s| s.parse::<i64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // parse_bool
    // -----------------------------------------------------------------------

    #[test]
    fn parse_bool_accepts_truthy_spellings() {
        for v in ["true", "T", "1", "yes", "Y", "on", " True "] {
            assert_eq!(parse_bool(v), Ok(true), "value: {v}");
        }
    }

    #[test]
    fn parse_bool_accepts_falsy_spellings() {
        for v in ["false", "F", "0", "no", "N", "off", ""] {
            assert_eq!(parse_bool(v), Ok(false), "value: {v}");
        }
    }

    #[test]
    fn parse_bool_rejects_garbage() {
        assert!(parse_bool("maybe").is_err());
    }

    // -----------------------------------------------------------------------
    // detect_import_format
    // -----------------------------------------------------------------------

    #[test]
    fn detects_csv_and_json_case_insensitively() {
        assert_eq!(detect_import_format("export.csv"), Some(ImportFormat::Csv));
        assert_eq!(
            detect_import_format("export.JSON"),
            Some(ImportFormat::Json)
        );
    }

    #[test]
    fn rejects_other_extensions() {
        assert_eq!(detect_import_format("export.xlsx"), None);
        assert_eq!(detect_import_format("no_extension"), None);
    }

    // -----------------------------------------------------------------------
    // clean_decimal
    // -----------------------------------------------------------------------

    #[test]
    fn clean_decimal_handles_comma_and_prefix() {
        assert_eq!(clean_decimal("4,5"), Some(4.5));
        assert_eq!(clean_decimal("< 3"), Some(3.0));
        assert_eq!(clean_decimal("Under 3 g/l 2,5"), Some(2.5));
    }

    #[test]
    fn clean_decimal_rejects_non_numeric() {
        assert_eq!(clean_decimal("ukjent"), None);
        assert_eq!(clean_decimal(""), None);
    }

    // -----------------------------------------------------------------------
    // trailing segment / id
    // -----------------------------------------------------------------------

    #[test]
    fn trailing_id_parses_url_tail() {
        assert_eq!(trailing_id("https://community.example/b/pale-ale/12345"), Some(12345));
        assert_eq!(trailing_id("https://community.example/b/pale-ale/12345/"), Some(12345));
    }

    #[test]
    fn trailing_id_rejects_non_numeric_tail() {
        assert_eq!(trailing_id("https://community.example/b/pale-ale"), None);
    }
}
