//! Tolerant parsing of community check-in exports (.csv and .json).
//!
//! Export files vary by vintage: field names differ, beer ids arrive
//! either directly or as the trailing segment of a beer url, and ratings
//! use `0` to mean "unrated". Records missing a usable beer id are
//! dropped silently; a bad timestamp only costs the timestamp.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

use beerdb_core::normalize::{detect_import_format, trailing_id, ImportFormat};
use beerdb_db::NewCheckin;

use crate::error::CheckinError;

/// Beer-id columns, tried before falling back to the beer url.
const BEER_ID_KEYS: &[&str] = &["beer_id", "bid"];
const BEER_URL_KEYS: &[&str] = &["beer_url", "url"];
const RATING_KEYS: &[&str] = &["rating_score", "rating"];
const TIMESTAMP_KEYS: &[&str] = &["created_at", "checked_in_at"];
const CHECKIN_ID_KEYS: &[&str] = &["checkin_id"];
const CHECKIN_URL_KEYS: &[&str] = &["checkin_url"];

/// Parses a check-in export, dispatching on the filename's extension.
///
/// # Errors
///
/// Returns [`CheckinError::UnsupportedFormat`] for any extension other
/// than `.csv`/`.json` and [`CheckinError::Malformed`] when the contents
/// do not parse at all. Individually unusable records are dropped, not
/// errors.
pub fn parse_export(filename: &str, contents: &str) -> Result<Vec<NewCheckin>, CheckinError> {
    match detect_import_format(filename) {
        Some(ImportFormat::Csv) => parse_csv_export(contents),
        Some(ImportFormat::Json) => parse_json_export(contents),
        None => Err(CheckinError::UnsupportedFormat {
            filename: filename.to_string(),
        }),
    }
}

fn parse_json_export(contents: &str) -> Result<Vec<NewCheckin>, CheckinError> {
    let value: Value =
        serde_json::from_str(contents).map_err(|err| CheckinError::Malformed {
            format: "json",
            reason: err.to_string(),
        })?;

    let Value::Array(records) = value else {
        return Err(CheckinError::Malformed {
            format: "json",
            reason: "expected a top-level array of check-ins".to_string(),
        });
    };

    Ok(records.iter().filter_map(record_from_json).collect())
}

fn record_from_json(record: &Value) -> Option<NewCheckin> {
    let beer_id = first_key(record, BEER_ID_KEYS)
        .and_then(value_as_i64)
        .or_else(|| {
            first_key(record, BEER_URL_KEYS)
                .and_then(Value::as_str)
                .and_then(trailing_id)
        })?;

    let rating = first_key(record, RATING_KEYS)
        .and_then(value_as_f64)
        .and_then(nonzero_rating);

    let checked_in_at = first_key(record, TIMESTAMP_KEYS).and_then(|v| match v {
        Value::String(raw) => parse_timestamp(raw),
        Value::Number(n) => n.as_i64().and_then(|secs| DateTime::from_timestamp(secs, 0)),
        _ => None,
    });

    let external_checkin_id = first_key(record, CHECKIN_ID_KEYS)
        .and_then(value_as_i64)
        .or_else(|| {
            first_key(record, CHECKIN_URL_KEYS)
                .and_then(Value::as_str)
                .and_then(trailing_id)
        });

    Some(NewCheckin {
        external_checkin_id,
        community_beer_id: beer_id,
        rating,
        checked_in_at,
    })
}

fn parse_csv_export(contents: &str) -> Result<Vec<NewCheckin>, CheckinError> {
    let rows = parse_csv(contents).map_err(|reason| CheckinError::Malformed {
        format: "csv",
        reason,
    })?;

    let mut rows = rows.into_iter();
    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };
    let header: Vec<String> = header.iter().map(|h| h.trim().to_lowercase()).collect();

    let column = |keys: &[&str]| -> Option<usize> {
        keys.iter()
            .find_map(|key| header.iter().position(|h| h == key))
    };

    let beer_id_col = column(BEER_ID_KEYS);
    let beer_url_col = column(BEER_URL_KEYS);
    let rating_col = column(RATING_KEYS);
    let timestamp_col = column(TIMESTAMP_KEYS);
    let checkin_id_col = column(CHECKIN_ID_KEYS);
    let checkin_url_col = column(CHECKIN_URL_KEYS);

    let field = |row: &[String], col: Option<usize>| -> Option<String> {
        let raw = row.get(col?)?.trim();
        if raw.is_empty() {
            None
        } else {
            Some(raw.to_string())
        }
    };

    let mut checkins = Vec::new();
    for row in rows {
        let Some(beer_id) = field(&row, beer_id_col)
            .and_then(|raw| raw.parse().ok())
            .or_else(|| field(&row, beer_url_col).and_then(|url| trailing_id(&url)))
        else {
            continue;
        };

        let rating = field(&row, rating_col)
            .and_then(|raw| raw.parse().ok())
            .and_then(nonzero_rating);

        let checked_in_at = field(&row, timestamp_col).and_then(|raw| parse_timestamp(&raw));

        let external_checkin_id = field(&row, checkin_id_col)
            .and_then(|raw| raw.parse().ok())
            .or_else(|| field(&row, checkin_url_col).and_then(|url| trailing_id(&url)));

        checkins.push(NewCheckin {
            external_checkin_id,
            community_beer_id: beer_id,
            rating,
            checked_in_at,
        });
    }

    Ok(checkins)
}

/// Minimal CSV reader: comma-separated, double-quoted fields with `""`
/// escapes, quoted fields may span lines. Export files never need more.
fn parse_csv(contents: &str) -> Result<Vec<Vec<String>>, String> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = contents.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' if field.is_empty() => in_quotes = true,
            ',' => row.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                row.push(std::mem::take(&mut field));
                if row.iter().any(|f| !f.is_empty()) {
                    rows.push(std::mem::take(&mut row));
                } else {
                    row.clear();
                }
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err("unterminated quoted field".to_string());
    }
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        if row.iter().any(|f| !f.is_empty()) {
            rows.push(row);
        }
    }

    Ok(rows)
}

/// RFC 3339, then the export's naive `%Y-%m-%d %H:%M:%S` (assumed UTC),
/// then epoch seconds.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    if let Ok(secs) = raw.parse::<i64>() {
        return DateTime::from_timestamp(secs, 0);
    }

    None
}

/// Zero means unrated in every export vintage.
fn nonzero_rating(rating: f64) -> Option<f64> {
    if rating == 0.0 {
        None
    } else {
        Some(rating)
    }
}

fn first_key<'a>(record: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| {
        let value = record.get(key)?;
        if value.is_null() {
            None
        } else {
            Some(value)
        }
    })
}

fn value_as_i64(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

fn value_as_f64(value: &Value) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = parse_export("export.xlsx", "").unwrap_err();
        assert!(matches!(err, CheckinError::UnsupportedFormat { .. }));
    }

    #[test]
    fn json_records_tolerate_both_vintages() {
        let contents = r#"[
            {
                "beer_id": 42068,
                "rating_score": 3.75,
                "created_at": "2024-05-17 18:30:00",
                "checkin_url": "https://community.example/user/checkin/900100"
            },
            {
                "beer_url": "https://community.example/b/lervig-supersonic/2716064",
                "rating": "4.25",
                "checked_in_at": "2024-05-18T12:00:00+02:00"
            }
        ]"#;

        let checkins = parse_export("export.json", contents).unwrap();
        assert_eq!(checkins.len(), 2);

        assert_eq!(checkins[0].community_beer_id, 42068);
        assert_eq!(checkins[0].rating, Some(3.75));
        assert_eq!(checkins[0].external_checkin_id, Some(900100));
        assert_eq!(
            checkins[0].checked_in_at,
            Some(Utc.with_ymd_and_hms(2024, 5, 17, 18, 30, 0).unwrap())
        );

        assert_eq!(checkins[1].community_beer_id, 2716064);
        assert_eq!(checkins[1].rating, Some(4.25));
        assert_eq!(checkins[1].external_checkin_id, None);
        assert_eq!(
            checkins[1].checked_in_at,
            Some(Utc.with_ymd_and_hms(2024, 5, 18, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn zero_rating_means_unrated() {
        let contents = r#"[{ "beer_id": 1, "rating_score": 0 }]"#;
        let checkins = parse_export("export.json", contents).unwrap();
        assert_eq!(checkins[0].rating, None);
    }

    #[test]
    fn records_without_a_beer_id_are_dropped() {
        let contents = r#"[
            { "rating_score": 4.0 },
            { "beer_url": "https://community.example/b/slug/not-a-number" },
            { "beer_id": 7 }
        ]"#;
        let checkins = parse_export("export.json", contents).unwrap();
        assert_eq!(checkins.len(), 1);
        assert_eq!(checkins[0].community_beer_id, 7);
    }

    #[test]
    fn epoch_and_unparsable_timestamps() {
        let contents = r#"[
            { "beer_id": 1, "created_at": 1716000000 },
            { "beer_id": 2, "created_at": "yesterday-ish" }
        ]"#;
        let checkins = parse_export("export.json", contents).unwrap();
        assert_eq!(
            checkins[0].checked_in_at,
            DateTime::from_timestamp(1_716_000_000, 0)
        );
        assert_eq!(checkins[1].checked_in_at, None);
    }

    #[test]
    fn non_array_json_is_malformed() {
        let err = parse_export("export.json", r#"{"beer_id": 1}"#).unwrap_err();
        assert!(matches!(err, CheckinError::Malformed { format: "json", .. }));
    }

    #[test]
    fn csv_header_drives_column_lookup() {
        let contents = "beer_name,beer_id,rating_score,created_at\n\
                        \"Supersonic, DIPA\",2716064,4.25,2024-05-17 18:30:00\n\
                        Lucky Jack,42068,0,\n";

        let checkins = parse_export("export.csv", contents).unwrap();
        assert_eq!(checkins.len(), 2);
        assert_eq!(checkins[0].community_beer_id, 2716064);
        assert_eq!(checkins[0].rating, Some(4.25));
        assert_eq!(checkins[1].community_beer_id, 42068);
        assert_eq!(checkins[1].rating, None);
        assert_eq!(checkins[1].checked_in_at, None);
    }

    #[test]
    fn csv_quoted_field_with_escaped_quote() {
        let rows = parse_csv("a,\"say \"\"hi\"\"\",c\n").unwrap();
        assert_eq!(rows, vec![vec!["a", "say \"hi\"", "c"]]);
    }

    #[test]
    fn csv_unterminated_quote_is_malformed() {
        let err = parse_export("export.csv", "beer_id\n\"1\n").unwrap_err();
        assert!(matches!(err, CheckinError::Malformed { format: "csv", .. }));
    }

    #[test]
    fn csv_beer_url_fallback() {
        let contents = "beer_url,rating\nhttps://community.example/b/slug/555,3.5\n";
        let checkins = parse_export("export.csv", contents).unwrap();
        assert_eq!(checkins[0].community_beer_id, 555);
    }
}
