//! Textual array input: `[1, 2, null, 3]`, `1,2,null,3` or `['1', ...]`-style loose quoting.

use serde_json::Value;
use tracing::debug;

use crate::domain::error::DomainError;

/// Parse a loosely formatted array into a sequence of optional integers.
///
/// Single quotes are normalised to double quotes and surrounding brackets are
/// optional. Every element must be an integer or `null`.
pub fn parse_array(raw: &str) -> Result<Vec<Option<i64>>, DomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::invalid_input(raw, "empty input"));
    }

    let mut clean = trimmed.replace('\'', "\"");
    if !clean.starts_with('[') {
        clean = format!("[{}]", clean);
    }
    debug!("parse_array: normalised={}", clean);

    let parsed: Value =
        serde_json::from_str(&clean).map_err(|e| DomainError::invalid_input(raw, e.to_string()))?;
    let Value::Array(items) = parsed else {
        return Err(DomainError::invalid_input(raw, "not an array"));
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Null => Ok(None),
            Value::Number(n) => n.as_i64().map(Some).ok_or_else(|| {
                DomainError::invalid_input(raw, format!("element {} is not an integer: {}", i, n))
            }),
            // '1' arrives as "1" after quote normalisation
            Value::String(s) => match s.trim() {
                "null" => Ok(None),
                other => other.parse::<i64>().map(Some).map_err(|_| {
                    DomainError::invalid_input(
                        raw,
                        format!("element {} is not an integer: {:?}", i, s),
                    )
                }),
            },
            other => Err(DomainError::invalid_input(
                raw,
                format!("element {} is not an integer or null: {}", i, other),
            )),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bracketed() {
        assert_eq!(
            parse_array("[1, 2, null, 3]").unwrap(),
            vec![Some(1), Some(2), None, Some(3)]
        );
    }

    #[test]
    fn test_parse_without_brackets_and_single_quotes() {
        assert_eq!(
            parse_array(" 1,'2', null ").unwrap(),
            vec![Some(1), Some(2), None]
        );
    }

    #[test]
    fn test_parse_empty_array_is_valid() {
        assert_eq!(parse_array("[]").unwrap(), Vec::<Option<i64>>::new());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_array("").is_err());
        assert!(parse_array("[1, 2").is_err());
        assert!(parse_array("[1.5]").is_err());
        assert!(parse_array("[[1]]").is_err());
        assert!(parse_array("abc").is_err());
        assert!(parse_array("{\"a\": 1}").is_err());
    }
}
