//! ASCII-compatible (punycode) encoding of labels and domains

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Cannot encode '{input}' as an IDNA domain: {reason}")]
pub struct EncodingError {
    pub input: String,
    pub reason: String,
}

/// Convert a label or dotted domain to its ASCII-compatible encoding.
///
/// Applies UTS #46 processing, so mapped code points (e.g. fullwidth forms)
/// fold to the same result as their targets. Already-encoded input comes back
/// unchanged.
pub fn to_canonical(input: &str) -> Result<String, EncodingError> {
    if input.is_empty() {
        return Ok(String::new());
    }

    idna::domain_to_ascii(input).map_err(|e| EncodingError {
        input: input.to_string(),
        reason: format!("{:?}", e),
    })
}

/// Decode an ASCII-compatible domain back to Unicode
pub fn to_unicode(input: &str) -> Result<String, EncodingError> {
    let (decoded, result) = idna::domain_to_unicode(input);
    result.map_err(|e| EncodingError {
        input: input.to_string(),
        reason: format!("{:?}", e),
    })?;
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_label_is_unchanged() {
        assert_eq!(to_canonical("example").unwrap(), "example");
        assert_eq!(to_canonical("example.com").unwrap(), "example.com");
    }

    #[test]
    fn test_unicode_label_is_encoded() {
        assert_eq!(to_canonical("münchen.de").unwrap(), "xn--mnchen-3ya.de");
    }

    #[test]
    fn test_idempotent() {
        let once = to_canonical("ехаmple.com").unwrap();
        let twice = to_canonical(&once).unwrap();
        assert_eq!(once, twice);
        assert!(once.starts_with("xn--"));
    }

    #[test]
    fn test_round_trip_of_unsubstituted_label() {
        let canonical = to_canonical("example").unwrap();
        assert_eq!(to_unicode(&canonical).unwrap(), "example");

        let canonical = to_canonical("münchen").unwrap();
        assert_eq!(to_unicode(&canonical).unwrap(), "münchen");
    }

    #[test]
    fn test_mapped_code_points_fold() {
        // FULLWIDTH LATIN SMALL LETTER X maps to plain 'x'
        assert_eq!(to_canonical("\u{ff58}").unwrap(), "x");
    }

    #[test]
    fn test_leading_combining_mark_is_rejected() {
        let err = to_canonical("\u{301}.com").unwrap_err();
        assert_eq!(err.input, "\u{301}.com");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(to_canonical("").unwrap(), "");
    }
}
