//! Host normalisation and the public-suffix-aware label split

use crate::canonical::{to_canonical, to_unicode};
use tracing::debug;
use url::{Host, Url};

/// A domain split around its registrable label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainParts {
    /// Labels left of the registrable label, joined with dots (may be empty)
    pub prefix: String,
    /// The registrable label, the only part that gets substituted
    pub label: String,
    /// Public suffix chain (may be empty for single-label input)
    pub suffix: String,
}

impl DomainParts {
    /// Rebuild a full domain with `label` in place of the registrable label
    pub fn with_label(&self, label: &str) -> String {
        let mut domain = String::new();
        if !self.prefix.is_empty() {
            domain.push_str(&self.prefix);
            domain.push('.');
        }
        domain.push_str(label);
        if !self.suffix.is_empty() {
            domain.push('.');
            domain.push_str(&self.suffix);
        }
        domain
    }
}

/// Reduce user input to a bare lowercase host name.
///
/// Accepts `example.com`, `https://Example.com:443/path?q`, `example.com.` and
/// similar forms. Internationalized hosts come back in Unicode form. Input
/// that does not parse as a URL host yields an empty string.
pub fn normalize_domain(input: &str) -> String {
    let trimmed = input.trim().to_lowercase();
    if trimmed.is_empty() {
        return String::new();
    }

    let candidate_url = if trimmed.contains("://") {
        trimmed
    } else {
        format!("http://{}", trimmed)
    };

    let host = match Url::parse(&candidate_url) {
        Ok(url) => match url.host() {
            Some(Host::Domain(domain)) => to_unicode(domain).unwrap_or_else(|_| domain.to_string()),
            Some(other) => other.to_string(),
            None => String::new(),
        },
        Err(e) => {
            debug!("Cannot read a host from {:?}: {}", input, e);
            String::new()
        }
    };

    host.trim_end_matches('.').to_string()
}

/// Split a normalized domain into prefix, registrable label and suffix.
///
/// The suffix comes from the Public Suffix List. At least one label is always
/// left for substitution, so `co.uk` splits as `co` + `uk` and a single label
/// has an empty suffix. Returns `None` for empty input.
pub fn split_domain(domain: &str) -> Option<DomainParts> {
    if domain.is_empty() {
        return None;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    let suffix_len = public_suffix_len(domain, labels.len()).min(labels.len() - 1);
    let label_idx = labels.len() - 1 - suffix_len;

    Some(DomainParts {
        prefix: labels[..label_idx].join("."),
        label: labels[label_idx].to_string(),
        suffix: labels[label_idx + 1..].join("."),
    })
}

/// Number of trailing labels that form the public suffix
fn public_suffix_len(domain: &str, label_count: usize) -> usize {
    // The list is matched on the ASCII form; ToASCII keeps the label count
    let ascii = match to_canonical(domain) {
        Ok(ascii) if ascii.split('.').count() == label_count => ascii,
        _ => domain.to_string(),
    };

    psl::suffix_str(&ascii).map_or(1, |suffix| suffix.split('.').count())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_domain() {
        assert_eq!(normalize_domain("Example.COM"), "example.com");
        assert_eq!(normalize_domain("  example.com\n"), "example.com");
        assert_eq!(normalize_domain("https://example.com/login?x=1"), "example.com");
        assert_eq!(normalize_domain("http://user@example.com:8080"), "example.com");
        assert_eq!(normalize_domain("example.com."), "example.com");
        assert_eq!(normalize_domain("example.com#top"), "example.com");
    }

    #[test]
    fn test_normalize_internationalized_host() {
        assert_eq!(normalize_domain("https://ПРИМЕР.рф/path"), "пример.рф");
        assert_eq!(normalize_domain("хx.com"), "хx.com");
    }

    #[test]
    fn test_normalize_garbage() {
        assert_eq!(normalize_domain(""), "");
        assert_eq!(normalize_domain("   "), "");
        assert_eq!(normalize_domain("https://"), "");
    }

    #[test]
    fn test_split_simple_domain() {
        let parts = split_domain("example.com").unwrap();
        assert_eq!(parts.prefix, "");
        assert_eq!(parts.label, "example");
        assert_eq!(parts.suffix, "com");
        assert_eq!(parts.with_label("example"), "example.com");
    }

    #[test]
    fn test_split_subdomain() {
        let parts = split_domain("mail.google.com").unwrap();
        assert_eq!(parts.prefix, "mail");
        assert_eq!(parts.label, "google");
        assert_eq!(parts.suffix, "com");
        assert_eq!(parts.with_label("g00gle"), "mail.g00gle.com");
    }

    #[test]
    fn test_public_suffix_split() {
        let parts = split_domain("example.co.uk").unwrap();
        assert_eq!(parts.label, "example");
        assert_eq!(parts.suffix, "co.uk");

        let parts = split_domain("api.company.com.au").unwrap();
        assert_eq!(parts.prefix, "api");
        assert_eq!(parts.label, "company");
        assert_eq!(parts.suffix, "com.au");

        let parts = split_domain("example.gov.au").unwrap();
        assert_eq!(parts.prefix, "");
        assert_eq!(parts.label, "example");
        assert_eq!(parts.suffix, "gov.au");

        let parts = split_domain("example.com.sg").unwrap();
        assert_eq!(parts.label, "example");
        assert_eq!(parts.suffix, "com.sg");

        let parts = split_domain("example.co.il").unwrap();
        assert_eq!(parts.label, "example");
        assert_eq!(parts.suffix, "co.il");

        let parts = split_domain("shop.example.com.tw").unwrap();
        assert_eq!(parts.prefix, "shop");
        assert_eq!(parts.label, "example");
        assert_eq!(parts.suffix, "com.tw");

        // "co.uk" alone: "co" is the label
        let parts = split_domain("co.uk").unwrap();
        assert_eq!(parts.label, "co");
        assert_eq!(parts.suffix, "uk");
    }

    #[test]
    fn test_single_label_and_empty() {
        let parts = split_domain("localhost").unwrap();
        assert_eq!(parts.label, "localhost");
        assert_eq!(parts.suffix, "");
        assert_eq!(parts.with_label("x"), "x");

        assert!(split_domain("").is_none());
    }

    #[test]
    fn test_internationalized_suffix() {
        let parts = split_domain("пример.рф").unwrap();
        assert_eq!(parts.label, "пример");
        assert_eq!(parts.suffix, "рф");
    }

    #[test]
    fn test_empty_label() {
        let parts = split_domain(".com").unwrap();
        assert_eq!(parts.label, "");
        assert_eq!(parts.suffix, "com");
    }
}
