use regex::Regex;
use url::{Host, Url};

/// Extract http/https URLs from free text, first occurrences only, in order
/// of appearance. Pure text operation, no network access.
pub fn extract_urls(text: &str) -> Vec<String> {
    // A URL token runs until whitespace or a quoting/bracket character.
    let re = match Regex::new(r#"https?://[^\s'"<>]+"#) {
        Ok(re) => re,
        Err(_) => return Vec::new(),
    };

    let mut urls: Vec<String> = Vec::new();
    for m in re.find_iter(text) {
        let url = m.as_str().to_string();
        if !urls.contains(&url) {
            urls.push(url);
        }
    }
    urls
}

/// Reduce URLs to lowercase registrable domains, deduplicated preserving
/// first-seen order. URLs that fail to parse, or whose host is an IP
/// literal, are silently skipped; they never fail the whole extraction.
pub fn extract_domains(urls: &[String]) -> Vec<String> {
    let mut domains: Vec<String> = Vec::new();

    for u in urls {
        let host = match Url::parse(u) {
            Ok(parsed) => match parsed.host() {
                Some(Host::Domain(h)) => h.to_lowercase(),
                // IP-literal hosts are handled by the ownership candidate
                // fallback, not the domain list.
                _ => continue,
            },
            Err(e) => {
                log::debug!("Skipping unparseable URL '{u}': {e}");
                continue;
            }
        };

        let domain = registrable_domain(&host);
        if !domain.is_empty() && !domains.contains(&domain) {
            domains.push(domain);
        }
    }

    domains
}

/// Strip a hostname to its registrable (public-suffix-plus-one) form,
/// e.g. "mail.example.co.uk" -> "example.co.uk".
pub fn registrable_domain(host: &str) -> String {
    // Common two-part public suffixes; enough coverage for email forensics
    // without pulling in a full public-suffix database.
    const TWO_PART_SUFFIXES: &[&str] = &[
        "co.uk", "org.uk", "gov.uk", "ac.uk", "com.au", "net.au", "edu.au", "co.jp", "co.kr",
        "com.br", "co.za", "com.mx", "co.in", "com.sg", "co.nz", "com.ar", "co.il",
    ];

    let host = host.trim_matches('.');
    let parts: Vec<&str> = host.split('.').collect();
    if parts.len() < 2 {
        return host.to_string();
    }

    let last_two = format!("{}.{}", parts[parts.len() - 2], parts[parts.len() - 1]);
    if parts.len() >= 3 && TWO_PART_SUFFIXES.contains(&last_two.as_str()) {
        return format!("{}.{}", parts[parts.len() - 3], last_two);
    }

    last_two
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_extract_urls_basic() {
        let text = "Visit https://example.com/login now or http://evil.test/x.";
        assert_eq!(
            extract_urls(text),
            owned(&["https://example.com/login", "http://evil.test/x."])
        );
    }

    #[test]
    fn test_extract_urls_dedup_preserves_order() {
        let text = "https://b.com https://a.com https://b.com";
        assert_eq!(extract_urls(text), owned(&["https://b.com", "https://a.com"]));
    }

    #[test]
    fn test_extract_urls_stops_at_quotes_and_brackets() {
        let text = r#"see <https://example.com/path> and "https://other.org/q""#;
        assert_eq!(
            extract_urls(text),
            owned(&["https://example.com/path", "https://other.org/q"])
        );
    }

    #[test]
    fn test_extract_urls_none() {
        assert!(extract_urls("no links in here").is_empty());
    }

    #[test]
    fn test_extract_domains_strips_subdomains() {
        let urls = owned(&[
            "https://mail.example.com/inbox",
            "https://EXAMPLE.com/other",
            "https://login.bank.co.uk/session",
        ]);
        assert_eq!(extract_domains(&urls), owned(&["example.com", "bank.co.uk"]));
    }

    #[test]
    fn test_extract_domains_skips_bad_and_ip_hosts() {
        let urls = owned(&[
            "https://192.168.1.1/admin",
            "http://",
            "https://good.org/page",
        ]);
        assert_eq!(extract_domains(&urls), owned(&["good.org"]));
    }

    #[test]
    fn test_registrable_domain() {
        assert_eq!(registrable_domain("example.com"), "example.com");
        assert_eq!(registrable_domain("mail.example.com"), "example.com");
        assert_eq!(registrable_domain("a.b.example.co.uk"), "example.co.uk");
        assert_eq!(registrable_domain("single"), "single");
    }
}
