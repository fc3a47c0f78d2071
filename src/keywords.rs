use regex::Regex;

/// Threat-indicator vocabulary, scanned against every email.
///
/// Ordering matters: matched terms are reported in vocabulary order so
/// repeated scans of the same text always produce the same list.
pub const THREAT_KEYWORDS: &[&str] = &[
    "password",
    "click here",
    "urgent",
    "verify",
    "confirm",
    "account suspended",
    "reset",
    "login",
    "verify identity",
    "bank",
    "otp",
    "payment",
    "refund",
    "unlock",
    "ssn",
    "id",
    "passport",
];

/// Find vocabulary terms present in `text` as whole words, case-insensitive.
///
/// Word-boundary semantics: "id" does not match inside "paid". Results come
/// back in vocabulary order, not text order.
pub fn find_keywords(text: &str, vocabulary: &[String]) -> Vec<String> {
    let mut found = Vec::new();

    for term in vocabulary {
        let pattern = format!(r"(?i)\b{}\b", regex::escape(term));
        match Regex::new(&pattern) {
            Ok(re) => {
                if re.is_match(text) {
                    found.push(term.clone());
                }
            }
            Err(e) => {
                log::warn!("Skipping unmatchable vocabulary term '{term}': {e}");
            }
        }
    }

    found
}

/// Default vocabulary as owned strings, for config defaults.
pub fn default_vocabulary() -> Vec<String> {
    THREAT_KEYWORDS.iter().map(|s| s.to_string()).collect()
}
