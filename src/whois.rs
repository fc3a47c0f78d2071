use anyhow::{anyhow, Result};
use chrono::{NaiveDate, Utc};
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

/// Everything a scan records about one domain's registration.
///
/// Immutable once built. `age_days` is `None` whenever `created` is absent
/// or unparseable; a lookup can succeed while date parsing still fails, in
/// which case `lookup_error` stays unset but `age_days` is still `None`.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationRecord {
    pub domain: String,
    pub created: Option<NaiveDate>,
    pub registrar: Option<String>,
    /// Raw WHOIS response text, kept for the forensic report.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    pub age_days: Option<i64>,
    pub lookup_error: Option<String>,
}

impl RegistrationRecord {
    fn failed(domain: &str, error: String) -> Self {
        Self {
            domain: domain.to_string(),
            created: None,
            registrar: None,
            raw: None,
            age_days: None,
            lookup_error: Some(error),
        }
    }

    /// One display line for reports and interactive output.
    pub fn summary_line(&self) -> String {
        let created = self
            .created
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        let registrar = self.registrar.as_deref().unwrap_or("Unknown");
        format!("{} | Created: {} | Registrar: {}", self.domain, created, registrar)
    }
}

/// WHOIS client that resolves a domain's registration creation date and
/// reduces it to an age in days.
#[derive(Debug, Clone)]
pub struct RegistrationChecker {
    timeout: Duration,
    use_mock: bool,
}

impl RegistrationChecker {
    pub fn new(timeout_seconds: u64, use_mock: bool) -> Self {
        Self {
            timeout: Duration::from_secs(timeout_seconds),
            use_mock,
        }
    }

    /// Resolve one domain to a `RegistrationRecord`.
    ///
    /// Never returns an error: every failure mode (connect timeout, empty
    /// response, unparseable date) degrades to absent fields so a scan
    /// completes even when every lookup fails.
    pub async fn resolve(&self, domain: &str) -> RegistrationRecord {
        if self.use_mock {
            return self.mock_record(domain);
        }

        let raw = match self.fetch_whois(domain).await {
            Ok(text) => text,
            Err(e) => {
                log::warn!("WHOIS lookup failed for {domain}: {e}");
                return RegistrationRecord::failed(domain, e.to_string());
            }
        };

        // A lookup succeeded; date parsing is a distinct failure point.
        let created = find_creation_date(&raw);
        let registrar = find_registrar(&raw);
        let age_days = created.map(age_in_days);

        if created.is_none() {
            log::debug!("No parseable creation date in WHOIS response for {domain}");
        }

        RegistrationRecord {
            domain: domain.to_string(),
            created,
            registrar,
            raw: Some(raw),
            age_days,
            lookup_error: None,
        }
    }

    async fn fetch_whois(&self, domain: &str) -> Result<String> {
        if domain.is_empty() || !domain.contains('.') || domain.contains(char::is_whitespace) {
            return Err(anyhow!("invalid domain format: {domain}"));
        }

        let server = whois_server_for(domain);
        log::debug!("Querying WHOIS server {server} for {domain}");
        self.query_server(server, domain).await
    }

    /// Query a WHOIS server over TCP port 43 with the configured timeout.
    async fn query_server(&self, server: &str, domain: &str) -> Result<String> {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpStream;
        use tokio::time::timeout;

        let mut stream = timeout(self.timeout, TcpStream::connect(format!("{server}:43")))
            .await
            .map_err(|_| anyhow!("connect timeout to {server}"))??;

        let query = format!("{domain}\r\n");
        timeout(self.timeout, stream.write_all(query.as_bytes()))
            .await
            .map_err(|_| anyhow!("write timeout to {server}"))??;

        let mut response = String::new();
        timeout(self.timeout, stream.read_to_string(&mut response))
            .await
            .map_err(|_| anyhow!("read timeout from {server}"))??;

        if response.is_empty() {
            return Err(anyhow!("empty WHOIS response from {server}"));
        }
        Ok(response)
    }

    /// Offline fixture data so demos and tests run without the network.
    /// Domains absent from the table behave as failed lookups.
    fn mock_record(&self, domain: &str) -> RegistrationRecord {
        let mock_ages: HashMap<&str, i64> = HashMap::from([
            ("example.com", 8000),
            ("google.com", 9000),
            ("suspicious.tk", 30),
            ("newdomain.info", 45),
            ("established.org", 3650),
        ]);

        match mock_ages.get(domain) {
            Some(&age) => {
                let created = Utc::now().date_naive() - chrono::Duration::days(age);
                RegistrationRecord {
                    domain: domain.to_string(),
                    created: Some(created),
                    registrar: Some("Mock Registrar Inc.".to_string()),
                    raw: None,
                    age_days: Some(age),
                    lookup_error: None,
                }
            }
            None => RegistrationRecord::failed(domain, format!("mock: no WHOIS data for {domain}")),
        }
    }
}

/// Pick a WHOIS server by TLD, defaulting to IANA for unknown ones.
fn whois_server_for(domain: &str) -> &'static str {
    let tld = domain.rsplit('.').next().unwrap_or(domain);
    match tld {
        "com" | "net" => "whois.verisign-grs.com",
        "org" => "whois.pir.org",
        "info" => "whois.afilias.net",
        "io" => "whois.nic.io",
        "us" => "whois.nic.us",
        "uk" => "whois.nic.uk",
        "de" => "whois.denic.de",
        "fr" => "whois.afnic.fr",
        "nl" => "whois.domain-registry.nl",
        "au" => "whois.auda.org.au",
        "ca" => "whois.cira.ca",
        "jp" => "whois.jprs.jp",
        "br" => "whois.registro.br",
        "tk" => "whois.dot.tk",
        _ => "whois.iana.org",
    }
}

/// Find the creation date in raw WHOIS text.
///
/// Registries repeat the creation line (list semantics); the first match
/// wins. The date portion before any time-of-day is parsed as an ISO
/// calendar date.
pub fn find_creation_date(whois_text: &str) -> Option<NaiveDate> {
    const PATTERNS: &[&str] = &[
        r"(?i)creation\s*date[:\s]+([^\r\n]+)",
        r"(?i)created\s*on[:\s]+([^\r\n]+)",
        r"(?i)created[:\s]+([^\r\n]+)",
        r"(?i)registered\s*on[:\s]+([^\r\n]+)",
        r"(?i)registered[:\s]+([^\r\n]+)",
        r"(?i)registration\s*date[:\s]+([^\r\n]+)",
    ];

    for pattern in PATTERNS {
        let re = Regex::new(pattern).ok()?;
        if let Some(caps) = re.captures(whois_text) {
            if let Some(date) = parse_date_value(caps.get(1)?.as_str()) {
                return Some(date);
            }
        }
    }
    None
}

/// Normalize a textual date value to a calendar date.
///
/// Accepts "2024-10-10", "2024-10-10 12:00:00" and "2024-10-10T12:00:00Z":
/// everything after the date portion is ignored. Returns `None` when no ISO
/// calendar date can be recovered.
pub fn parse_date_value(value: &str) -> Option<NaiveDate> {
    let date_part = value
        .trim()
        .split(|c| c == ' ' || c == 'T')
        .next()?
        .trim();
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Pull the registrar name out of raw WHOIS text, if present.
pub fn find_registrar(whois_text: &str) -> Option<String> {
    // Colon must follow immediately so "Registrar URL:" and
    // "Registrar WHOIS Server:" lines do not match.
    let re = Regex::new(r"(?im)^\s*registrar:\s*([^\r\n]+)").ok()?;
    re.captures(whois_text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Whole days elapsed since `created`, relative to now.
pub fn age_in_days(created: NaiveDate) -> i64 {
    (Utc::now().date_naive() - created).num_days()
}
