use anyhow::{anyhow, Result};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::net::Ipv4Addr;
use std::time::Duration;

/// Network-ownership evidence for the scan's primary host.
///
/// At most one per scan. Built once, never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct OwnershipRecord {
    /// The domain or address the lookup was asked about.
    pub queried: String,
    pub ip: Option<String>,
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
    pub lookup_error: Option<String>,
}

impl OwnershipRecord {
    fn failed(queried: &str, error: String) -> Self {
        Self {
            queried: queried.to_string(),
            ip: None,
            organization: None,
            raw: None,
            lookup_error: Some(error),
        }
    }

    /// One display line for reports and interactive output.
    pub fn summary_line(&self) -> String {
        if let Some(err) = &self.lookup_error {
            return format!("Ownership lookup failed for {}: {}", self.queried, err);
        }
        format!(
            "IP: {} | Org: {}",
            self.ip.as_deref().unwrap_or("Unknown"),
            self.organization.as_deref().unwrap_or("Unknown")
        )
    }
}

/// Choose what the ownership lookup should target: the first extracted
/// domain when there is one, otherwise the first dotted-quad address in the
/// raw text, otherwise nothing (the scan records "no candidate").
pub fn select_candidate(domains: &[String], text: &str) -> Option<String> {
    if let Some(first) = domains.first() {
        return Some(first.clone());
    }

    let re = Regex::new(r"\b(\d{1,3}(?:\.\d{1,3}){3})\b").ok()?;
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Resolves a candidate host to an address and queries RDAP delegation data
/// for the owning organization.
#[derive(Debug, Clone)]
pub struct OwnershipChecker {
    rdap_base_url: String,
    timeout: Duration,
    use_mock: bool,
}

impl OwnershipChecker {
    pub fn new(rdap_base_url: String, timeout_seconds: u64, use_mock: bool) -> Self {
        Self {
            rdap_base_url,
            timeout: Duration::from_secs(timeout_seconds),
            use_mock,
        }
    }

    /// Resolve one candidate to an `OwnershipRecord`.
    ///
    /// Address-shaped candidates are queried directly; domains are
    /// DNS-resolved first. Resolution and lookup failures both land in
    /// `lookup_error`; this never returns an error to the caller.
    pub async fn resolve(&self, candidate: &str) -> OwnershipRecord {
        if self.use_mock {
            return self.mock_record(candidate);
        }

        let ip = if candidate.parse::<Ipv4Addr>().is_ok() {
            candidate.to_string()
        } else {
            match self.resolve_address(candidate).await {
                Ok(ip) => ip,
                Err(e) => {
                    log::warn!("Address resolution failed for {candidate}: {e}");
                    return OwnershipRecord::failed(candidate, e.to_string());
                }
            }
        };

        match self.rdap_lookup(&ip).await {
            Ok(raw) => {
                let organization = organization_from_rdap(&raw);
                OwnershipRecord {
                    queried: candidate.to_string(),
                    ip: Some(ip),
                    organization,
                    raw: Some(raw),
                    lookup_error: None,
                }
            }
            Err(e) => {
                log::warn!("RDAP lookup failed for {ip}: {e}");
                OwnershipRecord::failed(candidate, e.to_string())
            }
        }
    }

    /// Resolve a domain to its first IPv4 address.
    async fn resolve_address(&self, domain: &str) -> Result<String> {
        use hickory_resolver::TokioAsyncResolver;
        use tokio::time::timeout;

        let resolver = TokioAsyncResolver::tokio_from_system_conf()?;
        let lookup = timeout(self.timeout, resolver.lookup_ip(domain))
            .await
            .map_err(|_| anyhow!("DNS resolution timeout for {domain}"))??;

        lookup
            .iter()
            .find(|addr| addr.is_ipv4())
            .map(|addr| addr.to_string())
            .ok_or_else(|| anyhow!("no IPv4 address for {domain}"))
    }

    /// Query the RDAP bootstrap service for an address's network object.
    async fn rdap_lookup(&self, ip: &str) -> Result<Value> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("saathi-scan/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let url = format!("{}/ip/{}", self.rdap_base_url.trim_end_matches('/'), ip);
        log::debug!("RDAP query: {url}");

        let response = client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!("RDAP server returned {}", response.status()));
        }
        Ok(response.json::<Value>().await?)
    }

    fn mock_record(&self, candidate: &str) -> OwnershipRecord {
        match candidate {
            "example.com" | "google.com" | "93.184.216.34" => OwnershipRecord {
                queried: candidate.to_string(),
                ip: Some("93.184.216.34".to_string()),
                organization: Some("MOCK-EDGE-NETWORK".to_string()),
                raw: None,
                lookup_error: None,
            },
            _ => OwnershipRecord::failed(candidate, format!("mock: no RDAP data for {candidate}")),
        }
    }
}

/// Pull an organization name out of an RDAP network object: the network
/// name when present, else the first entity's handle.
pub fn organization_from_rdap(rdap: &Value) -> Option<String> {
    if let Some(name) = rdap.get("name").and_then(Value::as_str) {
        return Some(name.to_string());
    }

    rdap.get("entities")
        .and_then(Value::as_array)
        .and_then(|entities| entities.first())
        .and_then(|entity| entity.get("handle"))
        .and_then(Value::as_str)
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn owned(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_candidate_prefers_first_domain() {
        let domains = owned(&["first.com", "second.org"]);
        assert_eq!(
            select_candidate(&domains, "ignored text with 10.0.0.1"),
            Some("first.com".to_string())
        );
    }

    #[test]
    fn test_candidate_falls_back_to_dotted_quad() {
        assert_eq!(
            select_candidate(&[], "connect to 203.0.113.7 on port 80"),
            Some("203.0.113.7".to_string())
        );
    }

    #[test]
    fn test_candidate_none() {
        assert_eq!(select_candidate(&[], "no hosts mentioned at all"), None);
    }

    #[test]
    fn test_organization_from_network_name() {
        let rdap = json!({"name": "EDGECAST-NET", "entities": []});
        assert_eq!(
            organization_from_rdap(&rdap),
            Some("EDGECAST-NET".to_string())
        );
    }

    #[test]
    fn test_organization_falls_back_to_entity_handle() {
        let rdap = json!({"entities": [{"handle": "ARIN-ORG-1"}]});
        assert_eq!(
            organization_from_rdap(&rdap),
            Some("ARIN-ORG-1".to_string())
        );
        assert_eq!(organization_from_rdap(&json!({})), None);
    }

    #[tokio::test]
    async fn test_mock_resolve_known_host() {
        let checker = OwnershipChecker::new("https://rdap.org".to_string(), 5, true);
        let record = checker.resolve("example.com").await;
        assert_eq!(record.organization, Some("MOCK-EDGE-NETWORK".to_string()));
        assert!(record.lookup_error.is_none());
    }

    #[tokio::test]
    async fn test_mock_resolve_unknown_host_degrades() {
        let checker = OwnershipChecker::new("https://rdap.org".to_string(), 5, true);
        let record = checker.resolve("secure-bank-verify-login.com").await;
        assert!(record.lookup_error.is_some());
        assert_eq!(record.organization, None);
    }

    #[test]
    fn test_summary_lines() {
        let ok = OwnershipRecord {
            queried: "example.com".to_string(),
            ip: Some("93.184.216.34".to_string()),
            organization: Some("EDGECAST-NET".to_string()),
            raw: None,
            lookup_error: None,
        };
        assert_eq!(ok.summary_line(), "IP: 93.184.216.34 | Org: EDGECAST-NET");

        let bad = OwnershipRecord::failed("bad.test", "boom".to_string());
        assert_eq!(
            bad.summary_line(),
            "Ownership lookup failed for bad.test: boom"
        );
    }
}
