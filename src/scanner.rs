use anyhow::{bail, Result};
use std::sync::Arc;

use crate::bundle::EvidenceBundle;
use crate::classifier::Classifier;
use crate::config::Config;
use crate::extractor;
use crate::keywords;
use crate::rdap::{self, OwnershipChecker, OwnershipRecord};
use crate::scorer;
use crate::whois::{RegistrationChecker, RegistrationRecord};

/// The full scan pipeline: classifier inference, URL/keyword extraction,
/// per-domain registration lookups, one ownership lookup, scoring, and
/// bundle assembly.
///
/// The classifier is injected at construction; the vocabulary and checkers
/// are the only other state, all read-only, so one `Scanner` can serve
/// independent callers concurrently.
pub struct Scanner {
    classifier: Arc<dyn Classifier>,
    registration: RegistrationChecker,
    ownership: OwnershipChecker,
    vocabulary: Vec<String>,
}

impl Scanner {
    pub fn new(config: &Config, classifier: Arc<dyn Classifier>) -> Self {
        let registration =
            RegistrationChecker::new(config.lookups.whois_timeout_seconds, config.lookups.use_mock);
        let ownership = OwnershipChecker::new(
            config.lookups.rdap_base_url.clone(),
            config.lookups.rdap_timeout_seconds,
            config.lookups.use_mock,
        );

        Self {
            classifier,
            registration,
            ownership,
            vocabulary: config.vocabulary(),
        }
    }

    /// Run one scan over pasted email text.
    ///
    /// Only empty input fails; every collaborator failure degrades into the
    /// corresponding record's error field and the scan completes.
    pub async fn scan(&self, text: &str) -> Result<EvidenceBundle> {
        if text.trim().is_empty() {
            bail!("no email text provided");
        }

        let classifier_result = self.classifier.classify(text)?;
        log::info!(
            "Classifier: {} at {}%",
            classifier_result.label,
            classifier_result.confidence
        );

        let urls = extractor::extract_urls(text);
        let domains = extractor::extract_domains(&urls);
        let found_keywords = keywords::find_keywords(text, &self.vocabulary);
        log::debug!(
            "Extracted {} urls, {} domains, {} keywords",
            urls.len(),
            domains.len(),
            found_keywords.len()
        );

        let registrations = self.resolve_registrations(&domains).await;
        let ownership = self.resolve_ownership(&domains, text).await;

        let ages: Vec<Option<i64>> = registrations.iter().map(|r| r.age_days).collect();
        let score = scorer::compute_risk_score(
            classifier_result.label,
            classifier_result.confidence,
            found_keywords.len(),
            domains.len(),
            &ages,
        );
        log::info!("Risk score: {score}");

        Ok(EvidenceBundle::assemble(
            text.to_string(),
            classifier_result,
            found_keywords,
            urls,
            registrations,
            ownership,
            score,
        ))
    }

    /// Issue the per-domain WHOIS lookups concurrently, then collect them
    /// in input-domain order. Report ordering depends on that order being
    /// deterministic.
    async fn resolve_registrations(&self, domains: &[String]) -> Vec<RegistrationRecord> {
        let handles: Vec<_> = domains
            .iter()
            .map(|domain| {
                let checker = self.registration.clone();
                let domain = domain.clone();
                tokio::spawn(async move { checker.resolve(&domain).await })
            })
            .collect();

        let mut records = Vec::with_capacity(handles.len());
        for (handle, domain) in handles.into_iter().zip(domains) {
            match handle.await {
                Ok(record) => records.push(record),
                // Task panics should not happen; treat one like any other
                // failed lookup so siblings are unaffected.
                Err(e) => {
                    log::error!("Registration lookup task for {domain} aborted: {e}");
                    records.push(RegistrationRecord {
                        domain: domain.clone(),
                        created: None,
                        registrar: None,
                        raw: None,
                        age_days: None,
                        lookup_error: Some(format!("lookup task aborted: {e}")),
                    });
                }
            }
        }
        records
    }

    async fn resolve_ownership(&self, domains: &[String], text: &str) -> Option<OwnershipRecord> {
        match rdap::select_candidate(domains, text) {
            Some(candidate) => Some(self.ownership.resolve(&candidate).await),
            None => {
                log::debug!("No domain or address candidate for ownership lookup");
                None
            }
        }
    }
}
