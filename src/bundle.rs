use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::classifier::ClassifierResult;
use crate::rdap::OwnershipRecord;
use crate::whois::RegistrationRecord;

/// The immutable aggregate produced by one scan: classifier output, every
/// OSINT signal, the risk score, and the source text.
///
/// This is the unit handed to report rendering and retained in session
/// history. Assembly is pure field packing plus the summary line; no
/// computation happens here.
#[derive(Debug, Clone, Serialize)]
pub struct EvidenceBundle {
    pub timestamp: DateTime<Utc>,
    pub text: String,
    pub classifier: ClassifierResult,
    pub keywords: Vec<String>,
    pub urls: Vec<String>,
    pub registrations: Vec<RegistrationRecord>,
    /// `None` means no domain or address candidate was found, which is
    /// distinct from a lookup that ran and failed.
    pub ownership: Option<OwnershipRecord>,
    pub score: f64,
    pub summary: String,
}

impl EvidenceBundle {
    #[allow(clippy::too_many_arguments)]
    pub fn assemble(
        text: String,
        classifier: ClassifierResult,
        keywords: Vec<String>,
        urls: Vec<String>,
        registrations: Vec<RegistrationRecord>,
        ownership: Option<OwnershipRecord>,
        score: f64,
    ) -> Self {
        let summary = format!(
            "{} | {}% | score {}",
            classifier.label.tag(),
            classifier.confidence,
            score
        );

        Self {
            timestamp: Utc::now(),
            text,
            classifier,
            keywords,
            urls,
            registrations,
            ownership,
            score,
            summary,
        }
    }
}

/// Append-only log of the session's scans.
///
/// The core never trims this; bounded retention (`recent`) is applied only
/// at the display boundary.
#[derive(Debug, Default)]
pub struct ScanHistory {
    entries: Vec<EvidenceBundle>,
}

impl ScanHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bundle: EvidenceBundle) {
        self.entries.push(bundle);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most recent `limit` entries, newest first.
    pub fn recent(&self, limit: usize) -> impl Iterator<Item = &EvidenceBundle> {
        self.entries.iter().rev().take(limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Label;

    fn bundle(score: f64) -> EvidenceBundle {
        EvidenceBundle::assemble(
            "text".to_string(),
            ClassifierResult {
                label: Label::Phishing,
                confidence: 95.0,
            },
            vec![],
            vec![],
            vec![],
            None,
            score,
        )
    }

    #[test]
    fn test_summary_format() {
        let b = bundle(94.5);
        assert_eq!(b.summary, "PHISH | 95% | score 94.5");
    }

    #[test]
    fn test_history_append_and_recent() {
        let mut history = ScanHistory::new();
        assert!(history.is_empty());

        for score in [10.0, 20.0, 30.0, 40.0] {
            history.push(bundle(score));
        }
        assert_eq!(history.len(), 4);

        let recent: Vec<f64> = history.recent(2).map(|b| b.score).collect();
        assert_eq!(recent, vec![40.0, 30.0]);

        // Asking for more than exists returns everything, newest first
        let all: Vec<f64> = history.recent(10).map(|b| b.score).collect();
        assert_eq!(all, vec![40.0, 30.0, 20.0, 10.0]);
    }
}
