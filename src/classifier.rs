use anyhow::Result;
use serde::Serialize;
use std::fmt;

use crate::extractor;
use crate::keywords;

/// Classifier verdict for one email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Label {
    Legitimate,
    Phishing,
}

impl Label {
    /// Short tag used in summary lines and history display.
    pub fn tag(&self) -> &'static str {
        match self {
            Label::Legitimate => "LEGIT",
            Label::Phishing => "PHISH",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Legitimate => write!(f, "Legitimate"),
            Label::Phishing => write!(f, "Phishing"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassifierResult {
    pub label: Label,
    /// Confidence percent in [0, 100], rounded to 2 decimal places.
    pub confidence: f64,
}

/// The seam between the pipeline and whatever model produces predictions.
///
/// The scanner only ever calls `classify`; a trained-model backend plugs in
/// through this trait without touching the pipeline. Callers guarantee
/// non-empty text (the scanner rejects empty input before inference).
pub trait Classifier: Send + Sync {
    fn classify(&self, text: &str) -> Result<ClassifierResult>;
}

/// Built-in lexical classifier.
///
/// A transparent ensemble of surface signals (threat-keyword density, URL
/// count, urgency phrasing) mapped to a label and confidence percent. It
/// exists so the scanner works end-to-end without a model artifact; it is
/// not a substitute for a trained model.
pub struct LexicalClassifier {
    vocabulary: Vec<String>,
}

impl LexicalClassifier {
    pub fn new(vocabulary: Vec<String>) -> Self {
        Self { vocabulary }
    }

    fn phishing_signal(&self, text: &str) -> f64 {
        let keyword_count = keywords::find_keywords(text, &self.vocabulary).len();
        let url_count = extract_url_count(text);

        // Each component saturates so no single signal dominates.
        let keyword_signal = (keyword_count as f64 * 0.18).min(0.6);
        let url_signal = (url_count as f64 * 0.15).min(0.3);
        let urgency_signal = if has_urgency_phrasing(text) { 0.2 } else { 0.0 };

        (keyword_signal + url_signal + urgency_signal).min(1.0)
    }
}

impl Classifier for LexicalClassifier {
    fn classify(&self, text: &str) -> Result<ClassifierResult> {
        let signal = self.phishing_signal(text);

        let (label, probability) = if signal >= 0.5 {
            (Label::Phishing, signal)
        } else {
            (Label::Legitimate, 1.0 - signal)
        };

        let confidence = (probability * 100.0 * 100.0).round() / 100.0;
        log::debug!("Lexical classifier: signal={signal:.3} -> {label} ({confidence}%)");

        Ok(ClassifierResult { label, confidence })
    }
}

fn extract_url_count(text: &str) -> usize {
    extractor::extract_urls(text).len()
}

fn has_urgency_phrasing(text: &str) -> bool {
    const URGENCY: &[&str] = &[
        "immediately",
        "within 24 hours",
        "permanent closure",
        "suspended",
        "act now",
        "final notice",
    ];
    let lower = text.to_lowercase();
    URGENCY.iter().any(|phrase| lower.contains(phrase))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::default_vocabulary;

    #[test]
    fn test_benign_text_is_legitimate() {
        let clf = LexicalClassifier::new(default_vocabulary());
        let result = clf
            .classify("Hi team, the meeting moved to 3 PM. Please update the shared document.")
            .unwrap();
        assert_eq!(result.label, Label::Legitimate);
        assert!(result.confidence > 50.0);
    }

    #[test]
    fn test_phishy_text_is_phishing() {
        let clf = LexicalClassifier::new(default_vocabulary());
        let result = clf
            .classify(
                "Your account has been suspended. Verify your password and bank login \
                 immediately at https://secure-bank-verify-login.com",
            )
            .unwrap();
        assert_eq!(result.label, Label::Phishing);
        assert!(result.confidence >= 50.0);
    }

    #[test]
    fn test_confidence_bounded() {
        let clf = LexicalClassifier::new(default_vocabulary());
        let spam = "urgent verify password bank login otp payment refund unlock \
                    immediately act now https://a.com https://b.com https://c.com";
        let result = clf.classify(spam).unwrap();
        assert!(result.confidence <= 100.0);
        assert!(result.confidence >= 0.0);
    }

    #[test]
    fn test_deterministic() {
        let clf = LexicalClassifier::new(default_vocabulary());
        let text = "Please verify your login";
        let a = clf.classify(text).unwrap();
        let b = clf.classify(text).unwrap();
        assert_eq!(a.label, b.label);
        assert_eq!(a.confidence, b.confidence);
    }

    #[test]
    fn test_label_tags() {
        assert_eq!(Label::Phishing.tag(), "PHISH");
        assert_eq!(Label::Legitimate.tag(), "LEGIT");
        assert_eq!(Label::Phishing.to_string(), "Phishing");
    }
}
