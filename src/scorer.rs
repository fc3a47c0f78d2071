use crate::classifier::Label;

/// Combine every scan signal into one bounded 0-100 risk score.
///
/// The score is an additive weighted sum, clamped and rounded, rather than a
/// second model: a reviewer must be able to audit exactly why a score was
/// produced from the evidence bundle alone.
///
/// Weights:
/// - phishing label: +50
/// - classifier confidence: +30 * (confidence / 100)
/// - keywords: +5 each, capped at 20
/// - distinct domains: +3 each, capped at 10
/// - each registration age: unknown +3, under 90 days +4, under a year +2,
///   a year or older +0
///
/// Unknown age sits between "young" and "old" deliberately: lookup failure
/// correlates weakly with throwaway infrastructure.
pub fn compute_risk_score(
    label: Label,
    confidence: f64,
    keyword_count: usize,
    domain_count: usize,
    age_days: &[Option<i64>],
) -> f64 {
    let mut score = 0.0;

    if label == Label::Phishing {
        score += 50.0;
    }
    score += 30.0 * (confidence / 100.0);
    score += (5.0 * keyword_count as f64).min(20.0);
    score += (3.0 * domain_count as f64).min(10.0);

    for age in age_days {
        match age {
            None => score += 3.0,
            Some(days) if *days < 90 => score += 4.0,
            Some(days) if *days < 365 => score += 2.0,
            Some(_) => {}
        }
    }

    // Every term is non-negative, so only the upper clamp is needed.
    ((score * 100.0).round() / 100.0).min(100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifier_only_phishing() {
        let score = compute_risk_score(Label::Phishing, 100.0, 0, 0, &[]);
        assert_eq!(score, 80.00);
    }

    #[test]
    fn test_all_quiet_is_zero() {
        let score = compute_risk_score(Label::Legitimate, 0.0, 0, 0, &[]);
        assert_eq!(score, 0.00);
    }

    #[test]
    fn test_clamped_at_100() {
        // 50 + 27 + 15 + 6 + 4 + 3 = 105 -> clamped
        let score = compute_risk_score(Label::Phishing, 90.0, 3, 2, &[Some(45), None]);
        assert_eq!(score, 100.00);
    }

    #[test]
    fn test_age_bands() {
        let base = compute_risk_score(Label::Legitimate, 0.0, 0, 0, &[]);
        assert_eq!(
            compute_risk_score(Label::Legitimate, 0.0, 0, 0, &[Some(30)]),
            base + 4.0
        );
        assert_eq!(
            compute_risk_score(Label::Legitimate, 0.0, 0, 0, &[Some(200)]),
            base + 2.0
        );
        assert_eq!(
            compute_risk_score(Label::Legitimate, 0.0, 0, 0, &[Some(4000)]),
            base
        );
        assert_eq!(
            compute_risk_score(Label::Legitimate, 0.0, 0, 0, &[None]),
            base + 3.0
        );
    }

    #[test]
    fn test_keyword_and_domain_caps() {
        // 10 keywords would be 50 uncapped; cap is 20
        assert_eq!(compute_risk_score(Label::Legitimate, 0.0, 10, 0, &[]), 20.00);
        // 10 domains would be 30 uncapped; cap is 10
        assert_eq!(compute_risk_score(Label::Legitimate, 0.0, 0, 10, &[]), 10.00);
    }

    #[test]
    fn test_monotonic_in_each_signal() {
        let mut prev = 0.0;
        for kw in 0..6 {
            let s = compute_risk_score(Label::Legitimate, 0.0, kw, 0, &[]);
            assert!(s >= prev);
            prev = s;
        }

        let mut prev = 0.0;
        for dc in 0..6 {
            let s = compute_risk_score(Label::Legitimate, 0.0, 0, dc, &[]);
            assert!(s >= prev);
            prev = s;
        }

        let mut prev = 0.0;
        for conf in [0.0, 25.0, 50.0, 75.0, 100.0] {
            let s = compute_risk_score(Label::Legitimate, conf, 0, 0, &[]);
            assert!(s >= prev);
            prev = s;
        }
    }

    #[test]
    fn test_pure_and_idempotent() {
        let ages = [Some(10), None, Some(500)];
        let a = compute_risk_score(Label::Phishing, 66.6, 2, 1, &ages);
        let b = compute_risk_score(Label::Phishing, 66.6, 2, 1, &ages);
        assert_eq!(a, b);
    }

    #[test]
    fn test_fractional_confidence_rounding() {
        // 50 + 28.5 + 10 + 3 + 3 = 94.50
        let score = compute_risk_score(Label::Phishing, 95.0, 2, 1, &[None]);
        assert_eq!(score, 94.50);
    }
}
