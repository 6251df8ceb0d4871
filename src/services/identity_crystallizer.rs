//! Promotes repeatedly observed patterns into a persisted identity.

use std::collections::BTreeMap;

use crate::domain::models::{Identity, PatternSet};

/// Days of evidence required before a label crystallizes.
pub const CRYSTAL_THRESHOLD: u32 = 3;
/// Multiplier applied to the confidence of labels absent today.
pub const DECAY_RATE: f64 = 0.9;

/// Fold today's patterns into the previous identity.
///
/// Categories and labels are visited in sorted order, so two pattern sets
/// with the same content in a different insertion order produce identical
/// identities.
pub fn crystallize(previous: &Identity, patterns: &PatternSet, day: &str) -> Identity {
    let mut confidence = previous.confidence.clone();
    let mut evidence = previous.evidence.clone();
    let mut active = Vec::new();

    for (category, labels) in patterns {
        let mut labels: Vec<&String> = labels.iter().collect();
        labels.sort();
        for label in labels {
            let key = format!("{category}:{label}");
            *evidence.entry(key.clone()).or_insert(0) += 1;
            *confidence.entry(key.clone()).or_insert(0.0) += 1.0;
            active.push(key);
        }
    }

    for (key, value) in &mut confidence {
        if !active.contains(key) {
            *value *= DECAY_RATE;
        }
    }

    let mut crystallized: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (key, count) in &evidence {
        if *count >= CRYSTAL_THRESHOLD {
            if let Some((category, label)) = key.split_once(':') {
                crystallized
                    .entry(category.to_string())
                    .or_default()
                    .push(label.to_string());
            }
        }
    }

    let mut traits = Identity::empty().traits;
    traits.extend(previous.traits.clone());
    traits.extend(crystallized);

    Identity {
        traits,
        confidence,
        evidence,
        last_updated: Some(day.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns(entries: &[(&str, &[&str])]) -> PatternSet {
        entries
            .iter()
            .map(|(c, labels)| {
                (
                    (*c).to_string(),
                    labels.iter().map(|l| (*l).to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_evidence_accumulates_and_promotes() {
        let today = patterns(&[("recurring_moods", &["steady"])]);
        let mut identity = Identity::empty();
        for day in ["2026-02-06", "2026-02-07"] {
            identity = crystallize(&identity, &today, day);
        }
        assert!(identity.labels("recurring_moods").is_empty());

        identity = crystallize(&identity, &today, "2026-02-08");
        assert_eq!(identity.labels("recurring_moods"), ["steady".to_string()]);
        assert_eq!(identity.evidence["recurring_moods:steady"], 3);
        assert!((identity.confidence["recurring_moods:steady"] - 3.0).abs() < f64::EPSILON);
        assert_eq!(identity.last_updated.as_deref(), Some("2026-02-08"));
    }

    #[test]
    fn test_absent_labels_decay() {
        let first = crystallize(
            &Identity::empty(),
            &patterns(&[("recurring_themes", &["consistent_progress"])]),
            "2026-02-07",
        );
        let second = crystallize(&first, &PatternSet::new(), "2026-02-08");
        let value = second.confidence["recurring_themes:consistent_progress"];
        assert!((value - 0.9).abs() < 1e-9);
        assert_eq!(second.evidence["recurring_themes:consistent_progress"], 1);
    }

    #[test]
    fn test_insertion_order_does_not_matter() {
        let a = patterns(&[
            ("recurring_moods", &["steady", "curious"]),
            ("recurring_focus_patterns", &["high_focus_baseline"]),
        ]);
        let b = patterns(&[
            ("recurring_focus_patterns", &["high_focus_baseline"]),
            ("recurring_moods", &["curious", "steady"]),
        ]);
        assert_eq!(
            crystallize(&Identity::empty(), &a, "2026-02-08"),
            crystallize(&Identity::empty(), &b, "2026-02-08")
        );
    }

    #[test]
    fn test_empty_identity_keeps_all_categories() {
        let identity = crystallize(&Identity::empty(), &PatternSet::new(), "2026-02-08");
        assert_eq!(identity.traits.len(), 4);
        assert!(identity.confidence.is_empty());
    }
}
