//! Deterministic activity reports over a page's recent snapshots.

use crate::config::TrackedPage;
use crate::results::Snapshot;
use serde::Serialize;
use std::fmt::Write;

/// Key changes listed in a report
const MAX_KEY_CHANGES: usize = 5;

/// Text changes taken from each snapshot
const TEXT_CHANGES_PER_SNAPSHOT: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Impact {
    pub pricing: String,
    pub features: String,
    pub messaging: String,
}

impl Impact {
    fn is_empty(&self) -> bool {
        self.pricing.is_empty() && self.features.is_empty() && self.messaging.is_empty()
    }
}

/// Summary of what changed on a tracked page
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageReport {
    pub title: String,
    pub summary: String,
    pub key_changes: Vec<String>,
    pub impact: Impact,
    pub recommendations: Vec<String>,
}

/// Builds a report from snapshots without any language model involved
pub fn fallback_report(page: &TrackedPage, snapshots: &[Snapshot]) -> PageReport {
    let changes_count: usize = snapshots.iter().map(|s| s.changes_summary.total()).sum();

    let mut key_changes = Vec::new();
    for snapshot in snapshots {
        let summary = &snapshot.changes_summary;
        key_changes.extend(
            summary
                .text_changes
                .iter()
                .take(TEXT_CHANGES_PER_SNAPSHOT)
                .cloned(),
        );
        key_changes.extend(summary.pricing_changes.iter().map(|p| p.description.clone()));
        key_changes.extend(
            summary
                .feature_changes
                .iter()
                .map(|f| format!("{}: {}", f.kind, f.feature)),
        );
    }
    key_changes.truncate(MAX_KEY_CHANGES);

    let changed = changes_count > 0;
    let impact = if changed {
        Impact {
            pricing: "Monitor pricing changes closely for competitive positioning.".to_string(),
            features: "Review feature changes to understand product direction.".to_string(),
            messaging: "Analyze messaging shifts to identify market positioning changes."
                .to_string(),
        }
    } else {
        Impact::default()
    };

    PageReport {
        title: format!("Activity Report: {}", page.display_name()),
        summary: format!(
            "Analyzed {} recent snapshots and detected {} total changes across the competitor's website.",
            snapshots.len(),
            changes_count
        ),
        key_changes,
        impact,
        recommendations: vec![
            "Continue monitoring this competitor regularly.".to_string(),
            if changed {
                "Review detailed changes in the snapshots section.".to_string()
            } else {
                "No significant changes detected yet.".to_string()
            },
            "Set up alerts for specific change types you care about.".to_string(),
        ],
    }
}

impl PageReport {
    /// Render as markdown
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail
        let _ = writeln!(out, "# {}\n", self.title);
        let _ = writeln!(out, "## Executive Summary\n\n{}\n", self.summary);

        if !self.key_changes.is_empty() {
            out.push_str("## Key Changes\n\n");
            for (index, change) in self.key_changes.iter().enumerate() {
                let _ = writeln!(out, "{}. {}", index + 1, change);
            }
            out.push('\n');
        }

        if !self.impact.is_empty() {
            out.push_str("## Impact Analysis\n\n");
            for (heading, text) in [
                ("Pricing Impact", &self.impact.pricing),
                ("Feature/Product Impact", &self.impact.features),
                ("Messaging/Positioning Impact", &self.impact.messaging),
            ] {
                if !text.is_empty() {
                    let _ = writeln!(out, "### {}\n{}\n", heading, text);
                }
            }
        }

        if !self.recommendations.is_empty() {
            out.push_str("## Recommendations\n\n");
            for (index, recommendation) in self.recommendations.iter().enumerate() {
                let _ = writeln!(out, "{}. {}", index + 1, recommendation);
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::{ChangesSummary, FeatureChange, FeatureChangeKind, PricingChange};
    use chrono::Utc;

    fn snapshot(summary: ChangesSummary) -> Snapshot {
        Snapshot {
            id: 1,
            page_id: "acme".to_string(),
            url: "https://acme.example/".to_string(),
            created_at: Utc::now(),
            html_content: None,
            text_content: String::new(),
            price_info: None,
            features: Vec::new(),
            changes_summary: summary,
            change_percentage: None,
        }
    }

    #[test]
    fn test_report_without_changes() {
        let page = TrackedPage::new("acme", "Acme", "https://acme.example/");
        let report = fallback_report(&page, &[snapshot(ChangesSummary::default())]);

        assert_eq!(report.title, "Activity Report: Acme");
        assert_eq!(
            report.summary,
            "Analyzed 1 recent snapshots and detected 0 total changes across the competitor's website."
        );
        assert!(report.key_changes.is_empty());
        assert_eq!(report.impact, Impact::default());
        assert_eq!(report.recommendations[1], "No significant changes detected yet.");

        let markdown = report.to_markdown();
        assert!(markdown.starts_with("# Activity Report: Acme\n\n## Executive Summary"));
        assert!(!markdown.contains("## Key Changes"));
        assert!(!markdown.contains("## Impact Analysis"));
        assert!(markdown.contains("## Recommendations\n\n1. Continue monitoring"));
    }

    #[test]
    fn test_report_collects_key_changes() {
        let page = TrackedPage::new("acme", "", "https://acme.example/");
        let snapshots = vec![
            snapshot(ChangesSummary {
                text_changes: vec![
                    "Added 2 new terms: priority, analytics".to_string(),
                    "Removed 1 terms: basic".to_string(),
                    "Content expanded by 27%".to_string(),
                    "ignored fourth entry".to_string(),
                ],
                pricing_changes: vec![PricingChange {
                    old_price: Some("$10".to_string()),
                    new_price: Some("$25".to_string()),
                    description: "Pricing changed from \"$10\" to \"$25\"".to_string(),
                }],
                ..ChangesSummary::default()
            }),
            snapshot(ChangesSummary {
                feature_changes: vec![FeatureChange {
                    kind: FeatureChangeKind::Added,
                    feature: "SAML single sign-on".to_string(),
                    description: None,
                }],
                ..ChangesSummary::default()
            }),
        ];

        let report = fallback_report(&page, &snapshots);
        assert_eq!(report.title, "Activity Report: acme");
        assert_eq!(
            report.key_changes,
            vec![
                "Added 2 new terms: priority, analytics",
                "Removed 1 terms: basic",
                "Content expanded by 27%",
                "Pricing changed from \"$10\" to \"$25\"",
                "added: SAML single sign-on",
            ]
        );
        assert!(report.summary.contains("detected 6 total changes"));

        let markdown = report.to_markdown();
        assert!(markdown.contains("## Key Changes\n\n1. Added 2 new terms"));
        assert!(markdown.contains("5. added: SAML single sign-on\n"));
        assert!(markdown.contains("### Pricing Impact\nMonitor pricing changes"));
    }
}
