use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time capture of a tracked page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Sequence number within the page's history, assigned by the store
    #[serde(default)]
    pub id: u64,

    /// Tracked page this snapshot belongs to
    pub page_id: String,

    /// URL that was fetched
    pub url: String,

    pub created_at: DateTime<Utc>,

    /// Raw HTML as fetched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_content: Option<String>,

    /// Extracted visible text
    pub text_content: String,

    /// First price found on the page
    #[serde(default)]
    pub price_info: Option<String>,

    /// Feature bullets found on the page
    #[serde(default)]
    pub features: Vec<String>,

    /// What changed compared to the previous snapshot
    #[serde(default)]
    pub changes_summary: ChangesSummary,

    /// Change magnitude against the previous snapshot, if there was one
    #[serde(default)]
    pub change_percentage: Option<f64>,
}

/// Structured description of the differences between two snapshots
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangesSummary {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub text_changes: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pricing_changes: Vec<PricingChange>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub feature_changes: Vec<FeatureChange>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub new_sections: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub removed_sections: Vec<String>,
}

impl ChangesSummary {
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Number of individual entries across all categories
    pub fn total(&self) -> usize {
        self.text_changes.len()
            + self.pricing_changes.len()
            + self.feature_changes.len()
            + self.new_sections.len()
            + self.removed_sections.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingChange {
    #[serde(default)]
    pub old_price: Option<String>,
    #[serde(default)]
    pub new_price: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureChangeKind {
    Added,
    Removed,
}

impl std::fmt::Display for FeatureChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FeatureChangeKind::Added => "added",
            FeatureChangeKind::Removed => "removed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureChange {
    #[serde(rename = "type")]
    pub kind: FeatureChangeKind,
    pub feature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Pricing,
    Content,
    Feature,
}

/// Notification raised when a scan finds a significant change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Sequence number within the page's alerts, assigned by the store
    #[serde(default)]
    pub id: u64,
    pub page_id: String,
    /// Snapshot that triggered the alert
    pub snapshot_id: u64,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_read: bool,
}

impl Alert {
    pub fn new(page_id: &str, snapshot_id: u64, kind: AlertKind, message: String) -> Self {
        Self {
            id: 0,
            page_id: page_id.to_string(),
            snapshot_id,
            kind,
            message,
            created_at: Utc::now(),
            is_read: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_summary_serializes_to_empty_object() {
        let summary = ChangesSummary::default();
        assert!(summary.is_empty());
        assert_eq!(serde_json::to_string(&summary).unwrap(), "{}");
    }

    #[test]
    fn test_summary_round_trip_keeps_wire_names() {
        let summary = ChangesSummary {
            text_changes: vec!["Removed 1 terms: basic".to_string()],
            feature_changes: vec![FeatureChange {
                kind: FeatureChangeKind::Added,
                feature: "SAML single sign-on".to_string(),
                description: None,
            }],
            ..ChangesSummary::default()
        };

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["feature_changes"][0]["type"], "added");
        assert!(json.get("pricing_changes").is_none());
        assert_eq!(summary.total(), 2);

        let back: ChangesSummary = serde_json::from_value(json).unwrap();
        assert_eq!(back, summary);
    }
}
