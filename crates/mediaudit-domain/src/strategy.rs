//! Media-plan line items

use serde::{Deserialize, Serialize};

/// Pricing model of a strategy line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BidModel {
    /// Cost per thousand impressions
    #[serde(rename = "CPM")]
    Cpm,
    /// Cost per click
    #[serde(rename = "CPC")]
    Cpc,
    /// Cost per view
    #[serde(rename = "CPV")]
    Cpv,
}

impl Default for BidModel {
    fn default() -> Self {
        BidModel::Cpm
    }
}

/// Technical capability flags of a strategy line.
///
/// Absent indications in the source documents default to `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechFeatures {
    /// Uses first-party audience data
    pub has_first_party: bool,
    /// Measures physical store visits
    pub has_footfall: bool,
    /// Rich-media creative format
    pub is_rich_media: bool,
    /// Cross-device identity matching
    pub is_cross_device: bool,
}

/// One line item of a media plan.
///
/// Two independent lists of these exist on the record, one extracted from
/// the commercial proposal and one from the technical plan; they are never
/// merged. Ids are unique within their list only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyItem {
    /// Line id within its list
    pub id: u32,
    /// Delivery platform (e.g. "DV360", "Meta")
    pub platform: String,
    /// Tactic description (e.g. "Geo prospecting", "CRM retargeting")
    pub tactic: String,
    /// Creative format
    pub format: String,
    /// Pricing model
    pub bid_model: BidModel,
    /// Unit price under the pricing model
    pub bid_value: f64,
    /// Total cost of the line
    pub total_cost: f64,
    /// Contracted impression goal
    pub impression_goal: f64,
    /// Technical capability flags
    pub tech_features: TechFeatures,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bid_model_wire_names() {
        assert_eq!(serde_json::to_string(&BidModel::Cpm).unwrap(), "\"CPM\"");
        assert_eq!(serde_json::to_string(&BidModel::Cpv).unwrap(), "\"CPV\"");
        let parsed: BidModel = serde_json::from_str("\"CPC\"").unwrap();
        assert_eq!(parsed, BidModel::Cpc);
    }

    #[test]
    fn test_strategy_item_round_trip() {
        let item = StrategyItem {
            id: 1,
            platform: "DV360".to_string(),
            tactic: "Geo prospecting".to_string(),
            format: "Banner 300x250".to_string(),
            bid_model: BidModel::Cpm,
            bid_value: 12.5,
            total_cost: 25000.0,
            impression_goal: 2_000_000.0,
            tech_features: TechFeatures {
                has_footfall: true,
                ..TechFeatures::default()
            },
        };
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"bidModel\":\"CPM\""));
        assert!(json.contains("\"hasFootfall\":true"));
        let back: StrategyItem = serde_json::from_str(&json).unwrap();
        assert_eq!(item, back);
    }
}
