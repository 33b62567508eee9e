//! Property-based tests for Oracle impact scores

use proptest::prelude::*;

use crate::core::analysis::{HouseRuleAnalysis, IMPACT_AXES};

proptest! {
    #[test]
    fn displayed_scores_stay_in_range(raw in prop::collection::vec(prop::num::f64::ANY, 5)) {
        let mut analysis: HouseRuleAnalysis = serde_json::from_str("{}").unwrap();
        for (axis, score) in IMPACT_AXES.iter().zip(&raw) {
            analysis.impact_scores.insert(axis.to_string(), *score);
        }

        for (_, score) in analysis.axis_scores() {
            prop_assert!((0.0..=10.0).contains(&score));
        }
    }
}
