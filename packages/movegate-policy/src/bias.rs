use serde::Serialize;

use movegate_config::{
	DEFAULT_BRIDGE_WEIGHT, DEFAULT_DUAL_DOMAIN_WEIGHT, DEFAULT_EVIDENCE_WEIGHT,
	DEFAULT_RELATION_BUILD_MAX, DEFAULT_RETRIEVE_MORE_MAX, MAX_BIAS_CEILING, MAX_BIAS_GAP_WEIGHT,
	PolicyBias,
};

use crate::signals::clamp_optional_unit;

/// Share of the bridge gap that also pushes toward retrieving more evidence.
const RETRIEVE_MORE_BRIDGE_SHARE: f64 = 0.2;

/// Resolved bias knobs. Gap weights are in `[0, 2]`, ceilings in `[0, 0.8]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DynamicBiasConfig {
	pub bridge_weight: f64,
	pub evidence_weight: f64,
	pub dual_domain_weight: f64,
	pub relation_build_max: f64,
	pub retrieve_more_max: f64,
}
impl DynamicBiasConfig {
	pub fn from_policy(bias: &PolicyBias) -> Self {
		Self {
			bridge_weight: bound(bias.bridge_weight, DEFAULT_BRIDGE_WEIGHT, MAX_BIAS_GAP_WEIGHT),
			evidence_weight: bound(
				bias.evidence_weight,
				DEFAULT_EVIDENCE_WEIGHT,
				MAX_BIAS_GAP_WEIGHT,
			),
			dual_domain_weight: bound(
				bias.dual_domain_weight,
				DEFAULT_DUAL_DOMAIN_WEIGHT,
				MAX_BIAS_GAP_WEIGHT,
			),
			relation_build_max: bound(
				bias.relation_build_max,
				DEFAULT_RELATION_BUILD_MAX,
				MAX_BIAS_CEILING,
			),
			retrieve_more_max: bound(
				bias.retrieve_more_max,
				DEFAULT_RETRIEVE_MORE_MAX,
				MAX_BIAS_CEILING,
			),
		}
	}
}
impl Default for DynamicBiasConfig {
	fn default() -> Self {
		Self::from_policy(&PolicyBias::default())
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct DynamicBiases {
	pub relation_build_bias: f64,
	pub retrieve_more_bias: f64,
	pub bridge_gap: f64,
	pub evidence_gap: f64,
	pub dual_domain_gap: f64,
}

/// Converts relation gaps into additive move biases.
///
/// With relation intent inactive both biases are zero and the clamped gaps are only reported.
pub fn compute_dynamic_biases(
	cfg: &DynamicBiasConfig,
	relation_intent_active: bool,
	bridge_gap: Option<f64>,
	evidence_gap: Option<f64>,
	dual_domain_gap: Option<f64>,
) -> DynamicBiases {
	let bridge_gap = clamp_optional_unit(bridge_gap);
	let evidence_gap = clamp_optional_unit(evidence_gap);
	let dual_domain_gap = clamp_optional_unit(dual_domain_gap);

	if !relation_intent_active {
		return DynamicBiases {
			relation_build_bias: 0.0,
			retrieve_more_bias: 0.0,
			bridge_gap,
			evidence_gap,
			dual_domain_gap,
		};
	}

	let relation_build_raw = cfg.bridge_weight * bridge_gap
		+ cfg.evidence_weight * evidence_gap
		+ cfg.dual_domain_weight * dual_domain_gap;
	let retrieve_more_raw = cfg.evidence_weight * evidence_gap
		+ RETRIEVE_MORE_BRIDGE_SHARE * cfg.bridge_weight * bridge_gap;

	DynamicBiases {
		relation_build_bias: relation_build_raw.clamp(0.0, cfg.relation_build_max),
		retrieve_more_bias: retrieve_more_raw.clamp(0.0, cfg.retrieve_more_max),
		bridge_gap,
		evidence_gap,
		dual_domain_gap,
	}
}

fn bound(value: f64, fallback: f64, max: f64) -> f64 {
	if !value.is_finite() {
		return fallback.clamp(0.0, max);
	}

	value.clamp(0.0, max)
}

#[cfg(test)]
mod tests {
	use movegate_config::PolicyBias;

	use crate::bias::{DynamicBiasConfig, compute_dynamic_biases};

	#[test]
	fn inactive_intent_zeroes_biases_but_reports_gaps() {
		let cfg = DynamicBiasConfig::default();
		let biases = compute_dynamic_biases(&cfg, false, Some(1.0), Some(2.0), Some(-1.0));

		assert_eq!(biases.relation_build_bias, 0.0);
		assert_eq!(biases.retrieve_more_bias, 0.0);
		assert_eq!(biases.bridge_gap, 1.0);
		assert_eq!(biases.evidence_gap, 1.0);
		assert_eq!(biases.dual_domain_gap, 0.0);
	}

	#[test]
	fn full_gaps_saturate_at_default_ceilings() {
		let cfg = DynamicBiasConfig::default();
		let biases = compute_dynamic_biases(&cfg, true, Some(1.0), Some(1.0), Some(1.0));

		// 0.25 + 0.2 + 0.15 exceeds the 0.45 ceiling.
		assert_eq!(biases.relation_build_bias, 0.45);
		assert!((biases.retrieve_more_bias - 0.25).abs() < 1e-12);
	}

	#[test]
	fn knobs_are_clamped_and_non_finite_knobs_use_defaults() {
		let cfg = DynamicBiasConfig::from_policy(&PolicyBias {
			bridge_weight: 9.0,
			evidence_weight: f64::NAN,
			dual_domain_weight: -1.0,
			relation_build_max: 3.0,
			retrieve_more_max: f64::INFINITY,
		});

		assert_eq!(cfg.bridge_weight, 2.0);
		assert_eq!(cfg.evidence_weight, 0.2);
		assert_eq!(cfg.dual_domain_weight, 0.0);
		assert_eq!(cfg.relation_build_max, 0.8);
		assert_eq!(cfg.retrieve_more_max, 0.35);
	}
}
