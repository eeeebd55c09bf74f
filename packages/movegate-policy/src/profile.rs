use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use movegate_config::{
	MAX_PROFILE_WEIGHT, PROFILE_BALANCED, PROFILE_EVIDENCE_FIRST, PROFILE_LATENCY_FIRST,
	ProfileWeightsOverride,
};

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyProfile {
	#[default]
	Balanced,
	EvidenceFirst,
	LatencyFirst,
}
impl PolicyProfile {
	pub const ALL: [Self; 3] = [Self::Balanced, Self::EvidenceFirst, Self::LatencyFirst];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Balanced => PROFILE_BALANCED,
			Self::EvidenceFirst => PROFILE_EVIDENCE_FIRST,
			Self::LatencyFirst => PROFILE_LATENCY_FIRST,
		}
	}

	pub fn parse(value: &str) -> Option<Self> {
		match value.trim().to_ascii_lowercase().as_str() {
			PROFILE_BALANCED => Some(Self::Balanced),
			PROFILE_EVIDENCE_FIRST => Some(Self::EvidenceFirst),
			PROFILE_LATENCY_FIRST => Some(Self::LatencyFirst),
			_ => None,
		}
	}

	/// Never fails: anything unrecognized is `balanced`.
	pub fn parse_or_balanced(value: &str) -> Self {
		Self::parse(value).unwrap_or(Self::Balanced)
	}
}

/// Weights over the five scoring criteria. All fields are finite and non-negative.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ProfileWeights {
	pub goal: f64,
	pub evidence_gain: f64,
	pub latency_cost: f64,
	pub risk: f64,
	pub budget_pressure: f64,
}
impl ProfileWeights {
	pub fn builtin(profile: PolicyProfile) -> Self {
		match profile {
			PolicyProfile::Balanced => Self {
				goal: 1.0,
				evidence_gain: 0.6,
				latency_cost: 0.4,
				risk: 0.7,
				budget_pressure: 0.4,
			},
			PolicyProfile::EvidenceFirst => Self {
				goal: 0.9,
				evidence_gain: 1.0,
				latency_cost: 0.2,
				risk: 0.7,
				budget_pressure: 0.25,
			},
			PolicyProfile::LatencyFirst => Self {
				goal: 1.0,
				evidence_gain: 0.35,
				latency_cost: 0.9,
				risk: 0.6,
				budget_pressure: 0.6,
			},
		}
	}

	/// Applies override fields that are finite and non-negative, capped at `MAX_PROFILE_WEIGHT`.
	pub fn with_override(self, override_: &ProfileWeightsOverride) -> Self {
		Self {
			goal: pick_weight(override_.goal, self.goal),
			evidence_gain: pick_weight(override_.evidence_gain, self.evidence_gain),
			latency_cost: pick_weight(override_.latency_cost, self.latency_cost),
			risk: pick_weight(override_.risk, self.risk),
			budget_pressure: pick_weight(override_.budget_pressure, self.budget_pressure),
		}
	}
}

/// Resolved weights for every profile.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ProfileWeightTable {
	weights: BTreeMap<PolicyProfile, ProfileWeights>,
}
impl ProfileWeightTable {
	pub fn builtin() -> Self {
		let weights = PolicyProfile::ALL
			.into_iter()
			.map(|profile| (profile, ProfileWeights::builtin(profile)))
			.collect();

		Self { weights }
	}

	/// Builds the table from built-ins plus overrides keyed by profile name. Unknown names are
	/// ignored.
	pub fn with_overrides(overrides: &BTreeMap<String, ProfileWeightsOverride>) -> Self {
		let mut table = Self::builtin();

		for (name, override_) in overrides {
			let Some(profile) = PolicyProfile::parse(name) else {
				tracing::warn!(profile = name.as_str(), "Unknown profile override ignored.");

				continue;
			};
			let base = table.get(profile);

			table.weights.insert(profile, base.with_override(override_));
		}

		table
	}

	pub fn get(&self, profile: PolicyProfile) -> ProfileWeights {
		self.weights.get(&profile).copied().unwrap_or_else(|| ProfileWeights::builtin(profile))
	}
}
impl Default for ProfileWeightTable {
	fn default() -> Self {
		Self::builtin()
	}
}

fn pick_weight(candidate: Option<f64>, fallback: f64) -> f64 {
	match candidate {
		Some(value) if value.is_finite() && value >= 0.0 => value.min(MAX_PROFILE_WEIGHT),
		_ => fallback,
	}
}
