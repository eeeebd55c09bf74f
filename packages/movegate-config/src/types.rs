use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const PROFILE_BALANCED: &str = "balanced";
pub const PROFILE_EVIDENCE_FIRST: &str = "evidence_first";
pub const PROFILE_LATENCY_FIRST: &str = "latency_first";
pub const PROFILE_NAMES: [&str; 3] =
	[PROFILE_BALANCED, PROFILE_EVIDENCE_FIRST, PROFILE_LATENCY_FIRST];

pub const DEFAULT_CLARIFY_THRESHOLD: f64 = 0.72;
pub const DEFAULT_BRIDGE_WEIGHT: f64 = 0.25;
pub const DEFAULT_EVIDENCE_WEIGHT: f64 = 0.2;
pub const DEFAULT_DUAL_DOMAIN_WEIGHT: f64 = 0.15;
pub const DEFAULT_RELATION_BUILD_MAX: f64 = 0.45;
pub const DEFAULT_RETRIEVE_MORE_MAX: f64 = 0.35;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	#[serde(default)]
	pub policy: Policy,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Policy {
	/// Profile used when a signal bundle does not name one.
	#[serde(default = "default_profile")]
	pub default_profile: String,
	/// Risk level at which fail-closed gains its guard bonus, and uncertainty level at which
	/// clarify does.
	#[serde(default = "default_clarify_threshold")]
	pub clarify_threshold: f64,
	#[serde(default)]
	pub bias: PolicyBias,
	/// Partial weight overrides keyed by profile name.
	#[serde(default)]
	pub profiles: BTreeMap<String, ProfileWeightsOverride>,
}
impl Default for Policy {
	fn default() -> Self {
		Self {
			default_profile: default_profile(),
			clarify_threshold: default_clarify_threshold(),
			bias: PolicyBias::default(),
			profiles: BTreeMap::new(),
		}
	}
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PolicyBias {
	#[serde(default = "default_bridge_weight")]
	pub bridge_weight: f64,
	#[serde(default = "default_evidence_weight")]
	pub evidence_weight: f64,
	#[serde(default = "default_dual_domain_weight")]
	pub dual_domain_weight: f64,
	#[serde(default = "default_relation_build_max")]
	pub relation_build_max: f64,
	#[serde(default = "default_retrieve_more_max")]
	pub retrieve_more_max: f64,
}
impl Default for PolicyBias {
	fn default() -> Self {
		Self {
			bridge_weight: DEFAULT_BRIDGE_WEIGHT,
			evidence_weight: DEFAULT_EVIDENCE_WEIGHT,
			dual_domain_weight: DEFAULT_DUAL_DOMAIN_WEIGHT,
			relation_build_max: DEFAULT_RELATION_BUILD_MAX,
			retrieve_more_max: DEFAULT_RETRIEVE_MORE_MAX,
		}
	}
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ProfileWeightsOverride {
	pub goal: Option<f64>,
	pub evidence_gain: Option<f64>,
	pub latency_cost: Option<f64>,
	pub risk: Option<f64>,
	pub budget_pressure: Option<f64>,
}
impl ProfileWeightsOverride {
	pub fn is_empty(&self) -> bool {
		self.fields().iter().all(|(_, value)| value.is_none())
	}

	pub fn fields(&self) -> [(&'static str, Option<f64>); 5] {
		[
			("goal", self.goal),
			("evidence_gain", self.evidence_gain),
			("latency_cost", self.latency_cost),
			("risk", self.risk),
			("budget_pressure", self.budget_pressure),
		]
	}

	/// Later values win field by field.
	pub fn merge(&mut self, other: &Self) {
		self.goal = other.goal.or(self.goal);
		self.evidence_gain = other.evidence_gain.or(self.evidence_gain);
		self.latency_cost = other.latency_cost.or(self.latency_cost);
		self.risk = other.risk.or(self.risk);
		self.budget_pressure = other.budget_pressure.or(self.budget_pressure);
	}
}

fn default_profile() -> String {
	PROFILE_BALANCED.to_string()
}

fn default_clarify_threshold() -> f64 {
	DEFAULT_CLARIFY_THRESHOLD
}

fn default_bridge_weight() -> f64 {
	DEFAULT_BRIDGE_WEIGHT
}

fn default_evidence_weight() -> f64 {
	DEFAULT_EVIDENCE_WEIGHT
}

fn default_dual_domain_weight() -> f64 {
	DEFAULT_DUAL_DOMAIN_WEIGHT
}

fn default_relation_build_max() -> f64 {
	DEFAULT_RELATION_BUILD_MAX
}

fn default_retrieve_more_max() -> f64 {
	DEFAULT_RETRIEVE_MORE_MAX
}
