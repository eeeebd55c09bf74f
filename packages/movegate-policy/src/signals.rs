use serde::{Deserialize, Serialize};

/// Per-turn scorer input. Scalars are expected in `[0, 1]` and are clamped on use.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct SignalBundle {
	pub groundedness: f64,
	pub uncertainty: f64,
	pub safety: f64,
	pub coverage: f64,
	#[serde(alias = "evidenceGain")]
	pub evidence_gain: f64,
	#[serde(alias = "latencyCost")]
	pub latency_cost: f64,
	pub risk: f64,
	#[serde(alias = "budgetPressure")]
	pub budget_pressure: f64,
	#[serde(alias = "relationIntentActive", skip_serializing_if = "Option::is_none")]
	pub relation_intent_active: Option<bool>,
	#[serde(alias = "bridgeGap", skip_serializing_if = "Option::is_none")]
	pub bridge_gap: Option<f64>,
	#[serde(alias = "evidenceGap", skip_serializing_if = "Option::is_none")]
	pub evidence_gap: Option<f64>,
	#[serde(alias = "dualDomainGap", skip_serializing_if = "Option::is_none")]
	pub dual_domain_gap: Option<f64>,
	/// Policy profile name. Unknown names fall back to `balanced`.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub profile: Option<String>,
	#[serde(alias = "clarifyThreshold", skip_serializing_if = "Option::is_none")]
	pub clarify_threshold: Option<f64>,
}
impl SignalBundle {
	pub fn relation_intent_active(&self) -> bool {
		self.relation_intent_active.unwrap_or(false)
	}

	pub fn resolve(&self) -> ResolvedSignals {
		ResolvedSignals {
			groundedness: clamp_unit(self.groundedness),
			uncertainty: clamp_unit(self.uncertainty),
			safety: clamp_unit(self.safety),
			coverage: clamp_unit(self.coverage),
			evidence_gain: clamp_unit(self.evidence_gain),
			latency_cost: clamp_unit(self.latency_cost),
			risk: clamp_unit(self.risk),
			budget_pressure: clamp_unit(self.budget_pressure),
		}
	}
}

/// The eight core signals after clamping.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ResolvedSignals {
	pub groundedness: f64,
	pub uncertainty: f64,
	pub safety: f64,
	pub coverage: f64,
	pub evidence_gain: f64,
	pub latency_cost: f64,
	pub risk: f64,
	pub budget_pressure: f64,
}

/// Clamps into `[0, 1]`; non-finite input maps to `0`.
pub fn clamp_unit(value: f64) -> f64 {
	if !value.is_finite() {
		return 0.0;
	}

	value.clamp(0.0, 1.0)
}

pub fn clamp_optional_unit(value: Option<f64>) -> f64 {
	value.map(clamp_unit).unwrap_or(0.0)
}
