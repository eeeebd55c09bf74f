use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::{
	MAX_PROFILE_WEIGHT,
	types::{PROFILE_NAMES, Policy, ProfileWeightsOverride},
};

pub const ENV_PROFILE_WEIGHTS: &str = "MOVEGATE_PROFILE_WEIGHTS";
pub const ENV_BRIDGE_WEIGHT: &str = "MOVEGATE_RELATION_BIAS_BRIDGE_WEIGHT";
pub const ENV_EVIDENCE_WEIGHT: &str = "MOVEGATE_RELATION_BIAS_EVIDENCE_WEIGHT";
pub const ENV_DUAL_DOMAIN_WEIGHT: &str = "MOVEGATE_RELATION_BIAS_DUAL_DOMAIN_WEIGHT";
pub const ENV_RELATION_BUILD_MAX: &str = "MOVEGATE_RELATION_BUILD_BIAS_MAX";
pub const ENV_RETRIEVE_MORE_MAX: &str = "MOVEGATE_RETRIEVE_MORE_BIAS_MAX";

/// Process environment overrides for the move policy.
///
/// Parsing never fails. Fields that are not finite numbers (or, for weights, are negative) are
/// dropped with a warning and the value from the config file stays in effect.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnvOverrides {
	pub profiles: BTreeMap<String, ProfileWeightsOverride>,
	pub bridge_weight: Option<f64>,
	pub evidence_weight: Option<f64>,
	pub dual_domain_weight: Option<f64>,
	pub relation_build_max: Option<f64>,
	pub retrieve_more_max: Option<f64>,
}
impl EnvOverrides {
	pub fn from_env() -> Self {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	pub fn from_lookup<F>(lookup: F) -> Self
	where
		F: Fn(&str) -> Option<String>,
	{
		let profiles = lookup(ENV_PROFILE_WEIGHTS)
			.map(|raw| parse_profile_weights(raw.as_str()))
			.unwrap_or_default();

		Self {
			profiles,
			bridge_weight: parse_knob(ENV_BRIDGE_WEIGHT, lookup(ENV_BRIDGE_WEIGHT)),
			evidence_weight: parse_knob(ENV_EVIDENCE_WEIGHT, lookup(ENV_EVIDENCE_WEIGHT)),
			dual_domain_weight: parse_knob(ENV_DUAL_DOMAIN_WEIGHT, lookup(ENV_DUAL_DOMAIN_WEIGHT)),
			relation_build_max: parse_knob(ENV_RELATION_BUILD_MAX, lookup(ENV_RELATION_BUILD_MAX)),
			retrieve_more_max: parse_knob(ENV_RETRIEVE_MORE_MAX, lookup(ENV_RETRIEVE_MORE_MAX)),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.profiles.is_empty()
			&& self.bridge_weight.is_none()
			&& self.evidence_weight.is_none()
			&& self.dual_domain_weight.is_none()
			&& self.relation_build_max.is_none()
			&& self.retrieve_more_max.is_none()
	}
}

impl Policy {
	pub fn apply_env_overrides(&mut self, overrides: &EnvOverrides) {
		for (profile, weights) in &overrides.profiles {
			self.profiles.entry(profile.clone()).or_default().merge(weights);
		}

		if let Some(value) = overrides.bridge_weight {
			self.bias.bridge_weight = value;
		}
		if let Some(value) = overrides.evidence_weight {
			self.bias.evidence_weight = value;
		}
		if let Some(value) = overrides.dual_domain_weight {
			self.bias.dual_domain_weight = value;
		}
		if let Some(value) = overrides.relation_build_max {
			self.bias.relation_build_max = value;
		}
		if let Some(value) = overrides.retrieve_more_max {
			self.bias.retrieve_more_max = value;
		}
	}
}

/// Parses `{ "<profile>": { "<field>": <number> } }`, keeping only valid fields.
pub fn parse_profile_weights(raw: &str) -> BTreeMap<String, ProfileWeightsOverride> {
	let mut out = BTreeMap::new();

	if raw.trim().is_empty() {
		return out;
	}

	let root = match serde_json::from_str::<Value>(raw) {
		Ok(Value::Object(root)) => root,
		Ok(_) => {
			tracing::warn!(env = ENV_PROFILE_WEIGHTS, "Profile weight override is not an object.");

			return out;
		},
		Err(err) => {
			tracing::warn!(
				env = ENV_PROFILE_WEIGHTS,
				error = %err,
				"Profile weight override is not valid JSON."
			);

			return out;
		},
	};

	for (profile, fields) in root {
		if !PROFILE_NAMES.contains(&profile.as_str()) {
			tracing::warn!(
				env = ENV_PROFILE_WEIGHTS,
				profile = profile.as_str(),
				"Unknown profile dropped."
			);

			continue;
		}

		let Value::Object(fields) = fields else {
			tracing::warn!(
				env = ENV_PROFILE_WEIGHTS,
				profile = profile.as_str(),
				"Profile entry is not an object."
			);

			continue;
		};
		let weights = parse_weight_fields(profile.as_str(), &fields);

		if !weights.is_empty() {
			out.insert(profile, weights);
		}
	}

	out
}

fn parse_weight_fields(profile: &str, fields: &Map<String, Value>) -> ProfileWeightsOverride {
	let mut weights = ProfileWeightsOverride::default();

	for (field, value) in fields {
		let Some(slot) = weight_slot(&mut weights, field.as_str()) else {
			tracing::warn!(
				env = ENV_PROFILE_WEIGHTS,
				profile,
				field = field.as_str(),
				"Unknown weight field dropped."
			);

			continue;
		};

		match value.as_f64() {
			Some(weight) if weight.is_finite() && weight > MAX_PROFILE_WEIGHT => {
				tracing::warn!(
					env = ENV_PROFILE_WEIGHTS,
					profile,
					field = field.as_str(),
					value = weight,
					"Weight above maximum capped."
				);

				*slot = Some(MAX_PROFILE_WEIGHT);
			},
			Some(weight) if weight.is_finite() && weight >= 0.0 => *slot = Some(weight),
			_ => {
				tracing::warn!(
					env = ENV_PROFILE_WEIGHTS,
					profile,
					field = field.as_str(),
					value = %value,
					"Invalid weight dropped."
				);
			},
		}
	}

	weights
}

fn weight_slot<'a>(
	weights: &'a mut ProfileWeightsOverride,
	field: &str,
) -> Option<&'a mut Option<f64>> {
	match field {
		"goal" => Some(&mut weights.goal),
		"evidence_gain" | "evidenceGain" => Some(&mut weights.evidence_gain),
		"latency_cost" | "latencyCost" => Some(&mut weights.latency_cost),
		"risk" => Some(&mut weights.risk),
		"budget_pressure" | "budgetPressure" => Some(&mut weights.budget_pressure),
		_ => None,
	}
}

fn parse_knob(key: &str, raw: Option<String>) -> Option<f64> {
	let raw = raw?;
	let trimmed = raw.trim();

	if trimmed.is_empty() {
		return None;
	}

	match trimmed.parse::<f64>() {
		Ok(value) if value.is_finite() => Some(value),
		_ => {
			tracing::warn!(env = key, value = trimmed, "Invalid numeric override dropped.");

			None
		},
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use crate::{
		MAX_PROFILE_WEIGHT,
		env::{
			ENV_BRIDGE_WEIGHT, ENV_PROFILE_WEIGHTS, ENV_RELATION_BUILD_MAX, EnvOverrides,
			parse_profile_weights,
		},
	};

	fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let vars: HashMap<String, String> =
			pairs.iter().map(|(key, value)| (key.to_string(), value.to_string())).collect();

		move |key| vars.get(key).cloned()
	}

	#[test]
	fn drops_non_numeric_and_negative_fields() {
		let parsed = parse_profile_weights(
			r#"{"balanced":{"goal":"high","risk":-1,"latencyCost":0.5,"extra":1}}"#,
		);
		let balanced = parsed.get("balanced").expect("Expected balanced override.");

		assert_eq!(balanced.goal, None);
		assert_eq!(balanced.risk, None);
		assert_eq!(balanced.latency_cost, Some(0.5));
	}

	#[test]
	fn oversized_weights_are_capped() {
		let parsed = parse_profile_weights(r#"{"balanced":{"goal":1e308,"risk":3.5}}"#);
		let balanced = parsed.get("balanced").expect("Expected balanced override.");

		assert_eq!(balanced.goal, Some(MAX_PROFILE_WEIGHT));
		assert_eq!(balanced.risk, Some(3.5));
	}

	#[test]
	fn unparseable_json_drops_whole_block() {
		assert!(parse_profile_weights("{not json").is_empty());
		assert!(parse_profile_weights("[1, 2]").is_empty());
	}

	#[test]
	fn unknown_profiles_are_ignored() {
		let parsed = parse_profile_weights(r#"{"aggressive":{"goal":2.0}}"#);

		assert!(parsed.is_empty());
	}

	#[test]
	fn knobs_require_finite_numbers() {
		let overrides = EnvOverrides::from_lookup(lookup_from(&[
			(ENV_BRIDGE_WEIGHT, "NaN"),
			(ENV_RELATION_BUILD_MAX, " 0.6 "),
			(ENV_PROFILE_WEIGHTS, ""),
		]));

		assert_eq!(overrides.bridge_weight, None);
		assert_eq!(overrides.relation_build_max, Some(0.6));
		assert!(overrides.profiles.is_empty());
	}

	#[test]
	fn empty_environment_yields_no_overrides() {
		assert!(EnvOverrides::from_lookup(|_| None).is_empty());
	}
}
