mod env;
mod error;
mod types;

pub use env::{
	ENV_BRIDGE_WEIGHT, ENV_DUAL_DOMAIN_WEIGHT, ENV_EVIDENCE_WEIGHT, ENV_PROFILE_WEIGHTS,
	ENV_RELATION_BUILD_MAX, ENV_RETRIEVE_MORE_MAX, EnvOverrides, parse_profile_weights,
};
pub use error::{Error, Result};
pub use types::{
	Config, DEFAULT_BRIDGE_WEIGHT, DEFAULT_CLARIFY_THRESHOLD, DEFAULT_DUAL_DOMAIN_WEIGHT,
	DEFAULT_EVIDENCE_WEIGHT, DEFAULT_RELATION_BUILD_MAX, DEFAULT_RETRIEVE_MORE_MAX,
	PROFILE_BALANCED, PROFILE_EVIDENCE_FIRST, PROFILE_LATENCY_FIRST, PROFILE_NAMES, Policy,
	PolicyBias, ProfileWeightsOverride, Service,
};

use std::{fs, path::Path};

pub const MAX_BIAS_GAP_WEIGHT: f64 = 2.0;
pub const MAX_BIAS_CEILING: f64 = 0.8;
pub const MAX_PROFILE_WEIGHT: f64 = 10.0;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}

	validate_policy(&cfg.policy)
}

pub fn validate_policy(policy: &Policy) -> Result<()> {
	if !PROFILE_NAMES.contains(&policy.default_profile.as_str()) {
		return Err(Error::Validation {
			message:
				"policy.default_profile must be one of balanced, evidence_first, or latency_first."
					.to_string(),
		});
	}
	if !policy.clarify_threshold.is_finite() {
		return Err(Error::Validation {
			message: "policy.clarify_threshold must be a finite number.".to_string(),
		});
	}
	if !(0.0..=1.0).contains(&policy.clarify_threshold) {
		return Err(Error::Validation {
			message: "policy.clarify_threshold must be in the range 0.0-1.0.".to_string(),
		});
	}

	for (path, value) in [
		("policy.bias.bridge_weight", policy.bias.bridge_weight),
		("policy.bias.evidence_weight", policy.bias.evidence_weight),
		("policy.bias.dual_domain_weight", policy.bias.dual_domain_weight),
	] {
		if !value.is_finite() {
			return Err(Error::Validation { message: format!("{path} must be a finite number.") });
		}
		if !(0.0..=MAX_BIAS_GAP_WEIGHT).contains(&value) {
			return Err(Error::Validation {
				message: format!("{path} must be in the range 0.0-{MAX_BIAS_GAP_WEIGHT:.1}."),
			});
		}
	}
	for (path, value) in [
		("policy.bias.relation_build_max", policy.bias.relation_build_max),
		("policy.bias.retrieve_more_max", policy.bias.retrieve_more_max),
	] {
		if !value.is_finite() {
			return Err(Error::Validation { message: format!("{path} must be a finite number.") });
		}
		if !(0.0..=MAX_BIAS_CEILING).contains(&value) {
			return Err(Error::Validation {
				message: format!("{path} must be in the range 0.0-{MAX_BIAS_CEILING:.1}."),
			});
		}
	}

	for (profile, weights) in &policy.profiles {
		if !PROFILE_NAMES.contains(&profile.as_str()) {
			return Err(Error::Validation {
				message: format!("policy.profiles.{profile} is not a known profile."),
			});
		}

		for (field, value) in weights.fields() {
			let Some(value) = value else { continue };

			if !value.is_finite() {
				return Err(Error::Validation {
					message: format!("policy.profiles.{profile}.{field} must be a finite number."),
				});
			}
			if value < 0.0 {
				return Err(Error::Validation {
					message: format!("policy.profiles.{profile}.{field} must be zero or greater."),
				});
			}
			if value > MAX_PROFILE_WEIGHT {
				return Err(Error::Validation {
					message: format!(
						"policy.profiles.{profile}.{field} must be at most {MAX_PROFILE_WEIGHT:.1}."
					),
				});
			}
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.policy.default_profile = cfg.policy.default_profile.trim().to_ascii_lowercase();
	cfg.policy.profiles.retain(|_, weights| !weights.is_empty());
}
