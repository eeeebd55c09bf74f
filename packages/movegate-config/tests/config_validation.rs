use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use movegate_config::{
	Config, ENV_PROFILE_WEIGHTS, ENV_RETRIEVE_MORE_MAX, EnvOverrides, Error, PROFILE_BALANCED,
};

const SAMPLE_CONFIG_TEMPLATE_TOML: &str = include_str!("fixtures/sample_config.template.toml");

fn sample_value() -> Value {
	toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.")
}

fn sample_toml_with_policy(key: &str, value: Value) -> String {
	let mut root = sample_value();
	let policy = root
		.as_table_mut()
		.and_then(|table| table.get_mut("policy"))
		.and_then(Value::as_table_mut)
		.expect("Template config must include [policy].");

	policy.insert(key.to_string(), value);

	toml::to_string(&root).expect("Failed to render template config.")
}

fn sample_toml_with_bias(key: &str, value: f64) -> String {
	let mut root = sample_value();
	let bias = root
		.as_table_mut()
		.and_then(|table| table.get_mut("policy"))
		.and_then(Value::as_table_mut)
		.and_then(|policy| policy.get_mut("bias"))
		.and_then(Value::as_table_mut)
		.expect("Template config must include [policy.bias].");

	bias.insert(key.to_string(), Value::Float(value));

	toml::to_string(&root).expect("Failed to render template config.")
}

fn write_temp_config(payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("movegate_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn load_payload(payload: String) -> movegate_config::Result<Config> {
	let path = write_temp_config(payload);
	let result = movegate_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	result
}

fn expect_validation_message(payload: String, expected: &str) {
	let err = load_payload(payload).expect_err("Expected validation error.");
	let message = err.to_string();

	assert!(message.contains(expected), "Unexpected error message: {message}");
}

#[test]
fn sample_config_loads() {
	let cfg = load_payload(SAMPLE_CONFIG_TEMPLATE_TOML.to_string())
		.expect("Sample config should load.");

	assert_eq!(cfg.service.log_level, "info");
	assert_eq!(cfg.policy.default_profile, PROFILE_BALANCED);
	assert_eq!(cfg.policy.clarify_threshold, 0.72);
	assert_eq!(
		cfg.policy.profiles.get("evidence_first").and_then(|weights| weights.evidence_gain),
		Some(1.1)
	);
}

#[test]
fn policy_section_is_optional() {
	let cfg = load_payload("[service]\nlog_level = \"debug\"\n".to_string())
		.expect("Config without [policy] should load.");

	assert_eq!(cfg.policy.default_profile, PROFILE_BALANCED);
	assert_eq!(cfg.policy.bias.relation_build_max, 0.45);
	assert_eq!(cfg.policy.bias.retrieve_more_max, 0.35);
	assert!(cfg.policy.profiles.is_empty());
}

#[test]
fn default_profile_is_normalized_before_validation() {
	let cfg = load_payload(sample_toml_with_policy(
		"default_profile",
		Value::String(" Latency_First ".to_string()),
	))
	.expect("Normalized profile name should load.");

	assert_eq!(cfg.policy.default_profile, "latency_first");
}

#[test]
fn unknown_default_profile_is_rejected() {
	expect_validation_message(
		sample_toml_with_policy("default_profile", Value::String("aggressive".to_string())),
		"policy.default_profile must be one of balanced, evidence_first, or latency_first.",
	);
}

#[test]
fn clarify_threshold_must_be_in_unit_range() {
	expect_validation_message(
		sample_toml_with_policy("clarify_threshold", Value::Float(1.5)),
		"policy.clarify_threshold must be in the range 0.0-1.0.",
	);
}

#[test]
fn bias_ceiling_is_capped() {
	expect_validation_message(
		sample_toml_with_bias("relation_build_max", 0.9),
		"policy.bias.relation_build_max must be in the range 0.0-0.8.",
	);
}

#[test]
fn bias_gap_weight_is_capped() {
	expect_validation_message(
		sample_toml_with_bias("bridge_weight", 2.5),
		"policy.bias.bridge_weight must be in the range 0.0-2.0.",
	);
}

#[test]
fn negative_profile_weight_is_rejected() {
	let payload =
		format!("{SAMPLE_CONFIG_TEMPLATE_TOML}\n[policy.profiles.balanced]\nrisk = -0.1\n");

	expect_validation_message(payload, "policy.profiles.balanced.risk must be zero or greater.");
}

#[test]
fn oversized_profile_weight_is_rejected() {
	let payload =
		format!("{SAMPLE_CONFIG_TEMPLATE_TOML}\n[policy.profiles.balanced]\ngoal = 1e308\n");

	expect_validation_message(payload, "policy.profiles.balanced.goal must be at most 10.0.");
}

#[test]
fn unknown_profile_override_is_rejected() {
	let payload =
		format!("{SAMPLE_CONFIG_TEMPLATE_TOML}\n[policy.profiles.aggressive]\ngoal = 1.0\n");

	expect_validation_message(payload, "policy.profiles.aggressive is not a known profile.");
}

#[test]
fn non_numeric_profile_weight_fails_to_parse() {
	let payload =
		format!("{SAMPLE_CONFIG_TEMPLATE_TOML}\n[policy.profiles.balanced]\ngoal = \"high\"\n");
	let err = load_payload(payload).expect_err("Expected parse error.");

	assert!(matches!(err, Error::ParseConfig { .. }), "Unexpected error: {err:?}");
}

#[test]
fn missing_file_reports_read_error() {
	let err = movegate_config::load(&env::temp_dir().join("movegate_config_missing.toml"))
		.expect_err("Expected read error.");

	assert!(matches!(err, Error::ReadConfig { .. }), "Unexpected error: {err:?}");
}

#[test]
fn env_overrides_merge_field_by_field() {
	let mut cfg = load_payload(SAMPLE_CONFIG_TEMPLATE_TOML.to_string())
		.expect("Sample config should load.");
	let overrides = EnvOverrides::from_lookup(|key| match key {
		ENV_PROFILE_WEIGHTS => {
			Some(r#"{"evidence_first":{"goal":0.8,"evidenceGain":"oops"}}"#.to_string())
		},
		ENV_RETRIEVE_MORE_MAX => Some("0.5".to_string()),
		_ => None,
	});

	cfg.policy.apply_env_overrides(&overrides);

	let evidence_first =
		cfg.policy.profiles.get("evidence_first").expect("Expected evidence_first override.");

	assert_eq!(evidence_first.goal, Some(0.8));
	assert_eq!(evidence_first.evidence_gain, Some(1.1));
	assert_eq!(cfg.policy.bias.retrieve_more_max, 0.5);
	assert_eq!(cfg.policy.bias.relation_build_max, 0.45);
}
