use std::path::PathBuf;

use movegate_eval::{evaluate, load_dataset};
use movegate_policy::{DualDomainDelta, Move, MovePolicy};

fn fixture(name: &str) -> PathBuf {
	PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}

#[test]
fn dataset_report_covers_every_component() {
	let config_path = fixture("movegate.toml");
	let config = movegate_config::load(&config_path).expect("Failed to load config.");
	let dataset = load_dataset(&fixture("turns.json")).expect("Failed to load dataset.");
	let policy = MovePolicy::new(&config.policy);
	let output = evaluate(&config_path, &policy, &dataset);

	assert_eq!(output.dataset.name, "routing-smoke");
	assert_eq!(output.summary.turn_count, 3);
	assert_eq!(output.summary.expected_count, 2);
	assert_eq!(output.summary.matched_count, 2);
	assert_eq!(output.settings.policy_id, MovePolicy::default().policy_id());

	let grounded = &output.turns[0];
	let quality = grounded.quality.expect("Missing quality for answered turn.");

	assert_eq!(grounded.selection.selected_move, Move::DirectAnswer);
	assert_eq!(quality.claim_count, 2);
	assert_eq!(quality.citation_link_rate, 1.0);
	assert_eq!(grounded.event_fields.retrieval_route, "hybrid");
	assert_eq!(grounded.event_fields.gate_outcomes.len(), 2);
	assert!(grounded.second_pass.is_none());

	let unsafe_turn = &output.turns[1];
	let decision = unsafe_turn.second_pass.expect("Missing second pass decision.");

	assert_eq!(unsafe_turn.selection.selected_move, Move::FailClosed);
	assert!(!decision.should_attempt);

	let relation = &output.turns[2];
	let decision = relation.second_pass.expect("Missing second pass decision.");
	let delta = relation.second_pass_delta.expect("Missing second pass delta.");

	assert_eq!(relation.selection.selected_move, Move::RelationBuild);
	assert!(decision.should_attempt);
	assert_eq!(delta.bridge_delta, 2);
	assert_eq!(delta.evidence_delta, 0);
	assert_eq!(delta.dual_domain_delta, DualDomainDelta::Gained);
	assert_eq!(relation.bridge_candidates.len(), 1);
	assert_eq!(relation.bridge_candidates[0].node_id, "energy");
	assert_eq!(relation.matched_expected, None);
}

#[test]
fn report_serializes_with_wire_names() {
	let config_path = fixture("movegate.toml");
	let dataset = load_dataset(&fixture("turns.json")).expect("Failed to load dataset.");
	let output = evaluate(&config_path, &MovePolicy::default(), &dataset);
	let json = serde_json::to_value(&output).expect("Failed to serialize report.");

	assert_eq!(json["turns"][0]["selection"]["selected_move"], "direct_answer");
	assert_eq!(json["turns"][0]["selection"]["ranked_moves"][0]["move"], "direct_answer");
	assert_eq!(json["turns"][1]["selection"]["stop_reason"], "risk_or_budget_guard");
	assert_eq!(json["turns"][1]["second_pass"]["skipped_reason"], "move_not_eligible");
	assert_eq!(json["summary"]["selected_moves"]["relation_build"], 1);
	assert_eq!(json["summary"]["selected_moves"]["clarify"], 0);
}
