use std::{
	collections::BTreeMap,
	fs,
	path::{Path, PathBuf},
};

use clap::Parser;
use color_eyre::eyre;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use movegate_config::EnvOverrides;
use movegate_policy::{
	BridgeCandidateArgs, BridgeTraversalCandidate, EventStableFields, EventStableFieldsArgs,
	GraphPack, Move, MovePolicy, MoveSelection, RelationDeficits, RelationEvidenceSnapshot,
	RelationSecondPassDelta, SecondPassDecision, SemanticQuality, SemanticQualityInput,
	SignalBundle,
};

#[derive(Debug, Parser)]
#[command(
	version = movegate_cli::VERSION,
	rename_all = "kebab",
	styles = movegate_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[arg(long, short = 'd', value_name = "FILE")]
	pub dataset: PathBuf,
}

/// A recorded set of turns to replay through the policy.
#[derive(Debug, Deserialize)]
pub struct EvalDataset {
	pub name: Option<String>,
	pub turns: Vec<EvalTurn>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EvalTurn {
	pub id: Option<String>,
	pub signals: SignalBundle,
	pub answer_text: Option<String>,
	pub supported_claim_count: Option<usize>,
	pub contradiction_count: Option<usize>,
	pub graph_pack: Option<GraphPack>,
	pub max_candidates: Option<usize>,
	pub max_depth: Option<u32>,
	pub deficits: Option<RelationDeficits>,
	pub already_attempted: bool,
	pub before: Option<RelationEvidenceSnapshot>,
	pub after: Option<RelationEvidenceSnapshot>,
	pub retrieval_route: String,
	pub fallback_decision: String,
	pub contract_renderer_path: String,
	pub gate_outcomes: BTreeMap<String, bool>,
	pub expected_move: Option<Move>,
}

#[derive(Debug, Serialize)]
pub struct EvalOutput {
	pub dataset: EvalDatasetInfo,
	pub settings: EvalSettings,
	pub summary: EvalSummary,
	pub turns: Vec<TurnReport>,
}

#[derive(Debug, Serialize)]
pub struct EvalDatasetInfo {
	pub name: String,
	pub turn_count: usize,
}

#[derive(Debug, Serialize)]
pub struct EvalSettings {
	pub config_path: String,
	pub policy_id: String,
	pub policy: Value,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct EvalSummary {
	pub turn_count: usize,
	pub expected_count: usize,
	pub matched_count: usize,
	/// Share of turns with an expected move whose selection matched it.
	pub expected_move_accuracy: f64,
	pub selected_moves: BTreeMap<Move, usize>,
}

#[derive(Debug, Serialize)]
pub struct TurnReport {
	pub id: String,
	pub selection: MoveSelection,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub quality: Option<SemanticQuality>,
	pub bridge_candidates: Vec<BridgeTraversalCandidate>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub second_pass: Option<SecondPassDecision>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub second_pass_delta: Option<RelationSecondPassDelta>,
	pub event_fields: EventStableFields,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub expected_move: Option<Move>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub matched_expected: Option<bool>,
}

pub fn run(args: Args) -> color_eyre::Result<()> {
	let mut config = movegate_config::load(&args.config)?;

	movegate_cli::init_tracing(config.service.log_level.as_str());

	let overrides = EnvOverrides::from_env();

	if !overrides.is_empty() {
		config.policy.apply_env_overrides(&overrides);

		if let Err(err) = movegate_config::validate_policy(&config.policy) {
			tracing::warn!(error = %err, "Environment override is out of range; clamping.");
		}

		tracing::info!(
			profile_overrides = overrides.profiles.len(),
			"Applied environment policy overrides."
		);
	}

	let policy = MovePolicy::new(&config.policy);
	let dataset = load_dataset(args.dataset.as_path())?;
	let output = evaluate(args.config.as_path(), &policy, &dataset);
	let json = serde_json::to_string_pretty(&output)?;

	println!("{json}");

	Ok(())
}

pub fn load_dataset(path: &Path) -> color_eyre::Result<EvalDataset> {
	let raw = fs::read_to_string(path)?;
	let dataset: EvalDataset = serde_json::from_str(&raw)?;

	if dataset.turns.is_empty() {
		return Err(eyre::eyre!("Dataset must include at least one turn."));
	}

	Ok(dataset)
}

pub fn evaluate(config_path: &Path, policy: &MovePolicy, dataset: &EvalDataset) -> EvalOutput {
	let turns: Vec<TurnReport> = dataset
		.turns
		.iter()
		.enumerate()
		.map(|(idx, turn)| evaluate_turn(policy, idx, turn))
		.collect();
	let summary = summarize(&turns);

	tracing::info!(
		turns = summary.turn_count,
		accuracy = summary.expected_move_accuracy,
		"Evaluation finished."
	);

	EvalOutput {
		dataset: EvalDatasetInfo {
			name: dataset.name.clone().unwrap_or_else(|| "unnamed".to_string()),
			turn_count: dataset.turns.len(),
		},
		settings: EvalSettings {
			config_path: config_path.display().to_string(),
			policy_id: policy.policy_id(),
			policy: policy.policy_snapshot(),
		},
		summary,
		turns,
	}
}

fn evaluate_turn(policy: &MovePolicy, idx: usize, turn: &EvalTurn) -> TurnReport {
	let selection = policy.select_with_debug(&turn.signals);
	let quality = turn.answer_text.as_deref().map(|text| {
		movegate_policy::evaluate_semantic_quality(&SemanticQualityInput {
			text,
			supported_claim_count: turn.supported_claim_count,
			contradiction_count: turn.contradiction_count,
		})
	});
	let bridge_candidates =
		movegate_policy::precompute_bridge_traversal_candidates(&BridgeCandidateArgs {
			graph_pack: turn.graph_pack.as_ref(),
			max_candidates: turn.max_candidates,
			max_depth: turn.max_depth,
		});
	let second_pass = turn.deficits.map(|deficits| {
		movegate_policy::decide_relation_second_pass(
			selection.selected_move,
			&deficits,
			turn.already_attempted,
		)
	});
	let second_pass_delta = match (&turn.before, &turn.after) {
		(Some(before), Some(after)) =>
			Some(movegate_policy::compute_relation_second_pass_delta(before, after)),
		_ => None,
	};
	let event_fields = movegate_policy::build_event_stable_fields(EventStableFieldsArgs {
		retrieval_route: turn.retrieval_route.as_str(),
		fallback_decision: turn.fallback_decision.as_str(),
		contract_renderer_path: turn.contract_renderer_path.as_str(),
		gate_outcomes: &turn.gate_outcomes,
	});
	let matched_expected = turn.expected_move.map(|expected| expected == selection.selected_move);
	let id = turn.id.clone().unwrap_or_else(|| format!("turn-{}", idx + 1));

	if matched_expected == Some(false) {
		tracing::warn!(
			turn = id.as_str(),
			selected = selection.selected_move.as_str(),
			expected = turn.expected_move.map(Move::as_str),
			"Selected move differs from expectation."
		);
	}

	TurnReport {
		id,
		selection,
		quality,
		bridge_candidates,
		second_pass,
		second_pass_delta,
		event_fields,
		expected_move: turn.expected_move,
		matched_expected,
	}
}

fn summarize(turns: &[TurnReport]) -> EvalSummary {
	let mut selected_moves: BTreeMap<Move, usize> =
		Move::ALL.into_iter().map(|mv| (mv, 0)).collect();

	for turn in turns {
		*selected_moves.entry(turn.selection.selected_move).or_default() += 1;
	}

	let expected_count = turns.iter().filter(|turn| turn.matched_expected.is_some()).count();
	let matched_count = turns.iter().filter(|turn| turn.matched_expected == Some(true)).count();
	let expected_move_accuracy =
		if expected_count == 0 { 0.0 } else { matched_count as f64 / expected_count as f64 };

	EvalSummary {
		turn_count: turns.len(),
		expected_count,
		matched_count,
		expected_move_accuracy,
		selected_moves,
	}
}
