use std::{cmp::Ordering, collections::BTreeMap};

use serde::Serialize;
use serde_json::Value;

use movegate_config::{DEFAULT_CLARIFY_THRESHOLD, Policy};

use crate::{
	bias::{DynamicBiasConfig, DynamicBiases, compute_dynamic_biases},
	moves::{Move, RejectionReason, StopReason},
	profile::{PolicyProfile, ProfileWeightTable},
	scoring::{MoveScores, MoveTermsByMove, compute_move_terms, score_moves},
	signals::{ResolvedSignals, SignalBundle},
};

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RankedMove {
	#[serde(rename = "move")]
	pub mv: Move,
	pub score: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MoveSelection {
	pub selected_move: Move,
	pub profile: PolicyProfile,
	pub clarify_threshold: f64,
	pub move_scores: MoveScores,
	pub move_terms: MoveTermsByMove,
	pub ranked_moves: Vec<RankedMove>,
	/// Non-selected moves, most preferred first.
	pub rejected_moves: Vec<Move>,
	pub rejection_reasons: BTreeMap<Move, Vec<RejectionReason>>,
	pub budget_pressure: f64,
	pub stop_reason: StopReason,
	pub dynamic_biases: DynamicBiases,
}

/// Deterministic move selector.
///
/// Holds the process-wide configuration resolved once at startup. Selection reads only the
/// signal bundle and this value, so one instance can be shared across threads.
#[derive(Clone, Debug, PartialEq)]
pub struct MovePolicy {
	weights: ProfileWeightTable,
	bias: DynamicBiasConfig,
	default_profile: PolicyProfile,
	clarify_threshold: f64,
}
impl MovePolicy {
	pub fn new(policy: &Policy) -> Self {
		let clarify_threshold = if policy.clarify_threshold.is_finite() {
			policy.clarify_threshold.clamp(0.0, 1.0)
		} else {
			DEFAULT_CLARIFY_THRESHOLD
		};

		Self {
			weights: ProfileWeightTable::with_overrides(&policy.profiles),
			bias: DynamicBiasConfig::from_policy(&policy.bias),
			default_profile: PolicyProfile::parse_or_balanced(policy.default_profile.as_str()),
			clarify_threshold,
		}
	}

	pub fn weights(&self) -> &ProfileWeightTable {
		&self.weights
	}

	pub fn bias_config(&self) -> &DynamicBiasConfig {
		&self.bias
	}

	pub fn resolve_profile(&self, bundle: &SignalBundle) -> PolicyProfile {
		match bundle.profile.as_deref() {
			Some(name) => PolicyProfile::parse_or_balanced(name),
			None => self.default_profile,
		}
	}

	pub fn resolve_clarify_threshold(&self, bundle: &SignalBundle) -> f64 {
		match bundle.clarify_threshold {
			Some(value) if value.is_finite() => value.clamp(0.0, 1.0),
			_ => self.clarify_threshold,
		}
	}

	pub fn select_with_debug(&self, bundle: &SignalBundle) -> MoveSelection {
		let signals = bundle.resolve();
		let profile = self.resolve_profile(bundle);
		let clarify_threshold = self.resolve_clarify_threshold(bundle);
		let relation_intent_active = bundle.relation_intent_active();
		let dynamic_biases = compute_dynamic_biases(
			&self.bias,
			relation_intent_active,
			bundle.bridge_gap,
			bundle.evidence_gap,
			bundle.dual_domain_gap,
		);
		let move_terms = compute_move_terms(&signals, &dynamic_biases, clarify_threshold);
		let move_scores = score_moves(&move_terms, &self.weights.get(profile));
		let ranked_moves = rank_moves_deterministically(&move_scores);
		let winner = ranked_moves[0];
		let rejected_moves: Vec<Move> = ranked_moves[1..].iter().map(|ranked| ranked.mv).collect();
		let rejection_reasons = rejected_moves
			.iter()
			.map(|&mv| {
				let reasons = rejection_reasons_for(
					mv,
					move_scores.get(mv),
					winner.score,
					relation_intent_active,
					&signals,
					clarify_threshold,
				);

				(mv, reasons)
			})
			.collect();
		let stop_reason = winner.mv.stop_reason();

		tracing::debug!(
			selected_move = winner.mv.as_str(),
			score = winner.score,
			profile = profile.as_str(),
			stop_reason = stop_reason.as_str(),
			relation_intent_active,
			relation_build_bias = dynamic_biases.relation_build_bias,
			retrieve_more_bias = dynamic_biases.retrieve_more_bias,
			"Move selected."
		);

		MoveSelection {
			selected_move: winner.mv,
			profile,
			clarify_threshold,
			move_scores,
			move_terms,
			ranked_moves,
			rejected_moves,
			rejection_reasons,
			budget_pressure: signals.budget_pressure,
			stop_reason,
			dynamic_biases,
		}
	}

	pub fn select(&self, bundle: &SignalBundle) -> Move {
		self.select_with_debug(bundle).selected_move
	}

	/// Resolved configuration as JSON. Map keys are ordered, so the rendering is stable.
	pub fn policy_snapshot(&self) -> Value {
		serde_json::json!({
			"default_profile": self.default_profile.as_str(),
			"clarify_threshold": self.clarify_threshold,
			"profiles": &self.weights,
			"bias": &self.bias,
		})
	}

	/// Content hash of [`Self::policy_snapshot`], recorded alongside selections for replay audits.
	pub fn policy_id(&self) -> String {
		let snapshot = self.policy_snapshot().to_string();

		blake3::hash(snapshot.as_bytes()).to_hex().to_string()
	}
}
impl Default for MovePolicy {
	fn default() -> Self {
		Self::new(&Policy::default())
	}
}

/// Orders moves by score, highest first. Exact ties go to the higher-priority move, so the
/// result is always a strict order of all five moves.
pub fn rank_moves_deterministically(scores: &MoveScores) -> Vec<RankedMove> {
	let mut ranked: Vec<RankedMove> =
		scores.iter().map(|(mv, score)| RankedMove { mv, score }).collect();

	ranked.sort_by(|left, right| {
		cmp_score_desc(left.score, right.score)
			.then_with(|| left.mv.priority().cmp(&right.mv.priority()))
	});

	ranked
}

fn cmp_score_desc(a: f64, b: f64) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
	}
}

fn rejection_reasons_for(
	mv: Move,
	score: f64,
	winner_score: f64,
	relation_intent_active: bool,
	signals: &ResolvedSignals,
	clarify_threshold: f64,
) -> Vec<RejectionReason> {
	let mut reasons = Vec::new();

	if score < winner_score {
		reasons.push(RejectionReason::LowerScore);
	}

	match mv {
		Move::RelationBuild if !relation_intent_active => {
			reasons.push(RejectionReason::RelationIntentInactive);
		},
		Move::FailClosed if signals.risk < clarify_threshold => {
			reasons.push(RejectionReason::RiskBelowFailClosedThreshold);
		},
		Move::DirectAnswer
		| Move::RetrieveMore
		| Move::RelationBuild
		| Move::Clarify
		| Move::FailClosed => {},
	}

	if reasons.is_empty() {
		reasons.push(RejectionReason::Deprioritized);
	}

	reasons
}
