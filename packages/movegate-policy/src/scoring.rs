use serde::Serialize;

use crate::{
	bias::DynamicBiases, moves::Move, profile::ProfileWeights, signals::ResolvedSignals,
};

/// Bonus on fail-closed goal pull once risk reaches the threshold.
const FAIL_CLOSED_GUARD_BONUS: f64 = 0.25;
/// Bonus on clarify goal pull once uncertainty reaches the threshold.
const CLARIFY_GUARD_BONUS: f64 = 0.15;
/// Share of a move bias that also lifts its evidence-gain term.
const BIAS_EVIDENCE_SHARE: f64 = 0.5;

/// The five weighted criteria for one move, before profile weights.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MoveTerms {
	pub goal: f64,
	pub evidence_gain: f64,
	pub latency_cost: f64,
	pub risk: f64,
	pub budget_pressure: f64,
}
impl MoveTerms {
	pub fn combine(&self, weights: &ProfileWeights) -> f64 {
		self.goal * weights.goal + self.evidence_gain * weights.evidence_gain
			- self.latency_cost * weights.latency_cost
			- self.risk * weights.risk
			- self.budget_pressure * weights.budget_pressure
	}
}

/// One finite score per move.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MoveScores {
	pub direct_answer: f64,
	pub retrieve_more: f64,
	pub relation_build: f64,
	pub clarify: f64,
	pub fail_closed: f64,
}
impl MoveScores {
	pub fn from_fn<F>(mut score: F) -> Self
	where
		F: FnMut(Move) -> f64,
	{
		Self {
			direct_answer: score(Move::DirectAnswer),
			retrieve_more: score(Move::RetrieveMore),
			relation_build: score(Move::RelationBuild),
			clarify: score(Move::Clarify),
			fail_closed: score(Move::FailClosed),
		}
	}

	pub fn get(&self, mv: Move) -> f64 {
		match mv {
			Move::DirectAnswer => self.direct_answer,
			Move::RetrieveMore => self.retrieve_more,
			Move::RelationBuild => self.relation_build,
			Move::Clarify => self.clarify,
			Move::FailClosed => self.fail_closed,
		}
	}

	pub fn iter(&self) -> impl Iterator<Item = (Move, f64)> + '_ {
		Move::ALL.into_iter().map(move |mv| (mv, self.get(mv)))
	}
}

/// Per-move criteria terms, kept for explain output.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MoveTermsByMove {
	pub direct_answer: MoveTerms,
	pub retrieve_more: MoveTerms,
	pub relation_build: MoveTerms,
	pub clarify: MoveTerms,
	pub fail_closed: MoveTerms,
}
impl MoveTermsByMove {
	pub fn get(&self, mv: Move) -> &MoveTerms {
		match mv {
			Move::DirectAnswer => &self.direct_answer,
			Move::RetrieveMore => &self.retrieve_more,
			Move::RelationBuild => &self.relation_build,
			Move::Clarify => &self.clarify,
			Move::FailClosed => &self.fail_closed,
		}
	}
}

pub fn compute_move_terms(
	signals: &ResolvedSignals,
	biases: &DynamicBiases,
	threshold: f64,
) -> MoveTermsByMove {
	MoveTermsByMove {
		direct_answer: direct_answer_terms(signals),
		retrieve_more: retrieve_more_terms(signals, biases.retrieve_more_bias),
		relation_build: relation_build_terms(signals, biases.relation_build_bias),
		clarify: clarify_terms(signals, threshold),
		fail_closed: fail_closed_terms(signals, threshold),
	}
}

/// Scores every move. Inputs are clamped and weights are bounded, so every score is finite.
pub fn score_moves(terms: &MoveTermsByMove, weights: &ProfileWeights) -> MoveScores {
	MoveScores::from_fn(|mv| finite_or_zero(terms.get(mv).combine(weights)))
}

fn direct_answer_terms(s: &ResolvedSignals) -> MoveTerms {
	MoveTerms {
		goal: 0.45 * s.groundedness + 0.35 * s.coverage + 0.20 * (1.0 - s.uncertainty),
		evidence_gain: 0.10 * s.groundedness,
		latency_cost: 0.10 * s.latency_cost,
		risk: 0.50 * s.risk + 0.30 * s.uncertainty + 0.20 * s.safety,
		budget_pressure: 0.10 * s.budget_pressure,
	}
}

fn retrieve_more_terms(s: &ResolvedSignals, bias: f64) -> MoveTerms {
	MoveTerms {
		goal: 0.40 * s.uncertainty
			+ 0.35 * (1.0 - s.coverage)
			+ 0.25 * (1.0 - s.groundedness)
			+ bias,
		evidence_gain: s.evidence_gain + BIAS_EVIDENCE_SHARE * bias,
		latency_cost: 0.20 + 0.60 * s.latency_cost,
		risk: 0.30 * s.risk,
		budget_pressure: s.budget_pressure,
	}
}

fn relation_build_terms(s: &ResolvedSignals, bias: f64) -> MoveTerms {
	MoveTerms {
		goal: 0.30 * (1.0 - s.coverage)
			+ 0.30 * s.uncertainty
			+ 0.20 * s.evidence_gain
			+ 0.20 * (1.0 - s.groundedness)
			+ bias,
		evidence_gain: 0.80 * s.evidence_gain + BIAS_EVIDENCE_SHARE * bias,
		latency_cost: 0.25 + 0.70 * s.latency_cost,
		risk: 0.30 * s.risk,
		budget_pressure: 1.10 * s.budget_pressure,
	}
}

fn clarify_terms(s: &ResolvedSignals, threshold: f64) -> MoveTerms {
	let guard = if s.uncertainty >= threshold { CLARIFY_GUARD_BONUS } else { 0.0 };

	MoveTerms {
		goal: 0.50 * s.uncertainty + 0.30 * (1.0 - s.coverage) + 0.20 * (1.0 - s.groundedness)
			+ guard,
		evidence_gain: 0.30 * s.uncertainty,
		latency_cost: 0.30 + 0.20 * s.latency_cost,
		risk: 0.20 * s.risk,
		budget_pressure: 0.50 * s.budget_pressure,
	}
}

fn fail_closed_terms(s: &ResolvedSignals, threshold: f64) -> MoveTerms {
	let guard = if s.risk >= threshold { FAIL_CLOSED_GUARD_BONUS } else { 0.0 };

	MoveTerms {
		goal: 0.40 * s.safety + 0.40 * s.risk + 0.20 * s.budget_pressure + guard,
		evidence_gain: 0.0,
		latency_cost: 0.0,
		// Cost of refusing when neither risk nor safety concern is present.
		risk: 0.30 * (1.0 - s.risk.max(s.safety)),
		budget_pressure: 0.0,
	}
}

fn finite_or_zero(value: f64) -> f64 {
	if value.is_finite() { value } else { 0.0 }
}

#[cfg(test)]
mod tests {
	use crate::{
		bias::DynamicBiases,
		moves::Move,
		profile::{PolicyProfile, ProfileWeights},
		scoring::{compute_move_terms, score_moves},
		signals::SignalBundle,
	};

	#[test]
	fn fail_closed_guard_applies_at_threshold() {
		let bundle = SignalBundle { risk: 0.72, safety: 0.9, ..Default::default() };
		let below = SignalBundle { risk: 0.71, safety: 0.9, ..Default::default() };
		let weights = ProfileWeights::builtin(PolicyProfile::Balanced);
		let at = score_moves(
			&compute_move_terms(&bundle.resolve(), &DynamicBiases::default(), 0.72),
			&weights,
		);
		let under = score_moves(
			&compute_move_terms(&below.resolve(), &DynamicBiases::default(), 0.72),
			&weights,
		);
		let lift = at.get(Move::FailClosed) - under.get(Move::FailClosed);

		assert!(lift > 0.25 * weights.goal - 1e-9, "Unexpected guard lift: {lift}");
	}

	#[test]
	fn high_grounding_and_coverage_favor_direct_answer() {
		let bundle = SignalBundle {
			groundedness: 0.95,
			coverage: 0.9,
			uncertainty: 0.05,
			evidence_gain: 0.1,
			latency_cost: 0.2,
			..Default::default()
		};
		let scores = score_moves(
			&compute_move_terms(&bundle.resolve(), &DynamicBiases::default(), 0.72),
			&ProfileWeights::builtin(PolicyProfile::Balanced),
		);

		for (mv, score) in scores.iter() {
			if mv != Move::DirectAnswer {
				assert!(scores.direct_answer > score, "{mv:?} scored {score}");
			}
		}
	}
}
