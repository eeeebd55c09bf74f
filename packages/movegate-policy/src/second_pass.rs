use serde::{Deserialize, Serialize};

use crate::moves::Move;

/// Which relation evidence the first pass failed to produce.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct RelationDeficits {
	#[serde(alias = "bridgeDeficit")]
	pub bridge_deficit: bool,
	#[serde(alias = "evidenceDeficit")]
	pub evidence_deficit: bool,
	#[serde(alias = "dualDomainDeficit")]
	pub dual_domain_deficit: bool,
}
impl RelationDeficits {
	pub fn any(&self) -> bool {
		self.bridge_deficit || self.evidence_deficit || self.dual_domain_deficit
	}
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SecondPassSkipReason {
	AlreadyAttempted,
	MoveNotEligible,
	NoDeficits,
}
impl SecondPassSkipReason {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::AlreadyAttempted => "already_attempted",
			Self::MoveNotEligible => "move_not_eligible",
			Self::NoDeficits => "no_deficits",
		}
	}
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct SecondPassDecision {
	pub should_attempt: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub skipped_reason: Option<SecondPassSkipReason>,
}
impl SecondPassDecision {
	fn attempt() -> Self {
		Self { should_attempt: true, skipped_reason: None }
	}

	fn skip(reason: SecondPassSkipReason) -> Self {
		Self { should_attempt: false, skipped_reason: Some(reason) }
	}
}

/// Per-turn second pass tracking. `Attempted` is terminal.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SecondPassState {
	#[default]
	NotAttempted,
	Attempted,
}
impl SecondPassState {
	pub fn already_attempted(self) -> bool {
		matches!(self, Self::Attempted)
	}

	/// Decides against the current state and moves to `Attempted` when a pass is granted.
	pub fn decide(
		&mut self,
		selected_move: Move,
		deficits: &RelationDeficits,
	) -> SecondPassDecision {
		let decision =
			decide_relation_second_pass(selected_move, deficits, self.already_attempted());

		if decision.should_attempt {
			*self = Self::Attempted;
		}

		decision
	}
}

/// Relation evidence counts observed before or after a pass.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct RelationEvidenceSnapshot {
	#[serde(alias = "bridgeCount")]
	pub bridge_count: u32,
	#[serde(alias = "evidenceCount")]
	pub evidence_count: u32,
	#[serde(alias = "dualDomain")]
	pub dual_domain: bool,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DualDomainDelta {
	Gained,
	Lost,
	Unchanged,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct RelationSecondPassDelta {
	pub bridge_delta: i64,
	pub evidence_delta: i64,
	pub dual_domain_delta: DualDomainDelta,
}

pub fn decide_relation_second_pass(
	selected_move: Move,
	deficits: &RelationDeficits,
	already_attempted: bool,
) -> SecondPassDecision {
	if already_attempted {
		return SecondPassDecision::skip(SecondPassSkipReason::AlreadyAttempted);
	}

	let eligible = match selected_move {
		Move::RetrieveMore | Move::RelationBuild => true,
		Move::DirectAnswer | Move::Clarify | Move::FailClosed => false,
	};

	if !eligible {
		return SecondPassDecision::skip(SecondPassSkipReason::MoveNotEligible);
	}
	if !deficits.any() {
		return SecondPassDecision::skip(SecondPassSkipReason::NoDeficits);
	}

	SecondPassDecision::attempt()
}

pub fn compute_relation_second_pass_delta(
	before: &RelationEvidenceSnapshot,
	after: &RelationEvidenceSnapshot,
) -> RelationSecondPassDelta {
	let dual_domain_delta = match (before.dual_domain, after.dual_domain) {
		(false, true) => DualDomainDelta::Gained,
		(true, false) => DualDomainDelta::Lost,
		_ => DualDomainDelta::Unchanged,
	};

	RelationSecondPassDelta {
		bridge_delta: i64::from(after.bridge_count) - i64::from(before.bridge_count),
		evidence_delta: i64::from(after.evidence_count) - i64::from(before.evidence_count),
		dual_domain_delta,
	}
}
