use serde::{Deserialize, Serialize};

/// Next action for a reasoning turn.
///
/// Declaration order is the tie-break priority: on equal scores the earlier variant wins.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Move {
	DirectAnswer,
	RetrieveMore,
	RelationBuild,
	Clarify,
	FailClosed,
}
impl Move {
	pub const ALL: [Self; 5] = [
		Self::DirectAnswer,
		Self::RetrieveMore,
		Self::RelationBuild,
		Self::Clarify,
		Self::FailClosed,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::DirectAnswer => "direct_answer",
			Self::RetrieveMore => "retrieve_more",
			Self::RelationBuild => "relation_build",
			Self::Clarify => "clarify",
			Self::FailClosed => "fail_closed",
		}
	}

	/// Lower is preferred.
	pub fn priority(self) -> u8 {
		match self {
			Self::DirectAnswer => 0,
			Self::RetrieveMore => 1,
			Self::RelationBuild => 2,
			Self::Clarify => 3,
			Self::FailClosed => 4,
		}
	}

	pub fn stop_reason(self) -> StopReason {
		match self {
			Self::DirectAnswer => StopReason::GoalSatisfied,
			Self::RetrieveMore => StopReason::EvidenceGain,
			Self::RelationBuild => StopReason::RelationBridgeExpansion,
			Self::Clarify => StopReason::ClarifyNeeded,
			Self::FailClosed => StopReason::RiskOrBudgetGuard,
		}
	}

	pub fn parse(value: &str) -> Option<Self> {
		match value.trim() {
			"direct_answer" => Some(Self::DirectAnswer),
			"retrieve_more" => Some(Self::RetrieveMore),
			"relation_build" => Some(Self::RelationBuild),
			"clarify" => Some(Self::Clarify),
			"fail_closed" => Some(Self::FailClosed),
			_ => None,
		}
	}
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
	GoalSatisfied,
	EvidenceGain,
	RelationBridgeExpansion,
	ClarifyNeeded,
	RiskOrBudgetGuard,
}
impl StopReason {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::GoalSatisfied => "goal_satisfied",
			Self::EvidenceGain => "evidence_gain",
			Self::RelationBridgeExpansion => "relation_bridge_expansion",
			Self::ClarifyNeeded => "clarify_needed",
			Self::RiskOrBudgetGuard => "risk_or_budget_guard",
		}
	}
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
	LowerScore,
	RelationIntentInactive,
	RiskBelowFailClosedThreshold,
	Deprioritized,
}
impl RejectionReason {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::LowerScore => "lower_score",
			Self::RelationIntentInactive => "relation_intent_inactive",
			Self::RiskBelowFailClosedThreshold => "risk_below_fail_closed_threshold",
			Self::Deprioritized => "deprioritized",
		}
	}
}
