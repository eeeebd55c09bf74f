use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Clone, Copy, Debug)]
pub struct EventStableFieldsArgs<'a> {
	pub retrieval_route: &'a str,
	pub fallback_decision: &'a str,
	pub contract_renderer_path: &'a str,
	pub gate_outcomes: &'a BTreeMap<String, bool>,
}

/// Telemetry fields that stay identical when a turn is replayed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EventStableFields {
	pub retrieval_route: String,
	pub fallback_decision: String,
	pub contract_renderer_path: String,
	pub gate_outcomes: BTreeMap<String, bool>,
}

pub fn build_event_stable_fields(args: EventStableFieldsArgs<'_>) -> EventStableFields {
	EventStableFields {
		retrieval_route: args.retrieval_route.to_string(),
		fallback_decision: args.fallback_decision.to_string(),
		contract_renderer_path: args.contract_renderer_path.to_string(),
		gate_outcomes: args.gate_outcomes.clone(),
	}
}
