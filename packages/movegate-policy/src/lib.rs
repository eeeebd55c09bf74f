pub mod bias;
pub mod bridge;
pub mod event_fields;
pub mod moves;
pub mod profile;
pub mod scoring;
pub mod second_pass;
pub mod selector;
pub mod semantic_quality;
pub mod signals;

pub use bias::{DynamicBiasConfig, DynamicBiases, compute_dynamic_biases};
pub use bridge::{
	BridgeCandidateArgs, BridgeTraversalCandidate, DEFAULT_MAX_CANDIDATES, DEFAULT_MAX_DEPTH,
	GraphFramework, GraphNode, GraphPack, is_bridge_relation,
	precompute_bridge_traversal_candidates,
};
pub use event_fields::{EventStableFields, EventStableFieldsArgs, build_event_stable_fields};
pub use moves::{Move, RejectionReason, StopReason};
pub use profile::{PolicyProfile, ProfileWeightTable, ProfileWeights};
pub use scoring::{MoveScores, MoveTerms, MoveTermsByMove, compute_move_terms, score_moves};
pub use second_pass::{
	DualDomainDelta, RelationDeficits, RelationEvidenceSnapshot, RelationSecondPassDelta,
	SecondPassDecision, SecondPassSkipReason, SecondPassState, compute_relation_second_pass_delta,
	decide_relation_second_pass,
};
pub use selector::{MovePolicy, MoveSelection, RankedMove, rank_moves_deterministically};
pub use semantic_quality::{
	SemanticQuality, SemanticQualityInput, evaluate_semantic_quality, segment_claims,
};
pub use signals::{ResolvedSignals, SignalBundle, clamp_unit};
