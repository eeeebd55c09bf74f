use std::{cmp::Ordering, collections::BTreeMap};

use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_CANDIDATES: usize = 8;
pub const DEFAULT_MAX_DEPTH: u32 = 3;

const BRIDGE_NODE_TYPE: &str = "bridge";
const BRIDGE_RELATION_KEYWORDS: [&str; 4] = ["bridge", "enables", "constrains", "verifies"];

/// Framework id to its traversal path.
pub type GraphPack = BTreeMap<String, GraphFramework>;

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct GraphFramework {
	#[serde(alias = "sourcePath")]
	pub source_path: String,
	pub path: Vec<GraphNode>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct GraphNode {
	pub id: String,
	#[serde(alias = "type", alias = "nodeType")]
	pub node_type: Option<String>,
	pub relation: Option<String>,
	/// Defaults to the node's position in its path.
	pub depth: Option<u32>,
	pub score: Option<f64>,
}
impl GraphNode {
	pub fn resolved_depth(&self, position: usize) -> u32 {
		self.depth.unwrap_or_else(|| u32::try_from(position).unwrap_or(u32::MAX))
	}

	pub fn resolved_score(&self) -> f64 {
		self.score.filter(|score| score.is_finite()).unwrap_or(0.0)
	}

	pub fn is_bridge(&self) -> bool {
		let typed_bridge = self
			.node_type
			.as_deref()
			.is_some_and(|kind| kind.trim().eq_ignore_ascii_case(BRIDGE_NODE_TYPE));

		typed_bridge || self.relation.as_deref().is_some_and(is_bridge_relation)
	}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct BridgeCandidateArgs<'a> {
	pub graph_pack: Option<&'a GraphPack>,
	pub max_candidates: Option<usize>,
	pub max_depth: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BridgeTraversalCandidate {
	pub tree_id: String,
	pub source_path: String,
	pub node_id: String,
	pub relation: String,
	pub depth: u32,
	pub score: f64,
}

/// Relation names that link two frameworks rather than elaborate one.
pub fn is_bridge_relation(relation: &str) -> bool {
	let relation = relation.to_ascii_lowercase();

	BRIDGE_RELATION_KEYWORDS.iter().any(|keyword| relation.contains(keyword))
}

/// Collects bridge nodes within `max_depth`, ordered by depth, score (highest first), framework
/// id, then node id.
pub fn precompute_bridge_traversal_candidates(
	args: &BridgeCandidateArgs<'_>,
) -> Vec<BridgeTraversalCandidate> {
	let Some(pack) = args.graph_pack else {
		return Vec::new();
	};
	let max_candidates = args.max_candidates.unwrap_or(DEFAULT_MAX_CANDIDATES);
	let max_depth = args.max_depth.unwrap_or(DEFAULT_MAX_DEPTH);
	let mut candidates = Vec::new();

	for (tree_id, framework) in pack {
		for (position, node) in framework.path.iter().enumerate() {
			let depth = node.resolved_depth(position);

			if depth > max_depth || !node.is_bridge() {
				continue;
			}

			candidates.push(BridgeTraversalCandidate {
				tree_id: tree_id.clone(),
				source_path: framework.source_path.clone(),
				node_id: node.id.clone(),
				relation: node
					.relation
					.clone()
					.filter(|relation| !relation.trim().is_empty())
					.unwrap_or_else(|| BRIDGE_NODE_TYPE.to_string()),
				depth,
				score: node.resolved_score(),
			});
		}
	}

	candidates.sort_by(cmp_candidates);

	let qualified = candidates.len();

	candidates.truncate(max_candidates);

	tracing::debug!(
		tree_count = pack.len(),
		qualified,
		kept = candidates.len(),
		max_depth,
		"Bridge candidates computed."
	);

	candidates
}

fn cmp_candidates(a: &BridgeTraversalCandidate, b: &BridgeTraversalCandidate) -> Ordering {
	a.depth
		.cmp(&b.depth)
		.then_with(|| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal))
		.then_with(|| a.tree_id.cmp(&b.tree_id))
		.then_with(|| a.node_id.cmp(&b.node_id))
}

#[cfg(test)]
mod tests {
	use crate::bridge::{
		BridgeCandidateArgs, GraphFramework, GraphNode, GraphPack, is_bridge_relation,
		precompute_bridge_traversal_candidates,
	};

	fn node(id: &str, relation: &str, depth: Option<u32>, score: Option<f64>) -> GraphNode {
		GraphNode {
			id: id.to_string(),
			node_type: None,
			relation: Some(relation.to_string()),
			depth,
			score,
		}
	}

	#[test]
	fn relation_keywords_match_case_insensitively() {
		assert!(is_bridge_relation("ENABLES"));
		assert!(is_bridge_relation("cross_bridge_link"));
		assert!(is_bridge_relation("Verifies claim"));
		assert!(!is_bridge_relation("contains"));
		assert!(!is_bridge_relation(""));
	}

	#[test]
	fn absent_pack_or_zero_bound_yields_nothing() {
		let mut pack = GraphPack::new();

		pack.insert(
			"alpha".to_string(),
			GraphFramework {
				source_path: "docs/alpha.md".to_string(),
				path: vec![node("a1", "bridge", Some(0), Some(1.0))],
			},
		);

		assert!(precompute_bridge_traversal_candidates(&BridgeCandidateArgs::default()).is_empty());
		assert!(
			precompute_bridge_traversal_candidates(&BridgeCandidateArgs {
				graph_pack: Some(&pack),
				max_candidates: Some(0),
				max_depth: None,
			})
			.is_empty()
		);
	}

	#[test]
	fn missing_depth_uses_path_position_and_bad_scores_are_zero() {
		let mut pack = GraphPack::new();

		pack.insert(
			"alpha".to_string(),
			GraphFramework {
				source_path: "docs/alpha.md".to_string(),
				path: vec![
					node("root", "contains", None, Some(0.9)),
					node("b1", "enables", None, Some(f64::NAN)),
					GraphNode {
						id: "b2".to_string(),
						node_type: Some("Bridge".to_string()),
						relation: None,
						depth: None,
						score: None,
					},
					node("deep", "verifies", None, Some(0.8)),
					node("deeper", "verifies", None, Some(0.8)),
				],
			},
		);

		let candidates = precompute_bridge_traversal_candidates(&BridgeCandidateArgs {
			graph_pack: Some(&pack),
			..Default::default()
		});
		let ids: Vec<&str> = candidates.iter().map(|c| c.node_id.as_str()).collect();

		assert_eq!(ids, vec!["b1", "b2", "deep"]);
		assert_eq!(candidates[0].depth, 1);
		assert_eq!(candidates[0].score, 0.0);
		assert_eq!(candidates[1].relation, "bridge");
		assert_eq!(candidates[2].depth, 3);
	}
}
