use std::collections::HashSet;

use regex::Regex;
use serde::Serialize;

/// Spans shorter than this are not treated as claims.
pub const MIN_CLAIM_CHARS: usize = 20;
/// Repetition is only judged once there are at least this many claims.
pub const REPETITION_MIN_CLAIMS: usize = 4;
/// Distinct-to-total claim ratio below which repetition fails.
pub const REPETITION_DISTINCT_RATIO: f64 = 0.6;

const CITATION_PATTERN: &str =
	r"(?i)\[[^\]]+\]|\b(?:docs|server|client|shared|modules|src|tests|scripts)/|\bsources?:";
const HEDGE_PATTERN: &str = concat!(
	r"(?i)\b(?:may|might|could|likely|unlikely|possibly|perhaps|uncertain|unclear|appears to|",
	r"suggests?|not yet (?:established|verified|known)|evidence gap|insufficient evidence|",
	r"limited evidence|maturity|exploratory|hypothes[ie]s|speculative)\b",
);

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SemanticQualityInput<'a> {
	pub text: &'a str,
	/// Claims an upstream verifier already judged supported.
	pub supported_claim_count: Option<usize>,
	pub contradiction_count: Option<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SemanticQuality {
	pub claim_count: usize,
	pub supported_claim_count: usize,
	pub citation_link_rate: f64,
	pub unsupported_claim_rate: f64,
	pub repetition_penalty_fail: bool,
	pub contradiction_flag: bool,
}

pub fn evaluate_semantic_quality(input: &SemanticQualityInput<'_>) -> SemanticQuality {
	let citation = Regex::new(CITATION_PATTERN).ok();
	let hedge = Regex::new(HEDGE_PATTERN).ok();
	let claims = segment_claims(input.text);
	let total = claims.len();
	let has_sources_line = input.text.lines().any(is_sources_line);
	let matched = claims
		.iter()
		.filter(|claim| citation.as_ref().is_some_and(|re| re.is_match(claim)))
		.count();
	// A trailing sources block credits every claim when none is cited inline.
	let linked = if has_sources_line && matched == 0 { total } else { matched };
	let hedged =
		claims.iter().filter(|claim| hedge.as_ref().is_some_and(|re| re.is_match(claim))).count();
	let supported = input
		.supported_claim_count
		.unwrap_or(0)
		.max(linked)
		.max(hedged)
		.max(if has_sources_line { total } else { 0 });

	SemanticQuality {
		claim_count: total,
		supported_claim_count: supported,
		citation_link_rate: ratio(linked, total),
		unsupported_claim_rate: ratio(total.saturating_sub(supported), total),
		repetition_penalty_fail: repetition_fails(&claims),
		contradiction_flag: input.contradiction_count.is_some_and(|count| count > 0),
	}
}

/// Splits text into sentence-like claims.
///
/// A sentence ends at `.`, `!` or `?` followed by whitespace or end of line. Bracketed
/// citations right after the punctuation belong to the sentence they follow. `Sources:` lines
/// are skipped.
pub fn segment_claims(text: &str) -> Vec<String> {
	let mut claims = Vec::new();

	for line in text.lines() {
		let line = line.trim();

		if line.is_empty() || is_sources_line(line) {
			continue;
		}

		for span in split_sentences(line) {
			let span = span.trim();

			if span.chars().count() >= MIN_CLAIM_CHARS {
				claims.push(span.to_string());
			}
		}
	}

	claims
}

fn split_sentences(line: &str) -> Vec<&str> {
	let mut spans = Vec::new();
	let mut start = 0;
	let mut cursor = 0;

	while let Some(offset) = line[cursor..].find(|c: char| matches!(c, '.' | '!' | '?')) {
		let end = extend_over_citations(line, cursor + offset + 1);
		let at_boundary = line[end..].chars().next().is_none_or(char::is_whitespace);

		cursor = end;

		if at_boundary {
			spans.push(&line[start..end]);

			start = end;
		}
	}

	if start < line.len() {
		spans.push(&line[start..]);
	}

	spans
}

fn extend_over_citations(line: &str, mut end: usize) -> usize {
	loop {
		let rest = &line[end..];
		let trimmed = rest.trim_start();

		if !trimmed.starts_with('[') {
			return end;
		}

		let Some(close) = trimmed.find(']') else {
			return end;
		};

		end += rest.len() - trimmed.len() + close + 1;
	}
}

fn is_sources_line(line: &str) -> bool {
	let line = line.trim_start().trim_start_matches(|c: char| matches!(c, '#' | '*' | '-' | '>'));
	let line = line.trim_start();

	line.get(..8).is_some_and(|prefix| prefix.eq_ignore_ascii_case("sources:"))
}

fn repetition_fails(claims: &[String]) -> bool {
	if claims.len() < REPETITION_MIN_CLAIMS {
		return false;
	}

	let distinct: HashSet<String> = claims.iter().map(|claim| normalize_claim(claim)).collect();

	ratio(distinct.len(), claims.len()) < REPETITION_DISTINCT_RATIO
}

fn normalize_claim(claim: &str) -> String {
	claim.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

fn ratio(part: usize, total: usize) -> f64 {
	if total == 0 {
		return 0.0;
	}

	part as f64 / total as f64
}
