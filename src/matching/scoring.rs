use std::collections::HashSet;

use serde::Serialize;
use serde_json::{Number, Value};

/// Safely convert usize to f64 for percentage calculations
#[inline]
fn count_to_f64(count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

/// Convert a leaf count to a match score
#[inline]
fn count_to_score(count: usize) -> u64 {
    u64::try_from(count).unwrap_or(u64::MAX)
}

/// A scalar value reached by fully flattening a document.
///
/// Numbers are normalized so that integral values compare equal regardless of
/// how they were written (`1` and `1.0` are the same leaf). Booleans count as
/// the numbers 1 and 0, so `true` equals `1`. Strings never equal numbers:
/// `"1"` and `1` are distinct leaves, as are `null` and `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Leaf<'a> {
    Null,
    /// Integral number; `true` and `false` land here as 1 and 0
    Integer(i128),
    /// Non-integral number, stored as its bit pattern
    Float(u64),
    Text(&'a str),
}

impl<'a> Leaf<'a> {
    /// Build a leaf from a scalar JSON value.
    ///
    /// Mappings and sequences are not leaves and yield `None`.
    #[must_use]
    pub fn from_value(value: &'a Value) -> Option<Self> {
        match value {
            Value::Null => Some(Self::Null),
            Value::Bool(b) => Some(Self::Integer(i128::from(*b))),
            Value::Number(n) => Some(Self::from_number(n)),
            Value::String(s) => Some(Self::Text(s.as_str())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    fn from_number(n: &Number) -> Self {
        if let Some(i) = n.as_i64() {
            return Self::Integer(i128::from(i));
        }
        if let Some(u) = n.as_u64() {
            return Self::Integer(i128::from(u));
        }
        let f = n.as_f64().unwrap_or(0.0);
        #[allow(clippy::cast_precision_loss)]
        let limit = i128::MAX as f64;
        if f.fract() == 0.0 && f.abs() < limit {
            #[allow(clippy::cast_possible_truncation)]
            let integral = f as i128;
            return Self::Integer(integral);
        }
        Self::Float(f.to_bits())
    }
}

/// Flatten a nested value into its scalar leaves.
///
/// Mappings contribute all of their values (key order is irrelevant), sequences
/// contribute their elements in order, and anything else is a single leaf.
/// Duplicates are preserved.
#[must_use]
pub fn flatten(value: &Value) -> Vec<Leaf<'_>> {
    let mut leaves = Vec::new();
    collect_leaves(value, &mut leaves);
    leaves
}

fn collect_leaves<'a>(value: &'a Value, leaves: &mut Vec<Leaf<'a>>) {
    match value {
        Value::Object(map) => {
            for child in map.values() {
                collect_leaves(child, leaves);
            }
        }
        Value::Array(items) => {
            for child in items {
                collect_leaves(child, leaves);
            }
        }
        scalar => {
            if let Some(leaf) = Leaf::from_value(scalar) {
                leaves.push(leaf);
            }
        }
    }
}

/// Count the leaves of a value without materializing them
#[must_use]
pub fn leaf_count(value: &Value) -> usize {
    match value {
        Value::Object(map) => map.values().map(leaf_count).sum(),
        Value::Array(items) => items.iter().map(leaf_count).sum(),
        _ => 1,
    }
}

/// The flattened leaves of one document, with a membership set for scoring.
///
/// Building a bag flattens the document once; scoring many targets against
/// the same candidate reuses it.
#[derive(Debug, Clone)]
pub struct LeafBag<'a> {
    leaves: Vec<Leaf<'a>>,
    members: HashSet<Leaf<'a>>,
}

impl<'a> LeafBag<'a> {
    #[must_use]
    pub fn new(value: &'a Value) -> Self {
        let leaves = flatten(value);
        let members = leaves.iter().copied().collect();
        Self { leaves, members }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Score this bag as the candidate against `target`.
    ///
    /// Every candidate leaf found at least once in the target counts one
    /// point. Target leaves are never consumed, so repeated candidate leaves
    /// each count against a single occurrence in the target.
    #[must_use]
    pub fn score_against(&self, target: &LeafBag<'_>) -> u64 {
        count_to_score(
            self.leaves
                .iter()
                .filter(|leaf| target.members.contains(*leaf))
                .count(),
        )
    }
}

/// Score `candidate` against `target`.
///
/// The score is the number of `candidate` leaves that occur anywhere in
/// `target`. It is not symmetric: `score([1, 1, 2], [1, 3])` is 2 while
/// `score([1, 3], [1, 1, 2])` is 1.
#[must_use]
pub fn score(candidate: &Value, target: &Value) -> u64 {
    LeafBag::new(candidate).score_against(&LeafBag::new(target))
}

/// Score between two documents with the counts behind it
#[derive(Debug, Clone, Serialize)]
pub struct ScoreDetail {
    /// Candidate leaves found in the target
    pub score: u64,

    /// Number of leaves in the candidate
    pub candidate_leaves: usize,

    /// Number of leaves in the target
    pub target_leaves: usize,

    /// Distinct target leaves that at least one candidate leaf hit
    pub target_leaves_hit: usize,
}

impl ScoreDetail {
    #[must_use]
    pub fn calculate(candidate: &Value, target: &Value) -> Self {
        let candidate = LeafBag::new(candidate);
        let target = LeafBag::new(target);

        let target_leaves_hit = target
            .members
            .iter()
            .filter(|leaf| candidate.members.contains(*leaf))
            .count();

        Self {
            score: candidate.score_against(&target),
            candidate_leaves: candidate.len(),
            target_leaves: target.len(),
            target_leaves_hit,
        }
    }

    /// Fraction of candidate leaves found in the target
    #[must_use]
    pub fn candidate_coverage(&self) -> f64 {
        if self.candidate_leaves == 0 {
            0.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            let score = self.score as f64;
            score / count_to_f64(self.candidate_leaves)
        }
    }
}
