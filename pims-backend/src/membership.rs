//! Generated identifiers: membership codes shown on cards and storage keys of relations.

use std::collections::HashSet;

use rand::Rng;
use sha2::{Digest as _, Sha256};

const RANDOM_ATTEMPTS: usize = 16;

/// Length of a relation key in hex characters, the same length as a push key.
const RELATION_KEY_LEN: usize = 20;

/// `{prefix}-{year}-{NNNN}` with a random four digit suffix that is not in `taken`.
///
/// When random suffixes keep colliding the lowest free sequence number is used. Only ids in
/// `taken` are avoided, so two clients creating participants at the same time can still pick the
/// same id.
pub fn membership_id(prefix: &str, year: i32, taken: &HashSet<&str>, rng: &mut impl Rng) -> String {
    let candidate = |suffix: u32| format!("{prefix}-{year}-{suffix:04}");
    (0..RANDOM_ATTEMPTS)
        .map(|_| candidate(rng.gen_range(0..10_000)))
        .find(|id| !taken.contains(id.as_str()))
        .unwrap_or_else(|| {
            (1..)
                .map(candidate)
                .find(|id| !taken.contains(id.as_str()))
                .unwrap_or_else(|| candidate(0))
        })
}

/// Storage key of the relation between `left` and `right`.
///
/// Writing the same pair twice hits the same key, so concurrent inserts of one pair collapse into
/// a single record.
#[must_use]
pub fn relation_key(left: &str, right: &str) -> String {
    let digest = Sha256::new()
        .chain_update(left.as_bytes())
        .chain_update([0])
        .chain_update(right.as_bytes())
        .finalize();
    let mut key = format!("{digest:x}");
    key.truncate(RELATION_KEY_LEN);
    key
}
