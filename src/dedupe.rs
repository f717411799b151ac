use std::collections::HashSet;

use crate::model::{Bout, BoutId, BoutKey};

#[derive(Debug, Clone, Default)]
pub struct DedupeOutcome {
    pub canonical: Vec<Bout>,
    pub duplicates: Vec<BoutId>,
}

/// Collapse the bout set to one record per (unordered pair, date) key.
///
/// Precedence is strictly input order: the first record seen for a key is
/// kept and every later record with the same key is reported as a
/// duplicate. Date or any other field never breaks the tie. Callers reject
/// malformed records before this point.
pub fn dedupe_bouts(bouts: &[Bout]) -> DedupeOutcome {
    let mut seen: HashSet<BoutKey> = HashSet::with_capacity(bouts.len());
    let mut out = DedupeOutcome::default();
    for bout in bouts {
        if seen.insert(bout.canonical_key()) {
            out.canonical.push(bout.clone());
        } else {
            out.duplicates.push(bout.id);
        }
    }
    out
}
