use once_cell::sync::Lazy;

use crate::model::{Bout, Competitor, FinishCategory};

struct MethodRule {
    keywords: &'static [&'static str],
    category: FinishCategory,
}

/// Ordered classification rules, first match wins. The knockout family sits
/// ahead of the rest, so a method string matching several groups is only
/// ever counted once, under the earliest group. Matching is case-insensitive
/// substring search ("ko" also hits "TKO" and "KO/TKO" variants).
static METHOD_RULES: Lazy<Vec<MethodRule>> = Lazy::new(|| {
    vec![
        MethodRule {
            keywords: &["ko", "tko"],
            category: FinishCategory::Knockout,
        },
        MethodRule {
            keywords: &["sub"],
            category: FinishCategory::Submission,
        },
        MethodRule {
            keywords: &["dec"],
            category: FinishCategory::Decision,
        },
    ]
});

pub fn classify_finish(method: &str) -> Option<FinishCategory> {
    let needle = method.to_lowercase();
    METHOD_RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| needle.contains(k)))
        .map(|rule| rule.category)
}

#[derive(Debug, Default)]
struct Tally {
    total: u32,
    wins: u32,
    losses: u32,
    draws: u32,
    ko_tko: u32,
    submission: u32,
    decision: u32,
    duration: f64,
}

/// Rebuild a competitor's career aggregates from scratch over the canonical
/// bout set. Idempotent and total: the same input always yields the same
/// output, and a competitor with zero bouts comes back all-zero. Incremental
/// patching is deliberately not supported; whenever the canonical set
/// changes, the caller re-runs this and swaps the result in whole.
pub fn recompute(competitor: &Competitor, bouts: &[Bout]) -> Competitor {
    let mut tally = Tally::default();

    for bout in bouts {
        let Some(corner) = bout.corner_of(competitor.id) else {
            continue;
        };
        tally.total += 1;

        match bout.result {
            Some(result) => match result.winning_corner() {
                Some(winner) if winner == corner => {
                    tally.wins += 1;
                    let category = bout.finish_method.as_deref().and_then(classify_finish);
                    match category {
                        Some(FinishCategory::Knockout) => tally.ko_tko += 1,
                        Some(FinishCategory::Submission) => tally.submission += 1,
                        Some(FinishCategory::Decision) => tally.decision += 1,
                        None => {}
                    }
                }
                Some(_) => tally.losses += 1,
                // winning_corner() is None only for a draw.
                None => tally.draws += 1,
            },
            // Unresolved outcome (future or unknown bout): counted in the
            // total but not in win/loss/draw.
            None => {}
        }

        if let Some(secs) = bout.duration_secs {
            tally.duration += secs;
        }
    }

    let total = tally.total;
    Competitor {
        id: competitor.id,
        name: competitor.name.clone(),
        total_bouts: total,
        wins: tally.wins,
        losses: tally.losses,
        draws: tally.draws,
        win_percentage: if total > 0 {
            tally.wins as f64 / total as f64 * 100.0
        } else {
            0.0
        },
        ko_tko_wins: tally.ko_tko,
        submission_wins: tally.submission,
        decision_wins: tally.decision,
        avg_bout_duration_secs: if total > 0 {
            tally.duration / total as f64
        } else {
            0.0
        },
    }
}
