use crate::model::{Bout, Competitor, CompetitorId};

/// How many most-recent bouts feed the recent-form rate.
pub const RECENT_WINDOW: usize = 5;

#[derive(Debug, Clone, Copy, Default)]
pub struct SideFeatures {
    pub win_percentage: f64,
    pub total_bouts: f64,
    pub ko_rate: f64,
    pub sub_rate: f64,
    pub recent_form: f64,
}

/// Fixed, request-scoped feature record for one matchup. Differentials are
/// always first minus second; the scoring weights rely on that sign
/// convention.
#[derive(Debug, Clone, Copy)]
pub struct FeatureVector {
    pub first: SideFeatures,
    pub second: SideFeatures,
    pub win_percentage_diff: f64,
    pub experience_diff: f64,
    pub ko_rate_diff: f64,
}

pub fn extract(first: &Competitor, second: &Competitor, canonical: &[Bout]) -> FeatureVector {
    let first_side = side_features(first, canonical);
    let second_side = side_features(second, canonical);
    FeatureVector {
        first: first_side,
        second: second_side,
        win_percentage_diff: first_side.win_percentage - second_side.win_percentage,
        experience_diff: first_side.total_bouts - second_side.total_bouts,
        ko_rate_diff: first_side.ko_rate - second_side.ko_rate,
    }
}

fn side_features(competitor: &Competitor, canonical: &[Bout]) -> SideFeatures {
    let total = competitor.total_bouts as f64;
    let rate = |wins: u32| {
        if competitor.total_bouts > 0 {
            wins as f64 / total * 100.0
        } else {
            0.0
        }
    };
    SideFeatures {
        win_percentage: competitor.win_percentage,
        total_bouts: total,
        ko_rate: rate(competitor.ko_tko_wins),
        sub_rate: rate(competitor.submission_wins),
        recent_form: recent_form(competitor.id, canonical),
    }
}

/// Win rate over the competitor's most recent bouts across both corners,
/// capped at [`RECENT_WINDOW`]. A shorter history uses whatever is there;
/// no history at all is a flat 0.
fn recent_form(id: CompetitorId, canonical: &[Bout]) -> f64 {
    let mut recent: Vec<&Bout> = canonical.iter().filter(|b| b.involves(id)).collect();
    recent.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
    recent.truncate(RECENT_WINDOW);
    if recent.is_empty() {
        return 0.0;
    }
    let wins = recent.iter().filter(|b| b.won_by(id)).count();
    wins as f64 / recent.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BoutResult;

    fn win_bout(id: u64, me: CompetitorId, opponent: CompetitorId, date: &str, won: bool) -> Bout {
        Bout {
            id,
            first_id: me,
            second_id: opponent,
            date: date.parse().unwrap(),
            result: Some(if won {
                BoutResult::FirstCorner
            } else {
                BoutResult::SecondCorner
            }),
            finish_method: None,
            finish_round: None,
            duration_secs: None,
            first_odds: None,
            second_odds: None,
            first_sig_strikes: None,
            second_sig_strikes: None,
            first_takedowns: None,
            second_takedowns: None,
        }
    }

    fn competitor_with(total: u32, wins: u32, ko: u32, sub: u32) -> Competitor {
        Competitor {
            total_bouts: total,
            wins,
            win_percentage: if total > 0 {
                wins as f64 / total as f64 * 100.0
            } else {
                0.0
            },
            ko_tko_wins: ko,
            submission_wins: sub,
            ..Competitor::new(1, "A")
        }
    }

    #[test]
    fn recent_form_uses_latest_five_only() {
        // Seven bouts: the two oldest are wins, the five newest are 2-3.
        let mut bouts = vec![
            win_bout(1, 1, 2, "2022-01-01", true),
            win_bout(2, 1, 3, "2022-02-01", true),
        ];
        let newer = [
            ("2023-01-01", true),
            ("2023-02-01", false),
            ("2023-03-01", true),
            ("2023-04-01", false),
            ("2023-05-01", false),
        ];
        for (idx, (date, won)) in newer.iter().enumerate() {
            bouts.push(win_bout(10 + idx as u64, 1, 4, date, *won));
        }
        assert!((recent_form(1, &bouts) - 2.0 / 5.0).abs() < 1e-9);
    }

    #[test]
    fn recent_form_short_history_uses_what_exists() {
        let bouts = vec![
            win_bout(1, 1, 2, "2023-01-01", true),
            win_bout(2, 1, 3, "2023-02-01", true),
            win_bout(3, 1, 4, "2023-03-01", false),
        ];
        assert!((recent_form(1, &bouts) - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(recent_form(99, &bouts), 0.0);
    }

    #[test]
    fn differentials_are_first_minus_second() {
        let a = competitor_with(10, 8, 5, 1);
        let b = competitor_with(6, 3, 0, 2);
        let features = extract(&a, &b, &[]);
        assert!((features.win_percentage_diff - (80.0 - 50.0)).abs() < 1e-9);
        assert!((features.experience_diff - 4.0).abs() < 1e-9);
        assert!((features.ko_rate_diff - 50.0).abs() < 1e-9);
        assert!((features.first.sub_rate - 10.0).abs() < 1e-9);
        assert!((features.second.sub_rate - (2.0 / 6.0 * 100.0)).abs() < 1e-9);
    }

    #[test]
    fn zero_history_side_is_all_zero() {
        let a = competitor_with(0, 0, 0, 0);
        let b = competitor_with(10, 5, 2, 1);
        let features = extract(&a, &b, &[]);
        assert_eq!(features.first.win_percentage, 0.0);
        assert_eq!(features.first.ko_rate, 0.0);
        assert_eq!(features.first.recent_form, 0.0);
        assert!(features.experience_diff < 0.0);
    }
}
