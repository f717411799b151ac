use crate::error::CoreError;

/// American odds quote to implied win probability.
///
/// Positive quotes price an underdog, zero or negative quotes a favorite.
/// Total for all finite inputs; both denominators are at least 100.
pub fn odds_to_probability(odds: f64) -> f64 {
    if odds > 0.0 {
        100.0 / (odds + 100.0)
    } else {
        odds.abs() / (odds.abs() + 100.0)
    }
}

/// Implied win probability back to an American odds quote.
///
/// Fails on a probability of exactly 0 or 1: the quote would divide by
/// zero, and a degenerate probability at this point means bad data
/// upstream, so it is surfaced rather than clamped.
pub fn probability_to_odds(probability: f64) -> Result<f64, CoreError> {
    if probability <= 0.0 || probability >= 1.0 {
        return Err(CoreError::DegenerateProbability(probability));
    }
    let odds = if probability >= 0.5 {
        -(probability / (1.0 - probability)) * 100.0
    } else {
        ((1.0 - probability) / probability) * 100.0
    };
    Ok(odds)
}
