use thiserror::Error;

/// Errors the core engines surface to callers. Degenerate-but-expected
/// inputs (zero bouts, missing odds) are not errors; they resolve to
/// neutral defaults or get filtered upstream.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{0} not found")]
    NotFound(String),

    /// A probability of exactly 0 or 1 has no finite American-odds quote.
    /// Clamping would hide a data-quality problem upstream, so this fails.
    #[error("probability {0} cannot be converted to odds")]
    DegenerateProbability(f64),
}
