use crate::complex::Complex;

/// Squared escape threshold. An orbit has escaped once `|z| > 2`.
pub const ESCAPE_RADIUS_SQ: f64 = 4.0;

/// The outcome of iterating a single point.
///
/// `escaped` is set only when the orbit ended strictly outside the radius-2
/// circle. A bounded point usually reports the full budget; one whose orbit
/// lands exactly on the circle stops early without escaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscapeResult {
    pub iterations: u32,
    pub escaped: bool,
}

impl EscapeResult {
    /// The result for a point that used up the whole budget.
    #[inline]
    pub fn bounded(step_budget: u32) -> Self {
        Self {
            iterations: step_budget,
            escaped: false,
        }
    }
}

/// Escape-time iteration over the complex plane.
///
/// The renderer is generic over this trait so the per-pixel call is
/// statically dispatched and can be inlined into the row loop.
pub trait EscapeTime {
    /// Iterate `c` and report when (or whether) its orbit escaped.
    fn evaluate(&self, c: Complex) -> EscapeResult;

    /// The number of steps each point is allowed before it counts as bounded.
    fn step_budget(&self) -> u32;
}
