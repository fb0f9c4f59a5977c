//! Approximate matching of captured pulse timings against known codes.

use crate::codes::Code;

/// Maximum per-sample deviation in microseconds for two signals to match.
pub const TOLERANCE: u16 = 100;

/// True when `samples` has the same length as `reference` and no sample is
/// more than `tolerance` away from its reference.
pub fn matches(reference: &[u16], samples: &[u16], tolerance: u16) -> bool {
    reference.len() == samples.len()
        && reference
            .iter()
            .zip(samples)
            .all(|(r, s)| r.abs_diff(*s) <= tolerance)
}

/// Index of the first code in table order that matches `samples`.
pub fn classify(codes: &[Code], samples: &[u16], tolerance: u16) -> Option<usize> {
    codes
        .iter()
        .position(|code| matches(&code.samples, samples, tolerance))
}
