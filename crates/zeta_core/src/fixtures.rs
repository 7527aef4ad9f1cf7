//! Static demonstration data shown on the verification panels.
//!
//! None of these numbers are produced by an algorithm in this crate.

use serde::Serialize;

/// Imaginary parts of the first ten nontrivial zeros of ζ(s).
pub const KNOWN_ZERO_ORDINATES: [f64; 10] = [
    14.134_725_141_734_693,
    21.022_039_638_771_555,
    25.010_857_580_145_688,
    30.424_876_125_859_513,
    32.935_061_587_739_19,
    37.586_178_158_825_671,
    40.918_719_012_147_495,
    43.327_073_280_914_999,
    48.005_150_881_167_159,
    49.773_832_477_672_302,
];

/// Displayed Witten index.
pub const WITTEN_INDEX: f64 = -0.0028;

/// Displayed spacing correlation against the GUE prediction.
pub const GUE_CORRELATION: f64 = 0.999;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GueTest {
    pub name: &'static str,
    pub p_value: f64,
}

pub const GUE_TESTS: [GueTest; 3] = [
    GueTest {
        name: "nearest-neighbour spacing",
        p_value: 0.87,
    },
    GueTest {
        name: "number variance",
        p_value: 0.92,
    },
    GueTest {
        name: "pair correlation",
        p_value: 0.78,
    },
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationSummary {
    pub correlation: f64,
    pub witten_index: f64,
    pub gue_tests: Vec<GueTest>,
    pub zero_ordinates: Vec<f64>,
}

pub fn verification_summary() -> VerificationSummary {
    VerificationSummary {
        correlation: GUE_CORRELATION,
        witten_index: WITTEN_INDEX,
        gue_tests: GUE_TESTS.to_vec(),
        zero_ordinates: KNOWN_ZERO_ORDINATES.to_vec(),
    }
}
