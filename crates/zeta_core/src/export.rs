//! Plain-text downloads offered by the front end.

use crate::convergence::ConvergenceParameters;
use crate::simulation::SimulationConfig;

pub const ZEROS_FILE_NAME: &str = "estimated_zeros.csv";
pub const SCRIPT_FILE_NAME: &str = "zeta_simulation.py";

/// One value per line, each terminated by `\n`, printed with round-trip precision.
pub fn zeros_to_csv(zeros: &[f64]) -> String {
    let mut out = String::with_capacity(zeros.len() * 20);
    for zero in zeros {
        out.push_str(&format!("{zero:?}\n"));
    }
    out
}

/// Script template that reproduces the current panel settings.
pub fn script_template(config: &SimulationConfig, params: &ConvergenceParameters) -> String {
    format!(
        r#"#!/usr/bin/env python3
"""Zeta Workbench simulation template."""

import numpy as np

ZERO_COUNT = {zero_count}
PRECISION = {precision:?}
SEED = {seed}
ALPHA = {alpha:?}
BETA = {beta:?}


def main():
    rng = np.random.default_rng(SEED)
    print(f"alpha={{ALPHA}} beta={{BETA}} zeros={{ZERO_COUNT}}")
    noise = rng.uniform(-PRECISION, PRECISION, ZERO_COUNT)
    print(noise)


if __name__ == "__main__":
    main()
"#,
        zero_count = config.zero_count,
        precision = config.precision,
        seed = config.seed,
        alpha = params.alpha,
        beta = params.beta,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_has_one_value_per_line() {
        let csv = zeros_to_csv(&[14.134725141734693, 21.0, 0.1]);
        assert_eq!(csv, "14.134725141734693\n21.0\n0.1\n");
        let parsed: Vec<f64> = csv.lines().map(|l| l.parse().expect("number")).collect();
        assert_eq!(parsed, vec![14.134725141734693, 21.0, 0.1]);
    }

    #[test]
    fn empty_zero_list_exports_empty_file() {
        assert_eq!(zeros_to_csv(&[]), "");
    }

    #[test]
    fn script_embeds_parameters() {
        let script = script_template(&SimulationConfig::default(), &ConvergenceParameters::default());
        assert!(script.contains("ZERO_COUNT = 10"));
        assert!(script.contains("PRECISION = 0.05"));
        assert!(script.contains("SEED = 42"));
        assert!(script.contains("ALPHA = 0.2"));
        assert!(script.contains("BETA = 3.0"));
        assert!(script.contains("print(f\"alpha={ALPHA} beta={BETA} zeros={ZERO_COUNT}\")"));
    }
}
