use std::collections::HashMap;

use serde::{Deserialize, Serialize};

const BASE_POINTS: usize = 14;
const NEUTRAL_OVERRIDE: f64 = 0.5;

// Fixed placeholders; neither is computed from its series yet.
const BASE_SUMMARY: f64 = 102.3;
const SCENARIO_SUMMARY: f64 = 108.7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub forecast: Vec<f64>,
    pub summary: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResponse {
    pub base: ScenarioResult,
    pub scenario: ScenarioResult,
}

pub fn base_series() -> Vec<f64> {
    (0..BASE_POINTS).map(|i| 100.0 + (i as f64 * 0.4).sin() * 15.0).collect()
}

pub fn scale_factor(overrides: &HashMap<String, f64>) -> f64 {
    let get = |k: &str| overrides.get(k).copied().unwrap_or(NEUTRAL_OVERRIDE);
    1.0 + 0.1 * get("price") + 0.05 * get("volume")
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// What-if comparison against a synthesized baseline. The base run id is
/// accepted for the wire contract but not looked up.
pub fn evaluate(_base_run_id: &str, overrides: &HashMap<String, f64>) -> ScenarioResponse {
    let base = base_series();
    let scale = scale_factor(overrides);
    let scenario = base.iter().map(|v| round2(v * scale)).collect();

    ScenarioResponse {
        base: ScenarioResult { name: "Base".into(), forecast: base, summary: BASE_SUMMARY },
        scenario: ScenarioResult { name: "What-if".into(), forecast: scenario, summary: SCENARIO_SUMMARY },
    }
}
