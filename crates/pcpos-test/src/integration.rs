//! End-to-end Integration Test Suite
//!
//! Runs the companion through seeded scenarios and checks the flow across
//! every component:
//! - Emotion to pattern to body motion
//! - Boundary collisions and floor contacts reaching the haptic callbacks
//! - Lock screen flow redistributing symbols
//! - Per-frame invariants under jitter and stalls

use std::time::Duration;

use pcpos_core::MovementPattern;
use pcpos_runtime::CompanionConfig;

use crate::simulator::{scenarios, CompanionSimulator, FrameJitterModel, SimulationResult};

// ============================================================================
// INTEGRATION TEST CONFIGURATION
// ============================================================================

/// Integration suite configuration
#[derive(Clone, Debug)]
pub struct IntegrationTestConfig {
    /// Simulated wall time per scenario
    pub duration: Duration,
    /// Seeds to run each scenario with
    pub seeds: Vec<u64>,
}

impl Default for IntegrationTestConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(6),
            seeds: vec![1, 2, 3],
        }
    }
}

impl IntegrationTestConfig {
    /// One short run per scenario
    pub fn minimal() -> Self {
        Self {
            duration: Duration::from_secs(3),
            seeds: vec![1],
        }
    }

    pub fn standard() -> Self {
        Self::default()
    }

    /// Long runs over many seeds
    pub fn stress() -> Self {
        Self {
            duration: Duration::from_secs(30),
            seeds: (1..=8).collect(),
        }
    }
}

/// Outcome of one scenario run
#[derive(Debug)]
pub struct ScenarioRun {
    pub name: &'static str,
    pub seed: u64,
    pub result: SimulationResult,
}

/// Suite result
#[derive(Debug, Default)]
pub struct IntegrationTestResult {
    pub runs: Vec<ScenarioRun>,
}

impl IntegrationTestResult {
    /// Every run kept every per-frame invariant
    pub fn passed(&self) -> bool {
        self.runs.iter().all(|run| run.result.invariants_hold())
    }

    /// Names of runs that broke an invariant
    pub fn failures(&self) -> Vec<(&'static str, u64)> {
        self.runs
            .iter()
            .filter(|run| !run.result.invariants_hold())
            .map(|run| (run.name, run.seed))
            .collect()
    }

    pub fn total_ticks(&self) -> u64 {
        self.runs.iter().map(|run| run.result.total_ticks).sum()
    }
}

type ScenarioFactory = fn(u64) -> CompanionSimulator;

const SCENARIOS: [(&str, ScenarioFactory); 4] = [
    ("excited_burst", scenarios::excited_burst),
    ("calm_evening", scenarios::calm_evening),
    ("unlock_flow", scenarios::unlock_flow),
    ("restless_stalls", scenarios::restless_stalls),
];

/// Run every scenario with every seed
pub fn run_suite(config: &IntegrationTestConfig) -> IntegrationTestResult {
    let mut result = IntegrationTestResult::default();
    for &(name, factory) in &SCENARIOS {
        for &seed in &config.seeds {
            let mut sim = factory(seed);
            result.runs.push(ScenarioRun {
                name,
                seed,
                result: sim.run(config.duration),
            });
        }
    }
    result
}

// ============================================================================
// SCENARIO CHECKS
// ============================================================================

/// Energetic bouncing for a few seconds
pub fn test_energetic_bounce() -> SimulationResult {
    scenarios::excited_burst(7).run(Duration::from_secs(6))
}

/// Full lock screen flow
pub fn test_unlock_flow() -> SimulationResult {
    scenarios::unlock_flow(7).run(Duration::from_secs(4))
}

/// Long gaps between frames never reach the timeline uncapped
pub fn test_stall_capping() -> SimulationResult {
    let mut sim = CompanionSimulator::new(
        CompanionConfig::default(),
        FrameJitterModel::stalling(Duration::from_millis(16)),
        11,
    );
    sim.run(Duration::from_secs(20))
}
