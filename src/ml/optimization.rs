//! Multi-objective configuration optimization: Pareto-front candidate
//! selection for learned optimizers, and the deterministic heuristic used
//! when no optimizer artifact is available.

use serde::{Deserialize, Serialize};

use super::round_dp;

/// One row of environmental history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalSample {
    pub ambient_temperature: f64,
    pub irradiance: f64,
    pub humidity: f64,
}

/// Environmental history over which a configuration is optimized.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentalHistory {
    rows: Vec<EnvironmentalSample>,
}

impl EnvironmentalHistory {
    pub fn new(rows: Vec<EnvironmentalSample>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[EnvironmentalSample] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column-wise means; `None` for an empty history.
    pub fn means(&self) -> Option<EnvironmentalMeans> {
        if self.rows.is_empty() {
            return None;
        }
        let n = self.rows.len() as f64;
        let (temp, irr, hum) = self.rows.iter().fold((0.0, 0.0, 0.0), |acc, row| {
            (
                acc.0 + row.ambient_temperature,
                acc.1 + row.irradiance,
                acc.2 + row.humidity,
            )
        });
        Some(EnvironmentalMeans {
            ambient_temperature: temp / n,
            irradiance: irr / n,
            humidity: hum / n,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvironmentalMeans {
    pub ambient_temperature: f64,
    pub irradiance: f64,
    pub humidity: f64,
}

/// Search-size knobs passed to a learned optimizer. Kept small so requests
/// answer quickly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchKnobs {
    pub population_size: usize,
    pub generations: usize,
}

impl Default for SearchKnobs {
    fn default() -> Self {
        Self {
            population_size: 20,
            generations: 10,
        }
    }
}

/// A named module configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleConfiguration {
    /// Degrees from horizontal
    pub tilt_angle: f64,
    /// Degrees from north
    pub azimuth_angle: f64,
    /// 0 = fixed, 1 = single-axis tracking
    pub tracking_mode: u8,
    /// Days between cleanings
    pub cleaning_frequency: f64,
    /// 0 = passive, 1 = active cooling
    pub cooling_system: u8,
    pub mppt_voltage: f64,
    pub inverter_efficiency: f64,
}

impl ModuleConfiguration {
    /// Human-readable installation advice derived from the configuration.
    pub fn advice(&self) -> Vec<String> {
        vec![
            format!("Set tilt angle to {:.1} degrees", self.tilt_angle),
            if self.tracking_mode > 0 {
                "Tracking system recommended".to_string()
            } else {
                "Fixed mounting recommended".to_string()
            },
            format!("Clean modules every {:.0} days", self.cleaning_frequency),
            if self.cooling_system > 0 {
                "Active cooling system recommended".to_string()
            } else {
                "Passive cooling is sufficient".to_string()
            },
        ]
    }
}

/// One candidate solution: a configuration and its raw objective vector
/// (energy efficiency, lifespan in years, negated cost, kg CO2 avoided).
#[derive(Debug, Clone, PartialEq)]
pub struct ParetoCandidate {
    pub parameters: ModuleConfiguration,
    pub objectives: [f64; 4],
}

/// Objective scores as reported to callers: rounded, cost as an absolute
/// value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ObjectiveScores {
    pub energy_efficiency: f64,
    /// Years
    pub expected_lifespan: f64,
    pub total_cost: f64,
    /// kg CO2
    pub co2_avoided: f64,
}

impl ObjectiveScores {
    pub fn from_objectives(objectives: [f64; 4]) -> Self {
        Self {
            energy_efficiency: round_dp(objectives[0], 4),
            expected_lifespan: round_dp(objectives[1], 1),
            total_cost: round_dp(objectives[2].abs(), 2),
            co2_avoided: round_dp(objectives[3], 2),
        }
    }
}

/// Objective vector attached to heuristic configurations.
pub const FALLBACK_OBJECTIVES: [f64; 4] = [0.18, 25.0, -15000.0, 50000.0];

/// Deterministic configuration heuristic over environmental means.
///
/// Hotter sites tilt further and get active cooling; humid sites are
/// cleaned more often, with a 7-day floor.
pub fn heuristic_candidate(means: &EnvironmentalMeans) -> ParetoCandidate {
    let parameters = ModuleConfiguration {
        tilt_angle: 0.5 * means.ambient_temperature + 10.0,
        azimuth_angle: 180.0,
        tracking_mode: 1,
        cleaning_frequency: (30.0 - means.humidity / 10.0).max(7.0),
        cooling_system: u8::from(means.ambient_temperature > 30.0),
        mppt_voltage: 32.0,
        inverter_efficiency: 0.95,
    };

    ParetoCandidate {
        parameters,
        objectives: FALLBACK_OBJECTIVES,
    }
}

/// Selects the candidate maximizing the unweighted sum of its objectives.
/// Ties keep the first-encountered candidate.
pub fn select_best(front: &[ParetoCandidate]) -> Option<&ParetoCandidate> {
    let mut best: Option<(&ParetoCandidate, f64)> = None;
    for candidate in front {
        let score: f64 = candidate.objectives.iter().sum();
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((candidate, score)),
        }
    }
    best.map(|(candidate, _)| candidate)
}
