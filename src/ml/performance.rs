//! Deterministic physical performance model, used whenever no learned
//! predictor is available.

use serde::Serialize;

use crate::errors::ServiceError;
use crate::ingestion::FeatureVector;

use super::round_dp;

/// Nameplate power of the reference module, in watts.
pub const NOMINAL_MODULE_POWER_W: f64 = 300.0;

/// Confidence attached to learned-model predictions.
pub const LEARNED_CONFIDENCE: f64 = 0.85;

/// Confidence attached to physical-model predictions.
pub const FALLBACK_CONFIDENCE: f64 = 0.75;

/// Multiplicative derating factors applied to nameplate power.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FactorBreakdown {
    pub irradiance_factor: f64,
    pub temperature_factor: f64,
    pub humidity_factor: f64,
    pub cloud_factor: f64,
}

/// A power-output estimate with its confidence and, for the physical model,
/// the factor breakdown it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceEstimate {
    /// Watts, rounded to 2 decimals
    pub predicted_power_w: f64,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factors: Option<FactorBreakdown>,
}

/// Estimates module output from environmental conditions.
///
/// Nameplate power derated by irradiance (linear in irradiance/1000),
/// cell temperature (-0.4%/degC above 25), humidity (up to -10%) and cloud
/// cover (up to -80%).
pub fn physical_estimate(features: &FeatureVector) -> Result<PerformanceEstimate, ServiceError> {
    let irradiance = features.require("irradiance")?;
    let cell_temp = features.require("cell_temp")?;
    let humidity = features.require("humidity")?;
    let cloudiness = features.require("cloudiness")?;

    let factors = FactorBreakdown {
        irradiance_factor: irradiance / 1000.0,
        temperature_factor: 1.0 - 0.004 * (cell_temp - 25.0),
        humidity_factor: 1.0 - (humidity / 100.0) * 0.1,
        cloud_factor: 1.0 - (cloudiness / 100.0) * 0.8,
    };

    let watts = NOMINAL_MODULE_POWER_W
        * factors.irradiance_factor
        * factors.temperature_factor
        * factors.humidity_factor
        * factors.cloud_factor;

    Ok(PerformanceEstimate {
        predicted_power_w: round_dp(watts, 2),
        confidence: FALLBACK_CONFIDENCE,
        factors: Some(factors),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::{normalize, PERFORMANCE_INPUT};
    use serde_json::json;

    fn features(input: serde_json::Value) -> FeatureVector {
        let raw = input.as_object().unwrap().clone();
        normalize(&PERFORMANCE_INPUT, &raw).unwrap().features
    }

    #[test]
    fn standard_test_conditions_yield_nameplate_power() {
        let estimate = physical_estimate(&features(json!({
            "irradiance": 1000,
            "ambient_temp": 5,
            "cell_temp": 25,
            "humidity": 0,
            "wind_speed": 1,
            "cloudiness": 0,
        })))
        .unwrap();

        assert!((estimate.predicted_power_w - 300.0).abs() < 1e-9);
        assert_eq!(estimate.confidence, FALLBACK_CONFIDENCE);
        let factors = estimate.factors.unwrap();
        assert!((factors.irradiance_factor - 1.0).abs() < 1e-9);
        assert!((factors.temperature_factor - 1.0).abs() < 1e-9);
        assert!((factors.humidity_factor - 1.0).abs() < 1e-9);
        assert!((factors.cloud_factor - 1.0).abs() < 1e-9);
    }

    #[test]
    fn derated_conditions_match_hand_computation() {
        // 300 * 0.5 * 0.92 * 0.95 * 0.6 = 78.66
        let estimate = physical_estimate(&features(json!({
            "irradiance": 500,
            "ambient_temp": 25,
            "cell_temp": 45,
            "humidity": 50,
            "wind_speed": 2,
            "cloudiness": 50,
        })))
        .unwrap();

        assert!((estimate.predicted_power_w - 78.66).abs() < 1e-9);
        let factors = estimate.factors.unwrap();
        assert!((factors.temperature_factor - 0.92).abs() < 1e-9);
        assert!((factors.cloud_factor - 0.6).abs() < 1e-9);
    }

    #[test]
    fn defaulted_cell_temp_feeds_the_temperature_factor() {
        // cell_temp defaults to ambient + 20 = 45
        let estimate = physical_estimate(&features(json!({
            "irradiance": 1000,
            "ambient_temp": 25,
            "humidity": 0,
            "wind_speed": 1,
        })))
        .unwrap();

        let factors = estimate.factors.unwrap();
        assert!((factors.temperature_factor - 0.92).abs() < 1e-9);
    }
}
