use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::errors::ServiceError;

use super::schema::{NumericDefault, RecordSchema, TextRequirement};

/// A raw record as handed over by the boundary layer: field name -> JSON
/// value. Bulk collaborators (CSV/XLSX parsers) must deliver rows in this
/// shape.
pub type RawRecord = serde_json::Map<String, Value>;

/// Immutable mapping of named numeric measurements. Constructed only by the
/// normalizer; consumed by every estimator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureVector {
    values: BTreeMap<String, f64>,
}

impl FeatureVector {
    pub fn get(&self, field: &str) -> Option<f64> {
        self.values.get(field).copied()
    }

    /// Reads a feature the schema guarantees to be present after
    /// normalization.
    pub fn require(&self, field: &str) -> Result<f64, ServiceError> {
        self.get(field)
            .ok_or_else(|| ServiceError::MissingField(field.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Output of normalization: coerced features, passthrough text fields, and
/// the resolved observation timestamp.
#[derive(Debug, Clone)]
pub struct NormalizedRecord {
    pub features: FeatureVector,
    text: BTreeMap<String, String>,
    pub timestamp: DateTime<Utc>,
}

impl NormalizedRecord {
    pub fn text(&self, field: &str) -> Option<&str> {
        self.text.get(field).map(String::as_str)
    }
}

/// Validates and coerces `raw` against `schema`, defaulting the observation
/// timestamp to the current instant.
pub fn normalize(schema: &RecordSchema, raw: &RawRecord) -> Result<NormalizedRecord, ServiceError> {
    normalize_at(schema, raw, Utc::now())
}

/// Validates and coerces `raw` against `schema`. Pure: `now` is only used
/// when the record carries no timestamp of its own.
///
/// Required fields are checked in schema order and the first missing one is
/// reported; use [`RecordSchema::missing_columns`] for whole-batch column
/// validation.
pub fn normalize_at(
    schema: &RecordSchema,
    raw: &RawRecord,
    now: DateTime<Utc>,
) -> Result<NormalizedRecord, ServiceError> {
    let mut text = BTreeMap::new();
    for field in schema.text_fields {
        match raw.get(field.name) {
            Some(value) => {
                text.insert(field.name.to_string(), coerce_text(field.name, value)?);
            }
            None => match field.requirement {
                TextRequirement::Required => {
                    return Err(ServiceError::MissingField(field.name.to_string()));
                }
                TextRequirement::Defaulted(default) => {
                    text.insert(field.name.to_string(), default.to_string());
                }
                TextRequirement::Optional => {}
            },
        }
    }

    let mut values = BTreeMap::new();
    for field in schema.numeric_fields {
        match raw.get(field.name) {
            Some(value) => {
                values.insert(field.name.to_string(), coerce_numeric(field.name, value)?);
            }
            None => match field.default {
                None => return Err(ServiceError::MissingField(field.name.to_string())),
                Some(NumericDefault::Const(default)) => {
                    values.insert(field.name.to_string(), default);
                }
                Some(NumericDefault::Offset { field: base, delta }) => {
                    let base_value = values.get(base).copied().ok_or_else(|| {
                        ServiceError::InternalError(format!(
                            "Schema {}: default for {} references unresolved field {}",
                            schema.name, field.name, base
                        ))
                    })?;
                    values.insert(field.name.to_string(), base_value + delta);
                }
            },
        }
    }

    let timestamp = match raw.get("timestamp") {
        Some(value) => parse_timestamp(value)?,
        None => now,
    };

    Ok(NormalizedRecord {
        features: FeatureVector { values },
        text,
        timestamp,
    })
}

fn coerce_numeric(field: &str, value: &Value) -> Result<f64, ServiceError> {
    let coerced = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    coerced.ok_or_else(|| ServiceError::TypeCoercion {
        field: field.to_string(),
        value: value.to_string(),
    })
}

fn coerce_text(field: &str, value: &Value) -> Result<String, ServiceError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        // Spreadsheet sources routinely deliver identifiers as numbers
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(ServiceError::TypeCoercion {
            field: field.to_string(),
            value: value.to_string(),
        }),
    }
}

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

fn parse_timestamp(value: &Value) -> Result<DateTime<Utc>, ServiceError> {
    let raw = match value {
        Value::String(s) => s.as_str(),
        _ => return Err(ServiceError::InvalidTimestamp(value.to_string())),
    };

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }
    Err(ServiceError::InvalidTimestamp(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::schema::{ANOMALY_INPUT, ENVIRONMENTAL_READING, PERFORMANCE_INPUT};
    use assert_matches::assert_matches;
    use serde_json::json;

    fn raw(value: Value) -> RawRecord {
        value.as_object().expect("test input must be an object").clone()
    }

    fn performance_input() -> RawRecord {
        raw(json!({
            "irradiance": 800,
            "ambient_temp": 28.5,
            "humidity": 65,
            "wind_speed": 3.2,
        }))
    }

    #[test]
    fn first_missing_required_field_is_named() {
        let mut record = performance_input();
        record.remove("ambient_temp");
        record.remove("humidity");

        let err = normalize(&PERFORMANCE_INPUT, &record).unwrap_err();
        assert_matches!(err, ServiceError::MissingField(field) if field == "ambient_temp");
    }

    #[test]
    fn cell_temp_defaults_to_ambient_plus_twenty() {
        let record = normalize(&PERFORMANCE_INPUT, &performance_input()).unwrap();
        assert_eq!(record.features.get("cell_temp"), Some(48.5));
        assert_eq!(record.features.get("cloudiness"), Some(0.0));
    }

    #[test]
    fn explicit_cell_temp_wins_over_default() {
        let mut input = performance_input();
        input.insert("cell_temp".to_string(), json!(55.0));
        let record = normalize(&PERFORMANCE_INPUT, &input).unwrap();
        assert_eq!(record.features.get("cell_temp"), Some(55.0));
    }

    #[test]
    fn numeric_strings_are_coerced() {
        let mut input = performance_input();
        input.insert("irradiance".to_string(), json!(" 950.5 "));
        let record = normalize(&PERFORMANCE_INPUT, &input).unwrap();
        assert_eq!(record.features.get("irradiance"), Some(950.5));
    }

    #[test]
    fn non_numeric_value_fails_coercion() {
        let mut input = performance_input();
        input.insert("humidity".to_string(), json!("humid"));
        let err = normalize(&PERFORMANCE_INPUT, &input).unwrap_err();
        assert_matches!(err, ServiceError::TypeCoercion { field, .. } if field == "humidity");
    }

    #[test]
    fn null_is_not_a_valid_value() {
        let mut input = performance_input();
        input.insert("wind_speed".to_string(), Value::Null);
        assert_matches!(
            normalize(&PERFORMANCE_INPUT, &input),
            Err(ServiceError::TypeCoercion { .. })
        );
    }

    #[test]
    fn location_id_gets_schema_default() {
        let record = normalize(
            &ENVIRONMENTAL_READING,
            &raw(json!({
                "ambient_temperature": 30,
                "irradiance": 900,
                "humidity": 70,
                "wind_speed": 1.5,
            })),
        )
        .unwrap();
        assert_eq!(record.text("location_id"), Some("default"));
        assert_eq!(record.features.get("precipitation"), Some(0.0));
    }

    #[test]
    fn anomaly_context_defaults_are_climate_neutral() {
        let record = normalize(
            &ANOMALY_INPUT,
            &raw(json!({
                "module_id": "PV-001",
                "voltage_oc": 38.2,
                "voltage_mp": 31.0,
                "current_mp": 8.1,
                "current_sc": 8.9,
                "power_max": 250.0,
                "efficiency": 0.17,
                "cell_temp": 45.0,
            })),
        )
        .unwrap();
        assert_eq!(record.features.get("ambient_temp"), Some(25.0));
        assert_eq!(record.features.get("irradiance"), Some(1000.0));
        assert_eq!(record.features.get("humidity"), Some(50.0));
        assert_eq!(record.features.get("wind_speed"), Some(2.0));
        assert_eq!(record.features.get("age_days"), Some(365.0));
    }

    #[test]
    fn numeric_module_ids_are_accepted_as_text() {
        let mut input = raw(json!({
            "module_id": 17,
            "voltage_oc": 38.2,
            "voltage_mp": 31.0,
            "current_mp": 8.1,
            "current_sc": 8.9,
            "power_max": 250.0,
            "efficiency": 0.17,
            "cell_temp": 45.0,
        }));
        let record = normalize(&ANOMALY_INPUT, &input).unwrap();
        assert_eq!(record.text("module_id"), Some("17"));

        input.insert("module_id".to_string(), json!([1, 2]));
        assert_matches!(
            normalize(&ANOMALY_INPUT, &input),
            Err(ServiceError::TypeCoercion { .. })
        );
    }

    #[test]
    fn iso_timestamps_are_parsed_and_default_to_ingestion_time() {
        let now = Utc::now();

        let mut input = performance_input();
        let record = normalize_at(&PERFORMANCE_INPUT, &input, now).unwrap();
        assert_eq!(record.timestamp, now);

        input.insert("timestamp".to_string(), json!("2025-06-15T10:30:00Z"));
        let record = normalize_at(&PERFORMANCE_INPUT, &input, now).unwrap();
        assert_eq!(record.timestamp.to_rfc3339(), "2025-06-15T10:30:00+00:00");

        input.insert("timestamp".to_string(), json!("2025-06-15T10:30:00"));
        let record = normalize_at(&PERFORMANCE_INPUT, &input, now).unwrap();
        assert_eq!(record.timestamp.to_rfc3339(), "2025-06-15T10:30:00+00:00");

        input.insert("timestamp".to_string(), json!("not-a-date"));
        assert_matches!(
            normalize_at(&PERFORMANCE_INPUT, &input, now),
            Err(ServiceError::InvalidTimestamp(_))
        );
    }
}
