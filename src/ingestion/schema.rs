//! Declarative record schemas: one table of field -> requirement per record
//! kind. The normalizer interprets these; nothing else defines defaults.

/// Default for an optional numeric field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericDefault {
    Const(f64),
    /// Value of another (required) field plus a fixed offset.
    Offset { field: &'static str, delta: f64 },
}

/// A numeric field of a record schema. `default: None` means required.
#[derive(Debug, Clone, Copy)]
pub struct NumericField {
    pub name: &'static str,
    pub default: Option<NumericDefault>,
}

/// Requirement of a text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRequirement {
    Required,
    Defaulted(&'static str),
    Optional,
}

#[derive(Debug, Clone, Copy)]
pub struct TextField {
    pub name: &'static str,
    pub requirement: TextRequirement,
}

/// Schema of one raw record kind.
#[derive(Debug, Clone, Copy)]
pub struct RecordSchema {
    pub name: &'static str,
    pub text_fields: &'static [TextField],
    pub numeric_fields: &'static [NumericField],
}

impl RecordSchema {
    /// Required column names (text and numeric) missing from `columns`,
    /// in schema order. Used by bulk ingestion to reject a whole batch
    /// before any row is processed.
    pub fn missing_columns(&self, columns: &[String]) -> Vec<String> {
        let mut missing = Vec::new();
        for field in self.text_fields {
            if field.requirement == TextRequirement::Required
                && !columns.iter().any(|c| c == field.name)
            {
                missing.push(field.name.to_string());
            }
        }
        for field in self.numeric_fields {
            if field.default.is_none() && !columns.iter().any(|c| c == field.name) {
                missing.push(field.name.to_string());
            }
        }
        missing
    }
}

const fn required(name: &'static str) -> NumericField {
    NumericField {
        name,
        default: None,
    }
}

const fn defaulted(name: &'static str, value: f64) -> NumericField {
    NumericField {
        name,
        default: Some(NumericDefault::Const(value)),
    }
}

/// Stored per-module electrical/thermal telemetry.
pub const SOLAR_READING: RecordSchema = RecordSchema {
    name: "solar_reading",
    text_fields: &[TextField {
        name: "module_id",
        requirement: TextRequirement::Required,
    }],
    numeric_fields: &[
        required("open_circuit_voltage"),
        required("max_power_voltage"),
        required("max_power_current"),
        required("short_circuit_current"),
        required("max_power"),
        required("efficiency"),
        required("cell_temperature"),
    ],
};

/// Stored ambient conditions.
pub const ENVIRONMENTAL_READING: RecordSchema = RecordSchema {
    name: "environmental_reading",
    text_fields: &[TextField {
        name: "location_id",
        requirement: TextRequirement::Defaulted("default"),
    }],
    numeric_fields: &[
        required("ambient_temperature"),
        required("irradiance"),
        required("humidity"),
        required("wind_speed"),
        defaulted("precipitation", 0.0),
        defaulted("cloudiness", 0.0),
    ],
};

/// Input to the performance estimator. Cell temperature defaults to
/// ambient + 20 degC when the module sensor is absent.
pub const PERFORMANCE_INPUT: RecordSchema = RecordSchema {
    name: "performance_input",
    text_fields: &[
        TextField {
            name: "module_id",
            requirement: TextRequirement::Optional,
        },
        TextField {
            name: "location_id",
            requirement: TextRequirement::Optional,
        },
    ],
    numeric_fields: &[
        required("irradiance"),
        required("ambient_temp"),
        required("humidity"),
        required("wind_speed"),
        NumericField {
            name: "cell_temp",
            default: Some(NumericDefault::Offset {
                field: "ambient_temp",
                delta: 20.0,
            }),
        },
        defaulted("cloudiness", 0.0),
        defaulted("precipitation", 0.0),
    ],
};

/// Input to the anomaly classifier. Environmental context defaults to
/// climate-neutral constants so module electrical data alone is enough.
pub const ANOMALY_INPUT: RecordSchema = RecordSchema {
    name: "anomaly_input",
    text_fields: &[TextField {
        name: "module_id",
        requirement: TextRequirement::Required,
    }],
    numeric_fields: &[
        required("voltage_oc"),
        required("voltage_mp"),
        required("current_mp"),
        required("current_sc"),
        required("power_max"),
        required("efficiency"),
        required("cell_temp"),
        defaulted("ambient_temp", 25.0),
        defaulted("irradiance", 1000.0),
        defaulted("humidity", 50.0),
        defaulted("wind_speed", 2.0),
        defaulted("age_days", 365.0),
    ],
};
