//! Experiment plan files
//!
//! Plans are written in TOML and converted into the domain types of
//! [`crate::experiment`] and [`crate::models`]. The file layout mirrors the
//! plan:
//!
//! ```toml
//! project_name = "Yggdrasil"
//! chunk_size = 300
//! output_dir = "runs"
//! speed = 2.0
//!
//! [reload]
//! model = "Yggdrasil"
//! parameters = "Yggdrasil"
//! initial_conditions = "Steady_State_Manual_Mode"
//!
//! [[signals]]
//! name = "D-20VA006:Pressure"
//! unit = "barg"
//!
//! [[states]]
//! state = 0
//! application = "Hugin A"
//! sample_minutes = 2
//! post_application = "Hugin B"
//! post_minutes = 180
//!
//! [states.adjustment]
//! parameter = "D-13HCV2627:TargetPosition"
//! kind = "multiplicative"
//! value = 1.1
//!
//! [[states]]
//! state = 1
//! reload = true
//! application = "Hugin A"
//! sample_minutes = 1
//! post_minutes = 1
//! ```
//!
//! An optional `[plant]` section describes the in-process
//! [`FirstOrderPlant`] used when no external simulator is attached.
//! An optional `[csv]` section sets `delimiter` and `precision`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::experiment::{ExperimentError, ExperimentPlan, PreAction, ReloadTarget, StateStep, DEFAULT_CHUNK_SIZE};
use crate::models::{FirstOrderLag, FirstOrderPlant};
use crate::output::export::CsvConfig;
use crate::sampler::{Adjustment, ParameterAdjustment, UnitConversion};
use crate::simulation::Signal;

/// Errors raised while reading a plan file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read plan file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed plan file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid plan file: {0}")]
    Invalid(String),
}

// =================================================================================================
// File sections
// =================================================================================================

/// Top level of a plan file
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanFile {
    pub project_name: String,

    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    #[serde(default)]
    pub speed: Option<f64>,

    /// Target of every `reload = true` state
    #[serde(default)]
    pub reload: Option<ReloadSection>,

    #[serde(default)]
    pub csv: Option<CsvSection>,

    pub signals: Vec<Signal>,

    #[serde(default)]
    pub states: Vec<StateSection>,

    #[serde(default)]
    pub plant: Option<PlantSection>,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReloadSection {
    pub model: String,
    pub parameters: String,
    pub initial_conditions: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CsvSection {
    #[serde(default)]
    pub delimiter: Option<char>,

    #[serde(default)]
    pub precision: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StateSection {
    pub state: u32,

    #[serde(default)]
    pub reload: bool,

    pub application: String,

    pub sample_minutes: u32,

    #[serde(default)]
    pub adjustment: Option<AdjustmentSection>,

    #[serde(default)]
    pub post_application: Option<String>,

    #[serde(default)]
    pub post_minutes: u32,
}

/// How the adjustment value is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdjustmentKind {
    Multiplicative,
    AdditivePercent,
    Additive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConversionKind {
    #[default]
    None,
    KelvinCelsius,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdjustmentSection {
    pub parameter: String,
    pub kind: AdjustmentKind,
    pub value: f64,

    #[serde(default)]
    pub conversion: ConversionKind,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlantSection {
    #[serde(default = "default_plant_name")]
    pub name: String,

    #[serde(default)]
    pub applications: Vec<PlantApplicationSection>,
}

fn default_plant_name() -> String {
    "FirstOrderPlant".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlantApplicationSection {
    pub name: String,

    #[serde(default)]
    pub parameters: BTreeMap<String, f64>,

    #[serde(default)]
    pub lags: Vec<LagSection>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LagSection {
    pub input: String,
    pub output: String,
    pub gain: f64,
    pub time_constant: f64,

    #[serde(default)]
    pub bias: f64,
}

// =================================================================================================
// Conversion into domain types
// =================================================================================================

impl AdjustmentSection {
    pub fn to_adjustment(&self) -> ParameterAdjustment {
        let adjustment = match self.kind {
            AdjustmentKind::Multiplicative => Adjustment::Multiplicative(self.value),
            AdjustmentKind::AdditivePercent => Adjustment::AdditivePercent(self.value),
            AdjustmentKind::Additive => Adjustment::Additive(self.value),
        };
        let conversion = match self.conversion {
            ConversionKind::None => UnitConversion::None,
            ConversionKind::KelvinCelsius => UnitConversion::KelvinCelsius,
        };
        ParameterAdjustment::new(self.parameter.clone(), adjustment).with_conversion(conversion)
    }
}

impl PlanFile {
    /// Parse a plan from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a plan file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Experiment plan described by the file (not yet validated)
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] when a state asks for `reload = true` but the
    /// file has no `[reload]` section.
    pub fn to_plan(&self) -> Result<ExperimentPlan, ConfigError> {
        let mut plan = ExperimentPlan::new(self.project_name.clone(), self.signals.clone())
            .with_chunk_size(self.chunk_size);

        if let Some(dir) = &self.output_dir {
            plan = plan.with_output_dir(dir.clone());
        }
        if let Some(speed) = self.speed {
            plan = plan.with_speed(speed);
        }

        for section in &self.states {
            plan = plan.with_state(self.to_step(section)?);
        }

        Ok(plan)
    }

    fn to_step(&self, section: &StateSection) -> Result<StateStep, ConfigError> {
        let pre_action = if section.reload {
            let target = self.reload.as_ref().ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "state {} sets reload = true but there is no [reload] section",
                    section.state
                ))
            })?;
            PreAction::Reload(ReloadTarget::new(
                target.model.clone(),
                target.parameters.clone(),
                target.initial_conditions.clone(),
            ))
        } else {
            PreAction::None
        };

        Ok(StateStep {
            state: section.state,
            pre_action,
            application: section.application.clone(),
            sample_minutes: section.sample_minutes,
            adjustment: section.adjustment.as_ref().map(AdjustmentSection::to_adjustment),
            post_application: section.post_application.clone(),
            post_minutes: section.post_minutes,
        })
    }

    /// CSV formatting described by the `[csv]` section
    pub fn csv_config(&self) -> Result<CsvConfig, ConfigError> {
        let mut config = CsvConfig::default();
        let Some(section) = &self.csv else {
            return Ok(config);
        };

        if let Some(delimiter) = section.delimiter {
            if !delimiter.is_ascii() {
                return Err(ConfigError::Invalid(format!(
                    "CSV delimiter must be a single ASCII character, got '{delimiter}'"
                )));
            }
            config = config.delimiter(delimiter as u8);
        }
        if let Some(precision) = section.precision {
            config = config.precision(precision);
        }
        Ok(config)
    }

    /// In-process plant described by the `[plant]` section
    pub fn build_plant(&self) -> Option<FirstOrderPlant> {
        let section = self.plant.as_ref()?;
        let mut plant = FirstOrderPlant::new(section.name.clone());

        for app in &section.applications {
            for (name, value) in &app.parameters {
                plant.add_parameter(&app.name, name, *value);
            }
            for lag in &app.lags {
                plant.add_lag(
                    &app.name,
                    FirstOrderLag::new(lag.input.clone(), lag.output.clone(), lag.gain, lag.time_constant)
                        .bias(lag.bias),
                );
            }
        }

        Some(plant)
    }
}

/// Read a plan file and return its validated experiment plan
pub fn load_plan<P: AsRef<Path>>(path: P) -> Result<ExperimentPlan, ExperimentError> {
    let plan = PlanFile::load(path)?.to_plan()?;
    plan.validate()?;
    Ok(plan)
}

// =================================================================================================
// Tests
// =================================================================================================
