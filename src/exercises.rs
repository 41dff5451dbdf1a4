//! Exercise definitions and step normalization
//!
//! Exercises reach us in two step shapes: plain strings (older records and
//! the local generator) or `{step, stepDuration}` objects (generator output
//! with timers). Everything past deserialization sees only [`Step`].

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::StepError;

/// Duration given to main steps that carry no usable duration
pub const DEFAULT_STEP_SECS: u32 = 60;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// Body contact of the exercise, used to pick an illustration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Contact {
    Frontlegs,
    Hindlegs,
    Wholebody,
    Bodyweight,
}

/// One instruction of the main exercise
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Step {
    #[serde(rename = "step")]
    pub text: String,
    #[serde(rename = "stepDuration")]
    pub duration_seconds: u32,
}

impl Step {
    pub fn new(text: impl Into<String>, duration_seconds: u32) -> Self {
        Self { text: text.into(), duration_seconds }
    }
}

/// Step as it appears on the wire
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawStep {
    Text(String),
    Structured {
        step: String,
        #[serde(rename = "stepDuration", default)]
        step_duration: Option<f64>,
    },
}

impl From<Step> for RawStep {
    fn from(step: Step) -> Self {
        RawStep::Structured {
            step: step.text,
            step_duration: Some(f64::from(step.duration_seconds)),
        }
    }
}

/// Collapse raw steps into [`Step`]s.
///
/// The first element decides how the list is read: a leading string marks
/// the whole list as legacy text steps, each getting [`DEFAULT_STEP_SECS`].
/// Otherwise elements are read as structured steps; a bad duration falls
/// back to the default instead of rejecting the exercise.
pub fn normalize(raw: Vec<RawStep>) -> Vec<Step> {
    let legacy = matches!(raw.first(), Some(RawStep::Text(_)));

    raw.into_iter()
        .map(|item| match item {
            RawStep::Text(text) => Step::new(text, DEFAULT_STEP_SECS),
            RawStep::Structured { step, .. } if legacy => Step::new(step, DEFAULT_STEP_SECS),
            RawStep::Structured { step, step_duration } => {
                match structured_step(step, step_duration) {
                    Ok(step) => step,
                    Err(e) => {
                        warn!("{}, using {}s", e, DEFAULT_STEP_SECS);
                        let StepError::InvalidStepDuration { text, .. } = e;
                        Step::new(text, DEFAULT_STEP_SECS)
                    }
                }
            }
        })
        .collect()
}

fn structured_step(text: String, duration: Option<f64>) -> Result<Step, StepError> {
    match duration.map(f64::round) {
        Some(secs) if secs.is_finite() && secs >= 1.0 && secs <= f64::from(u32::MAX) => {
            Ok(Step::new(text, secs as u32))
        }
        _ => Err(StepError::InvalidStepDuration { text, duration }),
    }
}

/// Exercise record, with steps already normalized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ExerciseRecord", rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub description: String,
    pub difficulty: Difficulty,
    /// Estimate shown to the user, in minutes. Timers use step durations.
    #[serde(rename = "duration")]
    pub duration_minutes: u32,
    pub equipment: Vec<String>,
    pub steps: Vec<Step>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warmup_steps: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cooldown_steps: Vec<String>,
    pub benefits: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    pub is_custom: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Exercise {
    /// Sum of main step durations (warmup and cooldown not counted)
    pub fn total_duration_seconds(&self) -> u64 {
        self.steps.iter().map(|s| u64::from(s.duration_seconds)).sum()
    }
}

/// Wire shape of an exercise, as stored or as returned by a generator
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExerciseRecord {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    difficulty: Difficulty,
    #[serde(rename = "duration", alias = "durationMinutes", default)]
    duration_minutes: u32,
    #[serde(default)]
    equipment: Vec<String>,
    #[serde(default)]
    steps: Vec<RawStep>,
    #[serde(default)]
    warmup_steps: Option<Vec<String>>,
    #[serde(default)]
    cooldown_steps: Option<Vec<String>>,
    #[serde(default)]
    benefits: Vec<String>,
    #[serde(default)]
    contact: Option<Contact>,
    #[serde(default)]
    is_custom: bool,
    #[serde(default)]
    image_url: Option<String>,
}

impl From<ExerciseRecord> for Exercise {
    fn from(record: ExerciseRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            description: record.description,
            difficulty: record.difficulty,
            duration_minutes: record.duration_minutes,
            equipment: record.equipment,
            steps: normalize(record.steps),
            warmup_steps: record.warmup_steps.unwrap_or_default(),
            cooldown_steps: record.cooldown_steps.unwrap_or_default(),
            benefits: record.benefits,
            contact: record.contact,
            is_custom: record.is_custom,
            image_url: record.image_url,
        }
    }
}
