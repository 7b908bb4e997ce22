//! Timed input scripts for headless runs.
//!
//! A script is a comma-separated list of `keys:seconds` steps, where `keys`
//! joins key names with `+` and `idle` holds nothing:
//! `accelerate:2,steer-right+accelerate:1.5,idle:1`.

use std::{fmt, str::FromStr};

use crate::input::{Key, KeySet, UnknownKey};

/// Keys held for a span of time.
#[derive(Clone, Debug, PartialEq)]
pub struct ScriptStep {
    pub keys: KeySet,
    pub seconds: f32,
}

/// A parsed sequence of [`ScriptStep`]s.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputScript {
    steps: Vec<ScriptStep>,
}

/// Errors from parsing an [`InputScript`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// A step had no `:seconds` suffix.
    MissingDuration { step: String },
    /// The duration was not a finite, non-negative number.
    InvalidDuration { step: String },
    UnknownKey(UnknownKey),
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingDuration { step } => write!(f, "step '{step}' has no duration"),
            Self::InvalidDuration { step } => write!(f, "step '{step}' has an invalid duration"),
            Self::UnknownKey(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ScriptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::UnknownKey(e) => Some(e),
            _ => None,
        }
    }
}

impl From<UnknownKey> for ScriptError {
    fn from(e: UnknownKey) -> Self {
        Self::UnknownKey(e)
    }
}

impl InputScript {
    pub fn steps(&self) -> &[ScriptStep] {
        &self.steps
    }

    /// Total scripted time in seconds.
    pub fn duration(&self) -> f32 {
        self.steps.iter().map(|step| step.seconds).sum()
    }

    /// Keys held at elapsed time `t`. Nothing is held past the end.
    pub fn keys_at(&self, t: f32) -> Option<&KeySet> {
        let mut end = 0.0;
        for step in &self.steps {
            end += step.seconds;
            if t < end {
                return Some(&step.keys);
            }
        }
        None
    }
}

impl FromStr for InputScript {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut steps = Vec::new();
        for step in s.split(',').map(str::trim).filter(|step| !step.is_empty()) {
            let Some((keys, seconds)) = step.rsplit_once(':') else {
                return Err(ScriptError::MissingDuration {
                    step: step.to_owned(),
                });
            };
            let seconds = seconds
                .trim()
                .parse::<f32>()
                .ok()
                .filter(|s| s.is_finite() && *s >= 0.0)
                .ok_or_else(|| ScriptError::InvalidDuration {
                    step: step.to_owned(),
                })?;

            let keys = match keys.trim() {
                "idle" => KeySet::new(),
                keys => keys
                    .split('+')
                    .map(str::parse::<Key>)
                    .collect::<Result<KeySet, _>>()?,
            };
            steps.push(ScriptStep { keys, seconds });
        }
        Ok(Self { steps })
    }
}
