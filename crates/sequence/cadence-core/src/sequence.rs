//! Serializable step lists.
//!
//! A [`SequenceSpec`] is the JSON form of a token's step list. Steps whose
//! `duration` or `easing` is omitted take the animator configuration defaults.
//!
//! ```json
//! {
//!   "name": "intro",
//!   "mode": "sequential",
//!   "startDelay": 0.1,
//!   "steps": [
//!     { "kind": "alpha", "to": 0.0, "duration": 0.2 },
//!     { "kind": "move", "dx": 10.0, "dy": 0.0, "easing": "ease_out" }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::config::AnimatorConfig;
use crate::error::CadenceError;
use crate::geometry::{Point, Size};
use crate::step::{Easing, LayerProperty, Seconds, StepDescriptor, StepKind, TextTransition};
use crate::token::Mode;

fn default_true() -> bool {
    true
}

fn is_zero(v: &Seconds) -> bool {
    *v == 0.0
}

/// Serializable step payload, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KindSpec {
    Alpha { to: f64 },
    Move { dx: f64, dy: f64 },
    MoveTo { x: f64, y: f64 },
    Resize { width: f64, height: f64 },
    Scale { width: f64, height: f64 },
    ScaleBy { x: f64, y: f64 },
    Text { text: String, transition: TextTransition },
    LayerOpacity { from: f64, to: f64 },
}

impl KindSpec {
    pub fn to_kind(&self) -> StepKind {
        match self {
            Self::Alpha { to } => StepKind::Alpha { to: *to },
            Self::Move { dx, dy } => StepKind::Move { dx: *dx, dy: *dy },
            Self::MoveTo { x, y } => StepKind::MoveTo {
                point: Point::new(*x, *y),
            },
            Self::Resize { width, height } => StepKind::Resize {
                size: Size::new(*width, *height),
            },
            Self::Scale { width, height } => StepKind::Scale {
                size: Size::new(*width, *height),
            },
            Self::ScaleBy { x, y } => StepKind::ScaleBy { x: *x, y: *y },
            Self::Text { text, transition } => StepKind::Text {
                text: text.clone(),
                transition: *transition,
            },
            Self::LayerOpacity { from, to } => StepKind::Layer {
                property: LayerProperty::Opacity {
                    from: *from,
                    to: *to,
                },
            },
        }
    }

    /// Inverse of [`KindSpec::to_kind`]. Custom closures have no serialized form.
    pub fn from_kind(kind: &StepKind) -> Result<Self, CadenceError> {
        Ok(match kind {
            StepKind::Alpha { to } => Self::Alpha { to: *to },
            StepKind::Move { dx, dy } => Self::Move { dx: *dx, dy: *dy },
            StepKind::MoveTo { point } => Self::MoveTo {
                x: point.x,
                y: point.y,
            },
            StepKind::Resize { size } => Self::Resize {
                width: size.width,
                height: size.height,
            },
            StepKind::Scale { size } => Self::Scale {
                width: size.width,
                height: size.height,
            },
            StepKind::ScaleBy { x, y } => Self::ScaleBy { x: *x, y: *y },
            StepKind::Text { text, transition } => Self::Text {
                text: text.clone(),
                transition: *transition,
            },
            StepKind::Layer {
                property: LayerProperty::Opacity { from, to },
            } => Self::LayerOpacity {
                from: *from,
                to: *to,
            },
            StepKind::Custom(_) => {
                return Err(CadenceError::UnsupportedStep {
                    kind: kind.name().to_string(),
                })
            }
        })
    }
}

/// One serialized step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepSpec {
    #[serde(flatten)]
    pub kind: KindSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Seconds>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub delay: Seconds,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easing: Option<Easing>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key: String,
    #[serde(default = "default_true")]
    pub remove_on_completion: bool,
    #[serde(default)]
    pub auto_reverse: bool,
    #[serde(default)]
    pub restore_identity: bool,
}

impl StepSpec {
    pub fn validate(&self) -> Result<(), CadenceError> {
        if let Some(duration) = self.duration {
            if !duration.is_finite() || duration < 0.0 {
                return Err(CadenceError::InvalidDuration { duration });
            }
        }
        if !self.delay.is_finite() || self.delay < 0.0 {
            return Err(CadenceError::InvalidDelay { delay: self.delay });
        }
        Ok(())
    }

    pub fn to_descriptor(&self, config: &AnimatorConfig) -> StepDescriptor {
        let mut step = StepDescriptor::new(
            self.kind.to_kind(),
            self.duration.unwrap_or(config.default_duration),
        )
        .with_delay(self.delay)
        .with_easing(self.easing.unwrap_or(config.default_easing))
        .with_key(self.key.as_str());
        if !self.remove_on_completion {
            step = step.retained();
        }
        if self.auto_reverse {
            step = step.auto_reversing();
        }
        if self.restore_identity {
            step = step.restoring_identity();
        }
        step
    }

    pub fn from_descriptor(step: &StepDescriptor) -> Result<Self, CadenceError> {
        Ok(Self {
            kind: KindSpec::from_kind(step.kind())?,
            duration: Some(step.duration()),
            delay: step.delay(),
            easing: Some(step.easing()),
            key: step.key().to_string(),
            remove_on_completion: step.remove_on_completion(),
            auto_reverse: step.auto_reverse(),
            restore_identity: step.restore_identity(),
        })
    }
}

/// Serialized token contents: mode, start delay and steps.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default)]
    pub start_delay: Seconds,
    #[serde(default)]
    pub steps: Vec<StepSpec>,
}

impl SequenceSpec {
    pub fn validate(&self) -> Result<(), CadenceError> {
        if !self.start_delay.is_finite() || self.start_delay < 0.0 {
            return Err(CadenceError::InvalidDelay {
                delay: self.start_delay,
            });
        }
        self.steps.iter().try_for_each(StepSpec::validate)
    }

    pub fn to_steps(&self, config: &AnimatorConfig) -> Vec<StepDescriptor> {
        self.steps
            .iter()
            .map(|s| s.to_descriptor(config))
            .collect()
    }

    /// Serialize a descriptor list. Fails on custom steps.
    pub fn from_steps(mode: Mode, steps: &[StepDescriptor]) -> Result<Self, CadenceError> {
        Ok(Self {
            name: None,
            mode,
            start_delay: 0.0,
            steps: steps
                .iter()
                .map(StepSpec::from_descriptor)
                .collect::<Result<_, _>>()?,
        })
    }

    pub fn to_json(&self) -> Result<String, CadenceError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Parse and validate a sequence document.
pub fn parse_sequence_json(s: &str) -> Result<SequenceSpec, CadenceError> {
    let spec: SequenceSpec = serde_json::from_str(s)?;
    spec.validate()?;
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets;

    #[test]
    fn omitted_fields_take_config_defaults() {
        let spec = parse_sequence_json(
            r#"{ "steps": [ { "kind": "alpha", "to": 0.5 } ] }"#,
        )
        .unwrap();
        assert_eq!(spec.mode, Mode::Sequential);
        let cfg = AnimatorConfig {
            default_duration: 0.75,
            default_easing: Easing::Linear,
            ..Default::default()
        };
        let steps = spec.to_steps(&cfg);
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].duration(), 0.75);
        assert_eq!(steps[0].easing(), Easing::Linear);
        assert!(steps[0].remove_on_completion());
    }

    #[test]
    fn step_flags_are_carried() {
        let spec = parse_sequence_json(
            r#"{
                "mode": "parallel",
                "startDelay": 0.25,
                "steps": [
                    { "kind": "layer_opacity", "from": 1.0, "to": 0.2,
                      "duration": 0.1, "removeOnCompletion": false, "autoReverse": true },
                    { "kind": "scale_by", "x": 2.0, "y": 2.0,
                      "restoreIdentity": true, "key": "grow" }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(spec.mode, Mode::Parallel);
        assert_eq!(spec.start_delay, 0.25);
        let steps = spec.to_steps(&AnimatorConfig::default());
        assert!(!steps[0].remove_on_completion());
        assert!(steps[0].auto_reverse());
        assert!(steps[1].restore_identity());
        assert_eq!(steps[1].key(), "grow");
    }

    #[test]
    fn malformed_timing_is_rejected() {
        let err = parse_sequence_json(
            r#"{ "steps": [ { "kind": "alpha", "to": 0.0, "duration": -1.0 } ] }"#,
        )
        .unwrap_err();
        assert_eq!(err, CadenceError::InvalidDuration { duration: -1.0 });

        let err = parse_sequence_json(r#"{ "startDelay": -0.5 }"#).unwrap_err();
        assert!(err.is_timing_error());

        let err = parse_sequence_json(r#"{ "steps": [ { "kind": "spin" } ] }"#).unwrap_err();
        assert!(matches!(err, CadenceError::Parse { .. }));
    }

    #[test]
    fn custom_steps_cannot_be_serialized() {
        let steps = vec![presets::fade_out(), presets::custom(0.1, |_| {})];
        let err = SequenceSpec::from_steps(Mode::Sequential, &steps).unwrap_err();
        assert_eq!(
            err,
            CadenceError::UnsupportedStep {
                kind: "custom".into()
            }
        );
    }

    #[test]
    fn descriptors_survive_a_json_trip() {
        let steps = vec![
            presets::move_by(5.0, -5.0).with_delay(0.1),
            presets::text_push("next", 0.4),
            presets::flash(1.0, 0.0).retained(),
        ];
        let spec = SequenceSpec::from_steps(Mode::Parallel, &steps).unwrap();
        let parsed = parse_sequence_json(&spec.to_json().unwrap()).unwrap();
        assert_eq!(parsed, spec);
        let back = parsed.to_steps(&AnimatorConfig::default());
        assert_eq!(back[1].easing(), Easing::System);
        assert_eq!(back[0].delay(), 0.1);
        assert!(!back[2].remove_on_completion());
    }
}
