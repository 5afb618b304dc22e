//! Host animation runtime contract.
//!
//! The host owns scheduling and easing math. The core only needs two things
//! from it: run a callback after a delay, and run a named property transition
//! that reports back once when it ends. All callbacks are expected on the
//! single main execution context.

use serde::{Deserialize, Serialize};

use crate::step::{Easing, Seconds, StepDescriptor, TextTransition};

/// One-shot callback invoked on the main execution context.
pub type Callback = Box<dyn FnOnce()>;

/// Property a transition animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    Opacity,
    Position,
    Bounds,
    Frame,
    Transform,
    Text,
    LayerOpacity,
    Custom,
}

impl Property {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Opacity => "opacity",
            Self::Position => "position",
            Self::Bounds => "bounds",
            Self::Frame => "frame",
            Self::Transform => "transform",
            Self::Text => "text",
            Self::LayerOpacity => "layer.opacity",
            Self::Custom => "custom",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionStyle {
    /// Plain interpolation of the property.
    Basic,
    /// Content transition (cross-fade, push, ...) for text changes.
    Text(TextTransition),
}

/// Parameters of one host transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRequest {
    /// Name of the target element.
    pub target: String,
    pub property: Property,
    pub duration: Seconds,
    pub delay: Seconds,
    pub easing: Easing,
    /// Replacement key; empty means unkeyed.
    pub key: String,
    pub auto_reverse: bool,
    pub remove_on_completion: bool,
    pub style: TransitionStyle,
}

impl TransitionRequest {
    pub fn for_step(target: &str, step: &StepDescriptor) -> Self {
        Self {
            target: target.to_string(),
            property: step.kind().property(),
            duration: step.duration(),
            delay: step.delay(),
            easing: step.easing(),
            key: step.key().to_string(),
            auto_reverse: step.auto_reverse(),
            remove_on_completion: step.remove_on_completion(),
            style: TransitionStyle::Basic,
        }
    }

    pub fn with_style(mut self, style: TransitionStyle) -> Self {
        self.style = style;
        self
    }

    /// Running time after the delay has elapsed.
    #[inline]
    pub fn run_time(&self) -> Seconds {
        if self.auto_reverse {
            self.duration * 2.0
        } else {
            self.duration
        }
    }
}

/// Scheduler and animation primitive provided by the UI runtime.
pub trait AnimationHost {
    /// Current host time in seconds.
    fn now(&self) -> Seconds;

    /// Invoke `callback` once after `delay` seconds.
    fn run_after(&self, delay: Seconds, callback: Callback);

    /// Start a transition. `apply` commits the model change when the
    /// transition begins (after `request.delay`); `on_finish` fires exactly
    /// once, asynchronously, when it ends or is interrupted.
    fn animate(&self, request: TransitionRequest, apply: Option<Callback>, on_finish: Callback);
}
