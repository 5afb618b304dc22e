//! Step descriptors: one immutable record per animation step.
//!
//! A step list is a `Vec<StepDescriptor>`; the `kind` discriminant tells the
//! target adapter which low-level path runs it, so no downcasting is needed.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::CadenceError;
use crate::geometry::{Point, Size, Transform};
use crate::host::Property;
use crate::target::ViewProps;

/// Time in seconds.
pub type Seconds = f64;

/// Timing curve requested from the host runtime. Curve math is the host's job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    #[default]
    EaseInOut,
    /// Host default curve.
    System,
}

impl Easing {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::EaseIn => "ease_in",
            Self::EaseOut => "ease_out",
            Self::EaseInOut => "ease_in_out",
            Self::System => "system",
        }
    }
}

impl From<&str> for Easing {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "linear" => Self::Linear,
            "ease_in" => Self::EaseIn,
            "ease_out" => Self::EaseOut,
            "ease_in_out" => Self::EaseInOut,
            _ => Self::System,
        }
    }
}

/// Visual style of a text content transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextTransition {
    Fade,
    Push,
    MoveIn,
    Reveal,
}

impl TextTransition {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Fade => "fade",
            Self::Push => "push",
            Self::MoveIn => "move_in",
            Self::Reveal => "reveal",
        }
    }
}

/// Low-level layer property interpolation. Only opacity is supported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "property", rename_all = "snake_case")]
pub enum LayerProperty {
    Opacity { from: f64, to: f64 },
}

impl LayerProperty {
    /// Key path of the animated layer property.
    #[inline]
    pub fn key_path(&self) -> &'static str {
        match self {
            Self::Opacity { .. } => "opacity",
        }
    }
}

/// Caller-supplied view mutation.
#[derive(Clone)]
pub struct CustomStep(Rc<dyn Fn(&mut ViewProps)>);

impl CustomStep {
    pub fn new(apply: impl Fn(&mut ViewProps) + 'static) -> Self {
        Self(Rc::new(apply))
    }

    #[inline]
    pub fn apply(&self, props: &mut ViewProps) {
        (self.0)(props)
    }
}

impl fmt::Debug for CustomStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomStep(..)")
    }
}

/// Which target path a step kind needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    View,
    Text,
    Layer,
}

/// Kind-specific payload of a step.
#[derive(Clone, Debug)]
pub enum StepKind {
    /// Set view opacity.
    Alpha { to: f64 },
    /// Move the view center by an offset.
    Move { dx: f64, dy: f64 },
    /// Move the view center to an absolute point.
    MoveTo { point: Point },
    /// Change the bounds size; the center stays put.
    Resize { size: Size },
    /// Change the frame size; the top-left origin stays put.
    Scale { size: Size },
    /// Set a scale transform.
    ScaleBy { x: f64, y: f64 },
    /// Replace text content with a transition.
    Text {
        text: String,
        transition: TextTransition,
    },
    /// Interpolate a layer property.
    Layer { property: LayerProperty },
    Custom(CustomStep),
}

impl StepKind {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Alpha { .. } => "alpha",
            Self::Move { .. } => "move",
            Self::MoveTo { .. } => "move_to",
            Self::Resize { .. } => "resize",
            Self::Scale { .. } => "scale",
            Self::ScaleBy { .. } => "scale_by",
            Self::Text { .. } => "text",
            Self::Layer { .. } => "layer",
            Self::Custom(_) => "custom",
        }
    }

    #[inline]
    pub fn capability(&self) -> Capability {
        match self {
            Self::Text { .. } => Capability::Text,
            Self::Layer { .. } => Capability::Layer,
            _ => Capability::View,
        }
    }

    /// Host property this kind animates.
    pub fn property(&self) -> Property {
        match self {
            Self::Alpha { .. } => Property::Opacity,
            Self::Move { .. } | Self::MoveTo { .. } => Property::Position,
            Self::Resize { .. } => Property::Bounds,
            Self::Scale { .. } => Property::Frame,
            Self::ScaleBy { .. } => Property::Transform,
            Self::Text { .. } => Property::Text,
            Self::Layer {
                property: LayerProperty::Opacity { .. },
            } => Property::LayerOpacity,
            Self::Custom(_) => Property::Custom,
        }
    }

    /// Apply a view-kind change to view properties. Non-view kinds are ignored.
    pub fn apply_to_view(&self, props: &mut ViewProps) {
        match self {
            Self::Alpha { to } => props.alpha = *to,
            Self::Move { dx, dy } => props.center = props.center.offset(*dx, *dy),
            Self::MoveTo { point } => props.center = *point,
            Self::Resize { size } => props.size = *size,
            Self::Scale { size } => {
                let origin = props.frame().origin;
                props.size = *size;
                props.center = Point::new(
                    origin.x + size.width / 2.0,
                    origin.y + size.height / 2.0,
                );
            }
            Self::ScaleBy { x, y } => props.transform = Transform::scale(*x, *y),
            Self::Custom(custom) => custom.apply(props),
            Self::Text { .. } | Self::Layer { .. } => {}
        }
    }
}

/// One animation step. Immutable once handed to a token; the `with_*` methods
/// consume and return a new descriptor.
#[derive(Clone, Debug)]
pub struct StepDescriptor {
    kind: StepKind,
    duration: Seconds,
    delay: Seconds,
    easing: Easing,
    key: String,
    remove_on_completion: bool,
    auto_reverse: bool,
    restore_identity: bool,
}

pub(crate) fn sanitize_seconds(value: Seconds, what: &str) -> Seconds {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        log::warn!("cadence: {what} {value} is negative or not finite; using 0");
        0.0
    }
}

impl StepDescriptor {
    /// Create a step. Negative or non-finite durations are clamped to zero.
    pub fn new(kind: StepKind, duration: Seconds) -> Self {
        Self {
            kind,
            duration: sanitize_seconds(duration, "duration"),
            delay: 0.0,
            easing: Easing::default(),
            key: String::new(),
            remove_on_completion: true,
            auto_reverse: false,
            restore_identity: false,
        }
    }

    /// Create a step, rejecting malformed durations instead of clamping them.
    pub fn try_new(kind: StepKind, duration: Seconds) -> Result<Self, CadenceError> {
        if !duration.is_finite() || duration < 0.0 {
            return Err(CadenceError::InvalidDuration { duration });
        }
        Ok(Self::new(kind, duration))
    }

    pub fn with_duration(mut self, duration: Seconds) -> Self {
        self.duration = sanitize_seconds(duration, "duration");
        self
    }

    pub fn with_delay(mut self, delay: Seconds) -> Self {
        self.delay = sanitize_seconds(delay, "delay");
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Keep the final value after the step ends (layer steps).
    pub fn retained(mut self) -> Self {
        self.remove_on_completion = false;
        self
    }

    pub fn auto_reversing(mut self) -> Self {
        self.auto_reverse = true;
        self
    }

    /// Reset the view transform to identity together with the change.
    pub fn restoring_identity(mut self) -> Self {
        self.restore_identity = true;
        self
    }

    #[inline]
    pub fn kind(&self) -> &StepKind {
        &self.kind
    }

    #[inline]
    pub fn duration(&self) -> Seconds {
        self.duration
    }

    #[inline]
    pub fn delay(&self) -> Seconds {
        self.delay
    }

    #[inline]
    pub fn easing(&self) -> Easing {
        self.easing
    }

    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[inline]
    pub fn remove_on_completion(&self) -> bool {
        self.remove_on_completion
    }

    #[inline]
    pub fn auto_reverse(&self) -> bool {
        self.auto_reverse
    }

    #[inline]
    pub fn restore_identity(&self) -> bool {
        self.restore_identity
    }

    /// Delay plus duration, doubled for auto-reversing steps.
    pub fn active_time(&self) -> Seconds {
        let run = if self.auto_reverse {
            self.duration * 2.0
        } else {
            self.duration
        };
        self.delay + run
    }
}
