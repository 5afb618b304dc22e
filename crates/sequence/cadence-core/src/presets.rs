//! Pre-filled step descriptors for common effects.
//!
//! View presets default to [`DEFAULT_DURATION`] and ease-in-out; adjust with
//! the `with_*` methods on [`StepDescriptor`].

use crate::geometry::{Point, Size};
use crate::step::{
    CustomStep, Easing, LayerProperty, Seconds, StepDescriptor, StepKind, TextTransition,
};
use crate::target::ViewProps;

pub const DEFAULT_DURATION: Seconds = 0.3;

/// Set view opacity.
pub fn alpha(to: f64) -> StepDescriptor {
    StepDescriptor::new(StepKind::Alpha { to }, DEFAULT_DURATION)
}

pub fn fade_in() -> StepDescriptor {
    alpha(1.0)
}

pub fn fade_out() -> StepDescriptor {
    alpha(0.0)
}

pub fn move_by(dx: f64, dy: f64) -> StepDescriptor {
    StepDescriptor::new(StepKind::Move { dx, dy }, DEFAULT_DURATION)
}

/// Move the animated view's center to `point`, given in `current`'s local
/// space and converted into `relative`'s space when the step is built.
pub fn move_to(point: Point, current: &ViewProps, relative: &ViewProps) -> StepDescriptor {
    let point = current.convert_point(point, relative);
    StepDescriptor::new(StepKind::MoveTo { point }, DEFAULT_DURATION)
}

/// Change the bounds size around a fixed center.
pub fn resize_to(size: Size) -> StepDescriptor {
    StepDescriptor::new(StepKind::Resize { size }, DEFAULT_DURATION)
}

/// Change the frame size around a fixed top-left origin.
pub fn scale_to(size: Size) -> StepDescriptor {
    StepDescriptor::new(StepKind::Scale { size }, DEFAULT_DURATION)
}

pub fn scale_by(x: f64, y: f64) -> StepDescriptor {
    StepDescriptor::new(StepKind::ScaleBy { x, y }, DEFAULT_DURATION).with_easing(Easing::EaseIn)
}

fn text(text: impl Into<String>, duration: Seconds, transition: TextTransition) -> StepDescriptor {
    StepDescriptor::new(
        StepKind::Text {
            text: text.into(),
            transition,
        },
        duration,
    )
    .with_easing(Easing::System)
}

pub fn text_fade(to: impl Into<String>, duration: Seconds) -> StepDescriptor {
    text(to, duration, TextTransition::Fade)
}

pub fn text_push(to: impl Into<String>, duration: Seconds) -> StepDescriptor {
    text(to, duration, TextTransition::Push)
}

pub fn text_move_in(to: impl Into<String>, duration: Seconds) -> StepDescriptor {
    text(to, duration, TextTransition::MoveIn)
}

pub fn text_reveal(to: impl Into<String>, duration: Seconds) -> StepDescriptor {
    text(to, duration, TextTransition::Reveal)
}

/// Generic layer property interpolation.
pub fn layer_property(property: LayerProperty) -> StepDescriptor {
    StepDescriptor::new(StepKind::Layer { property }, DEFAULT_DURATION).with_easing(Easing::System)
}

/// Layer opacity pulse from one value to another.
pub fn flash(from: f64, to: f64) -> StepDescriptor {
    layer_property(LayerProperty::Opacity { from, to })
}

/// Arbitrary view mutation animated over `duration`.
pub fn custom(duration: Seconds, apply: impl Fn(&mut ViewProps) + 'static) -> StepDescriptor {
    StepDescriptor::new(StepKind::Custom(CustomStep::new(apply)), duration)
}
