//! Animation targets.
//!
//! Targets are owned by the UI layer (`Rc<RefCell<_>>` handles); a token only
//! keeps weak references and treats a dropped target as a finished step.
//! The [`Target`] variant is chosen once, when the token is created.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect, Size, Transform};
use crate::step::Capability;

/// Animatable state shared by every view-like target.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct ViewProps {
    pub alpha: f64,
    pub center: Point,
    pub size: Size,
    pub transform: Transform,
}

impl Default for ViewProps {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            center: Point::ZERO,
            size: Size::ZERO,
            transform: Transform::IDENTITY,
        }
    }
}

impl ViewProps {
    pub fn with_frame(origin: Point, size: Size) -> Self {
        Self {
            center: Rect::new(origin, size).center(),
            size,
            ..Self::default()
        }
    }

    /// Frame in window coordinates, ignoring the transform.
    pub fn frame(&self) -> Rect {
        Rect::new(
            Point::new(
                self.center.x - self.size.width / 2.0,
                self.center.y - self.size.height / 2.0,
            ),
            self.size,
        )
    }

    /// Convert a point from this view's local space into `to`'s local space.
    pub fn convert_point(&self, point: Point, to: &ViewProps) -> Point {
        let from = self.frame().origin;
        let dest = to.frame().origin;
        Point::new(point.x + from.x - dest.x, point.y + from.y - dest.y)
    }
}

/// Access to the view properties of a view-like node.
pub trait Visual {
    fn name(&self) -> &str;
    fn props(&self) -> &ViewProps;
    fn props_mut(&mut self) -> &mut ViewProps;
}

/// Generic visual element.
#[derive(Clone, Debug, PartialEq)]
pub struct View {
    pub name: String,
    pub props: ViewProps,
}

/// Text-capable visual element.
#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    pub name: String,
    pub props: ViewProps,
    pub text: String,
}

/// Render layer. Property animations do not touch `opacity` unless retained.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    pub name: String,
    pub opacity: f64,
}

pub type ViewRef = Rc<RefCell<View>>;
pub type LabelRef = Rc<RefCell<Label>>;
pub type LayerRef = Rc<RefCell<Layer>>;

impl View {
    pub fn new(name: impl Into<String>, props: ViewProps) -> Self {
        Self {
            name: name.into(),
            props,
        }
    }

    pub fn new_ref(name: impl Into<String>, props: ViewProps) -> ViewRef {
        Rc::new(RefCell::new(Self::new(name, props)))
    }
}

impl Label {
    pub fn new(name: impl Into<String>, props: ViewProps, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            props,
            text: text.into(),
        }
    }

    pub fn new_ref(name: impl Into<String>, props: ViewProps, text: impl Into<String>) -> LabelRef {
        Rc::new(RefCell::new(Self::new(name, props, text)))
    }
}

impl Layer {
    pub fn new(name: impl Into<String>, opacity: f64) -> Self {
        Self {
            name: name.into(),
            opacity,
        }
    }

    pub fn new_ref(name: impl Into<String>, opacity: f64) -> LayerRef {
        Rc::new(RefCell::new(Self::new(name, opacity)))
    }
}

impl Visual for View {
    fn name(&self) -> &str {
        &self.name
    }
    fn props(&self) -> &ViewProps {
        &self.props
    }
    fn props_mut(&mut self) -> &mut ViewProps {
        &mut self.props
    }
}

impl Visual for Label {
    fn name(&self) -> &str {
        &self.name
    }
    fn props(&self) -> &ViewProps {
        &self.props
    }
    fn props_mut(&mut self) -> &mut ViewProps {
        &mut self.props
    }
}

/// Non-owning handle to the element(s) a token animates.
#[derive(Clone, Debug)]
pub enum Target {
    View(Weak<RefCell<View>>),
    Text(Weak<RefCell<Label>>),
    Layer(Weak<RefCell<Layer>>),
    /// View plus a separate layer; view-kind steps go to the view and layer
    /// steps to the layer.
    Compound {
        view: Weak<RefCell<View>>,
        layer: Weak<RefCell<Layer>>,
    },
}

impl Target {
    pub fn view(view: &ViewRef) -> Self {
        Self::View(Rc::downgrade(view))
    }

    pub fn text(label: &LabelRef) -> Self {
        Self::Text(Rc::downgrade(label))
    }

    pub fn layer(layer: &LayerRef) -> Self {
        Self::Layer(Rc::downgrade(layer))
    }

    pub fn compound(view: &ViewRef, layer: &LayerRef) -> Self {
        Self::Compound {
            view: Rc::downgrade(view),
            layer: Rc::downgrade(layer),
        }
    }

    #[inline]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::View(_) => "view",
            Self::Text(_) => "text",
            Self::Layer(_) => "layer",
            Self::Compound { .. } => "compound",
        }
    }

    #[inline]
    pub fn supports_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// Whether this target variant has a path for the given step capability.
    pub fn supports(&self, capability: Capability) -> bool {
        match (self, capability) {
            (Self::View(_), Capability::View) => true,
            (Self::Text(_), Capability::View | Capability::Text) => true,
            (Self::Layer(_), Capability::Layer) => true,
            (Self::Compound { .. }, Capability::View | Capability::Layer) => true,
            _ => false,
        }
    }

    /// True while at least one referenced element is still alive.
    pub fn is_live(&self) -> bool {
        match self {
            Self::View(v) => v.strong_count() > 0,
            Self::Text(l) => l.strong_count() > 0,
            Self::Layer(l) => l.strong_count() > 0,
            Self::Compound { view, layer } => view.strong_count() > 0 || layer.strong_count() > 0,
        }
    }

    /// Name of the primary element, if it is still alive.
    pub fn name(&self) -> Option<String> {
        match self {
            Self::View(v) | Self::Compound { view: v, .. } => {
                v.upgrade().map(|v| v.borrow().name.clone())
            }
            Self::Text(l) => l.upgrade().map(|l| l.borrow().name.clone()),
            Self::Layer(l) => l.upgrade().map(|l| l.borrow().name.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convert_point_between_sibling_frames() {
        let a = ViewProps::with_frame(Point::new(10.0, 10.0), Size::new(50.0, 50.0));
        let b = ViewProps::with_frame(Point::new(100.0, 40.0), Size::new(20.0, 20.0));
        // (5,5) in a is (15,15) in window, which is (-85,-25) in b.
        assert_eq!(a.convert_point(Point::new(5.0, 5.0), &b), Point::new(-85.0, -25.0));
    }

    #[test]
    fn capability_table() {
        let view = View::new_ref("v", ViewProps::default());
        let label = Label::new_ref("l", ViewProps::default(), "hi");
        let layer = Layer::new_ref("ly", 1.0);

        let t = Target::view(&view);
        assert!(t.supports(Capability::View));
        assert!(!t.supports(Capability::Text));
        assert!(!t.supports_text());

        let t = Target::text(&label);
        assert!(t.supports(Capability::Text));
        assert!(t.supports(Capability::View));
        assert!(!t.supports(Capability::Layer));
        assert!(t.supports_text());

        let t = Target::layer(&layer);
        assert!(t.supports(Capability::Layer));
        assert!(!t.supports(Capability::View));

        let t = Target::compound(&view, &layer);
        assert!(t.supports(Capability::View));
        assert!(t.supports(Capability::Layer));
        assert!(!t.supports(Capability::Text));
        assert_eq!(t.kind_name(), "compound");
    }

    #[test]
    fn liveness_follows_the_ui_owner() {
        let view = View::new_ref("card", ViewProps::default());
        let t = Target::view(&view);
        assert!(t.is_live());
        assert_eq!(t.name().as_deref(), Some("card"));
        drop(view);
        assert!(!t.is_live());
        assert_eq!(t.name(), None);
    }
}
