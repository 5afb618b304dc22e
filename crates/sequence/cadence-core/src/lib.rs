//! Cadence core (runtime-agnostic)
//!
//! Declarative animation sequencing over a callback-based host animation
//! runtime. Callers describe steps ([`StepDescriptor`], usually via
//! [`presets`]), bundle them into a write-once [`AnimationToken`] through an
//! [`Animator`], and trigger the token to run the steps in sequence or in
//! parallel. A token that is never triggered runs when it is dropped.
//!
//! Everything here is single-threaded: targets are `Rc<RefCell<_>>` handles
//! owned by the UI layer and tokens hold weak references to them.

mod adapter;
pub mod animator;
pub mod config;
pub mod error;
pub mod geometry;
pub mod host;
pub mod ids;
pub mod presets;
mod runner;
pub mod sequence;
pub mod step;
pub mod target;
pub mod token;
pub mod virtual_host;

// Re-exports for consumers (host adapters)
pub use animator::Animator;
pub use config::{AnimatorConfig, MismatchPolicy};
pub use error::CadenceError;
pub use geometry::{Point, Rect, Size, Transform};
pub use host::{AnimationHost, Callback, Property, TransitionRequest, TransitionStyle};
pub use ids::TokenId;
pub use sequence::{parse_sequence_json, KindSpec, SequenceSpec, StepSpec};
pub use step::{
    Capability, CustomStep, Easing, LayerProperty, Seconds, StepDescriptor, StepKind,
    TextTransition,
};
pub use target::{Label, LabelRef, Layer, LayerRef, Target, View, ViewProps, ViewRef, Visual};
pub use token::{chain, AnimationToken, Mode, TokenOptions, TokenState};
pub use virtual_host::{HostEvent, HostEventKind, VirtualHost};

pub type Result<T> = core::result::Result<T, CadenceError>;
