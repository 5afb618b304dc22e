//! Token factory.
//!
//! [`Animator`] is the only way to build an [`AnimationToken`]. It owns the
//! host handle and configuration and resolves the target variant once, at
//! construction time.

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::AnimatorConfig;
use crate::error::CadenceError;
use crate::host::AnimationHost;
use crate::ids::IdAllocator;
use crate::runner::RunContext;
use crate::sequence::SequenceSpec;
use crate::step::StepDescriptor;
use crate::target::{LabelRef, LayerRef, Target, ViewRef};
use crate::token::{AnimationToken, Mode, TokenOptions};

pub struct Animator {
    host: Rc<dyn AnimationHost>,
    config: AnimatorConfig,
    ids: RefCell<IdAllocator>,
}

impl Animator {
    /// Create an animator with a validated configuration.
    pub fn new(host: Rc<dyn AnimationHost>, config: AnimatorConfig) -> Result<Self, CadenceError> {
        config.validate()?;
        Ok(Self {
            host,
            config,
            ids: RefCell::new(IdAllocator::new()),
        })
    }

    /// Create an animator with the default configuration.
    pub fn with_host(host: Rc<dyn AnimationHost>) -> Self {
        Self {
            host,
            config: AnimatorConfig::default(),
            ids: RefCell::new(IdAllocator::new()),
        }
    }

    #[inline]
    pub fn config(&self) -> &AnimatorConfig {
        &self.config
    }

    #[inline]
    pub fn host(&self) -> &Rc<dyn AnimationHost> {
        &self.host
    }

    /// Build an inert token. It runs when triggered, or when dropped untriggered.
    pub fn create_token(
        &self,
        target: Target,
        steps: Vec<StepDescriptor>,
        mode: Mode,
        options: TokenOptions,
    ) -> AnimationToken {
        let id = self.ids.borrow_mut().alloc_token();
        let start_delay = self.config.clamp_start_delay(options.start_delay);
        let ctx = RunContext {
            host: self.host.clone(),
            target,
            steps: steps.into(),
            policy: self.config.mismatch_policy,
        };
        AnimationToken::new(id, ctx, mode, start_delay, options.on_complete)
    }

    /// Build a token from a parsed sequence document.
    pub fn create_token_from_spec(
        &self,
        target: Target,
        spec: &SequenceSpec,
        options: TokenOptions,
    ) -> AnimationToken {
        let options = TokenOptions {
            start_delay: spec.start_delay + options.start_delay,
            ..options
        };
        self.create_token(target, spec.to_steps(&self.config), spec.mode, options)
    }

    pub fn animate_view(&self, view: &ViewRef, steps: Vec<StepDescriptor>) -> AnimationToken {
        self.animate_view_with(view, steps, TokenOptions::default())
    }

    /// Sequential view animation with a start delay and/or stored completion.
    pub fn animate_view_with(
        &self,
        view: &ViewRef,
        steps: Vec<StepDescriptor>,
        options: TokenOptions,
    ) -> AnimationToken {
        self.create_token(Target::view(view), steps, Mode::Sequential, options)
    }

    pub fn animate_view_in_parallel(
        &self,
        view: &ViewRef,
        steps: Vec<StepDescriptor>,
    ) -> AnimationToken {
        self.animate_view_in_parallel_with(view, steps, TokenOptions::default())
    }

    pub fn animate_view_in_parallel_with(
        &self,
        view: &ViewRef,
        steps: Vec<StepDescriptor>,
        options: TokenOptions,
    ) -> AnimationToken {
        self.create_token(Target::view(view), steps, Mode::Parallel, options)
    }

    pub fn animate_text(&self, label: &LabelRef, steps: Vec<StepDescriptor>) -> AnimationToken {
        self.animate_text_with(label, steps, TokenOptions::default())
    }

    pub fn animate_text_with(
        &self,
        label: &LabelRef,
        steps: Vec<StepDescriptor>,
        options: TokenOptions,
    ) -> AnimationToken {
        self.create_token(Target::text(label), steps, Mode::Sequential, options)
    }

    pub fn animate_text_in_parallel(
        &self,
        label: &LabelRef,
        steps: Vec<StepDescriptor>,
    ) -> AnimationToken {
        self.animate_text_in_parallel_with(label, steps, TokenOptions::default())
    }

    pub fn animate_text_in_parallel_with(
        &self,
        label: &LabelRef,
        steps: Vec<StepDescriptor>,
        options: TokenOptions,
    ) -> AnimationToken {
        self.create_token(Target::text(label), steps, Mode::Parallel, options)
    }

    pub fn animate_layer(&self, layer: &LayerRef, steps: Vec<StepDescriptor>) -> AnimationToken {
        self.animate_layer_with(layer, steps, TokenOptions::default())
    }

    pub fn animate_layer_with(
        &self,
        layer: &LayerRef,
        steps: Vec<StepDescriptor>,
        options: TokenOptions,
    ) -> AnimationToken {
        self.create_token(Target::layer(layer), steps, Mode::Sequential, options)
    }

    pub fn animate_layer_in_parallel(
        &self,
        layer: &LayerRef,
        steps: Vec<StepDescriptor>,
    ) -> AnimationToken {
        self.animate_layer_in_parallel_with(layer, steps, TokenOptions::default())
    }

    pub fn animate_layer_in_parallel_with(
        &self,
        layer: &LayerRef,
        steps: Vec<StepDescriptor>,
        options: TokenOptions,
    ) -> AnimationToken {
        self.create_token(Target::layer(layer), steps, Mode::Parallel, options)
    }

    /// View and layer driven by one step list; each step goes to whichever
    /// half supports its kind.
    pub fn animate_compound(
        &self,
        view: &ViewRef,
        layer: &LayerRef,
        steps: Vec<StepDescriptor>,
        mode: Mode,
    ) -> AnimationToken {
        self.animate_compound_with(view, layer, steps, mode, TokenOptions::default())
    }

    pub fn animate_compound_with(
        &self,
        view: &ViewRef,
        layer: &LayerRef,
        steps: Vec<StepDescriptor>,
        mode: Mode,
        options: TokenOptions,
    ) -> AnimationToken {
        self.create_token(Target::compound(view, layer), steps, mode, options)
    }
}

impl std::fmt::Debug for Animator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Animator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
