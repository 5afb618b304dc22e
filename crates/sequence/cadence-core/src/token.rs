//! Execution tokens.
//!
//! A token holds a step list, a target, a mode and an optional completion.
//! It runs at most once: either when [`AnimationToken::trigger`] is called or,
//! if nobody triggered it, when the token is dropped or released. A caller can
//! therefore build an animation and discard the handle; it still plays.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::host::Callback;
use crate::ids::TokenId;
use crate::runner::{run_parallel, run_sequential, Handoff, RunContext};
use crate::step::Seconds;
use crate::target::Target;

/// Execution policy for a step list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Each step starts when the previous one completes.
    #[default]
    Sequential,
    /// All steps start together; completion fires after the last one.
    Parallel,
}

impl Mode {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::Parallel => "parallel",
        }
    }
}

/// Lifecycle of a token. Moves forward only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenState {
    /// Built, nothing started.
    Inert,
    /// Steps are running.
    Triggered,
    /// Every step has completed.
    Settled,
}

impl TokenState {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Inert => "inert",
            Self::Triggered => "triggered",
            Self::Settled => "settled",
        }
    }

    #[inline]
    pub fn is_inert(&self) -> bool {
        matches!(self, Self::Inert)
    }
}

/// Optional token parameters.
#[derive(Default)]
pub struct TokenOptions {
    /// Delay before the first step starts (applied once per run).
    pub start_delay: Seconds,
    /// Fired once: when the steps settle or on a redundant trigger, whichever
    /// happens first.
    pub on_complete: Option<Callback>,
}

impl TokenOptions {
    pub fn after(start_delay: Seconds) -> Self {
        Self {
            start_delay,
            on_complete: None,
        }
    }

    pub fn with_completion(mut self, on_complete: impl FnOnce() + 'static) -> Self {
        self.on_complete = Some(Box::new(on_complete));
        self
    }
}

impl fmt::Debug for TokenOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenOptions")
            .field("start_delay", &self.start_delay)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

/// Write-once handle to a scheduled animation.
///
/// Created by [`Animator`](crate::animator::Animator). Dropping an untriggered
/// token triggers it with a no-op handler.
pub struct AnimationToken {
    id: TokenId,
    ctx: Rc<RunContext>,
    mode: Mode,
    start_delay: Seconds,
    state: Rc<Cell<TokenState>>,
    completion: Rc<RefCell<Option<Callback>>>,
}

fn fire_stored(completion: &RefCell<Option<Callback>>) {
    let stored = completion.borrow_mut().take();
    if let Some(stored) = stored {
        stored();
    }
}

impl AnimationToken {
    pub(crate) fn new(
        id: TokenId,
        ctx: RunContext,
        mode: Mode,
        start_delay: Seconds,
        on_complete: Option<Callback>,
    ) -> Self {
        Self {
            id,
            ctx: Rc::new(ctx),
            mode,
            start_delay,
            state: Rc::new(Cell::new(TokenState::Inert)),
            completion: Rc::new(RefCell::new(on_complete)),
        }
    }

    /// Run the steps, calling `completion` once they have all settled.
    ///
    /// On an already triggered token this starts nothing: the stored
    /// completion (if still pending) fires instead and `completion` is dropped.
    pub fn trigger(&mut self, completion: impl FnOnce() + 'static) {
        if !self.state.get().is_inert() {
            log::debug!("cadence: {} already triggered; firing stored completion", self.id);
            fire_stored(&self.completion);
            return;
        }
        self.state.set(TokenState::Triggered);
        log::debug!(
            "cadence: {} triggered ({}, {} steps, start delay {})",
            self.id,
            self.mode.name(),
            self.ctx.steps.len(),
            self.start_delay
        );

        let id = self.id;
        let state = self.state.clone();
        let stored = self.completion.clone();
        let settle: Callback = Box::new(move || {
            state.set(TokenState::Settled);
            log::debug!("cadence: {id} settled");
            completion();
            fire_stored(&stored);
        });

        match self.mode {
            Mode::Sequential => run_sequential(self.ctx.clone(), self.start_delay, settle),
            Mode::Parallel => run_parallel(self.ctx.clone(), self.start_delay, settle),
        }
    }

    /// Dispose of the token now. Runs the steps if they never ran.
    pub fn release(self) {
        drop(self);
    }

    #[inline]
    pub fn id(&self) -> TokenId {
        self.id
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[inline]
    pub fn state(&self) -> TokenState {
        self.state.get()
    }

    #[inline]
    pub fn step_count(&self) -> usize {
        self.ctx.steps.len()
    }

    #[inline]
    pub fn start_delay(&self) -> Seconds {
        self.start_delay
    }

    #[inline]
    pub fn target(&self) -> &Target {
        &self.ctx.target
    }
}

impl Drop for AnimationToken {
    fn drop(&mut self) {
        self.trigger(|| {});
    }
}

impl fmt::Debug for AnimationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationToken")
            .field("id", &self.id)
            .field("mode", &self.mode)
            .field("state", &self.state.get())
            .field("steps", &self.ctx.steps.len())
            .field("start_delay", &self.start_delay)
            .finish()
    }
}

/// Trigger tokens one after another: each starts once the previous settles.
///
/// Every token is held until it settles and dropped before the next one
/// starts, so stored completions fire in chain order.
pub fn chain(tokens: impl IntoIterator<Item = AnimationToken>) {
    run_chain(Rc::new(Chain {
        queue: RefCell::new(tokens.into_iter().collect()),
        held: RefCell::new(None),
    }));
}

struct Chain {
    queue: RefCell<VecDeque<AnimationToken>>,
    held: RefCell<Option<AnimationToken>>,
}

fn run_chain(chain: Rc<Chain>) {
    loop {
        let next = chain.queue.borrow_mut().pop_front();
        let Some(mut token) = next else {
            return;
        };
        let handoff = Rc::new(Cell::new(Handoff::Starting));
        let (flag, resume) = (handoff.clone(), chain.clone());
        token.trigger(move || {
            if flag.get() == Handoff::Starting {
                flag.set(Handoff::Inline);
                return;
            }
            let settled = resume.held.borrow_mut().take();
            drop(settled);
            run_chain(resume);
        });
        if handoff.get() == Handoff::Inline {
            drop(token);
            continue;
        }
        handoff.set(Handoff::Detached);
        *chain.held.borrow_mut() = Some(token);
        return;
    }
}
