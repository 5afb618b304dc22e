//! Sequential and parallel runners.
//!
//! Both runners take the whole step list plus a one-shot `done` callback.
//! The start delay applies once, to the head of the run, never per step.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::adapter::start_step;
use crate::config::MismatchPolicy;
use crate::host::{AnimationHost, Callback};
use crate::step::{Seconds, StepDescriptor};
use crate::target::Target;

/// Everything a run needs, shared by the callbacks it schedules.
pub(crate) struct RunContext {
    pub host: Rc<dyn AnimationHost>,
    pub target: Target,
    pub steps: Rc<[StepDescriptor]>,
    pub policy: MismatchPolicy,
}

fn after_start_delay(ctx: Rc<RunContext>, start_delay: Seconds, run: Callback) {
    if start_delay > 0.0 {
        let host = ctx.host.clone();
        host.run_after(start_delay, run);
    } else {
        run();
    }
}

/// How a step's completion reached the runner that started it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Handoff {
    /// Start call still on the stack.
    Starting,
    /// Completed before the start call returned.
    Inline,
    /// Start call returned first; completion will resume the loop itself.
    Detached,
}

/// Sequential cursor shared between the drain loop and step completions.
struct Drain {
    ctx: Rc<RunContext>,
    next: Cell<usize>,
    done: RefCell<Option<Callback>>,
}

/// Run steps one at a time; step `i + 1` starts from step `i`'s completion.
pub(crate) fn run_sequential(ctx: Rc<RunContext>, start_delay: Seconds, done: Callback) {
    if ctx.steps.is_empty() {
        done();
        return;
    }
    let run = Rc::new(Drain {
        ctx: ctx.clone(),
        next: Cell::new(0),
        done: RefCell::new(Some(done)),
    });
    after_start_delay(ctx, start_delay, Box::new(move || drain(run)));
}

// Steps that complete inline (expired targets, skipped mismatches) keep the
// loop going; only an asynchronous completion re-enters, on a fresh stack.
fn drain(run: Rc<Drain>) {
    loop {
        let index = run.next.get();
        let Some(step) = run.ctx.steps.get(index) else {
            let done = run.done.borrow_mut().take();
            if let Some(done) = done {
                done();
            }
            return;
        };
        run.next.set(index + 1);

        let handoff = Rc::new(Cell::new(Handoff::Starting));
        let (flag, resume) = (handoff.clone(), run.clone());
        start_step(
            &run.ctx.host,
            run.ctx.policy,
            &run.ctx.target,
            step,
            Box::new(move || {
                if flag.get() == Handoff::Starting {
                    flag.set(Handoff::Inline);
                } else {
                    drain(resume);
                }
            }),
        );
        if handoff.get() != Handoff::Inline {
            handoff.set(Handoff::Detached);
            return;
        }
    }
}

/// Counts step completions and fires `done` on the last one.
struct FanIn {
    expected: usize,
    arrived: Cell<usize>,
    done: RefCell<Option<Callback>>,
}

impl FanIn {
    fn new(expected: usize, done: Callback) -> Self {
        Self {
            expected,
            arrived: Cell::new(0),
            done: RefCell::new(Some(done)),
        }
    }

    fn arrive(&self) {
        let arrived = self.arrived.get() + 1;
        self.arrived.set(arrived);
        if arrived >= self.expected {
            let done = self.done.borrow_mut().take();
            if let Some(done) = done {
                done();
            }
        }
    }
}

/// Start every step together; `done` fires once, after the last one reports.
pub(crate) fn run_parallel(ctx: Rc<RunContext>, start_delay: Seconds, done: Callback) {
    if ctx.steps.is_empty() {
        done();
        return;
    }
    // The expected count is fixed before any step can report.
    let fan_in = Rc::new(FanIn::new(ctx.steps.len(), done));
    let batch = ctx.clone();
    after_start_delay(
        ctx,
        start_delay,
        Box::new(move || {
            for step in batch.steps.iter() {
                let fan_in = fan_in.clone();
                start_step(
                    &batch.host,
                    batch.policy,
                    &batch.target,
                    step,
                    Box::new(move || fan_in.arrive()),
                );
            }
        }),
    );
}
