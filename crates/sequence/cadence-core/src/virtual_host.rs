//! Deterministic in-process host with a virtual clock.
//!
//! Time only moves when the owner calls [`VirtualHost::advance`] or
//! [`VirtualHost::run_until_idle`]; everything due is fired in
//! (time, submission order). Useful for tests, headless playback and tools.

use std::cell::RefCell;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::fmt;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::host::{AnimationHost, Callback, Property, TransitionRequest};
use crate::step::Seconds;

/// Upper bound on callbacks fired by a single `run_until_idle` call.
const MAX_PUMP: usize = 1_000_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEventKind {
    TimerFired,
    Started {
        target: String,
        property: Property,
        key: String,
    },
    Finished {
        target: String,
        property: Property,
        key: String,
    },
    /// A keyed transition was replaced before it ended.
    Interrupted {
        target: String,
        property: Property,
        key: String,
    },
}

impl HostEventKind {
    fn from_request(
        request: &TransitionRequest,
        make: fn(String, Property, String) -> Self,
    ) -> Self {
        make(request.target.clone(), request.property, request.key.clone())
    }

    /// Target name for transition events.
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::TimerFired => None,
            Self::Started { target, .. }
            | Self::Finished { target, .. }
            | Self::Interrupted { target, .. } => Some(target),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostEvent {
    pub at: Seconds,
    #[serde(flatten)]
    pub kind: HostEventKind,
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    at: Seconds,
    seq: u64,
}

impl PartialEq for Slot {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Slot {}

impl PartialOrd for Slot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Slot {
    fn cmp(&self, other: &Self) -> Ordering {
        self.at
            .total_cmp(&other.at)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

enum Pending {
    Timer(Callback),
    Begin {
        request: TransitionRequest,
        apply: Option<Callback>,
        on_finish: Callback,
    },
    Finish {
        request: TransitionRequest,
        on_finish: Callback,
    },
    /// Completion of an interrupted transition.
    Deliver(Callback),
}

#[derive(Default)]
struct HostState {
    now: Seconds,
    seq: u64,
    queue: BinaryHeap<Reverse<Slot>>,
    pending: HashMap<u64, Pending>,
    /// (target, key) -> seq of the running keyed transition's finish slot.
    active: HashMap<(String, String), u64>,
    events: Vec<HostEvent>,
}

impl HostState {
    fn schedule(&mut self, at: Seconds, pending: Pending) -> u64 {
        let seq = self.seq;
        self.seq = self.seq.wrapping_add(1);
        self.queue.push(Reverse(Slot { at, seq }));
        self.pending.insert(seq, pending);
        seq
    }

    /// Pop the next live slot due at or before `limit` and move the clock to it.
    fn pop_due(&mut self, limit: Option<Seconds>) -> Option<(u64, Pending)> {
        while let Some(Reverse(slot)) = self.queue.peek().copied() {
            if limit.is_some_and(|limit| slot.at > limit) {
                return None;
            }
            self.queue.pop();
            // Interrupted transitions leave stale slots behind.
            if let Some(pending) = self.pending.remove(&slot.seq) {
                if slot.at > self.now {
                    self.now = slot.at;
                }
                return Some((slot.seq, pending));
            }
        }
        None
    }

    fn record(&mut self, kind: HostEventKind) {
        let at = self.now;
        self.events.push(HostEvent { at, kind });
    }
}

/// Virtual-clock implementation of [`AnimationHost`].
#[derive(Default)]
pub struct VirtualHost {
    state: RefCell<HostState>,
}

impl VirtualHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward by `dt` seconds, firing everything that falls due.
    /// Returns the number of callbacks fired.
    pub fn advance(&self, dt: Seconds) -> usize {
        let limit = self.state.borrow().now + dt.max(0.0);
        let mut fired = 0;
        loop {
            let next = self.state.borrow_mut().pop_due(Some(limit));
            let Some((seq, pending)) = next else { break };
            self.dispatch(seq, pending);
            fired += 1;
        }
        let mut st = self.state.borrow_mut();
        if limit > st.now {
            st.now = limit;
        }
        fired
    }

    /// Fire everything that is scheduled, jumping the clock as needed.
    pub fn run_until_idle(&self) -> usize {
        let mut fired = 0;
        while fired < MAX_PUMP {
            let next = self.state.borrow_mut().pop_due(None);
            let Some((seq, pending)) = next else {
                return fired;
            };
            self.dispatch(seq, pending);
            fired += 1;
        }
        log::warn!(
            "cadence: virtual host stopped after {MAX_PUMP} callbacks; work is still queued"
        );
        fired
    }

    /// Number of scheduled callbacks and transitions not yet fired.
    pub fn pending_count(&self) -> usize {
        self.state.borrow().pending.len()
    }

    /// Number of transitions that have begun and not yet finished.
    pub fn active_transitions(&self) -> usize {
        self.state
            .borrow()
            .pending
            .values()
            .filter(|p| matches!(p, Pending::Finish { .. }))
            .count()
    }

    pub fn events(&self) -> Vec<HostEvent> {
        self.state.borrow().events.clone()
    }

    pub fn take_events(&self) -> Vec<HostEvent> {
        std::mem::take(&mut self.state.borrow_mut().events)
    }

    fn dispatch(&self, seq: u64, pending: Pending) {
        match pending {
            Pending::Timer(callback) => {
                self.state.borrow_mut().record(HostEventKind::TimerFired);
                callback();
            }
            Pending::Deliver(callback) => callback(),
            Pending::Begin {
                request,
                apply,
                on_finish,
            } => self.begin(request, apply, on_finish),
            Pending::Finish { request, on_finish } => {
                {
                    let mut st = self.state.borrow_mut();
                    let slot_key = (request.target.clone(), request.key.clone());
                    if st.active.get(&slot_key) == Some(&seq) {
                        st.active.remove(&slot_key);
                    }
                    st.record(HostEventKind::from_request(&request, |target, property, key| {
                        HostEventKind::Finished {
                            target,
                            property,
                            key,
                        }
                    }));
                }
                on_finish();
            }
        }
    }

    fn begin(&self, request: TransitionRequest, apply: Option<Callback>, on_finish: Callback) {
        let keyed = !request.key.is_empty();
        let slot_key = (request.target.clone(), request.key.clone());

        if keyed {
            let mut st = self.state.borrow_mut();
            let previous = st.active.remove(&slot_key);
            let replaced = previous.and_then(|seq| st.pending.remove(&seq));
            if let Some(Pending::Finish {
                request: old,
                on_finish: old_finish,
            }) = replaced
            {
                st.record(HostEventKind::from_request(&old, |target, property, key| {
                    HostEventKind::Interrupted {
                        target,
                        property,
                        key,
                    }
                }));
                let now = st.now;
                st.schedule(now, Pending::Deliver(old_finish));
            }
        }

        if let Some(apply) = apply {
            apply();
        }

        let mut st = self.state.borrow_mut();
        st.record(HostEventKind::from_request(&request, |target, property, key| {
            HostEventKind::Started {
                target,
                property,
                key,
            }
        }));
        let at = st.now + request.run_time();
        let seq = st.schedule(at, Pending::Finish { request, on_finish });
        if keyed {
            st.active.insert(slot_key, seq);
        }
    }
}

impl AnimationHost for VirtualHost {
    fn now(&self) -> Seconds {
        self.state.borrow().now
    }

    fn run_after(&self, delay: Seconds, callback: Callback) {
        let mut st = self.state.borrow_mut();
        let at = st.now + delay.max(0.0);
        st.schedule(at, Pending::Timer(callback));
    }

    fn animate(&self, request: TransitionRequest, apply: Option<Callback>, on_finish: Callback) {
        if request.delay > 0.0 {
            let mut st = self.state.borrow_mut();
            let at = st.now + request.delay;
            st.schedule(
                at,
                Pending::Begin {
                    request,
                    apply,
                    on_finish,
                },
            );
        } else {
            self.begin(request, apply, on_finish);
        }
    }
}

impl fmt::Debug for VirtualHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let st = self.state.borrow();
        f.debug_struct("VirtualHost")
            .field("now", &st.now)
            .field("pending", &st.pending.len())
            .field("events", &st.events.len())
            .finish()
    }
}
