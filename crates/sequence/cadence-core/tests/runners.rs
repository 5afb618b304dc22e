use std::cell::{Cell, RefCell};
use std::rc::Rc;

use approx::assert_abs_diff_eq;
use cadence_core::{
    presets, AnimationHost, Animator, HostEvent, HostEventKind, Mode, Target, TokenOptions,
    View, ViewProps, ViewRef, VirtualHost,
};

fn mk_host() -> (Rc<VirtualHost>, Animator) {
    let host = Rc::new(VirtualHost::new());
    let animator = Animator::with_host(host.clone());
    (host, animator)
}

fn mk_view(name: &str) -> ViewRef {
    View::new_ref(name, ViewProps::default())
}

/// Completion probe: how many times it fired and the clock at the last firing.
fn mk_probe(host: &Rc<VirtualHost>) -> (Rc<Cell<u32>>, Rc<Cell<f64>>, impl FnOnce() + 'static) {
    let count = Rc::new(Cell::new(0));
    let at = Rc::new(Cell::new(f64::NAN));
    let (c, a, h) = (count.clone(), at.clone(), host.clone());
    (count, at, move || {
        c.set(c.get() + 1);
        a.set(h.now());
    })
}

fn times(events: &[HostEvent], want: fn(&HostEventKind) -> bool) -> Vec<f64> {
    events.iter().filter(|e| want(&e.kind)).map(|e| e.at).collect()
}

fn is_started(kind: &HostEventKind) -> bool {
    matches!(kind, HostEventKind::Started { .. })
}

fn is_finished(kind: &HostEventKind) -> bool {
    matches!(kind, HostEventKind::Finished { .. })
}

#[test]
fn sequential_steps_start_after_the_previous_one_finishes() {
    let (host, animator) = mk_host();
    let view = mk_view("seq");
    let (count, at, f) = mk_probe(&host);
    let mut token = animator.animate_view(
        &view,
        vec![
            presets::fade_out().with_duration(0.1),
            presets::move_by(0.0, 20.0).with_duration(0.2),
        ],
    );
    token.trigger(f);

    // Only the first step is running.
    assert_eq!(host.active_transitions(), 1);
    host.run_until_idle();

    let events = host.events();
    let started = times(&events, is_started);
    let finished = times(&events, is_finished);
    assert_eq!(started.len(), 2);
    assert!(started[1] >= finished[0]);
    assert_eq!(count.get(), 1);
    assert_abs_diff_eq!(at.get(), 0.3, epsilon = 1e-9);
}

#[test]
fn start_delay_applies_once_at_the_head() {
    let (host, animator) = mk_host();
    let view = mk_view("delayed");
    let (_, at, f) = mk_probe(&host);
    let mut token = animator.create_token(
        Target::view(&view),
        vec![
            presets::alpha(0.2).with_duration(0.1),
            presets::alpha(0.8).with_duration(0.1).with_delay(0.05),
        ],
        Mode::Sequential,
        TokenOptions::after(0.5),
    );
    token.trigger(f);
    host.run_until_idle();

    let started = times(&host.events(), is_started);
    assert_abs_diff_eq!(started[0], 0.5, epsilon = 1e-9);
    assert_abs_diff_eq!(started[1], 0.65, epsilon = 1e-9);
    assert_abs_diff_eq!(at.get(), 0.75, epsilon = 1e-9);
}

#[test]
fn parallel_completion_waits_for_the_slowest_step() {
    let (host, animator) = mk_host();
    let view = mk_view("par");
    let (count, at, f) = mk_probe(&host);
    let mut token = animator.animate_view_in_parallel(
        &view,
        vec![
            presets::fade_out().with_duration(0.1),
            presets::move_by(3.0, 0.0).with_duration(0.2),
            presets::scale_by(2.0, 2.0).with_duration(0.05),
        ],
    );
    token.trigger(f);
    assert_eq!(host.active_transitions(), 3);

    host.advance(0.1);
    assert_eq!(count.get(), 0);
    host.advance(0.05);
    assert_eq!(count.get(), 0);
    host.run_until_idle();
    assert_eq!(count.get(), 1);
    assert_abs_diff_eq!(at.get(), 0.2, epsilon = 1e-9);

    let started = times(&host.events(), is_started);
    assert!(started.iter().all(|t| *t == 0.0));
}

#[test]
fn simultaneous_completions_fire_once() {
    let (host, animator) = mk_host();
    let view = mk_view("tie");
    let (count, _, f) = mk_probe(&host);
    let mut token = animator.animate_view_in_parallel(
        &view,
        vec![
            presets::alpha(0.1).with_duration(0.2),
            presets::move_by(1.0, 1.0).with_duration(0.2),
        ],
    );
    token.trigger(f);
    assert_eq!(host.advance(0.2), 2);
    assert_eq!(count.get(), 1);
    host.run_until_idle();
    assert_eq!(count.get(), 1);
}

#[test]
fn zero_duration_steps_still_complete_through_the_host() {
    let (host, animator) = mk_host();
    let view = mk_view("instant");
    let (count, _, f) = mk_probe(&host);
    let mut token = animator.animate_view(
        &view,
        vec![
            presets::alpha(0.0).with_duration(0.0),
            presets::alpha(1.0).with_duration(0.0),
        ],
    );
    token.trigger(f);
    assert_eq!(count.get(), 0);
    host.advance(0.0);
    assert_eq!(count.get(), 1);
}

#[test]
fn keyed_replacement_interrupts_but_still_completes_once() {
    let (host, animator) = mk_host();
    let view = mk_view("k");
    let order = Rc::new(RefCell::new(Vec::new()));

    let mut first = animator.animate_view(
        &view,
        vec![presets::alpha(0.0).with_duration(1.0).with_key("fade")],
    );
    let o = order.clone();
    first.trigger(move || o.borrow_mut().push("first"));
    host.advance(0.25);

    let mut second = animator.animate_view(
        &view,
        vec![presets::alpha(1.0).with_duration(0.5).with_key("fade")],
    );
    let o = order.clone();
    second.trigger(move || o.borrow_mut().push("second"));
    host.run_until_idle();

    assert_eq!(*order.borrow(), vec!["first", "second"]);
    let interrupted = times(&host.events(), |k| matches!(k, HostEventKind::Interrupted { .. }));
    assert_eq!(interrupted.len(), 1);
    assert_abs_diff_eq!(interrupted[0], 0.25, epsilon = 1e-9);
    assert_abs_diff_eq!(view.borrow().props.alpha, 1.0);
}

#[test]
fn spec_built_tokens_add_the_document_start_delay() {
    let (host, animator) = mk_host();
    let view = mk_view("doc");
    let spec = cadence_core::parse_sequence_json(
        r#"{ "startDelay": 0.2, "steps": [ { "kind": "alpha", "to": 0.0, "duration": 0.1 } ] }"#,
    )
    .unwrap();
    let (_, at, f) = mk_probe(&host);
    let mut token =
        animator.create_token_from_spec(Target::view(&view), &spec, TokenOptions::after(0.1));
    assert_abs_diff_eq!(token.start_delay(), 0.3, epsilon = 1e-9);
    token.trigger(f);
    host.run_until_idle();
    assert_abs_diff_eq!(at.get(), 0.4, epsilon = 1e-9);
}
