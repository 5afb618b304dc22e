//! Target adapter: starts one step on one target and reports completion.
//!
//! Three low-level paths exist. The view path commits the view-property
//! change inside a block-style host transition, the text path swaps text
//! content under a content transition, and the layer path runs a
//! property interpolation that leaves the layer model alone unless retained.
//! `on_complete` runs exactly once on every path; a dead target completes
//! synchronously without touching anything.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::config::MismatchPolicy;
use crate::geometry::Transform;
use crate::host::{AnimationHost, Callback, TransitionRequest, TransitionStyle};
use crate::step::{Capability, LayerProperty, StepDescriptor, StepKind};
use crate::target::{Label, Layer, Target, Visual};

/// Start `step` on `target`, dispatching on the step's capability.
pub(crate) fn start_step(
    host: &Rc<dyn AnimationHost>,
    policy: MismatchPolicy,
    target: &Target,
    step: &StepDescriptor,
    on_complete: Callback,
) {
    log::trace!(
        "cadence: start {} step on {} target",
        step.kind().name(),
        target.kind_name()
    );
    let capability = step.kind().capability();
    if !target.supports(capability) {
        start_mismatched_step(host, policy, target, step, on_complete);
        return;
    }
    // Only supported pairings reach here; see `Target::supports`.
    match (target, capability) {
        (Target::View(view), _) => start_view_step(host, view, step, on_complete),
        (Target::Text(label), Capability::Text) => start_text_step(host, label, step, on_complete),
        (Target::Text(label), _) => start_view_step(host, label, step, on_complete),
        (Target::Layer(layer), _) => start_layer_step(host, layer, step, on_complete),
        (Target::Compound { layer, .. }, Capability::Layer) => {
            start_layer_step(host, layer, step, on_complete)
        }
        (Target::Compound { view, .. }, _) => start_view_step(host, view, step, on_complete),
    }
}

fn start_view_step<V: Visual + 'static>(
    host: &Rc<dyn AnimationHost>,
    view: &Weak<RefCell<V>>,
    step: &StepDescriptor,
    on_complete: Callback,
) {
    let Some(live) = view.upgrade() else {
        log::trace!("cadence: view target expired; completing {} step", step.kind().name());
        on_complete();
        return;
    };
    let request = TransitionRequest::for_step(live.borrow().name(), step);
    drop(live);

    let view = view.clone();
    let kind = step.kind().clone();
    let restore_identity = step.restore_identity();
    let apply: Callback = Box::new(move || {
        if let Some(view) = view.upgrade() {
            let mut view = view.borrow_mut();
            let props = view.props_mut();
            if restore_identity {
                props.transform = Transform::IDENTITY;
            }
            kind.apply_to_view(props);
        }
    });
    host.animate(request, Some(apply), on_complete);
}

fn start_text_step(
    host: &Rc<dyn AnimationHost>,
    label: &Weak<RefCell<Label>>,
    step: &StepDescriptor,
    on_complete: Callback,
) {
    let StepKind::Text { text, transition } = step.kind() else {
        on_complete();
        return;
    };
    let Some(live) = label.upgrade() else {
        log::trace!("cadence: text target expired; completing text step");
        on_complete();
        return;
    };
    let request = TransitionRequest::for_step(&live.borrow().name, step)
        .with_style(TransitionStyle::Text(*transition));
    drop(live);

    let label = label.clone();
    let text = text.clone();
    let apply: Callback = Box::new(move || {
        if let Some(label) = label.upgrade() {
            label.borrow_mut().text = text;
        }
    });
    host.animate(request, Some(apply), on_complete);
}

fn start_layer_step(
    host: &Rc<dyn AnimationHost>,
    layer: &Weak<RefCell<Layer>>,
    step: &StepDescriptor,
    on_complete: Callback,
) {
    let StepKind::Layer { property } = step.kind() else {
        on_complete();
        return;
    };
    let Some(live) = layer.upgrade() else {
        log::trace!("cadence: layer target expired; completing layer step");
        on_complete();
        return;
    };
    let request = TransitionRequest::for_step(&live.borrow().name, step);
    drop(live);

    let on_finish: Callback = if step.remove_on_completion() {
        on_complete
    } else {
        // Retained: the last presented value becomes the model value.
        let LayerProperty::Opacity { from, to } = *property;
        let retained = if step.auto_reverse() { from } else { to };
        let layer = layer.clone();
        Box::new(move || {
            if let Some(layer) = layer.upgrade() {
                layer.borrow_mut().opacity = retained;
            }
            on_complete();
        })
    };
    host.animate(request, None, on_finish);
}

fn start_mismatched_step(
    host: &Rc<dyn AnimationHost>,
    policy: MismatchPolicy,
    target: &Target,
    step: &StepDescriptor,
    on_complete: Callback,
) {
    if !target.is_live() {
        on_complete();
        return;
    }
    log::warn!(
        "cadence: {} target has no path for {} step; policy {:?}",
        target.kind_name(),
        step.kind().name(),
        policy
    );
    match policy {
        MismatchPolicy::Skip => on_complete(),
        MismatchPolicy::Hold => host.run_after(step.active_time(), on_complete),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Size};
    use crate::presets;
    use crate::target::{View, ViewProps};
    use crate::virtual_host::VirtualHost;
    use std::cell::Cell;

    fn counter() -> (Rc<Cell<u32>>, Callback) {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        (count, Box::new(move || c.set(c.get() + 1)))
    }

    #[test]
    fn view_step_mutates_and_completes_once() {
        let vh = Rc::new(VirtualHost::new());
        let host: Rc<dyn AnimationHost> = vh.clone();
        let view = View::new_ref("card", ViewProps::with_frame(Point::ZERO, Size::new(10.0, 10.0)));
        let (count, done) = counter();
        start_step(
            &host,
            MismatchPolicy::Skip,
            &Target::view(&view),
            &presets::move_by(5.0, 0.0),
            done,
        );
        assert_eq!(view.borrow().props.center, Point::new(10.0, 5.0));
        assert_eq!(count.get(), 0);
        vh.run_until_idle();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn expired_target_completes_synchronously() {
        let vh = Rc::new(VirtualHost::new());
        let host: Rc<dyn AnimationHost> = vh.clone();
        let label = Label::new_ref("title", ViewProps::default(), "old");
        let target = Target::text(&label);
        drop(label);
        let (count, done) = counter();
        start_step(&host, MismatchPolicy::Hold, &target, &presets::text_fade("new", 0.2), done);
        assert_eq!(count.get(), 1);
        assert_eq!(vh.pending_count(), 0);
    }

    #[test]
    fn text_step_on_plain_view_follows_policy() {
        let vh = Rc::new(VirtualHost::new());
        let host: Rc<dyn AnimationHost> = vh.clone();
        let view = View::new_ref("v", ViewProps::default());
        let step = presets::text_push("x", 0.5);

        let (count, done) = counter();
        start_step(&host, MismatchPolicy::Skip, &Target::view(&view), &step, done);
        assert_eq!(count.get(), 1);

        let (count, done) = counter();
        start_step(&host, MismatchPolicy::Hold, &Target::view(&view), &step, done);
        assert_eq!(count.get(), 0);
        vh.advance(0.49);
        assert_eq!(count.get(), 0);
        vh.advance(0.02);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn retained_layer_step_commits_final_value() {
        let vh = Rc::new(VirtualHost::new());
        let host: Rc<dyn AnimationHost> = vh.clone();
        let layer = Layer::new_ref("badge", 1.0);
        let (_, done) = counter();
        start_step(
            &host,
            MismatchPolicy::Skip,
            &Target::layer(&layer),
            &presets::flash(1.0, 0.25).retained(),
            done,
        );
        assert_eq!(layer.borrow().opacity, 1.0);
        vh.run_until_idle();
        assert_eq!(layer.borrow().opacity, 0.25);

        let (_, done) = counter();
        start_step(
            &host,
            MismatchPolicy::Skip,
            &Target::layer(&layer),
            &presets::flash(0.0, 1.0),
            done,
        );
        vh.run_until_idle();
        assert_eq!(layer.borrow().opacity, 0.25);
    }

    #[test]
    fn restore_identity_resets_transform_before_change() {
        let vh = Rc::new(VirtualHost::new());
        let host: Rc<dyn AnimationHost> = vh.clone();
        let mut props = ViewProps::default();
        props.transform = Transform::scale(3.0, 3.0);
        let view = View::new_ref("v", props);
        let (_, done) = counter();
        start_step(
            &host,
            MismatchPolicy::Skip,
            &Target::view(&view),
            &presets::fade_out().restoring_identity(),
            done,
        );
        let v = view.borrow();
        assert!(v.props.transform.is_identity());
        assert_eq!(v.props.alpha, 0.0);
    }

    #[test]
    fn host_is_reached_exactly_for_supported_pairings() {
        let view = View::new_ref("v", ViewProps::default());
        let label = Label::new_ref("l", ViewProps::default(), "");
        let layer = Layer::new_ref("ly", 1.0);
        let targets = [
            Target::view(&view),
            Target::text(&label),
            Target::layer(&layer),
            Target::compound(&view, &layer),
        ];
        let steps = [
            presets::fade_out(),
            presets::text_fade("t", 0.2),
            presets::flash(1.0, 0.0),
        ];
        for target in &targets {
            for step in &steps {
                let vh = Rc::new(VirtualHost::new());
                let host: Rc<dyn AnimationHost> = vh.clone();
                let (count, done) = counter();
                start_step(&host, MismatchPolicy::Skip, target, step, done);
                let supported = target.supports(step.kind().capability());
                assert_eq!(
                    vh.active_transitions(),
                    usize::from(supported),
                    "{} step on {} target",
                    step.kind().name(),
                    target.kind_name()
                );
                assert_eq!(count.get(), u32::from(!supported));
                vh.run_until_idle();
                assert_eq!(count.get(), 1);
            }
        }
    }
}
