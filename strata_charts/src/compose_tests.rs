// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

extern crate std;

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::RefCell;

use kurbo::Point;
use strata_core::{
    AnimationParams, AnimationSpec, Duration, Ease, Handle, Lifecycle, LifecycleState, RampParams,
    Time,
};

use crate::{
    AnimationPlan, AxisRole, Backend, Chart, ChartConfig, ChartError, ComposeError, Datum, Layer,
    LayerCx, LayerEvent, LayerId, LayerKind, LayerRegistry, LayerSpec, NiceConfig, NiceSet,
    PointerEvent, PointerKind, ReconcileError, ScaleReconciler, SceneTree,
};

fn chart() -> Chart<SceneTree> {
    Chart::new(ChartConfig::new(640.0, 400.0), SceneTree::default())
}

fn bars(id: &str, values: &[(&str, f64)]) -> LayerSpec {
    LayerSpec::new(LayerKind::Rect)
        .with_id(id)
        .with_data(values.iter().map(|(c, v)| Datum::new(*c, *v)))
}

fn zero_y() -> NiceSet {
    NiceSet {
        y: NiceConfig::default().with_zero(true),
        ..NiceSet::default()
    }
}

fn y_bounds(chart: &Chart<SceneTree>, id: &str) -> Option<(f64, f64)> {
    chart
        .layer(&LayerId::from(id))?
        .scales()
        .y
        .as_ref()?
        .bounds()
}

fn bar_center(chart: &Chart<SceneTree>, id: &str, label: &str) -> Point {
    chart
        .layer(&LayerId::from(id))
        .unwrap()
        .shapes()
        .iter()
        .find(|s| s.label.as_deref() == Some(label))
        .unwrap()
        .bounds
        .center()
}

#[test]
fn second_axis_and_legend_are_rejected() {
    let mut chart = chart();
    chart.create_layer(LayerSpec::new(LayerKind::Axis).with_id("axis")).unwrap();
    chart.create_layer(LayerSpec::new(LayerKind::Legend).with_id("legend")).unwrap();

    assert_eq!(
        chart.create_layer(LayerSpec::new(LayerKind::Axis)),
        Err(ComposeError::DuplicateAxis(LayerId::from("axis")))
    );
    assert_eq!(
        chart.create_layer(LayerSpec::new(LayerKind::Legend)),
        Err(ComposeError::DuplicateLegend(LayerId::from("legend")))
    );
    assert_eq!(
        chart.create_layer(bars("axis", &[("a", 1.0)])),
        Err(ComposeError::DuplicateId(LayerId::from("axis")))
    );
    assert_eq!(chart.layer_count(), 2);
}

#[test]
fn generated_ids_are_unique_per_kind() {
    let mut chart = chart();
    let a = chart.create_layer(LayerSpec::new(LayerKind::Rect)).unwrap();
    let b = chart.create_layer(LayerSpec::new(LayerKind::Rect)).unwrap();
    assert_ne!(a, b);
    assert!(a.as_str().starts_with("rect-"));
}

#[test]
fn missing_axis_fails_without_drawing() {
    let mut chart = chart();
    chart.create_layer(bars("bars", &[("a", 1.0)])).unwrap();

    assert_eq!(
        chart.draw(Time(0)),
        Err(ChartError::Reconcile(ReconcileError::MissingAxis))
    );
    assert!(chart.backend().is_empty());
    assert_eq!(chart.layers()[0].container(), None);
}

#[test]
fn zero_request_extends_the_merged_domain() {
    let mut chart = chart();
    chart.create_layer(LayerSpec::new(LayerKind::Axis).with_id("axis")).unwrap();
    chart
        .create_layer(bars("bars", &[("a", 2.0), ("b", 10.0)]).with_nice(zero_y()))
        .unwrap();
    chart.draw(Time(0)).unwrap();

    assert_eq!(y_bounds(&chart, "axis"), Some((0.0, 10.0)));
    assert_eq!(y_bounds(&chart, "bars"), Some((0.0, 10.0)));
}

#[test]
fn zero_request_keeps_a_domain_spanning_zero() {
    let mut chart = chart();
    chart.create_layer(LayerSpec::new(LayerKind::Axis).with_id("axis")).unwrap();
    chart
        .create_layer(bars("bars", &[("a", -5.0), ("b", 10.0)]).with_nice(zero_y()))
        .unwrap();
    chart.draw(Time(0)).unwrap();

    let (min, max) = y_bounds(&chart, "axis").unwrap();
    assert!(min <= -5.0 && max >= 10.0, "({min}, {max})");
}

#[test]
fn layers_share_the_merged_scales() {
    let mut chart = chart();
    chart.create_layer(LayerSpec::new(LayerKind::Axis).with_id("axis")).unwrap();
    chart.create_layer(bars("low", &[("a", 1.0), ("b", 3.0)])).unwrap();
    chart.create_layer(bars("high", &[("b", 20.0), ("c", 40.0)])).unwrap();
    chart.draw(Time(0)).unwrap();

    let axis = chart.layer(&LayerId::from("axis")).unwrap().scales().clone();
    assert_eq!(axis.x.as_ref().unwrap().categories(), ["a", "b", "c"]);
    for id in ["low", "high"] {
        let layer = chart.layer(&LayerId::from(id)).unwrap();
        assert_eq!(layer.scales().x, axis.x);
        assert_eq!(layer.scales().y, axis.y);
    }
}

#[test]
fn reconciling_twice_changes_nothing() {
    let mut chart = chart();
    chart.create_layer(LayerSpec::new(LayerKind::Axis).with_id("axis")).unwrap();
    chart
        .create_layer(bars("bars", &[("a", 0.13), ("b", 9.7)]))
        .unwrap();
    chart.draw(Time(0)).unwrap();
    let first = chart.layer(&LayerId::from("axis")).unwrap().scales().clone();
    chart.draw(Time(10)).unwrap();
    let second = chart.layer(&LayerId::from("axis")).unwrap().scales().clone();
    assert_eq!(first, second);
}

#[test]
fn the_trigger_is_left_out_of_its_own_pass() {
    let mut chart = chart();
    chart.create_layer(LayerSpec::new(LayerKind::Axis).with_id("axis")).unwrap();
    chart.create_layer(bars("a", &[("x", 1.0)])).unwrap();
    chart.create_layer(bars("b", &[("x", 2.0)])).unwrap();
    chart.draw(Time(0)).unwrap();

    let trigger = LayerId::from("a");
    let before = chart.layer(&trigger).unwrap().scales().clone();
    chart
        .layer_mut(&trigger)
        .unwrap()
        .set_data(vec![Datum::new("x", 50.0), Datum::new("y", 60.0)]);

    // Run the pass the chart would run, over a detached copy of its layers.
    let mut layers = detached_layers(&chart);
    let config = chart.config().clone();
    let mut backend = chart.backend().clone();
    let mut cx = LayerCx {
        backend: &mut backend,
        layout: *chart.layout(),
        palette: &config.palette,
        throttle: config.throttle,
        now: Time(10),
    };
    ScaleReconciler::new()
        .with_trigger(Some(trigger.clone()))
        .run(&mut layers, &mut cx)
        .unwrap();

    let a = layers.iter().find(|l| *l.id() == trigger).unwrap();
    let b = layers.iter().find(|l| l.id().as_str() == "b").unwrap();
    assert_eq!(*a.scales(), before);
    assert_eq!(b.scales().x.as_ref().unwrap().categories(), ["x", "y"]);
}

/// Rebuilds the chart's layers, keeping their data and working scales.
fn detached_layers(chart: &Chart<SceneTree>) -> Vec<Layer> {
    let ids: Vec<LayerId> = chart.layers().iter().map(|l| l.id().clone()).collect();
    let mut out = Vec::new();
    for id in ids {
        let layer = chart.layer(&id).unwrap();
        let spec = LayerSpec::new(layer.kind())
            .with_id(id.clone())
            .with_axis(layer.axis_role())
            .with_data(layer.data().iter().cloned())
            .with_nice(*layer.nice());
        let mut rebuilt = LayerRegistry::default()
            .build(&spec)
            .map(|behavior| Layer::new(id.clone(), spec, behavior))
            .unwrap();
        rebuilt.set_scales(layer.scales().clone());
        out.push(rebuilt);
    }
    out
}

#[test]
fn set_data_redraws_every_layer_with_the_new_scales() {
    let mut chart = chart();
    chart.create_layer(LayerSpec::new(LayerKind::Axis).with_id("axis")).unwrap();
    chart.create_layer(bars("a", &[("x", 1.0)])).unwrap();
    chart.create_layer(bars("b", &[("x", 2.0)])).unwrap();
    chart.draw(Time(0)).unwrap();
    let old_container = chart.layer(&LayerId::from("b")).unwrap().container();

    chart
        .set_data(&LayerId::from("a"), vec![Datum::new("x", 50.0)], Time(10))
        .unwrap();

    let axis = chart.layer(&LayerId::from("axis")).unwrap().scales().clone();
    let (_, max) = axis.y.as_ref().unwrap().bounds().unwrap();
    assert!(max >= 50.0);
    for id in ["a", "b"] {
        assert_eq!(chart.layer(&LayerId::from(id)).unwrap().scales().y, axis.y);
    }
    assert_ne!(chart.layer(&LayerId::from("b")).unwrap().container(), old_container);

    assert!(matches!(
        chart.set_data(&LayerId::from("nope"), Vec::new(), Time(20)),
        Err(ChartError::Compose(ComposeError::UnknownLayer(_)))
    ));
}

#[test]
fn set_data_without_an_axis_keeps_the_old_data() {
    let mut chart = chart();
    let id = chart.create_layer(bars("bars", &[("a", 1.0)])).unwrap();

    assert_eq!(
        chart.set_data(&id, vec![Datum::new("b", 9.0)], Time(10)),
        Err(ChartError::Reconcile(ReconcileError::MissingAxis))
    );
    let layer = chart.layer(&id).unwrap();
    assert_eq!(layer.data(), [Datum::new("a", 1.0)]);
    assert_eq!(layer.container(), None);
    assert!(chart.backend().is_empty());
}

#[test]
fn polar_and_geographic_layers_fill_their_roles() {
    let mut polar = chart();
    polar.create_layer(LayerSpec::new(LayerKind::Axis).with_id("axis")).unwrap();
    polar
        .create_layer(
            LayerSpec::new(LayerKind::Arc)
                .with_id("pie")
                .with_data([Datum::new("a", 1.0), Datum::new("b", 3.0)]),
        )
        .unwrap();
    polar.draw(Time(0)).unwrap();

    let axis = polar.layer(&LayerId::from("axis")).unwrap().scales().clone();
    let (_, total) = axis.angle.as_ref().unwrap().bounds().unwrap();
    let (_, outer) = axis.radius.as_ref().unwrap().bounds().unwrap();
    assert!(total >= 4.0 && outer >= 3.0, "({total}, {outer})");
    assert!(axis.x.is_none() && axis.y.is_none());
    assert_eq!(polar.layer(&LayerId::from("pie")).unwrap().scales().angle, axis.angle);

    let mut geo = chart();
    geo.create_layer(LayerSpec::new(LayerKind::Axis).with_id("axis")).unwrap();
    geo.create_layer(
        LayerSpec::new(LayerKind::Basemap)
            .with_id("map")
            .with_data([
                Datum::new("lisbon", 38.7).with_x(-9.1),
                Datum::new("oslo", 59.9).with_x(10.7),
            ]),
    )
    .unwrap();
    geo.draw(Time(0)).unwrap();

    let axis = geo.layer(&LayerId::from("axis")).unwrap().scales().clone();
    let (west, east) = axis.x.as_ref().unwrap().bounds().unwrap();
    let (south, north) = axis.y.as_ref().unwrap().bounds().unwrap();
    assert!(west <= -9.1 && east >= 10.7, "({west}, {east})");
    assert!(south <= 38.7 && north >= 59.9, "({south}, {north})");
    assert!(axis.angle.is_none() && axis.radius.is_none());
}

#[test]
fn a_legend_trigger_leaves_the_legend_alone() {
    let mut chart = chart();
    chart.create_layer(LayerSpec::new(LayerKind::Axis).with_id("axis")).unwrap();
    let legend = chart.create_layer(LayerSpec::new(LayerKind::Legend)).unwrap();
    chart.create_layer(bars("bars", &[("a", 1.0), ("b", 2.0)])).unwrap();
    chart.draw(Time(0)).unwrap();

    // Detached layers start without legend rows or a container.
    let mut layers = detached_layers(&chart);
    let config = chart.config().clone();
    let mut backend = chart.backend().clone();
    let mut cx = LayerCx {
        backend: &mut backend,
        layout: *chart.layout(),
        palette: &config.palette,
        throttle: config.throttle,
        now: Time(10),
    };
    let before = layers
        .iter()
        .find(|l| *l.id() == legend)
        .unwrap()
        .scales()
        .clone();
    ScaleReconciler::new()
        .with_trigger(Some(legend.clone()))
        .with_redraw(true)
        .run(&mut layers, &mut cx)
        .unwrap();

    let detached = layers.iter().find(|l| *l.id() == legend).unwrap();
    assert!(detached.legend().is_empty());
    assert_eq!(detached.container(), None);
    assert_eq!(*detached.scales(), before);

    ScaleReconciler::new().run(&mut layers, &mut cx).unwrap();
    let detached = layers.iter().find(|l| *l.id() == legend).unwrap();
    assert_eq!(detached.legend().len(), 2);
    assert!(detached.container().is_some());
}

#[test]
fn minor_axis_layers_get_their_own_scale() {
    let mut chart = chart();
    chart.create_layer(LayerSpec::new(LayerKind::Axis).with_id("axis")).unwrap();
    chart.create_layer(bars("bars", &[("a", 100.0), ("b", 200.0)])).unwrap();
    chart
        .create_layer(
            LayerSpec::new(LayerKind::Line)
                .with_id("rate")
                .with_axis(AxisRole::Minor)
                .with_data([Datum::new("a", 0.25), Datum::new("b", 0.75)]),
        )
        .unwrap();
    chart.draw(Time(0)).unwrap();

    let axis = chart.layer(&LayerId::from("axis")).unwrap().scales().clone();
    let rate = chart.layer(&LayerId::from("rate")).unwrap().scales().clone();
    let bars = chart.layer(&LayerId::from("bars")).unwrap().scales().clone();
    assert!(axis.y_minor.is_some());
    assert_eq!(rate.y, axis.y_minor);
    assert_eq!(bars.y, axis.y);
    assert_ne!(rate.y, bars.y);
    assert_eq!(rate.x, bars.x);
}

#[test]
fn legend_lists_each_category_once() {
    let mut chart = chart();
    chart.create_layer(LayerSpec::new(LayerKind::Axis).with_id("axis")).unwrap();
    chart.create_layer(LayerSpec::new(LayerKind::Legend).with_id("legend")).unwrap();
    chart.create_layer(bars("one", &[("a", 1.0), ("b", 2.0)])).unwrap();
    chart.create_layer(bars("two", &[("b", 3.0), ("c", 4.0)])).unwrap();
    chart.draw(Time(0)).unwrap();

    let legend = chart.layer(&LayerId::from("legend")).unwrap();
    let labels: Vec<&str> = legend.legend().iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, ["a", "b", "c"]);
    assert_eq!(legend.legend()[1].layer, LayerId::from("one"));

    let container = legend.container().unwrap();
    assert_eq!(chart.backend().children(container, "legend-swatch").len(), 3);
}

#[test]
fn animation_plan_replays_after_draw() {
    let fade = AnimationSpec::new(AnimationParams::Fade(RampParams::new(1.0, 0.25)))
        .with_duration(Duration(200))
        .with_ease(Ease::Linear);
    let mut chart = chart();
    chart.create_layer(LayerSpec::new(LayerKind::Axis).with_id("axis")).unwrap();
    chart
        .create_layer(
            bars("bars", &[("a", 1.0), ("b", 2.0)])
                .with_animation(AnimationPlan::new().with("bar", fade)),
        )
        .unwrap();
    chart.draw(Time(0)).unwrap();

    let mut t = 50;
    while t <= 400 {
        chart.tick(Time(t)).unwrap();
        t += 50;
    }

    let layer = chart.layer(&LayerId::from("bars")).unwrap();
    assert_eq!(layer.queue().unwrap().state(), LifecycleState::Ended);
    let targets: Vec<Handle> = layer
        .shapes()
        .iter()
        .filter(|s| s.class == "bar")
        .map(|s| s.handle)
        .collect();
    assert_eq!(targets.len(), 2);
    for target in targets {
        let node = chart.backend().node(target).unwrap();
        assert_eq!(node.transform.opacity, 0.25);
    }
}

#[test]
fn tooltip_goes_to_the_last_layer_hit() {
    let mut chart = chart();
    chart.create_layer(LayerSpec::new(LayerKind::Axis).with_id("axis")).unwrap();
    chart.create_layer(bars("under", &[("a", 5.0)]).with_nice(zero_y())).unwrap();
    chart.create_layer(bars("over", &[("a", 5.0)]).with_nice(zero_y())).unwrap();
    chart.draw(Time(0)).unwrap();

    let hits: Rc<RefCell<Vec<String>>> = Rc::default();
    let sink = hits.clone();
    chart
        .layer_mut(&LayerId::from("under"))
        .unwrap()
        .events()
        .on(LayerEvent::HOVER, "test", move |e| {
            sink.borrow_mut().push(e.layer.as_str().into());
            Ok(())
        });

    let position = bar_center(&chart, "over", "a");
    chart.dispatch_pointer(PointerEvent {
        kind: PointerKind::Move,
        position,
    });
    assert_eq!(*hits.borrow(), ["under"]);
    assert!(chart.tooltip().is_visible());
    assert_eq!(chart.tooltip().owner(), Some(&LayerId::from("over")));
    assert_eq!(chart.tooltip().text(), "a: 5");

    chart.dispatch_pointer(PointerEvent {
        kind: PointerKind::Leave,
        position,
    });
    assert!(!chart.tooltip().is_visible());
}

#[test]
fn hidden_layers_ignore_the_pointer() {
    let mut chart = chart();
    chart.create_layer(LayerSpec::new(LayerKind::Axis).with_id("axis")).unwrap();
    chart
        .create_layer(bars("bars", &[("a", 5.0)]).with_nice(zero_y()))
        .unwrap();
    chart.draw(Time(0)).unwrap();
    let id = LayerId::from("bars");
    let position = bar_center(&chart, "bars", "a");

    chart.set_visible(&id, false).unwrap();
    let container = chart.layer(&id).unwrap().container().unwrap();
    assert!(!chart.backend().is_visible(container));
    chart.dispatch_pointer(PointerEvent {
        kind: PointerKind::Move,
        position,
    });
    assert!(!chart.tooltip().is_visible());

    chart.set_visible(&id, true).unwrap();
    assert!(chart.backend().is_visible(container));
    assert_eq!(
        chart.set_visible(&LayerId::from("nope"), true),
        Err(ComposeError::UnknownLayer(LayerId::from("nope")))
    );
}

#[test]
fn removing_a_layer_clears_its_scene_and_tooltip() {
    let mut chart = chart();
    chart.create_layer(LayerSpec::new(LayerKind::Axis).with_id("axis")).unwrap();
    chart
        .create_layer(bars("bars", &[("a", 5.0)]).with_nice(zero_y()))
        .unwrap();
    chart.draw(Time(0)).unwrap();
    let id = LayerId::from("bars");
    let container = chart.layer(&id).unwrap().container().unwrap();
    let position = bar_center(&chart, "bars", "a");
    chart.dispatch_pointer(PointerEvent {
        kind: PointerKind::Move,
        position,
    });
    assert!(chart.tooltip().is_visible());

    chart.remove_layer(&id, Time(10)).unwrap();
    assert_eq!(chart.layer_count(), 1);
    assert!(chart.backend().node(container).is_none());
    assert!(!chart.tooltip().is_visible());

    chart.destroy(Time(20)).unwrap();
    assert_eq!(chart.layer_count(), 0);
    assert!(chart.backend().is_empty());
}

#[test]
fn destroy_tears_down_every_layer() {
    let fade = AnimationSpec::new(AnimationParams::Fade(RampParams::new(0.0, 1.0)))
        .with_duration(Duration(400));
    let mut chart = chart();
    chart.create_layer(LayerSpec::new(LayerKind::Axis).with_id("axis")).unwrap();
    chart.create_layer(LayerSpec::new(LayerKind::Legend).with_id("legend")).unwrap();
    chart
        .create_layer(
            bars("bars", &[("a", 5.0), ("b", 3.0)])
                .with_nice(zero_y())
                .with_animation(AnimationPlan::new().with("bar", fade)),
        )
        .unwrap();
    chart
        .create_layer(
            LayerSpec::new(LayerKind::Line)
                .with_id("rate")
                .with_axis(AxisRole::Minor)
                .with_data([Datum::new("a", 0.5), Datum::new("b", 0.25)]),
        )
        .unwrap();
    chart.draw(Time(0)).unwrap();
    chart.tick(Time(50)).unwrap();
    let position = bar_center(&chart, "bars", "a");
    chart.dispatch_pointer(PointerEvent {
        kind: PointerKind::Move,
        position,
    });
    assert!(chart.tooltip().is_visible());
    assert!(!chart.backend().is_empty());

    // Teardown happens mid-animation.
    chart.destroy(Time(100)).unwrap();
    assert_eq!(chart.layer_count(), 0);
    assert!(chart.backend().is_empty());
    assert!(!chart.tooltip().is_visible());
}
