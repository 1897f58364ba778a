// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Composes a bar and line chart over an in-memory scene and drives its animations.

use kurbo::Point;
use peniko::Color;
use strata_charts::{
    AnimationPlan, AxisRole, Chart, ChartConfig, Datum, LayerEvent, LayerId, LayerKind, LayerSpec,
    LayerStyle, NiceConfig, NiceSet, PointerEvent, PointerKind, SceneTree,
};
use strata_core::{
    AnimationParams, AnimationSpec, Duration, Ease, Lifecycle, LifecycleState, Priority,
    RampParams, Time,
};
use tracing::{error, info, warn};

const END: u64 = 2000;
const STEP: u64 = 50;

fn sales() -> Vec<Datum> {
    [
        ("Mon", "north", 12.0),
        ("Mon", "south", 7.0),
        ("Tue", "north", 18.0),
        ("Tue", "south", 9.0),
        ("Wed", "north", 9.0),
        ("Wed", "south", 14.0),
        ("Thu", "north", 21.0),
        ("Thu", "south", 11.0),
    ]
    .into_iter()
    .map(|(day, region, value)| Datum::new(day, value).with_series(region))
    .collect()
}

fn conversion() -> Vec<Datum> {
    [("Mon", 0.31), ("Tue", 0.42), ("Wed", 0.27), ("Thu", 0.38)]
        .into_iter()
        .map(|(day, rate)| Datum::new(day, rate).with_series("conversion"))
        .collect()
}

fn bar_entrance() -> AnimationPlan {
    let fade = AnimationSpec::new(AnimationParams::Fade(
        RampParams::new(0.0, 1.0).with_stagger(Duration(40)),
    ))
    .with_id("bars/fade")
    .with_duration(Duration(400))
    .with_ease(Ease::OutCubic);
    let zoom = AnimationSpec::new(AnimationParams::Zoom(
        RampParams::new(1.0, 1.15).with_alternate(true),
    ))
    .with_id("bars/zoom")
    .with_duration(Duration(300))
    .with_ease(Ease::InOutQuad);
    AnimationPlan::new()
        .with("bar", fade)
        .with("bar", zoom)
        .with_priority(Priority::Sequential)
}

fn build(chart: &mut Chart<SceneTree>) -> Result<LayerId, strata_charts::ComposeError> {
    chart.create_layer(LayerSpec::new(LayerKind::Axis).with_id("axis"))?;
    chart.create_layer(LayerSpec::new(LayerKind::Legend).with_id("legend"))?;
    let bars = chart.create_layer(
        LayerSpec::new(LayerKind::Rect)
            .with_id("sales")
            .with_data(sales())
            .with_nice(NiceSet {
                y: NiceConfig::default().with_zero(true),
                x: NiceConfig::default().with_padding_inner(0.2),
                ..NiceSet::default()
            })
            .with_animation(bar_entrance())
            .on(LayerEvent::HOVER, |e| {
                info!(layer = %e.layer, label = ?e.label, value = ?e.value, "hover");
                Ok(())
            }),
    )?;
    chart.create_layer(
        LayerSpec::new(LayerKind::Line)
            .with_id("conversion")
            .with_axis(AxisRole::Minor)
            .with_data(conversion())
            .with_style(LayerStyle {
                color: Some(Color::from_rgb8(0x33, 0x33, 0x33)),
                ..LayerStyle::default()
            }),
    )?;
    Ok(bars)
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_target(false)
        .init();

    let mut chart = Chart::new(ChartConfig::new(640.0, 400.0), SceneTree::default());
    let bars = match build(&mut chart) {
        Ok(id) => id,
        Err(err) => {
            error!(%err, "chart composition failed");
            return;
        }
    };
    if let Err(err) = chart.draw(Time(0)) {
        error!(%err, "initial draw failed");
        return;
    }
    info!(
        layers = chart.layer_count(),
        nodes = chart.backend().len(),
        "chart drawn"
    );

    let mut last = None;
    let mut t = STEP;
    while t <= END {
        let now = Time(t);
        if let Err(err) = chart.tick(now) {
            error!(%err, at = t, "animation tick failed");
            return;
        }
        let state = chart
            .layer(&bars)
            .and_then(|layer| layer.queue())
            .map(|queue| queue.state());
        if state != last {
            info!(at = t, ?state, "bar animation");
            last = state;
        }
        if state == Some(LifecycleState::Ended) {
            break;
        }
        t += STEP;
    }

    let hover = chart.layer(&bars).and_then(|layer| {
        layer
            .shapes()
            .iter()
            .find(|shape| shape.label.is_some())
            .map(|shape| shape.bounds.center())
    });
    match hover {
        Some(position) => {
            chart.dispatch_pointer(PointerEvent {
                kind: PointerKind::Move,
                position,
            });
            info!(text = chart.tooltip().text(), "tooltip");
        }
        None => warn!("no bar to hover"),
    }
    chart.dispatch_pointer(PointerEvent {
        kind: PointerKind::Leave,
        position: Point::ORIGIN,
    });

    if let Err(err) = chart.set_data(&bars, sales().into_iter().rev().collect(), Time(t)) {
        error!(%err, "update failed");
    }
    if let Err(err) = chart.destroy(Time(t + STEP)) {
        error!(%err, "teardown failed");
    }
}
