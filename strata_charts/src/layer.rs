// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The layer model.
//!
//! A [`Layer`] is one composable piece of a chart: its data, the scales it requests, the
//! working scales it draws with, its container in the backend, an optional animation plan,
//! and its own event bus. What differs between kinds lives behind [`LayerBehavior`]; the
//! chart only talks to [`Layer`].

extern crate alloc;

use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use kurbo::{Point, Rect, Shape as _};
use peniko::Color;
use strata_core::{
    AnimationError, AnimationQueue, AnimationSpec, Callback, Duration, EventBus, Handle,
    Lifecycle, Priority, QueueOptions, Time,
};
use tracing::{debug, error, trace};

use crate::backend::{Backend, Primitive};
use crate::layout::{ChartLayout, LayoutRegion};
use crate::measure::{HeuristicTextMeasurer, TextMeasurer};
use crate::scale::{Domain, NiceSet, Scale, ScaleSet};
use crate::tooltip::Tooltip;
use crate::ComposeError;

/// Identifies a layer within a chart.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(String);

impl LayerId {
    /// Creates an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LayerId {
    fn from(id: &str) -> Self {
        Self(id.into())
    }
}

impl From<String> for LayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// The closed set of layer kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerKind {
    /// Owns the shared scales and draws ticks and labels.
    Axis,
    /// Swatches and labels for every other layer's categories.
    Legend,
    /// Bars.
    Rect,
    /// Polylines.
    Line,
    /// Scatter points.
    Point,
    /// Pie or donut sectors on polar scales.
    Arc,
    /// Geographic points on longitude/latitude scales.
    Basemap,
    /// A selection band.
    Brush,
    /// Free text in the container region.
    Text,
}

impl LayerKind {
    /// Every kind.
    pub const ALL: [Self; 9] = [
        Self::Axis,
        Self::Legend,
        Self::Rect,
        Self::Line,
        Self::Point,
        Self::Arc,
        Self::Basemap,
        Self::Brush,
        Self::Text,
    ];

    /// Returns the type tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Axis => "axis",
            Self::Legend => "legend",
            Self::Rect => "rect",
            Self::Line => "line",
            Self::Point => "point",
            Self::Arc => "arc",
            Self::Basemap => "basemap",
            Self::Brush => "brush",
            Self::Text => "text",
        }
    }

    /// Returns `true` for kinds a chart may hold at most once.
    pub fn is_unique(self) -> bool {
        matches!(self, Self::Axis | Self::Legend)
    }

    /// Returns `true` for kinds whose requests feed reconciliation.
    pub fn is_independent(self) -> bool {
        !self.is_unique()
    }

    /// Region used when the options do not name one.
    pub fn default_region(self) -> LayoutRegion {
        match self {
            Self::Text | Self::Legend => LayoutRegion::Container,
            _ => LayoutRegion::Main,
        }
    }

    /// Coordinate system used when the options do not name one.
    pub fn default_coordinate(self) -> Coordinate {
        match self {
            Self::Arc => Coordinate::Polar,
            Self::Basemap => Coordinate::Geographic,
            _ => Coordinate::Cartesian,
        }
    }

    fn is_interactive(self) -> bool {
        matches!(
            self,
            Self::Rect | Self::Line | Self::Point | Self::Arc | Self::Basemap
        )
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayerKind {
    type Err = ComposeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ComposeError::UnknownKind(s.into()))
    }
}

/// Which vertical scale a cartesian layer uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AxisRole {
    /// The primary `y` scale.
    #[default]
    Major,
    /// The secondary `y_minor` scale.
    Minor,
}

/// How a layer's requests map onto the shared scale roles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Coordinate {
    /// `x` and `y` (or `y_minor`).
    #[default]
    Cartesian,
    /// `angle` and `radius`.
    Polar,
    /// Longitude on `x`, latitude on `y`.
    Geographic,
}

/// How series within a layer share the value axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LayerMode {
    /// Series side by side.
    #[default]
    Group,
    /// Series stacked on each other.
    Stack,
}

/// Per-layer options.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayerOptions {
    /// Explicit id; the chart generates one when absent.
    pub id: Option<LayerId>,
    /// Drawing region; defaults by kind.
    pub layout: Option<LayoutRegion>,
    /// Vertical scale role.
    pub axis: AxisRole,
    /// Coordinate system; defaults by kind.
    pub coordinate: Option<Coordinate>,
    /// Series arrangement.
    pub mode: LayerMode,
}

/// One data row.
///
/// Rows carry a category, an optional series, and two numbers whose meaning depends on
/// the kind: bars and lines use `value` only, points use `(x, value)`, basemaps use
/// longitude and latitude, text layers place `category` at `(x, value)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Datum {
    /// Category (or label).
    pub category: String,
    /// Series within the category.
    pub series: Option<String>,
    /// Horizontal value.
    pub x: f64,
    /// Vertical value.
    pub value: f64,
}

impl Datum {
    /// Creates a row with `x = 0`.
    pub fn new(category: impl Into<String>, value: f64) -> Self {
        Self {
            category: category.into(),
            series: None,
            x: 0.0,
            value,
        }
    }

    /// Sets the series.
    pub fn with_series(mut self, series: impl Into<String>) -> Self {
        self.series = Some(series.into());
        self
    }

    /// Sets the horizontal value.
    pub fn with_x(mut self, x: f64) -> Self {
        self.x = x;
        self
    }

    /// The series if present, else the category.
    pub fn key(&self) -> &str {
        self.series.as_deref().unwrap_or(&self.category)
    }
}

/// Layer data.
pub type LayerData = Vec<Datum>;

/// Scale options of a layer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScaleOptions {
    /// Normalization requests by role.
    pub nice: NiceSet,
}

/// Visual parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerStyle {
    /// Fixed mark color; category colors are used when unset.
    pub color: Option<Color>,
    /// Line and rule width.
    pub stroke_width: f64,
    /// Point radius.
    pub point_radius: f64,
    /// Inner radius of arcs (0 for a pie).
    pub inner_radius: f64,
    /// Label font size.
    pub font_size: f64,
    /// Label color.
    pub text_color: Color,
    /// Legend columns.
    pub columns: usize,
}

impl Default for LayerStyle {
    fn default() -> Self {
        Self {
            color: None,
            stroke_width: 2.0,
            point_radius: 4.0,
            inner_radius: 0.0,
            font_size: 11.0,
            text_color: Color::from_rgb8(0x33, 0x33, 0x33),
            columns: 1,
        }
    }
}

/// An animation of every child of a layer tagged with `class`.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerAnimation {
    /// Class of the drawn children to animate.
    pub class: String,
    /// The animation; its targets are filled in at draw time.
    pub spec: AnimationSpec,
}

/// The animations a layer replays after every draw.
#[derive(Clone, Debug, Default)]
pub struct AnimationPlan {
    /// Animations in member order.
    pub animations: Vec<LayerAnimation>,
    /// Bucket grouping.
    pub priority: Priority,
    /// Whether the whole plan loops.
    pub looping: bool,
}

impl AnimationPlan {
    /// Creates an empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an animation of children tagged `class`.
    pub fn with(mut self, class: impl Into<String>, spec: AnimationSpec) -> Self {
        self.animations.push(LayerAnimation {
            class: class.into(),
            spec,
        });
        self
    }

    /// Sets the bucket grouping.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Enables or disables looping.
    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Returns `true` if there is nothing to play.
    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }
}

/// Pointer input kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerKind {
    /// The pointer moved.
    Move,
    /// A click.
    Click,
    /// The pointer left the chart.
    Leave,
}

impl PointerKind {
    /// Event name on the chart bus.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Move => "pointermove",
            Self::Click => "click",
            Self::Leave => "pointerleave",
        }
    }
}

/// Pointer input in chart coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    /// What happened.
    pub kind: PointerKind,
    /// Where.
    pub position: Point,
}

/// A pointer interaction with one layer's marks.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerEvent {
    /// The layer that was hit (or left).
    pub layer: LayerId,
    /// The pointer input.
    pub kind: PointerKind,
    /// Pointer position.
    pub position: Point,
    /// Label of the hit mark.
    pub label: Option<String>,
    /// Value of the hit mark.
    pub value: Option<f64>,
}

impl LayerEvent {
    /// Fired when the pointer moves over a mark.
    pub const HOVER: &str = "hover";
    /// Fired when a mark is clicked.
    pub const CLICK: &str = "click";
    /// Fired when the pointer leaves the layer's marks.
    pub const LEAVE: &str = "leave";
}

/// Everything needed to create a layer.
pub struct LayerSpec {
    /// Kind.
    pub kind: LayerKind,
    /// Options.
    pub options: LayerOptions,
    /// Data rows.
    pub data: LayerData,
    /// Scale options.
    pub scale: ScaleOptions,
    /// Style.
    pub style: LayerStyle,
    /// Animations replayed after every draw.
    pub animation: AnimationPlan,
    /// Handlers registered on the layer's bus, by event name.
    pub events: Vec<(String, Callback<LayerEvent>)>,
}

impl fmt::Debug for LayerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerSpec")
            .field("kind", &self.kind)
            .field("options", &self.options)
            .field("data", &self.data)
            .field("scale", &self.scale)
            .field("style", &self.style)
            .field("animation", &self.animation)
            .field(
                "events",
                &self.events.iter().map(|(name, _)| name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl LayerSpec {
    /// Creates a spec with default options and no data.
    pub fn new(kind: LayerKind) -> Self {
        Self {
            kind,
            options: LayerOptions::default(),
            data: Vec::new(),
            scale: ScaleOptions::default(),
            style: LayerStyle::default(),
            animation: AnimationPlan::default(),
            events: Vec::new(),
        }
    }

    /// Creates a spec from a type tag such as `"rect"`.
    pub fn from_tag(tag: &str) -> Result<Self, ComposeError> {
        Ok(Self::new(tag.parse()?))
    }

    /// Sets the id.
    pub fn with_id(mut self, id: impl Into<LayerId>) -> Self {
        self.options.id = Some(id.into());
        self
    }

    /// Sets the drawing region.
    pub fn with_layout(mut self, region: LayoutRegion) -> Self {
        self.options.layout = Some(region);
        self
    }

    /// Sets the vertical scale role.
    pub fn with_axis(mut self, axis: AxisRole) -> Self {
        self.options.axis = axis;
        self
    }

    /// Sets the coordinate system.
    pub fn with_coordinate(mut self, coordinate: Coordinate) -> Self {
        self.options.coordinate = Some(coordinate);
        self
    }

    /// Sets the series arrangement.
    pub fn with_mode(mut self, mode: LayerMode) -> Self {
        self.options.mode = mode;
        self
    }

    /// Sets the data rows.
    pub fn with_data(mut self, data: impl IntoIterator<Item = Datum>) -> Self {
        self.data = data.into_iter().collect();
        self
    }

    /// Sets the normalization requests.
    pub fn with_nice(mut self, nice: NiceSet) -> Self {
        self.scale.nice = nice;
        self
    }

    /// Sets the style.
    pub fn with_style(mut self, style: LayerStyle) -> Self {
        self.style = style;
        self
    }

    /// Sets the animation plan.
    pub fn with_animation(mut self, plan: AnimationPlan) -> Self {
        self.animation = plan;
        self
    }

    /// Adds a handler for the layer event `name`.
    pub fn on<F>(mut self, name: &str, handler: F) -> Self
    where
        F: FnMut(&LayerEvent) -> Result<(), strata_core::ListenerError> + 'static,
    {
        self.events.push((name.into(), Box::new(handler)));
        self
    }
}

/// A legend row.
#[derive(Clone, Debug, PartialEq)]
pub struct LegendEntry {
    /// Category label.
    pub label: String,
    /// Swatch color.
    pub color: Color,
    /// The layer the category came from.
    pub layer: LayerId,
}

/// A drawn primitive as remembered for hit-testing.
#[derive(Clone, Debug, PartialEq)]
pub struct Shape {
    /// Backend handle.
    pub handle: Handle,
    /// Class tag.
    pub class: String,
    /// Approximate bounds.
    pub bounds: Rect,
    /// Label of a data mark; decorations have none.
    pub label: Option<String>,
    /// Value of a data mark.
    pub value: Option<f64>,
}

fn primitive_bounds(primitive: &Primitive) -> Rect {
    match primitive {
        Primitive::Rect { rect, .. } => rect.abs(),
        Primitive::Path { path, width, .. } => path.bounding_box().inflate(0.5 * width, 0.5 * width),
        Primitive::Area { path, .. } => path.bounding_box(),
        Primitive::Circle { center, radius, .. } => {
            Rect::from_center_size(*center, (2.0 * radius, 2.0 * radius))
        }
        Primitive::Text {
            origin, text, size, ..
        } => {
            let (w, h) = HeuristicTextMeasurer.measure(text, *size);
            Rect::new(origin.x, origin.y - h, origin.x + w, origin.y)
        }
    }
}

/// Shared environment for drawing, ticking and reconciling layers.
pub struct LayerCx<'a> {
    /// The rendering backend.
    pub backend: &'a mut dyn Backend,
    /// Current regions.
    pub layout: ChartLayout,
    /// Category colors.
    pub palette: &'a [Color],
    /// Coalescing window for animation queues.
    pub throttle: Duration,
    /// Chart clock.
    pub now: Time,
}

impl fmt::Debug for LayerCx<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerCx")
            .field("layout", &self.layout)
            .field("palette", &self.palette)
            .field("throttle", &self.throttle)
            .field("now", &self.now)
            .finish_non_exhaustive()
    }
}

/// Draws one layer into its fresh container.
pub struct Painter<'a> {
    backend: &'a mut dyn Backend,
    container: Handle,
    /// The layer's region.
    pub region: Rect,
    /// All regions.
    pub layout: ChartLayout,
    /// Working scales.
    pub scales: &'a ScaleSet,
    /// Data rows.
    pub data: &'a [Datum],
    /// Style.
    pub style: &'a LayerStyle,
    /// Series arrangement.
    pub mode: LayerMode,
    /// Bound legend rows (legend layers only).
    pub legend: &'a [LegendEntry],
    shapes: Vec<Shape>,
}

impl fmt::Debug for Painter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Painter")
            .field("container", &self.container)
            .field("region", &self.region)
            .field("shapes", &self.shapes.len())
            .finish_non_exhaustive()
    }
}

impl Painter<'_> {
    fn push(
        &mut self,
        class: &str,
        primitive: Primitive,
        label: Option<String>,
        value: Option<f64>,
    ) -> Handle {
        let bounds = primitive_bounds(&primitive);
        let handle = self.backend.draw(self.container, class, primitive);
        self.shapes.push(Shape {
            handle,
            class: class.into(),
            bounds,
            label,
            value,
        });
        handle
    }

    /// Draws a decoration (ticks, labels, swatches) that does not respond to the pointer.
    pub fn draw(&mut self, class: &str, primitive: Primitive) -> Handle {
        self.push(class, primitive, None, None)
    }

    /// Draws a data mark that the pointer can hit.
    pub fn mark(
        &mut self,
        class: &str,
        primitive: Primitive,
        label: impl Into<String>,
        value: f64,
    ) -> Handle {
        self.push(class, primitive, Some(label.into()), Some(value))
    }

    /// Color for `key`: the style color if set, else the working color scale.
    pub fn color(&self, key: &str) -> Color {
        if let Some(color) = self.style.color {
            return color;
        }
        self.scales
            .color
            .as_ref()
            .map_or(Color::BLACK, |scale| scale.color(key))
    }

    /// Shapes drawn so far.
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }
}

/// What differs between layer kinds.
pub trait LayerBehavior: fmt::Debug {
    /// Derives the scale request from the data.
    fn request(&self, _data: &[Datum], _mode: LayerMode) -> ScaleSet {
        ScaleSet::default()
    }

    /// Assigns ranges to merged scales and normalizes them (axis layers only).
    fn normalize(
        &self,
        _scales: &mut ScaleSet,
        _nice: &NiceSet,
        _layout: &ChartLayout,
        _palette: &[Color],
    ) {
    }

    /// Draws the layer.
    fn draw(&self, painter: &mut Painter<'_>);
}

/// One layer of a chart.
#[derive(Debug)]
pub struct Layer {
    id: LayerId,
    kind: LayerKind,
    region: LayoutRegion,
    axis: AxisRole,
    coordinate: Coordinate,
    mode: LayerMode,
    data: LayerData,
    nice: NiceSet,
    style: LayerStyle,
    plan: AnimationPlan,
    behavior: Box<dyn LayerBehavior>,
    request: ScaleSet,
    scale: ScaleSet,
    legend: Vec<LegendEntry>,
    container: Option<Handle>,
    shapes: Vec<Shape>,
    queue: Option<AnimationQueue>,
    events: EventBus<LayerEvent>,
    visible: bool,
}

impl Layer {
    /// Category under which handlers from [`LayerSpec::events`] are registered.
    pub const SPEC_HANDLERS: &str = "spec";

    pub(crate) fn new(id: LayerId, spec: LayerSpec, behavior: Box<dyn LayerBehavior>) -> Self {
        let LayerSpec {
            kind,
            options,
            data,
            scale,
            style,
            animation,
            events: handlers,
        } = spec;
        let mut events = EventBus::new();
        for (name, handler) in handlers {
            events.on(&name, Self::SPEC_HANDLERS, handler);
        }
        let request = behavior.request(&data, options.mode);
        Self {
            id,
            kind,
            region: options.layout.unwrap_or(kind.default_region()),
            axis: options.axis,
            coordinate: options.coordinate.unwrap_or(kind.default_coordinate()),
            mode: options.mode,
            data,
            nice: scale.nice,
            style,
            plan: animation,
            behavior,
            request,
            scale: ScaleSet::default(),
            legend: Vec::new(),
            container: None,
            shapes: Vec::new(),
            queue: None,
            events,
            visible: true,
        }
    }

    /// Id.
    pub fn id(&self) -> &LayerId {
        &self.id
    }

    /// Kind.
    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    /// Drawing region.
    pub fn region(&self) -> LayoutRegion {
        self.region
    }

    /// Vertical scale role.
    pub fn axis_role(&self) -> AxisRole {
        self.axis
    }

    /// Coordinate system.
    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    /// Data rows.
    pub fn data(&self) -> &[Datum] {
        &self.data
    }

    /// Normalization requests.
    pub fn nice(&self) -> &NiceSet {
        &self.nice
    }

    /// Scales requested from the data.
    pub fn requested_scales(&self) -> &ScaleSet {
        &self.request
    }

    /// Working scales.
    pub fn scales(&self) -> &ScaleSet {
        &self.scale
    }

    /// Bound legend rows.
    pub fn legend(&self) -> &[LegendEntry] {
        &self.legend
    }

    /// Backend container, once drawn.
    pub fn container(&self) -> Option<Handle> {
        self.container
    }

    /// Shapes from the last draw.
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// The animation queue of the last draw.
    pub fn queue(&self) -> Option<&AnimationQueue> {
        self.queue.as_ref()
    }

    /// The layer's pointer event bus.
    pub fn events(&mut self) -> &mut EventBus<LayerEvent> {
        &mut self.events
    }

    /// Returns `true` unless hidden.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Replaces the working scales.
    pub fn set_scales(&mut self, scales: ScaleSet) {
        self.scale = scales;
    }

    /// Recomputes the scale request from the data.
    pub fn update(&mut self) {
        self.request = self.behavior.request(&self.data, self.mode);
    }

    /// Replaces the data and recomputes the scale request.
    pub fn set_data(&mut self, data: LayerData) {
        self.data = data;
        self.update();
    }

    /// Adopts `merged` as the working scales and normalizes them.
    pub(crate) fn normalize(
        &mut self,
        merged: ScaleSet,
        nice: &NiceSet,
        layout: &ChartLayout,
        palette: &[Color],
    ) {
        self.scale = merged;
        self.behavior
            .normalize(&mut self.scale, nice, layout, palette);
    }

    /// Legend rows for the categories this layer requested, colored by its working scale.
    pub fn legend_entries(&self) -> Vec<LegendEntry> {
        let Some(requested) = &self.request.color else {
            return Vec::new();
        };
        requested
            .categories()
            .iter()
            .map(|label| LegendEntry {
                label: label.clone(),
                color: self.style.color.unwrap_or_else(|| {
                    self.scale
                        .color
                        .as_ref()
                        .map_or(Color::BLACK, |scale| scale.color(label))
                }),
                layer: self.id.clone(),
            })
            .collect()
    }

    /// Binds legend rows.
    pub fn bind_legend(&mut self, entries: Vec<LegendEntry>) {
        self.legend = entries;
    }

    fn clear(&mut self, backend: &mut dyn Backend, now: Time) -> Result<(), AnimationError> {
        if let Some(mut queue) = self.queue.take() {
            queue.destroy(now)?;
        }
        if let Some(container) = self.container.take() {
            backend.remove(container);
        }
        self.shapes.clear();
        Ok(())
    }

    /// Redraws the layer from scratch and replays its animation plan.
    ///
    /// Returns `Err` only for fatal animation errors.
    pub fn draw(&mut self, cx: &mut LayerCx<'_>) -> Result<(), AnimationError> {
        self.clear(&mut *cx.backend, cx.now)?;
        let root = cx.backend.root();
        let container = cx.backend.create_subcontainer(root, self.kind.as_str());
        cx.backend.set_visible(container, self.visible);
        let mut painter = Painter {
            backend: &mut *cx.backend,
            container,
            region: cx.layout.region(self.region),
            layout: cx.layout,
            scales: &self.scale,
            data: &self.data,
            style: &self.style,
            mode: self.mode,
            legend: &self.legend,
            shapes: Vec::new(),
        };
        self.behavior.draw(&mut painter);
        self.shapes = painter.shapes;
        self.container = Some(container);
        trace!(layer = %self.id, shapes = self.shapes.len(), "layer drawn");
        self.replay(cx, container)
    }

    fn replay(&mut self, cx: &mut LayerCx<'_>, container: Handle) -> Result<(), AnimationError> {
        if self.plan.is_empty() {
            return Ok(());
        }
        let options = QueueOptions::new(format!("{}/animation", self.id))
            .with_engine(cx.backend.engine())
            .with_looping(self.plan.looping)
            .with_throttle(cx.throttle);
        let mut queue = AnimationQueue::new(options);
        for animation in &self.plan.animations {
            let targets = cx.backend.children(container, &animation.class);
            if targets.is_empty() {
                debug!(layer = %self.id, class = %animation.class, "animation has no targets");
            }
            queue.push_animation(animation.spec.clone().with_targets(targets));
        }
        queue.connect(self.plan.priority.clone());
        queue.play(cx.now)?;
        self.queue = Some(queue);
        Ok(())
    }

    /// Advances the animation queue and applies its property updates.
    pub fn tick(&mut self, backend: &mut dyn Backend, now: Time) -> Result<(), AnimationError> {
        let Some(queue) = &mut self.queue else {
            return Ok(());
        };
        queue.tick(now)?;
        let mut updates = Vec::new();
        queue.drain_updates(&mut updates);
        for update in &updates {
            backend.apply(update);
        }
        Ok(())
    }

    /// Shows or hides the layer.
    pub fn set_visible(&mut self, backend: &mut dyn Backend, visible: bool) {
        self.visible = visible;
        if let Some(container) = self.container {
            backend.set_visible(container, visible);
        }
    }

    /// Hit-tests `event` against the drawn marks, fires the layer's bus and writes the
    /// shared tooltip.
    pub fn pointer(&mut self, event: &PointerEvent, tooltip: &mut Tooltip) {
        if !self.visible || !self.kind.is_interactive() {
            return;
        }
        let hit = match event.kind {
            PointerKind::Leave => None,
            PointerKind::Move | PointerKind::Click => self
                .shapes
                .iter()
                .rev()
                .find(|shape| shape.label.is_some() && shape.bounds.contains(event.position)),
        };
        let (name, label, value) = match hit {
            Some(shape) => {
                let name = match event.kind {
                    PointerKind::Click => LayerEvent::CLICK,
                    _ => LayerEvent::HOVER,
                };
                (name, shape.label.clone(), shape.value)
            }
            None => {
                if !tooltip.hide(&self.id) {
                    return;
                }
                (LayerEvent::LEAVE, None, None)
            }
        };
        if let (Some(label), Some(value)) = (&label, value) {
            tooltip.show(&self.id, event.position, format!("{label}: {value}"));
        }
        let layer_event = LayerEvent {
            layer: self.id.clone(),
            kind: event.kind,
            position: event.position,
            label,
            value,
        };
        if let Err(err) = self.events.fire(name, &layer_event) {
            error!(layer = %self.id, event = name, %err, "layer listener failed");
        }
    }

    /// Stops animations, removes the container and drops every listener.
    pub fn destroy(&mut self, backend: &mut dyn Backend, now: Time) -> Result<(), AnimationError> {
        self.events.clear();
        self.clear(backend, now)
    }
}

/// Distinct categories in data order.
pub(crate) fn categories(data: &[Datum]) -> Vec<&str> {
    let mut out: Vec<&str> = Vec::new();
    for d in data {
        if !out.contains(&d.category.as_str()) {
            out.push(&d.category);
        }
    }
    out
}

/// Distinct series keys in data order.
pub(crate) fn keys(data: &[Datum]) -> Vec<&str> {
    let mut out: Vec<&str> = Vec::new();
    for d in data {
        if !out.contains(&d.key()) {
            out.push(d.key());
        }
    }
    out
}

/// Continuous domain over the values; stacked per category when `mode` is
/// [`LayerMode::Stack`].
pub(crate) fn value_domain(data: &[Datum], mode: LayerMode) -> Option<Scale> {
    let domain = match mode {
        LayerMode::Group => Domain::extent(data.iter().map(|d| d.value)),
        LayerMode::Stack => Domain::extent(categories(data).into_iter().flat_map(|c| {
            let (neg, pos) = data
                .iter()
                .filter(|d| d.category == c)
                .fold((0.0, 0.0), |(neg, pos), d| {
                    if d.value < 0.0 {
                        (neg + d.value, pos)
                    } else {
                        (neg, pos + d.value)
                    }
                });
            [neg, pos]
        })),
    };
    domain.map(Scale::new)
}
