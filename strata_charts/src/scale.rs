// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scales, scale requests and "nice" normalization.
//!
//! A layer requests a [`ScaleSet`]: per-role domains without ranges. The reconciler merges
//! every request into the axis layer, which assigns ranges from the layout and normalizes
//! the merged domains with [`normalize`]. The normalized set is then handed back to each
//! layer as its working scale.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use core::f64::consts::TAU;

#[cfg(not(feature = "std"))]
#[cfg_attr(
    test,
    allow(
        unused_imports,
        reason = "test builds link `std`, whose inherent float methods take precedence"
    )
)]
use crate::float::FloatExt;

use kurbo::Rect;
use peniko::Color;
use tracing::warn;

/// A linear mapping from a continuous domain to a continuous range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleLinear {
    domain: (f64, f64),
    range: (f64, f64),
}

impl ScaleLinear {
    /// Creates a new scale mapping `domain` values to `range` values.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Maps a value from domain space into range space.
    pub fn map(&self, x: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let denom = d1 - d0;
        if denom == 0.0 {
            return r0;
        }
        let t = (x - d0) / denom;
        r0 + t * (r1 - r0)
    }

    /// Returns “nice-ish” tick values for the domain.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        nice_ticks(self.domain.0, self.domain.1, count)
    }
}

/// Tick values covering `[min, max]` on a 1/2/5 × 10ⁿ grid.
pub fn nice_ticks(mut min: f64, mut max: f64, count: usize) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }
    if min == max {
        return alloc::vec![min];
    }
    if min > max {
        core::mem::swap(&mut min, &mut max);
    }
    let span = max - min;
    let step = nice_step(span / count as f64);
    if step == 0.0 {
        return alloc::vec![min, max];
    }

    let start = (min / step).floor() * step;
    let stop = (max / step).ceil() * step;

    let n_f = ((stop - start) / step).round();
    let n = if n_f.is_finite() && n_f >= 0.0 {
        let n_f = n_f.min(10_000.0);
        #[allow(
            clippy::cast_possible_truncation,
            reason = "guarded by finite/non-negative checks and capped at 10k"
        )]
        {
            n_f as u64
        }
    } else {
        0
    };
    (0..=n).map(|i| start + step * i as f64).collect()
}

fn nice_step(step: f64) -> f64 {
    if !step.is_finite() || step <= 0.0 {
        return 0.0;
    }
    let base = 10_f64.powf(step.log10().floor());
    let error = step / base;
    let nice = if error >= 7.5 {
        10.0
    } else if error >= 3.5 {
        5.0
    } else if error >= 1.5 {
        2.0
    } else {
        1.0
    };
    nice * base
}

/// A discrete band scale for categorical charts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleBand {
    range: (f64, f64),
    count: usize,
    padding_inner: f64,
    padding_outer: f64,
}

impl ScaleBand {
    /// Creates a new band scale covering `count` bands over `range`.
    pub fn new(range: (f64, f64), count: usize) -> Self {
        Self {
            range,
            count,
            padding_inner: 0.1,
            padding_outer: 0.1,
        }
    }

    /// Sets inner and outer padding in band units.
    pub fn with_padding(mut self, inner: f64, outer: f64) -> Self {
        self.padding_inner = inner.max(0.0);
        self.padding_outer = outer.max(0.0);
        self
    }

    /// Returns the computed band width.
    pub fn band_width(&self) -> f64 {
        let (r0, r1) = self.range;
        let n = self.count as f64;
        if n <= 0.0 {
            return 0.0;
        }
        let denom = n + self.padding_inner * (n - 1.0) + 2.0 * self.padding_outer;
        if denom == 0.0 {
            0.0
        } else {
            (r1 - r0).abs() / denom
        }
    }

    /// Returns the start position of the band at `index`.
    pub fn x(&self, index: usize) -> f64 {
        let (r0, r1) = self.range;
        let bw = self.band_width();
        let step = bw * (1.0 + self.padding_inner);
        r0.min(r1) + bw * self.padding_outer + step * index as f64
    }

    /// Range extent needed to lay out the bands at a fixed `band_width`.
    fn extent_for(&self, band_width: f64) -> f64 {
        let n = self.count as f64;
        if n <= 0.0 {
            return 0.0;
        }
        band_width * (n + self.padding_inner * (n - 1.0) + 2.0 * self.padding_outer)
    }
}

fn distinct<S: Into<String>>(categories: impl IntoIterator<Item = S>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for c in categories {
        let c = c.into();
        if !out.contains(&c) {
            out.push(c);
        }
    }
    out
}

/// The values a scale maps from.
#[derive(Clone, Debug, PartialEq)]
pub enum Domain {
    /// Ordered distinct categories.
    Ordinal(Vec<String>),
    /// A numeric interval `(min, max)`.
    Continuous(f64, f64),
}

impl Domain {
    /// Builds an ordinal domain, keeping the first occurrence of each category.
    pub fn ordinal<S: Into<String>>(categories: impl IntoIterator<Item = S>) -> Self {
        Self::Ordinal(distinct(categories))
    }

    /// Builds the hull of the finite `values`, or `None` if there are none.
    pub fn extent(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for v in values.into_iter().filter(|v| v.is_finite()) {
            min = min.min(v);
            max = max.max(v);
        }
        (min <= max).then_some(Self::Continuous(min, max))
    }

    /// Merges `other` into `self`.
    ///
    /// Continuous domains take their hull; ordinal domains take the ordered union.
    /// Returns `false` (leaving `self` unchanged) when the kinds differ.
    pub fn merge(&mut self, other: &Self) -> bool {
        match (self, other) {
            (Self::Continuous(a0, a1), Self::Continuous(b0, b1)) => {
                *a0 = a0.min(*b0);
                *a1 = a1.max(*b1);
                true
            }
            (Self::Ordinal(a), Self::Ordinal(b)) => {
                for c in b {
                    if !a.contains(c) {
                        a.push(c.clone());
                    }
                }
                true
            }
            _ => false,
        }
    }
}

/// Anchor of a band range shrunk to a fixed band width.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FixedBoundary {
    /// Keep the start of the range.
    #[default]
    Start,
    /// Center within the range.
    Center,
    /// Keep the end of the range.
    End,
}

/// Normalization parameters for one scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NiceConfig {
    /// Force a continuous domain to include zero.
    pub zero: bool,
    /// Target tick count for continuous rounding.
    pub count: usize,
    /// Band inner padding.
    pub padding_inner: Option<f64>,
    /// Exact band width; shrinks the range to fit.
    pub fixed_bandwidth: Option<f64>,
    /// Inner padding used with `fixed_bandwidth`.
    pub fixed_padding_inner: Option<f64>,
    /// Where a shrunk range is anchored.
    pub fixed_boundary: FixedBoundary,
}

impl Default for NiceConfig {
    fn default() -> Self {
        Self {
            zero: false,
            count: 5,
            padding_inner: None,
            fixed_bandwidth: None,
            fixed_padding_inner: None,
            fixed_boundary: FixedBoundary::Start,
        }
    }
}

impl NiceConfig {
    /// Sets zero inclusion.
    pub fn with_zero(mut self, zero: bool) -> Self {
        self.zero = zero;
        self
    }

    /// Sets the target tick count.
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count.max(1);
        self
    }

    /// Sets band inner padding.
    pub fn with_padding_inner(mut self, padding: f64) -> Self {
        self.padding_inner = Some(padding.max(0.0));
        self
    }

    /// Fixes the band width, anchoring the shrunk range at `boundary`.
    pub fn with_fixed_bandwidth(mut self, width: f64, boundary: FixedBoundary) -> Self {
        self.fixed_bandwidth = Some(width.max(0.0));
        self.fixed_boundary = boundary;
        self
    }

    /// Sets the inner padding used with a fixed band width.
    pub fn with_fixed_padding_inner(mut self, padding: f64) -> Self {
        self.fixed_padding_inner = Some(padding.max(0.0));
        self
    }

    /// Fills unset options from `other`; zero inclusion is requested by anyone.
    pub fn overlay(&mut self, other: &Self) {
        self.zero |= other.zero;
        self.padding_inner = self.padding_inner.or(other.padding_inner);
        self.fixed_bandwidth = self.fixed_bandwidth.or(other.fixed_bandwidth);
        self.fixed_padding_inner = self.fixed_padding_inner.or(other.fixed_padding_inner);
    }
}

/// Per-role normalization parameters.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NiceSet {
    /// Horizontal axis.
    pub x: NiceConfig,
    /// Primary vertical axis.
    pub y: NiceConfig,
    /// Secondary vertical axis.
    pub y_minor: NiceConfig,
    /// Polar angle.
    pub angle: NiceConfig,
    /// Polar radius.
    pub radius: NiceConfig,
}

/// A domain with its output range.
#[derive(Clone, Debug, PartialEq)]
pub struct Scale {
    domain: Domain,
    range: (f64, f64),
    padding_inner: f64,
    padding_outer: f64,
}

impl Scale {
    /// Creates a scale over `domain` with an empty range.
    pub fn new(domain: Domain) -> Self {
        Self {
            domain,
            range: (0.0, 0.0),
            padding_inner: 0.1,
            padding_outer: 0.1,
        }
    }

    /// Creates a continuous scale.
    pub fn continuous(min: f64, max: f64) -> Self {
        Self::new(Domain::Continuous(min, max))
    }

    /// Creates an ordinal scale.
    pub fn ordinal<S: Into<String>>(categories: impl IntoIterator<Item = S>) -> Self {
        Self::new(Domain::ordinal(categories))
    }

    /// Sets the output range.
    pub fn with_range(mut self, range: (f64, f64)) -> Self {
        self.range = range;
        self
    }

    /// Returns the domain.
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Returns the output range.
    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Returns `(min, max)` for continuous domains.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        match self.domain {
            Domain::Continuous(min, max) => Some((min, max)),
            Domain::Ordinal(_) => None,
        }
    }

    /// Returns the categories of an ordinal domain.
    pub fn categories(&self) -> &[String] {
        match &self.domain {
            Domain::Ordinal(c) => c,
            Domain::Continuous(..) => &[],
        }
    }

    /// Maps a continuous value into the range.
    pub fn map(&self, v: f64) -> f64 {
        match self.domain {
            Domain::Continuous(min, max) => ScaleLinear::new((min, max), self.range).map(v),
            Domain::Ordinal(_) => self.range.0,
        }
    }

    fn band_scale(&self) -> ScaleBand {
        ScaleBand::new(self.range, self.categories().len())
            .with_padding(self.padding_inner, self.padding_outer)
    }

    /// Returns `(start, width)` of the band for `category`.
    pub fn band(&self, category: &str) -> Option<(f64, f64)> {
        let index = self.categories().iter().position(|c| c == category)?;
        let band = self.band_scale();
        Some((band.x(index), band.band_width()))
    }

    /// Returns the band width of an ordinal scale.
    pub fn band_width(&self) -> f64 {
        self.band_scale().band_width()
    }

    /// Returns tick values of a continuous scale.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        match self.domain {
            Domain::Continuous(min, max) => ScaleLinear::new((min, max), self.range).ticks(count),
            Domain::Ordinal(_) => Vec::new(),
        }
    }

    /// Merges another scale's domain into this one, warning on a kind mismatch.
    pub fn merge(&mut self, other: &Self) {
        if !self.domain.merge(&other.domain) {
            warn!(
                kept = ?self.domain,
                ignored = ?other.domain,
                "cannot merge ordinal and continuous domains"
            );
        }
    }

    /// Applies `nice` to the domain (continuous) or to padding and range (ordinal).
    ///
    /// Idempotent: applying the same config again leaves the scale unchanged.
    pub fn nice(&mut self, nice: &NiceConfig) {
        if let Domain::Continuous(min, max) = &mut self.domain {
            if nice.zero {
                *min = min.min(0.0);
                *max = max.max(0.0);
            }
            // Rounding can widen the span enough to change the step, so iterate to a
            // fixed point.
            for _ in 0..10 {
                let ticks = nice_ticks(*min, *max, nice.count);
                let (Some(&first), Some(&last)) = (ticks.first(), ticks.last()) else {
                    break;
                };
                if first == *min && last == *max {
                    break;
                }
                *min = first;
                *max = last;
            }
            return;
        }
        if let Some(p) = nice.padding_inner {
            self.padding_inner = p;
        }
        if let Some(bw) = nice.fixed_bandwidth {
            if let Some(p) = nice.fixed_padding_inner {
                self.padding_inner = p;
            }
            self.fix_band_width(bw, nice.fixed_boundary);
        }
    }

    fn fix_band_width(&mut self, width: f64, boundary: FixedBoundary) {
        let extent = self.band_scale().extent_for(width);
        let (r0, r1) = self.range;
        let available = (r1 - r0).abs();
        if extent >= available {
            return;
        }
        let dir = if r1 >= r0 { 1.0 } else { -1.0 };
        let start = match boundary {
            FixedBoundary::Start => r0,
            FixedBoundary::Center => r0 + dir * (available - extent) * 0.5,
            FixedBoundary::End => r1 - dir * extent,
        };
        self.range = (start, start + dir * extent);
    }
}

/// Ordinal color assignment over a palette.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColorScale {
    domain: Vec<String>,
    palette: Vec<Color>,
}

impl ColorScale {
    /// Creates a color scale over `categories`.
    pub fn new<S: Into<String>>(categories: impl IntoIterator<Item = S>) -> Self {
        Self {
            domain: distinct(categories),
            palette: Vec::new(),
        }
    }

    /// Returns the categories.
    pub fn categories(&self) -> &[String] {
        &self.domain
    }

    /// Sets the palette colors are drawn from.
    pub fn set_palette(&mut self, palette: &[Color]) {
        self.palette = palette.to_vec();
    }

    /// Returns the color of `category`, cycling through the palette.
    pub fn color(&self, category: &str) -> Color {
        let index = self
            .domain
            .iter()
            .position(|c| c == category)
            .unwrap_or(0);
        match self.palette.len() {
            0 => Color::BLACK,
            n => self.palette[index % n],
        }
    }

    /// Appends categories not already present.
    pub fn merge(&mut self, other: &Self) {
        for c in &other.domain {
            if !self.domain.contains(c) {
                self.domain.push(c.clone());
            }
        }
    }
}

/// The scales a layer requests or works with, by role.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScaleSet {
    /// Horizontal axis.
    pub x: Option<Scale>,
    /// Primary vertical axis.
    pub y: Option<Scale>,
    /// Secondary ("minor") vertical axis.
    pub y_minor: Option<Scale>,
    /// Polar angle.
    pub angle: Option<Scale>,
    /// Polar radius.
    pub radius: Option<Scale>,
    /// Category colors.
    pub color: Option<ColorScale>,
}

/// Merges `from` into the accumulator slot `into`.
pub(crate) fn merge_slot(into: &mut Option<Scale>, from: Option<&Scale>) {
    match (into.as_mut(), from) {
        (Some(acc), Some(s)) => acc.merge(s),
        (None, Some(s)) => *into = Some(s.clone()),
        (_, None) => {}
    }
}

/// Assigns ranges from the main region and normalizes every scale in `scales`.
///
/// `palette` becomes the color range.
pub fn normalize(scales: &mut ScaleSet, nice: &NiceSet, main: Rect, palette: &[Color]) {
    let radius = 0.5 * main.width().min(main.height());
    let slots: [(&mut Option<Scale>, (f64, f64), &NiceConfig); 5] = [
        (&mut scales.x, (main.x0, main.x1), &nice.x),
        (&mut scales.y, (main.y1, main.y0), &nice.y),
        (&mut scales.y_minor, (main.y1, main.y0), &nice.y_minor),
        (&mut scales.angle, (0.0, TAU), &nice.angle),
        (&mut scales.radius, (0.0, radius), &nice.radius),
    ];
    for (slot, range, config) in slots {
        if let Some(scale) = slot {
            scale.range = range;
            scale.nice(config);
        }
    }
    if let Some(color) = &mut scales.color {
        color.set_palette(palette);
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;

    #[test]
    fn band_positions_are_monotonic() {
        let scale = ScaleBand::new((0.0, 100.0), 5);
        let a = scale.x(0);
        let b = scale.x(1);
        let c = scale.x(2);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn zero_inclusion_extends_the_domain() {
        let mut s = Scale::continuous(2.0, 10.0);
        s.nice(&NiceConfig::default().with_zero(true));
        assert_eq!(s.bounds(), Some((0.0, 10.0)));

        let mut s = Scale::continuous(-5.0, 10.0);
        s.nice(&NiceConfig::default().with_zero(true));
        let (min, max) = s.bounds().unwrap();
        assert!(min <= 0.0 && max >= 0.0);
    }

    #[test]
    fn nice_is_idempotent() {
        let config = NiceConfig::default().with_count(7);
        for (min, max) in [(0.13, 9.7), (-3.3, 47.0), (1.0, 1.0), (997.0, 1003.0)] {
            let mut once = Scale::continuous(min, max);
            once.nice(&config);
            let mut twice = once.clone();
            twice.nice(&config);
            assert_eq!(once, twice, "({min}, {max})");
        }
    }

    #[test]
    fn merge_rules_by_domain_kind() {
        let mut hull = Domain::Continuous(0.0, 5.0);
        assert!(hull.merge(&Domain::Continuous(-2.0, 3.0)));
        assert_eq!(hull, Domain::Continuous(-2.0, 5.0));

        let mut union = Domain::ordinal(["a", "b"]);
        assert!(union.merge(&Domain::ordinal(["b", "c"])));
        assert_eq!(union, Domain::ordinal(["a", "b", "c"]));

        let mut kept = Domain::ordinal(["a"]);
        assert!(!kept.merge(&Domain::Continuous(0.0, 1.0)));
        assert_eq!(kept, Domain::ordinal(["a"]));
    }

    #[test]
    fn fixed_bandwidth_shrinks_the_range() {
        let config = NiceConfig::default()
            .with_fixed_bandwidth(10.0, FixedBoundary::Center)
            .with_fixed_padding_inner(0.0);
        let mut s = Scale::ordinal(["a", "b"]).with_range((0.0, 100.0));
        s.padding_outer = 0.0;
        s.nice(&config);
        assert_eq!(s.range(), (40.0, 60.0));
        assert!((s.band_width() - 10.0).abs() < 1e-9);
        let again = {
            let mut t = s.clone();
            t.nice(&config);
            t
        };
        assert_eq!(again, s);
    }

    #[test]
    fn normalize_assigns_ranges_from_the_main_region() {
        let mut set = ScaleSet {
            x: Some(Scale::ordinal(["a", "b"])),
            y: Some(Scale::continuous(0.0, 10.0)),
            color: Some(ColorScale::new(["a", "b"])),
            ..ScaleSet::default()
        };
        let palette = vec![Color::from_rgb8(255, 0, 0), Color::from_rgb8(0, 0, 255)];
        normalize(
            &mut set,
            &NiceSet::default(),
            Rect::new(10.0, 20.0, 110.0, 220.0),
            &palette,
        );
        assert_eq!(set.x.as_ref().unwrap().range(), (10.0, 110.0));
        // Vertical scales grow upwards.
        assert_eq!(set.y.as_ref().unwrap().range(), (220.0, 20.0));
        assert_eq!(set.color.as_ref().unwrap().color("b"), palette[1]);
    }
}
