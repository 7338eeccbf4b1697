//! Responsive chart layout: classify the viewport, then derive a concrete
//! chart configuration from `(viewport, item count)`.
//!
//! The resolver is pure; the caller observes the surface width (window,
//! panel, CLI flag) and passes the resulting [`ViewportClass`] in. Nothing
//! here reads ambient global state, and the configuration is recomputed on
//! every render rather than cached.

/// Width threshold separating the two presentation tiers, in logical pixels.
pub const NARROW_BREAKPOINT_PX: u32 = 768;

/// Fixed value-axis ticks used on narrow surfaces, where auto-generated
/// scales produce unreadable gridlines.
pub const PERCENT_TICKS: [f64; 5] = [0.0, 25.0, 50.0, 75.0, 100.0];

/// Value axis domain. Percentages outside the domain are not clamped; the
/// renderer's fixed domain clips them visually.
pub const VALUE_DOMAIN: (f64, f64) = (0.0, 100.0);

const WIDE_CONTAINER_HEIGHT_PX: u32 = 360;
const NARROW_MIN_HEIGHT_PX: u32 = 260;
const NARROW_PER_ITEM_PX: u32 = 36;
const WIDE_LABEL_MAX_CHARS: usize = 24;
const NARROW_LABEL_MAX_CHARS: usize = 12;
const WIDE_BAR_THICKNESS_PX: u32 = 28;
const NARROW_BAR_THICKNESS_PX: u32 = 18;
const WIDE_TICK_FONT_PX: u32 = 13;
const NARROW_TICK_FONT_PX: u32 = 11;

/// Coarse viewport bucket. Exactly one boundary crossing at
/// [`NARROW_BREAKPOINT_PX`]; re-classify on every resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportClass {
    Narrow,
    Wide,
}

impl ViewportClass {
    /// Classify a surface width in logical pixels.
    pub fn classify(width_px: u32) -> Self {
        if width_px < NARROW_BREAKPOINT_PX {
            ViewportClass::Narrow
        } else {
            ViewportClass::Wide
        }
    }

    pub fn is_narrow(self) -> bool {
        matches!(self, ViewportClass::Narrow)
    }
}

/// How category bars flow across the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Categories run left-to-right (upright bars); the wide-tier default.
    Horizontal,
    /// Categories stack top-to-bottom (sideways bars); the narrow-tier default.
    Vertical,
}

/// Which screen axis a chart dimension is mapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Value-axis tick strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickMode {
    /// Fixed tick positions, stable regardless of data.
    Fixed(&'static [f64]),
    /// Let the renderer generate a continuous scale.
    Auto,
}

/// Concrete chart configuration derived from `(viewport, item count)`.
///
/// Derived, never stored: recompute whenever either input changes.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayoutConfig {
    pub orientation: Orientation,
    pub category_axis: Axis,
    pub value_axis: Axis,
    pub ticks: TickMode,
    /// Category labels longer than this are truncated with an ellipsis.
    pub label_max_chars: usize,
    pub container_height: u32,
    pub bar_thickness: u32,
    pub tick_font_px: u32,
}

/// Derive the chart configuration for a viewport class and category count.
///
/// Returns `None` for an empty data set: the caller renders no chart at all
/// instead of handing a degenerate configuration to the renderer.
///
/// Narrow surfaces get sideways bars with the value axis along the narrow
/// dimension, the fixed [`PERCENT_TICKS`] set, tighter label truncation, and
/// a container that grows with the item count
/// (`max(min_height, items * per_item)`) so long lists scroll instead of
/// squeezing bars. Wide surfaces get upright bars, auto ticks, and a constant
/// container height. Bar thickness and tick font step down one tier on
/// narrow surfaces.
pub fn resolve_layout(viewport: ViewportClass, item_count: usize) -> Option<ChartLayoutConfig> {
    if item_count == 0 {
        return None;
    }

    let config = match viewport {
        ViewportClass::Narrow => ChartLayoutConfig {
            orientation: Orientation::Vertical,
            category_axis: Axis::Y,
            value_axis: Axis::X,
            ticks: TickMode::Fixed(&PERCENT_TICKS),
            label_max_chars: NARROW_LABEL_MAX_CHARS,
            container_height: NARROW_MIN_HEIGHT_PX.max(
                u32::try_from(item_count)
                    .unwrap_or(u32::MAX)
                    .saturating_mul(NARROW_PER_ITEM_PX),
            ),
            bar_thickness: NARROW_BAR_THICKNESS_PX,
            tick_font_px: NARROW_TICK_FONT_PX,
        },
        ViewportClass::Wide => ChartLayoutConfig {
            orientation: Orientation::Horizontal,
            category_axis: Axis::X,
            value_axis: Axis::Y,
            ticks: TickMode::Auto,
            label_max_chars: WIDE_LABEL_MAX_CHARS,
            container_height: WIDE_CONTAINER_HEIGHT_PX,
            bar_thickness: WIDE_BAR_THICKNESS_PX,
            tick_font_px: WIDE_TICK_FONT_PX,
        },
    };
    Some(config)
}
