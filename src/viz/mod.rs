//! Visualization: render the market-trend charts to **SVG** or **PNG**.
//!
//! - Skills bar chart in either orientation, driven by a [`ChartLayoutConfig`]
//! - Experience-level pie chart using the palette colors carried by the model
//! - Fixed `[0, 100]` value domain; out-of-range values are clipped visually
//!
//! The crate ships no font asset. A sans-serif face is registered at runtime
//! from well-known system locations; when none is found, charts render all
//! geometry (bars, slices, gridlines) and simply omit text.

pub mod text;
pub mod util;

use crate::layout::{ChartLayoutConfig, Orientation, TickMode, VALUE_DOMAIN};
use crate::models::{LevelStat, SkillStat};
use anyhow::{Result, anyhow};

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;

use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;

use std::path::Path;
use std::sync::OnceLock;

use text::{estimate_text_width_px, truncate_label};
use util::{SKILL_BAR_COLOR, compute_left_label_area_px, parse_hex_color};

const MARGIN: u32 = 16;
const GRID_COLOR: RGBColor = RGBColor(220, 220, 220);

/// System font locations probed for a usable sans-serif face. The `ab_glyph`
/// text path does not discover OS fonts on its own.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static FONT_AVAILABLE: OnceLock<bool> = OnceLock::new();

/// Register a fallback "sans-serif" font once. Returns whether text can be
/// drawn; callers skip labels entirely when it cannot.
fn fonts_registered() -> bool {
    *FONT_AVAILABLE.get_or_init(|| {
        for path in FONT_CANDIDATES {
            if let Ok(bytes) = std::fs::read(path) {
                let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
                if plotters::style::register_font(
                    "sans-serif",
                    plotters::style::FontStyle::Normal,
                    bytes,
                )
                .is_ok()
                {
                    return true;
                }
            }
        }
        log::warn!("no system font found; charts will render without text");
        false
    })
}

/// Render the skills bar chart to `out_path` (`.svg` or bitmap by extension).
///
/// `layout` decides orientation, ticks, truncation, and the image height;
/// callers resolve it per render via [`crate::layout::resolve_layout`] and
/// skip the call entirely when it returns `None`.
pub fn plot_skills_chart<P: AsRef<Path>>(
    skills: &[SkillStat],
    layout: &ChartLayoutConfig,
    out_path: P,
    width: u32,
) -> Result<()> {
    if skills.is_empty() {
        return Err(anyhow!("no data to plot"));
    }
    let out_path = out_path.as_ref();
    let path_string = out_path.to_string_lossy().into_owned();
    let size = (width, layout.container_height);

    if out_path.extension().and_then(|s| s.to_str()) == Some("svg") {
        let root = SVGBackend::new(path_string.as_str(), size).into_drawing_area();
        draw_skills_chart(root, skills, layout)
    } else {
        let root = BitMapBackend::new(path_string.as_str(), size).into_drawing_area();
        draw_skills_chart(root, skills, layout)
    }
}

/// Render the experience-level pie chart to `out_path`.
pub fn plot_levels_chart<P: AsRef<Path>>(
    levels: &[LevelStat],
    out_path: P,
    width: u32,
    height: u32,
) -> Result<()> {
    if levels.is_empty() {
        return Err(anyhow!("no data to plot"));
    }
    let out_path = out_path.as_ref();
    let path_string = out_path.to_string_lossy().into_owned();

    if out_path.extension().and_then(|s| s.to_str()) == Some("svg") {
        let root = SVGBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_levels_chart(root, levels)
    } else {
        let root = BitMapBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_levels_chart(root, levels)
    }
}

fn draw_skills_chart<DB>(
    root: DrawingArea<DB, Shift>,
    skills: &[SkillStat],
    layout: &ChartLayoutConfig,
) -> Result<()>
where
    DB: DrawingBackend,
{
    let with_text = fonts_registered();
    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;

    let n = skills.len();
    let (dmin, dmax) = VALUE_DOMAIN;
    let font_px = layout.tick_font_px;
    let labels: Vec<String> = skills
        .iter()
        .map(|s| truncate_label(&s.name, layout.label_max_chars))
        .collect();

    // Fixed-domain clip: bars never extend past the value domain even when
    // the data does.
    let clip = |v: f64| v.clamp(dmin, dmax);

    match layout.orientation {
        // Wide tier: categories left-to-right, value on Y, auto ticks.
        Orientation::Horizontal => {
            let mut builder = ChartBuilder::on(&root);
            builder
                .margin(MARGIN)
                .set_label_area_size(LabelAreaPosition::Left, 48)
                .set_label_area_size(LabelAreaPosition::Bottom, 40);
            if with_text {
                builder.caption("In-demand skills (%)", (FontFamily::SansSerif, 18));
            }
            let mut chart = builder
                .build_cartesian_2d(0f64..n as f64, dmin..dmax)
                .map_err(|e| anyhow!("{:?}", e))?;

            let value_fmt = |v: &f64| format!("{v:.0}%");
            let mut mesh = chart.configure_mesh();
            mesh.disable_x_mesh().x_labels(0);
            if with_text && matches!(layout.ticks, TickMode::Auto) {
                mesh.y_labels(10)
                    .y_label_formatter(&value_fmt)
                    .label_style((FontFamily::SansSerif, font_px as i32));
            } else {
                mesh.y_labels(0);
            }
            mesh.draw().map_err(|e| anyhow!("{:?}", e))?;

            // Bar width in category units, capped so bars never touch.
            let plot_w = root.dim_in_pixel().0.saturating_sub(MARGIN * 2 + 48) as f64;
            let half = (layout.bar_thickness as f64 / (plot_w / n as f64)).min(0.8) / 2.0;

            for (i, skill) in skills.iter().enumerate() {
                let x = i as f64 + 0.5;
                let bar = Rectangle::new(
                    [(x - half, dmin), (x + half, clip(skill.percent))],
                    SKILL_BAR_COLOR.filled(),
                );
                chart
                    .draw_series(std::iter::once(bar))
                    .map_err(|e| anyhow!("{:?}", e))?;
            }

            if with_text {
                for (i, label) in labels.iter().enumerate() {
                    let (px, py) = chart.backend_coord(&(i as f64 + 0.5, dmin));
                    let w = estimate_text_width_px(label, font_px) as i32;
                    root.draw(&Text::new(
                        label.clone(),
                        (px - w / 2, py + 8),
                        (FontFamily::SansSerif, font_px as i32),
                    ))
                    .map_err(|e| anyhow!("{:?}", e))?;
                }
            }
        }
        // Narrow tier: categories top-to-bottom, value along the narrow
        // dimension, fixed tick set.
        Orientation::Vertical => {
            let left = compute_left_label_area_px(labels.iter().map(String::as_str), font_px);
            let mut builder = ChartBuilder::on(&root);
            builder
                .margin(MARGIN)
                .set_label_area_size(LabelAreaPosition::Left, left)
                .set_label_area_size(LabelAreaPosition::Bottom, 28);
            if with_text {
                builder.caption("In-demand skills (%)", (FontFamily::SansSerif, 16));
            }
            let mut chart = builder
                .build_cartesian_2d(dmin..dmax, 0f64..n as f64)
                .map_err(|e| anyhow!("{:?}", e))?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_labels(0)
                .y_labels(0)
                .draw()
                .map_err(|e| anyhow!("{:?}", e))?;

            // Stable gridlines at the fixed tick positions.
            if let TickMode::Fixed(ticks) = layout.ticks {
                for &t in ticks {
                    chart
                        .draw_series(std::iter::once(PathElement::new(
                            vec![(t, 0.0), (t, n as f64)],
                            GRID_COLOR,
                        )))
                        .map_err(|e| anyhow!("{:?}", e))?;
                    if with_text {
                        let label = format!("{t:.0}");
                        let (px, py) = chart.backend_coord(&(t, 0.0));
                        let w = estimate_text_width_px(&label, font_px) as i32;
                        root.draw(&Text::new(
                            label,
                            (px - w / 2, py + 6),
                            (FontFamily::SansSerif, font_px as i32),
                        ))
                        .map_err(|e| anyhow!("{:?}", e))?;
                    }
                }
            }

            // Rank 0 stays at the top.
            let plot_h = root
                .dim_in_pixel()
                .1
                .saturating_sub(MARGIN * 2 + 28) as f64;
            let half = (layout.bar_thickness as f64 / (plot_h / n as f64)).min(0.8) / 2.0;

            for (i, skill) in skills.iter().enumerate() {
                let y = (n - 1 - i) as f64 + 0.5;
                let bar = Rectangle::new(
                    [(dmin, y - half), (clip(skill.percent), y + half)],
                    SKILL_BAR_COLOR.filled(),
                );
                chart
                    .draw_series(std::iter::once(bar))
                    .map_err(|e| anyhow!("{:?}", e))?;
            }

            if with_text {
                for (i, label) in labels.iter().enumerate() {
                    let y = (n - 1 - i) as f64 + 0.5;
                    let (px, py) = chart.backend_coord(&(dmin, y));
                    let w = estimate_text_width_px(label, font_px) as i32;
                    root.draw(&Text::new(
                        label.clone(),
                        (px - w - 6, py - (font_px / 2) as i32),
                        (FontFamily::SansSerif, font_px as i32),
                    ))
                    .map_err(|e| anyhow!("{:?}", e))?;
                }
            }
        }
    }

    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

fn draw_levels_chart<DB>(root: DrawingArea<DB, Shift>, levels: &[LevelStat]) -> Result<()>
where
    DB: DrawingBackend,
{
    let with_text = fonts_registered();
    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;

    let (w, h) = root.dim_in_pixel();
    let total: u64 = levels.iter().map(|l| l.count).sum();

    // Legend column on the right, pie centered in the rest.
    let legend_w = (w / 3).clamp(90, 220) as i32;
    let cx = ((w as i32 - legend_w) / 2).max(1);
    let cy = (h / 2) as i32;
    let radius = ((w as i32 - legend_w).min(h as i32) as f64 * 0.38).max(10.0);

    if with_text {
        let title = "Experience-level distribution";
        let tw = estimate_text_width_px(title, 16) as i32;
        root.draw(&Text::new(
            title.to_string(),
            ((w as i32 - legend_w - tw) / 2, 8),
            (FontFamily::SansSerif, 16),
        ))
        .map_err(|e| anyhow!("{:?}", e))?;
    }

    // Slices, clockwise from 12 o'clock. Zero totals draw no slices but still
    // get a legend.
    if total > 0 {
        let mut angle = -std::f64::consts::FRAC_PI_2;
        for level in levels {
            let frac = level.count as f64 / total as f64;
            let sweep = frac * std::f64::consts::TAU;
            if sweep <= 0.0 {
                continue;
            }
            let steps = ((sweep / 0.05).ceil() as usize).max(2);
            let mut pts = Vec::with_capacity(steps + 2);
            pts.push((cx, cy));
            for s in 0..=steps {
                let a = angle + sweep * (s as f64 / steps as f64);
                pts.push((
                    cx + (radius * a.cos()).round() as i32,
                    cy + (radius * a.sin()).round() as i32,
                ));
            }
            let color = parse_hex_color(&level.color);
            root.draw(&Polygon::new(pts.clone(), color.filled()))
                .map_err(|e| anyhow!("{:?}", e))?;
            root.draw(&PathElement::new(pts, BLACK.stroke_width(1)))
                .map_err(|e| anyhow!("{:?}", e))?;
            angle += sweep;
        }
    }

    // Legend: color swatch + "name (count)" per level.
    let x0 = w as i32 - legend_w + 8;
    let mut y = cy - (levels.len() as i32 * 18) / 2;
    for level in levels {
        let color = parse_hex_color(&level.color);
        root.draw(&Rectangle::new(
            [(x0, y), (x0 + 12, y + 12)],
            color.filled(),
        ))
        .map_err(|e| anyhow!("{:?}", e))?;
        if with_text {
            root.draw(&Text::new(
                format!("{} ({})", level.name, level.count),
                (x0 + 18, y),
                (FontFamily::SansSerif, 12),
            ))
            .map_err(|e| anyhow!("{:?}", e))?;
        }
        y += 18;
    }

    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}
