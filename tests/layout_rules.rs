use cvtrends_rs::layout::{
    Axis, NARROW_BREAKPOINT_PX, Orientation, PERCENT_TICKS, TickMode, ViewportClass,
    resolve_layout,
};

#[test]
fn classify_has_a_single_boundary_at_768() {
    assert_eq!(ViewportClass::classify(0), ViewportClass::Narrow);
    assert_eq!(ViewportClass::classify(767), ViewportClass::Narrow);
    assert_eq!(ViewportClass::classify(768), ViewportClass::Wide);
    assert_eq!(ViewportClass::classify(1920), ViewportClass::Wide);
    assert_eq!(NARROW_BREAKPOINT_PX, 768);
}

#[test]
fn empty_data_means_no_chart_on_any_viewport() {
    assert!(resolve_layout(ViewportClass::Narrow, 0).is_none());
    assert!(resolve_layout(ViewportClass::Wide, 0).is_none());
}

#[test]
fn narrow_tier_stacks_categories_with_fixed_ticks() {
    let cfg = resolve_layout(ViewportClass::Narrow, 5).unwrap();
    assert_eq!(cfg.orientation, Orientation::Vertical);
    assert_eq!(cfg.category_axis, Axis::Y);
    assert_eq!(cfg.value_axis, Axis::X);
    assert_eq!(cfg.ticks, TickMode::Fixed(&PERCENT_TICKS));
    assert_eq!(PERCENT_TICKS, [0.0, 25.0, 50.0, 75.0, 100.0]);
}

#[test]
fn wide_tier_runs_categories_along_x_with_auto_ticks() {
    let cfg = resolve_layout(ViewportClass::Wide, 5).unwrap();
    assert_eq!(cfg.orientation, Orientation::Horizontal);
    assert_eq!(cfg.category_axis, Axis::X);
    assert_eq!(cfg.value_axis, Axis::Y);
    assert_eq!(cfg.ticks, TickMode::Auto);
}

#[test]
fn narrow_height_grows_with_item_count_above_a_floor() {
    // Small lists keep the minimum height.
    let short = resolve_layout(ViewportClass::Narrow, 2).unwrap();
    let also_short = resolve_layout(ViewportClass::Narrow, 5).unwrap();
    assert_eq!(short.container_height, also_short.container_height);

    // Long lists grow linearly: max(min_height, n * per_item).
    let h10 = resolve_layout(ViewportClass::Narrow, 10)
        .unwrap()
        .container_height;
    let h20 = resolve_layout(ViewportClass::Narrow, 20)
        .unwrap()
        .container_height;
    let h30 = resolve_layout(ViewportClass::Narrow, 30)
        .unwrap()
        .container_height;
    assert!(h20 > h10);
    assert_eq!(h30 - h20, h20 - h10);

    let per_item = (h20 - h10) / 10;
    assert_eq!(
        short.container_height,
        short.container_height.max(2 * per_item)
    );
}

#[test]
fn wide_height_is_constant_regardless_of_item_count() {
    let h1 = resolve_layout(ViewportClass::Wide, 1).unwrap().container_height;
    let h40 = resolve_layout(ViewportClass::Wide, 40)
        .unwrap()
        .container_height;
    assert_eq!(h1, h40);
}

#[test]
fn narrow_tier_steps_presentation_down_one_level() {
    let narrow = resolve_layout(ViewportClass::Narrow, 8).unwrap();
    let wide = resolve_layout(ViewportClass::Wide, 8).unwrap();
    assert!(narrow.bar_thickness < wide.bar_thickness);
    assert!(narrow.tick_font_px < wide.tick_font_px);
    assert!(narrow.label_max_chars < wide.label_max_chars);
}

#[test]
fn crossing_the_threshold_flips_orientation_and_ticks_only() {
    // Same data, viewport crosses the boundary between two renders.
    let before = resolve_layout(ViewportClass::classify(800), 7).unwrap();
    let after = resolve_layout(ViewportClass::classify(700), 7).unwrap();

    assert_eq!(before.orientation, Orientation::Horizontal);
    assert_eq!(after.orientation, Orientation::Vertical);
    assert_eq!(before.ticks, TickMode::Auto);
    assert_eq!(after.ticks, TickMode::Fixed(&PERCENT_TICKS));

    // Re-resolving with the original viewport reproduces the original
    // configuration; nothing is cached or mutated.
    assert_eq!(resolve_layout(ViewportClass::Wide, 7).unwrap(), before);
}

#[test]
fn absurd_item_counts_saturate_the_container_height() {
    // 200M items * 36px overflows u32; the height pins at the max instead
    // of wrapping around to a tiny chart.
    let large = resolve_layout(ViewportClass::Narrow, 200_000_000).unwrap();
    assert_eq!(large.container_height, u32::MAX);

    let huge = resolve_layout(ViewportClass::Narrow, usize::MAX).unwrap();
    assert_eq!(huge.container_height, u32::MAX);
}
