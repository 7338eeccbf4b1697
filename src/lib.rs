//! cvtrends-rs
//!
//! A lightweight Rust client for a CV-analysis service: fetch loosely-typed
//! job-market trend data, normalize it into a strict chart model, derive a
//! responsive chart layout, and render or refresh it. Pairs with the
//! `cvtrends` CLI and the `cvtrends-gui` desktop dashboard.
//!
//! ### Features
//! - Defensive normalization of the `/api/market-trends` payload (total,
//!   pure, order-preserving, palette-stable)
//! - Viewport-driven chart layout (orientation, ticks, truncation, sizing)
//! - Hourly background refresh that never discards last-known-good data
//! - SVG/PNG chart rendering and a CV analysis client
//!
//! ### Example
//! ```no_run
//! use cvtrends_rs::{Client, ViewportClass, normalize, resolve_layout};
//!
//! let client = Client::from_env();
//! let model = normalize(&client.fetch_market_trends()?);
//! if let Some(layout) = resolve_layout(ViewportClass::classify(1280), model.skills.len()) {
//!     cvtrends_rs::viz::plot_skills_chart(&model.skills, &layout, "skills.svg", 1000)?;
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod api;
pub mod layout;
pub mod models;
pub mod refresh;
pub mod viz;

pub use api::{ApiError, Client};
pub use layout::{ChartLayoutConfig, Orientation, TickMode, ViewportClass, resolve_layout};
pub use models::{
    LevelStat, MarketChartModel, RawMarketPayload, SkillStat, normalize, palette_color,
};
pub use refresh::{RefreshScheduler, Snapshot, TrendsSource};
