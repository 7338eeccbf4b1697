use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use cvtrends_rs::{Client, ViewportClass, normalize, resolve_layout, viz};
use num_format::{Locale, ToFormattedString};
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "cvtrends",
    version,
    about = "Fetch, normalize & visualize CV job-market trends"
)]
struct Cli {
    /// Base URL of the trends service (overrides CVTRENDS_API_URL).
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch market trends, print them, and optionally render charts.
    Trends(TrendsArgs),
    /// Send résumé text to the analysis endpoint and print the report.
    Analyze(AnalyzeArgs),
}

#[derive(Args, Debug)]
struct TrendsArgs {
    /// Dump the normalized model as JSON instead of a table.
    #[arg(long, default_value_t = false)]
    json: bool,
    /// Render the skills bar chart to this path (.svg or .png).
    #[arg(long)]
    plot: Option<PathBuf>,
    /// Render the experience-level pie chart to this path (.svg or .png).
    #[arg(long)]
    pie: Option<PathBuf>,
    /// Width of rendered charts in pixels (default 1000).
    #[arg(long, default_value_t = 1000)]
    width: u32,
    /// Viewport width in logical pixels used to pick the chart layout tier.
    /// Defaults to the chart width.
    #[arg(long)]
    viewport_width: Option<u32>,
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// Read the CV text from this file; stdin when omitted.
    #[arg(short, long)]
    file: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let client = match cli.api_url.as_deref() {
        Some(url) => Client::new(url),
        None => Client::from_env(),
    };
    match cli.cmd {
        Command::Trends(args) => cmd_trends(&client, args),
        Command::Analyze(args) => cmd_analyze(&client, args),
    }
}

fn cmd_trends(client: &Client, args: TrendsArgs) -> Result<()> {
    let raw = client
        .fetch_market_trends()
        .context("fetch market trends")?;
    let model = normalize(&raw);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&model)?);
    } else {
        if model.total_jobs > 0 {
            println!(
                "Out of {} jobs found:",
                model.total_jobs.to_formatted_string(&Locale::en)
            );
        }
        if model.skills.is_empty() {
            println!("(no skill data)");
        } else {
            println!("{:<4} {:<28} {:>8} {:>9}", "#", "skill", "jobs", "share");
            for (i, s) in model.skills.iter().enumerate() {
                println!(
                    "{:<4} {:<28} {:>8} {:>8.1}%",
                    i + 1,
                    s.name,
                    s.count,
                    s.percent
                );
            }
        }
        if !model.levels.is_empty() {
            println!();
            println!("Experience levels:");
            for l in &model.levels {
                println!("  {:<20} {:>8}  {}", l.name, l.count, l.color);
            }
        }
    }

    let viewport = ViewportClass::classify(args.viewport_width.unwrap_or(args.width));

    if let Some(path) = args.plot.as_ref() {
        match resolve_layout(viewport, model.skills.len()) {
            Some(layout) => {
                viz::plot_skills_chart(&model.skills, &layout, path, args.width)?;
                eprintln!("Wrote skills chart to {}", path.display());
            }
            None => eprintln!("No skill data; skipping {}", path.display()),
        }
    }

    if let Some(path) = args.pie.as_ref() {
        if model.levels.is_empty() {
            eprintln!("No level data; skipping {}", path.display());
        } else {
            let height = resolve_layout(viewport, model.levels.len())
                .map(|l| l.container_height)
                .unwrap_or(360);
            viz::plot_levels_chart(&model.levels, path, args.width, height)?;
            eprintln!("Wrote levels chart to {}", path.display());
        }
    }

    Ok(())
}

fn cmd_analyze(client: &Client, args: AnalyzeArgs) -> Result<()> {
    let cv_text = match args.file.as_ref() {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("read CV text from stdin")?;
            buf
        }
    };
    if cv_text.trim().is_empty() {
        anyhow::bail!("CV text is empty");
    }

    let report = client.analyze_cv(&cv_text).context("analyze CV")?;

    let rec = &report.recommendation;
    for block in [&rec.opening, &rec.gap_analysis_intro] {
        if !block.is_empty() {
            println!("{block}\n");
        }
    }
    if !rec.cv_review_points.is_empty() {
        if !rec.cv_review_title.is_empty() {
            println!("{}", rec.cv_review_title);
        }
        for point in &rec.cv_review_points {
            println!("  - {point}");
        }
        println!();
    }
    if !rec.closing.is_empty() {
        println!("{}\n", rec.closing);
    }

    let details = &report.analysis_details;
    if !details.cv_skills.is_empty() {
        println!("CV skills:    {}", details.cv_skills.join(", "));
    }
    if !details.market_gaps.is_empty() {
        println!("Market gaps:  {}", details.market_gaps.join(", "));
    }

    if !report.top_jobs.is_empty() {
        println!("\nMatching jobs:");
        for job in &report.top_jobs {
            let pct = job
                .match_percentage
                .map(|p| format!(" ({p:.0}% match)"))
                .unwrap_or_default();
            println!("  {} at {}{}", job.title, job.company, pct);
            if !job.level.is_empty() {
                println!("      level: {}", job.level);
            }
            if !job.link.is_empty() {
                println!("      {}", job.link);
            }
        }
    }

    Ok(())
}
