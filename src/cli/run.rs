use crate::cli::args::{Cli, SortArg};
use crate::core::axis;
use crate::core::io;
use crate::core::model::{self, PercentileRecord, SortOrder};
use crate::core::parse::{self, ParseOptions};
use crate::report;
use crate::report::svg::PlotStyle;
use anyhow::{Context, Result, bail};
use clap::Parser;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

pub fn entry() -> Result<()> {
    run(Cli::parse())
}

fn run(args: Cli) -> Result<()> {
    let stats = stats_enabled();
    let t0 = Instant::now();

    stage(stats, "preflight", || {
        if !args.input.is_file() {
            bail!("input file not found: {}", args.input.display());
        }
        if !(args.width > 0.0 && args.height > 0.0) {
            bail!("--width and --height must be > 0");
        }
        Ok(())
    })?;

    let t_parse = Instant::now();
    let reader = io::open_input(&args.input)?;
    let mut records = parse::parse_records(
        reader,
        ParseOptions {
            header: args.header,
        },
    )
    .with_context(|| format!("failed to parse {}", args.input.display()))?;
    stage_done(stats, "parse", t_parse);
    if stats {
        eprintln!(
            "LATPLOT_STATS input={} records={}",
            args.input.display(),
            records.len()
        );
    }

    for warning in monotonic_warnings(&records) {
        eprintln!("{}", warning);
    }

    let order = match args.sort_by {
        SortArg::Input => SortOrder::Input,
        SortArg::Label => SortOrder::Label,
        SortArg::Median => SortOrder::Median,
    };
    model::sort_records(&mut records, order);

    let t_axis = Instant::now();
    let range = axis::y_axis_range(&records)
        .with_context(|| format!("nothing to plot in {}", args.input.display()))?;
    stage_done(stats, "axis", t_axis);

    let title = match &args.title {
        Some(t) => t.clone(),
        None => default_title(&args.input),
    };
    let style = PlotStyle {
        width: args.width,
        height: args.height,
        title: title.clone(),
        x_label: args.x_label.clone(),
        y_label: args.y_label.clone(),
    };

    let t_render = Instant::now();
    let svg = report::svg::render_boxplot(&records, range, &style)?;
    stage_done(stats, "render", t_render);

    let html_path = args
        .out
        .clone()
        .unwrap_or_else(|| default_html_path(&args.input));
    let t_html = Instant::now();
    let source = args.input.display().to_string();
    report::html::write(
        &html_path,
        &report::html::Page {
            title: &title,
            source: &source,
            svg: &svg,
            records: &records,
            range,
        },
    )
    .with_context(|| format!("failed to write {}", html_path.display()))?;
    stage_done(stats, "html", t_html);
    report_size(stats, "html", &html_path);

    if let Some(svg_path) = &args.svg {
        let t_svg = Instant::now();
        fs::write(svg_path, &svg)
            .with_context(|| format!("failed to write {}", svg_path.display()))?;
        stage_done(stats, "svg", t_svg);
        report_size(stats, "svg", svg_path);
    }

    if let Some(pdf_path) = &args.pdf {
        let t_pdf = Instant::now();
        report::pdf::write(pdf_path, &svg)?;
        stage_done(stats, "pdf", t_pdf);
        report_size(stats, "pdf", pdf_path);
    }

    if args.no_open {
        println!("{}", html_path.display());
    } else {
        let t_open = Instant::now();
        report::viewer::open(&html_path)?;
        stage_done(stats, "open", t_open);
    }

    if stats {
        eprintln!("LATPLOT_STATS total={}", fmt_dur(t0.elapsed()));
    }

    Ok(())
}

fn monotonic_warnings(records: &[PercentileRecord]) -> Vec<String> {
    records
        .iter()
        .filter(|r| !r.is_monotonic())
        .map(|r| {
            format!(
                "warning: line {}: {:?} has out-of-order percentiles {:?}; plotting as given",
                r.line,
                r.label,
                r.bounds()
            )
        })
        .collect()
}

/// `runs.csv.gz` and `runs.csv` both become `runs`.
fn input_stem(input: &Path) -> PathBuf {
    let is_gz = input
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gz"));
    let base = if is_gz {
        input.with_extension("")
    } else {
        input.to_path_buf()
    };
    base.with_extension("")
}

fn default_html_path(input: &Path) -> PathBuf {
    input_stem(input).with_extension("html")
}

fn default_title(input: &Path) -> String {
    input_stem(input)
        .file_name()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
        .unwrap_or_else(|| "latency".to_string())
}

fn report_size(stats: bool, kind: &str, path: &Path) {
    if stats {
        let size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        eprintln!(
            "LATPLOT_STATS output {}={} bytes={}",
            kind,
            path.display(),
            size
        );
    }
}

fn stats_enabled() -> bool {
    matches!(env::var("LATPLOT_STATS").as_deref(), Ok("1"))
}

fn stage<F>(stats: bool, name: &str, f: F) -> Result<()>
where
    F: FnOnce() -> Result<()>,
{
    let t = Instant::now();
    let res = f();
    if stats {
        eprintln!("LATPLOT_STATS stage={} time={}", name, fmt_dur(t.elapsed()));
    }
    res
}

fn stage_done(stats: bool, name: &str, t: Instant) {
    if stats {
        eprintln!("LATPLOT_STATS stage={} time={}", name, fmt_dur(t.elapsed()));
    }
}

fn fmt_dur(d: Duration) -> String {
    if d.as_secs_f64() < 1.0 {
        format!("{}ms", d.as_millis())
    } else {
        format!("{:.3}s", d.as_secs_f64())
    }
}
