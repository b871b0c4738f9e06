use crate::core::axis::nice_ticks;
use crate::core::model::{AxisRange, PercentileRecord};
use anyhow::Result;
use std::fmt::Write as FmtWrite;

pub const DEFAULT_WIDTH: f64 = 900.0;
pub const DEFAULT_HEIGHT: f64 = 500.0;
pub const DEFAULT_X_LABEL: &str = "Test Run";
pub const DEFAULT_Y_LABEL: &str = "Latency in Milliseconds";

/// Above this many boxes the x labels are drawn at an angle.
const ROTATE_LABELS_AFTER: usize = 6;

#[derive(Clone, Debug)]
pub struct PlotStyle {
    pub width: f64,
    pub height: f64,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            title: String::new(),
            x_label: DEFAULT_X_LABEL.to_string(),
            y_label: DEFAULT_Y_LABEL.to_string(),
        }
    }
}

struct Frame {
    left: f64,
    top: f64,
    plot_w: f64,
    plot_h: f64,
    range: AxisRange,
}

impl Frame {
    /// Signed: an inverted range (min > max) flips the axis instead of
    /// collapsing it.
    fn y(&self, v: f64) -> f64 {
        let span = match self.range.span() {
            s if s == 0.0 => 1.0,
            s => s,
        };
        self.top + self.plot_h - ((v - self.range.min) / span) * self.plot_h
    }
}

/// Standalone SVG document with one box per record, in the given order.
pub fn render_boxplot(
    records: &[PercentileRecord],
    range: AxisRange,
    style: &PlotStyle,
) -> Result<String> {
    let mut out = String::with_capacity(4096 + records.len() * 768);
    let (w, h) = (style.width, style.height);
    let rotate = records.len() > ROTATE_LABELS_AFTER;

    let left = 64.0;
    let right = 20.0;
    let top = if style.title.is_empty() { 14.0 } else { 38.0 };
    let bottom = match (rotate, style.x_label.is_empty()) {
        (true, true) => 96.0,
        (true, false) => 116.0,
        (false, true) => 44.0,
        (false, false) => 62.0,
    };
    let frame = Frame {
        left,
        top,
        plot_w: (w - left - right).max(1.0),
        plot_h: (h - top - bottom).max(1.0),
        range,
    };

    writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\" font-family=\"Arial,Helvetica,sans-serif\">",
        w, h, w, h
    )?;
    writeln!(
        out,
        "<defs><clipPath id=\"plot-area\"><rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"/></clipPath></defs>",
        frame.left, frame.top, frame.plot_w, frame.plot_h
    )?;
    writeln!(out, "<rect width=\"{}\" height=\"{}\" fill=\"#fff\"/>", w, h)?;
    writeln!(
        out,
        "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"#fafafa\" stroke=\"#ccc\"/>",
        frame.left, frame.top, frame.plot_w, frame.plot_h
    )?;

    if !style.title.is_empty() {
        writeln!(
            out,
            "<text x=\"{}\" y=\"{}\" font-size=\"15\" fill=\"#222\" text-anchor=\"middle\">{}</text>",
            w / 2.0,
            24.0,
            xml_escape(&style.title)
        )?;
    }

    draw_y_axis(&mut out, &frame, 6)?;
    draw_y_label(&mut out, &frame, &style.y_label)?;
    draw_x_title(&mut out, &frame, &style.x_label, h)?;

    let n = records.len().max(1) as f64;
    let x_step = frame.plot_w / n;
    let box_w = (x_step * 0.5).clamp(1.0, 80.0);
    let cap_w = box_w * 0.5;

    writeln!(out, "<g clip-path=\"url(#plot-area)\">")?;
    for (i, r) in records.iter().enumerate() {
        let x = frame.left + (i as f64 + 0.5) * x_step;
        draw_box(&mut out, &frame, r, x, box_w, cap_w)?;
    }
    writeln!(out, "</g>")?;

    for (i, r) in records.iter().enumerate() {
        let x = frame.left + (i as f64 + 0.5) * x_step;
        draw_x_label(&mut out, &frame, &r.label, x, rotate)?;
    }

    writeln!(out, "</svg>")?;
    Ok(out)
}

fn draw_box(
    out: &mut String,
    frame: &Frame,
    r: &PercentileRecord,
    x: f64,
    box_w: f64,
    cap_w: f64,
) -> Result<()> {
    let y_min = frame.y(r.q1_start);
    let y_lq = frame.y(r.q2_start);
    let y_med = frame.y(r.q3_start);
    let y_uq = frame.y(r.q4_start);
    let y_max = frame.y(r.q4_end);
    let box_x = x - box_w / 2.0;

    // Whiskers run from each box edge to the extreme.
    for (from, to) in [(y_lq, y_min), (y_uq, y_max)] {
        writeln!(
            out,
            "<line class=\"whisker\" x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"#333\" stroke-width=\"1\"/>",
            x, from, x, to
        )?;
        writeln!(
            out,
            "<line class=\"cap\" x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"#333\" stroke-width=\"1\"/>",
            x - cap_w / 2.0,
            to,
            x + cap_w / 2.0,
            to
        )?;
    }
    writeln!(
        out,
        "<rect class=\"box\" x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"#cfe0f3\" stroke=\"#335\"/>",
        box_x,
        y_uq.min(y_lq),
        box_w,
        (y_lq - y_uq).abs()
    )?;
    writeln!(
        out,
        "<line class=\"median\" x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"#e8710a\" stroke-width=\"1.6\"/>",
        box_x,
        y_med,
        box_x + box_w,
        y_med
    )?;
    Ok(())
}

fn draw_y_axis(out: &mut String, frame: &Frame, ticks: usize) -> Result<()> {
    let lo = frame.range.min.min(frame.range.max);
    let hi = frame.range.min.max(frame.range.max);
    if ticks < 2 || (hi - lo) < 1e-9 {
        return Ok(());
    }
    let (start, step, count) = nice_ticks(lo, hi, ticks);
    for i in 0..count {
        let v = start + step * i as f64;
        let y = frame.y(v);
        writeln!(
            out,
            "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"#e5e5e5\"/>",
            frame.left,
            y,
            frame.left + frame.plot_w,
            y
        )?;
        writeln!(
            out,
            "<text x=\"{}\" y=\"{}\" font-size=\"11\" fill=\"#555\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>",
            frame.left - 5.0,
            y,
            fmt_tick(v)
        )?;
    }
    Ok(())
}

fn draw_y_label(out: &mut String, frame: &Frame, label: &str) -> Result<()> {
    if label.is_empty() {
        return Ok(());
    }
    let yx = frame.left - 44.0;
    let yy = frame.top + frame.plot_h / 2.0;
    writeln!(
        out,
        "<text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"#444\" text-anchor=\"middle\" transform=\"rotate(-90 {} {})\">{}</text>",
        yx,
        yy,
        yx,
        yy,
        xml_escape(label)
    )?;
    Ok(())
}

fn draw_x_title(out: &mut String, frame: &Frame, label: &str, h: f64) -> Result<()> {
    if label.is_empty() {
        return Ok(());
    }
    writeln!(
        out,
        "<text class=\"x-title\" x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"#444\" text-anchor=\"middle\">{}</text>",
        frame.left + frame.plot_w / 2.0,
        h - 12.0,
        xml_escape(label)
    )?;
    Ok(())
}

fn draw_x_label(out: &mut String, frame: &Frame, label: &str, x: f64, rotate: bool) -> Result<()> {
    let y = frame.top + frame.plot_h + 16.0;
    if rotate {
        writeln!(
            out,
            "<text class=\"label\" x=\"{}\" y=\"{}\" font-size=\"11\" fill=\"#444\" text-anchor=\"end\" transform=\"rotate(-40 {} {})\">{}</text>",
            x,
            y,
            x,
            y,
            xml_escape(label)
        )?;
    } else {
        writeln!(
            out,
            "<text class=\"label\" x=\"{}\" y=\"{}\" font-size=\"11\" fill=\"#444\" text-anchor=\"middle\">{}</text>",
            x,
            y,
            xml_escape(label)
        )?;
    }
    Ok(())
}

/// Integers print bare; fractions keep at most two decimals.
pub fn fmt_tick(v: f64) -> String {
    let rounded = v.round();
    if (v - rounded).abs() < 1e-3 {
        return format!("{}", rounded as i64);
    }
    let s = format!("{:.2}", v);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

pub fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::axis::y_axis_range;

    fn sample(n: usize) -> Vec<PercentileRecord> {
        (0..n)
            .map(|i| {
                let base = i as f64;
                PercentileRecord::new(
                    format!("run{i}"),
                    base,
                    base + 1.0,
                    base + 2.0,
                    base + 3.0,
                    base + 4.0,
                )
            })
            .collect()
    }

    fn render(records: &[PercentileRecord]) -> String {
        let range = y_axis_range(records).unwrap();
        render_boxplot(records, range, &PlotStyle::default()).unwrap()
    }

    #[test]
    fn one_box_per_record() {
        let svg = render(&sample(4));
        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("class=\"box\"").count(), 4);
        assert_eq!(svg.matches("class=\"median\"").count(), 4);
        assert_eq!(svg.matches("class=\"whisker\"").count(), 8);
        assert_eq!(svg.matches("class=\"label\"").count(), 4);
    }

    #[test]
    fn boxes_are_clipped_to_the_axis_window() {
        let svg = render(&sample(2));
        assert!(svg.contains("<clipPath id=\"plot-area\">"));
        assert!(svg.contains("<g clip-path=\"url(#plot-area)\">"));
    }

    #[test]
    fn box_spans_p25_to_p75() {
        let records = vec![PercentileRecord::new("a", 0.0, 2.0, 3.0, 4.0, 6.0)];
        let range = AxisRange { min: 0.0, max: 10.0 };
        let style = PlotStyle {
            width: 164.0 + 20.0,
            height: 14.0 + 100.0 + 44.0,
            x_label: String::new(),
            ..PlotStyle::default()
        };
        let svg = render_boxplot(&records, range, &style).unwrap();
        // plot area is 100 px high starting at y=14: value v sits at 114 - 10 v.
        assert!(svg.contains("class=\"box\" x=\"89\" y=\"74\" width=\"50\" height=\"20\""));
        assert!(svg.contains("class=\"median\" x1=\"89\" y1=\"84\""));
    }

    #[test]
    fn many_boxes_rotate_labels() {
        assert!(!render(&sample(6)).contains("rotate(-40"));
        assert!(render(&sample(7)).contains("rotate(-40"));
    }

    #[test]
    fn labels_and_title_are_escaped() {
        let records = vec![PercentileRecord::new("<a & b>", 1.0, 2.0, 3.0, 4.0, 5.0)];
        let range = y_axis_range(&records).unwrap();
        let style = PlotStyle {
            title: "p99 \"tail\"".to_string(),
            ..PlotStyle::default()
        };
        let svg = render_boxplot(&records, range, &style).unwrap();
        assert!(svg.contains("&lt;a &amp; b&gt;"));
        assert!(svg.contains("p99 &quot;tail&quot;"));
        assert!(!svg.contains("<a & b>"));
    }

    #[test]
    fn tick_formatting() {
        assert_eq!(fmt_tick(4.0), "4");
        assert_eq!(fmt_tick(0.25), "0.25");
        assert_eq!(fmt_tick(12.5), "12.5");
        assert_eq!(fmt_tick(-0.1), "-0.1");
        assert_eq!(fmt_tick(2.003), "2");
    }

    fn attr_after(svg: &str, marker: &str, attr: &str) -> f64 {
        let tail = &svg[svg.find(marker).unwrap()..];
        let start = tail.find(&format!("{attr}=\"")).unwrap() + attr.len() + 2;
        let end = start + tail[start..].find('"').unwrap();
        tail[start..end].parse().unwrap()
    }

    #[test]
    fn inverted_range_still_lands_on_canvas() {
        // p75 below p25 gives min > max; the axis flips rather than collapsing.
        let records = vec![PercentileRecord::new("odd", 0.0, 100.0, 50.0, 0.0, 200.0)];
        let range = y_axis_range(&records).unwrap();
        assert_eq!(range, AxisRange { min: 100.0, max: 1.0 });

        let style = PlotStyle::default();
        let svg = render_boxplot(&records, range, &style).unwrap();
        let y_med = attr_after(&svg, "class=\"median\"", "y1");
        assert!(y_med > 0.0 && y_med < style.height, "median at {y_med}");
        let box_h = attr_after(&svg, "class=\"box\"", "height");
        assert!(box_h > 0.0 && box_h < style.height, "box height {box_h}");
        assert!(svg.matches("text-anchor=\"end\" dominant-baseline").count() >= 2);
    }

    #[test]
    fn zero_span_range_does_not_blow_up() {
        let records = vec![PercentileRecord::new("flat", 3.0, 3.0, 3.0, 3.0, 3.0)];
        let range = AxisRange { min: 3.0, max: 3.0 };
        let svg = render_boxplot(&records, range, &PlotStyle::default()).unwrap();
        let y_med = attr_after(&svg, "class=\"median\"", "y1");
        assert!(y_med.is_finite());
    }

    #[test]
    fn axis_titles_default_to_test_run_and_milliseconds() {
        let svg = render(&sample(2));
        assert!(svg.contains(">Test Run</text>"));
        assert!(svg.contains(">Latency in Milliseconds</text>"));

        let records = sample(1);
        let range = y_axis_range(&records).unwrap();
        let style = PlotStyle {
            x_label: String::new(),
            ..PlotStyle::default()
        };
        let svg = render_boxplot(&records, range, &style).unwrap();
        assert!(!svg.contains("class=\"x-title\""));
    }
}
