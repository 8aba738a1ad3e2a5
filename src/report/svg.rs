use crate::core::metrics::Histogram;
use crate::report::escape;
use anyhow::Result;
use std::fmt::Write as FmtWrite;

const LEFT: f64 = 56.0;
const RIGHT: f64 = 20.0;
const TOP: f64 = 12.0;
const BOTTOM: f64 = 34.0;
const BAR_COLOR: &str = "#7db8da";

#[derive(Clone, Copy)]
struct Frame {
    left: f64,
    top: f64,
    plot_w: f64,
    plot_h: f64,
}

fn open(out: &mut String, w: f64, h: f64, bottom: f64) -> Result<Frame> {
    writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\" font-family=\"Arial,Helvetica,sans-serif\">",
        w, h, w, h
    )?;
    let frame = Frame {
        left: LEFT,
        top: TOP,
        plot_w: w - LEFT - RIGHT,
        plot_h: h - TOP - bottom,
    };
    writeln!(
        out,
        "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"#fff\" stroke=\"#ddd\"/>",
        frame.left, frame.top, frame.plot_w, frame.plot_h
    )?;
    Ok(frame)
}

/// Bars for each histogram bin, x axis spanning the bin range.
pub fn histogram(hist: &Histogram, w: f64, h: f64, x_label: &str, y_label: &str) -> Result<String> {
    let mut out = String::with_capacity(8 * 1024);
    let f = open(&mut out, w, h, BOTTOM)?;
    let max_y = hist.bins.iter().map(|b| b.count as f64).fold(0.0, f64::max);
    let (x_min, x_max) = match (hist.bins.first(), hist.bins.last()) {
        (Some(first), Some(last)) => (first.lo, last.hi),
        _ => (0.0, 1.0),
    };
    let bar_w = if hist.is_empty() {
        1.0
    } else {
        f.plot_w / hist.bins.len() as f64
    };
    draw_y_axis_ticks(&mut out, &f, 0.0, max_y, 4)?;
    if hist.bins.len() == 1 {
        writeln!(
            out,
            "<text x=\"{}\" y=\"{}\" font-size=\"10\" fill=\"#666\" text-anchor=\"middle\" dominant-baseline=\"hanging\">{}</text>",
            f.left + f.plot_w / 2.0,
            f.top + f.plot_h + 4.0,
            fmt_tick(x_min)
        )?;
    } else {
        draw_x_axis_ticks(&mut out, &f, x_min, x_max, 5)?;
    }
    draw_axis_labels(&mut out, &f, x_label, y_label)?;
    for (i, bin) in hist.bins.iter().enumerate() {
        let x = f.left + (i as f64) * bar_w;
        let y = if max_y == 0.0 {
            0.0
        } else {
            bin.count as f64 / max_y * f.plot_h
        };
        writeln!(
            out,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" stroke=\"#fff\"><title>{} to {}: {}</title></rect>",
            x,
            f.top + f.plot_h - y,
            bar_w.max(1.0),
            y,
            BAR_COLOR,
            fmt_tick(bin.lo),
            fmt_tick(bin.hi),
            bin.count
        )?;
    }
    writeln!(out, "</svg>")?;
    Ok(out)
}

/// One labelled bar per entry; labels are rotated when there are many.
pub fn bar_chart(
    bars: &[(String, f64)],
    w: f64,
    h: f64,
    x_label: &str,
    y_label: &str,
) -> Result<String> {
    let rotate = bars.len() > 6;
    let bottom = if rotate { 90.0 } else { BOTTOM };
    let mut out = String::with_capacity(8 * 1024);
    let f = open(&mut out, w, h, bottom)?;
    let max_y = bars.iter().map(|(_, v)| *v).fold(0.0, f64::max);
    let slot = if bars.is_empty() {
        1.0
    } else {
        f.plot_w / bars.len() as f64
    };
    let bar_w = (slot * 0.7).max(1.0);
    draw_y_axis_ticks(&mut out, &f, 0.0, max_y, 4)?;
    for (i, (label, value)) in bars.iter().enumerate() {
        let cx = f.left + slot * (i as f64 + 0.5);
        let y = if max_y == 0.0 {
            0.0
        } else {
            value / max_y * f.plot_h
        };
        writeln!(
            out,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\"><title>{}: {}</title></rect>",
            cx - bar_w / 2.0,
            f.top + f.plot_h - y,
            bar_w,
            y,
            BAR_COLOR,
            escape(label),
            fmt_tick(*value)
        )?;
        let ly = f.top + f.plot_h + 4.0;
        if rotate {
            writeln!(
                out,
                "<text x=\"{}\" y=\"{}\" font-size=\"10\" fill=\"#444\" text-anchor=\"end\" transform=\"rotate(-45 {} {})\">{}</text>",
                cx,
                ly + 6.0,
                cx,
                ly + 6.0,
                escape(&truncate(label, 18))
            )?;
        } else {
            writeln!(
                out,
                "<text x=\"{}\" y=\"{}\" font-size=\"10\" fill=\"#444\" text-anchor=\"middle\" dominant-baseline=\"hanging\">{}</text>",
                cx,
                ly,
                escape(&truncate(label, 18))
            )?;
        }
    }
    if !rotate {
        draw_axis_labels(&mut out, &f, x_label, y_label)?;
    } else {
        draw_axis_labels(&mut out, &f, "", y_label)?;
        writeln!(
            out,
            "<text x=\"{}\" y=\"{}\" font-size=\"11\" fill=\"#444\" text-anchor=\"middle\">{}</text>",
            f.left + f.plot_w / 2.0,
            h - 4.0,
            escape(x_label)
        )?;
    }
    writeln!(out, "</svg>")?;
    Ok(out)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut t: String = s.chars().take(max - 1).collect();
        t.push('…');
        t
    }
}

fn draw_y_axis_ticks(out: &mut String, f: &Frame, min_y: f64, max_y: f64, ticks: usize) -> Result<()> {
    if ticks < 2 || (max_y - min_y).abs() < 1e-9 {
        return Ok(());
    }
    let (start, step, count) = nice_ticks(min_y, max_y, ticks);
    for i in 0..count {
        let v = start + step * i as f64;
        if v > max_y + 1e-9 {
            break;
        }
        let y = f.top + f.plot_h - ((v - min_y) / (max_y - min_y).max(1e-6)) * f.plot_h;
        writeln!(
            out,
            "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"#eee\"/>",
            f.left,
            y,
            f.left + f.plot_w,
            y
        )?;
        writeln!(
            out,
            "<text x=\"{}\" y=\"{}\" font-size=\"10\" fill=\"#666\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>",
            f.left - 4.0,
            y,
            fmt_tick(v)
        )?;
    }
    Ok(())
}

fn draw_x_axis_ticks(out: &mut String, f: &Frame, min_x: f64, max_x: f64, ticks: usize) -> Result<()> {
    if ticks < 2 || (max_x - min_x).abs() < 1e-9 {
        return Ok(());
    }
    let (start, step, count) = nice_ticks(min_x, max_x, ticks);
    for i in 0..count {
        let v = start + step * i as f64;
        if v < min_x - 1e-9 || v > max_x + 1e-9 {
            continue;
        }
        let x = f.left + ((v - min_x) / (max_x - min_x).max(1e-6)) * f.plot_w;
        writeln!(
            out,
            "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"#eee\"/>",
            x,
            f.top,
            x,
            f.top + f.plot_h
        )?;
        writeln!(
            out,
            "<text x=\"{}\" y=\"{}\" font-size=\"10\" fill=\"#666\" text-anchor=\"middle\" dominant-baseline=\"hanging\">{}</text>",
            x,
            f.top + f.plot_h + 4.0,
            fmt_tick(v)
        )?;
    }
    Ok(())
}

fn draw_axis_labels(out: &mut String, f: &Frame, x_label: &str, y_label: &str) -> Result<()> {
    if !x_label.is_empty() {
        writeln!(
            out,
            "<text x=\"{}\" y=\"{}\" font-size=\"11\" fill=\"#444\" text-anchor=\"middle\">{}</text>",
            f.left + f.plot_w / 2.0,
            f.top + f.plot_h + 26.0,
            escape(x_label)
        )?;
    }
    let yx = f.left - 40.0;
    let yy = f.top + f.plot_h / 2.0;
    writeln!(
        out,
        "<text x=\"{}\" y=\"{}\" font-size=\"11\" fill=\"#444\" text-anchor=\"middle\" transform=\"rotate(-90 {} {})\">{}</text>",
        yx,
        yy,
        yx,
        yy,
        escape(y_label)
    )?;
    Ok(())
}

pub fn fmt_tick(v: f64) -> String {
    if (v - v.round()).abs() < 0.001 {
        format!("{}", v.round() as i64)
    } else if v.abs() < 10.0 {
        format!("{:.2}", v)
    } else {
        format!("{:.1}", v)
    }
}

fn nice_ticks(min: f64, max: f64, ticks: usize) -> (f64, f64, usize) {
    let range = (max - min).abs().max(1e-9);
    let rough = range / (ticks as f64 - 1.0);
    let mag = 10f64.powf(rough.abs().log10().floor());
    let norm = rough / mag;
    let step = if norm <= 1.0 {
        1.0
    } else if norm <= 2.0 {
        2.0
    } else if norm <= 5.0 {
        5.0
    } else {
        10.0
    } * mag;
    let start = (min / step).floor() * step;
    let end = (max / step).ceil() * step;
    let count = ((end - start) / step).round() as usize + 1;
    (start, step, count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nice_ticks_round_steps() {
        let (start, step, count) = nice_ticks(0.0, 100.0, 5);
        assert_eq!(start, 0.0);
        assert_eq!(step, 50.0);
        assert_eq!(count, 3);
    }

    #[test]
    fn tick_labels() {
        assert_eq!(fmt_tick(3.0), "3");
        assert_eq!(fmt_tick(0.25), "0.25");
        assert_eq!(fmt_tick(12.34), "12.3");
    }

    #[test]
    fn histogram_has_one_rect_per_bin_plus_frame() {
        let hist = Histogram::build(&[1.0, 2.0, 3.0, 4.0], 4);
        let svg = histogram(&hist, 400.0, 200.0, "Length", "Count").unwrap();
        assert!(svg.starts_with("<svg xmlns="));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("<rect").count(), 5);
    }

    #[test]
    fn bar_chart_escapes_labels() {
        let bars = vec![("<b>".to_string(), 2.0), ("x".to_string(), 1.0)];
        let svg = bar_chart(&bars, 400.0, 200.0, "Type", "Count").unwrap();
        assert!(svg.contains("&lt;b&gt;"));
        assert!(!svg.contains("<b>"));
    }

    #[test]
    fn long_labels_are_truncated() {
        assert_eq!(truncate("short", 18), "short");
        assert_eq!(truncate("abcdefghijklmnopqrstuvwxyz", 5), "abcd…");
    }
}
