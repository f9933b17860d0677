//! SVG chart rendering for the backtest report.
//!
//! Two stacked panels sharing the date axis: price with both moving
//! averages on top, the equity curve below.

use crate::domain::series::BacktestRow;

const WIDTH: f64 = 1200.0;
const HEIGHT: f64 = 800.0;
const PADDING_LEFT: f64 = 80.0;
const PADDING_RIGHT: f64 = 30.0;
const PANEL_TOP: [f64; 2] = [50.0, 440.0];
const PANEL_HEIGHT: f64 = 300.0;
const Y_TICKS: usize = 5;
const X_TICKS: usize = 6;

const PRICE_COLOR: &str = "#1f77b4";
const FAST_COLOR: &str = "#ff7f0e";
const SLOW_COLOR: &str = "#2ca02c";
const EQUITY_COLOR: &str = "#1f77b4";

struct Line<'a> {
    label: String,
    color: &'a str,
    values: Vec<f64>,
}

struct Panel<'a> {
    title: String,
    top: f64,
    lines: Vec<Line<'a>>,
}

pub fn render_chart(
    rows: &[BacktestRow],
    ticker: &str,
    fast_window: usize,
    slow_window: usize,
) -> String {
    let panels = [
        Panel {
            title: format!("{} Price with Moving Averages", ticker),
            top: PANEL_TOP[0],
            lines: vec![
                Line {
                    label: "Price".to_string(),
                    color: PRICE_COLOR,
                    values: rows.iter().map(|r| r.price).collect(),
                },
                Line {
                    label: format!("{}-MA", fast_window),
                    color: FAST_COLOR,
                    values: rows.iter().map(|r| r.ma_fast).collect(),
                },
                Line {
                    label: format!("{}-MA", slow_window),
                    color: SLOW_COLOR,
                    values: rows.iter().map(|r| r.ma_slow).collect(),
                },
            ],
        },
        Panel {
            title: "Equity Curve".to_string(),
            top: PANEL_TOP[1],
            lines: vec![Line {
                label: "Equity".to_string(),
                color: EQUITY_COLOR,
                values: rows.iter().map(|r| r.equity).collect(),
            }],
        },
    ];

    let mut parts = vec![
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}" font-family="sans-serif" font-size="12">"#,
            w = WIDTH,
            h = HEIGHT
        ),
        format!(
            r#"<rect width="{:.0}" height="{:.0}" fill="white"/>"#,
            WIDTH, HEIGHT
        ),
    ];
    parts.extend(panels.iter().map(|panel| render_panel(panel, rows.len())));
    parts.extend(render_date_axis(rows));
    parts.push("</svg>".to_string());

    let mut svg = parts.join("\n");
    svg.push('\n');
    svg
}

fn x_coord(i: usize, n: usize) -> f64 {
    let plot_width = WIDTH - PADDING_LEFT - PADDING_RIGHT;
    if n > 1 {
        PADDING_LEFT + i as f64 * plot_width / (n - 1) as f64
    } else {
        PADDING_LEFT + plot_width / 2.0
    }
}

fn render_panel(panel: &Panel<'_>, n: usize) -> String {
    let plot_width = WIDTH - PADDING_LEFT - PADDING_RIGHT;
    let bottom = panel.top + PANEL_HEIGHT;

    let (min, max) = panel
        .lines
        .iter()
        .flat_map(|l| l.values.iter().copied())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    let (min, max) = if min.is_finite() && max.is_finite() {
        if max > min { (min, max) } else { (min - 1.0, max + 1.0) }
    } else {
        (0.0, 1.0)
    };
    let scale_y = PANEL_HEIGHT / (max - min);

    let mut parts = vec![
        format!(
            r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="14">{}</text>"#,
            PADDING_LEFT + plot_width / 2.0,
            panel.top - 12.0,
            escape(&panel.title)
        ),
        format!(
            r##"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="none" stroke="#333"/>"##,
            PADDING_LEFT, panel.top, plot_width, PANEL_HEIGHT
        ),
    ];

    for t in 0..=Y_TICKS {
        let value = min + (max - min) * t as f64 / Y_TICKS as f64;
        let y = bottom - (value - min) * scale_y;
        parts.push(format!(
            r##"<line x1="{:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="#ddd"/>"##,
            PADDING_LEFT,
            PADDING_LEFT + plot_width,
            y = y
        ));
        parts.push(format!(
            r#"<text x="{:.1}" y="{:.1}" text-anchor="end">{:.2}</text>"#,
            PADDING_LEFT - 6.0,
            y + 4.0,
            value
        ));
    }

    for line in panel.lines.iter().filter(|l| !l.values.is_empty()) {
        let points: Vec<String> = line
            .values
            .iter()
            .enumerate()
            .map(|(i, v)| format!("{:.1},{:.1}", x_coord(i, n), bottom - (v - min) * scale_y))
            .collect();
        parts.push(format!(
            r#"<polyline fill="none" stroke="{}" stroke-width="1.5" points="{}"/>"#,
            line.color,
            points.join(" ")
        ));
    }

    for (i, line) in panel.lines.iter().enumerate() {
        let y = panel.top + 16.0 + i as f64 * 16.0;
        let x = PADDING_LEFT + 10.0;
        parts.push(format!(
            r#"<line x1="{:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="{}" stroke-width="2"/>"#,
            x,
            x + 20.0,
            line.color,
            y = y
        ));
        parts.push(format!(
            r#"<text x="{:.1}" y="{:.1}">{}</text>"#,
            x + 26.0,
            y + 4.0,
            escape(&line.label)
        ));
    }

    parts.join("\n")
}

fn render_date_axis(rows: &[BacktestRow]) -> Vec<String> {
    let n = rows.len();
    let ticks = X_TICKS.min(n);
    let axis_y = PANEL_TOP[1] + PANEL_HEIGHT;

    (0..ticks)
        .map(|t| {
            let i = if ticks > 1 { t * (n - 1) / (ticks - 1) } else { 0 };
            format!(
                r#"<text x="{:.1}" y="{:.1}" text-anchor="middle">{}</text>"#,
                x_coord(i, n),
                axis_y + 18.0,
                rows[i].date.format("%Y-%m-%d")
            )
        })
        .collect()
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signal::Signal;
    use chrono::NaiveDate;

    fn sample_rows(n: usize) -> Vec<BacktestRow> {
        (0..n)
            .map(|i| BacktestRow {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Duration::days(i as i64),
                price: 100.0 + i as f64,
                ma_fast: 99.0 + i as f64,
                ma_slow: 98.0 + i as f64,
                signal: Signal::Long,
                position: if i == 0 { Signal::Flat } else { Signal::Long },
                returns: 0.0,
                strategy_returns: 0.0,
                equity: 10_000.0 + 10.0 * i as f64,
            })
            .collect()
    }

    #[test]
    fn chart_has_two_titled_panels() {
        let svg = render_chart(&sample_rows(10), "AAPL", 20, 50);

        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("AAPL Price with Moving Averages"));
        assert!(svg.contains("Equity Curve"));
    }

    #[test]
    fn chart_has_four_series_with_legend() {
        let svg = render_chart(&sample_rows(10), "AAPL", 20, 50);

        assert_eq!(svg.matches("<polyline").count(), 4);
        assert!(svg.contains(">Price<"));
        assert!(svg.contains(">20-MA<"));
        assert!(svg.contains(">50-MA<"));
        assert!(svg.contains(">Equity<"));
    }

    #[test]
    fn chart_labels_first_and_last_dates() {
        let svg = render_chart(&sample_rows(10), "AAPL", 2, 3);
        assert!(svg.contains("2024-01-01"));
        assert!(svg.contains("2024-01-10"));
    }

    #[test]
    fn flat_equity_still_renders() {
        let mut rows = sample_rows(3);
        for r in &mut rows {
            r.equity = 10_000.0;
        }
        let svg = render_chart(&rows, "FLAT", 2, 3);
        assert!(!svg.contains("NaN"));
        assert!(!svg.contains("inf"));
    }

    #[test]
    fn empty_rows_render_frame_only() {
        let svg = render_chart(&[], "NONE", 2, 3);
        assert_eq!(svg.matches("<polyline").count(), 0);
        assert!(svg.contains("Equity Curve"));
    }

    #[test]
    fn ticker_is_escaped() {
        let svg = render_chart(&sample_rows(2), "A&B", 2, 3);
        assert!(svg.contains("A&amp;B Price"));
    }

    #[test]
    fn one_element_per_line() {
        let svg = render_chart(&sample_rows(5), "AAPL", 2, 3);
        assert!(svg.lines().all(|line| line.starts_with('<')));
        assert_eq!(svg.lines().filter(|l| l.starts_with("<polyline")).count(), 4);
    }

    #[test]
    fn rendering_is_deterministic() {
        let rows = sample_rows(25);
        assert_eq!(
            render_chart(&rows, "AAPL", 2, 3),
            render_chart(&rows, "AAPL", 2, 3)
        );
    }
}
