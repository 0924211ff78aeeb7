//! Chart documents are plain SVG strings built here and rasterised to PNG
//! with resvg. Building and rendering are split so the documents can be
//! inspected without touching the filesystem.

use crate::analysis::aggregate::{PriceDistribution, QuantityPricePoints};
use crate::analysis::timeseries::DailyPoint;
use crate::error::Error;
use chrono::NaiveDate;
use image::{ImageBuffer, RgbaImage};
use resvg::tiny_skia::{self, Pixmap};
use resvg::usvg::{Options, Tree};
use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::path::Path;
use tracing::{debug, warn};

pub const WIDTH: u32 = 1000;
pub const HEIGHT: u32 = 600;

const MARGIN_LEFT: f64 = 90.0;
const MARGIN_RIGHT: f64 = 40.0;
const MARGIN_TOP: f64 = 60.0;
const MARGIN_BOTTOM: f64 = 110.0;
const FONT: &str = "sans-serif";

const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

pub const NO_DATA: &str = "No data";

fn colour(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Anchor {
    Start,
    Middle,
    End,
}

impl Anchor {
    fn as_str(self) -> &'static str {
        match self {
            Anchor::Start => "start",
            Anchor::Middle => "middle",
            Anchor::End => "end",
        }
    }
}

/// Minimal SVG writer.
struct Svg {
    body: String,
}

impl Svg {
    fn new(title: &str) -> Self {
        let mut svg = Svg {
            body: format!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}">"#
            ),
        };
        svg.rect(0.0, 0.0, WIDTH as f64, HEIGHT as f64, "#ffffff", 1.0);
        svg.text(WIDTH as f64 / 2.0, 35.0, title, 20.0, Anchor::Middle, None);
        svg
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, fill: &str, opacity: f64) {
        self.body.push_str(&format!(
            r#"<rect x="{x:.2}" y="{y:.2}" width="{:.2}" height="{:.2}" fill="{fill}" fill-opacity="{opacity}"/>"#,
            width.max(0.0),
            height.max(0.0),
        ));
    }

    fn outlined_rect(&mut self, x: f64, y: f64, width: f64, height: f64, fill: &str) {
        self.body.push_str(&format!(
            r##"<rect x="{x:.2}" y="{y:.2}" width="{:.2}" height="{:.2}" fill="{fill}" stroke="#333333" stroke-width="1"/>"##,
            width.max(0.0),
            height.max(0.0),
        ));
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: &str, width: f64) {
        self.body.push_str(&format!(
            r#"<line x1="{x1:.2}" y1="{y1:.2}" x2="{x2:.2}" y2="{y2:.2}" stroke="{stroke}" stroke-width="{width}"/>"#
        ));
    }

    fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: &str, opacity: f64) {
        self.body.push_str(&format!(
            r#"<circle cx="{cx:.2}" cy="{cy:.2}" r="{r}" fill="{fill}" fill-opacity="{opacity}"/>"#
        ));
    }

    fn hollow_circle(&mut self, cx: f64, cy: f64, r: f64, stroke: &str) {
        self.body.push_str(&format!(
            r#"<circle cx="{cx:.2}" cy="{cy:.2}" r="{r}" fill="none" stroke="{stroke}" stroke-width="1"/>"#
        ));
    }

    fn polyline(&mut self, points: &[(f64, f64)], stroke: &str, width: f64) {
        let coords: Vec<String> = points
            .iter()
            .map(|(x, y)| format!("{x:.2},{y:.2}"))
            .collect();
        self.body.push_str(&format!(
            r#"<polyline points="{}" fill="none" stroke="{stroke}" stroke-width="{width}"/>"#,
            coords.join(" ")
        ));
    }

    fn path(&mut self, d: &str, fill: &str) {
        self.body.push_str(&format!(
            r##"<path d="{d}" fill="{fill}" stroke="#ffffff" stroke-width="1"/>"##
        ));
    }

    fn text(
        &mut self,
        x: f64,
        y: f64,
        content: &str,
        size: f64,
        anchor: Anchor,
        rotate: Option<f64>,
    ) {
        let transform = match rotate {
            Some(angle) => format!(r#" transform="rotate({angle} {x:.2} {y:.2})""#),
            None => String::new(),
        };
        self.body.push_str(&format!(
            r##"<text x="{x:.2}" y="{y:.2}" font-family="{FONT}" font-size="{size}" text-anchor="{}" fill="#222222"{transform}>{}</text>"##,
            anchor.as_str(),
            escape(content),
        ));
    }

    fn finish(mut self) -> String {
        self.body.push_str("</svg>");
        self.body
    }
}

#[derive(Debug, Clone, Copy)]
struct Area {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

impl Area {
    fn with_left_margin(left: f64) -> Self {
        Area {
            left,
            top: MARGIN_TOP,
            width: WIDTH as f64 - left - MARGIN_RIGHT,
            height: HEIGHT as f64 - MARGIN_TOP - MARGIN_BOTTOM,
        }
    }

    fn standard() -> Self {
        Area::with_left_margin(MARGIN_LEFT)
    }

    fn right(&self) -> f64 {
        self.left + self.width
    }

    fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Linear value axis with rounded tick positions.
#[derive(Debug, Clone, PartialEq)]
struct Axis {
    min: f64,
    max: f64,
    step: f64,
    ticks: Vec<f64>,
}

fn nice_step(range: f64, target_ticks: usize) -> f64 {
    let raw = range / target_ticks as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let residual = raw / magnitude;
    let nice = if residual <= 1.0 {
        1.0
    } else if residual <= 2.0 {
        2.0
    } else if residual <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

impl Axis {
    fn fit(values: impl IntoIterator<Item = f64>, include_zero: bool) -> Self {
        let (mut lo, mut hi) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        if lo > hi {
            lo = 0.0;
            hi = 1.0;
        }
        if include_zero {
            lo = lo.min(0.0);
            hi = hi.max(0.0);
        }
        if hi - lo < f64::EPSILON {
            lo -= 1.0;
            hi += 1.0;
        }

        let step = nice_step(hi - lo, 5);
        let min = (lo / step).floor() * step;
        let max = (hi / step).ceil() * step;
        let count = ((max - min) / step).round() as usize;
        let ticks = (0..=count).map(|i| min + step * i as f64).collect();
        Axis {
            min,
            max,
            step,
            ticks,
        }
    }

    fn fraction(&self, value: f64) -> f64 {
        (value - self.min) / (self.max - self.min)
    }

    fn to_y(&self, area: &Area, value: f64) -> f64 {
        area.bottom() - self.fraction(value) * area.height
    }

    fn to_x(&self, area: &Area, value: f64) -> f64 {
        area.left + self.fraction(value) * area.width
    }

    fn label(&self, value: f64) -> String {
        let decimals = if self.step >= 1.0 {
            0
        } else {
            (-self.step.log10()).ceil() as usize
        };
        format!("{value:.decimals$}")
    }
}

fn draw_value_axis_y(svg: &mut Svg, area: &Area, axis: &Axis, label: &str) {
    for &tick in &axis.ticks {
        let y = axis.to_y(area, tick);
        svg.line(area.left, y, area.right(), y, "#e5e5e5", 1.0);
        svg.text(area.left - 8.0, y + 4.0, &axis.label(tick), 12.0, Anchor::End, None);
    }
    svg.line(area.left, area.top, area.left, area.bottom(), "#333333", 1.0);
    let mid = area.top + area.height / 2.0;
    svg.text(area.left - 60.0, mid, label, 14.0, Anchor::Middle, Some(-90.0));
}

fn draw_value_axis_x(
    svg: &mut Svg,
    area: &Area,
    axis: &Axis,
    label: &str,
    format: impl Fn(f64) -> String,
) {
    for &tick in &axis.ticks {
        let x = axis.to_x(area, tick);
        svg.line(x, area.top, x, area.bottom(), "#e5e5e5", 1.0);
        svg.text(x, area.bottom() + 20.0, &format(tick), 12.0, Anchor::Middle, None);
    }
    svg.line(area.left, area.bottom(), area.right(), area.bottom(), "#333333", 1.0);
    let center = area.left + area.width / 2.0;
    svg.text(center, area.bottom() + 50.0, label, 14.0, Anchor::Middle, None);
}

/// Category labels centred under equal-width bands.
fn draw_category_axis_x(svg: &mut Svg, area: &Area, categories: &[String], label: &str) {
    let band = area.width / categories.len() as f64;
    let rotate = categories.len() > 6;
    for (i, category) in categories.iter().enumerate() {
        let x = area.left + band * (i as f64 + 0.5);
        let y = area.bottom() + 20.0;
        if rotate {
            svg.text(x, y, category, 12.0, Anchor::End, Some(-45.0));
        } else {
            svg.text(x, y, category, 12.0, Anchor::Middle, None);
        }
    }
    svg.line(area.left, area.bottom(), area.right(), area.bottom(), "#333333", 1.0);
    let center = area.left + area.width / 2.0;
    svg.text(center, HEIGHT as f64 - 15.0, label, 14.0, Anchor::Middle, None);
}

enum Swatch {
    Dot { opacity: f64 },
    Line,
}

fn draw_legend(svg: &mut Svg, area: &Area, entries: &[(String, &str, Swatch)]) {
    let longest = entries.iter().map(|(l, _, _)| l.len()).max().unwrap_or(0);
    let width = 40.0 + longest as f64 * 7.5;
    let height = 10.0 + entries.len() as f64 * 20.0;
    let left = area.right() - width - 10.0;
    let top = area.top + 10.0;
    svg.outlined_rect(left, top, width, height, "#ffffff");

    for (i, (label, fill, swatch)) in entries.iter().enumerate() {
        let y = top + 15.0 + i as f64 * 20.0;
        match swatch {
            Swatch::Dot { opacity } => svg.circle(left + 15.0, y, 5.0, fill, *opacity),
            Swatch::Line => svg.line(left + 5.0, y, left + 25.0, y, fill, 2.5),
        }
        svg.text(left + 32.0, y + 4.0, label, 12.0, Anchor::Start, None);
    }
}

/// Placeholder chart for an empty dataset.
pub fn no_data_chart(title: &str) -> String {
    let mut svg = Svg::new(title);
    svg.text(
        WIDTH as f64 / 2.0,
        HEIGHT as f64 / 2.0,
        NO_DATA,
        24.0,
        Anchor::Middle,
        None,
    );
    svg.finish()
}

pub fn bar_chart(title: &str, x_label: &str, y_label: &str, bars: &[(String, f64)]) -> String {
    if bars.is_empty() {
        return no_data_chart(title);
    }
    let mut svg = Svg::new(title);
    let area = Area::standard();
    let axis = Axis::fit(bars.iter().map(|(_, v)| *v), true);
    draw_value_axis_y(&mut svg, &area, &axis, y_label);

    let band = area.width / bars.len() as f64;
    let zero = axis.to_y(&area, 0.0);
    for (i, (_, value)) in bars.iter().enumerate() {
        let top = axis.to_y(&area, *value);
        svg.rect(
            area.left + band * (i as f64 + 0.15),
            top.min(zero),
            band * 0.7,
            (zero - top).abs(),
            colour(0),
            1.0,
        );
    }

    let categories: Vec<String> = bars.iter().map(|(c, _)| c.clone()).collect();
    draw_category_axis_x(&mut svg, &area, &categories, x_label);
    svg.finish()
}

/// Bars grow to the right; the first entry sits at the bottom.
pub fn horizontal_bar_chart(
    title: &str,
    x_label: &str,
    y_label: &str,
    bars: &[(String, f64)],
) -> String {
    if bars.is_empty() {
        return no_data_chart(title);
    }
    let mut svg = Svg::new(title);
    let area = Area::with_left_margin(150.0);
    let axis = Axis::fit(bars.iter().map(|(_, v)| *v), true);
    draw_value_axis_x(&mut svg, &area, &axis, x_label, |v| axis.label(v));

    let band = area.height / bars.len() as f64;
    let zero = axis.to_x(&area, 0.0);
    for (i, (category, value)) in bars.iter().enumerate() {
        let band_top = area.bottom() - band * (i as f64 + 1.0);
        let end = axis.to_x(&area, *value);
        svg.rect(
            zero.min(end),
            band_top + band * 0.15,
            (end - zero).abs(),
            band * 0.7,
            colour(0),
            1.0,
        );
        svg.text(
            area.left - 8.0,
            band_top + band / 2.0 + 4.0,
            category,
            12.0,
            Anchor::End,
            None,
        );
    }
    svg.line(area.left, area.top, area.left, area.bottom(), "#333333", 1.0);
    svg.text(
        20.0,
        area.top + area.height / 2.0,
        y_label,
        14.0,
        Anchor::Middle,
        Some(-90.0),
    );
    svg.finish()
}

/// Line through categorical points with a marker on each one.
pub fn line_chart(title: &str, x_label: &str, y_label: &str, points: &[(String, f64)]) -> String {
    if points.is_empty() {
        return no_data_chart(title);
    }
    let mut svg = Svg::new(title);
    let area = Area::standard();
    let axis = Axis::fit(points.iter().map(|(_, v)| *v), true);
    draw_value_axis_y(&mut svg, &area, &axis, y_label);

    let band = area.width / points.len() as f64;
    let coords: Vec<(f64, f64)> = points
        .iter()
        .enumerate()
        .map(|(i, (_, v))| (area.left + band * (i as f64 + 0.5), axis.to_y(&area, *v)))
        .collect();
    svg.polyline(&coords, colour(0), 2.0);
    for (x, y) in &coords {
        svg.circle(*x, *y, 4.5, colour(0), 1.0);
    }

    let categories: Vec<String> = points.iter().map(|(c, _)| c.clone()).collect();
    draw_category_axis_x(&mut svg, &area, &categories, x_label);
    svg.finish()
}

fn day_number(date: NaiveDate) -> f64 {
    f64::from(chrono::Datelike::num_days_from_ce(&date))
}

fn day_label(value: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(value.round() as i32)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Daily totals as faint dots with the moving mean drawn through them.
pub fn moving_average_chart(
    title: &str,
    y_label: &str,
    daily: &[DailyPoint],
    average: &[DailyPoint],
    window_days: u32,
) -> String {
    if daily.is_empty() {
        return no_data_chart(title);
    }
    let mut svg = Svg::new(title);
    let area = Area::standard();
    let x_axis = Axis::fit(daily.iter().map(|p| day_number(p.date)), false);
    let y_axis = Axis::fit(
        daily.iter().chain(average.iter()).map(|p| p.value),
        true,
    );
    draw_value_axis_y(&mut svg, &area, &y_axis, y_label);
    draw_value_axis_x(&mut svg, &area, &x_axis, "Date", day_label);

    for point in daily {
        svg.circle(
            x_axis.to_x(&area, day_number(point.date)),
            y_axis.to_y(&area, point.value),
            3.0,
            colour(0),
            0.3,
        );
    }
    let line: Vec<(f64, f64)> = average
        .iter()
        .map(|p| {
            (
                x_axis.to_x(&area, day_number(p.date)),
                y_axis.to_y(&area, p.value),
            )
        })
        .collect();
    svg.polyline(&line, colour(3), 2.5);

    draw_legend(
        &mut svg,
        &area,
        &[
            ("Daily sales".to_string(), colour(0), Swatch::Dot { opacity: 0.3 }),
            (
                format!("{window_days}-day moving average"),
                colour(3),
                Swatch::Line,
            ),
        ],
    );
    svg.finish()
}

/// One box per product: quartile box, median bar, Tukey whiskers and
/// outliers as hollow circles.
pub fn box_plot(
    title: &str,
    x_label: &str,
    y_label: &str,
    boxes: &[PriceDistribution],
) -> String {
    if boxes.is_empty() {
        return no_data_chart(title);
    }
    let mut svg = Svg::new(title);
    let area = Area::standard();
    let axis = Axis::fit(
        boxes.iter().flat_map(|b| {
            let s = &b.stats;
            [s.min, s.max, s.whisker_low, s.whisker_high]
        }),
        false,
    );
    draw_value_axis_y(&mut svg, &area, &axis, y_label);

    let band = area.width / boxes.len() as f64;
    for (i, distribution) in boxes.iter().enumerate() {
        let s = &distribution.stats;
        let center = area.left + band * (i as f64 + 0.5);
        let half = band * 0.25;
        let q1 = axis.to_y(&area, s.q1);
        let q3 = axis.to_y(&area, s.q3);

        svg.line(center, axis.to_y(&area, s.whisker_high), center, q3, "#333333", 1.0);
        svg.line(center, q1, center, axis.to_y(&area, s.whisker_low), "#333333", 1.0);
        for whisker in [s.whisker_low, s.whisker_high] {
            let y = axis.to_y(&area, whisker);
            svg.line(center - half / 2.0, y, center + half / 2.0, y, "#333333", 1.0);
        }
        svg.outlined_rect(center - half, q3, half * 2.0, q1 - q3, colour(i));
        let median = axis.to_y(&area, s.median);
        svg.line(center - half, median, center + half, median, "#ff7f0e", 2.0);
        for outlier in &s.outliers {
            svg.hollow_circle(center, axis.to_y(&area, *outlier), 4.0, "#333333");
        }
    }

    let categories: Vec<String> = boxes.iter().map(|b| b.product.clone()).collect();
    draw_category_axis_x(&mut svg, &area, &categories, x_label);
    svg.finish()
}

/// Slices start at twelve o'clock and run counter-clockwise, each labelled
/// with its share as `%.1f%%`.
pub fn pie_chart(title: &str, slices: &[(String, f64)]) -> String {
    let total: f64 = slices.iter().map(|(_, v)| v.max(0.0)).sum();
    if slices.is_empty() || total <= 0.0 {
        return no_data_chart(title);
    }
    let mut svg = Svg::new(title);
    let cx = WIDTH as f64 / 2.0;
    let cy = MARGIN_TOP + (HEIGHT as f64 - MARGIN_TOP) / 2.0;
    let radius = 200.0;
    let point = |angle: f64, r: f64| (cx + r * angle.cos(), cy - r * angle.sin());

    let mut start = FRAC_PI_2;
    for (i, (label, value)) in slices.iter().enumerate() {
        let share = value.max(0.0) / total;
        if share <= 0.0 {
            continue;
        }
        let sweep = share * TAU;
        let end = start + sweep;

        if share >= 1.0 {
            svg.circle(cx, cy, radius, colour(i), 1.0);
        } else {
            let (x0, y0) = point(start, radius);
            let (x1, y1) = point(end, radius);
            let large_arc = u8::from(sweep > PI);
            let d = format!(
                "M {cx:.2} {cy:.2} L {x0:.2} {y0:.2} A {radius} {radius} 0 {large_arc} 0 {x1:.2} {y1:.2} Z"
            );
            svg.path(&d, colour(i));
        }

        let mid = start + sweep / 2.0;
        let (lx, ly) = point(mid, radius * 0.6);
        svg.text(
            lx,
            ly + 4.0,
            &format!("{:.1}%", share * 100.0),
            13.0,
            Anchor::Middle,
            None,
        );
        let (nx, ny) = point(mid, radius * 1.12);
        let anchor = if mid.cos() >= 0.0 {
            Anchor::Start
        } else {
            Anchor::End
        };
        svg.text(nx, ny + 4.0, label, 14.0, anchor, None);

        start = end;
    }
    svg.finish()
}

/// Price on x, quantity on y, one colour per product with a legend.
pub fn scatter_chart(
    title: &str,
    x_label: &str,
    y_label: &str,
    groups: &[QuantityPricePoints],
) -> String {
    if groups.iter().all(|g| g.points.is_empty()) {
        return no_data_chart(title);
    }
    let mut svg = Svg::new(title);
    let area = Area::standard();
    let x_axis = Axis::fit(
        groups.iter().flat_map(|g| g.points.iter().map(|(p, _)| *p)),
        false,
    );
    let y_axis = Axis::fit(
        groups
            .iter()
            .flat_map(|g| g.points.iter().map(|(_, q)| f64::from(*q))),
        true,
    );
    draw_value_axis_y(&mut svg, &area, &y_axis, y_label);
    draw_value_axis_x(&mut svg, &area, &x_axis, x_label, |v| x_axis.label(v));

    let mut legend = Vec::with_capacity(groups.len());
    for (i, group) in groups.iter().enumerate() {
        for (price, quantity) in &group.points {
            svg.circle(
                x_axis.to_x(&area, *price),
                y_axis.to_y(&area, f64::from(*quantity)),
                4.0,
                colour(i),
                0.7,
            );
        }
        legend.push((group.product.clone(), colour(i), Swatch::Dot { opacity: 0.7 }));
    }
    draw_legend(&mut svg, &area, &legend);
    svg.finish()
}

/// Rasterises chart documents. Holds the font database so system fonts are
/// loaded once per run.
pub struct ChartRenderer {
    options: Options<'static>,
}

impl ChartRenderer {
    pub fn new() -> Self {
        let mut options = Options::default();
        options.fontdb_mut().load_system_fonts();
        if options.fontdb.faces().next().is_none() {
            warn!("No system fonts found; chart text will not be rendered");
        }
        ChartRenderer { options }
    }

    pub fn render_png(&self, svg: &str, path: &Path) -> Result<(), Error> {
        let tree = Tree::from_str(svg, &self.options)
            .map_err(|e| Error::Chart(format!("invalid chart document: {}", e)))?;

        let mut pixmap = Pixmap::new(WIDTH, HEIGHT)
            .ok_or_else(|| Error::Chart("failed to allocate chart canvas".to_string()))?;
        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        let image: RgbaImage = ImageBuffer::from_raw(WIDTH, HEIGHT, pixmap.take())
            .ok_or_else(|| Error::Chart("chart canvas has unexpected size".to_string()))?;
        image
            .save(path)
            .map_err(|e| Error::Chart(format!("failed to write {}: {}", path.display(), e)))?;
        debug!("Rendered chart {}", path.display());
        Ok(())
    }
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::stats::box_stats;

    fn bars() -> Vec<(String, f64)> {
        vec![("melon".to_string(), 30.0), ("lime".to_string(), 12.5)]
    }

    #[test]
    fn test_axis_fit_includes_zero_and_rounds() {
        let axis = Axis::fit([12.5, 30.0], true);
        assert_eq!(axis.min, 0.0);
        assert_eq!(axis.max, 30.0);
        assert_eq!(axis.ticks.first(), Some(&0.0));
        assert_eq!(axis.ticks.last(), Some(&30.0));
    }

    #[test]
    fn test_axis_fit_flat_range_is_widened() {
        let axis = Axis::fit([5.0, 5.0], false);
        assert!(axis.min < 5.0 && axis.max > 5.0);
    }

    #[test]
    fn test_axis_fit_without_values() {
        let axis = Axis::fit(std::iter::empty(), false);
        assert_eq!(axis.min, 0.0);
        assert_eq!(axis.max, 1.0);
    }

    #[test]
    fn test_empty_inputs_render_no_data() {
        assert!(bar_chart("Sales", "Product", "Total", &[]).contains(NO_DATA));
        assert!(pie_chart("Quantity", &[]).contains(NO_DATA));
        assert!(pie_chart("Quantity", &[("lime".to_string(), 0.0)]).contains(NO_DATA));
        assert!(scatter_chart("Scatter", "Price", "Quantity", &[]).contains(NO_DATA));
        assert!(moving_average_chart("Trend", "Sales", &[], &[], 7).contains(NO_DATA));
    }

    #[test]
    fn test_bar_chart_has_one_bar_per_product() {
        let svg = bar_chart("Sales", "Product", "Total", &bars());
        // background plus two bars
        assert_eq!(svg.matches("<rect").count(), 3);
        assert!(svg.contains(">melon</text>"));
        assert!(!svg.contains(NO_DATA));
    }

    #[test]
    fn test_pie_chart_labels_shares() {
        let slices = vec![("lime".to_string(), 3.0), ("melon".to_string(), 1.0)];
        let svg = pie_chart("Quantity", &slices);
        assert!(svg.contains(">75.0%</text>"));
        assert!(svg.contains(">25.0%</text>"));
    }

    #[test]
    fn test_pie_chart_single_slice_is_full_circle() {
        let svg = pie_chart("Quantity", &[("lime".to_string(), 4.0)]);
        assert!(svg.contains(">100.0%</text>"));
        assert!(!svg.contains("<path"));
    }

    #[test]
    fn test_labels_are_escaped() {
        let svg = bar_chart("Sales & more", "Product", "Total", &[("a<b".to_string(), 1.0)]);
        assert!(svg.contains("Sales &amp; more"));
        assert!(svg.contains("a&lt;b"));
    }

    #[test]
    fn test_box_plot_draws_outliers() {
        let stats = box_stats(&[1.0, 2.0, 2.0, 3.0, 40.0]).unwrap();
        let outliers = stats.outliers.len();
        let svg = box_plot(
            "Prices",
            "Product",
            "Price",
            &[PriceDistribution {
                product: "lime".to_string(),
                stats,
            }],
        );
        assert_eq!(outliers, 1);
        assert_eq!(svg.matches(r#"fill="none""#).count(), outliers);
    }

    #[test]
    fn test_render_png_writes_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.png");
        let renderer = ChartRenderer::new();
        renderer
            .render_png(&bar_chart("Sales", "Product", "Total", &bars()), &path)
            .unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }
}
