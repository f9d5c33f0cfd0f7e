//! SVG chart generation for the dashboard panels

pub const PRIMARY_COLOR: &str = "#F47C20";
pub const SECONDARY_COLOR: &str = "#2C3E50";
pub const TERTIARY_COLOR: &str = "#24426D";

const PALETTE: [&str; 3] = [PRIMARY_COLOR, SECONDARY_COLOR, TERTIARY_COLOR];

const WIDTH: f64 = 720.0;
const HEIGHT: f64 = 360.0;
const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 60.0;

/// One labelled value on a chart
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub label: String,
    pub value: f64,
}

impl Point {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Axis maximum rounded up to a readable step
fn nice_max(max: f64) -> f64 {
    if max <= 0.0 {
        return 1.0;
    }
    let magnitude = 10f64.powf(max.log10().floor());
    [1.0, 2.0, 2.5, 5.0, 10.0]
        .into_iter()
        .map(|s| s * magnitude)
        .find(|s| *s >= max)
        .unwrap_or(10.0 * magnitude)
}

fn format_tick(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{:.0}", v)
    } else {
        format!("{:.1}", v)
    }
}

fn empty_chart(title: &str) -> String {
    format!(
        r##"<svg class="chart empty" width="{w}" height="{h}" viewBox="0 0 {w} {h}" xmlns="http://www.w3.org/2000/svg">
  <text x="{cx}" y="28" text-anchor="middle" font-size="18" font-weight="bold" fill="{fg}">{title}</text>
  <text x="{cx}" y="{cy}" text-anchor="middle" font-size="14" fill="{fg}">No data for the selected range</text>
</svg>"##,
        w = WIDTH,
        h = HEIGHT,
        cx = WIDTH / 2.0,
        cy = HEIGHT / 2.0,
        fg = SECONDARY_COLOR,
        title = escape_xml(title),
    )
}

fn frame(title: &str, x_label: &str, y_label: &str, y_max: f64, body: &str) -> String {
    let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let mut grid = String::new();
    for i in 0..=4 {
        let v = y_max * i as f64 / 4.0;
        let y = MARGIN_TOP + plot_h - plot_h * i as f64 / 4.0;
        grid.push_str(&format!(
            r##"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-dasharray="4 4" stroke-opacity="0.6"/><text x="{:.1}" y="{:.1}" text-anchor="end" font-size="11" fill="{}">{}</text>"##,
            MARGIN_LEFT,
            y,
            WIDTH - MARGIN_RIGHT,
            y,
            TERTIARY_COLOR,
            MARGIN_LEFT - 6.0,
            y + 4.0,
            SECONDARY_COLOR,
            format_tick(v)
        ));
    }

    format!(
        r##"<svg class="chart" width="{w}" height="{h}" viewBox="0 0 {w} {h}" xmlns="http://www.w3.org/2000/svg">
  <text x="{cx}" y="28" text-anchor="middle" font-size="18" font-weight="bold" fill="{fg}">{title}</text>
  <g class="grid">{grid}</g>
  <g class="data">{body}</g>
  <text x="{cx}" y="{xl}" text-anchor="middle" font-size="13" fill="{fg}">{x_label}</text>
  <text x="16" y="{cy}" text-anchor="middle" font-size="13" fill="{fg}" transform="rotate(-90 16 {cy})">{y_label}</text>
</svg>"##,
        w = WIDTH,
        h = HEIGHT,
        cx = WIDTH / 2.0,
        cy = HEIGHT / 2.0,
        xl = HEIGHT - 10.0,
        fg = SECONDARY_COLOR,
        title = escape_xml(title),
        grid = grid,
        body = body,
        x_label = escape_xml(x_label),
        y_label = escape_xml(y_label),
    )
}

/// Line chart with a marker on every point; labels thinned to fit
pub fn line_chart(title: &str, x_label: &str, y_label: &str, points: &[Point]) -> String {
    if points.is_empty() {
        return empty_chart(title);
    }

    let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let y_max = nice_max(points.iter().map(|p| p.value).fold(0.0, f64::max));
    let step = if points.len() > 1 {
        plot_w / (points.len() - 1) as f64
    } else {
        0.0
    };
    let label_every = (points.len() / 8).max(1);

    let mut path = String::new();
    let mut markers = String::new();
    let mut labels = String::new();
    for (i, p) in points.iter().enumerate() {
        let x = if points.len() > 1 {
            MARGIN_LEFT + step * i as f64
        } else {
            MARGIN_LEFT + plot_w / 2.0
        };
        let y = MARGIN_TOP + plot_h - (p.value.max(0.0) / y_max) * plot_h;
        let cmd = if i == 0 { "M" } else { " L" };
        path.push_str(&format!("{}{:.1},{:.1}", cmd, x, y));
        markers.push_str(&format!(
            r##"<circle cx="{:.1}" cy="{:.1}" r="3" fill="{}"><title>{}: {}</title></circle>"##,
            x,
            y,
            PRIMARY_COLOR,
            escape_xml(&p.label),
            format_tick(p.value)
        ));
        if i % label_every == 0 {
            labels.push_str(&format!(
                r##"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="10" fill="{}">{}</text>"##,
                x,
                MARGIN_TOP + plot_h + 16.0,
                SECONDARY_COLOR,
                escape_xml(&p.label)
            ));
        }
    }

    let body = format!(
        r##"<path d="{}" fill="none" stroke="{}" stroke-width="2"/>{}{}"##,
        path, PRIMARY_COLOR, markers, labels
    );
    frame(title, x_label, y_label, y_max, &body)
}

/// Vertical bars with the value printed above each bar
pub fn bar_chart(title: &str, x_label: &str, y_label: &str, bars: &[Point]) -> String {
    if bars.is_empty() {
        return empty_chart(title);
    }

    let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let y_max = nice_max(bars.iter().map(|b| b.value).fold(0.0, f64::max));
    let slot = plot_w / bars.len() as f64;
    let bar_w = slot * 0.7;

    let mut body = String::new();
    for (i, bar) in bars.iter().enumerate() {
        let h = (bar.value.max(0.0) / y_max) * plot_h;
        let x = MARGIN_LEFT + slot * i as f64 + (slot - bar_w) / 2.0;
        let y = MARGIN_TOP + plot_h - h;
        body.push_str(&format!(
            r##"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"/><text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="11" fill="{}">{}</text><text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="11" fill="{}">{}</text>"##,
            x,
            y,
            bar_w,
            h,
            PALETTE[i % PALETTE.len()],
            x + bar_w / 2.0,
            y - 4.0,
            SECONDARY_COLOR,
            format_tick(bar.value),
            x + bar_w / 2.0,
            MARGIN_TOP + plot_h + 16.0,
            SECONDARY_COLOR,
            escape_xml(&bar.label)
        ));
    }
    frame(title, x_label, y_label, y_max, &body)
}

/// Horizontal bars, first item on top; used for category rankings
pub fn horizontal_bar_chart(title: &str, x_label: &str, bars: &[Point]) -> String {
    if bars.is_empty() {
        return empty_chart(title);
    }

    let label_w = 180.0;
    let plot_w = WIDTH - label_w - MARGIN_RIGHT - 40.0;
    let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let x_max = nice_max(bars.iter().map(|b| b.value).fold(0.0, f64::max));
    let slot = plot_h / bars.len() as f64;
    let bar_h = slot * 0.7;

    let mut body = String::new();
    for (i, bar) in bars.iter().enumerate() {
        let w = (bar.value.max(0.0) / x_max) * plot_w;
        let y = MARGIN_TOP + slot * i as f64 + (slot - bar_h) / 2.0;
        body.push_str(&format!(
            r##"<text x="{:.1}" y="{:.1}" text-anchor="end" font-size="12" fill="{}">{}</text><rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"/><text x="{:.1}" y="{:.1}" font-size="11" fill="{}">{}</text>"##,
            label_w - 8.0,
            y + bar_h / 2.0 + 4.0,
            SECONDARY_COLOR,
            escape_xml(&bar.label),
            label_w,
            y,
            w,
            bar_h,
            PRIMARY_COLOR,
            label_w + w + 6.0,
            y + bar_h / 2.0 + 4.0,
            SECONDARY_COLOR,
            format_tick(bar.value)
        ));
    }

    format!(
        r##"<svg class="chart" width="{w}" height="{h}" viewBox="0 0 {w} {h}" xmlns="http://www.w3.org/2000/svg">
  <text x="{cx}" y="28" text-anchor="middle" font-size="18" font-weight="bold" fill="{fg}">{title}</text>
  <g class="data">{body}</g>
  <text x="{cx}" y="{xl}" text-anchor="middle" font-size="13" fill="{fg}">{x_label}</text>
</svg>"##,
        w = WIDTH,
        h = HEIGHT,
        cx = WIDTH / 2.0,
        xl = HEIGHT - 10.0,
        fg = SECONDARY_COLOR,
        title = escape_xml(title),
        body = body,
        x_label = escape_xml(x_label),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml(r#"a<b & "c">'"#), "a&lt;b &amp; &quot;c&quot;&gt;&#39;");
    }

    #[test]
    fn test_nice_max() {
        assert_eq!(nice_max(0.0), 1.0);
        assert_eq!(nice_max(7.0), 10.0);
        assert_eq!(nice_max(180.0), 200.0);
        assert_eq!(nice_max(2400.0), 2500.0);
    }

    #[test]
    fn test_empty_series_render_placeholder() {
        for svg in [
            line_chart("Daily Orders", "Date", "Orders", &[]),
            bar_chart("Reviews", "Rating", "Count", &[]),
            horizontal_bar_chart("Top", "Sales", &[]),
        ] {
            assert!(svg.contains("No data for the selected range"));
        }
    }

    #[test]
    fn test_line_chart_markers() {
        let points = vec![Point::new("2024-01-01", 2.0), Point::new("2024-01-02", 1.0)];
        let svg = line_chart("Daily Orders", "Date", "Orders", &points);
        assert_eq!(svg.matches("<circle").count(), 2);
        assert!(svg.contains("<path d=\"M"));
    }

    #[test]
    fn test_bar_labels_escaped() {
        let bars = vec![Point::new("a&b", 3.0)];
        let svg = horizontal_bar_chart("Top", "Sales", &bars);
        assert!(svg.contains("a&amp;b"));
        assert_eq!(svg.matches("<rect").count(), 1);
    }
}
