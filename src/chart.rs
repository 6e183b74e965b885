//! SVG bar chart of composite AQI per city within one state.

use crate::analyzers::types::StateBreakdown;

const WIDTH: f64 = 1500.0;
const HEIGHT: f64 = 800.0;
const MARGIN_LEFT: f64 = 90.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 70.0;
const MARGIN_BOTTOM: f64 = 220.0;
const Y_TICKS: usize = 5;

const BAR_COLOR: &str = "skyblue";
const HIGHLIGHT_COLOR: &str = "red";

/// Renders one bar per city of `breakdown`, in the order given.
///
/// The bar of `highlight` (matched ignoring case) is drawn in red and
/// annotated with its value. If several cities match, only the first is
/// highlighted. Cities without a composite keep their slot on
/// the axis but get no bar.
pub fn render_bar_chart(breakdown: &StateBreakdown, highlight: Option<&str>) -> String {
    let plot_width = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_height = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let baseline = MARGIN_TOP + plot_height;

    let y_max = axis_max(
        breakdown
            .cities
            .iter()
            .filter_map(|c| c.composite)
            .fold(0.0, f64::max),
    );
    let scale = |value: f64| value / y_max * plot_height;

    let highlighted_index = highlight.map(str::to_lowercase).and_then(|h| {
        breakdown
            .cities
            .iter()
            .position(|c| c.city.to_lowercase() == h)
    });
    let slot = plot_width / breakdown.cities.len().max(1) as f64;
    let bar_width = slot * 0.8;

    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}" font-family="sans-serif">"#
    ));
    svg.push_str(r#"<rect width="100%" height="100%" fill="white"/>"#);
    svg.push_str(&format!(
        r#"<text x="{}" y="{}" text-anchor="middle" font-size="20">Composite Pollution Index (AQI) by City in {}</text>"#,
        WIDTH / 2.0,
        MARGIN_TOP / 2.0,
        escape(&breakdown.state)
    ));

    for tick in 0..=Y_TICKS {
        let value = y_max * tick as f64 / Y_TICKS as f64;
        let y = baseline - scale(value);
        svg.push_str(&format!(
            r##"<line x1="{MARGIN_LEFT}" y1="{y:.2}" x2="{:.2}" y2="{y:.2}" stroke="#dddddd"/>"##,
            WIDTH - MARGIN_RIGHT
        ));
        svg.push_str(&format!(
            r#"<text x="{:.2}" y="{y:.2}" text-anchor="end" dominant-baseline="middle" font-size="12">{value:.0}</text>"#,
            MARGIN_LEFT - 8.0
        ));
    }

    for (i, city) in breakdown.cities.iter().enumerate() {
        let center = MARGIN_LEFT + slot * (i as f64 + 0.5);
        let name = escape(&city.city);

        if let Some(value) = city.composite {
            let highlighted = highlighted_index == Some(i);
            let color = if highlighted { HIGHLIGHT_COLOR } else { BAR_COLOR };
            let height = scale(value);
            let top = baseline - height;

            svg.push_str(&format!(
                r#"<rect x="{:.2}" y="{top:.2}" width="{bar_width:.2}" height="{height:.2}" fill="{color}"><title>{name}: {value:.2}</title></rect>"#,
                center - bar_width / 2.0
            ));

            if highlighted {
                svg.push_str(&format!(
                    r#"<text x="{center:.2}" y="{:.2}" text-anchor="middle" font-size="12" font-weight="bold" fill="black">{value:.2}</text>"#,
                    top - 4.0
                ));
            }
        }

        svg.push_str(&format!(
            r#"<text x="{center:.2}" y="{:.2}" text-anchor="end" font-size="12" transform="rotate(-45 {center:.2} {:.2})">{name}</text>"#,
            baseline + 16.0,
            baseline + 16.0
        ));
    }

    svg.push_str(&format!(
        r#"<line x1="{MARGIN_LEFT}" y1="{baseline}" x2="{}" y2="{baseline}" stroke="black"/>"#,
        WIDTH - MARGIN_RIGHT
    ));
    svg.push_str(&format!(
        r#"<line x1="{MARGIN_LEFT}" y1="{MARGIN_TOP}" x2="{MARGIN_LEFT}" y2="{baseline}" stroke="black"/>"#
    ));
    svg.push_str(&format!(
        r#"<text x="{}" y="{}" text-anchor="middle" font-size="14">City</text>"#,
        MARGIN_LEFT + plot_width / 2.0,
        HEIGHT - 15.0
    ));
    svg.push_str(&format!(
        r#"<text x="20" y="{0}" text-anchor="middle" font-size="14" transform="rotate(-90 20 {0})">Composite AQI</text>"#,
        MARGIN_TOP + plot_height / 2.0
    ));
    svg.push_str("</svg>");

    svg
}

/// Rounds the tallest bar up to the next multiple of 50 so ticks land on whole numbers.
fn axis_max(tallest: f64) -> f64 {
    ((tallest * 1.05 / 50.0).ceil() * 50.0).max(50.0)
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
