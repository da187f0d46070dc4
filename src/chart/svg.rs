use std::fmt::Write;

use super::{polar, PizzaChart, Wedge, CANVAS_HEIGHT, CANVAS_WIDTH, MEDAL_SIZE};

const FONT: &str = "DejaVu Sans, Segoe UI, sans-serif";
const INK: &str = "#000000";
const GRID_STEPS: [f64; 4] = [0.2, 0.4, 0.6, 0.8];

impl PizzaChart {
    /// Serialize the chart as a standalone SVG document. Medal images are
    /// embedded as data URIs so the markup has no external references.
    pub fn to_svg(&self) -> String {
        let mut svg = String::new();
        let (cx, cy) = self.center;

        let _ = writeln!(
            svg,
            "<svg xmlns='http://www.w3.org/2000/svg' width='{w:.0}' height='{h:.0}' viewBox='0 0 {w:.0} {h:.0}' role='img'>",
            w = CANVAS_WIDTH,
            h = CANVAS_HEIGHT,
        );
        let _ = writeln!(
            svg,
            "  <rect width='{:.0}' height='{:.0}' fill='#ffffff'/>",
            CANVAS_WIDTH, CANVAS_HEIGHT
        );

        for wedge in &self.wedges {
            write_wedge(&mut svg, wedge, self.center, self.wedges.len());
        }

        for step in GRID_STEPS {
            let _ = writeln!(
                svg,
                "  <circle cx='{cx:.1}' cy='{cy:.1}' r='{:.1}' fill='none' stroke='{INK}' stroke-width='1' stroke-dasharray='6 3 1 3'/>",
                self.outer_radius * step
            );
        }
        for angle in self.spoke_angles() {
            let (x, y) = polar(angle, self.outer_radius);
            let _ = writeln!(
                svg,
                "  <line x1='{cx:.1}' y1='{cy:.1}' x2='{x:.1}' y2='{y:.1}' stroke='{INK}' stroke-width='1'/>"
            );
        }
        let _ = writeln!(
            svg,
            "  <circle cx='{cx:.1}' cy='{cy:.1}' r='{:.1}' fill='none' stroke='{INK}' stroke-width='1'/>",
            self.outer_radius
        );

        for wedge in &self.wedges {
            let (x, y) = wedge.label_pos;
            let anchor = if x > cx + 1.0 {
                "start"
            } else if x < cx - 1.0 {
                "end"
            } else {
                "middle"
            };
            let _ = writeln!(
                svg,
                "  <text x='{x:.1}' y='{y:.1}' text-anchor='{anchor}' dominant-baseline='middle' font-family='{FONT}' font-size='12' fill='{INK}'>{}</text>",
                escape_text(wedge.stat.label())
            );
        }

        for wedge in &self.wedges {
            write_value_box(&mut svg, wedge);
        }

        for overlay in &self.medals {
            let (x, y) = overlay.pos;
            let _ = writeln!(
                svg,
                "  <image data-wedge='{}' data-medal='{}' x='{x:.1}' y='{y:.1}' width='{MEDAL_SIZE:.0}' height='{MEDAL_SIZE:.0}' href='{}'/>",
                overlay.wedge,
                overlay.medal.name(),
                overlay.icon.data_uri()
            );
        }

        let _ = writeln!(
            svg,
            "  <text x='{:.0}' y='36' text-anchor='middle' font-family='{FONT}' font-size='22' fill='{INK}'>{}</text>",
            CANVAS_WIDTH / 2.0,
            escape_text(&self.title)
        );
        let _ = writeln!(
            svg,
            "  <text x='{:.0}' y='62' text-anchor='middle' font-family='{FONT}' font-size='17' fill='{INK}'>{}</text>",
            CANVAS_WIDTH / 2.0,
            escape_text(&self.subtitle)
        );

        svg.push_str("</svg>\n");
        svg
    }
}

fn write_wedge(svg: &mut String, wedge: &Wedge, (cx, cy): (f64, f64), count: usize) {
    let fill = wedge.color.css();
    if count == 1 {
        let _ = writeln!(
            svg,
            "  <circle cx='{cx:.1}' cy='{cy:.1}' r='{:.1}' fill='{fill}' stroke='{INK}' stroke-width='1'>{}</circle>",
            wedge.radius,
            tooltip(wedge)
        );
        return;
    }
    let (x0, y0) = polar(wedge.start_deg, wedge.radius);
    let (x1, y1) = polar(wedge.end_deg, wedge.radius);
    let large_arc = u8::from(wedge.end_deg - wedge.start_deg > 180.0);
    let _ = writeln!(
        svg,
        "  <path d='M {cx:.1} {cy:.1} L {x0:.1} {y0:.1} A {r:.1} {r:.1} 0 {large_arc} 1 {x1:.1} {y1:.1} Z' fill='{fill}' stroke='{INK}' stroke-width='1'>{}</path>",
        tooltip(wedge),
        r = wedge.radius
    );
}

fn tooltip(wedge: &Wedge) -> String {
    format!(
        "<title>{}: percentile {:.0}</title>",
        escape_text(wedge.stat.label()),
        wedge.percentile
    )
}

fn write_value_box(svg: &mut String, wedge: &Wedge) {
    let (x, y) = wedge.value_pos;
    let width = 8.0 * wedge.value_text.chars().count() as f64 + 10.0;
    let height = 20.0;
    let fill = wedge.color.css();
    let _ = writeln!(
        svg,
        "  <rect x='{:.1}' y='{:.1}' width='{width:.1}' height='{height:.1}' rx='4' fill='{fill}' stroke='{INK}' stroke-width='1'/>",
        x - width / 2.0,
        y - height / 2.0
    );
    let _ = writeln!(
        svg,
        "  <text x='{x:.1}' y='{y:.1}' text-anchor='middle' dominant-baseline='middle' font-family='{FONT}' font-size='12' fill='#ffffff'>{}</text>",
        escape_text(&wedge.value_text)
    );
}

fn escape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}
