//! Headless SVG rendering of a metro map.

use crate::render::{Renderer, Scene};
use indexmap::IndexMap;
use std::fmt::Write as _;

/// d3's `category10` palette.
pub const CATEGORY10: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

const LINK_WIDTH: f64 = 7.0;
const NODE_RADIUS: f64 = 8.0;
const NODE_STROKE_WIDTH: f64 = 3.0;
const CAPTION_OFFSET: f64 = -(NODE_RADIUS + 5.0);

/// Renders the whole scene into an SVG string on every rebuild and redraw.
///
/// Links carried by a single line take that line's palette colour; lines are assigned colours
/// in the order they are first drawn and keep them across rebuilds.
#[derive(Debug, Clone, Default)]
pub struct SvgRenderer {
    document: String,
    colors: IndexMap<String, &'static str>,
    size: Option<[f64; 2]>,
}

impl SvgRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last rendered document; empty before the first render.
    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn line_color(&self, line: &str) -> Option<&'static str> {
        self.colors.get(line).copied()
    }

    fn color(&mut self, line: &str) -> &'static str {
        if let Some(c) = self.colors.get(line) {
            return *c;
        }
        let c = CATEGORY10[self.colors.len() % CATEGORY10.len()];
        self.colors.insert(line.to_string(), c);
        c
    }

    fn render(&mut self, scene: &Scene<'_>) {
        let [width, height] = self.size.unwrap_or(scene.size);
        let topology = scene.topology;
        let mut out = String::new();
        let _ = write!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}">"#,
            num(width),
            num(height)
        );

        for link in topology.links() {
            let (Some(s), Some(t)) = (topology.node(&link.source), topology.node(&link.target))
            else {
                continue;
            };
            let stroke = match link.path.as_slice() {
                [only] => self.color(only),
                _ => "#000",
            };
            let _ = write!(
                out,
                r#"<line class="line" data-id="{}" x1="{}" y1="{}" x2="{}" y2="{}" style="stroke:{};stroke-width:{}"/>"#,
                Escaped(&link.id),
                num(s.x),
                num(s.y),
                num(t.x),
                num(t.y),
                stroke,
                num(LINK_WIDTH)
            );
        }

        for node in topology.nodes() {
            let _ = write!(
                out,
                r##"<circle class="circle" data-id="{}" r="{}" stroke="{}" stroke-width="{}" fill="#FFF" cx="{}" cy="{}"/>"##,
                Escaped(&node.id),
                num(NODE_RADIUS),
                if node.fixed { "#EEE" } else { "#000" },
                num(NODE_STROKE_WIDTH),
                num(node.x),
                num(node.y)
            );
        }

        // Captions go on top and take no part in layout.
        for node in topology.nodes().filter(|n| n.selected && !n.is_dummy()) {
            let _ = write!(
                out,
                r#"<g class="caption" data-id="{}" transform="translate({},{})"><text text-anchor="middle" y="{}">{}</text></g>"#,
                Escaped(&node.id),
                num(node.x),
                num(node.y),
                num(CAPTION_OFFSET),
                Escaped(node.label.as_deref().unwrap_or_default())
            );
        }

        out.push_str("</svg>");
        self.document = out;
    }
}

impl Renderer for SvgRenderer {
    fn rebuild(&mut self, scene: &Scene<'_>) {
        self.size = Some(scene.size);
        self.render(scene);
    }

    fn redraw(&mut self, scene: &Scene<'_>) {
        self.render(scene);
    }

    fn resize(&mut self, size: [f64; 2]) {
        self.size = Some(size);
    }
}

fn num(v: f64) -> Num {
    Num(v)
}

/// Values this close to an integer are written as that integer.
const INTEGER_SNAP: f64 = 1e-6;

/// A coordinate as written into an attribute: non-finite values become `0`, float noise
/// around integers is dropped and `-0` prints as `0`.
#[derive(Debug, Clone, Copy)]
struct Num(f64);

impl Num {
    fn tidy(self) -> f64 {
        let v = self.0;
        if !v.is_finite() {
            return 0.0;
        }
        let rounded = v.round();
        let v = if (v - rounded).abs() < INTEGER_SNAP { rounded } else { v };
        // IEEE addition turns -0 into +0 and leaves everything else alone.
        v + 0.0
    }
}

impl std::fmt::Display for Num {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tidy())
    }
}

/// Text or attribute content with markup characters replaced by entities.
struct Escaped<'a>(&'a str);

fn entity(c: char) -> Option<&'static str> {
    Some(match c {
        '&' => "&amp;",
        '<' => "&lt;",
        '>' => "&gt;",
        '"' => "&quot;",
        '\'' => "&#39;",
        _ => return None,
    })
}

impl std::fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut rest = self.0;
        while let Some((at, replacement)) = rest
            .char_indices()
            .find_map(|(i, c)| entity(c).map(|e| (i, e)))
        {
            f.write_str(&rest[..at])?;
            f.write_str(replacement)?;
            // Every escaped character is a single byte.
            rest = &rest[at + 1..];
        }
        f.write_str(rest)
    }
}
