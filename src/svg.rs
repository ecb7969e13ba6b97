//! SVG rendering of a symbol for visual inspection.
//!
//! Points are drawn as dots; strokes are drawn as one black polyline, or
//! as red (straight) and green (curved) runs once their segments have been
//! classified.

use std::fmt;

use crate::stroke::SegmentKind;
use crate::symbol::Symbol;

/// View box margin around the squared bounds.
const MARGIN: f64 = 0.1;

/// Display adapter that writes a symbol as an SVG document.
pub struct SymbolSvg<'a>(pub &'a Symbol);

impl fmt::Display for SymbolSvg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = self.0;
        let view = symbol.squared_bounds().inflate(MARGIN, MARGIN);

        writeln!(f, r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"#)?;
        writeln!(
            f,
            r#"<svg xmlns="http://www.w3.org/2000/svg" fill-rule="evenodd" height="10.0in" width="10.0in" preserveAspectRatio="none" stroke-linecap="round" viewBox="{} {} {} {}">"#,
            view.x0,
            view.y0,
            view.width(),
            view.height(),
        )?;
        writeln!(f, r#"<style type="text/css">"#)?;
        for (pen, rgb) in [("pen0", "0,0,0"), ("pen1", "255,0,0"), ("pen2", "0,255,0")] {
            writeln!(
                f,
                ".{pen} {{ stroke: rgb({rgb}); stroke-width: 0.005; stroke-linejoin: round; }}"
            )?;
        }
        writeln!(f, "</style>")?;
        writeln!(f, "<g>")?;

        for stroke in symbol.strokes() {
            let points = stroke.points();
            for p in points {
                writeln!(f, r#"<circle cx="{}" cy="{}" r="0.01" fill="blue"/>"#, p.x, p.y)?;
            }
            match stroke.segments() {
                None => polyline(f, "pen0", points)?,
                Some(segments) => {
                    for seg in segments {
                        let pen = match seg.kind {
                            SegmentKind::Straight => "pen1",
                            SegmentKind::Curve => "pen2",
                        };
                        polyline(f, pen, &points[seg.start..=seg.end])?;
                    }
                }
            }
        }

        writeln!(f, "</g>")?;
        writeln!(f, "</svg>")
    }
}

fn polyline(f: &mut fmt::Formatter<'_>, pen: &str, points: &[kurbo::Point]) -> fmt::Result {
    write!(f, r#"<polyline class="{pen}" fill="none" points=""#)?;
    for p in points {
        write!(f, "{},{} ", p.x, p.y)?;
    }
    writeln!(f, r#""/>"#)
}

impl Symbol {
    /// The symbol as a standalone SVG document.
    pub fn to_svg(&self) -> String {
        SymbolSvg(self).to_string()
    }
}
