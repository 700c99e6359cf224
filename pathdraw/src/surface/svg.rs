use std::fmt::Write;

use tracing::trace;

use super::{Canvas, LineCap, StrokeStyle};
use crate::map::Point;

const DEFAULT_STYLE: StrokeStyle = StrokeStyle {
    width: 1.0,
    color: "black",
    cap: LineCap::Butt,
};

/// Canvas that renders strokes into a standalone SVG document.
#[derive(Debug, Clone)]
pub struct SvgCanvas {
    width: u32,
    height: u32,
    scale: (f64, f64),
    style: StrokeStyle,
    saved: Vec<StrokeStyle>,
    path: String,
    /// Element holding the current path, re-stroking replaces it.
    open: Option<usize>,
    elements: Vec<String>,
}

impl Default for SvgCanvas {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            scale: (1.0, 1.0),
            style: DEFAULT_STYLE,
            saved: Vec::new(),
            path: String::new(),
            open: None,
            elements: Vec::new(),
        }
    }
}

impl SvgCanvas {
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn to_svg(&self) -> String {
        self.to_svg_with(&[])
    }

    /// The document with `overlays` drawn above the strokes, in the same
    /// logical pixels.
    pub fn to_svg_with(&self, overlays: &[String]) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height,
        );
        let _ = write!(
            out,
            r#"<g transform="scale({} {})">"#,
            self.scale.0, self.scale.1
        );
        for element in self.elements.iter().chain(overlays) {
            out.push_str(element);
        }
        out.push_str("</g></svg>\n");
        out
    }

    fn logical_size(&self) -> (f64, f64) {
        (
            f64::from(self.width) / self.scale.0,
            f64::from(self.height) / self.scale.1,
        )
    }
}

/// An `<image>` element with its top-left corner at `origin`.
pub fn image(href: &str, origin: Point, (width, height): (u32, u32)) -> String {
    format!(
        r#"<image href="{href}" x="{:.2}" y="{:.2}" width="{width}" height="{height}"/>"#,
        origin.x, origin.y
    )
}

impl Canvas for SvgCanvas {
    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.elements.clear();
        self.open = None;
    }

    fn scale(&mut self, x: f64, y: f64) {
        self.scale = (self.scale.0 * x, self.scale.1 * y);
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let (w, h) = self.logical_size();
        if x <= 0.0 && y <= 0.0 && x + width >= w && y + height >= h {
            self.elements.clear();
            self.open = None;
        } else {
            trace!(x, y, width, height, "partial clear is not representable in svg");
        }
    }

    fn save(&mut self) {
        self.saved.push(self.style);
    }

    fn restore(&mut self) {
        if let Some(style) = self.saved.pop() {
            self.style = style;
        }
    }

    fn begin_path(&mut self) {
        self.path.clear();
        self.open = None;
    }

    fn move_to(&mut self, x: f64, y: f64) {
        let _ = write!(self.path, "M{x:.2} {y:.2} ");
    }

    fn line_to(&mut self, x: f64, y: f64) {
        let cmd = if self.path.is_empty() { 'M' } else { 'L' };
        let _ = write!(self.path, "{cmd}{x:.2} {y:.2} ");
    }

    fn stroke(&mut self) {
        if self.path.is_empty() {
            return;
        }
        let element = format!(
            r#"<path d="{}" fill="none" stroke="{}" stroke-width="{}" stroke-linecap="{}"/>"#,
            self.path.trim_end(),
            self.style.color,
            self.style.width,
            self.style.cap.as_str(),
        );
        match self.open {
            Some(index) => self.elements[index] = element,
            None => {
                self.elements.push(element);
                self.open = Some(self.elements.len() - 1);
            }
        }
    }

    fn set_stroke_style(&mut self, style: &StrokeStyle) {
        self.style = *style;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::MY_PATH_STYLE;

    #[test]
    fn restroking_a_path_replaces_its_element() {
        let mut canvas = SvgCanvas::default();
        canvas.resize(200, 100);
        canvas.begin_path();
        canvas.set_stroke_style(&MY_PATH_STYLE);
        canvas.move_to(10.0, 10.0);
        canvas.line_to(20.0, 20.0);
        canvas.stroke();
        canvas.line_to(30.0, 25.0);
        canvas.stroke();

        assert_eq!(canvas.element_count(), 1);
        let svg = canvas.to_svg();
        assert!(svg.contains(r#"d="M10.00 10.00 L20.00 20.00 L30.00 25.00""#));
        assert!(svg.contains(r#"stroke="rgba(255,1,2,1)""#));
        assert!(svg.contains(r#"stroke-linecap="round""#));
    }

    #[test]
    fn overlays_sit_above_the_strokes() {
        let mut canvas = SvgCanvas::default();
        canvas.resize(200, 100);
        canvas.begin_path();
        canvas.move_to(0.0, 0.0);
        canvas.line_to(5.0, 5.0);
        canvas.stroke();

        let pin = image("assets/sticker.svg", Point::new(85.0, 25.0), (30, 30));
        assert_eq!(
            pin,
            r#"<image href="assets/sticker.svg" x="85.00" y="25.00" width="30" height="30"/>"#
        );
        let svg = canvas.to_svg_with(&[pin.clone()]);
        assert!(svg.find("<path").unwrap() < svg.find(&pin).unwrap());
        assert_eq!(canvas.element_count(), 1);
    }

    #[test]
    fn full_clear_drops_elements_and_restore_pops_style() {
        let mut canvas = SvgCanvas::default();
        canvas.resize(400, 300);
        canvas.scale(2.0, 2.0);
        canvas.save();
        canvas.set_stroke_style(&MY_PATH_STYLE);
        canvas.begin_path();
        canvas.move_to(1.0, 1.0);
        canvas.line_to(2.0, 2.0);
        canvas.stroke();
        canvas.restore();

        canvas.clear_rect(10.0, 10.0, 5.0, 5.0);
        assert_eq!(canvas.element_count(), 1);
        canvas.clear_rect(0.0, 0.0, 200.0, 150.0);
        assert_eq!(canvas.element_count(), 0);

        canvas.begin_path();
        canvas.move_to(0.0, 0.0);
        canvas.line_to(5.0, 5.0);
        canvas.stroke();
        assert!(canvas.to_svg().contains(r#"stroke="black""#));
        assert!(canvas.to_svg().contains(r#"scale(2 2)"#));
    }
}
