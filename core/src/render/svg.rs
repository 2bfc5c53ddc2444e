use crate::chart::draw::{DrawCommand, HAlign, Point, Rgba, TextAnchor, VAlign};
use crate::prelude::{PaintTarget, RenderError, RenderResult};
use crate::report::document::{Document, Page};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontDesc, FontFamily, FontStyle};

const DASH: f64 = 5.0;
const GAP: f64 = 4.0;

fn backend_error<E: std::fmt::Display>(err: E) -> RenderError {
    RenderError::Backend(err.to_string())
}

fn color(rgba: Rgba) -> RGBAColor {
    RGBAColor(rgba.r, rgba.g, rgba.b, rgba.a)
}

fn coord(point: Point) -> (i32, i32) {
    (point.x.round() as i32, point.y.round() as i32)
}

fn stroke(width: f64) -> u32 {
    width.round().max(1.0) as u32
}

fn anchor(anchor: TextAnchor) -> Pos {
    let horizontal = match anchor.horizontal {
        HAlign::Left => HPos::Left,
        HAlign::Center => HPos::Center,
        HAlign::Right => HPos::Right,
    };
    let vertical = match anchor.vertical {
        VAlign::Top => VPos::Top,
        VAlign::Middle => VPos::Center,
        VAlign::Bottom => VPos::Bottom,
    };
    Pos::new(horizontal, vertical)
}

/// Splits a segment into dash pieces.
fn dashes(from: Point, to: Point) -> Vec<[(i32, i32); 2]> {
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    let length = (dx * dx + dy * dy).sqrt();
    if length <= f64::EPSILON {
        return Vec::new();
    }
    let (ux, uy) = (dx / length, dy / length);
    let mut pieces = Vec::new();
    let mut start = 0.0;
    while start < length {
        let end = (start + DASH).min(length);
        pieces.push([
            coord(Point::new(from.x + ux * start, from.y + uy * start)),
            coord(Point::new(from.x + ux * end, from.y + uy * end)),
        ]);
        start = end + GAP;
    }
    pieces
}

/// Replays display lists onto a plotters drawing area.
pub struct PlottersPainter<'a, DB: DrawingBackend> {
    area: &'a DrawingArea<DB, Shift>,
}

impl<'a, DB: DrawingBackend> PlottersPainter<'a, DB> {
    pub fn new(area: &'a DrawingArea<DB, Shift>) -> Self {
        Self { area }
    }
}

impl<'a, DB: DrawingBackend> PaintTarget for PlottersPainter<'a, DB> {
    fn paint(&mut self, command: &DrawCommand) -> RenderResult<()> {
        match command {
            DrawCommand::FillRect { rect, color: fill } => self
                .area
                .draw(&Rectangle::new(
                    [coord(Point::new(rect.x, rect.y)), coord(Point::new(rect.right(), rect.bottom()))],
                    color(*fill).filled(),
                ))
                .map_err(backend_error),
            DrawCommand::StrokeRect {
                rect,
                color: line,
                width,
            } => self
                .area
                .draw(&Rectangle::new(
                    [coord(Point::new(rect.x, rect.y)), coord(Point::new(rect.right(), rect.bottom()))],
                    color(*line).stroke_width(stroke(*width)),
                ))
                .map_err(backend_error),
            DrawCommand::Line {
                from,
                to,
                color: line,
                width,
                dashed,
            } => {
                let style = color(*line).stroke_width(stroke(*width));
                if *dashed {
                    for piece in dashes(*from, *to) {
                        self.area
                            .draw(&PathElement::new(piece.to_vec(), style))
                            .map_err(backend_error)?;
                    }
                    Ok(())
                } else {
                    self.area
                        .draw(&PathElement::new(vec![coord(*from), coord(*to)], style))
                        .map_err(backend_error)
                }
            }
            DrawCommand::Polyline {
                points,
                color: line,
                width,
            } => self
                .area
                .draw(&PathElement::new(
                    points.iter().copied().map(coord).collect::<Vec<_>>(),
                    color(*line).stroke_width(stroke(*width)),
                ))
                .map_err(backend_error),
            DrawCommand::FillPolygon { points, color: fill } => self
                .area
                .draw(&Polygon::new(
                    points.iter().copied().map(coord).collect::<Vec<_>>(),
                    color(*fill).filled(),
                ))
                .map_err(backend_error),
            DrawCommand::Circle {
                center,
                radius,
                color: fill,
                filled,
            } => {
                let style = if *filled {
                    color(*fill).filled()
                } else {
                    color(*fill).stroke_width(1)
                };
                self.area
                    .draw(&Circle::new(coord(*center), radius.round().max(1.0) as i32, style))
                    .map_err(backend_error)
            }
            DrawCommand::Text {
                position,
                content,
                size,
                color: ink,
                anchor: text_anchor,
                bold,
            } => {
                let weight = if *bold { FontStyle::Bold } else { FontStyle::Normal };
                let font = FontDesc::new(FontFamily::SansSerif, *size, weight)
                    .color(&color(*ink))
                    .pos(anchor(*text_anchor));
                self.area
                    .draw(&Text::new(content.as_str(), coord(*position), font))
                    .map_err(backend_error)
            }
        }
    }
}

/// Paints a display list into a standalone SVG document.
pub fn render_svg(commands: &[DrawCommand], width: f64, height: f64) -> RenderResult<String> {
    let mut out = String::new();
    {
        let size = (width.round().max(1.0) as u32, height.round().max(1.0) as u32);
        let root = SVGBackend::with_string(&mut out, size).into_drawing_area();
        PlottersPainter::new(&root).paint_all(commands)?;
        root.present().map_err(backend_error)?;
    }
    Ok(out)
}

pub fn render_page_svg(document: &Document, page: &Page) -> RenderResult<String> {
    render_svg(
        &page.display_list(document.page_width),
        document.page_width,
        document.page_height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::draw::Rect;

    #[test]
    fn svg_contains_text_and_shapes() {
        let commands = vec![
            DrawCommand::FillRect {
                rect: Rect::new(0.0, 0.0, 100.0, 50.0),
                color: Rgba::WHITE,
            },
            DrawCommand::Line {
                from: Point::new(0.0, 10.0),
                to: Point::new(100.0, 10.0),
                color: Rgba::MUTED,
                width: 1.0,
                dashed: true,
            },
            DrawCommand::text(Point::new(50.0, 25.0), "No data", 12.0, Rgba::INK, TextAnchor::CENTER),
        ];
        let svg = render_svg(&commands, 100.0, 50.0).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("No data"));
        assert!(svg.contains("<rect"));
    }

    #[test]
    fn dashed_segments_cover_the_line() {
        let pieces = dashes(Point::new(0.0, 0.0), Point::new(20.0, 0.0));
        assert_eq!(pieces.len(), 3);
        assert_eq!(pieces[0], [(0, 0), (5, 0)]);
        assert_eq!(pieces[2], [(18, 0), (20, 0)]);
        assert!(dashes(Point::new(3.0, 3.0), Point::new(3.0, 3.0)).is_empty());
    }
}
