use bearingcore::chart::{
    probe_at, render_chart, ChartInput, ChartLayout, DrawCommand, HAlign, ProbeTracker, Rgba, SurfaceGeometry,
    TextAnchor, VAlign, LOGICAL_HEIGHT, LOGICAL_WIDTH,
};
use bearingcore::model::{Axis, AxisChannel};
use bearingcore::prelude::{PaintTarget, RenderResult};
use iced::{
    alignment, font, mouse,
    widget::canvas::{self, Frame, Geometry, LineDash, Path, Stroke},
    widget::text,
    Color, Font, Pixels, Point, Rectangle, Renderer, Size, Theme,
};

const DASH_PATTERN: &[f32] = &[5.0, 4.0];

fn color(rgba: Rgba) -> Color {
    Color::from_rgba8(rgba.r, rgba.g, rgba.b, rgba.a as f32)
}

/// Replays a chart display list onto an iced frame, stretching the
/// 900×400 logical surface over the widget bounds.
struct FramePainter<'a> {
    frame: &'a mut Frame,
    scale_x: f32,
    scale_y: f32,
}

impl<'a> FramePainter<'a> {
    fn new(frame: &'a mut Frame, bounds: Size) -> Self {
        Self {
            frame,
            scale_x: bounds.width / LOGICAL_WIDTH as f32,
            scale_y: bounds.height / LOGICAL_HEIGHT as f32,
        }
    }

    fn point(&self, point: bearingcore::chart::Point) -> Point {
        Point::new(point.x as f32 * self.scale_x, point.y as f32 * self.scale_y)
    }

    fn polyline(&self, points: &[bearingcore::chart::Point], close: bool) -> Path {
        Path::new(|builder| {
            for (index, point) in points.iter().enumerate() {
                if index == 0 {
                    builder.move_to(self.point(*point));
                } else {
                    builder.line_to(self.point(*point));
                }
            }
            if close {
                builder.close();
            }
        })
    }

    fn text(&mut self, position: Point, content: &str, size: f64, ink: Rgba, anchor: TextAnchor, bold: bool) {
        let align_x = match anchor.horizontal {
            HAlign::Left => text::Alignment::Left,
            HAlign::Center => text::Alignment::Center,
            HAlign::Right => text::Alignment::Right,
        };
        let align_y = match anchor.vertical {
            VAlign::Top => alignment::Vertical::Top,
            VAlign::Middle => alignment::Vertical::Center,
            VAlign::Bottom => alignment::Vertical::Bottom,
        };
        let font = if bold {
            Font {
                weight: font::Weight::Bold,
                ..Font::DEFAULT
            }
        } else {
            Font::DEFAULT
        };
        self.frame.fill_text(canvas::Text {
            content: content.to_string(),
            position,
            color: color(ink),
            size: Pixels(size as f32 * self.scale_x.min(self.scale_y)),
            font,
            align_x,
            align_y,
            ..canvas::Text::default()
        });
    }
}

impl<'a> PaintTarget for FramePainter<'a> {
    fn paint(&mut self, command: &DrawCommand) -> RenderResult<()> {
        match command {
            DrawCommand::FillRect { rect, color: fill } => {
                let origin = self.point(bearingcore::chart::Point::new(rect.x, rect.y));
                let size = Size::new(rect.width as f32 * self.scale_x, rect.height as f32 * self.scale_y);
                self.frame.fill_rectangle(origin, size, color(*fill));
            }
            DrawCommand::StrokeRect { rect, color: line, width } => {
                let origin = self.point(bearingcore::chart::Point::new(rect.x, rect.y));
                let size = Size::new(rect.width as f32 * self.scale_x, rect.height as f32 * self.scale_y);
                self.frame.stroke(
                    &Path::rectangle(origin, size),
                    Stroke::default().with_color(color(*line)).with_width(*width as f32),
                );
            }
            DrawCommand::Line {
                from,
                to,
                color: line,
                width,
                dashed,
            } => {
                let path = Path::line(self.point(*from), self.point(*to));
                let mut stroke = Stroke::default().with_color(color(*line)).with_width(*width as f32);
                if *dashed {
                    stroke.line_dash = LineDash {
                        segments: DASH_PATTERN,
                        offset: 0,
                    };
                }
                self.frame.stroke(&path, stroke);
            }
            DrawCommand::Polyline { points, color: line, width } => {
                let path = self.polyline(points, false);
                self.frame
                    .stroke(&path, Stroke::default().with_color(color(*line)).with_width(*width as f32));
            }
            DrawCommand::FillPolygon { points, color: fill } => {
                let path = self.polyline(points, true);
                self.frame.fill(&path, color(*fill));
            }
            DrawCommand::Circle {
                center,
                radius,
                color: fill,
                filled,
            } => {
                let path = Path::circle(self.point(*center), *radius as f32);
                if *filled {
                    self.frame.fill(&path, color(*fill));
                } else {
                    self.frame.stroke(&path, Stroke::default().with_color(color(*fill)));
                }
            }
            DrawCommand::Text {
                position,
                content,
                size,
                color: ink,
                anchor,
                bold,
            } => {
                let position = self.point(*position);
                self.text(position, content, *size, *ink, *anchor, *bold);
            }
        }
        Ok(())
    }
}

fn surface_geometry(bounds: Rectangle) -> SurfaceGeometry {
    SurfaceGeometry {
        origin_x: bounds.x as f64,
        origin_y: bounds.y as f64,
        displayed_width: bounds.width as f64,
        displayed_height: bounds.height as f64,
        logical_width: LOGICAL_WIDTH,
        logical_height: LOGICAL_HEIGHT,
    }
}

/// Interactive spectrum chart for one bearing axis.
pub struct SpectrumChart<'a> {
    pub axis: Axis,
    pub channel: &'a AxisChannel,
    pub running_frequency: f64,
}

impl<'a> SpectrumChart<'a> {
    fn input(&self) -> ChartInput<'a> {
        ChartInput {
            axis: self.axis,
            channel: self.channel,
            running_frequency: self.running_frequency,
        }
    }
}

impl<'a, Message> canvas::Program<Message> for SpectrumChart<'a> {
    type State = ProbeTracker;

    fn update(
        &self,
        state: &mut Self::State,
        event: &canvas::Event,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Option<canvas::Action<Message>> {
        let changed = match event {
            canvas::Event::Mouse(mouse::Event::CursorMoved { position }) if self.channel.has_spectrum() => {
                let layout = ChartLayout::interactive(&self.channel.spectrum, self.running_frequency);
                state.pointer_moved(&layout, &surface_geometry(bounds), position.x as f64, position.y as f64)
            }
            canvas::Event::Mouse(mouse::Event::CursorMoved { .. }) | canvas::Event::Mouse(mouse::Event::CursorLeft) => {
                state.pointer_left()
            }
            _ => false,
        };
        changed.then(canvas::Action::request_redraw)
    }

    fn draw(
        &self,
        state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        let layout = ChartLayout::interactive(&self.channel.spectrum, self.running_frequency);
        // readout always comes from the spectrum being drawn
        let probe = state
            .current()
            .and_then(|probe| probe_at(&layout, probe.pixel_x, probe.pixel_y));
        let commands = render_chart(&self.input(), &layout, probe.as_ref());

        let mut painter = FramePainter::new(&mut frame, bounds.size());
        if let Err(err) = painter.paint_all(&commands) {
            log::warn!("chart paint failed: {}", err);
        }
        vec![frame.into_geometry()]
    }

    fn mouse_interaction(&self, state: &Self::State, _bounds: Rectangle, _cursor: mouse::Cursor) -> mouse::Interaction {
        if state.current().is_some() {
            mouse::Interaction::Crosshair
        } else {
            mouse::Interaction::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widget_bounds_map_onto_logical_surface() {
        let geometry = surface_geometry(Rectangle::new(Point::new(20.0, 10.0), Size::new(450.0, 200.0)));
        let (x, y) = geometry.to_surface(245.0, 110.0).unwrap();
        assert!((x - 450.0).abs() < 1e-9);
        assert!((y - 200.0).abs() < 1e-9);
    }

    #[test]
    fn colors_keep_alpha() {
        let tinted = color(Rgba::rgb(255, 0, 0).with_alpha(0.5));
        assert_eq!(tinted.r, 1.0);
        assert!((tinted.a - 0.5).abs() < 1e-6);
    }
}
