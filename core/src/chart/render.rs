use crate::chart::draw::{DrawCommand, Point, Rect, Rgba, TextAnchor};
use crate::chart::layout::ChartLayout;
use crate::chart::probe::ProbeState;
use crate::model::{Axis, AxisChannel};

pub const AMPLITUDE_TICKS: usize = 6;
pub const FREQUENCY_TICKS: usize = 11;
/// Half-width of the band drawn around the running frequency.
pub const TOLERANCE_FRACTION: f64 = 0.05;

const PEAK_COLOR: Rgba = Rgba::rgb(0xef, 0x44, 0x44);

pub fn axis_color(axis: Axis) -> Rgba {
    match axis {
        Axis::H => Rgba::rgb(0x3b, 0x82, 0xf6),
        Axis::V => Rgba::rgb(0x10, 0xb9, 0x81),
        Axis::A => Rgba::rgb(0xf5, 0x9e, 0x0b),
    }
}

pub fn chart_title(axis: Axis) -> String {
    format!("{}-Axis FFT Spectrum", axis.code())
}

pub fn peak_label(frequency: f64, amplitude: f64) -> String {
    format!("1× Peak: {:.1} Hz, {:.3} mm/s", frequency, amplitude)
}

/// What one chart shows.
#[derive(Debug, Clone, Copy)]
pub struct ChartInput<'a> {
    pub axis: Axis,
    pub channel: &'a AxisChannel,
    pub running_frequency: f64,
}

impl<'a> ChartInput<'a> {
    pub fn color(&self) -> Rgba {
        axis_color(self.axis)
    }
}

/// Font sizes follow the surface height so report panels stay legible.
fn font_scale(layout: &ChartLayout<'_>) -> f64 {
    (layout.height / 400.0).clamp(0.7, 1.0)
}

/// Builds the display list for one spectrum chart.
///
/// `layout` must have been built from `input.channel.spectrum`; a probe is
/// only drawn when it lies inside the plot rectangle.
pub fn render_chart(
    input: &ChartInput<'_>,
    layout: &ChartLayout<'_>,
    probe: Option<&ProbeState>,
) -> Vec<DrawCommand> {
    let mut commands = vec![DrawCommand::FillRect {
        rect: layout.surface_rect(),
        color: Rgba::WHITE,
    }];

    if !input.channel.has_spectrum() {
        push_no_data(&mut commands, layout, input.channel.error.as_deref());
        return commands;
    }

    let color = input.color();
    let plot = layout.plot_rect();
    let scale = font_scale(layout);

    push_tolerance_band(&mut commands, layout, input.running_frequency, color);
    push_harmonics(&mut commands, layout, input.channel, scale);
    push_grid(&mut commands, layout, scale);
    commands.push(DrawCommand::StrokeRect {
        rect: plot,
        color: Rgba::MUTED,
        width: 1.0,
    });

    let trace: Vec<Point> = layout
        .spectrum
        .iter()
        .map(|p| layout.to_pixel(p.frequency, p.amplitude))
        .collect();
    commands.push(DrawCommand::Polyline {
        points: trace.clone(),
        color,
        width: 1.5,
    });
    if let (Some(first), Some(last)) = (trace.first().copied(), trace.last().copied()) {
        let mut area = trace;
        area.push(Point::new(last.x, plot.bottom()));
        area.push(Point::new(first.x, plot.bottom()));
        commands.push(DrawCommand::FillPolygon {
            points: area,
            color: color.with_alpha(0.15),
        });
    }

    if let Some(peak) = input.channel.peak_at_1x {
        let marker = layout.to_pixel(peak.frequency, peak.amplitude);
        commands.push(DrawCommand::Circle {
            center: marker,
            radius: 5.0,
            color: PEAK_COLOR,
            filled: true,
        });
        let label_x = marker.x.clamp(plot.x + 4.0, plot.right() - 4.0);
        let anchor = if label_x > plot.center().x {
            TextAnchor::BOTTOM_CENTER
        } else {
            TextAnchor::BOTTOM_LEFT
        };
        commands.push(DrawCommand::bold_text(
            Point::new(label_x, (marker.y - 8.0).max(plot.y + 12.0)),
            peak_label(peak.frequency, peak.amplitude),
            11.0 * scale,
            PEAK_COLOR,
            anchor,
        ));
    }

    commands.push(DrawCommand::text(
        Point::new(plot.center().x, layout.height - 6.0),
        "Frequency (Hz)",
        12.0 * scale,
        Rgba::INK,
        TextAnchor::BOTTOM_CENTER,
    ));
    commands.push(DrawCommand::text(
        Point::new(plot.x, plot.y - 4.0),
        "Velocity (mm/s)",
        11.0 * scale,
        Rgba::INK,
        TextAnchor::BOTTOM_LEFT,
    ));
    commands.push(DrawCommand::bold_text(
        Point::new(layout.width / 2.0, 4.0),
        chart_title(input.axis),
        14.0 * scale,
        Rgba::INK,
        TextAnchor::TOP_CENTER,
    ));

    if let Some(state) = probe.filter(|p| p.within_chart_bounds) {
        push_probe(&mut commands, layout, state, scale);
    }

    commands
}

fn push_no_data(commands: &mut Vec<DrawCommand>, layout: &ChartLayout<'_>, error: Option<&str>) {
    let center = layout.surface_rect().center();
    commands.push(DrawCommand::bold_text(
        center,
        "No data",
        16.0 * font_scale(layout),
        Rgba::MUTED,
        TextAnchor::CENTER,
    ));
    if let Some(message) = error.filter(|m| !m.trim().is_empty()) {
        commands.push(DrawCommand::text(
            Point::new(center.x, center.y + 22.0),
            message,
            11.0 * font_scale(layout),
            Rgba::MUTED,
            TextAnchor::CENTER,
        ));
    }
}

fn push_tolerance_band(commands: &mut Vec<DrawCommand>, layout: &ChartLayout<'_>, running_frequency: f64, color: Rgba) {
    if !(running_frequency.is_finite() && running_frequency > 0.0) {
        return;
    }
    let plot = layout.plot_rect();
    let start = layout.x_for(running_frequency * (1.0 - TOLERANCE_FRACTION)).max(plot.x);
    let end = layout.x_for(running_frequency * (1.0 + TOLERANCE_FRACTION)).min(plot.right());
    if end > start {
        commands.push(DrawCommand::FillRect {
            rect: Rect::new(start, plot.y, end - start, plot.height),
            color: color.with_alpha(0.12),
        });
    }
}

fn push_harmonics(commands: &mut Vec<DrawCommand>, layout: &ChartLayout<'_>, channel: &AxisChannel, scale: f64) {
    let plot = layout.plot_rect();
    for mark in channel.harmonics.iter().filter(|m| m.order > 1 && m.is_significant) {
        let frequency = if mark.detected_frequency > 0.0 {
            mark.detected_frequency
        } else {
            mark.expected_frequency
        };
        let x = layout.x_for(frequency);
        if x < plot.x || x > plot.right() {
            continue;
        }
        commands.push(DrawCommand::Line {
            from: Point::new(x, plot.y),
            to: Point::new(x, plot.bottom()),
            color: Rgba::MUTED.with_alpha(0.7),
            width: 1.0,
            dashed: true,
        });
        commands.push(DrawCommand::text(
            Point::new(x, plot.y + 2.0),
            mark.label(),
            10.0 * scale,
            Rgba::MUTED,
            TextAnchor::TOP_CENTER,
        ));
    }
}

fn push_grid(commands: &mut Vec<DrawCommand>, layout: &ChartLayout<'_>, scale: f64) {
    let plot = layout.plot_rect();
    for tick in 0..AMPLITUDE_TICKS {
        let amplitude = layout.max_amplitude * tick as f64 / (AMPLITUDE_TICKS - 1) as f64;
        let y = layout.y_for(amplitude);
        commands.push(DrawCommand::line(
            Point::new(plot.x, y),
            Point::new(plot.right(), y),
            Rgba::GRID,
            1.0,
        ));
        commands.push(DrawCommand::text(
            Point::new(plot.x - 6.0, y),
            format!("{:.2}", amplitude),
            10.0 * scale,
            Rgba::MUTED,
            TextAnchor::RIGHT,
        ));
    }
    for tick in 0..FREQUENCY_TICKS {
        let frequency = layout.max_frequency * tick as f64 / (FREQUENCY_TICKS - 1) as f64;
        let x = layout.x_for(frequency);
        commands.push(DrawCommand::line(
            Point::new(x, plot.y),
            Point::new(x, plot.bottom()),
            Rgba::GRID,
            1.0,
        ));
        commands.push(DrawCommand::text(
            Point::new(x, plot.bottom() + 4.0),
            format!("{:.0}", frequency),
            10.0 * scale,
            Rgba::MUTED,
            TextAnchor::TOP_CENTER,
        ));
    }
}

fn push_probe(commands: &mut Vec<DrawCommand>, layout: &ChartLayout<'_>, state: &ProbeState, scale: f64) {
    let plot = layout.plot_rect();
    let guide = Rgba::INK.with_alpha(0.5);
    commands.push(DrawCommand::Line {
        from: Point::new(state.pixel_x, plot.y),
        to: Point::new(state.pixel_x, plot.bottom()),
        color: guide,
        width: 1.0,
        dashed: true,
    });
    commands.push(DrawCommand::Line {
        from: Point::new(plot.x, state.pixel_y),
        to: Point::new(plot.right(), state.pixel_y),
        color: guide,
        width: 1.0,
        dashed: true,
    });
    commands.push(DrawCommand::Circle {
        center: layout.to_pixel(state.frequency, state.amplitude),
        radius: 3.5,
        color: Rgba::INK,
        filled: false,
    });

    let box_width = 130.0 * scale;
    let box_height = 40.0 * scale;
    let mut origin = Point::new(state.pixel_x + 10.0, state.pixel_y - box_height - 10.0);
    if origin.x + box_width > plot.right() {
        origin.x = state.pixel_x - box_width - 10.0;
    }
    if origin.y < plot.y {
        origin.y = state.pixel_y + 10.0;
    }
    let tooltip = Rect::new(origin.x, origin.y, box_width, box_height);
    commands.push(DrawCommand::FillRect {
        rect: tooltip,
        color: Rgba::INK.with_alpha(0.85),
    });
    commands.push(DrawCommand::text(
        Point::new(tooltip.x + 8.0, tooltip.y + box_height * 0.3),
        format!("{:.1} Hz", state.frequency),
        11.0 * scale,
        Rgba::WHITE,
        TextAnchor::LEFT,
    ));
    commands.push(DrawCommand::text(
        Point::new(tooltip.x + 8.0, tooltip.y + box_height * 0.72),
        format!("{:.3} mm/s", state.amplitude),
        11.0 * scale,
        Rgba::WHITE,
        TextAnchor::LEFT,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HarmonicMark, SpectrumPoint};

    fn vertical_channel() -> AxisChannel {
        AxisChannel {
            available: true,
            spectrum: (0..20)
                .map(|i| SpectrumPoint::new(i as f64 * 5.0, if i == 5 { 0.42 } else { 0.02 }))
                .collect(),
            harmonics: vec![
                HarmonicMark {
                    order: 1,
                    expected_frequency: 25.0,
                    detected_frequency: 25.0,
                    amplitude: 0.42,
                    is_significant: true,
                },
                HarmonicMark {
                    order: 2,
                    expected_frequency: 50.0,
                    detected_frequency: 50.0,
                    amplitude: 0.08,
                    is_significant: true,
                },
                HarmonicMark {
                    order: 3,
                    expected_frequency: 75.0,
                    detected_frequency: 75.0,
                    amplitude: 0.01,
                    is_significant: false,
                },
            ],
            peak_at_1x: Some(SpectrumPoint::new(25.0, 0.42)),
            error: None,
        }
    }

    fn texts(commands: &[DrawCommand]) -> Vec<&str> {
        commands.iter().filter_map(DrawCommand::text_content).collect()
    }

    #[test]
    fn chart_carries_peak_label_and_title() {
        let channel = vertical_channel();
        let layout = ChartLayout::interactive(&channel.spectrum, 25.0);
        let input = ChartInput {
            axis: Axis::V,
            channel: &channel,
            running_frequency: 25.0,
        };
        let commands = render_chart(&input, &layout, None);
        let labels = texts(&commands);
        assert!(labels.contains(&"1× Peak: 25.0 Hz, 0.420 mm/s"));
        assert!(labels.contains(&"V-Axis FFT Spectrum"));
        assert!(labels.contains(&"2×"));
        assert!(!labels.contains(&"1×"));
        assert!(!labels.contains(&"3×"));
    }

    #[test]
    fn draw_order_is_fixed() {
        let channel = vertical_channel();
        let layout = ChartLayout::interactive(&channel.spectrum, 25.0);
        let input = ChartInput {
            axis: Axis::V,
            channel: &channel,
            running_frequency: 25.0,
        };
        let commands = render_chart(&input, &layout, None);
        let position = |pred: &dyn Fn(&DrawCommand) -> bool| commands.iter().position(|c| pred(c)).unwrap();
        let band = position(&|c| matches!(c, DrawCommand::FillRect { color, .. } if color.a < 1.0));
        let dashed = position(&|c| matches!(c, DrawCommand::Line { dashed: true, .. }));
        let border = position(&|c| matches!(c, DrawCommand::StrokeRect { .. }));
        let trace = position(&|c| matches!(c, DrawCommand::Polyline { .. }));
        let area = position(&|c| matches!(c, DrawCommand::FillPolygon { .. }));
        let peak = position(&|c| matches!(c, DrawCommand::Circle { .. }));
        assert!(matches!(commands[0], DrawCommand::FillRect { .. }));
        assert!(band < dashed && dashed < border && border < trace);
        assert!(trace < area && area < peak);
    }

    #[test]
    fn grid_labels_use_fixed_tick_counts() {
        let channel = vertical_channel();
        let layout = ChartLayout::interactive(&channel.spectrum, 25.0);
        let input = ChartInput {
            axis: Axis::V,
            channel: &channel,
            running_frequency: 25.0,
        };
        let commands = render_chart(&input, &layout, None);
        let labels = texts(&commands);
        assert!(labels.contains(&"0.00"));
        assert!(labels.contains(&"300"));
        let grid_lines = commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { color, dashed: false, .. } if *color == Rgba::GRID))
            .count();
        assert_eq!(grid_lines, AMPLITUDE_TICKS + FREQUENCY_TICKS);
    }

    #[test]
    fn unavailable_channel_renders_no_data_with_error() {
        let channel = AxisChannel::unavailable("No FFT data for H-Axis");
        let layout = ChartLayout::interactive(&channel.spectrum, 25.0);
        let input = ChartInput {
            axis: Axis::H,
            channel: &channel,
            running_frequency: 25.0,
        };
        let commands = render_chart(&input, &layout, None);
        assert_eq!(commands.len(), 3);
        assert_eq!(texts(&commands), vec!["No data", "No FFT data for H-Axis"]);
    }

    #[test]
    fn probe_adds_crosshair_and_tooltip() {
        let channel = vertical_channel();
        let layout = ChartLayout::interactive(&channel.spectrum, 25.0);
        let input = ChartInput {
            axis: Axis::V,
            channel: &channel,
            running_frequency: 25.0,
        };
        let probe = ProbeState {
            pixel_x: layout.x_for(26.0),
            pixel_y: 200.0,
            frequency: 26.0,
            amplitude: 0.42,
            within_chart_bounds: true,
        };
        let plain = render_chart(&input, &layout, None);
        let probed = render_chart(&input, &layout, Some(&probe));
        assert!(probed.len() > plain.len());
        assert!(texts(&probed).contains(&"26.0 Hz"));
        assert!(texts(&probed).contains(&"0.420 mm/s"));
    }

    #[test]
    fn axis_colors_match_palette() {
        assert_eq!(axis_color(Axis::H).hex(), "#3b82f6");
        assert_eq!(axis_color(Axis::V).hex(), "#10b981");
        assert_eq!(axis_color(Axis::A).hex(), "#f59e0b");
    }
}
