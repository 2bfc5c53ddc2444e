use crate::chart::draw::{Point, Rect};
use crate::math::stats::StatsHelper;
use crate::model::SpectrumPoint;

/// Logical resolution of interactive chart surfaces.
pub const LOGICAL_WIDTH: f64 = 900.0;
pub const LOGICAL_HEIGHT: f64 = 400.0;

/// Headroom above the tallest peak.
pub const AMPLITUDE_HEADROOM: f64 = 1.05;
pub const MIN_AMPLITUDE_SCALE: f64 = 0.1;
/// Harmonics up to 12× the running frequency stay on screen.
pub const HARMONIC_SPAN: f64 = 12.0;
pub const MIN_FREQUENCY_SCALE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margins {
    pub const INTERACTIVE: Margins = Margins {
        top: 40.0,
        right: 30.0,
        bottom: 50.0,
        left: 70.0,
    };

    /// Tighter margins for report panels.
    pub const PANEL: Margins = Margins {
        top: 28.0,
        right: 16.0,
        bottom: 36.0,
        left: 52.0,
    };
}

/// Coordinate mapping for one render pass. Built from the spectrum it maps
/// and dropped with the render; the probe borrows the same value.
#[derive(Debug, Clone, Copy)]
pub struct ChartLayout<'a> {
    pub width: f64,
    pub height: f64,
    pub margins: Margins,
    pub plot_width: f64,
    pub plot_height: f64,
    pub max_frequency: f64,
    pub max_amplitude: f64,
    pub spectrum: &'a [SpectrumPoint],
}

impl<'a> ChartLayout<'a> {
    pub fn new(
        width: f64,
        height: f64,
        margins: Margins,
        spectrum: &'a [SpectrumPoint],
        running_frequency: f64,
    ) -> Self {
        let observed_amplitude = StatsHelper::max_amplitude(spectrum);
        let max_amplitude = if observed_amplitude > 0.0 {
            observed_amplitude * AMPLITUDE_HEADROOM
        } else {
            MIN_AMPLITUDE_SCALE
        };
        let harmonic_reach = if running_frequency.is_finite() {
            running_frequency.max(0.0) * HARMONIC_SPAN
        } else {
            0.0
        };
        let max_frequency = StatsHelper::max_frequency(spectrum)
            .max(harmonic_reach)
            .max(MIN_FREQUENCY_SCALE);

        Self {
            width,
            height,
            margins,
            plot_width: (width - margins.left - margins.right).max(1.0),
            plot_height: (height - margins.top - margins.bottom).max(1.0),
            max_frequency,
            max_amplitude,
            spectrum,
        }
    }

    /// Layout for the fixed 900×400 interactive surface.
    pub fn interactive(spectrum: &'a [SpectrumPoint], running_frequency: f64) -> Self {
        Self::new(
            LOGICAL_WIDTH,
            LOGICAL_HEIGHT,
            Margins::INTERACTIVE,
            spectrum,
            running_frequency,
        )
    }

    pub fn plot_rect(&self) -> Rect {
        Rect::new(
            self.margins.left,
            self.margins.top,
            self.plot_width,
            self.plot_height,
        )
    }

    pub fn surface_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    pub fn x_for(&self, frequency: f64) -> f64 {
        self.margins.left + frequency / self.max_frequency * self.plot_width
    }

    pub fn y_for(&self, amplitude: f64) -> f64 {
        self.margins.top + self.plot_height - amplitude / self.max_amplitude * self.plot_height
    }

    pub fn to_pixel(&self, frequency: f64, amplitude: f64) -> Point {
        Point::new(self.x_for(frequency), self.y_for(amplitude))
    }

    pub fn frequency_at(&self, x: f64) -> f64 {
        (x - self.margins.left) / self.plot_width * self.max_frequency
    }

    pub fn amplitude_at(&self, y: f64) -> f64 {
        (self.margins.top + self.plot_height - y) / self.plot_height * self.max_amplitude
    }

    /// Inverse of [`ChartLayout::to_pixel`].
    pub fn to_data(&self, x: f64, y: f64) -> (f64, f64) {
        (self.frequency_at(x), self.amplitude_at(y))
    }
}
