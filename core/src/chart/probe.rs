use crate::chart::layout::ChartLayout;
use crate::math::stats::StatsHelper;

/// Where the rendering surface sits on screen and how large it is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceGeometry {
    pub origin_x: f64,
    pub origin_y: f64,
    pub displayed_width: f64,
    pub displayed_height: f64,
    pub logical_width: f64,
    pub logical_height: f64,
}

impl SurfaceGeometry {
    /// Client coordinates to logical surface coordinates.
    pub fn to_surface(&self, client_x: f64, client_y: f64) -> Option<(f64, f64)> {
        if self.displayed_width <= 0.0 || self.displayed_height <= 0.0 {
            return None;
        }
        let scale_x = self.logical_width / self.displayed_width;
        let scale_y = self.logical_height / self.displayed_height;
        Some((
            (client_x - self.origin_x) * scale_x,
            (client_y - self.origin_y) * scale_y,
        ))
    }
}

/// Pointer readout. Recreated on every move, discarded on leave.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeState {
    pub pixel_x: f64,
    pub pixel_y: f64,
    /// Raw pointer frequency, not snapped.
    pub frequency: f64,
    /// Amplitude of the nearest sample by frequency.
    pub amplitude: f64,
    pub within_chart_bounds: bool,
}

/// Resolves a probe for a pointer at logical surface coordinates.
pub fn probe_at(layout: &ChartLayout<'_>, x: f64, y: f64) -> Option<ProbeState> {
    if !layout.plot_rect().contains(x, y) {
        return None;
    }
    let frequency = layout.frequency_at(x);
    let nearest = StatsHelper::nearest_index(layout.spectrum, frequency)?;
    Some(ProbeState {
        pixel_x: x,
        pixel_y: y,
        frequency,
        amplitude: layout.spectrum[nearest].amplitude,
        within_chart_bounds: true,
    })
}

/// Holds the current probe between pointer events; the owner re-renders
/// whenever an update reports a change.
#[derive(Debug, Clone, Default)]
pub struct ProbeTracker {
    current: Option<ProbeState>,
}

impl ProbeTracker {
    pub fn current(&self) -> Option<&ProbeState> {
        self.current.as_ref()
    }

    pub fn pointer_moved(
        &mut self,
        layout: &ChartLayout<'_>,
        geometry: &SurfaceGeometry,
        client_x: f64,
        client_y: f64,
    ) -> bool {
        let next = geometry
            .to_surface(client_x, client_y)
            .and_then(|(x, y)| probe_at(layout, x, y));
        self.replace(next)
    }

    pub fn pointer_left(&mut self) -> bool {
        self.replace(None)
    }

    fn replace(&mut self, next: Option<ProbeState>) -> bool {
        if self.current == next {
            return false;
        }
        self.current = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::layout::{LOGICAL_HEIGHT, LOGICAL_WIDTH};
    use crate::model::SpectrumPoint;

    fn spectrum() -> Vec<SpectrumPoint> {
        (0..20)
            .map(|i| SpectrumPoint::new(i as f64 * 5.0, if i == 5 { 0.42 } else { 0.02 }))
            .collect()
    }

    fn half_size_geometry() -> SurfaceGeometry {
        SurfaceGeometry {
            origin_x: 100.0,
            origin_y: 50.0,
            displayed_width: LOGICAL_WIDTH / 2.0,
            displayed_height: LOGICAL_HEIGHT / 2.0,
            logical_width: LOGICAL_WIDTH,
            logical_height: LOGICAL_HEIGHT,
        }
    }

    #[test]
    fn client_coordinates_scale_to_logical_surface() {
        let (x, y) = half_size_geometry().to_surface(150.0, 75.0).unwrap();
        assert_eq!((x, y), (100.0, 50.0));
    }

    #[test]
    fn probe_snaps_amplitude_but_keeps_pointer_frequency() {
        let spectrum = spectrum();
        let layout = ChartLayout::interactive(&spectrum, 25.0);
        let x = layout.x_for(26.0);
        let state = probe_at(&layout, x, 200.0).unwrap();
        assert!((state.frequency - 26.0).abs() < 1e-9);
        assert_eq!(state.amplitude, 0.42);
        assert!(state.within_chart_bounds);
    }

    #[test]
    fn pointer_outside_plot_yields_no_probe() {
        let spectrum = spectrum();
        let layout = ChartLayout::interactive(&spectrum, 25.0);
        assert!(probe_at(&layout, 10.0, 200.0).is_none());
        assert!(probe_at(&layout, 400.0, 390.0).is_none());
    }

    #[test]
    fn tracker_reports_changes_only() {
        let spectrum = spectrum();
        let layout = ChartLayout::interactive(&spectrum, 25.0);
        let geometry = half_size_geometry();
        let mut tracker = ProbeTracker::default();

        assert!(tracker.pointer_moved(&layout, &geometry, 300.0, 150.0));
        assert!(tracker.current().is_some());
        assert!(!tracker.pointer_moved(&layout, &geometry, 300.0, 150.0));
        assert!(tracker.pointer_left());
        assert!(tracker.current().is_none());
        assert!(!tracker.pointer_left());
    }

    #[test]
    fn empty_spectrum_never_probes() {
        let layout = ChartLayout::interactive(&[], 25.0);
        assert!(probe_at(&layout, 400.0, 200.0).is_none());
    }
}
