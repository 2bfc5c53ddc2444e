use crate::model::{Axis, BearingAnalysis};

/// Axis buttons of the analysis view. Axes without a spectrum are disabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisSelector {
    enabled: [bool; 3],
    selected: Option<Axis>,
}

impl AxisSelector {
    pub const PREFERRED: Axis = Axis::V;

    pub fn for_analysis(analysis: &BearingAnalysis) -> Self {
        let enabled = Axis::ALL.map(|axis| analysis.is_available(axis));
        let mut selector = Self {
            enabled,
            selected: None,
        };
        selector.selected = if selector.is_enabled(Self::PREFERRED) {
            Some(Self::PREFERRED)
        } else {
            Axis::ALL.into_iter().find(|axis| selector.is_enabled(*axis))
        };
        selector
    }

    pub fn is_enabled(&self, axis: Axis) -> bool {
        Axis::ALL
            .iter()
            .position(|candidate| *candidate == axis)
            .map(|idx| self.enabled[idx])
            .unwrap_or(false)
    }

    pub fn selected(&self) -> Option<Axis> {
        self.selected
    }

    /// Returns false and keeps the current selection for a disabled axis.
    pub fn select(&mut self, axis: Axis) -> bool {
        if !self.is_enabled(axis) || self.selected == Some(axis) {
            return false;
        }
        self.selected = Some(axis);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AxisChannel, ExternalStatus, SpectrumPoint};
    use std::collections::BTreeMap;

    fn analysis_with(available: &[Axis]) -> BearingAnalysis {
        let mut channels = BTreeMap::new();
        for axis in Axis::ALL {
            let channel = if available.contains(&axis) {
                AxisChannel {
                    available: true,
                    spectrum: vec![SpectrumPoint::new(25.0, 0.4)],
                    ..AxisChannel::default()
                }
            } else {
                AxisChannel::unavailable("missing")
            };
            channels.insert(axis, channel);
        }
        BearingAnalysis {
            bearing_id: "b-1".into(),
            machine_id: "m-1".into(),
            running_frequency: 25.0,
            sample_rate: 10_000.0,
            rpm: None,
            external_status: ExternalStatus::Normal,
            computed_zone: None,
            velocity_rms: None,
            diagnosis: None,
            channels,
        }
    }

    #[test]
    fn vertical_is_preferred_when_available() {
        let selector = AxisSelector::for_analysis(&analysis_with(&Axis::ALL));
        assert_eq!(selector.selected(), Some(Axis::V));
    }

    #[test]
    fn falls_back_to_first_available_axis() {
        let selector = AxisSelector::for_analysis(&analysis_with(&[Axis::A]));
        assert_eq!(selector.selected(), Some(Axis::A));
        assert!(!selector.is_enabled(Axis::H));
    }

    #[test]
    fn disabled_axes_cannot_be_selected() {
        let mut selector = AxisSelector::for_analysis(&analysis_with(&[Axis::V]));
        assert!(!selector.select(Axis::H));
        assert!(!selector.select(Axis::A));
        assert_eq!(selector.selected(), Some(Axis::V));
    }

    #[test]
    fn nothing_selected_without_spectra() {
        let selector = AxisSelector::for_analysis(&analysis_with(&[]));
        assert_eq!(selector.selected(), None);
    }
}
