use crate::model::SpectrumPoint;

pub struct StatsHelper;

impl StatsHelper {
    /// Largest finite value, or 0 for an empty or all-negative sequence.
    pub fn max_value<I: IntoIterator<Item = f64>>(values: I) -> f64 {
        values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(0.0, f64::max)
    }

    pub fn max_amplitude(spectrum: &[SpectrumPoint]) -> f64 {
        Self::max_value(spectrum.iter().map(|p| p.amplitude))
    }

    pub fn max_frequency(spectrum: &[SpectrumPoint]) -> f64 {
        Self::max_value(spectrum.iter().map(|p| p.frequency))
    }

    /// Square root of the summed squares, the overall velocity level of a band.
    pub fn root_sum_square(values: &[f64]) -> f64 {
        values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Index of the sample closest in frequency; the first one wins on ties.
    pub fn nearest_index(spectrum: &[SpectrumPoint], frequency: f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, point) in spectrum.iter().enumerate() {
            let distance = (point.frequency - frequency).abs();
            match best {
                Some((_, current)) if current <= distance => {}
                _ => best = Some((idx, distance)),
            }
        }
        best.map(|(idx, _)| idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_of_empty_sequence_is_zero() {
        assert_eq!(StatsHelper::max_value(Vec::new()), 0.0);
        assert_eq!(StatsHelper::max_value(vec![f64::NAN, -2.0]), 0.0);
    }

    #[test]
    fn root_sum_square_of_pythagorean_pair() {
        assert_eq!(StatsHelper::root_sum_square(&[3.0, 4.0]), 5.0);
    }

    #[test]
    fn nearest_index_prefers_first_on_ties() {
        let spectrum = vec![
            SpectrumPoint::new(10.0, 0.1),
            SpectrumPoint::new(20.0, 0.2),
            SpectrumPoint::new(30.0, 0.3),
        ];
        assert_eq!(StatsHelper::nearest_index(&spectrum, 15.0), Some(0));
        assert_eq!(StatsHelper::nearest_index(&spectrum, 29.0), Some(2));
        assert_eq!(StatsHelper::nearest_index(&[], 5.0), None);
    }
}
