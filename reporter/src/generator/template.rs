/// Gaussian line centered on `center` with standard deviation `width` (Hz).
pub fn peak_shape(frequency: f64, center: f64, amplitude: f64, width: f64) -> f64 {
    if width <= 0.0 {
        return if (frequency - center).abs() < f64::EPSILON { amplitude } else { 0.0 };
    }
    let offset = (frequency - center) / width;
    amplitude * (-0.5 * offset * offset).exp()
}

/// Sum of harmonic lines at `k * running_frequency` for each amplitude.
pub fn harmonic_envelope(frequency: f64, running_frequency: f64, amplitudes: &[f64], width: f64) -> f64 {
    amplitudes
        .iter()
        .enumerate()
        .map(|(index, amplitude)| {
            peak_shape(frequency, running_frequency * (index + 1) as f64, *amplitude, width)
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peak_is_centered() {
        assert!((peak_shape(50.0, 50.0, 2.0, 1.5) - 2.0).abs() < 1e-12);
        assert!(peak_shape(56.0, 50.0, 2.0, 1.5) < 0.01);
    }

    #[test]
    fn envelope_places_harmonics() {
        let amps = [1.0, 0.5];
        assert!((harmonic_envelope(25.0, 25.0, &amps, 0.5) - 1.0).abs() < 1e-6);
        assert!((harmonic_envelope(50.0, 25.0, &amps, 0.5) - 0.5).abs() < 1e-6);
    }
}
