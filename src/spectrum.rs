//! Byte-magnitude spectrum analyser
//!
//! Turns fixed-size blocks of mono samples into unsigned byte magnitude
//! bins: Blackman window, radix-2 FFT, magnitudes smoothed by an
//! exponential time constant, then mapped from a dB range onto 0-255.
//! One block of `fft_size` samples yields `fft_size / 2` bins.

use crate::constants::{MAX_DECIBELS, MIN_DECIBELS};

/// Spectrum analyser with smoothing across successive blocks
pub struct SpectrumAnalyzer {
    fft_size: usize,
    /// `0.0..1.0`; the share of the previous magnitude kept per block
    smoothing: f32,
    /// Precomputed Blackman window
    window: Vec<f32>,
    /// Smoothed linear magnitudes, one per bin
    smoothed: Vec<f32>,
    re: Vec<f32>,
    im: Vec<f32>,
}

impl SpectrumAnalyzer {
    /// `fft_size` must be a power of two >= 2
    pub fn new(fft_size: usize, smoothing: f32) -> Self {
        debug_assert!(fft_size >= 2 && fft_size.is_power_of_two());
        Self {
            fft_size,
            smoothing,
            window: blackman_window(fft_size),
            smoothed: vec![0.0; fft_size / 2],
            re: vec![0.0; fft_size],
            im: vec![0.0; fft_size],
        }
    }

    /// Number of magnitude bins produced per block
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Analyse one block of `fft_size` mono samples into `out`
    /// (`bin_count` bytes). Reuses internal scratch; no allocation.
    pub fn byte_frequency_data(&mut self, samples: &[f32], out: &mut [u8]) {
        debug_assert_eq!(samples.len(), self.fft_size);
        debug_assert_eq!(out.len(), self.bin_count());

        for i in 0..self.fft_size {
            self.re[i] = samples[i] * self.window[i];
            self.im[i] = 0.0;
        }
        fft_in_place(&mut self.re, &mut self.im);

        let scale = 255.0 / (MAX_DECIBELS - MIN_DECIBELS);
        for k in 0..self.bin_count() {
            let magnitude =
                (self.re[k] * self.re[k] + self.im[k] * self.im[k]).sqrt() / self.fft_size as f32;
            let smoothed = self.smoothing * self.smoothed[k] + (1.0 - self.smoothing) * magnitude;
            self.smoothed[k] = smoothed;

            let db = 20.0 * smoothed.max(1e-20).log10();
            out[k] = ((db - MIN_DECIBELS) * scale).clamp(0.0, 255.0) as u8;
        }
    }

    /// Forget smoothed state, e.g. between capture sessions
    pub fn reset(&mut self) {
        self.smoothed.fill(0.0);
    }
}

/// Blackman window coefficients for a block of `n` samples
fn blackman_window(n: usize) -> Vec<f32> {
    use std::f32::consts::PI;
    (0..n)
        .map(|i| {
            let phase = 2.0 * PI * i as f32 / n as f32;
            0.42 - 0.5 * phase.cos() + 0.08 * (2.0 * phase).cos()
        })
        .collect()
}

/// In-place iterative radix-2 FFT; `re.len()` must be a power of two
fn fft_in_place(re: &mut [f32], im: &mut [f32]) {
    let n = re.len();
    debug_assert_eq!(n, im.len());
    debug_assert!(n.is_power_of_two());

    // Bit-reversal permutation
    let mut j = 0usize;
    for i in 1..n {
        let mut bit = n >> 1;
        while j & bit != 0 {
            j ^= bit;
            bit >>= 1;
        }
        j |= bit;
        if i < j {
            re.swap(i, j);
            im.swap(i, j);
        }
    }

    let mut len = 2;
    while len <= n {
        let angle = -2.0 * std::f32::consts::PI / len as f32;
        let (step_re, step_im) = (angle.cos(), angle.sin());
        for start in (0..n).step_by(len) {
            let mut w_re = 1.0f32;
            let mut w_im = 0.0f32;
            for k in 0..len / 2 {
                let a = start + k;
                let b = a + len / 2;
                let t_re = re[b] * w_re - im[b] * w_im;
                let t_im = re[b] * w_im + im[b] * w_re;
                re[b] = re[a] - t_re;
                im[b] = im[a] - t_im;
                re[a] += t_re;
                im[a] += t_im;
                let next_re = w_re * step_re - w_im * step_im;
                w_im = w_re * step_im + w_im * step_re;
                w_re = next_re;
            }
        }
        len <<= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fft_of_impulse_is_flat() {
        let mut re = vec![0.0f32; 8];
        let mut im = vec![0.0f32; 8];
        re[0] = 1.0;
        fft_in_place(&mut re, &mut im);
        for k in 0..8 {
            let magnitude = (re[k] * re[k] + im[k] * im[k]).sqrt();
            assert!((magnitude - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_fft_localizes_a_pure_tone() {
        let n = 64;
        let mut re: Vec<f32> = (0..n)
            .map(|i| (2.0 * std::f32::consts::PI * 4.0 * i as f32 / n as f32).cos())
            .collect();
        let mut im = vec![0.0f32; n];
        fft_in_place(&mut re, &mut im);
        let magnitudes: Vec<f32> = (0..n / 2)
            .map(|k| (re[k] * re[k] + im[k] * im[k]).sqrt())
            .collect();
        let peak = magnitudes
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(k, _)| k)
            .unwrap();
        assert_eq!(peak, 4);
        // cos at an exact bin: |X[4]| = n/2
        assert!((magnitudes[4] - n as f32 / 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_silence_reads_floor_bins() {
        let mut analyzer = SpectrumAnalyzer::new(256, 0.0);
        let samples = vec![0.0f32; 256];
        let mut bins = vec![0u8; 128];
        analyzer.byte_frequency_data(&samples, &mut bins);
        assert!(bins.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_tone_peaks_at_its_bin() {
        let n = 256;
        let mut analyzer = SpectrumAnalyzer::new(n, 0.0);
        // quiet tone so the peak bin stays inside the byte range
        let samples: Vec<f32> = (0..n)
            .map(|i| 0.01 * (2.0 * std::f32::consts::PI * 16.0 * i as f32 / n as f32).sin())
            .collect();
        let mut bins = vec![0u8; n / 2];
        analyzer.byte_frequency_data(&samples, &mut bins);

        let peak = bins
            .iter()
            .enumerate()
            .max_by_key(|&(_, &b)| b)
            .map(|(k, _)| k)
            .unwrap();
        assert_eq!(peak, 16);
        assert!(bins[16] > 0);
        // far away from the tone the spectrum sits at the floor
        assert_eq!(bins[100], 0);
    }

    #[test]
    fn test_smoothing_rises_gradually() {
        let n = 256;
        let mut analyzer = SpectrumAnalyzer::new(n, 0.8);
        let quiet = vec![0.01f32; n];
        let mut first = vec![0u8; n / 2];
        let mut second = vec![0u8; n / 2];
        analyzer.byte_frequency_data(&quiet, &mut first);
        analyzer.byte_frequency_data(&quiet, &mut second);
        // the DC bin keeps climbing toward the steady-state value
        assert!(second[0] > first[0]);
        assert!(first[0] > 0);
    }

    #[test]
    fn test_reset_forgets_history() {
        let n = 256;
        let mut analyzer = SpectrumAnalyzer::new(n, 0.8);
        let quiet = vec![0.01f32; n];
        let mut bins = vec![0u8; n / 2];
        analyzer.byte_frequency_data(&quiet, &mut bins);
        let first = bins[0];

        analyzer.reset();
        analyzer.byte_frequency_data(&quiet, &mut bins);
        // after a reset the first block reads like a fresh analyser
        assert_eq!(bins[0], first);
    }
}
