//! # Fast Fourier Transform (FFT) Module
//!
//! Radix-2 Cooley-Tukey transforms over power-of-two-length buffers.
//! The forward transform is unscaled; the inverse divides by the length,
//! so `ifft(&fft(x)?)? ≈ x`.
//!
//! ## Features
//! - Decimation-in-frequency forward transform with bit-reversed reordering
//! - Decimation-in-time inverse transform
//! - Reusable in-place bit-reversal permutation

use std::f64::consts::PI;

use crate::error::{HarmoniaError, Result};

/// A complex spectrum stored as two equal-length component vectors.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Spectrum {
    /// Real parts, indexed by frequency bin.
    pub re: Vec<f32>,
    /// Imaginary parts, indexed by frequency bin.
    pub im: Vec<f32>,
}

impl Spectrum {
    /// Builds a spectrum with a zero imaginary part.
    pub fn from_real(re: Vec<f32>) -> Self {
        let im = vec![0.0; re.len()];
        Self { re, im }
    }

    /// Number of bins.
    pub fn len(&self) -> usize {
        self.re.len()
    }

    pub fn is_empty(&self) -> bool {
        self.re.is_empty()
    }

    /// Power spectrum `re² + im²` per bin.
    pub fn power(&self) -> Vec<f32> {
        self.re
            .iter()
            .zip(&self.im)
            .map(|(re, im)| re * re + im * im)
            .collect()
    }
}

fn check_len(len: usize) -> Result<()> {
    if len.is_power_of_two() {
        Ok(())
    } else {
        Err(HarmoniaError::InvalidInput { len })
    }
}

/// `exp(i * theta)` as `(cos, sin)`.
fn exp_i(theta: f64) -> (f32, f32) {
    (theta.cos() as f32, theta.sin() as f32)
}

/// Performs a forward FFT on a real signal.
///
/// # Errors
/// * `InvalidInput` if the signal length is not a power of two
pub fn fft(samples: &[f32]) -> Result<Spectrum> {
    let len = samples.len();
    check_len(len)?;

    let mut re = samples.to_vec();
    let mut im = vec![0.0f32; len];

    let mut n = len;
    while n > 1 {
        let half = n >> 1;
        for offset in (0..len).step_by(n) {
            for k in 0..half {
                let (w_re, w_im) = exp_i(-2.0 * PI * k as f64 / n as f64);
                let l = offset + k;
                let r = l + half;
                let (left_re, left_im) = (re[l], im[l]);
                let (right_re, right_im) = (re[r], im[r]);
                let diff_re = left_re - right_re;
                let diff_im = left_im - right_im;
                re[l] = left_re + right_re;
                im[l] = left_im + right_im;
                re[r] = diff_re * w_re - diff_im * w_im;
                im[r] = diff_re * w_im + diff_im * w_re;
            }
        }
        n >>= 1;
    }

    bit_reverse_permute(&mut re);
    bit_reverse_permute(&mut im);
    Ok(Spectrum { re, im })
}

/// Performs an inverse FFT and returns the real part of the signal.
///
/// # Errors
/// * `InvalidInput` if the components differ in length or the length is
///   not a power of two
pub fn ifft(spectrum: &Spectrum) -> Result<Vec<f32>> {
    let len = spectrum.re.len();
    if spectrum.im.len() != len {
        return Err(HarmoniaError::InvalidInput {
            len: spectrum.im.len(),
        });
    }
    check_len(len)?;

    let mut re = spectrum.re.clone();
    let mut im = spectrum.im.clone();
    bit_reverse_permute(&mut re);
    bit_reverse_permute(&mut im);

    let mut n = 2;
    while n <= len {
        let half = n >> 1;
        for offset in (0..len).step_by(n) {
            for k in 0..half {
                let (w_re, w_im) = exp_i(2.0 * PI * k as f64 / n as f64);
                let l = offset + k;
                let r = l + half;
                let right_re = re[r] * w_re - im[r] * w_im;
                let right_im = re[r] * w_im + im[r] * w_re;
                let (left_re, left_im) = (re[l], im[l]);
                re[l] = left_re + right_re;
                im[l] = left_im + right_im;
                re[r] = left_re - right_re;
                im[r] = left_im - right_im;
            }
        }
        n <<= 1;
    }

    let scale = len as f32;
    for sample in re.iter_mut() {
        *sample /= scale;
    }
    Ok(re)
}

/// Reorders a power-of-two-length buffer into bit-reversed index order.
///
/// Index `b` swaps with the integer formed by reversing the low
/// `log2(len)` bits of `b`. Applying it twice restores the original order.
/// Buffers that are not a power of two are left untouched.
pub fn bit_reverse_permute<T>(buffer: &mut [T]) {
    let len = buffer.len();
    if len < 2 || !len.is_power_of_two() {
        return;
    }
    let bits = len.trailing_zeros();
    for i in 0..len {
        let r = i.reverse_bits() >> (usize::BITS - bits);
        if i < r {
            buffer.swap(i, r);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn test_signal(len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| {
                let t = i as f32;
                (0.3 * t).sin() + 0.5 * (1.7 * t + 0.2).cos() - 0.1 * (i % 5) as f32
            })
            .collect()
    }

    #[test]
    fn bit_reverse_matches_table() {
        let mut data: Vec<usize> = (0..8).collect();
        bit_reverse_permute(&mut data);
        assert_eq!(data, vec![0, 4, 2, 6, 1, 5, 3, 7]);
    }

    #[test]
    fn bit_reverse_twice_is_identity() {
        for len in [1, 2, 4, 16, 256] {
            let original: Vec<usize> = (0..len).collect();
            let mut data = original.clone();
            bit_reverse_permute(&mut data);
            bit_reverse_permute(&mut data);
            assert_eq!(data, original);
        }
    }

    #[test]
    fn rejects_non_power_of_two() {
        assert_eq!(
            fft(&[0.0; 6]),
            Err(HarmoniaError::InvalidInput { len: 6 })
        );
        assert!(fft(&[]).is_err());
        let bad = Spectrum {
            re: vec![0.0; 4],
            im: vec![0.0; 3],
        };
        assert!(ifft(&bad).is_err());
        assert!(ifft(&Spectrum::from_real(vec![0.0; 12])).is_err());
    }

    #[test]
    fn impulse_has_flat_spectrum() {
        let mut impulse = vec![0.0; 16];
        impulse[0] = 1.0;
        let spectrum = fft(&impulse).unwrap();
        for (re, im) in spectrum.re.iter().zip(&spectrum.im) {
            assert_relative_eq!(*re, 1.0, epsilon = 1e-6);
            assert_relative_eq!(*im, 0.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn single_bin_cosine() {
        let len = 64;
        let signal: Vec<f32> = (0..len)
            .map(|i| (2.0 * std::f32::consts::PI * 5.0 * i as f32 / len as f32).cos())
            .collect();
        let magnitudes: Vec<f32> = fft(&signal)
            .unwrap()
            .power()
            .into_iter()
            .map(f32::sqrt)
            .collect();
        assert_relative_eq!(magnitudes[5], len as f32 / 2.0, epsilon = 1e-3);
        assert_relative_eq!(magnitudes[len - 5], len as f32 / 2.0, epsilon = 1e-3);
        assert!(magnitudes[3] < 1e-3);
    }

    #[test]
    fn round_trip_restores_signal() {
        for len in [1, 2, 8, 128, 4096] {
            let signal = test_signal(len);
            let restored = ifft(&fft(&signal).unwrap()).unwrap();
            assert_eq!(restored.len(), len);
            for (a, b) in signal.iter().zip(&restored) {
                assert_relative_eq!(a, b, epsilon = 1e-4, max_relative = 1e-4);
            }
        }
    }
}
