// Copyright @yucwang 2023

use super::constants::{ Float, ONE_MINUS_EPSILON };

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiscretePDFError {
    #[error("discrete pdf weights must be finite and non-negative, got {0}")]
    InvalidWeight(Float),
    #[error("discrete pdf has no entries")]
    Empty,
    #[error("discrete pdf must be normalized before sampling")]
    NotNormalized,
}

/// Prefix-sum table over a set of non-negative weights.
///
/// Built with `reserve`/`append`, then frozen by `normalize`. Sampling before
/// normalization (or on an empty table) is reported as an error.
#[derive(Debug, Clone)]
pub struct DiscretePDF {
    cdf: Vec<Float>,
    sum: Float,
    normalization: Float,
    normalized: bool,
}

impl Default for DiscretePDF {
    fn default() -> Self {
        Self::new(0)
    }
}

impl DiscretePDF {
    pub fn new(n_entries: usize) -> Self {
        let mut cdf = Vec::with_capacity(n_entries + 1);
        cdf.push(0.0);
        Self { cdf, sum: 0.0, normalization: 0.0, normalized: false }
    }

    pub fn clear(&mut self) {
        self.cdf.clear();
        self.cdf.push(0.0);
        self.sum = 0.0;
        self.normalization = 0.0;
        self.normalized = false;
    }

    pub fn reserve(&mut self, n_entries: usize) {
        self.cdf.reserve(n_entries);
    }

    pub fn append(&mut self, weight: Float) -> Result<(), DiscretePDFError> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(DiscretePDFError::InvalidWeight(weight));
        }
        if self.normalized {
            for c in self.cdf.iter_mut() {
                *c *= self.sum;
            }
        }
        let last = self.cdf[self.cdf.len() - 1];
        self.cdf.push(last + weight);
        self.normalized = false;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.cdf.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Probability of entry `index`; relative to the total once normalized.
    pub fn pdf(&self, index: usize) -> Float {
        if index + 1 >= self.cdf.len() {
            return 0.0;
        }
        self.cdf[index + 1] - self.cdf[index]
    }

    pub fn sum(&self) -> Float {
        self.sum
    }

    pub fn normalization(&self) -> Float {
        self.normalization
    }

    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    /// Divides the prefix sums by the total weight and returns that total.
    pub fn normalize(&mut self) -> Result<Float, DiscretePDFError> {
        if self.is_empty() {
            return Err(DiscretePDFError::Empty);
        }
        let n = self.cdf.len();
        self.sum = self.cdf[n - 1];
        if self.sum > 0.0 {
            self.normalization = 1.0 / self.sum;
            for c in self.cdf.iter_mut().skip(1) {
                *c *= self.normalization;
            }
            self.cdf[n - 1] = 1.0;
            self.normalized = true;
        } else {
            self.normalization = 0.0;
        }
        Ok(self.sum)
    }

    fn check_sampleable(&self) -> Result<(), DiscretePDFError> {
        if self.is_empty() {
            Err(DiscretePDFError::Empty)
        } else if !self.normalized {
            Err(DiscretePDFError::NotNormalized)
        } else {
            Ok(())
        }
    }

    /// Index of the bucket containing `u`. Zero-weight entries are never returned.
    pub fn sample(&self, u: Float) -> Result<usize, DiscretePDFError> {
        self.check_sampleable()?;
        let upper = self.cdf.partition_point(|&c| c <= u);
        Ok(upper.saturating_sub(1).min(self.len() - 1))
    }

    /// Like `sample`, also returning the entry's probability and rescaling `u`
    /// to a fresh uniform variate within the chosen bucket.
    pub fn sample_reuse(&self, u: &mut Float) -> Result<(usize, Float), DiscretePDFError> {
        let index = self.sample(*u)?;
        let lo = self.cdf[index];
        let width = self.cdf[index + 1] - lo;
        *u = if width > 0.0 {
            ((*u - lo) / width).clamp(0.0, ONE_MINUS_EPSILON)
        } else {
            0.0
        };
        Ok((index, width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sampler::Sampler;
    use crate::samplers::independent::IndependentSampler;
    use approx::assert_abs_diff_eq;

    fn build(weights: &[Float]) -> DiscretePDF {
        let mut dpdf = DiscretePDF::new(weights.len());
        for w in weights {
            dpdf.append(*w).unwrap();
        }
        dpdf
    }

    #[test]
    fn test_normalize_returns_total() {
        let mut dpdf = build(&[1.0, 2.0, 3.0, 4.0]);
        assert_abs_diff_eq!(dpdf.normalize().unwrap(), 10.0, epsilon = 1e-6);
        assert!(dpdf.is_normalized());
        assert_abs_diff_eq!(dpdf.pdf(2), 0.3, epsilon = 1e-6);
        assert_abs_diff_eq!(dpdf.normalization(), 0.1, epsilon = 1e-6);
        assert_eq!(dpdf.pdf(4), 0.0);
    }

    #[test]
    fn test_sample_endpoints() {
        let mut dpdf = build(&[1.0, 2.0, 3.0, 4.0]);
        dpdf.normalize().unwrap();
        assert_eq!(dpdf.sample(0.0).unwrap(), 0);
        assert_eq!(dpdf.sample(ONE_MINUS_EPSILON).unwrap(), 3);
        assert_eq!(dpdf.sample(0.1).unwrap(), 1);
        assert_eq!(dpdf.sample(0.35).unwrap(), 2);
    }

    #[test]
    fn test_sample_frequencies() {
        let mut dpdf = build(&[1.0, 2.0, 3.0, 4.0]);
        dpdf.normalize().unwrap();

        let n = 100_000;
        let mut counts = [0usize; 4];
        let mut sampler = IndependentSampler::new(42);
        for _ in 0..n {
            counts[dpdf.sample(sampler.next_1d()).unwrap()] += 1;
        }
        for (i, count) in counts.iter().enumerate() {
            let expected = (i as Float + 1.0) / 10.0;
            assert_abs_diff_eq!(*count as Float / n as Float, expected, epsilon = 0.01);
        }
    }

    #[test]
    fn test_sample_reuse_rescales() {
        let mut dpdf = build(&[1.0, 0.0, 3.0]);
        dpdf.normalize().unwrap();

        let mut u = 0.625;
        let (index, pdf) = dpdf.sample_reuse(&mut u).unwrap();
        assert_eq!(index, 2);
        assert_abs_diff_eq!(pdf, 0.75, epsilon = 1e-6);
        assert_abs_diff_eq!(u, 0.5, epsilon = 1e-5);

        // The zero-weight bucket is skipped even on its boundary.
        let mut u = 0.25;
        let (index, _) = dpdf.sample_reuse(&mut u).unwrap();
        assert_eq!(index, 2);
        assert!(u >= 0.0 && u < 1.0);
    }

    #[test]
    fn test_errors() {
        let mut dpdf = DiscretePDF::default();
        assert_eq!(dpdf.sample(0.5), Err(DiscretePDFError::Empty));
        assert_eq!(dpdf.normalize(), Err(DiscretePDFError::Empty));
        assert_eq!(dpdf.append(-1.0), Err(DiscretePDFError::InvalidWeight(-1.0)));
        assert!(dpdf.append(Float::NAN).is_err());

        dpdf.append(1.0).unwrap();
        assert_eq!(dpdf.sample(0.5), Err(DiscretePDFError::NotNormalized));
        dpdf.normalize().unwrap();
        assert_eq!(dpdf.sample(0.5), Ok(0));

        dpdf.append(1.0).unwrap();
        assert_eq!(dpdf.sample(0.5), Err(DiscretePDFError::NotNormalized));
    }
}
