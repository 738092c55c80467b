//! Training-time noise augmentation
//!
//! Adds i.i.d. Gaussian noise to every feature value. Only the training
//! feature stage applies it; evaluation and inference extraction never do.

use ndarray::Array2;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::error::PipelineError;

/// Add `N(0, std^2)` noise to every element
///
/// A non-positive `std` leaves the features untouched.
pub fn add_gaussian_noise<R: Rng + ?Sized>(
    features: &mut Array2<f32>,
    std: f32,
    rng: &mut R,
) -> Result<(), PipelineError> {
    if std <= 0.0 {
        return Ok(());
    }

    let normal = Normal::new(0.0f32, std)
        .map_err(|e| PipelineError::InvalidInput(format!("Invalid noise std {}: {}", std, e)))?;
    features.mapv_inplace(|x| x + normal.sample(rng));

    log::debug!("Applied Gaussian noise (std={}) to {} values", std, features.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_zero_std_is_noop() {
        let mut features = Array2::<f32>::ones((10, 17));
        let mut rng = StdRng::seed_from_u64(7);
        add_gaussian_noise(&mut features, 0.0, &mut rng).unwrap();
        assert!(features.iter().all(|&x| x == 1.0));
    }

    #[test]
    fn test_noise_statistics() {
        let mut features = Array2::<f32>::zeros((2000, 17));
        let mut rng = StdRng::seed_from_u64(42);
        add_gaussian_noise(&mut features, 0.1, &mut rng).unwrap();
        let n = features.len() as f32;
        let mean = features.sum() / n;
        let std = (features.iter().map(|x| x * x).sum::<f32>() / n).sqrt();
        assert!(mean.abs() < 0.01, "mean {}", mean);
        assert!((std - 0.1).abs() < 0.01, "std {}", std);
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = Array2::<f32>::zeros((5, 17));
        let mut b = Array2::<f32>::zeros((5, 17));
        add_gaussian_noise(&mut a, 0.2, &mut StdRng::seed_from_u64(1)).unwrap();
        add_gaussian_noise(&mut b, 0.2, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(a, b);
    }
}
