use crate::FeatureError;

/// Number of standard deviations covered on each side of a Gaussian kernel.
pub const TRUNCATE: f32 = 4.0;

/// Half-width of the sampled Gaussian kernel for `sigma`.
///
/// # Arguments
///
/// * `sigma` - The standard deviation of the gaussian.
///
/// # Returns
///
/// The radius, `TRUNCATE * sigma` rounded half up.
pub fn kernel_radius(sigma: f32) -> usize {
    (TRUNCATE * sigma + 0.5) as usize
}

/// Create a sampled gaussian kernel or one of its derivatives.
///
/// The order-0 kernel is normalized to sum to one over its support; the derivative kernels
/// are the analytic derivatives of that normalized kernel, so a second derivative applied to
/// a constant signal is close to zero.
///
/// # Arguments
///
/// * `sigma` - The sigma of the gaussian kernel.
/// * `order` - The derivative order, 0 to 2.
/// * `radius` - The half-width of the kernel.
///
/// # Returns
///
/// A vector of `2 * radius + 1` weights, index `radius` being the center.
pub fn gaussian_kernel_1d(sigma: f32, order: usize, radius: usize) -> Result<Vec<f32>, FeatureError> {
    if sigma.is_nan() || sigma <= 0.0 {
        return Err(FeatureError::invalid_parameter(
            "sigma",
            format!("must be positive, got {sigma}"),
        ));
    }
    if order > 2 {
        return Err(FeatureError::invalid_parameter(
            "order",
            format!("derivatives up to order 2 are supported, got {order}"),
        ));
    }

    let sigma2 = (sigma as f64) * (sigma as f64);
    let r = radius as isize;
    let phi = (-r..=r)
        .map(|x| (-0.5 * (x * x) as f64 / sigma2).exp())
        .collect::<Vec<_>>();
    let norm = phi.iter().sum::<f64>();

    let kernel = (-r..=r)
        .zip(phi)
        .map(|(x, p)| {
            let x = x as f64;
            let p = p / norm;
            let w = match order {
                0 => p,
                1 => -x / sigma2 * p,
                _ => (x * x / (sigma2 * sigma2) - 1.0 / sigma2) * p,
            };
            w as f32
        })
        .collect();

    Ok(kernel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_kernel_radius() {
        assert_eq!(kernel_radius(1.0), 4);
        assert_eq!(kernel_radius(1.6), 6);
        assert_eq!(kernel_radius(0.1), 0);
    }

    #[test]
    fn test_gaussian_kernel_1d() -> Result<(), FeatureError> {
        let kernel = gaussian_kernel_1d(1.0, 0, 4)?;

        let expected = [
            1.338_306_2e-4,
            4.431_861_6e-3,
            5.399_112_7e-2,
            2.419_714_5e-1,
            3.989_434_7e-1,
        ];

        for (i, &k) in expected.iter().enumerate() {
            assert_abs_diff_eq!(kernel[i], k, epsilon = 1e-6);
            assert_abs_diff_eq!(kernel[8 - i], k, epsilon = 1e-6);
        }
        assert_abs_diff_eq!(kernel.iter().sum::<f32>(), 1.0, epsilon = 1e-6);
        Ok(())
    }

    #[test]
    fn test_derivative_kernels() -> Result<(), FeatureError> {
        let first = gaussian_kernel_1d(2.0, 1, 8)?;
        assert_eq!(first[8], 0.0);
        for i in 0..8 {
            assert_abs_diff_eq!(first[i], -first[16 - i], epsilon = 1e-7);
        }
        // positive on the left so that convolution yields d/dx
        assert!(first[7] > 0.0);

        let second = gaussian_kernel_1d(2.0, 2, 8)?;
        assert!(second[8] < 0.0);
        assert_abs_diff_eq!(second.iter().sum::<f32>(), 0.0, epsilon = 1e-3);
        Ok(())
    }

    #[test]
    fn test_invalid_kernel() {
        assert!(gaussian_kernel_1d(0.0, 0, 3).is_err());
        assert!(gaussian_kernel_1d(1.0, 3, 3).is_err());
    }
}
