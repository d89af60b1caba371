use std::f64::consts::PI;

use super::Blob;

fn disk_overlap(d: f64, r1: f64, r2: f64) -> f64 {
    let ratio1 = ((d * d + r1 * r1 - r2 * r2) / (2.0 * d * r1)).clamp(-1.0, 1.0);
    let ratio2 = ((d * d + r2 * r2 - r1 * r1) / (2.0 * d * r2)).clamp(-1.0, 1.0);
    let a = -d + r2 + r1;
    let b = d - r2 + r1;
    let c = d + r2 - r1;
    let e = d + r2 + r1;
    let area = r1 * r1 * ratio1.acos() + r2 * r2 * ratio2.acos() - 0.5 * (a * b * c * e).abs().sqrt();
    area / (PI * r1.min(r2).powi(2))
}

fn sphere_overlap(d: f64, r1: f64, r2: f64) -> f64 {
    let vol = PI / (12.0 * d)
        * (r1 + r2 - d).powi(2)
        * (d * d + 2.0 * d * (r1 + r2) - 3.0 * (r1 * r1 + r2 * r2) + 6.0 * r1 * r2);
    vol / (4.0 / 3.0 * PI * r1.min(r2).powi(3))
}

fn interval_overlap(d: f64, r1: f64, r2: f64) -> f64 {
    (r1 + r2 - d) / (2.0 * r1.min(r2))
}

/// Fraction of the smaller blob covered by the larger one.
///
/// Each blob is treated as a disk (2D), a ball (3D) or an interval (1D) of radius
/// `sigma * sqrt(ndim)`. Blobs of other dimensionalities never overlap.
///
/// # Returns
///
/// A value in `[0, 1]`.
pub fn blob_overlap(blob1: &Blob, blob2: &Blob) -> f64 {
    let ndim = blob1.coords.len();
    if ndim == 0 || ndim > 3 || blob2.coords.len() != ndim {
        return 0.0;
    }
    if blob1.sigma == 0.0 && blob2.sigma == 0.0 {
        return 0.0;
    }

    // rescale space so that the larger blob has unit radius
    let (larger, r1, r2) = if blob1.sigma > blob2.sigma {
        (blob1, 1.0, blob2.sigma / blob1.sigma)
    } else {
        (blob2, blob1.sigma / blob2.sigma, 1.0)
    };
    let scale = larger.radius();
    let d = blob1
        .coords
        .iter()
        .zip(&blob2.coords)
        .map(|(a, b)| ((b - a) / scale).powi(2))
        .sum::<f64>()
        .sqrt();

    if d > r1 + r2 {
        return 0.0;
    }
    if d <= (r1 - r2).abs() {
        return 1.0;
    }

    match ndim {
        1 => interval_overlap(d, r1, r2),
        2 => disk_overlap(d, r1, r2),
        _ => sphere_overlap(d, r1, r2),
    }
}

/// Remove blobs that overlap a larger blob by more than `overlap`.
///
/// Pairs are visited in `(i, j)`, `i < j` order and only pairs closer than
/// `2 * max_sigma * sqrt(ndim)` are considered. Of an overlapping pair the blob with the
/// smaller sigma is dropped; on equal sigmas the earlier one is dropped. Surviving blobs keep
/// their input order.
pub fn prune_blobs(blobs: Vec<Blob>, overlap: f64) -> Vec<Blob> {
    if blobs.len() < 2 {
        return blobs;
    }

    let reach = 2.0 * blobs.iter().map(Blob::radius).fold(0.0f64, f64::max);

    let mut sigmas = blobs.iter().map(|b| b.sigma).collect::<Vec<_>>();
    for i in 0..blobs.len() {
        for j in (i + 1)..blobs.len() {
            let dist = blobs[i]
                .coords
                .iter()
                .zip(&blobs[j].coords)
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f64>()
                .sqrt();
            if dist > reach {
                continue;
            }
            let blob1 = Blob::new(blobs[i].coords.clone(), sigmas[i]);
            let blob2 = Blob::new(blobs[j].coords.clone(), sigmas[j]);
            if blob_overlap(&blob1, &blob2) > overlap {
                if sigmas[i] > sigmas[j] {
                    sigmas[j] = 0.0;
                } else {
                    sigmas[i] = 0.0;
                }
            }
        }
    }

    blobs
        .into_iter()
        .zip(sigmas)
        .filter(|(_, sigma)| *sigma > 0.0)
        .map(|(blob, _)| blob)
        .collect()
}
