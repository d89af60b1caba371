use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

use blobscan_imgproc::features::{
    blob_dog, blob_doh, blob_log, DeterminantOfHessian, DifferenceOfGaussian, LaplacianOfGaussian,
};
use blobscan_tensor::NdArray;

fn random_spots(size: usize, num_spots: usize, seed: u64) -> NdArray<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut src = NdArray::<f32>::zeros(&[size, size]);
    for _ in 0..num_spots {
        let r = rng.random_range(1..size - 1);
        let c = rng.random_range(1..size - 1);
        for dr in 0..3 {
            for dc in 0..3 {
                if let Some(v) = src.get_mut(&[r + dr - 1, c + dc - 1]) {
                    *v = 1.0;
                }
            }
        }
    }
    src
}

fn bench_blob(c: &mut Criterion) {
    let mut group = c.benchmark_group("Blob Detection");

    for size in [32, 64, 128].iter() {
        let src = random_spots(*size, *size / 8, 42);
        let parameter_string = format!("{size}x{size}");

        group.throughput(criterion::Throughput::Elements((*size * *size) as u64));

        let dog = DifferenceOfGaussian {
            max_sigma: 8.0,
            ..Default::default()
        };
        group.bench_with_input(
            BenchmarkId::new("blob_dog", &parameter_string),
            &src,
            |b, i| b.iter(|| black_box(blob_dog(&i.view(), &dog))),
        );

        let log = LaplacianOfGaussian {
            max_sigma: 8.0,
            num_sigma: 5,
            ..Default::default()
        };
        group.bench_with_input(
            BenchmarkId::new("blob_log", &parameter_string),
            &src,
            |b, i| b.iter(|| black_box(blob_log(&i.view(), &log))),
        );

        let doh = DeterminantOfHessian {
            max_sigma: 8.0,
            num_sigma: 5,
            ..Default::default()
        };
        group.bench_with_input(
            BenchmarkId::new("blob_doh", &parameter_string),
            &src,
            |b, i| b.iter(|| black_box(blob_doh(&i.view(), &doh))),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_blob);
criterion_main!(benches);
