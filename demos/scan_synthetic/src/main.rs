use argh::FromArgs;
use rand::{rngs::StdRng, Rng, SeedableRng};

use blobscan::image::ImageVolume;
use blobscan::tensor::{NdArray, NdIndexIter};
use blobscan::{Algorithm, Dimensionality, Method, MethodSelector};

#[derive(FromArgs)]
/// Detect blobs in a synthetic image stack and print the points layer as JSON
struct Args {
    /// detection method, e.g. "Laplacian of Gaussian"
    #[argh(option, short = 'm', default = "String::from(\"Difference of Gaussian\")")]
    method: String,

    /// number of trailing axes analysed at once, 2 or 3
    #[argh(option, short = 'd', default = "2")]
    dimensionality: usize,

    /// comma separated shape of the stack
    #[argh(option, short = 's', default = "String::from(\"2,32,32\")")]
    shape: String,

    /// detector parameters as a JSON object, missing fields keep their defaults
    #[argh(option, short = 'p')]
    params: Option<String>,

    /// number of bright squares per slice
    #[argh(option, default = "3")]
    num_spots: usize,

    /// seed of the square placement
    #[argh(option, default = "0")]
    seed: u64,
}

/// Place `num_spots` bright 3-wide hypercubes in every trailing slice.
fn synthesize(shape: &[usize], feature_dim: usize, num_spots: usize, seed: u64) -> NdArray<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut stack = NdArray::<u8>::zeros(shape);
    let (leading, trailing) = shape.split_at(shape.len() - feature_dim);

    for prefix in NdIndexIter::new(leading) {
        for _ in 0..num_spots {
            let center = trailing
                .iter()
                .map(|&n| rng.random_range(1..n.max(3) - 1))
                .collect::<Vec<_>>();
            for offset in NdIndexIter::new(&vec![3; feature_dim]) {
                let mut index = prefix.clone();
                index.extend(center.iter().zip(&offset).map(|(c, o)| c + o - 1));
                if let Some(v) = stack.get_mut(&index) {
                    *v = u8::MAX;
                }
            }
        }
    }
    stack
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let shape = args
        .shape
        .split(',')
        .map(|s| s.trim().parse::<usize>())
        .collect::<Result<Vec<_>, _>>()?;

    let dimensionality = match args.dimensionality {
        2 => Dimensionality::TwoD,
        3 => Dimensionality::ThreeD,
        d => return Err(format!("dimensionality must be 2 or 3, got {d}").into()),
    };
    if dimensionality.ndim() > shape.len() {
        return Err(format!(
            "a {}-dimensional stack cannot be scanned in {} dimensions",
            shape.len(),
            dimensionality.ndim()
        )
        .into());
    }

    let mut selector = MethodSelector::new();
    selector.select(&args.method)?;
    selector.set_dimensionality(dimensionality)?;

    if let Some(params) = &args.params {
        let algorithm = match selector.method() {
            Method::DifferenceOfGaussian => {
                Algorithm::DifferenceOfGaussian(serde_json::from_str(params)?)
            }
            Method::DeterminantOfHessian => {
                Algorithm::DeterminantOfHessian(serde_json::from_str(params)?)
            }
            Method::LaplacianOfGaussian => {
                Algorithm::LaplacianOfGaussian(serde_json::from_str(params)?)
            }
        };
        *selector.algorithm_mut() = algorithm;
    }
    log::info!("running {:?}", selector.algorithm());

    let data = synthesize(&shape, dimensionality.ndim(), args.num_spots, args.seed);
    let image = ImageVolume::new("synthetic", data);
    let layer = selector.invoke(&image)?;

    log::info!("found {} blobs", layer.state.features.sigma.len());
    println!("{}", serde_json::to_string_pretty(&layer)?);

    Ok(())
}
