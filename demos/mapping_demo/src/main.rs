use argh::FromArgs;

use hexraster::mapping::{CameraGeometry, CameraType, ImageMapper, InMemoryGeometry, MapperConfig};

#[derive(FromArgs)]
/// Map a synthetic camera event onto a square raster image
struct Args {
    /// the camera type, e.g. FlashCam or ASTRICam
    #[argh(option, default = "String::from(\"FlashCam\")")]
    camera: String,

    /// the resampling strategy
    #[argh(option, short = 's', default = "String::from(\"bilinear_interpolation\")")]
    strategy: String,

    /// the number of pixel columns of the synthetic lattice
    #[argh(option, default = "40")]
    cols: usize,

    /// the number of pixel rows of the synthetic lattice
    #[argh(option, default = "40")]
    rows: usize,

    /// cells added on every side of the output image
    #[argh(option, default = "0")]
    padding: usize,

    /// the output image side length
    #[argh(option)]
    image_size: Option<usize>,

    /// suppress interpolated contributions anchored on virtual pixels
    #[argh(switch)]
    mask: bool,

    /// map peak times as a second channel
    #[argh(switch)]
    peak_times: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let camera: CameraType = args.camera.parse()?;

    // synthetic pixel positions with unit pitch
    let positions = (0..args.rows)
        .flat_map(|r| {
            (0..args.cols).map(move |c| {
                if camera.lattice().is_hex() {
                    [c as f64 + 0.5 * (r % 2) as f64, r as f64 * 0.866]
                } else {
                    [c as f64, r as f64]
                }
            })
        })
        .collect::<Vec<_>>();
    let provider = InMemoryGeometry::new().with_geometry(CameraGeometry::new(camera, positions, 0.0));

    let mut config = MapperConfig::default()
        .with_strategy(camera, args.strategy)
        .with_padding(camera, args.padding)
        .with_mask_interpolation(args.mask)
        .with_peak_times(args.peak_times);
    if let Some(size) = args.image_size {
        config = config.with_image_size(camera, size);
    }

    let mapper = ImageMapper::new(&[camera], &provider, &config)?;
    let table = mapper.mapping_table(camera)?;
    let shape = mapper.image_shape(camera)?;
    let num_pixels = mapper.num_pixels(camera)?;

    println!("camera: {camera} with {num_pixels} pixels");
    println!("strategy: {}", mapper.config(camera)?.strategy);
    println!(
        "mapping table: {} x {} with {} non-zero weights",
        table.num_rows(),
        table.num_cols(),
        table.nnz()
    );
    println!("image: {} with {} channels", shape.size, shape.channels);

    // a ramp event with constant peak times
    let charges = (0..num_pixels).map(|i| i as f32 / num_pixels as f32);
    let total = if shape.channels == 2 {
        let pixels = charges.map(|q| [q, 10.0]).collect::<Vec<_>>();
        let image = mapper.map_image(&pixels, camera)?;
        let [charge, peak_time] = <[_; 2]>::try_from(image.split_channels()?)
            .map_err(|_| "expected two channels")?;
        log::info!(
            "peak time channel sum: {}",
            peak_time.as_slice().iter().sum::<f32>()
        );
        charge.as_slice().iter().sum::<f32>()
    } else {
        let pixels = charges.map(|q| [q]).collect::<Vec<_>>();
        let image = mapper.map_image(&pixels, camera)?;
        image.as_slice().iter().sum::<f32>()
    };

    let expected = (0..num_pixels).map(|i| i as f32 / num_pixels as f32).sum::<f32>();
    log::info!("total charge: {total:.3}, expected about {expected:.3}");
    println!("total charge: {total:.3} (camera: {expected:.3})");

    Ok(())
}
