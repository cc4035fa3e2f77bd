use std::collections::{HashMap, HashSet};

use hexraster_image::{Image, ImageSize};
use rayon::prelude::*;

use crate::camera::{CameraGeometry, CameraType, GeometryProvider};
use crate::config::{ImageShape, MapperConfig, ResamplingConfig};
use crate::error::{MappingError, ShapeError};
use crate::grid::GridBuilder;
use crate::postprocess::TablePostProcessor;
use crate::resolver::WeightResolver;
use crate::table::MappingTable;

/// The cached mapping of one camera type.
#[derive(Clone, Debug)]
struct CameraMapping {
    config: ResamplingConfig,
    shape: ImageShape,
    num_pixels: usize,
    table: MappingTable,
}

/// Maps camera pixel values onto square raster images.
///
/// The mapping tables of all camera types are built once at construction; mapping an event is a
/// sparse product per channel afterwards.
///
/// # Examples
///
/// ```
/// use hexraster_mapping::{CameraGeometry, CameraType, ImageMapper, InMemoryGeometry, MapperConfig};
///
/// // a small square lattice camera
/// let positions = (0..16).map(|i| [(i % 4) as f64, (i / 4) as f64]).collect();
/// let provider = InMemoryGeometry::new()
///     .with_geometry(CameraGeometry::new(CameraType::AstriCam, positions, 0.0));
///
/// let config = MapperConfig::default()
///     .with_strategy(CameraType::AstriCam, "bilinear_interpolation")
///     .with_image_size(CameraType::AstriCam, 8);
/// let mapper = ImageMapper::new(&[CameraType::AstriCam], &provider, &config).unwrap();
///
/// let image = mapper.map_image(&[[1.0f32]; 16], CameraType::AstriCam).unwrap();
/// assert_eq!(image.width(), 8);
/// ```
#[derive(Clone, Debug)]
pub struct ImageMapper {
    camera_types: Vec<CameraType>,
    mappings: HashMap<CameraType, CameraMapping>,
}

impl ImageMapper {
    /// Build the mapping tables of the given camera types.
    ///
    /// An empty list selects all camera types. The configurations of all camera types are
    /// resolved before any geometry is fetched or any table is built; tables are built in
    /// parallel.
    ///
    /// # Arguments
    ///
    /// * `camera_types` - The camera types to build tables for.
    /// * `provider` - The source of the pixel geometries.
    /// * `config` - The mapper configuration.
    ///
    /// # Errors
    ///
    /// Fails on the first configuration, geometry or construction error; no mapper is returned.
    pub fn new(
        camera_types: &[CameraType],
        provider: &impl GeometryProvider,
        config: &MapperConfig,
    ) -> Result<Self, MappingError> {
        let mut selected = if camera_types.is_empty() {
            CameraType::ALL.to_vec()
        } else {
            camera_types.to_vec()
        };
        let mut seen = HashSet::new();
        selected.retain(|camera| seen.insert(*camera));

        let configs = selected
            .iter()
            .map(|&camera| config.resolve(camera))
            .collect::<Result<Vec<_>, _>>()?;

        let geometries = selected
            .iter()
            .map(|&camera| provider.camera_geometry(camera))
            .collect::<Result<Vec<_>, _>>()?;

        let mappings = geometries
            .par_iter()
            .zip(configs.par_iter())
            .map(|(geometry, &config)| {
                let (table, size) = build_mapping_table(geometry, config)?;
                let mapping = CameraMapping {
                    config,
                    shape: ImageShape {
                        size,
                        channels: config.channels,
                    },
                    num_pixels: geometry.num_pixels(),
                    table,
                };
                Ok((geometry.camera(), mapping))
            })
            .collect::<Result<HashMap<_, _>, MappingError>>()?;

        Ok(Self {
            camera_types: selected,
            mappings,
        })
    }

    fn mapping(&self, camera: CameraType) -> Result<&CameraMapping, MappingError> {
        self.mappings
            .get(&camera)
            .ok_or(MappingError::UnknownCamera(camera))
    }

    /// Map the pixel values of one event onto a raster image.
    ///
    /// `pixels` holds the channels of every pixel in pixel index order. The channels are
    /// interleaved in the output image.
    ///
    /// # Errors
    ///
    /// Fails if the camera type was not built, or the number of pixels or channels does not
    /// match its configuration.
    pub fn map_image<const C: usize>(
        &self,
        pixels: &[[f32; C]],
        camera: CameraType,
    ) -> Result<Image<f32, C>, MappingError> {
        let mapping = self.mapping(camera)?;

        if C != mapping.shape.channels {
            return Err(ShapeError::Channels {
                expected: mapping.shape.channels,
                actual: C,
            }
            .into());
        }
        if pixels.len() != mapping.num_pixels {
            return Err(ShapeError::PixelCount {
                expected: mapping.num_pixels,
                actual: pixels.len(),
            }
            .into());
        }

        let mut image = Image::<f32, C>::from_size_val(mapping.shape.size, 0.0)?;
        let data = image.as_slice_mut();

        // row 0 is the null row and never carries signal
        for (row, values) in pixels.iter().enumerate() {
            for (col, weight) in mapping.table.row(row + 1) {
                let pixel = &mut data[col * C..(col + 1) * C];
                pixel
                    .iter_mut()
                    .zip(values.iter())
                    .for_each(|(out, v)| *out += v * weight);
            }
        }

        Ok(image)
    }

    /// The camera types the mapper was built for.
    pub fn camera_types(&self) -> &[CameraType] {
        &self.camera_types
    }

    /// The shape of the images of a camera type.
    pub fn image_shape(&self, camera: CameraType) -> Result<ImageShape, MappingError> {
        Ok(self.mapping(camera)?.shape)
    }

    /// The mapping table of a camera type.
    pub fn mapping_table(&self, camera: CameraType) -> Result<&MappingTable, MappingError> {
        Ok(&self.mapping(camera)?.table)
    }

    /// The number of pixels of a camera type.
    pub fn num_pixels(&self, camera: CameraType) -> Result<usize, MappingError> {
        Ok(self.mapping(camera)?.num_pixels)
    }

    /// The resolved configuration of a camera type.
    pub fn config(&self, camera: CameraType) -> Result<ResamplingConfig, MappingError> {
        Ok(self.mapping(camera)?.config)
    }
}

/// Build the mapping table of one camera geometry.
///
/// Returns the table and the final raster size.
pub fn build_mapping_table(
    geometry: &CameraGeometry,
    config: ResamplingConfig,
) -> Result<(MappingTable, ImageSize), MappingError> {
    let camera = geometry.camera();
    let lattice = camera.lattice();
    log::debug!(
        "building {} table for {} with {} pixels",
        config.strategy,
        camera,
        geometry.num_pixels()
    );

    let (source, target) = GridBuilder::new(geometry, config).build()?;
    let assignment = WeightResolver::new(&source, &target, lattice, config.strategy).resolve()?;

    let mut postprocessor = TablePostProcessor::new(config, lattice, source.num_pixels());
    if camera.rotation_corrected() {
        postprocessor = postprocessor.with_rotation(geometry.rotation_deg());
    }

    postprocessor.finalize(&assignment, source.len())
}

#[cfg(test)]
mod tests {
    use super::ImageMapper;
    use crate::camera::{CameraGeometry, CameraType, InMemoryGeometry};
    use crate::config::MapperConfig;
    use crate::error::{ConfigError, MappingError, ShapeError};

    fn square_provider() -> InMemoryGeometry {
        let positions = (0..16).map(|i| [(i % 4) as f64, (i / 4) as f64]).collect();
        InMemoryGeometry::new().with_geometry(CameraGeometry::new(CameraType::AstriCam, positions, 0.0))
    }

    #[test]
    fn mapper_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ImageMapper>();
    }

    #[test]
    fn unknown_strategy_fails_construction() {
        let config = MapperConfig::default().with_strategy(CameraType::AstriCam, "trilinear");
        let res = ImageMapper::new(&[CameraType::AstriCam], &square_provider(), &config);
        assert_eq!(
            res.err(),
            Some(MappingError::Config(ConfigError::UnknownStrategy(
                "trilinear".to_string()
            )))
        );
    }

    #[test]
    fn map_image_checks_shapes() -> Result<(), MappingError> {
        let config = MapperConfig::default().with_strategy(CameraType::AstriCam, "nearest");
        let mapper = ImageMapper::new(&[CameraType::AstriCam], &square_provider(), &config)?;

        assert_eq!(mapper.num_pixels(CameraType::AstriCam)?, 16);
        assert_eq!(mapper.camera_types(), &[CameraType::AstriCam]);

        assert_eq!(
            mapper.map_image(&[[1.0f32]; 15], CameraType::AstriCam).err(),
            Some(MappingError::Shape(ShapeError::PixelCount {
                expected: 16,
                actual: 15
            }))
        );
        assert_eq!(
            mapper.map_image(&[[1.0f32, 2.0]; 16], CameraType::AstriCam).err(),
            Some(MappingError::Shape(ShapeError::Channels {
                expected: 1,
                actual: 2
            }))
        );
        assert_eq!(
            mapper.map_image(&[[1.0f32]; 16], CameraType::Fact).err(),
            Some(MappingError::UnknownCamera(CameraType::Fact))
        );
        Ok(())
    }
}
