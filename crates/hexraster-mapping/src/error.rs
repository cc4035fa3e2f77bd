use hexraster_image::ImageError;

use crate::camera::CameraType;

/// An error raised while resolving the mapper configuration.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigError {
    /// The requested resampling strategy does not exist.
    #[error("Hex conversion algorithm {0} is not implemented")]
    UnknownStrategy(String),

    /// The requested output raster size cannot hold any cell.
    #[error("Invalid output image size {0}")]
    InvalidImageSize(usize),
}

/// An error raised while reading or gridding a camera geometry.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum GeometryError {
    /// The camera name is not one of the supported camera types.
    #[error("Camera type {0} isn't supported")]
    UnsupportedCamera(String),

    /// The geometry provider has no geometry for the camera type.
    #[error("No pixel geometry available for camera type {0}")]
    MissingGeometry(CameraType),

    /// An axis has fewer than two distinct coordinates.
    #[error("Axis {axis} has {ticks} distinct coordinates, at least 2 are required")]
    DegenerateTicks {
        /// The axis name, `x` or `y`.
        axis: &'static str,
        /// The number of distinct coordinates found.
        ticks: usize,
    },

    /// The geometry holds no pixel.
    #[error("The camera geometry has no pixels")]
    NoPixels,

    /// The internal raster ends up without any cell.
    #[error("The raster has no cells left after trimming")]
    EmptyRaster,

    /// A square lattice stencil references a coordinate missing from the source grid.
    #[error("Lattice point is missing from the source grid")]
    MissingLatticePoint,

    /// The Delaunay triangulation could not be built.
    #[error("Failed to triangulate the source grid: {0}")]
    Triangulation(String),
}

/// An error raised when the input of `map_image` does not fit the mapping table.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ShapeError {
    /// The number of pixel values differs from the number of camera pixels.
    #[error("Expected {expected} pixel values, got {actual}")]
    PixelCount {
        /// The number of camera pixels.
        expected: usize,
        /// The number of pixel values given.
        actual: usize,
    },

    /// The number of channels differs from the configured channel count.
    #[error("Expected {expected} channels, got {actual}")]
    Channels {
        /// The configured number of channels.
        expected: usize,
        /// The number of channels given.
        actual: usize,
    },
}

/// The top level error type of the mapping crate.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum MappingError {
    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Geometry error.
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Input shape error.
    #[error(transparent)]
    Shape(#[from] ShapeError),

    /// The mapper was not constructed for the camera type.
    #[error("No mapping table was built for camera type {0}")]
    UnknownCamera(CameraType),

    /// Raster container error.
    #[error(transparent)]
    Image(#[from] ImageError),
}
