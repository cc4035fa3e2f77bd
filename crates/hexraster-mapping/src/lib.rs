#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// camera types and pixel geometries.
pub mod camera;

/// user facing and resolved configuration.
pub mod config;

/// Error types for the mapping module.
pub mod error;

/// source and target grid synthesis.
pub mod grid;

/// lattice shapes and tick arithmetic.
pub mod lattice;

/// the image mapper orchestrating table construction.
pub mod mapper;

/// post-processing of raw weight assignments.
pub mod postprocess;

/// weight resolution strategies.
pub mod resolver;

/// nearest neighbour queries over source grids.
pub mod spatial;

/// sparse mapping tables.
pub mod table;

/// Delaunay triangulation of hexagonal source grids.
pub mod triangulation;

/// interpolation weight formulas.
pub mod weights;

pub use crate::camera::{CameraGeometry, CameraType, GeometryProvider, InMemoryGeometry};
pub use crate::config::{ImageShape, MapperConfig, ResamplingConfig, Strategy};
pub use crate::error::{ConfigError, GeometryError, MappingError, ShapeError};
pub use crate::mapper::ImageMapper;
pub use crate::table::MappingTable;
