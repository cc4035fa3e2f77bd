use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use hexraster_image::ImageSize;
use serde::{Deserialize, Serialize};

use crate::camera::CameraType;
use crate::error::ConfigError;
use crate::lattice::LatticeShape;

/// The strategy converting camera pixels into raster cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Every pixel covers a fixed block of cells.
    Oversampling,
    /// Area weighted rebinning on a finer sub-grid.
    Rebinning,
    /// Every cell takes its nearest pixel.
    Nearest,
    /// Bilinear (square) or barycentric (hex) interpolation.
    Bilinear,
    /// Piecewise bicubic stencils.
    Bicubic,
}

impl Strategy {
    /// The canonical strategy name.
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Oversampling => "oversampling",
            Strategy::Rebinning => "rebinning",
            Strategy::Nearest => "nearest_interpolation",
            Strategy::Bilinear => "bilinear_interpolation",
            Strategy::Bicubic => "bicubic_interpolation",
        }
    }

    /// The internal padding band in cells.
    pub fn internal_pad(&self) -> usize {
        match self {
            Strategy::Bicubic => 3,
            _ => 2,
        }
    }

    /// The sub-sampling factor of the target grid.
    pub fn grid_factor(&self) -> usize {
        match self {
            Strategy::Rebinning => 10,
            _ => 1,
        }
    }

    /// Whether every cell is assigned to exactly one source point.
    pub fn is_exact(&self) -> bool {
        matches!(self, Strategy::Oversampling | Strategy::Nearest)
    }

    /// Whether the strategy interpolates between source points.
    pub fn interpolates(&self) -> bool {
        matches!(self, Strategy::Bilinear | Strategy::Bicubic)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Strategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "oversampling" => Ok(Strategy::Oversampling),
            "rebinning" => Ok(Strategy::Rebinning),
            "nearest_interpolation" | "nearest" => Ok(Strategy::Nearest),
            "bilinear_interpolation" | "bilinear" => Ok(Strategy::Bilinear),
            "bicubic_interpolation" | "bicubic" => Ok(Strategy::Bicubic),
            _ => Err(ConfigError::UnknownStrategy(s.to_string())),
        }
    }
}

/// User facing configuration of an [`crate::ImageMapper`].
///
/// Every per camera setting is optional and falls back to the camera defaults.
///
/// # Examples
///
/// ```
/// use hexraster_mapping::{CameraType, MapperConfig, Strategy};
///
/// let config = MapperConfig::default()
///     .with_strategy(CameraType::FlashCam, "bilinear_interpolation")
///     .with_padding(CameraType::FlashCam, 2);
///
/// let resolved = config.resolve(CameraType::FlashCam).unwrap();
/// assert_eq!(resolved.strategy, Strategy::Bilinear);
/// assert_eq!(resolved.padding, 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Strategy name per camera type, `oversampling` when missing.
    pub strategies: HashMap<CameraType, String>,
    /// External padding per camera type, 0 when missing.
    pub padding: HashMap<CameraType, usize>,
    /// Output raster side length per camera type, ignored under oversampling.
    pub image_sizes: HashMap<CameraType, usize>,
    /// Suppress interpolated contributions anchored on virtual pixels.
    pub mask_interpolation: bool,
    /// Map peak arrival times as a second channel.
    pub use_peak_times: bool,
}

impl MapperConfig {
    /// Set the strategy name of a camera type.
    pub fn with_strategy(mut self, camera: CameraType, strategy: impl Into<String>) -> Self {
        self.strategies.insert(camera, strategy.into());
        self
    }

    /// Set the external padding of a camera type.
    pub fn with_padding(mut self, camera: CameraType, padding: usize) -> Self {
        self.padding.insert(camera, padding);
        self
    }

    /// Set the output raster side length of a camera type.
    pub fn with_image_size(mut self, camera: CameraType, size: usize) -> Self {
        self.image_sizes.insert(camera, size);
        self
    }

    /// Enable or disable interpolation masking.
    pub fn with_mask_interpolation(mut self, mask: bool) -> Self {
        self.mask_interpolation = mask;
        self
    }

    /// Enable or disable the peak time channel.
    pub fn with_peak_times(mut self, peak_times: bool) -> Self {
        self.use_peak_times = peak_times;
        self
    }

    /// Resolve the settings of one camera type.
    ///
    /// # Errors
    ///
    /// Fails if the strategy name is unknown or the requested raster size is zero.
    pub fn resolve(&self, camera: CameraType) -> Result<ResamplingConfig, ConfigError> {
        let strategy = match self.strategies.get(&camera) {
            Some(name) => name.parse()?,
            None => Strategy::Oversampling,
        };

        let image_size = match strategy {
            Strategy::Oversampling => camera.default_image_size(),
            _ => self
                .image_sizes
                .get(&camera)
                .copied()
                .unwrap_or_else(|| camera.default_image_size()),
        };
        if image_size == 0 {
            return Err(ConfigError::InvalidImageSize(image_size));
        }

        Ok(ResamplingConfig {
            strategy,
            padding: self.padding.get(&camera).copied().unwrap_or(0),
            image_size,
            mask: self.mask_interpolation,
            channels: if self.use_peak_times { 2 } else { 1 },
        })
    }
}

/// The resolved settings of one camera type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResamplingConfig {
    /// The resampling strategy.
    pub strategy: Strategy,
    /// Cells added on every side of the final raster.
    pub padding: usize,
    /// The native raster side length, without any padding.
    pub image_size: usize,
    /// Whether interpolation masking is enabled.
    pub mask: bool,
    /// The number of channels of the mapped images.
    pub channels: usize,
}

impl ResamplingConfig {
    /// The internal padding band in cells.
    pub fn internal_pad(&self) -> usize {
        self.strategy.internal_pad()
    }

    /// The sub-sampling factor of the target grid.
    pub fn grid_factor(&self) -> usize {
        self.strategy.grid_factor()
    }

    /// The side length of the internal raster, padding band included.
    pub fn internal_size(&self) -> usize {
        self.image_size + 2 * self.internal_pad()
    }

    /// Cells removed on every side once the table is built.
    pub fn trim(&self, lattice: LatticeShape) -> usize {
        if lattice.is_hex() && self.strategy == Strategy::Oversampling {
            2 * self.internal_pad()
        } else {
            self.internal_pad()
        }
    }
}

/// The shape of the images produced for one camera type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageShape {
    /// The raster size.
    pub size: ImageSize,
    /// The number of channels.
    pub channels: usize,
}

#[cfg(test)]
mod tests {
    use super::{MapperConfig, Strategy};
    use crate::camera::CameraType;
    use crate::error::ConfigError;
    use crate::lattice::{HexParity, LatticeShape};

    #[test]
    fn parse_strategies() -> Result<(), ConfigError> {
        assert_eq!("oversampling".parse::<Strategy>()?, Strategy::Oversampling);
        assert_eq!("bicubic".parse::<Strategy>()?, Strategy::Bicubic);
        assert_eq!(
            "nearest_interpolation".parse::<Strategy>()?,
            Strategy::Nearest
        );
        assert_eq!(
            "trilinear".parse::<Strategy>(),
            Err(ConfigError::UnknownStrategy("trilinear".to_string()))
        );
        Ok(())
    }

    #[test]
    fn resolve_defaults() -> Result<(), ConfigError> {
        let config = MapperConfig::default();
        let resolved = config.resolve(CameraType::Veritas)?;
        assert_eq!(resolved.strategy, Strategy::Oversampling);
        assert_eq!(resolved.padding, 0);
        assert_eq!(resolved.image_size, 54);
        assert_eq!(resolved.channels, 1);
        assert_eq!(resolved.internal_size(), 58);
        Ok(())
    }

    #[test]
    fn image_size_override_ignored_under_oversampling() -> Result<(), ConfigError> {
        let config = MapperConfig::default()
            .with_image_size(CameraType::Fact, 40)
            .with_image_size(CameraType::HessI, 40)
            .with_strategy(CameraType::HessI, "rebinning")
            .with_peak_times(true);
        assert_eq!(config.resolve(CameraType::Fact)?.image_size, 90);

        let resolved = config.resolve(CameraType::HessI)?;
        assert_eq!(resolved.image_size, 40);
        assert_eq!(resolved.grid_factor(), 10);
        assert_eq!(resolved.channels, 2);
        Ok(())
    }

    #[test]
    fn zero_image_size_rejected() {
        let config = MapperConfig::default()
            .with_strategy(CameraType::Fact, "nearest")
            .with_image_size(CameraType::Fact, 0);
        assert_eq!(
            config.resolve(CameraType::Fact),
            Err(ConfigError::InvalidImageSize(0))
        );
    }

    #[test]
    fn trim_doubles_for_hex_oversampling() -> Result<(), ConfigError> {
        let hex = LatticeShape::Hex {
            parity: HexParity::default(),
        };
        let square = LatticeShape::Square {
            merge_threshold: None,
        };
        let config = MapperConfig::default().with_strategy(CameraType::Fact, "bicubic");
        assert_eq!(config.resolve(CameraType::Fact)?.trim(hex), 3);
        assert_eq!(config.resolve(CameraType::HessI)?.trim(hex), 4);
        assert_eq!(config.resolve(CameraType::HessI)?.trim(square), 2);
        Ok(())
    }

    #[test]
    fn deserialize_from_json() -> Result<(), Box<dyn std::error::Error>> {
        let config: MapperConfig = serde_json::from_str(
            r#"{"strategies": {"LSTCam": "bilinear_interpolation"}, "padding": {"LSTCam": 3}, "mask_interpolation": true}"#,
        )?;
        let resolved = config.resolve(CameraType::LstCam)?;
        assert_eq!(resolved.strategy, Strategy::Bilinear);
        assert_eq!(resolved.padding, 3);
        assert!(resolved.mask);
        Ok(())
    }
}
