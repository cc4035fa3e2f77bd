use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GeometryError;
use crate::lattice::{HexParity, LatticeShape};

/// The supported camera types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CameraType {
    /// LST camera.
    #[serde(rename = "LSTCam")]
    LstCam,
    /// MST FlashCam.
    #[serde(rename = "FlashCam")]
    FlashCam,
    /// MST NectarCam.
    #[serde(rename = "NectarCam")]
    NectarCam,
    /// SCT camera.
    #[serde(rename = "SCTCam")]
    SctCam,
    /// SST-1M DigiCam.
    #[serde(rename = "DigiCam")]
    DigiCam,
    /// SST CHEC.
    #[serde(rename = "CHEC")]
    Chec,
    /// SST ASTRI camera.
    #[serde(rename = "ASTRICam")]
    AstriCam,
    /// VERITAS camera.
    #[serde(rename = "VERITAS")]
    Veritas,
    /// MAGIC camera.
    #[serde(rename = "MAGICCam")]
    MagicCam,
    /// FACT camera.
    #[serde(rename = "FACT")]
    Fact,
    /// H.E.S.S. phase I camera.
    #[serde(rename = "HESS-I")]
    HessI,
    /// H.E.S.S. phase II camera.
    #[serde(rename = "HESS-II")]
    HessII,
}

impl CameraType {
    /// All camera types.
    pub const ALL: [CameraType; 12] = [
        CameraType::LstCam,
        CameraType::FlashCam,
        CameraType::NectarCam,
        CameraType::SctCam,
        CameraType::DigiCam,
        CameraType::Chec,
        CameraType::AstriCam,
        CameraType::Veritas,
        CameraType::MagicCam,
        CameraType::Fact,
        CameraType::HessI,
        CameraType::HessII,
    ];

    /// The canonical camera name.
    pub fn name(&self) -> &'static str {
        match self {
            CameraType::LstCam => "LSTCam",
            CameraType::FlashCam => "FlashCam",
            CameraType::NectarCam => "NectarCam",
            CameraType::SctCam => "SCTCam",
            CameraType::DigiCam => "DigiCam",
            CameraType::Chec => "CHEC",
            CameraType::AstriCam => "ASTRICam",
            CameraType::Veritas => "VERITAS",
            CameraType::MagicCam => "MAGICCam",
            CameraType::Fact => "FACT",
            CameraType::HessI => "HESS-I",
            CameraType::HessII => "HESS-II",
        }
    }

    /// The number of pixels of the camera.
    pub fn nominal_pixels(&self) -> usize {
        match self {
            CameraType::LstCam => 1855,
            CameraType::FlashCam => 1764,
            CameraType::NectarCam => 1855,
            CameraType::SctCam => 11328,
            CameraType::DigiCam => 1296,
            CameraType::Chec => 2048,
            CameraType::AstriCam => 2368,
            CameraType::Veritas => 499,
            CameraType::MagicCam => 1039,
            CameraType::Fact => 1440,
            CameraType::HessI => 960,
            CameraType::HessII => 2048,
        }
    }

    /// The default side length of the square output raster.
    pub fn default_image_size(&self) -> usize {
        match self {
            CameraType::LstCam => 110,
            CameraType::FlashCam => 112,
            CameraType::NectarCam => 110,
            CameraType::SctCam => 120,
            CameraType::DigiCam => 96,
            CameraType::Chec => 48,
            CameraType::AstriCam => 56,
            CameraType::Veritas => 54,
            CameraType::MagicCam => 78,
            CameraType::Fact => 90,
            CameraType::HessI => 72,
            CameraType::HessII => 104,
        }
    }

    /// The pixel lattice of the camera.
    pub fn lattice(&self) -> LatticeShape {
        match self {
            CameraType::Chec => LatticeShape::Square {
                merge_threshold: Some(2),
            },
            CameraType::AstriCam | CameraType::SctCam => LatticeShape::Square {
                merge_threshold: None,
            },
            CameraType::LstCam | CameraType::NectarCam => LatticeShape::Hex {
                parity: HexParity {
                    flip_oversampling: false,
                    flip_interpolation: true,
                },
            },
            CameraType::DigiCam => LatticeShape::Hex {
                parity: HexParity {
                    flip_oversampling: true,
                    flip_interpolation: true,
                },
            },
            _ => LatticeShape::Hex {
                parity: HexParity::default(),
            },
        }
    }

    /// Whether the camera axes are rotated against its lattice.
    ///
    /// The pixel positions of these cameras are aligned with the lattice before gridding and the
    /// mapping table is rotated back afterwards.
    pub fn rotation_corrected(&self) -> bool {
        matches!(
            self,
            CameraType::LstCam | CameraType::NectarCam | CameraType::MagicCam
        )
    }
}

impl fmt::Display for CameraType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for CameraType {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CameraType::ALL
            .iter()
            .find(|camera| camera.name() == s)
            .copied()
            .ok_or_else(|| GeometryError::UnsupportedCamera(s.to_string()))
    }
}

/// The pixel layout of one camera.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraGeometry {
    camera: CameraType,
    positions: Vec<[f64; 2]>,
    rotation_deg: f64,
}

impl CameraGeometry {
    /// Create a geometry from pixel positions already aligned with the lattice axes.
    ///
    /// # Arguments
    ///
    /// * `camera` - The camera type.
    /// * `positions` - The `(x, y)` position of every pixel, in pixel index order.
    /// * `rotation_deg` - The orientation offset applied to the mapping table, in degrees.
    pub fn new(camera: CameraType, positions: Vec<[f64; 2]>, rotation_deg: f64) -> Self {
        Self {
            camera,
            positions,
            rotation_deg,
        }
    }

    /// Create a geometry from positions in the native camera frame.
    ///
    /// For rotation corrected cameras the positions are rotated by `90 - pix_rot_deg` degrees to
    /// align them with the lattice axes, and that angle becomes the orientation offset. The
    /// other cameras keep their positions and get no offset.
    pub fn from_native_orientation(
        camera: CameraType,
        positions: Vec<[f64; 2]>,
        pix_rot_deg: f64,
    ) -> Self {
        if !camera.rotation_corrected() {
            return Self::new(camera, positions, 0.0);
        }

        let rotation_deg = 90.0 - pix_rot_deg;
        let (sin, cos) = rotation_deg.to_radians().sin_cos();
        let positions = positions
            .into_iter()
            .map(|[x, y]| [cos * x - sin * y, sin * x + cos * y])
            .collect();

        Self::new(camera, positions, rotation_deg)
    }

    /// The camera type.
    pub fn camera(&self) -> CameraType {
        self.camera
    }

    /// All pixel positions as given.
    pub fn positions(&self) -> &[[f64; 2]] {
        &self.positions
    }

    /// The orientation offset in degrees.
    pub fn rotation_deg(&self) -> f64 {
        self.rotation_deg
    }

    /// The number of pixels taken into account, capped at the nominal pixel count.
    pub fn num_pixels(&self) -> usize {
        self.positions.len().min(self.camera.nominal_pixels())
    }

    /// The positions of the pixels taken into account.
    pub fn pixel_positions(&self) -> &[[f64; 2]] {
        &self.positions[..self.num_pixels()]
    }
}

/// A source of camera geometries.
pub trait GeometryProvider {
    /// Fetch the geometry of a camera type.
    fn camera_geometry(&self, camera: CameraType) -> Result<CameraGeometry, GeometryError>;
}

/// A geometry provider holding geometries in memory.
#[derive(Clone, Debug, Default)]
pub struct InMemoryGeometry {
    geometries: HashMap<CameraType, CameraGeometry>,
}

impl InMemoryGeometry {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a geometry, replacing any previous geometry of the same camera type.
    pub fn insert(&mut self, geometry: CameraGeometry) {
        self.geometries.insert(geometry.camera(), geometry);
    }

    /// Add a geometry and return the provider.
    pub fn with_geometry(mut self, geometry: CameraGeometry) -> Self {
        self.insert(geometry);
        self
    }
}

impl FromIterator<CameraGeometry> for InMemoryGeometry {
    fn from_iter<I: IntoIterator<Item = CameraGeometry>>(iter: I) -> Self {
        let mut provider = Self::new();
        iter.into_iter().for_each(|g| provider.insert(g));
        provider
    }
}

impl GeometryProvider for InMemoryGeometry {
    fn camera_geometry(&self, camera: CameraType) -> Result<CameraGeometry, GeometryError> {
        self.geometries
            .get(&camera)
            .cloned()
            .ok_or(GeometryError::MissingGeometry(camera))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::{CameraGeometry, CameraType, GeometryProvider, InMemoryGeometry};
    use crate::error::GeometryError;

    #[test]
    fn camera_names_round_trip() -> Result<(), GeometryError> {
        for camera in CameraType::ALL {
            assert_eq!(camera.name().parse::<CameraType>()?, camera);
        }
        assert_eq!(
            "SST:CHEC".parse::<CameraType>(),
            Err(GeometryError::UnsupportedCamera("SST:CHEC".to_string()))
        );
        Ok(())
    }

    #[test]
    fn camera_constants() {
        assert_eq!(CameraType::SctCam.nominal_pixels(), 11328);
        assert_eq!(CameraType::Chec.default_image_size(), 48);
        assert!(!CameraType::AstriCam.lattice().is_hex());
        assert!(CameraType::Fact.lattice().is_hex());
        assert!(CameraType::MagicCam.rotation_corrected());
        assert!(!CameraType::DigiCam.rotation_corrected());
    }

    #[test]
    fn num_pixels_capped_at_nominal() {
        let positions = (0..1000).map(|i| [i as f64, 0.0]).collect::<Vec<_>>();
        let geometry = CameraGeometry::new(CameraType::Veritas, positions, 0.0);
        assert_eq!(geometry.num_pixels(), 499);
        assert_eq!(geometry.pixel_positions().len(), 499);
    }

    #[test]
    fn native_orientation_rotates_corrected_cameras() {
        let geometry =
            CameraGeometry::from_native_orientation(CameraType::MagicCam, vec![[1.0, 0.0]], 0.0);
        assert_relative_eq!(geometry.rotation_deg(), 90.0);
        assert_relative_eq!(geometry.positions()[0][0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(geometry.positions()[0][1], 1.0, epsilon = 1e-12);

        let geometry =
            CameraGeometry::from_native_orientation(CameraType::FlashCam, vec![[1.0, 0.0]], 0.0);
        assert_eq!(geometry.rotation_deg(), 0.0);
        assert_eq!(geometry.positions(), &[[1.0, 0.0]]);
    }

    #[test]
    fn in_memory_provider() {
        let provider = InMemoryGeometry::new().with_geometry(CameraGeometry::new(
            CameraType::Fact,
            vec![[0.0, 0.0]],
            0.0,
        ));
        assert!(provider.camera_geometry(CameraType::Fact).is_ok());
        assert_eq!(
            provider.camera_geometry(CameraType::HessI),
            Err(GeometryError::MissingGeometry(CameraType::HessI))
        );
    }
}
