//! Reconstructed pixel hits, their clusters and module placement

use serde::{Deserialize, Serialize};

/// Reference to a cluster in the event's cluster collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterRef(pub u32);

/// Point in the global detector frame
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GlobalPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl GlobalPoint {
    #[must_use]
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Transverse distance from the beam axis
    #[must_use]
    #[inline]
    pub fn perp(&self) -> f32 {
        self.x.hypot(self.y)
    }
}

/// Placement of a module's local frame in the global frame
///
/// `rotation` rows are the local x, y and z axes expressed in global
/// coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModuleSurface {
    pub position: GlobalPoint,
    pub rotation: [[f32; 3]; 3],
}

impl Default for ModuleSurface {
    fn default() -> Self {
        Self {
            position: GlobalPoint::default(),
            rotation: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }
}

impl ModuleSurface {
    /// Map a local point to global coordinates
    #[must_use]
    pub fn to_global(&self, local: [f32; 3]) -> GlobalPoint {
        let r = &self.rotation;
        GlobalPoint {
            x: self.position.x + local[0] * r[0][0] + local[1] * r[1][0] + local[2] * r[2][0],
            y: self.position.y + local[0] * r[0][1] + local[1] * r[1][1] + local[2] * r[2][1],
            z: self.position.z + local[0] * r[0][2] + local[1] * r[1][2] + local[2] * r[2][2],
        }
    }
}

/// Detector id of the module a hit was measured on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "region", rename_all = "snake_case")]
pub enum DetId {
    /// Pixel barrel module (subdetector 1)
    Barrel { layer: u32, ladder: u32, module: u32 },
    /// Pixel forward-disk module (subdetector 2)
    Forward {
        side: u32,
        disk: u32,
        panel: u32,
        module: u32,
    },
    /// Any non-pixel module
    Other { subdetector: u32 },
}

impl DetId {
    pub const PIXEL_BARREL: u32 = 1;
    pub const PIXEL_ENDCAP: u32 = 2;

    /// Numeric subdetector id
    #[must_use]
    pub fn subdet_id(&self) -> u32 {
        match self {
            DetId::Barrel { .. } => Self::PIXEL_BARREL,
            DetId::Forward { .. } => Self::PIXEL_ENDCAP,
            DetId::Other { subdetector } => *subdetector,
        }
    }

    /// Whether the module belongs to the pixel subsystem
    #[must_use]
    pub fn is_pixel(&self) -> bool {
        matches!(self.subdet_id(), Self::PIXEL_BARREL | Self::PIXEL_ENDCAP)
    }
}

/// One pixel of a cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pixel {
    pub x: u16,
    pub y: u16,
    pub adc: u16,
}

/// Charge deposit underlying a hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    /// Centroid x, in pixel units
    pub x: f32,
    /// Centroid y, in pixel units
    pub y: f32,
    pub size_x: u16,
    pub size_y: u16,
    /// Total charge
    pub charge: u32,
    pub pixels: Vec<Pixel>,
    #[serde(default)]
    pub spans_two_rocs: bool,
    #[serde(default)]
    pub has_bad_pixels: bool,
    #[serde(default)]
    pub is_on_edge: bool,
}

impl Cluster {
    /// Number of pixels
    #[must_use]
    pub fn size(&self) -> usize {
        self.pixels.len()
    }

    /// ADC count of the first pixel, 0.0 for an empty cluster
    #[must_use]
    pub fn first_adc(&self) -> f32 {
        self.pixels.first().map_or(0.0, |p| f32::from(p.adc))
    }

    /// Charge per pixel, 0.0 for an empty cluster
    #[must_use]
    pub fn average_charge(&self) -> f32 {
        if self.pixels.is_empty() {
            0.0
        } else {
            self.charge as f32 / self.size() as f32
        }
    }

    /// `size_y / size_x`, 0.0 when `size_x` is zero
    #[must_use]
    pub fn aspect(&self) -> f32 {
        if self.size_x == 0 {
            0.0
        } else {
            f32::from(self.size_y) / f32::from(self.size_x)
        }
    }
}

/// Hit that carries a detector id
pub trait HasGeographicalId {
    fn geographical_id(&self) -> DetId;
}

/// Hit that owns a pixel cluster
pub trait HasCluster {
    fn cluster_ref(&self) -> ClusterRef;
    fn cluster(&self) -> &Cluster;
}

/// Everything the encoder reads from a hit
pub trait TrackerHit: HasGeographicalId + HasCluster {
    fn global_position(&self) -> GlobalPoint;
    /// Azimuth as stored by the hit sorter, in (-π, π]
    fn phi(&self) -> f32;
    /// Transverse radius as stored by the hit sorter
    fn r(&self) -> f32;
    fn surface(&self) -> &ModuleSurface;
}

/// Reconstructed pixel hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PixelHit {
    pub position: GlobalPoint,
    pub phi: f32,
    pub r: f32,
    pub det_id: DetId,
    #[serde(default)]
    pub surface: ModuleSurface,
    pub cluster_ref: ClusterRef,
    pub cluster: Cluster,
}

impl HasGeographicalId for PixelHit {
    fn geographical_id(&self) -> DetId {
        self.det_id
    }
}

impl HasCluster for PixelHit {
    fn cluster_ref(&self) -> ClusterRef {
        self.cluster_ref
    }

    fn cluster(&self) -> &Cluster {
        &self.cluster
    }
}

impl TrackerHit for PixelHit {
    fn global_position(&self) -> GlobalPoint {
        self.position
    }

    fn phi(&self) -> f32 {
        self.phi
    }

    fn r(&self) -> f32 {
        self.r
    }

    fn surface(&self) -> &ModuleSurface {
        &self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster(pixels: Vec<Pixel>, size_x: u16, size_y: u16, charge: u32) -> Cluster {
        Cluster {
            x: 10.0,
            y: 10.0,
            size_x,
            size_y,
            charge,
            pixels,
            spans_two_rocs: false,
            has_bad_pixels: false,
            is_on_edge: false,
        }
    }

    #[test]
    fn test_det_id_subdetector() {
        let barrel = DetId::Barrel {
            layer: 2,
            ladder: 5,
            module: 3,
        };
        let forward = DetId::Forward {
            side: 1,
            disk: 1,
            panel: 1,
            module: 1,
        };
        let strip = DetId::Other { subdetector: 3 };
        assert_eq!(barrel.subdet_id(), 1);
        assert_eq!(forward.subdet_id(), 2);
        assert_eq!(strip.subdet_id(), 3);
        assert!(barrel.is_pixel());
        assert!(forward.is_pixel());
        assert!(!strip.is_pixel());
    }

    #[test]
    fn test_cluster_derived_values() {
        let pixels = vec![
            Pixel { x: 9, y: 9, adc: 120 },
            Pixel { x: 10, y: 9, adc: 80 },
            Pixel { x: 9, y: 10, adc: 100 },
            Pixel { x: 10, y: 10, adc: 100 },
        ];
        let c = cluster(pixels, 2, 2, 400);
        assert_eq!(c.size(), 4);
        assert_eq!(c.first_adc(), 120.0);
        assert_eq!(c.average_charge(), 100.0);
        assert_eq!(c.aspect(), 1.0);
    }

    #[test]
    fn test_degenerate_cluster() {
        let c = cluster(vec![], 0, 0, 0);
        assert_eq!(c.first_adc(), 0.0);
        assert_eq!(c.average_charge(), 0.0);
        assert_eq!(c.aspect(), 0.0);
    }

    #[test]
    fn test_surface_to_global() {
        let surface = ModuleSurface {
            position: GlobalPoint::new(3.0, 4.0, 1.0),
            rotation: [[0.0, 0.0, 1.0], [0.0, 1.0, 0.0], [0.6, 0.8, 0.0]],
        };
        let origin = surface.to_global([0.0, 0.0, 0.0]);
        assert_eq!(origin, GlobalPoint::new(3.0, 4.0, 1.0));
        assert!((origin.perp() - 5.0).abs() < 1e-6);

        let along_normal = surface.to_global([0.0, 0.0, 1.0]);
        assert!((along_normal.x - 3.6).abs() < 1e-6);
        assert!((along_normal.y - 4.8).abs() < 1e-6);
        assert!((along_normal.perp() - 6.0).abs() < 1e-5);
    }

    #[test]
    fn test_det_id_json_is_tagged() {
        let json = serde_json::to_string(&DetId::Barrel {
            layer: 1,
            ladder: 2,
            module: 3,
        })
        .unwrap();
        assert_eq!(json, r#"{"region":"barrel","layer":1,"ladder":2,"module":3}"#);
    }
}
