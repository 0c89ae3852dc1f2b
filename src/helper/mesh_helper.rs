use std::collections::HashMap;
use std::f32::consts::PI;
use std::sync::Arc;

use nalgebra::Vector3;
use tracing::{debug, warn};

use crate::config::config::NormalizerConfig;
use crate::error::{Error, Result};

/// Smallest bounding-box width accepted before scale inversion. Keeps the
/// scale factor finite for pathological point-cloud meshes.
const MIN_EXTENT: f32 = 1e-6;

/// Opaque identity of a loaded mesh, chosen by the caller (e.g. the catalog
/// asset id). Normalization results are cached against this handle, never
/// against a live mesh reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(pub u64);

/// Axis-aligned bounding box in mesh-local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl Aabb {
    /// empty creates an inverted box that absorbs the first point expanded
    /// into it.
    pub fn empty() -> Self {
        Aabb {
            min: Vector3::repeat(f32::INFINITY),
            max: Vector3::repeat(f32::NEG_INFINITY),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn expand_point(&mut self, p: &Vector3<f32>) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    pub fn expand_box(&mut self, other: &Aabb) {
        if !other.is_empty() {
            self.min = self.min.inf(&other.min);
            self.max = self.max.sup(&other.max);
        }
    }

    pub fn center(&self) -> Vector3<f32> {
        (self.min + self.max) * 0.5
    }

    /// width is the extent along the eye-line axis (x), the axis all size
    /// normalization is keyed on.
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }
}

/// One named part of an imported mesh. Vertices are mesh-local positions;
/// the geometry itself is owned by the rendering layer, the pipeline only
/// needs positions and names.
#[derive(Debug, Clone)]
pub struct Submesh {
    pub name: String,
    pub vertices: Vec<Vector3<f32>>,
}

impl Submesh {
    pub fn bounds(&self) -> Aabb {
        let mut aabb = Aabb::empty();
        for v in &self.vertices {
            aabb.expand_point(v);
        }
        aabb
    }
}

/// A raw imported eyewear mesh, as handed over by the mesh-loading
/// collaborator.
#[derive(Debug, Clone)]
pub struct RawMesh {
    pub submeshes: Vec<Submesh>,
}

impl RawMesh {
    /// validate rejects meshes the normalizer cannot work with: no submeshes
    /// at all, or non-finite vertex data from a corrupt import.
    pub fn validate(&self) -> Result<()> {
        if self.submeshes.is_empty() {
            return Err(Error::EmptyMesh);
        }
        for sub in &self.submeshes {
            if sub.vertices.iter().any(|v| !v.iter().all(|c| c.is_finite())) {
                return Err(Error::MeshParse(format!(
                    "submesh {:?} contains non-finite vertices",
                    sub.name
                )));
            }
        }
        Ok(())
    }
}

/// Derived, cached artifact of a raw mesh: the canonical pose/scale that
/// places the lens plane at the tracked anchor with unit frame width.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedAsset {
    /// Bounds over the non-suppressed submeshes (or the full mesh when the
    /// visible set was empty or degenerate).
    pub visible_bounds: Aabb,
    /// Uniform scale taking the visible width to 1. Always positive, finite.
    pub scale_factor: f32,
    /// Recentering translation applied after scaling: x/y recenter the
    /// bounds on the origin, z pivots to the minimum-z face so the lens
    /// plane sits at the anchor depth and the arms trail behind the face.
    pub pivot_offset: Vector3<f32>,
    /// Fixed yaw applied at presentation time so the lenses face the viewer
    /// and suppressed arms point away from the camera.
    pub presentation_yaw: f32,
    /// Names of submeshes marked non-rendering. The parts are retained in
    /// the mesh so a later re-normalization or visibility toggle is cheap.
    pub suppressed: Vec<String>,
}

/// AssetNormalizer converts an arbitrary imported mesh into a canonical
/// pose/scale, once per distinct mesh identity.
#[derive(Debug, Clone)]
pub struct AssetNormalizer {
    suppressed_parts: Vec<String>,
    cache: HashMap<MeshId, Arc<NormalizedAsset>>,
}

impl AssetNormalizer {
    /// new initializes the normalizer from configuration.
    pub fn new(config: &NormalizerConfig) -> Self {
        AssetNormalizer {
            suppressed_parts: config
                .suppressed_parts
                .iter()
                .map(|s| s.to_lowercase())
                .collect(),
            cache: HashMap::new(),
        }
    }

    fn is_suppressed(&self, name: &str) -> bool {
        let lowered = name.to_lowercase();
        self.suppressed_parts.iter().any(|p| lowered.contains(p))
    }

    /// normalize computes the canonical transform for a mesh, caching the
    /// result by mesh identity. A repeat call with the same id returns the
    /// cached artifact without touching the mesh.
    ///
    /// # Arguments
    /// * `id` - opaque mesh identity chosen by the caller
    /// * `mesh` - the raw imported mesh
    ///
    /// # Returns
    /// * `Result<Arc<NormalizedAsset>>`
    pub fn normalize(&mut self, id: MeshId, mesh: &RawMesh) -> Result<Arc<NormalizedAsset>> {
        if let Some(cached) = self.cache.get(&id) {
            return Ok(Arc::clone(cached));
        }

        mesh.validate()?;

        let mut suppressed: Vec<String> = Vec::new();
        let mut visible_bounds = Aabb::empty();
        let mut full_bounds = Aabb::empty();

        for sub in &mesh.submeshes {
            let bounds = sub.bounds();
            full_bounds.expand_box(&bounds);
            if self.is_suppressed(&sub.name) {
                suppressed.push(sub.name.clone());
            } else {
                visible_bounds.expand_box(&bounds);
            }
        }

        // No visible submesh matched (e.g. a mesh without temple-style
        // naming): anchor on the whole mesh instead.
        if visible_bounds.is_empty() {
            debug!(mesh_id = id.0, "no visible submeshes, using full-mesh bounds");
            visible_bounds = full_bounds;
        }

        if visible_bounds.width() < MIN_EXTENT {
            warn!(
                mesh_id = id.0,
                width = visible_bounds.width(),
                "degenerate visible bounds, falling back to full-mesh bounds"
            );
            visible_bounds = full_bounds;
        }

        let width = visible_bounds.width().max(MIN_EXTENT);
        let scale_factor = 1.0 / width;

        let center = visible_bounds.center();
        let pivot_offset = Vector3::new(
            -center.x * scale_factor,
            -center.y * scale_factor,
            -visible_bounds.min.z * scale_factor,
        );

        let asset = Arc::new(NormalizedAsset {
            visible_bounds,
            scale_factor,
            pivot_offset,
            presentation_yaw: PI,
            suppressed,
        });
        self.cache.insert(id, Arc::clone(&asset));
        debug!(
            mesh_id = id.0,
            scale_factor, "normalized asset cached"
        );
        Ok(asset)
    }

    /// invalidate drops the cached artifact for a mesh identity, forcing
    /// recomputation on the next normalize call (used when the catalog
    /// replaces the asset behind an id).
    pub fn invalidate(&mut self, id: MeshId) {
        self.cache.remove(&id);
    }

    /// clear drops all cached artifacts, used at session teardown.
    pub fn clear(&mut self) {
        self.cache.clear();
    }
}
