//! In-memory scene document driven by the built-in commands.
//!
//! Pure bookkeeping: objects, transforms, hierarchy, and material data, with
//! no geometry kernel behind them. Mutated only from the host thread; the
//! mutex around it exists to satisfy the registry's `Send + Sync` bound and
//! is never contended.

pub mod commands;
mod params;
#[cfg(test)]
mod tests;

pub use commands::register_scene_commands;

use serde_json::{json, Value};

/// Mesh topology counts derived at creation time from the primitive's
/// parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshStats {
    pub vertices: u64,
    pub edges: u64,
    pub polygons: u64,
}

/// Which primitive a mesh object was created from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Cube,
    Plane,
    UvSphere,
    IcoSphere,
    Cylinder,
    Cone,
    Torus,
    Circle,
    Monkey,
}

impl Primitive {
    pub fn label(self) -> &'static str {
        match self {
            Primitive::Cube => "Cube",
            Primitive::Plane => "Plane",
            Primitive::UvSphere => "Sphere",
            Primitive::IcoSphere => "Icosphere",
            Primitive::Cylinder => "Cylinder",
            Primitive::Cone => "Cone",
            Primitive::Torus => "Torus",
            Primitive::Circle => "Circle",
            Primitive::Monkey => "Suzanne",
        }
    }
}

/// How a circle's interior is meshed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillType {
    Nothing,
    Ngon,
    TriFan,
}

impl FillType {
    pub fn as_str(self) -> &'static str {
        match self {
            FillType::Nothing => "NOTHING",
            FillType::Ngon => "NGON",
            FillType::TriFan => "TRIFAN",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "NOTHING" => Some(FillType::Nothing),
            "NGON" => Some(FillType::Ngon),
            "TRIFAN" => Some(FillType::TriFan),
            _ => None,
        }
    }
}

/// Supported light variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightType {
    Point,
    Sun,
    Spot,
    Area,
}

impl LightType {
    pub fn as_str(self) -> &'static str {
        match self {
            LightType::Point => "POINT",
            LightType::Sun => "SUN",
            LightType::Spot => "SPOT",
            LightType::Area => "AREA",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "POINT" => Some(LightType::Point),
            "SUN" => Some(LightType::Sun),
            "SPOT" => Some(LightType::Spot),
            "AREA" => Some(LightType::Area),
            _ => None,
        }
    }
}

/// Object payload by kind. Mesh dimensions are the primitive's base extents;
/// reported dimensions scale with the object's transform.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
    Mesh {
        primitive: Primitive,
        stats: MeshStats,
        base_dimensions: [f64; 3],
    },
    Camera {
        focal_length: f64,
    },
    Light {
        light_type: LightType,
        energy: f64,
        color: [f64; 3],
    },
    /// Text body plus its authoring parameters; glyph geometry is not modeled.
    Text {
        body: String,
        size: f64,
        extrude: f64,
    },
    /// A curve object with no spline data behind it.
    Curve,
}

impl ObjectKind {
    pub fn type_str(&self) -> &'static str {
        match self {
            ObjectKind::Mesh { .. } => "MESH",
            ObjectKind::Camera { .. } => "CAMERA",
            ObjectKind::Light { .. } => "LIGHT",
            ObjectKind::Text { .. } => "FONT",
            ObjectKind::Curve => "CURVE",
        }
    }
}

/// Simple principled-style material data.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub color: [f64; 4],
    pub metallic: f64,
    pub roughness: f64,
}

/// One object in the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub name: String,
    pub kind: ObjectKind,
    pub location: [f64; 3],
    /// Euler rotation in degrees, XYZ order.
    pub rotation_deg: [f64; 3],
    pub scale: [f64; 3],
    pub parent: Option<String>,
    pub material: Option<Material>,
    pub visible: bool,
}

impl SceneObject {
    fn new(name: impl Into<String>, kind: ObjectKind) -> Self {
        Self {
            name: name.into(),
            kind,
            location: [0.0; 3],
            rotation_deg: [0.0; 3],
            scale: [1.0; 3],
            parent: None,
            material: None,
            visible: true,
        }
    }

    pub fn cube(size: f64) -> Self {
        Self::new(
            Primitive::Cube.label(),
            ObjectKind::Mesh {
                primitive: Primitive::Cube,
                stats: MeshStats {
                    vertices: 8,
                    edges: 12,
                    polygons: 6,
                },
                base_dimensions: [size, size, size],
            },
        )
    }

    pub fn plane(size: f64) -> Self {
        Self::new(
            Primitive::Plane.label(),
            ObjectKind::Mesh {
                primitive: Primitive::Plane,
                stats: MeshStats {
                    vertices: 4,
                    edges: 4,
                    polygons: 1,
                },
                base_dimensions: [size, size, 0.0],
            },
        )
    }

    pub fn uv_sphere(radius: f64, segments: u64, ring_count: u64) -> Self {
        let stats = MeshStats {
            vertices: segments * (ring_count - 1) + 2,
            edges: segments * (2 * ring_count - 1),
            polygons: segments * ring_count,
        };
        Self::new(
            Primitive::UvSphere.label(),
            ObjectKind::Mesh {
                primitive: Primitive::UvSphere,
                stats,
                base_dimensions: [2.0 * radius; 3],
            },
        )
    }

    pub fn ico_sphere(radius: f64, subdivisions: u32) -> Self {
        // An icosahedron quadruples its faces per subdivision level.
        let quads = 4u64.pow(subdivisions.saturating_sub(1));
        let polygons = 20 * quads;
        let edges = 30 * quads;
        let vertices = 2 + edges - polygons;
        Self::new(
            Primitive::IcoSphere.label(),
            ObjectKind::Mesh {
                primitive: Primitive::IcoSphere,
                stats: MeshStats {
                    vertices,
                    edges,
                    polygons,
                },
                base_dimensions: [2.0 * radius; 3],
            },
        )
    }

    pub fn cylinder(radius: f64, depth: f64, vertices: u64) -> Self {
        let stats = MeshStats {
            vertices: 2 * vertices,
            edges: 3 * vertices,
            polygons: vertices + 2,
        };
        Self::new(
            Primitive::Cylinder.label(),
            ObjectKind::Mesh {
                primitive: Primitive::Cylinder,
                stats,
                base_dimensions: [2.0 * radius, 2.0 * radius, depth],
            },
        )
    }

    pub fn cone(radius1: f64, radius2: f64, depth: f64, vertices: u64) -> Self {
        let stats = if radius2 == 0.0 {
            MeshStats {
                vertices: vertices + 1,
                edges: 2 * vertices,
                polygons: vertices + 1,
            }
        } else {
            MeshStats {
                vertices: 2 * vertices,
                edges: 3 * vertices,
                polygons: vertices + 2,
            }
        };
        let footprint = 2.0 * radius1.max(radius2);
        Self::new(
            Primitive::Cone.label(),
            ObjectKind::Mesh {
                primitive: Primitive::Cone,
                stats,
                base_dimensions: [footprint, footprint, depth],
            },
        )
    }

    pub fn torus(
        major_radius: f64,
        minor_radius: f64,
        major_segments: u64,
        minor_segments: u64,
    ) -> Self {
        let ring = major_segments * minor_segments;
        let stats = MeshStats {
            vertices: ring,
            edges: 2 * ring,
            polygons: ring,
        };
        let outer = 2.0 * (major_radius + minor_radius);
        Self::new(
            Primitive::Torus.label(),
            ObjectKind::Mesh {
                primitive: Primitive::Torus,
                stats,
                base_dimensions: [outer, outer, 2.0 * minor_radius],
            },
        )
    }

    pub fn circle(radius: f64, vertices: u64, fill: FillType) -> Self {
        let stats = match fill {
            FillType::Nothing => MeshStats {
                vertices,
                edges: vertices,
                polygons: 0,
            },
            FillType::Ngon => MeshStats {
                vertices,
                edges: vertices,
                polygons: 1,
            },
            // Fan triangulation adds a centre vertex and a spoke per rim
            // vertex.
            FillType::TriFan => MeshStats {
                vertices: vertices + 1,
                edges: 2 * vertices,
                polygons: vertices,
            },
        };
        Self::new(
            Primitive::Circle.label(),
            ObjectKind::Mesh {
                primitive: Primitive::Circle,
                stats,
                base_dimensions: [2.0 * radius, 2.0 * radius, 0.0],
            },
        )
    }

    pub fn monkey() -> Self {
        Self::new(
            Primitive::Monkey.label(),
            ObjectKind::Mesh {
                primitive: Primitive::Monkey,
                stats: MeshStats {
                    vertices: 507,
                    edges: 1005,
                    polygons: 500,
                },
                base_dimensions: [2.73, 1.70, 1.97],
            },
        )
    }

    pub fn text(body: impl Into<String>, size: f64, extrude: f64) -> Self {
        Self::new(
            "Text",
            ObjectKind::Text {
                body: body.into(),
                size,
                extrude,
            },
        )
    }

    pub fn bezier_curve() -> Self {
        Self::new("BezierCurve", ObjectKind::Curve)
    }

    pub fn camera(focal_length: f64) -> Self {
        Self::new("Camera", ObjectKind::Camera { focal_length })
    }

    pub fn light(light_type: LightType, energy: f64, color: [f64; 3]) -> Self {
        Self::new("Light", ObjectKind::Light {
            light_type,
            energy,
            color,
        })
    }

    /// Extents after the object's scale is applied.
    pub fn dimensions(&self) -> [f64; 3] {
        let base = match &self.kind {
            ObjectKind::Mesh {
                base_dimensions, ..
            } => *base_dimensions,
            _ => [0.0; 3],
        };
        [
            base[0] * self.scale[0],
            base[1] * self.scale[1],
            base[2] * self.scale[2],
        ]
    }

    /// The short form returned by mutation commands.
    pub fn summary(&self) -> Value {
        json!({
            "name": self.name,
            "type": self.kind.type_str(),
            "location": self.location,
            "dimensions": self.dimensions(),
        })
    }
}

/// The whole document: a named scene plus its objects, insertion-ordered.
#[derive(Debug)]
pub struct SceneDocument {
    pub name: String,
    pub frame_current: i64,
    pub frame_start: i64,
    pub frame_end: i64,
    objects: Vec<SceneObject>,
    active_camera: Option<String>,
}

impl Default for SceneDocument {
    fn default() -> Self {
        Self {
            name: "Scene".to_string(),
            frame_current: 1,
            frame_start: 1,
            frame_end: 250,
            objects: Vec::new(),
            active_camera: None,
        }
    }
}

impl SceneDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn get(&self, name: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.name == name)
    }

    /// Insert an object, deduplicating its name with a `.001`-style suffix
    /// when the base name is taken.
    pub fn insert(&mut self, mut object: SceneObject) -> String {
        object.name = self.unique_name(&object.name);
        let name = object.name.clone();
        self.objects.push(object);
        name
    }

    fn unique_name(&self, base: &str) -> String {
        if self.get(base).is_none() {
            return base.to_string();
        }
        for n in 1u32.. {
            let candidate = format!("{base}.{n:03}");
            if self.get(&candidate).is_none() {
                return candidate;
            }
        }
        unreachable!("name space exhausted");
    }

    /// Remove an object, detaching any children and clearing the active
    /// camera slot if it pointed here.
    pub fn remove(&mut self, name: &str) -> Option<SceneObject> {
        let idx = self.objects.iter().position(|o| o.name == name)?;
        let removed = self.objects.remove(idx);
        for obj in &mut self.objects {
            if obj.parent.as_deref() == Some(name) {
                obj.parent = None;
            }
        }
        if self.active_camera.as_deref() == Some(name) {
            self.active_camera = None;
        }
        Some(removed)
    }

    /// Remove every object, optionally sparing cameras and lights. Returns
    /// removed names in scene order.
    pub fn clear(&mut self, keep_camera: bool, keep_lights: bool) -> Vec<String> {
        let doomed: Vec<String> = self
            .objects
            .iter()
            .filter(|o| {
                !(keep_camera && matches!(o.kind, ObjectKind::Camera { .. }))
                    && !(keep_lights && matches!(o.kind, ObjectKind::Light { .. }))
            })
            .map(|o| o.name.clone())
            .collect();
        for name in &doomed {
            self.remove(name);
        }
        doomed
    }

    pub fn children_of(&self, name: &str) -> Vec<String> {
        self.objects
            .iter()
            .filter(|o| o.parent.as_deref() == Some(name))
            .map(|o| o.name.clone())
            .collect()
    }

    pub fn active_camera(&self) -> Option<&str> {
        self.active_camera.as_deref()
    }

    pub fn set_active_camera(&mut self, name: Option<String>) {
        self.active_camera = name;
    }

    /// First camera in scene order, if any.
    pub fn find_camera(&self) -> Option<&SceneObject> {
        self.objects
            .iter()
            .find(|o| matches!(o.kind, ObjectKind::Camera { .. }))
    }

    pub fn counts(&self) -> (usize, usize, usize, usize) {
        let mut meshes = 0;
        let mut cameras = 0;
        let mut lights = 0;
        for obj in &self.objects {
            match obj.kind {
                ObjectKind::Mesh { .. } => meshes += 1,
                ObjectKind::Camera { .. } => cameras += 1,
                ObjectKind::Light { .. } => lights += 1,
                ObjectKind::Text { .. } | ObjectKind::Curve => {}
            }
        }
        (self.objects.len(), meshes, cameras, lights)
    }

    pub fn material_count(&self) -> usize {
        let mut names: Vec<&str> = self
            .objects
            .iter()
            .filter_map(|o| o.material.as_ref().map(|m| m.name.as_str()))
            .collect();
        names.sort_unstable();
        names.dedup();
        names.len()
    }
}
