//! The built-in command set and its registry wiring.
//!
//! Each handler is a plain `(&mut SceneDocument, &CommandParams)` function;
//! `register_scene_commands` closes each one over the shared document so the
//! registry sees the uniform handler signature. Handlers only ever run on the
//! host thread, so the document mutex is uncontended.

use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

use crate::bridge::protocol::CommandParams;
use crate::bridge::registry::{CommandFailure, CommandRegistry, CommandResult};
use crate::lock_or_recover;

use super::params::{
    bool_or, f64_or, opt_f64, opt_str, opt_vec3, require_f64, require_str, require_vec3, rgba_or,
    u64_or,
};
use super::{FillType, LightType, Material, ObjectKind, SceneDocument, SceneObject};

/// Register every built-in command. Panics on duplicate names, which would be
/// a wiring bug here.
pub fn register_scene_commands(registry: &mut CommandRegistry, doc: Arc<Mutex<SceneDocument>>) {
    registry.register("ping", |_params| cmd_ping());

    let mut on_doc = |name: &str,
                      f: fn(&mut SceneDocument, &CommandParams) -> CommandResult| {
        let doc = Arc::clone(&doc);
        registry.register(name, move |params| {
            f(&mut lock_or_recover(&doc, "scene document"), params)
        });
    };

    on_doc("list_objects", cmd_list_objects);
    on_doc("get_object_info", cmd_get_object_info);
    on_doc("delete_object", cmd_delete_object);
    on_doc("clear_scene", cmd_clear_scene);
    on_doc("get_scene_info", cmd_get_scene_info);

    on_doc("create_cube", cmd_create_cube);
    on_doc("create_plane", cmd_create_plane);
    on_doc("create_uv_sphere", cmd_create_uv_sphere);
    // Alias kept for clients that never learned the long name.
    on_doc("create_sphere", cmd_create_uv_sphere);
    on_doc("create_ico_sphere", cmd_create_ico_sphere);
    on_doc("create_cylinder", cmd_create_cylinder);
    on_doc("create_cone", cmd_create_cone);
    on_doc("create_torus", cmd_create_torus);
    on_doc("create_circle", cmd_create_circle);
    on_doc("create_monkey", cmd_create_monkey);
    on_doc("create_text", cmd_create_text);
    on_doc("create_bezier_curve", cmd_create_bezier_curve);

    on_doc("set_location", cmd_set_location);
    on_doc("set_rotation", cmd_set_rotation);
    on_doc("set_scale", cmd_set_scale);
    on_doc("translate", cmd_translate);
    on_doc("rotate", cmd_rotate);
    on_doc("scale", cmd_scale);

    on_doc("set_parent", cmd_set_parent);
    on_doc("clear_parent", cmd_clear_parent);
    on_doc("set_material", cmd_set_material);

    on_doc("add_light", cmd_add_light);
    on_doc("set_camera", cmd_set_camera);
}

fn not_found(name: &str) -> CommandFailure {
    CommandFailure::new(format!("Object '{name}' not found"))
}

/// Apply the optional `location` / `rotation` / `scale` parameters shared by
/// every creation command.
fn apply_transform(obj: &mut SceneObject, params: &CommandParams) -> Result<(), CommandFailure> {
    if let Some(location) = opt_vec3(params, "location")? {
        obj.location = location;
    }
    if let Some(rotation) = opt_vec3(params, "rotation")? {
        obj.rotation_deg = rotation;
    }
    if let Some(scale) = opt_vec3(params, "scale")? {
        obj.scale = scale;
    }
    Ok(())
}

fn insert_with_common(
    doc: &mut SceneDocument,
    mut obj: SceneObject,
    params: &CommandParams,
) -> CommandResult {
    if let Some(name) = opt_str(params, "name")? {
        obj.name = name.to_string();
    }
    apply_transform(&mut obj, params)?;
    let name = doc.insert(obj);
    Ok(doc.get(&name).map(|o| o.summary()).unwrap_or(Value::Null))
}

// ----------------------------------------------------------------------------
// Liveness
// ----------------------------------------------------------------------------

fn cmd_ping() -> CommandResult {
    Ok(json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// ----------------------------------------------------------------------------
// Scene queries
// ----------------------------------------------------------------------------

fn cmd_list_objects(doc: &mut SceneDocument, _params: &CommandParams) -> CommandResult {
    let objects: Vec<Value> = doc
        .objects()
        .iter()
        .map(|o| {
            json!({
                "name": o.name,
                "type": o.kind.type_str(),
                "location": o.location,
                "rotation_euler": o.rotation_deg,
                "scale": o.scale,
                "visible": o.visible,
            })
        })
        .collect();
    Ok(json!({ "count": objects.len(), "objects": objects }))
}

fn cmd_get_object_info(doc: &mut SceneDocument, params: &CommandParams) -> CommandResult {
    let name = require_str(params, "name")?;
    let obj = doc.get(name).ok_or_else(|| not_found(name))?;

    let mut fields = serde_json::Map::new();
    fields.insert("name".to_string(), json!(obj.name));
    fields.insert("type".to_string(), json!(obj.kind.type_str()));
    fields.insert("location".to_string(), json!(obj.location));
    fields.insert("rotation_euler".to_string(), json!(obj.rotation_deg));
    fields.insert("scale".to_string(), json!(obj.scale));
    fields.insert("dimensions".to_string(), json!(obj.dimensions()));
    fields.insert("visible".to_string(), json!(obj.visible));
    fields.insert("parent".to_string(), json!(obj.parent));
    fields.insert("children".to_string(), json!(doc.children_of(&obj.name)));
    match &obj.kind {
        ObjectKind::Mesh { stats, .. } => {
            fields.insert(
                "mesh".to_string(),
                json!({
                    "vertices": stats.vertices,
                    "edges": stats.edges,
                    "polygons": stats.polygons,
                }),
            );
        }
        ObjectKind::Camera { focal_length } => {
            fields.insert(
                "camera".to_string(),
                json!({ "focal_length": focal_length }),
            );
        }
        ObjectKind::Light {
            light_type,
            energy,
            color,
        } => {
            fields.insert(
                "light".to_string(),
                json!({
                    "type": light_type.as_str(),
                    "energy": energy,
                    "color": color,
                }),
            );
        }
        ObjectKind::Text {
            body,
            size,
            extrude,
        } => {
            fields.insert(
                "text".to_string(),
                json!({ "body": body, "size": size, "extrude": extrude }),
            );
        }
        ObjectKind::Curve => {
            fields.insert("curve".to_string(), json!({ "type": "BEZIER" }));
        }
    }
    if let Some(material) = &obj.material {
        fields.insert(
            "material".to_string(),
            json!({
                "name": material.name,
                "base_color": material.color,
                "metallic": material.metallic,
                "roughness": material.roughness,
            }),
        );
    }
    Ok(Value::Object(fields))
}

fn cmd_delete_object(doc: &mut SceneDocument, params: &CommandParams) -> CommandResult {
    let name = require_str(params, "name")?;
    doc.remove(name).ok_or_else(|| not_found(name))?;
    Ok(json!({ "deleted": name }))
}

fn cmd_clear_scene(doc: &mut SceneDocument, params: &CommandParams) -> CommandResult {
    let keep_camera = bool_or(params, "keep_camera", true)?;
    let keep_lights = bool_or(params, "keep_lights", true)?;
    let removed = doc.clear(keep_camera, keep_lights);
    Ok(json!({ "count": removed.len(), "removed": removed }))
}

fn cmd_get_scene_info(doc: &mut SceneDocument, _params: &CommandParams) -> CommandResult {
    let (objects, meshes, cameras, lights) = doc.counts();
    Ok(json!({
        "name": doc.name,
        "frame_current": doc.frame_current,
        "frame_start": doc.frame_start,
        "frame_end": doc.frame_end,
        "objects_count": objects,
        "meshes_count": meshes,
        "cameras_count": cameras,
        "lights_count": lights,
        "materials_count": doc.material_count(),
        "active_camera": doc.active_camera(),
    }))
}

// ----------------------------------------------------------------------------
// Primitive creation
// ----------------------------------------------------------------------------

fn cmd_create_cube(doc: &mut SceneDocument, params: &CommandParams) -> CommandResult {
    let size = f64_or(params, "size", 2.0)?;
    insert_with_common(doc, SceneObject::cube(size), params)
}

fn cmd_create_plane(doc: &mut SceneDocument, params: &CommandParams) -> CommandResult {
    let size = f64_or(params, "size", 2.0)?;
    insert_with_common(doc, SceneObject::plane(size), params)
}

fn cmd_create_uv_sphere(doc: &mut SceneDocument, params: &CommandParams) -> CommandResult {
    let radius = f64_or(params, "radius", 1.0)?;
    let segments = u64_or(params, "segments", 32)?.max(3);
    let ring_count = u64_or(params, "ring_count", 16)?.max(2);
    insert_with_common(doc, SceneObject::uv_sphere(radius, segments, ring_count), params)
}

fn cmd_create_ico_sphere(doc: &mut SceneDocument, params: &CommandParams) -> CommandResult {
    let radius = f64_or(params, "radius", 1.0)?;
    let subdivisions = u64_or(params, "subdivisions", 2)?.min(8) as u32;
    insert_with_common(doc, SceneObject::ico_sphere(radius, subdivisions), params)
}

fn cmd_create_cylinder(doc: &mut SceneDocument, params: &CommandParams) -> CommandResult {
    let radius = f64_or(params, "radius", 1.0)?;
    let depth = f64_or(params, "depth", 2.0)?;
    let vertices = u64_or(params, "vertices", 32)?.max(3);
    insert_with_common(doc, SceneObject::cylinder(radius, depth, vertices), params)
}

fn cmd_create_cone(doc: &mut SceneDocument, params: &CommandParams) -> CommandResult {
    let radius1 = f64_or(params, "radius1", 1.0)?;
    let radius2 = f64_or(params, "radius2", 0.0)?;
    let depth = f64_or(params, "depth", 2.0)?;
    let vertices = u64_or(params, "vertices", 32)?.max(3);
    insert_with_common(doc, SceneObject::cone(radius1, radius2, depth, vertices), params)
}

fn cmd_create_torus(doc: &mut SceneDocument, params: &CommandParams) -> CommandResult {
    let major_radius = f64_or(params, "major_radius", 1.0)?;
    let minor_radius = f64_or(params, "minor_radius", 0.25)?;
    let major_segments = u64_or(params, "major_segments", 48)?.max(3);
    let minor_segments = u64_or(params, "minor_segments", 12)?.max(3);
    insert_with_common(
        doc,
        SceneObject::torus(major_radius, minor_radius, major_segments, minor_segments),
        params,
    )
}

fn cmd_create_circle(doc: &mut SceneDocument, params: &CommandParams) -> CommandResult {
    let radius = f64_or(params, "radius", 1.0)?;
    let vertices = u64_or(params, "vertices", 32)?.max(3);
    let fill_str = opt_str(params, "fill_type")?.unwrap_or("NOTHING");
    let fill = FillType::from_str(fill_str).ok_or_else(|| {
        CommandFailure::new(format!(
            "Unknown fill type '{fill_str}' (expected NOTHING, NGON, or TRIFAN)"
        ))
    })?;
    insert_with_common(doc, SceneObject::circle(radius, vertices, fill), params)
}

fn cmd_create_monkey(doc: &mut SceneDocument, params: &CommandParams) -> CommandResult {
    insert_with_common(doc, SceneObject::monkey(), params)
}

fn cmd_create_text(doc: &mut SceneDocument, params: &CommandParams) -> CommandResult {
    let body = opt_str(params, "text")?.unwrap_or("Hello");
    let size = f64_or(params, "size", 1.0)?;
    let extrude = f64_or(params, "extrude", 0.0)?;
    insert_with_common(doc, SceneObject::text(body, size, extrude), params)
}

fn cmd_create_bezier_curve(doc: &mut SceneDocument, params: &CommandParams) -> CommandResult {
    insert_with_common(doc, SceneObject::bezier_curve(), params)
}

// ----------------------------------------------------------------------------
// Transforms
// ----------------------------------------------------------------------------

fn cmd_set_location(doc: &mut SceneDocument, params: &CommandParams) -> CommandResult {
    let name = require_str(params, "name")?;
    let location = require_vec3(params, "location")?;
    let obj = doc.get_mut(name).ok_or_else(|| not_found(name))?;
    obj.location = location;
    Ok(obj.summary())
}

fn cmd_set_rotation(doc: &mut SceneDocument, params: &CommandParams) -> CommandResult {
    let name = require_str(params, "name")?;
    let rotation = require_vec3(params, "rotation")?;
    let obj = doc.get_mut(name).ok_or_else(|| not_found(name))?;
    obj.rotation_deg = rotation;
    Ok(obj.summary())
}

fn cmd_set_scale(doc: &mut SceneDocument, params: &CommandParams) -> CommandResult {
    let name = require_str(params, "name")?;
    let scale = require_vec3(params, "scale")?;
    let obj = doc.get_mut(name).ok_or_else(|| not_found(name))?;
    obj.scale = scale;
    Ok(obj.summary())
}

fn cmd_translate(doc: &mut SceneDocument, params: &CommandParams) -> CommandResult {
    let name = require_str(params, "name")?;
    let offset = require_vec3(params, "offset")?;
    let obj = doc.get_mut(name).ok_or_else(|| not_found(name))?;
    for axis in 0..3 {
        obj.location[axis] += offset[axis];
    }
    Ok(obj.summary())
}

fn cmd_rotate(doc: &mut SceneDocument, params: &CommandParams) -> CommandResult {
    let name = require_str(params, "name")?;
    let angle = require_f64(params, "angle")?;
    let axis = opt_str(params, "axis")?.unwrap_or("Z");
    let idx = match axis.to_uppercase().as_str() {
        "X" => 0,
        "Y" => 1,
        "Z" => 2,
        other => {
            return Err(CommandFailure::new(format!(
                "Unknown axis '{other}' (expected X, Y, or Z)"
            )))
        }
    };
    let obj = doc.get_mut(name).ok_or_else(|| not_found(name))?;
    obj.rotation_deg[idx] += angle;
    Ok(obj.summary())
}

fn cmd_scale(doc: &mut SceneDocument, params: &CommandParams) -> CommandResult {
    let name = require_str(params, "name")?;
    let factor = match params.get("factor") {
        None => return Err(CommandFailure::new("Missing required parameter 'factor'")),
        Some(value) => {
            if let Some(scalar) = value.as_f64() {
                [scalar; 3]
            } else {
                require_vec3(params, "factor")?
            }
        }
    };
    let obj = doc.get_mut(name).ok_or_else(|| not_found(name))?;
    for axis in 0..3 {
        obj.scale[axis] *= factor[axis];
    }
    Ok(obj.summary())
}

// ----------------------------------------------------------------------------
// Hierarchy and materials
// ----------------------------------------------------------------------------

fn cmd_set_parent(doc: &mut SceneDocument, params: &CommandParams) -> CommandResult {
    let child = require_str(params, "child")?;
    let parent = require_str(params, "parent")?;
    if child == parent {
        return Err(CommandFailure::new(format!(
            "Object '{child}' cannot be its own parent"
        )));
    }
    if doc.get(parent).is_none() {
        return Err(not_found(parent));
    }
    let obj = doc.get_mut(child).ok_or_else(|| not_found(child))?;
    obj.parent = Some(parent.to_string());
    Ok(json!({ "child": child, "parent": parent }))
}

fn cmd_clear_parent(doc: &mut SceneDocument, params: &CommandParams) -> CommandResult {
    let name = require_str(params, "name")?;
    let obj = doc.get_mut(name).ok_or_else(|| not_found(name))?;
    obj.parent = None;
    Ok(json!({ "object": name, "parent": Value::Null }))
}

fn cmd_set_material(doc: &mut SceneDocument, params: &CommandParams) -> CommandResult {
    let name = require_str(params, "name")?;
    let material_name = opt_str(params, "material_name")?
        .map(str::to_string)
        .unwrap_or_else(|| format!("{name}_mat"));
    let color = rgba_or(params, "color", [0.8, 0.8, 0.8, 1.0])?;
    let metallic = f64_or(params, "metallic", 0.0)?;
    let roughness = f64_or(params, "roughness", 0.5)?;

    let obj = doc.get_mut(name).ok_or_else(|| not_found(name))?;
    obj.material = Some(Material {
        name: material_name.clone(),
        color,
        metallic,
        roughness,
    });
    Ok(json!({ "object": name, "material": material_name, "color": color }))
}

// ----------------------------------------------------------------------------
// Lights and camera
// ----------------------------------------------------------------------------

fn cmd_add_light(doc: &mut SceneDocument, params: &CommandParams) -> CommandResult {
    let type_str = opt_str(params, "type")?.unwrap_or("POINT");
    let light_type = LightType::from_str(type_str).ok_or_else(|| {
        CommandFailure::new(format!(
            "Unknown light type '{type_str}' (expected POINT, SUN, SPOT, or AREA)"
        ))
    })?;
    let energy = f64_or(params, "energy", 1000.0)?;
    let color = opt_vec3(params, "color")?.unwrap_or([1.0, 1.0, 1.0]);
    let location = opt_vec3(params, "location")?.unwrap_or([0.0, 0.0, 5.0]);

    let mut light = SceneObject::light(light_type, energy, color);
    if let Some(name) = opt_str(params, "name")? {
        light.name = name.to_string();
    }
    light.location = location;
    let name = doc.insert(light);
    Ok(json!({ "light": name, "type": light_type.as_str(), "energy": energy }))
}

fn cmd_set_camera(doc: &mut SceneDocument, params: &CommandParams) -> CommandResult {
    let name = match doc.find_camera() {
        Some(cam) => cam.name.clone(),
        None => doc.insert(SceneObject::camera(50.0)),
    };

    let focal_length = opt_f64(params, "focal_length")?;
    let location = opt_vec3(params, "location")?;
    let rotation = opt_vec3(params, "rotation")?;

    let cam = doc.get_mut(&name).ok_or_else(|| not_found(&name))?;
    if let Some(location) = location {
        cam.location = location;
    }
    if let Some(rotation) = rotation {
        cam.rotation_deg = rotation;
    }
    if let Some(focal_length) = focal_length {
        if let ObjectKind::Camera {
            focal_length: ref mut lens,
        } = cam.kind
        {
            *lens = focal_length;
        }
    }
    let location = cam.location;
    doc.set_active_camera(Some(name.clone()));
    Ok(json!({ "camera": name, "location": location }))
}
