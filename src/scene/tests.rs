use super::*;
use crate::bridge::protocol::CommandParams;
use crate::bridge::registry::CommandRegistry;
use serde_json::json;
use std::sync::{Arc, Mutex};

fn registry_with_scene() -> (CommandRegistry, Arc<Mutex<SceneDocument>>) {
    let doc = Arc::new(Mutex::new(SceneDocument::new()));
    let mut registry = CommandRegistry::new();
    register_scene_commands(&mut registry, Arc::clone(&doc));
    (registry, doc)
}

fn call(
    registry: &CommandRegistry,
    name: &str,
    params: serde_json::Value,
) -> Result<serde_json::Value, crate::bridge::registry::CommandFailure> {
    let params: CommandParams = params.as_object().cloned().unwrap_or_default();
    let handler = registry.resolve(name).expect("command registered");
    handler(&params)
}

#[test]
fn ping_reports_alive() {
    let (registry, _doc) = registry_with_scene();
    let result = call(&registry, "ping", json!({})).unwrap();
    assert_eq!(result["status"], "alive");
    assert_eq!(result["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn create_cube_defaults() {
    let (registry, doc) = registry_with_scene();
    let result = call(&registry, "create_cube", json!({})).unwrap();
    assert_eq!(result["name"], "Cube");
    assert_eq!(result["type"], "MESH");
    assert_eq!(result["dimensions"], json!([2.0, 2.0, 2.0]));

    let doc = doc.lock().unwrap();
    let cube = doc.get("Cube").unwrap();
    match &cube.kind {
        ObjectKind::Mesh { stats, .. } => {
            assert_eq!(stats.vertices, 8);
            assert_eq!(stats.edges, 12);
            assert_eq!(stats.polygons, 6);
        }
        other => panic!("expected mesh, got {other:?}"),
    }
}

#[test]
fn create_with_name_and_transform() {
    let (registry, doc) = registry_with_scene();
    let result = call(
        &registry,
        "create_cube",
        json!({
            "name": "Crate",
            "size": 1.0,
            "location": [1.0, 2.0, 3.0],
            "rotation": [0.0, 0.0, 45.0],
            "scale": [2.0, 2.0, 2.0],
        }),
    )
    .unwrap();
    assert_eq!(result["name"], "Crate");
    assert_eq!(result["location"], json!([1.0, 2.0, 3.0]));
    assert_eq!(result["dimensions"], json!([2.0, 2.0, 2.0]));

    let doc = doc.lock().unwrap();
    let obj = doc.get("Crate").unwrap();
    assert_eq!(obj.rotation_deg, [0.0, 0.0, 45.0]);
}

#[test]
fn duplicate_names_get_suffixes() {
    let (registry, _doc) = registry_with_scene();
    let first = call(&registry, "create_cube", json!({})).unwrap();
    let second = call(&registry, "create_cube", json!({})).unwrap();
    let third = call(&registry, "create_cube", json!({})).unwrap();
    assert_eq!(first["name"], "Cube");
    assert_eq!(second["name"], "Cube.001");
    assert_eq!(third["name"], "Cube.002");
}

#[test]
fn sphere_alias_matches_uv_sphere() {
    let (registry, doc) = registry_with_scene();
    call(&registry, "create_sphere", json!({ "name": "A" })).unwrap();
    call(&registry, "create_uv_sphere", json!({ "name": "B" })).unwrap();
    let doc = doc.lock().unwrap();
    let (a, b) = (doc.get("A").unwrap(), doc.get("B").unwrap());
    assert_eq!(a.kind, b.kind);
}

#[test]
fn uv_sphere_default_topology() {
    let obj = SceneObject::uv_sphere(1.0, 32, 16);
    match obj.kind {
        ObjectKind::Mesh { stats, .. } => {
            assert_eq!(stats.vertices, 482);
            assert_eq!(stats.polygons, 512);
        }
        _ => panic!("expected mesh"),
    }
}

#[test]
fn ico_sphere_euler_consistent() {
    let obj = SceneObject::ico_sphere(1.0, 2);
    match obj.kind {
        ObjectKind::Mesh { stats, .. } => {
            assert_eq!(stats.polygons, 80);
            assert_eq!(stats.edges, 120);
            assert_eq!(stats.vertices, 42);
        }
        _ => panic!("expected mesh"),
    }
}

#[test]
fn circle_topology_follows_fill_type() {
    let open = SceneObject::circle(1.0, 32, FillType::Nothing);
    match open.kind {
        ObjectKind::Mesh { stats, .. } => {
            assert_eq!(stats.vertices, 32);
            assert_eq!(stats.edges, 32);
            assert_eq!(stats.polygons, 0);
        }
        _ => panic!("expected mesh"),
    }

    let fan = SceneObject::circle(1.0, 32, FillType::TriFan);
    match fan.kind {
        ObjectKind::Mesh { stats, .. } => {
            assert_eq!(stats.vertices, 33);
            assert_eq!(stats.edges, 64);
            assert_eq!(stats.polygons, 32);
        }
        _ => panic!("expected mesh"),
    }
}

#[test]
fn create_circle_validates_fill_type() {
    let (registry, _doc) = registry_with_scene();
    let result = call(&registry, "create_circle", json!({ "fill_type": "ngon" })).unwrap();
    assert_eq!(result["name"], "Circle");
    let failure = call(&registry, "create_circle", json!({ "fill_type": "SOLID" })).unwrap_err();
    assert!(failure.message.contains("Unknown fill type"));
}

#[test]
fn monkey_has_suzanne_topology() {
    let (registry, doc) = registry_with_scene();
    let result = call(&registry, "create_monkey", json!({})).unwrap();
    assert_eq!(result["name"], "Suzanne");
    assert_eq!(result["type"], "MESH");

    let doc = doc.lock().unwrap();
    match &doc.get("Suzanne").unwrap().kind {
        ObjectKind::Mesh { stats, .. } => {
            assert_eq!(stats.vertices, 507);
            assert_eq!(stats.edges, 1005);
            assert_eq!(stats.polygons, 500);
        }
        other => panic!("expected mesh, got {other:?}"),
    }
}

#[test]
fn create_text_carries_body_and_extrude() {
    let (registry, _doc) = registry_with_scene();
    let result = call(
        &registry,
        "create_text",
        json!({ "text": "Kilroy", "size": 2.0, "extrude": 0.1 }),
    )
    .unwrap();
    assert_eq!(result["name"], "Text");
    assert_eq!(result["type"], "FONT");

    let info = call(&registry, "get_object_info", json!({ "name": "Text" })).unwrap();
    assert_eq!(info["text"]["body"], "Kilroy");
    assert_eq!(info["text"]["size"], 2.0);
    assert_eq!(info["text"]["extrude"], 0.1);

    let defaulted = call(&registry, "create_text", json!({})).unwrap();
    assert_eq!(defaulted["name"], "Text.001");
    let info = call(&registry, "get_object_info", json!({ "name": "Text.001" })).unwrap();
    assert_eq!(info["text"]["body"], "Hello");
}

#[test]
fn bezier_curve_is_not_a_mesh() {
    let (registry, doc) = registry_with_scene();
    let result = call(&registry, "create_bezier_curve", json!({})).unwrap();
    assert_eq!(result["name"], "BezierCurve");
    assert_eq!(result["type"], "CURVE");

    let info = call(&registry, "get_object_info", json!({ "name": "BezierCurve" })).unwrap();
    assert_eq!(info["curve"]["type"], "BEZIER");

    let (total, meshes, _, _) = doc.lock().unwrap().counts();
    assert_eq!(total, 1);
    assert_eq!(meshes, 0);
}

#[test]
fn list_objects_reports_all() {
    let (registry, _doc) = registry_with_scene();
    call(&registry, "create_cube", json!({})).unwrap();
    call(&registry, "create_plane", json!({})).unwrap();
    let result = call(&registry, "list_objects", json!({})).unwrap();
    assert_eq!(result["count"], 2);
    let names: Vec<&str> = result["objects"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Cube", "Plane"]);
}

#[test]
fn get_object_info_unknown_fails() {
    let (registry, _doc) = registry_with_scene();
    let failure = call(&registry, "get_object_info", json!({ "name": "Ghost" })).unwrap_err();
    assert_eq!(failure.message, "Object 'Ghost' not found");
}

#[test]
fn get_object_info_includes_children_and_mesh() {
    let (registry, _doc) = registry_with_scene();
    call(&registry, "create_cube", json!({ "name": "Parent" })).unwrap();
    call(&registry, "create_cube", json!({ "name": "Child" })).unwrap();
    call(
        &registry,
        "set_parent",
        json!({ "child": "Child", "parent": "Parent" }),
    )
    .unwrap();

    let info = call(&registry, "get_object_info", json!({ "name": "Parent" })).unwrap();
    assert_eq!(info["children"], json!(["Child"]));
    assert_eq!(info["mesh"]["vertices"], 8);

    let child = call(&registry, "get_object_info", json!({ "name": "Child" })).unwrap();
    assert_eq!(child["parent"], "Parent");
}

#[test]
fn delete_object_detaches_children() {
    let (registry, doc) = registry_with_scene();
    call(&registry, "create_cube", json!({ "name": "Parent" })).unwrap();
    call(&registry, "create_cube", json!({ "name": "Child" })).unwrap();
    call(
        &registry,
        "set_parent",
        json!({ "child": "Child", "parent": "Parent" }),
    )
    .unwrap();
    let result = call(&registry, "delete_object", json!({ "name": "Parent" })).unwrap();
    assert_eq!(result["deleted"], "Parent");

    let doc = doc.lock().unwrap();
    assert!(doc.get("Parent").is_none());
    assert_eq!(doc.get("Child").unwrap().parent, None);
}

#[test]
fn clear_scene_spares_camera_and_lights_by_default() {
    let (registry, doc) = registry_with_scene();
    call(&registry, "create_cube", json!({})).unwrap();
    call(&registry, "add_light", json!({})).unwrap();
    call(&registry, "set_camera", json!({})).unwrap();

    let result = call(&registry, "clear_scene", json!({})).unwrap();
    assert_eq!(result["count"], 1);
    assert_eq!(result["removed"], json!(["Cube"]));

    let result = call(
        &registry,
        "clear_scene",
        json!({ "keep_camera": false, "keep_lights": false }),
    )
    .unwrap();
    assert_eq!(result["count"], 2);
    assert!(doc.lock().unwrap().objects().is_empty());
}

#[test]
fn transforms_accumulate() {
    let (registry, doc) = registry_with_scene();
    call(&registry, "create_cube", json!({ "name": "C" })).unwrap();
    call(
        &registry,
        "translate",
        json!({ "name": "C", "offset": [1.0, 0.0, 0.0] }),
    )
    .unwrap();
    call(
        &registry,
        "translate",
        json!({ "name": "C", "offset": [0.5, 0.0, 2.0] }),
    )
    .unwrap();
    call(&registry, "rotate", json!({ "name": "C", "angle": 30.0 })).unwrap();
    call(
        &registry,
        "rotate",
        json!({ "name": "C", "angle": 15.0, "axis": "x" }),
    )
    .unwrap();
    call(&registry, "scale", json!({ "name": "C", "factor": 2.0 })).unwrap();
    call(
        &registry,
        "scale",
        json!({ "name": "C", "factor": [1.0, 3.0, 1.0] }),
    )
    .unwrap();

    let doc = doc.lock().unwrap();
    let obj = doc.get("C").unwrap();
    assert_eq!(obj.location, [1.5, 0.0, 2.0]);
    assert_eq!(obj.rotation_deg, [15.0, 0.0, 30.0]);
    assert_eq!(obj.scale, [2.0, 6.0, 2.0]);
}

#[test]
fn rotate_rejects_bad_axis() {
    let (registry, _doc) = registry_with_scene();
    call(&registry, "create_cube", json!({ "name": "C" })).unwrap();
    let failure = call(
        &registry,
        "rotate",
        json!({ "name": "C", "angle": 10.0, "axis": "W" }),
    )
    .unwrap_err();
    assert!(failure.message.contains("Unknown axis"));
}

#[test]
fn set_transforms_overwrite() {
    let (registry, doc) = registry_with_scene();
    call(&registry, "create_cube", json!({ "name": "C" })).unwrap();
    call(
        &registry,
        "set_location",
        json!({ "name": "C", "location": [9.0, 9.0, 9.0] }),
    )
    .unwrap();
    call(
        &registry,
        "set_rotation",
        json!({ "name": "C", "rotation": [0.0, 90.0, 0.0] }),
    )
    .unwrap();
    call(
        &registry,
        "set_scale",
        json!({ "name": "C", "scale": [1.0, 2.0, 3.0] }),
    )
    .unwrap();
    let doc = doc.lock().unwrap();
    let obj = doc.get("C").unwrap();
    assert_eq!(obj.location, [9.0, 9.0, 9.0]);
    assert_eq!(obj.rotation_deg, [0.0, 90.0, 0.0]);
    assert_eq!(obj.scale, [1.0, 2.0, 3.0]);
}

#[test]
fn set_parent_rejects_self() {
    let (registry, _doc) = registry_with_scene();
    call(&registry, "create_cube", json!({ "name": "C" })).unwrap();
    let failure = call(
        &registry,
        "set_parent",
        json!({ "child": "C", "parent": "C" }),
    )
    .unwrap_err();
    assert!(failure.message.contains("cannot be its own parent"));
}

#[test]
fn clear_parent_round_trip() {
    let (registry, doc) = registry_with_scene();
    call(&registry, "create_cube", json!({ "name": "A" })).unwrap();
    call(&registry, "create_cube", json!({ "name": "B" })).unwrap();
    call(
        &registry,
        "set_parent",
        json!({ "child": "B", "parent": "A" }),
    )
    .unwrap();
    call(&registry, "clear_parent", json!({ "name": "B" })).unwrap();
    assert_eq!(doc.lock().unwrap().get("B").unwrap().parent, None);
}

#[test]
fn set_material_defaults() {
    let (registry, doc) = registry_with_scene();
    call(&registry, "create_cube", json!({ "name": "C" })).unwrap();
    let result = call(&registry, "set_material", json!({ "name": "C" })).unwrap();
    assert_eq!(result["material"], "C_mat");
    assert_eq!(result["color"], json!([0.8, 0.8, 0.8, 1.0]));

    let doc = doc.lock().unwrap();
    let material = doc.get("C").unwrap().material.as_ref().unwrap();
    assert_eq!(material.metallic, 0.0);
    assert_eq!(material.roughness, 0.5);
}

#[test]
fn set_material_accepts_rgb() {
    let (registry, doc) = registry_with_scene();
    call(&registry, "create_cube", json!({ "name": "C" })).unwrap();
    call(
        &registry,
        "set_material",
        json!({ "name": "C", "material_name": "Red", "color": [1.0, 0.0, 0.0] }),
    )
    .unwrap();
    let doc = doc.lock().unwrap();
    let material = doc.get("C").unwrap().material.as_ref().unwrap();
    assert_eq!(material.color, [1.0, 0.0, 0.0, 1.0]);
}

#[test]
fn add_light_validates_type() {
    let (registry, _doc) = registry_with_scene();
    let result = call(&registry, "add_light", json!({ "type": "sun" })).unwrap();
    assert_eq!(result["type"], "SUN");
    let failure = call(&registry, "add_light", json!({ "type": "LASER" })).unwrap_err();
    assert!(failure.message.contains("Unknown light type"));
}

#[test]
fn set_camera_creates_then_reuses() {
    let (registry, doc) = registry_with_scene();
    let first = call(
        &registry,
        "set_camera",
        json!({ "location": [0.0, -5.0, 2.0], "focal_length": 85.0 }),
    )
    .unwrap();
    assert_eq!(first["camera"], "Camera");
    let second = call(&registry, "set_camera", json!({ "location": [1.0, 1.0, 1.0] })).unwrap();
    assert_eq!(second["camera"], "Camera");

    let doc = doc.lock().unwrap();
    let (total, _, cameras, _) = doc.counts();
    assert_eq!(total, 1);
    assert_eq!(cameras, 1);
    assert_eq!(doc.active_camera(), Some("Camera"));
    match doc.get("Camera").unwrap().kind {
        ObjectKind::Camera { focal_length } => assert_eq!(focal_length, 85.0),
        _ => panic!("expected camera"),
    }
}

#[test]
fn set_camera_without_focal_keeps_lens() {
    let (registry, doc) = registry_with_scene();
    call(&registry, "set_camera", json!({ "focal_length": 85.0 })).unwrap();
    // A move-only update must not touch the lens.
    call(&registry, "set_camera", json!({ "location": [3.0, 0.0, 1.0] })).unwrap();

    let doc = doc.lock().unwrap();
    match doc.get("Camera").unwrap().kind {
        ObjectKind::Camera { focal_length } => assert_eq!(focal_length, 85.0),
        _ => panic!("expected camera"),
    }
}

#[test]
fn set_camera_rejects_non_numeric_focal() {
    let (registry, _doc) = registry_with_scene();
    let failure = call(&registry, "set_camera", json!({ "focal_length": "wide" })).unwrap_err();
    assert!(failure.message.contains("'focal_length' must be a number"));
}

#[test]
fn scene_info_counts() {
    let (registry, _doc) = registry_with_scene();
    call(&registry, "create_cube", json!({})).unwrap();
    call(&registry, "create_plane", json!({})).unwrap();
    call(&registry, "add_light", json!({})).unwrap();
    call(&registry, "set_material", json!({ "name": "Cube" })).unwrap();
    let info = call(&registry, "get_scene_info", json!({})).unwrap();
    assert_eq!(info["name"], "Scene");
    assert_eq!(info["objects_count"], 3);
    assert_eq!(info["meshes_count"], 2);
    assert_eq!(info["lights_count"], 1);
    assert_eq!(info["materials_count"], 1);
    assert_eq!(info["frame_start"], 1);
    assert_eq!(info["frame_end"], 250);
}

#[test]
fn wrong_typed_parameter_fails() {
    let (registry, _doc) = registry_with_scene();
    let failure = call(&registry, "create_cube", json!({ "size": "big" })).unwrap_err();
    assert!(failure.message.contains("'size' must be a number"));
    let failure = call(
        &registry,
        "create_cube",
        json!({ "location": [1.0, 2.0] }),
    )
    .unwrap_err();
    assert!(failure.message.contains("exactly 3 components"));
}
