use std::fs;
use std::path::Path;

use crate::asset_map::AssetMap;
use crate::doc::{self, Value};
use crate::gd::{GdDoc, GdNode, GdProp, NodeKind};
use crate::{util, Error, Result, Vec3, Vec4, F};

/// A named node in the source hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceObject {
    pub name: String,
    pub position: Vec3,
    pub rotation: Vec4,
    pub scale: Vec3,
    pub components: Vec<Component>,
    pub children: Vec<SourceObject>,
}

/// One typed data block attached to a source object. The tag is the
/// component's `Type` key; the fields keep the whole map.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub tag: String,
    pub fields: Value,
}

impl SourceObject {
    pub fn from_value(v: &Value) -> Self {
        let vec3 = |key, default| {
            v.get(key)
                .and_then(Value::as_vec3)
                .map(|c| c.map(|x| x as F))
                .unwrap_or(default)
        };
        let rotation = v
            .get("Rotation")
            .and_then(Value::as_vec4)
            .map(|c| c.map(|x| x as F))
            .unwrap_or([0., 0., 0., 1.]);

        let mut components = vec![];
        for c in v.get("Components").and_then(Value::as_list).unwrap_or(&[]) {
            let Some(tag) = c.get("Type").and_then(Value::as_str) else {
                log::warn!("component without a Type tag, skipping");
                continue;
            };
            components.push(Component {
                tag: tag.to_string(),
                fields: c.clone(),
            });
        }

        let children = v
            .get("Children")
            .and_then(Value::as_list)
            .unwrap_or(&[])
            .iter()
            .map(Self::from_value)
            .collect();

        Self {
            name: v
                .get("Name")
                .and_then(Value::as_str)
                .unwrap_or("GameObject")
                .to_string(),
            position: vec3("Position", [0.; 3]),
            rotation,
            scale: vec3("Scale", [1.; 3]),
            components,
            children,
        }
    }
}

/// Component tags with a conversion rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ComponentKind {
    Transform,
    MeshFilter,
    MeshRenderer,
    Camera,
    Light,
    Rigidbody,
    BoxCollider,
    SphereCollider,
    CapsuleCollider,
    ParticleSystem,
    Canvas,
    RectTransform,
    Image,
    Text,
    Button,
    MonoBehaviour,
}

fn component_kind(tag: &str) -> Option<ComponentKind> {
    use ComponentKind::*;
    Some(match tag {
        "Transform" => Transform,
        "MeshFilter" => MeshFilter,
        "MeshRenderer" => MeshRenderer,
        "Camera" => Camera,
        "Light" => Light,
        "Rigidbody" => Rigidbody,
        "BoxCollider" => BoxCollider,
        "SphereCollider" => SphereCollider,
        "CapsuleCollider" => CapsuleCollider,
        "ParticleSystem" => ParticleSystem,
        "Canvas" => Canvas,
        "RectTransform" => RectTransform,
        "Image" => Image,
        "Text" => Text,
        "Button" => Button,
        "MonoBehaviour" => MonoBehaviour,
        _ => return None,
    })
}

/// Closed source-component to target-node-type table. The first component
/// whose tag appears here decides the node type; component order is the
/// priority signal.
fn primary_kind(tag: &str) -> Option<NodeKind> {
    Some(match tag {
        "Transform" => NodeKind::Node3D,
        "MeshRenderer" => NodeKind::MeshInstance3D,
        "Camera" => NodeKind::Camera3D,
        "Light" => NodeKind::Light3D,
        "Rigidbody" => NodeKind::RigidBody3D,
        "BoxCollider" | "SphereCollider" | "CapsuleCollider" => NodeKind::CollisionShape3D,
        "Canvas" => NodeKind::CanvasLayer,
        "RectTransform" => NodeKind::Control,
        "Image" => NodeKind::TextureRect,
        "Text" => NodeKind::Label,
        "Button" => NodeKind::Button,
        "ParticleSystem" => NodeKind::GpuParticles3D,
        _ => return None,
    })
}

pub fn resolve_kind(components: &[Component]) -> NodeKind {
    components
        .iter()
        .find_map(|c| primary_kind(&c.tag))
        .unwrap_or(NodeKind::Node3D)
}

/// Accumulates one target node while components are applied. The kind may
/// still be rewritten (lights, kinematic rigid bodies) until `build`.
struct NodeBuilder {
    kind: NodeKind,
    name: String,
    props: Vec<(String, GdProp)>,
    children: Vec<GdNode>,
}

impl NodeBuilder {
    fn new(kind: NodeKind, name: &str) -> Self {
        Self {
            kind,
            name: name.to_string(),
            props: vec![],
            children: vec![],
        }
    }

    fn prop(&mut self, key: impl Into<String>, v: GdProp) {
        self.props.push((key.into(), v));
    }

    fn child(&mut self, node: GdNode) {
        self.children.push(node);
    }

    fn build(self) -> GdNode {
        GdNode {
            kind: self.kind,
            name: self.name,
            props: self.props,
            children: self.children,
        }
    }
}

/// Convert one source object (components, then children, in order) into one
/// target node.
pub fn convert_object(obj: &SourceObject, assets: &AssetMap) -> GdNode {
    let mut b = NodeBuilder::new(resolve_kind(&obj.components), &obj.name);
    transform_props(obj, &mut b);
    for c in &obj.components {
        apply_component(c, &mut b, assets);
    }
    let mut node = b.build();
    for child in &obj.children {
        node.children.push(convert_object(child, assets));
    }
    node
}

fn transform_props(obj: &SourceObject, b: &mut NodeBuilder) {
    if obj.position != [0.; 3] {
        b.prop("position", GdProp::Vector3(obj.position));
    }
    if obj.rotation != [0., 0., 0., 1.] {
        b.prop("quaternion", GdProp::Quaternion(obj.rotation));
    }
    if obj.scale != [1.; 3] {
        b.prop("scale", GdProp::Vector3(obj.scale));
    }
}

fn apply_component(c: &Component, b: &mut NodeBuilder, assets: &AssetMap) {
    use ComponentKind::*;
    let Some(kind) = component_kind(&c.tag) else {
        log::warn!("unhandled component type: {}", c.tag);
        return;
    };
    match kind {
        // covered by the object transform and the type table
        Transform => {}
        MeshFilter => mesh_filter(c, b, assets),
        MeshRenderer => mesh_renderer(c, b, assets),
        Camera => camera(c, b),
        Light => light(c, b),
        Rigidbody => rigidbody(c, b),
        BoxCollider | SphereCollider | CapsuleCollider => collider(kind, c, b),
        ParticleSystem => particle_system(c, b),
        Canvas => canvas(c, b),
        RectTransform => rect_transform(c, b),
        MonoBehaviour => behavior_script(c, b, assets),
        // type table only
        Image | Text | Button => {}
    }
}

/// Attach an external-reference property, or omit it when the referenced
/// asset has no converted counterpart yet.
fn ext_resource(b: &mut NodeBuilder, key: impl Into<String>, path: &str, assets: &AssetMap) {
    let key = key.into();
    match assets.get(path) {
        Some(dst) => b.prop(key, GdProp::ExtResource(dst.display().to_string())),
        None => log::debug!("unresolved reference {path}, omitting {key}"),
    }
}

fn mesh_filter(c: &Component, b: &mut NodeBuilder, assets: &AssetMap) {
    if let Some(p) = c
        .fields
        .get("Mesh")
        .and_then(|m| m.get("Path"))
        .and_then(Value::as_str)
    {
        ext_resource(b, "mesh", p, assets);
    }
}

fn mesh_renderer(c: &Component, b: &mut NodeBuilder, assets: &AssetMap) {
    let mats = c.fields.get("Materials").and_then(Value::as_list);
    for (i, m) in mats.unwrap_or(&[]).iter().enumerate() {
        if let Some(p) = m.get("Path").and_then(Value::as_str) {
            ext_resource(b, format!("material_{i}"), p, assets);
        }
    }
}

fn camera(c: &Component, b: &mut NodeBuilder) {
    b.prop("fov", GdProp::Float(c.fields.f_or("FieldOfView", 60.0) as F));
    b.prop("near", GdProp::Float(c.fields.f_or("NearClipPlane", 0.3) as F));
    b.prop("far", GdProp::Float(c.fields.f_or("FarClipPlane", 1000.0) as F));
}

fn light(c: &Component, b: &mut NodeBuilder) {
    b.kind = match c.fields.get("Kind").and_then(Value::as_str) {
        Some("Directional") => NodeKind::DirectionalLight3D,
        Some("Spot") => NodeKind::SpotLight3D,
        _ => NodeKind::OmniLight3D,
    };
    let color = c
        .fields
        .get("Color")
        .and_then(Value::as_rgba)
        .unwrap_or([1.; 4]);
    b.prop("light_color", GdProp::Color(color.map(|v| v as F)));
    b.prop(
        "light_energy",
        GdProp::Float(c.fields.f_or("Intensity", 1.0) as F),
    );
}

fn rigidbody(c: &Component, b: &mut NodeBuilder) {
    b.prop("mass", GdProp::Float(c.fields.f_or("Mass", 1.0) as F));
    let gravity = if c.fields.bool_or("UseGravity", true) {
        1.0
    } else {
        0.0
    };
    b.prop("gravity_scale", GdProp::Float(gravity));
    if c.fields.bool_or("IsKinematic", false) {
        b.kind = NodeKind::AnimatableBody3D;
    }
}

/// Colliders never become properties of the converted node; each one adds a
/// dedicated shape child with an inline constructor literal.
fn collider(kind: ComponentKind, c: &Component, b: &mut NodeBuilder) {
    use ComponentKind::*;
    let shape = match kind {
        BoxCollider => {
            let [x, y, z] = c
                .fields
                .get("Size")
                .and_then(Value::as_vec3)
                .unwrap_or([1.; 3]);
            format!("BoxShape3D.new(size = Vector3({x}, {y}, {z}))")
        }
        SphereCollider => {
            let r = c.fields.f_or("Radius", 0.5);
            format!("SphereShape3D.new(radius = {r})")
        }
        CapsuleCollider => {
            let r = c.fields.f_or("Radius", 0.5);
            let h = c.fields.f_or("Height", 2.0);
            format!("CapsuleShape3D.new(radius = {r}, height = {h})")
        }
        _ => unreachable!(),
    };
    let mut shape_node = GdNode::new(NodeKind::CollisionShape3D, "Collider");
    shape_node.prop("shape", GdProp::Literal(shape));
    b.child(shape_node);
}

fn particle_system(c: &Component, b: &mut NodeBuilder) {
    b.prop(
        "amount",
        GdProp::Int(c.fields.f_or("MaxParticles", 1000.0) as i64),
    );
    b.prop(
        "lifetime",
        GdProp::Float(c.fields.f_or("StartLifetime", 5.0) as F),
    );
    b.prop("explosiveness", GdProp::Float(0.0));
    b.prop("randomness", GdProp::Float(0.0));
}

fn canvas(c: &Component, b: &mut NodeBuilder) {
    b.prop("layer", GdProp::Int(c.fields.f_or("RenderMode", 0.0) as i64));
    if let Some(scaler) = c.fields.get("CanvasScaler") {
        b.prop(
            "scale_mode",
            GdProp::Int(scaler.f_or("ScaleMode", 0.0) as i64),
        );
        let [x, y] = scaler
            .get("ReferenceResolution")
            .and_then(Value::as_vec2)
            .unwrap_or([800., 600.]);
        b.prop("reference_resolution", GdProp::Vector2([x as F, y as F]));
    }
}

fn rect_transform(c: &Component, b: &mut NodeBuilder) {
    let anchors = c.fields.get("Anchors");
    let corner = |key, default| {
        anchors
            .and_then(|a| a.get(key))
            .and_then(Value::as_vec2)
            .unwrap_or(default)
    };
    let min = corner("min", [0., 0.]);
    let max = corner("max", [1., 1.]);
    b.prop("anchor_left", GdProp::Float(min[0] as F));
    b.prop("anchor_top", GdProp::Float(min[1] as F));
    b.prop("anchor_right", GdProp::Float(max[0] as F));
    b.prop("anchor_bottom", GdProp::Float(max[1] as F));
}

fn behavior_script(c: &Component, b: &mut NodeBuilder, assets: &AssetMap) {
    if let Some(p) = c
        .fields
        .get("Script")
        .and_then(|s| s.get("Path"))
        .and_then(Value::as_str)
    {
        ext_resource(b, "script", p, assets);
    }
}

/// Convert a whole scene document: every top-level object goes under an
/// implicit `Scene` root.
pub fn convert_scene(src: &Path, dst: &Path, assets: &AssetMap) -> Result<()> {
    let text = fs::read_to_string(src).map_err(|e| Error::io(src, e))?;
    let data = doc::parse(&text).map_err(|e| Error::doc(src, e))?;

    let mut root = GdNode::new(NodeKind::Node3D, "Scene");
    for v in data.get("GameObjects").and_then(Value::as_list).unwrap_or(&[]) {
        root.children
            .push(convert_object(&SourceObject::from_value(v), assets));
    }
    GdDoc::new(root).save(dst).map_err(|e| Error::io(dst, e))
}

/// Convert a prefab document: its top-level map is a single object, rooted
/// under a node named after the prefab.
pub fn convert_prefab(src: &Path, dst: &Path, assets: &AssetMap) -> Result<()> {
    let text = fs::read_to_string(src).map_err(|e| Error::io(src, e))?;
    let data = doc::parse(&text).map_err(|e| Error::doc(src, e))?;

    let name = util::bare_name(src).unwrap_or("Prefab");
    let mut root = GdNode::new(NodeKind::Node3D, name);
    root.children
        .push(convert_object(&SourceObject::from_value(&data), assets));
    GdDoc::new(root).save(dst).map_err(|e| Error::io(dst, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obj(text: &str) -> SourceObject {
        SourceObject::from_value(&doc::parse(text).unwrap())
    }

    #[test]
    fn test_default_kind_without_recognized_tags() {
        let o = obj("Name: A\nComponents:\n  - Type: SomethingCustom\n  - Type: MonoBehaviour\n");
        let node = convert_object(&o, &AssetMap::new());
        assert_eq!(node.kind, NodeKind::Node3D);
    }

    #[test]
    fn test_first_recognized_tag_wins() {
        let o = obj(
            "Name: A\nComponents:\n  - Type: MeshFilter\n  - Type: MeshRenderer\n  - Type: Camera\n",
        );
        assert_eq!(resolve_kind(&o.components), NodeKind::MeshInstance3D);
        let o = obj("Name: A\nComponents:\n  - Type: Camera\n  - Type: MeshRenderer\n");
        assert_eq!(resolve_kind(&o.components), NodeKind::Camera3D);
    }

    #[test]
    fn test_transform_props_only_when_non_default() {
        let o = obj("Name: A\nPosition: [1, 2, 3]\n");
        let node = convert_object(&o, &AssetMap::new());
        assert_eq!(
            node.get_prop("position"),
            Some(&GdProp::Vector3([1., 2., 3.]))
        );
        assert!(node.get_prop("quaternion").is_none());
        assert!(node.get_prop("scale").is_none());
    }

    #[test]
    fn test_sphere_collider_child() {
        let o = obj("Name: Ball\nComponents:\n  - Type: SphereCollider\n    Radius: 2.5\n");
        let node = convert_object(&o, &AssetMap::new());
        assert_eq!(node.children.len(), 1);
        let shape = &node.children[0];
        assert_eq!(shape.kind, NodeKind::CollisionShape3D);
        assert_eq!(shape.name, "Collider");
        assert_eq!(
            shape.get_prop("shape"),
            Some(&GdProp::Literal("SphereShape3D.new(radius = 2.5)".into()))
        );
    }

    #[test]
    fn test_box_collider_after_renderer() {
        let o = obj(
            "Name: Crate\nComponents:\n  - Type: MeshRenderer\n  - Type: BoxCollider\n    Size: {x: 1, y: 2, z: 3}\n",
        );
        let node = convert_object(&o, &AssetMap::new());
        assert_eq!(node.kind, NodeKind::MeshInstance3D);
        assert_eq!(node.children.len(), 1);
        assert_eq!(
            node.children[0].get_prop("shape"),
            Some(&GdProp::Literal(
                "BoxShape3D.new(size = Vector3(1, 2, 3))".into()
            ))
        );
    }

    #[test]
    fn test_light_kind_rewrites_node_type() {
        let o = obj("Name: Sun\nComponents:\n  - Type: Light\n    Kind: Directional\n");
        let node = convert_object(&o, &AssetMap::new());
        assert_eq!(node.kind, NodeKind::DirectionalLight3D);
        assert_eq!(
            node.get_prop("light_color"),
            Some(&GdProp::Color([1., 1., 1., 1.]))
        );
        assert_eq!(node.get_prop("light_energy"), Some(&GdProp::Float(1.)));

        let o = obj("Name: Lamp\nComponents:\n  - Type: Light\n");
        assert_eq!(convert_object(&o, &AssetMap::new()).kind, NodeKind::OmniLight3D);
    }

    #[test]
    fn test_kinematic_rigidbody_rewrites_node_type() {
        let o = obj(
            "Name: Door\nComponents:\n  - Type: Rigidbody\n    Mass: 4\n    UseGravity: false\n    IsKinematic: true\n",
        );
        let node = convert_object(&o, &AssetMap::new());
        assert_eq!(node.kind, NodeKind::AnimatableBody3D);
        assert_eq!(node.get_prop("mass"), Some(&GdProp::Float(4.)));
        assert_eq!(node.get_prop("gravity_scale"), Some(&GdProp::Float(0.)));
    }

    #[test]
    fn test_unresolved_reference_is_omitted() {
        let o = obj(
            "Name: Crate\nComponents:\n  - Type: MeshRenderer\n    Materials:\n      - Path: a/Wood.mat\n",
        );
        let node = convert_object(&o, &AssetMap::new());
        assert!(node.get_prop("material_0").is_none());
    }

    #[test]
    fn test_resolved_reference_is_attached() {
        let mut assets = AssetMap::new();
        assets.put("a/Wood.mat", "out/materials/Wood.tres");
        let o = obj(
            "Name: Crate\nComponents:\n  - Type: MeshRenderer\n    Materials:\n      - Path: a/Wood.mat\n",
        );
        let node = convert_object(&o, &assets);
        assert_eq!(
            node.get_prop("material_0"),
            Some(&GdProp::ExtResource("out/materials/Wood.tres".into()))
        );
    }

    #[test]
    fn test_children_preserve_order() {
        let o = obj(
            "Name: Root\nChildren:\n  - Name: A\n  - Name: B\n    Children:\n      - Name: C\n",
        );
        let node = convert_object(&o, &AssetMap::new());
        assert_eq!(node.children.len(), 2);
        assert_eq!(node.children[0].name, "A");
        assert_eq!(node.children[1].name, "B");
        assert_eq!(node.children[1].children[0].name, "C");
    }

    #[test]
    fn test_camera_defaults() {
        let o = obj("Name: Cam\nComponents:\n  - Type: Camera\n    FieldOfView: 75\n");
        let node = convert_object(&o, &AssetMap::new());
        assert_eq!(node.kind, NodeKind::Camera3D);
        assert_eq!(node.get_prop("fov"), Some(&GdProp::Float(75.)));
        assert_eq!(node.get_prop("near"), Some(&GdProp::Float(0.3)));
        assert_eq!(node.get_prop("far"), Some(&GdProp::Float(1000.)));
    }

    #[test]
    fn test_rect_transform_anchors() {
        let o = obj(
            "Name: Panel\nComponents:\n  - Type: RectTransform\n    Anchors:\n      min: {x: 0.25, y: 0.5}\n      max: {x: 0.75, y: 1}\n",
        );
        let node = convert_object(&o, &AssetMap::new());
        assert_eq!(node.kind, NodeKind::Control);
        assert_eq!(node.get_prop("anchor_left"), Some(&GdProp::Float(0.25)));
        assert_eq!(node.get_prop("anchor_top"), Some(&GdProp::Float(0.5)));
        assert_eq!(node.get_prop("anchor_right"), Some(&GdProp::Float(0.75)));
        assert_eq!(node.get_prop("anchor_bottom"), Some(&GdProp::Float(1.)));
    }
}
