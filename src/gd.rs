use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::{Vec3, Vec4, F};

/// The closed set of target node types a converted document may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Node3D,
    MeshInstance3D,
    Camera3D,
    Light3D,
    DirectionalLight3D,
    SpotLight3D,
    OmniLight3D,
    RigidBody3D,
    AnimatableBody3D,
    CollisionShape3D,
    CanvasLayer,
    Control,
    TextureRect,
    Label,
    Button,
    GpuParticles3D,

    // Section kinds used by converted resource documents
    SpatialMaterial,
    Animation,
    Track,
    Keys,
    Key,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        use NodeKind::*;
        match self {
            Node3D => "Node3D",
            MeshInstance3D => "MeshInstance3D",
            Camera3D => "Camera3D",
            Light3D => "Light3D",
            DirectionalLight3D => "DirectionalLight3D",
            SpotLight3D => "SpotLight3D",
            OmniLight3D => "OmniLight3D",
            RigidBody3D => "RigidBody3D",
            AnimatableBody3D => "AnimatableBody3D",
            CollisionShape3D => "CollisionShape3D",
            CanvasLayer => "CanvasLayer",
            Control => "Control",
            TextureRect => "TextureRect",
            Label => "Label",
            Button => "Button",
            GpuParticles3D => "GPUParticles3D",
            SpatialMaterial => "SpatialMaterial",
            Animation => "Animation",
            Track => "Track",
            Keys => "Keys",
            Key => "Key",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed property value, written in the target literal form.
#[derive(Debug, Clone, PartialEq)]
pub enum GdProp {
    Float(F),
    Int(i64),
    Bool(bool),
    Str(String),
    Color(Vec4),
    Vector2([F; 2]),
    Vector3(Vec3),
    Quaternion(Vec4),
    NodePath(String),
    ExtResource(String),
    /// Constructor-style literal, written verbatim.
    Literal(String),
}

impl fmt::Display for GdProp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use GdProp::*;
        match self {
            Float(v) => write!(f, "{v}"),
            Int(v) => write!(f, "{v}"),
            Bool(v) => write!(f, "{v}"),
            Str(s) => write!(f, "\"{s}\""),
            Color([r, g, b, a]) => write!(f, "Color({r}, {g}, {b}, {a})"),
            Vector2([x, y]) => write!(f, "Vector2({x}, {y})"),
            Vector3([x, y, z]) => write!(f, "Vector3({x}, {y}, {z})"),
            Quaternion([x, y, z, w]) => write!(f, "Quaternion({x}, {y}, {z}, {w})"),
            NodePath(p) => write!(f, "NodePath(\"{p}\")"),
            ExtResource(p) => write!(f, "ExtResource(\"{p}\")"),
            Literal(s) => f.write_str(s),
        }
    }
}

/// One node section of a target document: type, name, ordered properties,
/// ordered children.
#[derive(Debug, Clone, PartialEq)]
pub struct GdNode {
    pub kind: NodeKind,
    pub name: String,
    pub props: Vec<(String, GdProp)>,
    pub children: Vec<GdNode>,
}

impl GdNode {
    pub fn new(kind: NodeKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            props: vec![],
            children: vec![],
        }
    }

    pub fn prop(&mut self, key: impl Into<String>, v: GdProp) {
        self.props.push((key.into(), v));
    }

    pub fn get_prop(&self, key: &str) -> Option<&GdProp> {
        self.props.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

/// A whole emitted target document.
#[derive(Debug, Clone, PartialEq)]
pub struct GdDoc {
    pub root: GdNode,
}

impl GdDoc {
    pub fn new(root: GdNode) -> Self {
        Self { root }
    }

    pub fn write(&self, mut w: impl Write) -> io::Result<()> {
        writeln!(w, "[gd_scene format=3]")?;
        write_node(&mut w, &self.root, None)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let f = File::create(path)?;
        let mut buf = BufWriter::new(f);
        self.write(&mut buf)?;
        buf.flush()
    }
}

impl fmt::Display for GdDoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = vec![];
        self.write(&mut out).map_err(|_| fmt::Error)?;
        f.write_str(&String::from_utf8_lossy(&out))
    }
}

fn write_node(w: &mut impl Write, node: &GdNode, parent: Option<&str>) -> io::Result<()> {
    writeln!(w)?;
    match parent {
        None => writeln!(w, "[node name=\"{}\" type=\"{}\"]", node.name, node.kind)?,
        Some(p) => writeln!(
            w,
            "[node name=\"{}\" type=\"{}\" parent=\"{p}\"]",
            node.name, node.kind
        )?,
    }
    for (k, v) in &node.props {
        writeln!(w, "{k} = {v}")?;
    }
    let child_parent = match parent {
        None => ".".to_string(),
        Some(".") => node.name.clone(),
        Some(p) => format!("{p}/{}", node.name),
    };
    for child in &node.children {
        write_node(w, child, Some(&child_parent))?;
    }
    Ok(())
}
