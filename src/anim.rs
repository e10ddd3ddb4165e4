use std::fs;
use std::path::Path;

use crate::doc::{self, Value};
use crate::gd::{GdDoc, GdNode, GdProp, NodeKind};
use crate::{Error, Result, F};

/// Convert one source animation document into a target animation document:
/// one `Track` node per source track, one `Key` node per source key, order
/// preserved.
pub fn convert(src: &Path, dst: &Path) -> Result<()> {
    let text = fs::read_to_string(src).map_err(|e| Error::io(src, e))?;
    let data = doc::parse(&text).map_err(|e| Error::doc(src, e))?;
    animation_doc(&data)
        .save(dst)
        .map_err(|e| Error::io(dst, e))
}

fn animation_doc(data: &Value) -> GdDoc {
    let mut root = GdNode::new(NodeKind::Animation, "animation");
    root.prop("length", GdProp::Float(data.f_or("length", 1.0) as F));
    root.prop("loop", GdProp::Bool(data.bool_or("loop", false)));

    for track in data.get("tracks").and_then(Value::as_list).unwrap_or(&[]) {
        let Some(path) = track.get("path").and_then(Value::as_str) else {
            log::warn!("track without a path, skipping");
            continue;
        };
        root.children.push(track_node(path, track));
    }
    GdDoc::new(root)
}

fn track_node(path: &str, track: &Value) -> GdNode {
    let mut node = GdNode::new(NodeKind::Track, path);
    node.prop("type", GdProp::Str("transform".into()));
    node.prop("path", GdProp::NodePath(path.into()));

    let mut keys = GdNode::new(NodeKind::Keys, "Keys");
    for (i, key) in track
        .get("keys")
        .and_then(Value::as_list)
        .unwrap_or(&[])
        .iter()
        .enumerate()
    {
        let mut k = GdNode::new(NodeKind::Key, format!("Key{i}"));
        k.prop("time", GdProp::Float(key.f_or("time", 0.0) as F));
        k.prop(
            "transform",
            GdProp::Literal(transform_literal(key.get("value"))),
        );
        keys.children.push(k);
    }
    node.children.push(keys);
    node
}

/// Inline transform literal from a key value map, with identity defaults.
fn transform_literal(value: Option<&Value>) -> String {
    let get = |key: &str| value.and_then(|v| v.get(key));
    let [px, py, pz] = get("position").and_then(Value::as_vec3).unwrap_or([0.; 3]);
    let [rx, ry, rz, rw] = get("rotation")
        .and_then(Value::as_vec4)
        .unwrap_or([0., 0., 0., 1.]);
    let [sx, sy, sz] = get("scale").and_then(Value::as_vec3).unwrap_or([1.; 3]);
    format!(
        "Transform(Vector3({sx}, {sy}, {sz}), Quaternion({rx}, {ry}, {rz}, {rw}), \
         Vector3({px}, {py}, {pz}))"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let d = animation_doc(&doc::parse("").unwrap());
        assert_eq!(d.root.get_prop("length"), Some(&GdProp::Float(1.)));
        assert_eq!(d.root.get_prop("loop"), Some(&GdProp::Bool(false)));
        assert!(d.root.children.is_empty());
    }

    #[test]
    fn test_tracks_and_keys() {
        let text = "\
length: 2.5
loop: true
tracks:
  - path: Root/Arm
    keys:
      - time: 0
        value:
          position: [0, 1, 0]
      - time: 1.25
        value:
          rotation: [0, 0.5, 0, 1]
          scale: [2, 2, 2]
";
        let d = animation_doc(&doc::parse(text).unwrap());
        assert_eq!(d.root.get_prop("length"), Some(&GdProp::Float(2.5)));
        assert_eq!(d.root.get_prop("loop"), Some(&GdProp::Bool(true)));

        assert_eq!(d.root.children.len(), 1);
        let track = &d.root.children[0];
        assert_eq!(track.kind, NodeKind::Track);
        assert_eq!(track.name, "Root/Arm");
        assert_eq!(
            track.get_prop("path"),
            Some(&GdProp::NodePath("Root/Arm".into()))
        );

        let keys = &track.children[0];
        assert_eq!(keys.kind, NodeKind::Keys);
        assert_eq!(keys.children.len(), 2);
        assert_eq!(keys.children[0].name, "Key0");
        assert_eq!(keys.children[0].get_prop("time"), Some(&GdProp::Float(0.)));
        let t0 = keys.children[0].get_prop("transform").unwrap().to_string();
        assert_eq!(
            t0,
            "Transform(Vector3(1, 1, 1), Quaternion(0, 0, 0, 1), Vector3(0, 1, 0))"
        );
        let t1 = keys.children[1].get_prop("transform").unwrap().to_string();
        assert!(t1.contains("Quaternion(0, 0.5, 0, 1)"));
        assert!(t1.contains("Vector3(2, 2, 2)"));
    }

    #[test]
    fn test_track_without_path_is_skipped() {
        let d = animation_doc(&doc::parse("tracks:\n  - keys: []\n").unwrap());
        assert!(d.root.children.is_empty());
    }
}
