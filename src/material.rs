use std::fs;
use std::path::{Path, PathBuf};

use crate::doc::{self, Value};
use crate::gd::{GdDoc, GdNode, GdProp, NodeKind};
use crate::{util, Error, Result, F};

/// Convert one source material document into a target material resource.
///
/// Recognized fields are mapped, texture slots are re-encoded through the
/// image codec into `<dst_root>/textures/`, everything else is dropped.
pub fn convert(src: &Path, dst: &Path, dst_root: &Path) -> Result<()> {
    let text = fs::read_to_string(src).map_err(|e| Error::io(src, e))?;
    let data = doc::parse(&text).map_err(|e| Error::doc(src, e))?;
    let node = material_node(&data, src, dst_root)?;
    GdDoc::new(node).save(dst).map_err(|e| Error::io(dst, e))
}

fn material_node(data: &Value, src: &Path, dst_root: &Path) -> Result<GdNode> {
    let mut node = GdNode::new(NodeKind::SpatialMaterial, "material");

    if let Some(c) = data.get("Color").and_then(Value::as_rgba) {
        node.prop("albedo_color", GdProp::Color(c.map(|v| v as F)));
    }
    if let Some(m) = data.get("Metallic").and_then(Value::as_f) {
        node.prop("metallic", GdProp::Float(m as F));
    }
    if let Some(s) = data.get("Smoothness").and_then(Value::as_f) {
        node.prop("roughness", GdProp::Float((1.0 - s) as F));
    }

    let slots = [
        ("MainTex", "albedo_texture"),
        ("BumpMap", "normal_texture"),
        ("MetallicGlossMap", "metallic_texture"),
    ];
    for (slot, prop) in slots {
        texture_slot(data, &mut node, slot, prop, src, dst_root)?;
    }
    Ok(node)
}

fn texture_slot(
    data: &Value,
    node: &mut GdNode,
    slot: &str,
    prop: &str,
    src: &Path,
    dst_root: &Path,
) -> Result<()> {
    let Some(tex) = data
        .get(slot)
        .and_then(|s| s.get("Texture"))
        .and_then(Value::as_str)
    else {
        return Ok(());
    };
    // texture paths are relative to the material unless absolute
    let tex_path = PathBuf::from(tex);
    let tex_path = if tex_path.is_absolute() {
        tex_path
    } else {
        src.parent().unwrap_or(Path::new("")).join(tex_path)
    };
    let out = reencode_texture(&tex_path, dst_root)?;
    node.prop(prop, GdProp::ExtResource(out.display().to_string()));
    Ok(())
}

/// Re-encode an image into `<dst_root>/textures/<stem>.png`, pixel data
/// unchanged. Returns the target path.
pub fn reencode_texture(src: &Path, dst_root: &Path) -> Result<PathBuf> {
    let dir = dst_root.join("textures");
    fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;
    let Some(stem) = util::bare_name(src) else {
        return Err(Error::io(src, std::io::Error::other("unusable file name")));
    };
    let dst = dir.join(format!("{stem}.png"));
    let img = image::open(src).map_err(|e| Error::image(src, e))?;
    img.save(&dst).map_err(|e| Error::image(&dst, e))?;
    log::info!("texture {} -> {}", src.display(), dst.display());
    Ok(dst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_mapping() {
        let data = doc::parse(
            "Color: {r: 1, g: 0, b: 0, a: 1}\nMetallic: 0.2\nSmoothness: 0.8\nShininess: 3\n",
        )
        .unwrap();
        let node = material_node(&data, Path::new("Wood.mat"), Path::new("out")).unwrap();
        assert_eq!(
            node.get_prop("albedo_color"),
            Some(&GdProp::Color([1., 0., 0., 1.]))
        );
        assert_eq!(node.get_prop("metallic"), Some(&GdProp::Float(0.2)));
        // roughness is the inverse of smoothness
        assert_eq!(node.get_prop("roughness").unwrap().to_string(), "0.2");
        // unrecognized fields are dropped
        assert!(node.get_prop("Shininess").is_none());
        assert!(node.get_prop("shininess").is_none());
    }

    #[test]
    fn test_absent_fields_are_omitted() {
        let data = doc::parse("Metallic: 1\n").unwrap();
        let node = material_node(&data, Path::new("m.mat"), Path::new("out")).unwrap();
        assert!(node.get_prop("albedo_color").is_none());
        assert!(node.get_prop("roughness").is_none());
        assert_eq!(node.get_prop("metallic"), Some(&GdProp::Float(1.)));
    }

    #[test]
    fn test_texture_reencode_to_png() {
        let tmp = tempfile::tempdir().unwrap();
        let src_dir = tmp.path().join("srcp");
        let dst_root = tmp.path().join("dstp");
        fs::create_dir_all(&src_dir).unwrap();

        let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([255, 0, 0, 255]));
        img.save(src_dir.join("wood.bmp")).unwrap();
        fs::write(
            src_dir.join("Wood.mat"),
            "MainTex:\n  Texture: wood.bmp\n",
        )
        .unwrap();

        convert(
            &src_dir.join("Wood.mat"),
            &tmp.path().join("Wood.tres"),
            &dst_root,
        )
        .unwrap();

        let out = dst_root.join("textures/wood.png");
        let back = image::open(&out).unwrap().into_rgba8();
        assert_eq!(back.get_pixel(0, 0), &image::Rgba([255, 0, 0, 255]));

        let tres = fs::read_to_string(tmp.path().join("Wood.tres")).unwrap();
        assert!(tres.contains("albedo_texture = ExtResource("));
        assert!(tres.contains("wood.png"));
    }
}
