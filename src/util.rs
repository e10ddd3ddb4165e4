use std::path::Path;

/// Source file roles recognized by the inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Scene document (.unity)
    Scene,
    /// Prefab document (.prefab)
    Prefab,
    /// Material document (.mat)
    Material,
    /// Mesh geometry (.fbx, .obj)
    Mesh,
    /// Animation document (.anim)
    Animation,
    /// Script source (.cs)
    Script,

    /// Anything else, left untouched
    Unknown,
}

/// Given something that looks like a path, classify it by extension.
pub fn classify(s: impl AsRef<Path>) -> SourceKind {
    let s = s.as_ref();
    let Some(e) = s.extension() else {
        return SourceKind::Unknown;
    };
    let Some(e) = e.to_str() else {
        return SourceKind::Unknown;
    };

    let matches = [
        ("unity", SourceKind::Scene),
        ("prefab", SourceKind::Prefab),
        ("mat", SourceKind::Material),
        ("fbx", SourceKind::Mesh),
        ("obj", SourceKind::Mesh),
        ("anim", SourceKind::Animation),
        ("cs", SourceKind::Script),
    ];
    for (ext, kind) in matches {
        if ext.eq_ignore_ascii_case(e) {
            return kind;
        }
    }
    SourceKind::Unknown
}

/// File name without its extension.
pub fn bare_name(p: &Path) -> Option<&str> {
    p.file_stem()?.to_str()
}

/// Full file name, extension included.
pub fn file_name(p: &Path) -> Option<&str> {
    p.file_name()?.to_str()
}

#[test]
fn test_classify() {
    use SourceKind::*;
    assert_eq!(classify("a/b/Main.unity"), Scene);
    assert_eq!(classify("Bullet.prefab"), Prefab);
    assert_eq!(classify("Wood.MAT"), Material);
    assert_eq!(classify("Crate.fbx"), Mesh);
    assert_eq!(classify("Crate.obj"), Mesh);
    assert_eq!(classify("Spin.anim"), Animation);
    assert_eq!(classify("Player.cs"), Script);
    assert_eq!(classify("readme.txt"), Unknown);
    assert_eq!(classify("no_extension"), Unknown);
}

#[test]
fn test_names() {
    let p: &Path = "a/b/Wood.mat".as_ref();
    assert_eq!(bare_name(p), Some("Wood"));
    assert_eq!(file_name(p), Some("Wood.mat"));
}
