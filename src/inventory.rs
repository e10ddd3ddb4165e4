use std::collections::HashMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::util::{self, SourceKind};
use crate::{Error, Result};

/// Index of every convertible file under a source project root.
///
/// Built by a single walk, read-only afterwards. Bare-name collisions are
/// last-write-wins in walk order.
#[derive(Debug, Default, Clone)]
pub struct Inventory {
    pub materials: HashMap<String, PathBuf>,
    pub meshes: HashMap<String, PathBuf>,
    pub animations: HashMap<String, PathBuf>,
    pub scripts: HashMap<String, PathBuf>,
    pub prefabs: HashMap<String, PathBuf>,
    pub scenes: Vec<PathBuf>,
}

impl Inventory {
    pub fn scan(root: &Path) -> Result<Self> {
        let mut inv = Self::default();
        for entry in WalkDir::new(root) {
            let entry = entry.map_err(|e| Error::io(root, e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.into_path();
            let Some(name) = util::bare_name(&path) else {
                continue;
            };
            let name = name.to_string();
            match util::classify(&path) {
                SourceKind::Material => {
                    inv.materials.insert(name, path);
                }
                SourceKind::Mesh => {
                    inv.meshes.insert(name, path);
                }
                SourceKind::Animation => {
                    inv.animations.insert(name, path);
                }
                SourceKind::Script => {
                    inv.scripts.insert(name, path);
                }
                SourceKind::Prefab => {
                    inv.prefabs.insert(name, path);
                }
                SourceKind::Scene => inv.scenes.push(path),
                SourceKind::Unknown => {}
            }
        }
        // Scene conversion order should not depend on directory walk order.
        inv.scenes.sort();
        Ok(inv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_scan_classifies() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("Assets/Sub")).unwrap();
        for f in [
            "Assets/Wood.mat",
            "Assets/Crate.obj",
            "Assets/Sub/Spin.anim",
            "Assets/Sub/Player.cs",
            "Assets/Bullet.prefab",
            "Assets/Main.unity",
            "Assets/notes.txt",
        ] {
            fs::write(root.join(f), "").unwrap();
        }

        let inv = Inventory::scan(root).unwrap();
        assert_eq!(inv.materials["Wood"], root.join("Assets/Wood.mat"));
        assert_eq!(inv.meshes["Crate"], root.join("Assets/Crate.obj"));
        assert_eq!(inv.animations["Spin"], root.join("Assets/Sub/Spin.anim"));
        assert_eq!(inv.scripts["Player"], root.join("Assets/Sub/Player.cs"));
        assert_eq!(inv.prefabs["Bullet"], root.join("Assets/Bullet.prefab"));
        assert_eq!(inv.scenes, vec![root.join("Assets/Main.unity")]);
    }

    #[test]
    fn test_collision_last_write_wins() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("a")).unwrap();
        fs::create_dir_all(root.join("b")).unwrap();
        fs::write(root.join("a/Wood.mat"), "").unwrap();
        fs::write(root.join("b/Wood.mat"), "").unwrap();

        let inv = Inventory::scan(root).unwrap();
        // one bare name, one surviving entry, whichever the walk saw last
        assert_eq!(inv.materials.len(), 1);
        let p = &inv.materials["Wood"];
        assert!(p == &root.join("a/Wood.mat") || p == &root.join("b/Wood.mat"));
    }

    #[test]
    fn test_empty_project() {
        let tmp = tempfile::tempdir().unwrap();
        let inv = Inventory::scan(tmp.path()).unwrap();
        assert!(inv.materials.is_empty());
        assert!(inv.scenes.is_empty());
    }
}
