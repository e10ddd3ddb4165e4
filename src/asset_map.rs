use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Run-scoped map from a source asset path to its converted target path.
///
/// Populated as each asset is converted and consulted whenever a component
/// references another asset. Lookups before the writer has run return `None`
/// and the caller omits the dependent property. Ordered so the final
/// rewriting pass substitutes in a deterministic order.
#[derive(Debug, Default, Clone)]
pub struct AssetMap {
    map: BTreeMap<PathBuf, PathBuf>,
}

impl AssetMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the mapping for `src`.
    pub fn put(&mut self, src: impl Into<PathBuf>, dst: impl Into<PathBuf>) {
        self.map.insert(src.into(), dst.into());
    }

    /// Target path for `src`, if it has been converted.
    pub fn get(&self, src: impl AsRef<Path>) -> Option<&Path> {
        self.map.get(src.as_ref()).map(PathBuf::as_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, &Path)> {
        self.map.iter().map(|(s, d)| (s.as_path(), d.as_path()))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[test]
fn test_put_get() {
    let mut m = AssetMap::new();
    assert_eq!(m.get("a/b.mat"), None);
    m.put("a/b.mat", "out/b.tres");
    assert_eq!(m.get("a/b.mat"), Some(Path::new("out/b.tres")));

    // insert is overwrite
    m.put("a/b.mat", "out2/b.tres");
    assert_eq!(m.get("a/b.mat"), Some(Path::new("out2/b.tres")));
    assert_eq!(m.len(), 1);
}
