use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::asset_map::AssetMap;
use crate::{Error, Result};

/// Emitted structured documents subject to reference rewriting. Script stubs
/// and binary outputs are left alone.
fn is_document(p: &Path) -> bool {
    let Some(e) = p.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    ["tscn", "tres", "anim"]
        .iter()
        .any(|ext| ext.eq_ignore_ascii_case(e))
}

/// Final pass over the whole target tree: replace every occurrence of each
/// source asset's bare filename with its converted counterpart's. Plain
/// textual substitution, so it can only repair references written before the
/// table was fully populated; it runs strictly after all scene and prefab
/// conversion. Unrelated text that happens to contain a matching filename is
/// substituted too; bare-name collisions across asset categories share that
/// risk.
pub fn rewrite_references(dst_root: &Path, assets: &AssetMap) -> Result<()> {
    for entry in WalkDir::new(dst_root) {
        let entry = entry.map_err(|e| Error::io(dst_root, e.into()))?;
        if !entry.file_type().is_file() || !is_document(entry.path()) {
            continue;
        }
        rewrite_file(entry.path(), assets)?;
    }
    Ok(())
}

/// Substitute converted filenames into one document, rewriting it in place
/// only when something changed.
pub fn rewrite_file(path: &Path, assets: &AssetMap) -> Result<()> {
    let mut text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let mut changed = false;
    for (src, dst) in assets.iter() {
        let (Some(from), Some(to)) = (crate::util::file_name(src), crate::util::file_name(dst))
        else {
            continue;
        };
        if from != to && text.contains(from) {
            text = text.replace(from, to);
            changed = true;
        }
    }
    if changed {
        log::info!("rewrote references in {}", path.display());
        fs::write(path, text).map_err(|e| Error::io(path, e))?;
    }
    Ok(())
}
