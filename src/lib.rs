pub type F = f32;

/// Alias for array of floats.
pub type Vector<const N: usize> = [F; N];

pub type Vec3 = Vector<3>;
pub type Vec4 = Vector<4>;

/// Structured source-document parsing.
pub mod doc;

/// Source project classification and indexing.
pub mod inventory;

/// Source path -> converted path reference table.
pub mod asset_map;

/// Target document model and writer.
pub mod gd;

/// Material conversion.
pub mod material;

/// Mesh conversion and the importer seam.
pub mod mesh;

/// Animation conversion.
pub mod anim;

/// Script relocation.
pub mod script;

/// Scene and prefab graph conversion.
pub mod scene;

/// Final reference-rewriting pass.
pub mod rewrite;

pub mod util;

pub use asset_map::AssetMap;
pub use scene::SourceObject;

/// Re-exported for textures.
pub use image;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use inventory::Inventory;
use mesh::{ImportMesh, ObjImporter};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: io::Error,
    },
    #[error("{}: {source}", path.display())]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("{}: {source}", path.display())]
    Doc {
        path: PathBuf,
        source: doc::ParseError,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
    pub(crate) fn image(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        Error::Image {
            path: path.into(),
            source,
        }
    }
    pub(crate) fn doc(path: impl Into<PathBuf>, source: doc::ParseError) -> Self {
        Error::Doc {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Path of the file this error is about.
    pub fn path(&self) -> &Path {
        match self {
            Error::Io { path, .. } | Error::Image { path, .. } | Error::Doc { path, .. } => path,
        }
    }
}

/// Convert a whole source project in one call.
pub fn convert(src_root: impl Into<PathBuf>, dst_root: impl Into<PathBuf>) -> Result<()> {
    Conversion::new(src_root, dst_root).run()
}

/// One full source -> target conversion run.
///
/// Assets convert before the scenes and prefabs that reference them, and the
/// reference-rewriting pass runs last over everything that was emitted.
pub struct Conversion {
    src_root: PathBuf,
    dst_root: PathBuf,
    importer: Box<dyn ImportMesh>,
    inventory: Inventory,
    assets: AssetMap,
}

impl Conversion {
    pub fn new(src_root: impl Into<PathBuf>, dst_root: impl Into<PathBuf>) -> Self {
        Self::with_importer(src_root, dst_root, Box::new(ObjImporter))
    }

    pub fn with_importer(
        src_root: impl Into<PathBuf>,
        dst_root: impl Into<PathBuf>,
        importer: Box<dyn ImportMesh>,
    ) -> Self {
        Self {
            src_root: src_root.into(),
            dst_root: dst_root.into(),
            importer,
            inventory: Inventory::default(),
            assets: AssetMap::new(),
        }
    }

    /// The reference table populated by the run so far.
    pub fn assets(&self) -> &AssetMap {
        &self.assets
    }

    pub fn run(&mut self) -> Result<()> {
        log::info!(
            "converting {} -> {}",
            self.src_root.display(),
            self.dst_root.display()
        );
        fs::create_dir_all(&self.dst_root).map_err(|e| Error::io(&self.dst_root, e))?;
        self.inventory = Inventory::scan(&self.src_root)?;

        self.convert_materials()?;
        self.convert_meshes()?;
        self.convert_animations()?;
        self.convert_scripts()?;
        self.convert_scenes()?;
        self.convert_prefabs()?;

        rewrite::rewrite_references(&self.dst_root, &self.assets)
    }

    /// `<dst_root>/<category>/<name>.<ext>`, parent directory created.
    fn target_path(&self, category: &str, name: &str, ext: &str) -> Result<PathBuf> {
        let dir = self.dst_root.join(category);
        fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;
        Ok(dir.join(format!("{name}.{ext}")))
    }

    fn convert_materials(&mut self) -> Result<()> {
        for (name, src) in &self.inventory.materials {
            let dst = self.target_path("materials", name, "tres")?;
            log::info!("material {} -> {}", src.display(), dst.display());
            material::convert(src, &dst, &self.dst_root)?;
            self.assets.put(src, dst);
        }
        Ok(())
    }

    fn convert_meshes(&mut self) -> Result<()> {
        for (name, src) in &self.inventory.meshes {
            let dst = self.target_path("meshes", name, "mesh")?;
            log::info!("mesh {} -> {}", src.display(), dst.display());
            mesh::convert(src, &dst, &*self.importer)?;
            self.assets.put(src, dst);
        }
        Ok(())
    }

    fn convert_animations(&mut self) -> Result<()> {
        for (name, src) in &self.inventory.animations {
            let dst = self.target_path("animations", name, "anim")?;
            log::info!("animation {} -> {}", src.display(), dst.display());
            anim::convert(src, &dst)?;
            self.assets.put(src, dst);
        }
        Ok(())
    }

    fn convert_scripts(&mut self) -> Result<()> {
        for (name, src) in &self.inventory.scripts {
            let dst = self.target_path("scripts", name, "gd")?;
            log::info!("script {} -> {}", src.display(), dst.display());
            script::convert(src, &dst)?;
            self.assets.put(src, dst);
        }
        Ok(())
    }

    fn convert_scenes(&mut self) -> Result<()> {
        for src in &self.inventory.scenes {
            let Some(name) = util::bare_name(src) else {
                continue;
            };
            let dst = self.target_path("scenes", name, "tscn")?;
            log::info!("scene {} -> {}", src.display(), dst.display());
            scene::convert_scene(src, &dst, &self.assets)?;
        }
        Ok(())
    }

    fn convert_prefabs(&mut self) -> Result<()> {
        for (name, src) in &self.inventory.prefabs {
            let dst = self.target_path("prefabs", name, "tscn")?;
            log::info!("prefab {} -> {}", src.display(), dst.display());
            scene::convert_prefab(src, &dst, &self.assets)?;
            self.assets.put(src, dst);
        }
        Ok(())
    }
}
