use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::{Error, Result, Vec3, F};

/// Triangulated geometry ready for binary emission.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Geometry {
    pub v: Vec<Vec3>,
    pub idx: Vec<u32>,
}

/// External mesh importer seam. `Ok(None)` means the importer cannot produce
/// geometry for this file and the caller falls back to [`unit_cube`].
pub trait ImportMesh {
    fn import(&self, path: &Path) -> Result<Option<Geometry>>;
}

/// Imports wavefront OBJ position data; every other format is unavailable.
#[derive(Debug, Default, Clone, Copy)]
pub struct ObjImporter;

impl ImportMesh for ObjImporter {
    fn import(&self, path: &Path) -> Result<Option<Geometry>> {
        let is_obj = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("obj"));
        if !is_obj {
            return Ok(None);
        }
        let f = File::open(path).map_err(|e| Error::io(path, e))?;
        obj_geometry(BufReader::new(f))
            .map(Some)
            .map_err(|e| Error::io(path, e))
    }
}

/// Reads `v` and `f` records of an OBJ file into plain triangle geometry.
/// Faces are fan-triangulated; texture/normal indices are dropped.
pub fn obj_geometry(reader: impl BufRead) -> io::Result<Geometry> {
    let mut geom = Geometry::default();

    for (i, l) in reader.lines().enumerate() {
        let l = l?;
        let mut iter = l.split_whitespace();
        let Some(kind) = iter.next() else { continue };
        let bad = |what: &str| io::Error::other(format!("unsupported `{what}` on line {}: {l}", i + 1));
        match kind {
            ht if ht.starts_with('#') => continue,
            "v" => match [iter.next(), iter.next(), iter.next()] {
                [Some(a), Some(b), Some(c)] => {
                    let v = [a, b, c].map(|s| s.parse::<F>());
                    match v {
                        [Ok(a), Ok(b), Ok(c)] => geom.v.push([a, b, c]),
                        _ => return Err(bad("v")),
                    }
                }
                _ => return Err(bad("v")),
            },
            "f" => {
                let mut vis = vec![];
                for corner in iter {
                    // `vi`, `vi/ti` and `vi/ti/ni` forms, 1-based
                    let Some(vi) = corner.split('/').next() else {
                        return Err(bad("f"));
                    };
                    let vi: usize = vi.parse().map_err(|_| bad("f"))?;
                    if vi == 0 || vi > geom.v.len() {
                        return Err(bad("f"));
                    }
                    vis.push((vi - 1) as u32);
                }
                if vis.len() < 3 {
                    return Err(bad("f"));
                }
                for w in 1..vis.len() - 1 {
                    geom.idx.extend([vis[0], vis[w], vis[w + 1]]);
                }
            }
            // geometry only, everything else is ignored
            _ => continue,
        }
    }
    Ok(geom)
}

/// Fallback geometry used when no importer can read a source mesh.
pub fn unit_cube() -> Geometry {
    let v = vec![
        [-1., -1., -1.],
        [1., -1., -1.],
        [1., 1., -1.],
        [-1., 1., -1.],
        [-1., -1., 1.],
        [1., -1., 1.],
        [1., 1., 1.],
        [-1., 1., 1.],
    ];
    #[rustfmt::skip]
    let idx = vec![
        0, 1, 2, 2, 3, 0, // front
        1, 5, 6, 6, 2, 1, // right
        5, 4, 7, 7, 6, 5, // back
        4, 0, 3, 3, 7, 4, // left
        3, 2, 6, 6, 7, 3, // top
        4, 5, 1, 1, 0, 4, // bottom
    ];
    Geometry { v, idx }
}

/// Binary layout: u32 LE vertex count, f32 LE vertex triples, u32 LE index
/// count, u32 LE indices.
pub fn write(geom: &Geometry, mut w: impl Write) -> io::Result<()> {
    w.write_all(&(geom.v.len() as u32).to_le_bytes())?;
    for v in &geom.v {
        for c in v {
            w.write_all(&c.to_le_bytes())?;
        }
    }
    w.write_all(&(geom.idx.len() as u32).to_le_bytes())?;
    for i in &geom.idx {
        w.write_all(&i.to_le_bytes())?;
    }
    Ok(())
}

/// Decode the layout emitted by [`write`].
pub fn read(mut r: impl Read) -> io::Result<Geometry> {
    fn u32_le(r: &mut impl Read) -> io::Result<u32> {
        let mut buf = [0; 4];
        r.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    let nv = u32_le(&mut r)? as usize;
    let mut v = Vec::with_capacity(nv);
    for _ in 0..nv {
        let mut vert = [0.; 3];
        for c in &mut vert {
            let mut buf = [0; 4];
            r.read_exact(&mut buf)?;
            *c = F::from_le_bytes(buf);
        }
        v.push(vert);
    }
    let ni = u32_le(&mut r)? as usize;
    let mut idx = Vec::with_capacity(ni);
    for _ in 0..ni {
        idx.push(u32_le(&mut r)?);
    }
    Ok(Geometry { v, idx })
}

/// Convert one source mesh file into the target binary format.
pub fn convert(src: &Path, dst: &Path, importer: &dyn ImportMesh) -> Result<()> {
    let geom = match importer.import(src)? {
        Some(g) => g,
        None => {
            log::info!("no importer for {}, emitting fallback cube", src.display());
            unit_cube()
        }
    };
    let f = File::create(dst).map_err(|e| Error::io(dst, e))?;
    let mut buf = BufWriter::new(f);
    write(&geom, &mut buf).map_err(|e| Error::io(dst, e))?;
    buf.flush().map_err(|e| Error::io(dst, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_cube_roundtrip() {
        let cube = unit_cube();
        assert_eq!(cube.v.len(), 8);
        assert_eq!(cube.idx.len(), 36);

        let mut bytes = vec![];
        write(&cube, &mut bytes).unwrap();
        // 2 counts + 8 * 3 floats + 36 indices
        assert_eq!(bytes.len(), 4 + 8 * 12 + 4 + 36 * 4);
        assert_eq!(&bytes[..4], &8u32.to_le_bytes());

        let back = read(Cursor::new(bytes)).unwrap();
        assert_eq!(back, cube);
    }

    #[test]
    fn test_obj_geometry() {
        let src = "\
# a quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vn 0 0 1
f 1/1/1 2/2/1 3/3/1 4/4/1
";
        let g = obj_geometry(Cursor::new(src)).unwrap();
        assert_eq!(g.v.len(), 4);
        // fan triangulated quad
        assert_eq!(g.idx, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn test_obj_bad_face() {
        assert!(obj_geometry(Cursor::new("v 0 0 0\nf 1 2 3\n")).is_err());
        assert!(obj_geometry(Cursor::new("f one two three\n")).is_err());
    }

    #[test]
    fn test_importer_unavailable_for_fbx() {
        let got = ObjImporter.import(Path::new("whatever.fbx")).unwrap();
        assert_eq!(got, None);
    }
}
