//! # STL mesh loading
//!
//! Loads triangle meshes from binary or ASCII STL files, and caches them so each asset is only
//! read from disk once.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use byteorder::{ByteOrder, LittleEndian};
use log::debug;
use nalgebra::{Point3, Vector3};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Length of the binary STL header
const BIN_HEADER_LEN: usize = 80;

/// Length of one triangle record in a binary STL (normal, 3 vertices, attribute count)
const BIN_TRIANGLE_LEN: usize = 50;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A single facet of a mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// Facet normal as stored in the file (may be zero, in which case renderers should compute it
    /// from the vertices)
    pub normal: Vector3<f32>,

    pub vertices: [Point3<f32>; 3],
}

/// A triangle mesh.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

/// Axis aligned bounds of a mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

/// Cache of loaded meshes keyed by their path.
#[derive(Default)]
pub struct MeshCache {
    meshes: HashMap<PathBuf, Arc<Mesh>>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StlError {
    #[error("Could not read the mesh file {0:?}: {1}")]
    ReadError(PathBuf, std::io::Error),

    #[error("Binary STL is truncated: expected {expected} bytes, found {found}")]
    Truncated { expected: usize, found: usize },

    #[error("File is neither a binary nor an ASCII STL")]
    UnknownFormat,

    #[error("ASCII STL is malformed at line {0}: {1}")]
    AsciiSyntax(usize, String),

    #[error("The mesh contains no triangles")]
    Empty,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Mesh {
    /// Load a mesh from an STL file on disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StlError> {
        let bytes = std::fs::read(path.as_ref())
            .map_err(|e| StlError::ReadError(path.as_ref().to_path_buf(), e))?;

        Self::from_stl_bytes(&bytes)
    }

    /// Parse a mesh from the contents of an STL file, detecting whether it is binary or ASCII.
    pub fn from_stl_bytes(bytes: &[u8]) -> Result<Self, StlError> {
        // ASCII files start with "solid", but so do some binary headers, so the binary length
        // check takes priority.
        let mesh = if is_binary_stl(bytes) {
            parse_binary(bytes)?
        } else if bytes.starts_with(b"solid") {
            match std::str::from_utf8(bytes) {
                Ok(s) => parse_ascii(s)?,
                Err(_) => return Err(StlError::UnknownFormat),
            }
        } else if bytes.len() >= BIN_HEADER_LEN + 4 {
            // Not a self-consistent binary file, report how far off it is
            parse_binary(bytes)?
        } else {
            return Err(StlError::UnknownFormat);
        };

        if mesh.triangles.is_empty() {
            return Err(StlError::Empty);
        }

        Ok(mesh)
    }

    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Axis aligned bounds, or `None` for an empty mesh.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut verts = self.triangles.iter().flat_map(|t| t.vertices.iter());
        let first = verts.next()?;

        let mut min = *first;
        let mut max = *first;

        for v in verts {
            for i in 0..3 {
                min[i] = min[i].min(v[i]);
                max[i] = max[i].max(v[i]);
            }
        }

        Some(Bounds { min, max })
    }
}

impl Bounds {
    pub fn centre(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Radius of the sphere centred on `centre()` which encloses the bounds.
    pub fn radius(&self) -> f32 {
        (self.max - self.min).norm() / 2.0
    }
}

impl MeshCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the mesh at `path`, loading it only if it isn't already cached.
    pub fn get_or_load<P: AsRef<Path>>(&mut self, path: P) -> Result<Arc<Mesh>, StlError> {
        if let Some(m) = self.meshes.get(path.as_ref()) {
            return Ok(m.clone());
        }

        let mesh = Arc::new(Mesh::load(path.as_ref())?);

        debug!(
            "Loaded mesh {:?} ({} triangles)",
            path.as_ref(),
            mesh.num_triangles()
        );

        self.meshes.insert(path.as_ref().to_path_buf(), mesh.clone());

        Ok(mesh)
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn is_binary_stl(bytes: &[u8]) -> bool {
    if bytes.len() < BIN_HEADER_LEN + 4 {
        return false;
    }

    let count = LittleEndian::read_u32(&bytes[BIN_HEADER_LEN..]) as usize;

    bytes.len() == BIN_HEADER_LEN + 4 + count * BIN_TRIANGLE_LEN
}

fn parse_binary(bytes: &[u8]) -> Result<Mesh, StlError> {
    let count = LittleEndian::read_u32(&bytes[BIN_HEADER_LEN..]) as usize;

    let expected = BIN_HEADER_LEN + 4 + count * BIN_TRIANGLE_LEN;
    if bytes.len() < expected {
        return Err(StlError::Truncated {
            expected,
            found: bytes.len(),
        });
    }

    let read_vec3 = |buf: &[u8]| {
        Vector3::new(
            LittleEndian::read_f32(&buf[0..4]),
            LittleEndian::read_f32(&buf[4..8]),
            LittleEndian::read_f32(&buf[8..12]),
        )
    };

    let triangles = bytes[BIN_HEADER_LEN + 4..expected]
        .chunks_exact(BIN_TRIANGLE_LEN)
        .map(|rec| Triangle {
            normal: read_vec3(&rec[0..12]),
            vertices: [
                Point3::from(read_vec3(&rec[12..24])),
                Point3::from(read_vec3(&rec[24..36])),
                Point3::from(read_vec3(&rec[36..48])),
            ],
        })
        .collect();

    Ok(Mesh { triangles })
}

fn parse_ascii(text: &str) -> Result<Mesh, StlError> {
    let mut triangles = Vec::new();

    let mut normal = Vector3::zeros();
    let mut verts: Vec<Point3<f32>> = Vec::with_capacity(3);

    for (idx, line) in text.lines().enumerate() {
        let line_num = idx + 1;
        let mut tokens = line.split_whitespace();

        match tokens.next() {
            Some("facet") => {
                if tokens.next() != Some("normal") {
                    return Err(StlError::AsciiSyntax(
                        line_num,
                        "expected \"facet normal\"".into(),
                    ));
                }
                normal = parse_vec3(&mut tokens, line_num)?;
                verts.clear();
            }
            Some("vertex") => {
                verts.push(Point3::from(parse_vec3(&mut tokens, line_num)?));
            }
            Some("endfacet") => {
                if verts.len() != 3 {
                    return Err(StlError::AsciiSyntax(
                        line_num,
                        format!("facet has {} vertices, expected 3", verts.len()),
                    ));
                }
                triangles.push(Triangle {
                    normal,
                    vertices: [verts[0], verts[1], verts[2]],
                });
                verts.clear();
            }
            // solid, endsolid, outer loop, endloop and blank lines carry no geometry
            _ => (),
        }
    }

    Ok(Mesh { triangles })
}

fn parse_vec3<'a, I>(tokens: &mut I, line_num: usize) -> Result<Vector3<f32>, StlError>
where
    I: Iterator<Item = &'a str>,
{
    let mut v = Vector3::zeros();

    for i in 0..3 {
        let tok = tokens.next().ok_or_else(|| {
            StlError::AsciiSyntax(line_num, "expected three coordinates".into())
        })?;
        v[i] = tok.parse().map_err(|_| {
            StlError::AsciiSyntax(line_num, format!("\"{}\" is not a number", tok))
        })?;
    }

    Ok(v)
}

#[cfg(test)]
mod test {
    use super::*;
    use byteorder::WriteBytesExt;

    fn binary_tetra_face() -> Vec<u8> {
        let mut bytes = vec![0u8; BIN_HEADER_LEN];
        bytes.write_u32::<LittleEndian>(2).unwrap();

        let tris: [[f32; 12]; 2] = [
            [0., 0., 1., 0., 0., 0., 1., 0., 0., 0., 1., 0.],
            [0., 0., -1., 0., 0., 0., 0., 1., 0., 1., 0., 0.],
        ];
        for t in tris.iter() {
            for f in t.iter() {
                bytes.write_f32::<LittleEndian>(*f).unwrap();
            }
            bytes.write_u16::<LittleEndian>(0).unwrap();
        }

        bytes
    }

    const ASCII_STL: &str = "solid part
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 2 0 0
      vertex 0 4 0
    endloop
  endfacet
endsolid part
";

    #[test]
    fn test_parse_binary() {
        let mesh = Mesh::from_stl_bytes(&binary_tetra_face()).unwrap();

        assert_eq!(mesh.num_triangles(), 2);
        assert_eq!(mesh.triangles[0].normal, Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(mesh.triangles[1].vertices[1], Point3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_parse_binary_truncated() {
        let mut bytes = binary_tetra_face();
        bytes.truncate(bytes.len() - 10);

        assert!(matches!(
            Mesh::from_stl_bytes(&bytes),
            Err(StlError::Truncated { .. })
        ));
    }

    #[test]
    fn test_parse_ascii() {
        let mesh = Mesh::from_stl_bytes(ASCII_STL.as_bytes()).unwrap();

        assert_eq!(mesh.num_triangles(), 1);
        let bounds = mesh.bounds().unwrap();
        assert_eq!(bounds.min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(bounds.max, Point3::new(2.0, 4.0, 0.0));
        assert_eq!(bounds.centre(), Point3::new(1.0, 2.0, 0.0));
        assert!((bounds.radius() - 5f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Mesh::from_stl_bytes(b"hello"),
            Err(StlError::UnknownFormat)
        ));
        assert!(matches!(
            Mesh::from_stl_bytes(b"solid empty\nendsolid empty\n"),
            Err(StlError::Empty)
        ));
        assert!(matches!(
            Mesh::from_stl_bytes(b"solid bad\nfacet normal 0 0 x\n"),
            Err(StlError::AsciiSyntax(2, _))
        ));
    }

    #[test]
    fn test_mesh_cache_loads_once() {
        let dir = std::env::temp_dir().join(format!("gnd_stl_cache_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("part.stl");
        std::fs::write(&path, ASCII_STL).unwrap();

        let mut cache = MeshCache::new();
        let a = cache.get_or_load(&path).unwrap();

        // Removing the file proves the second lookup doesn't touch the disk
        std::fs::remove_file(&path).unwrap();
        let b = cache.get_or_load(&path).unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);

        assert!(matches!(
            cache.get_or_load(dir.join("missing.stl")),
            Err(StlError::ReadError(_, _))
        ));
    }
}
