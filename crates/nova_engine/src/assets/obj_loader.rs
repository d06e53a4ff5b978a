//! Wavefront OBJ loader for scene meshes

use std::path::Path;

use super::AssetError;
use crate::render::mesh::Vertex;

/// Geometry parsed from an OBJ document
#[derive(Debug, Clone, Default)]
pub struct ObjMesh {
    /// One vertex per face corner
    pub vertices: Vec<Vertex>,
    /// Triangle list
    pub indices: Vec<u32>,
}

/// OBJ parser supporting `v`, `vt`, `vn` and polygonal `f` records
pub struct ObjLoader;

impl ObjLoader {
    /// Load an OBJ file from disk
    pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<ObjMesh, AssetError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let mesh = Self::parse(&contents)?;
        log::debug!(
            "Loaded OBJ {} ({} vertices, {} indices)",
            path.as_ref().display(),
            mesh.vertices.len(),
            mesh.indices.len()
        );
        Ok(mesh)
    }

    /// Parse OBJ text
    pub fn parse(source: &str) -> Result<ObjMesh, AssetError> {
        let mut positions: Vec<[f32; 3]> = Vec::new();
        let mut normals: Vec<[f32; 3]> = Vec::new();
        let mut tex_coords: Vec<[f32; 2]> = Vec::new();
        let mut mesh = ObjMesh::default();

        for (line_index, raw) in source.lines().enumerate() {
            let line_no = line_index + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut parts = line.split_whitespace();
            let Some(keyword) = parts.next() else { continue };
            let args: Vec<&str> = parts.collect();

            match keyword {
                "v" => positions.push(parse_floats::<3>(&args, line_no, "vertex")?),
                "vn" => normals.push(parse_floats::<3>(&args, line_no, "normal")?),
                "vt" => tex_coords.push(parse_floats::<2>(&args, line_no, "texture coordinate")?),
                "f" => {
                    if args.len() < 3 {
                        return Err(AssetError::Parse {
                            line: line_no,
                            message: format!("face needs at least 3 corners, got {}", args.len()),
                        });
                    }

                    let first = mesh.vertices.len() as u32;
                    for corner in &args {
                        let vertex = resolve_corner(corner, line_no, &positions, &tex_coords, &normals)?;
                        mesh.vertices.push(vertex);
                    }

                    // Fan triangulation
                    for i in 1..(args.len() as u32 - 1) {
                        mesh.indices.extend_from_slice(&[first, first + i, first + i + 1]);
                    }
                }
                _ => {}
            }
        }

        if mesh.vertices.is_empty() {
            return Err(AssetError::InvalidFormat("no faces found in OBJ data".to_string()));
        }

        Ok(mesh)
    }
}

fn parse_floats<const N: usize>(args: &[&str], line: usize, what: &str) -> Result<[f32; N], AssetError> {
    if args.len() < N {
        return Err(AssetError::Parse {
            line,
            message: format!("{what} needs {N} components"),
        });
    }

    let mut out = [0.0; N];
    for (slot, text) in out.iter_mut().zip(args) {
        *slot = text.parse().map_err(|_| AssetError::Parse {
            line,
            message: format!("invalid {what} component '{text}'"),
        })?;
    }
    Ok(out)
}

/// OBJ indices are 1-based; negative values count back from the latest element.
fn resolve_index(text: &str, len: usize, line: usize) -> Result<usize, AssetError> {
    let raw: i64 = text.parse().map_err(|_| AssetError::Parse {
        line,
        message: format!("invalid index '{text}'"),
    })?;

    let resolved = match raw {
        0 => None,
        r if r > 0 => usize::try_from(r - 1).ok(),
        r => usize::try_from(len as i64 + r).ok(),
    };

    resolved.filter(|&i| i < len).ok_or_else(|| AssetError::Parse {
        line,
        message: format!("index {raw} out of range (have {len})"),
    })
}

fn resolve_corner(
    corner: &str,
    line: usize,
    positions: &[[f32; 3]],
    tex_coords: &[[f32; 2]],
    normals: &[[f32; 3]],
) -> Result<Vertex, AssetError> {
    let mut fields = corner.split('/');

    let position = match fields.next() {
        Some(text) if !text.is_empty() => positions[resolve_index(text, positions.len(), line)?],
        _ => {
            return Err(AssetError::Parse {
                line,
                message: format!("face corner '{corner}' has no position"),
            })
        }
    };

    let tex_coord = match fields.next() {
        Some(text) if !text.is_empty() => tex_coords[resolve_index(text, tex_coords.len(), line)?],
        _ => [0.0, 0.0],
    };

    let normal = match fields.next() {
        Some(text) if !text.is_empty() => normals[resolve_index(text, normals.len(), line)?],
        _ => [0.0, 1.0, 0.0],
    };

    Ok(Vertex { position, normal, tex_coord })
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
# unit quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    #[test]
    fn test_quad_fan_triangulation() {
        let mesh = ObjLoader::parse(QUAD).unwrap();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.vertices[2].position, [1.0, 1.0, 0.0]);
        assert_eq!(mesh.vertices[2].tex_coord, [1.0, 1.0]);
        assert_eq!(mesh.vertices[2].normal, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_position_only_faces_get_defaults() {
        let mesh = ObjLoader::parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        assert_eq!(mesh.indices.len(), 3);
        assert_eq!(mesh.vertices[0].tex_coord, [0.0, 0.0]);
        assert_eq!(mesh.vertices[0].normal, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_negative_indices() {
        let mesh = ObjLoader::parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n").unwrap();
        assert_eq!(mesh.vertices[0].position, [0.0, 0.0, 0.0]);
        assert_eq!(mesh.vertices[2].position, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_out_of_range_index_reports_line() {
        let err = ObjLoader::parse("v 0 0 0\nf 1 2 3\n").unwrap_err();
        assert!(matches!(err, AssetError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_empty_document_rejected() {
        assert!(matches!(ObjLoader::parse("# nothing\n"), Err(AssetError::InvalidFormat(_))));
    }
}
