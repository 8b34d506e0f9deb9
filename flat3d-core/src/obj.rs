/// Wavefront OBJ loader (positions and faces only)
use std::fs;
use std::path::Path;

use nalgebra::Point3;
use nom::{
    bytes::complete::{tag, take_till},
    character::complete::{char, digit1, space0, space1},
    combinator::{all_consuming, map_res, opt, recognize},
    multi::many1,
    number::complete::float,
    sequence::{pair, preceded, terminated},
    IResult,
};

use crate::error::{Error, Result};
use crate::geometry::{Mesh, Triangle};

/// Parse OBJ text into a mesh.
///
/// `v` lines add vertices, `f` lines add faces by 1-based (or negative,
/// end-relative) vertex index. Polygons are fan-triangulated. Every other
/// statement is ignored.
pub fn parse_obj(text: &str) -> Result<Mesh> {
    let mut vertices: Vec<Point3<f32>> = Vec::new();
    let mut mesh = Mesh::new();

    for (number, raw) in text.lines().enumerate() {
        let line_no = number + 1;
        let line = raw.split('#').next().unwrap_or("").trim();

        match line.split_whitespace().next() {
            Some("v") => {
                let (_, vertex) = all_consuming(parse_vertex)(line)
                    .map_err(|_| obj_error(line_no, format!("malformed vertex `{}`", line)))?;
                vertices.push(vertex);
            }
            Some("f") => {
                let (_, indices) = all_consuming(parse_face)(line)
                    .map_err(|_| obj_error(line_no, format!("malformed face `{}`", line)))?;
                if indices.len() < 3 {
                    return Err(obj_error(
                        line_no,
                        format!("face needs at least 3 vertices, got {}", indices.len()),
                    ));
                }

                let resolved = indices
                    .iter()
                    .map(|&i| {
                        resolve_index(i, vertices.len()).ok_or_else(|| {
                            obj_error(
                                line_no,
                                format!("vertex index {} out of range (have {})", i, vertices.len()),
                            )
                        })
                    })
                    .collect::<Result<Vec<usize>>>()?;

                for k in 1..resolved.len() - 1 {
                    mesh.add_triangle(Triangle::new(
                        vertices[resolved[0]],
                        vertices[resolved[k]],
                        vertices[resolved[k + 1]],
                    ));
                }
            }
            _ => {}
        }
    }

    Ok(mesh)
}

/// Read and parse an `.obj` file
pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<Mesh> {
    let path = path.as_ref();
    let is_obj = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("obj"));
    if !is_obj {
        return Err(Error::UnsupportedFormat(format!(
            "{} is not an .obj file",
            path.display()
        )));
    }

    let text = fs::read_to_string(path)?;
    let mesh = parse_obj(&text)?;
    log::info!("[OBJ] loaded {} triangles from {}", mesh.len(), path.display());
    Ok(mesh)
}

fn obj_error(line: usize, message: String) -> Error {
    Error::Obj { line, message }
}

fn resolve_index(index: i64, count: usize) -> Option<usize> {
    if index > 0 {
        let i = (index - 1) as usize;
        (i < count).then_some(i)
    } else if index < 0 {
        count.checked_sub(index.unsigned_abs() as usize)
    } else {
        None
    }
}

fn parse_vertex(input: &str) -> IResult<&str, Point3<f32>> {
    let (input, _) = tag("v")(input)?;
    let (input, (x, y, z)) = parse_vector3(input)?;
    // Optional homogeneous weight, unused
    let (input, _) = opt(preceded(space1, float))(input)?;
    let (input, _) = space0(input)?;
    Ok((input, Point3::new(x, y, z)))
}

fn parse_vector3(input: &str) -> IResult<&str, (f32, f32, f32)> {
    let (input, _) = space1(input)?;
    let (input, x) = float(input)?;
    let (input, _) = space1(input)?;
    let (input, y) = float(input)?;
    let (input, _) = space1(input)?;
    let (input, z) = float(input)?;
    Ok((input, (x, y, z)))
}

fn parse_face(input: &str) -> IResult<&str, Vec<i64>> {
    let (input, _) = tag("f")(input)?;
    let (input, indices) = many1(preceded(space1, parse_face_index))(input)?;
    let (input, _) = space0(input)?;
    Ok((input, indices))
}

/// `v`, `v/vt`, `v//vn` or `v/vt/vn`; only the position index is kept
fn parse_face_index(input: &str) -> IResult<&str, i64> {
    terminated(
        map_res(recognize(pair(opt(char('-')), digit1)), |s: &str| {
            s.parse::<i64>()
        }),
        opt(preceded(char('/'), take_till(|c: char| c.is_whitespace()))),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PRIMARY;

    const TETRA: &str = "\
# a tetrahedron
o tetra
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
v 0.0 0.0 1.0
vn 0 0 1
f 1 2 3
f 1/1/1 2/2/2 4/4/4
f 1//1 3//3 4//4
f -4 -2 -1
";

    #[test]
    fn test_parse_tetrahedron() {
        let mesh = parse_obj(TETRA).unwrap();
        assert_eq!(mesh.len(), 4);
        assert!(mesh.triangles.iter().all(|t| t.color == PRIMARY));

        let first = mesh.triangles[0];
        assert_eq!(first.vertices[1], Point3::new(1.0, 0.0, 0.0));
        assert_eq!(first.vertices[2], Point3::new(0.0, 1.0, 0.0));

        // Negative indices count back from the last vertex read
        let last = mesh.triangles[3];
        assert_eq!(last.vertices[0], Point3::new(0.0, 0.0, 0.0));
        assert_eq!(last.vertices[1], Point3::new(0.0, 1.0, 0.0));
        assert_eq!(last.vertices[2], Point3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_quad_is_fan_triangulated() {
        let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
        let mesh = parse_obj(text).unwrap();
        assert_eq!(mesh.len(), 2);
        assert_eq!(mesh.triangles[1].vertices[0], Point3::new(0.0, 0.0, 0.0));
        assert_eq!(mesh.triangles[1].vertices[1], Point3::new(1.0, 1.0, 0.0));
        assert_eq!(mesh.triangles[1].vertices[2], Point3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_vertex_variants() {
        let text = "v -1.5 2e1 .25 1.0\nv\t1\t2\t3   # trailing comment\nf 1 2 1\n";
        let mesh = parse_obj(text).unwrap();
        assert_eq!(mesh.triangles[0].vertices[0], Point3::new(-1.5, 20.0, 0.25));
        assert_eq!(mesh.triangles[0].vertices[1], Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_index_out_of_range() {
        let err = parse_obj("v 0 0 0\nv 1 0 0\nf 1 2 3\n").unwrap_err();
        assert!(matches!(err, Error::Obj { line: 3, .. }), "{}", err);

        let err = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n").unwrap_err();
        assert!(matches!(err, Error::Obj { line: 4, .. }));

        let err = parse_obj("v 0 0 0\nf -2 1 1\n").unwrap_err();
        assert!(matches!(err, Error::Obj { line: 2, .. }));
    }

    #[test]
    fn test_malformed_lines() {
        assert!(matches!(
            parse_obj("v 1.0 abc 2.0\n"),
            Err(Error::Obj { line: 1, .. })
        ));
        assert!(matches!(
            parse_obj("v 0 0 0\nv 1 0 0\nf 1 2\n"),
            Err(Error::Obj { line: 3, .. })
        ));
        assert!(matches!(
            parse_obj("v 0 0 0\nf one two three\n"),
            Err(Error::Obj { line: 2, .. })
        ));
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_obj("").unwrap().is_empty());
        assert!(parse_obj("# nothing\n\n").unwrap().is_empty());
    }

    #[test]
    fn test_load_rejects_other_extensions() {
        assert!(matches!(
            load_obj("model.stl"),
            Err(Error::UnsupportedFormat(_))
        ));
    }
}
