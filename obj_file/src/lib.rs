use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::{debug, warn};
use thiserror::Error;

use ray_tracer::prelude::*;

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("failed to open the file: {0}")]
    CouldNotOpenFile(#[from] std::io::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("missing vertex at index {0}")]
    MissingVertex(usize),
}

pub type Result<T> = std::result::Result<T, ParserError>;

/// Triangles of a named `g` group.
#[derive(Debug, Clone)]
pub struct ObjGroup {
    pub name: String,
    pub triangles: Vec<Triangle>,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedObj {
    pub ignored_lines: u32,
    pub vertices: Vec<Point>,
    /// Faces that appear before any named group.
    pub default_group: Vec<Triangle>,
    pub groups: Vec<ObjGroup>,
}

impl ParsedObj {
    pub fn get_group(&self, group_name: &str) -> Option<&ObjGroup> {
        self.groups.iter().find(|group| group.name == group_name)
    }

    pub fn triangle_count(&self) -> usize {
        self.default_group.len()
            + self
                .groups
                .iter()
                .map(|group| group.triangles.len())
                .sum::<usize>()
    }

    /// All faces as one composite, each named group nested as its own composite.
    pub fn into_geometries(self) -> Geometries {
        let mut geometries = Geometries::new();
        for triangle in self.default_group {
            geometries.add(triangle);
        }
        for group in self.groups {
            let mut children = Geometries::new();
            for triangle in group.triangles {
                children.add(triangle);
            }
            geometries.add(children);
        }
        geometries
    }
}

fn parse_coordinate(token: Option<&&str>, line_no: usize) -> Result<f64> {
    let token = token.ok_or_else(|| {
        ParserError::InvalidInput(format!("Malformed vertex record on line {line_no}"))
    })?;
    token.parse::<f64>().map_err(|_| {
        ParserError::InvalidInput(format!(
            "Invalid vertex record on line {line_no}: {token}"
        ))
    })
}

/// Parses OBJ text. Every triangle gets `material` (or the default material);
/// polygonal faces are split into a fan of triangles around their first vertex.
pub fn parse_obj_string(value: impl Into<String>, material: Option<Material>) -> Result<ParsedObj> {
    let string: String = value.into();
    let material = material.unwrap_or_default();

    let mut parsed = ParsedObj::default();

    for (n, line) in string.lines().enumerate() {
        let tokens = line.split_whitespace().collect::<Vec<_>>();
        if tokens.is_empty() {
            continue;
        }

        let line_no = n + 1;

        match tokens[0] {
            "v" => {
                let x = parse_coordinate(tokens.get(1), line_no)?;
                let y = parse_coordinate(tokens.get(2), line_no)?;
                let z = parse_coordinate(tokens.get(3), line_no)?;
                parsed.vertices.push(Point::new(x, y, z));
            }
            "f" => {
                if tokens.len() < 4 {
                    return Err(ParserError::InvalidInput(format!(
                        "Face record on line {line_no} needs at least 3 vertices"
                    )));
                }

                let mut face_vertices = vec![];
                for token in &tokens[1..] {
                    // v, v/vt, v//vn and v/vt/vn all start with the vertex index
                    let vertex_index = token.split('/').next().unwrap_or_default();
                    let vertex_index = vertex_index.parse::<usize>().map_err(|_| {
                        ParserError::InvalidInput(format!(
                            "Invalid vertex index for face record on line {line_no}: {vertex_index}"
                        ))
                    })?;

                    // indices in OBJ files are 1-based
                    let vertex = vertex_index
                        .checked_sub(1)
                        .and_then(|index| parsed.vertices.get(index))
                        .ok_or(ParserError::MissingVertex(vertex_index))?;
                    face_vertices.push(*vertex);
                }

                let mut triangles = vec![];
                for index in 1..face_vertices.len() - 1 {
                    match Triangle::new(
                        face_vertices[0],
                        face_vertices[index],
                        face_vertices[index + 1],
                    ) {
                        Ok(triangle) => triangles.push(triangle.with_material(material)),
                        Err(err) => warn!("Skipping degenerate face on line {line_no}: {err}"),
                    }
                }

                match parsed.groups.last_mut() {
                    Some(group) => group.triangles.append(&mut triangles),
                    None => parsed.default_group.append(&mut triangles),
                }
            }
            "g" => {
                let name = tokens
                    .get(1)
                    .ok_or(ParserError::InvalidInput(format!(
                        "Malformed named group record on line {line_no}: missing group name"
                    )))?
                    .to_string();
                parsed.groups.push(ObjGroup {
                    name,
                    triangles: vec![],
                });
            }
            _ => {
                debug!("Ignoring line {line_no}: {line}");
                parsed.ignored_lines += 1;
            }
        }
    }

    if parsed.ignored_lines > 0 {
        warn!("Ignored {} unrecognized OBJ lines", parsed.ignored_lines);
    }
    Ok(parsed)
}

pub fn parse_obj_file(filename: impl AsRef<Path>, material: Option<Material>) -> Result<ParsedObj> {
    let mut file = File::open(filename)?;
    let mut buffer = String::new();
    file.read_to_string(&mut buffer)?;

    parse_obj_string(buffer, material)
}
