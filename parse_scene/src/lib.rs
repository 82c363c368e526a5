use std::path::{Path, PathBuf};

use log::{debug, info};
use serde_yaml::{Mapping, Sequence, Value};
use thiserror::Error;

use ray_tracer::prelude::*;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("YAML deserialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Ray tracer error: {0}")]
    RayTracer(#[from] ray_tracer::RayTracerError),

    #[error("OBJ file error: {0}")]
    Obj(#[from] obj_file::ParserError),

    #[error("Could not read the scene file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML object: {0}")]
    InvalidYamlObject(String),

    #[error("Encountered unknown item: {0}")]
    UnknownItem(String),

    #[error("The scene is missing camera defintion")]
    MissingCamera,

    #[error("Invalid parameters for camera: {0}")]
    InvalidCameraParams(String),

    #[error("Invalid parameters for render: {0}")]
    InvalidRenderParams(String),

    #[error("Invalid parameters for light: {0}")]
    InvalidLightParams(String),

    #[error("Invalid parameters for shape: {0}")]
    InvalidShapeParams(String),

    #[error("Invalid parameters for a constant definition: {0}")]
    InvalidDefinitionParams(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Invalid parameters for group: {0}")]
    InvalidGroupParams(String),
}

type Result<T> = std::result::Result<T, ParseError>;

// only a missing key falls back to the default; a present key must hold a number
macro_rules! get_or_default_f64 {
    ($mapping:expr, $key:expr, $default:expr) => {
        match $mapping.get($key) {
            Some(value) => value.get_f64()?,
            None => $default,
        }
    };
}

/// A named material, usable by later items and definitions.
#[derive(Debug)]
struct Definition {
    name: String,
    material: Material,
}

/// Everything a scene file describes: the world, how to look at it
/// and how to render it.
#[derive(Debug)]
pub struct SceneDescription {
    pub scene: Scene,
    pub camera: Camera,
    /// Image size in pixels.
    pub width: usize,
    pub height: usize,
    pub settings: RenderSettings,
}

trait GetF64 {
    fn get_f64(&self) -> Result<f64>;
}

trait GetF64Vec {
    fn get_f64_vec(&self) -> Result<Vec<f64>>;
}

trait GetTriple {
    fn get_triple(&self) -> Result<[f64; 3]>;
}

impl GetF64 for Value {
    fn get_f64(&self) -> Result<f64> {
        self.as_f64()
            .ok_or_else(|| ParseError::InvalidValue(format!("expected a number, found {self:?}")))
    }
}

impl GetF64Vec for Value {
    fn get_f64_vec(&self) -> Result<Vec<f64>> {
        self.as_sequence()
            .ok_or(ParseError::InvalidValue(format!("{self:#?}")))?
            .iter()
            .map(|f| f.get_f64())
            .collect::<Result<Vec<f64>>>()
    }
}

impl GetTriple for Value {
    fn get_triple(&self) -> Result<[f64; 3]> {
        match self.get_f64_vec()?.as_slice() {
            [x, y, z] => Ok([*x, *y, *z]),
            _ => Err(ParseError::InvalidValue(format!(
                "expected [x, y, z], found {self:?}"
            ))),
        }
    }
}

fn require<'a>(description: &'a Mapping, key: &str, error: fn(String) -> ParseError) -> Result<&'a Value> {
    description
        .get(key)
        .ok_or_else(|| error(format!("Missing '{key}'")))
}

fn get_point(description: &Mapping, key: &str, error: fn(String) -> ParseError) -> Result<Point> {
    let [x, y, z] = require(description, key, error)?.get_triple()?;
    Ok(Point::new(x, y, z))
}

fn get_vector(description: &Mapping, key: &str, error: fn(String) -> ParseError) -> Result<Vector> {
    let [x, y, z] = require(description, key, error)?.get_triple()?;
    Ok(Vector::new(x, y, z))
}

fn get_color(value: &Value) -> Result<Color> {
    let [red, green, blue] = value.get_triple()?;
    Ok(Color::new(red, green, blue))
}

/// A coefficient is either one number for all channels or `[r, g, b]`.
fn get_coefficients(value: &Value) -> Result<Coefficients> {
    if let Some(uniform) = value.as_f64() {
        return Ok(Coefficients::uniform(uniform));
    }
    let [red, green, blue] = value.get_triple()?;
    Ok(Coefficients::new(red, green, blue))
}

fn get_usize(description: &Mapping, key: &str) -> Result<Option<usize>> {
    description
        .get(key)
        .map(|value| {
            value
                .as_u64()
                .map(|value| value as usize)
                .ok_or(ParseError::InvalidValue(format!(
                    "'{key}' must be a non-negative integer"
                )))
        })
        .transpose()
}

/// Overrides the fields of `base` that the description mentions.
fn apply_material(base: Material, description: &Value) -> Result<Material> {
    if !description.is_mapping() {
        return Err(ParseError::InvalidValue(format!(
            "A material must be a mapping, found {description:?}"
        )));
    }

    let mut material = base;
    if let Some(kd) = description.get("kd") {
        material.diffuse = get_coefficients(kd)?;
    }
    if let Some(ks) = description.get("ks") {
        material.specular = get_coefficients(ks)?;
    }
    if let Some(kt) = description.get("kt") {
        material.transparency = get_coefficients(kt)?;
    }
    if let Some(kr) = description.get("kr") {
        material.reflectivity = get_coefficients(kr)?;
    }
    if let Some(shininess) = description.get("shininess") {
        material.shininess = shininess.get_f64()?;
    }
    Ok(material)
}

fn find_material(definitions: &[Definition], name: &str) -> Result<Material> {
    definitions
        .iter()
        .find(|d| d.name == name)
        .map(|d| d.material)
        .ok_or(ParseError::InvalidDefinitionParams(format!(
            "Definition {name} not found"
        )))
}

fn parse_definition(description: &Mapping, definitions: &[Definition]) -> Result<Definition> {
    let name = description
        .get("define")
        .and_then(|x| x.as_str())
        .ok_or(ParseError::InvalidDefinitionParams(
            "Missing 'define' field".to_string(),
        ))?
        .to_string();

    let value = require(description, "value", ParseError::InvalidDefinitionParams)?;

    // a definition can extend an earlier one, overriding some of its fields
    let base = match description.get("extend") {
        Some(extend) => {
            let original = extend
                .as_str()
                .ok_or(ParseError::InvalidValue(format!("{extend:#?}")))?;
            find_material(definitions, original)?
        }
        None => Material::default(),
    };

    Ok(Definition {
        name,
        material: apply_material(base, value)?,
    })
}

fn construct_camera(description: &Mapping) -> Result<(Camera, usize, usize)> {
    let width = get_usize(description, "width")?.ok_or(ParseError::InvalidCameraParams(
        "Missing camera width".to_string(),
    ))?;
    let height = get_usize(description, "height")?.ok_or(ParseError::InvalidCameraParams(
        "Missing camera height".to_string(),
    ))?;

    let eye = get_point(description, "eye", ParseError::InvalidCameraParams)?;
    let forward = get_vector(description, "forward", ParseError::InvalidCameraParams)?;
    let up = get_vector(description, "up", ParseError::InvalidCameraParams)?;

    let view_plane = require(description, "view-plane", ParseError::InvalidCameraParams)?
        .get_f64_vec()?;
    let [plane_width, plane_height] = view_plane.as_slice() else {
        return Err(ParseError::InvalidCameraParams(
            "'view-plane' must be [width, height]".to_string(),
        ));
    };
    let distance = require(description, "distance", ParseError::InvalidCameraParams)?.get_f64()?;

    let camera = Camera::builder(eye, forward, up)?
        .view_plane_size(*plane_width, *plane_height)
        .view_plane_distance(distance)
        .build()?;

    Ok((camera, width, height))
}

fn construct_render_settings(description: &Mapping) -> Result<RenderSettings> {
    let mut settings = RenderSettings::default();
    if let Some(samples) = get_usize(description, "samples")? {
        settings.samples_per_axis = samples;
    }
    if let Some(adaptive) = description.get("adaptive") {
        settings.adaptive = adaptive.as_bool().ok_or(ParseError::InvalidRenderParams(
            "'adaptive' must be true or false".to_string(),
        ))?;
    }
    if let Some(level) = get_usize(description, "adaptive-level")? {
        settings.adaptive_max_level = level;
    }
    if let Some(level) = get_usize(description, "max-level")? {
        settings.max_level = level;
    }
    if let Some(threads) = get_usize(description, "threads")? {
        settings.threads = Some(threads);
    }

    settings
        .validate()
        .map_err(|e| ParseError::InvalidRenderParams(e.to_string()))?;
    Ok(settings)
}

fn apply_scene_settings(scene: Scene, description: &Mapping) -> Result<Scene> {
    let mut scene = scene;
    if let Some(name) = description.get("name").and_then(|x| x.as_str()) {
        scene.name = name.to_string();
    }
    if let Some(background) = description.get("background") {
        scene.background = get_color(background)?;
    }
    if let Some(ambient) = description.get("ambient") {
        let color = ambient
            .get("color")
            .map(get_color)
            .transpose()?
            .unwrap_or_else(Color::white);
        let ka = ambient
            .get("ka")
            .map(get_coefficients)
            .transpose()?
            .unwrap_or(Coefficients::ONE);
        scene.ambient_light = AmbientLight::new(color, ka);
    }
    Ok(scene)
}

fn construct_light(description: &Mapping) -> Result<Box<dyn LightSource>> {
    let intensity = get_color(require(
        description,
        "intensity",
        ParseError::InvalidLightParams,
    )?)?;
    let light_type = description
        .get("type")
        .and_then(|x| x.as_str())
        .unwrap_or("point");

    let kc = get_or_default_f64!(description, "kc", 1.);
    let kl = get_or_default_f64!(description, "kl", 0.);
    let kq = get_or_default_f64!(description, "kq", 0.);

    let light: Box<dyn LightSource> = match light_type {
        "point" => {
            let position = get_point(description, "at", ParseError::InvalidLightParams)?;
            Box::new(PointLight::new(position, intensity).with_attenuation(kc, kl, kq)?)
        }
        "spot" => {
            let position = get_point(description, "at", ParseError::InvalidLightParams)?;
            let direction = get_vector(description, "direction", ParseError::InvalidLightParams)?;
            let narrow_beam = get_or_default_f64!(description, "narrow-beam", 1.);
            Box::new(
                SpotLight::new(position, intensity, direction)?
                    .with_attenuation(kc, kl, kq)?
                    .with_narrow_beam(narrow_beam),
            )
        }
        "directional" => {
            let direction = get_vector(description, "direction", ParseError::InvalidLightParams)?;
            Box::new(DirectionalLight::new(intensity, direction)?)
        }
        _ => {
            return Err(ParseError::InvalidLightParams(format!(
                "Unknown light type: {light_type}"
            )))
        }
    };
    Ok(light)
}

fn get_vertices(description: &Mapping) -> Result<Vec<Point>> {
    require(description, "vertices", ParseError::InvalidShapeParams)?
        .as_sequence()
        .ok_or(ParseError::InvalidShapeParams(
            "'vertices' must be a sequence of points".to_string(),
        ))?
        .iter()
        .map(|value| {
            let [x, y, z] = value.get_triple()?;
            Ok(Point::new(x, y, z))
        })
        .collect()
}

fn construct_object(
    description: &Mapping,
    definitions: &[Definition],
    base_dir: &Path,
) -> Result<Box<dyn Intersect>> {
    let object_type = description
        .get("add")
        .ok_or(ParseError::InvalidValue(
            "An object definition must have an 'add' key".to_string(),
        ))?
        .as_str()
        .ok_or(ParseError::InvalidValue(
            "Object's 'add' must be a string".to_string(),
        ))?;

    let material = match description.get("material") {
        // a string refers to a definition
        Some(Value::String(definition_name)) => find_material(definitions, definition_name)?,
        Some(material_description) => apply_material(Material::default(), material_description)?,
        None => Material::default(),
    };

    let emission = description
        .get("emission")
        .map(get_color)
        .transpose()?
        .unwrap_or_default();

    let object: Box<dyn Intersect> = match object_type {
        "sphere" => {
            let center = match description.get("center") {
                Some(_) => get_point(description, "center", ParseError::InvalidShapeParams)?,
                None => Point::ORIGIN,
            };
            let radius = get_or_default_f64!(description, "radius", 1.);
            Box::new(
                Sphere::new(center, radius)?
                    .with_material(material)
                    .with_emission(emission),
            )
        }
        "plane" => {
            let point = get_point(description, "point", ParseError::InvalidShapeParams)?;
            let normal = get_vector(description, "normal", ParseError::InvalidShapeParams)?;
            Box::new(
                Plane::new(point, normal)?
                    .with_material(material)
                    .with_emission(emission),
            )
        }
        "triangle" => {
            let vertices = get_vertices(description)?;
            let [a, b, c] = vertices.as_slice() else {
                return Err(ParseError::InvalidShapeParams(format!(
                    "A triangle needs exactly 3 vertices, got {}",
                    vertices.len()
                )));
            };
            Box::new(
                Triangle::new(*a, *b, *c)?
                    .with_material(material)
                    .with_emission(emission),
            )
        }
        "polygon" => Box::new(
            Polygon::new(get_vertices(description)?)?
                .with_material(material)
                .with_emission(emission),
        ),
        "tube" | "cylinder" => {
            let origin = get_point(description, "origin", ParseError::InvalidShapeParams)?;
            let direction = get_vector(description, "direction", ParseError::InvalidShapeParams)?;
            let radius = require(description, "radius", ParseError::InvalidShapeParams)?.get_f64()?;
            let axis = Ray::new(origin, direction)?;

            if object_type == "tube" {
                Box::new(
                    Tube::new(axis, radius)?
                        .with_material(material)
                        .with_emission(emission),
                )
            } else {
                let height =
                    require(description, "height", ParseError::InvalidShapeParams)?.get_f64()?;
                Box::new(
                    Cylinder::new(axis, radius, height)?
                        .with_material(material)
                        .with_emission(emission),
                )
            }
        }
        "group" => {
            let children = description
                .get("children")
                .ok_or(ParseError::InvalidGroupParams(
                    "Missing 'children' in group definition".to_string(),
                ))?
                .as_sequence()
                .ok_or(ParseError::InvalidGroupParams(
                    "Group 'children' must be a sequence".to_string(),
                ))?;

            let mut group = Geometries::new();
            for child in children {
                let child = child.as_mapping().ok_or(ParseError::InvalidGroupParams(
                    "Each value in a group's 'children' must be a mapping".to_string(),
                ))?;
                group.add_boxed(construct_object(child, definitions, base_dir)?);
            }
            Box::new(group)
        }
        "obj" => {
            let file = description
                .get("file")
                .and_then(|x| x.as_str())
                .ok_or(ParseError::InvalidShapeParams(
                    "An obj item needs a 'file'".to_string(),
                ))?;
            let path = base_dir.join(file);
            let parsed = obj_file::parse_obj_file(&path, Some(material))?;
            debug!(
                "Loaded {} triangles from {}",
                parsed.triangle_count(),
                path.display()
            );
            Box::new(parsed.into_geometries())
        }
        _ => return Err(ParseError::UnknownItem(object_type.to_string())),
    };

    Ok(object)
}

/// Parses a scene description. OBJ files are looked up relative to the current directory.
pub fn parse_scene(input: &str) -> Result<SceneDescription> {
    parse_scene_in(input, Path::new("."))
}

/// Reads and parses a scene file. OBJ files are looked up relative to the file.
pub fn parse_scene_file(path: impl AsRef<Path>) -> Result<SceneDescription> {
    let path = path.as_ref();
    let input = std::fs::read_to_string(path)?;
    let base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let mut description = parse_scene_in(&input, &base_dir)?;
    if description.scene.name.is_empty() {
        if let Some(stem) = path.file_stem() {
            description.scene.name = stem.to_string_lossy().into_owned();
        }
    }
    Ok(description)
}

fn parse_scene_in(input: &str, base_dir: &Path) -> Result<SceneDescription> {
    let sequence = serde_yaml::from_str::<Sequence>(input)?;

    let mut camera: Option<(Camera, usize, usize)> = None;
    let mut settings = RenderSettings::default();
    let mut scene = Scene::default();
    let mut definitions = vec![];

    for item in sequence {
        let Some(mapping) = item.as_mapping() else {
            return Err(ParseError::InvalidYamlObject(format!(
                "Expected mapping, found {item:#?}"
            )));
        };

        if let Some(Value::String(item_type)) = mapping.get("add") {
            match item_type.as_str() {
                "camera" => {
                    camera = Some(construct_camera(mapping)?);
                }
                "render" => {
                    settings = construct_render_settings(mapping)?;
                }
                "scene" => {
                    scene = apply_scene_settings(scene, mapping)?;
                }
                "light" => {
                    scene.lights.push(construct_light(mapping)?);
                }
                "sphere" | "plane" | "triangle" | "polygon" | "tube" | "cylinder" | "group"
                | "obj" => {
                    let object = construct_object(mapping, &definitions, base_dir)?;
                    scene.geometries.add_boxed(object);
                }
                _ => return Err(ParseError::UnknownItem(item_type.to_owned())),
            }
        } else if let Some(Value::String(_)) = mapping.get("define") {
            let definition = parse_definition(mapping, &definitions)?;
            debug!("Defined material {}", definition.name);
            definitions.push(definition);
        } else {
            return Err(ParseError::InvalidYamlObject(format!(
                "Expected an 'add' or 'define' item, found {mapping:?}"
            )));
        }
    }

    let (camera, width, height) = camera.ok_or(ParseError::MissingCamera)?;

    info!(
        "Parsed scene with {} objects and {} lights",
        scene.geometries.len(),
        scene.lights.len()
    );

    Ok(SceneDescription {
        scene,
        camera,
        width,
        height,
        settings,
    })
}
