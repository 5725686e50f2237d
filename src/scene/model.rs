//! Wavefront OBJ models with per-mesh materials.
//!
//! Parsing is done with `tobj` into [`MeshData`]; uploading turns each mesh
//! into a [`GpuMesh`] and each material into a [`Material`]. A model that
//! fails to load is logged and draws nothing.

use std::fmt;
use std::path::{Path, PathBuf};

use glam::Vec3;

use super::material::{Material, MaterialSlot};
use super::mesh::{GpuMesh, MeshData, MeshVertex};
use crate::gpu::render_context::RenderContext;
use crate::gpu::texture::Texture;

/// OBJ parse failure.
#[derive(Debug)]
pub struct ModelError {
    path: PathBuf,
    source: tobj::LoadError,
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to load model {}: {}",
            self.path.display(),
            self.source
        )
    }
}

impl std::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Texture files referenced by one OBJ material, resolved against the
/// model's directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterialPaths {
    /// Diffuse map (`map_Kd`).
    pub diffuse: Option<PathBuf>,
    /// Specular map (`map_Ks`).
    pub specular: Option<PathBuf>,
}

impl MaterialPaths {
    /// Texture file for `slot`, if the material names one.
    pub fn path(&self, slot: MaterialSlot) -> Option<&Path> {
        match slot {
            MaterialSlot::Diffuse => self.diffuse.as_deref(),
            MaterialSlot::Specular => self.specular.as_deref(),
        }
    }
}

/// One parsed mesh and the index of its material.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjMesh {
    /// Name from the OBJ `o`/`g` statement.
    pub name: String,
    /// Triangulated geometry.
    pub data: MeshData,
    /// Index into the material list.
    pub material: Option<usize>,
}

/// CPU side of a model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjContents {
    /// Meshes in file order.
    pub meshes: Vec<ObjMesh>,
    /// Materials in MTL order.
    pub materials: Vec<MaterialPaths>,
}

/// Parse an OBJ file (and its MTL, if any).
///
/// Texture coordinates are flipped to a top-left origin. Meshes without
/// normals get area-weighted smooth normals.
///
/// # Errors
///
/// [`ModelError`] if the OBJ itself cannot be parsed. A missing or broken
/// MTL file only logs a warning.
pub fn read_obj(path: &Path) -> Result<ObjContents, ModelError> {
    let (models, materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|source| ModelError {
        path: path.to_path_buf(),
        source,
    })?;

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    let materials = match materials {
        Ok(materials) => materials
            .iter()
            .map(|m| MaterialPaths {
                diffuse: m.diffuse_texture.as_ref().map(|t| base.join(t)),
                specular: m.specular_texture.as_ref().map(|t| base.join(t)),
            })
            .collect(),
        Err(e) => {
            log::warn!("{}: no usable materials ({e})", path.display());
            Vec::new()
        }
    };

    let meshes = models
        .into_iter()
        .map(|model| ObjMesh {
            data: mesh_data(&model.mesh),
            material: model.mesh.material_id,
            name: model.name,
        })
        .collect();

    Ok(ObjContents { meshes, materials })
}

fn mesh_data(mesh: &tobj::Mesh) -> MeshData {
    let vertex_count = mesh.positions.len() / 3;
    let has_normals = mesh.normals.len() == mesh.positions.len();
    let has_uvs = mesh.texcoords.len() / 2 == vertex_count;

    let mut vertices: Vec<MeshVertex> = (0..vertex_count)
        .map(|i| MeshVertex {
            position: [
                mesh.positions[3 * i],
                mesh.positions[3 * i + 1],
                mesh.positions[3 * i + 2],
            ],
            normal: if has_normals {
                [
                    mesh.normals[3 * i],
                    mesh.normals[3 * i + 1],
                    mesh.normals[3 * i + 2],
                ]
            } else {
                [0.0; 3]
            },
            uv: if has_uvs {
                [mesh.texcoords[2 * i], 1.0 - mesh.texcoords[2 * i + 1]]
            } else {
                [0.0; 2]
            },
        })
        .collect();

    if !has_normals {
        smooth_normals(&mut vertices, &mesh.indices);
    }

    MeshData {
        vertices,
        indices: mesh.indices.clone(),
    }
}

fn smooth_normals(vertices: &mut [MeshVertex], indices: &[u32]) {
    let mut sums = vec![Vec3::ZERO; vertices.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| i as usize);
        let pa = Vec3::from(vertices[a].position);
        let face = (Vec3::from(vertices[b].position) - pa)
            .cross(Vec3::from(vertices[c].position) - pa);
        for i in [a, b, c] {
            sums[i] += face;
        }
    }
    for (vertex, sum) in vertices.iter_mut().zip(sums) {
        vertex.normal = sum.normalize_or(Vec3::Y).to_array();
    }
}

/// A drawable model: meshes paired with material indices.
pub struct Model {
    meshes: Vec<(GpuMesh, usize)>,
    materials: Vec<Material>,
}

impl Model {
    /// Upload parsed contents. Meshes without a valid material use a
    /// trailing untextured material.
    pub fn from_contents(
        context: &RenderContext,
        layout: &wgpu::BindGroupLayout,
        label: &str,
        contents: &ObjContents,
    ) -> Self {
        let mut materials: Vec<Material> = contents
            .materials
            .iter()
            .enumerate()
            .map(|(i, paths)| {
                let load = |slot: MaterialSlot| match paths.path(slot) {
                    Some(path) => Texture::load_or_placeholder(
                        context,
                        path,
                        slot.kind(),
                        slot.fallback(),
                    ),
                    None => slot.solid(context, label),
                };
                Material::new(
                    context,
                    layout,
                    &format!("{label} Material {i}"),
                    load(MaterialSlot::Diffuse),
                    load(MaterialSlot::Specular),
                )
            })
            .collect();

        let fallback = materials.len();
        let meshes: Vec<(GpuMesh, usize)> = contents
            .meshes
            .iter()
            .map(|m| {
                let material =
                    m.material.filter(|&i| i < fallback).unwrap_or(fallback);
                let name = format!("{label}/{}", m.name);
                (GpuMesh::new(&context.device, &name, &m.data), material)
            })
            .collect();

        if meshes.iter().any(|&(_, material)| material == fallback) {
            materials.push(Material::untextured(context, layout));
        }

        Self { meshes, materials }
    }

    /// Load an OBJ model, or an empty model if it cannot be parsed.
    pub fn load_or_empty(
        context: &RenderContext,
        layout: &wgpu::BindGroupLayout,
        path: &Path,
    ) -> Self {
        let label = path.file_stem().map_or_else(
            || "Model".to_owned(),
            |s| s.to_string_lossy().into_owned(),
        );
        match read_obj(path) {
            Ok(contents) => {
                log::info!(
                    "loaded {} ({} meshes, {} materials)",
                    path.display(),
                    contents.meshes.len(),
                    contents.materials.len()
                );
                Self::from_contents(context, layout, &label, &contents)
            }
            Err(e) => {
                log::error!("{e}; it will not be drawn");
                Self {
                    meshes: Vec::new(),
                    materials: Vec::new(),
                }
            }
        }
    }

    /// Draw every mesh, binding its material at slot 2. Frame and instance
    /// bind groups must already be set.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        for (mesh, material) in &self.meshes {
            if let Some(material) = self.materials.get(*material) {
                pass.set_bind_group(2, material.bind_group(), &[]);
                mesh.draw(pass);
            }
        }
    }

    /// Destroy every material texture.
    pub fn release(&self) {
        for material in &self.materials {
            material.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("isle-bloom-obj-{}-{name}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("{name}.obj"));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn quad_is_triangulated_with_flipped_uvs() {
        let path = write_temp(
            "quad",
            "o quad\n\
             v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\n\
             vt 0 0\nvt 1 0\nvt 1 1\nvt 0 1\n\
             vn 0 0 1\n\
             f 1/1/1 2/2/1 3/3/1 4/4/1\n",
        );

        let contents = read_obj(&path).unwrap();

        assert_eq!(contents.meshes.len(), 1);
        let mesh = &contents.meshes[0];
        assert_eq!(mesh.name, "quad");
        assert_eq!(mesh.data.indices.len(), 6);
        let origin = mesh
            .data
            .vertices
            .iter()
            .find(|v| v.position == [0.0, 0.0, 0.0])
            .unwrap();
        assert_eq!(origin.uv, [0.0, 1.0]);
        assert_eq!(origin.normal, [0.0, 0.0, 1.0]);
        assert_eq!(mesh.material, None);
    }

    #[test]
    fn missing_normals_are_generated() {
        let path = write_temp("tri", "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");

        let contents = read_obj(&path).unwrap();

        for vertex in &contents.meshes[0].data.vertices {
            assert_eq!(vertex.normal, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn material_textures_resolve_next_to_the_model() {
        let path = write_temp(
            "textured",
            "mtllib textured.mtl\nusemtl skin\n\
             v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n",
        );
        let mtl = path.with_extension("mtl");
        std::fs::write(
            &mtl,
            "newmtl skin\nmap_Kd skin.png\nmap_Ks skin_spec.png\n",
        )
        .unwrap();

        let contents = read_obj(&path).unwrap();
        let dir = path.parent().unwrap();

        assert_eq!(contents.meshes[0].material, Some(0));
        assert_eq!(
            contents.materials,
            vec![MaterialPaths {
                diffuse: Some(dir.join("skin.png")),
                specular: Some(dir.join("skin_spec.png")),
            }]
        );
        let paths = &contents.materials[0];
        let specular = dir.join("skin_spec.png");
        assert_eq!(
            paths.path(MaterialSlot::Specular),
            Some(specular.as_path())
        );
    }

    #[test]
    fn unreadable_model_is_an_error() {
        let missing = std::env::temp_dir().join("isle-bloom-no-such-model.obj");
        assert!(read_obj(&missing).is_err());
    }
}
