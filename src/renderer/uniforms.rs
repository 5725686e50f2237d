//! Uniform blocks of the scene shaders. Layouts must match
//! assets/shaders/modules/scene.wgsl.

use glam::{Mat3, Mat4, Vec3, Vec4};

use crate::camera::core::CameraState;
use crate::scene::layout::SceneLayout;
use crate::scene::lights::{Attenuation, LightColor, LightRig};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
struct DirectionalLightUniform {
    direction: [f32; 3],
    _pad0: f32,
    ambient: [f32; 3],
    _pad1: f32,
    diffuse: [f32; 3],
    _pad2: f32,
    specular: [f32; 3],
    _pad3: f32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
struct PointLightUniform {
    position: [f32; 3],
    constant: f32,
    ambient: [f32; 3],
    linear: f32,
    diffuse: [f32; 3],
    quadratic: f32,
    specular: [f32; 3],
    _pad: f32,
}

impl PointLightUniform {
    fn new(position: Vec3, color: &LightColor, att: &Attenuation) -> Self {
        Self {
            position: position.to_array(),
            constant: att.constant,
            ambient: color.ambient.to_array(),
            linear: att.linear,
            diffuse: color.diffuse.to_array(),
            quadratic: att.quadratic,
            specular: color.specular.to_array(),
            _pad: 0.0,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
struct SpotLightUniform {
    position: [f32; 3],
    cut_off: f32,
    direction: [f32; 3],
    outer_cut_off: f32,
    ambient: [f32; 3],
    constant: f32,
    diffuse: [f32; 3],
    linear: f32,
    specular: [f32; 3],
    quadratic: f32,
}

/// Per-frame camera and lighting block, bound at group 0.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniform {
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
    sky_view: [[f32; 4]; 4],
    view_pos: [f32; 3],
    bloom_threshold: f32,
    dir_light: DirectionalLightUniform,
    point_lights: [PointLightUniform; 2],
    spot_light: SpotLightUniform,
    spot_enabled: u32,
    shininess: f32,
    _pad0: f32,
    _pad1: f32,
}

/// Per-frame shading inputs that are not part of the camera or layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadingInputs<'a> {
    /// Fixed light parameters.
    pub rig: &'a LightRig,
    /// Whether the camera spot light contributes.
    pub spotlight: bool,
    /// Luminance above which fragments feed the bloom.
    pub bloom_threshold: f32,
    /// Blinn-Phong specular exponent.
    pub shininess: f32,
}

impl FrameUniform {
    /// Assemble the block for one frame.
    pub fn new(
        camera: &CameraState,
        layout: &SceneLayout,
        shading: &ShadingInputs<'_>,
    ) -> Self {
        let rig = shading.rig;
        let (cut_off, outer_cut_off) = rig.spot_cutoffs();
        let sky_view = Mat4::from_mat3(Mat3::from_mat4(camera.view));
        Self {
            view: camera.view.to_cols_array_2d(),
            projection: camera.projection.to_cols_array_2d(),
            sky_view: sky_view.to_cols_array_2d(),
            view_pos: camera.position.to_array(),
            bloom_threshold: shading.bloom_threshold,
            dir_light: DirectionalLightUniform {
                direction: rig.sun_direction.to_array(),
                _pad0: 0.0,
                ambient: rig.sun.ambient.to_array(),
                _pad1: 0.0,
                diffuse: rig.sun.diffuse.to_array(),
                _pad2: 0.0,
                specular: rig.sun.specular.to_array(),
                _pad3: 0.0,
            },
            point_lights: layout.light_positions.map(|p| {
                PointLightUniform::new(p, &rig.point, &rig.point_attenuation)
            }),
            spot_light: SpotLightUniform {
                position: camera.position.to_array(),
                cut_off,
                direction: camera.front.to_array(),
                outer_cut_off,
                ambient: rig.spot.ambient.to_array(),
                constant: rig.spot_attenuation.constant,
                diffuse: rig.spot.diffuse.to_array(),
                linear: rig.spot_attenuation.linear,
                specular: rig.spot.specular.to_array(),
                quadratic: rig.spot_attenuation.quadratic,
            },
            spot_enabled: u32::from(shading.spotlight),
            shininess: shading.shininess,
            _pad0: 0.0,
            _pad1: 0.0,
        }
    }
}

/// Per-object block, bound at group 1.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceUniform {
    model: [[f32; 4]; 4],
    normal_matrix: [[f32; 4]; 4],
    color: [f32; 4],
}

impl InstanceUniform {
    /// Transform with a tint (or emissive color for light markers).
    pub fn new(model: Mat4, color: Vec4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: model.inverse().transpose().to_cols_array_2d(),
            color: color.to_array(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_sizes_match_wgsl_layout() {
        assert_eq!(std::mem::size_of::<DirectionalLightUniform>(), 64);
        assert_eq!(std::mem::size_of::<PointLightUniform>(), 64);
        assert_eq!(std::mem::size_of::<SpotLightUniform>(), 80);
        assert_eq!(std::mem::size_of::<FrameUniform>(), 496);
        assert_eq!(std::mem::size_of::<InstanceUniform>(), 144);
    }

    #[test]
    fn sky_view_drops_translation() {
        let camera = CameraState {
            view: Mat4::look_at_rh(
                Vec3::new(3.0, 4.0, 5.0),
                Vec3::ZERO,
                Vec3::Y,
            ),
            projection: Mat4::IDENTITY,
            position: Vec3::new(3.0, 4.0, 5.0),
            front: Vec3::NEG_Z,
        };
        let layout = SceneLayout::at(0.0, Vec3::ZERO);
        let rig = LightRig::default();
        let uniform = FrameUniform::new(
            &camera,
            &layout,
            &ShadingInputs {
                rig: &rig,
                spotlight: false,
                bloom_threshold: 1.0,
                shininess: 32.0,
            },
        );

        assert_eq!(uniform.sky_view[3], [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(uniform.spot_enabled, 0);
        assert_eq!(
            uniform.point_lights[0].position,
            layout.light_positions[0].to_array()
        );
    }

    #[test]
    fn normal_matrix_undoes_non_uniform_scale() {
        let model = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let uniform = InstanceUniform::new(model, Vec4::ONE);
        assert_eq!(uniform.normal_matrix[0][0], 0.5);
    }
}
