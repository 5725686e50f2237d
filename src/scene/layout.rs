//! Where everything is this frame, as a function of elapsed time.

use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Quat, Vec3};

/// Every object is drawn raised by this much.
pub const WORLD_LIFT: Vec3 = Vec3::new(0.0, 6.0, 0.0);
/// Lights sit this far above the helicopter that carries them.
pub const LIGHT_ABOVE_HELICOPTER: Vec3 = Vec3::new(0.0, 1.0, 0.0);
/// Uniform scale of the island model.
pub const ISLAND_SCALE: f32 = 0.1;
/// Uniform scale of the helicopter model.
pub const HELICOPTER_SCALE: f32 = 0.4;
/// Uniform scale of the light-marker cubes.
pub const LIGHT_MARKER_SCALE: f32 = 0.14;
/// Emissive color of the light markers.
pub const LIGHT_MARKER_COLOR: Vec3 = Vec3::splat(30.0);
/// Foliage quad positions before the world lift.
pub const FOLIAGE_POSITIONS: [Vec3; 4] = [
    Vec3::new(8.44, 1.0, 5.53),
    Vec3::new(11.72, 1.82, 4.85),
    Vec3::new(7.17, 0.6, 1.9),
    Vec3::new(0.0, 0.0, 0.0),
];

/// Un-lifted points on the two flight paths at `t` seconds.
pub fn flight_paths(t: f32) -> [Vec3; 2] {
    [
        Vec3::new(4.0 * t.cos(), 10.0, 4.0 * t.sin()),
        Vec3::new(5.0 * t.sin() + 2.0, 8.0, 5.0 * t.cos() + 1.0),
    ]
}

/// Model matrices and light positions for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneLayout {
    /// Island transform.
    pub island: Mat4,
    /// One transform per helicopter.
    pub helicopters: [Mat4; 2],
    /// One transform per foliage quad.
    pub foliage: [Mat4; 4],
    /// World positions of the two point lights.
    pub light_positions: [Vec3; 2],
    /// Marker cube transforms, one per light.
    pub light_markers: [Mat4; 2],
}

impl SceneLayout {
    /// Layout at `elapsed` seconds with the island at `island_position`.
    pub fn at(elapsed: f32, island_position: Vec3) -> Self {
        let [path0, path1] = flight_paths(elapsed);
        let lift = |p: Vec3| p + WORLD_LIFT;
        let scale = Vec3::splat(HELICOPTER_SCALE);

        let helicopters = [
            Mat4::from_scale_rotation_translation(
                scale,
                Quat::from_rotation_y(-elapsed),
                lift(path0),
            ),
            Mat4::from_scale_rotation_translation(
                scale,
                Quat::from_rotation_y(FRAC_PI_2 + elapsed),
                lift(path1),
            ),
        ];
        let light_positions =
            [path0, path1].map(|p| lift(p) + LIGHT_ABOVE_HELICOPTER);
        let light_markers = light_positions.map(|p| {
            Mat4::from_scale_rotation_translation(
                Vec3::splat(LIGHT_MARKER_SCALE),
                Quat::IDENTITY,
                p,
            )
        });

        Self {
            island: Mat4::from_scale_rotation_translation(
                Vec3::splat(ISLAND_SCALE),
                Quat::IDENTITY,
                lift(island_position),
            ),
            helicopters,
            foliage: FOLIAGE_POSITIONS.map(|p| Mat4::from_translation(lift(p))),
            light_positions,
            light_markers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f32::consts::TAU;

    fn assert_vec_eq(a: Vec3, b: Vec3) {
        assert_abs_diff_eq!(a.distance(b), 0.0, epsilon = 1e-4);
    }

    #[test]
    fn lights_start_on_their_paths() {
        let layout = SceneLayout::at(0.0, Vec3::ZERO);
        assert_vec_eq(layout.light_positions[0], Vec3::new(4.0, 17.0, 0.0));
        assert_vec_eq(layout.light_positions[1], Vec3::new(2.0, 15.0, 6.0));
    }

    #[test]
    fn markers_and_helicopters_track_the_lights() {
        let layout = SceneLayout::at(1.3, Vec3::ZERO);
        for i in 0..2 {
            let marker = layout.light_markers[i].transform_point3(Vec3::ZERO);
            let heli = layout.helicopters[i].transform_point3(Vec3::ZERO);
            assert_vec_eq(marker, layout.light_positions[i]);
            assert_vec_eq(
                heli + LIGHT_ABOVE_HELICOPTER,
                layout.light_positions[i],
            );
        }
        let corner = layout.light_markers[0].transform_point3(Vec3::ONE);
        assert_vec_eq(
            corner - layout.light_positions[0],
            Vec3::splat(LIGHT_MARKER_SCALE),
        );
    }

    #[test]
    fn motion_repeats_every_full_turn() {
        let a = SceneLayout::at(0.5, Vec3::ZERO);
        let b = SceneLayout::at(0.5 + TAU, Vec3::ZERO);
        for i in 0..2 {
            assert_vec_eq(a.light_positions[i], b.light_positions[i]);
        }
    }

    #[test]
    fn static_objects_are_lifted() {
        let layout = SceneLayout::at(10.0, Vec3::new(1.0, 0.0, 2.0));
        assert_vec_eq(
            layout.island.transform_point3(Vec3::ZERO),
            Vec3::new(1.0, 6.0, 2.0),
        );
        assert_vec_eq(
            layout.foliage[0].transform_point3(Vec3::ZERO),
            FOLIAGE_POSITIONS[0] + WORLD_LIFT,
        );
    }
}
