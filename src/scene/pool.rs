//! The scene pool: particle scenes built once at startup.

use glam::{Mat4, Quat, Vec3};

use crate::config::{MatcapSource, SceneLayout};
use crate::error::{SketchError, SketchResult};

/// Sample a uniformly distributed direction on the unit sphere.
pub fn random_direction(rng: &mut fastrand::Rng) -> Vec3 {
    let u = rng.f32() * 2.0 - 1.0;
    let theta = rng.f32() * std::f32::consts::TAU;
    let f = (1.0 - u * u).max(0.0).sqrt();
    Vec3::new(f * theta.cos(), f * theta.sin(), u)
}

/// One particle cloud: clones of the base sphere sharing a matcap.
#[derive(Clone, Debug)]
pub struct Scene {
    /// Matcap every clone in this scene is shaded with.
    pub matcap: MatcapSource,
    /// Clone positions relative to the scene root.
    instances: Vec<Vec3>,
    /// Rotation of the scene root around the Y axis, in radians.
    pub rotation_y: f32,
}

impl Scene {
    /// Scatter `layout.instances_per_scene` clones on a shell of
    /// `layout.shell_radius`.
    ///
    /// Every clone gets a fresh direction sample; overlaps are allowed.
    pub fn generate(matcap: MatcapSource, layout: &SceneLayout, rng: &mut fastrand::Rng) -> Self {
        let instances = (0..layout.instances_per_scene)
            .map(|_| random_direction(rng) * layout.shell_radius)
            .collect();

        Self {
            matcap,
            instances,
            rotation_y: 0.0,
        }
    }

    pub fn instances(&self) -> &[Vec3] {
        &self.instances
    }

    /// Transform of the scene root.
    pub fn root_matrix(&self) -> Mat4 {
        Mat4::from_quat(Quat::from_rotation_y(self.rotation_y))
    }
}

/// Ordered, fixed set of scenes. Indices are stable for the program's life.
#[derive(Clone, Debug)]
pub struct ScenePool {
    scenes: Vec<Scene>,
}

impl ScenePool {
    /// Build one scene per matcap, in order.
    pub fn generate(
        matcaps: &[MatcapSource],
        layout: &SceneLayout,
        rng: &mut fastrand::Rng,
    ) -> SketchResult<Self> {
        if matcaps.is_empty() {
            return Err(SketchError::config("scene pool needs at least one matcap"));
        }

        let scenes = matcaps
            .iter()
            .map(|matcap| Scene::generate(matcap.clone(), layout, rng))
            .collect();

        Ok(Self { scenes })
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Scene> {
        self.scenes.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scene> {
        self.scenes.iter()
    }

    /// Set the Y rotation of the given scenes.
    pub fn set_rotation(&mut self, indices: &[usize], angle: f32) {
        for &i in indices {
            if let Some(scene) = self.scenes.get_mut(i) {
                scene.rotation_y = angle;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcaps() -> Vec<MatcapSource> {
        vec![
            MatcapSource::red(),
            MatcapSource::green(),
            MatcapSource::gray(),
        ]
    }

    #[test]
    fn random_direction_is_unit_length() {
        let mut rng = fastrand::Rng::with_seed(1);
        for _ in 0..1000 {
            let d = random_direction(&mut rng);
            assert!((d.length() - 1.0).abs() < 1e-4, "{d:?}");
        }
    }

    #[test]
    fn random_direction_covers_both_hemispheres() {
        let mut rng = fastrand::Rng::with_seed(2);
        let samples: Vec<Vec3> = (0..500).map(|_| random_direction(&mut rng)).collect();
        assert!(samples.iter().any(|d| d.z > 0.5));
        assert!(samples.iter().any(|d| d.z < -0.5));
        let mean = samples.iter().copied().sum::<Vec3>() / samples.len() as f32;
        assert!(mean.length() < 0.15, "mean {mean:?}");
    }

    #[test]
    fn one_scene_per_matcap_with_layout_count() {
        let mut rng = fastrand::Rng::with_seed(3);
        let pool = ScenePool::generate(&matcaps(), &SceneLayout::default(), &mut rng).unwrap();
        assert_eq!(pool.len(), 3);
        for (scene, matcap) in pool.iter().zip(matcaps()) {
            assert_eq!(scene.instances().len(), 50);
            assert_eq!(scene.matcap, matcap);
            assert_eq!(scene.rotation_y, 0.0);
        }
    }

    #[test]
    fn instances_lie_on_the_shell() {
        let mut rng = fastrand::Rng::with_seed(4);
        let layout = SceneLayout {
            shell_radius: 2.0,
            ..SceneLayout::default()
        };
        let pool = ScenePool::generate(&matcaps(), &layout, &mut rng).unwrap();
        for scene in pool.iter() {
            for p in scene.instances() {
                assert!((p.length() - 2.0).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn same_seed_same_pool() {
        let layout = SceneLayout::default();
        let a = ScenePool::generate(&matcaps(), &layout, &mut fastrand::Rng::with_seed(9)).unwrap();
        let b = ScenePool::generate(&matcaps(), &layout, &mut fastrand::Rng::with_seed(9)).unwrap();
        for (sa, sb) in a.iter().zip(b.iter()) {
            assert_eq!(sa.instances(), sb.instances());
        }
    }

    #[test]
    fn empty_matcap_list_is_an_error() {
        let mut rng = fastrand::Rng::with_seed(5);
        assert!(ScenePool::generate(&[], &SceneLayout::default(), &mut rng).is_err());
    }

    #[test]
    fn set_rotation_only_touches_named_scenes() {
        let mut rng = fastrand::Rng::with_seed(6);
        let mut pool = ScenePool::generate(&matcaps(), &SceneLayout::default(), &mut rng).unwrap();
        pool.set_rotation(&[0, 1, 17], 0.5);
        assert_eq!(pool.get(0).unwrap().rotation_y, 0.5);
        assert_eq!(pool.get(1).unwrap().rotation_y, 0.5);
        assert_eq!(pool.get(2).unwrap().rotation_y, 0.0);
    }
}
