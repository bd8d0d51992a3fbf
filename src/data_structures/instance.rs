//! Local node transformation.
//!
//! Every scene node carries one [`Instance`] relative to its parent. Hosts
//! compose them down the tree to obtain world transforms.

use std::ops::Mul;

use cgmath::{InnerSpace, One, VectorSpace};

/// Position, rotation (as quaternion) and non-uniform scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Instance {
    pub position: cgmath::Vector3<f32>,
    pub rotation: cgmath::Quaternion<f32>,
    pub scale: cgmath::Vector3<f32>,
}

impl Instance {
    /// Identity transformation (no move, rotate, or scale).
    pub fn new() -> Self {
        Self {
            position: cgmath::Vector3::new(0.0, 0.0, 0.0),
            // `Quaternion::one()` is the identity quaternion (no rotation)
            rotation: cgmath::Quaternion::one(),
            scale: cgmath::Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn with_uniform_scale(mut self, factor: f32) -> Self {
        self.scale = cgmath::Vector3::new(factor, factor, factor);
        self
    }

    pub fn to_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::from_translation(self.position)
            * cgmath::Matrix4::from(self.rotation)
            * cgmath::Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    /// Linear blend of translation and scale, normalized lerp of rotation.
    ///
    /// Used for crossfading two animation poses; `t = 0` yields `self`.
    pub fn blend(&self, other: &Instance, t: f32) -> Instance {
        let t = t.clamp(0.0, 1.0);
        // Take the short way around the hypersphere
        let target = if self.rotation.dot(other.rotation) < 0.0 {
            -other.rotation
        } else {
            other.rotation
        };
        Instance {
            position: self.position.lerp(other.position, t),
            rotation: self.rotation.nlerp(target, t),
            scale: self.scale.lerp(other.scale, t),
        }
    }
}

impl<'a, 'b> Mul<&'b Instance> for &'a Instance {
    type Output = Instance;

    fn mul(self, rhs: &'b Instance) -> Self::Output {
        let new_rotation = self.rotation * rhs.rotation;

        let new_scale = cgmath::Vector3::new(
            self.scale.x * rhs.scale.x,
            self.scale.y * rhs.scale.y,
            self.scale.z * rhs.scale.z,
        );
        let scaled_rhs_pos = cgmath::Vector3::new(
            self.scale.x * rhs.position.x,
            self.scale.y * rhs.position.y,
            self.scale.z * rhs.position.z,
        );
        let new_position = self.position + (self.rotation * scaled_rhs_pos);

        Instance {
            position: new_position,
            rotation: new_rotation,
            scale: new_scale,
        }
    }
}

impl Mul<Instance> for Instance {
    type Output = Self;

    fn mul(self, rhs: Instance) -> Self::Output {
        &self * &rhs
    }
}

impl From<cgmath::Vector3<f32>> for Instance {
    fn from(position: cgmath::Vector3<f32>) -> Self {
        Instance {
            position,
            ..Default::default()
        }
    }
}

/// glTF hands out decomposed transforms as `(translation, rotation xyzw, scale)`.
impl From<([f32; 3], [f32; 4], [f32; 3])> for Instance {
    fn from((position, [x, y, z, w], scale): ([f32; 3], [f32; 4], [f32; 3])) -> Self {
        Instance {
            position: position.into(),
            rotation: cgmath::Quaternion::new(w, x, y, z),
            scale: scale.into(),
        }
    }
}

impl Default for Instance {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{Deg, Rotation3};

    use super::*;

    #[test]
    fn composing_with_identity_is_noop() {
        let t = Instance {
            position: [1.0, 2.0, 3.0].into(),
            rotation: cgmath::Quaternion::from_angle_y(Deg(90.0)),
            scale: [2.0, 2.0, 2.0].into(),
        };
        assert_eq!(&Instance::new() * &t, t);
    }

    #[test]
    fn parent_scale_and_rotation_apply_to_child_offset() {
        let parent = Instance {
            position: [0.0, 1.0, 0.0].into(),
            rotation: cgmath::Quaternion::from_angle_y(Deg(90.0)),
            scale: [2.0, 2.0, 2.0].into(),
        };
        let child = Instance::from(cgmath::Vector3::new(1.0, 0.0, 0.0));
        let world = parent * child;
        // x axis rotated 90 degrees around y points to -z
        assert!((world.position.x - 0.0).abs() < 1e-5);
        assert!((world.position.y - 1.0).abs() < 1e-5);
        assert!((world.position.z + 2.0).abs() < 1e-5);
        assert_eq!(world.scale, cgmath::Vector3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn gltf_rotation_order_is_xyzw() {
        let t = Instance::from(([0.0; 3], [0.0, 0.0, 0.0, 1.0], [1.0; 3]));
        assert_eq!(t.rotation, cgmath::Quaternion::one());
    }

    #[test]
    fn blend_endpoints() {
        let a = Instance::new();
        let b = Instance::from(cgmath::Vector3::new(4.0, 0.0, 0.0)).with_uniform_scale(3.0);
        assert_eq!(a.blend(&b, 0.0).position, a.position);
        let mid = a.blend(&b, 0.5);
        assert!((mid.position.x - 2.0).abs() < 1e-5);
        assert!((mid.scale.y - 2.0).abs() < 1e-5);
        assert_eq!(a.blend(&b, 7.0).position, b.position);
    }
}
