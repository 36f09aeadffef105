//! Uniform buffer objects and their per-image buffers

use ash::{vk, Device};
use bytemuck::{Pod, Zeroable};

use super::buffer::Buffer;
use crate::foundation::math::{deg_to_rad, look_at_rh, perspective_rh_zo, rotation_axis, Mat4, Vec3};
use crate::render::backends::vulkan::state::swapchain::aspect_ratio;
use crate::render::backends::vulkan::{VulkanError, VulkanResult};

/// Model, view and projection matrices (binding 0)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct UniformBufferObject {
    /// Object to world
    pub model: [[f32; 4]; 4],
    /// World to camera
    pub view: [[f32; 4]; 4],
    /// Camera to clip, Y already flipped for Vulkan
    pub proj: [[f32; 4]; 4],
}

impl UniformBufferObject {
    /// Transforms for the spinning quad `seconds` into the run
    pub fn animated(seconds: f32, extent: vk::Extent2D) -> Self {
        let model = rotation_axis(seconds * deg_to_rad(90.0), &Vec3::z());
        let view = look_at_rh(&Vec3::new(2.0, 2.0, 2.0), &Vec3::zeros(), &Vec3::z());
        let mut proj = perspective_rh_zo(deg_to_rad(45.0), aspect_ratio(extent), 0.1, 10.0);
        proj[(1, 1)] *= -1.0;

        Self {
            model: model.into(),
            view: view.into(),
            proj: proj.into(),
        }
    }
}

/// Camera view matrix (binding 2)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SecondaryUniformBufferObject {
    /// World to camera
    pub view: [[f32; 4]; 4],
}

impl SecondaryUniformBufferObject {
    /// Wrap a camera view matrix
    pub fn from_view(view: &Mat4) -> Self {
        Self { view: (*view).into() }
    }
}

impl Default for SecondaryUniformBufferObject {
    fn default() -> Self {
        Self::from_view(&Mat4::identity())
    }
}

const UBO_SIZE: vk::DeviceSize = std::mem::size_of::<UniformBufferObject>() as vk::DeviceSize;
const SECONDARY_SIZE: vk::DeviceSize = std::mem::size_of::<SecondaryUniformBufferObject>() as vk::DeviceSize;

/// Host-visible primary and secondary uniform buffers, one pair per swapchain image
pub struct UniformBuffers {
    primary: Vec<Buffer>,
    secondary: Vec<Buffer>,
}

impl UniformBuffers {
    /// Allocate `image_count` buffer pairs
    pub fn new(
        device: &Device,
        memory_properties: &vk::PhysicalDeviceMemoryProperties,
        image_count: usize,
    ) -> VulkanResult<Self> {
        let host = vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT;
        let create = |size| {
            Buffer::new(
                device.clone(),
                memory_properties,
                size,
                vk::BufferUsageFlags::UNIFORM_BUFFER,
                host,
            )
        };

        let primary = (0..image_count).map(|_| create(UBO_SIZE)).collect::<VulkanResult<Vec<_>>>()?;
        let secondary = (0..image_count)
            .map(|_| create(SECONDARY_SIZE))
            .collect::<VulkanResult<Vec<_>>>()?;

        Ok(Self { primary, secondary })
    }

    /// Write both objects for one swapchain image
    pub fn update(
        &self,
        image_index: usize,
        ubo: &UniformBufferObject,
        secondary: &SecondaryUniformBufferObject,
    ) -> VulkanResult<()> {
        let (primary_buffer, secondary_buffer) = self
            .primary
            .get(image_index)
            .zip(self.secondary.get(image_index))
            .ok_or_else(|| VulkanError::InvalidOperation {
                reason: format!("No uniform buffers for image {image_index}"),
            })?;

        primary_buffer.write_data(std::slice::from_ref(ubo))?;
        secondary_buffer.write_data(std::slice::from_ref(secondary))
    }

    /// Primary buffer handle and size for descriptor writes
    pub fn primary(&self, image_index: usize) -> Option<(vk::Buffer, vk::DeviceSize)> {
        self.primary.get(image_index).map(|b| (b.handle(), b.size()))
    }

    /// Secondary buffer handle and size for descriptor writes
    pub fn secondary(&self, image_index: usize) -> Option<(vk::Buffer, vk::DeviceSize)> {
        self.secondary.get(image_index).map(|b| (b.handle(), b.size()))
    }

    /// Number of buffer pairs
    pub fn len(&self) -> usize {
        self.primary.len()
    }

    /// Whether no buffers were allocated
    pub fn is_empty(&self) -> bool {
        self.primary.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector4;

    const EXTENT: vk::Extent2D = vk::Extent2D { width: 800, height: 600 };

    #[test]
    fn sizes_match_shader_blocks() {
        assert_eq!(std::mem::size_of::<UniformBufferObject>(), 192);
        assert_eq!(std::mem::size_of::<SecondaryUniformBufferObject>(), 64);
    }

    #[test]
    fn model_starts_as_identity() {
        let ubo = UniformBufferObject::animated(0.0, EXTENT);
        let model = Mat4::from(ubo.model);
        assert_relative_eq!(model, Mat4::identity(), epsilon = 1e-6);
    }

    #[test]
    fn model_rotates_ninety_degrees_per_second() {
        let ubo = UniformBufferObject::animated(1.0, EXTENT);
        let model = Mat4::from(ubo.model);
        let rotated = model * Vector4::new(1.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(rotated, Vector4::new(0.0, 1.0, 0.0, 1.0), epsilon = 1e-5);
    }

    #[test]
    fn view_puts_origin_in_front_of_camera() {
        let ubo = UniformBufferObject::animated(0.0, EXTENT);
        let view = Mat4::from(ubo.view);
        let origin = view * Vector4::new(0.0, 0.0, 0.0, 1.0);

        assert_relative_eq!(origin.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(origin.y, 0.0, epsilon = 1e-5);
        assert_relative_eq!(origin.z, -(12.0_f32).sqrt(), epsilon = 1e-5);
    }

    #[test]
    fn projection_is_flipped_for_vulkan() {
        let ubo = UniformBufferObject::animated(0.0, EXTENT);
        let proj = Mat4::from(ubo.proj);
        let focal = 1.0 / (deg_to_rad(45.0) / 2.0).tan();

        assert_relative_eq!(proj[(1, 1)], -focal, epsilon = 1e-5);
        assert_relative_eq!(proj[(0, 0)], focal / (800.0 / 600.0), epsilon = 1e-5);
    }

    #[test]
    fn secondary_wraps_view_matrix() {
        let view = Mat4::new_translation(&Vec3::new(1.0, 2.0, 3.0));
        let secondary = SecondaryUniformBufferObject::from_view(&view);
        assert_eq!(Mat4::from(secondary.view), view);
        assert_eq!(Mat4::from(SecondaryUniformBufferObject::default().view), Mat4::identity());
    }
}
