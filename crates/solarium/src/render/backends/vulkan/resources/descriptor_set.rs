//! Descriptor set layouts, pools and set updates
//!
//! The scene layout binds the transform UBO (0), the texture sampler (1)
//! and the camera UBO (2). One set is allocated per swapchain image.

use ash::{vk, Device};

use crate::render::backends::vulkan::{VulkanError, VulkanResult};

/// Binding of [`super::UniformBufferObject`]
pub const UBO_BINDING: u32 = 0;
/// Binding of the texture sampler
pub const SAMPLER_BINDING: u32 = 1;
/// Binding of [`super::SecondaryUniformBufferObject`]
pub const SECONDARY_UBO_BINDING: u32 = 2;

/// Descriptor set layout builder for creating reusable layouts
#[derive(Debug, Default)]
pub struct DescriptorSetLayoutBuilder {
    bindings: Vec<vk::DescriptorSetLayoutBinding>,
}

impl DescriptorSetLayoutBuilder {
    /// Start with no bindings
    pub fn new() -> Self {
        Self::default()
    }

    /// Layout used by the scene pipeline
    pub fn scene() -> Self {
        Self::new()
            .add_uniform_buffer(UBO_BINDING, vk::ShaderStageFlags::VERTEX)
            .add_combined_image_sampler(SAMPLER_BINDING, vk::ShaderStageFlags::FRAGMENT)
            .add_uniform_buffer(SECONDARY_UBO_BINDING, vk::ShaderStageFlags::VERTEX)
    }

    fn add(mut self, binding: u32, descriptor_type: vk::DescriptorType, stage_flags: vk::ShaderStageFlags) -> Self {
        self.bindings.push(
            vk::DescriptorSetLayoutBinding::builder()
                .binding(binding)
                .descriptor_type(descriptor_type)
                .descriptor_count(1)
                .stage_flags(stage_flags)
                .build(),
        );
        self
    }

    /// Add a uniform buffer binding
    pub fn add_uniform_buffer(self, binding: u32, stage_flags: vk::ShaderStageFlags) -> Self {
        self.add(binding, vk::DescriptorType::UNIFORM_BUFFER, stage_flags)
    }

    /// Add a combined image sampler binding
    pub fn add_combined_image_sampler(self, binding: u32, stage_flags: vk::ShaderStageFlags) -> Self {
        self.add(binding, vk::DescriptorType::COMBINED_IMAGE_SAMPLER, stage_flags)
    }

    /// Bindings added so far
    pub fn bindings(&self) -> &[vk::DescriptorSetLayoutBinding] {
        &self.bindings
    }

    /// Build the descriptor set layout
    pub fn build(self, device: &Device) -> VulkanResult<DescriptorSetLayout> {
        let layout_info = vk::DescriptorSetLayoutCreateInfo::builder().bindings(&self.bindings);
        let layout = unsafe { device.create_descriptor_set_layout(&layout_info, None) }.map_err(VulkanError::Api)?;

        Ok(DescriptorSetLayout {
            layout,
            device: device.clone(),
        })
    }
}

/// Descriptor set layout wrapper with automatic cleanup
pub struct DescriptorSetLayout {
    layout: vk::DescriptorSetLayout,
    device: Device,
}

impl DescriptorSetLayout {
    /// Get the Vulkan descriptor set layout handle
    pub fn handle(&self) -> vk::DescriptorSetLayout {
        self.layout
    }
}

impl Drop for DescriptorSetLayout {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_descriptor_set_layout(self.layout, None);
        }
    }
}

/// Pool sizes for `set_count` scene sets: two UBOs and one sampler each
pub fn scene_pool_sizes(set_count: u32) -> [vk::DescriptorPoolSize; 2] {
    [
        vk::DescriptorPoolSize {
            ty: vk::DescriptorType::UNIFORM_BUFFER,
            descriptor_count: set_count * 2,
        },
        vk::DescriptorPoolSize {
            ty: vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
            descriptor_count: set_count,
        },
    ]
}

/// Descriptor pool for allocating descriptor sets
pub struct DescriptorPool {
    pool: vk::DescriptorPool,
    device: Device,
}

impl DescriptorPool {
    /// Create a pool holding `set_count` scene sets
    pub fn new(device: Device, set_count: u32) -> VulkanResult<Self> {
        let pool_sizes = scene_pool_sizes(set_count);
        let pool_info = vk::DescriptorPoolCreateInfo::builder()
            .max_sets(set_count)
            .pool_sizes(&pool_sizes);

        let pool = unsafe { device.create_descriptor_pool(&pool_info, None) }.map_err(VulkanError::Api)?;

        Ok(Self { pool, device })
    }

    /// Allocate one set per layout; sets are freed with the pool
    pub fn allocate_descriptor_sets(&self, layouts: &[vk::DescriptorSetLayout]) -> VulkanResult<Vec<vk::DescriptorSet>> {
        let alloc_info = vk::DescriptorSetAllocateInfo::builder()
            .descriptor_pool(self.pool)
            .set_layouts(layouts);

        unsafe { self.device.allocate_descriptor_sets(&alloc_info) }.map_err(VulkanError::Api)
    }

    /// Get the pool handle
    pub fn handle(&self) -> vk::DescriptorPool {
        self.pool
    }
}

impl Drop for DescriptorPool {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_descriptor_pool(self.pool, None);
        }
    }
}

/// Resources written into one scene descriptor set
#[derive(Debug, Clone, Copy)]
pub struct SceneBindings {
    /// Transform uniform buffer and its size
    pub ubo: (vk::Buffer, vk::DeviceSize),
    /// Camera uniform buffer and its size
    pub secondary_ubo: (vk::Buffer, vk::DeviceSize),
    /// Texture view in SHADER_READ_ONLY_OPTIMAL
    pub image_view: vk::ImageView,
    /// Texture sampler
    pub sampler: vk::Sampler,
}

/// Point all three bindings of `set` at `bindings`
pub fn write_scene_set(device: &Device, set: vk::DescriptorSet, bindings: &SceneBindings) {
    let ubo_info = [vk::DescriptorBufferInfo {
        buffer: bindings.ubo.0,
        offset: 0,
        range: bindings.ubo.1,
    }];
    let secondary_info = [vk::DescriptorBufferInfo {
        buffer: bindings.secondary_ubo.0,
        offset: 0,
        range: bindings.secondary_ubo.1,
    }];
    let image_info = [vk::DescriptorImageInfo {
        sampler: bindings.sampler,
        image_view: bindings.image_view,
        image_layout: vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
    }];

    let writes = [
        vk::WriteDescriptorSet::builder()
            .dst_set(set)
            .dst_binding(UBO_BINDING)
            .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
            .buffer_info(&ubo_info)
            .build(),
        vk::WriteDescriptorSet::builder()
            .dst_set(set)
            .dst_binding(SAMPLER_BINDING)
            .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
            .image_info(&image_info)
            .build(),
        vk::WriteDescriptorSet::builder()
            .dst_set(set)
            .dst_binding(SECONDARY_UBO_BINDING)
            .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
            .buffer_info(&secondary_info)
            .build(),
    ];

    unsafe {
        device.update_descriptor_sets(&writes, &[]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_layout_has_three_bindings() {
        let builder = DescriptorSetLayoutBuilder::scene();
        let bindings = builder.bindings();
        assert_eq!(bindings.len(), 3);

        assert_eq!(bindings[0].binding, 0);
        assert_eq!(bindings[0].descriptor_type, vk::DescriptorType::UNIFORM_BUFFER);
        assert_eq!(bindings[0].stage_flags, vk::ShaderStageFlags::VERTEX);

        assert_eq!(bindings[1].binding, 1);
        assert_eq!(bindings[1].descriptor_type, vk::DescriptorType::COMBINED_IMAGE_SAMPLER);
        assert_eq!(bindings[1].stage_flags, vk::ShaderStageFlags::FRAGMENT);

        assert_eq!(bindings[2].binding, 2);
        assert_eq!(bindings[2].descriptor_type, vk::DescriptorType::UNIFORM_BUFFER);
        assert!(bindings.iter().all(|b| b.descriptor_count == 1));
    }

    #[test]
    fn pool_sizes_scale_with_image_count() {
        let sizes = scene_pool_sizes(3);
        assert_eq!(sizes[0].ty, vk::DescriptorType::UNIFORM_BUFFER);
        assert_eq!(sizes[0].descriptor_count, 6);
        assert_eq!(sizes[1].ty, vk::DescriptorType::COMBINED_IMAGE_SAMPLER);
        assert_eq!(sizes[1].descriptor_count, 3);
    }
}
