//! Device images with bound memory and a single view

use ash::{vk, Device};

use super::buffer::{allocate_memory, Buffer};
use crate::render::backends::vulkan::rendering::commands::CommandPool;
use crate::render::backends::vulkan::state::swapchain::create_image_view;
use crate::render::backends::vulkan::{VulkanError, VulkanResult};

/// Parameters for a 2D, single-mip, single-sample image
#[derive(Debug, Clone, Copy)]
pub struct ImageDesc {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Texel format
    pub format: vk::Format,
    /// Memory tiling
    pub tiling: vk::ImageTiling,
    /// Usage flags
    pub usage: vk::ImageUsageFlags,
    /// Required memory properties
    pub properties: vk::MemoryPropertyFlags,
    /// Aspect of the created view
    pub aspect: vk::ImageAspectFlags,
}

/// Image, its memory and a view, destroyed together
pub struct Image {
    device: Device,
    image: vk::Image,
    memory: vk::DeviceMemory,
    view: vk::ImageView,
    format: vk::Format,
}

impl Image {
    /// Create the image, bind memory and create the view
    pub fn new(
        device: Device,
        memory_properties: &vk::PhysicalDeviceMemoryProperties,
        desc: &ImageDesc,
    ) -> VulkanResult<Self> {
        let create_info = vk::ImageCreateInfo::builder()
            .image_type(vk::ImageType::TYPE_2D)
            .extent(vk::Extent3D {
                width: desc.width,
                height: desc.height,
                depth: 1,
            })
            .mip_levels(1)
            .array_layers(1)
            .format(desc.format)
            .tiling(desc.tiling)
            .initial_layout(vk::ImageLayout::UNDEFINED)
            .usage(desc.usage)
            .sharing_mode(vk::SharingMode::EXCLUSIVE)
            .samples(vk::SampleCountFlags::TYPE_1);

        let image = unsafe { device.create_image(&create_info, None) }.map_err(VulkanError::Api)?;
        let requirements = unsafe { device.get_image_memory_requirements(image) };

        let memory = match allocate_memory(&device, memory_properties, requirements, desc.properties) {
            Ok(memory) => memory,
            Err(e) => {
                unsafe { device.destroy_image(image, None) };
                return Err(e);
            }
        };

        let mut result = Self {
            device,
            image,
            memory,
            view: vk::ImageView::null(),
            format: desc.format,
        };

        unsafe { result.device.bind_image_memory(image, memory, 0) }.map_err(VulkanError::Api)?;
        result.view = create_image_view(&result.device, image, desc.format, desc.aspect)?;

        Ok(result)
    }

    /// Get the image handle
    pub fn handle(&self) -> vk::Image {
        self.image
    }

    /// Get the view handle
    pub fn view(&self) -> vk::ImageView {
        self.view
    }

    /// Texel format
    pub fn format(&self) -> vk::Format {
        self.format
    }
}

impl Drop for Image {
    fn drop(&mut self) {
        unsafe {
            if self.view != vk::ImageView::null() {
                self.device.destroy_image_view(self.view, None);
            }
            self.device.destroy_image(self.image, None);
            self.device.free_memory(self.memory, None);
        }
    }
}

/// Access masks and stages for a supported layout transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionMasks {
    /// Access completed before the barrier
    pub src_access: vk::AccessFlags,
    /// Access waiting on the barrier
    pub dst_access: vk::AccessFlags,
    /// Stage the barrier waits on
    pub src_stage: vk::PipelineStageFlags,
    /// Stage blocked by the barrier
    pub dst_stage: vk::PipelineStageFlags,
}

/// Barrier parameters for the upload transitions; anything else is rejected
pub fn transition_masks(old: vk::ImageLayout, new: vk::ImageLayout) -> VulkanResult<TransitionMasks> {
    match (old, new) {
        (vk::ImageLayout::UNDEFINED, vk::ImageLayout::TRANSFER_DST_OPTIMAL) => Ok(TransitionMasks {
            src_access: vk::AccessFlags::empty(),
            dst_access: vk::AccessFlags::TRANSFER_WRITE,
            src_stage: vk::PipelineStageFlags::TOP_OF_PIPE,
            dst_stage: vk::PipelineStageFlags::TRANSFER,
        }),
        (vk::ImageLayout::TRANSFER_DST_OPTIMAL, vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL) => Ok(TransitionMasks {
            src_access: vk::AccessFlags::TRANSFER_WRITE,
            dst_access: vk::AccessFlags::SHADER_READ,
            src_stage: vk::PipelineStageFlags::TRANSFER,
            dst_stage: vk::PipelineStageFlags::FRAGMENT_SHADER,
        }),
        (from, to) => Err(VulkanError::InvalidLayoutTransition { from, to }),
    }
}

fn color_subresource() -> vk::ImageSubresourceRange {
    vk::ImageSubresourceRange {
        aspect_mask: vk::ImageAspectFlags::COLOR,
        base_mip_level: 0,
        level_count: 1,
        base_array_layer: 0,
        layer_count: 1,
    }
}

/// Record and run a layout transition barrier on a color image
pub fn transition_image_layout(
    command_pool: &CommandPool,
    queue: vk::Queue,
    image: vk::Image,
    old_layout: vk::ImageLayout,
    new_layout: vk::ImageLayout,
) -> VulkanResult<()> {
    let masks = transition_masks(old_layout, new_layout)?;

    let barrier = vk::ImageMemoryBarrier::builder()
        .old_layout(old_layout)
        .new_layout(new_layout)
        .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .image(image)
        .subresource_range(color_subresource())
        .src_access_mask(masks.src_access)
        .dst_access_mask(masks.dst_access);

    let command_buffer = command_pool.begin_single_time()?;
    unsafe {
        command_pool.device().cmd_pipeline_barrier(
            command_buffer,
            masks.src_stage,
            masks.dst_stage,
            vk::DependencyFlags::empty(),
            &[],
            &[],
            &[barrier.build()],
        );
    }
    command_pool.end_single_time(command_buffer, queue)
}

/// Copy tightly packed texels from `buffer` into an image in TRANSFER_DST_OPTIMAL
pub fn copy_buffer_to_image(
    command_pool: &CommandPool,
    queue: vk::Queue,
    buffer: &Buffer,
    image: vk::Image,
    width: u32,
    height: u32,
) -> VulkanResult<()> {
    let region = vk::BufferImageCopy::builder()
        .buffer_offset(0)
        .buffer_row_length(0)
        .buffer_image_height(0)
        .image_subresource(vk::ImageSubresourceLayers {
            aspect_mask: vk::ImageAspectFlags::COLOR,
            mip_level: 0,
            base_array_layer: 0,
            layer_count: 1,
        })
        .image_offset(vk::Offset3D { x: 0, y: 0, z: 0 })
        .image_extent(vk::Extent3D { width, height, depth: 1 });

    let command_buffer = command_pool.begin_single_time()?;
    unsafe {
        command_pool.device().cmd_copy_buffer_to_image(
            command_buffer,
            buffer.handle(),
            image,
            vk::ImageLayout::TRANSFER_DST_OPTIMAL,
            &[region.build()],
        );
    }
    command_pool.end_single_time(command_buffer, queue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_transition_waits_on_nothing() {
        let masks = transition_masks(vk::ImageLayout::UNDEFINED, vk::ImageLayout::TRANSFER_DST_OPTIMAL).unwrap();
        assert!(masks.src_access.is_empty());
        assert_eq!(masks.dst_access, vk::AccessFlags::TRANSFER_WRITE);
        assert_eq!(masks.src_stage, vk::PipelineStageFlags::TOP_OF_PIPE);
        assert_eq!(masks.dst_stage, vk::PipelineStageFlags::TRANSFER);
    }

    #[test]
    fn sampling_transition_waits_on_transfer() {
        let masks = transition_masks(
            vk::ImageLayout::TRANSFER_DST_OPTIMAL,
            vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
        )
        .unwrap();
        assert_eq!(masks.src_access, vk::AccessFlags::TRANSFER_WRITE);
        assert_eq!(masks.dst_access, vk::AccessFlags::SHADER_READ);
        assert_eq!(masks.src_stage, vk::PipelineStageFlags::TRANSFER);
        assert_eq!(masks.dst_stage, vk::PipelineStageFlags::FRAGMENT_SHADER);
    }

    #[test]
    fn other_transitions_are_rejected() {
        let result = transition_masks(vk::ImageLayout::UNDEFINED, vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL);
        match result {
            Err(VulkanError::InvalidLayoutTransition { from, to }) => {
                assert_eq!(from, vk::ImageLayout::UNDEFINED);
                assert_eq!(to, vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
