//! Everything that has to be rebuilt when the swapchain changes
//!
//! One depth buffer, framebuffer, uniform buffer pair, descriptor set and
//! pre-recorded command buffer per swapchain image, plus the render pass and
//! the pipeline whose viewport depends on the extent.

use ash::{vk, Device};

use super::framebuffer::{DepthBuffer, Framebuffer};
use crate::render::backends::vulkan::rendering::render_pass::clear_values;
use crate::render::backends::vulkan::rendering::{
    CommandPool, CommandRecorder, GraphicsPipeline, PipelineConfig, PipelineShaders, RenderPass,
};
use crate::render::backends::vulkan::resources::descriptor_set::write_scene_set;
use crate::render::backends::vulkan::resources::{
    DescriptorPool, DescriptorSetLayout, IndexBuffer, SceneBindings, SecondaryUniformBufferObject, Texture,
    UniformBufferObject, UniformBuffers, VertexBuffer,
};
use crate::render::backends::vulkan::{VulkanContext, VulkanError, VulkanResult};

/// Long-lived resources the per-image objects refer to
pub struct SceneInputs<'a> {
    /// Layout of the scene descriptor set
    pub descriptor_layout: &'a DescriptorSetLayout,
    /// Vertex and fragment modules
    pub shaders: PipelineShaders<'a>,
    /// Texture bound at the sampler binding
    pub texture: &'a Texture,
    /// Quad vertices
    pub vertex_buffer: &'a VertexBuffer,
    /// Quad indices
    pub index_buffer: &'a IndexBuffer,
}

/// Per-swapchain resources
///
/// Fields drop in declaration order, so framebuffers and the pipeline go
/// before the render pass they were created against. Command buffers are
/// returned to the pool with [`Self::free_command_buffers`].
pub struct SwapchainResources {
    command_buffers: Vec<vk::CommandBuffer>,
    descriptor_sets: Vec<vk::DescriptorSet>,
    // Owns the sets above; only needed for Drop
    #[allow(dead_code)]
    descriptor_pool: DescriptorPool,
    uniform_buffers: UniformBuffers,
    pipeline: GraphicsPipeline,
    framebuffers: Vec<Framebuffer>,
    #[allow(dead_code)]
    depth_buffers: Vec<DepthBuffer>,
    render_pass: RenderPass,
    extent: vk::Extent2D,
}

impl SwapchainResources {
    /// Build and record everything for the context's current swapchain
    pub fn new(context: &VulkanContext, command_pool: &CommandPool, scene: &SceneInputs<'_>) -> VulkanResult<Self> {
        let device = context.raw_device();
        let swapchain = context.swapchain();
        let extent = swapchain.extent();
        let image_count = swapchain.image_count();
        let memory_properties = &context.physical_device().memory_properties;
        let depth_format = context.find_depth_format()?;

        let render_pass = RenderPass::new_forward_pass(device.clone(), swapchain.format().format, depth_format)?;

        let mut depth_buffers = Vec::with_capacity(image_count);
        let mut framebuffers = Vec::with_capacity(image_count);
        for &color_view in swapchain.image_views() {
            let depth_buffer = DepthBuffer::new(device.clone(), memory_properties, depth_format, extent)?;
            let framebuffer = Framebuffer::new(
                device.clone(),
                render_pass.handle(),
                &[color_view, depth_buffer.image_view()],
                extent,
            )?;
            depth_buffers.push(depth_buffer);
            framebuffers.push(framebuffer);
        }

        let config = PipelineConfig::default_for(extent);
        let pipeline = GraphicsPipeline::new(
            &device,
            render_pass.handle(),
            scene.descriptor_layout.handle(),
            &scene.shaders,
            &config,
        )?;

        let uniform_buffers = UniformBuffers::new(&device, memory_properties, image_count)?;

        let set_count = u32::try_from(image_count).map_err(|_| VulkanError::InvalidOperation {
            reason: format!("Too many swapchain images: {image_count}"),
        })?;
        let descriptor_pool = DescriptorPool::new(device.clone(), set_count)?;
        let layouts = vec![scene.descriptor_layout.handle(); image_count];
        let descriptor_sets = descriptor_pool.allocate_descriptor_sets(&layouts)?;

        for (index, &set) in descriptor_sets.iter().enumerate() {
            let (Some(ubo), Some(secondary_ubo)) = (uniform_buffers.primary(index), uniform_buffers.secondary(index))
            else {
                return Err(VulkanError::InvalidOperation {
                    reason: format!("No uniform buffers for image {index}"),
                });
            };
            let bindings = SceneBindings {
                ubo,
                secondary_ubo,
                image_view: scene.texture.image_view(),
                sampler: scene.texture.sampler(),
            };
            write_scene_set(&device, set, &bindings);
        }

        let mut resources = Self {
            command_buffers: Vec::new(),
            descriptor_sets,
            descriptor_pool,
            uniform_buffers,
            pipeline,
            framebuffers,
            depth_buffers,
            render_pass,
            extent,
        };

        resources.command_buffers = command_pool.allocate_command_buffers(set_count)?;
        if let Err(e) = resources.record_all(&device, &config, scene) {
            resources.free_command_buffers(command_pool);
            return Err(e);
        }

        log::debug!(
            "Swapchain resources created: {} images at {}x{}",
            image_count,
            extent.width,
            extent.height
        );
        Ok(resources)
    }

    fn record_all(&self, device: &Device, config: &PipelineConfig, scene: &SceneInputs<'_>) -> VulkanResult<()> {
        let clears = clear_values();
        let frames = self
            .command_buffers
            .iter()
            .zip(&self.framebuffers)
            .zip(&self.descriptor_sets);

        for ((&command_buffer, framebuffer), &set) in frames {
            let mut recorder = CommandRecorder::new(command_buffer, device.clone());
            recorder.begin(vk::CommandBufferUsageFlags::empty())?;
            {
                let mut pass =
                    recorder.begin_render_pass(self.render_pass.handle(), framebuffer.handle(), config.scissor, &clears)?;
                pass.bind_pipeline(self.pipeline.handle());
                pass.bind_vertex_buffers(0, &[scene.vertex_buffer.handle()], &[0]);
                pass.bind_index_buffer(scene.index_buffer.handle(), 0, IndexBuffer::INDEX_TYPE);
                pass.bind_descriptor_sets(self.pipeline.layout(), 0, &[set]);
                pass.draw_indexed(scene.index_buffer.index_count(), 1, 0, 0, 0);
            }
            recorder.end()?;
        }
        Ok(())
    }

    /// Command buffer recorded for swapchain image `image_index`
    pub fn command_buffer(&self, image_index: usize) -> VulkanResult<vk::CommandBuffer> {
        self.command_buffers
            .get(image_index)
            .copied()
            .ok_or_else(|| VulkanError::InvalidOperation {
                reason: format!("No command buffer for image {image_index}"),
            })
    }

    /// Write the uniform buffers read by image `image_index`
    pub fn update_uniforms(
        &self,
        image_index: usize,
        ubo: &UniformBufferObject,
        secondary: &SecondaryUniformBufferObject,
    ) -> VulkanResult<()> {
        self.uniform_buffers.update(image_index, ubo, secondary)
    }

    /// Return the recorded command buffers to `command_pool`
    ///
    /// Must be called with the device idle, before the resources are dropped.
    pub fn free_command_buffers(&mut self, command_pool: &CommandPool) {
        if !self.command_buffers.is_empty() {
            command_pool.free_command_buffers(&self.command_buffers);
            self.command_buffers.clear();
        }
    }

    /// Extent the resources were built for
    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    /// Number of swapchain images covered
    pub fn image_count(&self) -> usize {
        self.framebuffers.len()
    }
}
