//! Vulkan renderer
//!
//! Coordinates the context, the long-lived scene resources and the
//! per-swapchain resources, and runs the per-frame acquire, submit and
//! present sequence.

use ash::vk;
use std::path::Path;

use super::rendering::{CommandPool, PipelineShaders, ShaderModule, ShaderSet};
use super::resources::{
    DescriptorSetLayout, DescriptorSetLayoutBuilder, IndexBuffer, SecondaryUniformBufferObject, Texture,
    UniformBufferObject, VertexBuffer,
};
use super::state::swapchain_resources::SceneInputs;
use super::state::{AcquireOutcome, FrameTracker, SwapchainResources, SyncManager};
use super::{VulkanContext, VulkanError, VulkanResult};
use crate::config::RendererConfig;
use crate::render::primitives::{QUAD_INDICES, QUAD_VERTICES};
use crate::render::window::Window;

/// Resources that survive swapchain recreation
struct SceneResources {
    vertex_shader: ShaderModule,
    fragment_shader: ShaderModule,
    descriptor_layout: DescriptorSetLayout,
    index_buffer: IndexBuffer,
    vertex_buffer: VertexBuffer,
    texture: Texture,
}

impl SceneResources {
    fn inputs(&self) -> SceneInputs<'_> {
        SceneInputs {
            descriptor_layout: &self.descriptor_layout,
            shaders: PipelineShaders {
                vertex: &self.vertex_shader,
                fragment: &self.fragment_shader,
            },
            texture: &self.texture,
            vertex_buffer: &self.vertex_buffer,
            index_buffer: &self.index_buffer,
        }
    }
}

/// Renderer for the textured quad scene
///
/// Field order is drop order: per-swapchain objects first, the context last.
pub struct VulkanRenderer {
    swapchain_resources: Option<SwapchainResources>,
    sync_manager: SyncManager,
    frames: FrameTracker,
    scene: SceneResources,
    command_pool: CommandPool,
    framebuffer_resized: bool,
    context: VulkanContext,
}

impl VulkanRenderer {
    /// Create the renderer for `window`
    pub fn new(window: &Window, config: &RendererConfig) -> VulkanResult<Self> {
        validate_config(config)?;
        let context = VulkanContext::new(window, config)?;
        log::info!("Using GPU: {}", context.physical_device().name());

        let device = context.raw_device();
        let memory_properties = context.physical_device().memory_properties;
        let command_pool = CommandPool::new(device.clone(), context.graphics_queue_family())?;

        let texture = Texture::load_or_checkerboard(&context, &command_pool, Path::new(&config.texture_path))?;
        let vertex_buffer = VertexBuffer::new(
            device.clone(),
            &memory_properties,
            &command_pool,
            context.graphics_queue(),
            &QUAD_VERTICES,
        )?;
        let index_buffer = IndexBuffer::new(
            device.clone(),
            &memory_properties,
            &command_pool,
            context.graphics_queue(),
            &QUAD_INDICES,
        )?;

        let descriptor_layout = DescriptorSetLayoutBuilder::scene().build(&device)?;

        let shader_set = ShaderSet::find_compiled(Path::new(&config.shaders.directory), &config.shaders.shader_set)?;
        log::debug!("Using shader set '{}'", shader_set.name);
        let vertex_shader = ShaderModule::from_file(&device, &shader_set.vertex)?;
        let fragment_shader = ShaderModule::from_file(&device, &shader_set.fragment)?;

        let scene = SceneResources {
            vertex_shader,
            fragment_shader,
            descriptor_layout,
            index_buffer,
            vertex_buffer,
            texture,
        };

        let swapchain_resources = SwapchainResources::new(&context, &command_pool, &scene.inputs())?;
        let image_count = context.swapchain().image_count();
        let frames = FrameTracker::new(config.max_frames_in_flight, image_count);
        let sync_manager = SyncManager::new(device, frames.max_frames_in_flight(), image_count)?;

        log::info!(
            "Renderer ready: {} swapchain images, {} frames in flight",
            image_count,
            frames.max_frames_in_flight()
        );

        Ok(Self {
            swapchain_resources: Some(swapchain_resources),
            sync_manager,
            frames,
            scene,
            command_pool,
            framebuffer_resized: false,
            context,
        })
    }

    fn resources(&self) -> VulkanResult<&SwapchainResources> {
        self.swapchain_resources
            .as_ref()
            .ok_or_else(|| VulkanError::InvalidOperation {
                reason: "Swapchain resources are missing after a failed recreate".to_string(),
            })
    }

    /// Render and present one frame
    ///
    /// `seconds` drives the model animation and `secondary` carries the
    /// camera view for this frame.
    pub fn draw_frame(
        &mut self,
        window: &mut Window,
        seconds: f32,
        secondary: &SecondaryUniformBufferObject,
    ) -> VulkanResult<()> {
        let slot = self.frames.current_frame();
        self.sync_manager.wait_for_frame(slot)?;

        let image_index = match self.sync_manager.acquire_next_image(self.context.swapchain(), slot)? {
            AcquireOutcome::Ready { image_index, .. } => image_index,
            AcquireOutcome::OutOfDate => return self.recreate_swapchain(window),
        };
        let image = image_index as usize;

        // A previous slot may still be rendering into this image
        if let Some(owner) = self.frames.claim_image(image) {
            self.sync_manager.wait_for_frame(owner)?;
        }

        let ubo = UniformBufferObject::animated(seconds, self.context.swapchain().extent());
        let resources = self.resources()?;
        resources.update_uniforms(image, &ubo, secondary)?;
        let command_buffer = resources.command_buffer(image)?;

        let needs_recreate = self.sync_manager.submit_and_present(
            self.context.graphics_queue(),
            self.context.present_queue(),
            self.context.swapchain(),
            command_buffer,
            image_index,
            slot,
            &mut self.framebuffer_resized,
        )?;

        if needs_recreate {
            self.recreate_swapchain(window)?;
        }

        self.frames.advance();
        Ok(())
    }

    /// Rebuild the swapchain and everything derived from it
    pub fn recreate_swapchain(&mut self, window: &mut Window) -> VulkanResult<()> {
        window.wait_while_minimized();
        let extent = window.framebuffer_extent();
        if extent.width == 0 || extent.height == 0 {
            // Closed while minimized
            return Ok(());
        }

        self.context.wait_idle()?;

        if let Some(mut old) = self.swapchain_resources.take() {
            old.free_command_buffers(&self.command_pool);
        }

        self.context.recreate_swapchain(extent)?;
        let resources = SwapchainResources::new(&self.context, &self.command_pool, &self.scene.inputs())?;
        self.swapchain_resources = Some(resources);

        let image_count = self.context.swapchain().image_count();
        self.frames.reset_images(image_count);
        self.sync_manager.recreate_image_semaphores(image_count)?;

        log::info!("Swapchain recreated at {}x{}", extent.width, extent.height);
        Ok(())
    }

    /// Force a recreate after the next present
    pub fn set_framebuffer_resized(&mut self) {
        self.framebuffer_resized = true;
    }

    /// Current swapchain extent
    pub fn swapchain_extent(&self) -> vk::Extent2D {
        self.context.swapchain().extent()
    }

    /// Block until the GPU has finished all submitted work
    pub fn wait_idle(&self) -> VulkanResult<()> {
        self.context.wait_idle()
    }
}

fn validate_config(config: &RendererConfig) -> VulkanResult<()> {
    config
        .validate()
        .map_err(|e| VulkanError::InitializationFailed(e.to_string()))
}

impl Drop for VulkanRenderer {
    fn drop(&mut self) {
        if let Err(e) = self.context.wait_idle() {
            log::error!("Failed to wait for device idle during renderer drop: {}", e);
        }
        if let Some(resources) = self.swapchain_resources.as_mut() {
            resources.free_command_buffers(&self.command_pool);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_frames_in_flight_is_rejected_before_touching_vulkan() {
        let config = RendererConfig::new("Sol").with_max_frames_in_flight(0);
        let error = validate_config(&config).err();
        assert!(matches!(error, Some(VulkanError::InitializationFailed(reason)) if reason.contains("frames in flight")));
    }

    #[test]
    fn default_config_passes() {
        assert!(validate_config(&RendererConfig::new("Sol")).is_ok());
    }
}
