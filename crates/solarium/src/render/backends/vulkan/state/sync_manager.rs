//! Synchronization management for the Vulkan renderer
//!
//! Owns the per-slot fences and acquire semaphores and the per-image
//! render-finished semaphores, and performs the acquire/submit/present calls.

use ash::{vk, Device};

use super::frame::{present_needs_recreate, AcquireOutcome};
use super::swapchain::Swapchain;
use super::sync::{FrameSync, Semaphore};
use crate::render::backends::vulkan::{VulkanError, VulkanResult};

/// Manages all synchronization objects and frame coordination
pub struct SyncManager {
    device: Device,
    frames: Vec<FrameSync>,
    render_finished: Vec<Semaphore>,
}

impl SyncManager {
    /// Create sync objects for `max_frames_in_flight` slots and `image_count` images
    pub fn new(device: Device, max_frames_in_flight: usize, image_count: usize) -> VulkanResult<Self> {
        let frames = (0..max_frames_in_flight)
            .map(|_| FrameSync::new(device.clone()))
            .collect::<VulkanResult<Vec<_>>>()?;
        let render_finished = Self::create_image_semaphores(&device, image_count)?;

        log::debug!(
            "SyncManager created: {} frames in flight, {} image semaphores",
            frames.len(),
            render_finished.len()
        );

        Ok(Self {
            device,
            frames,
            render_finished,
        })
    }

    fn create_image_semaphores(device: &Device, image_count: usize) -> VulkanResult<Vec<Semaphore>> {
        (0..image_count).map(|_| Semaphore::new(device.clone())).collect()
    }

    /// Replace the per-image semaphores after the swapchain changed
    ///
    /// The device must be idle.
    pub fn recreate_image_semaphores(&mut self, image_count: usize) -> VulkanResult<()> {
        self.render_finished = Self::create_image_semaphores(&self.device, image_count)?;
        Ok(())
    }

    fn frame(&self, slot: usize) -> VulkanResult<&FrameSync> {
        self.frames.get(slot).ok_or_else(|| VulkanError::InvalidOperation {
            reason: format!("Frame slot {slot} out of range"),
        })
    }

    /// Block until the slot's last submission has completed
    pub fn wait_for_frame(&self, slot: usize) -> VulkanResult<()> {
        self.frame(slot)?.in_flight.wait(u64::MAX)
    }

    /// Acquire the next image, signaling the slot's image-available semaphore
    pub fn acquire_next_image(&self, swapchain: &Swapchain, slot: usize) -> VulkanResult<AcquireOutcome> {
        let frame = self.frame(slot)?;
        let result = unsafe {
            swapchain.loader().acquire_next_image(
                swapchain.handle(),
                u64::MAX,
                frame.image_available.handle(),
                vk::Fence::null(),
            )
        };

        let outcome = AcquireOutcome::from_result(result)?;
        if outcome == AcquireOutcome::OutOfDate {
            log::debug!("Swapchain out of date during acquire");
        }
        Ok(outcome)
    }

    /// Submit the image's command buffer and present it
    ///
    /// Returns whether the swapchain has to be recreated; a pending resize
    /// is consumed when it is.
    pub fn submit_and_present(
        &self,
        graphics_queue: vk::Queue,
        present_queue: vk::Queue,
        swapchain: &Swapchain,
        command_buffer: vk::CommandBuffer,
        image_index: u32,
        slot: usize,
        framebuffer_resized: &mut bool,
    ) -> VulkanResult<bool> {
        let frame = self.frame(slot)?;
        let render_finished = self
            .render_finished
            .get(image_index as usize)
            .ok_or_else(|| VulkanError::InvalidOperation {
                reason: format!("Swapchain image {image_index} has no semaphore"),
            })?;

        frame.in_flight.reset()?;

        let wait_semaphores = [frame.image_available.handle()];
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let command_buffers = [command_buffer];
        let signal_semaphores = [render_finished.handle()];
        let submit_info = vk::SubmitInfo::builder()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores);

        unsafe {
            self.device
                .queue_submit(graphics_queue, &[submit_info.build()], frame.in_flight.handle())
        }
        .map_err(VulkanError::Api)?;

        let swapchains = [swapchain.handle()];
        let image_indices = [image_index];
        let present_info = vk::PresentInfoKHR::builder()
            .wait_semaphores(&signal_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        let result = unsafe { swapchain.loader().queue_present(present_queue, &present_info) };
        present_needs_recreate(result, framebuffer_resized)
    }

    /// Number of frame slots
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}
