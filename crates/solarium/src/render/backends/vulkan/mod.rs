//! Vulkan backend implementation
//!
//! Organized into initialization, resources, rendering and state modules,
//! coordinated by [`VulkanRenderer`].

use ash::vk;
use thiserror::Error;

/// Vulkan initialization types (instance, device, surface)
pub mod initialization;

/// Vulkan resource management (buffers, textures, descriptors, uniforms)
pub mod resources;

/// Vulkan rendering operations (shaders, pipelines, render passes, commands)
pub mod rendering;

/// Vulkan state management (swapchain, synchronization, frames in flight)
pub mod state;

/// Main Vulkan renderer implementation
pub mod renderer;

pub use renderer::VulkanRenderer;

pub use initialization::{
    LogicalDevice, PhysicalDeviceInfo, QueueFamilyIndices, Surface, SwapchainSupport,
    VulkanContext, VulkanInstance,
};
pub use rendering::{
    ActiveRenderPass, CommandPool, CommandRecorder, GraphicsPipeline, PipelineConfig,
    RenderPass, ShaderModule, ShaderSet, VulkanVertexLayout,
};
pub use resources::{
    Buffer, DescriptorPool, DescriptorSetLayout, DescriptorSetLayoutBuilder, IndexBuffer,
    SecondaryUniformBufferObject, Texture, UniformBufferObject, UniformBuffers, VertexBuffer,
};
pub use state::{
    DepthBuffer, Fence, FrameSync, FrameTracker, Framebuffer, Semaphore, Swapchain,
    SwapchainResources, SyncManager,
};

/// Vulkan-specific error types
#[derive(Error, Debug)]
pub enum VulkanError {
    /// General Vulkan API error with result code
    #[error("Vulkan API error: {0:?}")]
    Api(vk::Result),

    /// Invalid operation attempted
    #[error("Invalid operation: {reason}")]
    InvalidOperation {
        /// Description of why the operation is invalid
        reason: String,
    },

    /// Vulkan context initialization failed
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    /// No physical device met the renderer's requirements
    #[error("No suitable GPU found")]
    NoSuitableDevice,

    /// No suitable memory type found for allocation
    #[error("No suitable memory type found")]
    NoSuitableMemoryType,

    /// None of the candidate formats support the requested features
    #[error("No candidate format supports the requested features")]
    UnsupportedFormat,

    /// Image layout transition without known access masks
    #[error("Invalid layout transition: {from:?} -> {to:?}")]
    InvalidLayoutTransition {
        /// Layout the image is in
        from: vk::ImageLayout,
        /// Layout that was requested
        to: vk::ImageLayout,
    },

    /// File access failed (shaders, textures)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Texture decoding failed
    #[error("Image error: {0}")]
    Image(String),

    /// SPIR-V could not be loaded
    #[error("Shader error: {0}")]
    Shader(String),
}

/// Result type for Vulkan operations
pub type VulkanResult<T> = Result<T, VulkanError>;
