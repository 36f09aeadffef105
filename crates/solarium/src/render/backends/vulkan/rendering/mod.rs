// Vulkan rendering operations

pub mod commands;
pub mod pipeline;
pub mod render_pass;
pub mod shader;
pub mod vertex_layout;

pub use commands::{ActiveRenderPass, CommandPool, CommandRecorder};
pub use pipeline::{GraphicsPipeline, PipelineConfig, PipelineShaders};
pub use render_pass::RenderPass;
pub use shader::{ShaderModule, ShaderSet};
pub use vertex_layout::VulkanVertexLayout;
