// Vulkan resource management

pub mod buffer;
pub mod descriptor_set;
pub mod image;
pub mod texture;
pub mod uniform_buffer;

pub use buffer::{Buffer, IndexBuffer, VertexBuffer};
pub use descriptor_set::{DescriptorPool, DescriptorSetLayout, DescriptorSetLayoutBuilder, SceneBindings};
pub use self::image::{Image, ImageDesc};
pub use texture::Texture;
pub use uniform_buffer::{SecondaryUniformBufferObject, UniformBufferObject, UniformBuffers};
