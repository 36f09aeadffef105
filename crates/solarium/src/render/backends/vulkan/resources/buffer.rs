//! Buffer management for vertex, index and uniform data
//!
//! Buffers own their device memory; device-local buffers are filled through
//! a temporary staging buffer and a one-shot transfer command buffer.

use ash::{vk, Device};
use bytemuck::Pod;

use crate::render::backends::vulkan::rendering::commands::CommandPool;
use crate::render::backends::vulkan::{VulkanError, VulkanResult};

/// Index of the first memory type allowed by `type_filter` that has `properties`
pub fn find_memory_type(
    type_filter: u32,
    properties: vk::MemoryPropertyFlags,
    memory_properties: &vk::PhysicalDeviceMemoryProperties,
) -> VulkanResult<u32> {
    (0..memory_properties.memory_type_count)
        .find(|&i| {
            (type_filter & (1 << i)) != 0
                && memory_properties.memory_types[i as usize]
                    .property_flags
                    .contains(properties)
        })
        .ok_or(VulkanError::NoSuitableMemoryType)
}

/// Allocate memory matching `requirements` and `properties`
pub fn allocate_memory(
    device: &Device,
    memory_properties: &vk::PhysicalDeviceMemoryProperties,
    requirements: vk::MemoryRequirements,
    properties: vk::MemoryPropertyFlags,
) -> VulkanResult<vk::DeviceMemory> {
    let memory_type_index = find_memory_type(requirements.memory_type_bits, properties, memory_properties)?;
    let alloc_info = vk::MemoryAllocateInfo::builder()
        .allocation_size(requirements.size)
        .memory_type_index(memory_type_index);

    unsafe { device.allocate_memory(&alloc_info, None) }.map_err(VulkanError::Api)
}

fn byte_size<T>(data: &[T]) -> vk::DeviceSize {
    std::mem::size_of_val(data) as vk::DeviceSize
}

/// Buffer wrapper with memory management
pub struct Buffer {
    device: Device,
    buffer: vk::Buffer,
    memory: vk::DeviceMemory,
    size: vk::DeviceSize,
}

impl Buffer {
    /// Create an exclusive buffer and bind freshly allocated memory to it
    pub fn new(
        device: Device,
        memory_properties: &vk::PhysicalDeviceMemoryProperties,
        size: vk::DeviceSize,
        usage: vk::BufferUsageFlags,
        properties: vk::MemoryPropertyFlags,
    ) -> VulkanResult<Self> {
        if size == 0 {
            return Err(VulkanError::InvalidOperation {
                reason: "Cannot create a zero-sized buffer".to_string(),
            });
        }

        let buffer_info = vk::BufferCreateInfo::builder()
            .size(size)
            .usage(usage)
            .sharing_mode(vk::SharingMode::EXCLUSIVE);

        let buffer = unsafe { device.create_buffer(&buffer_info, None) }.map_err(VulkanError::Api)?;
        let requirements = unsafe { device.get_buffer_memory_requirements(buffer) };

        let memory = match allocate_memory(&device, memory_properties, requirements, properties) {
            Ok(memory) => memory,
            Err(e) => {
                unsafe { device.destroy_buffer(buffer, None) };
                return Err(e);
            }
        };

        let result = Self {
            device,
            buffer,
            memory,
            size,
        };
        unsafe { result.device.bind_buffer_memory(buffer, memory, 0) }.map_err(VulkanError::Api)?;

        Ok(result)
    }

    /// Host-visible, coherent buffer initialised with `data`
    pub fn host_visible_with_data<T: Pod>(
        device: Device,
        memory_properties: &vk::PhysicalDeviceMemoryProperties,
        usage: vk::BufferUsageFlags,
        data: &[T],
    ) -> VulkanResult<Self> {
        let buffer = Self::new(
            device,
            memory_properties,
            byte_size(data),
            usage,
            vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
        )?;
        buffer.write_data(data)?;
        Ok(buffer)
    }

    /// Device-local buffer filled from a temporary staging buffer
    pub fn device_local_with_data<T: Pod>(
        device: Device,
        memory_properties: &vk::PhysicalDeviceMemoryProperties,
        command_pool: &CommandPool,
        queue: vk::Queue,
        usage: vk::BufferUsageFlags,
        data: &[T],
    ) -> VulkanResult<Self> {
        let staging = Self::host_visible_with_data(
            device.clone(),
            memory_properties,
            vk::BufferUsageFlags::TRANSFER_SRC,
            data,
        )?;

        let buffer = Self::new(
            device,
            memory_properties,
            staging.size,
            vk::BufferUsageFlags::TRANSFER_DST | usage,
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
        )?;

        copy_buffer(command_pool, queue, &staging, &buffer, staging.size)?;
        Ok(buffer)
    }

    /// Copy `data` to the start of the buffer through a map/unmap pair
    pub fn write_data<T: Pod>(&self, data: &[T]) -> VulkanResult<()> {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        if bytes.len() as vk::DeviceSize > self.size {
            return Err(VulkanError::InvalidOperation {
                reason: format!("Write of {} bytes exceeds buffer size {}", bytes.len(), self.size),
            });
        }

        unsafe {
            let ptr = self
                .device
                .map_memory(self.memory, 0, self.size, vk::MemoryMapFlags::empty())
                .map_err(VulkanError::Api)?;
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), ptr.cast::<u8>(), bytes.len());
            self.device.unmap_memory(self.memory);
        }
        Ok(())
    }

    /// Get buffer handle
    pub fn handle(&self) -> vk::Buffer {
        self.buffer
    }

    /// Size in bytes
    pub fn size(&self) -> vk::DeviceSize {
        self.size
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_buffer(self.buffer, None);
            self.device.free_memory(self.memory, None);
        }
    }
}

/// Copy `size` bytes between buffers and wait for the transfer to finish
pub fn copy_buffer(
    command_pool: &CommandPool,
    queue: vk::Queue,
    src: &Buffer,
    dst: &Buffer,
    size: vk::DeviceSize,
) -> VulkanResult<()> {
    let command_buffer = command_pool.begin_single_time()?;
    let region = vk::BufferCopy::builder().src_offset(0).dst_offset(0).size(size).build();
    unsafe {
        command_pool
            .device()
            .cmd_copy_buffer(command_buffer, src.handle(), dst.handle(), &[region]);
    }
    command_pool.end_single_time(command_buffer, queue)
}

/// Device-local vertex buffer
pub struct VertexBuffer {
    buffer: Buffer,
    vertex_count: u32,
}

impl VertexBuffer {
    /// Upload vertices through a staging buffer
    pub fn new<T: Pod>(
        device: Device,
        memory_properties: &vk::PhysicalDeviceMemoryProperties,
        command_pool: &CommandPool,
        queue: vk::Queue,
        vertices: &[T],
    ) -> VulkanResult<Self> {
        let buffer = Buffer::device_local_with_data(
            device,
            memory_properties,
            command_pool,
            queue,
            vk::BufferUsageFlags::VERTEX_BUFFER,
            vertices,
        )?;

        Ok(Self {
            buffer,
            vertex_count: u32::try_from(vertices.len()).map_err(|_| VulkanError::InvalidOperation {
                reason: "Too many vertices".to_string(),
            })?,
        })
    }

    /// Get buffer handle
    pub fn handle(&self) -> vk::Buffer {
        self.buffer.handle()
    }

    /// Number of vertices uploaded
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }
}

/// Device-local 16-bit index buffer
pub struct IndexBuffer {
    buffer: Buffer,
    index_count: u32,
}

impl IndexBuffer {
    /// Index type recorded with `vkCmdBindIndexBuffer`
    pub const INDEX_TYPE: vk::IndexType = vk::IndexType::UINT16;

    /// Upload indices through a staging buffer
    pub fn new(
        device: Device,
        memory_properties: &vk::PhysicalDeviceMemoryProperties,
        command_pool: &CommandPool,
        queue: vk::Queue,
        indices: &[u16],
    ) -> VulkanResult<Self> {
        let buffer = Buffer::device_local_with_data(
            device,
            memory_properties,
            command_pool,
            queue,
            vk::BufferUsageFlags::INDEX_BUFFER,
            indices,
        )?;

        Ok(Self {
            buffer,
            index_count: u32::try_from(indices.len()).map_err(|_| VulkanError::InvalidOperation {
                reason: "Too many indices".to_string(),
            })?,
        })
    }

    /// Get buffer handle
    pub fn handle(&self) -> vk::Buffer {
        self.buffer.handle()
    }

    /// Get index count
    pub fn index_count(&self) -> u32 {
        self.index_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_properties(flags: &[vk::MemoryPropertyFlags]) -> vk::PhysicalDeviceMemoryProperties {
        let mut props = vk::PhysicalDeviceMemoryProperties {
            memory_type_count: flags.len() as u32,
            ..Default::default()
        };
        for (slot, &property_flags) in props.memory_types.iter_mut().zip(flags) {
            slot.property_flags = property_flags;
        }
        props
    }

    #[test]
    fn first_matching_type_is_chosen() {
        let props = memory_properties(&[
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
            vk::MemoryPropertyFlags::HOST_VISIBLE,
            vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
        ]);

        let host = vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT;
        assert_eq!(find_memory_type(0b111, host, &props).unwrap(), 2);
        assert_eq!(
            find_memory_type(0b111, vk::MemoryPropertyFlags::HOST_VISIBLE, &props).unwrap(),
            1
        );
    }

    #[test]
    fn type_filter_excludes_types() {
        let props = memory_properties(&[
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
        ]);
        assert_eq!(
            find_memory_type(0b10, vk::MemoryPropertyFlags::DEVICE_LOCAL, &props).unwrap(),
            1
        );
    }

    #[test]
    fn missing_type_is_an_error() {
        let props = memory_properties(&[vk::MemoryPropertyFlags::DEVICE_LOCAL]);
        let result = find_memory_type(0b1, vk::MemoryPropertyFlags::HOST_VISIBLE, &props);
        assert!(matches!(result, Err(VulkanError::NoSuitableMemoryType)));

        // Types past memory_type_count are never considered
        let result = find_memory_type(0b10, vk::MemoryPropertyFlags::empty(), &props);
        assert!(matches!(result, Err(VulkanError::NoSuitableMemoryType)));
    }

    #[test]
    fn byte_size_counts_elements() {
        assert_eq!(byte_size(&[0u16; 12]), 24);
        assert_eq!(byte_size::<[f32; 8]>(&[]), 0);
    }
}
