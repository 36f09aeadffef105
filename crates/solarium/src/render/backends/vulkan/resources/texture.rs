//! Vulkan texture management
//!
//! Decodes an image file to RGBA8, uploads it into a sampled sRGB image and
//! creates the sampler used by the fragment shader.

use ash::{vk, Device};
use std::path::Path;

use super::buffer::Buffer;
use super::image::{copy_buffer_to_image, transition_image_layout, Image, ImageDesc};
use crate::render::backends::vulkan::initialization::VulkanContext;
use crate::render::backends::vulkan::rendering::commands::CommandPool;
use crate::render::backends::vulkan::{VulkanError, VulkanResult};

/// Format every texture is stored in
pub const TEXTURE_FORMAT: vk::Format = vk::Format::R8G8B8A8_SRGB;

const CHECKER_SIZE: u32 = 64;
const CHECKER_CELL: u32 = 8;

/// Sampled texture: image, view and sampler
pub struct Texture {
    device: Device,
    image: Image,
    sampler: vk::Sampler,
    width: u32,
    height: u32,
}

impl Texture {
    /// Load a texture, or a checkerboard when the file does not exist
    pub fn load_or_checkerboard(context: &VulkanContext, command_pool: &CommandPool, path: &Path) -> VulkanResult<Self> {
        if path.exists() {
            Self::from_file(context, command_pool, path)
        } else {
            log::warn!("Texture '{}' not found, using checkerboard", path.display());
            Self::checkerboard(context, command_pool)
        }
    }

    /// Decode `path` with the `image` crate and upload it
    pub fn from_file(context: &VulkanContext, command_pool: &CommandPool, path: &Path) -> VulkanResult<Self> {
        let decoded = ::image::open(path)
            .map_err(|e| VulkanError::Image(format!("{}: {e}", path.display())))?
            .to_rgba8();
        let (width, height) = decoded.dimensions();
        log::info!("Loaded texture '{}' ({}x{})", path.display(), width, height);

        Self::from_rgba(context, command_pool, width, height, decoded.as_raw())
    }

    /// Generated black/white checkerboard
    pub fn checkerboard(context: &VulkanContext, command_pool: &CommandPool) -> VulkanResult<Self> {
        let pixels = checkerboard_pixels(CHECKER_SIZE, CHECKER_CELL);
        Self::from_rgba(context, command_pool, CHECKER_SIZE, CHECKER_SIZE, &pixels)
    }

    /// Upload tightly packed RGBA8 texels
    pub fn from_rgba(
        context: &VulkanContext,
        command_pool: &CommandPool,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> VulkanResult<Self> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || pixels.len() != expected {
            return Err(VulkanError::Image(format!(
                "Expected {expected} bytes for a {width}x{height} RGBA image, got {}",
                pixels.len()
            )));
        }

        let device = context.raw_device();
        let memory_properties = &context.physical_device().memory_properties;
        let queue = context.graphics_queue();

        let staging = Buffer::host_visible_with_data(
            device.clone(),
            memory_properties,
            vk::BufferUsageFlags::TRANSFER_SRC,
            pixels,
        )?;

        let image = Image::new(
            device.clone(),
            memory_properties,
            &ImageDesc {
                width,
                height,
                format: TEXTURE_FORMAT,
                tiling: vk::ImageTiling::OPTIMAL,
                usage: vk::ImageUsageFlags::TRANSFER_DST | vk::ImageUsageFlags::SAMPLED,
                properties: vk::MemoryPropertyFlags::DEVICE_LOCAL,
                aspect: vk::ImageAspectFlags::COLOR,
            },
        )?;

        transition_image_layout(
            command_pool,
            queue,
            image.handle(),
            vk::ImageLayout::UNDEFINED,
            vk::ImageLayout::TRANSFER_DST_OPTIMAL,
        )?;
        copy_buffer_to_image(command_pool, queue, &staging, image.handle(), width, height)?;
        transition_image_layout(
            command_pool,
            queue,
            image.handle(),
            vk::ImageLayout::TRANSFER_DST_OPTIMAL,
            vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
        )?;

        let max_anisotropy = context.physical_device().properties.limits.max_sampler_anisotropy;
        let sampler_info = sampler_create_info(max_anisotropy);
        let sampler = unsafe { device.create_sampler(&sampler_info, None) }.map_err(VulkanError::Api)?;

        Ok(Self {
            device,
            image,
            sampler,
            width,
            height,
        })
    }

    /// Get the image view handle
    pub fn image_view(&self) -> vk::ImageView {
        self.image.view()
    }

    /// Get the sampler handle
    pub fn sampler(&self) -> vk::Sampler {
        self.sampler
    }

    /// Size in pixels
    pub fn extent(&self) -> vk::Extent2D {
        vk::Extent2D {
            width: self.width,
            height: self.height,
        }
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_sampler(self.sampler, None);
        }
    }
}

/// Linear, repeating, anisotropic sampler over a single mip level
pub fn sampler_create_info(max_anisotropy: f32) -> vk::SamplerCreateInfo {
    vk::SamplerCreateInfo::builder()
        .mag_filter(vk::Filter::LINEAR)
        .min_filter(vk::Filter::LINEAR)
        .address_mode_u(vk::SamplerAddressMode::REPEAT)
        .address_mode_v(vk::SamplerAddressMode::REPEAT)
        .address_mode_w(vk::SamplerAddressMode::REPEAT)
        .anisotropy_enable(true)
        .max_anisotropy(max_anisotropy)
        .border_color(vk::BorderColor::INT_OPAQUE_BLACK)
        .unnormalized_coordinates(false)
        .compare_enable(false)
        .compare_op(vk::CompareOp::ALWAYS)
        .mipmap_mode(vk::SamplerMipmapMode::LINEAR)
        .mip_lod_bias(0.0)
        .min_lod(0.0)
        .max_lod(0.0)
        .build()
}

/// RGBA8 checkerboard of `size`×`size` texels with `cell`-sized squares
pub fn checkerboard_pixels(size: u32, cell: u32) -> Vec<u8> {
    let cell = cell.max(1);
    (0..size)
        .flat_map(|y| (0..size).map(move |x| (x, y)))
        .flat_map(|(x, y)| {
            let value = if ((x / cell) + (y / cell)) % 2 == 0 { 255 } else { 0 };
            [value, value, value, 255]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn checkerboard_alternates_cells() {
        let pixels = checkerboard_pixels(4, 2);
        assert_eq!(pixels.len(), 4 * 4 * 4);

        let texel = |x: usize, y: usize| &pixels[(y * 4 + x) * 4..(y * 4 + x) * 4 + 4];
        assert_eq!(texel(0, 0), &[255, 255, 255, 255]);
        assert_eq!(texel(1, 1), &[255, 255, 255, 255]);
        assert_eq!(texel(2, 0), &[0, 0, 0, 255]);
        assert_eq!(texel(0, 2), &[0, 0, 0, 255]);
        assert_eq!(texel(3, 3), &[255, 255, 255, 255]);
    }

    #[test]
    fn zero_cell_size_does_not_divide_by_zero() {
        let pixels = checkerboard_pixels(2, 0);
        assert_eq!(&pixels[0..4], &[255, 255, 255, 255]);
        assert_eq!(&pixels[4..8], &[0, 0, 0, 255]);
    }

    #[test]
    fn sampler_uses_device_anisotropy_limit() {
        let info = sampler_create_info(8.0);
        assert_eq!(info.mag_filter, vk::Filter::LINEAR);
        assert_eq!(info.address_mode_w, vk::SamplerAddressMode::REPEAT);
        assert_eq!(info.anisotropy_enable, vk::TRUE);
        assert_relative_eq!(info.max_anisotropy, 8.0);
        assert_eq!(info.unnormalized_coordinates, vk::FALSE);
        assert_eq!(info.compare_op, vk::CompareOp::ALWAYS);
        assert_relative_eq!(info.max_lod, 0.0);
    }
}
