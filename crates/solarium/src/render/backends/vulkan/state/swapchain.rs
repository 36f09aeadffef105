//! Vulkan swapchain management
//!
//! Pure selection of format, present mode, extent and image count from the
//! surface support query, plus the RAII swapchain built from those choices.

use ash::extensions::khr::Swapchain as SwapchainLoader;
use ash::{vk, Device, Instance};

use crate::render::backends::vulkan::initialization::{QueueFamilyIndices, Surface, SwapchainSupport};
use crate::render::backends::vulkan::{VulkanError, VulkanResult};

/// Pick B8G8R8A8_UNORM / SRGB_NONLINEAR when offered, otherwise the first format
pub fn choose_surface_format(formats: &[vk::SurfaceFormatKHR]) -> VulkanResult<vk::SurfaceFormatKHR> {
    formats
        .iter()
        .copied()
        .find(|sf| sf.format == vk::Format::B8G8R8A8_UNORM && sf.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR)
        .or_else(|| formats.first().copied())
        .ok_or(VulkanError::UnsupportedFormat)
}

/// MAILBOX when preferred and available, FIFO otherwise
pub fn choose_present_mode(modes: &[vk::PresentModeKHR], prefer_mailbox: bool) -> vk::PresentModeKHR {
    let mode = if prefer_mailbox && modes.contains(&vk::PresentModeKHR::MAILBOX) {
        vk::PresentModeKHR::MAILBOX
    } else {
        vk::PresentModeKHR::FIFO
    };
    log::debug!("Present mode: {:?}", mode);
    mode
}

/// Surface extent, or the window extent clamped to the surface limits
pub fn choose_extent(capabilities: &vk::SurfaceCapabilitiesKHR, window_extent: vk::Extent2D) -> vk::Extent2D {
    if capabilities.current_extent.width != u32::MAX {
        return capabilities.current_extent;
    }

    vk::Extent2D {
        width: window_extent
            .width
            .clamp(capabilities.min_image_extent.width, capabilities.max_image_extent.width),
        height: window_extent
            .height
            .clamp(capabilities.min_image_extent.height, capabilities.max_image_extent.height),
    }
}

/// One image more than the minimum, capped by the maximum (0 means no limit)
pub fn choose_image_count(capabilities: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let desired = capabilities.min_image_count + 1;
    if capabilities.max_image_count > 0 {
        desired.min(capabilities.max_image_count)
    } else {
        desired
    }
}

/// Sharing mode and the family indices it needs
pub fn sharing_mode(indices: QueueFamilyIndices) -> (vk::SharingMode, Vec<u32>) {
    match (indices.graphics, indices.present) {
        (Some(graphics), Some(present)) if graphics != present => {
            (vk::SharingMode::CONCURRENT, vec![graphics, present])
        }
        _ => (vk::SharingMode::EXCLUSIVE, Vec::new()),
    }
}

/// Swapchain wrapper with RAII cleanup
pub struct Swapchain {
    device: Device,
    swapchain_loader: SwapchainLoader,
    swapchain: vk::SwapchainKHR,
    image_views: Vec<vk::ImageView>,
    format: vk::SurfaceFormatKHR,
    extent: vk::Extent2D,
}

impl Swapchain {
    /// Create a swapchain, retiring `old_swapchain` when it is not null
    pub fn new(
        instance: &Instance,
        device: &Device,
        surface: &Surface,
        support: &SwapchainSupport,
        queue_families: QueueFamilyIndices,
        window_extent: vk::Extent2D,
        prefer_mailbox: bool,
        old_swapchain: vk::SwapchainKHR,
    ) -> VulkanResult<Self> {
        let swapchain_loader = SwapchainLoader::new(instance, device);

        let format = choose_surface_format(&support.formats)?;
        let present_mode = choose_present_mode(&support.present_modes, prefer_mailbox);
        let extent = choose_extent(&support.capabilities, window_extent);
        let image_count = choose_image_count(&support.capabilities);
        let (sharing, family_indices) = sharing_mode(queue_families);

        let create_info = vk::SwapchainCreateInfoKHR::builder()
            .surface(surface.handle())
            .min_image_count(image_count)
            .image_format(format.format)
            .image_color_space(format.color_space)
            .image_extent(extent)
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
            .image_sharing_mode(sharing)
            .queue_family_indices(&family_indices)
            .pre_transform(support.capabilities.current_transform)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(present_mode)
            .clipped(true)
            .old_swapchain(old_swapchain);

        let swapchain =
            unsafe { swapchain_loader.create_swapchain(&create_info, None) }.map_err(VulkanError::Api)?;

        let images = match unsafe { swapchain_loader.get_swapchain_images(swapchain) } {
            Ok(images) => images,
            Err(e) => {
                unsafe { swapchain_loader.destroy_swapchain(swapchain, None) };
                return Err(VulkanError::Api(e));
            }
        };

        // Build the wrapper first so a failed view creation still cleans up
        let mut result = Self {
            device: device.clone(),
            swapchain_loader,
            swapchain,
            image_views: Vec::with_capacity(images.len()),
            format,
            extent,
        };

        for image in images {
            let view = create_color_view(device, image, format.format)?;
            result.image_views.push(view);
        }

        log::info!(
            "Swapchain created: {}x{}, {} images, {:?}",
            extent.width,
            extent.height,
            result.image_views.len(),
            format.format
        );

        Ok(result)
    }

    /// Get swapchain handle
    pub fn handle(&self) -> vk::SwapchainKHR {
        self.swapchain
    }

    /// Get swapchain loader
    pub fn loader(&self) -> &SwapchainLoader {
        &self.swapchain_loader
    }

    /// Get surface format
    pub fn format(&self) -> vk::SurfaceFormatKHR {
        self.format
    }

    /// Get swapchain extent
    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    /// Color views, one per swapchain image
    pub fn image_views(&self) -> &[vk::ImageView] {
        &self.image_views
    }

    /// Number of images the driver actually created
    pub fn image_count(&self) -> usize {
        self.image_views.len()
    }

    /// Width over height of the current extent
    pub fn aspect_ratio(&self) -> f32 {
        aspect_ratio(self.extent)
    }
}

impl Drop for Swapchain {
    fn drop(&mut self) {
        unsafe {
            for &image_view in &self.image_views {
                self.device.destroy_image_view(image_view, None);
            }
            self.swapchain_loader.destroy_swapchain(self.swapchain, None);
        }
    }
}

/// Width over height, 1.0 for a degenerate extent
#[allow(clippy::cast_precision_loss)]
pub fn aspect_ratio(extent: vk::Extent2D) -> f32 {
    if extent.height == 0 {
        1.0
    } else {
        extent.width as f32 / extent.height as f32
    }
}

/// Create a 2D single-mip view over one image
pub fn create_image_view(
    device: &Device,
    image: vk::Image,
    format: vk::Format,
    aspect_mask: vk::ImageAspectFlags,
) -> VulkanResult<vk::ImageView> {
    let create_info = vk::ImageViewCreateInfo::builder()
        .image(image)
        .view_type(vk::ImageViewType::TYPE_2D)
        .format(format)
        .components(vk::ComponentMapping {
            r: vk::ComponentSwizzle::IDENTITY,
            g: vk::ComponentSwizzle::IDENTITY,
            b: vk::ComponentSwizzle::IDENTITY,
            a: vk::ComponentSwizzle::IDENTITY,
        })
        .subresource_range(vk::ImageSubresourceRange {
            aspect_mask,
            base_mip_level: 0,
            level_count: 1,
            base_array_layer: 0,
            layer_count: 1,
        });

    unsafe { device.create_image_view(&create_info, None) }.map_err(VulkanError::Api)
}

fn create_color_view(device: &Device, image: vk::Image, format: vk::Format) -> VulkanResult<vk::ImageView> {
    create_image_view(device, image, format, vk::ImageAspectFlags::COLOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn surface_format(format: vk::Format, color_space: vk::ColorSpaceKHR) -> vk::SurfaceFormatKHR {
        vk::SurfaceFormatKHR { format, color_space }
    }

    fn capabilities(current: u32, min: u32, max: u32) -> vk::SurfaceCapabilitiesKHR {
        vk::SurfaceCapabilitiesKHR {
            current_extent: vk::Extent2D {
                width: current,
                height: current,
            },
            min_image_extent: vk::Extent2D { width: 100, height: 100 },
            max_image_extent: vk::Extent2D { width: 1000, height: 800 },
            min_image_count: min,
            max_image_count: max,
            ..Default::default()
        }
    }

    #[test]
    fn preferred_format_wins_over_order() {
        let formats = [
            surface_format(vk::Format::R8G8B8A8_SRGB, vk::ColorSpaceKHR::SRGB_NONLINEAR),
            surface_format(vk::Format::B8G8R8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR),
        ];
        assert_eq!(choose_surface_format(&formats).unwrap().format, vk::Format::B8G8R8A8_UNORM);
    }

    #[test]
    fn first_format_is_the_fallback() {
        let formats = [
            surface_format(vk::Format::R8G8B8A8_SRGB, vk::ColorSpaceKHR::SRGB_NONLINEAR),
            surface_format(vk::Format::B8G8R8A8_UNORM, vk::ColorSpaceKHR::DISPLAY_P3_NONLINEAR_EXT),
        ];
        assert_eq!(choose_surface_format(&formats).unwrap(), formats[0]);
        assert!(matches!(choose_surface_format(&[]), Err(VulkanError::UnsupportedFormat)));
    }

    #[test]
    fn mailbox_only_when_preferred_and_available() {
        let modes = [vk::PresentModeKHR::FIFO, vk::PresentModeKHR::MAILBOX];
        assert_eq!(choose_present_mode(&modes, true), vk::PresentModeKHR::MAILBOX);
        assert_eq!(choose_present_mode(&modes, false), vk::PresentModeKHR::FIFO);
        assert_eq!(
            choose_present_mode(&[vk::PresentModeKHR::IMMEDIATE], true),
            vk::PresentModeKHR::FIFO
        );
    }

    #[test]
    fn current_extent_is_used_when_defined() {
        let caps = capabilities(640, 2, 3);
        let extent = choose_extent(&caps, vk::Extent2D { width: 10, height: 10 });
        assert_eq!((extent.width, extent.height), (640, 640));
    }

    #[test]
    fn window_extent_is_clamped_when_surface_defers() {
        let caps = capabilities(u32::MAX, 2, 3);
        let extent = choose_extent(&caps, vk::Extent2D { width: 5000, height: 50 });
        assert_eq!((extent.width, extent.height), (1000, 100));

        let extent = choose_extent(&caps, vk::Extent2D { width: 500, height: 400 });
        assert_eq!((extent.width, extent.height), (500, 400));
    }

    #[test]
    fn image_count_respects_maximum() {
        assert_eq!(choose_image_count(&capabilities(1, 2, 0)), 3);
        assert_eq!(choose_image_count(&capabilities(1, 2, 8)), 3);
        assert_eq!(choose_image_count(&capabilities(1, 3, 3)), 3);
    }

    #[test]
    fn distinct_families_share_concurrently() {
        let (mode, indices) = sharing_mode(QueueFamilyIndices {
            graphics: Some(0),
            present: Some(2),
        });
        assert_eq!(mode, vk::SharingMode::CONCURRENT);
        assert_eq!(indices, vec![0, 2]);

        let (mode, indices) = sharing_mode(QueueFamilyIndices {
            graphics: Some(1),
            present: Some(1),
        });
        assert_eq!(mode, vk::SharingMode::EXCLUSIVE);
        assert!(indices.is_empty());
    }

    #[test]
    fn aspect_ratio_handles_zero_height() {
        assert_relative_eq!(aspect_ratio(vk::Extent2D { width: 1280, height: 720 }), 16.0 / 9.0);
        assert_relative_eq!(aspect_ratio(vk::Extent2D { width: 10, height: 0 }), 1.0);
    }
}
