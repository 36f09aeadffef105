//! Graphics pipeline creation
//!
//! [`PipelineConfig`] is plain data describing the fixed-function state;
//! [`GraphicsPipeline`] turns it into a pipeline and its layout.

use ash::{vk, Device};

use super::shader::ShaderModule;
use super::vertex_layout::VulkanVertexLayout;
use crate::render::backends::vulkan::{VulkanError, VulkanResult};

/// Fixed-function state for the scene pipeline
#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    /// Primitive topology
    pub topology: vk::PrimitiveTopology,
    /// Primitive restart for strip topologies
    pub primitive_restart: bool,
    /// Viewport baked into the pipeline
    pub viewport: vk::Viewport,
    /// Scissor baked into the pipeline
    pub scissor: vk::Rect2D,
    /// Fill, line or point rasterization
    pub polygon_mode: vk::PolygonMode,
    /// Rasterized line width
    pub line_width: f32,
    /// Faces discarded by culling
    pub cull_mode: vk::CullModeFlags,
    /// Winding of front faces
    pub front_face: vk::FrontFace,
    /// Depth bias
    pub depth_bias: bool,
    /// Samples per pixel
    pub samples: vk::SampleCountFlags,
    /// Per-sample shading
    pub sample_shading: bool,
    /// Channels written to the color attachment
    pub color_write_mask: vk::ColorComponentFlags,
    /// Alpha blending
    pub blend: bool,
    /// Depth testing
    pub depth_test: bool,
    /// Depth writes
    pub depth_write: bool,
    /// Depth comparison
    pub depth_compare_op: vk::CompareOp,
    /// Depth bounds testing
    pub depth_bounds_test: bool,
    /// Stencil testing
    pub stencil_test: bool,
    /// Subpass the pipeline is used in
    pub subpass: u32,
}

impl PipelineConfig {
    /// Opaque, depth-tested, back-face-culled triangles covering `extent`
    #[allow(clippy::cast_precision_loss)]
    pub fn default_for(extent: vk::Extent2D) -> Self {
        Self {
            topology: vk::PrimitiveTopology::TRIANGLE_LIST,
            primitive_restart: false,
            viewport: vk::Viewport {
                x: 0.0,
                y: 0.0,
                width: extent.width as f32,
                height: extent.height as f32,
                min_depth: 0.0,
                max_depth: 1.0,
            },
            scissor: vk::Rect2D {
                offset: vk::Offset2D { x: 0, y: 0 },
                extent,
            },
            polygon_mode: vk::PolygonMode::FILL,
            line_width: 1.0,
            cull_mode: vk::CullModeFlags::BACK,
            front_face: vk::FrontFace::COUNTER_CLOCKWISE,
            depth_bias: false,
            samples: vk::SampleCountFlags::TYPE_1,
            sample_shading: false,
            color_write_mask: vk::ColorComponentFlags::RGBA,
            blend: false,
            depth_test: true,
            depth_write: true,
            depth_compare_op: vk::CompareOp::LESS,
            depth_bounds_test: false,
            stencil_test: false,
            subpass: 0,
        }
    }
}

/// Vertex and fragment modules for one pipeline
pub struct PipelineShaders<'a> {
    /// Vertex stage
    pub vertex: &'a ShaderModule,
    /// Fragment stage
    pub fragment: &'a ShaderModule,
}

/// Graphics pipeline wrapper with RAII cleanup
pub struct GraphicsPipeline {
    device: Device,
    pipeline: vk::Pipeline,
    layout: vk::PipelineLayout,
}

impl GraphicsPipeline {
    /// Create the layout and pipeline for `render_pass`
    pub fn new(
        device: &Device,
        render_pass: vk::RenderPass,
        descriptor_layout: vk::DescriptorSetLayout,
        shaders: &PipelineShaders<'_>,
        config: &PipelineConfig,
    ) -> VulkanResult<Self> {
        let set_layouts = [descriptor_layout];
        let layout_info = vk::PipelineLayoutCreateInfo::builder().set_layouts(&set_layouts);
        let layout = unsafe { device.create_pipeline_layout(&layout_info, None) }.map_err(VulkanError::Api)?;

        // Owns the layout from here so an error below still destroys it
        let mut result = Self {
            device: device.clone(),
            pipeline: vk::Pipeline::null(),
            layout,
        };

        let stages = [
            shaders.vertex.stage_info(vk::ShaderStageFlags::VERTEX),
            shaders.fragment.stage_info(vk::ShaderStageFlags::FRAGMENT),
        ];

        let bindings = [VulkanVertexLayout::binding_description()];
        let attributes = VulkanVertexLayout::attribute_descriptions();
        let vertex_input = vk::PipelineVertexInputStateCreateInfo::builder()
            .vertex_binding_descriptions(&bindings)
            .vertex_attribute_descriptions(&attributes);

        let input_assembly = vk::PipelineInputAssemblyStateCreateInfo::builder()
            .topology(config.topology)
            .primitive_restart_enable(config.primitive_restart);

        let viewports = [config.viewport];
        let scissors = [config.scissor];
        let viewport_state = vk::PipelineViewportStateCreateInfo::builder()
            .viewports(&viewports)
            .scissors(&scissors);

        let rasterizer = vk::PipelineRasterizationStateCreateInfo::builder()
            .depth_clamp_enable(false)
            .rasterizer_discard_enable(false)
            .polygon_mode(config.polygon_mode)
            .line_width(config.line_width)
            .cull_mode(config.cull_mode)
            .front_face(config.front_face)
            .depth_bias_enable(config.depth_bias);

        let multisampling = vk::PipelineMultisampleStateCreateInfo::builder()
            .sample_shading_enable(config.sample_shading)
            .rasterization_samples(config.samples);

        let depth_stencil = vk::PipelineDepthStencilStateCreateInfo::builder()
            .depth_test_enable(config.depth_test)
            .depth_write_enable(config.depth_write)
            .depth_compare_op(config.depth_compare_op)
            .depth_bounds_test_enable(config.depth_bounds_test)
            .stencil_test_enable(config.stencil_test);

        let color_blend_attachments = [vk::PipelineColorBlendAttachmentState::builder()
            .color_write_mask(config.color_write_mask)
            .blend_enable(config.blend)
            .build()];
        let color_blending = vk::PipelineColorBlendStateCreateInfo::builder()
            .logic_op_enable(false)
            .attachments(&color_blend_attachments);

        let pipeline_info = vk::GraphicsPipelineCreateInfo::builder()
            .stages(&stages)
            .vertex_input_state(&vertex_input)
            .input_assembly_state(&input_assembly)
            .viewport_state(&viewport_state)
            .rasterization_state(&rasterizer)
            .multisample_state(&multisampling)
            .depth_stencil_state(&depth_stencil)
            .color_blend_state(&color_blending)
            .layout(layout)
            .render_pass(render_pass)
            .subpass(config.subpass);

        let pipelines = unsafe {
            device.create_graphics_pipelines(vk::PipelineCache::null(), &[pipeline_info.build()], None)
        }
        .map_err(|(_, err)| VulkanError::Api(err))?;

        result.pipeline = pipelines.into_iter().next().ok_or_else(|| VulkanError::InvalidOperation {
            reason: "Driver returned no pipeline".to_string(),
        })?;

        log::debug!("Graphics pipeline created");
        Ok(result)
    }

    /// Get pipeline handle
    pub fn handle(&self) -> vk::Pipeline {
        self.pipeline
    }

    /// Get layout handle
    pub fn layout(&self) -> vk::PipelineLayout {
        self.layout
    }
}

impl Drop for GraphicsPipeline {
    fn drop(&mut self) {
        unsafe {
            if self.pipeline != vk::Pipeline::null() {
                self.device.destroy_pipeline(self.pipeline, None);
            }
            self.device.destroy_pipeline_layout(self.layout, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_config_covers_the_extent() {
        let extent = vk::Extent2D { width: 1280, height: 720 };
        let config = PipelineConfig::default_for(extent);

        assert_relative_eq!(config.viewport.width, 1280.0);
        assert_relative_eq!(config.viewport.height, 720.0);
        assert_relative_eq!(config.viewport.max_depth, 1.0);
        assert_eq!(config.scissor.extent, extent);
        assert_eq!(config.scissor.offset, vk::Offset2D { x: 0, y: 0 });
    }

    #[test]
    fn default_config_is_opaque_and_depth_tested() {
        let config = PipelineConfig::default_for(vk::Extent2D { width: 1, height: 1 });

        assert_eq!(config.topology, vk::PrimitiveTopology::TRIANGLE_LIST);
        assert_eq!(config.cull_mode, vk::CullModeFlags::BACK);
        assert_eq!(config.front_face, vk::FrontFace::COUNTER_CLOCKWISE);
        assert_eq!(config.color_write_mask, vk::ColorComponentFlags::RGBA);
        assert!(!config.blend);
        assert!(config.depth_test && config.depth_write);
        assert_eq!(config.depth_compare_op, vk::CompareOp::LESS);
        assert!(!config.stencil_test);
        assert_eq!(config.samples, vk::SampleCountFlags::TYPE_1);
        assert_relative_eq!(config.line_width, 1.0);
    }
}
