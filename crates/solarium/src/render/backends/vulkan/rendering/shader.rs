//! Shader module loading and vertex/fragment pair discovery

use ash::{vk, Device};
use std::collections::HashSet;
use std::ffi::CStr;
use std::io;
use std::path::{Path, PathBuf};

use crate::render::backends::vulkan::{VulkanError, VulkanResult};

/// Entry point shared by every stage
pub const ENTRY_POINT: &CStr = c"main";

/// Source form of a shader file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderFormat {
    /// `name.vert` / `name.frag`
    Glsl,
    /// `name.vert.spv` / `name.frag.spv`
    SpirV,
}

/// Pipeline stage a shader file belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    /// Vertex shader
    Vertex,
    /// Fragment shader
    Fragment,
}

impl ShaderStage {
    fn extension(self) -> &'static str {
        match self {
            Self::Vertex => "vert",
            Self::Fragment => "frag",
        }
    }

    fn other(self) -> Self {
        match self {
            Self::Vertex => Self::Fragment,
            Self::Fragment => Self::Vertex,
        }
    }
}

/// Split a shader file name into stem, stage and format
fn classify(path: &Path) -> Option<(String, ShaderStage, ShaderFormat)> {
    let name = path.file_name()?.to_str()?;
    let (rest, format) = match name.strip_suffix(".spv") {
        Some(rest) => (rest, ShaderFormat::SpirV),
        None => (name, ShaderFormat::Glsl),
    };

    let (stem, stage) = if let Some(stem) = rest.strip_suffix(".vert") {
        (stem, ShaderStage::Vertex)
    } else if let Some(stem) = rest.strip_suffix(".frag") {
        (stem, ShaderStage::Fragment)
    } else {
        return None;
    };

    (!stem.is_empty()).then(|| (stem.to_string(), stage, format))
}

/// Path of the other stage next to `path` (`a.vert` ↔ `a.frag`, `.spv` kept)
pub fn sibling_shader_path(path: &Path) -> Option<PathBuf> {
    let (stem, stage, format) = classify(path)?;
    let suffix = match format {
        ShaderFormat::Glsl => "",
        ShaderFormat::SpirV => ".spv",
    };
    Some(path.with_file_name(format!("{stem}.{}{suffix}", stage.other().extension())))
}

/// A vertex shader and the fragment shader beside it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSet {
    /// Shared stem of both files
    pub name: String,
    /// Vertex stage file
    pub vertex: PathBuf,
    /// Fragment stage file
    pub fragment: PathBuf,
}

impl ShaderSet {
    /// Find the compiled set called `name` under `directory`
    pub fn find_compiled(directory: &Path, name: &str) -> VulkanResult<Self> {
        discover_shader_sets(directory, ShaderFormat::SpirV)?
            .into_iter()
            .find(|set| set.name == name)
            .ok_or_else(|| {
                VulkanError::Shader(format!(
                    "No compiled shader set '{name}' under '{}'",
                    directory.display()
                ))
            })
    }
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, files)?;
        } else {
            files.push(path);
        }
    }
    Ok(())
}

/// Recursively pair vertex and fragment shaders of `format` under `dir`
///
/// Files without a sibling are skipped and each stem yields at most one
/// set. Results are sorted by stem.
pub fn discover_shader_sets(dir: &Path, format: ShaderFormat) -> io::Result<Vec<ShaderSet>> {
    let mut files = Vec::new();
    collect_files(dir, &mut files)?;
    files.sort();

    let mut seen = HashSet::new();
    let mut sets = Vec::new();

    for path in files {
        let Some((stem, stage, file_format)) = classify(&path) else {
            continue;
        };
        if file_format != format || seen.contains(&stem) {
            continue;
        }
        let Some(sibling) = sibling_shader_path(&path).filter(|p| p.is_file()) else {
            log::debug!("Shader '{}' has no sibling stage, skipping", path.display());
            continue;
        };

        let (vertex, fragment) = match stage {
            ShaderStage::Vertex => (path, sibling),
            ShaderStage::Fragment => (sibling, path),
        };
        seen.insert(stem.clone());
        sets.push(ShaderSet {
            name: stem,
            vertex,
            fragment,
        });
    }

    sets.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(sets)
}

/// Validate SPIR-V bytes and convert them to words
pub fn spirv_words(bytes: &[u8]) -> VulkanResult<Vec<u32>> {
    if bytes.is_empty() {
        return Err(VulkanError::Shader("SPIR-V bytecode is empty".to_string()));
    }
    if bytes.len() % 4 != 0 {
        return Err(VulkanError::Shader(format!(
            "SPIR-V length {} is not a multiple of 4",
            bytes.len()
        )));
    }
    ash::util::read_spv(&mut io::Cursor::new(bytes)).map_err(|e| VulkanError::Shader(e.to_string()))
}

/// Shader module wrapper with RAII cleanup
pub struct ShaderModule {
    device: Device,
    module: vk::ShaderModule,
}

impl ShaderModule {
    /// Create shader module from SPIR-V bytecode
    pub fn from_bytes(device: &Device, bytes: &[u8]) -> VulkanResult<Self> {
        let words = spirv_words(bytes)?;
        let create_info = vk::ShaderModuleCreateInfo::builder().code(&words);
        let module = unsafe { device.create_shader_module(&create_info, None) }.map_err(VulkanError::Api)?;

        Ok(Self {
            device: device.clone(),
            module,
        })
    }

    /// Load shader from SPIR-V file
    pub fn from_file<P: AsRef<Path>>(device: &Device, path: P) -> VulkanResult<Self> {
        let path = path.as_ref();
        log::debug!("Loading shader {}", path.display());
        let bytes = std::fs::read(path)?;
        Self::from_bytes(device, &bytes)
    }

    /// Get shader module handle
    pub fn handle(&self) -> vk::ShaderModule {
        self.module
    }

    /// Stage info using the `main` entry point
    pub fn stage_info(&self, stage: vk::ShaderStageFlags) -> vk::PipelineShaderStageCreateInfo {
        vk::PipelineShaderStageCreateInfo::builder()
            .stage(stage)
            .module(self.module)
            .name(ENTRY_POINT)
            .build()
    }
}

impl Drop for ShaderModule {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_shader_module(self.module, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("solarium-shader-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn sibling_swaps_stage_and_keeps_spv() {
        assert_eq!(
            sibling_shader_path(Path::new("a/shader.vert")),
            Some(PathBuf::from("a/shader.frag"))
        );
        assert_eq!(
            sibling_shader_path(Path::new("a/shader.frag.spv")),
            Some(PathBuf::from("a/shader.vert.spv"))
        );
        assert_eq!(sibling_shader_path(Path::new("a/common.glsl")), None);
        assert_eq!(sibling_shader_path(Path::new("a/.vert")), None);
    }

    #[test]
    fn pairs_are_found_recursively_and_sorted() {
        let dir = scratch_dir("pairs");
        touch(&dir.join("zeta.vert"));
        touch(&dir.join("zeta.frag"));
        touch(&dir.join("nested/alpha.frag"));
        touch(&dir.join("nested/alpha.vert"));
        touch(&dir.join("lonely.vert"));
        touch(&dir.join("common.glsl"));

        let sets = discover_shader_sets(&dir, ShaderFormat::Glsl).unwrap();
        let names: Vec<&str> = sets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert_eq!(sets[0].vertex, dir.join("nested/alpha.vert"));
        assert_eq!(sets[0].fragment, dir.join("nested/alpha.frag"));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn formats_are_kept_apart_and_stems_used_once() {
        let dir = scratch_dir("formats");
        touch(&dir.join("shader.vert"));
        touch(&dir.join("shader.frag"));
        touch(&dir.join("shader.vert.spv"));
        touch(&dir.join("shader.frag.spv"));
        touch(&dir.join("other/shader.vert.spv"));
        touch(&dir.join("other/shader.frag.spv"));

        let compiled = discover_shader_sets(&dir, ShaderFormat::SpirV).unwrap();
        assert_eq!(compiled.len(), 1);
        assert!(compiled[0].vertex.to_string_lossy().ends_with(".vert.spv"));

        let found = ShaderSet::find_compiled(&dir, "shader").unwrap();
        assert_eq!(found, compiled[0]);
        assert!(matches!(ShaderSet::find_compiled(&dir, "missing"), Err(VulkanError::Shader(_))));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let dir = std::env::temp_dir().join("solarium-shader-does-not-exist");
        assert!(discover_shader_sets(&dir, ShaderFormat::Glsl).is_err());
    }

    #[test]
    fn spirv_must_be_non_empty_and_word_sized() {
        assert!(matches!(spirv_words(&[]), Err(VulkanError::Shader(_))));
        assert!(matches!(spirv_words(&[0x03, 0x02, 0x23]), Err(VulkanError::Shader(_))));

        let words = spirv_words(&[0x03, 0x02, 0x23, 0x07, 1, 0, 0, 0]).unwrap();
        assert_eq!(words, vec![0x0723_0203, 1]);
    }
}
