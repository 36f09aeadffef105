//! Shader freshness checks shared by `build.rs`
//!
//! A stage file (`.vert`, `.frag`) may include any other file in the shader
//! directory, so its effective source time is the newest of itself and every
//! non-stage file next to it.

use std::fs;
use std::path::Path;
use std::time::SystemTime;

/// Extensions compiled to SPIR-V
pub const SHADER_EXTENSIONS: [&str; 2] = ["vert", "frag"];

/// Whether `path` is a shader stage rather than an include
pub fn is_stage(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SHADER_EXTENSIONS.contains(&ext))
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

/// Newest modification time among `source` and the includes in `shader_dir`
pub fn source_time(source: &Path, shader_dir: &Path) -> Option<SystemTime> {
    let mut newest = modified(source)?;
    if let Ok(entries) = fs::read_dir(shader_dir) {
        for path in entries.flatten().map(|entry| entry.path()) {
            if path.is_file() && !is_stage(&path) {
                if let Some(time) = modified(&path) {
                    newest = newest.max(time);
                }
            }
        }
    }
    Some(newest)
}

/// Whether `output` is missing or older than `source` or any include
pub fn needs_compile(source: &Path, shader_dir: &Path, output: &Path) -> bool {
    match (source_time(source, shader_dir), modified(output)) {
        (Some(src), Some(dst)) => src > dst,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::path::PathBuf;
    use std::time::Duration;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("solarium_build_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_at(path: &Path, seconds: u64) {
        fs::write(path, b"// glsl").unwrap();
        let time = SystemTime::UNIX_EPOCH + Duration::from_secs(seconds);
        File::options().write(true).open(path).unwrap().set_modified(time).unwrap();
    }

    #[test]
    fn stages_are_told_apart_from_includes() {
        assert!(is_stage(Path::new("shader.vert")));
        assert!(is_stage(Path::new("shader.frag")));
        assert!(!is_stage(Path::new("common.glsl")));
        assert!(!is_stage(Path::new("shader.frag.spv")));
    }

    #[test]
    fn missing_output_is_compiled() {
        let dir = scratch_dir("missing");
        let source = dir.join("shader.vert");
        write_at(&source, 1_000);

        assert!(needs_compile(&source, &dir, &dir.join("shader.vert.spv")));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn newer_output_is_up_to_date() {
        let dir = scratch_dir("fresh");
        let source = dir.join("shader.frag");
        let output = dir.join("out").join("shader.frag.spv");
        fs::create_dir_all(dir.join("out")).unwrap();
        write_at(&dir.join("common.glsl"), 1_000);
        write_at(&source, 1_000);
        write_at(&output, 2_000);

        assert!(!needs_compile(&source, &dir, &output));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn editing_an_include_rebuilds_the_stage() {
        let dir = scratch_dir("include");
        let source = dir.join("shader.frag");
        let output = dir.join("out").join("shader.frag.spv");
        fs::create_dir_all(dir.join("out")).unwrap();
        write_at(&source, 1_000);
        write_at(&output, 2_000);
        write_at(&dir.join("common.glsl"), 3_000);

        assert!(needs_compile(&source, &dir, &output));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn other_stages_do_not_count_as_includes() {
        let dir = scratch_dir("sibling");
        let source = dir.join("shader.vert");
        let output = dir.join("out").join("shader.vert.spv");
        fs::create_dir_all(dir.join("out")).unwrap();
        write_at(&source, 1_000);
        write_at(&output, 2_000);
        write_at(&dir.join("shader.frag"), 3_000);

        assert!(!needs_compile(&source, &dir, &output));
        fs::remove_dir_all(&dir).unwrap();
    }
}
