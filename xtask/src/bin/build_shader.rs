//! 将 `shader/` 目录下的所有 compute shader 编译为 spv 文件，输出到 `shader/.build/`

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use oneshot_crate_tools::{init_log::init_log, resource::OneshotPath};

#[derive(Debug)]
struct ShaderCompileTask {
    shader_path: PathBuf,
    output_path: PathBuf,
}

impl ShaderCompileTask {
    /// 只处理 `.comp` 文件，其余文件返回 None
    fn new(shader_path: &Path, output_dir: &Path) -> Option<Self> {
        let shader_name = shader_path.file_name()?.to_str()?;
        if !shader_name.ends_with(".comp") {
            return None;
        }

        Some(Self {
            shader_path: shader_path.to_path_buf(),
            output_path: output_dir.join(format!("{shader_name}.spv")),
        })
    }

    fn compile(&self) -> anyhow::Result<()> {
        let output = std::process::Command::new("glslc")
            .args(["-g", "--target-env=vulkan1.0", "-o"])
            .arg(&self.output_path)
            .arg(&self.shader_path)
            .output()
            .context("failed to run glslc, is the Vulkan SDK on PATH?")?;

        if !output.status.success() {
            log::error!("stdout: {}", String::from_utf8_lossy(&output.stdout));
            log::error!("stderr: {}", String::from_utf8_lossy(&output.stderr));
            bail!("failed to compile shader: {:?}", self.shader_path);
        }
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    init_log(log::LevelFilter::Info);

    let shader_dir = OneshotPath::shader_root_path();
    let output_dir = OneshotPath::shader_build_root_path();
    log::info!("shader source path: {:?}", shader_dir);
    log::info!("shader output path: {:?}", output_dir);

    std::fs::create_dir_all(&output_dir).with_context(|| format!("failed to create {output_dir:?}"))?;

    for entry in std::fs::read_dir(&shader_dir).with_context(|| format!("failed to read {shader_dir:?}"))? {
        let entry = entry?;
        if let Some(task) = ShaderCompileTask::new(&entry.path(), &output_dir) {
            log::info!("compile shader: {:?} -> {:?}", task.shader_path, task.output_path);
            task.compile()?;
        }
    }

    log::info!("shader compilation completed.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_compute_shaders_are_compiled() {
        let out = Path::new("shader/.build");
        let task = ShaderCompileTask::new(Path::new("shader/fill_solid.comp"), out).unwrap();
        assert_eq!(task.output_path, Path::new("shader/.build/fill_solid.comp.spv"));

        assert!(ShaderCompileTask::new(Path::new("shader/readme.md"), out).is_none());
        assert!(ShaderCompileTask::new(Path::new("shader/tri.vert"), out).is_none());
    }
}
