use std::path::{Path, PathBuf};

/// 统一资源路径管理
///
/// 所有路径基于工作区根目录（通过 `CARGO_MANIFEST_DIR` 推导），
/// 因此无论从哪个目录启动程序都能找到编译好的 shader。
///
/// # 使用示例
/// ```ignore
/// let shader = OneshotPath::shader_build_path("fill_solid.comp"); // shader/.build/fill_solid.comp.spv
/// ```
pub struct OneshotPath {}

impl OneshotPath {
    /// 获取工作区根目录
    pub fn workspace_path() -> PathBuf {
        // engine/crates/oneshot-crate-tools -> engine/crates -> engine -> workspace root
        let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
        manifest_dir.ancestors().nth(3).unwrap_or(manifest_dir).to_path_buf()
    }

    /// GLSL 源文件所在目录
    pub fn shader_root_path() -> PathBuf {
        Self::workspace_path().join("shader")
    }

    /// 编译产物所在目录
    pub fn shader_build_root_path() -> PathBuf {
        Self::shader_root_path().join(".build")
    }

    /// 获取 `shader/.build/` 目录下的着色器路径（编译后的 SPIR-V）
    pub fn shader_build_path(filename: &str) -> PathBuf {
        Self::shader_build_root_path().join(format!("{filename}.spv"))
    }
}
