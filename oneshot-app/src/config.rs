use std::{ffi::CStr, path::PathBuf};

use ash::vk;
use oneshot_crate_tools::resource::OneshotPath;
use oneshot_gfx::{
    commands::dispatch::dispatch_group_count,
    foundation::init_info::{GfxDebugSeverity, GfxInitInfo},
};

/// 关闭 validation layer 以及 debug utils extension
pub const ENV_NO_VALIDATION: &str = "ONESHOT_NO_VALIDATION";
/// driver 消息转发的最低等级：verbose / info / warning / error
pub const ENV_VK_LOG: &str = "ONESHOT_VK_LOG";

/// 默认 shader 的名字，编译产物位于 `shader/.build/fill_solid.comp.spv`
pub const DEFAULT_SHADER_NAME: &str = "fill_solid.comp";

/// 一次 dispatch 所需的全部配置，创建之后不再修改
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub init_info: GfxInitInfo,

    pub image_extent: vk::Extent2D,
    pub image_format: vk::Format,

    pub shader_path: PathBuf,
    pub entry_point: &'static CStr,
    /// 需要和 shader 中的 local_size 保持一致
    pub workgroup_size: [u32; 2],
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            init_info: GfxInitInfo::default(),
            image_extent: vk::Extent2D {
                width: 4096,
                height: 4096,
            },
            image_format: vk::Format::R8G8B8A8_UNORM,
            shader_path: OneshotPath::shader_build_path(DEFAULT_SHADER_NAME),
            entry_point: c"main",
            workgroup_size: [8, 8],
        }
    }
}

impl DispatchConfig {
    /// 从进程的命令行参数和环境变量构造配置
    pub fn from_env_and_args() -> Self {
        Self::from_sources(std::env::args().skip(1), |key| std::env::var(key).ok())
    }

    /// 初始化日志时使用的等级，需要在 [`Self::from_env_and_args`] 之前确定
    ///
    /// `ONESHOT_VK_LOG=verbose` 时 driver 的 VERBOSE 消息以 trace 输出，默认的 info 等级会把它们全部过滤掉
    pub fn host_log_level(env: impl Fn(&str) -> Option<String>) -> log::LevelFilter {
        env(ENV_VK_LOG)
            .and_then(|value| GfxDebugSeverity::parse(&value))
            .unwrap_or(GfxInitInfo::default().debug_msg_severity)
            .host_log_level()
    }

    /// # param
    /// * args - 不包含程序名的命令行参数，第一个参数是 shader 路径
    /// * env - 环境变量的查询函数
    pub fn from_sources(args: impl IntoIterator<Item = String>, env: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(shader_path) = args.into_iter().next() {
            config.shader_path = PathBuf::from(shader_path);
        }

        if env(ENV_NO_VALIDATION).is_some_and(|value| is_truthy(&value)) {
            log::info!("{ENV_NO_VALIDATION} is set, validation layer disabled");
            config.init_info = config.init_info.without_validation();
        }

        if let Some(value) = env(ENV_VK_LOG) {
            match GfxDebugSeverity::parse(&value) {
                Some(severity) => config.init_info = config.init_info.with_debug_severity(severity),
                None => log::warn!(
                    "ignoring {ENV_VK_LOG}={value:?}, expected verbose/info/warning/error; keeping {:?}",
                    config.init_info.debug_msg_severity
                ),
            }
        }

        config
    }

    #[inline]
    pub fn group_count(&self) -> glam::UVec3 {
        dispatch_group_count(self.image_extent, self.workgroup_size)
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = DispatchConfig::from_sources(Vec::<String>::new(), env_of(&[]));

        assert_eq!(config.image_extent.width, 4096);
        assert_eq!(config.image_extent.height, 4096);
        assert_eq!(config.image_format, vk::Format::R8G8B8A8_UNORM);
        assert_eq!(config.entry_point, c"main");
        assert!(config.shader_path.ends_with("shader/.build/fill_solid.comp.spv"));
        assert!(config.init_info.debug_utils_enabled());
        assert_eq!(config.init_info.debug_msg_severity, GfxDebugSeverity::Warning);
        assert_eq!(config.group_count(), glam::uvec3(512, 512, 1));
    }

    #[test]
    fn test_first_arg_overrides_shader_path() {
        let args = vec!["custom.spv".to_string(), "ignored".to_string()];
        let config = DispatchConfig::from_sources(args, env_of(&[]));
        assert_eq!(config.shader_path, PathBuf::from("custom.spv"));
    }

    #[test]
    fn test_no_validation_env() {
        let config = DispatchConfig::from_sources(Vec::<String>::new(), env_of(&[(ENV_NO_VALIDATION, "1")]));
        assert!(config.init_info.instance_layers.is_empty());
        assert!(!config.init_info.debug_utils_enabled());

        let config = DispatchConfig::from_sources(Vec::<String>::new(), env_of(&[(ENV_NO_VALIDATION, "0")]));
        assert!(config.init_info.debug_utils_enabled());
    }

    #[test]
    fn test_verbose_vk_log_enables_trace() {
        let env = env_of(&[(ENV_VK_LOG, "verbose")]);
        let level = DispatchConfig::host_log_level(&env);
        assert_eq!(level, log::LevelFilter::Trace);
        assert!(log::Level::Trace <= level);

        // 转发 VERBOSE 消息的配置和日志等级一致
        let config = DispatchConfig::from_sources(Vec::<String>::new(), &env);
        assert_eq!(config.init_info.debug_msg_severity.host_log_level(), level);
    }

    #[test]
    fn test_host_log_level_defaults_to_info() {
        assert_eq!(DispatchConfig::host_log_level(env_of(&[])), log::LevelFilter::Info);
        assert_eq!(DispatchConfig::host_log_level(env_of(&[(ENV_VK_LOG, "loud")])), log::LevelFilter::Info);
        assert_eq!(DispatchConfig::host_log_level(env_of(&[(ENV_VK_LOG, "error")])), log::LevelFilter::Info);
    }

    #[test]
    fn test_vk_log_env() {
        let config = DispatchConfig::from_sources(Vec::<String>::new(), env_of(&[(ENV_VK_LOG, "Verbose")]));
        assert_eq!(config.init_info.debug_msg_severity, GfxDebugSeverity::Verbose);

        let config = DispatchConfig::from_sources(Vec::<String>::new(), env_of(&[(ENV_VK_LOG, "loud")]));
        assert_eq!(config.init_info.debug_msg_severity, GfxDebugSeverity::Warning);
    }
}
