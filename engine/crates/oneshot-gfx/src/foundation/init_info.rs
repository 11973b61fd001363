use std::ffi::CStr;

use ash::vk;

/// driver 消息转发到日志时的最低等级
///
/// 从低到高：`Verbose < Info < Warning < Error`，不低于该等级的消息都会被转发
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum GfxDebugSeverity {
    Verbose,
    Info,
    Warning,
    Error,
}

impl GfxDebugSeverity {
    /// 对应的 debug messenger severity mask
    pub fn message_severity(self) -> vk::DebugUtilsMessageSeverityFlagsEXT {
        type S = vk::DebugUtilsMessageSeverityFlagsEXT;
        match self {
            Self::Verbose => S::VERBOSE | S::INFO | S::WARNING | S::ERROR,
            Self::Info => S::INFO | S::WARNING | S::ERROR,
            Self::Warning => S::WARNING | S::ERROR,
            Self::Error => S::ERROR,
        }
    }

    /// 转发的 driver 消息在 host 日志中可见所需的最低等级
    ///
    /// VERBOSE 消息以 trace 输出，其余等级都不低于 info
    pub fn host_log_level(self) -> log::LevelFilter {
        match self {
            Self::Verbose => log::LevelFilter::Trace,
            Self::Info | Self::Warning | Self::Error => log::LevelFilter::Info,
        }
    }

    /// 解析 `verbose` / `info` / `warning` / `error`，大小写不敏感
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "verbose" | "trace" => Some(Self::Verbose),
            "info" => Some(Self::Info),
            "warning" | "warn" => Some(Self::Warning),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

/// 创建 instance 以及 device 所需的参数
///
/// 这些都是不可变的配置，由调用方显式传入，而不是放在全局变量中。
/// 例如在 CI 中可以使用 [`GfxInitInfo::without_validation`] 关闭 validation layer
#[derive(Debug, Clone)]
pub struct GfxInitInfo {
    pub app_name: &'static CStr,
    pub engine_name: &'static CStr,
    pub vk_version: u32,

    /// instance 和 device 都会开启这些 layers
    pub instance_layers: Vec<&'static CStr>,
    pub instance_extensions: Vec<&'static CStr>,

    pub debug_msg_severity: GfxDebugSeverity,
    pub debug_msg_type: vk::DebugUtilsMessageTypeFlagsEXT,
}

impl Default for GfxInitInfo {
    fn default() -> Self {
        Self {
            app_name: c"oneshot",
            engine_name: c"oneshot-gfx",
            vk_version: vk::API_VERSION_1_0,

            instance_layers: vec![Self::VALIDATION_LAYER_NAME],
            // 可以单独使用，提供 debug messenger；和 validation layer 配合可以得到更详细的信息
            instance_extensions: vec![ash::ext::debug_utils::NAME],

            debug_msg_severity: GfxDebugSeverity::Warning,
            debug_msg_type: vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        }
    }
}

impl GfxInitInfo {
    pub const VALIDATION_LAYER_NAME: &'static CStr = c"VK_LAYER_KHRONOS_validation";

    /// 不开启 validation layer 以及 debug utils extension
    pub fn without_validation(mut self) -> Self {
        self.instance_layers.retain(|layer| *layer != Self::VALIDATION_LAYER_NAME);
        self.instance_extensions.retain(|ext| *ext != ash::ext::debug_utils::NAME);
        self
    }

    #[inline]
    pub fn with_debug_severity(mut self, severity: GfxDebugSeverity) -> Self {
        self.debug_msg_severity = severity;
        self
    }

    /// 是否需要创建 debug messenger
    #[inline]
    pub fn debug_utils_enabled(&self) -> bool {
        self.instance_extensions.contains(&ash::ext::debug_utils::NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layers_and_extensions() {
        let info = GfxInitInfo::default();
        assert_eq!(info.instance_layers, [c"VK_LAYER_KHRONOS_validation"]);
        assert_eq!(info.instance_extensions, [c"VK_EXT_debug_utils"]);
        assert!(info.debug_utils_enabled());
        assert_eq!(
            info.debug_msg_severity.message_severity(),
            vk::DebugUtilsMessageSeverityFlagsEXT::WARNING | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR
        );
    }

    #[test]
    fn test_without_validation() {
        let info = GfxInitInfo::default().without_validation();
        assert!(info.instance_layers.is_empty());
        assert!(info.instance_extensions.is_empty());
        assert!(!info.debug_utils_enabled());
    }

    #[test]
    fn test_severity_is_cumulative() {
        let verbose = GfxDebugSeverity::Verbose.message_severity();
        let error = GfxDebugSeverity::Error.message_severity();
        assert!(verbose.contains(error));
        assert!(GfxDebugSeverity::Verbose < GfxDebugSeverity::Error);
    }

    #[test]
    fn test_verbose_needs_trace_log_level() {
        assert_eq!(GfxDebugSeverity::Verbose.host_log_level(), log::LevelFilter::Trace);
        assert_eq!(GfxDebugSeverity::Info.host_log_level(), log::LevelFilter::Info);
        assert_eq!(GfxDebugSeverity::Error.host_log_level(), log::LevelFilter::Info);
    }

    #[test]
    fn test_severity_parse() {
        assert_eq!(GfxDebugSeverity::parse("VERBOSE"), Some(GfxDebugSeverity::Verbose));
        assert_eq!(GfxDebugSeverity::parse(" warn "), Some(GfxDebugSeverity::Warning));
        assert_eq!(GfxDebugSeverity::parse("loud"), None);
    }
}
