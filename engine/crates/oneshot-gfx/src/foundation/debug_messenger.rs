use std::ffi::CStr;

use ash::vk;

use crate::{
    error::{GfxResult, vk_err},
    foundation::{init_info::GfxInitInfo, instance::GfxInstance},
    release::GfxDestroy,
};

/// 持久存在的 debug messenger
///
/// instance 创建时也会通过 p_next 链挂上同样的 create info，用于捕获 instance 创建阶段的消息
pub struct GfxDebugMsger {
    vk_debug_utils_instance: ash::ext::debug_utils::Instance,
    vk_debug_utils_messenger: vk::DebugUtilsMessengerEXT,
}

// 创建与销毁
impl GfxDebugMsger {
    pub fn new(instance: &GfxInstance, init_info: &GfxInitInfo) -> GfxResult<Self> {
        let loader = ash::ext::debug_utils::Instance::new(instance.entry(), instance.ash_instance());

        let create_info = Self::debug_utils_messenger_ci(init_info);
        let debug_messenger = unsafe { loader.create_debug_utils_messenger(&create_info, None) }
            .map_err(vk_err("create debug utils messenger"))?;

        Ok(Self {
            vk_debug_utils_instance: loader,
            vk_debug_utils_messenger: debug_messenger,
        })
    }

    /// 用于创建 debug messenger 的结构体
    pub fn debug_utils_messenger_ci(init_info: &GfxInitInfo) -> vk::DebugUtilsMessengerCreateInfoEXT<'static> {
        vk::DebugUtilsMessengerCreateInfoEXT::default()
            .message_severity(init_info.debug_msg_severity.message_severity())
            .message_type(init_info.debug_msg_type)
            .pfn_user_callback(Some(vk_debug_callback))
    }
}

impl GfxDestroy for GfxDebugMsger {
    fn debug_name(&self) -> String {
        "GfxDebugMsger".to_string()
    }

    fn destroy(self: Box<Self>) {
        unsafe {
            self.vk_debug_utils_instance.destroy_debug_utils_messenger(self.vk_debug_utils_messenger, None);
        }
    }
}

/// driver 消息的日志等级
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DebugMsgLevel {
    Trace,
    Info,
    Warn,
    Error,
}

impl DebugMsgLevel {
    fn from_severity(severity: vk::DebugUtilsMessageSeverityFlagsEXT) -> Self {
        if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
            Self::Error
        } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
            Self::Warn
        } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
            Self::Info
        } else {
            Self::Trace
        }
    }
}

/// 格式化 driver 消息
///
/// 新版本的 validation layer 会输出 json，提取其中的 MainMessage 字段单独输出（里面有换行符），
/// 剩余部分格式化后输出；普通文本原样输出
fn format_debug_msg(message_type: vk::DebugUtilsMessageTypeFlagsEXT, msg: &str) -> String {
    let mut json_value = serde_json::from_str::<serde_json::Value>(msg);
    let json_obj = json_value.as_mut().ok().and_then(|v| v.as_object_mut());

    match json_obj {
        Some(obj) => {
            let main_msg = obj.remove("MainMessage");
            let main_msg_str = main_msg.as_ref().and_then(|v| v.as_str()).unwrap_or_default();
            let rest = serde_json::to_string_pretty(&*obj).unwrap_or_else(|_| msg.to_string());
            format!("[{:?}] {}\n{}", message_type, main_msg_str, rest)
        }
        None => format!("[{:?}] {}", message_type, msg),
    }
}

/// debug messenger 的回调函数
///
/// 只做观察，不影响任何控制流
unsafe extern "system" fn vk_debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT<'_>,
    _user_data: *mut std::os::raw::c_void,
) -> vk::Bool32 {
    // message_type 为 DEVICE_ADDRESS_BINDING 时 p_message 为 null
    if p_callback_data.is_null() {
        return vk::FALSE;
    }
    let p_message = unsafe { (*p_callback_data).p_message };
    if p_message.is_null() {
        return vk::FALSE;
    }
    let msg = unsafe { CStr::from_ptr(p_message) }.to_string_lossy();

    let format_msg = format_debug_msg(message_type, &msg);
    match DebugMsgLevel::from_severity(message_severity) {
        DebugMsgLevel::Error => log::error!("{}", format_msg),
        DebugMsgLevel::Warn => log::warn!("{}", format_msg),
        DebugMsgLevel::Info => log::info!("{}", format_msg),
        DebugMsgLevel::Trace => log::trace!("{}", format_msg),
    }

    // 只有 layer developer 才需要返回 True
    vk::FALSE
}
