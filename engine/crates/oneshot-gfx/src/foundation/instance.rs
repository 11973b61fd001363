use std::{
    cell::Cell,
    ffi::{CStr, c_char},
    rc::Rc,
};

use ash::vk;
use itertools::Itertools;

use crate::{
    error::{GfxError, GfxResult},
    foundation::{debug_messenger::GfxDebugMsger, init_info::GfxInitInfo},
    release::GfxDestroy,
};

/// Vulkan instance 封装
///
/// 持有 `ash::Entry`：drop 之后会卸载 dll，因此 instance 销毁之后 entry 才能释放
pub struct GfxInstance {
    vk_entry: ash::Entry,
    ash_instance: ash::Instance,

    destroyed: Cell<bool>,
}

// 创建与销毁
impl GfxInstance {
    /// 设置所需的 layers 和 extensions，创建 vk instance
    ///
    /// 任何一个 layer 或 extension 不受支持都会直接返回错误，不会降级
    pub fn new(init_info: &GfxInitInfo) -> GfxResult<Self> {
        let vk_entry = unsafe { ash::Entry::load() }?;

        Self::check_support(&vk_entry, init_info)?;

        let app_info = vk::ApplicationInfo::default()
            .api_version(init_info.vk_version)
            .application_name(init_info.app_name)
            .application_version(vk::make_api_version(0, 0, 1, 0))
            .engine_name(init_info.engine_name)
            .engine_version(vk::make_api_version(0, 0, 1, 0));

        let enabled_layers = Self::as_ptrs(&init_info.instance_layers);
        let enabled_extensions = Self::as_ptrs(&init_info.instance_extensions);

        let mut instance_ci = vk::InstanceCreateInfo::default()
            .application_info(&app_info)
            .enabled_layer_names(&enabled_layers)
            .enabled_extension_names(&enabled_extensions);

        // 提前挂上 debug messenger，instance 创建过程中的消息也能被捕获
        let mut debug_utils_messenger_ci = GfxDebugMsger::debug_utils_messenger_ci(init_info);
        if init_info.debug_utils_enabled() {
            instance_ci = instance_ci.push_next(&mut debug_utils_messenger_ci);
        }

        let ash_instance = unsafe { vk_entry.create_instance(&instance_ci, None) }.map_err(|result| {
            GfxError::Initialization {
                reason: format!("vkCreateInstance returned {result:?}"),
            }
        })?;

        log::info!(
            "instance created, layers: [{}], extensions: [{}]",
            init_info.instance_layers.iter().map(|l| l.to_string_lossy()).join(", "),
            init_info.instance_extensions.iter().map(|e| e.to_string_lossy()).join(", ")
        );

        Ok(Self {
            vk_entry,
            ash_instance,
            destroyed: Cell::new(false),
        })
    }

    /// 检查 layers 和 extensions 是否都受支持，把所有缺失的名字一次性报告出来
    fn check_support(vk_entry: &ash::Entry, init_info: &GfxInitInfo) -> GfxResult<()> {
        let query_err = |what: &'static str| {
            move |result: vk::Result| GfxError::Initialization {
                reason: format!("failed to enumerate instance {what}: {result:?}"),
            }
        };

        let all_layer_props =
            unsafe { vk_entry.enumerate_instance_layer_properties() }.map_err(query_err("layers"))?;
        let all_ext_props =
            unsafe { vk_entry.enumerate_instance_extension_properties(None) }.map_err(query_err("extensions"))?;

        let available_layers =
            all_layer_props.iter().filter_map(|props| props.layer_name_as_c_str().ok()).collect_vec();
        let available_exts =
            all_ext_props.iter().filter_map(|props| props.extension_name_as_c_str().ok()).collect_vec();

        let missing = missing_names(&init_info.instance_layers, &available_layers)
            .into_iter()
            .chain(missing_names(&init_info.instance_extensions, &available_exts))
            .collect_vec();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(GfxError::Initialization {
                reason: format!("unsupported instance layers/extensions: {}", missing.join(", ")),
            })
        }
    }

    #[inline]
    fn as_ptrs(names: &[&'static CStr]) -> Vec<*const c_char> {
        names.iter().map(|name| name.as_ptr()).collect_vec()
    }

    pub fn destroy(&self) {
        if self.destroyed.replace(true) {
            return;
        }
        unsafe {
            self.ash_instance.destroy_instance(None);
        }
    }
}

// getters
impl GfxInstance {
    #[inline]
    pub fn entry(&self) -> &ash::Entry {
        &self.vk_entry
    }

    #[inline]
    pub fn ash_instance(&self) -> &ash::Instance {
        &self.ash_instance
    }
}

impl GfxDestroy for Rc<GfxInstance> {
    fn debug_name(&self) -> String {
        "GfxInstance".to_string()
    }

    fn destroy(self: Box<Self>) {
        GfxInstance::destroy(&self);
    }
}

impl Drop for GfxInstance {
    fn drop(&mut self) {
        debug_assert!(self.destroyed.get(), "GfxInstance must be destroyed before being dropped.");
    }
}

/// `requested` 中不在 `available` 里的名字
fn missing_names(requested: &[&CStr], available: &[&CStr]) -> Vec<String> {
    requested
        .iter()
        .filter(|name| !available.contains(name))
        .map(|name| name.to_string_lossy().into_owned())
        .collect()
}
