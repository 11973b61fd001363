use std::{cell::Cell, ffi::c_char, ops::Deref, rc::Rc};

use ash::vk;
use itertools::Itertools;

use crate::{
    error::{GfxResult, vk_err},
    foundation::{init_info::GfxInitInfo, instance::GfxInstance, physical_device::GfxPhysicalDevice},
    release::GfxDestroy,
};

/// Vulkan 逻辑设备封装
///
/// 只创建一个 queue，来自物理显卡的 compute queue family。
/// 其他对象通过 `Rc<GfxDevice>` 共享设备函数指针
pub struct GfxDevice {
    /// 核心 Vulkan 设备 API
    pub(crate) device: ash::Device,

    destroyed: Cell<bool>,
}

// 构造与销毁
impl GfxDevice {
    pub fn new(
        instance: &GfxInstance,
        physical_device: &GfxPhysicalDevice,
        init_info: &GfxInitInfo,
    ) -> GfxResult<Self> {
        let queue_priorities = [1.0];
        let queue_create_infos = [vk::DeviceQueueCreateInfo::default()
            .queue_family_index(physical_device.compute_queue_family.queue_family_index)
            .queue_priorities(&queue_priorities)];

        // device layer 已经被废弃，但旧的实现仍然会读取，保持和 instance 一致
        let enabled_layers: Vec<*const c_char> = init_info.instance_layers.iter().map(|l| l.as_ptr()).collect_vec();
        #[allow(deprecated)]
        let device_create_info = vk::DeviceCreateInfo::default()
            .queue_create_infos(&queue_create_infos)
            .enabled_layer_names(&enabled_layers);

        let device = unsafe {
            instance.ash_instance().create_device(physical_device.vk_handle, &device_create_info, None)
        }
        .map_err(vk_err("create logical device"))?;
        log::info!("logical device created on {:?}", physical_device.name());

        Ok(Self {
            device,
            destroyed: Cell::new(false),
        })
    }

    pub fn destroy(&self) {
        if self.destroyed.replace(true) {
            return;
        }
        log::info!("destroying device");
        unsafe {
            self.device.destroy_device(None);
        }
    }
}

// tools
impl GfxDevice {
    /// 阻塞等待 fence，没有超时
    pub fn wait_for_fence(&self, fence: vk::Fence) -> GfxResult<()> {
        unsafe { self.device.wait_for_fences(std::slice::from_ref(&fence), true, u64::MAX) }
            .map_err(vk_err("wait for fence"))
    }

    /// 出错时尽力等待 GPU 空闲，保证之后的销毁不会和执行中的命令冲突
    pub fn wait_idle_best_effort(&self) {
        if let Err(result) = unsafe { self.device.device_wait_idle() } {
            log::warn!("device_wait_idle failed: {:?}", result);
        }
    }
}

impl Deref for GfxDevice {
    type Target = ash::Device;
    fn deref(&self) -> &Self::Target {
        &self.device
    }
}

impl GfxDestroy for Rc<GfxDevice> {
    fn debug_name(&self) -> String {
        "GfxDevice".to_string()
    }

    fn destroy(self: Box<Self>) {
        GfxDevice::destroy(&self);
    }
}

impl Drop for GfxDevice {
    fn drop(&mut self) {
        debug_assert!(self.destroyed.get(), "GfxDevice must be destroyed before being dropped.");
    }
}
