use std::rc::Rc;

use ash::vk;

use crate::{
    error::{GfxError, GfxResult, vk_err},
    foundation::{device::GfxDevice, physical_device::GfxPhysicalDevice},
    release::GfxDestroy,
};

/// 手动分配的一块 device memory
///
/// 大小和 memory type 都来自资源的 `vk::MemoryRequirements`
pub struct GfxDeviceMemory {
    handle: vk::DeviceMemory,

    name: String,
    gfx_device: Rc<GfxDevice>,
}

impl GfxDeviceMemory {
    /// 分配恰好 `requirements.size` 字节，memory type 取第一个满足 `flags` 的类型
    pub fn allocate(
        gfx_device: Rc<GfxDevice>,
        physical_device: &GfxPhysicalDevice,
        requirements: &vk::MemoryRequirements,
        flags: vk::MemoryPropertyFlags,
        debug_name: &str,
    ) -> GfxResult<Self> {
        let memory_type_index = physical_device.find_memory_type(requirements.memory_type_bits, flags)?;

        let alloc_info = vk::MemoryAllocateInfo::default()
            .allocation_size(requirements.size)
            .memory_type_index(memory_type_index);
        let handle = unsafe { gfx_device.allocate_memory(&alloc_info, None) }.map_err(vk_err("allocate memory"))?;
        log::info!("allocated {} bytes from memory type {} for {}", requirements.size, memory_type_index, debug_name);

        Ok(Self {
            handle,
            name: debug_name.to_string(),
            gfx_device,
        })
    }

    /// 绑定到 image 的 offset 0 处，失败时和分配失败区分开
    pub fn bind_image(&self, image: vk::Image) -> GfxResult<()> {
        unsafe { self.gfx_device.bind_image_memory(image, self.handle, 0) }.map_err(GfxError::MemoryBind)
    }
}

// getters
impl GfxDeviceMemory {
    #[inline]
    pub fn handle(&self) -> vk::DeviceMemory {
        self.handle
    }
}

impl GfxDestroy for GfxDeviceMemory {
    fn debug_name(&self) -> String {
        format!("GfxDeviceMemory::{}", self.name)
    }

    fn destroy(self: Box<Self>) {
        unsafe {
            self.gfx_device.free_memory(self.handle, None);
        }
    }
}
