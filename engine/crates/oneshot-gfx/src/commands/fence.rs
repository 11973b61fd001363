use std::rc::Rc;

use ash::vk;

use crate::{
    error::{GfxResult, vk_err},
    foundation::device::GfxDevice,
    release::GfxDestroy,
};

/// host 可以等待的完成信号
///
/// 等待通过 [`GfxDevice::wait_for_fence`] 完成
pub struct GfxFence {
    fence: vk::Fence,
    gfx_device: Rc<GfxDevice>,
}

// 创建与销毁
impl GfxFence {
    /// # param
    /// * signaled - 是否创建时就 signaled
    pub fn new(gfx_device: Rc<GfxDevice>, signaled: bool) -> GfxResult<Self> {
        let fence_flags = if signaled { vk::FenceCreateFlags::SIGNALED } else { vk::FenceCreateFlags::empty() };
        let fence = unsafe { gfx_device.create_fence(&vk::FenceCreateInfo::default().flags(fence_flags), None) }
            .map_err(vk_err("create fence"))?;

        Ok(Self { fence, gfx_device })
    }
}

// getters
impl GfxFence {
    #[inline]
    pub fn handle(&self) -> vk::Fence {
        self.fence
    }
}

impl GfxDestroy for GfxFence {
    fn debug_name(&self) -> String {
        "GfxFence".to_string()
    }

    fn destroy(self: Box<Self>) {
        unsafe {
            self.gfx_device.destroy_fence(self.fence, None);
        }
    }
}
