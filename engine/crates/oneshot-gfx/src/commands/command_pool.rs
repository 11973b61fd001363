use std::rc::Rc;

use ash::vk;

use crate::{
    commands::command_queue::GfxQueueFamily,
    error::{GfxResult, vk_err},
    foundation::device::GfxDevice,
    release::GfxDestroy,
};

/// command pool 是和 queue family 绑定的，而不是和 queue 绑定的
///
/// 从 pool 中分配的 command buffer 会随 pool 一起释放
pub struct GfxCommandPool {
    handle: vk::CommandPool,
    queue_family: GfxQueueFamily,

    debug_name: String,
    gfx_device: Rc<GfxDevice>,
}

// init & destory
impl GfxCommandPool {
    pub fn new(
        gfx_device: Rc<GfxDevice>,
        queue_family: GfxQueueFamily,
        flags: vk::CommandPoolCreateFlags,
        debug_name: &str,
    ) -> GfxResult<Self> {
        let pool = unsafe {
            gfx_device.create_command_pool(
                &vk::CommandPoolCreateInfo::default()
                    .queue_family_index(queue_family.queue_family_index)
                    .flags(flags),
                None,
            )
        }
        .map_err(vk_err("create command pool"))?;

        Ok(Self {
            handle: pool,
            queue_family,
            debug_name: debug_name.to_string(),
            gfx_device,
        })
    }
}

// getters
impl GfxCommandPool {
    #[inline]
    pub fn handle(&self) -> vk::CommandPool {
        self.handle
    }

    #[inline]
    pub fn queue_family(&self) -> &GfxQueueFamily {
        &self.queue_family
    }
}

impl GfxDestroy for GfxCommandPool {
    fn debug_name(&self) -> String {
        format!("GfxCommandPool::{}", self.debug_name)
    }

    fn destroy(self: Box<Self>) {
        unsafe {
            self.gfx_device.destroy_command_pool(self.handle, None);
        }
    }
}
