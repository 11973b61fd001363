use std::rc::Rc;

use ash::vk;

use crate::{
    commands::command_buffer::GfxCommandBuffer,
    error::{GfxResult, vk_err},
    foundation::device::GfxDevice,
};

#[derive(Debug, Clone)]
pub struct GfxQueueFamily {
    pub name: String,
    pub queue_family_index: u32,
    pub queue_flags: vk::QueueFlags,
    pub queue_count: u32,
}

/// 从 device 中取出的 queue，不需要销毁
pub struct GfxCommandQueue {
    pub(crate) vk_queue: vk::Queue,
    pub(crate) queue_family: GfxQueueFamily,
    pub(crate) gfx_device: Rc<GfxDevice>,
}

impl GfxCommandQueue {
    /// 取出 queue family 中的第 0 个 queue，这个调用不会失败
    pub fn new(gfx_device: Rc<GfxDevice>, queue_family: GfxQueueFamily) -> Self {
        let vk_queue = unsafe { gfx_device.get_device_queue(queue_family.queue_family_index, 0) };
        Self {
            vk_queue,
            queue_family,
            gfx_device,
        }
    }

    #[inline]
    pub fn queue_family(&self) -> &GfxQueueFamily {
        &self.queue_family
    }

    /// 提交单个 command buffer，执行完毕后 signal `fence`
    ///
    /// 只有一次提交，没有跨 queue 的依赖，因此不使用 semaphore
    pub fn submit(&self, command_buffer: &GfxCommandBuffer, fence: vk::Fence) -> GfxResult<()> {
        let command_buffers = [command_buffer.vk_handle()];
        let submit_info = vk::SubmitInfo::default().command_buffers(&command_buffers);
        unsafe {
            self.gfx_device.queue_submit(self.vk_queue, std::slice::from_ref(&submit_info), fence)
        }
        .map_err(vk_err("submit command buffer"))
    }
}
