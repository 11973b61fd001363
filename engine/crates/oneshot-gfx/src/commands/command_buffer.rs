use std::rc::Rc;

use ash::vk;

use crate::{
    commands::{barrier::GfxImageBarrier, command_pool::GfxCommandPool},
    error::{GfxError, GfxResult, vk_err},
    foundation::device::GfxDevice,
};

/// 命令缓冲封装
///
/// 从 [`GfxCommandPool`] 中分配，随 pool 一起释放，因此自身不需要销毁。
///
/// # 使用示例
/// ```ignore
/// let cmd = GfxCommandBuffer::new(gfx_device.clone(), &pool, "dispatch")?;
/// cmd.begin(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT)?;
/// cmd.cmd_bind_pipeline(vk::PipelineBindPoint::COMPUTE, pipeline);
/// cmd.cmd_dispatch(glam::uvec3(512, 512, 1));
/// cmd.end()?;
/// ```
pub struct GfxCommandBuffer {
    vk_handle: vk::CommandBuffer,

    name: String,
    gfx_device: Rc<GfxDevice>,
}

// new & init
impl GfxCommandBuffer {
    pub fn new(gfx_device: Rc<GfxDevice>, command_pool: &GfxCommandPool, debug_name: &str) -> GfxResult<Self> {
        let info = vk::CommandBufferAllocateInfo::default()
            .command_pool(command_pool.handle())
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(1);

        let command_buffers =
            unsafe { gfx_device.allocate_command_buffers(&info) }.map_err(vk_err("allocate command buffer"))?;
        let vk_handle = command_buffers.first().copied().ok_or(GfxError::Vulkan {
            stage: "allocate command buffer",
            result: vk::Result::ERROR_UNKNOWN,
        })?;

        Ok(Self {
            vk_handle,
            name: debug_name.to_string(),
            gfx_device,
        })
    }
}

// Basic 命令
impl GfxCommandBuffer {
    /// 开始录制 command
    #[inline]
    pub fn begin(&self, usage_flag: vk::CommandBufferUsageFlags) -> GfxResult<()> {
        log::debug!("begin command buffer: {}", self.name);
        unsafe {
            self.gfx_device
                .begin_command_buffer(self.vk_handle, &vk::CommandBufferBeginInfo::default().flags(usage_flag))
        }
        .map_err(vk_err("begin command buffer"))
    }

    /// 结束录制 command
    #[inline]
    pub fn end(&self) -> GfxResult<()> {
        unsafe { self.gfx_device.end_command_buffer(self.vk_handle) }.map_err(vk_err("end command buffer"))
    }
}

// getters
impl GfxCommandBuffer {
    /// getter
    #[inline]
    pub fn vk_handle(&self) -> vk::CommandBuffer {
        self.vk_handle
    }
}

// compute 相关的命令
impl GfxCommandBuffer {
    /// - command type: state
    /// - supported queue types: graphics, compute
    #[inline]
    pub fn cmd_bind_pipeline(&self, bind_point: vk::PipelineBindPoint, pipeline: vk::Pipeline) {
        unsafe {
            self.gfx_device.cmd_bind_pipeline(self.vk_handle, bind_point, pipeline);
        }
    }

    /// - command type: state
    /// - supported queue types: graphics, compute
    #[inline]
    pub fn bind_descriptor_sets(
        &self,
        bind_point: vk::PipelineBindPoint,
        pipeline_layout: vk::PipelineLayout,
        first_set: u32,
        descriptor_sets: &[vk::DescriptorSet],
        dynamic_offsets: Option<&[u32]>,
    ) {
        unsafe {
            self.gfx_device.cmd_bind_descriptor_sets(
                self.vk_handle,
                bind_point,
                pipeline_layout,
                first_set,
                descriptor_sets,
                dynamic_offsets.unwrap_or(&[]),
            );
        }
    }

    /// - command type: action
    /// - supported queue types: graphics, compute
    #[inline]
    pub fn cmd_dispatch(&self, group_cnt: glam::UVec3) {
        unsafe {
            self.gfx_device.cmd_dispatch(self.vk_handle, group_cnt.x, group_cnt.y, group_cnt.z);
        }
    }
}

// 同步命令
impl GfxCommandBuffer {
    /// - command type: synchronize
    /// - supported queue types: transfer, graphics, compute
    ///
    /// 所有 barrier 的 stage 合并之后一起提交
    #[inline]
    pub fn image_memory_barrier(&self, dependency_flags: vk::DependencyFlags, barriers: &[GfxImageBarrier]) {
        let src_stage = barriers.iter().fold(vk::PipelineStageFlags::empty(), |acc, b| acc | b.src_stage());
        let dst_stage = barriers.iter().fold(vk::PipelineStageFlags::empty(), |acc, b| acc | b.dst_stage());
        let image_barriers: Vec<vk::ImageMemoryBarrier> = barriers.iter().map(|b| *b.inner()).collect();

        unsafe {
            self.gfx_device.cmd_pipeline_barrier(
                self.vk_handle,
                src_stage,
                dst_stage,
                dependency_flags,
                &[],
                &[],
                &image_barriers,
            );
        }
    }
}
