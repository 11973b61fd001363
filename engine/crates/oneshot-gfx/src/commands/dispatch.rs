use ash::vk;

use crate::{
    commands::{
        barrier::GfxImageBarrier, command_buffer::GfxCommandBuffer, command_queue::GfxCommandQueue,
    },
    error::{GfxError, GfxResult},
    foundation::device::GfxDevice,
};

/// 一次性 dispatch 的状态
///
/// 只能按 `Idle -> Recording -> Submitted -> Completed` 的顺序前进
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Idle,
    Recording,
    Submitted,
    Completed,
}

impl DispatchState {
    /// 下一个状态，`Completed` 之后没有状态
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Idle => Some(Self::Recording),
            Self::Recording => Some(Self::Submitted),
            Self::Submitted => Some(Self::Completed),
            Self::Completed => None,
        }
    }

    /// 当前状态必须是 `expected`，否则返回 [`GfxError::InvalidDispatchState`]
    pub fn ensure(self, expected: Self) -> GfxResult<()> {
        if self == expected {
            Ok(())
        } else {
            Err(GfxError::InvalidDispatchState { expected, actual: self })
        }
    }
}

/// 覆盖 `extent` 所需的 workgroup 数量，每个维度向上取整
#[inline]
pub fn dispatch_group_count(extent: vk::Extent2D, workgroup_size: [u32; 2]) -> glam::UVec3 {
    glam::uvec3(extent.width.div_ceil(workgroup_size[0]), extent.height.div_ceil(workgroup_size[1]), 1)
}

/// 录制 dispatch 需要的所有句柄
#[derive(Clone, Copy)]
pub struct GfxDispatchBindings {
    pub target_image: vk::Image,
    pub pipeline: vk::Pipeline,
    pub pipeline_layout: vk::PipelineLayout,
    pub descriptor_set: vk::DescriptorSet,
    pub group_cnt: glam::UVec3,
}

/// 只执行一次的 compute dispatch
///
/// 每一步都会检查当前状态，顺序错误时不会发起任何 driver 调用
pub struct GfxOneShotDispatch {
    command_buffer: GfxCommandBuffer,
    state: DispatchState,
}

impl GfxOneShotDispatch {
    pub fn new(command_buffer: GfxCommandBuffer) -> Self {
        Self {
            command_buffer,
            state: DispatchState::Idle,
        }
    }

    /// Idle -> Recording
    ///
    /// 录制的命令依次为：layout 转换 barrier，绑定 pipeline，绑定 set 0，dispatch
    pub fn record(&mut self, bindings: &GfxDispatchBindings) -> GfxResult<()> {
        self.state.ensure(DispatchState::Idle)?;

        let cmd = &self.command_buffer;
        cmd.begin(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT)?;
        self.state = DispatchState::Recording;

        cmd.image_memory_barrier(
            vk::DependencyFlags::empty(),
            &[GfxImageBarrier::storage_image_first_write(bindings.target_image)],
        );
        cmd.cmd_bind_pipeline(vk::PipelineBindPoint::COMPUTE, bindings.pipeline);
        cmd.bind_descriptor_sets(
            vk::PipelineBindPoint::COMPUTE,
            bindings.pipeline_layout,
            0,
            &[bindings.descriptor_set],
            None,
        );
        cmd.cmd_dispatch(bindings.group_cnt);

        log::info!(
            "recorded dispatch {}x{}x{}",
            bindings.group_cnt.x,
            bindings.group_cnt.y,
            bindings.group_cnt.z
        );
        Ok(())
    }

    /// Recording -> Submitted
    pub fn submit(&mut self, queue: &GfxCommandQueue, fence: vk::Fence) -> GfxResult<()> {
        self.state.ensure(DispatchState::Recording)?;

        self.command_buffer.end()?;
        queue.submit(&self.command_buffer, fence)?;
        self.state = DispatchState::Submitted;

        log::info!("submitted to queue family {}", queue.queue_family().queue_family_index);
        Ok(())
    }

    /// Submitted -> Completed，阻塞直到 GPU 执行完毕
    pub fn wait(&mut self, gfx_device: &GfxDevice, fence: vk::Fence) -> GfxResult<()> {
        self.state.ensure(DispatchState::Submitted)?;

        gfx_device.wait_for_fence(fence)?;
        self.state = DispatchState::Completed;

        log::info!("dispatch completed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_count_full_image() {
        let group_cnt = dispatch_group_count(
            vk::Extent2D {
                width: 4096,
                height: 4096,
            },
            [8, 8],
        );
        assert_eq!(group_cnt, glam::uvec3(512, 512, 1));
    }

    #[test]
    fn test_group_count_rounds_up() {
        let group_cnt = dispatch_group_count(
            vk::Extent2D {
                width: 1001,
                height: 7,
            },
            [8, 8],
        );
        assert_eq!(group_cnt, glam::uvec3(126, 1, 1));

        let group_cnt = dispatch_group_count(vk::Extent2D { width: 1, height: 1 }, [16, 4]);
        assert_eq!(group_cnt, glam::uvec3(1, 1, 1));
    }

    #[test]
    fn test_state_order() {
        let mut states = vec![DispatchState::Idle];
        while let Some(next) = states.last().and_then(|s| s.next()) {
            states.push(next);
        }
        assert_eq!(
            states,
            vec![
                DispatchState::Idle,
                DispatchState::Recording,
                DispatchState::Submitted,
                DispatchState::Completed
            ]
        );
    }

    #[test]
    fn test_submit_before_record_is_rejected() {
        let err = DispatchState::Idle.ensure(DispatchState::Recording).unwrap_err();
        match err {
            GfxError::InvalidDispatchState { expected, actual } => {
                assert_eq!(expected, DispatchState::Recording);
                assert_eq!(actual, DispatchState::Idle);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_completed_dispatch_cannot_rerun() {
        assert!(DispatchState::Completed.ensure(DispatchState::Idle).is_err());
        assert!(DispatchState::Recording.ensure(DispatchState::Recording).is_ok());
    }
}
