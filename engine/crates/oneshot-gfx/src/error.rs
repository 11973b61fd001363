use std::path::PathBuf;

use ash::vk;
use thiserror::Error;

use crate::commands::dispatch::DispatchState;

pub type GfxResult<T> = Result<T, GfxError>;

/// oneshot-gfx 中所有可能出现的错误
///
/// 所有错误都是致命的：调用方不做重试，直接向上传递到顶层统一处理
#[derive(Debug, Error)]
pub enum GfxError {
    #[error("could not load the vulkan library: {0}")]
    Loading(#[from] ash::LoadingError),

    #[error("instance initialization failed: {reason}")]
    Initialization { reason: String },

    #[error("no physical device is visible to the instance")]
    NoDevice,

    #[error("physical device {device_name:?} exposes no compute-capable queue family")]
    ComputeFamilyMissing { device_name: String },

    #[error("no memory type matches type filter {type_filter:#034b} with flags {required:?}")]
    NoSuitableMemoryType {
        type_filter: u32,
        required: vk::MemoryPropertyFlags,
    },

    #[error("failed to bind image memory: {0:?}")]
    MemoryBind(vk::Result),

    #[error("failed to {stage}: {result:?}")]
    Vulkan { stage: &'static str, result: vk::Result },

    #[error("failed to read shader file {path:?}: {source}")]
    ShaderRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("shader file {path:?} is truncated: expected {expected} bytes, read {actual}")]
    ShaderTruncated { path: PathBuf, expected: u64, actual: u64 },

    #[error("shader file {path:?} is not valid SPIR-V: {source}")]
    ShaderCode {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("dispatch is {actual:?}, expected {expected:?}")]
    InvalidDispatchState { expected: DispatchState, actual: DispatchState },
}

/// 将 `vk::Result` 转换为带阶段描述的错误
///
/// ```ignore
/// unsafe { device.create_fence(&ci, None) }.map_err(vk_err("create fence"))?;
/// ```
#[inline]
pub fn vk_err(stage: &'static str) -> impl FnOnce(vk::Result) -> GfxError {
    move |result| GfxError::Vulkan { stage, result }
}
