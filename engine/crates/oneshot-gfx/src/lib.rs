//! Vulkan 的薄封装，只覆盖一次性 compute dispatch 需要的对象
//!
//! 每个 Vulkan 对象对应一个 wrapper，创建和销毁成对出现。
//! 所有需要销毁的对象都交给 [`release::GfxReleaseStack`]，按创建的逆序释放。
//! wrapper 之间通过 `Rc<GfxDevice>` 共享设备函数指针。

pub mod commands;
pub mod descriptors;
pub mod error;
pub mod foundation;
pub mod pipelines;
pub mod release;
pub mod resources;
