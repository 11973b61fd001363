use std::rc::Rc;

use ash::vk;

use crate::{
    error::{GfxResult, vk_err},
    foundation::device::GfxDevice,
    release::GfxDestroy,
};

/// 描述符池创建信息
///
/// - 最大描述符集数量
/// - 每种类型描述符的最大数量
#[derive(Debug, Clone)]
pub struct GfxDescriptorPoolCreateInfo {
    pub(crate) flags: vk::DescriptorPoolCreateFlags,
    pub(crate) max_sets: u32,
    pub(crate) pool_sizes: Vec<vk::DescriptorPoolSize>,
}

impl GfxDescriptorPoolCreateInfo {
    #[inline]
    pub fn new(flags: vk::DescriptorPoolCreateFlags, max_sets: u32, pool_sizes: Vec<vk::DescriptorPoolSize>) -> Self {
        Self {
            flags,
            max_sets,
            pool_sizes,
        }
    }

    /// 只能分配一个 set，其中只有一个 storage image
    #[inline]
    pub fn single_storage_image() -> Self {
        Self::new(
            vk::DescriptorPoolCreateFlags::empty(),
            1,
            vec![vk::DescriptorPoolSize {
                ty: vk::DescriptorType::STORAGE_IMAGE,
                descriptor_count: 1,
            }],
        )
    }
}

/// 描述符池
///
/// 从池中分配的描述符集随池一起释放
pub struct GfxDescriptorPool {
    handle: vk::DescriptorPool,

    name: String,
    gfx_device: Rc<GfxDevice>,
}

impl GfxDescriptorPool {
    #[inline]
    pub fn new(gfx_device: Rc<GfxDevice>, ci: GfxDescriptorPoolCreateInfo, name: &str) -> GfxResult<Self> {
        let create_info = vk::DescriptorPoolCreateInfo::default()
            .flags(ci.flags)
            .max_sets(ci.max_sets)
            .pool_sizes(&ci.pool_sizes);
        let handle = unsafe { gfx_device.create_descriptor_pool(&create_info, None) }
            .map_err(vk_err("create descriptor pool"))?;

        Ok(Self {
            handle,
            name: name.to_string(),
            gfx_device,
        })
    }

    #[inline]
    pub fn handle(&self) -> vk::DescriptorPool {
        self.handle
    }
}

impl GfxDestroy for GfxDescriptorPool {
    fn debug_name(&self) -> String {
        format!("GfxDescriptorPool::{}", self.name)
    }

    fn destroy(self: Box<Self>) {
        unsafe {
            self.gfx_device.destroy_descriptor_pool(self.handle, None);
        }
    }
}
