use std::rc::Rc;

use ash::vk;

use crate::{
    error::{GfxResult, vk_err},
    foundation::device::GfxDevice,
    release::GfxDestroy,
};

/// 描述符集布局
///
/// 描述符集布局定义了描述符集的结构，包括：
/// - 绑定的数量
/// - 每个绑定的类型
/// - 每个绑定的着色器阶段
pub struct GfxDescriptorSetLayout {
    layout: vk::DescriptorSetLayout,

    name: String,
    gfx_device: Rc<GfxDevice>,
}

impl GfxDescriptorSetLayout {
    pub fn new(
        gfx_device: Rc<GfxDevice>,
        bindings: &[vk::DescriptorSetLayoutBinding<'static>],
        debug_name: impl AsRef<str>,
    ) -> GfxResult<Self> {
        let create_info = vk::DescriptorSetLayoutCreateInfo::default().bindings(bindings);
        let layout = unsafe { gfx_device.create_descriptor_set_layout(&create_info, None) }
            .map_err(vk_err("create descriptor set layout"))?;

        Ok(Self {
            layout,
            name: debug_name.as_ref().to_string(),
            gfx_device,
        })
    }

    /// 只在 compute stage 可见的单个 storage image
    #[inline]
    pub fn compute_storage_image_binding(binding: u32) -> vk::DescriptorSetLayoutBinding<'static> {
        vk::DescriptorSetLayoutBinding::default()
            .binding(binding)
            .descriptor_type(vk::DescriptorType::STORAGE_IMAGE)
            .descriptor_count(1)
            .stage_flags(vk::ShaderStageFlags::COMPUTE)
    }

    #[inline]
    pub fn handle(&self) -> vk::DescriptorSetLayout {
        self.layout
    }
}

impl GfxDestroy for GfxDescriptorSetLayout {
    fn debug_name(&self) -> String {
        format!("GfxDescriptorSetLayout::{}", self.name)
    }

    fn destroy(self: Box<Self>) {
        unsafe {
            self.gfx_device.destroy_descriptor_set_layout(self.layout, None);
        }
    }
}
