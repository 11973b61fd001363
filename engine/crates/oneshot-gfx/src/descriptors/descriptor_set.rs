use std::rc::Rc;

use ash::vk;

use crate::{
    descriptors::descriptor_pool::GfxDescriptorPool,
    error::{GfxError, GfxResult, vk_err},
    foundation::device::GfxDevice,
};

/// 描述符集
///
/// # Destroy
///
/// 跟随 descriptor pool 一起销毁
pub struct GfxDescriptorSet {
    handle: vk::DescriptorSet,

    gfx_device: Rc<GfxDevice>,
}

impl GfxDescriptorSet {
    pub fn new(
        gfx_device: Rc<GfxDevice>,
        descriptor_pool: &GfxDescriptorPool,
        set_layout: vk::DescriptorSetLayout,
    ) -> GfxResult<Self> {
        let set_layouts = [set_layout];
        let alloc_info =
            vk::DescriptorSetAllocateInfo::default().descriptor_pool(descriptor_pool.handle()).set_layouts(&set_layouts);
        let sets = unsafe { gfx_device.allocate_descriptor_sets(&alloc_info) }
            .map_err(vk_err("allocate descriptor set"))?;
        let handle = sets.first().copied().ok_or(GfxError::Vulkan {
            stage: "allocate descriptor set",
            result: vk::Result::ERROR_UNKNOWN,
        })?;

        Ok(Self {
            handle,
            gfx_device,
        })
    }

    #[inline]
    pub fn handle(&self) -> vk::DescriptorSet {
        self.handle
    }

    /// 将 storage image 写入 `binding`，shader 访问时 image 处于 GENERAL layout
    ///
    /// 只有一次 update 调用
    pub fn write_storage_image(&self, binding: u32, image_view: vk::ImageView) {
        let image_infos = [storage_image_info(image_view)];
        let write = vk::WriteDescriptorSet::default()
            .dst_set(self.handle)
            .dst_binding(binding)
            .dst_array_element(0)
            .descriptor_type(vk::DescriptorType::STORAGE_IMAGE)
            .image_info(&image_infos);

        unsafe {
            self.gfx_device.update_descriptor_sets(std::slice::from_ref(&write), &[]);
        }
    }
}

#[inline]
fn storage_image_info(image_view: vk::ImageView) -> vk::DescriptorImageInfo {
    vk::DescriptorImageInfo::default()
        .image_view(image_view)
        .image_layout(vk::ImageLayout::GENERAL)
        .sampler(vk::Sampler::null())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_image_info_uses_general_layout() {
        let info = storage_image_info(vk::ImageView::null());
        assert_eq!(info.image_layout, vk::ImageLayout::GENERAL);
        assert_eq!(info.sampler, vk::Sampler::null());
    }
}
