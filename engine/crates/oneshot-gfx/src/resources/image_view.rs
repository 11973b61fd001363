use std::rc::Rc;

use ash::vk;

use crate::{
    error::{GfxResult, vk_err},
    foundation::device::GfxDevice,
    release::GfxDestroy,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GfxImageViewDesc {
    /// format 可以基于 vk::Image 重解释
    pub(crate) format: vk::Format,
    pub(crate) view_type: vk::ImageViewType,
    pub(crate) aspect_mask: vk::ImageAspectFlags,
    /// base mip level 和 mip level count
    pub(crate) mip: (u8, u8),
    /// base layer 和 layer count
    pub(crate) layer: (u8, u8),
}

impl GfxImageViewDesc {
    pub fn new_2d(format: vk::Format, aspect: vk::ImageAspectFlags) -> Self {
        Self {
            format,
            view_type: vk::ImageViewType::TYPE_2D,
            aspect_mask: aspect,
            mip: (0, 1),
            layer: (0, 1),
        }
    }

    fn subresource_range(&self) -> vk::ImageSubresourceRange {
        vk::ImageSubresourceRange {
            aspect_mask: self.aspect_mask,
            base_mip_level: self.mip.0 as u32,
            level_count: self.mip.1 as u32,
            base_array_layer: self.layer.0 as u32,
            layer_count: self.layer.1 as u32,
        }
    }
}

pub struct GfxImageView {
    handle: vk::ImageView,

    name: String,
    gfx_device: Rc<GfxDevice>,
}

// new & init
impl GfxImageView {
    /// image 必须已经绑定了内存
    pub fn new(
        gfx_device: Rc<GfxDevice>,
        image: vk::Image,
        view_desc: GfxImageViewDesc,
        name: impl AsRef<str>,
    ) -> GfxResult<Self> {
        let info = vk::ImageViewCreateInfo {
            image,
            view_type: view_desc.view_type,
            format: view_desc.format,
            subresource_range: view_desc.subresource_range(),
            ..Default::default()
        };

        let handle = unsafe { gfx_device.create_image_view(&info, None) }.map_err(vk_err("create image view"))?;
        Ok(Self {
            handle,
            name: name.as_ref().to_string(),
            gfx_device,
        })
    }
}

// getters
impl GfxImageView {
    /// getter
    #[inline]
    pub fn handle(&self) -> vk::ImageView {
        self.handle
    }
}

impl GfxDestroy for GfxImageView {
    fn debug_name(&self) -> String {
        format!("GfxImageView::{}", self.name)
    }

    fn destroy(self: Box<Self>) {
        unsafe {
            self.gfx_device.destroy_image_view(self.handle, None);
        }
    }
}
