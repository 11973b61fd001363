use std::rc::Rc;

use ash::vk;

use crate::{
    error::{GfxResult, vk_err},
    foundation::device::GfxDevice,
    release::GfxDestroy,
};

pub struct GfxImageCreateInfo {
    inner: vk::ImageCreateInfo<'static>,
}

impl GfxImageCreateInfo {
    /// 单 mip、单 layer、optimal tiling、独占访问的 2D image
    #[inline]
    pub fn new_image_2d_info(extent: vk::Extent2D, format: vk::Format, usage: vk::ImageUsageFlags) -> Self {
        Self {
            inner: vk::ImageCreateInfo {
                image_type: vk::ImageType::TYPE_2D,
                format,
                extent: extent.into(),
                mip_levels: 1,
                array_layers: 1,
                samples: vk::SampleCountFlags::TYPE_1,
                tiling: vk::ImageTiling::OPTIMAL,
                usage,
                sharing_mode: vk::SharingMode::EXCLUSIVE,
                // Vulkan 规范要求这里只能是 UNDEFINED 或者 PREINITIALIZED
                initial_layout: vk::ImageLayout::UNDEFINED,
                ..Default::default()
            },
        }
    }

    /// compute shader 写入的 storage image，之后可以被拷贝出去
    #[inline]
    pub fn new_storage_image_2d_info(extent: vk::Extent2D, format: vk::Format) -> Self {
        Self::new_image_2d_info(extent, format, vk::ImageUsageFlags::STORAGE | vk::ImageUsageFlags::TRANSFER_SRC)
    }

    #[inline]
    pub fn as_info(&self) -> &vk::ImageCreateInfo<'static> {
        &self.inner
    }
}

/// 2D image，内存由 [`crate::resources::memory::GfxDeviceMemory`] 单独分配并绑定
pub struct GfxImage2D {
    handle: vk::Image,

    name: String,
    gfx_device: Rc<GfxDevice>,
}

// new & init
impl GfxImage2D {
    pub fn new(gfx_device: Rc<GfxDevice>, image_info: &GfxImageCreateInfo, debug_name: &str) -> GfxResult<Self> {
        let handle =
            unsafe { gfx_device.create_image(image_info.as_info(), None) }.map_err(vk_err("create image"))?;
        let info = image_info.as_info();
        log::info!(
            "image {} created: {}x{} {:?}",
            debug_name,
            info.extent.width,
            info.extent.height,
            info.format
        );

        Ok(Self {
            handle,
            name: debug_name.to_string(),
            gfx_device,
        })
    }
}

// getters
impl GfxImage2D {
    #[inline]
    pub fn handle(&self) -> vk::Image {
        self.handle
    }

    #[inline]
    pub fn memory_requirements(&self) -> vk::MemoryRequirements {
        unsafe { self.gfx_device.get_image_memory_requirements(self.handle) }
    }
}

impl GfxDestroy for GfxImage2D {
    fn debug_name(&self) -> String {
        format!("GfxImage2D::{}", self.name)
    }

    fn destroy(self: Box<Self>) {
        unsafe {
            self.gfx_device.destroy_image(self.handle, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_image_info() {
        let info = GfxImageCreateInfo::new_storage_image_2d_info(
            vk::Extent2D {
                width: 4096,
                height: 4096,
            },
            vk::Format::R8G8B8A8_UNORM,
        );
        let info = info.as_info();

        assert_eq!(info.image_type, vk::ImageType::TYPE_2D);
        assert_eq!(info.extent, vk::Extent3D { width: 4096, height: 4096, depth: 1 });
        assert_eq!(info.format, vk::Format::R8G8B8A8_UNORM);
        assert_eq!(info.tiling, vk::ImageTiling::OPTIMAL);
        assert_eq!(info.usage, vk::ImageUsageFlags::STORAGE | vk::ImageUsageFlags::TRANSFER_SRC);
        assert_eq!(info.sharing_mode, vk::SharingMode::EXCLUSIVE);
        assert_eq!(info.initial_layout, vk::ImageLayout::UNDEFINED);
        assert_eq!((info.mip_levels, info.array_layers), (1, 1));
    }
}
