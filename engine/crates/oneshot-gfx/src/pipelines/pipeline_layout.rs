use std::rc::Rc;

use ash::vk;

use crate::{
    error::{GfxResult, vk_err},
    foundation::device::GfxDevice,
    release::GfxDestroy,
};

/// 不包含 push constant 的 pipeline layout
pub struct GfxPipelineLayout {
    handle: vk::PipelineLayout,

    name: String,
    gfx_device: Rc<GfxDevice>,
}

impl GfxPipelineLayout {
    pub fn new(
        gfx_device: Rc<GfxDevice>,
        set_layouts: &[vk::DescriptorSetLayout],
        debug_name: &str,
    ) -> GfxResult<Self> {
        let pipeline_layout_ci = vk::PipelineLayoutCreateInfo::default().set_layouts(set_layouts);
        let handle = unsafe { gfx_device.create_pipeline_layout(&pipeline_layout_ci, None) }
            .map_err(vk_err("create pipeline layout"))?;

        Ok(Self {
            handle,
            name: debug_name.to_string(),
            gfx_device,
        })
    }

    #[inline]
    pub fn handle(&self) -> vk::PipelineLayout {
        self.handle
    }
}

impl GfxDestroy for GfxPipelineLayout {
    fn debug_name(&self) -> String {
        format!("GfxPipelineLayout::{}", self.name)
    }

    fn destroy(self: Box<Self>) {
        unsafe {
            self.gfx_device.destroy_pipeline_layout(self.handle, None);
        }
    }
}
