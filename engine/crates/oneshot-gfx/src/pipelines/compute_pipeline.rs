use std::{ffi::CStr, rc::Rc};

use ash::vk;

use crate::{
    error::{GfxError, GfxResult, vk_err},
    foundation::device::GfxDevice,
    pipelines::shader::GfxShaderModule,
    release::GfxDestroy,
};

pub struct GfxComputePipeline {
    handle: vk::Pipeline,

    name: String,
    gfx_device: Rc<GfxDevice>,
}

impl GfxComputePipeline {
    /// shader module 在 pipeline 创建之后就不再需要，由调用者负责释放
    pub fn new(
        gfx_device: Rc<GfxDevice>,
        shader_module: &GfxShaderModule,
        entry_point: &CStr,
        pipeline_layout: vk::PipelineLayout,
        debug_name: &str,
    ) -> GfxResult<Self> {
        let stage_info = vk::PipelineShaderStageCreateInfo::default()
            .module(shader_module.handle())
            .stage(vk::ShaderStageFlags::COMPUTE)
            .name(entry_point);

        let pipeline_ci = vk::ComputePipelineCreateInfo::default().stage(stage_info).layout(pipeline_layout);
        let pipelines = unsafe {
            gfx_device.create_compute_pipelines(vk::PipelineCache::null(), std::slice::from_ref(&pipeline_ci), None)
        }
        .map_err(|(_, result)| vk_err("create compute pipeline")(result))?;
        let handle = single_pipeline(&pipelines)?;
        log::info!("compute pipeline {} created, entry point {:?}", debug_name, entry_point);

        Ok(Self {
            handle,
            name: debug_name.to_string(),
            gfx_device,
        })
    }

    #[inline]
    pub fn handle(&self) -> vk::Pipeline {
        self.handle
    }
}

/// 只创建了一个 pipeline，driver 返回空列表时视为创建失败
fn single_pipeline(pipelines: &[vk::Pipeline]) -> GfxResult<vk::Pipeline> {
    pipelines.first().copied().ok_or(GfxError::Vulkan {
        stage: "create compute pipeline",
        result: vk::Result::ERROR_UNKNOWN,
    })
}

impl GfxDestroy for GfxComputePipeline {
    fn debug_name(&self) -> String {
        format!("GfxComputePipeline::{}", self.name)
    }

    fn destroy(self: Box<Self>) {
        unsafe {
            self.gfx_device.destroy_pipeline(self.handle, None);
        }
    }
}
