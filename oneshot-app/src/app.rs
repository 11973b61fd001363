use std::rc::Rc;

use anyhow::Context;
use ash::vk;
use oneshot_gfx::{
    commands::{
        command_buffer::GfxCommandBuffer,
        command_pool::GfxCommandPool,
        command_queue::GfxCommandQueue,
        dispatch::{GfxDispatchBindings, GfxOneShotDispatch},
        fence::GfxFence,
    },
    descriptors::{
        descriptor_pool::{GfxDescriptorPool, GfxDescriptorPoolCreateInfo},
        descriptor_set::GfxDescriptorSet,
        descriptor_set_layout::GfxDescriptorSetLayout,
    },
    foundation::{
        debug_messenger::GfxDebugMsger, device::GfxDevice, instance::GfxInstance,
        physical_device::GfxPhysicalDevice,
    },
    pipelines::{
        compute_pipeline::GfxComputePipeline,
        pipeline_layout::GfxPipelineLayout,
        shader::{GfxShaderModule, read_shader_code},
    },
    release::GfxReleaseStack,
    resources::{
        image::{GfxImage2D, GfxImageCreateInfo},
        image_view::{GfxImageView, GfxImageViewDesc},
        memory::GfxDeviceMemory,
    },
};

use crate::config::DispatchConfig;

/// storage image 在 shader 中的 binding
const STORAGE_IMAGE_BINDING: u32 = 0;

/// dispatch 成功时 release stack 中对象的创建顺序，销毁顺序与之相反
///
/// 没有开启 debug utils 时不会创建 `GfxDebugMsger`
pub const CREATION_ORDER: [&str; 12] = [
    "GfxInstance",
    DEBUG_MSGER,
    "GfxDevice",
    "GfxImage2D::output",
    "GfxDeviceMemory::output",
    "GfxImageView::output",
    "GfxDescriptorSetLayout::output",
    "GfxPipelineLayout::fill",
    "GfxDescriptorPool::output",
    "GfxCommandPool::dispatch",
    "GfxFence",
    "GfxComputePipeline::fill",
];

const DEBUG_MSGER: &str = "GfxDebugMsger";

/// 当前配置下 release stack 应有的创建记录
pub fn expected_creation_order(debug_utils_enabled: bool) -> Vec<&'static str> {
    CREATION_ORDER.into_iter().filter(|name| debug_utils_enabled || *name != DEBUG_MSGER).collect()
}

/// 一次性 compute dispatch
///
/// 所有 Vulkan 对象创建之后立刻交给 release stack，
/// 无论正常结束还是中途出错，都按创建的逆序销毁
pub struct OneShotApp {
    gfx_device: Option<Rc<GfxDevice>>,
    release_stack: GfxReleaseStack,
}

// 总的入口
impl OneShotApp {
    /// 执行一次 dispatch，返回之前所有对象都已经销毁
    pub fn run(config: &DispatchConfig) -> anyhow::Result<()> {
        let mut app = Self {
            gfx_device: None,
            release_stack: GfxReleaseStack::new(),
        };

        let result = app.dispatch(config);
        if result.is_err() {
            // 已经提交的命令可能还在执行
            if let Some(gfx_device) = &app.gfx_device {
                gfx_device.wait_idle_best_effort();
            }
        }
        app.destroy();

        result
    }

    fn dispatch(&mut self, config: &DispatchConfig) -> anyhow::Result<()> {
        let stack = &mut self.release_stack;

        // instance & debug messenger
        let instance = Rc::new(GfxInstance::new(&config.init_info).context("context bootstrap")?);
        stack.push(instance.clone());
        if config.init_info.debug_utils_enabled() {
            let debug_msger =
                GfxDebugMsger::new(&instance, &config.init_info).context("install diagnostics sink")?;
            stack.push(debug_msger);
        }

        // device
        let physical_device = GfxPhysicalDevice::select(&instance).context("device selection")?;
        let gfx_device = Rc::new(
            GfxDevice::new(&instance, &physical_device, &config.init_info).context("open logical device")?,
        );
        stack.push(gfx_device.clone());
        self.gfx_device = Some(gfx_device.clone());
        let compute_queue = GfxCommandQueue::new(gfx_device.clone(), physical_device.compute_queue_family().clone());

        // image & memory
        let image = GfxImage2D::new(
            gfx_device.clone(),
            &GfxImageCreateInfo::new_storage_image_2d_info(config.image_extent, config.image_format),
            "output",
        )
        .context("resource provisioning")?;
        let mem_requirements = image.memory_requirements();
        let vk_image = stack.track(image, GfxImage2D::handle);

        let memory = GfxDeviceMemory::allocate(
            gfx_device.clone(),
            &physical_device,
            &mem_requirements,
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
            "output",
        )
        .context("resource provisioning")?;
        let bind_result = memory.bind_image(vk_image);
        stack.push(memory);
        bind_result.context("resource provisioning")?;

        let image_view = GfxImageView::new(
            gfx_device.clone(),
            vk_image,
            GfxImageViewDesc::new_2d(config.image_format, vk::ImageAspectFlags::COLOR),
            "output",
        )
        .context("resource provisioning")?;
        let vk_image_view = stack.track(image_view, GfxImageView::handle);

        // descriptors & layouts
        let set_layout = GfxDescriptorSetLayout::new(
            gfx_device.clone(),
            &[GfxDescriptorSetLayout::compute_storage_image_binding(STORAGE_IMAGE_BINDING)],
            "output",
        )
        .context("resource provisioning")?;
        let vk_set_layout = stack.track(set_layout, GfxDescriptorSetLayout::handle);

        let pipeline_layout =
            GfxPipelineLayout::new(gfx_device.clone(), &[vk_set_layout], "fill").context("resource provisioning")?;
        let vk_pipeline_layout = stack.track(pipeline_layout, GfxPipelineLayout::handle);

        let descriptor_pool = GfxDescriptorPool::new(
            gfx_device.clone(),
            GfxDescriptorPoolCreateInfo::single_storage_image(),
            "output",
        )
        .context("resource provisioning")?;
        let descriptor_set = GfxDescriptorSet::new(gfx_device.clone(), &descriptor_pool, vk_set_layout);
        stack.push(descriptor_pool);
        let descriptor_set = descriptor_set.context("resource provisioning")?;
        descriptor_set.write_storage_image(STORAGE_IMAGE_BINDING, vk_image_view);

        // commands & sync
        let command_pool = GfxCommandPool::new(
            gfx_device.clone(),
            compute_queue.queue_family().clone(),
            vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER,
            "dispatch",
        )
        .context("dispatch pipeline")?;
        let command_buffer = GfxCommandBuffer::new(gfx_device.clone(), &command_pool, "dispatch");
        stack.push(command_pool);
        let command_buffer = command_buffer.context("dispatch pipeline")?;

        let fence = GfxFence::new(gfx_device.clone(), false).context("dispatch pipeline")?;
        let vk_fence = stack.track(fence, GfxFence::handle);

        // pipeline，shader module 在 pipeline 创建之后立刻释放
        let shader_code = read_shader_code(&config.shader_path).context("read shader")?;
        let shader_module = GfxShaderModule::new(gfx_device.clone(), &shader_code).context("dispatch pipeline")?;
        let pipeline =
            GfxComputePipeline::new(gfx_device.clone(), &shader_module, config.entry_point, vk_pipeline_layout, "fill");
        shader_module.destroy();
        let vk_pipeline = stack.track(pipeline.context("dispatch pipeline")?, GfxComputePipeline::handle);

        // record -> submit -> wait
        let mut dispatch = GfxOneShotDispatch::new(command_buffer);
        dispatch
            .record(&GfxDispatchBindings {
                target_image: vk_image,
                pipeline: vk_pipeline,
                pipeline_layout: vk_pipeline_layout,
                descriptor_set: descriptor_set.handle(),
                group_cnt: config.group_count(),
            })
            .context("dispatch pipeline")?;
        dispatch.submit(&compute_queue, vk_fence).context("dispatch pipeline")?;
        dispatch.wait(&gfx_device, vk_fence).context("dispatch pipeline")?;

        debug_assert_eq!(stack.creation_log(), expected_creation_order(config.init_info.debug_utils_enabled()));
        Ok(())
    }
}

// destroy
impl OneShotApp {
    fn destroy(mut self) {
        log::info!("teardown: releasing {} objects", self.release_stack.len());
        self.release_stack.release_all();
        self.gfx_device = None;
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use oneshot_gfx::release::GfxDestroy;

    use super::*;

    /// (对象, 它依赖的对象)
    const DEPENDS_ON: [(&str, &str); 12] = [
        ("GfxDebugMsger", "GfxInstance"),
        ("GfxDevice", "GfxInstance"),
        ("GfxImage2D::output", "GfxDevice"),
        ("GfxDeviceMemory::output", "GfxImage2D::output"),
        ("GfxImageView::output", "GfxDeviceMemory::output"),
        ("GfxDescriptorSetLayout::output", "GfxDevice"),
        ("GfxPipelineLayout::fill", "GfxDescriptorSetLayout::output"),
        ("GfxDescriptorPool::output", "GfxDescriptorSetLayout::output"),
        ("GfxDescriptorPool::output", "GfxImageView::output"),
        ("GfxCommandPool::dispatch", "GfxDevice"),
        ("GfxFence", "GfxDevice"),
        ("GfxComputePipeline::fill", "GfxPipelineLayout::fill"),
    ];

    struct MockResource {
        name: &'static str,
        released: Rc<RefCell<Vec<&'static str>>>,
    }

    impl GfxDestroy for MockResource {
        fn debug_name(&self) -> String {
            self.name.to_string()
        }

        fn destroy(self: Box<Self>) {
            self.released.borrow_mut().push(self.name);
        }
    }

    fn position(order: &[&str], name: &str) -> usize {
        order.iter().position(|n| *n == name).unwrap_or_else(|| panic!("{name} is not created"))
    }

    #[test]
    fn test_creation_order_respects_dependencies() {
        for (child, parent) in DEPENDS_ON {
            assert!(
                position(&CREATION_ORDER, parent) < position(&CREATION_ORDER, child),
                "{parent} must be created before {child}"
            );
        }
    }

    #[test]
    fn test_release_stack_destroys_dependents_first() {
        let released = Rc::new(RefCell::new(Vec::new()));
        let mut stack = GfxReleaseStack::new();
        for name in expected_creation_order(true) {
            stack.push(MockResource {
                name,
                released: released.clone(),
            });
        }
        assert_eq!(stack.creation_log(), CREATION_ORDER);

        stack.release_all();
        let released = released.borrow();
        assert_eq!(released.len(), CREATION_ORDER.len());
        for (child, parent) in DEPENDS_ON {
            assert!(
                position(released.as_slice(), child) < position(released.as_slice(), parent),
                "{child} must be destroyed before {parent}"
            );
        }
    }

    #[test]
    fn test_no_messenger_without_debug_utils() {
        let order = expected_creation_order(false);
        assert_eq!(order.len(), CREATION_ORDER.len() - 1);
        assert!(!order.contains(&"GfxDebugMsger"));
        assert_eq!(order[..2], ["GfxInstance", "GfxDevice"]);
    }
}
