use ash::vk;

/// 便捷创建 image memory barrier 的结构体
///
/// 使用 Vulkan 1.0 的 barrier，stage 在录制 `cmd_pipeline_barrier` 时一并给出
pub struct GfxImageBarrier {
    inner: vk::ImageMemoryBarrier<'static>,
    src_stage: vk::PipelineStageFlags,
    dst_stage: vk::PipelineStageFlags,
}

impl Default for GfxImageBarrier {
    fn default() -> Self {
        Self {
            inner: vk::ImageMemoryBarrier {
                old_layout: vk::ImageLayout::UNDEFINED,
                new_layout: vk::ImageLayout::UNDEFINED,
                src_queue_family_index: vk::QUEUE_FAMILY_IGNORED,
                dst_queue_family_index: vk::QUEUE_FAMILY_IGNORED,
                subresource_range: vk::ImageSubresourceRange {
                    aspect_mask: vk::ImageAspectFlags::empty(),
                    base_array_layer: 0,
                    layer_count: 1,
                    base_mip_level: 0,
                    level_count: 1,
                },
                ..Default::default()
            },
            src_stage: vk::PipelineStageFlags::TOP_OF_PIPE,
            dst_stage: vk::PipelineStageFlags::BOTTOM_OF_PIPE,
        }
    }
}

impl GfxImageBarrier {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn inner(&self) -> &vk::ImageMemoryBarrier<'static> {
        &self.inner
    }

    #[inline]
    pub fn src_stage(&self) -> vk::PipelineStageFlags {
        self.src_stage
    }

    #[inline]
    pub fn dst_stage(&self) -> vk::PipelineStageFlags {
        self.dst_stage
    }

    /// builder
    #[inline]
    pub fn layout_transfer(mut self, old_layout: vk::ImageLayout, new_layout: vk::ImageLayout) -> Self {
        self.inner.old_layout = old_layout;
        self.inner.new_layout = new_layout;
        self
    }

    /// builder
    #[inline]
    pub fn src_mask(mut self, src_stage: vk::PipelineStageFlags, src_access_mask: vk::AccessFlags) -> Self {
        self.src_stage = src_stage;
        self.inner.src_access_mask = src_access_mask;
        self
    }

    /// builder
    #[inline]
    pub fn dst_mask(mut self, dst_stage: vk::PipelineStageFlags, dst_access_mask: vk::AccessFlags) -> Self {
        self.dst_stage = dst_stage;
        self.inner.dst_access_mask = dst_access_mask;
        self
    }

    /// builder
    /// layer 和 miplevel 都使用默认值
    #[inline]
    pub fn image_aspect_flag(mut self, aspect_mask: vk::ImageAspectFlags) -> Self {
        self.inner.subresource_range.aspect_mask = aspect_mask;
        self
    }

    /// builder
    #[inline]
    pub fn image(mut self, image: vk::Image) -> Self {
        self.inner.image = image;
        self
    }

    /// compute shader 第一次写入 storage image 之前的 barrier：UNDEFINED -> GENERAL
    pub fn storage_image_first_write(image: vk::Image) -> Self {
        Self::new()
            .image(image)
            .image_aspect_flag(vk::ImageAspectFlags::COLOR)
            .layout_transfer(vk::ImageLayout::UNDEFINED, vk::ImageLayout::GENERAL)
            .src_mask(vk::PipelineStageFlags::TOP_OF_PIPE, vk::AccessFlags::empty())
            .dst_mask(vk::PipelineStageFlags::COMPUTE_SHADER, vk::AccessFlags::SHADER_WRITE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_image_first_write() {
        let barrier = GfxImageBarrier::storage_image_first_write(vk::Image::null());
        let inner = barrier.inner();

        assert_eq!(inner.old_layout, vk::ImageLayout::UNDEFINED);
        assert_eq!(inner.new_layout, vk::ImageLayout::GENERAL);
        assert_eq!(inner.src_access_mask, vk::AccessFlags::empty());
        assert_eq!(inner.dst_access_mask, vk::AccessFlags::SHADER_WRITE);
        assert_eq!(barrier.src_stage(), vk::PipelineStageFlags::TOP_OF_PIPE);
        assert_eq!(barrier.dst_stage(), vk::PipelineStageFlags::COMPUTE_SHADER);

        assert_eq!(inner.src_queue_family_index, vk::QUEUE_FAMILY_IGNORED);
        assert_eq!(inner.dst_queue_family_index, vk::QUEUE_FAMILY_IGNORED);
        assert_eq!(inner.subresource_range.aspect_mask, vk::ImageAspectFlags::COLOR);
        assert_eq!(inner.subresource_range.level_count, 1);
        assert_eq!(inner.subresource_range.layer_count, 1);
    }
}
