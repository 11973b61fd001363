use ash::vk;
use itertools::Itertools;

use crate::{
    commands::command_queue::GfxQueueFamily,
    error::{GfxError, GfxResult, vk_err},
    foundation::instance::GfxInstance,
};

/// 独立显卡的加分
const DISCRETE_GPU_BONUS: i32 = 100;

/// 表示一张物理显卡
///
/// 由 instance 枚举得到，不需要销毁
pub struct GfxPhysicalDevice {
    pub(crate) vk_handle: vk::PhysicalDevice,

    /// 当前 gpu 的基础属性
    pub(crate) basic_props: vk::PhysicalDeviceProperties,

    pub(crate) mem_props: vk::PhysicalDeviceMemoryProperties,

    /// 第一个支持 compute 的 queue family
    pub(crate) compute_queue_family: GfxQueueFamily,
}

impl GfxPhysicalDevice {
    /// 枚举所有物理显卡，选出得分最高的一张
    ///
    /// 得分相同时选择最先枚举到的那张
    pub fn select(instance: &GfxInstance) -> GfxResult<Self> {
        let ash_instance = instance.ash_instance();
        let pdevices =
            unsafe { ash_instance.enumerate_physical_devices() }.map_err(vk_err("enumerate physical devices"))?;

        let candidates = pdevices
            .iter()
            .map(|pdevice| (*pdevice, unsafe { ash_instance.get_physical_device_properties(*pdevice) }))
            .collect_vec();
        for (_, props) in &candidates {
            log::info!("found gpu: {:?} ({:?})", device_name(props), props.device_type);
        }

        let best = pick_highest_score(candidates.iter().map(|(_, props)| rate_physical_device(props)))
            .ok_or(GfxError::NoDevice)?;
        let (pdevice, basic_props) = candidates[best];
        log::info!("selected gpu: {:?}", device_name(&basic_props));

        let queue_family_props = unsafe { ash_instance.get_physical_device_queue_family_properties(pdevice) };
        log::info!("physical device: queue family props:\n{:#?}", queue_family_props);

        // 所有 Vulkan 实现都必须支持 compute，找不到说明 driver 不符合规范
        let compute_queue_family =
            find_compute_family(&queue_family_props).ok_or_else(|| GfxError::ComputeFamilyMissing {
                device_name: device_name(&basic_props),
            })?;

        Ok(Self {
            vk_handle: pdevice,
            basic_props,
            mem_props: unsafe { ash_instance.get_physical_device_memory_properties(pdevice) },
            compute_queue_family,
        })
    }

    /// 找到满足 `type_filter` 且包含 `required` 所有 flag 的 memory type
    pub fn find_memory_type(&self, type_filter: u32, required: vk::MemoryPropertyFlags) -> GfxResult<u32> {
        find_memory_type_index(&self.mem_props, type_filter, required)
            .ok_or(GfxError::NoSuitableMemoryType { type_filter, required })
    }
}

// getters
impl GfxPhysicalDevice {
    #[inline]
    pub fn name(&self) -> String {
        device_name(&self.basic_props)
    }

    #[inline]
    pub fn compute_queue_family(&self) -> &GfxQueueFamily {
        &self.compute_queue_family
    }
}

fn device_name(props: &vk::PhysicalDeviceProperties) -> String {
    props.device_name_as_c_str().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default()
}

/// 物理显卡的得分
///
/// 目前只有独立显卡会加分，其他属性（显存大小、feature 等）暂不参与
pub fn rate_physical_device(props: &vk::PhysicalDeviceProperties) -> i32 {
    let mut score = 0;
    if props.device_type == vk::PhysicalDeviceType::DISCRETE_GPU {
        score += DISCRETE_GPU_BONUS;
    }
    score
}

/// 得分最高的候选者的下标，得分相同时取最靠前的；没有候选者时返回 None
pub fn pick_highest_score(scores: impl IntoIterator<Item = i32>) -> Option<usize> {
    scores
        .into_iter()
        .enumerate()
        .fold(None, |best: Option<(usize, i32)>, (idx, score)| match best {
            Some((_, best_score)) if best_score >= score => best,
            _ => Some((idx, score)),
        })
        .map(|(idx, _)| idx)
}

/// 第一个支持 compute 的 queue family
pub fn find_compute_family(queue_family_props: &[vk::QueueFamilyProperties]) -> Option<GfxQueueFamily> {
    queue_family_props
        .iter()
        .enumerate()
        .find(|(_, props)| props.queue_flags.contains(vk::QueueFlags::COMPUTE))
        .map(|(family_idx, props)| GfxQueueFamily {
            name: "compute".to_string(),
            queue_family_index: family_idx as u32,
            queue_flags: props.queue_flags,
            queue_count: props.queue_count,
        })
}

/// 线性扫描，返回第一个满足条件的 memory type 下标
pub fn find_memory_type_index(
    mem_props: &vk::PhysicalDeviceMemoryProperties,
    type_filter: u32,
    required: vk::MemoryPropertyFlags,
) -> Option<u32> {
    mem_props.memory_types_as_slice().iter().enumerate().find_map(|(idx, memory_type)| {
        let allowed = type_filter & (1 << idx) != 0;
        (allowed && memory_type.property_flags.contains(required)).then_some(idx as u32)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props_of(device_type: vk::PhysicalDeviceType) -> vk::PhysicalDeviceProperties {
        vk::PhysicalDeviceProperties {
            device_type,
            ..Default::default()
        }
    }

    fn pick(types: &[vk::PhysicalDeviceType]) -> Option<usize> {
        pick_highest_score(types.iter().map(|ty| rate_physical_device(&props_of(*ty))))
    }

    #[test]
    fn test_discrete_gpu_wins() {
        use vk::PhysicalDeviceType as T;
        assert_eq!(pick(&[T::INTEGRATED_GPU, T::DISCRETE_GPU, T::CPU]), Some(1));
    }

    #[test]
    fn test_tie_goes_to_first_enumerated() {
        use vk::PhysicalDeviceType as T;
        assert_eq!(pick(&[T::INTEGRATED_GPU, T::DISCRETE_GPU, T::DISCRETE_GPU]), Some(1));
        // 没有独立显卡时回退到第一个
        assert_eq!(pick(&[T::INTEGRATED_GPU, T::VIRTUAL_GPU, T::CPU]), Some(0));
    }

    #[test]
    fn test_no_device() {
        assert_eq!(pick(&[]), None);
        assert_eq!(pick_highest_score(std::iter::empty()), None);
    }

    #[test]
    fn test_selected_has_max_score() {
        let scores = [3, -1, 7, 7, 2, 7];
        let best = pick_highest_score(scores).unwrap();
        assert_eq!(best, 2);
        assert!(scores.iter().all(|score| *score <= scores[best]));
    }

    #[test]
    fn test_find_compute_family() {
        let families = [
            vk::QueueFamilyProperties {
                queue_flags: vk::QueueFlags::TRANSFER,
                queue_count: 2,
                ..Default::default()
            },
            vk::QueueFamilyProperties {
                queue_flags: vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE,
                queue_count: 16,
                ..Default::default()
            },
            vk::QueueFamilyProperties {
                queue_flags: vk::QueueFlags::COMPUTE,
                queue_count: 8,
                ..Default::default()
            },
        ];
        let family = find_compute_family(&families).unwrap();
        assert_eq!(family.queue_family_index, 1);
        assert!(family.queue_flags.contains(vk::QueueFlags::COMPUTE));
    }

    #[test]
    fn test_compute_family_missing() {
        let families = [vk::QueueFamilyProperties {
            queue_flags: vk::QueueFlags::GRAPHICS | vk::QueueFlags::TRANSFER,
            queue_count: 1,
            ..Default::default()
        }];
        assert!(find_compute_family(&families).is_none());
    }

    fn mem_props_of(flags: &[vk::MemoryPropertyFlags]) -> vk::PhysicalDeviceMemoryProperties {
        let mut props = vk::PhysicalDeviceMemoryProperties {
            memory_type_count: flags.len() as u32,
            ..Default::default()
        };
        for (idx, flag) in flags.iter().enumerate() {
            props.memory_types[idx].property_flags = *flag;
        }
        props
    }

    #[test]
    fn test_memory_type_respects_filter_and_flags() {
        type M = vk::MemoryPropertyFlags;
        let props = mem_props_of(&[M::HOST_VISIBLE | M::HOST_COHERENT, M::DEVICE_LOCAL, M::DEVICE_LOCAL | M::HOST_VISIBLE]);

        // type 1 被 filter 排除
        let idx = find_memory_type_index(&props, 0b101, M::DEVICE_LOCAL).unwrap();
        assert_eq!(idx, 2);
        assert!(0b101 & (1 << idx) != 0);
        assert!(props.memory_types[idx as usize].property_flags.contains(M::DEVICE_LOCAL));

        assert_eq!(find_memory_type_index(&props, 0b111, M::DEVICE_LOCAL), Some(1));
    }

    #[test]
    fn test_no_suitable_memory_type() {
        type M = vk::MemoryPropertyFlags;
        let props = mem_props_of(&[M::HOST_VISIBLE, M::DEVICE_LOCAL]);
        assert_eq!(find_memory_type_index(&props, 0b01, M::DEVICE_LOCAL), None);
        // 超出 memory_type_count 的条目不参与扫描
        assert_eq!(find_memory_type_index(&props, 1 << 5, M::empty()), None);
    }
}
