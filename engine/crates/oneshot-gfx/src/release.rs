//! 按创建顺序记录 Vulkan 对象，并严格按照逆序销毁
//!
//! 所有需要手动销毁的对象在创建成功后立刻交给 [`GfxReleaseStack`]。
//! stack 被 drop 时（无论是正常结束还是错误提前返回）都会从栈顶开始逐个销毁，
//! 因此销毁顺序完全由创建顺序决定，不需要手写一串反向的 destroy 调用。

/// 可以被 [`GfxReleaseStack`] 托管的 Vulkan 对象
pub trait GfxDestroy {
    /// 用于日志以及创建记录的名字
    fn debug_name(&self) -> String;

    /// 销毁底层的 Vulkan 对象
    fn destroy(self: Box<Self>);
}

/// 后进先出的销毁栈
#[derive(Default)]
pub struct GfxReleaseStack {
    entries: Vec<Box<dyn GfxDestroy>>,
}

impl GfxReleaseStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// 托管一个刚刚创建好的对象
    pub fn push<T: GfxDestroy + 'static>(&mut self, resource: T) {
        log::debug!("track {}", resource.debug_name());
        self.entries.push(Box::new(resource));
    }

    /// 取出需要的 handle 之后托管该对象
    ///
    /// ```ignore
    /// let vk_image = stack.track(image, GfxImage2D::handle);
    /// ```
    pub fn track<T: GfxDestroy + 'static, H>(&mut self, resource: T, handle: impl FnOnce(&T) -> H) -> H {
        let handle = handle(&resource);
        self.push(resource);
        handle
    }

    /// 按照创建顺序排列的对象名字
    pub fn creation_log(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.debug_name()).collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 从栈顶开始销毁所有对象
    pub fn release_all(&mut self) {
        while let Some(entry) = self.entries.pop() {
            log::info!("destroying {}", entry.debug_name());
            entry.destroy();
        }
    }
}

impl Drop for GfxReleaseStack {
    fn drop(&mut self) {
        self.release_all();
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    struct MockResource {
        name: &'static str,
        released: Rc<RefCell<Vec<String>>>,
    }

    impl GfxDestroy for MockResource {
        fn debug_name(&self) -> String {
            self.name.to_string()
        }

        fn destroy(self: Box<Self>) {
            self.released.borrow_mut().push(self.name.to_string());
        }
    }

    const CREATION_ORDER: [&str; 12] = [
        "instance",
        "debug-messenger",
        "device",
        "image",
        "image-memory",
        "image-view",
        "descriptor-set-layout",
        "pipeline-layout",
        "descriptor-pool",
        "command-pool",
        "fence",
        "compute-pipeline",
    ];

    fn fill(stack: &mut GfxReleaseStack, released: &Rc<RefCell<Vec<String>>>) {
        for name in CREATION_ORDER {
            stack.push(MockResource {
                name,
                released: released.clone(),
            });
        }
    }

    #[test]
    fn test_release_is_reverse_of_creation() {
        let released = Rc::new(RefCell::new(Vec::new()));
        let mut stack = GfxReleaseStack::new();
        fill(&mut stack, &released);

        let created = stack.creation_log();
        assert_eq!(created, CREATION_ORDER);

        stack.release_all();
        assert!(stack.is_empty());

        let mut expected = created;
        expected.reverse();
        assert_eq!(*released.borrow(), expected);
    }

    #[test]
    fn test_drop_releases_in_reverse() {
        let released = Rc::new(RefCell::new(Vec::new()));
        {
            let mut stack = GfxReleaseStack::new();
            fill(&mut stack, &released);
            assert_eq!(stack.len(), CREATION_ORDER.len());
        }

        let expected = CREATION_ORDER.iter().rev().map(|name| name.to_string()).collect::<Vec<_>>();
        assert_eq!(*released.borrow(), expected);
    }

    #[test]
    fn test_partial_chain_releases_only_created() {
        let released = Rc::new(RefCell::new(Vec::new()));
        {
            let mut stack = GfxReleaseStack::new();
            for name in &CREATION_ORDER[..3] {
                stack.push(MockResource {
                    name: *name,
                    released: released.clone(),
                });
            }
        }
        assert_eq!(*released.borrow(), ["device", "debug-messenger", "instance"]);
    }

    #[test]
    fn test_track_returns_handle() {
        let released = Rc::new(RefCell::new(Vec::new()));
        let mut stack = GfxReleaseStack::new();
        let name = stack.track(
            MockResource {
                name: "fence",
                released: released.clone(),
            },
            |res| res.name,
        );
        assert_eq!(name, "fence");
        assert_eq!(stack.len(), 1);
        assert!(released.borrow().is_empty());
    }
}
