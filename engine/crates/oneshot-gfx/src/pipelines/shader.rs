use std::{
    io::{Cursor, Read},
    path::Path,
    rc::Rc,
};

use ash::vk;

use crate::{
    error::{GfxError, GfxResult, vk_err},
    foundation::device::GfxDevice,
};

/// 读取 spv 文件的全部内容
///
/// 读到的字节数少于文件大小时返回 [`GfxError::ShaderTruncated`]，不会继续创建 pipeline
pub fn read_shader_code(path: &Path) -> GfxResult<Vec<u32>> {
    let shader_read_err = |source| GfxError::ShaderRead {
        path: path.to_path_buf(),
        source,
    };

    let mut file = std::fs::File::open(path).map_err(shader_read_err)?;
    let expected_len = file.metadata().map_err(shader_read_err)?.len();
    let code = read_spirv_exact(path, &mut file, expected_len)?;

    log::info!("loaded shader {:?}: {} bytes", path, expected_len);
    Ok(code)
}

/// 从 `reader` 中读取恰好 `expected_len` 个字节，并解析为 SPIR-V words
///
/// 长度不是 4 的倍数或者缺少 magic number 时返回 [`GfxError::ShaderCode`]
pub fn read_spirv_exact(path: &Path, reader: &mut impl Read, expected_len: u64) -> GfxResult<Vec<u32>> {
    let mut bytes = Vec::with_capacity(expected_len as usize);
    reader.take(expected_len).read_to_end(&mut bytes).map_err(|source| GfxError::ShaderRead {
        path: path.to_path_buf(),
        source,
    })?;

    let actual_len = bytes.len() as u64;
    if actual_len < expected_len {
        return Err(GfxError::ShaderTruncated {
            path: path.to_path_buf(),
            expected: expected_len,
            actual: actual_len,
        });
    }

    ash::util::read_spv(&mut Cursor::new(bytes)).map_err(|source| GfxError::ShaderCode {
        path: path.to_path_buf(),
        source,
    })
}

/// # Destroy
///
/// 需要手动调用 `destroy` 方法来释放资源，pipeline 创建之后就可以释放
pub struct GfxShaderModule {
    handle: vk::ShaderModule,
    gfx_device: Rc<GfxDevice>,

    destroyed: bool,
}

impl GfxShaderModule {
    pub fn new(gfx_device: Rc<GfxDevice>, code: &[u32]) -> GfxResult<Self> {
        let shader_module_info = vk::ShaderModuleCreateInfo::default().code(code);
        let handle = unsafe { gfx_device.create_shader_module(&shader_module_info, None) }
            .map_err(vk_err("create shader module"))?;

        Ok(Self {
            handle,
            gfx_device,
            destroyed: false,
        })
    }

    #[inline]
    pub fn handle(&self) -> vk::ShaderModule {
        self.handle
    }

    #[inline]
    pub fn destroy(mut self) {
        log::debug!("destroying shader module");
        unsafe {
            self.gfx_device.destroy_shader_module(self.handle, None);
        }
        self.destroyed = true;
    }
}

impl Drop for GfxShaderModule {
    fn drop(&mut self) {
        debug_assert!(self.destroyed, "GfxShaderModule must be destroyed manually before drop.");
    }
}
