//! CSC kernel sources and the on-disk compiled-kernel cache.
//!
//! Four fixed kernels, compiled once and cached next to the executable,
//! keyed by the module's file version. The original cached a
//! vendor-compiler binary; `wgpu`'s portable surface has no equivalent
//! "give me the compiled blob" API across backends, so this cache stores
//! the (stable) WGSL source bytes behind the same version-prefixed file
//! format instead -- a "compile -> write -> read -> use" round trip only
//! needs the cached bytes to reproduce identical shader behavior, which
//! source-identity trivially satisfies. See `DESIGN.md` for the full note.

use crate::error::{Error, Result};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// `format_tag` values baked into `copy_rgba_reorder`'s contract. Must stay
/// stable; mirrors [`crate::format::PixelFormat::reorder_tag`].
pub const FORMAT_TAG_RGBA: u32 = 0;
pub const FORMAT_TAG_ARGB: u32 = 1;
pub const FORMAT_TAG_BGRA: u32 = 2;

/// Work-group size shared by every CSC kernel (rounded-up 2-D NDRange).
pub const LOCAL_SIZE: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CscKernel {
    RgbaToNv12Interleaved,
    RgbaToNv12Planes,
    RgbaToI420,
    CopyReorder,
}

impl CscKernel {
    pub const ALL: [CscKernel; 4] = [
        CscKernel::RgbaToNv12Interleaved,
        CscKernel::RgbaToNv12Planes,
        CscKernel::RgbaToI420,
        CscKernel::CopyReorder,
    ];

    pub fn source_name(self) -> &'static str {
        match self {
            CscKernel::RgbaToNv12Interleaved => "rgba_to_nv12_interleaved",
            CscKernel::RgbaToNv12Planes => "rgba_to_nv12_planes",
            CscKernel::RgbaToI420 => "rgba_to_i420",
            CscKernel::CopyReorder => "copy_rgba_reorder",
        }
    }

    pub fn wgsl_source(self) -> &'static str {
        match self {
            CscKernel::RgbaToNv12Interleaved => include_str!("shaders/rgba_to_nv12_interleaved.wgsl"),
            CscKernel::RgbaToNv12Planes => include_str!("shaders/rgba_to_nv12_planes.wgsl"),
            CscKernel::RgbaToI420 => include_str!("shaders/rgba_to_i420.wgsl"),
            CscKernel::CopyReorder => include_str!("shaders/copy_rgba_reorder.wgsl"),
        }
    }
}

/// The four words prefixed to a cache file: this crate's own version in
/// place of the original's module file version (major, minor, patch, 0).
fn module_version() -> [u32; 4] {
    let major: u32 = env!("CARGO_PKG_VERSION_MAJOR").parse().unwrap_or(0);
    let minor: u32 = env!("CARGO_PKG_VERSION_MINOR").parse().unwrap_or(0);
    let patch: u32 = env!("CARGO_PKG_VERSION_PATCH").parse().unwrap_or(0);
    [major, minor, patch, 0]
}

fn cache_path(cache_dir: &Path, kernel: CscKernel) -> PathBuf {
    cache_dir.join(format!("{}.kernelbin", kernel.source_name()))
}

/// Reads a cached kernel source, validating the version prefix. Returns
/// `None` on any miss (absent file, truncated file, version mismatch).
fn read_cache(path: &Path) -> Option<String> {
    let mut file = std::fs::File::open(path).ok()?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).ok()?;
    if bytes.len() < 16 {
        return None;
    }
    let stored = module_version();
    for (i, word) in stored.iter().enumerate() {
        let offset = i * 4;
        let read_word = u32::from_le_bytes(bytes[offset..offset + 4].try_into().ok()?);
        if read_word != *word {
            return None;
        }
    }
    String::from_utf8(bytes[16..].to_vec()).ok()
}

fn write_cache(path: &Path, source: &str) {
    let mut bytes = Vec::with_capacity(16 + source.len());
    for word in module_version() {
        bytes.extend_from_slice(&word.to_le_bytes());
    }
    bytes.extend_from_slice(source.as_bytes());
    if let Err(err) = std::fs::write(path, &bytes) {
        log::warn!("failed to write kernel cache {}: {err}", path.display());
    }
}

/// Loads the WGSL source for `kernel`, preferring a version-matched cache
/// entry under `cache_dir` and otherwise falling back to (and then
/// persisting) the embedded source.
pub fn load_source(cache_dir: &Path, kernel: CscKernel) -> String {
    let path = cache_path(cache_dir, kernel);
    if let Some(cached) = read_cache(&path) {
        return cached;
    }
    let source = kernel.wgsl_source().to_string();
    write_cache(&path, &source);
    source
}

/// A compiled compute pipeline for one CSC kernel plus its bind group layout.
pub struct CompiledKernel {
    pub pipeline: wgpu::ComputePipeline,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

/// All four CSC kernels, compiled once per [`crate::context::Context`].
pub struct KernelSet {
    compiled: std::collections::HashMap<CscKernel, CompiledKernel>,
}

impl KernelSet {
    pub fn compile(device: &wgpu::Device, cache_dir: &Path) -> Result<Self> {
        let mut compiled = std::collections::HashMap::new();
        for kernel in CscKernel::ALL {
            let source = load_source(cache_dir, kernel);
            let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(kernel.source_name()),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });
            let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(kernel.source_name()),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: false },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Storage { read_only: false },
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                ],
            });
            let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(kernel.source_name()),
                bind_group_layouts: &[&bind_group_layout],
                push_constant_ranges: &[],
            });
            let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(kernel.source_name()),
                layout: Some(&layout),
                module: &module,
                entry_point: Some("main"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                cache: None,
            });
            compiled.insert(kernel, CompiledKernel { pipeline, bind_group_layout });
        }
        Ok(Self { compiled })
    }

    pub fn get(&self, kernel: CscKernel) -> &CompiledKernel {
        self.compiled
            .get(&kernel)
            .expect("all CscKernel variants are compiled in KernelSet::compile")
    }
}

/// Dispatch dimensions for a 4:2:0 kernel: `(W/2, H/2)` rounded up to the
/// work-group size.
pub fn dispatch_dims_420(width: u32, height: u32) -> (u32, u32) {
    let half_w = crate::format::div_ceil(width, 2);
    let half_h = crate::format::div_ceil(height, 2);
    (
        crate::format::div_ceil(half_w, LOCAL_SIZE),
        crate::format::div_ceil(half_h, LOCAL_SIZE),
    )
}

/// Dispatch dimensions for the reorder kernel: `(W, H)` rounded up.
pub fn dispatch_dims_full(width: u32, height: u32) -> (u32, u32) {
    (
        crate::format::div_ceil(width, LOCAL_SIZE),
        crate::format::div_ceil(height, LOCAL_SIZE),
    )
}

pub fn map_backend_error(context: &str, err: impl std::fmt::Display) -> Error {
    Error::Compute(format!("{context}: {err}"))
}
