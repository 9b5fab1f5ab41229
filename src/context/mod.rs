//! Compute context: owns the compute device, the result-buffer ring, and
//! the registered render-target slots. Device/queue setup is grounded on
//! `blade-graphics`'s native
//! `webgpu::platform::create_context` (adapter request -> device request,
//! both driven through `pollster::block_on` outside wasm).

mod backend;
mod kernels;

pub use backend::{resolve_interop, install_interop_factory, ForeignHandle, GraphicsApi, InteropBackend, InteropFactory, NoInterop};
pub use kernels::{CscKernel, FORMAT_TAG_ARGB, FORMAT_TAG_BGRA, FORMAT_TAG_RGBA};

use crate::error::{Error, Result};
use crate::format::PixelFormat;
use crate::sync::{CriticalSection, GpuEvent};
use kernels::KernelSet;
use std::path::PathBuf;
use std::sync::Arc;
use wgpu::util::DeviceExt;

/// Up to three render-target slots may be registered at once.
pub const MAX_RT: usize = 3;
/// Result buffers in the ring; one more than the diff encoder's two
/// "current"/"previous" targets so a stable previous frame always exists.
pub const NUM_RESULTS: usize = crate::sync::NUM_RESULTS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotState {
    Invalid,
    Free,
    Blocked,
}

/// Public mirror of [`SlotState`], returned by [`Context::render_target_state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RtState {
    Invalid,
    Free,
    Blocked,
}

impl From<SlotState> for RtState {
    fn from(state: SlotState) -> Self {
        match state {
            SlotState::Invalid => RtState::Invalid,
            SlotState::Free => RtState::Free,
            SlotState::Blocked => RtState::Blocked,
        }
    }
}

struct RtSlot {
    state: SlotState,
    texture: Option<Arc<wgpu::Texture>>,
    width: u32,
    height: u32,
}

impl RtSlot {
    fn empty() -> Self {
        Self {
            state: SlotState::Invalid,
            texture: None,
            width: 0,
            height: 0,
        }
    }
}

/// One entry of the result-buffer ring: a device buffer sized for the
/// encoder input, a permanently-mapped pinned host buffer of the same size,
/// and the kernel-done/DMA-done event pair.
pub struct ResultBuffer {
    device_buffer: wgpu::Buffer,
    pinned_buffer: wgpu::Buffer,
    size: u64,
    kernel_done: GpuEvent,
    dma_done: GpuEvent,
}

struct Dimensions {
    width: u32,
    height: u32,
    aligned_width: u32,
    aligned_height: u32,
}

/// Configuration fixed at context creation: which native graphics API (if
/// any) render targets will be imported from.
pub struct ContextDesc {
    pub api: GraphicsApi,
    pub async_copy: bool,
    /// Directory the compiled-kernel cache is read from/written to;
    /// typically the hosting executable's directory.
    pub kernel_cache_dir: PathBuf,
}

/// Owns the compute device, two logical queues (main, DMA -- both are the
/// same underlying `wgpu::Queue`; ordering between them is the queue's own
/// submission order, see [`crate::sync::GpuEvent`]), the CSC kernels, the
/// render-target slots, and the result-buffer ring.
pub struct Context {
    device: Arc<wgpu::Device>,
    queue: wgpu::Queue,
    interop: Box<dyn InteropBackend>,
    kernels: KernelSet,
    async_copy: bool,
    dim: CriticalSection<Option<Dimensions>>,
    rts: CriticalSection<Vec<RtSlot>>,
    results: CriticalSection<Vec<ResultBuffer>>,
    format: CriticalSection<Option<PixelFormat>>,
}

impl Context {
    /// Opens the sole GPU device (no existing-device adoption is modeled;
    /// the real SDK selects the device matching the host graphics context,
    /// which this crate cannot do generically -- see `DESIGN.md`).
    pub fn new(desc: ContextDesc, interop: Box<dyn InteropBackend>) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .map_err(|err| kernels::map_backend_error("adapter request failed", err))?;

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("rapidcap compute device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: wgpu::MemoryHints::default(),
            experimental_features: wgpu::ExperimentalFeatures::default(),
            trace: wgpu::Trace::Off,
        }))
        .map_err(|err| kernels::map_backend_error("device request failed", err))?;

        device.set_device_lost_callback(|reason, message| {
            log::error!("compute device lost: {reason:?} - {message}");
        });

        let device = Arc::new(device);
        let kernels = KernelSet::compile(&device, &desc.kernel_cache_dir)?;

        let mut rts = Vec::with_capacity(MAX_RT);
        rts.resize_with(MAX_RT, RtSlot::empty);

        Ok(Self {
            device,
            queue,
            interop,
            kernels,
            async_copy: desc.async_copy,
            dim: CriticalSection::new(None),
            rts: CriticalSection::new(rts),
            results: CriticalSection::new(Vec::new()),
            format: CriticalSection::new(None),
        })
    }

    pub fn device(&self) -> &Arc<wgpu::Device> {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Enforces that once a dimension is established (by a registration or
    /// a result-buffer build), every later one must match it exactly.
    fn validate_dimensions(&self, width: u32, height: u32) -> Result<()> {
        let mut guard = self.dim.lock();
        match guard.as_ref() {
            Some(d) if d.width != width || d.height != height => Err(Error::InvalidDimension),
            Some(_) => Ok(()),
            None => {
                *guard = Some(Dimensions {
                    width,
                    height,
                    aligned_width: crate::format::align_up(width, 16),
                    aligned_height: crate::format::align_up(height, 16),
                });
                Ok(())
            }
        }
    }

    /// Overwrites the validated dimensions, for use by a resize: every
    /// subsequent `register_image`/`register_owned_image` must match the
    /// new size, and `create_result_buffers` rebuilds against it.
    pub fn resize_dimensions(&self, width: u32, height: u32) {
        *self.dim.lock() = Some(Dimensions {
            width,
            height,
            aligned_width: crate::format::align_up(width, 16),
            aligned_height: crate::format::align_up(height, 16),
        });
    }

    /// Imports a foreign render-target handle and returns its slot index.
    pub fn register_image(&self, handle: ForeignHandle, width: u32, height: u32) -> Result<usize> {
        if handle.api != self.interop.api() {
            return Err(Error::InvalidTexture);
        }
        self.validate_dimensions(width, height)?;
        let texture = self.interop.import(handle, width, height)?;

        let mut rts = self.rts.lock();
        let idx = rts
            .iter()
            .position(|slot| slot.state == SlotState::Invalid)
            .ok_or(Error::RenderTargetFail)?;
        rts[idx] = RtSlot {
            state: SlotState::Free,
            texture: Some(texture),
            width,
            height,
        };
        Ok(idx)
    }

    /// Registers a texture the context already owns (desktop-capture
    /// framebuffers), bypassing `InteropBackend::import`.
    pub fn register_owned_image(&self, texture: Arc<wgpu::Texture>, width: u32, height: u32) -> Result<usize> {
        self.validate_dimensions(width, height)?;
        let mut rts = self.rts.lock();
        let idx = rts
            .iter()
            .position(|slot| slot.state == SlotState::Invalid)
            .ok_or(Error::RenderTargetFail)?;
        rts[idx] = RtSlot {
            state: SlotState::Free,
            texture: Some(texture),
            width,
            height,
        };
        Ok(idx)
    }

    pub fn unregister_image(&self, slot_idx: usize) -> Result<()> {
        let mut rts = self.rts.lock();
        let slot = rts.get_mut(slot_idx).ok_or(Error::InvalidIndex)?;
        *slot = RtSlot::empty();
        Ok(())
    }

    pub fn registered_count(&self) -> usize {
        self.rts.lock().iter().filter(|s| s.state != SlotState::Invalid).count()
    }

    /// Reports a render-target slot's current `{Invalid, Free, Blocked}` state.
    pub fn render_target_state(&self, slot_idx: usize) -> Result<RtState> {
        self.rts
            .lock()
            .get(slot_idx)
            .map(|slot| slot.state.into())
            .ok_or(Error::InvalidIndex)
    }

    /// Builds (or rebuilds, after a resize) the result-buffer ring for
    /// `format` at the validated `(width, height)`.
    pub fn create_result_buffers(&self, format: PixelFormat) -> Result<()> {
        let (width, height, aligned_w, aligned_h) = {
            let guard = self.dim.lock();
            let d = guard.as_ref().ok_or(Error::InvalidDimension)?;
            (d.width, d.height, d.aligned_width, d.aligned_height)
        };
        let size = format.frame_size(aligned_w, aligned_h);

        let mut results = Vec::with_capacity(NUM_RESULTS);
        for i in 0..NUM_RESULTS {
            let device_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("rapidcap result buffer"),
                size,
                usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
                mapped_at_creation: false,
            });
            let pinned_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("rapidcap pinned staging buffer"),
                size,
                usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
                mapped_at_creation: false,
            });
            results.push(ResultBuffer {
                device_buffer,
                pinned_buffer,
                size,
                kernel_done: GpuEvent::signaled(self.device.clone(), "kernel-done"),
                dma_done: GpuEvent::signaled(self.device.clone(), "dma-done"),
            });
            let _ = i;
        }

        *self.format.lock() = Some(format);
        *self.results.lock() = results;
        let _ = width;
        let _ = height;
        Ok(())
    }

    /// Runs CSC (or a plain reorder copy) from render-target slot `src`
    /// into result-buffer slot `dst`, enqueuing the kernel-done event and,
    /// if async copy is enabled, a DMA to the pinned staging buffer waiting
    /// on it.
    pub fn process_buffer(
        &self,
        src: usize,
        dst: usize,
        run_csc: bool,
        flip: bool,
        kernel: CscKernel,
        reorder_format_tag: u32,
    ) -> Result<()> {
        let rts = self.rts.lock();
        let slot = rts.get(src).ok_or(Error::InvalidIndex)?;
        if slot.state != SlotState::Free {
            return Err(Error::InvalidRenderTarget);
        }
        let texture = slot.texture.as_ref().ok_or(Error::InvalidRenderTarget)?.clone();
        drop(rts);

        self.interop.acquire(&texture)?;
        self.rts.lock()[src].state = SlotState::Blocked;

        let release = |this: &Self| {
            this.rts.lock()[src].state = SlotState::Free;
            // acquire/release is always paired, even on an error path below.
            let _ = this.interop.release(&texture);
        };

        let (width, height, aligned_w, aligned_h) = {
            let guard = self.dim.lock();
            let d = match guard.as_ref() {
                Some(d) => (d.width, d.height, d.aligned_width, d.aligned_height),
                None => {
                    release(self);
                    return Err(Error::InvalidDimension);
                }
            };
            d
        };

        let kernel_entry = self.kernels.get(kernel);
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("rapidcap csc encoder"),
        });

        let results = self.results.lock();
        let result = match results.get(dst) {
            Some(r) => r,
            None => {
                drop(results);
                release(self);
                return Err(Error::InvalidIndex);
            }
        };

        if run_csc {
            let dim_word_3 = match kernel {
                CscKernel::CopyReorder => (flip as u32) | (reorder_format_tag << 8),
                _ => aligned_h,
            };
            let dim_data: [u32; 4] = [width, height, aligned_w, dim_word_3];
            let dim_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("rapidcap csc dim uniform"),
                contents: bytemuck::cast_slice(&dim_data),
                usage: wgpu::BufferUsages::UNIFORM,
            });
            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(kernel.source_name()),
                layout: &kernel_entry.bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: result.device_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: dim_buffer.as_entire_binding(),
                    },
                ],
            });

            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("rapidcap csc pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&kernel_entry.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            let (gx, gy) = match kernel {
                CscKernel::CopyReorder => kernels::dispatch_dims_full(width, height),
                _ => kernels::dispatch_dims_420(width, height),
            };
            pass.dispatch_workgroups(gx, gy, 1);
            drop(pass);
        } else {
            let bytes_per_row = aligned_w * 4;
            encoder.copy_texture_to_buffer(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                wgpu::TexelCopyBufferInfo {
                    buffer: &result.device_buffer,
                    layout: wgpu::TexelCopyBufferLayout {
                        offset: 0,
                        bytes_per_row: Some(bytes_per_row),
                        rows_per_image: Some(aligned_h),
                    },
                },
                wgpu::Extent3d {
                    width: aligned_w,
                    height: aligned_h,
                    depth_or_array_layers: 1,
                },
            );
        }

        if self.async_copy {
            encoder.copy_buffer_to_buffer(&result.device_buffer, 0, &result.pinned_buffer, 0, result.size);
        }
        let submission = self.queue.submit(Some(encoder.finish()));
        drop(results);

        let mut results = self.results.lock();
        if let Some(result) = results.get_mut(dst) {
            result.kernel_done = GpuEvent::new(self.device.clone(), "kernel-done", submission.clone());
            result.dma_done = if self.async_copy {
                GpuEvent::new(self.device.clone(), "dma-done", submission)
            } else {
                GpuEvent::signaled(self.device.clone(), "dma-done")
            };
        }
        drop(results);

        release(self);
        Ok(())
    }

    /// Waits on the DMA-done event for `dst`, releases the kernel-done
    /// event without waiting (DMA strictly depends on it finishing first),
    /// and returns the pinned buffer's bytes. If async copy is disabled,
    /// performs a synchronous device-to-pinned copy and drains the queue
    /// first.
    pub fn host_bytes(&self, dst: usize) -> Result<Vec<u8>> {
        let size = {
            let mut results = self.results.lock();
            let result = results.get_mut(dst).ok_or(Error::InvalidIndex)?;
            if !self.async_copy {
                let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("rapidcap sync readback encoder"),
                });
                encoder.copy_buffer_to_buffer(&result.device_buffer, 0, &result.pinned_buffer, 0, result.size);
                let submission = self.queue.submit(Some(encoder.finish()));
                let _ = self.device.poll(wgpu::PollType::WaitForSubmissionIndex(submission));
            } else {
                result.dma_done.wait();
            }
            result.kernel_done.release();
            result.size
        };

        let results = self.results.lock();
        let result = results.get(dst).ok_or(Error::InvalidIndex)?;
        let slice = result.pinned_buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |res| {
            let _ = tx.send(res);
        });
        let _ = self.device.poll(wgpu::PollType::Wait);
        rx.recv()
            .map_err(|err| kernels::map_backend_error("map_async channel closed", err))?
            .map_err(|err| kernels::map_backend_error("buffer map failed", err))?;
        let data = slice.get_mapped_range().to_vec();
        result.pinned_buffer.unmap();
        debug_assert_eq!(data.len() as u64, size);
        Ok(data)
    }

    /// Runs `f` with the device buffers backing result slots `a` and `b`.
    /// Used by the difference encoder to bind the current/previous
    /// post-CSC result buffers as kernel inputs without exposing the
    /// result ring's internal locking (fetched under a single lock since
    /// `CriticalSection` is not reentrant).
    pub fn with_result_device_buffers<R>(
        &self,
        a: usize,
        b: usize,
        f: impl FnOnce(&wgpu::Buffer, &wgpu::Buffer) -> R,
    ) -> Result<R> {
        let results = self.results.lock();
        let buf_a = &results.get(a).ok_or(Error::InvalidIndex)?.device_buffer;
        let buf_b = &results.get(b).ok_or(Error::InvalidIndex)?.device_buffer;
        Ok(f(buf_a, buf_b))
    }

    pub fn result_count(&self) -> usize {
        self.results.lock().len()
    }

    /// Runs `f` with the render-target textures backing slots `a` and `b`,
    /// for diffing registered input images directly without running CSC.
    pub fn with_rt_textures<R>(&self, a: usize, b: usize, f: impl FnOnce(&wgpu::Texture, &wgpu::Texture) -> R) -> Result<R> {
        let rts = self.rts.lock();
        let tex_a = rts.get(a).and_then(|slot| slot.texture.as_ref()).ok_or(Error::InvalidIndex)?;
        let tex_b = rts.get(b).and_then(|slot| slot.texture.as_ref()).ok_or(Error::InvalidIndex)?;
        Ok(f(tex_a, tex_b))
    }
}
