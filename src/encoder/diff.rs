//! Tiled difference-map encoder: a byte-per-tile bitmap where a tile is
//! `1` iff any pixel in it changed
//! since the previous frame, with a two-buffer "previous frame" retention
//! invariant and a bounded FIFO of ready diff targets.

use crate::context::Context;
use crate::error::{Error, Result};
use crate::format::{div_ceil, PixelFormat};
use crate::param::{ParamState, Value};
use crate::sync::{BoundedFifo, CriticalSection, GpuEvent};
use std::sync::Arc;
use wgpu::util::DeviceExt;

use super::{Codec, EncodedFrame, Encoder};

/// Number of internal diff targets: one fewer than the result-buffer ring
/// so a stable previous frame is always available while the current encode
/// writes a fresh one.
pub const NUM_DIFF_TARGETS: usize = crate::context::NUM_RESULTS - 1;
/// `encode` gives up and returns `QueueFull` after this many busy-wait spins.
const SPIN_LIMIT: u32 = 100;

struct DiffTarget {
    device_buffer: wgpu::Buffer,
    pinned_buffer: wgpu::Buffer,
    size: u64,
    kernel_done: GpuEvent,
    dma_done: GpuEvent,
}

pub struct DifferenceEncoder {
    context: Arc<Context>,
    width: u32,
    height: u32,
    block_s: u32,
    block_t: u32,
    lock_mapped_buffer: bool,
    targets: Vec<DiffTarget>,
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    image_pipeline: wgpu::ComputePipeline,
    image_bind_group_layout: wgpu::BindGroupLayout,
    /// Result-buffer index the diff encoder last wrote from.
    current: usize,
    /// Result-buffer index considered the "previous frame".
    previous: usize,
    /// Render-target slot compared as "previous frame" when diffing input
    /// images directly; `None` until the first `encode` call.
    previous_src: Option<usize>,
    /// Round-robin index into `targets` for the next write.
    next_target: usize,
    ready: BoundedFifo,
    /// Target index currently held by a reader (returned by the most
    /// recent `get_encoded_frame` and not yet superseded).
    mapped: CriticalSection<Option<usize>>,
}

fn compile_diff_buffer_pipeline(device: &wgpu::Device) -> (wgpu::ComputePipeline, wgpu::BindGroupLayout) {
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("diff_buffer"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shaders/diff_buffer.wgsl").into()),
    });
    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("diff_buffer"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: true },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: true },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: false },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 3,
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
        label: Some("diff_buffer"),
        bind_group_layouts: &[&bind_group_layout],
        push_constant_ranges: &[],
    });
    let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some("diff_buffer"),
        layout: Some(&layout),
        module: &module,
        entry_point: Some("main"),
        compilation_options: wgpu::PipelineCompilationOptions::default(),
        cache: None,
    });
    (pipeline, bind_group_layout)
}

fn compile_diff_image_pipeline(device: &wgpu::Device) -> (wgpu::ComputePipeline, wgpu::BindGroupLayout) {
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("diff_image"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shaders/diff_image.wgsl").into()),
    });
    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("diff_image"),
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
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: false },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: false },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 3,
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
        label: Some("diff_image"),
        bind_group_layouts: &[&bind_group_layout],
        push_constant_ranges: &[],
    });
    let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some("diff_image"),
        layout: Some(&layout),
        module: &module,
        entry_point: Some("main"),
        compilation_options: wgpu::PipelineCompilationOptions::default(),
        cache: None,
    });
    (pipeline, bind_group_layout)
}

impl DifferenceEncoder {
    pub fn new(context: Arc<Context>, width: u32, height: u32) -> Result<Self> {
        let (pipeline, bind_group_layout) = compile_diff_buffer_pipeline(context.device());
        let (image_pipeline, image_bind_group_layout) = compile_diff_image_pipeline(context.device());
        let mut encoder = Self {
            context,
            width,
            height,
            block_s: 16,
            block_t: 16,
            lock_mapped_buffer: false,
            targets: Vec::new(),
            pipeline,
            bind_group_layout,
            image_pipeline,
            image_bind_group_layout,
            current: 0,
            // One ahead of the initial `current` so the first diff shows
            // change on every tile, per the first-frame saturation rule.
            previous: NUM_DIFF_TARGETS,
            previous_src: None,
            next_target: 0,
            ready: BoundedFifo::new(NUM_DIFF_TARGETS),
            mapped: CriticalSection::new(None),
        };
        encoder.rebuild_targets()?;
        Ok(encoder)
    }

    fn tiles(&self) -> (u32, u32) {
        (div_ceil(self.width, self.block_s), div_ceil(self.height, self.block_t))
    }

    fn rebuild_targets(&mut self) -> Result<()> {
        let (tiles_x, tiles_y) = self.tiles();
        // Wire/host size: exactly one byte per tile. The shader packs four
        // tiles into each `u32` word, so the device-side buffer needs
        // rounding up to a whole number of words; the pinned buffer and the
        // device->pinned copy stay at the unrounded byte-per-tile size so
        // callers never see the word padding.
        let size = (tiles_x as u64) * (tiles_y as u64);
        let device_size = (size + 3) / 4 * 4;
        let device = self.context.device();
        let mut targets = Vec::with_capacity(NUM_DIFF_TARGETS);
        for _ in 0..NUM_DIFF_TARGETS {
            let device_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("rapidcap diff target"),
                size: device_size.max(4),
                usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
                mapped_at_creation: false,
            });
            let pinned_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("rapidcap diff target pinned"),
                size: size.max(4),
                usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
                mapped_at_creation: false,
            });
            targets.push(DiffTarget {
                device_buffer,
                pinned_buffer,
                size,
                kernel_done: GpuEvent::signaled(device.clone(), "diff-kernel-done"),
                dma_done: GpuEvent::signaled(device.clone(), "diff-dma-done"),
            });
        }
        self.targets = targets;
        self.ready = BoundedFifo::new(NUM_DIFF_TARGETS);
        self.next_target = 0;
        *self.mapped.lock() = None;
        Ok(())
    }

    /// `block_s` x `block_t` tile size; must be multiples of 8 with a
    /// positive area. Rebuilds the diff targets at the new tile grid.
    pub fn set_block_size(&mut self, block_s: u32, block_t: u32) -> Result<()> {
        if block_s == 0 || block_t == 0 || block_s % 8 != 0 || block_t % 8 != 0 {
            return Err(Error::InvalidConfig);
        }
        self.block_s = block_s;
        self.block_t = block_t;
        self.rebuild_targets()
    }

    pub fn set_lock_mapped_buffer(&mut self, lock: bool) {
        self.lock_mapped_buffer = lock;
    }
}

impl Encoder for DifferenceEncoder {
    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.width = width;
        self.height = height;
        self.previous = NUM_DIFF_TARGETS;
        self.current = 0;
        self.previous_src = None;
        self.rebuild_targets()
    }

    fn encode(&mut self, src_idx: usize, use_input_image: bool) -> Result<()> {
        let mut spins = 0;
        loop {
            let blocked_by_reader = self.lock_mapped_buffer
                && *self.mapped.lock() == Some(self.next_target);
            let blocked_by_fifo = self.ready.is_full();
            if !blocked_by_reader && !blocked_by_fifo {
                break;
            }
            spins += 1;
            if spins >= SPIN_LIMIT {
                return Err(Error::QueueFull);
            }
            std::thread::yield_now();
        }

        self.current = src_idx;
        let target_idx = self.next_target;
        let (tiles_x, tiles_y) = self.tiles();

        let device = self.context.device();
        let params: [u32; 4] = if use_input_image {
            [tiles_x, 0, self.block_s, self.block_t]
        } else {
            [crate::format::align_up(self.width, 16) / 4, tiles_x, self.block_s, self.block_t]
        };
        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("rapidcap diff params"),
            contents: bytemuck::cast_slice(&params),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let mut cmd = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("rapidcap diff encoder"),
        });

        // The very first frame through the image-diff path has no previous
        // texture to compare against yet: mark every tile changed directly
        // instead of dispatching a kernel, mirroring the buffer path's
        // first-frame saturation (see `previous: NUM_DIFF_TARGETS` above).
        if use_input_image && self.previous_src.is_none() {
            let target = &self.targets[target_idx];
            let ones = vec![0xffu8; target.size.max(1) as usize];
            self.context.queue().write_buffer(&target.device_buffer, 0, &ones);
            cmd.copy_buffer_to_buffer(&target.device_buffer, 0, &target.pinned_buffer, 0, target.size.max(4));
        } else if use_input_image {
            let previous_src = self.previous_src.expect("checked above");
            // Two-buffer invariant: `previous_src` is never the slot the
            // current encode is about to overwrite.
            debug_assert_ne!(previous_src, self.current);
            let bind_group = self.context.with_rt_textures(self.current, previous_src, |current_tex, previous_tex| {
                let current_view = current_tex.create_view(&wgpu::TextureViewDescriptor::default());
                let previous_view = previous_tex.create_view(&wgpu::TextureViewDescriptor::default());
                let target = &self.targets[target_idx];
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("diff_image"),
                    layout: &self.image_bind_group_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(&current_view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::TextureView(&previous_view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: target.device_buffer.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 3,
                            resource: params_buffer.as_entire_binding(),
                        },
                    ],
                })
            })?;
            {
                let mut pass = cmd.begin_compute_pass(&wgpu::ComputePassDescriptor {
                    label: Some("rapidcap diff pass"),
                    timestamp_writes: None,
                });
                pass.set_pipeline(&self.image_pipeline);
                pass.set_bind_group(0, &bind_group, &[]);
                pass.dispatch_workgroups(tiles_x, tiles_y, 1);
            }
            let target = &self.targets[target_idx];
            cmd.copy_buffer_to_buffer(&target.device_buffer, 0, &target.pinned_buffer, 0, target.size.max(4));
        } else {
            // Two-buffer invariant: `previous` is never the buffer the current
            // encode is about to overwrite.
            debug_assert_ne!(self.previous, self.current);
            let bind_group = self.context.with_result_device_buffers(self.current, self.previous, |current_buf, previous_buf| {
                let target = &self.targets[target_idx];
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("diff_buffer"),
                    layout: &self.bind_group_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: current_buf.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: previous_buf.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: target.device_buffer.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 3,
                            resource: params_buffer.as_entire_binding(),
                        },
                    ],
                })
            })?;
            {
                let mut pass = cmd.begin_compute_pass(&wgpu::ComputePassDescriptor {
                    label: Some("rapidcap diff pass"),
                    timestamp_writes: None,
                });
                pass.set_pipeline(&self.pipeline);
                pass.set_bind_group(0, &bind_group, &[]);
                pass.dispatch_workgroups(tiles_x, tiles_y, 1);
            }
            let target = &self.targets[target_idx];
            cmd.copy_buffer_to_buffer(&target.device_buffer, 0, &target.pinned_buffer, 0, target.size.max(4));
        }

        let submission = self.context.queue().submit(Some(cmd.finish()));

        let target = &mut self.targets[target_idx];
        target.kernel_done = GpuEvent::new(device.clone(), "diff-kernel-done", submission.clone());
        target.dma_done = GpuEvent::new(device.clone(), "diff-dma-done", submission);

        self.ready.push(target_idx).map_err(|_| Error::QueueFull)?;
        self.next_target = (self.next_target + 1) % NUM_DIFF_TARGETS;
        self.previous = self.current;
        self.previous_src = Some(src_idx);
        Ok(())
    }

    fn get_encoded_frame(&mut self) -> Result<EncodedFrame> {
        let target_idx = self.ready.pop().ok_or(Error::NoEncodedFrame)?;
        let target = &mut self.targets[target_idx];
        target.dma_done.wait();
        target.kernel_done.release();

        let slice = target.pinned_buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |res| {
            let _ = tx.send(res);
        });
        let _ = self.context.device().poll(wgpu::PollType::Wait);
        rx.recv()
            .map_err(|err| Error::Compute(err.to_string()))?
            .map_err(|err| Error::Compute(err.to_string()))?;
        let data = slice.get_mapped_range().to_vec();
        target.pinned_buffer.unmap();

        *self.mapped.lock() = Some(target_idx);
        Ok(EncodedFrame { data })
    }

    fn set_parameter(&mut self, name: u32, value: Value) -> Result<()> {
        match name {
            crate::ffi::properties::DIFF_BLOCK_S => {
                let s = value.as_u32().ok_or(Error::InvalidEncoderParameter)?;
                self.set_block_size(s, self.block_t)
            }
            crate::ffi::properties::DIFF_BLOCK_T => {
                let t = value.as_u32().ok_or(Error::InvalidEncoderParameter)?;
                self.set_block_size(self.block_s, t)
            }
            crate::ffi::properties::DIFF_LOCK_BUFFER => {
                let lock = value.as_bool().ok_or(Error::InvalidEncoderParameter)?;
                self.set_lock_mapped_buffer(lock);
                Ok(())
            }
            _ => Err(Error::InvalidEncoderParameter),
        }
    }

    fn get_parameter(&self, name: u32, _codec: Codec) -> Result<(Value, ParamState)> {
        match name {
            crate::ffi::properties::DIFF_BLOCK_S => Ok((Value::UInt(self.block_s), ParamState::Ready)),
            crate::ffi::properties::DIFF_BLOCK_T => Ok((Value::UInt(self.block_t), ParamState::Ready)),
            crate::ffi::properties::DIFF_LOCK_BUFFER => {
                Ok((Value::Bool(self.lock_mapped_buffer), ParamState::Ready))
            }
            _ => Err(Error::InvalidEncoderParameter),
        }
    }

    fn is_format_supported(&self, format: PixelFormat) -> bool {
        matches!(
            format,
            PixelFormat::Rgba8 | PixelFormat::Argb8 | PixelFormat::Bgra8 | PixelFormat::Nv12
        )
    }

    fn is_resize_supported(&self) -> bool {
        true
    }

    fn preferred_format(&self) -> PixelFormat {
        PixelFormat::Rgba8
    }

    fn preferred_codec(&self) -> Codec {
        Codec::None
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}
