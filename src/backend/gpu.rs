use std::sync::OnceLock;

use wgpu::util::DeviceExt as _;

use crate::{
    backend::{BackendOpts, SynthBackend, build_thread_pool},
    foundation::error::{SynthError, SynthResult},
    job::{SynthOutput, SynthesisJob},
    raster::channels::CompactImage,
    synth::{
        run_pyramid,
        vote::{VoteInput, Voter},
    },
};

const VOTE_SHADER: &str = include_str!("vote.wgsl");
const WORKGROUP_SIZE: u32 = 8;
/// Must match `MAX_CHANNELS` in the shader.
const MAX_VOTE_CHANNELS: usize = 8;

/// Whether a wgpu adapter can be acquired. Probed once per process.
pub(crate) fn probe_available() -> bool {
    static PROBE: OnceLock<bool> = OnceLock::new();
    *PROBE.get_or_init(|| match request_adapter() {
        Ok(adapter) => {
            tracing::debug!(adapter = ?adapter.get_info().name, "gpu adapter found");
            true
        }
        Err(e) => {
            tracing::debug!(error = %e, "gpu adapter probe failed");
            false
        }
    })
}

fn request_adapter() -> SynthResult<wgpu::Adapter> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
    pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::HighPerformance,
        compatible_surface: None,
        force_fallback_adapter: false,
    }))
    .map_err(|e| match e {
        wgpu::RequestAdapterError::NotFound { .. } => {
            SynthError::backend("no gpu adapter available")
        }
        other => SynthError::backend(format!("wgpu request_adapter failed: {other:?}")),
    })
}

/// Device, queue and the compiled vote pipeline.
struct GpuContext {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
}

impl GpuContext {
    fn new() -> SynthResult<Self> {
        let adapter = request_adapter()?;
        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("patchsynth_device"),
            required_features: wgpu::Features::empty(),
            required_limits: adapter.limits(),
            experimental_features: wgpu::ExperimentalFeatures::default(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        }))
        .map_err(|e| SynthError::backend(format!("wgpu request_device failed: {e:?}")))?;

        let storage = |binding: u32, read_only: bool| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("patchsynth_vote_bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                storage(1, true),
                storage(2, true),
                storage(3, true),
                storage(4, false),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("patchsynth_vote_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("patchsynth_vote_shader"),
            source: wgpu::ShaderSource::Wgsl(VOTE_SHADER.into()),
        });
        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("patchsynth_vote_pipeline"),
            layout: Some(&pipeline_layout),
            module: &module,
            entry_point: Some("vote"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });

        Ok(Self {
            device,
            queue,
            pipeline,
            bind_group_layout,
        })
    }
}

/// GPU backend: PatchMatch search stays on the host pool, votes run as a compute shader.
pub struct GpuBackend {
    opts: BackendOpts,
    pool: rayon::ThreadPool,
    context: GpuContext,
}

impl GpuBackend {
    pub fn new(opts: BackendOpts) -> SynthResult<Self> {
        let pool = build_thread_pool(opts.threads)?;
        let context = GpuContext::new()?;
        Ok(Self {
            opts,
            pool,
            context,
        })
    }
}

impl SynthBackend for GpuBackend {
    #[tracing::instrument(
        level = "debug",
        name = "gpu_backend_run",
        skip_all,
        fields(levels = job.num_pyramid_levels())
    )]
    fn run(&self, job: &SynthesisJob, output: &mut SynthOutput) -> SynthResult<()> {
        if job.style_channels() > MAX_VOTE_CHANNELS {
            return Err(SynthError::backend(format!(
                "the gpu vote kernel handles at most {MAX_VOTE_CHANNELS} style channels, job has {}",
                job.style_channels()
            )));
        }
        let mut voter = GpuVoter {
            context: &self.context,
        };
        self.pool
            .install(|| run_pyramid(job, &mut voter, self.opts.seed, output))
    }
}

struct GpuVoter<'a> {
    context: &'a GpuContext,
}

impl Voter for GpuVoter<'_> {
    fn vote(&mut self, input: &VoteInput<'_>) -> SynthResult<CompactImage> {
        let ctx = self.context;
        let (tw, th) = (input.nnf.width(), input.nnf.height());
        let (sw, sh) = input.source_style.dimensions();
        let c = input.source_style.channels();
        let pixels = tw as usize * th as usize;

        let params: [u32; 8] = [tw, th, sw, sh, c as u32, input.patch_size / 2, 0, 0];
        let source: Vec<u32> = input
            .source_style
            .as_bytes()
            .iter()
            .map(|&v| u32::from(v))
            .collect();
        let weights: Vec<f32> = (0..pixels).map(|i| input.patch_weight(i)).collect();

        let init = |label: &str, contents: &[u8], usage: wgpu::BufferUsages| {
            ctx.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(label),
                    contents,
                    usage,
                })
        };
        let params_buf = init(
            "patchsynth_vote_params",
            bytemuck::cast_slice(&params),
            wgpu::BufferUsages::UNIFORM,
        );
        let source_buf = init(
            "patchsynth_vote_source",
            bytemuck::cast_slice(&source),
            wgpu::BufferUsages::STORAGE,
        );
        let nnf_buf = init(
            "patchsynth_vote_nnf",
            bytemuck::cast_slice(input.nnf.as_slice()),
            wgpu::BufferUsages::STORAGE,
        );
        let weights_buf = init(
            "patchsynth_vote_weights",
            bytemuck::cast_slice(&weights),
            wgpu::BufferUsages::STORAGE,
        );

        let out_size = (pixels * c * std::mem::size_of::<u32>()) as u64;
        let out_buf = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("patchsynth_vote_out"),
            size: out_size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let readback = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("patchsynth_vote_readback"),
            size: out_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("patchsynth_vote_bg"),
            layout: &ctx.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: params_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: source_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: nnf_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: weights_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: out_buf.as_entire_binding(),
                },
            ],
        });

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("patchsynth_vote_encoder"),
            });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("patchsynth_vote_pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&ctx.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(tw.div_ceil(WORKGROUP_SIZE), th.div_ceil(WORKGROUP_SIZE), 1);
        }
        encoder.copy_buffer_to_buffer(&out_buf, 0, &readback, 0, out_size);
        ctx.queue.submit(Some(encoder.finish()));

        let slice = readback.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |res| {
            let _ = tx.send(res);
        });
        ctx.device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|e| SynthError::backend(format!("wgpu poll failed: {e:?}")))?;
        rx.recv()
            .map_err(|_| SynthError::backend("readback channel closed"))?
            .map_err(|e| SynthError::backend(format!("readback map failed: {e:?}")))?;

        let data: Vec<u8> = {
            let mapped = slice.get_mapped_range();
            bytemuck::cast_slice::<u8, u32>(&mapped)
                .iter()
                .map(|&v| v.min(255) as u8)
                .collect()
        };
        readback.unmap();

        tracing::trace!(width = tw, height = th, channels = c, "gpu vote done");
        CompactImage::new(tw, th, c, data)
    }
}
