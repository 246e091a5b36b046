mod helpers;

use backdrop_core::{
    twinkle_scale, Frame, LineVertex, RenderError, SceneAssets, SceneRenderer, MSAA_SAMPLES,
    SCENE_WGSL,
};
use helpers::{create_attachment, linear_rgb, make_scene_pipeline, uniform_stride, DEPTH_FORMAT};
use std::num::NonZeroU64;
use web_sys as web;
use wgpu::util::DeviceExt;

const MAX_LIGHTS: usize = 4;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct GlobalsUniform {
    view: [[f32; 4]; 4],
    proj: [[f32; 4]; 4],
    ambient: [f32; 4],
    light_pos: [[f32; 4]; MAX_LIGHTS],
    light_color: [[f32; 4]; MAX_LIGHTS],
    // light count, width px, height px, time
    params: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct DrawUniform {
    model: [[f32; 4]; 4],
    color: [f32; 4],
    params: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct PointInstance {
    center: [f32; 3],
    size: f32,
    color: [f32; 4],
}

const QUAD_CORNERS: [[f32; 2]; 6] = [
    [-0.5, -0.5],
    [0.5, -0.5],
    [0.5, 0.5],
    [-0.5, -0.5],
    [0.5, 0.5],
    [-0.5, 0.5],
];

const LINE_ATTRS: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];
const CORNER_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];
const INSTANCE_ATTRS: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![1 => Float32x3, 2 => Float32, 3 => Float32x4];

struct ShapeBuffers {
    vertices: wgpu::Buffer,
    count: u32,
    color: [f32; 4],
    emissive: f32,
}

struct PointBuffers {
    instances: wgpu::Buffer,
    count: u32,
    tint: [f32; 4],
}

/// Per-scene GPU resources created by `upload`.
struct Uploaded {
    shapes: Vec<ShapeBuffers>,
    stars: PointBuffers,
    star_fade: bool,
    particles: PointBuffers,
    draw_buffer: wgpu::Buffer,
    draw_bind_group: wgpu::BindGroup,
    staging: Vec<u8>,
}

impl Uploaded {
    fn star_slot(&self) -> usize {
        self.shapes.len()
    }
    fn particle_slot(&self) -> usize {
        self.shapes.len() + 1
    }
}

pub struct WebRenderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    view_format: wgpu::TextureFormat,
    line_pipeline: wgpu::RenderPipeline,
    point_pipeline: wgpu::RenderPipeline,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    draw_bgl: wgpu::BindGroupLayout,
    quad_buffer: wgpu::Buffer,
    _msaa_tex: wgpu::Texture,
    msaa_view: wgpu::TextureView,
    _depth_tex: wgpu::Texture,
    depth_view: wgpu::TextureView,
    stride: u64,
    clear_color: wgpu::Color,
    uploaded: Option<Uploaded>,
}

fn instance_buffer(device: &wgpu::Device, label: &str, data: &[PointInstance]) -> wgpu::Buffer {
    let fallback = [<PointInstance as bytemuck::Zeroable>::zeroed()];
    let contents = if data.is_empty() { &fallback[..] } else { data };
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(contents),
        usage: wgpu::BufferUsages::VERTEX,
    })
}

fn rgba(rgb: [f32; 3], a: f32) -> [f32; 4] {
    [rgb[0], rgb[1], rgb[2], a]
}

impl WebRenderer {
    pub async fn new(canvas: web::HtmlCanvasElement) -> Result<Self, RenderError> {
        let width = canvas.width().max(1);
        let height = canvas.height().max(1);

        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas))
            .map_err(|e| RenderError::Context(e.to_string()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| RenderError::Context("no WebGPU adapter".into()))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    // Use default limits on web to avoid passing unknown fields to older WebGPU impls
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| RenderError::Context(format!("request_device error: {e:?}")))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| {
                matches!(
                    f,
                    wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Rgba8Unorm
                )
            })
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| RenderError::Context("surface reports no formats".into()))?;
        // Canvas formats are linear; render through an sRGB view.
        let view_format = format.add_srgb_suffix();
        let alpha_mode = if caps
            .alpha_modes
            .contains(&wgpu::CompositeAlphaMode::PreMultiplied)
        {
            wgpu::CompositeAlphaMode::PreMultiplied
        } else {
            log::warn!("[render] premultiplied canvas alpha unavailable; backdrop will be opaque");
            caps.alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto)
        };
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: if view_format != format {
                vec![view_format]
            } else {
                vec![]
            },
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(SCENE_WGSL.into()),
        });
        let globals_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals_bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(std::mem::size_of::<GlobalsUniform>() as u64),
                },
                count: None,
            }],
        });
        let draw_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("draw_bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(std::mem::size_of::<DrawUniform>() as u64),
                },
                count: None,
            }],
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pl"),
            bind_group_layouts: &[&globals_bgl, &draw_bgl],
            push_constant_ranges: &[],
        });

        let line_pipeline = make_scene_pipeline(
            &device,
            "line_pipeline",
            &layout,
            &shader,
            ("vs_line", "fs_line"),
            &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<LineVertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &LINE_ATTRS,
            }],
            wgpu::PrimitiveTopology::LineList,
            view_format,
            true,
        );
        let point_pipeline = make_scene_pipeline(
            &device,
            "point_pipeline",
            &layout,
            &shader,
            ("vs_point", "fs_point"),
            &[
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<[f32; 2]>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &CORNER_ATTRS,
                },
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<PointInstance>() as u64,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &INSTANCE_ATTRS,
                },
            ],
            wgpu::PrimitiveTopology::TriangleList,
            view_format,
            false,
        );

        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("globals"),
            size: std::mem::size_of::<GlobalsUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals_bg"),
            layout: &globals_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });
        let quad_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad_corners"),
            contents: bytemuck::cast_slice(&QUAD_CORNERS),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let (msaa_tex, msaa_view) =
            create_attachment(&device, "msaa_color", width, height, view_format, MSAA_SAMPLES);
        let (depth_tex, depth_view) =
            create_attachment(&device, "depth", width, height, DEPTH_FORMAT, MSAA_SAMPLES);
        let stride = uniform_stride(
            std::mem::size_of::<DrawUniform>() as u64,
            device.limits().min_uniform_buffer_offset_alignment,
        );
        log::info!("[render] WebGPU ready {width}x{height} format={view_format:?} alpha={alpha_mode:?}");

        Ok(Self {
            surface,
            device,
            queue,
            config,
            view_format,
            line_pipeline,
            point_pipeline,
            globals_buffer,
            globals_bind_group,
            draw_bgl,
            quad_buffer,
            _msaa_tex: msaa_tex,
            msaa_view,
            _depth_tex: depth_tex,
            depth_view,
            stride,
            clear_color: wgpu::Color::TRANSPARENT,
            uploaded: None,
        })
    }

    fn globals(&self, frame: &Frame) -> GlobalsUniform {
        let lights = &frame.lights;
        let ambient = linear_rgb(lights.ambient.color_rgb).map(|c| c * lights.ambient.intensity);
        let mut light_pos = [[0.0; 4]; MAX_LIGHTS];
        let mut light_color = [[0.0; 4]; MAX_LIGHTS];
        let count = lights.points.len().min(MAX_LIGHTS);
        for (i, light) in lights.points.iter().take(MAX_LIGHTS).enumerate() {
            light_pos[i] = light.position.extend(light.intensity).to_array();
            light_color[i] = rgba(linear_rgb(light.color_rgb), 1.0);
        }
        GlobalsUniform {
            view: frame.camera.view_matrix().to_cols_array_2d(),
            proj: frame.camera.projection_matrix().to_cols_array_2d(),
            ambient: rgba(ambient, 1.0),
            light_pos,
            light_color,
            params: [
                count as f32,
                self.config.width as f32,
                self.config.height as f32,
                frame.time.elapsed,
            ],
        }
    }

    fn release_uploaded(&mut self) {
        if let Some(up) = self.uploaded.take() {
            for shape in &up.shapes {
                shape.vertices.destroy();
            }
            up.stars.instances.destroy();
            up.particles.instances.destroy();
            up.draw_buffer.destroy();
        }
    }
}

impl SceneRenderer for WebRenderer {
    fn upload(&mut self, assets: &SceneAssets) -> Result<(), RenderError> {
        self.release_uploaded();

        let shapes: Vec<ShapeBuffers> = assets
            .shapes
            .iter()
            .map(|asset| {
                let vertices = asset.geometry.line_vertices();
                ShapeBuffers {
                    vertices: self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(&format!("shape_{}_{}", asset.object_id, asset.kind)),
                        contents: bytemuck::cast_slice(&vertices),
                        usage: wgpu::BufferUsages::VERTEX,
                    }),
                    count: vertices.len() as u32,
                    color: rgba(linear_rgb(asset.color_rgb), asset.opacity),
                    emissive: asset.emissive_intensity,
                }
            })
            .collect();

        let particle_config = assets.particles.config();
        let particle_color = rgba(linear_rgb(particle_config.color_rgb), 1.0);
        let particle_data: Vec<PointInstance> = assets
            .particles
            .positions()
            .iter()
            .map(|p| PointInstance {
                center: p.to_array(),
                size: particle_config.size,
                color: particle_color,
            })
            .collect();
        let star_data: Vec<PointInstance> = assets
            .stars
            .stars()
            .iter()
            .map(|s| PointInstance {
                center: s.position.to_array(),
                size: s.size,
                color: rgba(linear_rgb(s.color_rgb), 1.0),
            })
            .collect();

        let slots = (shapes.len() + 2) as u64;
        let draw_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("draw_uniforms"),
            size: self.stride * slots,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let draw_bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("draw_bg"),
            layout: &self.draw_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &draw_buffer,
                    offset: 0,
                    size: NonZeroU64::new(std::mem::size_of::<DrawUniform>() as u64),
                }),
            }],
        });

        log::info!(
            "[render] uploaded shapes={} particles={} stars={}",
            shapes.len(),
            particle_data.len(),
            star_data.len()
        );
        self.uploaded = Some(Uploaded {
            shapes,
            stars: PointBuffers {
                instances: instance_buffer(&self.device, "stars", &star_data),
                count: star_data.len() as u32,
                tint: [1.0; 4],
            },
            star_fade: assets.stars.config().fade,
            particles: PointBuffers {
                instances: instance_buffer(&self.device, "particles", &particle_data),
                count: particle_data.len() as u32,
                tint: [1.0, 1.0, 1.0, particle_config.opacity],
            },
            draw_buffer,
            draw_bind_group,
            staging: vec![0; (self.stride * slots) as usize],
        });
        Ok(())
    }

    fn draw(&mut self, frame: &Frame) -> Result<(), RenderError> {
        let globals = self.globals(frame);
        let stride = self.stride as usize;
        let Some(up) = self.uploaded.as_mut() else {
            return Err(RenderError::Other("draw before upload".into()));
        };

        let star_slot = up.star_slot();
        let particle_slot = up.particle_slot();
        let mut put = |slot: usize, u: DrawUniform| {
            let at = slot * stride;
            up.staging[at..at + std::mem::size_of::<DrawUniform>()]
                .copy_from_slice(bytemuck::bytes_of(&u));
        };
        for inst in &frame.objects {
            if let Some(shape) = up.shapes.get(inst.asset) {
                put(
                    inst.asset,
                    DrawUniform {
                        model: inst.model.to_cols_array_2d(),
                        color: shape.color,
                        params: [shape.emissive, 0.0, 0.0, 0.0],
                    },
                );
            }
        }
        put(
            star_slot,
            DrawUniform {
                model: glam::Mat4::IDENTITY.to_cols_array_2d(),
                color: up.stars.tint,
                params: [
                    1.0,
                    twinkle_scale(frame.star_twinkle_phase),
                    if up.star_fade { 1.0 } else { 0.0 },
                    0.0,
                ],
            },
        );
        put(
            particle_slot,
            DrawUniform {
                model: frame.particles_model.to_cols_array_2d(),
                color: up.particles.tint,
                params: [0.0, 1.0, 0.0, 0.0],
            },
        );
        self.queue.write_buffer(&up.draw_buffer, 0, &up.staging);
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));

        let surface_tex = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return Err(RenderError::SurfaceLost);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(RenderError::OutOfMemory),
            Err(e) => return Err(RenderError::Other(e.to_string())),
        };
        let target = surface_tex.texture.create_view(&wgpu::TextureViewDescriptor {
            format: Some(self.view_format),
            ..Default::default()
        });
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.msaa_view,
                    resolve_target: Some(&target),
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Discard,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_bind_group(0, &self.globals_bind_group, &[]);

            // Stars first, far behind everything else.
            if up.stars.count > 0 {
                rpass.set_pipeline(&self.point_pipeline);
                rpass.set_bind_group(1, &up.draw_bind_group, &[(star_slot * stride) as u32]);
                rpass.set_vertex_buffer(0, self.quad_buffer.slice(..));
                rpass.set_vertex_buffer(1, up.stars.instances.slice(..));
                rpass.draw(0..QUAD_CORNERS.len() as u32, 0..up.stars.count);
            }

            rpass.set_pipeline(&self.line_pipeline);
            for inst in &frame.objects {
                let Some(shape) = up.shapes.get(inst.asset) else {
                    continue;
                };
                rpass.set_bind_group(1, &up.draw_bind_group, &[(inst.asset * stride) as u32]);
                rpass.set_vertex_buffer(0, shape.vertices.slice(..));
                rpass.draw(0..shape.count, 0..1);
            }

            if up.particles.count > 0 {
                rpass.set_pipeline(&self.point_pipeline);
                rpass.set_bind_group(
                    1,
                    &up.draw_bind_group,
                    &[(particle_slot * stride) as u32],
                );
                rpass.set_vertex_buffer(0, self.quad_buffer.slice(..));
                rpass.set_vertex_buffer(1, up.particles.instances.slice(..));
                rpass.draw(0..QUAD_CORNERS.len() as u32, 0..up.particles.count);
            }
        }
        self.queue.submit(Some(encoder.finish()));
        surface_tex.present();
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if width == self.config.width && height == self.config.height {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        let (msaa_tex, msaa_view) = create_attachment(
            &self.device,
            "msaa_color",
            width,
            height,
            self.view_format,
            MSAA_SAMPLES,
        );
        let (depth_tex, depth_view) =
            create_attachment(&self.device, "depth", width, height, DEPTH_FORMAT, MSAA_SAMPLES);
        self._msaa_tex = msaa_tex;
        self.msaa_view = msaa_view;
        self._depth_tex = depth_tex;
        self.depth_view = depth_view;
        log::debug!("[render] resized to {width}x{height}");
    }

    fn release(&mut self) {
        self.release_uploaded();
        log::info!("[render] GPU resources released");
    }
}
