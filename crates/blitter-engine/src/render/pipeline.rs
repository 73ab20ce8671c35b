//! Per-draw sprite pipeline.
//!
//! Every draw builds its own vertex buffer, index buffer and pipeline, runs it
//! once and releases all three. Nothing is cached between draws.

use bytemuck::{Pod, Zeroable};

use crate::coords::{Quad, QUAD_INDICES};
use crate::device::{
    BufferHandle, GraphicsDevice, ImageHandle, PipelineConfig, PipelineHandle, SamplerBinding,
    VertexBinding, VertexFormat,
};
use crate::error::Result;
use crate::paint::Color;
use crate::shader::ShaderPair;

/// Layout of [`QuadVertex`]: position, texcoord, tint.
pub const QUAD_VERTEX_FORMAT: &str = "2f 2f 4f";

/// Name of the sampled texture in the sprite shaders.
pub const TEXTURE_SAMPLER: &str = "u_texture";

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    /// Clip space.
    pub pos: [f32; 2],
    /// Texture space.
    pub uv: [f32; 2],
    pub tint: [f32; 4],
}

impl QuadVertex {
    /// Pairs destination and source corners slot by slot.
    pub fn quad(dst: &Quad, src: &Quad, tint: Color) -> [QuadVertex; 4] {
        let tint = tint.to_array();
        std::array::from_fn(|i| QuadVertex {
            pos: dst[i].to_array(),
            uv: src[i].to_array(),
            tint,
        })
    }
}

/// What one sprite draw needs from the caller.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SpriteJob<'a> {
    pub shaders: &'a ShaderPair,
    pub target: ImageHandle,
    pub texture: ImageHandle,
    pub vertices: &'a [QuadVertex; 4],
    pub filtered: bool,
}

/// Device resources of one sprite draw.
#[derive(Debug)]
pub(crate) struct EphemeralPipeline {
    pipeline: PipelineHandle,
    vertices: BufferHandle,
    indices: BufferHandle,
}

impl EphemeralPipeline {
    /// Allocates buffers and compiles the pipeline. On failure everything
    /// allocated so far is released before the error is returned.
    pub(crate) fn build<D>(device: &mut D, job: SpriteJob<'_>) -> Result<Self>
    where
        D: GraphicsDevice + ?Sized,
    {
        let format = VertexFormat::parse(QUAD_VERTEX_FORMAT)?;

        let vertices = device.allocate_buffer(bytemuck::cast_slice(job.vertices), false)?;
        let indices = match device.allocate_buffer(bytemuck::cast_slice(&QUAD_INDICES), true) {
            Ok(b) => b,
            Err(e) => {
                device.release_buffer(vertices);
                return Err(e);
            }
        };

        let config = PipelineConfig {
            label: "blitter sprite",
            shaders: job.shaders,
            target: job.target,
            vertex_buffers: vec![VertexBinding {
                buffer: vertices,
                format,
                first_location: 0,
            }],
            index_buffer: Some(indices),
            vertex_count: QUAD_INDICES.len() as u32,
            samplers: vec![SamplerBinding {
                name: TEXTURE_SAMPLER.to_string(),
                binding: 0,
                image: job.texture,
                filtered: job.filtered,
            }],
            alpha_blend: true,
        };

        match device.compile_pipeline(&config) {
            Ok(pipeline) => Ok(Self {
                pipeline,
                vertices,
                indices,
            }),
            Err(e) => {
                device.release_buffer(indices);
                device.release_buffer(vertices);
                Err(e)
            }
        }
    }

    pub(crate) fn execute<D>(&self, device: &mut D) -> Result<()>
    where
        D: GraphicsDevice + ?Sized,
    {
        device.execute_pipeline(self.pipeline)
    }

    pub(crate) fn release<D>(self, device: &mut D)
    where
        D: GraphicsDevice + ?Sized,
    {
        device.release_pipeline(self.pipeline);
        device.release_buffer(self.indices);
        device.release_buffer(self.vertices);
    }

    /// Build, execute once, release. Resources are released even when
    /// execution fails.
    pub(crate) fn run_once<D>(device: &mut D, job: SpriteJob<'_>) -> Result<()>
    where
        D: GraphicsDevice + ?Sized,
    {
        let pipeline = Self::build(device, job)?;
        let result = pipeline.execute(device);
        pipeline.release(device);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{Size, Vec2};
    use crate::device::{DeviceCall, HeadlessDevice, PixelFormat};

    struct Sprite {
        shaders: ShaderPair,
        target: ImageHandle,
        texture: ImageHandle,
        vertices: [QuadVertex; 4],
    }

    impl Sprite {
        fn job(&self) -> SpriteJob<'_> {
            SpriteJob {
                shaders: &self.shaders,
                target: self.target,
                texture: self.texture,
                vertices: &self.vertices,
                filtered: true,
            }
        }
    }

    fn fixture() -> (HeadlessDevice, Sprite) {
        let mut device = HeadlessDevice::new(Size::new(100, 100));
        let target = device
            .allocate_image(Size::new(100, 100), PixelFormat::default(), None, false)
            .unwrap();
        let texture = device
            .allocate_image(Size::new(8, 8), PixelFormat::default(), None, true)
            .unwrap();
        device.take_calls();
        let corners = [Vec2::zero(); 4];
        let sprite = Sprite {
            shaders: ShaderPair::builtin_blit_texture(),
            target,
            texture,
            vertices: QuadVertex::quad(&corners, &corners, Color::WHITE),
        };
        (device, sprite)
    }

    #[test]
    fn vertex_is_eight_floats() {
        assert_eq!(std::mem::size_of::<QuadVertex>(), 32);
        assert_eq!(VertexFormat::parse(QUAD_VERTEX_FORMAT).unwrap().stride(), 32);
    }

    #[test]
    fn quad_pairs_slots() {
        let dst = [
            Vec2::new(-1.0, -1.0),
            Vec2::new(1.0, -1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(-1.0, 1.0),
        ];
        let src = [
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 0.0),
        ];
        let q = QuadVertex::quad(&dst, &src, Color::WHITE);
        assert_eq!(q[2].pos, [1.0, 1.0]);
        assert_eq!(q[2].uv, [1.0, 0.0]);
        assert_eq!(q[0].tint, [1.0; 4]);
    }

    #[test]
    fn run_once_leaves_nothing_alive() {
        let (mut device, sprite) = fixture();
        EphemeralPipeline::run_once(&mut device, sprite.job()).unwrap();

        assert_eq!(device.live_buffers(), 0);
        assert_eq!(device.live_pipelines(), 0);
        assert!(device
            .calls()
            .iter()
            .any(|c| matches!(c, DeviceCall::ExecutePipeline(_))));
    }

    #[test]
    fn index_buffer_failure_releases_vertex_buffer() {
        let (mut device, sprite) = fixture();
        device.fail_buffers_after(Some(1));
        assert!(EphemeralPipeline::build(&mut device, sprite.job()).is_err());
        assert_eq!(device.live_buffers(), 0);
    }

    #[test]
    fn compile_failure_releases_both_buffers() {
        let (mut device, sprite) = fixture();
        device.fail_pipeline_compilation(true);
        assert!(EphemeralPipeline::run_once(&mut device, sprite.job()).is_err());
        assert_eq!(device.live_buffers(), 0);
        assert_eq!(device.live_pipelines(), 0);
    }

    #[test]
    fn sampling_the_target_is_rejected() {
        let (mut device, mut sprite) = fixture();
        sprite.texture = sprite.target;
        assert!(EphemeralPipeline::run_once(&mut device, sprite.job()).is_err());
        assert_eq!(device.live_buffers(), 0);
    }

    #[test]
    fn index_buffer_holds_quad_indices() {
        let (mut device, sprite) = fixture();
        EphemeralPipeline::run_once(&mut device, sprite.job()).unwrap();

        let index_bytes = device.calls().iter().find_map(|c| match c {
            DeviceCall::AllocateBuffer { bytes, index: true, .. } => Some(bytes.clone()),
            _ => None,
        });
        let indices: Vec<u32> = bytemuck::pod_collect_to_vec(index_bytes.unwrap().as_slice());
        assert_eq!(indices, QUAD_INDICES);
    }
}
