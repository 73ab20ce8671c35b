use std::fmt;
use std::str::FromStr;

use crate::error::{RenderError, Result};
use crate::shader::ShaderPair;

use super::{BufferHandle, ImageHandle};

/// Scalar type of a vertex attribute.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ScalarKind {
    Float,
    Sint,
    Uint,
}

/// One vertex attribute: 1–4 components of a 32-bit scalar.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VertexAttribute {
    pub components: u8,
    pub kind: ScalarKind,
}

impl VertexAttribute {
    /// Size in bytes.
    #[inline]
    pub fn size(self) -> u64 {
        self.components as u64 * 4
    }

    pub(crate) fn to_wgpu(self) -> wgpu::VertexFormat {
        use wgpu::VertexFormat as F;
        match (self.kind, self.components) {
            (ScalarKind::Float, 1) => F::Float32,
            (ScalarKind::Float, 2) => F::Float32x2,
            (ScalarKind::Float, 3) => F::Float32x3,
            (ScalarKind::Float, _) => F::Float32x4,
            (ScalarKind::Sint, 1) => F::Sint32,
            (ScalarKind::Sint, 2) => F::Sint32x2,
            (ScalarKind::Sint, 3) => F::Sint32x3,
            (ScalarKind::Sint, _) => F::Sint32x4,
            (ScalarKind::Uint, 1) => F::Uint32,
            (ScalarKind::Uint, 2) => F::Uint32x2,
            (ScalarKind::Uint, 3) => F::Uint32x3,
            (ScalarKind::Uint, _) => F::Uint32x4,
        }
    }
}

/// Interleaved vertex layout parsed from a compact string such as `"2f 2f 4f"`.
///
/// Each token is a component count (1–4) followed by `f` (f32), `i` (i32) or
/// `u` (u32). Attributes are tightly packed in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexFormat {
    attributes: Vec<VertexAttribute>,
}

impl VertexFormat {
    pub fn parse(layout: &str) -> Result<Self> {
        let mut attributes = Vec::new();

        for token in layout.split_whitespace() {
            let mut chars = token.chars();
            let (Some(count), Some(kind), None) = (chars.next(), chars.next(), chars.next()) else {
                return Err(RenderError::InvalidVertexFormat(format!("bad token {token:?} in {layout:?}")));
            };

            let components = match count.to_digit(10) {
                Some(n @ 1..=4) => n as u8,
                _ => {
                    return Err(RenderError::InvalidVertexFormat(format!(
                        "component count must be 1-4 in {token:?}"
                    )));
                }
            };

            let kind = match kind {
                'f' => ScalarKind::Float,
                'i' => ScalarKind::Sint,
                'u' => ScalarKind::Uint,
                other => {
                    return Err(RenderError::InvalidVertexFormat(format!(
                        "unknown scalar type {other:?} in {token:?}"
                    )));
                }
            };

            attributes.push(VertexAttribute { components, kind });
        }

        if attributes.is_empty() {
            return Err(RenderError::InvalidVertexFormat("empty format".to_string()));
        }

        Ok(Self { attributes })
    }

    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    /// Bytes per vertex.
    pub fn stride(&self) -> u64 {
        self.attributes.iter().map(|a| a.size()).sum()
    }

    /// Builds wgpu attributes with consecutive shader locations from `first_location`.
    pub(crate) fn wgpu_attributes(&self, first_location: u32) -> Vec<wgpu::VertexAttribute> {
        let mut offset = 0;
        self.attributes
            .iter()
            .enumerate()
            .map(|(i, a)| {
                let attr = wgpu::VertexAttribute {
                    format: a.to_wgpu(),
                    offset,
                    shader_location: first_location + i as u32,
                };
                offset += a.size();
                attr
            })
            .collect()
    }
}

impl FromStr for VertexFormat {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for VertexFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, a) in self.attributes.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            let kind = match a.kind {
                ScalarKind::Float => 'f',
                ScalarKind::Sint => 'i',
                ScalarKind::Uint => 'u',
            };
            write!(f, "{}{}", a.components, kind)?;
        }
        Ok(())
    }
}

/// A vertex buffer plus the layout its bytes follow.
#[derive(Debug, Clone)]
pub struct VertexBinding {
    pub buffer: BufferHandle,
    pub format: VertexFormat,
    /// Shader location of the first attribute; the rest follow consecutively.
    pub first_location: u32,
}

/// A named texture + sampler resource.
#[derive(Debug, Clone)]
pub struct SamplerBinding {
    pub name: String,
    pub binding: u32,
    pub image: ImageHandle,
    /// Linear filtering when set, nearest otherwise.
    pub filtered: bool,
}

/// Everything a backend needs to build one render pipeline.
///
/// Index buffers hold `u32` indices.
#[derive(Debug, Clone)]
pub struct PipelineConfig<'a> {
    pub label: &'a str,
    pub shaders: &'a ShaderPair,
    /// Framebuffer the pipeline renders into.
    pub target: ImageHandle,
    pub vertex_buffers: Vec<VertexBinding>,
    pub index_buffer: Option<BufferHandle>,
    pub vertex_count: u32,
    pub samplers: Vec<SamplerBinding>,
    /// Straight-alpha blending over the target's contents.
    pub alpha_blend: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sprite_format_layout() {
        let fmt = VertexFormat::parse("2f 2f 4f").unwrap();
        assert_eq!(fmt.attributes().len(), 3);
        assert_eq!(fmt.stride(), 32);

        let attrs = fmt.wgpu_attributes(0);
        assert_eq!(attrs[0].offset, 0);
        assert_eq!(attrs[1].offset, 8);
        assert_eq!(attrs[2].offset, 16);
        assert_eq!(attrs[2].shader_location, 2);
        assert_eq!(attrs[2].format, wgpu::VertexFormat::Float32x4);
    }

    #[test]
    fn display_round_trips_text() {
        let fmt: VertexFormat = "  3f 1u\t4i ".parse().unwrap();
        assert_eq!(fmt.to_string(), "3f 1u 4i");
    }

    #[test]
    fn rejects_bad_tokens() {
        for bad in ["", "   ", "0f", "5f", "2x", "2", "22f", "f2"] {
            let err = VertexFormat::parse(bad).unwrap_err();
            assert!(matches!(err, RenderError::InvalidVertexFormat(_)), "{bad:?}");
        }
    }
}
