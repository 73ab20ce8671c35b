//! Shader sources.
//!
//! Pipelines are described by a vertex/fragment source pair. The sprite
//! pipeline ships embedded; [`ShaderLoader`] reads replacements from disk.
//!
//! Conventions every pair must follow:
//! - vertex entry point `vs_main`, fragment entry point `fs_main`
//! - sampler binding `n` uses WGSL `@binding(2n)` for the texture and
//!   `@binding(2n + 1)` for the sampler, in `@group(0)`

mod loader;

pub use loader::ShaderLoader;

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Name of the sprite pipeline shaders, both built in and on disk.
pub const BLIT_TEXTURE: &str = "blit_texture";

/// WGSL source for the device-side image blit (single module).
pub(crate) const PRESENT_BLIT_WGSL: &str = include_str!("../../shaders/present_blit.wgsl");

/// Vertex + fragment WGSL sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderPair {
    pub name: String,
    pub vertex: String,
    pub fragment: String,
}

impl ShaderPair {
    pub fn new(name: impl Into<String>, vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }

    /// Embedded sprite shaders (position, texcoord, tint → sampled texel × tint).
    pub fn builtin_blit_texture() -> Self {
        Self::new(
            BLIT_TEXTURE,
            include_str!("../../shaders/blit_texture/blit_texture.vert.wgsl"),
            include_str!("../../shaders/blit_texture/blit_texture.frag.wgsl"),
        )
    }
}
