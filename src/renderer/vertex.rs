//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// UV marker for vertices that ignore the sprite atlas
pub const NO_TEXTURE: [f32; 2] = [-1.0, -1.0];

/// 2D vertex with position, atlas coordinates and color.
///
/// Positions are device pixels until the pipeline converts them to NDC.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            uv: NO_TEXTURE,
            color,
        }
    }

    pub const fn textured(x: f32, y: f32, u: f32, v: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            uv: [u, v],
            color,
        }
    }

    pub fn is_textured(&self) -> bool {
        self.uv[0] >= 0.0
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: (std::mem::size_of::<[f32; 2]>() * 2) as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Colors for scene elements
pub mod colors {
    pub const BACKGROUND_TOP: [f32; 4] = [0.05, 0.06, 0.12, 1.0];
    pub const BACKGROUND_BOTTOM: [f32; 4] = [0.1, 0.08, 0.16, 1.0];
    pub const TILE: [f32; 4] = [0.16, 0.18, 0.26, 1.0];
    /// Glass edge highlight at the exposed side
    pub const TILE_EDGE: [f32; 4] = [0.55, 0.75, 1.0, 0.85];
    pub const TILE_GLOW: [f32; 4] = [1.0, 0.55, 0.15, 1.0];
    pub const ENTITY: [f32; 4] = [0.7, 0.35, 0.9, 1.0];
    pub const ENTITY_EYE: [f32; 4] = [1.0, 0.95, 0.6, 1.0];
    pub const PORTFOLIO: [f32; 4] = [0.95, 0.8, 0.3, 1.0];
    pub const PORTFOLIO_RIM: [f32; 4] = [1.0, 1.0, 1.0, 0.9];
    pub const TOOLTIP: [f32; 4] = [0.08, 0.09, 0.14, 0.92];
    pub const TOOLTIP_BORDER: [f32; 4] = [0.95, 0.8, 0.3, 1.0];
    pub const TOOLTIP_TITLE: [f32; 4] = [0.97, 0.95, 0.9, 1.0];
    pub const TOOLTIP_DETAIL: [f32; 4] = [0.62, 0.66, 0.78, 1.0];
    pub const HEALTH_FILL: [f32; 4] = [0.3, 0.9, 0.45, 1.0];
    pub const HEALTH_BACK: [f32; 4] = [0.15, 0.05, 0.05, 0.8];
    pub const INDICATOR: [f32; 4] = [1.0, 0.85, 0.35, 0.9];
    pub const GAIN: [f32; 4] = [0.3, 1.0, 0.45, 1.0];
    pub const LOSS: [f32; 4] = [1.0, 0.3, 0.3, 1.0];
    pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
}
