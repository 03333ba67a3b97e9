//! WebGPU rendering module
//!
//! Scene composition is pure (`scene::build_frame` produces a `DrawList` from
//! a read-only game view); only `pipeline` touches the GPU.

pub mod draw;
pub mod font;
pub mod pipeline;
pub mod scene;
pub mod sprites;
pub mod vertex;

pub use draw::DrawList;
pub use pipeline::RenderState;
pub use scene::build_frame;
pub use sprites::{PLAYER_SHEET, SpriteSheet, UvRect};
pub use vertex::Vertex;
