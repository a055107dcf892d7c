pub mod anim;
pub mod draw;
pub mod gl;
pub mod math;
