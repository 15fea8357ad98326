pub mod timer;
pub mod vec2;
