pub mod ai;
pub mod arena;
pub mod collision;
pub mod fuel;
pub mod physics;
pub mod player;
pub mod steering;
