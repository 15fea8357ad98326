pub mod constants;
pub mod input_buffer;
pub mod match_result;
pub mod round;
pub mod state;
pub mod systems;
