pub mod animator;
pub mod model;
pub mod phrases;
pub mod playback;
pub mod sim;
pub mod sink;
