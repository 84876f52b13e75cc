mod chunk;
mod frame;

pub use chunk::*;
pub use frame::*;
