pub mod base_parser;
pub mod frame_encoder;
pub mod traits;

pub use base_parser::BaseParser;
pub use frame_encoder::FrameEncoder;
pub use traits::*;
