pub mod frame_writer;
pub mod message_decoder;

pub use frame_writer::FrameWriter;
pub use message_decoder::MessageDecoder;
