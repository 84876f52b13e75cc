pub mod memory_writer;
pub mod raw_decoder;
pub mod stream_writer;
