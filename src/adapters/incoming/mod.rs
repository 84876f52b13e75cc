pub mod frame_reader;
pub mod tcp_adapter;
