pub mod accumulator;
pub mod codec;
pub mod demux;
pub mod frame;
pub mod session;
pub mod text;

pub use accumulator::ByteAccumulator;
pub use codec::WaveCodec;
pub use demux::{DemuxEvent, DemuxStats, Demultiplexer, DrainEvents};
pub use frame::{Frame, decode_samples, has_valid_trailer};
pub use session::Session;
