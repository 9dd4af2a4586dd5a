mod codec;
mod endpoint;
mod receiver;
mod stats;

pub use codec::{DEFAULT_PORT, DecodeError, MAX_PACKET_SIZE, RawSample, decode, encode};
pub use endpoint::{NetworkEndpoint, Received};
pub use receiver::{ReceiveLoop, ReceiverHandle};
pub use stats::{NetworkStats, PacketLossSimulation, SharedStats};
