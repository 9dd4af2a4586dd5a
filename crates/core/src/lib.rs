pub mod config;
pub mod filter;
pub mod gesture;
pub mod latest;
pub mod net;
pub mod pipeline;
pub mod producer;
pub mod scale;
pub mod sink;
pub mod spread;

pub use config::{
    ConfigError, EndpointConfig, FilterConfig, GestureThreshold, PreFilterConfig, ScaleRange,
    TrackingConfig,
};
pub use filter::{FilterState, PreFilter, TemporalFilter};
pub use gesture::{GestureDetector, GestureEdge};
pub use latest::LatestValue;
pub use net::{
    DEFAULT_PORT, DecodeError, MAX_PACKET_SIZE, NetworkEndpoint, NetworkStats,
    PacketLossSimulation, RawSample, ReceiveLoop, Received, ReceiverHandle,
};
pub use pipeline::{FrameUpdate, TrackingPipeline};
pub use producer::SampleProducer;
pub use scale::ScaleMapper;
pub use sink::{LogSink, Transform, TransformSink};
pub use spread::finger_spread;
