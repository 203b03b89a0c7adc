//! Scholar engine: server IO and effect execution.
mod api;
mod channel;
mod decode;
mod engine;
mod extract;
mod filename;
mod persist;
mod settings;
mod sse;
mod types;

pub use api::{ReqwestApi, ScholarApi};
pub use channel::{decode_progress, ProgressChannel};
pub use decode::{decode_body, DecodedText};
pub use engine::{ChannelEventSink, EngineError, EngineHandle};
pub use extract::extract_summary;
pub use filename::safe_filename;
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use settings::{ClientSettings, DEFAULT_BASE_URL};
pub use sse::{SseDecoder, SseError, SseMessage, MAX_EVENT_BYTES};
pub use types::{ChannelError, EngineEvent, EventSink, FailureKind, RequestError};
