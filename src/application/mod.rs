//! Application Layer
//!
//! The real-time core: connection registry, presence, voice rosters and
//! fanout. The presentation layer drives it from websocket frames, REST-side
//! code calls its notification operations after persisting a change.

pub mod realtime;
