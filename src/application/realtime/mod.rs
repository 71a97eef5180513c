//! Real-time fanout and presence
//!
//! Tracks live sessions per user, derives presence from registry occupancy,
//! keeps voice rosters and routes chat, DM and call-signal events to the
//! right set of sessions through a single `Fanout` interface.

pub mod events;
pub mod fanout;
pub mod hub;
pub mod presence;
pub mod registry;
pub mod relay;
pub mod routing;
pub mod session;
pub mod voice;

pub use events::{Frame, ServerEvent};
pub use fanout::{deliver_locally, Fanout, LocalFanout, Scope};
pub use hub::{Realtime, RealtimeOptions};
pub use presence::{PresenceStatus, PresenceTracker};
pub use registry::{ConnectionRegistry, Transition};
pub use relay::CallSignal;
pub use routing::TypingTarget;
pub use session::{DeliveryReport, Session};
pub use voice::{VoiceOccupancyTracker, VoiceOccupant};
