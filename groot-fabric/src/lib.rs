//! Groot Fabric Channel
//!
//! Wire implementation of the `groot-core` channel seam: framed TCP
//! request/response to the endorsing peers and the ordering service,
//! per-attempt commit-event subscriptions, and the signing identity from
//! the local key store.
//!
//! Session handles (peer and orderer connections) are pooled and reused
//! across attempts; event subscriptions are ephemeral, one per write.

pub mod channel;
pub mod events;
pub mod identity;
pub mod message;
mod transport;

pub use channel::{ChannelConfig, FabricChannel};
pub use events::FabricEventSource;
pub use identity::Identity;
pub use message::GatewayMessage;
