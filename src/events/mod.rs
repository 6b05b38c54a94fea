//! Notification bus and notification types.
//!
//! The core communicates outward exclusively through typed notifications
//! published on an in-process bus. See [`NotificationBus`] for the
//! ordering and re-entrancy guarantees.

mod bus;
mod notification;

pub use bus::{Handler, HandlerId, NotificationBus};
pub use notification::{AbilityId, Notification, TurnEndReason};
