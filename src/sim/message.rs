//! Synchronous actor-to-actor messages

use serde::{Deserialize, Serialize};

/// Item a player can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PickupKind {
    #[default]
    None,
    Bomb,
    Mine,
}

/// Reply slot for [`Message::QueryController`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControllerQuery {
    pub handled: bool,
    pub controller: u8,
}

/// A message delivered to one actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// Health delta to subtract; negative heals
    Damage(i16),
    /// Replace the receiver's carried item
    Pickup(PickupKind),
    /// Filled in by actors owned by a controller
    QueryController(ControllerQuery),
}

/// Discriminant of a [`Message`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Damage,
    Pickup,
    QueryController,
}

impl Message {
    pub const fn kind(&self) -> MessageKind {
        match self {
            Message::Damage(_) => MessageKind::Damage,
            Message::Pickup(_) => MessageKind::Pickup,
            Message::QueryController(_) => MessageKind::QueryController,
        }
    }

    /// Unanswered controller query
    pub const fn query_controller() -> Self {
        Message::QueryController(ControllerQuery {
            handled: false,
            controller: 0,
        })
    }

    /// Controller index if this is an answered query
    pub const fn answered_controller(&self) -> Option<u8> {
        match self {
            Message::QueryController(ControllerQuery {
                handled: true,
                controller,
            }) => Some(*controller),
            _ => None,
        }
    }
}

/// Receiver side of the message protocol.
///
/// Actors that do not care about messages keep the default, which ignores
/// everything.
pub trait MessageHandler {
    fn handle(&mut self, message: &mut Message) {
        let _ = message;
    }
}
