//! Type-erased messages, responses and message type descriptors.
//!
//! Routing is decided by the runtime type of a message, so messages travel
//! through the runtime as [`Message`] envelopes that remember the
//! [`MessageType`] of the value they carry. The payload is reference counted
//! so a published message can be fanned out without copying it.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Runtime identity of a message type.
///
/// Equality and hashing use the [`TypeId`] only; the type name is kept for
/// diagnostics.
#[derive(Clone, Copy)]
pub struct MessageType {
    id: TypeId,
    name: &'static str,
}

impl MessageType {
    /// Descriptor for the concrete type `T`.
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The underlying type identity.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name, as reported by [`std::any::type_name`].
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for MessageType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MessageType {}

impl Hash for MessageType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A message accepted by the runtime.
#[derive(Clone)]
pub struct Message {
    message_type: MessageType,
    payload: Arc<dyn Any + Send + Sync>,
}

impl Message {
    /// Wrap a typed value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            message_type: MessageType::of::<T>(),
            payload: Arc::new(value),
        }
    }

    /// The runtime type of the carried value.
    pub fn message_type(&self) -> MessageType {
        self.message_type
    }

    /// Whether the carried value is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.message_type == MessageType::of::<T>()
    }

    /// Borrow the carried value as `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("type", &self.message_type)
            .finish_non_exhaustive()
    }
}

/// Value produced by a handler.
///
/// A response may be empty for fire-and-forget messages.
#[derive(Clone, Default)]
pub struct Response {
    value: Option<Arc<dyn Any + Send + Sync>>,
    value_type: Option<&'static str>,
}

impl Response {
    /// A response carrying `value`.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Some(Arc::new(value)),
            value_type: Some(std::any::type_name::<T>()),
        }
    }

    /// A response carrying nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A response that hands the received message back to the caller.
    pub fn echo(message: &Message) -> Self {
        Self {
            value: Some(Arc::clone(&message.payload)),
            value_type: Some(message.message_type.name()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }

    /// Borrow the carried value as `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.as_ref().and_then(|value| value.downcast_ref::<T>())
    }

    /// Take shared ownership of the carried value as `T`.
    pub fn downcast<T: Any + Send + Sync>(self) -> Option<Arc<T>> {
        self.value.and_then(|value| value.downcast::<T>().ok())
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value_type {
            Some(name) => write!(f, "Response({name})"),
            None => f.write_str("Response(empty)"),
        }
    }
}
