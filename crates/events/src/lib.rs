//! Domain & integration events.
//!
//! Services publish facts (e.g. "an order was placed") through an [`EventBus`];
//! listeners such as the notification fan-out consume them asynchronously.

pub mod bus;
pub mod envelope;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use envelope::{EnvelopeError, EventEnvelope};
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
