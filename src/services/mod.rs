//! Collaborators at the edge of the engine: reading sources, outcome
//! resolution and notification delivery.

pub mod market_data;
pub mod notifications;
pub mod outcome;

pub use market_data::{ReadingSource, SyntheticReadingSource};
pub use notifications::{
    MessageTransport, NotificationDispatcher, NotifyOutcome, TelegramTransport,
};
pub use outcome::{OutcomeResolver, PendingOutcome, SimulatedOutcomeResolver};
