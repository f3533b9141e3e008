//! Pattern storage, step selection and look-ahead timing.

pub mod arpeggiator;
pub mod generative;
pub mod pattern;
pub mod transport;

pub use arpeggiator::{ArpMode, Arpeggiator};
pub use generative::{generate_pattern, try_generate_pattern, PatternService};
pub use pattern::{Pattern, PatternStore, Step, STEPS};
pub use transport::{Transport, TransportState};
