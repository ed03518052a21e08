//! Effect rules: trigger sampling, action magnitudes and host dispatch

mod evaluator;
mod rng;
mod sink;

pub use evaluator::{MAX_IGNITE_SECONDS, apply_effects, resolve_action};
pub use rng::TriggerRng;
pub use sink::{ActionOutcome, ActionSink, NoopSink, RecordingSink};
