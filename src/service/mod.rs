//! Counter service
//!
//! The shared ads counter plus the background tasks that drive it.

mod chaos;
mod counter;
mod mutator;

pub use chaos::ChaosTimer;
pub use counter::{AdsService, CounterMetrics};
pub use mutator::Mutator;
