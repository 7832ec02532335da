pub mod admission;
pub mod correlator;

pub use admission::AdmissionController;
pub use correlator::{CompletionSignal, VideoEventCorrelator};
