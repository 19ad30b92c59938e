pub mod sequencer;

pub use sequencer::{ExecutionState, SwapExecutor, TriangleSequencer};
