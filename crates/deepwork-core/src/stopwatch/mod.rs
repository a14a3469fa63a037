mod accumulator;

pub use accumulator::{StopwatchEngine, StopwatchRecord, StopwatchSnapshot};
