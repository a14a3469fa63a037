mod countdown;

pub use countdown::{
    minutes_to_secs, CountdownEngine, CountdownRecord, CountdownSnapshot, TimerState,
};
