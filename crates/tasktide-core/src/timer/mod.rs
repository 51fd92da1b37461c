mod clock;
mod engine;
mod queue;
mod settings;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{FocusTimer, Phase, TimerSnapshot, TimerStatus};
pub use queue::ActiveTaskQueue;
pub use settings::{NoOverrides, TimerSettings, TimerSettingsPatch, WorkDurationSource};
