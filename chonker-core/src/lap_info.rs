use serde::{Deserialize, Serialize};

pub type LapNumber = u8;
pub type CheckpointIndex = u64;
pub type Placement = u8;

// One car's race progress, as tracked by the server. Lives in an arena keyed
// by CarID so nothing aliases the underlying vehicle object.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct CarProgress {
    pub lap: LapNumber,
    pub checkpoint: CheckpointIndex,
    pub race_time: f64,
    pub placement: Placement,
    pub finished: bool,
}

impl CarProgress {
    pub fn new() -> Self {
        CarProgress {
            lap: 0,
            checkpoint: 0,
            race_time: 0.0,
            placement: 1,
            finished: false,
        }
    }
}
