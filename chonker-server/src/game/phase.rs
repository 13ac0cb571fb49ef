// The race only ever moves forward through these phases; the one way back is
// an explicit restart, which re-enters Countdown so nobody has control
// during the grace period.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RacePhase {
    // cars connect and register; the track is already loaded
    Setup,
    // fixed-length timer, controls locked, HUD shows the seconds remaining
    Countdown,
    // controls live; progress ticks and standings recompute every step
    Running,
    // everyone's done; the results are frozen until a restart
    Finished,
}

impl RacePhase {
    pub fn control_enabled(&self) -> bool {
        matches!(self, RacePhase::Running)
    }

    pub fn allows_registration(&self) -> bool {
        matches!(self, RacePhase::Setup | RacePhase::Countdown)
    }
}
