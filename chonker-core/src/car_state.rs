use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

// CarState is the full telemetry tuple for one car: what the vehicle
// simulation samples each step, what goes over the wire on a publish, and
// what a replica converges toward. It is always sent whole, so applying an
// update is idempotent.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct CarState {
    pub position: DVec3,
    pub orientation: DQuat,
    pub velocity: DVec3,
    pub health: f64,
    pub has_boost: bool,
}

impl CarState {
    // A freshly spawned car on the starting grid.
    pub fn at_rest(max_health: f64) -> Self {
        CarState {
            position: DVec3::ZERO,
            orientation: DQuat::IDENTITY,
            velocity: DVec3::ZERO,
            health: max_health,
            has_boost: false,
        }
    }

    // Telemetry arriving off the wire can be garbage: NaN positions from a
    // misbehaving peer, denormalized rotations, health outside the bar.
    // Anything failing this check is dropped and the last valid state stays
    // in effect.
    pub fn is_valid(&self, max_health: f64) -> bool {
        self.position.is_finite()
            && self.velocity.is_finite()
            && self.orientation.is_finite()
            && self.orientation.is_normalized()
            && self.health.is_finite()
            && self.health >= 0.0
            && self.health <= max_health
    }
}
