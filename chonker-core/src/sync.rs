use log::debug;

use crate::car_state::CarState;
use crate::GLOBAL_CONFIG;

// The two halves of state reconciliation for networked cars. The side that
// simulates a car owns a StatePublisher and decides when the car has drifted
// far enough from its last broadcast state to be worth publishing again;
// every other side owns a ReplicaCar that converges its displayed state
// toward whatever it last heard. There are no acknowledgments: a replica
// that misses updates just keeps converging toward the newest one it did
// receive.

pub struct StatePublisher {
    last_sent: CarState,
    last_send_time: f64,
}

impl StatePublisher {
    pub fn new(state: CarState) -> StatePublisher {
        StatePublisher {
            last_sent: state,
            // allow the very first evaluation to publish
            last_send_time: f64::NEG_INFINITY,
        }
    }

    // Authority handover: adopt the live state as the already-published
    // shadow so the first evaluation after taking over doesn't fire a
    // spurious full-state publish.
    pub fn seed(&mut self, state: CarState) {
        self.last_sent = state;
    }

    // Evaluate the publish decision at `now` (seconds on the caller's
    // monotonic clock). Returns the full state tuple to transmit, or None if
    // we're inside the rate window or nothing has drifted past a threshold.
    // The send timer only advances on an actual publish.
    pub fn publish(&mut self, now: f64, state: &CarState) -> Option<CarState> {
        if now - self.last_send_time < 1.0 / GLOBAL_CONFIG.send_rate {
            return None;
        }
        if !self.past_thresholds(state) {
            return None;
        }
        self.last_sent = *state;
        self.last_send_time = now;
        Some(*state)
    }

    fn past_thresholds(&self, state: &CarState) -> bool {
        // minimal rotation between the two orientations, ignoring the
        // quaternion double cover
        let rotation_drift =
            2.0 * state.orientation.dot(self.last_sent.orientation).abs().min(1.0).acos();

        state.position.distance(self.last_sent.position) > GLOBAL_CONFIG.position_threshold
            || rotation_drift > GLOBAL_CONFIG.rotation_threshold_degs.to_radians()
            || state.velocity.distance(self.last_sent.velocity) > GLOBAL_CONFIG.velocity_threshold
            || (state.health - self.last_sent.health).abs() > GLOBAL_CONFIG.health_threshold
            || state.has_boost != self.last_sent.has_boost
    }
}

pub struct ReplicaCar {
    displayed: CarState,
    target: CarState,
}

impl ReplicaCar {
    pub fn new(state: CarState) -> ReplicaCar {
        ReplicaCar {
            displayed: state,
            target: state,
        }
    }

    // Latest authoritative snapshot off the wire. Garbage telemetry is
    // dropped and the previous target stays in effect. Health and boost are
    // discrete display values on a replica, so they snap instead of
    // interpolating.
    pub fn receive(&mut self, state: CarState) {
        if !state.is_valid(GLOBAL_CONFIG.max_health) {
            debug!("rejecting malformed car state update");
            return;
        }
        self.target = state;
        self.displayed.health = state.health;
        self.displayed.has_boost = state.has_boost;
    }

    // Exponential-decay smoothing toward the target. The factor is clamped
    // at 1 so an oversized dt lands exactly on the target instead of
    // overshooting past it.
    pub fn step(&mut self, dt: f64) {
        let t = (GLOBAL_CONFIG.position_lerp_rate * dt).min(1.0);
        self.displayed.position += (self.target.position - self.displayed.position) * t;

        let rt = (GLOBAL_CONFIG.rotation_lerp_rate * dt).min(1.0);
        self.displayed.orientation = self
            .displayed
            .orientation
            .lerp(self.target.orientation, rt)
            .normalize();

        let vt = (GLOBAL_CONFIG.velocity_lerp_rate * dt).min(1.0);
        self.displayed.velocity += (self.target.velocity - self.displayed.velocity) * vt;
    }

    pub fn displayed(&self) -> &CarState {
        &self.displayed
    }

    pub fn target(&self) -> &CarState {
        &self.target
    }
}
