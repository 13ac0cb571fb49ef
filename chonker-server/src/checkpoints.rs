use chonker_core::lap_info::CheckpointIndex;
use chonker_core::{CarID, GLOBAL_CONFIG};
use glam::DVec3;

use crate::map::Track;

// One crossing report, already debounced, on its way to the progress tracker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CheckpointCrossing {
    pub car: CarID,
    pub checkpoint: CheckpointIndex,
}

// A passive trigger zone on the track. The collision layer tells us a car
// overlapped the zone; the sensor's job is to report that at most once per
// crossing, re-arming after a short delay so a car lingering across the
// trigger geometry doesn't double-fire. Sensors are track geometry, not race
// authorities: they forward whatever car they saw and leave validation to
// the tracker.
pub struct CheckpointSensor {
    index: CheckpointIndex,
    position: DVec3,
    rearm_remaining: f64,
}

impl CheckpointSensor {
    pub fn new(index: CheckpointIndex, position: DVec3) -> CheckpointSensor {
        CheckpointSensor {
            index,
            position,
            rearm_remaining: 0.0,
        }
    }

    pub fn index(&self) -> CheckpointIndex {
        self.index
    }

    pub fn pos(&self) -> DVec3 {
        self.position
    }

    pub fn report_crossing(&mut self, car: CarID) -> Option<CheckpointCrossing> {
        if self.rearm_remaining > 0.0 {
            return None;
        }
        self.rearm_remaining = GLOBAL_CONFIG.checkpoint_rearm_secs;
        Some(CheckpointCrossing {
            car,
            checkpoint: self.index,
        })
    }

    pub fn tick(&mut self, dt: f64) {
        if self.rearm_remaining > 0.0 {
            self.rearm_remaining = (self.rearm_remaining - dt).max(0.0);
        }
    }

    pub fn rearm(&mut self) {
        self.rearm_remaining = 0.0;
    }
}

// Interior checkpoints report their racing-order index; the start/finish
// line sits at position 0 but reports index N (the track's checkpoint
// count), which is the crossing that advances the lap.
pub fn sensors_for_track(track: &Track) -> Vec<CheckpointSensor> {
    let positions = track.checkpoint_positions();
    let mut sensors: Vec<CheckpointSensor> = positions[1..]
        .iter()
        .enumerate()
        .map(|(i, pos)| CheckpointSensor::new(i as CheckpointIndex + 1, *pos))
        .collect();
    sensors.push(CheckpointSensor::new(
        track.checkpoint_count(),
        positions[0],
    ));
    sensors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensor_debounces_until_rearmed() {
        let mut sensor = CheckpointSensor::new(1, DVec3::ZERO);

        assert_eq!(
            sensor.report_crossing(0),
            Some(CheckpointCrossing {
                car: 0,
                checkpoint: 1
            })
        );
        // still lingering in the trigger region
        assert_eq!(sensor.report_crossing(0), None);

        sensor.tick(0.3);
        assert_eq!(sensor.report_crossing(0), None);
        sensor.tick(0.3);
        assert!(sensor.report_crossing(0).is_some());
    }

    #[test]
    fn test_track_sensors_cover_every_index() {
        let track = Track::new(
            "square",
            vec![
                DVec3::ZERO,
                DVec3::new(10.0, 0.0, 0.0),
                DVec3::new(10.0, 0.0, 10.0),
                DVec3::new(0.0, 0.0, 10.0),
            ],
        )
        .unwrap();

        let sensors = sensors_for_track(&track);
        let indices: Vec<u64> = sensors.iter().map(|s| s.index()).collect();
        assert_eq!(indices, vec![1, 2, 3, 4]);
        // the lap-completing sensor is the start/finish line itself
        assert_eq!(sensors.last().unwrap().pos(), DVec3::ZERO);
    }
}
