use chonker_core::lap_info::{CheckpointIndex, LapNumber, Placement};
use chonker_core::{CarID, GLOBAL_CONFIG};
use log::{debug, info};

use crate::checkpoints::{sensors_for_track, CheckpointSensor};
use crate::game::phase::RacePhase;
use crate::map::Track;
use crate::progress::ProgressTracker;

// One race on one track. Explicitly constructed at track load and explicitly
// stepped: the driving loop owns the clock and hands us dt, and the sensor
// collaborator hands us crossing reports. Nothing in here blocks.
pub struct Race {
    phase: RacePhase,
    tracker: ProgressTracker,
    sensors: Vec<CheckpointSensor>,
    countdown_remaining: f64,
    race_clock: f64,
    standings: Vec<CarID>,
}

impl Race {
    pub fn new(track: &Track) -> Race {
        Race {
            phase: RacePhase::Setup,
            tracker: ProgressTracker::new(track.checkpoint_count(), GLOBAL_CONFIG.total_laps),
            sensors: sensors_for_track(track),
            countdown_remaining: 0.0,
            race_clock: 0.0,
            standings: Vec::new(),
        }
    }

    // Cars can only join before the green light.
    pub fn register_car(&mut self) -> Option<CarID> {
        if !self.phase.allows_registration() {
            return None;
        }
        Some(self.tracker.register())
    }

    pub fn start_countdown(&mut self) {
        if self.phase == RacePhase::Setup {
            self.phase = RacePhase::Countdown;
            self.countdown_remaining = GLOBAL_CONFIG.countdown_secs;
        }
    }

    pub fn step(&mut self, dt: f64) {
        match self.phase {
            RacePhase::Setup | RacePhase::Finished => {}
            RacePhase::Countdown => {
                self.countdown_remaining -= dt;
                if self.countdown_remaining <= 0.0 {
                    info!("race started");
                    self.phase = RacePhase::Running;
                    self.race_clock = 0.0;
                }
            }
            RacePhase::Running => {
                self.race_clock += dt;
                for sensor in self.sensors.iter_mut() {
                    sensor.tick(dt);
                }
                self.tracker.tick(self.race_clock);
                self.standings = self.tracker.compute_standings();
                if self.tracker.all_finished() {
                    info!("all cars finished, race over");
                    self.phase = RacePhase::Finished;
                }
            }
        }
    }

    // A crossing reported by the collision layer. Runs the sensor's debounce
    // first, then lets the tracker decide whether the index is the next one
    // in racing order. Reports that don't line up with anything are dropped,
    // never errors.
    pub fn on_checkpoint_crossed(&mut self, car: CarID, index: CheckpointIndex) {
        if !self.phase.control_enabled() {
            return;
        }
        let sensor = match self.sensors.iter_mut().find(|s| s.index() == index) {
            Some(sensor) => sensor,
            None => {
                debug!("crossing report for unknown checkpoint {}", index);
                return;
            }
        };
        if let Some(crossing) = sensor.report_crossing(car) {
            self.tracker.record_checkpoint(crossing.car, crossing.checkpoint);
        }
    }

    pub fn phase(&self) -> RacePhase {
        self.phase
    }

    pub fn control_enabled(&self) -> bool {
        self.phase.control_enabled()
    }

    // Ceiling-rounded so the HUD ticks 3-2-1 instead of 2-1-0.
    pub fn countdown_seconds_remaining(&self) -> u64 {
        self.countdown_remaining.max(0.0).ceil() as u64
    }

    pub fn countdown_label(&self) -> String {
        if self.countdown_remaining > 0.0 {
            self.countdown_seconds_remaining().to_string()
        } else {
            String::from("GO!")
        }
    }

    pub fn car_lap(&self, car: CarID) -> Option<LapNumber> {
        self.tracker.progress(car).map(|p| p.lap)
    }

    pub fn car_placement(&self, car: CarID) -> Option<Placement> {
        self.tracker.progress(car).map(|p| p.placement)
    }

    pub fn car_race_time(&self, car: CarID) -> Option<f64> {
        self.tracker.progress(car).map(|p| p.race_time)
    }

    pub fn car_finished(&self, car: CarID) -> Option<bool> {
        self.tracker.progress(car).map(|p| p.finished)
    }

    pub fn car_count(&self) -> usize {
        self.tracker.car_count()
    }

    // Progress-ordered car ids from the latest step.
    pub fn standings(&self) -> &[CarID] {
        &self.standings
    }

    // Only meaningful once the race is over; ranked by finish time rather
    // than by the live progress order.
    pub fn final_standings(&self) -> Vec<(CarID, Placement, f64)> {
        self.tracker.final_standings()
    }

    pub fn all_finished(&self) -> bool {
        self.tracker.all_finished()
    }

    // Back to the grid: every record re-seeded, every sensor re-armed, and
    // the countdown runs again in full. Calling this twice in a row lands on
    // exactly the same state as calling it once.
    pub fn restart(&mut self) {
        self.tracker.reset();
        for sensor in self.sensors.iter_mut() {
            sensor.rearm();
        }
        self.race_clock = 0.0;
        self.standings.clear();
        self.phase = RacePhase::Countdown;
        self.countdown_remaining = GLOBAL_CONFIG.countdown_secs;
    }
}
