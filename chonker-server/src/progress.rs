use chonker_core::lap_info::{CarProgress, CheckpointIndex, LapNumber, Placement};
use chonker_core::CarID;
use log::debug;

// Owns every car's progress record for one race. Records live in an arena
// indexed by CarID, the handle issued at registration.
pub struct ProgressTracker {
    records: Vec<CarProgress>,
    checkpoint_count: CheckpointIndex,
    total_laps: LapNumber,
}

impl ProgressTracker {
    pub fn new(checkpoint_count: CheckpointIndex, total_laps: LapNumber) -> ProgressTracker {
        ProgressTracker {
            records: Vec::new(),
            checkpoint_count,
            total_laps,
        }
    }

    pub fn register(&mut self) -> CarID {
        self.records.push(CarProgress::new());
        self.records.len() - 1
    }

    pub fn car_count(&self) -> usize {
        self.records.len()
    }

    pub fn progress(&self, car: CarID) -> Option<&CarProgress> {
        self.records.get(car)
    }

    // Accept a crossing only if it's the next checkpoint in racing order.
    // Everything else — unknown car, already-finished car, duplicated or
    // reordered sensor event — leaves the record untouched, which is what
    // makes duplicate delivery harmless.
    pub fn record_checkpoint(&mut self, car: CarID, index: CheckpointIndex) -> bool {
        let record = match self.records.get_mut(car) {
            Some(record) => record,
            None => {
                debug!("dropping checkpoint {} report for unknown car {}", index, car);
                return false;
            }
        };

        if record.finished || index != record.checkpoint + 1 {
            return false;
        }

        record.checkpoint = index;
        if index == self.checkpoint_count {
            // crossed back through the start/finish line
            record.lap += 1;
            record.checkpoint = 0;
            if record.lap >= self.total_laps {
                record.finished = true;
            }
        }
        true
    }

    // Finished cars keep the time they crossed the line with.
    pub fn tick(&mut self, elapsed: f64) {
        for record in self.records.iter_mut().filter(|r| !r.finished) {
            record.race_time = elapsed;
        }
    }

    // Live standings order by raw race progress. Elapsed time never enters
    // into it, so two cars between the same pair of checkpoints keep their
    // registration order (the sort is stable).
    pub fn compute_standings(&mut self) -> Vec<CarID> {
        let mut order: Vec<CarID> = (0..self.records.len()).collect();
        order.sort_by(|&a, &b| {
            let key_a = (self.records[a].lap, self.records[a].checkpoint);
            let key_b = (self.records[b].lap, self.records[b].checkpoint);
            key_b.cmp(&key_a)
        });
        for (rank, &car) in order.iter().enumerate() {
            self.records[car].placement = rank as Placement + 1;
        }
        order
    }

    // The results screen ranks finishers by how long they took, unlike the
    // live standings.
    pub fn final_standings(&self) -> Vec<(CarID, Placement, f64)> {
        let mut finishers: Vec<CarID> = (0..self.records.len())
            .filter(|&car| self.records[car].finished)
            .collect();
        finishers.sort_by(|&a, &b| self.records[a].race_time.total_cmp(&self.records[b].race_time));
        finishers
            .iter()
            .enumerate()
            .map(|(rank, &car)| (car, rank as Placement + 1, self.records[car].race_time))
            .collect()
    }

    pub fn all_finished(&self) -> bool {
        !self.records.is_empty() && self.records.iter().all(|r| r.finished)
    }

    pub fn reset(&mut self) {
        for record in self.records.iter_mut() {
            *record = CarProgress::new();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // drive a car through checkpoints 1..=N, i.e. one full lap
    fn run_full_lap(tracker: &mut ProgressTracker, car: CarID, checkpoint_count: u64) {
        for index in 1..=checkpoint_count {
            assert!(tracker.record_checkpoint(car, index));
        }
    }

    #[test]
    fn test_laps_accumulate_over_full_circuits() {
        let mut tracker = ProgressTracker::new(4, 10);
        let car = tracker.register();

        for lap in 1..=3 {
            run_full_lap(&mut tracker, car, 4);
            assert_eq!(tracker.progress(car).unwrap().lap, lap);
            assert_eq!(tracker.progress(car).unwrap().checkpoint, 0);
        }
    }

    #[test]
    fn test_recovers_from_out_of_order_event() {
        let mut tracker = ProgressTracker::new(5, 3);
        let car = tracker.register();

        assert!(tracker.record_checkpoint(car, 1));
        // skipped ahead: not current + 1, so ignored outright
        assert!(!tracker.record_checkpoint(car, 3));
        assert_eq!(tracker.progress(car).unwrap().checkpoint, 1);
        // the genuinely-next checkpoint still lands after the bad event
        assert!(tracker.record_checkpoint(car, 2));
        assert_eq!(tracker.progress(car).unwrap().checkpoint, 2);
    }

    #[test]
    fn test_duplicate_event_is_a_no_op() {
        let mut tracker = ProgressTracker::new(5, 3);
        let car = tracker.register();

        assert!(tracker.record_checkpoint(car, 1));
        let before = *tracker.progress(car).unwrap();
        assert!(!tracker.record_checkpoint(car, 1));
        assert_eq!(*tracker.progress(car).unwrap(), before);
    }

    #[test]
    fn test_unknown_car_is_dropped() {
        let mut tracker = ProgressTracker::new(5, 3);
        tracker.register();
        assert!(!tracker.record_checkpoint(7, 1));
    }

    #[test]
    fn test_standings_order_by_lap_then_checkpoint() {
        let mut tracker = ProgressTracker::new(10, 99);
        let car_a = tracker.register();
        let car_b = tracker.register();
        let car_c = tracker.register();

        // car_a to (lap 2, checkpoint 3)
        run_full_lap(&mut tracker, car_a, 10);
        run_full_lap(&mut tracker, car_a, 10);
        for index in 1..=3 {
            assert!(tracker.record_checkpoint(car_a, index));
        }
        // car_b to (lap 2, checkpoint 5)
        run_full_lap(&mut tracker, car_b, 10);
        run_full_lap(&mut tracker, car_b, 10);
        for index in 1..=5 {
            assert!(tracker.record_checkpoint(car_b, index));
        }
        // car_c to (lap 1, checkpoint 9)
        run_full_lap(&mut tracker, car_c, 10);
        for index in 1..=9 {
            assert!(tracker.record_checkpoint(car_c, index));
        }

        assert_eq!(tracker.compute_standings(), vec![car_b, car_a, car_c]);
        assert_eq!(tracker.progress(car_b).unwrap().placement, 1);
        assert_eq!(tracker.progress(car_a).unwrap().placement, 2);
        assert_eq!(tracker.progress(car_c).unwrap().placement, 3);
    }

    #[test]
    fn test_standings_ties_keep_registration_order() {
        let mut tracker = ProgressTracker::new(10, 99);
        let car_a = tracker.register();
        let car_b = tracker.register();

        // identical progress, even with car_b much faster on the clock
        assert!(tracker.record_checkpoint(car_a, 1));
        assert!(tracker.record_checkpoint(car_b, 1));

        assert_eq!(tracker.compute_standings(), vec![car_a, car_b]);
    }

    #[test]
    fn test_finish_freezes_progress_and_time() {
        let mut tracker = ProgressTracker::new(2, 1);
        let car = tracker.register();

        tracker.tick(42.0);
        run_full_lap(&mut tracker, car, 2);
        assert!(tracker.progress(car).unwrap().finished);

        // neither the clock nor further crossings touch a finished record
        tracker.tick(99.0);
        let before = *tracker.progress(car).unwrap();
        assert!(!tracker.record_checkpoint(car, 1));
        assert_eq!(*tracker.progress(car).unwrap(), before);
        assert_eq!(before.race_time, 42.0);
    }

    #[test]
    fn test_all_finished() {
        let mut tracker = ProgressTracker::new(2, 1);
        assert!(!tracker.all_finished());

        let car_a = tracker.register();
        let car_b = tracker.register();

        run_full_lap(&mut tracker, car_a, 2);
        assert!(!tracker.all_finished());
        run_full_lap(&mut tracker, car_b, 2);
        assert!(tracker.all_finished());
    }

    #[test]
    fn test_final_standings_rank_by_time() {
        let mut tracker = ProgressTracker::new(2, 1);
        let car_a = tracker.register();
        let car_b = tracker.register();

        // car_b crosses the line first even though car_a registered first
        tracker.tick(10.0);
        run_full_lap(&mut tracker, car_b, 2);
        tracker.tick(15.0);
        run_full_lap(&mut tracker, car_a, 2);

        let standings = tracker.final_standings();
        assert_eq!(standings, vec![(car_b, 1, 10.0), (car_a, 2, 15.0)]);
    }

    #[test]
    fn test_reset_reseeds_every_record() {
        let mut tracker = ProgressTracker::new(2, 1);
        let car = tracker.register();
        tracker.tick(5.0);
        run_full_lap(&mut tracker, car, 2);

        tracker.reset();
        assert_eq!(*tracker.progress(car).unwrap(), CarProgress::new());
    }
}
