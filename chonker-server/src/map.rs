use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use glam::DVec3;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackError {
    #[error("could not read track file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse track file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("track defines no checkpoints")]
    NoCheckpoints,
}

// A track is an ordered loop of checkpoint positions. Position 0 is the
// start/finish line; the rest follow in racing order. Immutable once loaded.
#[derive(Deserialize)]
pub struct Track {
    pub name: String,
    checkpoints: Vec<DVec3>,
}

impl Track {
    pub fn new(name: &str, checkpoints: Vec<DVec3>) -> Result<Track, TrackError> {
        if checkpoints.is_empty() {
            return Err(TrackError::NoCheckpoints);
        }
        Ok(Track {
            name: String::from(name),
            checkpoints,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Track, TrackError> {
        let file = File::open(path)?;
        let track: Track = serde_json::from_reader(BufReader::new(file))?;
        // an empty track is a configuration error and has to surface before
        // the countdown ever starts
        if track.checkpoints.is_empty() {
            return Err(TrackError::NoCheckpoints);
        }
        Ok(track)
    }

    pub fn checkpoint_count(&self) -> u64 {
        self.checkpoints.len() as u64
    }

    pub fn checkpoint_positions(&self) -> &[DVec3] {
        &self.checkpoints
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_track_is_rejected() {
        assert!(matches!(
            Track::new("void", Vec::new()),
            Err(TrackError::NoCheckpoints)
        ));
    }

    #[test]
    fn test_checkpoint_count() {
        let track = Track::new(
            "tiny",
            vec![DVec3::ZERO, DVec3::new(10.0, 0.0, 0.0), DVec3::new(10.0, 0.0, 10.0)],
        )
        .unwrap();
        assert_eq!(track.checkpoint_count(), 3);
    }
}
