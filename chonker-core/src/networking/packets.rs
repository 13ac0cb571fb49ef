use std::io::{Read, Write};
use std::time::Duration;

use bincode::{DefaultOptions, Options, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::car_state::CarState;
use crate::lap_info::{CheckpointIndex, LapNumber, Placement};
use crate::CarID;

// Cosmetic one-shot events relayed to every client so they can play the
// matching effect locally.
#[derive(Serialize, Deserialize, Clone, Copy, Debug)]
pub enum CarEffect {
    PowerUpCollected,
    DamageTaken(f64),
}

#[derive(Serialize, Deserialize)]
pub enum ServerBoundPacket {
    // During game: the client is authoritative for its own car and streams
    // the full telemetry tuple whenever its publisher decides to
    CarStateUpdate(CarState),
    // the client's collision layer saw its car cross a sensor
    CheckpointCrossed(CheckpointIndex),
    CollectedPowerUp,
    TookDamage(f64),

    // After game
    RequestRestart,
}

#[derive(Serialize, Deserialize, Clone)]
pub enum ClientBoundPacket {
    // Before game
    CarNumber(CarID),
    GameStart(#[serde(with = "serde_millis")] Duration), // how long until control unlocks?

    // During game
    CarStateUpdate(CarID, CarState), // latest authoritative state of someone else's car
    LapUpdate(LapNumber),            // what lap are you now on?
    PlacementUpdate(Placement),      // what place in the race are you now at?
    FinishedRace(Placement),         // you completed all laps, what place did you get?
    CarEffectEvent(CarID, CarEffect),

    // After game
    RaceResults(Vec<(CarID, Placement, f64)>),
    RestartRace,
}

pub trait Packet: Serialize + DeserializeOwned {
    fn parse_packet<R: Read>(reader: &mut R) -> Result<Self> {
        DefaultOptions::new().deserialize_from(reader)
    }
    fn packet_size(&self) -> Result<u64> {
        DefaultOptions::new().serialized_size(self)
    }
    fn write_packet<W: Write>(&self, write: &mut W) -> Result<()> {
        DefaultOptions::new().serialize_into(write, self)
    }
}

impl Packet for ClientBoundPacket {}
impl Packet for ServerBoundPacket {}
