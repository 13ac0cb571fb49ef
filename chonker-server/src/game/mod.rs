use std::net::TcpListener;
use std::thread;
use std::time::{Duration, Instant};

use chonker_core::car_state::CarState;
use chonker_core::lap_info::{LapNumber, Placement};
use chonker_core::networking::{CarEffect, ClientBoundPacket, ClientConnection, ServerBoundPacket};
use chonker_core::sync::StatePublisher;
use chonker_core::{CarID, GLOBAL_CONFIG};
use log::{debug, info, warn};

use crate::map::Track;
use crate::race::Race;

use self::phase::RacePhase;

pub mod phase;

pub struct GameServer {
    listener: TcpListener,
    connections: Vec<ClientConnection>,
    race: Race,
    cars: Vec<CarSlot>,
    clock: f64,
}

// Everything the server tracks about one connected car outside of race
// progress: the latest validated telemetry, the publisher shadow used to
// decide when to relay it, and what we last told the client about its lap
// and placement.
struct CarSlot {
    state: CarState,
    publisher: StatePublisher,
    last_lap: LapNumber,
    last_placement: Placement,
    announced_finish: bool,
}

impl CarSlot {
    fn new() -> CarSlot {
        let state = CarState::at_rest(GLOBAL_CONFIG.max_health);
        CarSlot {
            state,
            publisher: StatePublisher::new(state),
            last_lap: 0,
            last_placement: 1,
            announced_finish: false,
        }
    }

    // Client-authoritative telemetry. Garbage is dropped and the last valid
    // state stays in effect; a transport hiccup is not a state transition.
    fn apply_telemetry(&mut self, state: CarState) {
        if !state.is_valid(GLOBAL_CONFIG.max_health) {
            debug!("rejecting malformed telemetry");
            return;
        }
        self.state = state;
    }

    fn reset(&mut self) {
        self.state = CarState::at_rest(GLOBAL_CONFIG.max_health);
        self.publisher = StatePublisher::new(self.state);
        self.last_lap = 0;
        self.last_placement = 1;
        self.announced_finish = false;
    }
}

impl GameServer {
    pub fn new(ip_addr: String, track: &Track) -> GameServer {
        // start the TCP listening service
        let listener =
            TcpListener::bind(&ip_addr).expect("could not bind to configured server address");
        info!("game server now listening on {}", ip_addr);

        GameServer {
            listener,
            connections: Vec::new(),
            race: Race::new(track),
            cars: Vec::new(),
            clock: 0.0,
        }
    }

    // WARNING: this function never returns
    pub fn start_loop(&mut self) {
        let max_server_tick_duration = Duration::from_millis(GLOBAL_CONFIG.server_tick_ms);
        let tick_secs = max_server_tick_duration.as_secs_f64();

        loop {
            self.block_until_minimum_connections();

            let start_time = Instant::now();
            self.clock += tick_secs;

            // poll for packets and add them to the incoming queues
            self.connections
                .iter_mut()
                .for_each(|con| con.fetch_incoming_packets());

            self.process_incoming_packets();

            let phase_before = self.race.phase();
            self.race.step(tick_secs);
            self.sync_race_events(phase_before);
            self.sync_car_states();

            // empty outgoing packet queues and send to clients
            self.connections
                .iter_mut()
                .for_each(|con| con.sync_outgoing());

            // wait until server tick time has elapsed; an overlong tick just
            // rolls straight into the next one
            let remaining_tick_duration =
                max_server_tick_duration.saturating_sub(start_time.elapsed());
            thread::sleep(remaining_tick_duration);
        }
    }

    // blocks the primary loop until we have the minimum player count, then
    // starts the countdown
    fn block_until_minimum_connections(&mut self) {
        while self.connections.len() < GLOBAL_CONFIG.car_amount {
            match self.listener.accept() {
                Ok((socket, addr)) => {
                    let car = match self.race.register_car() {
                        Some(car) => car,
                        None => {
                            warn!("turning away {}; the race has already started", addr.ip());
                            continue;
                        }
                    };
                    info!("new connection from {}, racing as car {}", addr.ip(), car);
                    let mut connection = ClientConnection::new(socket);
                    connection.push_outgoing(ClientBoundPacket::CarNumber(car));
                    self.connections.push(connection);
                    self.cars.push(CarSlot::new());
                }
                Err(e) => warn!("couldn't get connecting client info {:?}", e),
            }
        }

        if self.race.phase() == RacePhase::Setup {
            self.race.start_countdown();
            self.broadcast(ClientBoundPacket::GameStart(Duration::from_secs_f64(
                GLOBAL_CONFIG.countdown_secs,
            )));
        }
    }

    // handle every packet in received order
    fn process_incoming_packets(&mut self) {
        let mut effects: Vec<(CarID, CarEffect)> = Vec::new();
        let mut restart_requested = false;

        for (car, connection) in self.connections.iter_mut().enumerate() {
            while let Some(packet) = connection.pop_incoming() {
                match packet {
                    ServerBoundPacket::CarStateUpdate(state) => {
                        self.cars[car].apply_telemetry(state);
                    }
                    ServerBoundPacket::CheckpointCrossed(index) => {
                        self.race.on_checkpoint_crossed(car, index);
                    }
                    ServerBoundPacket::CollectedPowerUp => {
                        effects.push((car, CarEffect::PowerUpCollected));
                    }
                    ServerBoundPacket::TookDamage(amount) => {
                        effects.push((car, CarEffect::DamageTaken(amount)));
                    }
                    ServerBoundPacket::RequestRestart => {
                        restart_requested = true;
                    }
                }
            }
        }

        for (car, effect) in effects {
            self.broadcast(ClientBoundPacket::CarEffectEvent(car, effect));
        }
        if restart_requested {
            self.restart_race();
        }
    }

    // tell each client what changed for its own car this step, and everyone
    // when the whole race wraps up
    fn sync_race_events(&mut self, phase_before: RacePhase) {
        for (car, slot) in self.cars.iter_mut().enumerate() {
            let lap = match self.race.car_lap(car) {
                Some(lap) => lap,
                None => continue,
            };
            if lap != slot.last_lap {
                slot.last_lap = lap;
                self.connections[car].push_outgoing(ClientBoundPacket::LapUpdate(lap));
            }

            if let Some(placement) = self.race.car_placement(car) {
                if placement != slot.last_placement {
                    slot.last_placement = placement;
                    self.connections[car].push_outgoing(ClientBoundPacket::PlacementUpdate(placement));
                }
            }

            if self.race.car_finished(car) == Some(true) && !slot.announced_finish {
                slot.announced_finish = true;
                // rank at the moment of crossing the line
                if let Some(&(_, placement, _)) = self
                    .race
                    .final_standings()
                    .iter()
                    .find(|(finisher, _, _)| *finisher == car)
                {
                    self.connections[car].push_outgoing(ClientBoundPacket::FinishedRace(placement));
                }
            }
        }

        if phase_before != RacePhase::Finished && self.race.phase() == RacePhase::Finished {
            let results = self.race.final_standings();
            self.broadcast(ClientBoundPacket::RaceResults(results));
        }
    }

    // relay each car's latest telemetry to everyone else, but only when its
    // publisher decides the drift is worth the bandwidth
    fn sync_car_states(&mut self) {
        for (car, slot) in self.cars.iter_mut().enumerate() {
            if let Some(state) = slot.publisher.publish(self.clock, &slot.state) {
                for (other, connection) in self.connections.iter_mut().enumerate() {
                    if other != car {
                        connection.push_outgoing(ClientBoundPacket::CarStateUpdate(car, state));
                    }
                }
            }
        }
    }

    fn restart_race(&mut self) {
        info!("restarting the race");
        self.race.restart();
        for slot in self.cars.iter_mut() {
            slot.reset();
        }
        self.broadcast(ClientBoundPacket::RestartRace);
        self.broadcast(ClientBoundPacket::GameStart(Duration::from_secs_f64(
            GLOBAL_CONFIG.countdown_secs,
        )));
    }

    fn broadcast(&mut self, packet: ClientBoundPacket) {
        for connection in self.connections.iter_mut() {
            connection.push_outgoing(packet.clone());
        }
    }
}
