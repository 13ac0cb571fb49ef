use chonker_core::GLOBAL_CONFIG;
use log::info;

use crate::map::Track;

mod checkpoints;
mod game;
mod map;
mod progress;
mod race;

fn main() {
    env_logger::init();

    let track = Track::load(&GLOBAL_CONFIG.track_file).expect("could not load configured track");
    info!(
        "loaded track '{}' with {} checkpoints",
        track.name,
        track.checkpoint_count()
    );

    // kick off the game loop
    let ip_addr = format!("0.0.0.0:{}", GLOBAL_CONFIG.port);
    game::GameServer::new(ip_addr, &track).start_loop();
}
