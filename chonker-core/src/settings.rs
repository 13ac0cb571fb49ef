use config::{Config, ConfigError, File};
use lazy_static::lazy_static;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct Settings {
    pub port: String,
    pub server_address: String,
    pub server_tick_ms: u64,
    pub car_amount: usize,

    pub track_file: String,
    pub total_laps: u8,
    pub countdown_secs: f64,
    pub checkpoint_rearm_secs: f64,
    pub max_health: f64,

    pub send_rate: f64,
    pub position_threshold: f64,
    pub rotation_threshold_degs: f64,
    pub velocity_threshold: f64,
    pub health_threshold: f64,
    pub position_lerp_rate: f64,
    pub rotation_lerp_rate: f64,
    pub velocity_lerp_rate: f64,
}

impl Settings {
    fn new() -> Result<Settings, ConfigError> {
        let config = Config::builder()
            .set_default("port", "24247")?
            .set_default("server_address", "127.0.0.1")?
            .set_default("server_tick_ms", 30)?
            .set_default("car_amount", 1)?
            .set_default("track_file", "tracks/oval.json")?
            .set_default("total_laps", 3)?
            .set_default("countdown_secs", 3.0)?
            .set_default("checkpoint_rearm_secs", 0.5)?
            .set_default("max_health", 100.0)?
            .set_default("send_rate", 20.0)?
            .set_default("position_threshold", 0.1)?
            .set_default("rotation_threshold_degs", 1.0)?
            .set_default("velocity_threshold", 0.5)?
            .set_default("health_threshold", 0.1)?
            .set_default("position_lerp_rate", 10.0)?
            .set_default("rotation_lerp_rate", 10.0)?
            .set_default("velocity_lerp_rate", 10.0)?
            .add_source(File::with_name("config.yaml").required(false))
            .build()?;

        config.try_deserialize()
    }
}

lazy_static! {
    pub static ref GLOBAL_CONFIG: Settings = Settings::new().expect("failed to read config file");
}
