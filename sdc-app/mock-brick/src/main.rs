use std::cell::RefCell;

use clap::Parser;
use embassy_executor::{Executor, Spawner};
use sdc_core::mk_static;
use sdc_core::utils::controllers::display::DisplayModule;
use sdc_core::utils::sequence::{VehicleSequencer, VehicleSettings};
use static_cell::StaticCell;
use tracing::{error, info};

mod sim;
use sim::{ConsoleDisplay, ConsoleSpeaker, SimBumper, SimDriveBase, SimRange, SimState, SimSteer};

#[derive(Parser)]
#[clap(version = "1.0")]
struct Opts {
    /// Simulated left mechanical end stop, in degrees
    #[clap(long, default_value_t = -120, allow_hyphen_values = true)]
    left_stop: i32,
    /// Simulated right mechanical end stop, in degrees
    #[clap(long, default_value_t = 60, allow_hyphen_values = true)]
    right_stop: i32,
    /// Initial clearance reported by the simulated distance sensor
    #[clap(long, default_value_t = 20)]
    clearance: i32,
    /// Number of bumper polls before the simulated press
    #[clap(long, default_value_t = 20)]
    press_after: usize,
    /// Vehicle settings JSON file (missing fields keep their defaults)
    #[clap(long)]
    settings: Option<std::path::PathBuf>,
}

#[embassy_executor::task]
async fn display_task(display: DisplayModule<ConsoleDisplay>) -> ! {
    display.run().await
}

#[embassy_executor::task]
async fn main_task(spawner: Spawner) {
    let opts: Opts = Opts::parse();

    let settings = match &opts.settings {
        Some(path) => match std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|s| serde_json::from_str::<VehicleSettings>(&s).map_err(|e| e.to_string()))
        {
            Ok(settings) => settings,
            Err(e) => {
                error!("failed to load settings from {}: {}", path.display(), e);
                return;
            }
        },
        None => VehicleSettings::default(),
    };
    info!("vehicle settings: {:?}", settings);

    spawner
        .spawn(display_task(DisplayModule::new(ConsoleDisplay)))
        .unwrap();

    let state = &*mk_static!(RefCell<SimState>, RefCell::new(SimState::new(opts.clearance)));

    let sequencer = VehicleSequencer::new(
        SimSteer::new(opts.left_stop, opts.right_stop),
        SimDriveBase::new(state),
        SimBumper::new(opts.press_after),
        SimRange::new(state),
        ConsoleSpeaker,
        settings,
    );

    // `run` only comes back on a hardware error; the dance loop never exits.
    match sequencer.run().await {
        Ok(never) => match never {},
        Err(e) => error!("vehicle stopped: {:?}", e),
    }
}

static EXECUTOR: StaticCell<Executor> = StaticCell::new();

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let executor = EXECUTOR.init(Executor::new());
    executor.run(|spawner| {
        spawner.spawn(main_task(spawner)).unwrap();
    });
}
