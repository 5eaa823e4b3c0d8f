//! Main ground-side executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all display modules
//!     - Main loop:
//!         - Telemetry acquisition from the replay script
//!         - Orientation display processing
//!         - Map display processing
//!         - Archiving and monitoring
//!     - Tear down the displays and save their final views
//!
//! # Usage
//!
//! ```text
//! gnd_exec <tm_script_path>
//! ```
//!
//! # Modules
//!
//! All display modules (e.g. `map_disp`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.
//!     2. Implement `util::archive::Archived` for their per cycle summaries.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use gnd_lib::{
    data_store::DataStore, map_disp::MapDisp, orient_disp::OrientDisp, params::GndExecParams,
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use serde::Serialize;
use std::env;
use std::fmt::Display;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use util::{
    archive::Archived,
    host,
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
    tm_script::{PendingFrames, TmScript},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The last view produced by each display, saved at the end of the session.
#[derive(Serialize)]
struct FinalViews {
    num_cycles: u128,
    num_tm_frames: u64,
    orient_disp: Option<gnd_lib::orient_disp::Scene>,
    map_disp: Option<gnd_lib::map_disp::MapView>,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("gnd_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Basestation Ground Executable\n");
    info!("Running on: {}", host::get_platform());
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: GndExecParams =
        util::params::load("gnd_exec.toml").wrap_err("Could not load exec params")?;

    exec_params.validate().wrap_err("Invalid exec params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE TM SOURCE ----

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    if args.len() != 2 {
        return Err(eyre!(
            "Expected exactly one argument, the path to a TM script, found {}",
            args.len() - 1
        ));
    }

    info!("Loading TM script from \"{}\"", &args[1]);

    let mut tm_script = TmScript::new(&args[1]).wrap_err("Failed to load the TM script")?;

    info!(
        "Loaded script lasts {:.02} s and contains {} frames\n",
        tm_script.get_duration(),
        tm_script.get_num_frames()
    );

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    // ---- INITIALISE MODULES ----

    ds.orient_disp
        .init("orient_disp.toml", &session)
        .wrap_err_with(|| format!("Failed to initialise {}", OrientDisp::NAME))?;
    info!("{} init complete", OrientDisp::NAME);

    ds.map_disp
        .init("map_disp.toml", &session)
        .wrap_err_with(|| format!("Failed to initialise {}", MapDisp::NAME))?;
    info!("{} init complete", MapDisp::NAME);

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let cycle_period = Duration::from_secs_f64(exec_params.cycle_period_s);

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(exec_params.cycle_frequency_hz(), chrono::Utc::now());

        // ---- TELEMETRY ACQUISITION ----

        match tm_script.get_pending_frames(ds.session_time_s) {
            PendingFrames::None => (),
            PendingFrames::Some(frames) => {
                for frame in frames.iter() {
                    ds.apply_tm_frame(frame);
                }
            }
            // Exit if end of script reached
            PendingFrames::EndOfScript => {
                info!("End of TM script reached, stopping");
                break;
            }
        }

        // ---- DISPLAY PROCESSING ----

        // OrientDisp processing
        let orient_disp_input = ds.orient_disp_input();
        if let Some((o, r)) = proc_display(&mut ds.orient_disp, &orient_disp_input) {
            ds.orient_disp_output = Some(o);
            ds.orient_disp_status_rpt = r;
        }

        // MapDisp processing
        let map_disp_input = ds.map_disp_input();
        if let Some((o, r)) = proc_display(&mut ds.map_disp, &map_disp_input) {
            ds.map_disp_output = Some(o);
            ds.map_disp_status_rpt = r;
        }

        // ---- WRITE ARCHIVES ----

        if exec_params.archive {
            if let Err(e) = ds.orient_disp.write() {
                warn!("Could not write {} archive: {}", OrientDisp::NAME, e);
            }
            if let Err(e) = ds.map_disp.write() {
                warn!("Could not write {} archive: {}", MapDisp::NAME, e);
            }
        }

        // ---- MONITORING ----

        if ds.is_1_hz_cycle {
            info!(
                "Cycle {}: {} TM frames, orientation {} (degraded: {:?}), trail {} points, \
                heading {:.1} deg",
                ds.num_cycles,
                ds.num_tm_frames,
                match ds.orient_disp_status_rpt.orientation_present {
                    true => "present",
                    false => "absent",
                },
                ds.orient_disp_status_rpt.degraded,
                ds.map_disp_status_rpt.trail_len,
                ds.map_disp.rotation_angle_deg()
            );
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
                );
                ds.num_consec_cycle_overruns += 1;
            }
        }

        // Increment cycle counter
        ds.num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    ds.orient_disp.teardown();
    ds.map_disp.teardown();
    info!("Displays torn down");

    session.save(
        "final_views.json",
        FinalViews {
            num_cycles: ds.num_cycles,
            num_tm_frames: ds.num_tm_frames,
            orient_disp: ds.orient_disp_output.take(),
            map_disp: ds.map_disp_output.take(),
        },
    );

    info!("End of execution");

    session.exit();

    Ok(())
}

/// Run one cycle of a display, logging and discarding any processing error.
fn proc_display<S>(
    disp: &mut S,
    input: &S::InputData,
) -> Option<(S::OutputData, S::StatusReport)>
where
    S: State,
    S::ProcError: Display,
{
    match disp.proc(input) {
        Ok(out) => Some(out),
        Err(e) => {
            warn!("Error during {} processing: {}", S::NAME, e);
            None
        }
    }
}
