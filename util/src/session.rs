//! Session management

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use chrono::{DateTime, Utc};
use conquer_once::OnceCell;
use erased_serde::Serialize;
use log::{info, warn};
use std::fs;
use std::fs::OpenOptions;
use std::path::Path;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;
use std::thread::JoinHandle;
use thiserror::Error;

// Internal imports
use crate::time;

// ---------------------------------------------------------------------------
// STATICS
// ---------------------------------------------------------------------------

static SESSION_EPOCH: OnceCell<DateTime<Utc>> = OnceCell::uninit();

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// A chrono format string which diplays a timestamp. See
/// https://docs.rs/chrono/0.4.11/chrono/format/strftime/index.html for more
/// information.
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A struct storing information about the current session
pub struct Session {
    /// The root directory for this session
    pub session_root: PathBuf,

    /// The root directory for this session's archives
    pub arch_root: PathBuf,

    /// The path to the session's log file
    pub log_file_path: PathBuf,

    save_sender: Sender<SaveMsg>,

    save_thread: JoinHandle<()>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors associated with the session module.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Cannot locate the sessions directory: {0}")]
    SwRootNotSet(crate::host::HostError),

    #[error("Cannot create the session directory: {0}")]
    CannotCreateDir(std::io::Error),

    #[error(
        "Cannot initialise the session epoch, have you already initialised the \
         session? (conquer_once error: {0})"
    )]
    CannotInitEpoch(conquer_once::TryInitError),

    #[error("Cannot get the epoch time, did you forget to initialise the session?")]
    CannotGetEpoch,
}

/// Messages handled by the save thread.
enum SaveMsg {
    Save(PathBuf, Box<dyn Serialize + Send>),
    Stop,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Session {
    /// Start a new session within the given directory.
    ///
    /// This will create a new session directory named `{exec_name}_{timestamp}` inside
    /// `$BASESTATION_SW_ROOT/{sessions_dir}`.
    pub fn new(exec_name: &str, sessions_dir: &str) -> Result<Self, SessionError> {
        SESSION_EPOCH
            .try_init_once(Utc::now)
            .map_err(SessionError::CannotInitEpoch)?;

        let timestamp = match SESSION_EPOCH.get() {
            Some(e) => e.format(TIMESTAMP_FORMAT),
            None => return Err(SessionError::CannotGetEpoch),
        };

        let mut path = crate::host::get_sw_root().map_err(SessionError::SwRootNotSet)?;
        path.push(sessions_dir);
        path.push(format!("{}_{}", exec_name, timestamp));

        fs::create_dir_all(&path).map_err(SessionError::CannotCreateDir)?;

        let arch_path = path.join("arch");
        fs::create_dir_all(&arch_path).map_err(SessionError::CannotCreateDir)?;

        let log_file_path = path.join(format!("{}.log", exec_name));

        let (tx, rx) = channel();
        let session_root = path.clone();
        let save_thread = thread::spawn(move || save_thread(session_root, rx));

        Ok(Session {
            session_root: path,
            arch_root: arch_path,
            log_file_path,
            save_sender: tx,
            save_thread,
        })
    }

    /// Exit the session, waiting for the save thread to finish any pending saves.
    pub fn exit(self) {
        info!("Stopping save thread");

        if self.save_sender.send(SaveMsg::Stop).is_err() {
            warn!("Save thread already stopped");
        }

        match self.save_thread.join() {
            Ok(_) => info!("Save thread exited"),
            Err(_) => warn!("Save thread panicked"),
        }
    }

    /// Saves the given data to the given session-relative path in a background thread.
    pub fn save<P: AsRef<Path>, T: Serialize + Send + 'static>(&self, path: P, data: T) {
        if let Err(e) = self
            .save_sender
            .send(SaveMsg::Save(path.as_ref().to_path_buf(), Box::new(data)))
        {
            warn!(
                "Could not send data to be saved to path {:?}: {}",
                path.as_ref(),
                e
            )
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the number of seconds elapsed since the start of the session.
///
/// # Panics
/// - This function will panic if the session epoch has not been
///   initialised, which is performed on creating a new Session instance.
pub fn get_elapsed_seconds() -> f64 {
    let elapsed = Utc::now() - *get_epoch();
    time::duration_to_seconds(elapsed).unwrap_or(std::f64::NAN)
}

/// Get the number of seconds elapsed since the start of the session, or `None` if no session has
/// been started.
pub fn try_get_elapsed_seconds() -> Option<f64> {
    SESSION_EPOCH
        .get()
        .and_then(|epoch| time::duration_to_seconds(Utc::now() - *epoch))
}

/// Return a reference to the session's epoch.
///
/// # Panics
/// - This function will panic if the session epoch has not been
///   initialised, which is performed on creating a new Session instance.
pub fn get_epoch() -> &'static DateTime<Utc> {
    match SESSION_EPOCH.get() {
        Some(e) => e,
        None => panic!("Cannot get the session epoch!"),
    }
}

// -----------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// -----------------------------------------------------------------------------------------------

fn save_thread(session_root: PathBuf, receiver: Receiver<SaveMsg>) {
    // Exits on an explicit stop or once every sender has been dropped
    while let Ok(msg) = receiver.recv() {
        let (path, data) = match msg {
            SaveMsg::Save(p, d) => (p, d),
            SaveMsg::Stop => break,
        };

        let full_path = session_root.join(path);

        if let Err(e) = write_json(&full_path, &*data) {
            warn!("Couldn't save {:?}: {}", full_path, e);
        }
    }
}

fn write_json(full_path: &Path, data: &(dyn Serialize + Send)) -> Result<(), String> {
    match full_path.extension().and_then(|s| s.to_str()) {
        Some("json") => (),
        ext => return Err(format!("unrecognised file extension {:?}", ext)),
    }

    if let Some(parent) = full_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("couldn't create parent directory: {}", e))?;
    }

    let file = OpenOptions::new()
        .write(true)
        .truncate(true)
        .create(true)
        .open(full_path)
        .map_err(|e| format!("couldn't create file: {}", e))?;

    serde_json::to_writer_pretty(&file, data)
        .map_err(|e| format!("couldn't serialize data: {}", e))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_write_json_extension() {
        let dir = std::env::temp_dir().join(format!("session_test_{}", std::process::id()));
        let data: Box<dyn Serialize + Send> = Box::new(vec![1u8, 2, 3]);

        assert!(write_json(&dir.join("views.csv"), &*data).is_err());
        assert!(write_json(&dir.join("views.json"), &*data).is_ok());
        assert_eq!(
            fs::read_to_string(dir.join("views.json"))
                .unwrap()
                .split_whitespace()
                .collect::<String>(),
            "[1,2,3]"
        );

        fs::remove_dir_all(&dir).unwrap();
    }
}
