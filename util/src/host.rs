//! Host platform utility functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::env;
use std::path::PathBuf;
use thiserror::Error;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Environment variable pointing at the root of the software tree, which contains the `params`
/// and `sessions` directories.
pub const SW_ROOT_ENV_VAR: &str = "BASESTATION_SW_ROOT";

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum HostError {
    #[error("The software root environment variable ({}) is not set", SW_ROOT_ENV_VAR)]
    SwRootNotSet,

    #[error("The software root ({0:?}) is not a directory")]
    SwRootNotADir(PathBuf),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the root directory of the software tree from the environment.
pub fn get_sw_root() -> Result<PathBuf, HostError> {
    let root = match env::var_os(SW_ROOT_ENV_VAR) {
        Some(r) => PathBuf::from(r),
        None => return Err(HostError::SwRootNotSet),
    };

    if !root.is_dir() {
        return Err(HostError::SwRootNotADir(root));
    }

    Ok(root)
}

/// Name of the operating system and architecture the exec was built for, e.g. `linux/x86_64`.
pub fn get_platform() -> String {
    format!("{}/{}", env::consts::OS, env::consts::ARCH)
}
