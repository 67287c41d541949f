//! Exit codes for the CLI

#![allow(dead_code)]

use pluginship_core::PluginshipError;

/// Success
pub const SUCCESS: i32 = 0;

/// General error
pub const ERROR: i32 = 1;

/// Configuration or project input error
pub const CONFIG_ERROR: i32 = 2;

/// Git error
pub const GIT_ERROR: i32 = 3;

/// External tool (jprm) error
pub const TOOL_ERROR: i32 = 6;

/// Map an error to the process exit code
pub fn for_error(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<PluginshipError>() {
        Some(PluginshipError::Git(_)) => GIT_ERROR,
        Some(PluginshipError::Tool(_)) => TOOL_ERROR,
        Some(e) if e.is_input_error() => CONFIG_ERROR,
        _ => ERROR,
    }
}
