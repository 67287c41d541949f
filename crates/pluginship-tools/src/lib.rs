//! pluginship tools - JPRM invocations
//!
//! JPRM (the Jellyfin Plugin Repository Manager) does the actual packaging
//! and manifest editing. This crate only knows its command line.

mod jprm;

pub use jprm::{BuildRequest, Jprm};
