//! pluginship git - release tag discovery
//!
//! Tags are found with the git CLI rather than a library binding so that the
//! exact `git describe` matching rules (glob patterns, reachability from HEAD)
//! apply.

mod describe;

pub use describe::{GitCli, Result};
