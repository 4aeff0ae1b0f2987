//! Tiered configuration.
//!
//! Settings are merged field-by-field from, lowest priority first:
//! 1. **Defaults** - built into the binary
//! 2. **Project** - `$CWD/task-manager/config.yaml`
//! 3. **User** - `~/.task-manager/config.yaml`
//! 4. **Environment** - the variables below
//!
//! Command-line flags are applied on top by the binary.
//!
//! ## Environment Variables
//! - `TASK_MANAGER_CONFIG_PATH` - Explicit config file (replaces the project and user tiers)
//! - `TASK_MANAGER_DB_PATH` - Database path
//! - `TASK_MANAGER_HOST` - Bind address
//! - `TASK_MANAGER_PORT` - Bind port
//! - `TASK_MANAGER_PROJECT_DIR` - Project config dir (default: `./task-manager`)
//! - `TASK_MANAGER_USER_DIR` - User config dir (default: `~/.task-manager`)

mod loader;
mod merge;
mod types;

pub use loader::{ConfigLoader, ConfigPaths, ConfigTier};
pub use merge::deep_merge;
pub use types::*;
