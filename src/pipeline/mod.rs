//! Pipeline entry points for monitor operations.
//!
//! - `run_checks`: Check every stored monitor and record snapshot diffs
//! - `add_monitor` / `subscribe`: Register monitors and queue pushed items
//! - `run_validate`: Validate configuration and organisation files

pub mod check;
pub mod diff;
pub mod guard;
pub mod manage;
pub mod validate;

pub use check::{CheckOutcome, CheckReport, check_monitors, run_checks};
pub use diff::{Diff, DiffCalculator, DiffResult, calculate_diff};
pub use guard::{GuardResult, SnapshotGuard};
pub use manage::{add_monitor, subscribe};
pub use validate::run_validate;
