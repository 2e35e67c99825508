//! Followings exporter core: data model, filters, snapshot diffing and the pure
//! presentation state machine.
mod diff;
mod effect;
mod filter;
mod followee;
mod msg;
mod state;
mod update;
mod view_model;

pub use diff::{compute_diff, DiffResult, Snapshot};
pub use effect::Effect;
pub use filter::{apply_filters, private_only, verified_only, FilterOptions};
pub use followee::{Flag, Followee, ProfileDetails, PROFILE_BASE_URL};
pub use msg::Msg;
pub use state::{Activity, AppState, RunOption, RunOutcome, RunReport, RunRequest, Stage};
pub use update::update;
pub use view_model::{AppViewModel, ReportView};
