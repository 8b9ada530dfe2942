pub mod client;
pub mod controller;
pub mod error;
pub mod fitter;
pub mod models;
pub mod poller;
pub mod sender;
pub mod source_view;
pub mod state;
pub mod throttle;
pub mod volume;

#[cfg(feature = "mock")]
pub mod mock;

// Re-export key types for easier access
pub use client::{ApiClient, DeviceApi};
pub use controller::Controller;
pub use error::{AmpError, Result};
pub use fitter::{fittest_representation, select_best_groups, BestGroups, Representation};
pub use models::{Group, GroupId, Source, SourceId, Status, Zone, ZoneId};
pub use poller::{PollEvent, Poller};
pub use sender::{SendEvent, VolumeSender};
pub use source_view::{ControlTarget, GroupControl, SourceView};
pub use state::{PollOutcome, PollTicket, StateCache};
pub use volume::{
    aggregate_group_volume, aggregate_mute, aggregate_volume, apply_representative_volume,
};
