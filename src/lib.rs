//! AMAN/DMAN core: descent trajectory estimation and runway sequencing.
//!
//! Live aircraft reports are turned into descent trajectories and threshold
//! estimates, which the sequencer orders per runway into timelines for the
//! presentation layer.

pub mod adapter;
pub mod airspeed;
pub mod config;
pub mod errors;
pub mod geo;
pub mod log_format;
pub mod navdata;
pub mod performance;
pub mod planner;
pub mod registration;
pub mod replay;
pub mod route;
pub mod sequencer;
pub mod timeline;
pub mod trajectory;
pub mod weather;

pub use adapter::{JsonLinesSink, MessageFromAtcClient, TimelineSink, TimelineSnapshot};
pub use config::{PlannerConfigFile, planner_config_path};
pub use errors::{RouteError, TrajectoryError};
pub use planner::Planner;
pub use sequencer::Sequencer;
pub use timeline::{NonSequencedReason, SequenceStatus, TimelineEvent};
pub use trajectory::DescentTrajectoryBuilder;
