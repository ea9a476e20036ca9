//! Shared state store (hatchvision-table)
//!
//! A keyed table store through which the vision process publishes offsets
//! and reads the robot mode. The remote transport is external: it reports
//! connection changes through a [`ConnectionListener`] and mirrors table
//! entries to the robot.

pub mod value;
pub mod table;
pub mod connection;
pub mod sink;

pub use value::TableValue;
pub use table::SharedTable;
pub use connection::{TableConnection, ConnectionListener};
pub use sink::{TableSink, JsonLinesSink, PublishedRecord, OFFSET_KEY, DIRECTION_KEY, DISTANCE_KEY, MODE_KEY};
