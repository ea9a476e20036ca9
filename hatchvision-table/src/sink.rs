//! StateSink implementations

use crate::connection::TableConnection;
use crate::table::SharedTable;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hatchvision_core::{Direction, Error, Offset, PublishLayout, Result, RobotMode, StateSink};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::sync::Arc;
use tracing::debug;

pub const OFFSET_KEY: &str = "Offset";
pub const DIRECTION_KEY: &str = "Direction";
pub const DISTANCE_KEY: &str = "Distance";
pub const MODE_KEY: &str = "isTeleop";

/// Publishes offsets into a table of the shared store
pub struct TableSink {
    name: String,
    connection: Arc<TableConnection>,
    table: Arc<SharedTable>,
    layout: PublishLayout,
}

impl TableSink {
    pub fn new(connection: Arc<TableConnection>, table_path: &str, layout: PublishLayout) -> Self {
        let table = connection.get_table(table_path);
        Self {
            name: format!("table:{}", table_path),
            connection,
            table,
            layout,
        }
    }

    pub fn table(&self) -> &Arc<SharedTable> {
        &self.table
    }

    pub fn layout(&self) -> PublishLayout {
        self.layout
    }
}

#[async_trait]
impl StateSink for TableSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_ready(&self) -> bool {
        self.connection.is_connected()
    }

    async fn publish(&self, offset: &Offset) -> Result<()> {
        if !self.is_ready() {
            return Err(Error::SinkUnavailable(format!(
                "{} is not connected",
                self.connection.server()
            )));
        }

        match self.layout {
            PublishLayout::Offset => {
                self.table.put_number(OFFSET_KEY, offset.value);
                self.table.put_string(DIRECTION_KEY, offset.direction.as_str());
            }
            PublishLayout::DirectionDistance => {
                self.table.put_string(DIRECTION_KEY, offset.direction.as_str());
                self.table.put_number(DISTANCE_KEY, offset.magnitude());
            }
        }

        debug!("Published {} to {}", offset, self.table.path());
        Ok(())
    }

    fn mode(&self) -> RobotMode {
        RobotMode::from_flag(self.table.get_number(MODE_KEY, 1.0))
    }
}

/// One published offset, as written by [`JsonLinesSink`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishedRecord {
    pub timestamp: DateTime<Utc>,
    pub offset: f64,
    pub direction: Direction,
    pub distance: f64,
}

/// Writes one JSON object per offset to a writer, for piping into an
/// external bridge process
pub struct JsonLinesSink<W: Write + Send> {
    writer: Mutex<W>,
    mode: RobotMode,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
            mode: RobotMode::Teleop,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

#[async_trait]
impl<W: Write + Send> StateSink for JsonLinesSink<W> {
    fn name(&self) -> &str {
        "json-lines"
    }

    fn is_ready(&self) -> bool {
        true
    }

    async fn publish(&self, offset: &Offset) -> Result<()> {
        let record = PublishedRecord {
            timestamp: Utc::now(),
            offset: offset.value,
            direction: offset.direction,
            distance: offset.magnitude(),
        };
        let line = serde_json::to_string(&record).map_err(|e| Error::Serialization(e.to_string()))?;

        let mut writer = self.writer.lock();
        writeln!(writer, "{}", line)
            .and_then(|_| writer.flush())
            .map_err(|e| Error::SinkUnavailable(format!("write failed: {}", e)))
    }

    fn mode(&self) -> RobotMode {
        self.mode
    }
}
