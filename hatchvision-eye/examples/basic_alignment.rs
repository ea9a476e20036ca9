//! Basic example of using hatchvision-eye
//!
//! Paints two tape strips into synthetic frames, drifting the camera to the
//! right one frame at a time, and publishes offsets into an in-process
//! table.

use hatchvision_core::{AlignmentConfig, PublishLayout};
use hatchvision_eye::{AlignmentLoop, Frame, MemoryFrameSource};
use hatchvision_table::{TableConnection, TableSink};
use image::Rgb;
use std::sync::Arc;
use tokio::sync::watch;

const TAPE: Rgb<u8> = Rgb([248, 245, 250]);

fn frame(left_x: u32, right_x: u32) -> Frame {
    let mut frame = Frame::new(600, 200);
    for x in [left_x, right_x] {
        for y in 60..=140 {
            for dx in 0..=20 {
                frame.put_pixel(x - 10 + dx, y, TAPE);
            }
        }
    }
    frame
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing (optional)
    // tracing_subscriber::fmt::init();

    let frames: Vec<Frame> = (0..5).map(|i| frame(100 - i * 10, 500 - i * 10)).collect();
    let source = MemoryFrameSource::new(frames)?;

    let connection = Arc::new(TableConnection::loopback());
    let sink = Arc::new(TableSink::new(connection, "Shuffleboard/LiveWindow", PublishLayout::Offset));

    let config = AlignmentConfig::default();
    let alignment = AlignmentLoop::new(source, sink.clone(), &config)?;

    let (_stop_tx, stop_rx) = watch::channel(false);
    let summary = alignment.run(stop_rx).await;

    println!("Processed {} frames, published {}", summary.frames, summary.published);
    if let Some(offset) = summary.last_offset {
        println!("Last offset: {}", offset);
    }
    for (key, value) in sink.table().snapshot() {
        println!("  {}/{} = {}", sink.table().path(), key, value);
    }

    Ok(())
}
