//! Closed-loop driver: capture, analyze, publish, repeat

use crate::annotate::FrameAnnotator;
use crate::error::VisionError;
use crate::frame::{Frame, FrameSource};
use crate::pipeline::{AlignmentPipeline, FrameAnalysis, FrameOutcome};
use hatchvision_core::{AlignmentConfig, Offset, RobotMode, StateSink};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Why the loop returned
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    SourceExhausted,
    StopRequested,
    CaptureFailed(String),
}

/// Counters for one run of the loop
#[derive(Debug, Clone)]
pub struct LoopSummary {
    pub frames: u64,
    pub aligned: u64,
    pub no_target: u64,
    /// Frames skipped for a recoverable error, deadline misses excluded
    pub rejected: u64,
    pub deadline_misses: u64,
    pub published: u64,
    /// Offsets computed but not delivered to the sink
    pub dropped: u64,
    pub last_offset: Option<Offset>,
    pub last_mode: Option<RobotMode>,
    pub elapsed: Duration,
    pub stop_reason: StopReason,
}

impl Default for LoopSummary {
    fn default() -> Self {
        Self {
            frames: 0,
            aligned: 0,
            no_target: 0,
            rejected: 0,
            deadline_misses: 0,
            published: 0,
            dropped: 0,
            last_offset: None,
            last_mode: None,
            elapsed: Duration::ZERO,
            stop_reason: StopReason::SourceExhausted,
        }
    }
}

impl LoopSummary {
    /// Frames handled per second of wall time
    pub fn fps(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.frames as f64 / secs
        } else {
            0.0
        }
    }
}

/// Drives frames from a [`FrameSource`] through the pipeline into a
/// [`StateSink`], one frame at a time
pub struct AlignmentLoop<S: FrameSource, K: StateSink + ?Sized> {
    source: S,
    sink: Arc<K>,
    pipeline: Arc<AlignmentPipeline>,
    frame_deadline: Duration,
    publish_timeout: Duration,
    annotator: Option<FrameAnnotator>,
    /// Analysis that outlived its deadline and is still running
    overrun: Option<JoinHandle<(Frame, FrameAnalysis)>>,
}

impl<S: FrameSource, K: StateSink + ?Sized> AlignmentLoop<S, K> {
    /// Validate `config` against the source's frame size and wire the loop
    pub fn new(source: S, sink: Arc<K>, config: &AlignmentConfig) -> Result<Self, VisionError> {
        config.validate()?;
        let pipeline = AlignmentPipeline::new(&config.vision, source.dimensions())?;
        config.validate_for_width(pipeline.dimensions().0)?;

        let annotator = match &config.runtime.annotate_dir {
            Some(dir) => Some(FrameAnnotator::new(dir)?),
            None => None,
        };

        info!(
            "Alignment loop: {}x{} source -> {}x{} working frames, sink '{}'",
            source.dimensions().0,
            source.dimensions().1,
            pipeline.dimensions().0,
            pipeline.dimensions().1,
            sink.name()
        );

        Ok(Self {
            source,
            sink,
            pipeline: Arc::new(pipeline),
            frame_deadline: config.runtime.frame_deadline(),
            publish_timeout: config.sink.publish_timeout(),
            annotator,
            overrun: None,
        })
    }

    pub fn pipeline(&self) -> &AlignmentPipeline {
        &self.pipeline
    }

    /// Run until the source is exhausted, capture fails or `stop` turns true
    pub async fn run(mut self, stop: watch::Receiver<bool>) -> LoopSummary {
        let started = Instant::now();
        let mut summary = LoopSummary::default();

        loop {
            if *stop.borrow() {
                info!("Stop requested after {} frames", summary.frames);
                summary.stop_reason = StopReason::StopRequested;
                break;
            }

            let frame = match self.source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    info!("Frame source exhausted after {} frames", summary.frames);
                    summary.stop_reason = StopReason::SourceExhausted;
                    break;
                }
                Err(e) if e.is_recoverable() => {
                    warn!("Frame {} dropped by the source: {}", summary.frames, e);
                    summary.frames += 1;
                    summary.rejected += 1;
                    continue;
                }
                Err(e) => {
                    error!("Capture failed: {}", e);
                    summary.stop_reason = StopReason::CaptureFailed(e.to_string());
                    break;
                }
            };

            let index = summary.frames;
            summary.frames += 1;
            self.track_mode(&mut summary);

            let (frame, analysis) = match self.analyze(frame).await {
                Ok(result) => result,
                Err(e) => {
                    warn!("Frame {} skipped: {}", index, e);
                    match e {
                        VisionError::DeadlineExceeded(_) => summary.deadline_misses += 1,
                        _ => summary.rejected += 1,
                    }
                    continue;
                }
            };

            match &analysis.outcome {
                FrameOutcome::Aligned(offset) => {
                    summary.aligned += 1;
                    summary.last_offset = Some(*offset);
                    debug!("Frame {}: {}", index, offset);
                    self.publish(offset, &mut summary).await;
                }
                FrameOutcome::NoTarget { left_found, right_found } => {
                    summary.no_target += 1;
                    debug!(
                        "Frame {}: no target (left={}, right={})",
                        index, left_found, right_found
                    );
                }
                FrameOutcome::Rejected(e) => {
                    summary.rejected += 1;
                    warn!("Frame {} rejected: {}", index, e);
                }
            }

            if let Some(annotator) = &self.annotator {
                if let Err(e) = annotator.save(index, &frame, &analysis) {
                    warn!("Failed to write annotated frame {}: {}", index, e);
                }
            }
        }

        summary.elapsed = started.elapsed();
        info!(
            "Processed {} frames in {:?} ({:.1} fps): {} aligned, {} published, {} dropped",
            summary.frames,
            summary.elapsed,
            summary.fps(),
            summary.aligned,
            summary.published,
            summary.dropped
        );
        summary
    }

    /// Run the pipeline off the async threads, bounded by the frame deadline.
    ///
    /// While an overrun analysis is still running, new frames are dropped
    /// instead of queueing more work behind it.
    async fn analyze(&mut self, frame: Frame) -> Result<(Frame, FrameAnalysis), VisionError> {
        if let Some(overrun) = &self.overrun {
            if !overrun.is_finished() {
                return Err(VisionError::DeadlineExceeded(self.frame_deadline));
            }
            self.overrun = None;
        }

        let pipeline = self.pipeline.clone();
        let mut task = tokio::task::spawn_blocking(move || {
            let frame = pipeline.prepare(frame);
            let analysis = pipeline.process(&frame);
            (frame, analysis)
        });

        let finished = tokio::time::timeout(self.frame_deadline, &mut task).await;
        match finished {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(e)) => Err(VisionError::Processing(format!("pipeline task failed: {}", e))),
            Err(_) => {
                self.overrun = Some(task);
                Err(VisionError::DeadlineExceeded(self.frame_deadline))
            }
        }
    }

    /// Publish without waiting on a slow or absent sink
    async fn publish(&self, offset: &Offset, summary: &mut LoopSummary) {
        if !self.sink.is_ready() {
            summary.dropped += 1;
            debug!("Sink '{}' not ready, dropping {}", self.sink.name(), offset);
            return;
        }

        match tokio::time::timeout(self.publish_timeout, self.sink.publish(offset)).await {
            Ok(Ok(())) => summary.published += 1,
            Ok(Err(e)) => {
                summary.dropped += 1;
                warn!("Publish to '{}' failed: {}", self.sink.name(), VisionError::from(e));
            }
            Err(_) => {
                summary.dropped += 1;
                warn!(
                    "Publish to '{}' timed out after {:?}",
                    self.sink.name(),
                    self.publish_timeout
                );
            }
        }
    }

    fn track_mode(&self, summary: &mut LoopSummary) {
        let mode = self.sink.mode();
        if summary.last_mode != Some(mode) {
            info!("Robot mode: {:?}", mode);
            summary.last_mode = Some(mode);
        }
    }
}
