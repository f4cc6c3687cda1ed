use std::collections::HashMap;
use std::time::Instant;

/// Observer for the live capture loop.
///
/// Keeps the loop free of output concerns; the binary picks an
/// implementation and tests use [`NullPipelineLogger`].
pub trait PipelineLogger: Send {
    /// `total` is 0 when the stream has no frame limit.
    fn progress(&mut self, frames_done: usize, total: usize);

    /// How long a named stage took for one frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// A per-frame measurement such as the number of faces found.
    fn metric(&mut self, name: &str, value: f64);

    fn info(&mut self, message: &str);

    /// Emitted once after the loop ends. Default: no-op.
    fn summary(&self) {}
}

pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _frames_done: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Aggregates stage timings and metrics and reports through the `log`
/// facade.
///
/// Progress lines are throttled to one every `throttle_frames` frames.
pub struct LogPipelineLogger {
    throttle_frames: usize,
    timings: HashMap<String, Vec<f64>>,
    metrics: HashMap<String, Vec<f64>>,
    start_time: Instant,
    frames_done: usize,
}

impl LogPipelineLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            timings: HashMap::new(),
            metrics: HashMap::new(),
            start_time: Instant::now(),
            frames_done: 0,
        }
    }

    /// Formatted end-of-session report, or `None` when nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let frames = self.frames_done;
        let mut lines = vec![format!(
            "Session summary ({frames} frames, {:.1}s):",
            elapsed_ms / 1000.0
        )];

        for (stage, durations) in sorted(&self.timings) {
            let max_ms = durations.iter().copied().fold(0.0, f64::max);
            lines.push(format!(
                "  {stage:10}: avg {:6.1}ms  max {max_ms:6.1}ms",
                mean(durations)
            ));
        }
        for (name, values) in sorted(&self.metrics) {
            let total: f64 = values.iter().sum();
            lines.push(format!("  {name}: avg {:.2}  total {total:.0}", mean(values)));
        }
        if frames > 0 && elapsed_ms > 0.0 {
            lines.push(format!(
                "  Throughput: {:.1} fps",
                frames as f64 / (elapsed_ms / 1000.0)
            ));
        }
        Some(lines.join("\n"))
    }

}

impl Default for LogPipelineLogger {
    fn default() -> Self {
        Self::new(100)
    }
}

impl PipelineLogger for LogPipelineLogger {
    fn progress(&mut self, frames_done: usize, total: usize) {
        self.frames_done = frames_done;
        if total > 0 {
            if frames_done % self.throttle_frames == 0 || frames_done == total {
                log::info!("Processed {frames_done}/{total} frames");
            }
        } else if frames_done % self.throttle_frames == 0 {
            log::info!("Processed {frames_done} frames");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics.entry(name.to_string()).or_default().push(value);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n{text}");
        }
    }
}

fn sorted(map: &HashMap<String, Vec<f64>>) -> Vec<(&String, &Vec<f64>)> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}
