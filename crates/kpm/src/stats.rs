//! Counters and timers collected while computing moments.

use std::time::Duration;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Stats {
    pub num_moments: usize,
    /// Independent recurrences run for the last query (random samples).
    pub multiplier: usize,
    /// Matrix elements touched by one recurrence.
    pub ops: u64,
    pub matrix_memory: usize,
    pub vector_memory: usize,
    pub moments_time: Duration,
    pub reconstruct_time: Duration,
}

impl Stats {
    /// Matrix elements processed per second.
    pub fn eps(&self) -> f64 {
        let secs = self.moments_time.as_secs_f64();
        if secs > 0.0 {
            (self.ops as f64 * self.multiplier.max(1) as f64) / secs
        } else {
            0.0
        }
    }

    pub fn total_time(&self) -> Duration {
        self.moments_time + self.reconstruct_time
    }

    pub fn report(&self, shortform: bool) -> String {
        if shortform {
            format!(
                "{} @ {}eps [{}] [{}] ",
                with_suffix(self.num_moments as f64),
                with_suffix(self.eps()),
                pretty_duration(self.moments_time),
                pretty_duration(self.reconstruct_time)
            )
        } else {
            let samples = if self.multiplier > 1 {
                format!(" x {} samples", self.multiplier)
            } else {
                String::new()
            };
            format!(
                "Number of moments: {}\n\
                 Matrix elements processed: {}{}\n\
                 Matrix memory: {}B, vector memory: {}B\n\
                 Moments time: {} ({}eps)\n\
                 Reconstruction time: {}\n",
                self.num_moments,
                with_suffix(self.ops as f64),
                samples,
                with_suffix(self.matrix_memory as f64),
                with_suffix(self.vector_memory as f64),
                pretty_duration(self.moments_time),
                with_suffix(self.eps()),
                pretty_duration(self.reconstruct_time)
            )
        }
    }
}

/// `1234567.0` -> `"1.2M"`.
pub fn with_suffix(value: f64) -> String {
    const SUFFIXES: [&str; 5] = ["", "K", "M", "G", "T"];
    let mut v = value;
    let mut i = 0;
    while v.abs() >= 1000.0 && i < SUFFIXES.len() - 1 {
        v /= 1000.0;
        i += 1;
    }
    if i == 0 && v.fract() == 0.0 {
        format!("{}", v)
    } else {
        format!("{:.1}{}", v, SUFFIXES[i])
    }
}

pub fn pretty_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs >= 60.0 {
        let whole = d.as_secs();
        format!("{}:{:02}", whole / 60, whole % 60)
    } else if secs >= 1.0 {
        format!("{:.2}s", secs)
    } else if secs >= 1e-3 {
        format!("{:.1}ms", secs * 1e3)
    } else {
        format!("{:.0}us", secs * 1e6)
    }
}
