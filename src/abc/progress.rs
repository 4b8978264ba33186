use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

/// Round-loop progress printed to stdout.
///
/// The counter advances once per curve per round, so the total is an upper
/// bound (`curves × max_rounds`) and the ETA shrinks as curves converge
/// early. Safe to increment from rayon workers.
pub(crate) struct RoundProgress {
    counter: AtomicUsize,
    total: usize,
    start_time: Instant,
}

impl RoundProgress {
    pub(crate) fn new(total: usize) -> Self {
        Self {
            counter: AtomicUsize::new(0),
            total,
            start_time: Instant::now(),
        }
    }

    pub(crate) fn inc(&self) {
        let current = self.counter.fetch_add(1, Ordering::Relaxed) + 1;

        // Print every 1000 steps or every 5%.
        if current % 1000 == 0 || (current * 20) % self.total.max(1) == 0 {
            let percent = (current * 100) / self.total.max(1);
            let elapsed = self.start_time.elapsed().as_secs_f64();
            let eta = if current > 0 {
                let estimated_total = elapsed * (self.total as f64) / (current as f64);
                format_duration((estimated_total - elapsed).max(0.0))
            } else {
                "calculating...".to_string()
            };
            print!(
                "\rProgress: {}/{} ({}%) ETA: {}",
                current, self.total, percent, eta
            );
            let _ = std::io::stdout().flush();
        }
    }

    pub(crate) fn finish(&self) {
        println!("\nInference complete!");
    }
}

fn format_duration(seconds: f64) -> String {
    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}
