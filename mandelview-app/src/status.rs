use std::time::Duration;

/// Values shown on the status line after every command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    pub width: u32,
    pub height: u32,
    pub workers: usize,
    pub step_budget: u32,
    /// Zero-based; displayed one-based.
    pub palette_index: usize,
    pub elapsed: Duration,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Size: {}x{} - [T]={} - [C]={} - [P]={} - Time={}ms",
            self.width,
            self.height,
            self.workers,
            self.step_budget,
            self.palette_index + 1,
            self.elapsed.as_millis(),
        )
    }
}
