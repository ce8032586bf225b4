// src/report/progress.rs
// =============================================================================
// The single-line progress indicator shown while links are being checked.
//
// Every finished probe rewrites the same terminal line:
//
//   Checking links... 33.33% (1/3)
//
// Probes in a batch finish concurrently, so all writes go through one mutex:
// only one writer touches the cursor at a time and lines never interleave.
// Batch headers go through the same writer so they start on a fresh line.
// =============================================================================

use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tracing::debug;

// Clear the whole line, then move the cursor back to column 0
const CLEAR_LINE: &str = "\x1b[2K\r";

pub fn progress_line(current: usize, total: usize) -> String {
    let percentage = if total == 0 {
        100.0
    } else {
        current as f64 / total as f64 * 100.0
    };
    // {:.2} alone rounds ties to even (0.125 -> 0.12); we want 0.13
    let percentage = (percentage * 100.0).round() / 100.0;
    format!(
        "Checking links... {:.2}% ({}/{})",
        percentage, current, total
    )
}

struct Terminal<W> {
    out: W,
    // true while the cursor sits at the end of a progress line
    line_open: bool,
}

pub struct Progress<W: Write + Send> {
    total: usize,
    completed: AtomicUsize,
    terminal: Mutex<Terminal<W>>,
}

impl<W: Write + Send> Progress<W> {
    pub fn new(out: W, total: usize) -> Self {
        Self {
            total,
            completed: AtomicUsize::new(0),
            terminal: Mutex::new(Terminal {
                out,
                line_open: false,
            }),
        }
    }

    /// Overwrites the progress line with `current` of `total`.
    pub fn update(&self, current: usize, total: usize) {
        self.write_with(|terminal| {
            write!(terminal.out, "{}{}", CLEAR_LINE, progress_line(current, total))?;
            terminal.line_open = true;
            Ok(())
        });
    }

    /// Records one more finished probe and redraws. Returns the new count.
    pub fn tick(&self) -> usize {
        let current = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        self.update(current, self.total);
        current
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Prints `Processing batch {number}/{batches}` on its own line.
    pub fn batch_started(&self, number: usize, batches: usize) {
        self.write_with(|terminal| {
            if terminal.line_open {
                writeln!(terminal.out)?;
                terminal.line_open = false;
            }
            writeln!(terminal.out, "Processing batch {}/{}", number, batches)
        });
    }

    /// Ends the progress line so later output starts on a new one.
    pub fn finish(&self) {
        self.write_with(|terminal| {
            if terminal.line_open {
                writeln!(terminal.out)?;
                terminal.line_open = false;
            }
            Ok(())
        });
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        let terminal = match self.terminal.into_inner() {
            Ok(terminal) => terminal,
            Err(poisoned) => poisoned.into_inner(),
        };
        terminal.out
    }

    // Progress output is cosmetic: a closed stdout must not stop the run
    fn write_with(&self, draw: impl FnOnce(&mut Terminal<W>) -> io::Result<()>) {
        let mut terminal = match self.terminal.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let result = draw(&mut *terminal).and_then(|_| terminal.out.flush());
        if let Err(e) = result {
            debug!(error = %e, "could not write progress");
        }
    }
}
