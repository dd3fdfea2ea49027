use std::time::Instant;

pub fn elapsed_seconds(since: Instant) -> f64 {
    since.elapsed().as_secs_f64()
}

pub fn prettyprint_time(seconds: f64) -> String {
    format!("{:.4}s", seconds)
}

struct TimerSpan {
    name: String,
    started_at: Instant,
    nested_results: Vec<String>,
}

/// Hierarchial timing of pipeline stages. Every line goes through the `log` crate. Notes and
/// warnings are repeated in a summary when the Timer is dropped, to avoid having to scroll up and
/// find interesting things.
pub struct Timer {
    results: Vec<String>,
    stack: Vec<TimerSpan>,

    outermost_name: String,

    notes: Vec<String>,
    warnings: Vec<String>,
}

impl Timer {
    pub fn new<S: Into<String>>(raw_name: S) -> Timer {
        let name = raw_name.into();
        let mut t = Timer {
            results: Vec::new(),
            stack: Vec::new(),
            outermost_name: name.clone(),
            notes: Vec::new(),
            warnings: Vec::new(),
        };
        t.start(name);
        t
    }

    /// For tests and callers that don't care about the summary.
    pub fn throwaway() -> Timer {
        Timer::new("throwaway")
    }

    /// Log immediately, but also repeat at the end.
    pub fn note<S: Into<String>>(&mut self, raw_line: S) {
        let line = raw_line.into();
        info!("{}", line);
        self.notes.push(line);
    }

    /// Log a degenerate condition immediately, and repeat it at the end.
    pub fn warn<S: Into<String>>(&mut self, raw_line: S) {
        let line = raw_line.into();
        warn!("{}", line);
        self.warnings.push(line);
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub fn start<S: Into<String>>(&mut self, raw_name: S) {
        let name = raw_name.into();
        info!("{}...", name);
        self.stack.push(TimerSpan {
            name,
            started_at: Instant::now(),
            nested_results: Vec::new(),
        });
    }

    pub fn stop<S: Into<String>>(&mut self, raw_name: S) {
        let name = raw_name.into();
        let span = match self.stack.pop() {
            Some(s) => s,
            None => {
                warn!("stop({}) called on an empty Timer", name);
                return;
            }
        };
        if span.name != name {
            warn!("stop({}) doesn't match the current span {}", name, span.name);
        }
        let elapsed = elapsed_seconds(span.started_at);
        let line = format!("{} took {}", span.name, prettyprint_time(elapsed));
        info!("{}", line);

        let padding = "  ".repeat(self.stack.len());
        let mut lines = vec![format!("{}- {}", padding, line)];
        lines.extend(span.nested_results);
        self.add_results(lines);
    }

    fn add_results(&mut self, lines: Vec<String>) {
        match self.stack.last_mut() {
            Some(s) => {
                s.nested_results.extend(lines);
            }
            None => {
                self.results.extend(lines);
            }
        }
    }
}

impl std::ops::Drop for Timer {
    fn drop(&mut self) {
        // Close any spans left open, like when bailing out early with `?`
        while let Some(span) = self.stack.last() {
            let name = span.name.clone();
            self.stop(name);
        }

        if self.outermost_name == "throwaway" {
            return;
        }
        for line in &self.results {
            info!("{}", line);
        }
        if !self.notes.is_empty() {
            info!("{} notes:", self.notes.len());
            for line in &self.notes {
                info!("  {}", line);
            }
        }
        if !self.warnings.is_empty() {
            warn!("{} warnings:", self.warnings.len());
            for line in &self.warnings {
                warn!("  {}", line);
            }
        }
    }
}
