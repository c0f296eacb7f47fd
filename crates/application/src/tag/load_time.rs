use std::collections::HashMap;

/// State of a page's load timing
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoadTiming {
    /// Load began at this clock reading (ms)
    Started(f64),
    /// Load finished after this many milliseconds
    Completed(u64),
}

/// Load timings keyed by fully qualified page name.
///
/// Starting the same page again overwrites its previous entry.
#[derive(Debug, Clone, Default)]
pub struct PageLoadTimes {
    entries: HashMap<String, LoadTiming>,
}

impl PageLoadTimes {
    pub fn start(&mut self, page_name: &str, now_ms: f64) -> f64 {
        self.entries
            .insert(page_name.to_string(), LoadTiming::Started(now_ms));
        now_ms
    }

    /// Finish timing a page and return its duration.
    ///
    /// A page that was never started has no duration; a page already
    /// finished keeps its recorded duration.
    pub fn end(&mut self, page_name: &str, now_ms: f64) -> Option<u64> {
        match self.entries.get(page_name).copied()? {
            LoadTiming::Started(started) => {
                let duration = (now_ms - started).abs().round() as u64;
                self.entries
                    .insert(page_name.to_string(), LoadTiming::Completed(duration));
                Some(duration)
            }
            LoadTiming::Completed(duration) => Some(duration),
        }
    }

    pub fn get(&self, page_name: &str) -> Option<LoadTiming> {
        self.entries.get(page_name).copied()
    }
}
