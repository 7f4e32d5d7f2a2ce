//! Polling file watcher for `--watch`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, SystemTime};

pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Last seen modification time of one file.
#[derive(Debug, Clone)]
pub struct WatchState {
    path: PathBuf,
    last_modified: Option<SystemTime>,
}

impl WatchState {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        WatchState {
            path,
            last_modified: None,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stat the file and report whether its modification time moved.
    /// The first poll always reports a change.
    ///
    /// # Errors
    ///
    /// Returns the stat error if the file cannot be inspected.
    pub fn poll(&mut self) -> io::Result<bool> {
        let modified = fs::metadata(&self.path)?.modified()?;
        Ok(self.observe(modified))
    }

    fn observe(&mut self, modified: SystemTime) -> bool {
        let changed = self.last_modified != Some(modified);
        self.last_modified = Some(modified);
        changed
    }
}

/// One polling loop over every watched file.
pub struct WatchLoop<T> {
    entries: Vec<(WatchState, T)>,
    interval: Duration,
}

impl<T> Default for WatchLoop<T> {
    fn default() -> Self {
        WatchLoop {
            entries: Vec::new(),
            interval: POLL_INTERVAL,
        }
    }
}

impl<T> WatchLoop<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn watch(&mut self, path: PathBuf, payload: T) {
        self.entries.push((WatchState::new(path), payload));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Poll every entry once, calling `action` for each changed file.
    /// Returns how many fired.
    ///
    /// # Errors
    ///
    /// Stops at the first file that cannot be stat'ed.
    pub fn tick(&mut self, action: &mut impl FnMut(&T)) -> io::Result<usize> {
        let mut fired = 0;
        for (state, payload) in &mut self.entries {
            if state.poll()? {
                log::debug!("changed: {}", state.path().display());
                action(payload);
                fired += 1;
            }
        }
        Ok(fired)
    }

    /// Poll forever. Returns only on a stat failure, or immediately when
    /// nothing is watched.
    ///
    /// # Errors
    ///
    /// Returns the first stat failure.
    pub fn run(mut self, mut action: impl FnMut(&T)) -> io::Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        loop {
            self.tick(&mut action)?;
            thread::sleep(self.interval);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_first_observation_fires() {
        let mut state = WatchState::new(PathBuf::from("x.co"));
        assert!(state.observe(SystemTime::UNIX_EPOCH));
    }

    #[test]
    fn test_identical_times_fire_once() {
        let mut state = WatchState::new(PathBuf::from("x.co"));
        let t = SystemTime::UNIX_EPOCH + Duration::from_secs(10);
        assert!(state.observe(t));
        assert!(!state.observe(t));
        assert!(state.observe(t + Duration::from_secs(1)));
    }

    #[test]
    fn test_earlier_time_still_counts_as_change() {
        let mut state = WatchState::new(PathBuf::from("x.co"));
        let t = SystemTime::UNIX_EPOCH + Duration::from_secs(10);
        state.observe(t);
        assert!(state.observe(SystemTime::UNIX_EPOCH));
    }

    #[test]
    fn test_tick_fires_for_new_files_only_once() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.co");
        fs::write(&file, "1").unwrap();

        let mut watcher = WatchLoop::new();
        watcher.watch(file.clone(), "a");
        let mut seen = Vec::new();
        assert_eq!(watcher.tick(&mut |p: &&str| seen.push(*p)).unwrap(), 1);
        assert_eq!(watcher.tick(&mut |p: &&str| seen.push(*p)).unwrap(), 0);
        assert_eq!(seen, vec!["a"]);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let mut watcher = WatchLoop::new();
        watcher.watch(temp.path().join("gone.co"), ());
        assert!(watcher.tick(&mut |_| {}).is_err());
    }

    #[test]
    fn test_run_returns_when_nothing_is_watched() {
        let watcher: WatchLoop<()> = WatchLoop::new();
        assert!(watcher.run(|_| {}).is_ok());
    }
}
