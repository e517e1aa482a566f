use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Records every path a watcher callback was invoked with.
#[derive(Debug, Clone, Default)]
pub struct CallRecorder {
    calls: Arc<Mutex<Vec<PathBuf>>>,
}

impl CallRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A callback suitable for `WatcherBuilder::callback`.
    pub fn callback(&self) -> impl Fn(&Path) + Send + Sync + 'static + use<> {
        let calls = Arc::clone(&self.calls);
        move |path: &Path| {
            calls.lock().unwrap().push(path.to_path_buf());
        }
    }

    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().clone()
    }
}
