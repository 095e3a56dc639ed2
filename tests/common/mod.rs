#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

pub mod fixtures {
    use oas_resolver::{FetchError, Fetcher, Location};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// In-memory documents keyed by `Location::to_string`, with a log of
    /// every fetch.
    pub struct Fixtures {
        files: HashMap<String, String>,
        hits: Mutex<Vec<String>>,
    }

    impl Fixtures {
        pub fn new(files: &[(&str, &str)]) -> Arc<Self> {
            Arc::new(Fixtures {
                files: files
                    .iter()
                    .map(|(path, body)| (path.to_string(), body.to_string()))
                    .collect(),
                hits: Mutex::new(Vec::new()),
            })
        }

        /// A fetcher serving these fixtures.
        pub fn fetcher(self: &Arc<Self>) -> impl Fetcher + 'static {
            let fixtures = Arc::clone(self);
            move |location: &Location| -> Result<Vec<u8>, FetchError> {
                let key = location.to_string();
                fixtures.hits.lock().unwrap().push(key.clone());
                fixtures
                    .files
                    .get(&key)
                    .map(|body| body.clone().into_bytes())
                    .ok_or_else(|| FetchError::Other(format!("no fixture for {key}")))
            }
        }

        pub fn hits(&self) -> Vec<String> {
            self.hits.lock().unwrap().clone()
        }

        pub fn count(&self, key: &str) -> usize {
            self.hits.lock().unwrap().iter().filter(|hit| *hit == key).count()
        }
    }
}

pub mod temp_tree {
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    /// Writes `files` (relative path, content) under a fresh temporary
    /// directory, creating parent directories as needed.
    pub fn create_tree(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().expect("create temp dir");
        for (relative, content) in files {
            write_file(dir.path(), relative, content);
        }
        dir
    }

    fn write_file(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
}
