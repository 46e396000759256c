use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, warn};

use super::base::StorageSlot;

/// File-backed slot; the token survives process restarts.
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSlot { path: path.into() }
    }
}

#[async_trait]
impl StorageSlot for FileSlot {
    fn name(&self) -> &'static str {
        "durable"
    }

    async fn load(&self) -> Option<String> {
        match fs::read_to_string(&self.path).await {
            Ok(contents) => {
                let token = contents.trim();
                if token.is_empty() {
                    None
                } else {
                    Some(token.to_string())
                }
            }
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => {
                warn!("Failed to read token file '{}': {}", self.path.display(), err);
                None
            }
        }
    }

    async fn save(&self, token: &str) {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(err) = fs::create_dir_all(parent).await {
                    warn!(
                        "Failed to create token directory '{}': {}",
                        parent.display(),
                        err
                    );
                    return;
                }
            }
        }
        match fs::write(&self.path, token).await {
            Ok(()) => debug!("Token written to '{}'", self.path.display()),
            Err(err) => warn!(
                "Failed to write token file '{}': {}",
                self.path.display(),
                err
            ),
        }
    }

    async fn clear(&self) {
        match fs::remove_file(&self.path).await {
            Ok(()) => debug!("Token file '{}' removed", self.path.display()),
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => warn!(
                "Failed to remove token file '{}': {}",
                self.path.display(),
                err
            ),
        }
    }
}
