use std::sync::Mutex;

use async_trait::async_trait;

use super::base::StorageSlot;

/// In-memory slot; the token lives exactly as long as the process.
#[derive(Default)]
pub struct MemorySlot {
    value: Mutex<Option<String>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        MemorySlot::default()
    }
}

#[async_trait]
impl StorageSlot for MemorySlot {
    fn name(&self) -> &'static str {
        "ephemeral"
    }

    async fn load(&self) -> Option<String> {
        self.value.lock().unwrap().clone()
    }

    async fn save(&self, token: &str) {
        *self.value.lock().unwrap() = Some(token.to_string());
    }

    async fn clear(&self) {
        self.value.lock().unwrap().take();
    }
}
