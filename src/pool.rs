//! Process-wide thread pool: looks up or creates session state by id.
//!
//! The pool is an explicit owned registry handed around by `Arc`, never a
//! module-level singleton. Each new thread is seeded with a deep copy of
//! the configured initial shared state, so threads never share state
//! through their starting point.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::info;

use crate::thread::ChatThread;

pub struct ThreadPool {
    threads: RwLock<HashMap<String, Arc<ChatThread>>>,
    initial_state: Value,
    assistant_name: String,
}

impl ThreadPool {
    pub fn new(initial_state: Value) -> Self {
        Self::with_assistant_name(initial_state, "Assistant")
    }

    pub fn with_assistant_name(initial_state: Value, assistant_name: impl Into<String>) -> Self {
        Self {
            threads: RwLock::new(HashMap::new()),
            initial_state,
            assistant_name: assistant_name.into(),
        }
    }

    /// Idempotent lookup: the first call for an id creates the thread,
    /// later calls return the same instance.
    pub async fn get_or_create(&self, thread_id: &str) -> Arc<ChatThread> {
        if let Some(thread) = self.threads.read().await.get(thread_id) {
            return thread.clone();
        }
        let mut threads = self.threads.write().await;
        // Recheck under the write lock; another task may have won.
        threads
            .entry(thread_id.to_string())
            .or_insert_with(|| {
                info!(thread_id = %thread_id, "creating thread");
                Arc::new(ChatThread::new(
                    thread_id,
                    self.initial_state.clone(),
                    self.assistant_name.clone(),
                ))
            })
            .clone()
    }

    pub async fn get(&self, thread_id: &str) -> Option<Arc<ChatThread>> {
        self.threads.read().await.get(thread_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.threads.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.threads.read().await.is_empty()
    }
}
