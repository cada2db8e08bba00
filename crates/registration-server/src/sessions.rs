// File: src/sessions.rs
// Purpose: Mounted form states keyed by per-page form id, with idle eviction

use registration::FormState;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug)]
struct MountedForm {
    state: FormState,
    last_seen: Instant,
}

/// Registry of mounted forms. Removing an entry is the unmount.
#[derive(Debug, Default)]
pub struct Sessions {
    forms: RwLock<HashMap<Uuid, MountedForm>>,
}

impl Sessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount a fresh form and return its id with a snapshot of the state
    pub async fn mount(&self) -> (Uuid, FormState) {
        let id = Uuid::new_v4();
        let state = FormState::mount();
        self.forms.write().await.insert(
            id,
            MountedForm {
                state: state.clone(),
                last_seen: Instant::now(),
            },
        );
        info!(form = %id, "form mounted");
        (id, state)
    }

    /// Drop a form; late results for it are discarded
    pub async fn unmount(&self, id: Uuid) -> bool {
        let removed = self.forms.write().await.remove(&id).is_some();
        if removed {
            info!(form = %id, "form unmounted");
        }
        removed
    }

    /// Run `f` against a mounted form and mark it as active. `None` if the form is gone.
    pub async fn with<T>(&self, id: Uuid, f: impl FnOnce(&mut FormState) -> T) -> Option<T> {
        let mut forms = self.forms.write().await;
        let result = forms.get_mut(&id).map(|mounted| {
            mounted.last_seen = Instant::now();
            f(&mut mounted.state)
        });
        if result.is_none() {
            debug!(form = %id, "no mounted form for id");
        }
        result
    }

    /// Unmount every form untouched for at least `max_idle`
    ///
    /// Forms with a submission in flight are kept until it finishes.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let now = Instant::now();
        let mut forms = self.forms.write().await;
        let before = forms.len();
        forms.retain(|_, mounted| {
            mounted.state.is_submitting() || now.duration_since(mounted.last_seen) < max_idle
        });
        before - forms.len()
    }

    pub async fn count(&self) -> usize {
        self.forms.read().await.len()
    }

    #[cfg(test)]
    pub async fn is_mounted(&self, id: Uuid) -> bool {
        self.forms.read().await.contains_key(&id)
    }

    /// Periodically evict idle forms
    pub fn spawn_sweeper(self: Arc<Self>, max_idle: Duration) -> JoinHandle<()> {
        let period = (max_idle / 4).max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let evicted = self.evict_idle(max_idle).await;
                if evicted > 0 {
                    let remaining = self.count().await;
                    info!(evicted, remaining, "evicted idle forms");
                }
            }
        })
    }
}

/// Form id from a submitted `_form` parameter
pub fn parse_form_id(raw: Option<&String>) -> Option<Uuid> {
    raw.and_then(|value| Uuid::parse_str(value).ok())
}
