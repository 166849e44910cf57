use super::*;
use std::sync::atomic::{AtomicBool, Ordering};

/// Store front used by the session service.
///
/// Uses the durable backend when one is configured and keeps an in-process
/// mirror of the last known session. Any durable failure flips the store into
/// degraded mode, where the mirror serves reads and takes every write.
/// Callers never see a store error.
///
/// The mirror only becomes authoritative once it has been seeded by a
/// successful durable load. Until then each load retries the durable backend
/// and saves stay in the mirror, so durable data that was never read is never
/// overwritten. Once seeded, degraded reads come from the mirror and saves keep
/// retrying the durable backend; the first one that succeeds clears the flag.
pub struct FallbackStore {
    durable: Option<Box<dyn SessionStore>>,
    mirror: MemoryStore,
    degraded: AtomicBool,
    seeded: AtomicBool,
}

impl FallbackStore {
    pub fn new(durable: Box<dyn SessionStore>) -> Self {
        Self {
            durable: Some(durable),
            mirror: MemoryStore::new(),
            degraded: AtomicBool::new(false),
            seeded: AtomicBool::new(false),
        }
    }

    /// No durable backend at all; state lasts for the process lifetime
    pub fn in_memory() -> Self {
        Self {
            durable: None,
            mirror: MemoryStore::new(),
            degraded: AtomicBool::new(false),
            seeded: AtomicBool::new(true),
        }
    }

    /// True while the durable backend is failing and the mirror is serving
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::SeqCst)
    }

    /// True once the mirror holds a session read from the durable backend
    pub fn is_seeded(&self) -> bool {
        self.seeded.load(Ordering::SeqCst)
    }

    pub fn backend_name(&self) -> &str {
        self.durable
            .as_deref()
            .map(|d| d.name())
            .unwrap_or_else(|| self.mirror.name())
    }

    fn mark_degraded(&self, op: &str, err: &StoreError) {
        let was = self.degraded.swap(true, Ordering::SeqCst);
        if was {
            tracing::debug!("Durable store still failing on {}: {}", op, err);
        } else {
            tracing::warn!(
                "Durable store {} failed on {}: {}. Falling back to in-memory session",
                self.backend_name(),
                op,
                err
            );
        }
    }

    pub async fn load(&self) -> GameSession {
        let Some(durable) = &self.durable else {
            return self.mirror.get().await;
        };
        // A seeded mirror may hold writes the durable copy missed
        if self.is_degraded() && self.is_seeded() {
            return self.mirror.get().await;
        }

        match durable.load().await {
            Ok(session) => {
                self.mirror.set(session.clone()).await;
                self.seeded.store(true, Ordering::SeqCst);
                if self.degraded.swap(false, Ordering::SeqCst) {
                    tracing::info!("Durable store {} recovered on load", durable.name());
                }
                session
            }
            Err(e) => {
                self.mark_degraded("load", &e);
                self.mirror.get().await
            }
        }
    }

    pub async fn save(&self, session: &GameSession) {
        self.mirror.set(session.clone()).await;

        let Some(durable) = &self.durable else {
            return;
        };
        if !self.is_seeded() {
            // Not derived from durable data; writing it would clobber the record
            self.degraded.store(true, Ordering::SeqCst);
            tracing::debug!(
                "Keeping save in memory until durable store {} has been read",
                durable.name()
            );
            return;
        }

        match durable.save(session).await {
            Ok(()) => {
                if self.degraded.swap(false, Ordering::SeqCst) {
                    tracing::info!("Durable store {} recovered", durable.name());
                }
            }
            Err(e) => self.mark_degraded("save", &e),
        }
    }
}
