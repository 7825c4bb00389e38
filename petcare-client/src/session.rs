use std::future::Future;
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::warn;

use crate::server::PetcareApi;

/// Owns the remote session for one invocation and closes it exactly once.
pub struct Session<A: PetcareApi> {
    api: A,
    closed: AtomicBool,
}

impl<A: PetcareApi> Session<A> {
    pub fn open(api: A) -> Self {
        Self {
            api,
            closed: AtomicBool::new(false),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Closes the remote session. Only the first call reaches the service.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Err(e) = self.api.close_session().await {
            warn!("Failed to close session cleanly: {:#}", e);
        }
    }

    /// Runs `work` and closes the session afterwards, whatever `work` returned.
    pub async fn scoped<T, F>(&self, work: F) -> T
    where
        F: Future<Output = T>,
    {
        let out = work.await;
        self.close().await;
        out
    }
}

impl<A: PetcareApi> Deref for Session<A> {
    type Target = A;

    fn deref(&self) -> &A {
        &self.api
    }
}
