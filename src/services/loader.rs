//! Background execution of catalog fetches and configuration saves.
//!
//! ## Design
//!
//! - Each request runs on its own worker thread
//! - Results are posted back over an mpsc channel owned by the mount, which
//!   drains it from its interaction loop
//! - Every request carries a [`RequestTicket`]; the mount discards results
//!   whose ticket no longer matches its current generation
//! - Every accepted request produces exactly one completion, including when
//!   its worker thread cannot be started

use std::io;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::anyhow;
use tracing::warn;

use crate::models::{Configuration, SavedConfiguration};
use crate::services::catalog::{Catalog, ProductCatalogClient};
use crate::services::persistence::PersistenceClient;

/// Identifies which mount (and which incarnation of it) issued a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTicket {
    /// Issuing mount
    pub mount_id: u64,
    /// Mount generation at issue time
    pub generation: u64,
}

/// Result of a background request.
#[derive(Debug)]
pub enum LoadOutcome {
    /// Catalog fetch finished
    Catalog(anyhow::Result<Arc<Catalog>>),
    /// Save finished
    Saved(anyhow::Result<SavedConfiguration>),
    /// Saved configuration fetched
    Loaded(anyhow::Result<SavedConfiguration>),
}

/// A finished request posted back to the mount.
#[derive(Debug)]
pub struct LoadCompletion {
    /// Ticket the request was issued with
    pub ticket: RequestTicket,
    /// What happened
    pub outcome: LoadOutcome,
}

/// Runs requests off the interaction thread and queues their results.
pub struct BackgroundLoader {
    sender: Sender<LoadCompletion>,
    receiver: Receiver<LoadCompletion>,
    in_flight: usize,
}

impl Default for BackgroundLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl BackgroundLoader {
    /// Creates a loader with an empty result queue.
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            in_flight: 0,
        }
    }

    /// Requests whose completion has not been received yet.
    #[must_use]
    pub const fn in_flight(&self) -> usize {
        self.in_flight
    }

    fn spawn<F, E>(&mut self, ticket: RequestTicket, job: F, on_spawn_error: E)
    where
        F: FnOnce() -> LoadOutcome + Send + 'static,
        E: FnOnce(anyhow::Error) -> LoadOutcome,
    {
        self.in_flight += 1;

        let sender = self.sender.clone();
        let spawned = thread::Builder::new()
            .name(format!("blasti-loader-{}", ticket.mount_id))
            .spawn(move || {
                let outcome = job();
                // The mount may already be gone; nothing to deliver to then.
                let _ = sender.send(LoadCompletion { ticket, outcome });
            });

        if let Err(e) = spawned {
            self.post_spawn_failure(ticket, &e, on_spawn_error);
        }
    }

    fn post_spawn_failure<E>(&self, ticket: RequestTicket, error: &io::Error, on_spawn_error: E)
    where
        E: FnOnce(anyhow::Error) -> LoadOutcome,
    {
        warn!("Failed to spawn loader thread: {error}");
        let outcome = on_spawn_error(anyhow!("Failed to start background request: {error}"));
        // The receiver lives in `self`, so the send cannot fail here.
        let _ = self.sender.send(LoadCompletion { ticket, outcome });
    }

    /// Fetches (or returns the cached) catalog in the background.
    pub fn fetch_catalog(&mut self, ticket: RequestTicket, client: Arc<ProductCatalogClient>) {
        self.spawn(
            ticket,
            move || LoadOutcome::Catalog(client.catalog()),
            |e| LoadOutcome::Catalog(Err(e)),
        );
    }

    /// Saves a configuration in the background.
    pub fn save(
        &mut self,
        ticket: RequestTicket,
        persistence: PersistenceClient,
        name: String,
        configuration: Configuration,
    ) {
        self.spawn(
            ticket,
            move || LoadOutcome::Saved(persistence.save(&name, &configuration)),
            |e| LoadOutcome::Saved(Err(e)),
        );
    }

    /// Loads a saved configuration in the background.
    pub fn load(&mut self, ticket: RequestTicket, persistence: PersistenceClient, name: String) {
        self.spawn(
            ticket,
            move || LoadOutcome::Loaded(persistence.load(&name)),
            |e| LoadOutcome::Loaded(Err(e)),
        );
    }

    /// Returns every completion that has arrived, without blocking.
    pub fn drain(&mut self) -> Vec<LoadCompletion> {
        let completions: Vec<_> = self.receiver.try_iter().collect();
        self.in_flight = self.in_flight.saturating_sub(completions.len());
        completions
    }

    /// Blocks up to `timeout` for the next completion.
    pub fn wait(&mut self, timeout: Duration) -> Option<LoadCompletion> {
        match self.receiver.recv_timeout(timeout) {
            Ok(completion) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                Some(completion)
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Product;
    use crate::services::catalog::StaticCatalog;
    use crate::services::persistence::MemoryConfigurationStore;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn ticket() -> RequestTicket {
        RequestTicket {
            mount_id: 7,
            generation: 3,
        }
    }

    #[test]
    fn test_fetch_catalog_posts_result_with_ticket() {
        let mut loader = BackgroundLoader::new();
        let client = Arc::new(ProductCatalogClient::new(Arc::new(StaticCatalog::new(vec![
            Product::pegboard("P1", "Board", 10.0),
        ]))));

        loader.fetch_catalog(ticket(), client);
        assert_eq!(loader.in_flight(), 1);
        let completion = loader.wait(TIMEOUT).expect("completion");
        assert_eq!(loader.in_flight(), 0);

        assert_eq!(completion.ticket, ticket());
        match completion.outcome {
            LoadOutcome::Catalog(Ok(catalog)) => assert_eq!(catalog.len(), 1),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_save_failure_is_posted_not_panicked() {
        let mut loader = BackgroundLoader::new();
        let persistence = PersistenceClient::new(Arc::new(MemoryConfigurationStore::new()));

        loader.save(ticket(), persistence, "empty".to_string(), Configuration::new());
        let completion = loader.wait(TIMEOUT).expect("completion");

        assert!(matches!(completion.outcome, LoadOutcome::Saved(Err(_))));
    }

    #[test]
    fn test_drain_empty() {
        let mut loader = BackgroundLoader::new();
        assert!(loader.drain().is_empty());
        assert!(loader.wait(Duration::from_millis(10)).is_none());
        assert_eq!(loader.in_flight(), 0);
    }

    #[test]
    fn test_spawn_failure_still_completes() {
        let mut loader = BackgroundLoader::new();
        loader.in_flight = 1;

        let error = io::Error::new(io::ErrorKind::OutOfMemory, "no threads left");
        loader.post_spawn_failure(ticket(), &error, |e| LoadOutcome::Catalog(Err(e)));

        let completions = loader.drain();
        assert_eq!(completions.len(), 1);
        assert_eq!(completions[0].ticket, ticket());
        match &completions[0].outcome {
            LoadOutcome::Catalog(Err(e)) => assert!(e.to_string().contains("no threads left")),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(loader.in_flight(), 0);
    }
}
