//! Configurator mount lifecycle.
//!
//! A mount is driven from a single interaction loop:
//!
//! 1. [`ConfiguratorMount::show`] makes the container visible and starts the
//!    catalog fetch in the background
//! 2. the next [`ConfiguratorMount::on_frame`] initializes the 3D engine, now
//!    that the container has a layout size, and emits [`MountEvent::Ready`]
//! 3. user actions go through [`ConfiguratorMount::dispatch`]; actions that
//!    arrive before the catalog are queued and replayed in order once it lands
//!
//! If the catalog fetch fails, queued actions are dropped and later actions
//! are rejected until [`ConfiguratorMount::retry_catalog`] starts a new fetch.
//!
//! Background results carry a [`RequestTicket`]. After
//! [`ConfiguratorMount::teardown`] the generation moves on and any late
//! result is dropped without touching the scene.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::ConfiguratorError;
use crate::models::{
    Configuration, FilterCriteria, PlacedAccessory, Product, ProductType, Vector3,
};
use crate::mount::descriptor::MountDescriptor;
use crate::mount::runtime::{ContainerMetrics, RenderRuntime};
use crate::mount::scaffold::{render_error_state, render_scaffold};
use crate::services::catalog::{Catalog, ProductCatalogClient};
use crate::services::filter::filter_accessories;
use crate::services::loader::{BackgroundLoader, LoadCompletion, LoadOutcome, RequestTicket};
use crate::services::persistence::PersistenceClient;
use crate::services::pricing::{price_configuration, PriceBreakdown};
use crate::services::scene::SceneState;

static NEXT_MOUNT_ID: AtomicU64 = AtomicU64::new(1);

/// Services a mount depends on, injected by the host.
#[derive(Clone)]
pub struct MountServices {
    /// 3D engine
    pub runtime: Arc<dyn RenderRuntime>,
    /// Catalog client (fetch-once)
    pub catalog: Arc<ProductCatalogClient>,
    /// Saved configuration client
    pub persistence: PersistenceClient,
}

/// Where a mount is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountPhase {
    /// Scaffold rendered, container not yet shown
    Created,
    /// Container visible, engine init pending for the next frame
    ContainerShown,
    /// Engine initialized and interactive
    Ready,
    /// Engine could not start; the mount shows its error state
    Failed(ConfiguratorError),
    /// Host removed the mount
    TornDown,
}

/// A user action against the scene.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneAction {
    /// Select or replace the pegboard
    SelectPegboard(String),
    /// Hang an accessory
    Place(PlacedAccessory),
    /// Remove the placement at an index
    Remove(usize),
    /// Clear everything
    Reset,
    /// Replace the scene with a saved configuration
    Restore(Configuration),
}

impl SceneAction {
    /// Shorthand for placing an unrotated accessory.
    pub fn place(accessory_id: impl Into<String>, position: Vector3) -> Self {
        Self::Place(PlacedAccessory::new(accessory_id, position))
    }
}

/// Notifications for the UI layer.
#[derive(Debug, Clone, PartialEq)]
pub enum MountEvent {
    /// The 3D scene is interactive; dismiss the loading state
    Ready,
    /// Terminal failure; show the error state
    Failed(ConfiguratorError),
    /// Catalog arrived; dependent controls can be enabled
    CatalogLoaded {
        /// Number of pegboards
        pegboards: usize,
        /// Number of accessories
        accessories: usize,
    },
    /// Catalog could not be fetched
    CatalogFailed(String),
    /// Scene changed; re-render panels with the new totals
    SceneChanged(PriceBreakdown),
    /// Placements dropped because they do not fit the new pegboard
    AccessoriesRemoved(Vec<PlacedAccessory>),
    /// An action or request was rejected; the scene is unchanged
    Rejected(ConfiguratorError),
    /// A save completed
    Saved {
        /// Saved name
        name: String,
    },
    /// A saved configuration replaced the scene
    Restored {
        /// Restored name
        name: String,
    },
    /// A background request failed for a non-domain reason (I/O, parse)
    RequestFailed(String),
}

/// One configurator instance on a page.
pub struct ConfiguratorMount {
    id: u64,
    generation: u64,
    container_id: String,
    descriptor: MountDescriptor,
    services: MountServices,
    loader: BackgroundLoader,
    phase: MountPhase,
    container: ContainerMetrics,
    catalog: Option<Arc<Catalog>>,
    catalog_requested: bool,
    catalog_error: Option<String>,
    scene: SceneState,
    filter: FilterCriteria,
    queued: VecDeque<SceneAction>,
}

impl ConfiguratorMount {
    /// Creates a mount for a validated descriptor.
    pub fn new(
        descriptor: MountDescriptor,
        services: MountServices,
    ) -> Result<Self, ConfiguratorError> {
        let scene = SceneState::new(descriptor.max_accessories)?;
        let id = NEXT_MOUNT_ID.fetch_add(1, Ordering::Relaxed);

        Ok(Self {
            id,
            generation: 0,
            container_id: format!("blasti-configurator-{id}"),
            descriptor,
            services,
            loader: BackgroundLoader::new(),
            phase: MountPhase::Created,
            container: ContainerMetrics::default(),
            catalog: None,
            catalog_requested: false,
            catalog_error: None,
            scene,
            filter: FilterCriteria::default(),
            queued: VecDeque::new(),
        })
    }

    /// Unique mount id.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// DOM id of the container.
    #[must_use]
    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> &MountPhase {
        &self.phase
    }

    /// Validated descriptor.
    #[must_use]
    pub const fn descriptor(&self) -> &MountDescriptor {
        &self.descriptor
    }

    /// Current scene.
    #[must_use]
    pub const fn scene(&self) -> &SceneState {
        &self.scene
    }

    /// Loaded catalog, once it has arrived.
    #[must_use]
    pub fn catalog(&self) -> Option<&Catalog> {
        self.catalog.as_deref()
    }

    /// Why the last catalog fetch failed, until a retry starts.
    #[must_use]
    pub fn catalog_error(&self) -> Option<&str> {
        self.catalog_error.as_deref()
    }

    /// Actions waiting for the catalog.
    #[must_use]
    pub fn queued_actions(&self) -> usize {
        self.queued.len()
    }

    /// Whether scene controls should be enabled.
    #[must_use]
    pub fn controls_enabled(&self) -> bool {
        self.phase == MountPhase::Ready && self.catalog.is_some()
    }

    /// Current totals, once the catalog is available.
    #[must_use]
    pub fn price(&self) -> Option<PriceBreakdown> {
        self.catalog
            .as_deref()
            .map(|catalog| price_configuration(&self.scene.to_configuration(), catalog))
    }

    /// Current accessory filter.
    #[must_use]
    pub const fn filter(&self) -> &FilterCriteria {
        &self.filter
    }

    /// Replaces the accessory filter. Never touches the scene.
    pub fn set_filter(&mut self, criteria: FilterCriteria) {
        self.filter = criteria;
    }

    /// Accessories to list under the current filter.
    #[must_use]
    pub fn visible_accessories(&self) -> Vec<&Product> {
        match self.catalog.as_deref() {
            Some(catalog) => filter_accessories(catalog, &self.filter, self.scene.pegboard_id()),
            None => Vec::new(),
        }
    }

    /// Pegboards to list.
    #[must_use]
    pub fn pegboards(&self) -> Vec<&Product> {
        self.catalog
            .as_deref()
            .map(|catalog| catalog.list(ProductType::Pegboard))
            .unwrap_or_default()
    }

    /// Markup for the current phase: the scaffold, or the error state.
    #[must_use]
    pub fn render(&self) -> String {
        match &self.phase {
            MountPhase::Failed(error) => render_error_state(error),
            _ => render_scaffold(&self.descriptor, &self.container_id),
        }
    }

    fn ticket(&self) -> RequestTicket {
        RequestTicket {
            mount_id: self.id,
            generation: self.generation,
        }
    }

    fn is_current(&self, ticket: RequestTicket) -> bool {
        ticket.mount_id == self.id
            && ticket.generation == self.generation
            && self.phase != MountPhase::TornDown
    }

    /// Makes the container visible and starts loading the catalog.
    ///
    /// Engine init is deferred to the next [`Self::on_frame`] so the engine
    /// can measure a laid-out container.
    pub fn show(&mut self, container: ContainerMetrics) {
        if self.phase != MountPhase::Created {
            debug!(mount = self.id, "show() ignored in phase {:?}", self.phase);
            return;
        }

        self.container = container;
        self.phase = MountPhase::ContainerShown;

        // Runs before anything the user dispatched ahead of `show()`.
        if let Some(pegboard_id) = self.descriptor.default_pegboard.clone() {
            self.queued.push_front(SceneAction::SelectPegboard(pegboard_id));
        }

        if !self.catalog_requested {
            self.request_catalog();
        }
    }

    fn request_catalog(&mut self) {
        self.catalog_requested = true;
        self.catalog_error = None;
        let ticket = self.ticket();
        self.loader
            .fetch_catalog(ticket, Arc::clone(&self.services.catalog));
    }

    /// Starts a new catalog fetch after a failed one. Does nothing while a
    /// fetch is pending or once the catalog has arrived.
    pub fn retry_catalog(&mut self) -> Result<(), ConfiguratorError> {
        self.ensure_usable()?;
        if self.catalog_error.is_some() {
            info!(mount = self.id, "Retrying catalog fetch");
            self.request_catalog();
        }
        Ok(())
    }

    /// Updates the measured container size (e.g. after a late layout).
    pub fn resize(&mut self, container: ContainerMetrics) {
        self.container = container;
    }

    /// Advances one rendering frame: initializes the engine when due and
    /// applies any background results that have arrived.
    pub fn on_frame(&mut self) -> Vec<MountEvent> {
        let mut events = Vec::new();

        if self.phase == MountPhase::ContainerShown {
            if self.container.is_visible() {
                self.init_runtime(&mut events);
            } else {
                debug!(mount = self.id, "Container not laid out yet; deferring engine init");
            }
        }

        events.extend(self.poll());
        events
    }

    fn init_runtime(&mut self, events: &mut Vec<MountEvent>) {
        let runtime = &self.services.runtime;

        let result = if runtime.is_available() {
            runtime.init(&self.descriptor, self.container)
        } else {
            Err(ConfiguratorError::RuntimeUnavailable)
        };

        match result {
            Ok(()) => {
                info!(mount = self.id, "Configurator ready");
                self.phase = MountPhase::Ready;
                events.push(MountEvent::Ready);
            }
            Err(error) => {
                warn!(mount = self.id, "Configurator failed to start: {error}");
                self.phase = MountPhase::Failed(error.clone());
                self.queued.clear();
                events.push(MountEvent::Failed(error));
            }
        }
    }

    /// Applies background results that have arrived, without blocking.
    pub fn poll(&mut self) -> Vec<MountEvent> {
        let mut events = Vec::new();
        for completion in self.loader.drain() {
            self.handle_completion(completion, &mut events);
        }
        events
    }

    /// Blocks until every outstanding request has resolved or `timeout` passes.
    pub fn settle(&mut self, timeout: Duration) -> Vec<MountEvent> {
        let deadline = Instant::now() + timeout;
        let mut events = Vec::new();

        while self.loader.in_flight() > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match self.loader.wait(remaining) {
                Some(completion) => self.handle_completion(completion, &mut events),
                None => break,
            }
        }

        events
    }

    fn handle_completion(&mut self, completion: LoadCompletion, events: &mut Vec<MountEvent>) {
        if !self.is_current(completion.ticket) {
            debug!(
                mount = self.id,
                generation = completion.ticket.generation,
                "Discarding stale background result"
            );
            return;
        }

        match completion.outcome {
            LoadOutcome::Catalog(Ok(catalog)) => {
                events.push(MountEvent::CatalogLoaded {
                    pegboards: catalog.list(ProductType::Pegboard).len(),
                    accessories: catalog.list(ProductType::Accessory).len(),
                });
                self.catalog = Some(catalog);
                self.flush_queue(events);
            }
            LoadOutcome::Catalog(Err(e)) => {
                warn!(mount = self.id, "Catalog fetch failed: {e:#}");
                if !self.queued.is_empty() {
                    debug!(mount = self.id, dropped = self.queued.len(), "Dropping queued actions");
                    self.queued.clear();
                }
                let message = format!("{e:#}");
                self.catalog_error = Some(message.clone());
                events.push(MountEvent::CatalogFailed(message));
            }
            LoadOutcome::Saved(Ok(saved)) => {
                events.push(MountEvent::Saved { name: saved.name });
            }
            LoadOutcome::Loaded(Ok(saved)) => {
                let mut configuration = saved.configuration;
                configuration.name = Some(saved.name);
                events.extend(self.dispatch(SceneAction::Restore(configuration)));
            }
            LoadOutcome::Saved(Err(e)) | LoadOutcome::Loaded(Err(e)) => {
                events.push(match e.downcast::<ConfiguratorError>() {
                    Ok(error) => MountEvent::Rejected(error),
                    Err(other) => MountEvent::RequestFailed(format!("{other:#}")),
                });
            }
        }
    }

    fn flush_queue(&mut self, events: &mut Vec<MountEvent>) {
        while let Some(action) = self.queued.pop_front() {
            events.extend(self.dispatch(action));
        }
    }

    /// Applies a user action.
    ///
    /// Before the catalog arrives the action is queued and an empty event
    /// list is returned. After a failed fetch the action is answered with
    /// [`MountEvent::RequestFailed`] instead.
    pub fn dispatch(&mut self, action: SceneAction) -> Vec<MountEvent> {
        match &self.phase {
            MountPhase::TornDown => {
                debug!(mount = self.id, "Ignoring action on torn-down mount");
                return Vec::new();
            }
            MountPhase::Failed(error) => return vec![MountEvent::Rejected(error.clone())],
            _ => {}
        }

        if let Some(error) = &self.catalog_error {
            return vec![MountEvent::RequestFailed(format!("Catalog unavailable: {error}"))];
        }

        let Some(catalog) = self.catalog.clone() else {
            debug!(mount = self.id, "Catalog pending; queueing {action:?}");
            self.queued.push_back(action);
            return Vec::new();
        };

        let mut events = Vec::new();
        let result = match action {
            SceneAction::SelectPegboard(id) => {
                self.scene.select_pegboard(&id, &catalog).map(|removed| {
                    if !removed.is_empty() {
                        events.push(MountEvent::AccessoriesRemoved(removed));
                    }
                })
            }
            SceneAction::Place(placement) => self.scene.place(placement, &catalog).map(|_| ()),
            SceneAction::Remove(index) => self.scene.remove_accessory(index).map(|_| ()),
            SceneAction::Reset => {
                self.scene.reset();
                Ok(())
            }
            SceneAction::Restore(configuration) => SceneState::from_configuration(
                &configuration,
                &catalog,
                self.descriptor.max_accessories,
            )
            .map(|scene| {
                self.scene = scene;
                if let Some(name) = configuration.name {
                    events.push(MountEvent::Restored { name });
                }
            }),
        };

        match result {
            Ok(()) => events.push(MountEvent::SceneChanged(price_configuration(
                &self.scene.to_configuration(),
                &catalog,
            ))),
            Err(error) => {
                debug!(mount = self.id, "Action rejected: {error}");
                events.push(MountEvent::Rejected(error));
            }
        }

        events
    }

    fn ensure_usable(&self) -> Result<(), ConfiguratorError> {
        match &self.phase {
            MountPhase::Failed(error) => Err(error.clone()),
            MountPhase::TornDown => Err(ConfiguratorError::validation("mount has been torn down")),
            _ => Ok(()),
        }
    }

    /// Starts saving the current scene under `name`.
    ///
    /// The outcome arrives later as [`MountEvent::Saved`] or
    /// [`MountEvent::Rejected`].
    pub fn save(&mut self, name: &str) -> Result<(), ConfiguratorError> {
        self.ensure_usable()?;
        let ticket = self.ticket();
        self.loader.save(
            ticket,
            self.services.persistence.clone(),
            name.to_string(),
            self.scene.to_configuration(),
        );
        Ok(())
    }

    /// Starts loading the configuration saved under `name` into the scene.
    pub fn load(&mut self, name: &str) -> Result<(), ConfiguratorError> {
        self.ensure_usable()?;
        let ticket = self.ticket();
        self.loader
            .load(ticket, self.services.persistence.clone(), name.to_string());
        Ok(())
    }

    /// Removes the mount. Results of requests still in flight are discarded.
    pub fn teardown(&mut self) {
        if self.phase == MountPhase::TornDown {
            return;
        }
        self.generation += 1;
        self.phase = MountPhase::TornDown;
        self.queued.clear();
        info!(mount = self.id, "Configurator torn down");
    }
}
