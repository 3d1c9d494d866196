//! Seam to the separately loaded 3D rendering engine.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::error::ConfiguratorError;
use crate::mount::descriptor::MountDescriptor;

/// Measured container size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContainerMetrics {
    /// Laid-out width
    pub width: f64,
    /// Laid-out height
    pub height: f64,
}

impl ContainerMetrics {
    /// Creates metrics for a laid-out container.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when the container has a non-zero layout size.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// The 3D engine as seen by a mount.
///
/// `init` is called exactly once per mount, after the container is visible.
pub trait RenderRuntime: Send + Sync {
    /// Whether the engine is loaded at all.
    fn is_available(&self) -> bool;

    /// Builds the scene inside a container of the given size.
    fn init(
        &self,
        descriptor: &MountDescriptor,
        container: ContainerMetrics,
    ) -> Result<(), ConfiguratorError>;
}

/// Stand-in for a page where the engine script never loaded.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableRuntime;

impl RenderRuntime for UnavailableRuntime {
    fn is_available(&self) -> bool {
        false
    }

    fn init(&self, _: &MountDescriptor, _: ContainerMetrics) -> Result<(), ConfiguratorError> {
        Err(ConfiguratorError::RuntimeUnavailable)
    }
}

/// Engine that renders nothing and records how it was initialized.
///
/// Used by the CLI preview and by tests.
#[derive(Debug, Default)]
pub struct HeadlessRuntime {
    init_calls: AtomicUsize,
    last_container: Mutex<Option<ContainerMetrics>>,
}

impl HeadlessRuntime {
    /// Creates a headless engine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `init` calls so far.
    #[must_use]
    pub fn init_calls(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }

    /// Container size seen by the last `init`.
    #[must_use]
    pub fn last_container(&self) -> Option<ContainerMetrics> {
        self.last_container.lock().ok().and_then(|guard| *guard)
    }
}

impl RenderRuntime for HeadlessRuntime {
    fn is_available(&self) -> bool {
        true
    }

    fn init(
        &self,
        _descriptor: &MountDescriptor,
        container: ContainerMetrics,
    ) -> Result<(), ConfiguratorError> {
        if !container.is_visible() {
            return Err(ConfiguratorError::validation(
                "container has no layout size at engine init",
            ));
        }
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut guard) = self.last_container.lock() {
            *guard = Some(container);
        }
        Ok(())
    }
}
