//! Configurator mounts: everything between a shortcode on a page and an
//! interactive 3D scene.
//!
//! - [`descriptor`] turns shortcode attributes into a validated descriptor
//! - [`scaffold`] renders the container markup
//! - [`runtime`] is the seam to the 3D engine
//! - [`lifecycle`] drives one mount from creation to teardown
//! - [`tabs`] holds the admin settings page tab state

pub mod descriptor;
pub mod lifecycle;
pub mod runtime;
pub mod scaffold;
pub mod tabs;

pub use descriptor::{EngineOptions, MountDescriptor, PanelFlags, ShortcodeAttributes};
pub use lifecycle::{ConfiguratorMount, MountEvent, MountPhase, MountServices, SceneAction};
pub use runtime::{ContainerMetrics, HeadlessRuntime, RenderRuntime, UnavailableRuntime};
pub use scaffold::{escape_html, render_error_state, render_scaffold};
pub use tabs::SettingsTab;
