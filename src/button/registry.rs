use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};

use super::config::ButtonConfig;
use super::control::{Container, SharedControl};
use super::lifecycle::ButtonLifecycle;

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

/// Marker attribute that opts a control into bulk initialisation.
pub const STATEFUL_MARKER: &str = "data-stateful";

/// One lifecycle per control, scoped to a page session.
///
/// Registration is idempotent for the same control: later lookups return the
/// lifecycle already bound to it. A different control reusing a registered id
/// (a re-rendered button) replaces the stale lifecycle, which is disposed.
pub struct ButtonRegistry {
    config: Arc<ButtonConfig>,
    controllers: Mutex<HashMap<String, ButtonLifecycle>>,
}

impl ButtonRegistry {
    pub fn new(config: ButtonConfig) -> Self {
        Self {
            config: Arc::new(config),
            controllers: Mutex::new(HashMap::new()),
        }
    }

    pub fn get_or_create(&self, control: SharedControl) -> ButtonLifecycle {
        let mut controllers = self.controllers();
        self.bind(&mut controllers, control).0
    }

    pub fn get(&self, id: &str) -> Option<ButtonLifecycle> {
        self.controllers().get(id).cloned()
    }

    /// Resolve `id` through `container` and return its lifecycle, creating it
    /// on first use. Fails when the container has no such control.
    pub fn lookup(&self, container: &dyn Container, id: &str) -> Result<ButtonLifecycle> {
        let control = container
            .find(id)
            .with_context(|| format!("button control {id} not found"))?;

        let mut controllers = self.controllers();
        Ok(self.bind(&mut controllers, control).0)
    }

    /// Create lifecycles for every control in `container` carrying `marker`
    /// that isn't registered yet, rebinding ids whose control was replaced.
    /// Returns how many were created.
    pub fn init_all(&self, container: &dyn Container, marker: &str) -> usize {
        let mut controllers = self.controllers();
        let mut created = 0;

        for control in container.query(marker) {
            if self.bind(&mut controllers, control).1 {
                created += 1;
            }
        }

        log_info!(
            "initialised {} button(s) for marker {} ({} registered)",
            created,
            marker,
            controllers.len()
        );
        created
    }

    /// Forget a control, cancelling anything its lifecycle still has pending.
    pub fn remove(&self, id: &str) -> Option<ButtonLifecycle> {
        let removed = self.controllers().remove(id);
        if let Some(lifecycle) = &removed {
            lifecycle.dispose();
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.controllers().len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers().is_empty()
    }

    /// Dispose every lifecycle and empty the registry.
    pub fn teardown(&self) {
        let drained: Vec<ButtonLifecycle> = self
            .controllers()
            .drain()
            .map(|(_, lifecycle)| lifecycle)
            .collect();

        for lifecycle in &drained {
            lifecycle.dispose();
        }
        log_debug!("registry torn down, disposed {} button(s)", drained.len());
    }

    /// Return the lifecycle bound to `control`, creating one when the id is
    /// new or its lifecycle belongs to another control. The flag is `true`
    /// when a lifecycle was created.
    fn bind(
        &self,
        controllers: &mut HashMap<String, ButtonLifecycle>,
        control: SharedControl,
    ) -> (ButtonLifecycle, bool) {
        let id = control.id().to_string();
        if let Some(existing) = controllers.get(&id) {
            if same_control(existing.control(), &control) {
                return (existing.clone(), false);
            }
            log_debug!("button {} was re-rendered, rebinding", id);
            existing.dispose();
        } else {
            log_debug!("registering button {}", id);
        }

        let lifecycle = ButtonLifecycle::new(control, self.config.clone());
        controllers.insert(id, lifecycle.clone());
        (lifecycle, true)
    }

    fn controllers(&self) -> MutexGuard<'_, HashMap<String, ButtonLifecycle>> {
        self.controllers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

// Data pointers only; vtable pointers for the same type may differ.
fn same_control(a: &SharedControl, b: &SharedControl) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::button::control::{MemoryContainer, MemoryControl};
    use crate::button::state::ButtonState;

    fn marked(id: &str, content: &str) -> SharedControl {
        MemoryControl::with_id(id, content)
            .marked(STATEFUL_MARKER)
            .shared()
    }

    fn container() -> MemoryContainer {
        let mut container = MemoryContainer::new();
        container.push(marked("apply", "Apply"));
        container.push(marked("save", "Save"));
        container.push(MemoryControl::with_id("plain", "Plain").shared());
        container
    }

    #[test]
    fn init_all_skips_registered_and_unmarked() {
        let registry = ButtonRegistry::new(ButtonConfig::default());
        let container = container();

        let first = registry.lookup(&container, "apply").unwrap();
        first.set_loading(None);

        assert_eq!(registry.init_all(&container, STATEFUL_MARKER), 1);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.init_all(&container, STATEFUL_MARKER), 0);

        // The pre-existing lifecycle was not replaced.
        assert_eq!(registry.get("apply").unwrap().state(), ButtonState::Loading);
    }

    #[test]
    fn get_or_create_rebinds_rerendered_control() {
        let registry = ButtonRegistry::new(ButtonConfig::default());
        let old = MemoryControl::with_id("apply", "Old").shared();
        let stale = registry.get_or_create(old.clone());

        let fresh = MemoryControl::with_id("apply", "Fresh").shared();
        let lifecycle = registry.get_or_create(fresh.clone());
        lifecycle.set_loading(None);

        assert!(!lifecycle.same_as(&stale));
        assert!(fresh.is_disabled());
        assert!(!old.is_disabled());
        assert_eq!(old.content(), "Old");
        assert_eq!(registry.len(), 1);
        assert!(registry.get("apply").unwrap().same_as(&lifecycle));
    }

    #[test]
    fn lookup_and_init_all_follow_rerendered_controls() {
        let registry = ButtonRegistry::new(ButtonConfig::default());
        let before = container();
        let stale = registry.lookup(&before, "apply").unwrap();
        assert_eq!(registry.init_all(&before, STATEFUL_MARKER), 1);

        let after = container();
        let looked_up = registry.lookup(&after, "apply").unwrap();
        assert!(!looked_up.same_as(&stale));

        // Only "save" still points at the old render.
        assert_eq!(registry.init_all(&after, STATEFUL_MARKER), 1);
        assert_eq!(registry.len(), 2);

        registry.get("save").unwrap().set_loading(None);
        assert!(after.find("save").unwrap().is_disabled());
        assert!(!before.find("save").unwrap().is_disabled());
    }

    #[test]
    fn lookup_of_unknown_control_fails() {
        let registry = ButtonRegistry::new(ButtonConfig::default());
        let err = registry.lookup(&container(), "missing").err().unwrap();
        assert!(format!("{err:#}").contains("missing"));
        assert!(registry.is_empty());
    }

    #[test]
    fn teardown_empties_registry() {
        let registry = ButtonRegistry::new(ButtonConfig::default());
        registry.init_all(&container(), STATEFUL_MARKER);
        registry.teardown();
        assert!(registry.is_empty());
        assert!(registry.get("save").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_cancels_pending_reverts() {
        let registry = ButtonRegistry::new(ButtonConfig::default());
        let control = marked("apply", "Apply");
        let lifecycle = registry.get_or_create(control.clone());
        lifecycle.set_success(Some("Saved"));

        registry.teardown();
        tokio::time::sleep(Duration::from_millis(3000)).await;

        assert_eq!(lifecycle.state(), ButtonState::Success);
        assert!(control.content().ends_with("Saved"));
        assert!(control.is_disabled());
    }

    #[test]
    fn remove_returns_the_lifecycle() {
        let registry = ButtonRegistry::new(ButtonConfig::default());
        let control = MemoryControl::with_id("join", "Join").shared();
        let created = registry.get_or_create(control);

        let removed = registry.remove("join").unwrap();
        assert!(removed.same_as(&created));
        assert!(registry.get("join").is_none());
    }
}
