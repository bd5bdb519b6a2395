//! The handle a button lifecycle drives.
//!
//! Page shells implement [`Control`] over whatever widget toolkit they
//! render with. [`MemoryControl`] keeps the same attributes in memory and is
//! what headless callers and the test suites use.

use std::collections::{BTreeSet, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

pub type SharedControl = Arc<dyn Control>;

/// An interactive control with DOM-like attributes. All setters take `&self`;
/// implementations use interior mutability.
pub trait Control: Send + Sync {
    /// Stable identity used by the registry.
    fn id(&self) -> &str;

    fn content(&self) -> String;
    fn set_content(&self, content: &str);

    fn is_disabled(&self) -> bool;
    fn set_disabled(&self, disabled: bool);

    fn aria_label(&self) -> Option<String>;
    /// `None` removes the attribute.
    fn set_aria_label(&self, label: Option<&str>);

    fn set_busy(&self, busy: bool);

    fn add_class(&self, class: &str);
    fn remove_class(&self, class: &str);

    fn focus(&self);

    /// Whether the control carries the given marker attribute.
    fn has_marker(&self, marker: &str) -> bool;
}

/// A collection of controls the registry can scan.
pub trait Container {
    fn query(&self, marker: &str) -> Vec<SharedControl>;

    fn find(&self, id: &str) -> Option<SharedControl>;
}

#[derive(Debug, Default)]
struct ControlAttrs {
    content: String,
    disabled: bool,
    aria_label: Option<String>,
    busy: bool,
    classes: BTreeSet<String>,
    markers: HashSet<String>,
}

#[derive(Debug)]
pub struct MemoryControl {
    id: String,
    attrs: Mutex<ControlAttrs>,
    focus_count: AtomicUsize,
}

impl MemoryControl {
    pub fn new(content: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), content)
    }

    pub fn with_id(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attrs: Mutex::new(ControlAttrs {
                content: content.into(),
                ..ControlAttrs::default()
            }),
            focus_count: AtomicUsize::new(0),
        }
    }

    pub fn labelled(self, label: impl Into<String>) -> Self {
        self.attrs().aria_label = Some(label.into());
        self
    }

    pub fn marked(self, marker: impl Into<String>) -> Self {
        self.attrs().markers.insert(marker.into());
        self
    }

    pub fn initially_disabled(self) -> Self {
        self.attrs().disabled = true;
        self
    }

    pub fn shared(self) -> SharedControl {
        Arc::new(self)
    }

    pub fn is_busy(&self) -> bool {
        self.attrs().busy
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attrs().classes.contains(class)
    }

    pub fn classes(&self) -> Vec<String> {
        self.attrs().classes.iter().cloned().collect()
    }

    pub fn focus_count(&self) -> usize {
        self.focus_count.load(Ordering::SeqCst)
    }

    fn attrs(&self) -> MutexGuard<'_, ControlAttrs> {
        self.attrs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Control for MemoryControl {
    fn id(&self) -> &str {
        &self.id
    }

    fn content(&self) -> String {
        self.attrs().content.clone()
    }

    fn set_content(&self, content: &str) {
        self.attrs().content = content.to_string();
    }

    fn is_disabled(&self) -> bool {
        self.attrs().disabled
    }

    fn set_disabled(&self, disabled: bool) {
        self.attrs().disabled = disabled;
    }

    fn aria_label(&self) -> Option<String> {
        self.attrs().aria_label.clone()
    }

    fn set_aria_label(&self, label: Option<&str>) {
        self.attrs().aria_label = label.map(str::to_string);
    }

    fn set_busy(&self, busy: bool) {
        self.attrs().busy = busy;
    }

    fn add_class(&self, class: &str) {
        self.attrs().classes.insert(class.to_string());
    }

    fn remove_class(&self, class: &str) {
        self.attrs().classes.remove(class);
    }

    fn focus(&self) {
        self.focus_count.fetch_add(1, Ordering::SeqCst);
    }

    fn has_marker(&self, marker: &str) -> bool {
        self.attrs().markers.contains(marker)
    }
}

#[derive(Default)]
pub struct MemoryContainer {
    controls: Vec<SharedControl>,
}

impl MemoryContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, control: SharedControl) {
        self.controls.push(control);
    }
}

impl Container for MemoryContainer {
    fn query(&self, marker: &str) -> Vec<SharedControl> {
        self.controls
            .iter()
            .filter(|control| control.has_marker(marker))
            .cloned()
            .collect()
    }

    fn find(&self, id: &str) -> Option<SharedControl> {
        self.controls
            .iter()
            .find(|control| control.id() == id)
            .cloned()
    }
}
