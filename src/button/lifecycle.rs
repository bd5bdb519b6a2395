use std::fmt::Display;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use anyhow::{bail, Result};
use tokio::runtime::Handle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::config::ButtonConfig;
use super::control::SharedControl;
use super::state::{ButtonState, OriginalSnapshot, STATE_CLASSES};

// Set to true to trace every transition at debug level
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_warn};

const SUCCESS_ICON: &str = r#"<span class="btn-icon" aria-hidden="true">&#10003;</span>"#;
const ERROR_ICON: &str = r#"<span class="btn-icon" aria-hidden="true">&#9888;</span>"#;

pub const DEFAULT_SUCCESS_MESSAGE: &str = "Success!";
pub const DEFAULT_ERROR_MESSAGE: &str = "An error occurred";

type RetryCallback = Box<dyn FnOnce() + Send>;
type ClickHandler = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Passed the guard and reached the application's handlers.
    Accepted,
    /// Vetoed before any application handler saw it.
    Suppressed,
    /// Consumed by the one-shot retry hook armed by `set_error_with_retry`.
    Retried,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RevertTimer {
    Success,
    Error,
}

impl RevertTimer {
    fn state(self) -> ButtonState {
        match self {
            RevertTimer::Success => ButtonState::Success,
            RevertTimer::Error => ButtonState::Error,
        }
    }
}

struct Inner {
    state: ButtonState,
    original: OriginalSnapshot,
    last_click: Option<Instant>,
    success_timer: Option<CancellationToken>,
    error_timer: Option<CancellationToken>,
    retry: Option<RetryCallback>,
    handlers: Vec<ClickHandler>,
}

impl Inner {
    fn timer_slot(&mut self, kind: RevertTimer) -> &mut Option<CancellationToken> {
        match kind {
            RevertTimer::Success => &mut self.success_timer,
            RevertTimer::Error => &mut self.error_timer,
        }
    }

    fn cancel_timers(&mut self) {
        for token in [self.success_timer.take(), self.error_timer.take()]
            .into_iter()
            .flatten()
        {
            token.cancel();
        }
    }
}

/// Drives one control through idle → loading → success/error → idle.
///
/// Cloning is cheap and every clone drives the same control; the registry
/// hands out clones so page scripts share one lifecycle per control.
#[derive(Clone)]
pub struct ButtonLifecycle {
    control: SharedControl,
    config: Arc<ButtonConfig>,
    inner: Arc<Mutex<Inner>>,
}

impl ButtonLifecycle {
    pub fn new(control: SharedControl, config: Arc<ButtonConfig>) -> Self {
        let original = OriginalSnapshot::capture(control.as_ref());
        Self {
            control,
            config,
            inner: Arc::new(Mutex::new(Inner {
                state: ButtonState::Idle,
                original,
                last_click: None,
                success_timer: None,
                error_timer: None,
                retry: None,
                handlers: Vec::new(),
            })),
        }
    }

    /// Build over a control that came out of a lookup. A missing control is a
    /// caller bug and is rejected immediately.
    pub fn try_new(control: Option<SharedControl>, config: Arc<ButtonConfig>) -> Result<Self> {
        let Some(control) = control else {
            bail!("cannot manage a missing button control");
        };
        Ok(Self::new(control, config))
    }

    pub fn id(&self) -> &str {
        self.control.id()
    }

    pub fn control(&self) -> &SharedControl {
        &self.control
    }

    pub fn config(&self) -> &ButtonConfig {
        &self.config
    }

    pub fn state(&self) -> ButtonState {
        self.lock().state
    }

    pub fn is_processing(&self) -> bool {
        self.state() == ButtonState::Loading
    }

    /// True when both handles drive the same lifecycle.
    pub fn same_as(&self, other: &ButtonLifecycle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Register an application click handler. Handlers only run for clicks
    /// that pass the guard in [`click`](Self::click).
    pub fn on_click<F>(&self, handler: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.lock().handlers.push(Arc::new(handler));
    }

    pub fn set_loading(&self, custom_text: Option<&str>) {
        let mut inner = self.lock();
        if inner.state == ButtonState::Loading {
            log_debug!("button {} already loading", self.id());
            return;
        }

        inner.cancel_timers();
        inner.retry = None;

        let text = custom_text.unwrap_or(&self.config.loading_text);
        self.control.set_disabled(true);
        self.control
            .set_content(&format!("{} {}", self.config.spinner_template, text));
        self.control.set_busy(true);
        self.control.set_aria_label(Some(text));
        self.apply_visual(ButtonState::Loading);

        inner.last_click = Some(Instant::now());
        self.transition(&mut inner, ButtonState::Loading);
    }

    pub fn set_success(&self, message: Option<&str>) {
        let mut inner = self.lock();
        let message = message.unwrap_or(DEFAULT_SUCCESS_MESSAGE);

        inner.cancel_timers();
        inner.retry = None;

        self.control.set_disabled(true);
        self.control.set_content(&format!("{SUCCESS_ICON} {message}"));
        self.control.set_busy(false);
        self.control.set_aria_label(Some(message));
        self.apply_visual(ButtonState::Success);

        self.transition(&mut inner, ButtonState::Success);
        self.arm_revert(&mut inner, RevertTimer::Success, self.config.success_duration());
    }

    /// Show an error and auto-revert after `error_duration`.
    pub fn set_error(&self, message: Option<&str>) {
        self.show_error(message, None);
    }

    /// Show an error that stays until the user clicks; that click runs
    /// `retry` once instead of reaching the application handlers.
    pub fn set_error_with_retry<F>(&self, message: Option<&str>, retry: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.show_error(message, Some(Box::new(retry)));
    }

    pub fn restore(&self) {
        let mut inner = self.lock();
        self.restore_locked(&mut inner);
    }

    /// Run `operation` with the control in loading state, then show success
    /// or the error's message. The operation's result is returned untouched.
    pub async fn track<F, T, E>(&self, operation: F) -> std::result::Result<T, E>
    where
        F: Future<Output = std::result::Result<T, E>>,
        E: Display,
    {
        self.set_loading(None);
        match operation.await {
            Ok(value) => {
                self.set_success(None);
                Ok(value)
            }
            Err(err) => {
                self.set_error(Some(&err.to_string()));
                Err(err)
            }
        }
    }

    /// Feed one user activation through the guard.
    ///
    /// With `prevent_double_click` on, clicks are vetoed unless the control
    /// is idle and the debounce window since the last accepted click has
    /// passed. Accepted clicks stamp the debounce clock before any handler
    /// runs.
    pub fn click(&self) -> ClickOutcome {
        let mut inner = self.lock();

        let retry = inner.retry.take();
        if let Some(retry) = retry {
            drop(inner);
            log_debug!("button {} retrying", self.id());
            retry();
            return ClickOutcome::Retried;
        }

        if self.config.prevent_double_click {
            if inner.state != ButtonState::Idle {
                log_debug!(
                    "button {} click suppressed while {}",
                    self.id(),
                    inner.state.as_str()
                );
                return ClickOutcome::Suppressed;
            }

            let now = Instant::now();
            let window = self.config.debounce_window();
            if let Some(last) = inner.last_click {
                if now.saturating_duration_since(last) < window {
                    log_debug!("button {} click debounced", self.id());
                    return ClickOutcome::Suppressed;
                }
            }
            inner.last_click = Some(now);
        }

        let handlers = inner.handlers.clone();
        drop(inner);

        for handler in handlers {
            handler();
        }
        ClickOutcome::Accepted
    }

    /// Cancel pending timers and drop hooks. Used when the control goes away.
    pub fn dispose(&self) {
        let mut inner = self.lock();
        inner.cancel_timers();
        inner.retry = None;
        inner.handlers.clear();
    }

    fn show_error(&self, message: Option<&str>, retry: Option<RetryCallback>) {
        let mut inner = self.lock();
        let message = message.unwrap_or(DEFAULT_ERROR_MESSAGE);

        inner.cancel_timers();

        // Errors stay interactive so the user can retry or move on.
        self.control.set_disabled(false);
        self.control.set_content(&format!("{ERROR_ICON} {message}"));
        self.control.set_busy(false);
        self.control.set_aria_label(Some(message));
        self.apply_visual(ButtonState::Error);

        self.transition(&mut inner, ButtonState::Error);

        // Screen readers announce the failure when focus lands on it.
        self.control.focus();

        match retry {
            Some(retry) => inner.retry = Some(retry),
            None => {
                inner.retry = None;
                self.arm_revert(&mut inner, RevertTimer::Error, self.config.error_duration());
            }
        }
    }

    fn restore_locked(&self, inner: &mut Inner) {
        inner.cancel_timers();
        inner.retry = None;

        inner.original.apply(self.control.as_ref());
        self.control.set_busy(false);
        self.apply_visual(ButtonState::Idle);

        self.transition(inner, ButtonState::Idle);
    }

    fn apply_visual(&self, state: ButtonState) {
        for class in STATE_CLASSES {
            self.control.remove_class(class);
        }
        if let Some(class) = state.visual_class() {
            self.control.add_class(class);
        }
    }

    fn transition(&self, inner: &mut Inner, next: ButtonState) {
        log_debug!(
            "button {}: {} -> {}",
            self.id(),
            inner.state.as_str(),
            next.as_str()
        );
        inner.state = next;
    }

    fn arm_revert(&self, inner: &mut Inner, kind: RevertTimer, delay: Duration) {
        if let Some(previous) = inner.timer_slot(kind).take() {
            previous.cancel();
        }

        let Ok(runtime) = Handle::try_current() else {
            log_warn!(
                "no tokio runtime; button {} will not auto-revert from {}",
                self.id(),
                kind.state().as_str()
            );
            return;
        };

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let lifecycle = self.clone();

        runtime.spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => {}
                _ = tokio::time::sleep(delay) => lifecycle.expire(kind, &cancelled),
            }
        });

        *inner.timer_slot(kind) = Some(token);
    }

    fn expire(&self, kind: RevertTimer, token: &CancellationToken) {
        let mut inner = self.lock();
        // Cancellation happens under this lock, so a superseded timer can't
        // slip through between the sleep finishing and this check.
        if token.is_cancelled() || inner.state != kind.state() {
            return;
        }
        inner.timer_slot(kind).take();
        self.restore_locked(&mut inner);
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::button::control::Control;
    use crate::button::control::MemoryControl;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn setup() -> (Arc<MemoryControl>, ButtonLifecycle) {
        let control = Arc::new(MemoryControl::with_id("apply", "Apply now").labelled("Apply"));
        let lifecycle = ButtonLifecycle::new(control.clone(), Arc::new(ButtonConfig::default()));
        (control, lifecycle)
    }

    #[test]
    fn try_new_rejects_missing_control() {
        let result = ButtonLifecycle::try_new(None, Arc::new(ButtonConfig::default()));
        assert!(result.is_err());
    }

    #[test]
    fn loading_disables_and_marks_busy() {
        let (control, lifecycle) = setup();
        lifecycle.set_loading(None);

        assert!(lifecycle.is_processing());
        assert!(control.is_disabled());
        assert!(control.is_busy());
        assert!(control.has_class("loading"));
        assert!(control.content().ends_with("Processing..."));
        assert_eq!(control.aria_label().as_deref(), Some("Processing..."));
    }

    #[test]
    fn second_set_loading_is_a_no_op() {
        let (control, lifecycle) = setup();
        lifecycle.set_loading(Some("Submitting"));
        lifecycle.set_loading(Some("Other text"));

        assert!(control.content().ends_with("Submitting"));
    }

    #[test]
    fn restore_without_original_label_removes_it() {
        let control = Arc::new(MemoryControl::new("Join event"));
        let lifecycle = ButtonLifecycle::new(control.clone(), Arc::new(ButtonConfig::default()));

        lifecycle.set_loading(None);
        lifecycle.restore();

        assert_eq!(control.aria_label(), None);
        assert_eq!(control.content(), "Join event");
        assert!(control.classes().is_empty());
        assert!(!control.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn success_reverts_after_duration() {
        let (control, lifecycle) = setup();
        lifecycle.set_loading(None);
        lifecycle.set_success(Some("Done"));

        assert!(control.is_disabled());
        assert!(control.has_class("success"));
        assert!(!control.has_class("loading"));

        tokio::time::sleep(Duration::from_millis(1999)).await;
        assert_eq!(lifecycle.state(), ButtonState::Success);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(lifecycle.state(), ButtonState::Idle);
        assert_eq!(control.content(), "Apply now");
        assert!(!control.is_disabled());
        assert_eq!(control.aria_label().as_deref(), Some("Apply"));
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_success_restarts_the_timer() {
        let (_control, lifecycle) = setup();
        lifecycle.set_success(None);
        tokio::time::sleep(Duration::from_millis(1500)).await;
        lifecycle.set_success(Some("Saved again"));

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(lifecycle.state(), ButtonState::Success);

        tokio::time::sleep(Duration::from_millis(1001)).await;
        assert_eq!(lifecycle.state(), ButtonState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_error_timer_does_not_revert_newer_state() {
        let (_control, lifecycle) = setup();
        lifecycle.set_error(None);
        tokio::time::sleep(Duration::from_millis(4000)).await;
        lifecycle.set_loading(None);

        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert_eq!(lifecycle.state(), ButtonState::Loading);
    }

    #[tokio::test(start_paused = true)]
    async fn error_with_retry_waits_for_click() {
        let (control, lifecycle) = setup();
        let retries = Arc::new(AtomicUsize::new(0));
        let counter = retries.clone();

        lifecycle.set_error_with_retry(Some("Upload failed"), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(!control.is_disabled());
        assert_eq!(control.focus_count(), 1);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(lifecycle.state(), ButtonState::Error);

        assert_eq!(lifecycle.click(), ClickOutcome::Retried);
        assert_eq!(retries.load(Ordering::SeqCst), 1);

        // One-shot: the next click goes through the normal guard.
        assert_eq!(lifecycle.click(), ClickOutcome::Suppressed);
        assert_eq!(retries.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn debounce_window_reopens() {
        let (_control, lifecycle) = setup();
        assert_eq!(lifecycle.click(), ClickOutcome::Accepted);

        tokio::time::sleep(Duration::from_millis(499)).await;
        assert_eq!(lifecycle.click(), ClickOutcome::Suppressed);

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(lifecycle.click(), ClickOutcome::Accepted);
    }

    #[test]
    fn guard_can_be_turned_off() {
        let control = Arc::new(MemoryControl::new("Vote"));
        let config = ButtonConfig {
            prevent_double_click: false,
            ..ButtonConfig::default()
        };
        let lifecycle = ButtonLifecycle::new(control, Arc::new(config));

        lifecycle.set_loading(None);
        assert_eq!(lifecycle.click(), ClickOutcome::Accepted);
        assert_eq!(lifecycle.click(), ClickOutcome::Accepted);
    }

    #[tokio::test(start_paused = true)]
    async fn track_reports_error_message() {
        let (control, lifecycle) = setup();
        let result: std::result::Result<(), String> = lifecycle
            .track(async { Err("quota exceeded".to_string()) })
            .await;

        assert!(result.is_err());
        assert_eq!(lifecycle.state(), ButtonState::Error);
        assert_eq!(control.aria_label().as_deref(), Some("quota exceeded"));
    }

    #[test]
    fn transitions_without_runtime_skip_auto_revert() {
        let (_control, lifecycle) = setup();
        lifecycle.set_success(None);
        assert_eq!(lifecycle.state(), ButtonState::Success);
        lifecycle.restore();
        assert_eq!(lifecycle.state(), ButtonState::Idle);
    }
}
