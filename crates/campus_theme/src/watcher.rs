//! System dark-mode signal and watcher
//!
//! The host pushes OS dark-mode changes into a [`DarkModeSignal`]; the
//! [`SystemModeWatcher`] keeps exactly one subscription to it while the
//! theme mode is `System` and none otherwise.

use crate::theme::ThemeMode;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Callback invoked with the new "prefers dark" value.
pub type DarkModeListener = Arc<dyn Fn(bool) + Send + Sync>;

/// Handle identifying one listener on a signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Read-only, subscribable "prefers dark color scheme" signal.
pub trait DarkModeSignal: Send + Sync {
    fn prefers_dark(&self) -> bool;
    fn subscribe(&self, listener: DarkModeListener) -> ListenerId;
    fn unsubscribe(&self, id: ListenerId);
}

/// Push-based OS dark-mode signal.
///
/// Platform glue calls [`SystemColorScheme::set_prefers_dark`] from its
/// native change notification (a media-query listener, a settings portal
/// signal, a window theme event).
pub struct SystemColorScheme {
    prefers_dark: AtomicBool,
    next_id: AtomicU64,
    listeners: Mutex<FxHashMap<ListenerId, DarkModeListener>>,
}

impl SystemColorScheme {
    pub fn new(prefers_dark: bool) -> Self {
        Self {
            prefers_dark: AtomicBool::new(prefers_dark),
            next_id: AtomicU64::new(0),
            listeners: Mutex::new(FxHashMap::default()),
        }
    }

    /// Seed from the OS. Detection errors count as light.
    #[cfg(feature = "detect")]
    pub fn detect() -> Self {
        let dark = matches!(dark_light::detect(), Ok(dark_light::Mode::Dark));
        tracing::debug!("SystemColorScheme::detect - prefers dark: {dark}");
        Self::new(dark)
    }

    /// Update the signal. Listeners run only when the value changes, and
    /// outside the listener lock.
    pub fn set_prefers_dark(&self, dark: bool) {
        if self.prefers_dark.swap(dark, Ordering::SeqCst) == dark {
            return;
        }

        let listeners: Vec<DarkModeListener> = self.lock().values().cloned().collect();
        tracing::trace!(
            "SystemColorScheme: prefers dark -> {dark}, notifying {} listener(s)",
            listeners.len()
        );
        for listener in listeners {
            listener(dark);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FxHashMap<ListenerId, DarkModeListener>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SystemColorScheme {
    fn default() -> Self {
        Self::new(false)
    }
}

impl DarkModeSignal for SystemColorScheme {
    fn prefers_dark(&self) -> bool {
        self.prefers_dark.load(Ordering::SeqCst)
    }

    fn subscribe(&self, listener: DarkModeListener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().insert(id, listener);
        id
    }

    fn unsubscribe(&self, id: ListenerId) {
        self.lock().remove(&id);
    }
}

/// Unsubscribes its listener when dropped.
pub struct Subscription {
    signal: Arc<dyn DarkModeSignal>,
    id: ListenerId,
}

impl Subscription {
    pub fn new(signal: Arc<dyn DarkModeSignal>, listener: DarkModeListener) -> Self {
        let id = signal.subscribe(listener);
        Self { signal, id }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.signal.unsubscribe(self.id);
    }
}

/// Keeps a dark-mode subscription alive exactly while the mode is `System`.
pub struct SystemModeWatcher {
    signal: Arc<dyn DarkModeSignal>,
    subscription: Option<Subscription>,
}

impl SystemModeWatcher {
    pub fn new(signal: Arc<dyn DarkModeSignal>) -> Self {
        Self {
            signal,
            subscription: None,
        }
    }

    pub fn signal(&self) -> &Arc<dyn DarkModeSignal> {
        &self.signal
    }

    /// Current OS preference.
    pub fn prefers_dark(&self) -> bool {
        self.signal.prefers_dark()
    }

    pub fn is_active(&self) -> bool {
        self.subscription.is_some()
    }

    /// Subscribe or unsubscribe to match `mode`. `listener` is only built
    /// when a new subscription is needed. Returns true if one was created.
    pub fn sync(&mut self, mode: ThemeMode, listener: impl FnOnce() -> DarkModeListener) -> bool {
        match (mode, self.subscription.is_some()) {
            (ThemeMode::System, false) => {
                let subscription = Subscription::new(self.signal.clone(), listener());
                tracing::debug!("SystemModeWatcher: subscribed ({:?})", subscription.id());
                self.subscription = Some(subscription);
                true
            }
            (ThemeMode::Light | ThemeMode::Dark, true) => {
                self.stop();
                false
            }
            _ => false,
        }
    }

    pub fn stop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            tracing::debug!("SystemModeWatcher: unsubscribed ({:?})", subscription.id());
        }
    }
}
