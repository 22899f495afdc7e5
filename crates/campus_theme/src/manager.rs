//! Theme manager: the one place preferences are loaded, changed and saved.
//!
//! `ThemeManager::new` is the only initialization path. It loads stored
//! preferences, hydrates the store against the current OS preference and
//! starts the system-mode watcher when needed, without writing anything
//! back. Consumers register with [`ThemeManager::on_apply`] and are called
//! right away with the hydrated theme, before their first paint.

use crate::color::Color;
use crate::config::ThemeConfig;
use crate::presets::ColorSchemeId;
use crate::state::{Changes, PreferenceStore, SidebarSource};
use crate::storage::{KeyValueStore, PersistenceAdapter, TomlFileStore};
use crate::theme::{EffectiveMode, FontSize, ThemeMode};
use crate::views::AppliedTheme;
use crate::watcher::{DarkModeListener, DarkModeSignal, SystemModeWatcher};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Consumer callback receiving the applied theme after every change.
pub type ApplyCallback = Arc<dyn Fn(&AppliedTheme) + Send + Sync>;

struct Inner {
    store: PreferenceStore,
    persistence: PersistenceAdapter,
    watcher: SystemModeWatcher,
    /// Bumped on every change; orders snapshots handed to consumers.
    revision: u64,
}

impl Inner {
    /// Persist `changes` and take a numbered snapshot for consumers.
    fn commit(&mut self, changes: Changes) -> (u64, AppliedTheme) {
        let partial = self.store.to_partial(changes);
        self.persistence.save(&partial);
        self.revision += 1;
        (self.revision, self.store.applied())
    }

    /// Apply the signal's current value. Called after subscribing so a flip
    /// between the read and the subscription is not lost.
    fn catch_up_with_system(&mut self) -> Changes {
        let dark = self.watcher.prefers_dark();
        self.store.set_system_prefers_dark(dark)
    }
}

#[derive(Default)]
struct Dispatch {
    /// Revision of the newest snapshot accepted.
    latest: u64,
    pending: Option<AppliedTheme>,
    running: bool,
}

/// Consumer callbacks, fed by one dispatch loop at a time.
///
/// A snapshot older than one already accepted is dropped. A snapshot that
/// arrives while the loop runs, from a consumer calling back into the
/// manager or from another thread, replaces the pending one and is
/// delivered by the running loop. Consumers therefore always end on the
/// newest state.
#[derive(Default)]
struct Observers {
    callbacks: Mutex<Vec<ApplyCallback>>,
    dispatch: Mutex<Dispatch>,
}

impl Observers {
    fn push(&self, callback: ApplyCallback) {
        self.callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(callback);
    }

    fn notify(&self, revision: u64, theme: AppliedTheme) {
        {
            let mut dispatch = self.lock_dispatch();
            if revision <= dispatch.latest {
                tracing::trace!("ThemeManager: dropping stale snapshot {revision}");
                return;
            }
            dispatch.latest = revision;
            dispatch.pending = Some(theme);
            if dispatch.running {
                return;
            }
            dispatch.running = true;
        }

        loop {
            let theme = {
                let mut dispatch = self.lock_dispatch();
                match dispatch.pending.take() {
                    Some(theme) => theme,
                    None => {
                        dispatch.running = false;
                        return;
                    }
                }
            };

            let callbacks = self
                .callbacks
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone();
            for callback in callbacks {
                if self.lock_dispatch().pending.is_some() {
                    break;
                }
                callback(&theme);
            }
        }
    }

    fn lock_dispatch(&self) -> MutexGuard<'_, Dispatch> {
        self.dispatch.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Owns the preference store, its persistence and the system-mode watcher.
pub struct ThemeManager {
    inner: Arc<Mutex<Inner>>,
    observers: Arc<Observers>,
}

impl ThemeManager {
    /// Load preferences from `store` and start tracking `signal`.
    pub fn new(store: Box<dyn KeyValueStore>, signal: Arc<dyn DarkModeSignal>) -> Self {
        Self::with_persistence(PersistenceAdapter::new(store), signal)
    }

    /// [`ThemeManager::new`] over the TOML file named by `config`. A file
    /// that cannot be opened leaves the session in memory, and
    /// [`ThemeManager::is_storage_available`] reports false.
    pub fn from_config(config: &ThemeConfig, signal: Arc<dyn DarkModeSignal>) -> Self {
        let path = config.storage_path();
        let keys = config.storage_keys();
        let persistence = match TomlFileStore::open(&path) {
            Ok(store) => PersistenceAdapter::with_keys(Box::new(store), keys),
            Err(err) => {
                tracing::debug!("ThemeManager: cannot open {}", path.display());
                PersistenceAdapter::unavailable(keys, &err)
            }
        };
        Self::with_persistence(persistence, signal)
    }

    pub fn with_persistence(mut persistence: PersistenceAdapter, signal: Arc<dyn DarkModeSignal>) -> Self {
        let prefs = persistence.load();
        let store = PreferenceStore::with_preferences(&prefs, signal.prefers_dark());
        tracing::debug!(
            "ThemeManager: hydrated mode={} scheme={} font={} sidebar={} (overridden: {})",
            store.theme_mode(),
            store.color_scheme(),
            store.font_size(),
            store.sidebar_color(),
            store.is_sidebar_overridden()
        );

        let manager = Self {
            inner: Arc::new(Mutex::new(Inner {
                store,
                persistence,
                watcher: SystemModeWatcher::new(signal),
                revision: 0,
            })),
            observers: Arc::new(Observers::default()),
        };
        {
            let mut inner = manager.lock();
            manager.sync_watcher(&mut *inner);
            inner.catch_up_with_system();
        }
        manager
    }

    /// Register a consumer. It is called immediately with the current theme
    /// and again after every change.
    pub fn on_apply(&self, callback: impl Fn(&AppliedTheme) + Send + Sync + 'static) {
        let callback: ApplyCallback = Arc::new(callback);
        self.observers.push(callback.clone());
        callback(&self.applied());
    }

    // ========== Reads ==========

    pub fn applied(&self) -> AppliedTheme {
        self.lock().store.applied()
    }

    pub fn theme_mode(&self) -> ThemeMode {
        self.lock().store.theme_mode()
    }

    pub fn effective_mode(&self) -> EffectiveMode {
        self.lock().store.effective_mode()
    }

    pub fn color_scheme(&self) -> ColorSchemeId {
        self.lock().store.color_scheme()
    }

    pub fn font_size(&self) -> FontSize {
        self.lock().store.font_size()
    }

    pub fn sidebar_color(&self) -> Color {
        self.lock().store.sidebar_color()
    }

    pub fn sidebar_text_color(&self) -> Color {
        self.lock().store.sidebar_text_color()
    }

    /// Whether the OS dark-mode subscription is live.
    pub fn is_watching_system(&self) -> bool {
        self.lock().watcher.is_active()
    }

    /// False once storage has failed this session.
    pub fn is_storage_available(&self) -> bool {
        self.lock().persistence.is_available()
    }

    // ========== Setters ==========

    pub fn set_theme_mode(&self, mode: ThemeMode) -> Changes {
        self.update(|inner| {
            // Catch up on OS changes missed while unsubscribed.
            let mut changes = Changes::empty();
            if mode == ThemeMode::System {
                let dark = inner.watcher.prefers_dark();
                changes |= inner.store.set_system_prefers_dark(dark);
            }
            changes | inner.store.set_theme_mode(mode)
        })
    }

    pub fn toggle_theme_mode(&self) -> Changes {
        let next = match self.effective_mode().toggle() {
            EffectiveMode::Light => ThemeMode::Light,
            EffectiveMode::Dark => ThemeMode::Dark,
        };
        self.set_theme_mode(next)
    }

    pub fn set_color_scheme(&self, id: ColorSchemeId) -> Changes {
        self.update(|inner| inner.store.set_color_scheme(id))
    }

    /// [`ThemeManager::set_color_scheme`] by id; unknown ids are logged and
    /// ignored.
    pub fn set_color_scheme_id(&self, id: &str) -> Changes {
        match id.parse::<ColorSchemeId>() {
            Ok(scheme) => self.set_color_scheme(scheme),
            Err(err) => {
                tracing::warn!("{err}; keeping current scheme");
                Changes::empty()
            }
        }
    }

    pub fn set_font_size(&self, size: FontSize) -> Changes {
        self.update(|inner| inner.store.set_font_size(size))
    }

    pub fn set_sidebar_color(&self, color: Color, source: SidebarSource) -> Changes {
        self.update(|inner| inner.store.set_sidebar_color(color, source))
    }

    pub fn reset_sidebar_to_scheme(&self) -> Changes {
        self.update(|inner| inner.store.reset_sidebar_to_scheme())
    }

    // ========== Internals ==========

    fn lock(&self) -> MutexGuard<'_, Inner> {
        lock_inner(&self.inner)
    }

    /// Run `op`, then re-sync the watcher, persist and notify consumers.
    /// Consumers run after the lock is released.
    fn update(&self, op: impl FnOnce(&mut Inner) -> Changes) -> Changes {
        let (changes, revision, applied) = {
            let mut inner = self.lock();
            let mut changes = op(&mut *inner);
            if changes.contains(Changes::THEME_MODE) {
                self.sync_watcher(&mut *inner);
                changes |= inner.catch_up_with_system();
            }
            if changes.is_empty() {
                return changes;
            }
            let (revision, applied) = inner.commit(changes);
            (changes, revision, applied)
        };

        self.observers.notify(revision, applied);
        changes
    }

    fn sync_watcher(&self, inner: &mut Inner) {
        let mode = inner.store.theme_mode();
        let state = Arc::downgrade(&self.inner);
        let observers = Arc::downgrade(&self.observers);
        inner.watcher.sync(mode, move || -> DarkModeListener {
            Arc::new(move |dark: bool| on_system_change(&state, &observers, dark))
        });
    }
}

fn lock_inner(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Watcher callback. Holds only weak references so a dropped manager tears
/// the subscription down instead of being kept alive by it.
///
/// Re-reads the signal under the lock instead of trusting `dark`: two flips
/// racing for the lock would otherwise apply in the wrong order.
fn on_system_change(state: &Weak<Mutex<Inner>>, observers: &Weak<Observers>, dark: bool) {
    let Some(state) = state.upgrade() else {
        return;
    };

    let (revision, applied) = {
        let mut inner = lock_inner(&state);
        let changes = inner.catch_up_with_system();
        if changes.is_empty() {
            return;
        }
        tracing::debug!("ThemeManager: system preference changed, dark={dark}");
        inner.commit(changes)
    };

    if let Some(observers) = observers.upgrade() {
        observers.notify(revision, applied);
    }
}
