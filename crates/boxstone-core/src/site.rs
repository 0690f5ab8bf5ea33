//! The site object owning every component
//!
//! [`Site`] is the single owner of navigation, menu, animation and contact
//! form state. Hosts forward DOM events and fired timers to it; components
//! never talk to each other directly.

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::analytics::Analytics;
use crate::animation::{AnimationView, PageInventory, ScrollAnimator};
use crate::app::{
    AppState, DeviceProfile, EnvironmentInfo, Notice, NoticeKind, NoticeView, Theme,
    THEME_STORAGE_KEY,
};
use crate::config::{Environment, SiteConfig};
use crate::contact::{
    ContactField, ContactForm, ContactStats, FormValues, FormView, SubmissionResult, SubmitOutcome,
};
use crate::error::SiteError;
use crate::navigation::{
    header_is_scrolled, KeyPress, MenuView, MobileMenu, NavigationState, SectionId,
    SectionNavigator, SectionView, Shortcut, ShortcutMap, ShowOutcome, TransitionEvent,
};
use crate::page::{
    copy_notice, is_activation_key, Announcer, PageView, ScriptError, RELOAD_DELAY,
    SKIP_LINK_TARGET, SKIP_LINK_TEXT,
};
use crate::platform::{
    CopyStatus, HeadlessPlatform, Platform, Scheduler, TargetId, Timer, VisibilityEntry,
};

/// Every DOM capability the site needs
pub trait SiteView:
    SectionView + MenuView + AnimationView + FormView + NoticeView + PageView
{
}

impl<T> SiteView for T where
    T: SectionView + MenuView + AnimationView + FormView + NoticeView + PageView
{
}

/// Everything the development console shows about a running site
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugSnapshot<'a> {
    pub config: &'a SiteConfig,
    pub state: &'a AppState,
    pub navigation: NavigationState,
    pub contacts: ContactStats,
    pub tracked_events: usize,
}

pub struct Site<P: Platform, V: SiteView> {
    config: SiteConfig,
    platform: P,
    view: V,
    state: AppState,
    navigator: SectionNavigator,
    menu: MobileMenu,
    shortcuts: ShortcutMap,
    animator: ScrollAnimator,
    form: ContactForm,
    analytics: Analytics,
    announcer: Announcer,
    header_scrolled: bool,
}

impl<P: Platform, V: SiteView> Site<P, V> {
    pub fn new(config: SiteConfig, platform: P, view: V) -> Self {
        let initial = config
            .navigation
            .sections
            .first()
            .map(SectionId::from)
            .unwrap_or_else(|| SectionId::from("home"));
        let reduced_motion = platform.prefers_reduced_motion();

        Self {
            state: AppState::new(initial.clone(), config.site.language.clone()),
            navigator: SectionNavigator::new(initial, (&config.navigation).into()),
            menu: MobileMenu::new(
                config.navigation.mobile_breakpoint,
                config.navigation.outside_click_delay(),
            ),
            shortcuts: ShortcutMap::from(&config.navigation),
            animator: ScrollAnimator::new(&config.animation, reduced_motion),
            form: ContactForm::new(&config.contact),
            analytics: Analytics::new(config.features.analytics),
            announcer: Announcer::default(),
            header_scrolled: false,
            config,
            platform,
            view,
        }
    }

    /// Run startup once; later calls only log a warning and return `false`
    pub fn initialize(&mut self, env: &EnvironmentInfo, inventory: &PageInventory) -> bool {
        if self.state.is_initialized {
            warn!("Site is already initialized");
            return false;
        }

        let device = DeviceProfile::detect(&env.user_agent);
        self.view.set_device_classes(&device.body_classes());
        info!("Device detected: {}", device.label());
        self.state.device = device;
        self.state.is_online = env.online;

        if self.config.features.dark_mode {
            let theme = Theme::resolve(self.stored_theme().as_deref(), env.prefers_dark);
            self.apply_theme(theme);
        }

        if self.config.features.animations {
            self.animator
                .register(inventory, &mut self.platform, &mut self.view);
        }

        self.view.install_skip_link(SKIP_LINK_TEXT, SKIP_LINK_TARGET);
        for target in &inventory.focusable {
            self.view.make_focusable(*target);
        }

        self.analytics.track_page_view(env.path.clone());
        self.state.is_initialized = true;

        let site = &self.config.site;
        info!("{} v{} initialized", site.name, site.version);
        if self.debug_enabled() {
            info!("Debug mode enabled");
            debug!("App state: {:?}", self.state);
            debug!("Config: {:?}", self.config);
        }
        let now = self.platform.now();
        self.view
            .emit_app_initialized(&self.config.site.version, now);
        true
    }

    /// Development builds expose the debug snapshot to the console
    pub fn debug_enabled(&self) -> bool {
        self.config.site.environment.is_development()
    }

    pub fn debug_snapshot(&self) -> DebugSnapshot<'_> {
        DebugSnapshot {
            config: &self.config,
            state: &self.state,
            navigation: self.navigator.state(),
            contacts: self.contact_stats(),
            tracked_events: self.analytics.events().len(),
        }
    }

    fn stored_theme(&mut self) -> Option<String> {
        self.platform
            .storage()
            .and_then(|storage| storage.get_item(THEME_STORAGE_KEY).ok().flatten())
    }

    fn apply_theme(&mut self, theme: Theme) {
        self.state.theme = theme;
        self.view.apply_theme(theme);
    }

    /// Follow a system color-scheme change unless a theme was chosen explicitly
    pub fn on_color_scheme_change(&mut self, prefers_dark: bool) {
        if !self.config.features.dark_mode || self.stored_theme().is_some() {
            return;
        }
        self.apply_theme(if prefers_dark { Theme::Dark } else { Theme::Light });
    }

    /// Start a transition to `section`
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::SectionNotFound`] for an unknown section.
    pub fn show_section(&mut self, section: &str) -> Result<ShowOutcome, SiteError> {
        let target = SectionId::from(section);
        self.navigator
            .request_show(&target, &mut self.view, &mut self.platform)
    }

    pub fn toggle_menu(&mut self) {
        self.menu.toggle(&mut self.view, &mut self.platform);
    }

    pub fn close_menu(&mut self) {
        self.menu.close(&mut self.view);
    }

    pub fn on_document_click(&mut self, inside_nav: bool) {
        self.menu.on_document_click(inside_nav, &mut self.view);
    }

    pub fn on_resize(&mut self, viewport_width: u32) {
        self.menu.on_resize(viewport_width, &mut self.view);
    }

    pub fn on_scroll(&mut self, scroll_y: f64) {
        let scrolled = header_is_scrolled(scroll_y, self.config.navigation.header_scroll_offset);
        if scrolled != self.header_scrolled {
            self.header_scrolled = scrolled;
            self.view.set_header_scrolled(scrolled);
        }
    }

    /// Apply a keyboard shortcut; returns whether the key was consumed
    pub fn on_key(&mut self, press: &KeyPress<'_>) -> bool {
        match self.shortcuts.resolve(press) {
            Some(Shortcut::CloseMenu) => {
                self.close_menu();
                true
            }
            Some(Shortcut::ShowSection(section)) => {
                if let Err(err) = self
                    .navigator
                    .request_show(&section, &mut self.view, &mut self.platform)
                {
                    warn!("Shortcut target unavailable: {}", err);
                }
                true
            }
            None => false,
        }
    }

    pub fn on_visibility(&mut self, entries: &[VisibilityEntry]) {
        self.animator
            .on_visibility(entries, &mut self.platform, &mut self.view);
    }

    pub fn set_online(&mut self, online: bool) {
        if self.state.is_online == online {
            return;
        }
        self.state.is_online = online;
        self.view.notify(&Notice::connectivity(online));
        info!("Connection state: {}", if online { "online" } else { "offline" });
    }

    /// Tab moved to the background or back
    pub fn on_page_visibility(&mut self, hidden: bool) {
        self.state.is_visible = !hidden;
        info!("Page {}", if hidden { "hidden" } else { "visible" });
    }

    pub fn on_reduced_motion_change(&mut self, reduced: bool) {
        self.animator
            .set_reduced_motion(reduced, &mut self.platform, &mut self.view);
    }

    /// Log an uncaught error or rejection; critical ones reload the page
    pub fn on_script_error(&mut self, err: &ScriptError) {
        error!("Unhandled {}: {}", err.kind.as_str(), err.message);
        if self.config.site.environment == Environment::Production {
            self.analytics.track_error(err.kind.as_str(), err.message.clone());
        }
        if err.is_critical() {
            self.view.notify(&Notice::new(
                NoticeKind::Error,
                "An unexpected error occurred. The page will reload automatically.",
            ));
            self.platform.schedule(RELOAD_DELAY, Timer::ReloadPage);
        }
    }

    /// Put `message` in the screen-reader live region for a second
    pub fn announce(&mut self, message: &str) {
        self.announcer
            .announce(message, &mut self.view, &mut self.platform);
    }

    /// Enter or Space on a focusable element clicks it; returns whether the
    /// key was consumed
    pub fn on_focusable_key(&mut self, target: TargetId, key: &str) -> bool {
        if !is_activation_key(key) {
            return false;
        }
        self.view.activate(target);
        true
    }

    /// Copy `text` to the clipboard, falling back to a selection copy
    ///
    /// Returns [`CopyStatus::Pending`] when the host finishes asynchronously
    /// and will call [`Site::finish_copy`].
    pub fn copy_text(&mut self, text: &str) -> CopyStatus {
        let status = match self.platform.clipboard() {
            Some(clipboard) => clipboard.write_text(text),
            None => CopyStatus::Failed,
        };
        match status {
            CopyStatus::Pending => CopyStatus::Pending,
            status => {
                if self.finish_copy(text, status == CopyStatus::Copied) {
                    CopyStatus::Copied
                } else {
                    CopyStatus::Failed
                }
            }
        }
    }

    /// Complete a copy once the clipboard answered; returns whether the text
    /// ended up copied
    pub fn finish_copy(&mut self, text: &str, copied: bool) -> bool {
        let copied = copied || {
            warn!("Clipboard write failed, copying through a selection");
            self.view.copy_via_selection(text)
        };
        self.view.notify(&copy_notice(copied));
        copied
    }

    pub fn record_performance(&mut self, metric: &str, value_ms: f64) {
        info!("{}: {}ms", metric, value_ms);
        self.analytics.track_performance(metric, value_ms);
    }

    pub fn validate_field(&mut self, field: ContactField, value: &str) -> bool {
        self.form.validate_field(field, value, &mut self.view)
    }

    pub fn submit_contact(&mut self, values: FormValues) -> SubmitOutcome {
        self.form.submit(values, &mut self.view, &mut self.platform)
    }

    pub fn contact_stats(&self) -> ContactStats {
        self.form.stats(self.platform.local_now())
    }

    pub fn export_contacts_csv(&self) -> String {
        self.form.export_csv()
    }

    /// Deliver a fired timer to the component that scheduled it
    pub fn fire(&mut self, timer: Timer) {
        match timer {
            Timer::Transition => {
                match self.navigator.on_timer(&mut self.view, &mut self.platform) {
                    Some(TransitionEvent::Swapped(_)) => self.menu.close(&mut self.view),
                    Some(TransitionEvent::Completed(change)) => {
                        self.analytics
                            .track_page_view(format!("/{}", change.section));
                        self.state.current_section = change.section;
                    }
                    None => {}
                }
            }
            Timer::MenuListener(generation) => {
                self.menu.on_listener_timer(generation, &mut self.view);
            }
            Timer::Reveal(_)
            | Timer::ClearTransition(_)
            | Timer::CountUpStart(_)
            | Timer::CountUpTick(_)
            | Timer::PulseEnd(_) => {
                self.animator
                    .on_timer(timer, &mut self.platform, &mut self.view);
            }
            Timer::SubmissionComplete | Timer::FormErrorExpired(_) | Timer::SuccessExpired(_) => {
                let result = self
                    .form
                    .on_timer(timer, &mut self.platform, &mut self.view);
                if let Some(SubmissionResult::Saved(record)) = result {
                    self.analytics.track_form_submission(&record);
                }
            }
            Timer::AnnouncementExpired(generation) => {
                self.announcer.on_expired(generation, &mut self.view);
            }
            Timer::ReloadPage => self.view.reload_page(),
        }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn navigation_state(&self) -> NavigationState {
        self.navigator.state()
    }

    pub fn menu(&self) -> &MobileMenu {
        &self.menu
    }

    pub fn animator(&self) -> &ScrollAnimator {
        &self.animator
    }

    pub fn form(&self) -> &ContactForm {
        &self.form
    }

    pub fn analytics(&self) -> &Analytics {
        &self.analytics
    }

    pub fn announcer(&self) -> &Announcer {
        &self.announcer
    }
}

impl<V: SiteView> Site<HeadlessPlatform, V> {
    /// Move the virtual clock forward, firing every timer that falls due
    ///
    /// Returns the number of timers fired.
    pub fn advance(&mut self, millis: i64) -> usize {
        let deadline = self.platform.now_millis().saturating_add(millis);
        let mut fired = 0;
        while let Some(timer) = self.platform.next_due(deadline) {
            self.fire(timer);
            fired += 1;
        }
        self.platform.set_now_millis(deadline);
        fired
    }

    /// Fire timers until none are pending
    pub fn run_until_idle(&mut self) -> usize {
        let mut fired = 0;
        while let Some(timer) = self.platform.next_due(i64::MAX) {
            self.fire(timer);
            fired += 1;
        }
        fired
    }
}
