//! End-to-end behavior of the site driven by a virtual clock

use boxstone_core::animation::{
    AnimatedElement, AnimationVariant, AnimationView, ElementRole, PageInventory, StatElement,
};
use boxstone_core::app::{EnvironmentInfo, Notice, NoticeKind, NoticeView, Theme};
use boxstone_core::contact::{ContactField, ContactRecord, FormValues, FormView, SubmitOutcome};
use boxstone_core::config::Environment;
use boxstone_core::navigation::{
    IgnoreReason, KeyPress, MenuView, SectionChange, SectionId, SectionStyle, SectionView,
    ShowOutcome,
};
use boxstone_core::page::{PageView, ScriptError};
use boxstone_core::platform::{
    CopyStatus, HeadlessPlatform, KeyValueStore, MemoryClipboard, MemoryStore, TargetId,
    VisibilityEntry,
};
use boxstone_core::{Site, SiteConfig, SiteError};
use chrono::{DateTime, Utc};
use pretty_assertions::assert_eq;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::Duration;

/// View that keeps the visible state of the page instead of a DOM
#[derive(Debug, Default)]
struct RecordingView {
    sections: BTreeSet<String>,
    active: BTreeSet<String>,
    highlighted: Option<String>,
    changes: Vec<SectionChange>,
    header_scrolled: bool,
    menu_open: bool,
    outside_listeners: usize,
    played: Vec<(TargetId, AnimationVariant)>,
    stat_text: HashMap<TargetId, String>,
    stat_frames: HashMap<TargetId, usize>,
    loaded_images: Vec<TargetId>,
    field_errors: BTreeMap<ContactField, String>,
    submitting: bool,
    banner: Option<String>,
    success_visible: bool,
    notices: Vec<Notice>,
    body_classes: Vec<String>,
    theme: Option<Theme>,
    initialized_version: Option<String>,
    skip_link: Option<(String, String)>,
    focusable: Vec<TargetId>,
    activated: Vec<TargetId>,
    announcement: String,
    selection_copies: Vec<String>,
    selection_copy_blocked: bool,
    reloads: usize,
}

impl RecordingView {
    fn with_sections(ids: &[&str]) -> Self {
        let mut view = Self {
            sections: ids.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        };
        view.active.insert(ids[0].to_string());
        view
    }
}

impl SectionView for RecordingView {
    fn has_section(&self, id: &SectionId) -> bool {
        self.sections.contains(id.as_str())
    }
    fn set_section_style(&mut self, _id: &SectionId, _style: SectionStyle) {}
    fn deactivate_all_sections(&mut self) {
        self.active.clear();
    }
    fn activate_section(&mut self, id: &SectionId) {
        self.active.insert(id.to_string());
    }
    fn highlight_nav_link(&mut self, id: &SectionId) {
        self.highlighted = Some(id.to_string());
    }
    fn scroll_to_top(&mut self) {}
    fn emit_section_changed(&mut self, change: &SectionChange) {
        self.changes.push(change.clone());
    }
    fn set_header_scrolled(&mut self, scrolled: bool) {
        self.header_scrolled = scrolled;
    }
}

impl MenuView for RecordingView {
    fn set_menu_open(&mut self, open: bool) {
        self.menu_open = open;
    }
    fn attach_outside_click(&mut self) {
        self.outside_listeners += 1;
    }
    fn detach_outside_click(&mut self) {
        self.outside_listeners -= 1;
    }
}

impl AnimationView for RecordingView {
    fn prepare(&mut self, _target: TargetId, _variant: AnimationVariant) {}
    fn play(&mut self, target: TargetId, variant: AnimationVariant, _duration: Duration) {
        self.played.push((target, variant));
    }
    fn clear_transition(&mut self, _target: TargetId) {}
    fn prepare_stat(&mut self, target: TargetId) {
        self.stat_text.insert(target, "0".to_string());
    }
    fn show_stat(&mut self, _target: TargetId) {}
    fn set_stat_text(&mut self, target: TargetId, text: &str) {
        self.stat_text.insert(target, text.to_string());
        *self.stat_frames.entry(target).or_insert(0) += 1;
    }
    fn set_stat_pulse(&mut self, _target: TargetId, _on: bool) {}
    fn load_image(&mut self, target: TargetId) {
        self.loaded_images.push(target);
    }
}

impl FormView for RecordingView {
    fn show_field_error(&mut self, field: ContactField, message: &str) {
        self.field_errors.insert(field, message.to_string());
    }
    fn clear_field_error(&mut self, field: ContactField) {
        self.field_errors.remove(&field);
    }
    fn clear_all_errors(&mut self) {
        self.field_errors.clear();
    }
    fn set_submitting(&mut self, submitting: bool) {
        self.submitting = submitting;
    }
    fn show_form_error(&mut self, message: &str) {
        self.banner = Some(message.to_string());
    }
    fn remove_form_error(&mut self) {
        self.banner = None;
    }
    fn show_success(&mut self) {
        self.success_visible = true;
    }
    fn hide_success(&mut self) {
        self.success_visible = false;
    }
    fn reset_form(&mut self) {}
}

impl NoticeView for RecordingView {
    fn notify(&mut self, notice: &Notice) {
        self.notices.push(notice.clone());
    }
    fn set_device_classes(&mut self, classes: &[&str]) {
        self.body_classes = classes.iter().map(|c| c.to_string()).collect();
    }
    fn apply_theme(&mut self, theme: Theme) {
        self.theme = Some(theme);
    }
    fn emit_app_initialized(&mut self, version: &str, _timestamp: DateTime<Utc>) {
        self.initialized_version = Some(version.to_string());
    }
}

impl PageView for RecordingView {
    fn install_skip_link(&mut self, text: &str, href: &str) {
        self.skip_link = Some((text.to_string(), href.to_string()));
    }
    fn make_focusable(&mut self, target: TargetId) {
        self.focusable.push(target);
    }
    fn activate(&mut self, target: TargetId) {
        self.activated.push(target);
    }
    fn announce(&mut self, message: &str) {
        self.announcement = message.to_string();
    }
    fn copy_via_selection(&mut self, text: &str) -> bool {
        if self.selection_copy_blocked {
            return false;
        }
        self.selection_copies.push(text.to_string());
        true
    }
    fn reload_page(&mut self) {
        self.reloads += 1;
    }
}

const START_MS: i64 = 1_760_000_000_000;

fn start() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(START_MS).unwrap()
}

fn site_with(platform: HeadlessPlatform, config: SiteConfig) -> Site<HeadlessPlatform, RecordingView> {
    let view = RecordingView::with_sections(&["home", "about", "services", "contact"]);
    let mut site = Site::new(config, platform, view);
    site.initialize(&EnvironmentInfo::default(), &PageInventory::default());
    site
}

fn site() -> Site<HeadlessPlatform, RecordingView> {
    site_with(HeadlessPlatform::new(start()), SiteConfig::default())
}

fn valid_form() -> FormValues {
    FormValues {
        full_name: "  John   Smith ".into(),
        email: " John.Smith@Example.COM ".into(),
        phone: "+34 600 123 456".into(),
        description: "Quote for a stone patio, about 40 m2, \"rustic\" finish.".into(),
    }
}

/// Minimal RFC 4180 reader used to check the export
fn parse_csv(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match (quoted, c) {
            (true, '"') if chars.peek() == Some(&'"') => {
                chars.next();
                field.push('"');
            }
            (true, '"') => quoted = false,
            (true, c) => field.push(c),
            (false, '"') => quoted = true,
            (false, ',') => row.push(std::mem::take(&mut field)),
            (false, '\n') => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            (false, c) => field.push(c),
        }
    }
    row.push(field);
    rows.push(row);
    rows
}

#[test]
fn test_show_section_completes_after_all_phases() {
    let mut site = site();
    assert_eq!(site.show_section("about"), Ok(ShowOutcome::Started));
    assert!(site.navigation_state().is_transitioning);

    site.advance(849);
    assert!(site.navigation_state().is_transitioning);
    site.advance(1);

    let state = site.navigation_state();
    assert!(!state.is_transitioning);
    assert_eq!(state.current_section_id.as_str(), "about");
    assert_eq!(site.view().active, BTreeSet::from(["about".to_string()]));
    assert_eq!(site.view().highlighted.as_deref(), Some("about"));
    assert_eq!(
        site.view().changes,
        vec![SectionChange {
            section: SectionId::from("about"),
            previous: SectionId::from("home"),
        }]
    );
    assert_eq!(site.state().current_section.as_str(), "about");
}

#[test]
fn test_show_current_section_is_noop() {
    let mut site = site();
    assert_eq!(
        site.show_section("home"),
        Ok(ShowOutcome::Ignored(IgnoreReason::AlreadyActive))
    );
    assert_eq!(site.platform().pending_timers(), 0);
    assert!(site.view().changes.is_empty());
}

#[test]
fn test_show_during_transition_is_dropped() {
    let mut site = site();
    site.show_section("about").unwrap();
    site.advance(100);
    assert_eq!(
        site.show_section("services"),
        Ok(ShowOutcome::Ignored(IgnoreReason::InFlight))
    );
    site.run_until_idle();
    assert_eq!(site.navigation_state().current_section_id.as_str(), "about");
    assert_eq!(site.view().changes.len(), 1);
}

#[test]
fn test_unknown_section_leaves_guard_clear() {
    let mut site = site();
    assert_eq!(
        site.show_section("pricing"),
        Err(SiteError::SectionNotFound(SectionId::from("pricing")))
    );
    assert!(!site.navigation_state().is_transitioning);
    assert_eq!(site.show_section("contact"), Ok(ShowOutcome::Started));
}

#[test]
fn test_swap_closes_mobile_menu() {
    let mut site = site();
    site.toggle_menu();
    assert!(site.view().menu_open);
    site.show_section("services").unwrap();
    site.advance(300);
    assert!(!site.view().menu_open);
    assert_eq!(site.view().outside_listeners, 0);
}

#[test]
fn test_menu_outside_click_and_resize() {
    let mut site = site();
    site.toggle_menu();
    site.toggle_menu();
    site.toggle_menu();
    assert_eq!(site.view().outside_listeners, 0);
    site.advance(100);
    assert_eq!(site.view().outside_listeners, 1);

    site.on_document_click(true);
    assert!(site.menu().is_open());
    site.on_document_click(false);
    assert!(!site.menu().is_open());

    site.toggle_menu();
    site.on_resize(500);
    assert!(site.menu().is_open());
    site.on_resize(1024);
    assert!(!site.menu().is_open());
    assert_eq!(site.view().outside_listeners, 0);
}

#[test]
fn test_keyboard_shortcuts() {
    let mut site = site();
    assert!(site.on_key(&KeyPress::key("3")));
    site.run_until_idle();
    assert_eq!(site.navigation_state().current_section_id.as_str(), "services");

    let ctrl_k = KeyPress {
        ctrl: true,
        ..KeyPress::key("k")
    };
    assert!(site.on_key(&ctrl_k));
    site.run_until_idle();
    assert_eq!(site.navigation_state().current_section_id.as_str(), "contact");

    let typing = KeyPress {
        in_text_field: true,
        ..KeyPress::key("1")
    };
    assert!(!site.on_key(&typing));
    assert!(!site.navigation_state().is_transitioning);

    site.toggle_menu();
    assert!(site.on_key(&KeyPress::key("Escape")));
    assert!(!site.menu().is_open());
}

#[test]
fn test_header_scroll_state() {
    let mut site = site();
    site.on_scroll(10.0);
    assert!(!site.view().header_scrolled);
    site.on_scroll(120.0);
    assert!(site.view().header_scrolled);
    site.on_scroll(0.0);
    assert!(!site.view().header_scrolled);
}

#[test]
fn test_page_views_follow_section_changes() {
    let mut site = site();
    site.show_section("about").unwrap();
    site.run_until_idle();
    let views: Vec<&str> = site.analytics().page_views().collect();
    assert_eq!(views, vec!["/", "/about"]);
}

#[test]
fn test_initialize_is_idempotent() {
    let mut site = site();
    assert!(site.state().is_initialized);
    assert!(!site.initialize(&EnvironmentInfo::default(), &PageInventory::default()));
    assert_eq!(site.analytics().page_views().count(), 1);
    assert_eq!(site.view().initialized_version.as_deref(), Some("1.0.0"));
    assert_eq!(site.view().body_classes, vec!["is-desktop".to_string()]);
}

#[test]
fn test_connectivity_notifications() {
    let mut site = site();
    site.set_online(true);
    assert!(site.view().notices.is_empty());
    site.set_online(false);
    site.set_online(true);
    let kinds: Vec<NoticeKind> = site.view().notices.iter().map(|n| n.kind).collect();
    assert_eq!(kinds, vec![NoticeKind::Warning, NoticeKind::Success]);
}

#[test]
fn test_dark_mode_prefers_stored_theme() {
    let mut store = MemoryStore::new();
    store.set_item("theme", "light").unwrap();
    let platform = HeadlessPlatform::new(start()).with_store(store);
    let mut config = SiteConfig::default();
    config.features.dark_mode = true;

    let view = RecordingView::with_sections(&["home"]);
    let mut site = Site::new(config, platform, view);
    let env = EnvironmentInfo {
        prefers_dark: true,
        ..EnvironmentInfo::default()
    };
    site.initialize(&env, &PageInventory::default());
    assert_eq!(site.view().theme, Some(Theme::Light));

    // An explicit choice also pins the theme against system changes
    site.on_color_scheme_change(true);
    assert_eq!(site.state().theme, Theme::Light);
}

#[test]
fn test_dark_mode_follows_system_without_stored_theme() {
    let mut config = SiteConfig::default();
    config.features.dark_mode = true;
    let mut site = site_with(HeadlessPlatform::new(start()), config);
    assert_eq!(site.view().theme, Some(Theme::Light));
    site.on_color_scheme_change(true);
    assert_eq!(site.view().theme, Some(Theme::Dark));
}

#[test]
fn test_scroll_animations_and_count_up() {
    let view = RecordingView::with_sections(&["home"]);
    let mut site = Site::new(SiteConfig::default(), HeadlessPlatform::new(start()), view);
    let inventory = PageInventory {
        animated: vec![
            AnimatedElement {
                target: TargetId(1),
                role: ElementRole::ServiceCategory { index: 1 },
            },
            AnimatedElement {
                target: TargetId(2),
                role: ElementRole::Explicit(AnimationVariant::Bounce),
            },
        ],
        stats: vec![
            StatElement {
                target: TargetId(10),
                final_text: "85%".into(),
            },
            StatElement {
                target: TargetId(11),
                final_text: "3/4".into(),
            },
        ],
        lazy_images: vec![TargetId(20)],
        ..PageInventory::default()
    };
    site.initialize(&EnvironmentInfo::default(), &inventory);

    let visible: Vec<VisibilityEntry> = [1, 2, 10, 11, 20]
        .into_iter()
        .map(|id| VisibilityEntry::visible(TargetId(id)))
        .collect();
    site.on_visibility(&visible);
    site.on_visibility(&visible);
    site.run_until_idle();

    let view = site.view();
    assert_eq!(
        view.played,
        vec![
            (TargetId(1), AnimationVariant::SlideRight),
            (TargetId(2), AnimationVariant::Bounce),
        ]
    );
    assert_eq!(view.stat_text[&TargetId(10)], "85%");
    assert_eq!(view.stat_frames[&TargetId(10)], 60);
    assert_eq!(view.stat_text[&TargetId(11)], "3/4");
    assert_eq!(view.stat_frames[&TargetId(11)], 1);
    assert_eq!(view.loaded_images, vec![TargetId(20)]);
    assert_eq!(site.animator().waiting(), 0);
}

#[test]
fn test_animations_feature_off_registers_nothing() {
    let mut config = SiteConfig::default();
    config.features.animations = false;
    let view = RecordingView::with_sections(&["home"]);
    let mut site = Site::new(config, HeadlessPlatform::new(start()), view);
    let inventory = PageInventory {
        stats: vec![StatElement {
            target: TargetId(1),
            final_text: "10".into(),
        }],
        ..PageInventory::default()
    };
    site.initialize(&EnvironmentInfo::default(), &inventory);
    assert_eq!(site.platform().recording_observer().unwrap().observed_count(), 0);
    assert!(site.view().stat_text.is_empty());
}

#[test]
fn test_valid_submission_creates_one_record() {
    let mut site = site();
    assert_eq!(site.submit_contact(valid_form()), SubmitOutcome::Pending);
    assert!(site.view().submitting);
    site.advance(1_500);

    let records = site.form().store().records();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.email, "john.smith@example.com");
    assert_eq!(record.full_name, "John Smith");
    assert_eq!(record.id, (START_MS + 1_500) as u64);
    assert!(site.view().success_visible);
    assert!(!site.view().submitting);

    let raw = site
        .platform()
        .memory_store()
        .unwrap()
        .get_item("boxstone_contacts")
        .unwrap()
        .unwrap();
    let stored: Vec<ContactRecord> = serde_json::from_str(&raw).unwrap();
    assert_eq!(stored, records.to_vec());

    site.advance(8_000);
    assert!(!site.view().success_visible);
}

#[test]
fn test_record_ids_are_unique() {
    let mut site = site();
    for _ in 0..3 {
        site.submit_contact(valid_form());
        site.run_until_idle();
    }
    let ids: BTreeSet<u64> = site.form().store().records().iter().map(|r| r.id).collect();
    assert_eq!(ids.len(), 3);
}

#[test]
fn test_invalid_submission_annotates_every_field() {
    let mut site = site();
    let values = FormValues {
        full_name: "John123".into(),
        email: "not-an-email".into(),
        phone: "12".into(),
        description: "short".into(),
    };
    match site.submit_contact(values) {
        SubmitOutcome::Invalid(errors) => assert_eq!(errors.len(), 4),
        other => panic!("unexpected outcome {:?}", other),
    }
    assert_eq!(site.view().field_errors.len(), 4);
    assert_eq!(
        site.view().banner.as_deref(),
        Some("Please fix the errors before submitting.")
    );
    site.run_until_idle();
    assert!(site.form().store().is_empty());
    assert!(site.view().banner.is_none());
}

#[test]
fn test_storage_failure_shows_retry_banner() {
    let platform = HeadlessPlatform::new(start()).with_store(MemoryStore::with_quota(32));
    let mut site = site_with(platform, SiteConfig::default());
    site.submit_contact(valid_form());
    site.advance(1_500);

    assert!(site.form().store().is_empty());
    assert_eq!(
        site.view().banner.as_deref(),
        Some("There was an error sending your message. Please try again.")
    );
    assert!(!site.view().success_visible);
    assert_eq!(site.analytics().events().len(), 1);
}

#[test]
fn test_missing_storage_still_records_in_memory() {
    let platform = HeadlessPlatform::new(start()).without_storage();
    let mut site = site_with(platform, SiteConfig::default());
    site.submit_contact(valid_form());
    site.run_until_idle();
    assert_eq!(site.form().store().len(), 1);
}

#[test]
fn test_stats_and_csv_export_round_trip() {
    let mut site = site();
    let tricky = FormValues {
        description: "Line one, with comma\nand \"quotes\" too".into(),
        ..valid_form()
    };
    site.submit_contact(valid_form());
    site.run_until_idle();
    site.submit_contact(tricky);
    site.run_until_idle();

    let stats = site.contact_stats();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.today, 2);
    assert_eq!(stats.this_week, 2);
    assert_eq!(stats.by_source.get("website"), Some(&2));

    let rows = parse_csv(&site.export_contacts_csv());
    assert_eq!(rows.len(), 3);
    assert_eq!(
        rows[0],
        vec!["ID", "Full Name", "Email", "Phone", "Description", "Timestamp", "Status", "Source"]
    );
    for (row, record) in rows[1..].iter().zip(site.form().store().records()) {
        assert_eq!(row[0], record.id.to_string());
        assert_eq!(row[1], record.full_name);
        assert_eq!(row[2], record.email);
        assert_eq!(row[3], record.phone.clone().unwrap_or_default());
        assert_eq!(row[4], record.description);
        assert_eq!(row[5], record.timestamp_text());
        assert_eq!(row[6], "new");
        assert_eq!(row[7], "website");
    }
}

#[test]
fn test_submission_is_tracked() {
    let mut site = site();
    site.submit_contact(valid_form());
    site.run_until_idle();
    // Page view plus form submit and CRM lead
    assert_eq!(site.analytics().events().len(), 3);
}

fn last_notice(site: &Site<HeadlessPlatform, RecordingView>) -> (NoticeKind, String) {
    let notice = site.view().notices.last().unwrap();
    (notice.kind, notice.message.clone())
}

#[test]
fn test_copy_uses_clipboard() {
    let mut site = site();
    assert_eq!(site.copy_text("info@boxstone.es"), CopyStatus::Copied);
    assert_eq!(
        site.platform().memory_clipboard().unwrap().text(),
        Some("info@boxstone.es")
    );
    assert!(site.view().selection_copies.is_empty());
    assert_eq!(
        last_notice(&site),
        (NoticeKind::Success, "Copied to clipboard".to_string())
    );
}

#[test]
fn test_copy_falls_back_without_clipboard() {
    let mut site = site_with(
        HeadlessPlatform::new(start()).without_clipboard(),
        SiteConfig::default(),
    );
    assert_eq!(site.copy_text("+34 600 123 456"), CopyStatus::Copied);
    assert_eq!(site.view().selection_copies, vec!["+34 600 123 456".to_string()]);
    assert_eq!(last_notice(&site).0, NoticeKind::Success);
}

#[test]
fn test_copy_reports_failure_when_fallback_fails() {
    let platform = HeadlessPlatform::new(start()).with_clipboard(MemoryClipboard::rejecting());
    let mut site = site_with(platform, SiteConfig::default());
    site.view_mut().selection_copy_blocked = true;
    assert_eq!(site.copy_text("text"), CopyStatus::Failed);
    assert_eq!(
        last_notice(&site),
        (NoticeKind::Error, "Could not copy the text".to_string())
    );
}

#[test]
fn test_async_copy_completion() {
    let mut site = site();
    // A rejected async write still gets the selection fallback
    assert!(site.finish_copy("late", false));
    assert_eq!(site.view().selection_copies, vec!["late".to_string()]);
    assert!(site.finish_copy("fast", true));
    assert_eq!(site.view().selection_copies.len(), 1);
    assert_eq!(site.view().notices.len(), 2);
}

#[test]
fn test_accessibility_setup() {
    let view = RecordingView::with_sections(&["home"]);
    let mut site = Site::new(SiteConfig::default(), HeadlessPlatform::new(start()), view);
    let inventory = PageInventory {
        focusable: vec![TargetId(3), TargetId(4)],
        ..PageInventory::default()
    };
    site.initialize(&EnvironmentInfo::default(), &inventory);

    assert_eq!(
        site.view().skip_link,
        Some(("Skip to main content".to_string(), "#main".to_string()))
    );
    assert_eq!(site.view().focusable, vec![TargetId(3), TargetId(4)]);

    assert!(site.on_focusable_key(TargetId(3), "Enter"));
    assert!(site.on_focusable_key(TargetId(4), " "));
    assert!(!site.on_focusable_key(TargetId(4), "a"));
    assert_eq!(site.view().activated, vec![TargetId(3), TargetId(4)]);
}

#[test]
fn test_announcements_clear_themselves() {
    let mut site = site();
    site.announce("Section services");
    assert_eq!(site.view().announcement, "Section services");
    site.advance(999);
    assert_eq!(site.announcer().current(), Some("Section services"));
    site.advance(1);
    assert_eq!(site.view().announcement, "");
}

#[test]
fn test_critical_error_reloads_page() {
    let mut site = site();
    site.on_script_error(&ScriptError::uncaught(
        "init failed",
        Some("Error: init failed\n    at criticalBoot (main.js:3:9)".to_string()),
    ));
    assert_eq!(last_notice(&site).0, NoticeKind::Error);
    site.advance(2_999);
    assert_eq!(site.view().reloads, 0);
    site.advance(1);
    assert_eq!(site.view().reloads, 1);
}

#[test]
fn test_script_errors_tracked_in_production_only() {
    let mut site = site();
    site.on_script_error(&ScriptError::rejection("fetch timed out"));
    assert_eq!(site.analytics().events().len(), 2);
    assert!(site.view().notices.is_empty());
    assert_eq!(site.platform().pending_timers(), 0);

    let mut config = SiteConfig::default();
    config.site.environment = Environment::Development;
    let mut dev = site_with(HeadlessPlatform::new(start()), config);
    dev.on_script_error(&ScriptError::uncaught("boom", None));
    assert_eq!(dev.analytics().events().len(), 1);
}

#[test]
fn test_page_visibility_state() {
    let mut site = site();
    assert!(site.state().is_visible);
    site.on_page_visibility(true);
    assert!(!site.state().is_visible);
    site.on_page_visibility(false);
    assert!(site.state().is_visible);
}

#[test]
fn test_reduced_motion_change_reveals_waiting_elements() {
    let view = RecordingView::with_sections(&["home"]);
    let mut site = Site::new(SiteConfig::default(), HeadlessPlatform::new(start()), view);
    let inventory = PageInventory {
        animated: vec![AnimatedElement {
            target: TargetId(1),
            role: ElementRole::Card { index: 3 },
        }],
        stats: vec![StatElement {
            target: TargetId(2),
            final_text: "15+".into(),
        }],
        ..PageInventory::default()
    };
    site.initialize(&EnvironmentInfo::default(), &inventory);
    assert_eq!(site.animator().waiting(), 2);

    site.on_reduced_motion_change(true);
    site.run_until_idle();
    assert_eq!(site.animator().waiting(), 0);
    assert_eq!(site.platform().recording_observer().unwrap().observed_count(), 0);
    assert_eq!(site.view().played, vec![(TargetId(1), AnimationVariant::FadeUp)]);
    assert_eq!(site.view().stat_text[&TargetId(2)], "15+");
}

#[test]
fn test_debug_snapshot() {
    let mut config = SiteConfig::default();
    config.site.environment = Environment::Development;
    let mut site = site_with(HeadlessPlatform::new(start()), config);
    assert!(site.debug_enabled());
    site.submit_contact(valid_form());
    site.run_until_idle();

    let json = serde_json::to_value(site.debug_snapshot()).unwrap();
    assert_eq!(json["state"]["currentSection"], "home");
    assert_eq!(json["navigation"]["isTransitioning"], false);
    assert_eq!(json["contacts"]["total"], 1);
    assert_eq!(json["trackedEvents"], 3);
    assert_eq!(json["config"]["site"]["environment"], "development");
}
