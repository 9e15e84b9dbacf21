//! Integration tests for the mounted search form: option resolution,
//! preference load races, saves, navigation, and teardown.

mod helpers;

use helpers::{GatedStore, TestHarness};
use myaku_core::options::{KanaConvertType, MatchType};
use myaku_core::ui::UiState;
use myaku_core::{History, OptionKey, OptionValue, QueryOwner, SearchForm, SharedQuery, SparseSearchOptions, StorageError};
use std::sync::Arc;

const KATA: OptionValue = OptionValue::KanaConvertType(KanaConvertType::Katakana);
const NO_CONV: OptionValue = OptionValue::KanaConvertType(KanaConvertType::NoConversion);

fn remembered(conv: Option<KanaConvertType>, match_type: Option<MatchType>) -> SparseSearchOptions {
    SparseSearchOptions {
        kana_convert_type: conv,
        match_type,
    }
}

// ---------------------------------------------------------------------------
// Mount-time resolution
// ---------------------------------------------------------------------------

#[tokio::test]
async fn explicit_location_skips_preference_load() {
    let mut h = TestHarness::mount("/search?q=a&conv=kata&match=ends");
    assert!(h.form.default_used().is_empty());
    assert_eq!(h.form.options().kana_convert_type, KanaConvertType::Katakana);
    assert_eq!(h.form.options().match_type, MatchType::EndsWith);
    assert!(h.form.take_preference_load().is_none());
    assert_eq!(h.store.load_calls(), 0);
}

#[tokio::test]
async fn missing_options_use_defaults_and_load_once() {
    let mut h = TestHarness::mount("/search?q=a&match=starts");
    assert_eq!(h.form.options().kana_convert_type, KanaConvertType::Hiragana);
    assert!(h.form.default_used().contains(&OptionKey::KanaConvertType));
    assert!(!h.form.default_used().contains(&OptionKey::MatchType));

    h.resolve_load(Ok(remembered(None, None))).await;
    assert_eq!(h.store.load_calls(), 1);
    assert_eq!(h.form.options().kana_convert_type, KanaConvertType::Hiragana);
}

// ---------------------------------------------------------------------------
// Preference load races
// ---------------------------------------------------------------------------

#[tokio::test]
async fn loaded_preference_applies_when_untouched() {
    let mut h = TestHarness::mount("/");
    h.resolve_load(Ok(remembered(Some(KanaConvertType::Katakana), None))).await;
    assert_eq!(h.form.options().kana_convert_type, KanaConvertType::Katakana);
    assert_eq!(h.form.options().match_type, MatchType::Exact);
}

#[tokio::test]
async fn user_edit_before_load_wins() {
    let mut h = TestHarness::mount("/");
    assert!(h.form.on_option_change(NO_CONV));
    assert_eq!(h.next_save().await, NO_CONV);

    h.resolve_load(Ok(remembered(Some(KanaConvertType::Katakana), Some(MatchType::EndsWith))))
        .await;
    assert_eq!(h.form.options().kana_convert_type, KanaConvertType::NoConversion);
    // The untouched key still takes the remembered value
    assert_eq!(h.form.options().match_type, MatchType::EndsWith);
}

#[tokio::test]
async fn load_never_overrides_location_values() {
    let mut h = TestHarness::mount("/search?q=a&conv=none");
    h.resolve_load(Ok(remembered(Some(KanaConvertType::Katakana), None))).await;
    assert_eq!(h.form.options().kana_convert_type, KanaConvertType::NoConversion);
}

#[tokio::test]
async fn load_failure_keeps_defaults() {
    let mut h = TestHarness::mount("/");
    h.resolve_load(Err(StorageError::Unavailable("offline".into()))).await;
    assert_eq!(h.form.options(), Default::default());
    assert_eq!(h.form.default_used().len(), OptionKey::ALL.len());
    // Search still works
    h.query.set_query("犬");
    assert!(h.form.submit().is_ok());
}

// ---------------------------------------------------------------------------
// Saves
// ---------------------------------------------------------------------------

#[tokio::test]
async fn identical_change_is_not_saved() {
    let mut h = TestHarness::mount("/search?q=a&conv=kata&match=exact");
    assert!(!h.form.on_option_change(KATA));
    assert!(!h.has_pending_save());
}

#[tokio::test]
async fn every_accepted_change_is_saved() {
    let mut h = TestHarness::mount("/search?q=a&conv=hira&match=exact");
    h.form.on_option_change(KATA);
    h.form.on_option_change(OptionValue::MatchType(MatchType::StartsWith));
    assert_eq!(h.next_save().await, KATA);
    assert_eq!(h.next_save().await, OptionValue::MatchType(MatchType::StartsWith));
}

#[tokio::test]
async fn failed_save_keeps_in_memory_change() {
    let mut h = TestHarness::mount("/search?q=a&conv=hira&match=exact");
    h.store.fail_saves();
    assert!(h.form.on_option_change(KATA));
    assert_eq!(h.next_save().await, KATA);
    tokio::task::yield_now().await;
    assert_eq!(h.form.options().kana_convert_type, KanaConvertType::Katakana);
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn navigating_to_root_clears_query_and_resets_ui() {
    let h = TestHarness::mount("/search?q=a&conv=hira&match=exact");
    h.form.on_query_change("");
    let _ = h.form.submit();
    h.form.on_toggle();
    h.form.on_query_change("猫");
    h.form.on_query_change("");
    let _ = h.form.submit();
    assert!(h.form.ui_state().error_submitted);
    assert!(h.form.ui_state().panel_animating);

    h.query.set_query("猫");
    h.history.push("/");
    assert_eq!(h.query.query(), "");
    assert_eq!(h.form.ui_state(), UiState::default());
}

#[tokio::test]
async fn navigating_elsewhere_leaves_query_alone() {
    let h = TestHarness::mount("/search?q=a&conv=hira&match=exact");
    h.form.on_toggle();
    h.query.set_query("猫");
    h.history.push("/about");
    assert_eq!(h.query.query(), "猫");
    assert!(h.form.ui_state().panel_collapsed);
    assert!(!h.form.ui_state().panel_animating);
    assert!(!h.form.collapsible_props().animate);
}

#[tokio::test]
async fn navigation_does_not_re_resolve_options() {
    let h = TestHarness::mount("/search?q=a&conv=hira&match=exact");
    h.form.on_option_change(KATA);
    h.history.push("/search?q=b&conv=none&match=ends");
    assert_eq!(h.form.options().kana_convert_type, KanaConvertType::Katakana);
    assert_eq!(h.form.options().match_type, MatchType::Exact);
}

#[tokio::test]
async fn back_navigation_returns_to_prior_view() {
    let h = TestHarness::mount("/");
    h.query.set_query("食べる");
    let url = h.form.submit().unwrap();
    assert_eq!(h.history.location().to_string(), url);
    let prior = h.history.back().unwrap();
    assert!(prior.is_root());
}

// ---------------------------------------------------------------------------
// Teardown
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unmount_releases_subscription_and_ignores_late_load() {
    let mut h = TestHarness::mount("/");
    assert_eq!(h.history.listener_count(), 1);
    h.form.unmount();
    assert_eq!(h.history.listener_count(), 0);

    h.query.set_query("猫");
    h.history.push("/");
    assert_eq!(h.query.query(), "猫");

    h.resolve_load(Ok(remembered(Some(KanaConvertType::Katakana), None))).await;
    assert_eq!(h.form.options().kana_convert_type, KanaConvertType::Hiragana);
}

#[tokio::test]
async fn dropping_form_before_load_resolves_is_harmless() {
    let (store, release, _saves) = GatedStore::new();
    let history = myaku_core::MemoryHistory::new("/");
    let mut form = SearchForm::mount(
        Arc::new(history.clone()),
        store.clone(),
        Arc::new(SharedQuery::default()),
    );
    let load = form.take_preference_load().expect("load should start");
    drop(form);
    assert_eq!(history.listener_count(), 0);

    let _ = release.send(Ok(remembered(Some(KanaConvertType::Katakana), None)));
    load.await.expect("load task should finish cleanly");
    assert_eq!(store.load_calls(), 1);
}

#[tokio::test]
async fn each_form_owns_its_state() {
    let a = TestHarness::mount("/search?q=a&conv=hira&match=exact");
    let b = TestHarness::mount("/search?q=a&conv=hira&match=exact");
    a.form.on_option_change(KATA);
    a.form.on_toggle();
    assert_eq!(b.form.options().kana_convert_type, KanaConvertType::Hiragana);
    assert_eq!(b.form.ui_state(), UiState::default());
}
