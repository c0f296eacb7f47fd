mod support;

use application::tag::InputOverride;
use application::{BusinessErrorWatcher, ViewKind, ViewTagController, tag_user_interaction};
use serde_json::json;
use support::{harness, page_name};

#[test]
fn test_page_view_controller_times_the_load() {
    let mut h = harness();
    let mut controller = ViewTagController::new("home", ViewKind::PageView, false);

    h.clock.set(100.0);
    assert_eq!(controller.before_render(&mut h.dispatcher), Some(100.0));
    h.clock.set(350.0);
    controller.after_mount(&mut h.dispatcher);
    controller.before_unmount(&mut h.dispatcher);

    let page_info = &h.dispatcher.digital_data()["page"]["pageInfo"];
    assert_eq!(page_info["pageName"], json!(page_name("home")));
    assert_eq!(page_info["nbs_page_load_time"], json!(250));
    assert_eq!(h.agent.names(), vec!["wa_view"]);
}

#[test]
fn test_modal_controller_opens_on_mount_and_closes_on_unmount() {
    let mut h = harness();
    let mut controller = ViewTagController::new("confirm", ViewKind::Modal, false);

    controller.before_render(&mut h.dispatcher);
    controller.after_mount(&mut h.dispatcher);
    assert!(controller.is_open());
    controller.before_unmount(&mut h.dispatcher);
    h.dispatcher.run_pending();

    assert!(!controller.is_open());
    assert_eq!(
        h.agent.names(),
        vec!["ddl_backup", "wa_view", "ddl_restore", "wa_view"]
    );
}

#[test]
fn test_bailout_disables_every_tag() {
    let mut h = harness();
    let mut controller = ViewTagController::new("confirm", ViewKind::Overlay, true);

    assert_eq!(controller.before_render(&mut h.dispatcher), None);
    controller.after_mount(&mut h.dispatcher);
    controller.after_update(&mut h.dispatcher, true);
    controller.before_unmount(&mut h.dispatcher);
    h.dispatcher.run_pending();

    assert!(h.agent.calls().is_empty());
}

#[test]
fn test_slider_follows_toggle() {
    let mut h = harness();
    let mut controller = ViewTagController::new("menu", ViewKind::Slider, false);

    controller.after_mount(&mut h.dispatcher);
    // Initial closed state has nothing to close
    controller.after_update(&mut h.dispatcher, false);
    assert!(h.agent.calls().is_empty());

    controller.after_update(&mut h.dispatcher, true);
    controller.after_update(&mut h.dispatcher, false);
    // Unmount does not close toggle-controlled views
    controller.before_unmount(&mut h.dispatcher);
    h.dispatcher.run_pending();

    assert_eq!(
        h.agent.names(),
        vec!["ddl_backup", "wa_view", "ddl_restore", "wa_view"]
    );
}

#[test]
fn test_page_view_ignores_toggle() {
    let mut h = harness();
    let mut controller = ViewTagController::new("home", ViewKind::PageView, false);

    controller.after_update(&mut h.dispatcher, true);
    assert!(h.agent.calls().is_empty());
}

#[test]
fn test_business_error_watcher_skips_first_observation() {
    let mut h = harness();
    let mut watcher = BusinessErrorWatcher::new("Service unavailable", "api");

    assert!(!watcher.observe(&mut h.dispatcher, true));
    assert!(!watcher.observe(&mut h.dispatcher, false));
    assert!(watcher.observe(&mut h.dispatcher, true));

    assert_eq!(
        h.dispatcher.digital_data()["nbs_message"],
        json!([{ "type": "business", "message": "service unavailable", "cause": "api" }])
    );
}

#[test]
fn test_tag_user_interaction_derives_validity() {
    let mut h = harness();

    assert!(!tag_user_interaction(
        &mut h.dispatcher,
        "Amount",
        true,
        None,
        &InputOverride::default()
    ));
    assert!(h.agent.actions().is_empty());

    tag_user_interaction(&mut h.dispatcher, "Amount", false, None, &InputOverride::default());
    tag_user_interaction(
        &mut h.dispatcher,
        "Term",
        false,
        Some("Enter a term"),
        &InputOverride::default(),
    );
    tag_user_interaction(
        &mut h.dispatcher,
        "Email",
        false,
        None,
        &InputOverride {
            label: Some("Contact email".into()),
            is_valid: Some(false),
            ..Default::default()
        },
    );

    assert_eq!(
        h.dispatcher.digital_data()["nbs_user_input"],
        json!([
            { "name": "contact email", "message": "", "status": "invalid" },
            { "name": "term", "message": "enter a term", "status": "invalid" },
            { "name": "amount", "message": "", "status": "valid" }
        ])
    );
    assert_eq!(h.agent.actions(), vec!["input", "input", "input"]);
}
