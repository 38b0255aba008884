use super::*;
use crate::present::config::PresenterConfig;
use crate::present::dialog::DialogStyle;
use crate::runtime::clock::ManualClock;
use crate::runtime::input::{InputEvent, ScriptedInput};
use std::path::PathBuf;

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "storyframe_loop_{tag}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn presenter(dir: &std::path::Path) -> Presenter {
    Presenter::new(PresenterConfig {
        width: 200,
        height: 150,
        store_path: dir.join("gamedata.json"),
        seed: Some(1),
        ..PresenterConfig::default()
    })
    .unwrap()
}

fn scripted(events: &[(u64, InputEvent)]) -> EventLoop<ManualClock, ScriptedInput> {
    let clock = ManualClock::new();
    let mut input = ScriptedInput::new(clock.clone());
    for (at, e) in events {
        input.push_at(ms(*at), *e);
    }
    EventLoop::new(clock, input)
}

#[test]
fn choice_waits_while_timers_keep_running() {
    let dir = temp_dir("choice");
    let mut p = presenter(&dir);
    p.show_dialog("hello", DialogStyle::default().with_speed(ms(50)));

    let mut el = scripted(&[(120, InputEvent::Down), (400, InputEvent::Confirm)]);
    let result = el
        .choose(&mut p, OptionRequest::new(["A", "B", "C"]).persist())
        .unwrap();

    assert_eq!(result.choice, "B");
    assert_eq!(result.index, 1);
    assert_eq!(el.clock().now(), ms(400));
    assert_eq!(p.now(), ms(400));
    // Reveal kept ticking during the wait.
    assert!(p.dialog_view().unwrap().is_complete());
    assert!(!p.has_menu());
    assert_eq!(p.return_options(None).as_deref(), Some("B"));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn resize_dismisses_the_pending_menu() {
    let dir = temp_dir("resize");
    let mut p = presenter(&dir);
    p.show_dialog("text", DialogStyle::default());

    let mut el = scripted(&[(
        10,
        InputEvent::Resize {
            width: 300,
            height: 200,
        },
    )]);
    let err = el
        .choose(&mut p, OptionRequest::new(["yes", "no"]))
        .unwrap_err();
    assert!(matches!(err, StoryError::MenuDismissed));
    assert!(!p.has_dialog());
    assert_eq!(p.size().width, 300);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn closed_input_fails_the_wait_but_keeps_the_menu() {
    let dir = temp_dir("closed");
    let mut p = presenter(&dir);
    let mut el = scripted(&[(5, InputEvent::Down)]);
    let ticket = p.show_options(OptionRequest::new(["x", "y"])).unwrap();

    let err = el.wait_for_choice(&mut p, ticket).unwrap_err();
    assert!(matches!(err, StoryError::InputClosed));
    assert!(p.is_awaiting(ticket));
    assert_eq!(p.menu_view().unwrap().selected, 1);

    // Confirming later still resolves the same ticket once.
    p.handle_input(InputEvent::Confirm).unwrap();
    assert_eq!(p.take_choice(ticket).unwrap().unwrap().choice, "y");
    assert!(p.take_choice(ticket).is_none());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn unknown_ticket_is_rejected() {
    let dir = temp_dir("ticket");
    let mut p = presenter(&dir);
    let mut el = scripted(&[(5, InputEvent::Confirm)]);
    let ticket = p.show_options(OptionRequest::new(["only"])).unwrap();
    el.wait_for_choice(&mut p, ticket).unwrap();

    let err = el.wait_for_choice(&mut p, ticket).unwrap_err();
    assert!(matches!(err, StoryError::InvalidInput(_)));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn run_for_fires_timers_without_input() {
    let dir = temp_dir("run_for");
    let mut p = presenter(&dir);
    p.show_dialog("abcd", DialogStyle::default().with_speed(ms(10)));
    p.set_warmth(30, 10, ms(25)).unwrap();

    let mut el = scripted(&[]);
    el.run_for(&mut p, ms(35)).unwrap();
    assert_eq!(p.now(), ms(35));
    assert_eq!(p.dialog_view().unwrap().reveal_index, 3);
    // Immediate step to 10, then one tick at 25ms.
    assert_eq!(p.warmth(), 20);

    el.run_for(&mut p, ms(100)).unwrap();
    assert!(p.dialog_view().unwrap().is_complete());
    assert_eq!(p.warmth(), 30);
    assert!(!p.warmth_animating());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn scroll_events_reach_the_dialog_only_without_a_menu() {
    let dir = temp_dir("scroll");
    let mut p = presenter(&dir);
    let long = (0..20).map(|i| format!("l{i}")).collect::<Vec<_>>().join("\n");
    p.show_dialog(&long, DialogStyle::default().with_speed(Duration::ZERO));
    let top = p.dialog_view().unwrap().scroll_top;
    assert!(top > 0);

    let mut el = scripted(&[(1, InputEvent::Scroll(-1))]);
    el.run_for(&mut p, ms(5)).unwrap();
    assert_eq!(p.dialog_view().unwrap().scroll_top, top - 1);

    p.show_options(OptionRequest::new(["a"])).unwrap();
    p.handle_input(InputEvent::Scroll(-1)).unwrap();
    assert_eq!(p.dialog_view().unwrap().scroll_top, top - 1);

    std::fs::remove_dir_all(&dir).ok();
}
