use super::*;
use crate::assets::media::BufferedFrames;
use crate::effects::noise::NoisePattern;
use crate::foundation::core::{IRect, Point};
use crate::present::dialog::DialogPosition;
use crate::store::choice::ChoiceRecord;
use image::RgbaImage;
use std::path::PathBuf;

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "storyframe_presenter_{tag}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn presenter_in(dir: &Path, w: u32, h: u32) -> Presenter {
    Presenter::new(PresenterConfig {
        width: w,
        height: h,
        store_path: dir.join("gamedata.json"),
        seed: Some(42),
        ..PresenterConfig::default()
    })
    .unwrap()
}

fn px(img: &RgbImage, x: u32, y: u32) -> [u8; 3] {
    img.get_pixel(x, y).0
}

#[test]
fn dialog_reveals_one_char_per_tick() {
    let dir = temp_dir("reveal");
    let mut p = presenter_in(&dir, 800, 600);
    p.show_dialog("abc", DialogStyle::default().with_speed(ms(40)));
    assert_eq!(p.dialog_view().unwrap().reveal_index, 0);

    p.advance(ms(39));
    assert_eq!(p.dialog_view().unwrap().reveal_index, 0);
    p.advance(ms(1));
    assert_eq!(p.dialog_view().unwrap().revealed(), "a");
    p.advance(ms(80));
    assert_eq!(p.dialog_view().unwrap().revealed(), "abc");
    assert_eq!(p.next_due(), None);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn new_dialog_replaces_and_close_is_idempotent() {
    let dir = temp_dir("replace");
    let mut p = presenter_in(&dir, 800, 600);
    p.show_dialog("first", DialogStyle::default());
    p.advance(ms(100));
    p.show_dialog("second", DialogStyle::default().with_position(DialogPosition::TopRight));
    let v = p.dialog_view().unwrap();
    assert_eq!(v.text, "second");
    assert_eq!(v.reveal_index, 0);
    assert_eq!(v.rect, IRect::new(400, 10, 790, 150));

    p.close_dialog();
    p.close_dialog();
    assert!(!p.has_dialog());
    assert_eq!(p.next_due(), None);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn empty_options_fail_before_rendering() {
    let dir = temp_dir("empty");
    let mut p = presenter_in(&dir, 800, 600);
    let before = p.render();
    let err = p
        .show_options(OptionRequest::new(Vec::<String>::new()))
        .unwrap_err();
    assert!(matches!(err, StoryError::EmptyOptions));
    assert!(!p.has_menu());
    assert_eq!(p.render(), before);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn second_menu_is_rejected_while_one_is_open() {
    let dir = temp_dir("second");
    let mut p = presenter_in(&dir, 800, 600);
    p.show_options(OptionRequest::new(["a"])).unwrap();
    let err = p.show_options(OptionRequest::new(["b"])).unwrap_err();
    assert!(matches!(err, StoryError::InvalidInput(_)));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn confirming_each_index_persists_the_last_choice() {
    let dir = temp_dir("persist");
    let mut p = presenter_in(&dir, 800, 600);
    for k in 0..3 {
        let ticket = p
            .show_options(OptionRequest::new(["A", "B", "C"]).persist())
            .unwrap();
        for _ in 0..k {
            p.handle_input(InputEvent::Down).unwrap();
        }
        p.handle_input(InputEvent::Confirm).unwrap();
        let result = p.take_choice(ticket).unwrap().unwrap();
        let expected = ["A", "B", "C"][k];
        assert_eq!(result.choice, expected);
        assert_eq!(p.store().get_last_choice().as_deref(), Some(expected));
        assert_eq!(p.return_options(None).as_deref(), Some(expected));
    }

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn story_choices_append_and_leave_the_menu_choice_alone() {
    let dir = temp_dir("story");
    let mut p = presenter_in(&dir, 800, 600);

    let t = p
        .show_options(OptionRequest::new(["A", "B"]).persist())
        .unwrap();
    p.handle_input(InputEvent::Confirm).unwrap();
    p.take_choice(t).unwrap().unwrap();

    for down in [true, false] {
        let t = p
            .show_options(OptionRequest::new(["yes", "no"]).persist_as("chapter1"))
            .unwrap();
        if down {
            p.handle_input(InputEvent::Down).unwrap();
        }
        p.handle_input(InputEvent::Confirm).unwrap();
        p.take_choice(t).unwrap().unwrap();
    }

    let record: ChoiceRecord = p.store().try_load().unwrap();
    assert_eq!(record.last_choice(), Some("A"));
    assert_eq!(record.story_choices.len(), 2);
    assert!(record.story_choices.iter().all(|c| c.id == "chapter1"));
    assert_eq!(p.return_options(Some("chapter1")).as_deref(), Some("no"));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn unsaved_choice_touches_no_file() {
    let dir = temp_dir("nosave");
    let mut p = presenter_in(&dir, 800, 600);
    let t = p.show_options(OptionRequest::new(["A"])).unwrap();
    p.handle_input(InputEvent::Confirm).unwrap();
    assert_eq!(p.take_choice(t).unwrap().unwrap().choice, "A");
    assert!(!dir.join("gamedata.json").exists());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn persist_failure_is_returned_and_menu_still_closes() {
    let dir = temp_dir("persist_fail");
    // A directory where the document should be can be neither read nor replaced.
    std::fs::create_dir_all(dir.join("gamedata.json").join("blocker")).unwrap();
    let mut p = presenter_in(&dir, 800, 600);
    let t = p
        .show_options(OptionRequest::new(["A"]).persist())
        .unwrap();
    p.handle_input(InputEvent::Confirm).unwrap();
    assert!(!p.has_menu());
    assert!(p.take_choice(t).unwrap().is_err());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn resize_closes_dialog_and_menu_and_rescales_background() {
    let dir = temp_dir("resize");
    let mut p = presenter_in(&dir, 800, 600);
    p.show_dialog("some text", DialogStyle::default());
    let t = p.show_options(OptionRequest::new(["A", "B"])).unwrap();

    p.handle_input(InputEvent::Resize {
        width: 320,
        height: 200,
    })
    .unwrap();
    assert!(p.dialog_view().is_none());
    assert!(p.menu_view().is_none());
    assert!(matches!(
        p.take_choice(t),
        Some(Err(StoryError::MenuDismissed))
    ));
    assert_eq!(p.render().dimensions(), (320, 200));
    // The reveal timer went with the dialog.
    assert_eq!(p.next_due(), None);

    assert!(p.resize(0, 10).is_err());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn warmth_steps_land_exactly_on_target() {
    let dir = temp_dir("warmth");
    let mut p = presenter_in(&dir, 40, 30);
    p.set_warmth(50, 10, DEFAULT_WARMTH_DELAY).unwrap();
    // First step is immediate.
    assert_eq!(p.warmth(), 10);
    assert!(p.warmth_animating());

    let mut seen = Vec::new();
    for _ in 0..4 {
        p.advance(DEFAULT_WARMTH_DELAY);
        seen.push(p.warmth());
    }
    assert_eq!(seen, vec![20, 30, 40, 50]);
    assert_eq!(p.now(), DEFAULT_WARMTH_DELAY * 4);
    assert!(!p.warmth_animating());
    p.advance(ms(500));
    assert_eq!(p.warmth(), 50);

    // Overshoot is clamped on the way down as well.
    p.set_warmth(-25, 20, ms(10)).unwrap();
    let mut seen = vec![p.warmth()];
    while p.warmth_animating() {
        p.advance(ms(10));
        seen.push(p.warmth());
    }
    assert_eq!(seen, vec![30, 10, -10, -25]);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn warmth_arguments_are_validated_and_restarts_cancel() {
    let dir = temp_dir("warmth_args");
    let mut p = presenter_in(&dir, 40, 30);
    assert!(p.set_warmth(101, 1, ms(10)).is_err());
    assert!(p.set_warmth(10, 0, ms(10)).is_err());

    p.set_warmth(100, 1, ms(10)).unwrap();
    p.advance(ms(30));
    assert_eq!(p.warmth(), 4);
    p.set_warmth(0, 1, ms(10)).unwrap();
    assert_eq!(p.warmth(), 3);
    p.advance(ms(30));
    assert_eq!(p.warmth(), 0);
    assert!(!p.warmth_animating());

    // A single step that reaches the target schedules nothing.
    p.set_warmth(20, 50, ms(10)).unwrap();
    assert_eq!(p.warmth(), 20);
    assert!(!p.warmth_animating());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn warm_background_is_redder() {
    let dir = temp_dir("warm_bg");
    let mut p = presenter_in(&dir, 20, 20);
    p.set_background_color(Rgb8::new(100, 100, 100)).unwrap();
    p.set_warmth(60, 60, ms(1)).unwrap();
    p.advance(ms(1));
    let [r, g, b] = px(p.background_frame(), 5, 5);
    assert!(r > 100 && g < 100 && b < 100);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn noise_refreshes_from_the_clean_background() {
    let dir = temp_dir("noise");
    let mut p = presenter_in(&dir, 64, 48);
    p.set_background_color(Rgb8::BLACK).unwrap();
    let cfg = NoiseConfig::new(100, NoisePattern::Horizontal, 0).unwrap();
    p.set_noise_effect(Some(cfg)).unwrap();
    assert_eq!(p.next_due(), Some(NOISE_REFRESH_INTERVAL));

    // Overlay weight is 0.3 and overlay channels are at most 200, so a black base can never
    // exceed 60 however many refreshes run.
    for _ in 0..10 {
        p.advance(NOISE_REFRESH_INTERVAL);
        let max = p.background_frame().pixels().flat_map(|px| px.0).max().unwrap();
        assert!(max <= 61, "{max}");
        assert!(max > 0);
    }

    p.set_noise_effect(None).unwrap();
    assert_eq!(p.next_due(), None);
    assert!(p.background_frame().pixels().all(|px| px.0 == [0, 0, 0]));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn render_stacks_background_layers_dialog_and_menu() {
    let dir = temp_dir("render");
    let mut p = presenter_in(&dir, 800, 600);
    p.set_background_color(Rgb8::WHITE).unwrap();

    // A layer under the dialog box.
    let frame = RgbaImage::from_pixel(30, 30, image::Rgba([0, 255, 0, 255]));
    let layer = p
        .load_video_source(
            Box::new(BufferedFrames::new([frame])),
            ImageSettings::new(30, 30, Point { x: 0, y: 430 }).unwrap(),
        )
        .unwrap();
    assert!(p.overlay().layer(layer).is_some());

    p.show_dialog("hi", DialogStyle::default().with_box_color(Rgb8::BLUE));
    let img = p.render();
    // Layer outside the box.
    assert_eq!(px(&img, 2, 432), [0, 255, 0]);
    // Stippled border: alternate pixels box color, the rest what lies beneath.
    assert_eq!(px(&img, 12, 442), [0, 0, 255]);
    assert_eq!(px(&img, 13, 442), [0, 255, 0]);
    assert_eq!(px(&img, 100, 445), [255, 255, 255]);
    // Text widget is filled.
    assert_eq!(px(&img, 100, 500), [0, 0, 255]);

    p.show_options(OptionRequest::new(["A", "B", "C"]).colors(Rgb8::RED, Rgb8::WHITE))
        .unwrap();
    let img = p.render();
    let menu = p.menu_view().unwrap();
    let hl = menu.highlight;
    // Highlight outline sits on the top edge of the selected row.
    assert_eq!(px(&img, 300, hl.y1 as u32), [255, 255, 0]);
    // Menu interior is stippled over the background.
    let (x, y) = (300u32, (hl.y2 + 10) as u32);
    let a = px(&img, x, y);
    let b = px(&img, x + 1, y);
    assert!(a == [255, 0, 0] || b == [255, 0, 0]);
    assert!(a == [255, 255, 255] || b == [255, 255, 255]);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn video_layer_advances_every_30ms_until_it_ends() {
    let dir = temp_dir("video");
    let mut p = presenter_in(&dir, 50, 50);
    let frames: Vec<_> = (0..3)
        .map(|i| RgbaImage::from_pixel(4, 4, image::Rgba([i * 10, 0, 0, 255])))
        .collect();
    let id = p
        .load_video_source(
            Box::new(BufferedFrames::new(frames)),
            ImageSettings::new(4, 4, Point::default()).unwrap(),
        )
        .unwrap();
    assert_eq!(p.next_due(), Some(ms(30)));
    p.advance(ms(60));
    assert_eq!(p.overlay().layer(id).unwrap().frame_index, 2);
    p.advance(ms(30));
    assert!(p.overlay().layer(id).unwrap().finished);
    assert_eq!(p.next_due(), None);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn background_path_errors_are_invalid_input() {
    let dir = temp_dir("bgpath");
    let mut p = presenter_in(&dir, 20, 20);
    let err = p.set_background_path(dir.join("missing.png")).unwrap_err();
    assert!(matches!(err, StoryError::InvalidInput(_)));

    let path = dir.join("bg.png");
    RgbImage::from_pixel(5, 5, image::Rgb([9, 8, 7])).save(&path).unwrap();
    p.set_background_path(&path).unwrap();
    assert_eq!(p.background_frame().dimensions(), (20, 20));
    let got = px(p.background_frame(), 10, 10);
    for (g, want) in got.iter().zip([9u8, 8, 7]) {
        assert!(g.abs_diff(want) <= 1, "{got:?}");
    }

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn config_noise_starts_the_refresh_timer() {
    let dir = temp_dir("cfg_noise");
    let p = Presenter::new(PresenterConfig {
        width: 16,
        height: 16,
        noise: Some(NoiseConfig::parse(10, "VL", 0).unwrap()),
        store_path: dir.join("gamedata.json"),
        seed: Some(3),
        ..PresenterConfig::default()
    });
    let mut p = p.unwrap();
    assert_eq!(p.next_due(), Some(NOISE_REFRESH_INTERVAL));
    assert_eq!(p.noise_effect().unwrap().pattern(), NoisePattern::Vertical);

    std::fs::remove_dir_all(&dir).ok();
}
