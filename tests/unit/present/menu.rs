use super::*;

fn abc() -> OptionRequest {
    OptionRequest::new(["A", "B", "C"])
}

#[test]
fn geometry_for_three_rows_on_800x600() {
    let size = SurfaceSize::new(800, 600).unwrap();
    let rect = menu_rect(size, 3);
    // 480 wide, 125 tall, centered.
    assert_eq!(rect, IRect::new(160, 237, 640, 362));
    assert_eq!(row_center(rect, 0), 257);
    assert_eq!(row_center(rect, 2), 327);
    assert_eq!(highlight_rect(rect, 1), IRect::new(160, 280, 640, 315));
}

#[test]
fn empty_options_are_rejected() {
    let size = SurfaceSize::default();
    let err = OptionMenu::new(ChoiceTicket(0), OptionRequest::new(Vec::<String>::new()), size)
        .unwrap_err();
    assert!(matches!(err, StoryError::EmptyOptions));
}

#[test]
fn selection_clamps_at_both_ends() {
    let mut menu = OptionMenu::new(ChoiceTicket(0), abc(), SurfaceSize::default()).unwrap();
    menu.up();
    assert_eq!(menu.view().selected, 0);
    menu.down();
    menu.down();
    menu.down();
    assert_eq!(menu.view().selected, 2);
    menu.up();
    let r = menu.result();
    assert_eq!(r.choice, "B");
    assert_eq!(r.index, 1);
    assert_eq!(r.options, vec!["A", "B", "C"]);
}

#[test]
fn highlight_follows_selection() {
    let mut menu = OptionMenu::new(ChoiceTicket(0), abc(), SurfaceSize::default()).unwrap();
    let first = menu.view().highlight;
    menu.down();
    let second = menu.view().highlight;
    assert_eq!(second.y1 - first.y1, ROW_HEIGHT);
    assert_eq!(second.height(), 35);
}

#[test]
fn builder_sets_save_mode() {
    assert_eq!(abc().save_mode, SaveMode::None);
    assert_eq!(abc().persist().story_id, None);
    let tagged = abc().persist_as("chapter1");
    assert_eq!(tagged.save_mode, SaveMode::Persist);
    assert_eq!(tagged.story_id.as_deref(), Some("chapter1"));
}
