use core_config::Settings;
use core_render::{EditorBox, SharedBox};
use core_state::EditorState;
use core_text::{Point, TableSurface, TextBuffer, WordBoundaryError, WordOracle};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::rc::Rc;

/// 10px glyphs, 20px lines, wide enough that nothing wraps unless asked.
fn editor(text: Option<&str>, width: f64) -> EditorState {
    let settings = Settings {
        line_height: 20.0,
        ..Settings::default()
    };
    let source = SharedBox::new(EditorBox::sized(width, 200.0));
    let mut state = EditorState::new(settings, Rc::new(TableSurface::new(10.0)), source).unwrap();
    if let Some(text) = text {
        state.attach_buffer(TextBuffer::from_str("scenario", text));
    }
    state
}

fn positions(state: &EditorState) -> Vec<Point> {
    state.cursors().iter().map(|c| c.position()).collect()
}

#[test]
fn move_right_crosses_line_end() {
    let mut ed = editor(Some("hello world\nfoo"), 400.0);
    ed.move_primary_to(Point::new(0, 11), false);
    ed.move_right(1, false);
    assert_eq!(ed.primary().position(), Point::new(1, 0));
}

#[test]
fn merge_keeps_first_of_duplicates() {
    let mut ed = editor(Some("l0\nl1\nabcdef\nl3\nl4\nxyz"), 400.0);
    ed.move_primary_to(Point::new(2, 3), false);
    ed.add_cursor(Point::new(5, 1));
    assert!(ed.add_cursor(Point::new(2, 3)).is_none());
    assert_eq!(positions(&ed), vec![Point::new(2, 3), Point::new(5, 1)]);
}

#[test]
fn move_right_at_document_end_is_stable() {
    let mut ed = editor(Some("one\ntwo"), 400.0);
    ed.move_to_bottom(false);
    let end = ed.primary().position();
    ed.move_right(1, false);
    ed.move_right(1, false);
    assert_eq!(ed.primary().position(), end);
    assert_eq!(end, Point::new(1, 3));
}

#[test]
fn degraded_mode_without_buffer() {
    let mut ed = editor(None, 400.0);
    ed.move_right(3, false);
    ed.move_down(2, true);
    assert!(ed.move_to_end_of_word(false).is_ok());
    ed.delete_selection();
    assert_eq!(positions(&ed), vec![Point::origin()]);
    ed.add_cursor(Point::new(3, 1));
    ed.move_primary_to(Point::new(1, 2), true);
    ed.click(55.0, 25.0, false);
    assert_eq!(positions(&ed), vec![Point::origin(), Point::new(3, 1)]);
    // Coordinates still approximate from char width and line height.
    let xy = ed.point_to_xy(Point::new(2, 4));
    assert_eq!((xy.x, xy.y), (40.0, 40.0));
    assert_eq!(ed.xy_to_point(41.0, 45.0), Point::new(2, 4));
}

#[test]
fn uninitialized_word_oracle_surfaces_error() {
    let mut ed = editor(Some("alpha beta"), 400.0);
    ed.set_word_boundary(WordOracle::uninitialized());
    assert_eq!(
        ed.move_to_start_of_word(false),
        Err(WordBoundaryError::Uninitialized)
    );
    assert_eq!(ed.select_word(), Err(WordBoundaryError::Uninitialized));
    assert_eq!(ed.primary().position(), Point::origin());
}

#[test]
fn word_motion_across_cursors() {
    let mut ed = editor(Some("alpha beta\ngamma delta"), 400.0);
    ed.add_cursor(Point::new(1, 0));
    ed.move_to_end_of_word(false).unwrap();
    assert_eq!(positions(&ed), vec![Point::new(0, 5), Point::new(1, 5)]);
    ed.move_to_end_of_word(true).unwrap();
    assert_eq!(positions(&ed), vec![Point::new(0, 10), Point::new(1, 11)]);
}

#[test]
fn wrapped_vertical_navigation() {
    // 100px editor leaves 80px (8 glyphs) per screen line.
    let mut ed = editor(Some("hello world foo\nbar"), 100.0);
    assert_eq!(ed.screen_len(), 4);
    ed.move_down(1, false);
    assert_eq!(ed.primary().position(), Point::new(0, 6));
    ed.move_to_end_of_line(false);
    assert_eq!(ed.primary().position(), Point::new(0, 12));
    // Column 12 sits at the start of the third screen line.
    ed.move_down(5, false);
    assert_eq!(ed.primary().position(), Point::new(1, 0));
    ed.move_down(1, false);
    assert_eq!(ed.primary().position(), Point::new(1, 3));
}

#[test]
fn move_up_on_a_wrapped_first_line_reaches_document_start() {
    let mut ed = editor(Some("hello world foo\nbar"), 100.0);
    // (0, 8) is drawn on the second screen line of buffer line 0.
    ed.move_primary_to(Point::new(0, 8), false);
    ed.move_up(1, false);
    assert_eq!(ed.primary().position(), Point::origin());
    ed.move_primary_to(Point::new(1, 1), false);
    ed.move_down(1, false);
    assert_eq!(ed.primary().position(), Point::new(1, 3));
}

#[test]
fn paragraph_selection_and_delete() {
    let mut ed = editor(Some("keep\ndrop this\nkeep too"), 400.0);
    ed.move_primary_to(Point::new(1, 2), false);
    ed.select_paragraph();
    ed.delete_selection();
    let buffer = ed.buffer().unwrap();
    assert_eq!(buffer.line_content(1), "");
    assert_eq!(buffer.len(), 3);
    assert_eq!(ed.primary().position(), Point::new(1, 0));
}

#[test]
fn scrollbar_tracks_scroll() {
    let text = (0..50).map(|i| format!("{i}")).collect::<Vec<_>>().join("\n");
    let mut ed = editor(Some(&text), 400.0);
    let bar = ed.scrollbar().unwrap();
    assert_eq!(bar.track_width, Settings::default().scrollbar_width);
    assert_eq!(bar.thumb_top, 0.0);
    assert_eq!(bar.thumb_height, 40.0);
    ed.move_to_bottom(false);
    assert!(ed.scroll_cursor_into_view());
    assert_eq!(ed.scroll(), 800.0);
    let bar = ed.scrollbar().unwrap();
    assert_eq!(bar.thumb_top, 160.0);
    assert!(ed.drag_thumb(80.0));
    assert_eq!(ed.scroll(), 400.0);
}

#[test]
fn zero_scrollbar_width_hides_the_track() {
    let settings = Settings {
        line_height: 20.0,
        scrollbar_width: 0.0,
        ..Settings::default()
    };
    let source = SharedBox::new(EditorBox::sized(400.0, 200.0));
    let mut ed = EditorState::new(settings, Rc::new(TableSurface::new(10.0)), source).unwrap();
    let text = (0..50).map(|i| format!("{i}")).collect::<Vec<_>>().join("\n");
    ed.attach_buffer(TextBuffer::from_str("scenario", &text));
    assert!(ed.scrollbar().is_none());
    assert!(!ed.drag_thumb(80.0));
    assert_eq!(ed.scroll(), 0.0);
}

proptest! {
    #[test]
    fn batch_moves_never_leave_duplicates(
        starts in proptest::collection::vec((0usize..4, 0usize..6), 1..8),
        moves in proptest::collection::vec(0u8..6, 1..12),
    ) {
        let mut ed = editor(Some("abcde\nfg\n\nhijklm"), 400.0);
        for (line, column) in starts {
            ed.add_cursor(Point::new(line, column));
        }
        for m in moves {
            match m {
                0 => ed.move_right(1, false),
                1 => ed.move_left(2, false),
                2 => ed.move_up(1, false),
                3 => ed.move_down(1, true),
                4 => ed.move_to_end_of_line(false),
                _ => ed.move_to_start_of_line(true),
            }
            let ps = positions(&ed);
            let mut dedup = ps.clone();
            dedup.sort();
            dedup.dedup();
            prop_assert_eq!(dedup.len(), ps.len());
            prop_assert!(!ps.is_empty());
            let buffer = ed.buffer().unwrap();
            for p in ps {
                prop_assert!(p.line < buffer.len());
                prop_assert!(p.column <= buffer.line_len(p.line));
            }
        }
    }
}
