#[allow(dead_code)]
mod common;

use common::{Harness, items};
use vsp::tui::{Intent, Mode};

fn many(n: usize) -> Vec<vsp::Item> {
    (1..=n)
        .map(|i| vsp::Item::from_path(&format!("/p/item{i:02}")))
        .collect()
}

#[test]
fn keys_arrows_and_vi_motions() {
    let mut h = Harness::new(items(&["a", "b", "c"]));
    h.feed(b"\x1b[B");
    assert_eq!(h.current().as_deref(), Some("b"));
    h.keys("j");
    assert_eq!(h.current().as_deref(), Some("c"));
    h.keys("j");
    assert_eq!(h.current().as_deref(), Some("c"));
    h.feed(b"\x1bOA");
    assert_eq!(h.current().as_deref(), Some("b"));
    h.keys("k");
    h.keys("k");
    assert_eq!(h.current().as_deref(), Some("a"));
}

#[test]
fn keys_home_end_and_paging() {
    // 24 rows leave 16 list rows
    let mut h = Harness::new(many(40));
    h.feed(b"\x1b[6~");
    assert_eq!(h.app.item_list.cursor(), 16);
    assert_eq!(h.app.item_list.offset(), 16);
    h.feed(b"\x1b[6~");
    h.feed(b"\x1b[6~");
    assert_eq!(h.app.item_list.cursor(), 39);
    assert_eq!(h.app.item_list.offset(), 24);
    h.feed(b"\x1b[5~");
    assert_eq!(h.app.item_list.cursor(), 23);
    h.feed(b"\x1b[H");
    assert_eq!((h.app.item_list.cursor(), h.app.item_list.offset()), (0, 0));
    h.keys("G");
    assert_eq!(h.current().as_deref(), Some("item40"));
    h.feed(b"\x1b[1~");
    assert_eq!(h.current().as_deref(), Some("item01"));
    h.feed(b"\x1b[4~");
    assert_eq!(h.current().as_deref(), Some("item40"));
    h.keys("g");
    assert_eq!(h.current().as_deref(), Some("item01"));
}

#[test]
fn keys_cursor_stays_in_viewport() {
    let mut h = Harness::new(many(30));
    for _ in 0..20 {
        h.keys("j");
    }
    let list = &h.app.item_list;
    assert_eq!(list.cursor(), 20);
    assert!(list.offset() <= list.cursor() && list.cursor() < list.offset() + list.height());
}

#[test]
fn keys_search_filters_names_and_paths() {
    let mut h = Harness::new(vec![
        vsp::Item::from_path("/work/Api"),
        vsp::Item::from_path("/home/web"),
        vsp::Item::from_path("/work/cli"),
    ]);
    h.keys("/");
    assert_eq!(h.app.mode, Mode::Search);
    h.keys("WORK");
    assert_eq!(h.visible_names(), ["Api", "cli"]);
    // keys that are commands in normal mode are typed in search mode
    h.keys("q");
    assert!(h.app.is_running());
    assert!(h.visible_names().is_empty());
    h.feed(b"\x7f");
    h.feed(b"\r");
    assert_eq!(h.app.mode, Mode::Normal);
    assert_eq!(h.app.query, "WORK");
    assert_eq!(h.visible_names(), ["Api", "cli"]);
}

#[test]
fn keys_search_takes_pasted_chunks() {
    let mut h = Harness::new(items(&["alpha", "beta", "gamma"]));
    h.feed(b"/mm");
    assert_eq!(h.app.query, "mm");
    assert_eq!(h.visible_names(), ["gamma"]);
}

#[test]
fn keys_search_unicode() {
    let mut h = Harness::new(items(&["café", "cafe"]));
    h.keys("/é");
    assert_eq!(h.visible_names(), ["café"]);
}

#[test]
fn keys_search_paste_split_mid_character() {
    let mut h = Harness::new(items(&["项目", "工具", "café"]));
    let pasted = "/项目".as_bytes();
    // the read boundary falls inside the second character
    h.feed(&pasted[..5]);
    h.feed(&pasted[5..]);
    assert_eq!(h.app.query, "项目");
    assert_eq!(h.visible_names(), ["项目"]);

    h.feed(b"\x1b\x1b");
    h.feed(&"/caf\u{e9}".as_bytes()[..5]);
    assert_eq!(h.app.query, "caf");
    h.feed(&"\u{e9}".as_bytes()[1..]);
    assert_eq!(h.app.query, "café");
}

#[test]
fn keys_escape_cascade() {
    let mut h = Harness::new(items(&["foo", "bar"]));
    h.keys("/o");
    h.feed(b"\x1b");
    h.keys(" ");
    assert_eq!(h.app.item_list.selection().len(), 1);

    h.feed(b"\x1b");
    assert_eq!(h.app.query, "");
    assert_eq!(h.visible_names(), ["foo", "bar"]);
    h.feed(b"\x1b");
    assert!(h.app.item_list.selection().is_empty());
    assert!(h.app.is_running());
    h.feed(b"\x1b");
    assert!(!h.app.is_running());
    assert!(h.intents.is_empty());
}

#[test]
fn keys_ctrl_c_in_search_clears_query() {
    let mut h = Harness::new(items(&["foo", "bar"]));
    h.keys("/ba");
    h.feed(b"\x03");
    assert_eq!(h.app.mode, Mode::Normal);
    assert_eq!(h.app.query, "");
    assert!(h.app.is_running());
    h.feed(b"\x03");
    assert!(!h.app.is_running());
}

#[test]
fn keys_ctrl_d_quits() {
    let mut h = Harness::new(items(&["foo"]));
    h.feed(b"j\x04");
    assert!(!h.app.is_running());
    assert!(!h.app.accepted());
}

#[test]
fn keys_quit() {
    let mut h = Harness::new(items(&["foo"]));
    h.keys("Q");
    assert!(!h.app.is_running());
}

#[test]
fn keys_backspace_in_normal_mode_clears_query() {
    let mut h = Harness::new(items(&["foo", "bar"]));
    h.keys("/f\r");
    assert_eq!(h.visible_names(), ["foo"]);
    h.feed(b"\x7f");
    assert_eq!(h.app.query, "");
    assert_eq!(h.visible_names(), ["foo", "bar"]);
}

#[test]
fn keys_select_all_toggles() {
    let mut h = Harness::new(items(&["a", "b", "c"]));
    h.keys("a");
    assert_eq!(h.app.item_list.selection().len(), 3);
    h.keys("a");
    assert!(h.app.item_list.selection().is_empty());

    // only the visible items are added
    h.keys("/b\ra");
    assert_eq!(h.app.item_list.selected_in_order(), [1]);
}

#[test]
fn keys_enter_opens_selection_in_collection_order() {
    let mut h = Harness::new(items(&["a", "b", "c"]));
    h.keys("G k");
    h.feed(b"\x1b[H");
    h.keys(" ");
    let intents = h.keys("\r");
    assert_eq!(
        intents,
        vec![Intent::Open {
            indices: vec![0, 2],
            new_window: true,
            as_workspace: false,
        }]
    );
    assert!(!h.app.is_running());
    assert!(h.app.accepted());
}

#[test]
fn keys_events_after_quit_in_one_read_are_dropped() {
    let mut h = Harness::new(items(&["a", "b"]));
    let intents = h.feed(b"\rj ");
    assert_eq!(intents.len(), 1);
    assert_eq!(h.app.item_list.cursor(), 0);
    assert!(h.app.item_list.selection().is_empty());
}

#[test]
fn keys_delete_then_undo() {
    let mut h = Harness::new(items(&["a", "b", "c", "d"]));
    h.keys("j jj ");
    h.keys("d");
    assert_eq!(h.app.mode, Mode::ConfirmDelete);
    assert_eq!(h.app.pending_delete(), &[1, 3]);

    // everything but the answer is absorbed
    h.keys("jq");
    h.feed(b"\x1b[B");
    assert_eq!(h.app.mode, Mode::ConfirmDelete);
    assert!(h.app.is_running());

    h.keys("y");
    assert_eq!(h.names(), ["a", "c"]);
    assert!(h.app.item_list.selection().is_empty());
    assert_eq!(h.app.message.as_deref(), Some("Deleted 2 projects, press u to undo"));

    h.keys("u");
    assert_eq!(h.names(), ["b", "d", "a", "c"]);
    assert_eq!(h.current().as_deref(), Some("b"));
    assert_eq!(h.app.message.as_deref(), Some("Restored 2 projects"));

    let kinds: Vec<&str> = h
        .intents
        .iter()
        .map(|i| match i {
            Intent::DeleteCommit { .. } => "delete",
            Intent::RestoreCommit { .. } => "restore",
            _ => "other",
        })
        .collect();
    assert_eq!(kinds, ["delete", "restore"]);
}

#[test]
fn keys_delete_keeps_filter() {
    let mut h = Harness::new(items(&["api", "web", "api2"]));
    h.keys("/api\r");
    h.keys("dy");
    assert_eq!(h.names(), ["web", "api2"]);
    assert_eq!(h.visible_names(), ["api2"]);
    assert_eq!(h.app.query, "api");
}

#[test]
fn keys_delete_cancelled_with_n() {
    let mut h = Harness::new(items(&["a", "b"]));
    h.keys("dn");
    assert_eq!(h.app.mode, Mode::Normal);
    assert_eq!(h.names(), ["a", "b"]);
    assert!(h.intents.is_empty());
}

#[test]
fn keys_delete_on_empty_view_is_ignored() {
    let mut h = Harness::new(items(&["a"]));
    h.keys("/zz\rd");
    assert_eq!(h.app.mode, Mode::Normal);
}

#[test]
fn keys_undo_with_nothing_removed() {
    let mut h = Harness::new(items(&["a"]));
    assert!(h.keys("u").is_empty());
    assert_eq!(h.app.message.as_deref(), Some("Nothing to undo"));
}

#[test]
fn keys_tools() {
    let mut h = Harness::new(items(&["a", "b"]));
    h.keys("j");
    let intents = h.keys("yor");
    assert!(matches!(&intents[0], Intent::CopyPath(item) if item.name == "b"));
    assert!(matches!(&intents[1], Intent::Reveal(item) if item.name == "b"));
    assert_eq!(intents[2], Intent::Reload);
    assert!(h.app.is_running());
}

#[test]
fn keys_tab_and_unknown_sequences_are_ignored() {
    let mut h = Harness::new(items(&["a", "b"]));
    h.feed(b"\t");
    h.feed(b"\x1b[15~");
    h.feed(b"\x1bx");
    assert_eq!(h.current().as_deref(), Some("a"));
    assert!(h.app.is_running());
}

#[test]
fn keys_screen() {
    let mut h = Harness::with_size(items(&["api", "web"]), 12, 60);
    h.keys(" j");
    // 25 cells of name column, then the path column
    let row = |pointer: &str, marker: &str, name: &str| format!(" {pointer} {marker} 📁 {name:<25} /p");
    let api = row(" ", "[✓]", "api");
    let web = row("❯", "[ ]", "web");
    let expected = [
        " 📂 VSCode Projects  [1 selected] 2/2",
        &"─".repeat(59),
        " / search",
        &"─".repeat(59),
        &api,
        &web,
        "",
        "",
        &"─".repeat(59),
        " Path: /p/web",
        &"─".repeat(59),
        " ↑↓ nav Enter open n new Space select / search q quit",
    ]
    .join("\n");
    assert_eq!(h.screen(), expected);
}

#[test]
fn keys_delete_prompt_screen() {
    let mut h = Harness::with_size(items(&["api", "web", "cli", "docs", "site"]), 12, 60);
    h.keys("ad");
    let footer = h.screen().lines().skip(9).collect::<Vec<_>>().join("\n");
    insta::assert_snapshot!(footer, @r"
 ⚠️  Delete api, web, cli and 2 more from the recent list?
───────────────────────────────────────────────────────────
 ⚠️  Confirm delete: y delete  n/Esc cancel
");
}
