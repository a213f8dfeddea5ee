//! Frame rendering.
//!
//! A [`Frame`] is the full list of screen lines for one state of the picker. It is painted
//! line by line (move, clear the line, write) so the screen is never cleared as a whole.

use std::io::Write;

use crossterm::style::ContentStyle;

use crate::item::{Item, ItemKind};
use crate::theme::ColorTheme;

use super::TerminalError;
use super::app::{App, Mode};
use super::backend::Tui;
use super::layout::Layout;
use super::text::{Align, display_width, pad, truncate};

const TITLE: &str = " 📂 VSCode Projects";
const ELLIPSIS: &str = "..";
const RESET: &str = "\x1b[0m";
/// Pending items named in the delete prompt
const PROMPT_NAMES: usize = 3;

/// One fully computed screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    rows: u16,
    lines: Vec<String>,
}

fn styled(style: ContentStyle, text: &str) -> String {
    style.apply(text).to_string()
}

impl Frame {
    /// Lays out `app` for `layout`
    pub fn build(app: &App, theme: &ColorTheme, layout: &Layout) -> Self {
        let cols = usize::from(layout.cols);
        // rules are sized in cells already, the box-drawing glyph counts as wide
        let rule = (!layout.compact).then(|| styled(theme.border, &"─".repeat(cols.saturating_sub(1))));
        let mut lines = Vec::with_capacity(layout.list_height + 8);

        lines.push(fit(title_line(app, theme), cols));
        lines.extend(rule.clone());
        lines.push(fit(search_line(app, theme), cols));
        lines.extend(rule.clone());
        lines.extend(list_lines(app, theme, layout).into_iter().map(|line| fit(line, cols)));
        lines.extend(rule.clone());
        lines.push(fit(status_line(app, theme), cols));
        lines.extend(rule);
        lines.push(fit(help_line(app, theme, layout), cols));

        Self {
            rows: layout.rows,
            lines,
        }
    }

    /// Lines of the frame, top to bottom
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Writes the frame, then clears the rows it does not cover
    pub fn paint<W: Write>(&self, tui: &mut Tui<W>) -> Result<(), TerminalError> {
        for (row, line) in (1..=self.rows).zip(&self.lines) {
            tui.goto(row, 1)?;
            tui.clear_line()?;
            tui.write(line)?;
        }
        for row in (1..=self.rows).skip(self.lines.len()) {
            tui.goto(row, 1)?;
            tui.clear_line()?;
        }
        tui.flush()
    }
}

/// Cuts a line to the terminal width, closing any style left open by the cut
fn fit(line: String, cols: usize) -> String {
    if display_width(&line) <= cols {
        return line;
    }
    let mut cut = truncate(&line, cols, "");
    cut.push_str(RESET);
    cut
}

fn title_line(app: &App, theme: &ColorTheme) -> String {
    let list = &app.item_list;
    let mut line = styled(theme.title, TITLE);
    line.push_str("  ");
    if !list.selection().is_empty() {
        line.push_str(&styled(theme.selected_count, &format!("[{} selected]", list.selection().len())));
        line.push(' ');
    }
    let total = list.visible().len();
    if total > 0 {
        line.push_str(&styled(theme.info, &format!("{}/{}", list.cursor() + 1, total)));
    }
    line
}

fn search_line(app: &App, theme: &ColorTheme) -> String {
    let prompt = styled(theme.prompt, "❯");
    match app.mode {
        Mode::Search => format!(" {prompt} {}{}", app.query, styled(theme.query_cursor, " ")),
        _ if !app.query.is_empty() => {
            format!(" {prompt} {} {}", app.query, styled(theme.info, "(Esc to clear)"))
        }
        _ => styled(theme.info, " / search"),
    }
}

fn list_lines(app: &App, theme: &ColorTheme, layout: &Layout) -> Vec<String> {
    let list = &app.item_list;
    let visible = list.visible();
    let start = list.offset().min(visible.len());
    let end = (start + layout.list_height).min(visible.len());

    let mut lines: Vec<String> = (start..end)
        .map(|pos| {
            let index = visible[pos];
            item_line(
                &list.items()[index],
                pos == list.cursor(),
                list.is_selected(index),
                theme,
                layout,
            )
        })
        .collect();
    lines.resize(layout.list_height, String::new());
    lines
}

fn item_line(item: &Item, current: bool, selected: bool, theme: &ColorTheme, layout: &Layout) -> String {
    let pointer = if current {
        styled(theme.pointer, "❯")
    } else {
        " ".to_string()
    };
    let marker = if selected {
        styled(theme.marked, "[✓]")
    } else {
        styled(theme.unmarked, "[ ]")
    };
    let icon_style = match item.kind {
        _ if !item.valid => theme.invalid,
        ItemKind::Folder => theme.folder,
        ItemKind::File => theme.file,
        ItemKind::Workspace => theme.workspace,
    };
    let icon = styled(icon_style, item.kind.icon());

    let name_cell = pad(&truncate(&item.label(), layout.name_width, ELLIPSIS), layout.name_width, Align::Left, ' ');
    let path_cell = pad(&truncate(&item.shown_dir(), layout.path_width, ELLIPSIS), layout.path_width, Align::Left, ' ');

    let (name, path) = if !item.valid {
        (styled(theme.invalid, &name_cell), styled(theme.invalid, &path_cell))
    } else {
        let (name_style, tag_style, path_style) = if current {
            (theme.current, theme.current_tag, theme.current_path)
        } else {
            (theme.normal, theme.tag, theme.path)
        };
        // the tag part starts right after the name, when the cut left the name whole
        let split = if item.tag.is_some() && name_cell.starts_with(&item.name) {
            item.name.len()
        } else {
            name_cell.len()
        };
        let (base, tag) = name_cell.split_at(split);
        let mut name = styled(name_style, base);
        if !tag.is_empty() {
            name.push_str(&styled(tag_style, tag));
        }
        (name, styled(path_style, &path_cell))
    };

    format!(" {pointer} {marker} {icon} {name} {path}")
}

fn status_line(app: &App, theme: &ColorTheme) -> String {
    if app.mode == Mode::ConfirmDelete {
        return styled(theme.danger, &format!(" ⚠️  {}", delete_prompt(app)));
    }
    if let Some(message) = &app.message {
        return styled(theme.message, &format!(" 💡 {message}"));
    }
    match app.item_list.current() {
        Some(item) if !item.valid => format!(
            " {} {}",
            styled(theme.warning, "⚠️  Path not found:"),
            styled(theme.invalid, item.shown_path())
        ),
        Some(item) => format!(" {} {}", styled(theme.info, "Path:"), styled(theme.location, item.shown_path())),
        None => styled(theme.info, " No matching projects"),
    }
}

fn delete_prompt(app: &App) -> String {
    let pending = app.pending_delete();
    let items = app.item_list.items();
    let names: Vec<&str> = pending
        .iter()
        .take(PROMPT_NAMES)
        .filter_map(|&i| items.get(i).map(|item| item.name.as_str()))
        .collect();
    let mut prompt = format!("Delete {}", names.join(", "));
    if pending.len() > PROMPT_NAMES {
        prompt.push_str(&format!(" and {} more", pending.len() - PROMPT_NAMES));
    }
    prompt.push_str(" from the recent list?");
    prompt
}

fn help_line(app: &App, theme: &ColorTheme, layout: &Layout) -> String {
    let key = |k: &str, label: &str| format!("{} {label}", styled(theme.key, k));
    let accent = |k: &str, label: &str| format!("{} {label}", styled(theme.key_accent, k));
    let sep = format!(" {} ", styled(theme.border, "│"));

    let parts: Vec<String> = match app.mode {
        Mode::ConfirmDelete => {
            return format!(
                " {} {}  {}/{}",
                styled(theme.danger, "⚠️  Confirm delete:"),
                accent("y", "delete"),
                styled(theme.key, "n"),
                key("Esc", "cancel")
            );
        }
        Mode::Search => {
            return format!(
                " {}  {}  {}",
                key("Enter", "confirm"),
                key("Esc", "cancel"),
                styled(theme.info, "type to filter projects")
            );
        }
        Mode::Normal if layout.wide() => {
            let mut manage = vec![key("d", "delete")];
            if app.can_undo() {
                manage.push(accent("u", "undo"));
            }
            manage.push(key("/", "search"));
            manage.push(key("q", "quit"));
            let groups = [
                key("↑↓", "move"),
                [key("Space", "select"), key("a", "all")].join(" "),
                [key("Enter", "open"), key("n", "new"), key("w", "workspace")].join(" "),
                [key("y", "copy"), key("o", "reveal")].join(" "),
                manage.join(" "),
            ];
            return format!(" {}", groups.join(&sep));
        }
        Mode::Normal if app.can_undo() => vec![
            key("↑↓", "nav"),
            key("Enter", "open"),
            key("Space", "select"),
            key("d", "delete"),
            accent("u", "undo"),
            key("q", "quit"),
        ],
        Mode::Normal => vec![
            key("↑↓", "nav"),
            key("Enter", "open"),
            key("n", "new"),
            key("Space", "select"),
            key("/", "search"),
            key("q", "quit"),
        ],
    };
    format!(" {}", parts.join(" "))
}
