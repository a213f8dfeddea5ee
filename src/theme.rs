//! Handle the color theme
use crossterm::style::{Attribute, Color, ContentStyle, Stylize};

use crate::options::PickerOptions;

/// The color scheme of the picker
///
/// <pre>
/// +------------------------------------------+
/// | 📂 VSCode Projects  [1 selected] 2/9    |  --> title & selected_count & info
/// |----------------------------------------- |  --> border
/// | ❯ query_                                 |  --> prompt & query_cursor
/// |----------------------------------------- |
/// | ❯ [✓] 📁 api [SSH: box]  /srv          |  --> pointer & marked & folder & current & current_tag & current_path
/// |   [ ] 📄 notes.md        /home/me        |  --> unmarked & file & normal & path
/// |   [ ] 📁 old [invalid]   /tmp            |  --> invalid
/// |----------------------------------------- |
/// | Path: /srv/api                           |  --> info & location / message / warning
/// |----------------------------------------- |
/// | ↑↓ move │ Space select ...              |  --> key & key_accent & danger
/// +------------------------------------------+
/// </pre>
#[derive(Copy, Clone, Debug, Default)]
pub struct ColorTheme {
    /// Item names
    pub normal: ContentStyle,
    /// Name of the item under the cursor
    pub current: ContentStyle,
    /// Bracketed tag after a name
    pub tag: ContentStyle,
    /// Bracketed tag on the current line
    pub current_tag: ContentStyle,
    /// Path column
    pub path: ContentStyle,
    /// Path column on the current line
    pub current_path: ContentStyle,
    /// Items whose path no longer exists
    pub invalid: ContentStyle,
    /// Cursor/pointer (prefix of the current item)
    pub pointer: ContentStyle,
    /// Marker of selected items
    pub marked: ContentStyle,
    /// Marker of unselected items
    pub unmarked: ContentStyle,
    /// Folder icon
    pub folder: ContentStyle,
    /// File icon
    pub file: ContentStyle,
    /// Workspace icon
    pub workspace: ContentStyle,
    /// Title
    pub title: ContentStyle,
    /// Position counter, hints and labels
    pub info: ContentStyle,
    /// Selection counter
    pub selected_count: ContentStyle,
    /// Query prompt
    pub prompt: ContentStyle,
    /// Fake cursor at the end of the query
    pub query_cursor: ContentStyle,
    /// Horizontal rules
    pub border: ContentStyle,
    /// Status banner
    pub message: ContentStyle,
    /// Missing-path warning
    pub warning: ContentStyle,
    /// Full path of the current item
    pub location: ContentStyle,
    /// Keys in the help line
    pub key: ContentStyle,
    /// Highlighted keys in the help line
    pub key_accent: ContentStyle,
    /// Delete confirmation
    pub danger: ContentStyle,
}

impl ColorTheme {
    /// Setup the theme from the picker options
    pub fn init_from_options(options: &PickerOptions) -> ColorTheme {
        if let Some(color) = options.color.clone() {
            ColorTheme::from_options(&color)
        } else {
            // Check for NO_COLOR environment variable
            match std::env::var_os("NO_COLOR") {
                Some(no_color) if !no_color.is_empty() => ColorTheme::none(),
                _ => ColorTheme::default16(),
            }
        }
    }

    fn none() -> Self {
        let base = ContentStyle::new();
        Self {
            current: base.bold(),
            title: base.bold(),
            invalid: base.dim(),
            query_cursor: base.reverse(),
            ..ColorTheme::default()
        }
    }

    fn bw() -> Self {
        let base = ColorTheme::none();
        ColorTheme {
            current: base.current.reverse(),
            current_tag: base.current_tag.reverse(),
            pointer: base.pointer.bold(),
            marked: base.marked.bold(),
            key: base.key.bold(),
            key_accent: base.key_accent.bold().underlined(),
            danger: base.danger.bold().reverse(),
            message: base.message.bold(),
            ..base
        }
    }

    fn default16() -> Self {
        let base = ColorTheme::none();
        ColorTheme {
            normal: base.normal.grey(),
            current: base.current.white(),
            tag: base.tag.dark_cyan(),
            current_tag: base.current_tag.cyan(),
            path: base.path.dim(),
            current_path: base.current_path.dark_grey(),
            invalid: base.invalid.dark_grey(),
            pointer: base.pointer.cyan(),
            marked: base.marked.green(),
            unmarked: base.unmarked.dark_grey(),
            folder: base.folder.yellow(),
            file: base.file.blue(),
            workspace: base.workspace.magenta(),
            title: base.title.cyan(),
            info: base.info.dark_grey(),
            selected_count: base.selected_count.green(),
            prompt: base.prompt.green(),
            border: base.border.dark_grey(),
            message: base.message.yellow(),
            warning: base.warning.yellow(),
            location: base.location.cyan(),
            key: base.key.yellow(),
            key_accent: base.key_accent.green(),
            danger: base.danger.red(),
            ..base
        }
    }

    fn dark256() -> Self {
        let base = ColorTheme::none();
        ColorTheme {
            normal: base.normal.with(Color::AnsiValue(252)),
            current: base.current.with(Color::AnsiValue(255)),
            tag: base.tag.with(Color::AnsiValue(109)),
            current_tag: base.current_tag.with(Color::AnsiValue(110)),
            path: base.path.with(Color::AnsiValue(244)),
            current_path: base.current_path.with(Color::AnsiValue(246)),
            invalid: base.invalid.with(Color::AnsiValue(240)),
            pointer: base.pointer.with(Color::AnsiValue(161)),
            marked: base.marked.with(Color::AnsiValue(168)),
            unmarked: base.unmarked.with(Color::AnsiValue(240)),
            folder: base.folder.with(Color::AnsiValue(179)),
            file: base.file.with(Color::AnsiValue(110)),
            workspace: base.workspace.with(Color::AnsiValue(176)),
            title: base.title.with(Color::AnsiValue(110)),
            info: base.info.with(Color::AnsiValue(144)),
            selected_count: base.selected_count.with(Color::AnsiValue(148)),
            prompt: base.prompt.with(Color::AnsiValue(110)),
            border: base.border.with(Color::AnsiValue(59)),
            message: base.message.with(Color::AnsiValue(186)),
            warning: base.warning.with(Color::AnsiValue(214)),
            location: base.location.with(Color::AnsiValue(110)),
            key: base.key.with(Color::AnsiValue(179)),
            key_accent: base.key_accent.with(Color::AnsiValue(148)),
            danger: base.danger.with(Color::AnsiValue(161)),
            ..base
        }
    }

    fn set_color(&mut self, name: &str, spec: &str) {
        let spec_parts: Vec<_> = spec.split(&['+', ':']).collect();

        let raw_color = spec_parts[0];
        let new_color = if raw_color.starts_with('#') {
            parse_rgb(raw_color)
        } else {
            raw_color.parse::<u8>().ok().map(Color::AnsiValue)
        };
        if new_color.is_none() && !raw_color.is_empty() {
            debug!("Unknown color '{}'", raw_color);
        }

        let mut attributes = Vec::new();
        for part in spec_parts.iter().skip(1) {
            match *part {
                "b" | "bold" => attributes.push(Attribute::Bold),
                "u" | "underlined" => attributes.push(Attribute::Underlined),
                "d" | "dim" => attributes.push(Attribute::Dim),
                "i" | "italic" => attributes.push(Attribute::Italic),
                "r" | "reverse" => attributes.push(Attribute::Reverse),
                m => debug!("Unknown attribute '{m}'"),
            }
        }

        let (component_name, background) = match name.strip_suffix("_bg").or_else(|| name.strip_suffix("-bg")) {
            Some(component) => (component, true),
            None => (name, false),
        };

        let style = match component_name {
            "normal" | "fg" => &mut self.normal,
            "current" | "fg+" => &mut self.current,
            "tag" => &mut self.tag,
            "current_tag" | "tag+" => &mut self.current_tag,
            "path" => &mut self.path,
            "current_path" | "path+" => &mut self.current_path,
            "invalid" => &mut self.invalid,
            "pointer" | "cursor" => &mut self.pointer,
            "marker" | "selected" => &mut self.marked,
            "folder" => &mut self.folder,
            "file" => &mut self.file,
            "workspace" => &mut self.workspace,
            "title" | "header" => &mut self.title,
            "info" => &mut self.info,
            "prompt" => &mut self.prompt,
            "border" => &mut self.border,
            "message" => &mut self.message,
            "key" => &mut self.key,
            t => {
                debug!("Unknown theme component '{t}'");
                return;
            }
        };
        set_style(style, background, new_color, &attributes);
    }

    fn from_options(color: &str) -> Self {
        let mut theme = ColorTheme::default16();
        for pair in color.split(',') {
            if let Some((name, spec)) = pair.split_once(':') {
                theme.set_color(name, spec);
            } else {
                theme = match pair {
                    "16" | "default" | "default16" => ColorTheme::default16(),
                    "dark" | "256" | "dark256" => ColorTheme::dark256(),
                    "bw" => ColorTheme::bw(),
                    "none" | "empty" => ColorTheme::none(),
                    t => {
                        debug!("Unknown color theme '{t}'");
                        ColorTheme::default16()
                    }
                };
            }
        }
        theme
    }
}

/// `#rrggbb`
fn parse_rgb(raw: &str) -> Option<Color> {
    let hex = raw.strip_prefix('#').filter(|hex| hex.len() == 6)?;
    let channel = |at: usize| {
        hex.get(at..at + 2)
            .filter(|pair| pair.bytes().all(|b| b.is_ascii_hexdigit()))
            .and_then(|pair| u8::from_str_radix(pair, 16).ok())
    };
    Some(Color::Rgb {
        r: channel(0)?,
        g: channel(2)?,
        b: channel(4)?,
    })
}

fn set_style(style: &mut ContentStyle, background: bool, color: Option<Color>, attributes: &[Attribute]) {
    if let Some(c) = color {
        if background {
            style.background_color = Some(c);
        } else {
            style.foreground_color = Some(c);
        }
    }
    for attribute in attributes {
        style.attributes.set(*attribute);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_base_themes() {
        let none = ColorTheme::none();
        assert!(none.title.attributes.has(Attribute::Bold));
        assert!(none.query_cursor.attributes.has(Attribute::Reverse));
        assert_eq!(none.normal.foreground_color, None);

        let bw = ColorTheme::bw();
        assert!(bw.current.attributes.has(Attribute::Reverse));
        assert_eq!(bw.key.foreground_color, None);

        let theme_16 = ColorTheme::default16();
        assert_eq!(theme_16.folder.foreground_color, Some(Color::Yellow));
        assert_eq!(theme_16.folder.background_color, None);

        let dark = ColorTheme::dark256();
        assert_eq!(dark.pointer.foreground_color, Some(Color::AnsiValue(161)));
    }

    #[test]
    fn test_component_overrides() {
        let theme = ColorTheme::from_options("bw,pointer:#ff0000:bold,folder_bg:22");
        assert_eq!(
            theme.pointer.foreground_color,
            Some(Color::Rgb { r: 255, g: 0, b: 0 })
        );
        assert!(theme.pointer.attributes.has(Attribute::Bold));
        assert_eq!(theme.folder.background_color, Some(Color::AnsiValue(22)));
        assert!(theme.current.attributes.has(Attribute::Reverse));
    }

    #[test]
    fn test_theme_names() {
        let dark = ColorTheme::from_options("dark256");
        assert_eq!(dark.pointer.foreground_color, Some(Color::AnsiValue(161)));
        let theme_16 = ColorTheme::from_options("dark256,default16");
        assert_eq!(theme_16.folder.foreground_color, Some(Color::Yellow));
    }

    #[test]
    fn test_malformed_colors_are_skipped() {
        // multi-byte text where the hex digits should be
        let theme = ColorTheme::from_options("bw,pointer:#é12345,folder:#ffgg00:bold,file:#12,title:#0a0B0c");
        assert_eq!(theme.pointer.foreground_color, None);
        assert_eq!(theme.folder.foreground_color, None);
        assert!(theme.folder.attributes.has(Attribute::Bold));
        assert_eq!(theme.file.foreground_color, None);
        assert_eq!(
            theme.title.foreground_color,
            Some(Color::Rgb { r: 10, g: 11, b: 12 })
        );
        assert_eq!(parse_rgb("#中文"), None);
        assert_eq!(parse_rgb("#+1+2+3"), None);
    }

    #[test]
    fn test_unknown_theme_falls_back() {
        let theme = ColorTheme::from_options("solarized");
        assert_eq!(theme.folder.foreground_color, Some(Color::Yellow));
    }

    #[test]
    #[serial]
    fn test_no_color_env() {
        let options = PickerOptions::default();
        unsafe { std::env::set_var("NO_COLOR", "1") };
        let theme = ColorTheme::init_from_options(&options);
        unsafe { std::env::remove_var("NO_COLOR") };
        assert_eq!(theme.folder.foreground_color, None);

        let theme = ColorTheme::init_from_options(&options);
        assert_eq!(theme.folder.foreground_color, Some(Color::Yellow));
    }
}
