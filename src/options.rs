//! Configuration options for the picker.
//!
//! This module provides the `PickerOptions` struct and builder, which say where the recent
//! projects come from, which editor opens them and how the interface looks.

use derive_builder::Builder;

/// vsp - pick a recently opened project
///
/// vsp lists the folders, files and workspaces the editor opened recently and lets you
/// filter, open, reveal or forget them from the terminal.
///
/// Extra default arguments can be given through the VSP_DEFAULT_OPTIONS environment variable.
#[derive(Builder, Debug, Clone, Default)]
#[builder(build_fn(name = "final_build"))]
#[builder(default)]
#[cfg_attr(feature = "cli", derive(clap::Parser))]
#[cfg_attr(
    feature = "cli",
    command(name = "vsp", args_override_self = true, verbatim_doc_comment, version, about)
)]
pub struct PickerOptions {
    //  --- Sources ---
    /// Editor executable
    ///
    /// Either a path or a command name looked up on PATH.
    /// Defaults to the first of code, code-insiders and codium found on PATH.
    #[cfg_attr(feature = "cli", arg(short, long, help_heading = "Sources"))]
    pub code: Option<String>,

    /// Path to the editor's state database (state.vscdb)
    ///
    /// `~` is expanded. Defaults to the per-OS location of the editor's global storage.
    #[cfg_attr(feature = "cli", arg(short, long, help_heading = "Sources"))]
    pub db: Option<String>,

    //  --- Interface ---
    /// List the projects and exit instead of starting the interactive picker
    #[cfg_attr(feature = "cli", arg(short, long, help_heading = "Interface"))]
    pub list: bool,

    /// Disable mouse
    #[cfg_attr(feature = "cli", arg(long, help_heading = "Interface"))]
    pub no_mouse: bool,

    /// Set color theme
    ///
    /// Format: [BASE][,COMPONENT:COLOR[:ATTR1:ATTR2:..]]
    /// BASE is one of 16 (default), dark, bw, none.
    /// COLOR is an ANSI index or #rrggbb, ATTR one of bold, dim, italic, underlined, reverse.
    /// Example: `--color dark,pointer:#ff5f87:bold,folder_bg:22`
    #[cfg_attr(feature = "cli", arg(long, help_heading = "Interface", verbatim_doc_comment))]
    pub color: Option<String>,

    //  --- Debugging ---
    /// Pipe log output to a file
    #[cfg_attr(feature = "cli", arg(long, help_heading = "Debugging"))]
    pub log_file: Option<String>,
}

impl PickerOptionsBuilder {
    /// Builds the PickerOptions from the builder
    pub fn build(&mut self) -> Result<PickerOptions, PickerOptionsBuilderError> {
        self.final_build().map(|opts| opts.build())
    }
}

impl PickerOptions {
    /// Finalizes the options, trimming empty values
    pub fn build(mut self) -> Self {
        self.code = self.code.filter(|c| !c.trim().is_empty());
        self.db = self.db.filter(|d| !d.trim().is_empty());
        self.color = self.color.filter(|c| !c.trim().is_empty());
        self
    }
}
