extern crate clap;
extern crate env_logger;
#[macro_use]
extern crate log;
extern crate shlex;
extern crate vsp;

use std::fs::File;
use std::io::{self, Write};
use std::{env, process};

use clap::Parser;
use color_eyre::eyre::Result;
use env_logger::{Env, Target};

use vsp::helper::launcher::Editor;
use vsp::helper::store::{self, RecentStore};
use vsp::helper::uri::HostOs;
use vsp::prelude::*;
use vsp::tui::TerminalError;

fn parse_args() -> PickerOptions {
    let mut args = Vec::new();

    args.push(env::args().next().unwrap_or_else(|| String::from("vsp")));
    args.extend(
        env::var("VSP_DEFAULT_OPTIONS")
            .ok()
            .and_then(|val| shlex::split(&val))
            .unwrap_or_default(),
    );
    args.extend(env::args().skip(1));

    PickerOptions::parse_from(args).build()
}

/// Logs go to `--log-file` when given, never to the screen the picker draws on
fn init_logger(opts: &PickerOptions) -> io::Result<()> {
    let mut builder = match &opts.log_file {
        Some(path) => {
            let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("debug"));
            builder.target(Target::Pipe(Box::new(File::create(path)?)));
            builder
        }
        None => env_logger::Builder::from_env(Env::default().default_filter_or("off")),
    };
    builder.format_timestamp_nanos().init();
    Ok(())
}

//------------------------------------------------------------------------------
fn main() {
    let opts = parse_args();
    if let Err(err) = init_logger(&opts) {
        eprintln!("vsp: cannot open the log file: {err}");
        process::exit(2);
    }
    if let Err(err) = color_eyre::install() {
        eprintln!("vsp: {err}");
    }

    match real_main(&opts) {
        Ok(exit_code) => process::exit(exit_code),
        Err(err) => {
            // downstream pipe closed while listing
            if err
                .downcast_ref::<io::Error>()
                .is_some_and(|e| e.kind() == io::ErrorKind::BrokenPipe)
            {
                process::exit(0)
            }
            if let Some(TerminalError::NoRawMode(_)) = err.downcast_ref::<TerminalError>() {
                eprintln!("vsp: {err}");
                eprintln!("vsp: run `vsp --list` to print the projects without the interactive picker");
                process::exit(2)
            }
            error!("fatal: {err:?}");
            eprintln!("vsp: {err:#}");
            process::exit(2)
        }
    }
}

fn real_main(opts: &PickerOptions) -> Result<i32> {
    let os = HostOs::detect();
    debug!("host: {os:?}");

    //------------------------------------------------------------------------------
    // project store
    let Some(db) = store::resolve_path(opts.db.as_deref(), os) else {
        eprintln!("vsp: cannot locate the editor's state database, use --db to point at it");
        return Ok(1);
    };
    let mut recent = match RecentStore::open(db.clone()) {
        Ok(recent) => recent,
        Err(err) => {
            eprintln!("vsp: {err}");
            return Ok(1);
        }
    };
    let items = recent.load(os)?;

    //------------------------------------------------------------------------------
    // list mode
    if opts.list {
        let mut stdout = io::stdout().lock();
        for item in &items {
            writeln!(stdout, "{} {}", item.kind.icon(), item.label())?;
            writeln!(stdout, "    {}", item.shown_path())?;
        }
        stdout.flush()?;
        return Ok(0);
    }

    if items.is_empty() {
        println!("No recent projects found in {}", db.display());
        return Ok(0);
    }

    //------------------------------------------------------------------------------
    // interactive
    let editor = match Editor::locate(opts.code.as_deref()) {
        Ok(editor) => editor,
        Err(err) => {
            eprintln!("vsp: {err}");
            return Ok(1);
        }
    };
    debug!("editor: {}", editor.program().display());

    let mut host = DesktopHost::new(recent, editor, os);
    let output = Picker::run(opts, items, &mut host)?;
    debug!(
        "session ended, accepted: {}, {} projects left",
        output.accepted,
        output.items.len()
    );
    Ok(0)
}
