use std::io::{self, Write};
use std::sync::Once;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::style::Print;
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};

use super::TerminalError;
use super::decoder::incomplete_utf8_tail;
use super::event::RawEvent;

static PANIC_HOOK_SET: Once = Once::new();

/// Blocking source of raw terminal input
pub trait InputSource {
    /// Waits for the next unit of input
    fn read_raw(&mut self) -> Result<RawEvent, TerminalError>;
}

/// Terminal handler for the picker.
///
/// Owns raw mode, the alternate screen and mouse reporting between [`Tui::start`] and
/// [`Tui::stop`]. Dropping the handler, or panicking while it is active, restores the
/// terminal.
pub struct Tui<W: Write = io::Stdout> {
    out: W,
    input: Box<dyn InputSource>,
    mouse: bool,
    active: bool,
    /// Whether the process terminal mode is ours to toggle
    owns_tty: bool,
    fixed_size: Option<(u16, u16)>,
}

impl Tui<io::Stdout> {
    /// Creates a handler on stdout, reading from the controlling terminal
    pub fn new(mouse: bool) -> Result<Self, TerminalError> {
        Ok(Self {
            out: io::stdout(),
            input: default_input()?,
            mouse,
            active: false,
            owns_tty: true,
            fixed_size: None,
        })
    }
}

impl<W: Write> Tui<W> {
    /// Creates a handler that never touches the process terminal, with a fixed size
    pub fn headless(out: W, input: Box<dyn InputSource>, rows: u16, cols: u16) -> Self {
        Self {
            out,
            input,
            mouse: true,
            active: false,
            owns_tty: false,
            fixed_size: Some((rows, cols)),
        }
    }

    /// Everything written so far
    pub fn writer(&self) -> &W {
        &self.out
    }

    /// Whether the terminal is in raw mode
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Enters raw mode, switches to the alternate screen, hides the cursor and enables
    /// mouse reporting. Does nothing when already started.
    pub fn start(&mut self) -> Result<(), TerminalError> {
        if self.active {
            return Ok(());
        }
        if self.owns_tty {
            terminal::enable_raw_mode().map_err(TerminalError::NoRawMode)?;
            set_panic_hook();
        }
        self.active = true;
        queue!(self.out, EnterAlternateScreen, Hide)?;
        if self.mouse {
            queue!(self.out, EnableMouseCapture)?;
        }
        self.out.flush()?;
        debug!("terminal started (mouse: {})", self.mouse);
        Ok(())
    }

    /// Restores the terminal. Every step runs even if a previous one failed.
    pub fn stop(&mut self) -> Result<(), TerminalError> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        let screen = self.leave_screen();
        let mode = if self.owns_tty {
            terminal::disable_raw_mode()
        } else {
            Ok(())
        };
        debug!("terminal stopped");
        screen.and(mode).map_err(TerminalError::from)
    }

    fn leave_screen(&mut self) -> io::Result<()> {
        if self.mouse {
            queue!(self.out, DisableMouseCapture)?;
        }
        queue!(self.out, Show, LeaveAlternateScreen)?;
        self.out.flush()
    }

    /// Current `(rows, cols)`, queried every time
    pub fn size(&self) -> Result<(u16, u16), TerminalError> {
        match self.fixed_size {
            Some(size) => Ok(size),
            None => {
                let (cols, rows) = terminal::size()?;
                Ok((rows, cols))
            }
        }
    }

    /// Blocks until the next unit of input
    pub fn read_event(&mut self) -> Result<RawEvent, TerminalError> {
        self.input.read_raw()
    }

    /// Moves the cursor to the 1-based `(row, col)`
    pub fn goto(&mut self, row: u16, col: u16) -> Result<(), TerminalError> {
        queue!(self.out, MoveTo(col.saturating_sub(1), row.saturating_sub(1)))?;
        Ok(())
    }

    /// Clears the line under the cursor
    pub fn clear_line(&mut self) -> Result<(), TerminalError> {
        queue!(self.out, Clear(ClearType::CurrentLine))?;
        Ok(())
    }

    /// Writes text at the cursor
    pub fn write(&mut self, text: &str) -> Result<(), TerminalError> {
        queue!(self.out, Print(text))?;
        Ok(())
    }

    /// Flushes queued output
    pub fn flush(&mut self) -> Result<(), TerminalError> {
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> Drop for Tui<W> {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Puts the terminal back in a usable state, ignoring any error
pub fn restore() {
    let _ = execute!(io::stdout(), DisableMouseCapture, Show, LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
}

fn set_panic_hook() {
    PANIC_HOOK_SET.call_once(|| {
        let hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            restore(); // ignore any errors as we are already failing
            hook(panic_info);
        }));
    });
}

/// Picks the input backend for this platform
fn default_input() -> Result<Box<dyn InputSource>, TerminalError> {
    #[cfg(unix)]
    {
        Ok(Box::new(unix::TtyInput::open().map_err(TerminalError::NoRawMode)?))
    }
    #[cfg(windows)]
    {
        Ok(Box::new(console::ConsoleInput::open()?))
    }
    #[cfg(not(any(unix, windows)))]
    {
        Err(TerminalError::Unsupported)
    }
}

/// Whether `bytes` stops in the middle of an escape sequence or of a UTF-8 character
fn ends_mid_sequence(bytes: &[u8]) -> bool {
    if incomplete_utf8_tail(bytes) > 0 {
        return true;
    }
    let Some(start) = bytes.iter().rposition(|&b| b == 0x1b) else {
        return false;
    };
    match &bytes[start + 1..] {
        [] | [b'['] | [b'O'] => true,
        [b'[', rest @ ..] => !rest.iter().any(|b| (0x40..=0x7e).contains(b)),
        _ => false,
    }
}

#[cfg(unix)]
mod unix {
    use std::fs::{File, OpenOptions};
    use std::io::{self, IsTerminal, Read};
    use std::os::fd::AsFd;

    use nix::poll::{PollFd, PollFlags, poll};

    use super::{InputSource, ends_mid_sequence};
    use crate::tui::TerminalError;
    use crate::tui::event::RawEvent;

    /// How long to wait for the rest of an escape sequence, in milliseconds
    const ESCAPE_WAIT_MS: u16 = 25;

    /// Byte input from the controlling terminal
    pub struct TtyInput {
        file: File,
        at_eof: bool,
    }

    impl TtyInput {
        /// Reads from stdin when it is a terminal, from /dev/tty otherwise
        pub fn open() -> io::Result<Self> {
            let stdin = io::stdin();
            let file = if stdin.is_terminal() {
                File::from(stdin.as_fd().try_clone_to_owned()?)
            } else {
                OpenOptions::new().read(true).open("/dev/tty")?
            };
            Ok(Self { file, at_eof: false })
        }

        fn read_retrying(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            loop {
                match self.file.read(buf) {
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    res => return res,
                }
            }
        }

        fn readable_soon(&self) -> bool {
            let mut fds = [PollFd::new(self.file.as_fd(), PollFlags::POLLIN)];
            matches!(poll(&mut fds, ESCAPE_WAIT_MS), Ok(n) if n > 0)
        }
    }

    impl InputSource for TtyInput {
        fn read_raw(&mut self) -> Result<RawEvent, TerminalError> {
            let mut buf = [0u8; 256];
            let n = self.read_retrying(&mut buf)?;
            if n == 0 {
                if self.at_eof {
                    return Err(TerminalError::InputClosed);
                }
                self.at_eof = true;
                return Ok(RawEvent::Bytes(vec![0x04]));
            }
            self.at_eof = false;

            let mut bytes = buf[..n].to_vec();
            while ends_mid_sequence(&bytes) && self.readable_soon() {
                let more = self.read_retrying(&mut buf)?;
                if more == 0 {
                    break;
                }
                bytes.extend_from_slice(&buf[..more]);
            }
            Ok(RawEvent::Bytes(bytes))
        }
    }
}

#[cfg(windows)]
mod console {
    use std::io;

    use windows::Win32::Foundation::HANDLE;
    use windows::Win32::System::Console::{
        GetStdHandle, INPUT_RECORD, KEY_EVENT, MOUSE_EVENT, ReadConsoleInputW, STD_INPUT_HANDLE,
    };

    use super::InputSource;
    use crate::tui::TerminalError;
    use crate::tui::event::{ConsoleRecord, RawEvent};

    /// Native console input records
    pub struct ConsoleInput {
        handle: HANDLE,
        high_surrogate: Option<u16>,
    }

    impl ConsoleInput {
        pub fn open() -> Result<Self, TerminalError> {
            let handle =
                unsafe { GetStdHandle(STD_INPUT_HANDLE) }.map_err(|e| TerminalError::NoRawMode(io::Error::other(e)))?;
            Ok(Self {
                handle,
                high_surrogate: None,
            })
        }
    }

    impl InputSource for ConsoleInput {
        fn read_raw(&mut self) -> Result<RawEvent, TerminalError> {
            let mut records = [INPUT_RECORD::default(); 1];
            let mut read = 0u32;
            while read == 0 {
                unsafe { ReadConsoleInputW(self.handle, &mut records, &mut read) }.map_err(io::Error::other)?;
            }
            Ok(RawEvent::Record(self.convert(&records[0])))
        }
    }

    impl ConsoleInput {
        fn convert(&mut self, record: &INPUT_RECORD) -> ConsoleRecord {
            let kind = u32::from(record.EventType);
            if kind == KEY_EVENT as u32 {
                let key = unsafe { record.Event.KeyEvent };
                let unit = unsafe { key.uChar.UnicodeChar };
                let key_down = key.bKeyDown.as_bool();
                if key_down && (0xd800..0xdc00).contains(&unit) {
                    self.high_surrogate = Some(unit);
                    return ConsoleRecord::Other;
                }
                ConsoleRecord::Key {
                    key_down,
                    virtual_key: key.wVirtualKeyCode,
                    ch: self.join_unit(unit, key_down),
                }
            } else {
                convert_other(record)
            }
        }

        /// Pairs a low surrogate with the high one seen on the previous key press
        fn join_unit(&mut self, unit: u16, key_down: bool) -> Option<char> {
            if !key_down {
                return char::from_u32(u32::from(unit)).filter(|&c| c != '\0');
            }
            let units = match self.high_surrogate.take() {
                Some(high) => vec![high, unit],
                None => vec![unit],
            };
            char::decode_utf16(units).last()?.ok().filter(|&c| c != '\0')
        }
    }

    fn convert_other(record: &INPUT_RECORD) -> ConsoleRecord {
        let kind = u32::from(record.EventType);
        if kind == MOUSE_EVENT as u32 {
            let mouse = unsafe { record.Event.MouseEvent };
            ConsoleRecord::Mouse {
                x: mouse.dwMousePosition.X,
                y: mouse.dwMousePosition.Y,
                button_state: mouse.dwButtonState,
                event_flags: mouse.dwEventFlags,
            }
        } else {
            ConsoleRecord::Other
        }
    }
}
