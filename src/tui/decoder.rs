//! Turns raw terminal input into [`Event`]s.
//!
//! Decoding never fails: anything unknown or malformed is dropped and the caller simply
//! reads again. A single read may carry several key presses, so byte input decodes to a
//! list of events.

use super::event::{ConsoleRecord, Event, RawEvent};

const ESC: u8 = 0x1b;
const CTRL_C: u8 = 0x03;
const CTRL_D: u8 = 0x04;

const MOUSE_LEFT_BUTTON: u32 = 0x0001;
const MOUSE_WHEELED: u32 = 0x0004;

/// Decodes a stream of raw input units.
///
/// A multi-byte character cut by the end of one read is held back and completed by the
/// next one.
#[derive(Debug, Default)]
pub struct Decoder {
    pending: Vec<u8>,
}

impl Decoder {
    /// Creates a decoder with nothing pending
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes one raw input unit
    pub fn feed(&mut self, raw: &RawEvent) -> Vec<Event> {
        match raw {
            RawEvent::Bytes(bytes) => self.feed_bytes(bytes),
            RawEvent::Record(record) => decode_record(record).into_iter().collect(),
        }
    }

    /// Decodes a chunk of bytes, joined to whatever the previous chunk left unfinished
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Vec<Event> {
        let mut input = std::mem::take(&mut self.pending);
        input.extend_from_slice(bytes);
        let keep = incomplete_utf8_tail(&input);
        self.pending = input.split_off(input.len() - keep);
        if !self.pending.is_empty() {
            trace!("holding back {:?}", self.pending);
        }
        decode(&input)
    }
}

/// Length of the unfinished UTF-8 sequence at the end of `bytes`, 0 when there is none
pub(crate) fn incomplete_utf8_tail(bytes: &[u8]) -> usize {
    let start = bytes.len().saturating_sub(3);
    for i in (start..bytes.len()).rev() {
        let need = match bytes[i] {
            b if b & 0xc0 == 0x80 => continue,
            b if b & 0xe0 == 0xc0 => 2,
            b if b & 0xf0 == 0xe0 => 3,
            b if b & 0xf8 == 0xf0 => 4,
            _ => return 0,
        };
        let have = bytes.len() - i;
        return if have < need { have } else { 0 };
    }
    0
}

/// Decodes a chunk of bytes read from the terminal.
///
/// Ctrl-C and Ctrl-D win over everything else in the chunk.
pub fn decode(bytes: &[u8]) -> Vec<Event> {
    if bytes.contains(&CTRL_C) {
        return vec![Event::Interrupt];
    }
    if bytes.contains(&CTRL_D) {
        return vec![Event::EndOfInput];
    }

    let mut events = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        let (event, used) = decode_one(&bytes[pos..]);
        if let Some(event) = event {
            events.push(event);
        }
        pos += used.max(1);
    }
    trace!("decoded {:?} into {:?}", bytes, events);
    events
}

/// Decodes the event at the start of `bytes`, returning it with the number of bytes used
fn decode_one(bytes: &[u8]) -> (Option<Event>, usize) {
    match bytes[0] {
        ESC => decode_escape(bytes),
        b'\r' | b'\n' => (Some(Event::Enter), 1),
        b'\t' => (Some(Event::Tab), 1),
        0x7f | 0x08 => (Some(Event::Backspace), 1),
        b if b < 0x20 => (None, 1),
        _ => decode_utf8(bytes),
    }
}

fn decode_utf8(bytes: &[u8]) -> (Option<Event>, usize) {
    let len = match bytes[0] {
        b if b < 0x80 => 1,
        b if b & 0xe0 == 0xc0 => 2,
        b if b & 0xf0 == 0xe0 => 3,
        b if b & 0xf8 == 0xf0 => 4,
        _ => return (None, 1),
    };
    let Some(chunk) = bytes.get(..len) else {
        return (None, 1);
    };
    match std::str::from_utf8(chunk).ok().and_then(|s| s.chars().next()) {
        Some(c) if !c.is_control() => (Some(Event::Printable(c)), len),
        _ => (None, 1),
    }
}

fn decode_escape(bytes: &[u8]) -> (Option<Event>, usize) {
    match bytes.get(1) {
        None => (Some(Event::Escape), 1),
        // escape pressed twice in a row
        Some(&ESC) => (Some(Event::Escape), 1),
        Some(b'[') => decode_csi(bytes),
        Some(b'O') => decode_ss3(bytes),
        // alt-modified key
        Some(_) => (None, 2),
    }
}

/// `ESC O <final>`
fn decode_ss3(bytes: &[u8]) -> (Option<Event>, usize) {
    match bytes.get(2) {
        Some(&final_byte) => (letter_event(final_byte), 3),
        None => (None, 2),
    }
}

fn letter_event(final_byte: u8) -> Option<Event> {
    match final_byte {
        b'A' => Some(Event::Up),
        b'B' => Some(Event::Down),
        b'C' => Some(Event::Right),
        b'D' => Some(Event::Left),
        b'H' => Some(Event::Home),
        b'F' => Some(Event::End),
        _ => None,
    }
}

fn tilde_event(code: &str) -> Option<Event> {
    match code {
        "1" | "7" => Some(Event::Home),
        "3" => Some(Event::Delete),
        "4" | "8" => Some(Event::End),
        "5" => Some(Event::PageUp),
        "6" => Some(Event::PageDown),
        _ => None,
    }
}

/// `ESC [ <params> <final>`, where the final byte is in `0x40..=0x7e`
fn decode_csi(bytes: &[u8]) -> (Option<Event>, usize) {
    let body = &bytes[2..];
    let Some(end) = body.iter().position(|b| (0x40..=0x7e).contains(b)) else {
        debug!("unterminated CSI sequence {:?}", bytes);
        return (None, bytes.len());
    };
    let used = 2 + end + 1;
    let params = String::from_utf8_lossy(&body[..end]);
    let final_byte = body[end];

    if let Some(mouse) = params.strip_prefix('<') {
        return (decode_sgr_mouse(mouse, final_byte), used);
    }

    let event = match final_byte {
        // modifiers such as `1;5` are not told apart
        b'~' => tilde_event(params.split(';').next().unwrap_or_default()),
        b => letter_event(b),
    };
    (event, used)
}

/// SGR mouse report body `button;x;y` with `M` (press) or `m` (release) as final byte
fn decode_sgr_mouse(params: &str, final_byte: u8) -> Option<Event> {
    let fields: Vec<u16> = params.split(';').map(|f| f.parse().ok()).collect::<Option<_>>()?;
    let [button, x, y] = fields[..] else {
        return None;
    };
    match (button, final_byte) {
        (0, b'M') => Some(Event::MouseClick(x, y)),
        (64, _) => Some(Event::MouseWheelUp),
        (65, _) => Some(Event::MouseWheelDown),
        _ => None,
    }
}

/// Decodes a native console input record
pub fn decode_record(record: &ConsoleRecord) -> Option<Event> {
    match *record {
        ConsoleRecord::Key { key_down: false, .. } => None,
        ConsoleRecord::Key { virtual_key, ch, .. } => virtual_key_event(virtual_key).or_else(|| match ch? {
            '\x03' => Some(Event::Interrupt),
            '\x04' => Some(Event::EndOfInput),
            '\r' | '\n' => Some(Event::Enter),
            c if !c.is_control() => Some(Event::Printable(c)),
            _ => None,
        }),
        ConsoleRecord::Mouse {
            x,
            y,
            button_state,
            event_flags,
        } => {
            if event_flags & MOUSE_WHEELED != 0 {
                let delta = (button_state >> 16) as u16 as i16;
                Some(if delta > 0 {
                    Event::MouseWheelUp
                } else {
                    Event::MouseWheelDown
                })
            } else if button_state & MOUSE_LEFT_BUTTON != 0 && event_flags == 0 {
                let column = u16::try_from(x).ok()?.saturating_add(1);
                let row = u16::try_from(y).ok()?.saturating_add(1);
                Some(Event::MouseClick(column, row))
            } else {
                None
            }
        }
        ConsoleRecord::Other => None,
    }
}

fn virtual_key_event(code: u16) -> Option<Event> {
    match code {
        0x26 => Some(Event::Up),
        0x28 => Some(Event::Down),
        0x25 => Some(Event::Left),
        0x27 => Some(Event::Right),
        0x21 => Some(Event::PageUp),
        0x22 => Some(Event::PageDown),
        0x24 => Some(Event::Home),
        0x23 => Some(Event::End),
        0x2e => Some(Event::Delete),
        0x1b => Some(Event::Escape),
        0x0d => Some(Event::Enter),
        0x09 => Some(Event::Tab),
        0x08 => Some(Event::Backspace),
        _ => None,
    }
}
