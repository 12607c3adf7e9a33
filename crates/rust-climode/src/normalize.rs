//! Terminal output cleanup.
//!
//! Raw CLI output still carries the editing the device did on its own
//! screen: characters erased with backspace, lines rewritten in place after
//! a bare carriage return, ANSI colouring and the echo of the command that
//! was typed. The functions here undo that so callers see what a human
//! would have read on the terminal.

use std::borrow::Cow;

const BACKSPACE: char = '\x08';

/// Clean up raw command output until nothing changes any more.
///
/// Each round performs one [`erase_first_backspace`] and then one
/// [`collapse_first_overwrite`]. The two rewrites do not commute when
/// backspaces meet carriage returns, so the rounds keep that order.
#[must_use]
pub fn normalize_output(text: &str) -> String {
    if !text.contains([BACKSPACE, '\r']) {
        return text.to_string();
    }

    let mut screen = Screen::new(text);
    // Neither step can match before its cursor.
    let mut erase_at = Screen::HEAD;
    let mut collapse_at = Screen::HEAD;
    loop {
        let erased = screen.erase(&mut erase_at);
        if let Some(seam) = erased {
            collapse_at = collapse_at.min(seam);
        }
        let collapsed = screen.collapse(&mut collapse_at);
        if let Some(seam) = collapsed {
            erase_at = erase_at.min(seam);
        }
        if erased.is_none() && collapsed.is_none() {
            return screen.to_string();
        }
    }
}

/// Remove the first character that is directly followed by a backspace.
///
/// A backspace with nothing left to erase is kept, so `"\x08x"` is
/// returned unchanged.
#[must_use]
pub fn erase_first_backspace(text: &str) -> Cow<'_, str> {
    if !text.contains(BACKSPACE) {
        return Cow::Borrowed(text);
    }
    let mut screen = Screen::new(text);
    let mut cursor = Screen::HEAD;
    match screen.erase(&mut cursor) {
        Some(_) => Cow::Owned(screen.to_string()),
        None => Cow::Borrowed(text),
    }
}

/// Undo the first in-place line rewrite.
///
/// Finds the first carriage return followed by more text on the same line
/// and drops it together with everything before it on that line. Carriage
/// returns that end a line (as in `\r\n`) are left alone.
#[must_use]
pub fn collapse_first_overwrite(text: &str) -> Cow<'_, str> {
    if !text.contains('\r') {
        return Cow::Borrowed(text);
    }
    let mut screen = Screen::new(text);
    let mut cursor = Screen::HEAD;
    match screen.collapse(&mut cursor) {
        Some(_) => Cow::Owned(screen.to_string()),
        None => Cow::Borrowed(text),
    }
}

const fn ends_line(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Characters linked in text order so removals do not shift the rest.
///
/// Slot 0 is a head sentinel; slot `i` holds the `i`-th character. Slot
/// numbers only grow along the list, so comparing them compares positions.
struct Screen {
    chars: Vec<char>,
    next: Vec<usize>,
    prev: Vec<usize>,
}

impl Screen {
    const HEAD: usize = 0;

    fn new(text: &str) -> Self {
        let chars: Vec<char> = std::iter::once('\0').chain(text.chars()).collect();
        let len = chars.len();
        Self {
            chars,
            next: (1..=len).collect(),
            prev: std::iter::once(Self::HEAD).chain(0..len - 1).collect(),
        }
    }

    fn end(&self) -> usize {
        self.chars.len()
    }

    /// Detach the slots `first..=last` and return the one before them.
    fn unlink(&mut self, first: usize, last: usize) -> usize {
        let before = self.prev[first];
        let after = self.next[last];
        self.next[before] = after;
        if after != self.end() {
            self.prev[after] = before;
        }
        before
    }

    /// Erase the first character followed by a backspace, scanning from
    /// `cursor`. Returns the slot before the removed pair.
    fn erase(&mut self, cursor: &mut usize) -> Option<usize> {
        let mut at = *cursor;
        loop {
            let next = self.next[at];
            if next == self.end() {
                *cursor = at;
                return None;
            }
            if at != Self::HEAD && self.chars[at] != BACKSPACE && self.chars[next] == BACKSPACE {
                let seam = self.unlink(at, next);
                *cursor = seam;
                return Some(seam);
            }
            at = next;
        }
    }

    /// Drop the line prefix up to the first carriage return that has text
    /// after it, scanning from `cursor`. Returns the slot before the prefix.
    fn collapse(&mut self, cursor: &mut usize) -> Option<usize> {
        let mut at = *cursor;
        loop {
            let next = self.next[at];
            if next == self.end() {
                *cursor = at;
                return None;
            }
            if at != Self::HEAD && self.chars[at] == '\r' && !ends_line(self.chars[next]) {
                let mut start = at;
                loop {
                    let before = self.prev[start];
                    if before == Self::HEAD || ends_line(self.chars[before]) {
                        break;
                    }
                    start = before;
                }
                let seam = self.unlink(start, at);
                *cursor = seam;
                return Some(seam);
            }
            at = next;
        }
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use std::fmt::Write;

        let mut at = self.next[Self::HEAD];
        while at != self.end() {
            f.write_char(self.chars[at])?;
            at = self.next[at];
        }
        Ok(())
    }
}

/// Strip ANSI escape sequences from text.
///
/// Removes CSI, OSC, character set designation and two-byte escapes.
#[must_use]
pub fn strip_ansi(text: &str) -> Cow<'_, str> {
    if !text.contains('\x1b') {
        return Cow::Borrowed(text);
    }

    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\x1b' {
            result.push(c);
            continue;
        }
        let Some(&next) = chars.peek() else {
            continue;
        };
        match next {
            '[' => {
                // CSI: ESC [ params final
                chars.next();
                while let Some(param) = chars.next() {
                    if param.is_ascii_alphabetic() || param == '@' || param == '`' {
                        break;
                    }
                }
            }
            ']' => {
                // OSC: ESC ] ... BEL or ST
                chars.next();
                while let Some(osc) = chars.next() {
                    if osc == '\x07' {
                        break;
                    }
                    if osc == '\x1b' {
                        if chars.peek() == Some(&'\\') {
                            chars.next();
                        }
                        break;
                    }
                }
            }
            '(' | ')' | '*' | '+' => {
                chars.next();
                chars.next();
            }
            _ if next.is_ascii_uppercase() || next == '=' || next == '>' => {
                chars.next();
            }
            _ => {}
        }
    }

    Cow::Owned(result)
}

/// Drop the device's echo of `command` from the start of `output`.
///
/// The command's trailing line terminators are ignored when comparing.
/// After the echo, spaces followed by the first run of line breaks are
/// dropped too. Output that does not start with the command is returned
/// unchanged.
#[must_use]
pub fn remove_echo(output: &str, command: &str) -> String {
    let head = command.trim_end_matches(['\r', '\n']);
    let Some(rest) = output.strip_prefix(head) else {
        return output.to_string();
    };
    let after_spaces = rest.trim_start_matches(' ');
    if after_spaces.starts_with(['\r', '\n']) {
        after_spaces.trim_start_matches(['\r', '\n']).to_string()
    } else {
        rest.to_string()
    }
}
