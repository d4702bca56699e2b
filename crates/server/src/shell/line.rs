//! Minimal line editor for raw-mode terminals.
//!
//! SSH clients that request a pty send keystrokes one at a time and expect
//! the server to echo them. [`LineEditor`] turns that byte stream into whole
//! lines and produces the echo bytes to send back.

/// Something the editor recognised in the input stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    /// A complete line, without its terminator.
    Line(String),
    /// Ctrl-D on an empty line.
    Eof,
    /// Ctrl-C.
    Interrupt,
}

/// Result of feeding one byte.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Feed {
    /// Bytes to echo back to the client.
    pub echo: Vec<u8>,
    /// Completed event, if any.
    pub event: Option<LineEvent>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum Escape {
    #[default]
    None,
    Start,
    Csi,
}

const CTRL_C: u8 = 0x03;
const CTRL_D: u8 = 0x04;
const BACKSPACE: u8 = 0x08;
const ESC: u8 = 0x1b;
const DELETE: u8 = 0x7f;

/// Accumulates bytes into lines.
#[derive(Debug, Default)]
pub struct LineEditor {
    buf: Vec<u8>,
    escape: Escape,
    last_was_cr: bool,
}

impl LineEditor {
    /// Longest line the editor will hold, in bytes. Further input is dropped
    /// until the line is finished.
    pub const MAX_LINE: usize = 4096;

    /// Create an empty editor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one input byte.
    pub fn feed(&mut self, byte: u8) -> Feed {
        let after_cr = std::mem::take(&mut self.last_was_cr);

        match self.escape {
            Escape::Start => {
                self.escape = if byte == b'[' || byte == b'O' {
                    Escape::Csi
                } else {
                    Escape::None
                };
                return Feed::default();
            }
            Escape::Csi => {
                // Parameters and intermediates run until a final byte in 0x40..=0x7e.
                if (0x40..=0x7e).contains(&byte) {
                    self.escape = Escape::None;
                }
                return Feed::default();
            }
            Escape::None => {}
        }

        match byte {
            b'\r' => {
                self.last_was_cr = true;
                self.finish_line()
            }
            // CRLF from clients without a pty.
            b'\n' if after_cr => Feed::default(),
            b'\n' => self.finish_line(),
            CTRL_C => {
                self.buf.clear();
                Feed {
                    echo: Vec::new(),
                    event: Some(LineEvent::Interrupt),
                }
            }
            CTRL_D if self.buf.is_empty() => Feed {
                echo: Vec::new(),
                event: Some(LineEvent::Eof),
            },
            BACKSPACE | DELETE => self.erase(),
            ESC => {
                self.escape = Escape::Start;
                Feed::default()
            }
            b if b < 0x20 => Feed::default(),
            _ if self.buf.len() >= Self::MAX_LINE => Feed::default(),
            b => {
                self.buf.push(b);
                Feed {
                    echo: vec![b],
                    event: None,
                }
            }
        }
    }

    fn finish_line(&mut self) -> Feed {
        let bytes = std::mem::take(&mut self.buf);
        Feed {
            echo: b"\r\n".to_vec(),
            event: Some(LineEvent::Line(
                String::from_utf8_lossy(&bytes).into_owned(),
            )),
        }
    }

    /// Remove the last character, including every byte of a multi-byte one.
    fn erase(&mut self) -> Feed {
        if self.buf.is_empty() {
            return Feed::default();
        }
        while let Some(b) = self.buf.pop() {
            // Stop once a lead byte (anything but 0b10xx_xxxx) is removed.
            if b & 0xc0 != 0x80 {
                break;
            }
        }
        Feed {
            echo: b"\x08 \x08".to_vec(),
            event: None,
        }
    }
}

/// Convert bare `\n` to `\r\n` for a raw-mode terminal.
#[must_use]
pub fn to_crlf(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() + text.len() / 16);
    let mut prev = 0u8;
    for &b in text.as_bytes() {
        if b == b'\n' && prev != b'\r' {
            out.push(b'\r');
        }
        out.push(b);
        prev = b;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(editor: &mut LineEditor, input: &[u8]) -> (Vec<u8>, Vec<LineEvent>) {
        let mut echo = Vec::new();
        let mut events = Vec::new();
        for &b in input {
            let feed = editor.feed(b);
            echo.extend(feed.echo);
            events.extend(feed.event);
        }
        (echo, events)
    }

    #[test]
    fn test_line_with_echo() {
        let mut editor = LineEditor::new();
        let (echo, events) = feed_all(&mut editor, b"/help\r");
        assert_eq!(echo, b"/help\r\n");
        assert_eq!(events, [LineEvent::Line("/help".to_owned())]);
    }

    #[test]
    fn test_crlf_yields_one_line() {
        let mut editor = LineEditor::new();
        let (_, events) = feed_all(&mut editor, b"a\r\nb\n");
        assert_eq!(
            events,
            [
                LineEvent::Line("a".to_owned()),
                LineEvent::Line("b".to_owned())
            ]
        );
    }

    #[test]
    fn test_empty_lines() {
        let mut editor = LineEditor::new();
        let (_, events) = feed_all(&mut editor, b"\r\r");
        assert_eq!(
            events,
            [LineEvent::Line(String::new()), LineEvent::Line(String::new())]
        );
    }

    #[test]
    fn test_backspace() {
        let mut editor = LineEditor::new();
        let (echo, events) = feed_all(&mut editor, b"/cx\x7fart\r");
        assert!(echo.windows(3).any(|w| w == b"\x08 \x08"));
        assert_eq!(events, [LineEvent::Line("/cart".to_owned())]);
    }

    #[test]
    fn test_backspace_on_empty_line_is_silent() {
        let mut editor = LineEditor::new();
        let (echo, events) = feed_all(&mut editor, b"\x7f\x08");
        assert!(echo.is_empty());
        assert!(events.is_empty());
    }

    #[test]
    fn test_backspace_removes_whole_utf8_char() {
        let mut editor = LineEditor::new();
        let mut input = "caf\u{e9}".as_bytes().to_vec();
        input.extend_from_slice(b"\x7fe\r");
        let (_, events) = feed_all(&mut editor, &input);
        assert_eq!(events, [LineEvent::Line("cafe".to_owned())]);
    }

    #[test]
    fn test_ctrl_c_interrupts() {
        let mut editor = LineEditor::new();
        let (echo, events) = feed_all(&mut editor, b"abc\x03");
        assert_eq!(echo, b"abc");
        assert_eq!(events, [LineEvent::Interrupt]);
    }

    #[test]
    fn test_ctrl_d_only_on_empty_line() {
        let mut editor = LineEditor::new();
        let (_, events) = feed_all(&mut editor, b"ab\x04");
        assert!(events.is_empty());

        let mut editor = LineEditor::new();
        let (_, events) = feed_all(&mut editor, b"\x04");
        assert_eq!(events, [LineEvent::Eof]);
    }

    #[test]
    fn test_arrow_keys_are_swallowed() {
        let mut editor = LineEditor::new();
        let (echo, events) = feed_all(&mut editor, b"/he\x1b[A\x1b[1;5Dlp\r");
        assert_eq!(echo, b"/help\r\n");
        assert_eq!(events, [LineEvent::Line("/help".to_owned())]);
    }

    #[test]
    fn test_long_line_is_capped() {
        let mut editor = LineEditor::new();
        let mut input = vec![b'a'; 1_000_000];
        input.push(b'\r');
        let (echo, events) = feed_all(&mut editor, &input);

        let [LineEvent::Line(line)] = events.as_slice() else {
            panic!("expected one line, got {events:?}");
        };
        assert_eq!(line.len(), LineEditor::MAX_LINE);
        assert_eq!(echo.len(), LineEditor::MAX_LINE + 2);
    }

    #[test]
    fn test_editing_still_works_at_the_cap() {
        let mut editor = LineEditor::new();
        let mut input = vec![b'a'; LineEditor::MAX_LINE + 10];
        input.extend_from_slice(b"\x7fb\r");
        let (_, events) = feed_all(&mut editor, &input);

        let [LineEvent::Line(line)] = events.as_slice() else {
            panic!("expected one line, got {events:?}");
        };
        assert_eq!(line.len(), LineEditor::MAX_LINE);
        assert!(line.ends_with("ab"));

        let (_, events) = feed_all(&mut editor, b"/help\r");
        assert_eq!(events, [LineEvent::Line("/help".to_owned())]);
    }

    #[test]
    fn test_to_crlf() {
        assert_eq!(to_crlf("a\nb\r\nc"), b"a\r\nb\r\nc");
        assert_eq!(to_crlf("\n"), b"\r\n");
        assert_eq!(to_crlf("plain"), b"plain");
    }
}
