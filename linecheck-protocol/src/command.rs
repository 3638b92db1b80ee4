//! Host command decoding
//!
//! Commands arrive as text lines. Any of `\r`, `\n` or `\r\n` ends a line;
//! empty lines are skipped. Lines longer than [`MAX_COMMAND_LEN`] are
//! dropped up to the next terminator.

use heapless::Vec;

/// Longest accepted command line, in bytes, excluding the terminator
pub const MAX_COMMAND_LEN: usize = 64;

/// Most commands one call to [`LineParser::feed_packet`] can return
///
/// A command completes only on a terminator byte, so a packet of this many
/// bytes (a full-speed USB bulk packet) completes at most this many.
pub const MAX_PACKET_COMMANDS: usize = 64;

/// Commands completed by one packet, in arrival order
pub type CommandBatch = Vec<Command, MAX_PACKET_COMMANDS>;

/// Commands accepted from the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Start a test run, same as a button activation
    Start,
    /// Put the Target into its firmware update mode (double reset pulse)
    Flash,
}

/// Errors reported while splitting the byte stream into lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError {
    /// Line exceeded [`MAX_COMMAND_LEN`]; the rest of it is discarded
    Overflow,
}

/// Match a single line against the command vocabulary
///
/// Surrounding whitespace is ignored and matching is case-insensitive.
/// Returns `None` for anything outside the vocabulary.
pub fn parse_command(line: &str) -> Option<Command> {
    let token = line.trim();
    if token.eq_ignore_ascii_case("start") {
        Some(Command::Start)
    } else if token.eq_ignore_ascii_case("flash") || token.eq_ignore_ascii_case("dfu") {
        Some(Command::Flash)
    } else {
        None
    }
}

/// Incremental line splitter for the host command stream
#[derive(Debug, Clone, Default)]
pub struct LineParser {
    buffer: Vec<u8, MAX_COMMAND_LEN>,
    /// Set after an overflow until the next terminator
    discarding: bool,
}

impl LineParser {
    /// Create a new line parser
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            discarding: false,
        }
    }

    /// Reset the parser state
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.discarding = false;
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Ok(Some(cmd))` when a terminator completes a recognised
    /// command, `Ok(None)` when more bytes are needed or the line was not a
    /// command, and `Err(LineError::Overflow)` once per over-long line.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Command>, LineError> {
        if byte == b'\n' || byte == b'\r' {
            let command = if self.discarding {
                None
            } else {
                core::str::from_utf8(&self.buffer)
                    .ok()
                    .and_then(parse_command)
            };
            self.reset();
            return Ok(command);
        }

        if self.discarding {
            return Ok(None);
        }

        if self.buffer.push(byte).is_err() {
            self.buffer.clear();
            self.discarding = true;
            return Err(LineError::Overflow);
        }
        Ok(None)
    }

    /// Feed multiple bytes to the parser
    ///
    /// Calls `on_command` for every command completed by `bytes`, in arrival
    /// order. Returns the number of overflowed lines seen.
    pub fn feed_bytes<F: FnMut(Command)>(&mut self, bytes: &[u8], mut on_command: F) -> usize {
        let mut overflows = 0;
        for &byte in bytes {
            match self.feed(byte) {
                Ok(Some(command)) => on_command(command),
                Ok(None) => {}
                Err(LineError::Overflow) => overflows += 1,
            }
        }
        overflows
    }

    /// Feed one packet and collect every command it completes
    ///
    /// Lets the caller hand commands on with backpressure after the parse,
    /// instead of from inside a callback. `bytes` longer than
    /// [`MAX_PACKET_COMMANDS`] are parsed in full but may lose commands past
    /// the batch capacity. Returns the batch and the overflowed line count.
    pub fn feed_packet(&mut self, bytes: &[u8]) -> (CommandBatch, usize) {
        let mut batch = CommandBatch::new();
        let overflows = self.feed_bytes(bytes, |command| {
            let _ = batch.push(command);
        });
        (batch, overflows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(parser: &mut LineParser, bytes: &[u8]) -> Vec<Command, 8> {
        let mut out = Vec::new();
        parser.feed_bytes(bytes, |cmd| {
            let _ = out.push(cmd);
        });
        out
    }

    #[test]
    fn test_parse_vocabulary() {
        assert_eq!(parse_command("START"), Some(Command::Start));
        assert_eq!(parse_command("start"), Some(Command::Start));
        assert_eq!(parse_command("  StArT \t"), Some(Command::Start));
        assert_eq!(parse_command("FLASH"), Some(Command::Flash));
        assert_eq!(parse_command("dfu"), Some(Command::Flash));
        assert_eq!(parse_command("Dfu "), Some(Command::Flash));
    }

    #[test]
    fn test_parse_unknown_is_ignored() {
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("STARTX"), None);
        assert_eq!(parse_command("st art"), None);
        assert_eq!(parse_command("reset"), None);
    }

    #[test]
    fn test_parser_needs_terminator() {
        let mut parser = LineParser::new();
        assert!(collect(&mut parser, b"START").is_empty());
        assert_eq!(collect(&mut parser, b"\n").as_slice(), &[Command::Start]);
    }

    #[test]
    fn test_parser_crlf_and_blank_lines() {
        let mut parser = LineParser::new();
        let cmds = collect(&mut parser, b"\r\n\r\nstart\r\nDFU\r\n");
        assert_eq!(cmds.as_slice(), &[Command::Start, Command::Flash]);
    }

    #[test]
    fn test_parser_keeps_arrival_order() {
        let mut parser = LineParser::new();
        let cmds = collect(&mut parser, b"flash\nnoise\nstart\nstart\n");
        assert_eq!(
            cmds.as_slice(),
            &[Command::Flash, Command::Start, Command::Start]
        );
    }

    #[test]
    fn test_parser_overflow_discards_line() {
        let mut parser = LineParser::new();
        let mut overflows = 0;
        for _ in 0..MAX_COMMAND_LEN {
            assert_eq!(parser.feed(b' '), Ok(None));
        }
        if parser.feed(b'x') == Err(LineError::Overflow) {
            overflows += 1;
        }
        // Tail of the long line is swallowed, including a command-like suffix
        for &b in b"start" {
            assert_eq!(parser.feed(b), Ok(None));
        }
        assert_eq!(parser.feed(b'\n'), Ok(None));
        assert_eq!(overflows, 1);

        // Next line parses normally
        assert_eq!(collect(&mut parser, b"start\n").as_slice(), &[Command::Start]);
    }

    #[test]
    fn test_parser_invalid_utf8_ignored() {
        let mut parser = LineParser::new();
        assert!(collect(&mut parser, &[0xFF, 0xFE, b'\n']).is_empty());
        assert_eq!(collect(&mut parser, b"FLASH\n").as_slice(), &[Command::Flash]);
    }

    #[test]
    fn test_packet_keeps_every_command() {
        let mut parser = LineParser::new();
        let (batch, overflows) = parser.feed_packet(b"dfu\ndfu\ndfu\ndfu\nstart\n");
        assert_eq!(overflows, 0);
        assert_eq!(
            batch.as_slice(),
            &[
                Command::Flash,
                Command::Flash,
                Command::Flash,
                Command::Flash,
                Command::Start
            ]
        );
    }

    #[test]
    fn test_full_packet_of_short_commands_fits() {
        let mut parser = LineParser::new();
        // Carried-over partial line completes on the packet's first byte
        assert!(parser.feed_packet(b"dfu").0.is_empty());

        let mut packet = std::vec::Vec::new();
        packet.push(b'\n');
        while packet.len() + 4 <= MAX_PACKET_COMMANDS {
            packet.extend_from_slice(b"dfu\n");
        }
        packet.extend_from_slice(b"sta");
        assert_eq!(packet.len(), MAX_PACKET_COMMANDS);

        let (batch, _) = parser.feed_packet(&packet);
        assert_eq!(batch.len(), 16);
        assert!(batch.iter().all(|c| *c == Command::Flash));

        // The split START arrives with the next packet
        let (batch, _) = parser.feed_packet(b"rt\n");
        assert_eq!(batch.as_slice(), &[Command::Start]);
    }

    proptest::proptest! {
        #[test]
        fn test_parser_never_panics(bytes in proptest::collection::vec(proptest::num::u8::ANY, 0..512)) {
            let mut parser = LineParser::new();
            parser.feed_bytes(&bytes, |_| {});
        }
    }
}
