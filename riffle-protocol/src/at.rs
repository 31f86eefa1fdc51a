//! ESP-AT command encoding and response parsing
//!
//! Commands are plain text lines ending in CRLF. Responses are lines too,
//! except for two cases the parser handles specially:
//!
//! - `+IPD,<link>,<len>:` is followed by `len` raw bytes with no line end
//! - the `>` prompt after `AT+CIPSEND` has no line end

use core::fmt::Write;

use heapless::{String, Vec};

/// Maximum encoded command length (SSID and passphrase fully escaped)
pub const MAX_COMMAND_LEN: usize = 256;

/// Maximum response line length
pub const MAX_LINE_LEN: usize = 128;

/// Maximum `+IPD` payload kept; longer payloads are cut
pub const MAX_IPD_LEN: usize = 1024;

/// Maximum dotted-quad address length
pub const MAX_ADDRESS_LEN: usize = 15;

/// Errors from command encoding or response parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AtError {
    /// Encoded command does not fit the buffer
    CommandTooLong,
    /// Response line exceeded [`MAX_LINE_LEN`]; the line was dropped
    LineTooLong,
    /// `+IPD` header could not be parsed; the header was dropped
    BadIpdHeader,
}

/// Commands sent to the ESP-AT co-processor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtCommand<'a> {
    /// Attention, used to check the module answers
    Probe,
    /// Restart the module
    Reset,
    /// Stop echoing commands back
    EchoOff,
    /// Station (client) WiFi mode
    StationMode,
    /// Join an access point
    JoinAp { ssid: &'a str, password: &'a str },
    /// Query the station address
    QueryAddress,
    /// Allow multiple TCP links (needed for a server)
    MultiConnection,
    /// Start a TCP server
    StartServer { port: u16 },
    /// Start sending `len` bytes on a link
    Send { link: u8, len: u16 },
    /// Close a link
    Close { link: u8 },
}

impl AtCommand<'_> {
    /// Encode the command including the trailing CRLF
    pub fn encode(&self) -> Result<String<MAX_COMMAND_LEN>, AtError> {
        let mut out = String::new();
        self.write_to(&mut out).map_err(|_| AtError::CommandTooLong)?;
        Ok(out)
    }

    fn write_to(&self, out: &mut String<MAX_COMMAND_LEN>) -> core::fmt::Result {
        match self {
            AtCommand::Probe => out.write_str("AT")?,
            AtCommand::Reset => out.write_str("AT+RST")?,
            AtCommand::EchoOff => out.write_str("ATE0")?,
            AtCommand::StationMode => out.write_str("AT+CWMODE=1")?,
            AtCommand::JoinAp { ssid, password } => {
                out.write_str("AT+CWJAP=\"")?;
                write_escaped(out, ssid)?;
                out.write_str("\",\"")?;
                write_escaped(out, password)?;
                out.write_str("\"")?;
            }
            AtCommand::QueryAddress => out.write_str("AT+CIFSR")?,
            AtCommand::MultiConnection => out.write_str("AT+CIPMUX=1")?,
            AtCommand::StartServer { port } => write!(out, "AT+CIPSERVER=1,{}", port)?,
            AtCommand::Send { link, len } => write!(out, "AT+CIPSEND={},{}", link, len)?,
            AtCommand::Close { link } => write!(out, "AT+CIPCLOSE={}", link)?,
        }
        out.write_str("\r\n")
    }
}

/// Escape `"`, `,` and `\` in a quoted AT argument
fn write_escaped<W: Write>(out: &mut W, value: &str) -> core::fmt::Result {
    for c in value.chars() {
        if matches!(c, '"' | ',' | '\\') {
            out.write_char('\\')?;
        }
        out.write_char(c)?;
    }
    Ok(())
}

/// Responses and unsolicited messages from the module
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AtEvent {
    /// Module finished booting
    Ready,
    Ok,
    Error,
    Fail,
    /// Module is still processing the previous command
    Busy,
    /// Ready to receive the data of `AT+CIPSEND`
    SendPrompt,
    SendOk,
    SendFail,
    WifiConnected,
    WifiGotIp,
    WifiDisconnected,
    /// Join failed with an ESP-AT reason code
    JoinFailed(u8),
    /// Station address from `AT+CIFSR`
    Address(String<MAX_ADDRESS_LEN>),
    /// A client opened a link
    Connected(u8),
    /// A link was closed
    Closed(u8),
    /// Data received on a link
    Data { link: u8, payload: Vec<u8, MAX_IPD_LEN> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Collecting a response line
    Line,
    /// Reading the raw bytes of a `+IPD` message
    Payload { link: u8, remaining: usize },
}

/// Byte-fed response parser
#[derive(Debug, Clone)]
pub struct AtParser {
    state: ParseState,
    line: Vec<u8, MAX_LINE_LEN>,
    payload: Vec<u8, MAX_IPD_LEN>,
}

impl Default for AtParser {
    fn default() -> Self {
        Self::new()
    }
}

impl AtParser {
    pub fn new() -> Self {
        Self {
            state: ParseState::Line,
            line: Vec::new(),
            payload: Vec::new(),
        }
    }

    /// Reset the parser state
    pub fn reset(&mut self) {
        self.state = ParseState::Line;
        self.line.clear();
        self.payload.clear();
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Ok(Some(event))` when a response is complete, `Ok(None)`
    /// when more bytes are needed. Errors drop the partial line and the
    /// parser carries on with the next byte.
    pub fn feed(&mut self, byte: u8) -> Result<Option<AtEvent>, AtError> {
        match self.state {
            ParseState::Payload { link, remaining } => {
                // Bytes past capacity are dropped
                let _ = self.payload.push(byte);
                if remaining > 1 {
                    self.state = ParseState::Payload {
                        link,
                        remaining: remaining - 1,
                    };
                    return Ok(None);
                }
                self.state = ParseState::Line;
                Ok(Some(AtEvent::Data {
                    link,
                    payload: core::mem::take(&mut self.payload),
                }))
            }
            ParseState::Line => {
                if byte == b'\n' {
                    let event = classify(&self.line);
                    self.line.clear();
                    return Ok(event);
                }

                if self.line.push(byte).is_err() {
                    self.line.clear();
                    return Err(AtError::LineTooLong);
                }

                if byte == b'>' && trim(&self.line) == b">" {
                    self.line.clear();
                    return Ok(Some(AtEvent::SendPrompt));
                }

                if byte == b':' && self.line.starts_with(b"+IPD,") {
                    let header = parse_ipd_header(&self.line);
                    self.line.clear();
                    let (link, len) = header.ok_or(AtError::BadIpdHeader)?;
                    self.payload.clear();
                    if len == 0 {
                        return Ok(Some(AtEvent::Data {
                            link,
                            payload: Vec::new(),
                        }));
                    }
                    self.state = ParseState::Payload { link, remaining: len };
                }

                Ok(None)
            }
        }
    }

    /// Feed a buffer, handing every complete event to `on_event`
    ///
    /// Parse errors are skipped.
    pub fn feed_all(&mut self, bytes: &[u8], mut on_event: impl FnMut(AtEvent)) {
        for &byte in bytes {
            if let Ok(Some(event)) = self.feed(byte) {
                on_event(event);
            }
        }
    }
}

fn trim(line: &[u8]) -> &[u8] {
    line.trim_ascii()
}

fn parse_number<T: core::str::FromStr>(bytes: &[u8]) -> Option<T> {
    core::str::from_utf8(bytes).ok()?.parse().ok()
}

/// Parse `+IPD,<link>,<len>:` into (link, len)
fn parse_ipd_header(line: &[u8]) -> Option<(u8, usize)> {
    let fields = line.strip_prefix(b"+IPD,")?.strip_suffix(b":")?;
    let mut parts = fields.split(|b| *b == b',');
    let link = parse_number(parts.next()?)?;
    let len = parse_number(parts.next()?)?;
    Some((link, len))
}

/// Turn a complete line into an event; unknown lines are ignored
fn classify(line: &[u8]) -> Option<AtEvent> {
    let line = trim(line);
    let event = match line {
        b"" => return None,
        b"ready" => AtEvent::Ready,
        b"OK" => AtEvent::Ok,
        b"ERROR" => AtEvent::Error,
        b"FAIL" => AtEvent::Fail,
        b"SEND OK" => AtEvent::SendOk,
        b"SEND FAIL" => AtEvent::SendFail,
        b"WIFI CONNECTED" => AtEvent::WifiConnected,
        b"WIFI GOT IP" => AtEvent::WifiGotIp,
        b"WIFI DISCONNECT" => AtEvent::WifiDisconnected,
        _ if line.starts_with(b"busy") => AtEvent::Busy,
        _ => {
            if let Some(code) = line.strip_prefix(b"+CWJAP:") {
                return parse_number(code).map(AtEvent::JoinFailed);
            }
            if let Some(rest) = line.strip_prefix(b"+CIFSR:STAIP,") {
                let address = core::str::from_utf8(rest).ok()?.trim_matches('"');
                return String::try_from(address).ok().map(AtEvent::Address);
            }
            if let Some(link) = line.strip_suffix(b",CONNECT") {
                return parse_number(link).map(AtEvent::Connected);
            }
            if let Some(link) = line.strip_suffix(b",CLOSED") {
                return parse_number(link).map(AtEvent::Closed);
            }
            return None;
        }
    };
    Some(event)
}
