//! Riffle control link protocol
//!
//! The controller has no network stack of its own. An ESP8266 running the
//! stock ESP-AT firmware sits on a UART and does WiFi and TCP; this crate
//! speaks to it and serves the control page on top:
//!
//! ```text
//! RP2040 ──UART── ESP-AT ──WiFi── browser
//!   AT+CIPSEND / +IPD        GET /setdeal?players=N&cards=M
//! ```
//!
//! - [`at`]: command encoding and a byte-fed response parser
//! - [`http`]: request line and `/setdeal` query parsing
//! - [`page`]: HTML control page and error responses
//! - [`queue`]: requests held while a response is being sent

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod at;
pub mod http;
pub mod page;
pub mod queue;

pub use at::{AtCommand, AtError, AtEvent, AtParser};
pub use http::{parse_request, Request, RequestError, StatusCode};
pub use page::{render_error, render_page, PageView, Response};
pub use queue::RequestQueue;
