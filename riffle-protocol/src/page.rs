//! Control page rendering
//!
//! Responses are rendered into a fixed buffer, headers included, so the
//! link task can hand them to `AT+CIPSEND` in one piece.

use core::fmt::{self, Write};

use heapless::String;

use crate::http::StatusCode;

/// Maximum page body length
pub const MAX_BODY_LEN: usize = 1536;

/// Maximum response length (one `AT+CIPSEND` is at most 2048 bytes)
pub const MAX_RESPONSE_LEN: usize = 2048;

/// Complete HTTP response
pub type Response = String<MAX_RESPONSE_LEN>;

/// What the control page shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageView<'a> {
    /// Mode label, e.g. `IDLE`
    pub mode: &'a str,
    /// Status line
    pub status: &'a str,
    /// Last stored job, used to pre-fill the form
    pub players: i32,
    pub cards: i32,
}

/// Render the control page with a 200 response header
pub fn render_page(view: &PageView<'_>) -> Result<Response, fmt::Error> {
    let mut body: String<MAX_BODY_LEN> = String::new();
    write!(
        body,
        concat!(
            "<!DOCTYPE html>\n",
            "<html>\n",
            "<head><title>Card Machine Control</title>",
            "<meta name=\"viewport\" content=\"width=device-width\"></head>\n",
            "<body>\n",
            "<h1>Card Shuffler &amp; Dealer Control</h1>\n",
            "<form action=\"/setdeal\">\n",
            "<label for=\"players\">Number of Players:</label>\n",
            "<input type=\"number\" id=\"players\" name=\"players\" min=\"1\" value=\"{players}\" required><br><br>\n",
            "<label for=\"cards\">Cards per Player:</label>\n",
            "<input type=\"number\" id=\"cards\" name=\"cards\" min=\"1\" value=\"{cards}\" required><br><br>\n",
            "<input type=\"submit\" value=\"Set and Start\">\n",
            "</form>\n",
            "<p>Players set: {players}, Cards per player: {cards}</p>\n",
            "<p>Mode: {mode}</p>\n",
            "<p>Status: ",
        ),
        players = view.players,
        cards = view.cards,
        mode = view.mode,
    )?;
    write_html_escaped(&mut body, view.status)?;
    body.write_str("</p>\n</body>\n</html>\n")?;

    render(StatusCode::Ok, &body)
}

/// Render a short plain-text error response
pub fn render_error(status: StatusCode) -> Result<Response, fmt::Error> {
    let mut body: String<64> = String::new();
    writeln!(body, "{} {}", status.code(), status.reason())?;
    render(status, &body)
}

fn render(status: StatusCode, body: &str) -> Result<Response, fmt::Error> {
    let content_type = match status {
        StatusCode::Ok => "text/html",
        _ => "text/plain",
    };

    let mut out = Response::new();
    write!(
        out,
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status.code(),
        status.reason(),
        content_type,
        body.len()
    )?;
    out.write_str(body)?;
    Ok(out)
}

fn write_html_escaped<W: Write>(out: &mut W, text: &str) -> fmt::Result {
    for c in text.chars() {
        match c {
            '<' => out.write_str("&lt;")?,
            '>' => out.write_str("&gt;")?,
            '&' => out.write_str("&amp;")?,
            '"' => out.write_str("&quot;")?,
            _ => out.write_char(c)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> PageView<'static> {
        PageView {
            mode: "IDLE",
            status: "Ready",
            players: 4,
            cards: 5,
        }
    }

    fn split(response: &str) -> (&str, &str) {
        response.split_once("\r\n\r\n").unwrap()
    }

    #[test]
    fn test_page_prefills_form() {
        let response = render_page(&view()).unwrap();
        let (head, body) = split(&response);

        assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(head.contains("Content-Type: text/html"));
        assert!(body.contains("name=\"players\" min=\"1\" value=\"4\""));
        assert!(body.contains("name=\"cards\" min=\"1\" value=\"5\""));
        assert!(body.contains("<p>Mode: IDLE</p>"));
        assert!(body.contains("<p>Status: Ready</p>"));
    }

    #[test]
    fn test_content_length_matches_body() {
        let response = render_page(&view()).unwrap();
        let (head, body) = split(&response);
        let expected = format!("Content-Length: {}\r\n", body.len());
        assert!(head.contains(expected.trim_end()));
    }

    #[test]
    fn test_status_is_escaped() {
        let page = PageView {
            status: "a<b>&\"c\"",
            ..view()
        };
        let response = render_page(&page).unwrap();
        assert!(response.contains("Status: a&lt;b&gt;&amp;&quot;c&quot;</p>"));
    }

    #[test]
    fn test_error_response() {
        let response = render_error(StatusCode::BadRequest).unwrap();
        let (head, body) = split(&response);
        assert!(head.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(head.contains("Content-Type: text/plain"));
        assert_eq!(body, "400 Bad Request\n");
    }

    #[test]
    fn test_page_fits_one_send() {
        let page = PageView {
            mode: "WAITING_INPUT",
            status: "Ready (last request rejected: players must be positive)",
            players: i32::MIN,
            cards: i32::MIN,
        };
        assert!(render_page(&page).is_ok());
    }
}
