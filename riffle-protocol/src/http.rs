//! HTTP request parsing
//!
//! Only the request line matters. `GET /setdeal?players=N&cards=M`
//! submits a job; any other GET returns the control page.

/// Path of the job submission form action
pub const SETDEAL_PATH: &str = "/setdeal";

/// Parsed control request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Request {
    /// Show the control page
    Page,
    /// Submit a job; missing parameters are 0
    SetDeal { players: i32, cards: i32 },
}

/// Request parsing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestError {
    /// No complete request line
    Incomplete,
    /// Request line is not `METHOD TARGET HTTP/x`
    Malformed,
    /// Method other than GET
    UnsupportedMethod,
    /// A `players` or `cards` value is not a number
    BadParameter,
}

impl RequestError {
    /// Status code answered for this error
    pub fn status(&self) -> StatusCode {
        match self {
            RequestError::UnsupportedMethod => StatusCode::MethodNotAllowed,
            _ => StatusCode::BadRequest,
        }
    }
}

/// Response status codes used by the control page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusCode {
    Ok,
    BadRequest,
    MethodNotAllowed,
}

impl StatusCode {
    pub fn code(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::MethodNotAllowed => 405,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
        }
    }
}

/// Parse the request line of a raw HTTP request
pub fn parse_request(data: &[u8]) -> Result<Request, RequestError> {
    let end = data
        .iter()
        .position(|b| *b == b'\n')
        .ok_or(RequestError::Incomplete)?;
    let line = core::str::from_utf8(&data[..end]).map_err(|_| RequestError::Malformed)?;
    let line = line.trim_end_matches('\r');

    let mut parts = line.split(' ');
    let (Some(method), Some(target), Some(version), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(RequestError::Malformed);
    };
    if !version.starts_with("HTTP/") || !target.starts_with('/') {
        return Err(RequestError::Malformed);
    }
    if method != "GET" {
        return Err(RequestError::UnsupportedMethod);
    }

    match target.split_once('?') {
        Some((SETDEAL_PATH, query)) => parse_setdeal(query),
        _ => Ok(Request::Page),
    }
}

fn parse_setdeal(query: &str) -> Result<Request, RequestError> {
    let mut players = 0;
    let mut cards = 0;

    for pair in query.split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        let slot = match key {
            "players" => &mut players,
            "cards" => &mut cards,
            _ => continue,
        };
        *slot = value.parse().map_err(|_| RequestError::BadParameter)?;
    }

    Ok(Request::SetDeal { players, cards })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_setdeal() {
        let req = b"GET /setdeal?players=4&cards=5 HTTP/1.1\r\nHost: 192.168.4.17\r\n\r\n";
        assert_eq!(
            parse_request(req),
            Ok(Request::SetDeal {
                players: 4,
                cards: 5
            })
        );
    }

    #[test]
    fn test_parameter_order_and_extras() {
        let req = b"GET /setdeal?cards=7&submit=go&players=2 HTTP/1.1\r\n\r\n";
        assert_eq!(
            parse_request(req),
            Ok(Request::SetDeal {
                players: 2,
                cards: 7
            })
        );
    }

    #[test]
    fn test_missing_parameters_are_zero() {
        assert_eq!(
            parse_request(b"GET /setdeal?players=3 HTTP/1.1\r\n"),
            Ok(Request::SetDeal {
                players: 3,
                cards: 0
            })
        );
        assert_eq!(
            parse_request(b"GET /setdeal? HTTP/1.1\r\n"),
            Ok(Request::SetDeal {
                players: 0,
                cards: 0
            })
        );
    }

    #[test]
    fn test_negative_values_pass_through() {
        assert_eq!(
            parse_request(b"GET /setdeal?players=-1&cards=2 HTTP/1.1\r\n"),
            Ok(Request::SetDeal {
                players: -1,
                cards: 2
            })
        );
    }

    #[test]
    fn test_non_numeric_value() {
        assert_eq!(
            parse_request(b"GET /setdeal?players=four&cards=5 HTTP/1.1\r\n"),
            Err(RequestError::BadParameter)
        );
        assert_eq!(
            parse_request(b"GET /setdeal?players=&cards=5 HTTP/1.1\r\n"),
            Err(RequestError::BadParameter)
        );
        assert_eq!(RequestError::BadParameter.status().code(), 400);
    }

    #[test]
    fn test_other_paths_are_the_page() {
        assert_eq!(parse_request(b"GET / HTTP/1.1\r\n"), Ok(Request::Page));
        assert_eq!(parse_request(b"GET /favicon.ico HTTP/1.1\r\n"), Ok(Request::Page));
        assert_eq!(parse_request(b"GET /setdeal HTTP/1.1\r\n"), Ok(Request::Page));
    }

    #[test]
    fn test_bad_requests() {
        assert_eq!(parse_request(b"GET / HTTP/1.1"), Err(RequestError::Incomplete));
        assert_eq!(parse_request(b"GARBAGE\r\n"), Err(RequestError::Malformed));
        assert_eq!(parse_request(b"GET nope HTTP/1.1\r\n"), Err(RequestError::Malformed));
        assert_eq!(
            parse_request(b"POST /setdeal HTTP/1.1\r\n"),
            Err(RequestError::UnsupportedMethod)
        );
        assert_eq!(RequestError::UnsupportedMethod.status().code(), 405);
    }

    proptest! {
        #[test]
        fn prop_parse_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
            let _ = parse_request(&bytes);
        }

        #[test]
        fn prop_setdeal_values(players in any::<i32>(), cards in any::<i32>()) {
            let req = format!("GET /setdeal?players={}&cards={} HTTP/1.1\r\n\r\n", players, cards);
            prop_assert_eq!(parse_request(req.as_bytes()), Ok(Request::SetDeal { players, cards }));
        }
    }
}
