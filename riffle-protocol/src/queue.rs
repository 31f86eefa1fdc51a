//! Requests waiting for the link task
//!
//! Only one response is sent at a time. Requests that arrive meanwhile are
//! held here; when there is no room the link is marked for closing, so the
//! client sees the connection end instead of waiting for the module's
//! server timeout.

use heapless::{Deque, Vec};

use crate::at::MAX_IPD_LEN;

/// Number of links the module serves with `AT+CIPMUX=1` (ids 0-4)
pub const MAX_LINKS: usize = 5;

/// Request data received on a link
pub type Payload = Vec<u8, MAX_IPD_LEN>;

/// FIFO of held requests plus the links to close
pub struct RequestQueue<const N: usize> {
    pending: Deque<(u8, Payload), N>,
    closing: [bool; MAX_LINKS],
}

impl<const N: usize> RequestQueue<N> {
    pub const fn new() -> Self {
        Self {
            pending: Deque::new(),
            closing: [false; MAX_LINKS],
        }
    }

    /// Hold a request
    ///
    /// Returns `false` if the queue is full; the link is then marked for
    /// closing and the request is dropped.
    pub fn defer(&mut self, link: u8, payload: Payload) -> bool {
        if self.pending.push_back((link, payload)).is_ok() {
            return true;
        }
        if let Some(slot) = self.closing.get_mut(usize::from(link)) {
            *slot = true;
        }
        false
    }

    /// Oldest held request
    pub fn next_request(&mut self) -> Option<(u8, Payload)> {
        self.pending.pop_front()
    }

    /// Next link marked for closing, lowest id first
    pub fn next_to_close(&mut self) -> Option<u8> {
        let link = self.closing.iter().position(|closing| *closing)?;
        self.closing[link] = false;
        Some(link as u8)
    }
}

impl<const N: usize> Default for RequestQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(text: &[u8]) -> Payload {
        Vec::from_slice(text).unwrap()
    }

    #[test]
    fn test_requests_in_order() {
        let mut queue: RequestQueue<2> = RequestQueue::new();
        assert!(queue.defer(1, payload(b"GET / HTTP/1.1\r\n\r\n")));
        assert!(queue.defer(3, payload(b"GET /setdeal HTTP/1.1\r\n\r\n")));

        assert_eq!(queue.next_request().map(|(link, _)| link), Some(1));
        assert_eq!(queue.next_request().map(|(link, _)| link), Some(3));
        assert_eq!(queue.next_request(), None);
        assert_eq!(queue.next_to_close(), None);
    }

    #[test]
    fn test_overflow_closes_link() {
        let mut queue: RequestQueue<1> = RequestQueue::new();
        assert!(queue.defer(0, payload(b"GET /")));
        assert!(!queue.defer(4, payload(b"GET /")));
        assert!(!queue.defer(2, payload(b"GET /")));
        assert!(!queue.defer(4, payload(b"GET /")));

        // Held request is untouched
        assert_eq!(queue.next_request().map(|(link, _)| link), Some(0));

        // Each dropped link is closed once
        assert_eq!(queue.next_to_close(), Some(2));
        assert_eq!(queue.next_to_close(), Some(4));
        assert_eq!(queue.next_to_close(), None);
    }

    #[test]
    fn test_unknown_link_id_is_not_closed() {
        let mut queue: RequestQueue<1> = RequestQueue::new();
        assert!(queue.defer(0, payload(b"GET /")));
        assert!(!queue.defer(9, payload(b"GET /")));
        assert_eq!(queue.next_to_close(), None);
    }
}
