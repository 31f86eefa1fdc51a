//! ESP-AT link task
//!
//! Brings the WiFi module up, then serves the control page. Each request
//! is forwarded to the controller and answered with the machine state as
//! it is once the controller has handled it.

use defmt::*;
use embassy_rp::uart::BufferedUart;
use embassy_time::{with_timeout, Duration, Timer};
use embedded_io_async::{Read, Write};
use heapless::Deque;

use riffle_core::config::NetworkConfig;
use riffle_protocol::{
    parse_request, render_error, render_page, AtCommand, AtEvent, AtParser, PageView, Request,
    RequestQueue, Response, StatusCode,
};

use crate::channels::{ControlRequest, CONTROL_CHANNEL, CONTROL_REPLY};

/// Buffer size for UART reads
const RX_CHUNK: usize = 64;

/// Parsed events not consumed yet
const EVENT_QUEUE: usize = 4;

/// Requests held back while a response is being sent
const DEFERRED_REQUESTS: usize = 2;

const READY_TIMEOUT: Duration = Duration::from_secs(5);
const COMMAND_TIMEOUT: Duration = Duration::from_secs(2);
const JOIN_TIMEOUT: Duration = Duration::from_secs(20);
const SEND_TIMEOUT: Duration = Duration::from_secs(10);
const JOIN_RETRY_DELAY: Duration = Duration::from_secs(1);
const BUSY_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Sends of one command while the module answers `busy`
const BUSY_RETRIES: usize = 3;

/// Bring-up or send failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
enum LinkError {
    /// No answer in time
    Timeout,
    /// Module answered ERROR or FAIL
    Rejected,
    /// UART read or write failed
    Uart,
    /// Command did not fit the command buffer
    Encode,
}

struct Link {
    uart: BufferedUart,
    parser: AtParser,
    buf: [u8; RX_CHUNK],
    events: Deque<AtEvent, EVENT_QUEUE>,
    queue: RequestQueue<DEFERRED_REQUESTS>,
}

/// Link task - owns the UART to the ESP-AT module
#[embassy_executor::task]
pub async fn link_task(uart: BufferedUart, network: NetworkConfig) {
    info!("Link task started");

    let mut link = Link {
        uart,
        parser: AtParser::new(),
        buf: [0u8; RX_CHUNK],
        events: Deque::new(),
        queue: RequestQueue::new(),
    };

    if let Err(e) = link.bring_up(&network).await {
        error!("WiFi bring-up failed: {}", e);
        CONTROL_CHANNEL.send(ControlRequest::LinkFailed).await;
        return;
    }

    info!("Serving control page on port {}", network.port);
    CONTROL_CHANNEL.send(ControlRequest::LinkUp).await;

    link.serve().await;
}

impl Link {
    async fn bring_up(&mut self, network: &NetworkConfig) -> Result<(), LinkError> {
        self.send_line(AtCommand::Reset).await?;
        self.wait_for(READY_TIMEOUT, |e| matches!(e, AtEvent::Ready)).await?;
        self.parser.reset();

        self.command(AtCommand::Probe, COMMAND_TIMEOUT).await?;
        self.command(AtCommand::EchoOff, COMMAND_TIMEOUT).await?;
        self.command(AtCommand::StationMode, COMMAND_TIMEOUT).await?;
        self.join(network).await?;
        self.command(AtCommand::QueryAddress, COMMAND_TIMEOUT).await?;
        self.command(AtCommand::MultiConnection, COMMAND_TIMEOUT).await?;
        self.command(AtCommand::StartServer { port: network.port }, COMMAND_TIMEOUT)
            .await
    }

    async fn join(&mut self, network: &NetworkConfig) -> Result<(), LinkError> {
        let attempts = network.join_attempts.max(1);
        let join = AtCommand::JoinAp {
            ssid: &network.ssid,
            password: &network.password,
        };

        let mut result = Err(LinkError::Timeout);
        for attempt in 1..=attempts {
            info!("Joining \"{}\" ({}/{})", network.ssid.as_str(), attempt, attempts);
            result = self.command(join, JOIN_TIMEOUT).await;
            match result {
                Ok(()) => break,
                Err(e) => {
                    warn!("Join attempt {} failed: {}", attempt, e);
                    Timer::after(JOIN_RETRY_DELAY).await;
                }
            }
        }
        result
    }

    async fn serve(&mut self) {
        loop {
            while let Some(link_id) = self.queue.next_to_close() {
                self.close(link_id).await;
            }

            let (link_id, payload) = match self.queue.next_request() {
                Some(request) => request,
                None => match self.next_event().await {
                    Ok(AtEvent::Data { link, payload }) => (link, payload),
                    Ok(other) => {
                        self.unsolicited(other);
                        continue;
                    }
                    Err(e) => {
                        warn!("Link read failed: {}", e);
                        continue;
                    }
                },
            };

            let Some(response) = handle_request(&payload).await else {
                warn!("Response did not fit, closing link {}", link_id);
                self.close(link_id).await;
                continue;
            };

            if let Err(e) = self.respond(link_id, &response).await {
                warn!("Send on link {} failed: {}", link_id, e);
            }
        }
    }

    async fn respond(&mut self, link: u8, response: &Response) -> Result<(), LinkError> {
        let len = response.len() as u16;
        self.send_line(AtCommand::Send { link, len }).await?;
        match self
            .wait_for(COMMAND_TIMEOUT, |e| {
                matches!(e, AtEvent::SendPrompt | AtEvent::Error | AtEvent::Fail)
            })
            .await?
        {
            AtEvent::SendPrompt => {}
            _ => return Err(LinkError::Rejected),
        }

        self.write(response.as_bytes()).await?;
        match self
            .wait_for(SEND_TIMEOUT, |e| matches!(e, AtEvent::SendOk | AtEvent::SendFail))
            .await?
        {
            AtEvent::SendOk => {}
            _ => return Err(LinkError::Rejected),
        }

        self.close(link).await;
        Ok(())
    }

    /// Close a link; the client may already have closed it
    async fn close(&mut self, link: u8) {
        if self.command(AtCommand::Close { link }, COMMAND_TIMEOUT).await.is_err() {
            debug!("Link {} already closed", link);
        }
    }

    /// Send a command and wait for its final OK
    ///
    /// A `busy` answer means the module dropped the command; it is sent
    /// again after a short delay.
    async fn command(
        &mut self,
        command: AtCommand<'_>,
        timeout: Duration,
    ) -> Result<(), LinkError> {
        for _ in 0..BUSY_RETRIES {
            self.send_line(command).await?;
            let answer = self
                .wait_for(timeout, |e| {
                    matches!(e, AtEvent::Ok | AtEvent::Error | AtEvent::Fail | AtEvent::Busy)
                })
                .await?;
            match answer {
                AtEvent::Ok => return Ok(()),
                AtEvent::Busy => {
                    debug!("Module busy, retrying");
                    Timer::after(BUSY_RETRY_DELAY).await;
                }
                _ => return Err(LinkError::Rejected),
            }
        }
        Err(LinkError::Timeout)
    }

    async fn send_line(&mut self, command: AtCommand<'_>) -> Result<(), LinkError> {
        let line = command.encode().map_err(|_| LinkError::Encode)?;
        trace!("AT> {}", line.as_str().trim_end());
        self.write(line.as_bytes()).await
    }

    async fn write(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        self.uart.write_all(bytes).await.map_err(|_| LinkError::Uart)?;
        self.uart.flush().await.map_err(|_| LinkError::Uart)
    }

    /// Wait for an event matching `want`; others are handled on the way
    async fn wait_for(
        &mut self,
        timeout: Duration,
        want: impl Fn(&AtEvent) -> bool,
    ) -> Result<AtEvent, LinkError> {
        let waited = with_timeout(timeout, async {
            loop {
                let event = match self.next_event().await {
                    Ok(event) => event,
                    Err(e) => return Err(e),
                };
                if want(&event) {
                    return Ok(event);
                }
                self.unsolicited(event);
            }
        })
        .await;
        waited.map_err(|_| LinkError::Timeout)?
    }

    async fn next_event(&mut self) -> Result<AtEvent, LinkError> {
        loop {
            if let Some(event) = self.events.pop_front() {
                return Ok(event);
            }

            let n = self.uart.read(&mut self.buf).await.map_err(|_| LinkError::Uart)?;
            for &byte in &self.buf[..n] {
                match self.parser.feed(byte) {
                    Ok(Some(event)) => {
                        if self.events.push_back(event).is_err() {
                            warn!("AT event queue full, dropping event");
                        }
                    }
                    Ok(None) => {}
                    Err(e) => warn!("AT parse error: {}", e),
                }
            }
        }
    }

    fn unsolicited(&mut self, event: AtEvent) {
        match event {
            AtEvent::Data { link, payload } => {
                if !self.queue.defer(link, payload) {
                    warn!("Request on link {} dropped, closing it", link);
                }
            }
            AtEvent::Address(address) => info!("Station address {}", address.as_str()),
            AtEvent::WifiDisconnected => warn!("WiFi disconnected"),
            AtEvent::JoinFailed(reason) => warn!("Join failed, reason {}", reason),
            AtEvent::Connected(link) => debug!("Link {} connected", link),
            AtEvent::Closed(link) => debug!("Link {} closed", link),
            other => trace!("AT< {}", other),
        }
    }
}

/// Forward one HTTP request to the controller and render its answer
async fn handle_request(payload: &[u8]) -> Option<Response> {
    let control = match parse_request(payload) {
        Ok(Request::Page) => ControlRequest::ShowPage,
        Ok(Request::SetDeal { players, cards }) => ControlRequest::SetDeal { players, cards },
        Err(e) => {
            debug!("Bad request: {}", e);
            return render_error(e.status()).ok();
        }
    };

    CONTROL_REPLY.reset();
    CONTROL_CHANNEL.send(control).await;
    let snapshot = CONTROL_REPLY.wait().await;

    let view = PageView {
        mode: snapshot.mode.label(),
        status: &snapshot.status,
        players: snapshot.job.players,
        cards: snapshot.job.cards_per_player,
    };
    render_page(&view)
        .or_else(|_| render_error(StatusCode::BadRequest))
        .ok()
}
