/// Terminal host: crossterm events, frame deadlines and background fetches.
///
/// Listener registration controls mouse capture, so the terminal only
/// reports mouse events while the viewer is mounted. Frames are deadlines
/// polled by the app loop, and fetches run on worker threads that post
/// completions back over a channel.
use crossterm::event::{DisableMouseCapture, EnableMouseCapture, Event, MouseButton, MouseEventKind};
use crossterm::{execute, terminal};
use std::io::{self, stdout};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};
use stlview_core::engine::{InputKind, ListenerTarget};
use stlview_core::{fetch_completion, FetchError, Host, HostError, InputEvent, LoadCompletion, LoadTicket};

use crate::fetch::FileFetcher;
use crate::renderer::ROW_SCALE;

/// Pointer coordinates are reported as if each cell were this many pixels
/// wide (and twice as tall), so drag speed matches a pixel display.
pub const CELL_PIXELS: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameId(u64);

pub struct TerminalHost {
    cols: u16,
    rows: u16,
    listeners: Vec<(ListenerId, ListenerTarget, InputKind)>,
    frame: Option<(FrameId, Instant)>,
    frame_interval: Duration,
    next_id: u64,
    completions_tx: Sender<LoadCompletion>,
    completions_rx: Receiver<LoadCompletion>,
    /// Whether mouse capture commands are sent to stdout
    interactive: bool,
    mouse_captured: bool,
}

impl TerminalHost {
    /// A host that never touches the real terminal.
    pub fn new(cols: u16, rows: u16, frame_interval: Duration) -> Self {
        let (completions_tx, completions_rx) = mpsc::channel();
        Self {
            cols,
            rows,
            listeners: Vec::new(),
            frame: None,
            frame_interval,
            next_id: 0,
            completions_tx,
            completions_rx,
            interactive: false,
            mouse_captured: false,
        }
    }

    /// A host sized to the current terminal that toggles mouse capture.
    pub fn attached(frame_interval: Duration) -> io::Result<Self> {
        let (cols, rows) = terminal::size()?;
        let mut host = Self::new(cols, rows, frame_interval);
        host.interactive = true;
        Ok(host)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_listening(&self, kind: InputKind) -> bool {
        self.listeners.iter().any(|&(_, _, k)| k == kind)
    }

    pub fn mouse_captured(&self) -> bool {
        self.mouse_captured
    }

    pub fn frame_pending(&self) -> bool {
        self.frame.is_some()
    }

    /// When the scheduled frame is due, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.frame.map(|(_, due)| due)
    }

    /// Fire the scheduled frame if it is due at `now`. The caller then runs the viewer's frame.
    pub fn take_due_frame(&mut self, now: Instant) -> bool {
        match self.frame {
            Some((_, due)) if due <= now => {
                self.frame = None;
                true
            }
            _ => false,
        }
    }

    /// Fetch results that arrived since the last call.
    pub fn drain_completions(&mut self) -> Vec<LoadCompletion> {
        self.completions_rx.try_iter().collect()
    }

    /// Block until the next fetch result arrives or `timeout` passes.
    pub fn wait_completion(&mut self, timeout: Duration) -> Option<LoadCompletion> {
        self.completions_rx.recv_timeout(timeout).ok()
    }

    /// Translate a crossterm event for a registered listener.
    ///
    /// Events with no matching listener yield `None`. Resize events also
    /// update the host's size.
    pub fn translate(&mut self, event: &Event) -> Option<InputEvent> {
        let input = match event {
            Event::Mouse(mouse) => {
                let x = mouse.column as f32 * CELL_PIXELS;
                let y = mouse.row as f32 * CELL_PIXELS * ROW_SCALE as f32;
                match mouse.kind {
                    MouseEventKind::Down(MouseButton::Left) => InputEvent::PointerDown { x, y },
                    MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
                        InputEvent::PointerMove { x, y }
                    }
                    MouseEventKind::Up(MouseButton::Left) => InputEvent::PointerUp,
                    MouseEventKind::ScrollUp => InputEvent::Wheel { delta_y: -1.0 },
                    MouseEventKind::ScrollDown => InputEvent::Wheel { delta_y: 1.0 },
                    _ => return None,
                }
            }
            Event::Resize(cols, rows) => {
                self.cols = *cols;
                self.rows = *rows;
                let (width, height) = self.surface_size();
                InputEvent::Resize { width, height }
            }
            _ => return None,
        };

        self.is_listening(input.kind()).then_some(input)
    }

    fn pointer_listeners(&self) -> usize {
        self.listeners
            .iter()
            .filter(|&&(_, _, kind)| kind != InputKind::Resize)
            .count()
    }

    fn set_mouse_capture(&mut self, enabled: bool) -> io::Result<()> {
        if self.mouse_captured == enabled {
            return Ok(());
        }
        if self.interactive {
            if enabled {
                execute!(stdout(), EnableMouseCapture)?;
            } else {
                execute!(stdout(), DisableMouseCapture)?;
            }
        }
        self.mouse_captured = enabled;
        Ok(())
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl Host for TerminalHost {
    type Listener = ListenerId;
    type Frame = FrameId;

    fn listen(&mut self, target: ListenerTarget, kind: InputKind) -> Result<ListenerId, HostError> {
        if kind != InputKind::Resize {
            self.set_mouse_capture(true).map_err(|e| HostError::Listen {
                kind: kind.event_name(),
                reason: e.to_string(),
            })?;
        }

        let id = ListenerId(self.next_id());
        self.listeners.push((id, target, kind));
        log::trace!("listening for {kind} on {target:?}");
        Ok(id)
    }

    fn unlisten(&mut self, listener: ListenerId) {
        self.listeners.retain(|&(id, _, _)| id != listener);
        if self.pointer_listeners() == 0 {
            if let Err(e) = self.set_mouse_capture(false) {
                log::warn!("failed to release mouse capture: {e}");
            }
        }
    }

    fn request_frame(&mut self) -> Result<FrameId, HostError> {
        let id = FrameId(self.next_id());
        self.frame = Some((id, Instant::now() + self.frame_interval));
        Ok(id)
    }

    fn cancel_frame(&mut self, frame: FrameId) {
        if matches!(self.frame, Some((id, _)) if id == frame) {
            self.frame = None;
        }
    }

    fn start_fetch(&mut self, ticket: LoadTicket) {
        let tx = self.completions_tx.clone();
        let fallback = ticket.clone();

        let spawned = thread::Builder::new().name("stl-fetch".to_string()).spawn(move || {
            let completion = pollster::block_on(fetch_completion(&FileFetcher, ticket));
            // The receiver is gone once the app has shut down.
            let _ = tx.send(completion);
        });

        if let Err(e) = spawned {
            log::error!("failed to start fetch thread: {e}");
            let _ = self.completions_tx.send(LoadCompletion {
                bytes: Err(FetchError::Io {
                    path: fallback.url.clone(),
                    reason: e.to_string(),
                }),
                ticket: fallback,
            });
        }
    }

    fn surface_size(&self) -> (u32, u32) {
        (self.cols as u32, self.rows as u32 * ROW_SCALE)
    }
}
