/// Terminal front end for the stlview viewer
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};
use stlview_core::{Overlay, TriangleGeometry, Viewer, ViewerConfig, ViewerError};

pub mod fetch;
pub mod host;
pub mod renderer;

pub use fetch::FileFetcher;
pub use host::TerminalHost;
pub use renderer::{AsciiEngine, AsciiError, MeshId};

pub type TerminalViewer = Viewer<AsciiEngine, TerminalHost>;

/// How long to wait for input when no frame is scheduled
const IDLE_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Viewer(#[from] ViewerError),
}

/// What to show once the viewer is mounted
#[derive(Debug, Clone)]
pub enum Model {
    /// Path or `file://` URL, loaded in the background
    Url(String),
    /// Geometry already in memory
    Geometry(TriangleGeometry),
}

/// Keyboard shortcuts, mirroring the browser viewer's inline controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    ZoomIn,
    ZoomOut,
    ToggleAutoRotate,
    ToggleTheme,
    Retry,
    ResetView,
}

impl Command {
    pub fn from_key(key: &KeyEvent) -> Option<Self> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Command::Quit),
            KeyCode::Char('q') | KeyCode::Esc => Some(Command::Quit),
            KeyCode::Char('+') | KeyCode::Char('=') => Some(Command::ZoomIn),
            KeyCode::Char('-') | KeyCode::Char('_') => Some(Command::ZoomOut),
            KeyCode::Char(' ') => Some(Command::ToggleAutoRotate),
            KeyCode::Char('t') => Some(Command::ToggleTheme),
            KeyCode::Char('r') => Some(Command::Retry),
            KeyCode::Char('0') => Some(Command::ResetView),
            _ => None,
        }
    }
}

/// Main application struct for the terminal viewer
pub struct TerminalApp {
    viewer: TerminalViewer,
    running: bool,
    last_sample: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(config: ViewerConfig, frame_interval: Duration) -> io::Result<Self> {
        let host = TerminalHost::attached(frame_interval)?;
        Ok(Self::with_viewer(Viewer::new(config, AsciiEngine::new(), host)))
    }

    pub fn with_viewer(viewer: TerminalViewer) -> Self {
        Self {
            viewer,
            running: true,
            last_sample: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        }
    }

    pub fn viewer(&self) -> &TerminalViewer {
        &self.viewer
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn run(&mut self, model: Model) -> Result<(), AppError> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop(model);

        // Cleanup
        self.viewer.unmount();
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    /// Mount the viewer and start showing `model`.
    pub fn open(&mut self, model: Model) -> Result<(), AppError> {
        self.viewer.mount()?;
        match model {
            Model::Url(url) => {
                self.viewer.set_source(&url);
            }
            Model::Geometry(geometry) => {
                if let Err(e) = self.viewer.show_geometry(geometry) {
                    log::warn!("nothing to show: {e}");
                }
            }
        }
        Ok(())
    }

    fn main_loop(&mut self, model: Model) -> Result<(), AppError> {
        self.open(model)?;

        while self.running {
            self.pump_completions();

            let timeout = self
                .viewer
                .host()
                .next_deadline()
                .map(|due| due.saturating_duration_since(Instant::now()))
                .unwrap_or(IDLE_POLL);

            if event::poll(timeout)? {
                let event = event::read()?;
                self.dispatch(&event);
            }

            if self.viewer.host_mut().take_due_frame(Instant::now()) {
                self.viewer.frame();
                self.draw()?;
                self.count_frame();
            }
        }

        Ok(())
    }

    /// Hand finished fetches to the viewer.
    pub fn pump_completions(&mut self) {
        for completion in self.viewer.host_mut().drain_completions() {
            self.viewer.finish_load(completion);
        }
    }

    /// Route one terminal event to a shortcut or to the viewer's input handling.
    pub fn dispatch(&mut self, event: &Event) {
        if let Event::Key(key) = event {
            if let Some(command) = Command::from_key(key) {
                self.apply(command);
            }
            return;
        }

        if let Some(input) = self.viewer.host_mut().translate(event) {
            self.viewer.handle_input(input);
        }
    }

    pub fn apply(&mut self, command: Command) {
        match command {
            Command::Quit => self.running = false,
            Command::ZoomIn => self.viewer.zoom_in(),
            Command::ZoomOut => self.viewer.zoom_out(),
            Command::ToggleAutoRotate => {
                self.viewer.toggle_auto_rotate();
            }
            Command::ToggleTheme => {
                self.viewer.toggle_theme();
            }
            Command::Retry => {
                if self.viewer.state().error.is_some() {
                    self.viewer.retry();
                }
            }
            Command::ResetView => self.viewer.reset_view(),
        }
    }

    fn count_frame(&mut self) {
        self.frame_count += 1;
        let now = Instant::now();
        let elapsed = now - self.last_sample;
        if elapsed.as_secs() >= 1 {
            self.fps = self.frame_count as f32 / elapsed.as_secs_f32();
            self.frame_count = 0;
            self.last_sample = now;
        }
    }

    fn draw(&mut self) -> io::Result<()> {
        let mut stdout = stdout();
        let (cols, rows) = self.viewer.engine().size();

        self.viewer.engine().draw(&mut stdout)?;

        let status = self.viewer.status();
        let line = format!(
            " stlview | {} | FPS {:.0} | q quit  +/- zoom  space spin  t theme  0 reset",
            status.pill, self.fps
        );
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(truncate(&line, cols)),
            ResetColor
        )?;

        let middle = (rows / 2) as u16;
        match &status.overlay {
            Overlay::None => {}
            Overlay::Loading => {
                queue!(
                    stdout,
                    cursor::MoveTo(0, middle),
                    Clear(ClearType::CurrentLine),
                    Print(centered("Loading model...", cols)),
                )?;
            }
            Overlay::Error { message, detail } => {
                queue!(
                    stdout,
                    cursor::MoveTo(0, middle),
                    Clear(ClearType::CurrentLine),
                    SetForegroundColor(Color::Red),
                    Print(centered(message, cols)),
                    cursor::MoveTo(0, middle + 1),
                    Clear(ClearType::CurrentLine),
                    Print(centered(detail, cols)),
                    ResetColor,
                    cursor::MoveTo(0, middle + 2),
                    Clear(ClearType::CurrentLine),
                    Print(centered("press r to retry", cols)),
                )?;
            }
        }

        stdout.flush()
    }
}

fn truncate(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

fn centered(text: &str, width: usize) -> String {
    let text = truncate(text, width);
    let pad = width.saturating_sub(text.chars().count()) / 2;
    format!("{}{}", " ".repeat(pad), text)
}
