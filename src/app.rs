//! The controller: owns the state, routes input and drives the frame loop.

use crate::config::Config;
use crate::driver::{AnimationDriver, FramePacer};
use crate::error::Result;
use crate::part::Part;
use crate::scene::BACKGROUND;
use crate::state::{AppState, Speed};
use crate::stroke::Stroke;
use crate::term::{CellBuffer, TermGuard};
use crate::ui::{self, Control, Layout};
use crate::widget::{EngineWidget, ZOOM_STEP};
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use std::time::Duration;
use tracing::{debug, info};

pub struct App {
    state: AppState,
    driver: AnimationDriver,
    pacer: FramePacer,
    widget: EngineWidget,
    layout: Layout,
    /// Left button went down on the slider and is still held
    scrubbing: bool,
    /// Pointer cell of the last orbit drag, re-picked once the new pose is drawn
    orbit_pointer: Option<(usize, usize)>,
    quit: bool,
    last_stroke: Stroke,
}

impl App {
    pub fn new(config: &Config) -> Self {
        let state = config.initial_state();
        App {
            last_stroke: state.stroke(),
            state,
            driver: AnimationDriver::new(),
            pacer: FramePacer::new(config.fps),
            widget: EngineWidget::new(),
            layout: Layout::compute(0, 0),
            scrubbing: false,
            orbit_pointer: None,
            quit: false,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Runs until the user quits. The driver is stopped on every exit path.
    pub fn run(&mut self, term: &mut TermGuard) -> Result<()> {
        info!(fps = self.pacer.period().as_secs_f64().recip(), "starting");
        self.driver.start();
        let result = self.run_loop(term);
        self.driver.stop();
        info!("stopped");
        result
    }

    fn run_loop(&mut self, term: &mut TermGuard) -> Result<()> {
        loop {
            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?);
            }
            if self.should_quit() {
                return Ok(());
            }

            self.tick();

            let (cols, rows) = term.size()?;
            let mut buf = CellBuffer::new(cols, rows, BACKGROUND.into());
            self.render(&mut buf);
            term.present(&buf)?;
            self.pacer.wait();
        }
    }

    /// Renders one frame without touching the terminal
    pub fn snapshot(&mut self, cols: usize, rows: usize) -> CellBuffer {
        let mut buf = CellBuffer::new(cols, rows, BACKGROUND.into());
        self.render(&mut buf);
        buf
    }

    /// Advances the animation by one frame
    pub fn tick(&mut self) {
        self.driver.tick(&mut self.state);
        let stroke = self.state.stroke();
        if stroke != self.last_stroke {
            debug!(?stroke, "stroke changed");
            self.last_stroke = stroke;
        }
    }

    pub fn start(&mut self) {
        self.driver.start();
    }

    pub fn stop(&mut self) {
        self.driver.stop();
    }

    pub fn render(&mut self, buf: &mut CellBuffer) {
        let layout = Layout::compute(buf.width, buf.height);
        if layout != self.layout {
            debug!(cols = buf.width, rows = buf.height, "layout changed");
            self.layout = layout;
        }
        self.widget.paint(buf, self.layout.viewport, &self.state);
        if let Some((col, row)) = self.orbit_pointer.take() {
            let part = self.part_at(col, row);
            self.state.set_hovered(part);
        }
        ui::draw_viewport_overlay(buf, &self.layout, &self.state);
        ui::draw(buf, &self.layout, &self.state);
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL)
            | (KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc, _) => {
                info!("quit requested");
                self.quit = true;
            }
            (KeyCode::Char(' '), _) => self.state.toggle_play(),
            (KeyCode::Char('['), _) => self.state.set_speed(self.state.playback.speed.slower()),
            (KeyCode::Char(']'), _) => self.state.set_speed(self.state.playback.speed.faster()),
            (KeyCode::Char('5'), _) => self.state.set_speed(Speed::Half),
            (KeyCode::Char('6'), _) => self.state.set_speed(Speed::Normal),
            (KeyCode::Char('7'), _) => self.state.set_speed(Speed::Double),
            (KeyCode::Left, _) => self.state.nudge_degrees(if shift { -10 } else { -1 }),
            (KeyCode::Right, _) => self.state.nudge_degrees(if shift { 10 } else { 1 }),
            (KeyCode::Char(c @ '1'..='4'), _) => {
                let index = c as usize - '1' as usize;
                self.state.select_stroke(Stroke::ALL[index]);
            }
            (KeyCode::Char('r') | KeyCode::Char('R'), _) => self.state.reset(),
            (KeyCode::Char('w') | KeyCode::Char('W'), _) => self.state.toggle_wireframe(),
            (KeyCode::Char('d') | KeyCode::Char('D'), _) => self.state.toggle_debug(),
            (KeyCode::Char('+') | KeyCode::Char('='), _) => self.state.camera.zoom(ZOOM_STEP),
            (KeyCode::Char('-'), _) => self.state.camera.zoom(ZOOM_STEP.recip()),
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let (col, row) = (mouse.column as usize, mouse.row as usize);
        match mouse.kind {
            MouseEventKind::Moved => {
                let part = self.part_at(col, row);
                self.state.set_hovered(part);
            }
            MouseEventKind::Down(MouseButton::Left) => match self.layout.hit_test(col, row) {
                Some(control) => self.click(control, col),
                None => {
                    self.widget.mouse_down(col, row);
                }
            },
            MouseEventKind::Drag(MouseButton::Left) => {
                if self.scrubbing {
                    self.state.seek_degrees(self.layout.slider_degrees_at(col));
                } else if self.widget.is_dragging() {
                    self.widget.mouse_drag(col, row, &mut self.state);
                    let part = self.part_at(col, row);
                    self.state.set_hovered(part);
                    self.orbit_pointer = Some((col, row));
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.scrubbing = false;
                self.widget.mouse_up();
            }
            MouseEventKind::ScrollUp => self.widget.wheel(1, &mut self.state),
            MouseEventKind::ScrollDown => self.widget.wheel(-1, &mut self.state),
            _ => {}
        }
    }

    /// Part under a screen cell in the last painted frame
    fn part_at(&self, col: usize, row: usize) -> Option<Part> {
        if self.layout.viewport.contains(col, row) {
            self.widget.pick(col, row)
        } else {
            None
        }
    }

    fn click(&mut self, control: Control, col: usize) {
        debug!(?control, "clicked");
        match control {
            Control::Stroke(stroke) => self.state.select_stroke(stroke),
            Control::Slider => {
                self.scrubbing = true;
                self.state.seek_degrees(self.layout.slider_degrees_at(col));
            }
            Control::PlayPause => self.state.toggle_play(),
            Control::Reset => self.state.reset(),
            Control::Speed(speed) => self.state.set_speed(speed),
        }
    }
}
