//! Screen layout, hit testing and drawing of everything around the viewport.

use crate::color::Rgb;
use crate::info::{self, LineStyle, PanelLine};
use crate::state::{AppState, Speed};
use crate::stroke::{Stroke, FULL_CYCLE_DEGREES};
use crate::term::{Cell, CellBuffer};
use crossterm::style::Color;

/// Width of the right-hand column
pub const PANEL_WIDTH: usize = 40;
/// Rows reserved for the controls at the bottom of the panel
pub const CONTROLS_HEIGHT: usize = 9;

pub const PANEL_BG: Rgb = Rgb::hex(0x1e293b);
const HEADER_BG: Rgb = Rgb::hex(0x0f172a);
const TEXT: Rgb = Rgb::hex(0xe2e8f0);
const MUTED: Rgb = Rgb::hex(0x94a3b8);
const DIM: Rgb = Rgb::hex(0x64748b);
const BUTTON_BG: Rgb = Rgb::hex(0x334155);
const ACCENT: Rgb = Rgb::hex(0x34d399);

const TITLE: &str = " FOUR-STROKE ENGINE  ·  Interactive 4-Stroke Internal Combustion Engine Visualizer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Rect { x, y, width, height }
    }

    pub fn contains(&self, col: usize, row: usize) -> bool {
        col >= self.x && col < self.x + self.width && row >= self.y && row < self.y + self.height
    }
}

/// Something clickable in the control area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Stroke(Stroke),
    Slider,
    PlayPause,
    Reset,
    Speed(Speed),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub cols: usize,
    pub rows: usize,
    pub header: Rect,
    pub viewport: Rect,
    pub panel: Rect,
    pub info: Rect,
    pub controls: Rect,
    pub footer: Rect,
}

impl Layout {
    pub fn compute(cols: usize, rows: usize) -> Self {
        let body_height = rows.saturating_sub(2);
        let panel_width = PANEL_WIDTH.min(cols / 2);
        let panel = Rect::new(cols - panel_width, 1, panel_width, body_height);
        let inner_width = panel_width.saturating_sub(2);
        let controls_height = CONTROLS_HEIGHT.min(body_height);
        Layout {
            cols,
            rows,
            header: Rect::new(0, 0, cols, rows.min(1)),
            viewport: Rect::new(0, 1, cols - panel_width, body_height),
            panel,
            info: Rect::new(panel.x + 1, panel.y, inner_width, body_height - controls_height),
            controls: Rect::new(
                panel.x + 1,
                panel.y + body_height - controls_height,
                inner_width,
                controls_height,
            ),
            footer: Rect::new(0, rows.saturating_sub(1), cols, rows.min(2).saturating_sub(1)),
        }
    }

    pub fn slider(&self) -> Rect {
        Rect::new(self.controls.x, self.controls.y + 1, self.controls.width, 1)
    }

    /// Every clickable control and where it is drawn
    pub fn buttons(&self) -> Vec<(Control, Rect)> {
        let c = self.controls;
        if c.height < CONTROLS_HEIGHT || c.width < 4 {
            return Vec::new();
        }
        let half = c.width / 2;
        let mut buttons = vec![(Control::Slider, self.slider())];
        for (i, stroke) in Stroke::ALL.into_iter().enumerate() {
            let rect = Rect::new(c.x + (i % 2) * half, c.y + 4 + i / 2, half.saturating_sub(1), 1);
            buttons.push((Control::Stroke(stroke), rect));
        }
        let row = c.y + 7;
        let mut x = c.x;
        for (control, width) in [(Control::PlayPause, 10), (Control::Reset, 9)] {
            buttons.push((control, Rect::new(x, row, width, 1)));
            x += width + 1;
        }
        for speed in Speed::ALL {
            let width = speed.label().len() + 2;
            buttons.push((Control::Speed(speed), Rect::new(x, row, width, 1)));
            x += width;
        }
        buttons.retain(|(_, r)| r.x + r.width <= c.x + c.width);
        buttons
    }

    pub fn hit_test(&self, col: usize, row: usize) -> Option<Control> {
        self.buttons()
            .into_iter()
            .find(|(_, rect)| rect.contains(col, row))
            .map(|(control, _)| control)
    }

    /// Slider value under `col`, whole degrees clamped to `0..=720`
    pub fn slider_degrees_at(&self, col: usize) -> f64 {
        let slider = self.slider();
        if slider.width < 2 {
            return 0.0;
        }
        let offset = col.saturating_sub(slider.x).min(slider.width - 1) as f64;
        (offset / (slider.width - 1) as f64 * FULL_CYCLE_DEGREES).round()
    }

    /// Column of the slider thumb for a displayed value
    fn slider_col(&self, degrees: u32) -> usize {
        let slider = self.slider();
        let span = slider.width.saturating_sub(1) as f64;
        slider.x + (degrees as f64 / FULL_CYCLE_DEGREES * span).round() as usize
    }
}

fn text_line(buf: &mut CellBuffer, area: Rect, row: usize, text: &str, fg: Rgb, bg: Rgb) {
    if row < area.height {
        buf.put_str(area.x, area.y + row, text, fg.into(), bg.into(), area.width);
    }
}

fn style_color(style: LineStyle) -> Rgb {
    match style {
        LineStyle::Label => MUTED,
        LineStyle::Title => Rgb::WHITE,
        LineStyle::Body | LineStyle::Field => TEXT,
        LineStyle::Dim => DIM,
        LineStyle::Highlight => crate::scene::HIGHLIGHT,
    }
}

fn draw_lines(buf: &mut CellBuffer, area: Rect, lines: &[PanelLine], bg: Rgb) {
    for (row, line) in lines.iter().enumerate() {
        text_line(buf, area, row, &line.text, style_color(line.style), bg);
    }
}

/// Header, side panel, controls and footer
pub fn draw(buf: &mut CellBuffer, layout: &Layout, state: &AppState) {
    let stroke = state.stroke();

    let header = layout.header;
    buf.fill(header.x, header.y, header.width, header.height, Cell::blank(HEADER_BG.into()));
    text_line(buf, header, 0, TITLE, ACCENT, HEADER_BG);

    let panel = layout.panel;
    buf.fill(panel.x, panel.y, panel.width, panel.height, Cell::blank(PANEL_BG.into()));
    draw_lines(buf, layout.info, &info::stroke_lines(stroke, layout.info.width), PANEL_BG);
    draw_controls(buf, layout, state);

    let footer = layout.footer;
    buf.fill(footer.x, footer.y, footer.width, footer.height, Cell::blank(HEADER_BG.into()));
    text_line(
        buf,
        footer,
        0,
        " space play/pause  ←/→ ±1°  shift ±10°  1-4 stroke  r reset  [ ] 5 6 7 speed  \
         drag orbit  wheel/+/- zoom  w wireframe  d debug  q quit",
        DIM,
        HEADER_BG,
    );
}

/// Stroke title over the top-right of the viewport, part info or hint along its bottom
pub fn draw_viewport_overlay(buf: &mut CellBuffer, layout: &Layout, state: &AppState) {
    let vp = layout.viewport;
    if vp.width < 4 || vp.height < 2 {
        return;
    }
    let stroke = state.stroke();
    let indicator = info::stroke_indicator(stroke);
    let len = indicator.chars().count().min(vp.width);
    let margin = usize::from(vp.width > len);
    let x = vp.x + vp.width - len - margin;
    buf.put_str(x, vp.y, &indicator, Rgb::WHITE.into(), stroke.info().color.into(), len);

    let width = vp.width.saturating_sub(4);
    let lines = info::part_lines(state.hovered, width);
    let shown = lines.len().min(vp.height.saturating_sub(2));
    let top = vp.y + vp.height - shown - 1;
    let area = Rect::new(vp.x + 2, top, width, shown);
    let bg = if state.hovered.is_some() { PANEL_BG } else { crate::scene::BACKGROUND };
    draw_lines(buf, area, &lines[..shown], bg);
}

fn button(buf: &mut CellBuffer, rect: Rect, label: &str, fg: Rgb, bg: Rgb) {
    buf.fill(rect.x, rect.y, rect.width, 1, Cell::blank(bg.into()));
    let len = label.chars().count().min(rect.width);
    let x = rect.x + (rect.width - len) / 2;
    buf.put_str(x, rect.y, label, fg.into(), bg.into(), len);
}

fn draw_controls(buf: &mut CellBuffer, layout: &Layout, state: &AppState) {
    let c = layout.controls;
    if c.height < CONTROLS_HEIGHT || c.width < 4 {
        return;
    }
    let stroke = state.stroke();
    let degrees = state.slider_degrees();

    text_line(buf, c, 0, &format!("CRANK ANGLE: {degrees}°"), TEXT, PANEL_BG);

    // slider track colored by stroke band, brighter up to the thumb
    let slider = layout.slider();
    let thumb = layout.slider_col(degrees);
    for col in slider.x..slider.x + slider.width {
        let band = Stroke::from_angle(layout.slider_degrees_at(col).to_radians());
        let color = band.info().color;
        let (ch, fg) = if col == thumb {
            ('●', Rgb::WHITE)
        } else if col < thumb {
            ('━', color)
        } else {
            ('─', color.scale(0.45))
        };
        buf.set(col, slider.y, Cell { ch, fg: fg.into(), bg: PANEL_BG.into() });
    }
    text_line(buf, c, 2, "0°", DIM, PANEL_BG);
    let end = "720°";
    buf.put_str(c.x + c.width - end.chars().count(), c.y + 2, end, DIM.into(), PANEL_BG.into(), 4);

    for (control, rect) in layout.buttons() {
        match control {
            Control::Slider => {}
            Control::Stroke(s) => {
                let info = s.info();
                let label = format!("{} {}", s.index() + 1, info.title);
                if s == stroke {
                    button(buf, rect, &label, Rgb::WHITE, info.color);
                } else {
                    button(buf, rect, &label, MUTED, BUTTON_BG);
                }
            }
            Control::PlayPause => {
                let label = if state.playback.is_playing { "❚❚ Pause" } else { "▶ Play" };
                button(buf, rect, label, Rgb::WHITE, Rgb::hex(0x2563eb));
            }
            Control::Reset => button(buf, rect, "↺ Reset", TEXT, BUTTON_BG),
            Control::Speed(speed) => {
                if speed == state.playback.speed {
                    button(buf, rect, speed.label(), Rgb::WHITE, ACCENT.scale(0.6));
                } else {
                    button(buf, rect, speed.label(), MUTED, BUTTON_BG);
                }
            }
        }
    }
}
