//! Read-only text for the info panel, derived from the stroke and hovered part.

use crate::part::Part;
use crate::stroke::Stroke;

pub const HOVER_HINT: &str = "Hover over parts to identify them";

pub const COLOR_HINT: &str = "Watch the color of the cylinder: blue mixture on intake, amber \
                              heat under compression, the yellow flash of the explosion and \
                              grey exhaust fumes.";

/// How a panel line is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Label,
    Title,
    Body,
    /// `label` left-aligned, value right-aligned
    Field,
    Dim,
    Highlight,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelLine {
    pub text: String,
    pub style: LineStyle,
}

impl PanelLine {
    fn new(text: impl Into<String>, style: LineStyle) -> Self {
        PanelLine {
            text: text.into(),
            style,
        }
    }

    fn blank() -> Self {
        PanelLine::new("", LineStyle::Body)
    }
}

pub fn valve_state(stroke: Stroke) -> &'static str {
    match stroke {
        Stroke::Intake => "Intake OPEN",
        Stroke::Exhaust => "Exhaust OPEN",
        Stroke::Compression | Stroke::Power => "BOTH CLOSED",
    }
}

pub fn piston_direction(stroke: Stroke) -> &'static str {
    match stroke {
        Stroke::Intake | Stroke::Power => "DOWN ↓",
        Stroke::Compression | Stroke::Exhaust => "UP ↑",
    }
}

/// Title shown over the corner of the viewport
pub fn stroke_indicator(stroke: Stroke) -> String {
    let info = stroke.info();
    format!(" {} {} ", info.icon, info.title)
}

/// Greedy word wrap. Words longer than `width` are split.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return Vec::new();
    }
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_len = 0;
    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if line_len > 0 {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            lines.push(word.drain(..width).collect());
        }
        if word.is_empty() {
            continue;
        }
        let needed = if line_len == 0 { word.len() } else { line_len + 1 + word.len() };
        if needed > width {
            lines.push(std::mem::take(&mut line));
            line_len = 0;
        }
        if line_len > 0 {
            line.push(' ');
            line_len += 1;
        }
        line.extend(word.iter());
        line_len += word.len();
    }
    if line_len > 0 {
        lines.push(line);
    }
    lines
}

/// A `label ... value` row padded to `width`
fn field(label: &str, value: &str, width: usize) -> String {
    let used = label.chars().count() + value.chars().count();
    let gap = width.saturating_sub(used).max(1);
    format!("{label}{}{value}", " ".repeat(gap))
}

/// The stroke panel: phase title, description, valve and piston summary, color hint
pub fn stroke_lines(stroke: Stroke, width: usize) -> Vec<PanelLine> {
    let info = stroke.info();
    let mut lines = vec![
        PanelLine::new("CURRENT PHASE", LineStyle::Label),
        PanelLine::new(format!("{} {}", info.icon, info.title), LineStyle::Title),
        PanelLine::blank(),
    ];
    lines.extend(
        wrap(info.description, width)
            .into_iter()
            .map(|l| PanelLine::new(l, LineStyle::Body)),
    );
    lines.push(PanelLine::blank());
    lines.push(PanelLine::new(field("Valves:", valve_state(stroke), width), LineStyle::Field));
    lines.push(PanelLine::new(
        field("Piston Direction:", piston_direction(stroke), width),
        LineStyle::Field,
    ));
    lines.push(PanelLine::blank());
    lines.extend(
        wrap(COLOR_HINT, width)
            .into_iter()
            .map(|l| PanelLine::new(l, LineStyle::Dim)),
    );
    lines
}

/// Title and description of the hovered part, or the hover hint
pub fn part_lines(hovered: Option<Part>, width: usize) -> Vec<PanelLine> {
    match hovered {
        Some(part) => {
            let info = part.info();
            let mut lines = vec![PanelLine::new(info.title, LineStyle::Highlight)];
            lines.extend(
                wrap(info.description, width)
                    .into_iter()
                    .map(|l| PanelLine::new(l, LineStyle::Body)),
            );
            lines
        }
        None => vec![PanelLine::new(HOVER_HINT, LineStyle::Dim)],
    }
}
