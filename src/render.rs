//! Human-readable output for scan reports.

use crate::schema::{Detection, ScanReport, SessionStatus, ValueType};
use colored::Colorize;

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderStyle {
    pub color: bool,
    pub hyperlinks: bool,
}

const NO_VALUE: &str = "<no value>";

fn heading(text: &str, color: bool) -> String {
    if color {
        text.bold().cyan().to_string()
    } else {
        text.to_string()
    }
}

fn hyperlink(url: &str, text: &str) -> String {
    format!("\x1b]8;;{url}\x1b\\{text}\x1b]8;;\x1b\\")
}

fn render_value(detection: &Detection, style: RenderStyle) -> String {
    match detection.value.as_deref() {
        None if style.color => NO_VALUE.dimmed().to_string(),
        None => NO_VALUE.to_string(),
        Some(value) if style.hyperlinks && detection.value_type == ValueType::Url => {
            hyperlink(value, value)
        }
        Some(value) => value.to_string(),
    }
}

fn render_status(report: &ScanReport, color: bool) -> String {
    let status = match report.status {
        SessionStatus::Completed => match report.completed_at_frame {
            Some(frame) => format!("completed at frame {frame}"),
            None => "completed".to_string(),
        },
        SessionStatus::Abandoned => "abandoned, partial results".to_string(),
        SessionStatus::Incomplete => "incomplete".to_string(),
    };
    let status = if !color {
        status
    } else if report.is_completed() {
        status.green().to_string()
    } else {
        status.yellow().to_string()
    };

    let mut line = format!(
        "{} {} ({} frame(s)",
        heading("Status:", color),
        status,
        report.frames_processed
    );
    if report.failed_frames > 0 {
        line.push_str(&format!(", {} failed", report.failed_frames));
    }
    line.push(')');
    line
}

pub fn render_report(report: &ScanReport, style: RenderStyle) -> String {
    let mut out = render_status(report, style.color);

    out.push('\n');
    out.push_str(&heading("Results:", style.color));
    if report.results.is_empty() {
        out.push_str(" none");
    }
    for (i, detection) in report.results.iter().enumerate() {
        out.push_str(&format!(
            "\n  {}. {} [{}, {}]",
            i + 1,
            render_value(detection, style),
            detection.value_type,
            detection.format
        ));
    }

    if !report.overlays.is_empty() {
        out.push('\n');
        out.push_str(&heading("Overlays:", style.color));
        for overlay in &report.overlays {
            let boxes: Vec<String> = overlay
                .boxes
                .iter()
                .map(|r| format!("({:.1}, {:.1})-({:.1}, {:.1})", r.left, r.top, r.right, r.bottom))
                .collect();
            out.push_str(&format!("\n  frame {}: {}", overlay.frame, boxes.join(" ")));
        }
    }
    out
}
