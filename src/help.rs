use crate::terminal::Terminal;
use crossterm::style::Color;

/// Draw a centered, bordered help box into the buffer.
pub fn render_help_overlay(term: &mut Terminal, help_text: &str) {
    if help_text.is_empty() {
        return;
    }

    let (width, height) = term.size();
    let lines: Vec<&str> = help_text.lines().collect();
    let inner = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let box_w = inner + 4;
    let box_h = lines.len() + 2;
    let left = ((width as usize).saturating_sub(box_w) / 2) as i32;
    let top = ((height as usize).saturating_sub(box_h) / 2) as i32;

    let border = Some(Color::White);
    let horizontal = "─".repeat(box_w - 2);
    term.set_str(left, top, &format!("┌{}┐", horizontal), border, false);
    for (i, line) in lines.iter().enumerate() {
        let y = top + 1 + i as i32;
        let pad = inner - line.chars().count();
        term.set(left, y, '│', border, false);
        let text = format!(" {}{} ", line, " ".repeat(pad));
        term.set_str(left + 1, y, &text, Some(Color::Grey), false);
        term.set(left + box_w as i32 - 1, y, '│', border, false);
    }
    let bottom = top + box_h as i32 - 1;
    term.set_str(left, bottom, &format!("└{}┘", horizontal), border, false);
}
