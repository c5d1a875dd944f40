//! Terminal painting using crossterm
//!
//! `Painter` is the host side of the decoration boundary: it records the
//! category of every character as spans arrive, keeps the search and
//! active-line decorations separately, and writes the buffer out with
//! 24-bit colour.

use std::io::Write;

use crossterm::{
    cursor, queue,
    style::{self, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, ClearType},
};

use crate::error::Result;
use crate::syntax::{Category, Color, DecorationSink, Style, ThemeProfile, UiSlot};

fn term_color(color: Color) -> style::Color {
    style::Color::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}

/// Decorated snapshot of one buffer
pub struct Painter {
    chars: Vec<char>,
    /// Category per character
    categories: Vec<Option<Category>>,
    search: Option<(usize, usize)>,
    active_line: Option<(usize, usize)>,
    line_numbers: bool,
}

impl Painter {
    pub fn new(text: &str) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let categories = vec![None; chars.len()];
        Self {
            chars,
            categories,
            search: None,
            active_line: None,
            line_numbers: false,
        }
    }

    /// Replace the text, dropping category decorations
    pub fn set_text(&mut self, text: &str) {
        self.chars = text.chars().collect();
        self.categories = vec![None; self.chars.len()];
    }

    pub fn set_search(&mut self, range: Option<(usize, usize)>) {
        self.search = range;
    }

    pub fn set_active_line(&mut self, range: Option<(usize, usize)>) {
        self.active_line = range;
    }

    pub fn set_line_numbers(&mut self, enabled: bool) {
        self.line_numbers = enabled;
    }

    /// Category painted at character `pos`
    pub fn category_at(&self, pos: usize) -> Option<&Category> {
        self.categories.get(pos).and_then(Option::as_ref)
    }

    fn in_range(range: Option<(usize, usize)>, pos: usize) -> bool {
        range.is_some_and(|(start, end)| start <= pos && pos < end)
    }

    /// Resolved style of character `pos`
    pub fn style_at(&self, pos: usize, theme: &ThemeProfile) -> Style {
        let mut style = theme.base_style();
        if Self::in_range(self.active_line, pos) {
            style = style.patch(theme.style_for(&Category::ActiveLine));
        }
        if let Some(category) = self.category_at(pos) {
            style = style.patch(theme.style_for(category));
        }
        if Self::in_range(self.search, pos) {
            style = style.patch(theme.style_for(&Category::SearchMatch));
        }
        style
    }

    /// Write the whole buffer to `out`, one run per style change
    pub fn render<W: Write>(&self, out: &mut W, theme: &ThemeProfile) -> Result<()> {
        let line_count = self.chars.iter().filter(|&&c| c == '\n').count() + 1;
        let gutter = line_count.to_string().len();
        let mut line = 1;
        let mut at_line_start = true;
        let mut run = String::new();
        let mut run_style: Option<Style> = None;

        for (pos, &ch) in self.chars.iter().enumerate() {
            if at_line_start && self.line_numbers {
                self.flush_run(out, &mut run, run_style)?;
                run_style = None;
                self.gutter(out, theme, line, gutter)?;
            }
            at_line_start = false;

            if ch == '\n' {
                self.flush_run(out, &mut run, run_style)?;
                run_style = None;
                queue!(out, ResetColor, Print('\n'))?;
                line += 1;
                at_line_start = true;
                continue;
            }

            let style = self.style_at(pos, theme);
            if run_style != Some(style) {
                self.flush_run(out, &mut run, run_style)?;
                run_style = Some(style);
            }
            run.push(ch);
        }
        self.flush_run(out, &mut run, run_style)?;
        queue!(out, ResetColor)?;
        out.flush()?;
        Ok(())
    }

    fn flush_run<W: Write>(&self, out: &mut W, run: &mut String, style: Option<Style>) -> Result<()> {
        if run.is_empty() {
            return Ok(());
        }
        if let Some(style) = style {
            if let Some(fg) = style.fg {
                queue!(out, SetForegroundColor(term_color(fg)))?;
            }
            if let Some(bg) = style.bg {
                queue!(out, SetBackgroundColor(term_color(bg)))?;
            }
        }
        queue!(out, Print(run.as_str()))?;
        run.clear();
        Ok(())
    }

    fn gutter<W: Write>(&self, out: &mut W, theme: &ThemeProfile, line: usize, width: usize) -> Result<()> {
        queue!(
            out,
            SetForegroundColor(term_color(theme.ui(UiSlot::GutterForeground))),
            SetBackgroundColor(term_color(theme.ui(UiSlot::GutterBackground))),
            Print(format!("{line:>width$} ")),
            ResetColor
        )?;
        Ok(())
    }
}

impl DecorationSink for Painter {
    fn clear_categories(&mut self) {
        self.categories.iter_mut().for_each(|slot| *slot = None);
    }

    fn apply(&mut self, category: &Category, start: usize, end: usize) {
        let end = end.min(self.categories.len());
        for slot in self.categories.iter_mut().take(end).skip(start) {
            *slot = Some(category.clone());
        }
    }
}

/// Clear the screen and home the cursor before a repaint
pub fn clear_screen<W: Write>(out: &mut W) -> Result<()> {
    queue!(out, terminal::Clear(ClearType::All), cursor::MoveTo(0, 0))?;
    Ok(())
}
