use super::format_tool_status;
use crossterm::cursor::{Hide, MoveToColumn, Show};
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{Clear, ClearType};
use crossterm::queue;
use std::io::{self, Stderr, Write};

/// Progress events fed to the indicator
#[derive(Debug, Clone)]
pub enum ActivityEvent {
    /// The model is generating; `iteration` is 1-based.
    Thinking { iteration: u32 },
    ToolStart { name: String, arguments: serde_json::Value },
    ToolEnd,
    Done,
}

/// Single transient status line, redrawn in place.
///
/// Nothing is left on screen after [`finish`](Self::finish), so regular
/// output printed afterwards is not interleaved with stale progress text.
pub struct ActivityIndicator<W: Write = Stderr> {
    out: W,
    name: String,
    current: String,
    active: bool,
}

impl ActivityIndicator<Stderr> {
    pub fn stderr(name: impl Into<String>) -> Self {
        Self::new(io::stderr(), name)
    }
}

impl<W: Write> ActivityIndicator<W> {
    pub fn new(out: W, name: impl Into<String>) -> Self {
        let name = name.into();
        let current = format!("{name} is thinking...");
        Self {
            out,
            name,
            current,
            active: false,
        }
    }

    pub fn start(&mut self) -> io::Result<()> {
        self.active = true;
        queue!(self.out, Hide)?;
        self.render()
    }

    /// Replace the displayed text.
    pub fn update(&mut self, status: impl Into<String>) -> io::Result<()> {
        self.current = status.into();
        if self.active {
            self.render()?;
        }
        Ok(())
    }

    pub fn on_event(&mut self, event: ActivityEvent) -> io::Result<()> {
        let text = match event {
            ActivityEvent::Thinking { iteration } if iteration > 1 => {
                format!("{} is thinking... (step {iteration})", self.name)
            }
            ActivityEvent::Thinking { .. } | ActivityEvent::ToolEnd => {
                format!("{} is thinking...", self.name)
            }
            ActivityEvent::ToolStart { name, arguments } => format_tool_status(&name, &arguments),
            ActivityEvent::Done => "done".to_string(),
        };
        self.update(text)
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    /// Erase the line and restore the cursor.
    pub fn finish(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        queue!(self.out, MoveToColumn(0), Clear(ClearType::CurrentLine), Show)?;
        self.out.flush()
    }

    pub fn into_inner(mut self) -> io::Result<W>
    where
        W: Default,
    {
        self.finish()?;
        Ok(std::mem::take(&mut self.out))
    }

    fn render(&mut self) -> io::Result<()> {
        queue!(
            self.out,
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            SetAttribute(Attribute::Dim),
            Print(format!("  {}", self.current)),
            SetAttribute(Attribute::Reset)
        )?;
        self.out.flush()
    }
}

impl<W: Write> Drop for ActivityIndicator<W> {
    fn drop(&mut self) {
        let _ = self.finish();
    }
}
