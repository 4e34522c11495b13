use std::{
    collections::BTreeMap,
    io::{self, Stdout, Write},
    sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use crate::core::{
    Slot,
    error::{Error, Result},
    ports::DisplaySink,
};

/// In-memory set of named slots. Writes to an unregistered slot fail with
/// [`Error::MissingSlot`].
#[derive(Debug, Default)]
pub struct SlotBoard {
    slots: Mutex<BTreeMap<String, String>>,
}

impl SlotBoard {
    pub fn with_slots<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let slots = ids
            .into_iter()
            .map(|id| (id.into(), String::new()))
            .collect();
        Self {
            slots: Mutex::new(slots),
        }
    }

    /// Board owning the `days`, `hours`, `minutes` and `seconds` slots.
    pub fn standard() -> Self {
        Self::with_slots(Slot::ALL.iter().map(|slot| slot.as_str()))
    }

    pub fn get(&self, slot: &str) -> Option<String> {
        self.lock().ok()?.get(slot).cloned()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>> {
        self.slots
            .lock()
            .map_err(|_| Error::Display("slot board lock poisoned".into()))
    }
}

impl DisplaySink for SlotBoard {
    fn set_field(&self, slot: &str, value: &str) -> Result<()> {
        let mut slots = self.lock()?;
        let entry = slots
            .get_mut(slot)
            .ok_or_else(|| Error::MissingSlot(slot.to_string()))?;
        entry.clear();
        entry.push_str(value);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Redraw a single line in place with a carriage return.
    Inline,
    /// Print one line per update.
    Lines,
}

/// Renders the standard slots as `<title> DDd HHh MMm SSs` on every commit.
pub struct TerminalDisplay<W: Write = Stdout> {
    board: SlotBoard,
    title: Option<String>,
    mode: RenderMode,
    writer: Mutex<W>,
    /// An inline row has been drawn without its terminating newline.
    line_open: AtomicBool,
}

impl TerminalDisplay<Stdout> {
    pub fn stdout(title: Option<String>, mode: RenderMode) -> Self {
        Self::new(io::stdout(), title, mode)
    }
}

impl<W: Write> TerminalDisplay<W> {
    pub fn new(writer: W, title: Option<String>, mode: RenderMode) -> Self {
        Self {
            board: SlotBoard::standard(),
            title,
            mode,
            writer: Mutex::new(writer),
            line_open: AtomicBool::new(false),
        }
    }

    pub fn render_line(&self) -> String {
        let fields: Vec<String> = Slot::ALL
            .iter()
            .map(|slot| {
                let value = self.board.get(slot.as_str()).unwrap_or_default();
                format!("{value}{}", slot.unit())
            })
            .collect();
        match &self.title {
            Some(title) => format!("{title} {}", fields.join(" ")),
            None => fields.join(" "),
        }
    }

    pub fn into_writer(self) -> W {
        match self.writer.into_inner() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn writer(&self) -> Result<std::sync::MutexGuard<'_, W>> {
        self.writer
            .lock()
            .map_err(|_| Error::Display("terminal writer lock poisoned".into()))
    }
}

impl<W: Write + Send> DisplaySink for TerminalDisplay<W> {
    fn set_field(&self, slot: &str, value: &str) -> Result<()> {
        self.board.set_field(slot, value)
    }

    fn commit(&self) -> Result<()> {
        let line = self.render_line();
        let mut writer = self.writer()?;
        match self.mode {
            // Trailing spaces clear leftovers when the day count shrinks.
            RenderMode::Inline => {
                write!(writer, "\r{line}  ").map_err(io_error)?;
                self.line_open.store(true, Ordering::SeqCst);
            }
            RenderMode::Lines => writeln!(writer, "{line}").map_err(io_error)?,
        }
        writer.flush().map_err(io_error)
    }

    fn release(&self) -> Result<()> {
        if self.line_open.swap(false, Ordering::SeqCst) {
            let mut writer = self.writer()?;
            writeln!(writer).map_err(io_error)?;
            writer.flush().map_err(io_error)?;
        }
        Ok(())
    }
}

fn io_error(err: io::Error) -> Error {
    Error::Display(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_all(sink: &dyn DisplaySink, values: [&str; 4]) {
        for (slot, value) in Slot::ALL.iter().zip(values) {
            sink.set_field(slot.as_str(), value).expect("slot exists");
        }
        sink.commit().expect("commit");
    }

    #[test]
    fn board_rejects_unknown_slots() {
        let board = SlotBoard::with_slots(["days", "hours"]);
        board.set_field("days", "03").expect("known slot");
        assert_eq!(board.get("days").as_deref(), Some("03"));

        let err = board.set_field("seconds", "09").unwrap_err();
        assert_eq!(err, Error::MissingSlot("seconds".into()));
        assert!(err.to_string().contains("'seconds'"));
    }

    #[test]
    fn board_overwrites_previous_text() {
        let board = SlotBoard::standard();
        board.set_field("minutes", "59").unwrap();
        board.set_field("minutes", "07").unwrap();
        assert_eq!(board.get("minutes").as_deref(), Some("07"));
    }

    #[test]
    fn lines_mode_prints_one_row_per_commit() {
        let display = TerminalDisplay::new(Vec::new(), Some("Launch".into()), RenderMode::Lines);
        write_all(&display, ["01", "02", "03", "04"]);
        write_all(&display, ["01", "02", "03", "03"]);

        let output = String::from_utf8(display.into_writer()).unwrap();
        assert_eq!(output, "Launch 01d 02h 03m 04s\nLaunch 01d 02h 03m 03s\n");
    }

    #[test]
    fn inline_mode_redraws_and_release_ends_the_row() {
        let display = TerminalDisplay::new(Vec::new(), None, RenderMode::Inline);
        write_all(&display, ["120", "00", "00", "00"]);
        display.release().unwrap();
        // Nothing pending, so a second release adds nothing.
        display.release().unwrap();

        let output = String::from_utf8(display.into_writer()).unwrap();
        assert_eq!(output, "\r120d 00h 00m 00s  \n");
    }

    #[test]
    fn release_before_any_redraw_writes_nothing() {
        let inline = TerminalDisplay::new(Vec::new(), None, RenderMode::Inline);
        inline.release().unwrap();
        assert!(inline.into_writer().is_empty());

        let lines = TerminalDisplay::new(Vec::new(), None, RenderMode::Lines);
        write_all(&lines, ["01", "02", "03", "04"]);
        lines.release().unwrap();
        assert_eq!(String::from_utf8(lines.into_writer()).unwrap(), "01d 02h 03m 04s\n");
    }
}
