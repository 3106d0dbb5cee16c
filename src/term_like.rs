use std::fmt::Debug;
use std::io;

use console::Term;

/// A trait for minimal terminal-like behavior.
///
/// The terminal renderer only ever redraws one line in place, so the surface
/// it needs is small: write into the current line, clear it, commit it with a
/// newline, flush. Anything that implements this trait can be used as a draw
/// target via [`DrawTarget::term_like`].
///
/// [`DrawTarget::term_like`]: crate::DrawTarget::term_like
pub trait TermLike: Debug + Send + Sync {
    /// Return the terminal width in columns.
    fn width(&self) -> u16;

    /// Write a string into the current line without a newline.
    fn write_str(&self, s: &str) -> io::Result<()>;

    /// Write a string and add a newline.
    fn write_line(&self, s: &str) -> io::Result<()>;

    /// Clear the current line and reset the cursor to the beginning of it.
    fn clear_line(&self) -> io::Result<()>;

    /// Flush any buffered output to the underlying stream.
    fn flush(&self) -> io::Result<()>;
}

impl TermLike for Term {
    fn width(&self) -> u16 {
        self.size().1
    }

    fn write_str(&self, s: &str) -> io::Result<()> {
        self.write_str(s)
    }

    fn write_line(&self, s: &str) -> io::Result<()> {
        self.write_line(s)
    }

    fn clear_line(&self) -> io::Result<()> {
        self.clear_line()
    }

    fn flush(&self) -> io::Result<()> {
        self.flush()
    }
}
