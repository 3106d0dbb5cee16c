use std::fmt::{Debug, Formatter};
use std::sync::{Arc, Mutex};

use crate::term_like::TermLike;

/// An in-memory terminal for tests and headless capture.
///
/// This is just an [`Arc`] around its internal state, so it can be freely
/// cloned; a clone handed to [`DrawTarget::term_like`] shares its buffer
/// with the original. Only single-line redraw semantics are modeled, which
/// is all the terminal renderer produces.
///
/// [`DrawTarget::term_like`]: crate::DrawTarget::term_like
#[derive(Clone)]
pub struct InMemoryTerm {
    state: Arc<Mutex<InMemoryTermState>>,
}

impl InMemoryTerm {
    /// Creates an empty capture terminal of the given width.
    pub fn new(width: u16) -> InMemoryTerm {
        assert!(width > 0, "width must be > 0");
        InMemoryTerm {
            state: Arc::new(Mutex::new(InMemoryTermState {
                width,
                line: String::new(),
                committed: Vec::new(),
                frames: Vec::new(),
            })),
        }
    }

    /// Everything currently visible: committed lines plus the live line.
    pub fn contents(&self) -> String {
        let state = self.state.lock().unwrap();
        let mut lines = state.committed.clone();
        if !state.line.is_empty() {
            lines.push(state.line.clone());
        }
        lines.join("\n")
    }

    /// Every string written into the live line, in order.
    ///
    /// The terminal renderer writes each frame in one call, so this is the
    /// frame history; the redraw-throttling tests count it.
    pub fn frames(&self) -> Vec<String> {
        self.state.lock().unwrap().frames.clone()
    }

    /// Number of frames written so far.
    pub fn frame_count(&self) -> usize {
        self.state.lock().unwrap().frames.len()
    }
}

impl TermLike for InMemoryTerm {
    fn width(&self) -> u16 {
        self.state.lock().unwrap().width
    }

    fn write_str(&self, s: &str) -> std::io::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.line.push_str(s);
        state.frames.push(s.to_string());
        Ok(())
    }

    fn write_line(&self, s: &str) -> std::io::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.line.push_str(s);
        let line = std::mem::take(&mut state.line);
        state.committed.push(line);
        Ok(())
    }

    fn clear_line(&self) -> std::io::Result<()> {
        self.state.lock().unwrap().line.clear();
        Ok(())
    }

    fn flush(&self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Debug for InMemoryTerm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryTerm").finish_non_exhaustive()
    }
}

struct InMemoryTermState {
    width: u16,
    /// The live, not yet committed line.
    line: String,
    /// Lines committed by a newline.
    committed: Vec<String>,
    frames: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overwrite_replaces_the_live_line() {
        let term = InMemoryTerm::new(80);
        term.write_str("AAA").unwrap();
        assert_eq!(term.contents(), "AAA");

        term.clear_line().unwrap();
        term.write_str("BB").unwrap();
        assert_eq!(term.contents(), "BB");
        assert_eq!(term.frames(), vec!["AAA", "BB"]);
    }

    #[test]
    fn write_line_commits() {
        let term = InMemoryTerm::new(80);
        term.write_str("first").unwrap();
        term.write_line("").unwrap();
        term.write_str("second").unwrap();
        assert_eq!(term.contents(), "first\nsecond");

        // A cleared live line leaves only committed content behind.
        term.clear_line().unwrap();
        assert_eq!(term.contents(), "first");
    }

    #[test]
    fn clones_share_the_buffer() {
        let term = InMemoryTerm::new(80);
        let clone = term.clone();
        clone.write_str("shared").unwrap();
        assert_eq!(term.contents(), "shared");
    }
}
