use std::env;
use std::io;

use console::Term;
use log::debug;

use crate::display_handle::DisplayHandle;
use crate::state::Frame;
use crate::style::TrackerStyle;
use crate::term_like::TermLike;

/// Target for draw operations.
///
/// This tells a tracker where to paint to. The renderer variant is picked
/// exactly once, when the target is constructed; the tracker itself never
/// branches on the host environment.
#[derive(Debug)]
pub struct DrawTarget {
    kind: TargetKind,
}

impl DrawTarget {
    /// Draw to stderr.
    ///
    /// This is the default draw target for trackers. If stderr is not
    /// attended by a user the target downgrades to hidden, so piping to a
    /// file does not fill it with carriage returns.
    pub fn stderr() -> Self {
        Self::tty(Term::buffered_stderr())
    }

    /// Draw to stdout, with the same non-tty downgrade as [`stderr`].
    ///
    /// [`stderr`]: DrawTarget::stderr
    pub fn stdout() -> Self {
        Self::tty(Term::buffered_stdout())
    }

    fn tty(term: Term) -> Self {
        if !term.is_term() {
            debug!("output stream is not a terminal, hiding progress output");
            return Self::hidden();
        }
        Self::term_like(Box::new(term))
    }

    /// Draw a single overwritten line to any [`TermLike`] surface.
    pub fn term_like(term: Box<dyn TermLike>) -> Self {
        Self {
            kind: TargetKind::Terminal(TerminalRenderer { term }),
        }
    }

    /// Draw to a notebook display handle supplied by the host.
    pub fn notebook(handle: Box<dyn DisplayHandle>) -> Self {
        Self {
            kind: TargetKind::Notebook(NotebookRenderer { handle }),
        }
    }

    /// A hidden draw target.
    ///
    /// This forces a tracker to not be rendered at all; state keeps
    /// advancing as usual.
    pub fn hidden() -> Self {
        Self {
            kind: TargetKind::Hidden,
        }
    }

    /// Picks a target for the given host environment.
    ///
    /// Notebook hosts must hand over the display handle they own; without
    /// one the terminal path is used.
    pub fn auto(env: HostEnvironment, handle: Option<Box<dyn DisplayHandle>>) -> Self {
        match (env, handle) {
            (HostEnvironment::Notebook, Some(handle)) => Self::notebook(handle),
            _ => Self::stderr(),
        }
    }

    /// Returns true if the draw target is hidden.
    pub fn is_hidden(&self) -> bool {
        matches!(self.kind, TargetKind::Hidden)
    }

    pub(crate) fn kind_name(&self) -> &'static str {
        match self.kind {
            TargetKind::Terminal(_) => "terminal",
            TargetKind::Notebook(_) => "notebook",
            TargetKind::Hidden => "hidden",
        }
    }

    /// Renders one frame to the bound surface.
    pub(crate) fn render(&self, style: &TrackerStyle, frame: &Frame) -> io::Result<()> {
        match &self.kind {
            TargetKind::Terminal(renderer) => renderer.render(&style.line(frame)),
            TargetKind::Notebook(renderer) => renderer.render(&style.html(frame)),
            TargetKind::Hidden => Ok(()),
        }
    }

    /// Removes whatever the tracker has rendered.
    pub(crate) fn clear(&self) -> io::Result<()> {
        match &self.kind {
            TargetKind::Terminal(renderer) => renderer.clear(),
            TargetKind::Notebook(renderer) => renderer.clear(),
            TargetKind::Hidden => Ok(()),
        }
    }

    /// Commits the final frame so later output starts on a fresh line.
    pub(crate) fn leave(&self) -> io::Result<()> {
        match &self.kind {
            TargetKind::Terminal(renderer) => renderer.leave(),
            // Notebook cells are already standalone display areas.
            TargetKind::Notebook(_) | TargetKind::Hidden => Ok(()),
        }
    }
}

#[derive(Debug)]
enum TargetKind {
    Terminal(TerminalRenderer),
    Notebook(NotebookRenderer),
    Hidden,
}

/// Writes a single overwritten line, carriage-return style.
///
/// Holds no cross-call state: every frame clears the line and rewrites it
/// whole, and no newline is produced until a leaving finish.
#[derive(Debug)]
struct TerminalRenderer {
    term: Box<dyn TermLike>,
}

impl TerminalRenderer {
    fn render(&self, line: &str) -> io::Result<()> {
        self.term.clear_line()?;
        self.term.write_str(line)?;
        self.term.flush()
    }

    fn clear(&self) -> io::Result<()> {
        self.term.clear_line()?;
        self.term.flush()
    }

    fn leave(&self) -> io::Result<()> {
        self.term.write_line("")?;
        self.term.flush()
    }
}

/// Replaces the content of one host-owned display area.
#[derive(Debug)]
struct NotebookRenderer {
    handle: Box<dyn DisplayHandle>,
}

impl NotebookRenderer {
    fn render(&self, html: &str) -> io::Result<()> {
        self.handle.replace(html)
    }

    fn clear(&self) -> io::Result<()> {
        self.handle.close()
    }
}

/// The kind of display surface the process is running under.
///
/// Detection is peripheral glue: it only feeds [`DrawTarget::auto`], and
/// callers embedded in an actual notebook kernel should pass the answer they
/// already know instead of probing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostEnvironment {
    /// A plain terminal stream.
    Terminal,
    /// An interactive notebook display context.
    Notebook,
}

impl HostEnvironment {
    /// Best-effort probe for a notebook-style kernel.
    ///
    /// Jupyter-family kernels export `JPY_PARENT_PID` into the process
    /// environment; evcxr exposes itself the same way via `EVCXR`.
    pub fn detect() -> Self {
        if env::var_os("JPY_PARENT_PID").is_some() || env::var_os("EVCXR").is_some() {
            Self::Notebook
        } else {
            Self::Terminal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_swallows_everything() {
        let target = DrawTarget::hidden();
        assert!(target.is_hidden());
        let frame = Frame::for_test(1, 2, None, 0.0, false);
        target.render(&TrackerStyle::default(), &frame).unwrap();
        target.clear().unwrap();
        target.leave().unwrap();
    }

    #[test]
    fn auto_requires_a_handle_for_notebooks() {
        // A notebook environment without a handle cannot render in place;
        // it falls through to the terminal path instead of panicking.
        let target = DrawTarget::auto(HostEnvironment::Notebook, None);
        assert_ne!(target.kind_name(), "notebook");
    }
}
