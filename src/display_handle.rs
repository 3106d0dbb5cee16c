use std::fmt::Debug;
use std::io;

/// An in-place updatable rich display owned by the host environment.
///
/// Notebook frontends (Jupyter-style kernels, evcxr, IDE notebook panes)
/// manage their own display cells; this crate never talks to a notebook
/// protocol directly. The host hands over a handle to one display area and
/// the notebook renderer replaces its content on every frame.
pub trait DisplayHandle: Debug + Send + Sync {
    /// Replace the display content with `html`.
    ///
    /// Must update the existing display area rather than appending a new
    /// output cell, or every frame becomes a new line of output.
    fn replace(&self, html: &str) -> io::Result<()>;

    /// Remove the display area entirely.
    ///
    /// Called on a non-leaving finish; a handle that cannot remove itself
    /// may blank its content instead.
    fn close(&self) -> io::Result<()>;
}
