use std::iter::repeat;
use std::time::Duration;

use crate::state::Frame;

/// Controls how frames are formatted for display.
///
/// All fields are fixed once the tracker is built; styles are plain data and
/// can be shared freely between trackers.
#[derive(Clone, Debug)]
pub struct TrackerStyle {
    prefix: String,
    suffix: String,
    fill: char,
    rest: char,
    bar_width: usize,
}

impl Default for TrackerStyle {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            suffix: String::new(),
            fill: '█',
            rest: '-',
            bar_width: 40,
        }
    }
}

impl TrackerStyle {
    /// Sets the text shown before the bar.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Sets the text shown after the statistics.
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Sets the character used for the filled part of the bar.
    pub fn fill(mut self, fill: char) -> Self {
        self.fill = fill;
        self
    }

    /// Sets the character used for the unfilled part of the bar.
    pub fn rest(mut self, rest: char) -> Self {
        self.rest = rest;
        self
    }

    /// Sets the width of the bar in cells.
    pub fn bar_width(mut self, width: usize) -> Self {
        self.bar_width = width.max(1);
        self
    }

    /// Formats one terminal line for `frame`.
    pub(crate) fn line(&self, frame: &Frame) -> String {
        let filled = (self.bar_width as f64 * frame.fraction()) as usize;
        let mut out = String::new();
        if !self.prefix.is_empty() {
            out.push_str(&self.prefix);
            out.push(' ');
        }
        out.push('|');
        out.extend(repeat(self.fill).take(filled));
        out.extend(repeat(self.rest).take(self.bar_width - filled));
        out.push('|');
        out.push_str(&format!(
            " {:>5.1}% {}/{}",
            frame.percent(),
            frame.position(),
            frame.total()
        ));
        out.push_str(&format!(
            " [{}<{}, {:.2} it/s]",
            format_mmss(frame.elapsed().unwrap_or_default()),
            format_mmss(frame.eta().unwrap_or_default()),
            frame.per_sec()
        ));
        if !self.suffix.is_empty() {
            out.push(' ');
            out.push_str(&self.suffix);
        }
        out
    }

    /// Formats an HTML fragment for notebook display handles.
    ///
    /// Kept to elements every rich-display host understands; the host owns
    /// the cell, we only hand it replacement content.
    pub(crate) fn html(&self, frame: &Frame) -> String {
        format!(
            "<div>{prefix}<progress value=\"{pos}\" max=\"{total}\"></progress> \
             {pos}/{total} ({pct:.1}%){suffix}</div>",
            prefix = html_text(&self.prefix, "", " "),
            pos = frame.position(),
            total = frame.total(),
            pct = frame.percent(),
            suffix = html_text(&self.suffix, " ", ""),
        )
    }
}

fn html_text(s: &str, before: &str, after: &str) -> String {
    if s.is_empty() {
        return String::new();
    }
    let escaped = s
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    format!("{before}{escaped}{after}")
}

/// Formats a duration as `MM:SS`, the compact form used in the stats block.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Frame;

    #[test]
    fn line_embeds_bar_and_stats() {
        let style = TrackerStyle::default().bar_width(4);
        let frame = Frame::for_test(1, 4, Some(Duration::from_secs(61)), 2.0, false);
        assert_eq!(style.line(&frame), "|█---|  25.0% 1/4 [01:01<00:01, 2.00 it/s]");
    }

    #[test]
    fn line_carries_prefix_and_suffix() {
        let style = TrackerStyle::default()
            .bar_width(2)
            .prefix("fetch")
            .suffix("pages");
        let frame = Frame::for_test(2, 2, Some(Duration::from_secs(2)), 1.0, true);
        assert_eq!(
            style.line(&frame),
            "fetch |██| 100.0% 2/2 [00:02<00:00, 1.00 it/s] pages"
        );
    }

    #[test]
    fn custom_fill_glyphs() {
        let style = TrackerStyle::default().bar_width(4).fill('#').rest('.');
        let frame = Frame::for_test(2, 4, None, 0.0, false);
        assert_eq!(style.line(&frame), "|##..|  50.0% 2/4 [00:00<00:00, 0.00 it/s]");
    }

    #[test]
    fn html_replaces_in_place() {
        let style = TrackerStyle::default().prefix("a<b");
        let frame = Frame::for_test(3, 10, None, 0.0, false);
        assert_eq!(
            style.html(&frame),
            "<div>a&lt;b <progress value=\"3\" max=\"10\"></progress> 3/10 (30.0%)</div>"
        );
    }

    #[test]
    fn mmss_rollover() {
        assert_eq!(format_mmss(Duration::from_secs(0)), "00:00");
        assert_eq!(format_mmss(Duration::from_secs(59)), "00:59");
        assert_eq!(format_mmss(Duration::from_secs(600)), "10:00");
    }
}
