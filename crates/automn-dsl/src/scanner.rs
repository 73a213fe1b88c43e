//! Indentation scanner.
//!
//! Converts the indentation width of each logical line into layout markers.
//! It knows nothing about the grammar: feed it widths, get markers back.

/// A layout marker produced for one line or at end of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Indent,
    Dedent,
    Newline,
}

/// A line was dedented to a width that was never opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndentError {
    pub width: usize,
    /// Open levels at the time the line was reached, outermost first.
    pub levels: Vec<usize>,
}

/// Stack of open indentation widths, bottomed by a sentinel `0`.
#[derive(Debug, Clone)]
pub struct IndentScanner {
    levels: Vec<usize>,
    started: bool,
}

impl Default for IndentScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl IndentScanner {
    pub fn new() -> Self {
        Self {
            levels: vec![0],
            started: false,
        }
    }

    /// Width of the innermost open block.
    pub fn current(&self) -> usize {
        self.levels.last().copied().unwrap_or(0)
    }

    /// Number of blocks opened above the sentinel.
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    pub fn levels(&self) -> &[usize] {
        &self.levels
    }

    /// Markers for a non-blank line indented by `width` columns.
    ///
    /// The first line only opens a block when it is indented. Every later
    /// line is either deeper (`Indent`), a sibling (`Newline`), or closes one
    /// or more blocks (`Dedent`s followed by `Newline`).
    pub fn line(&mut self, width: usize) -> Result<Vec<Layout>, IndentError> {
        let top = self.current();
        if !self.started {
            self.started = true;
            if width > top {
                self.levels.push(width);
                return Ok(vec![Layout::Indent]);
            }
            return Ok(Vec::new());
        }

        if width > top {
            self.levels.push(width);
            return Ok(vec![Layout::Indent]);
        }
        if width == top {
            return Ok(vec![Layout::Newline]);
        }

        let before = self.levels.clone();
        let mut markers = Vec::new();
        while width < self.current() {
            self.levels.pop();
            markers.push(Layout::Dedent);
        }
        if self.current() != width {
            return Err(IndentError {
                width,
                levels: before,
            });
        }
        markers.push(Layout::Newline);
        Ok(markers)
    }

    /// Closes every open block. Returns the number of `Dedent`s owed.
    pub fn finish(&mut self) -> usize {
        let open = self.depth();
        self.levels.truncate(1);
        open
    }
}

/// Measures the indentation at the start of `line`.
///
/// Returns the width in columns and the number of bytes consumed. A space
/// counts one column, a tab `tab_width` columns, and a form feed resets the
/// count.
pub fn measure(line: &str, tab_width: usize) -> (usize, usize) {
    let mut width = 0;
    let mut consumed = 0;
    for byte in line.bytes() {
        match byte {
            b' ' => width += 1,
            b'\t' => width += tab_width,
            b'\x0C' => width = 0,
            _ => break,
        }
        consumed += 1;
    }
    (width, consumed)
}
