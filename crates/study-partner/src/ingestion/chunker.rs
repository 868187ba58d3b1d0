//! Text chunking with sentence-boundary snapping and overlapping windows

use crate::error::{Error, Result};
use crate::types::Fragment;

/// Fixed-window text chunker.
///
/// Windows are `chunk_size` characters long. A window that does not reach the
/// end of the text is shortened to end just after its last `.` or `\n`, as long
/// as that break lies past the middle of the window. The next window starts
/// `overlap` characters before the previous one ended.
#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    /// Target chunk size in characters
    chunk_size: usize,
    /// Overlap between chunks in characters
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::Config("chunk_size must be greater than zero".to_string()));
        }
        if overlap >= chunk_size {
            return Err(Error::Config(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                overlap, chunk_size
            )));
        }

        Ok(Self { chunk_size, overlap })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split `text` into fragments attributed to `source`
    pub fn chunk(&self, text: &str, source: &str) -> Vec<Fragment> {
        let chars: Vec<char> = text.chars().collect();
        let len = chars.len();
        let mut fragments = Vec::new();
        let mut start = 0usize;

        while start < len {
            let mut end = start + self.chunk_size;

            if end < len {
                if let Some(break_point) = self.break_point(&chars[start..end]) {
                    end = start + break_point + 1;
                }
            } else {
                end = len;
            }

            let window: String = chars[start..end].iter().collect();
            fragments.push(Fragment::new(window.trim(), start, end, source));

            if end == len {
                break;
            }

            // Always move forward, even if a snapped window is shorter than the overlap
            start = end.saturating_sub(self.overlap).max(start + 1);
        }

        fragments
    }

    /// Last sentence or line break in the window, if it lies past the halfway mark
    fn break_point(&self, window: &[char]) -> Option<usize> {
        let pos = window.iter().rposition(|&c| c == '.' || c == '\n')?;
        (pos * 2 > self.chunk_size).then_some(pos)
    }
}
