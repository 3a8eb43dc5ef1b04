//! Code fence detection.
//!
//! Shared by the block `fence` rule and by the container closing-fence scan,
//! which must not see directive markers inside fenced code.

/// An opening code fence: three or more backticks or tildes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Fence {
    pub marker: u8,
    pub len: usize,
    /// Text after the fence run, untrimmed.
    pub info: String,
}

impl Fence {
    /// Detect an opening fence at the start of `text`.
    ///
    /// `text` must already have its indentation stripped. A backtick fence
    /// whose info string contains a backtick is not a fence.
    pub(crate) fn opening(text: &str) -> Option<Self> {
        let marker = *text.as_bytes().first()?;
        if marker != b'`' && marker != b'~' {
            return None;
        }

        let len = run_length(text, marker);
        if len < 3 {
            return None;
        }

        let info = &text[len..];
        if marker == b'`' && info.contains('`') {
            return None;
        }

        Some(Self {
            marker,
            len,
            info: info.to_owned(),
        })
    }

    /// Check whether `text` closes this fence.
    ///
    /// The closing run uses the same marker, is at least as long as the
    /// opening run and is followed only by whitespace.
    pub(crate) fn closes(&self, text: &str) -> bool {
        if text.as_bytes().first() != Some(&self.marker) {
            return false;
        }

        let count = run_length(text, self.marker);
        count >= self.len && text[count..].trim().is_empty()
    }

    /// The fence run, e.g. "```".
    pub(crate) fn markup(&self) -> String {
        char::from(self.marker).to_string().repeat(self.len)
    }
}

fn run_length(text: &str, marker: u8) -> usize {
    text.bytes().take_while(|&b| b == marker).count()
}

/// Tracks code fence state during line-by-line scanning.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    open: Option<Fence>,
}

impl FenceTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn in_fence(&self) -> bool {
        self.open.is_some()
    }

    /// Update fence state with the next line.
    ///
    /// Returns `true` if the line is a fence marker (opening or closing).
    pub(crate) fn update(&mut self, line: &str) -> bool {
        let trimmed = line.trim_start();

        match &self.open {
            Some(fence) => {
                if fence.closes(trimmed) {
                    self.open = None;
                    return true;
                }
                false
            }
            None => {
                self.open = Fence::opening(trimmed);
                self.open.is_some()
            }
        }
    }
}
