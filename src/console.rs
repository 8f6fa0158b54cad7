// Captured output of printf and assert

use crate::parser::ast::SourceLocation;

/// Console that records program output instead of writing it
#[derive(Debug, Clone, Default)]
pub struct Console {
    pub lines: Vec<ConsoleLine>,
}

/// A chunk of output with the source line that produced it. Bytes are kept
/// exactly as the program produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleLine {
    pub bytes: Vec<u8>,
    pub location: SourceLocation,
}

impl Console {
    pub fn new() -> Self {
        Console { lines: Vec::new() }
    }

    /// Print without newline
    pub fn print(&mut self, bytes: &[u8], location: SourceLocation) {
        if let Some(last) = self.lines.last_mut() {
            if last.location.line == location.line {
                last.bytes.extend_from_slice(bytes);
                return;
            }
        }
        self.lines.push(ConsoleLine {
            bytes: bytes.to_vec(),
            location,
        });
    }

    /// Everything printed, exactly as written
    pub fn bytes(&self) -> Vec<u8> {
        self.lines.iter().flat_map(|l| l.bytes.iter().copied()).collect()
    }

    /// Everything printed, with invalid UTF-8 replaced for display
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes()).into_owned()
    }

    /// Get all output as display lines
    pub fn get_output(&self) -> Vec<String> {
        let text = self.text();
        let mut result: Vec<String> = text.split('\n').map(|s| s.to_string()).collect();
        // Remove trailing empty string if text ended with newline
        if result.last().is_some_and(|s| s.is_empty()) {
            result.pop();
        }
        result
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
