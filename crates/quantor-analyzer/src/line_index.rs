use rustpython_parser::text_size::TextSize;

/// Maps a byte offset into strategy source back to a 1-based line number,
/// for error messages — the AST nodes themselves only carry byte ranges.
pub struct LineIndex {
    line_starts: Vec<u32>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0u32];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push((i + 1) as u32);
            }
        }
        Self { line_starts }
    }

    pub fn line_number(&self, offset: TextSize) -> u32 {
        let offset: u32 = offset.into();
        match self.line_starts.binary_search(&offset) {
            Ok(idx) => (idx + 1) as u32,
            Err(idx) => idx as u32,
        }
    }
}
