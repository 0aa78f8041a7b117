//! Line splitting that keeps byte offsets into the original source.

/// One line of input, trimmed, with its position in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SourceLine<'src> {
    /// 1-based line number.
    pub number: usize,
    /// Byte offset of `text` within the source.
    pub offset: usize,
    /// The line without its terminator and surrounding whitespace.
    pub text: &'src str,
}

impl SourceLine<'_> {
    /// Prefix used for diagnostics raised on this line.
    pub fn prefix(&self) -> String {
        format!("line {}: ", self.number)
    }
}

/// Iterates over the lines of `src`.
///
/// A trailing newline does not produce an extra empty line.
pub(crate) fn source_lines(src: &str) -> impl Iterator<Item = SourceLine<'_>> {
    src.split_inclusive('\n')
        .scan(0usize, |offset, raw| {
            let start = *offset;
            *offset += raw.len();
            Some((start, raw))
        })
        .enumerate()
        .map(|(index, (start, raw))| {
            let body = raw.trim_end_matches(['\n', '\r']);
            let leading = body.len() - body.trim_start().len();
            SourceLine {
                number: index + 1,
                offset: start + leading,
                text: body.trim(),
            }
        })
}
