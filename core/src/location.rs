/// A point in a source file. Lines are 1-based, columns are 0-based
/// (the `col_offset` convention of Python syntax trees).
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct Location {
    /// The file (or callable name) the location belongs to.
    pub file: String,
    /// The line number of the location.
    pub line: usize,
    /// The column offset of the location.
    pub column: usize,
}

impl Location {
    /// Creates a new `Location`.
    pub fn new(file: String, line: usize, column: usize) -> Self {
        Self { file, line, column }
    }

    /// Move the location by `delta` lines. Lines never drop below 1.
    pub fn shift_lines(&mut self, delta: isize) {
        let shifted = self.line as isize + delta;
        self.line = shifted.max(1) as usize;
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct Span {
    /// The starting location of the span.
    pub start: Location,
    /// The ending location of the span.
    pub end: Location,
}

impl Span {
    /// Creates a new `Span` from two `Location`s.
    pub fn new(start: Location, end: Location) -> Self {
        Self { start, end }
    }

    pub fn shift_lines(&mut self, delta: isize) {
        self.start.shift_lines(delta);
        self.end.shift_lines(delta);
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}
