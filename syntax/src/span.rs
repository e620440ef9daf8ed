/// Half-open byte span into the source string: `[start, end)`.
///
/// `start` and `end` must be valid UTF-8 slice boundaries for that same source string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Span {
        Span { start, end }
    }

    pub fn to(&self, other: Span) -> Span {
        Span {
            start: self.start,
            end: other.end,
        }
    }

    /// True when `offset` falls inside the span, counting the end boundary
    /// but not the start. This is the bias used by cursor queries: a cursor
    /// sitting at the end of a token still belongs to that token.
    pub fn touches_end(&self, offset: u32) -> bool {
        self.start < offset && offset <= self.end
    }
}
