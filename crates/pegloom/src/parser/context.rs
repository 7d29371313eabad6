use super::{Expected, Failure};

/// Configuration options for a single parse.
///
/// # Example
///
/// ```rust
/// use pegloom::ParseConfig;
///
/// let config = ParseConfig::default().with_max_depth(64);
/// assert_eq!(config.max_depth, 64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseConfig {
    /// Maximum nesting of recursive parsers (`lazy` and named grammar rules)
    ///
    /// Deeply nested input can otherwise exhaust the call stack even for
    /// grammars without left recursion.
    pub max_depth: usize,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self { max_depth: 512 }
    }
}

impl ParseConfig {
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Per-call parsing state threaded through every parser.
///
/// A context is created for one parse call and dropped afterwards, which
/// keeps parsers themselves immutable: furthest-failure tracking and depth
/// accounting never touch shared state.
#[derive(Debug)]
pub struct ParseContext<'i> {
    input: &'i str,
    config: ParseConfig,
    depth: usize,
    track: bool,
    furthest: Option<Failure>,
    limit_exceeded_at: Option<usize>,
}

impl<'i> ParseContext<'i> {
    #[must_use]
    pub fn new(input: &'i str) -> Self {
        Self::with_config(input, ParseConfig::default())
    }

    #[must_use]
    pub const fn with_config(input: &'i str, config: ParseConfig) -> Self {
        Self {
            input,
            config,
            depth: 0,
            track: false,
            furthest: None,
            limit_exceeded_at: None,
        }
    }

    /// Enable furthest-failure tracking for this call
    #[must_use]
    pub fn tracking(mut self) -> Self {
        self.track = true;
        self
    }

    /// The whole input being parsed
    #[must_use]
    pub const fn input(&self) -> &'i str {
        self.input
    }

    /// Input from `pos` to the end, or `""` if `pos` is out of range
    #[must_use]
    pub fn rest(&self, pos: usize) -> &'i str {
        self.input.get(pos..).unwrap_or("")
    }

    #[must_use]
    pub const fn config(&self) -> &ParseConfig {
        &self.config
    }

    #[must_use]
    pub const fn is_tracking(&self) -> bool {
        self.track
    }

    /// Build a failure at `pos` and record it if tracking is enabled
    pub fn fail(&mut self, pos: usize, expected: Expected) -> Failure {
        let failure = Failure::new(pos, expected);
        self.record(&failure);
        failure
    }

    /// Record a failure produced elsewhere
    pub fn record(&mut self, failure: &Failure) {
        if !self.track {
            return;
        }
        self.furthest = Some(match self.furthest.take() {
            Some(furthest) => furthest.merge(failure.clone()),
            None => failure.clone(),
        });
    }

    /// The furthest failure recorded so far
    #[must_use]
    pub const fn furthest(&self) -> Option<&Failure> {
        self.furthest.as_ref()
    }

    pub fn take_furthest(&mut self) -> Option<Failure> {
        self.furthest.take()
    }

    /// Run `f` with furthest-failure recording switched off
    pub fn untracked<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let previous = std::mem::replace(&mut self.track, false);
        let result = f(self);
        self.track = previous;
        result
    }

    /// Offset at which the depth limit was hit, if it was
    #[must_use]
    pub const fn limit_exceeded_at(&self) -> Option<usize> {
        self.limit_exceeded_at
    }

    /// Run `f` one recursion level deeper.
    ///
    /// Fails without calling `f` once `max_depth` is reached; the first
    /// such offset is remembered so total parses can abort with a
    /// recursion-limit error instead of a misleading syntax error.
    pub fn nested<T>(
        &mut self,
        pos: usize,
        f: impl FnOnce(&mut Self) -> Result<T, Failure>,
    ) -> Result<T, Failure> {
        if self.depth >= self.config.max_depth {
            self.limit_exceeded_at.get_or_insert(pos);
            return Err(Failure::new(
                pos,
                Expected::one(format!("nesting below depth {}", self.config.max_depth)),
            ));
        }

        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_only_when_tracking() {
        let mut ctx = ParseContext::new("abc");
        ctx.fail(2, Expected::one("x"));
        assert!(ctx.furthest().is_none());

        let mut ctx = ParseContext::new("abc").tracking();
        ctx.fail(1, Expected::one("x"));
        ctx.fail(2, Expected::one("y"));
        ctx.fail(0, Expected::one("z"));
        let furthest = ctx.furthest().unwrap();
        assert_eq!(furthest.pos, 2);
        assert_eq!(furthest.expected.to_string(), "y");
    }

    #[test]
    fn test_nested_respects_limit() {
        let mut ctx = ParseContext::with_config("", ParseConfig::default().with_max_depth(1));
        let outcome = ctx.nested(0, |ctx| ctx.nested(0, |_| Ok(())));
        assert!(outcome.is_err());
        assert_eq!(ctx.limit_exceeded_at(), Some(0));
    }

    #[test]
    fn test_rest_out_of_range_is_empty() {
        let ctx = ParseContext::new("ab");
        assert_eq!(ctx.rest(1), "b");
        assert_eq!(ctx.rest(5), "");
    }
}
