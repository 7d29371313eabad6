use crate::error::{GrammarError, ParseError};
use crate::grammar::{
    GrammarRule, ParseNode, RuleMap, Span, detect_left_recursion, parse_grammar_def,
    validate_references,
};
use crate::parser::{
    Expected, ParseConfig, ParseContext, ParseResult, Parser, Success, any_char, char_range,
    choice, literal, map, not, optional, repeat, seq,
};
use compact_str::CompactString;
use log::{debug, trace};
use std::str::FromStr;
use std::sync::{Arc, OnceLock, Weak};

/// Builder for [`Grammar`].
///
/// # Example
///
/// ```rust
/// use pegloom::{GrammarBuilder, GrammarRule, parse_grammar_def};
///
/// let rules = parse_grammar_def("list = item (',' item)*\nitem = 'a'..'z'+").unwrap();
/// let grammar = GrammarBuilder::from_rules(rules)
///     .rule("spaced", GrammarRule::seq([GrammarRule::literal(" "), GrammarRule::reference("item")]))
///     .start_rule("list")
///     .max_depth(64)
///     .build()
///     .unwrap();
///
/// assert!(grammar.parse_all("ab,cd").is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct GrammarBuilder {
    rules: RuleMap,
    start_rule: Option<CompactString>,
    config: ParseConfig,
    check_left_recursion: bool,
}

impl Default for GrammarBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GrammarBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::from_rules(RuleMap::default())
    }

    /// Start from an existing rule map, e.g. the output of
    /// [`parse_grammar_def`]
    #[must_use]
    pub fn from_rules(rules: RuleMap) -> Self {
        Self {
            rules,
            start_rule: None,
            config: ParseConfig::default(),
            check_left_recursion: true,
        }
    }

    /// Add or replace a rule
    #[must_use]
    pub fn rule(mut self, name: impl Into<CompactString>, rule: GrammarRule) -> Self {
        self.rules.insert(name.into(), rule);
        self
    }

    /// Set the start rule (defaults to the first rule)
    #[must_use]
    pub fn start_rule(mut self, name: impl Into<CompactString>) -> Self {
        self.start_rule = Some(name.into());
        self
    }

    #[must_use]
    pub const fn config(mut self, config: ParseConfig) -> Self {
        self.config = config;
        self
    }

    /// Bound the nesting of rule invocations in one parse
    #[must_use]
    pub const fn max_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    /// Skip left-recursion detection, for rule maps validated already.
    ///
    /// A left-recursive grammar built this way fails every parse that reaches
    /// the cycle with [`ParseError::RecursionLimit`].
    #[must_use]
    pub const fn skip_left_recursion_check(mut self) -> Self {
        self.check_left_recursion = false;
        self
    }

    /// Validate the rules and compile them into a [`Grammar`].
    ///
    /// # Errors
    ///
    /// Returns an error if there are no rules, a reference is undefined, a
    /// rule is left recursive, or the start rule does not exist.
    pub fn build(self) -> Result<Grammar, GrammarError> {
        if self.rules.is_empty() {
            return Err(GrammarError::Empty);
        }
        validate_references(&self.rules)?;
        if self.check_left_recursion {
            detect_left_recursion(&self.rules)?;
        }

        let start = match &self.start_rule {
            Some(name) => self
                .rules
                .get_index_of(name.as_str())
                .ok_or_else(|| GrammarError::UnknownStartRule { name: name.clone() })?,
            None => 0,
        };

        let table = RuleTable::new(self.rules);
        table.force_all();

        let grammar = Grammar {
            table,
            start,
            config: self.config,
        };
        debug!(
            "built grammar with {} rules, start rule `{}`",
            grammar.rules().len(),
            grammar.start_rule()
        );
        Ok(grammar)
    }
}

/// Compiled grammar producing [`ParseNode`] trees.
///
/// Cloning is cheap and a grammar can be shared across threads: all per-parse
/// state lives in the [`ParseContext`] of each call.
///
/// # Example
///
/// ```rust
/// use pegloom::compile;
///
/// let grammar = compile("number = '-'? '0'..'9'+ ('.' '0'..'9'+)?").unwrap();
/// let node = grammar.parse_all("-3.14").unwrap();
/// assert_eq!(node.text(), "-3.14");
///
/// let error = grammar.parse_all("abc").unwrap_err();
/// assert_eq!(error.to_string(), "Parse error at line 1, col 1: expected '-' or '0'..'9'");
/// ```
#[derive(Clone)]
pub struct Grammar {
    table: Arc<RuleTable>,
    start: usize,
    config: ParseConfig,
}

impl std::fmt::Debug for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grammar")
            .field("start_rule", &self.start_rule())
            .field("rules", &self.table.rules)
            .field("config", &self.config)
            .finish()
    }
}

impl Grammar {
    #[must_use]
    pub fn builder() -> GrammarBuilder {
        GrammarBuilder::new()
    }

    /// Name of the rule parsing starts from
    #[must_use]
    pub fn start_rule(&self) -> &str {
        self.table.name(self.start)
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.table.rules.keys().map(CompactString::as_str)
    }

    #[must_use]
    pub fn rules(&self) -> &RuleMap {
        &self.table.rules
    }

    #[must_use]
    pub const fn config(&self) -> &ParseConfig {
        &self.config
    }

    /// The start rule as a plain parser, for use with the combinators
    #[must_use]
    pub fn parser(&self) -> Parser<ParseNode> {
        self.invoker(self.start)
    }

    /// Parser for any named rule
    #[must_use]
    pub fn rule_parser(&self, name: &str) -> Option<Parser<ParseNode>> {
        self.table.rules.get_index_of(name).map(|id| self.invoker(id))
    }

    fn invoker(&self, id: usize) -> Parser<ParseNode> {
        let table = Arc::clone(&self.table);
        let name = self.table.name(id).to_string();
        Parser::new(move |ctx, pos| table.invoke(id, ctx, pos)).described(name)
    }

    /// Parse from the start rule at `pos` without requiring all input to be
    /// consumed.
    ///
    /// On failure the furthest failure seen anywhere in the attempt is
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns a [`Failure`](crate::Failure) if the start rule does not match.
    pub fn parse(&self, input: &str, pos: usize) -> ParseResult<ParseNode> {
        let mut ctx = ParseContext::with_config(input, self.config).tracking();
        let outcome = self.table.invoke(self.start, &mut ctx, pos);
        outcome.map_err(|failure| match ctx.take_furthest() {
            Some(furthest) => furthest.merge(failure),
            None => failure,
        })
    }

    /// Parse the whole input from the start rule.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] at the furthest failure offset, including
    /// "expected end of input" when the start rule matches only a prefix.
    pub fn parse_all(&self, input: &str) -> Result<ParseNode, ParseError> {
        self.parse_all_from(self.start, input)
    }

    /// Parse the whole input from the rule `name`, or `None` if there is no
    /// such rule.
    pub fn parse_rule(&self, name: &str, input: &str) -> Option<Result<ParseNode, ParseError>> {
        let id = self.table.rules.get_index_of(name)?;
        Some(self.parse_all_from(id, input))
    }

    fn parse_all_from(&self, id: usize, input: &str) -> Result<ParseNode, ParseError> {
        self.invoker(id)
            .parse_all_with(ParseContext::with_config(input, self.config).tracking())
    }
}

impl From<&Grammar> for Parser<ParseNode> {
    fn from(grammar: &Grammar) -> Self {
        grammar.parser()
    }
}

impl FromStr for Grammar {
    type Err = GrammarError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        compile(source)
    }
}

/// Build a grammar from a rule map, starting at `start_rule` or the first
/// rule.
///
/// # Errors
///
/// See [`GrammarBuilder::build`].
pub fn build_parser(rules: RuleMap, start_rule: Option<&str>) -> Result<Grammar, GrammarError> {
    let builder = GrammarBuilder::from_rules(rules);
    match start_rule {
        Some(name) => builder.start_rule(name),
        None => builder,
    }
    .build()
}

/// Parse, validate and build a grammar definition in one step.
///
/// # Errors
///
/// Returns any error from [`parse_grammar_def`] or [`GrammarBuilder::build`].
pub fn compile(source: &str) -> Result<Grammar, GrammarError> {
    build_parser(parse_grammar_def(source)?, None)
}

/// Rule arena: one lazily compiled parser slot per rule.
///
/// Reference nodes hold a weak handle to the arena plus the target's index
/// and look the parser up at call time, so rules can refer to each other in
/// any order without building cyclic parser graphs.
struct RuleTable {
    rules: RuleMap,
    slots: Vec<OnceLock<Parser<ParseNode>>>,
    this: Weak<RuleTable>,
}

impl RuleTable {
    fn new(rules: RuleMap) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            slots: (0..rules.len()).map(|_| OnceLock::new()).collect(),
            rules,
            this: this.clone(),
        })
    }

    /// Compile every slot now so no parse ever builds a parser
    fn force_all(&self) {
        for id in 0..self.slots.len() {
            if self.body(id).is_some() {
                trace!("compiled rule `{}`", self.name(id));
            }
        }
    }

    fn name(&self, id: usize) -> &str {
        self.rules
            .get_index(id)
            .map_or("", |(name, _)| name.as_str())
    }

    fn body(&self, id: usize) -> Option<&Parser<ParseNode>> {
        let (_, rule) = self.rules.get_index(id)?;
        let slot = self.slots.get(id)?;
        Some(slot.get_or_init(|| self.compile(rule)))
    }

    /// Run rule `id` one nesting level deeper and wrap its value
    fn invoke(&self, id: usize, ctx: &mut ParseContext<'_>, pos: usize) -> ParseResult<ParseNode> {
        let Some(((name, _), body)) = self.rules.get_index(id).zip(self.body(id)) else {
            return Err(ctx.fail(pos, Expected::one("a defined rule")));
        };
        let success = ctx.nested(pos, |ctx| body.run(ctx, pos))?;
        Ok(Success::new(
            ParseNode::Rule {
                name: name.clone(),
                span: Span::new(pos, success.pos),
                value: Box::new(success.value),
            },
            success.pos,
        ))
    }

    fn compile(&self, rule: &GrammarRule) -> Parser<ParseNode> {
        match rule {
            GrammarRule::Literal(value) => map(literal(value.as_str()), ParseNode::Text),
            GrammarRule::CharRange { from, to } => {
                map(char_range(*from, *to), |c| ParseNode::Text(c.to_string()))
            }
            GrammarRule::Any => map(any_char(), |c| ParseNode::Text(c.to_string())),
            GrammarRule::Sequence(rules) => {
                sequence(rules.iter().map(|rule| self.compile(rule)).collect())
            }
            GrammarRule::Alternation(rules) => {
                choice(rules.iter().map(|rule| self.compile(rule)).collect())
            }
            GrammarRule::Repetition { rule, min, max } => {
                map(repeat(self.compile(rule), *min, *max), ParseNode::Seq)
            }
            GrammarRule::Optional(rule) => map(optional(self.compile(rule)), |value| {
                value.unwrap_or(ParseNode::Empty)
            }),
            GrammarRule::Negation { rule, then } => map(
                seq(not(self.compile(rule)), self.compile(then)),
                |((), value)| value,
            ),
            GrammarRule::Reference(name) => self.reference(name),
            GrammarRule::Action(rule) => self.compile(rule),
        }
    }

    fn reference(&self, name: &CompactString) -> Parser<ParseNode> {
        let expected = name.clone();
        let Some(id) = self.rules.get_index_of(name.as_str()) else {
            return Parser::new(move |ctx, pos| Err(ctx.fail(pos, Expected::one(expected.clone()))));
        };

        let table = self.this.clone();
        Parser::new(move |ctx, pos| match table.upgrade() {
            Some(table) => table.invoke(id, ctx, pos),
            None => Err(ctx.fail(pos, Expected::one(expected.clone()))),
        })
        .described(name.clone())
    }
}

/// Run every part in order, collecting their values
fn sequence(parts: Vec<Parser<ParseNode>>) -> Parser<ParseNode> {
    Parser::new(move |ctx, pos| {
        let mut values = Vec::with_capacity(parts.len());
        let mut cur = pos;
        for part in &parts {
            let success = part.run(ctx, cur)?;
            values.push(success.value);
            cur = success.pos;
        }
        Ok(Success::new(ParseNode::Seq(values), cur))
    })
}
