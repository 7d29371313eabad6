//! Values produced by compiled grammars

use compact_str::CompactString;

/// Byte range of the input consumed by a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    /// Offset of the first consumed byte
    pub start: usize,
    /// Offset just past the last consumed byte
    pub end: usize,
}

impl Span {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The spanned slice of `source`, if the span lies inside it
    #[must_use]
    pub fn slice<'s>(&self, source: &'s str) -> Option<&'s str> {
        source.get(self.start..self.end)
    }
}

/// Parse tree produced by a [`Grammar`](super::Grammar).
///
/// Terminals produce [`Text`](ParseNode::Text), sequences and repetitions
/// produce [`Seq`](ParseNode::Seq), and every named-rule invocation is
/// wrapped in a [`Rule`](ParseNode::Rule) node carrying its name and span.
/// Alternations produce the value of the winning branch directly.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum ParseNode {
    /// Text matched by a literal, character range or wildcard
    Text(String),
    /// Values of a sequence or repetition, in order
    Seq(Vec<ParseNode>),
    /// A named rule invocation
    Rule {
        /// Name of the invoked rule
        name: CompactString,
        /// Input consumed by the invocation
        span: Span,
        /// Value of the rule body
        value: Box<ParseNode>,
    },
    /// An optional element that did not match
    Empty,
}

impl ParseNode {
    /// All matched text under this node, concatenated
    #[must_use]
    pub fn text(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Text(text) => out.push_str(text),
            Self::Seq(children) => {
                for child in children {
                    child.collect_text(out);
                }
            }
            Self::Rule { value, .. } => value.collect_text(out),
            Self::Empty => {}
        }
    }

    /// Name of the rule if this is a [`Rule`](ParseNode::Rule) node
    #[must_use]
    pub fn rule_name(&self) -> Option<&str> {
        match self {
            Self::Rule { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Span of the rule if this is a [`Rule`](ParseNode::Rule) node
    #[must_use]
    pub const fn span(&self) -> Option<Span> {
        match self {
            Self::Rule { span, .. } => Some(*span),
            _ => None,
        }
    }

    /// Direct children: the items of a `Seq`, or the value of a `Rule`
    #[must_use]
    pub fn children(&self) -> &[ParseNode] {
        match self {
            Self::Seq(children) => children,
            Self::Rule { value, .. } => std::slice::from_ref(&**value),
            Self::Text(_) | Self::Empty => &[],
        }
    }

    /// First rule node named `name`, searching depth-first from this node
    #[must_use]
    pub fn find_rule(&self, name: &str) -> Option<&ParseNode> {
        if self.rule_name() == Some(name) {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find_rule(name))
    }

    /// Every rule node named `name` in depth-first order, not descending into
    /// matches
    #[must_use]
    pub fn find_all_rules(&self, name: &str) -> Vec<&ParseNode> {
        let mut found = Vec::new();
        self.collect_rules(name, &mut found);
        found
    }

    fn collect_rules<'a>(&'a self, name: &str, found: &mut Vec<&'a ParseNode>) {
        if self.rule_name() == Some(name) {
            found.push(self);
            return;
        }
        for child in self.children() {
            child.collect_rules(name, found);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str, start: usize, end: usize, value: ParseNode) -> ParseNode {
        ParseNode::Rule {
            name: name.into(),
            span: Span::new(start, end),
            value: Box::new(value),
        }
    }

    #[test]
    fn test_text_concatenates_leaves() {
        let node = ParseNode::Seq(vec![
            ParseNode::Text("-".into()),
            ParseNode::Empty,
            rule("digits", 1, 3, ParseNode::Text("42".into())),
        ]);
        assert_eq!(node.text(), "-42");
    }

    #[test]
    fn test_find_rule_depth_first() {
        let tree = rule(
            "list",
            0,
            3,
            ParseNode::Seq(vec![
                rule("item", 0, 1, ParseNode::Text("a".into())),
                rule("item", 2, 3, ParseNode::Text("b".into())),
            ]),
        );
        let first = tree.find_rule("item").unwrap();
        assert_eq!(first.span(), Some(Span::new(0, 1)));
        assert_eq!(tree.find_all_rules("item").len(), 2);
        assert!(tree.find_rule("missing").is_none());
    }

    #[test]
    fn test_span_slice() {
        let span = Span::new(2, 5);
        assert_eq!(span.slice("0123456"), Some("234"));
        assert_eq!(span.len(), 3);
        assert_eq!(Span::new(5, 9).slice("0123"), None);
    }
}
