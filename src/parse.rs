//! ICU message syntax to [`Message`] trees.

use std::collections::{BTreeMap, HashSet};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::ast::{FormatStyle, Message, MessageNode, OTHER, PluralKey};
use crate::error::ParseError;

static PLURAL_BLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\w+)\s*,\s*(plural|selectordinal)\s*,(?:\s*offset:\s*(\d+))?").unwrap()
});
static SELECT_BLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\w+)\s*,\s*select\s*,").unwrap());
static SIMPLE_BLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^\s*(\w+)\s*(?:,\s*(\w+)\s*(?:,(.*))?)?$").unwrap());

static QUOTED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"''|'([{}#<].*?)'").unwrap());
static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"_\x{FDDF}_(\d+)_").unwrap());
static TEXT_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#|<(/?)([A-Za-z][\w-]*)>").unwrap());

/// Parses `pattern`, treating `<tag>...</tag>` as markup.
pub fn parse(pattern: &str) -> Result<Message, ParseError> {
    parse_with(pattern, false)
}

/// Parses `pattern`; with `ignore_tag` set, `<...>` stays literal text.
pub fn parse_with(pattern: &str, ignore_tag: bool) -> Result<Message, ParseError> {
    let mut parser = Parser {
        literals: Vec::new(),
        shifts: Vec::new(),
        ignore_tag,
    };
    let pattern = parser.insert_placeholders(pattern);
    parser.parse_block(&pattern, 0, false)
}

struct Parser {
    literals: Vec<String>,
    /// `(end of placeholder in the rewritten pattern, bytes removed so far)`
    shifts: Vec<(usize, isize)>,
    ignore_tag: bool,
}

impl Parser {
    /// Swaps quoted sections for placeholders so their braces are not
    /// mistaken for syntax.
    fn insert_placeholders(&mut self, pattern: &str) -> String {
        let mut result = String::with_capacity(pattern.len());
        let mut last = 0;
        for caps in QUOTED_RE.captures_iter(pattern) {
            let Some(whole) = caps.get(0) else { continue };
            result.push_str(&pattern[last..whole.start()]);
            let text = caps.get(1).map_or("'", |quoted| quoted.as_str());
            let placeholder = placeholder(self.literals.len());
            self.literals.push(text.to_owned());
            result.push_str(&placeholder);
            last = whole.end();

            let previous = self.shifts.last().map_or(0, |(_, removed)| *removed);
            let removed = previous + whole.len() as isize - placeholder.len() as isize;
            self.shifts.push((result.len(), removed));
        }
        result.push_str(&pattern[last..]);
        result
    }

    /// Maps an offset in the rewritten pattern back to the source.
    fn source_offset(&self, offset: usize) -> usize {
        let removed = self
            .shifts
            .iter()
            .take_while(|(end, _)| *end <= offset)
            .last()
            .map_or(0, |(_, removed)| *removed);
        (offset as isize + removed).max(0) as usize
    }

    fn error(&self, message: impl Into<String>, offset: usize) -> ParseError {
        ParseError::new(message, self.source_offset(offset))
    }

    fn restore(&self, text: &str) -> String {
        PLACEHOLDER_RE
            .replace_all(text, |caps: &Captures| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|idx| self.literals.get(idx))
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_owned())
            })
            .into_owned()
    }

    fn parse_block(
        &self,
        pattern: &str,
        base: usize,
        in_plural: bool,
    ) -> Result<Message, ParseError> {
        let mut tokens = Vec::new();
        for part in self.extract_parts(pattern, base)? {
            match part.typ {
                ElementType::String => self.tokenize_text(&part, in_plural, &mut tokens),
                ElementType::Block => {
                    tokens.push(Token::Node(self.parse_element(&part, in_plural)?));
                }
            }
        }
        self.build_tree(tokens)
    }

    fn extract_parts(&self, pattern: &str, base: usize) -> Result<Vec<Element>, ParseError> {
        let mut prev_pos = 0;
        let mut brace_stack: Vec<usize> = Vec::new();
        let mut results = Vec::new();

        for (pos, c) in pattern.char_indices() {
            match c {
                '{' => {
                    if brace_stack.is_empty() {
                        let substr = &pattern[prev_pos..pos];
                        if !substr.is_empty() {
                            let offset = base + prev_pos;
                            results.push(Element::new(ElementType::String, substr, offset));
                        }
                        prev_pos = pos + 1;
                    }
                    brace_stack.push(pos);
                }
                '}' => {
                    if brace_stack.pop().is_none() {
                        return Err(self.error("unmatched '}'", base + pos));
                    }
                    if brace_stack.is_empty() {
                        // end of block
                        results.push(Element::new(
                            ElementType::Block,
                            &pattern[prev_pos..pos],
                            base + prev_pos,
                        ));
                        prev_pos = pos + 1;
                    }
                }
                _ => {}
            }
        }

        if let Some(open) = brace_stack.first() {
            return Err(self.error("unclosed '{'", base + open));
        }

        let substr = &pattern[prev_pos..];
        if !substr.is_empty() {
            results.push(Element::new(ElementType::String, substr, base + prev_pos));
        }

        Ok(results)
    }

    fn tokenize_text(&self, part: &Element, in_plural: bool, tokens: &mut Vec<Token>) {
        let text = part.value.as_str();
        let mut last = 0;
        for caps in TEXT_TOKEN_RE.captures_iter(text) {
            let Some(m) = caps.get(0) else { continue };
            let token = match caps.get(2) {
                None if in_plural => Token::Node(MessageNode::Pound),
                Some(_) if self.ignore_tag => continue,
                Some(name) if caps[1].is_empty() => {
                    Token::Open(name.as_str().to_owned(), part.offset + m.start())
                }
                Some(name) => Token::Close(name.as_str().to_owned(), part.offset + m.start()),
                None => continue,
            };
            self.push_text(&text[last..m.start()], tokens);
            tokens.push(token);
            last = m.end();
        }
        self.push_text(&text[last..], tokens);
    }

    fn push_text(&self, text: &str, tokens: &mut Vec<Token>) {
        if !text.is_empty() {
            tokens.push(Token::Node(MessageNode::literal(self.restore(text))));
        }
    }

    fn build_tree(&self, tokens: Vec<Token>) -> Result<Message, ParseError> {
        let mut stack: Vec<(String, usize, Message)> = Vec::new();
        let mut root = Message::new();

        for token in tokens {
            match token {
                Token::Node(node) => {
                    let current = stack.last_mut().map_or(&mut root, |(_, _, children)| children);
                    push_node(current, node);
                }
                Token::Open(name, offset) => stack.push((name, offset, Message::new())),
                Token::Close(name, offset) => {
                    let Some((open, _, children)) = stack.pop() else {
                        let message = format!("unmatched closing tag '</{name}>'");
                        return Err(self.error(message, offset));
                    };
                    if open != name {
                        return Err(self.error(
                            format!("closing tag '</{name}>' does not match '<{open}>'"),
                            offset,
                        ));
                    }
                    let current = stack.last_mut().map_or(&mut root, |(_, _, children)| children);
                    current.push(MessageNode::Tag { name, children });
                }
            }
        }

        match stack.pop() {
            Some((name, offset, _)) => Err(self.error(format!("unclosed tag '<{name}>'"), offset)),
            None => Ok(root),
        }
    }

    fn parse_element(&self, part: &Element, in_plural: bool) -> Result<MessageNode, ParseError> {
        let value = part.value.as_str();
        if let Some(caps) = PLURAL_BLOCK_RE.captures(value) {
            return self.parse_plural_block(part, &caps);
        }
        if let Some(caps) = SELECT_BLOCK_RE.captures(value) {
            return self.parse_select_block(part, &caps, in_plural);
        }
        if let Some(caps) = SIMPLE_BLOCK_RE.captures(value) {
            return self.parse_simple_block(part, &caps);
        }
        let message = format!("invalid placeholder '{{{}}}'", self.restore(value));
        Err(self.error(message, part.offset))
    }

    fn parse_simple_block(
        &self,
        part: &Element,
        caps: &Captures,
    ) -> Result<MessageNode, ParseError> {
        let name = caps[1].to_owned();
        let Some(kind) = caps.get(2) else {
            return Ok(MessageNode::Argument { name });
        };
        let style = match caps.get(3) {
            None => None,
            Some(style) => {
                let style = self.restore(style.as_str().trim());
                if style.is_empty() {
                    return Err(self.error("empty format style", part.offset + style_start(caps)));
                }
                Some(match style.strip_prefix("::") {
                    Some(skeleton) => FormatStyle::Skeleton(skeleton.trim().to_owned()),
                    None => FormatStyle::Named(style),
                })
            }
        };
        match kind.as_str() {
            "number" => Ok(MessageNode::Number { name, style }),
            "date" => Ok(MessageNode::Date { name, style }),
            "time" => Ok(MessageNode::Time { name, style }),
            other => Err(self.error(
                format!("unsupported argument type '{other}'"),
                part.offset + kind.start(),
            )),
        }
    }

    fn parse_plural_block(
        &self,
        part: &Element,
        caps: &Captures,
    ) -> Result<MessageNode, ParseError> {
        let name = caps[1].to_owned();
        let ordinal = &caps[2] == "selectordinal";
        let offset = match caps.get(3) {
            Some(offset) => offset.as_str().parse().map_err(|_| {
                self.error("plural offset out of range", part.offset + offset.start())
            })?,
            None => 0,
        };
        let header = caps.get(0).map_or(0, |m| m.end());

        let mut options = BTreeMap::new();
        for (key, message, key_offset) in
            self.parse_options(&part.value[header..], part.offset + header, true)?
        {
            let key = PluralKey::parse(&key).map_err(|err| self.error(err.message, key_offset))?;
            options.insert(key, message);
        }
        if !options.contains_key(&PluralKey::OTHER) {
            return Err(self.error(format!("missing 'other' option in '{name}'"), part.offset));
        }

        Ok(MessageNode::Plural {
            name,
            offset,
            options,
            ordinal,
        })
    }

    fn parse_select_block(
        &self,
        part: &Element,
        caps: &Captures,
        in_plural: bool,
    ) -> Result<MessageNode, ParseError> {
        let name = caps[1].to_owned();
        let header = caps.get(0).map_or(0, |m| m.end());

        let options: BTreeMap<_, _> = self
            .parse_options(&part.value[header..], part.offset + header, in_plural)?
            .into_iter()
            .map(|(key, message, _)| (key, message))
            .collect();
        if !options.contains_key(OTHER) {
            return Err(self.error(format!("missing 'other' option in '{name}'"), part.offset));
        }

        Ok(MessageNode::Select { name, options })
    }

    /// Reads a `(key {message})+` sequence.
    fn parse_options(
        &self,
        pattern: &str,
        base: usize,
        in_plural: bool,
    ) -> Result<Vec<(String, Message, usize)>, ParseError> {
        let parts = self.extract_parts(pattern, base)?;
        let mut seen = HashSet::new();
        let mut result = Vec::new();

        let mut parts = parts.into_iter().peekable();
        while let Some(part) = parts.next() {
            let key = part.value.trim();
            if part.typ == ElementType::Block || key.is_empty() {
                if part.typ == ElementType::String && parts.peek().is_none() {
                    break;
                }
                return Err(self.error("missing option key", part.offset));
            }
            if key.contains(char::is_whitespace) {
                return Err(self.error(format!("invalid option key '{key}'"), part.offset));
            }
            let key = self.restore(key);
            let key_offset = part.offset + (part.value.len() - part.value.trim_start().len());

            let Some(body) = parts.next().filter(|body| body.typ == ElementType::Block) else {
                return Err(self.error(format!("missing message for option '{key}'"), key_offset));
            };
            if !seen.insert(key.clone()) {
                return Err(self.error(format!("duplicate option '{key}'"), key_offset));
            }
            let message = self.parse_block(&body.value, body.offset, in_plural)?;
            result.push((key, message, key_offset));
        }

        if result.is_empty() {
            return Err(self.error("expected at least one option", base));
        }
        Ok(result)
    }
}

fn placeholder(idx: usize) -> String {
    const LITERAL_PLACEHOLDER: &str = "\u{FDDF}_";
    format!("_{LITERAL_PLACEHOLDER}{idx}_")
}

fn style_start(caps: &Captures) -> usize {
    caps.get(3).map_or(0, |m| m.start())
}

/// Appends `node`, merging adjacent literals.
fn push_node(message: &mut Message, node: MessageNode) {
    if let (Some(MessageNode::Literal { text }), MessageNode::Literal { text: next }) =
        (message.last_mut(), &node)
    {
        text.push_str(next);
        return;
    }
    message.push(node);
}

enum Token {
    Node(MessageNode),
    Open(String, usize),
    Close(String, usize),
}

#[derive(Debug, Clone)]
struct Element {
    typ: ElementType,
    value: String,
    offset: usize,
}

impl Element {
    fn new(typ: ElementType, value: impl Into<String>, offset: usize) -> Self {
        Self {
            typ,
            value: value.into(),
            offset,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElementType {
    String,
    Block,
}
