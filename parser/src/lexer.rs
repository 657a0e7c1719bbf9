use once_cell::sync::Lazy;
use regex::Regex;

pub type Span = std::ops::Range<usize>;

/// A run of characters within one normalized line.
///
/// `start` and `end` are byte offsets into the line the token was lexed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'input> {
    pub src: &'input str,
    pub start: usize,
    pub end: usize,
    pub ty: TokenType,
}

impl<'input> Token<'input> {
    pub fn span(&self) -> Span {
        self.start..self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    // Insignificant whitespace between words.
    Whitespace,

    // Maximal run of non-whitespace characters. Opcodes and operands alike;
    // which one a word is gets decided by its position in the line.
    Word,
}

use TokenType::*;

// The lexer tries to find these patterns in this order.
// Each one is anchored to the start of the slice being examined, so don't use ^.
// Separators are the ASCII set of `lines::is_separator`; Unicode spaces belong to words.
const PATTERNS: [(&str, TokenType); 2] = [
    (r"[ \t\n\x0B\x0C\r]+", Whitespace),
    (r"[^ \t\n\x0B\x0C\r]+", Word),
];

static COMPILED_PATTERNS: Lazy<Vec<(Regex, TokenType)>> = Lazy::new(|| {
    PATTERNS.iter()
        .map(|(pattern, token_type)| {
            assert!(!pattern.starts_with('^'));
            let regex = Regex::new(&format!("^{}", pattern)).expect("Invalid regex");
            (regex, *token_type)
        })
        .collect()
});

pub struct Lexer<'input> {
    src: &'input str,
    cur_pos: usize,
}

impl<'input> Lexer<'input> {
    pub fn new(src: &'input str) -> Lexer<'input> {
        Lexer { src, cur_pos: 0 }
    }

    fn tail(&self) -> &'input str {
        &self.src[self.cur_pos..]
    }
}

impl<'input> Iterator for Lexer<'input> {
    type Item = Token<'input>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.cur_pos;
        if self.src.len() <= start {
            return None;
        }

        for (pattern, token_type) in COMPILED_PATTERNS.iter() {
            if let Some(found) = pattern.find(self.tail()) {
                self.cur_pos += found.end();
                return Some(Token {
                    src: found.as_str(),
                    start,
                    end: self.cur_pos,
                    ty: *token_type,
                });
            }
        }

        unreachable!("every character is either whitespace or not");
    }
}

/// Split a normalized line into its words, in order.
pub fn tokenize(line: &str) -> Vec<Token> {
    Lexer::new(line)
        .filter(|token| token.ty == Word)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    fn word(src: &str, span: Span) -> Token {
        Token { src, start: span.start, end: span.end, ty: Word }
    }

    #[test]
    fn splits_on_whitespace_runs() {
        let line = "ADD  GF@x\tint@1 \t int@2";
        assert_eq!(
            vec![
                word("ADD",    0.. 3),
                word("GF@x",   5.. 9),
                word("int@1", 10..15),
                word("int@2", 18..23),
            ],
            tokenize(line));
    }

    #[test]
    fn keeps_whitespace_tokens_when_iterating() {
        let tokens = Lexer::new("a b").collect::<Vec<_>>();
        assert_eq!(
            vec![
                word("a", 0..1),
                Token { src: " ", start: 1, end: 2, ty: Whitespace },
                word("b", 2..3),
            ],
            tokens);
    }

    #[test]
    fn spans_are_byte_offsets() {
        let line = "WRITE string@žluťoučký kůň";
        let tokens = tokenize(line);
        assert_eq!(3, tokens.len());
        for token in tokens {
            assert_eq!(token.src, &line[token.span()]);
        }
    }

    #[test]
    fn unicode_spaces_stay_inside_words() {
        let line = "WRITE string@a\u{A0}b\u{3000}";
        assert_eq!(
            vec![
                word("WRITE", 0..5),
                word("string@a\u{A0}b\u{3000}", 6..line.len()),
            ],
            tokenize(line));
    }

    #[test]
    fn splits_on_vertical_tab_and_form_feed() {
        assert_eq!(vec!["a", "b", "c"], tokenize("a\x0Bb\x0Cc").iter().map(|token| token.src).collect::<Vec<_>>());
    }

    #[test]
    fn empty_line_has_no_tokens() {
        assert!(tokenize("").is_empty());
    }
}
