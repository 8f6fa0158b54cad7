//! Lexer (tokenizer) for C source code
//!
//! Converts raw source text into a lazy [`Token`] stream consumed by the parser.
//! [`Lexer`] is an [`Iterator`]: tokens are produced on demand and the sequence
//! ends with exactly one [`Token::Eof`]. Constructing a new lexer over the same
//! source restarts the sequence.
//!
//! `#include` and other preprocessor directives are skipped rather than
//! parsed; there is no macro expansion.

use super::ast::SourceLocation;
use std::fmt;

/// All token variants produced by the lexer.
///
/// Every variant carries a [`SourceLocation`] so that parse errors can report
/// an accurate line and column without a separate token→location table.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    IntLiteral(i32, SourceLocation),
    CharLiteral(i8, SourceLocation),
    StringLiteral(Vec<u8>, SourceLocation),

    // Identifiers
    Ident(String, SourceLocation),

    // Keywords
    Int(SourceLocation),
    Char(SourceLocation),
    Void(SourceLocation),
    Struct(SourceLocation),
    Sizeof(SourceLocation),
    If(SourceLocation),
    Else(SourceLocation),
    While(SourceLocation),
    For(SourceLocation),
    Return(SourceLocation),

    // Arithmetic
    Plus(SourceLocation),    // +
    Minus(SourceLocation),   // -
    Star(SourceLocation),    // *
    Slash(SourceLocation),   // /
    Percent(SourceLocation), // %

    // Comparison
    EqEq(SourceLocation),  // ==
    NotEq(SourceLocation), // !=
    Lt(SourceLocation),    // <
    Le(SourceLocation),    // <=
    Gt(SourceLocation),    // >
    Ge(SourceLocation),    // >=

    // Logical
    AndAnd(SourceLocation), // &&
    OrOr(SourceLocation),   // ||
    Bang(SourceLocation),   // !

    // Address-of
    Amp(SourceLocation), // &

    // Assignment
    Eq(SourceLocation),        // =
    PlusEq(SourceLocation),    // +=
    MinusEq(SourceLocation),   // -=
    StarEq(SourceLocation),    // *=
    SlashEq(SourceLocation),   // /=
    PercentEq(SourceLocation), // %=

    // Increment/Decrement
    PlusPlus(SourceLocation),   // ++
    MinusMinus(SourceLocation), // --

    // Member access
    Dot(SourceLocation),   // .
    Arrow(SourceLocation), // ->

    // Punctuation
    LParen(SourceLocation),    // (
    RParen(SourceLocation),    // )
    LBrace(SourceLocation),    // {
    RBrace(SourceLocation),    // }
    LBracket(SourceLocation),  // [
    RBracket(SourceLocation),  // ]
    Semicolon(SourceLocation), // ;
    Comma(SourceLocation),     // ,

    // End of file
    Eof(SourceLocation),
}

impl Token {
    /// Returns the source location where this token appears.
    pub fn location(&self) -> SourceLocation {
        match self {
            Token::IntLiteral(_, loc)
            | Token::CharLiteral(_, loc)
            | Token::StringLiteral(_, loc)
            | Token::Ident(_, loc)
            | Token::Int(loc)
            | Token::Char(loc)
            | Token::Void(loc)
            | Token::Struct(loc)
            | Token::Sizeof(loc)
            | Token::If(loc)
            | Token::Else(loc)
            | Token::While(loc)
            | Token::For(loc)
            | Token::Return(loc)
            | Token::Plus(loc)
            | Token::Minus(loc)
            | Token::Star(loc)
            | Token::Slash(loc)
            | Token::Percent(loc)
            | Token::EqEq(loc)
            | Token::NotEq(loc)
            | Token::Lt(loc)
            | Token::Le(loc)
            | Token::Gt(loc)
            | Token::Ge(loc)
            | Token::AndAnd(loc)
            | Token::OrOr(loc)
            | Token::Bang(loc)
            | Token::Amp(loc)
            | Token::Eq(loc)
            | Token::PlusEq(loc)
            | Token::MinusEq(loc)
            | Token::StarEq(loc)
            | Token::SlashEq(loc)
            | Token::PercentEq(loc)
            | Token::PlusPlus(loc)
            | Token::MinusMinus(loc)
            | Token::Dot(loc)
            | Token::Arrow(loc)
            | Token::LParen(loc)
            | Token::RParen(loc)
            | Token::LBrace(loc)
            | Token::RBrace(loc)
            | Token::LBracket(loc)
            | Token::RBracket(loc)
            | Token::Semicolon(loc)
            | Token::Comma(loc)
            | Token::Eof(loc) => *loc,
        }
    }

    /// Source text of a keyword or punctuator; `None` for literals,
    /// identifiers and end of file
    pub fn spelling(&self) -> Option<&'static str> {
        let text = match self {
            Token::Int(_) => "int",
            Token::Char(_) => "char",
            Token::Void(_) => "void",
            Token::Struct(_) => "struct",
            Token::Sizeof(_) => "sizeof",
            Token::If(_) => "if",
            Token::Else(_) => "else",
            Token::While(_) => "while",
            Token::For(_) => "for",
            Token::Return(_) => "return",
            Token::Plus(_) => "+",
            Token::Minus(_) => "-",
            Token::Star(_) => "*",
            Token::Slash(_) => "/",
            Token::Percent(_) => "%",
            Token::EqEq(_) => "==",
            Token::NotEq(_) => "!=",
            Token::Lt(_) => "<",
            Token::Le(_) => "<=",
            Token::Gt(_) => ">",
            Token::Ge(_) => ">=",
            Token::AndAnd(_) => "&&",
            Token::OrOr(_) => "||",
            Token::Bang(_) => "!",
            Token::Amp(_) => "&",
            Token::Eq(_) => "=",
            Token::PlusEq(_) => "+=",
            Token::MinusEq(_) => "-=",
            Token::StarEq(_) => "*=",
            Token::SlashEq(_) => "/=",
            Token::PercentEq(_) => "%=",
            Token::PlusPlus(_) => "++",
            Token::MinusMinus(_) => "--",
            Token::Dot(_) => ".",
            Token::Arrow(_) => "->",
            Token::LParen(_) => "(",
            Token::RParen(_) => ")",
            Token::LBrace(_) => "{",
            Token::RBrace(_) => "}",
            Token::LBracket(_) => "[",
            Token::RBracket(_) => "]",
            Token::Semicolon(_) => ";",
            Token::Comma(_) => ",",
            Token::IntLiteral(..)
            | Token::CharLiteral(..)
            | Token::StringLiteral(..)
            | Token::Ident(..)
            | Token::Eof(_) => return None,
        };
        Some(text)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::IntLiteral(n, _) => write!(f, "int literal {}", n),
            Token::CharLiteral(c, _) => {
                let byte = *c as u8;
                if byte.is_ascii_graphic() || byte == b' ' {
                    write!(f, "char literal '{}'", byte as char)
                } else {
                    write!(f, "char literal '\\x{:02x}'", byte)
                }
            }
            Token::StringLiteral(s, _) => {
                write!(f, "string literal \"{}\"", String::from_utf8_lossy(s))
            }
            Token::Ident(s, _) => write!(f, "identifier '{}'", s),
            Token::Eof(_) => write!(f, "end of file"),
            token => write!(f, "'{}'", token.spelling().unwrap_or_default()),
        }
    }
}

/// Reserved words and the token each produces
const KEYWORDS: [(&str, fn(SourceLocation) -> Token); 10] = [
    ("int", Token::Int),
    ("char", Token::Char),
    ("void", Token::Void),
    ("struct", Token::Struct),
    ("sizeof", Token::Sizeof),
    ("if", Token::If),
    ("else", Token::Else),
    ("while", Token::While),
    ("for", Token::For),
    ("return", Token::Return),
];

/// Lexer error type
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub message: String,
    pub location: SourceLocation,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lexer error at line {}, column {}: {}",
            self.location.line, self.location.column, self.message
        )
    }
}

impl std::error::Error for LexError {}

/// Character-level scanner producing [`Token`]s, lazily through
/// [`Iterator`] or all at once through [`Lexer::tokenize`]
#[derive(Debug, Clone)]
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    finished: bool,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            finished: false,
        }
    }

    /// Scan to end of input; the returned vector always ends with [`Token::Eof`]
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        self.collect()
    }

    /// Produce the next token, skipping whitespace, comments and directives.
    fn scan(&mut self) -> Result<Token, LexError> {
        loop {
            self.skip_whitespace_and_comments()?;

            // Directives are skipped whole; the line is not interpreted
            if self.peek() == Some('#') && self.at_line_start() {
                self.skip_preprocessor_directive();
                continue;
            }
            break;
        }

        if self.is_at_end() {
            return Ok(Token::Eof(self.current_location()));
        }

        self.next_token()
    }

    /// Get next token
    fn next_token(&mut self) -> Result<Token, LexError> {
        let loc = self.current_location();
        let ch = self.advance().ok_or_else(|| LexError {
            message: "Unexpected end of file".to_string(),
            location: loc,
        })?;

        match ch {
            '"' => self.string_literal(loc),
            '\'' => self.char_literal(loc),
            '0'..='9' => self.number_literal(ch, loc),
            'a'..='z' | 'A'..='Z' | '_' => Ok(self.identifier_or_keyword(ch, loc)),

            '+' => Ok(if self.match_char('+') {
                Token::PlusPlus(loc)
            } else if self.match_char('=') {
                Token::PlusEq(loc)
            } else {
                Token::Plus(loc)
            }),
            '-' => Ok(if self.match_char('-') {
                Token::MinusMinus(loc)
            } else if self.match_char('=') {
                Token::MinusEq(loc)
            } else if self.match_char('>') {
                Token::Arrow(loc)
            } else {
                Token::Minus(loc)
            }),
            '*' => Ok(if self.match_char('=') {
                Token::StarEq(loc)
            } else {
                Token::Star(loc)
            }),
            '/' => Ok(if self.match_char('=') {
                Token::SlashEq(loc)
            } else {
                Token::Slash(loc)
            }),
            '%' => Ok(if self.match_char('=') {
                Token::PercentEq(loc)
            } else {
                Token::Percent(loc)
            }),
            '=' => Ok(if self.match_char('=') {
                Token::EqEq(loc)
            } else {
                Token::Eq(loc)
            }),
            '!' => Ok(if self.match_char('=') {
                Token::NotEq(loc)
            } else {
                Token::Bang(loc)
            }),
            '<' => Ok(if self.match_char('=') {
                Token::Le(loc)
            } else {
                Token::Lt(loc)
            }),
            '>' => Ok(if self.match_char('=') {
                Token::Ge(loc)
            } else {
                Token::Gt(loc)
            }),
            '&' => Ok(if self.match_char('&') {
                Token::AndAnd(loc)
            } else {
                Token::Amp(loc)
            }),
            '|' => {
                if self.match_char('|') {
                    Ok(Token::OrOr(loc))
                } else {
                    Err(LexError {
                        message: "Unexpected character: '|'".to_string(),
                        location: loc,
                    })
                }
            }
            '.' => Ok(Token::Dot(loc)),
            '(' => Ok(Token::LParen(loc)),
            ')' => Ok(Token::RParen(loc)),
            '{' => Ok(Token::LBrace(loc)),
            '}' => Ok(Token::RBrace(loc)),
            '[' => Ok(Token::LBracket(loc)),
            ']' => Ok(Token::RBracket(loc)),
            ';' => Ok(Token::Semicolon(loc)),
            ',' => Ok(Token::Comma(loc)),

            _ => Err(LexError {
                message: format!("Unexpected character: '{}'", ch),
                location: loc,
            }),
        }
    }

    /// Parse string literal; the opening quote is already consumed
    fn string_literal(&mut self, loc: SourceLocation) -> Result<Token, LexError> {
        let mut bytes = Vec::new();

        while let Some(ch) = self.peek() {
            match ch {
                '"' => {
                    self.advance();
                    return Ok(Token::StringLiteral(bytes, loc));
                }
                '\n' => break,
                '\\' => {
                    self.advance();
                    bytes.push(self.escape_sequence()?);
                }
                _ => {
                    self.advance();
                    let mut buf = [0u8; 4];
                    bytes.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                }
            }
        }

        Err(LexError {
            message: "Unterminated string literal".to_string(),
            location: loc,
        })
    }

    /// Parse character literal; the opening quote is already consumed
    fn char_literal(&mut self, loc: SourceLocation) -> Result<Token, LexError> {
        let ch = self.advance().ok_or_else(|| LexError {
            message: "Unexpected end of file in character literal".to_string(),
            location: loc,
        })?;

        let value = match ch {
            '\\' => self.escape_sequence()? as i8,
            '\'' | '\n' => {
                return Err(LexError {
                    message: "Empty character literal".to_string(),
                    location: loc,
                });
            }
            _ if ch.is_ascii() => ch as u8 as i8,
            _ => {
                return Err(LexError {
                    message: format!("Non-ASCII character literal '{}'", ch),
                    location: loc,
                });
            }
        };

        if self.advance() != Some('\'') {
            return Err(LexError {
                message: "Expected closing quote in character literal".to_string(),
                location: self.current_location(),
            });
        }

        Ok(Token::CharLiteral(value, loc))
    }

    /// Decode one escape sequence; the backslash is already consumed
    fn escape_sequence(&mut self) -> Result<u8, LexError> {
        let loc = self.current_location();
        let escaped = self.advance().ok_or_else(|| LexError {
            message: "Unexpected end of file in escape sequence".to_string(),
            location: loc,
        })?;

        let value = match escaped {
            'a' => 0x07,
            'b' => 0x08,
            't' => b'\t',
            'n' => b'\n',
            'v' => 0x0b,
            'f' => 0x0c,
            'r' => b'\r',
            '\\' => b'\\',
            '"' => b'"',
            '\'' => b'\'',
            '0'..='7' => {
                let mut value = escaped.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match self.peek().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            self.advance();
                            value = value * 8 + digit;
                        }
                        None => break,
                    }
                }
                (value & 0xFF) as u8
            }
            'x' => {
                let mut value: u32 = 0;
                let mut digits = 0;
                while let Some(digit) = self.peek().and_then(|c| c.to_digit(16)) {
                    self.advance();
                    value = (value << 4 | digit) & 0xFFFF;
                    digits += 1;
                }
                if digits == 0 {
                    return Err(LexError {
                        message: "Invalid hex escape sequence: \\x".to_string(),
                        location: loc,
                    });
                }
                (value & 0xFF) as u8
            }
            _ => {
                return Err(LexError {
                    message: format!("Unknown escape sequence: \\{}", escaped),
                    location: loc,
                });
            }
        };

        Ok(value)
    }

    /// Parse numeric literal (decimal integers only)
    fn number_literal(
        &mut self,
        first_digit: char,
        loc: SourceLocation,
    ) -> Result<Token, LexError> {
        let mut num_str = String::new();
        num_str.push(first_digit);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                num_str.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if matches!(self.peek(), Some(c) if c.is_ascii_alphabetic() || c == '_') {
            return Err(LexError {
                message: format!("Invalid suffix on integer literal: {}", num_str),
                location: loc,
            });
        }

        let value = num_str.parse::<i32>().map_err(|_| LexError {
            message: format!("Invalid integer literal: {}", num_str),
            location: loc,
        })?;

        Ok(Token::IntLiteral(value, loc))
    }

    /// Identifier, or keyword when the word is reserved
    fn identifier_or_keyword(&mut self, first_char: char, loc: SourceLocation) -> Token {
        let mut word = String::from(first_char);
        while let Some(ch) = self.peek().filter(|c| c.is_ascii_alphanumeric() || *c == '_') {
            word.push(ch);
            self.advance();
        }

        match KEYWORDS.iter().find(|(name, _)| *name == word) {
            Some((_, keyword)) => keyword(loc),
            None => Token::Ident(word, loc),
        }
    }

    /// Consume blanks, newlines and both comment forms
    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some('\r') | Some('\n') | Some('\x0c') => {
                    self.advance();
                }
                Some('/') => {
                    if self.peek_ahead(1) == Some('/') {
                        self.skip_line_comment();
                    } else if self.peek_ahead(1) == Some('*') {
                        self.skip_block_comment()?;
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    /// Errors if the input ends before `*/`
    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let start_loc = self.current_location();
        self.advance(); // skip '/'
        self.advance(); // skip '*'

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance();
                self.advance();
                return Ok(());
            }
            self.advance();
        }

        Err(LexError {
            message: "Unterminated block comment".to_string(),
            location: start_loc,
        })
    }

    /// Skip a preprocessor directive up to the end of its line
    fn skip_preprocessor_directive(&mut self) {
        while let Some(ch) = self.peek() {
            self.advance();
            if ch == '\n' {
                break;
            }
        }
    }

    /// True when only whitespace precedes the cursor on the current line
    fn at_line_start(&self) -> bool {
        self.input[..self.position]
            .iter()
            .rev()
            .take_while(|&&c| c != '\n')
            .all(|c| c.is_whitespace())
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Consume one character, tracking line and column
    fn advance(&mut self) -> Option<char> {
        let ch = *self.input.get(self.position)?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

impl Iterator for Lexer {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let result = self.scan();
        if matches!(result, Ok(Token::Eof(_)) | Err(_)) {
            self.finished = true;
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<String> {
        let tokens = Lexer::new(source).tokenize().unwrap();
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_declaration_tokens() {
        let tokens = Lexer::new("char *s = \"hi\";").tokenize().unwrap();

        assert!(matches!(tokens[0], Token::Char(_)));
        assert!(matches!(tokens[1], Token::Star(_)));
        assert!(matches!(tokens[2], Token::Ident(ref s, _) if s == "s"));
        assert!(matches!(tokens[3], Token::Eq(_)));
        assert!(matches!(tokens[4], Token::StringLiteral(ref b, _) if b == b"hi"));
        assert!(matches!(tokens[5], Token::Semicolon(_)));
        assert!(matches!(tokens.last(), Some(Token::Eof(_))));
        assert_eq!(tokens.len(), 7);
    }

    #[test]
    fn test_longest_operator_wins() {
        assert_eq!(kinds("a->b--"), kinds("a -> b --"));
        assert_eq!(kinds("x+++y").len(), kinds("x ++ + y").len());
        let tokens = Lexer::new("i<=j&&k!=0").tokenize().unwrap();
        assert!(matches!(tokens[1], Token::Le(_)));
        assert!(matches!(tokens[3], Token::AndAnd(_)));
        assert!(matches!(tokens[5], Token::NotEq(_)));
    }

    #[test]
    fn test_comments_track_lines() {
        let source = "// header\nint a; /* spans\ntwo lines */ return a;";
        let tokens = Lexer::new(source).tokenize().unwrap();

        assert!(matches!(tokens[0], Token::Int(_)));
        assert_eq!(tokens[0].location().line, 2);
        assert!(matches!(tokens[3], Token::Return(_)));
        assert_eq!(tokens[3].location(), SourceLocation::new(3, 14));
    }

    #[test]
    fn test_unterminated_block_comment() {
        let mut lexer = Lexer::new("int x; /* never closed");
        let err = lexer.tokenize().unwrap_err();
        assert_eq!(err.message, "Unterminated block comment");
        assert_eq!(err.location, SourceLocation::new(1, 8));
    }

    #[test]
    fn test_unexpected_character() {
        let mut lexer = Lexer::new("int x = 1 @ 2;");
        let err = lexer.tokenize().unwrap_err();
        assert!(err.message.contains('@'));
        assert_eq!(err.location.column, 11);
    }

    #[test]
    fn test_string_literal_escapes() {
        let mut lexer = Lexer::new(r#""a\tb\n\101\x42\"""#);
        let tokens = lexer.tokenize().unwrap();

        match &tokens[0] {
            Token::StringLiteral(s, _) => assert_eq!(s, b"a\tb\nAB\""),
            other => panic!("Expected string literal, got {:?}", other),
        }
    }

    #[test]
    fn test_char_literal() {
        let mut lexer = Lexer::new(r"'a' '\n' '\0'");
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[0], Token::CharLiteral(97, _)));
        assert!(matches!(tokens[1], Token::CharLiteral(10, _)));
        assert!(matches!(tokens[2], Token::CharLiteral(0, _)));
    }

    #[test]
    fn test_preprocessor_skip() {
        let mut lexer = Lexer::new("#include \"test.h\"\nint x;");
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[0], Token::Int(_)));
        assert!(matches!(tokens[1], Token::Ident(ref s, _) if s == "x"));
    }

    #[test]
    fn test_lexer_is_lazy_and_restartable() {
        let source = "int a; @";
        let mut lexer = Lexer::new(source);

        // The bad character is only reached on demand
        assert!(matches!(lexer.next(), Some(Ok(Token::Int(_)))));
        assert!(matches!(lexer.next(), Some(Ok(Token::Ident(_, _)))));
        assert!(matches!(lexer.next(), Some(Ok(Token::Semicolon(_)))));
        assert!(matches!(lexer.next(), Some(Err(_))));
        assert!(lexer.next().is_none());

        let restarted: Vec<_> = Lexer::new(source).take(3).collect();
        assert!(restarted.iter().all(|t| t.is_ok()));
    }

    #[test]
    fn test_integer_literal_out_of_range() {
        let mut lexer = Lexer::new("99999999999");
        assert!(lexer.tokenize().is_err());
    }
}
