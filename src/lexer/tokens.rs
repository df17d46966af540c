use lazy_static::lazy_static;
use std::{collections::HashMap, fmt::Display};

use crate::Span;

lazy_static! {
    pub static ref RESERVED_LOOKUP: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("node", TokenKind::Node);
        map.insert("say", TokenKind::Say);
        map.insert("choice", TokenKind::Choice);
        map.insert("goto", TokenKind::Goto);
        map.insert("if", TokenKind::If);
        map.insert("end", TokenKind::End);
        map.insert("true", TokenKind::True);
        map.insert("false", TokenKind::False);
        map
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    EOF,
    Newline,
    Indent,
    Dedent,

    Number,
    String,
    Identifier,

    InterpolationStart, // #{
    InterpolationEnd,   // }

    OpenParen,
    CloseParen,

    Assignment, // =
    Equals,     // ==
    Not,        // !
    NotEquals,  // !=

    Less,
    LessEquals,
    Greater,
    GreaterEquals,

    Or,
    And,

    PlusEquals,
    MinusEquals,
    StarEquals,
    SlashEquals,

    Plus,
    Dash,
    Slash,
    Star,

    At,
    Colon,
    Comma,

    // Reserved
    Node,
    Say,
    Choice,
    Goto,
    If,
    End,
    True,
    False,
}

impl TokenKind {
    /// Words that cannot be used as node or variable names.
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Node
                | TokenKind::Say
                | TokenKind::Choice
                | TokenKind::Goto
                | TokenKind::If
                | TokenKind::End
                | TokenKind::True
                | TokenKind::False
        )
    }

    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::EOF => "end of file",
            TokenKind::Newline => "end of line",
            TokenKind::Indent => "indentation",
            TokenKind::Dedent => "end of indented block",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Identifier => "identifier",
            TokenKind::InterpolationStart => "'#{'",
            TokenKind::InterpolationEnd => "'}'",
            TokenKind::OpenParen => "'('",
            TokenKind::CloseParen => "')'",
            TokenKind::Assignment => "'='",
            TokenKind::Equals => "'=='",
            TokenKind::Not => "'!'",
            TokenKind::NotEquals => "'!='",
            TokenKind::Less => "'<'",
            TokenKind::LessEquals => "'<='",
            TokenKind::Greater => "'>'",
            TokenKind::GreaterEquals => "'>='",
            TokenKind::Or => "'||'",
            TokenKind::And => "'&&'",
            TokenKind::PlusEquals => "'+='",
            TokenKind::MinusEquals => "'-='",
            TokenKind::StarEquals => "'*='",
            TokenKind::SlashEquals => "'/='",
            TokenKind::Plus => "'+'",
            TokenKind::Dash => "'-'",
            TokenKind::Slash => "'/'",
            TokenKind::Star => "'*'",
            TokenKind::At => "'@'",
            TokenKind::Colon => "':'",
            TokenKind::Comma => "','",
            TokenKind::Node => "'node'",
            TokenKind::Say => "'say'",
            TokenKind::Choice => "'choice'",
            TokenKind::Goto => "'goto'",
            TokenKind::If => "'if'",
            TokenKind::End => "'end'",
            TokenKind::True => "'true'",
            TokenKind::False => "'false'",
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.describe())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub span: Span,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::Identifier => write!(f, "identifier `{}`", self.value),
            TokenKind::Number => write!(f, "number `{}`", self.value),
            TokenKind::String => write!(f, "string {:?}", self.value),
            _ => write!(f, "{}", self.kind),
        }
    }
}

impl Token {
    pub fn is_one_of_many(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.kind)
    }
}
