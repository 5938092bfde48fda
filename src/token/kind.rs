use serde::Serialize;
use std::fmt;

/// Closed set of token kinds produced by a tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    /// Text outside of `<?php ... ?>`
    InlineHtml,
    OpenTag,
    CloseTag,
    /// Whitespace run, never spanning more than one line break
    Whitespace,
    /// `//`, `#` or one line of a `/* */` comment
    Comment,
    DocCommentOpen,
    DocCommentClose,
    DocCommentStar,
    DocCommentWhitespace,
    DocCommentTag,
    DocCommentString,
    OpenParen,
    CloseParen,
    OpenCurly,
    CloseCurly,
    /// `[` used for index access
    OpenSquare,
    CloseSquare,
    /// `[` opening an array literal
    OpenShortArray,
    CloseShortArray,
    Keyword(Keyword),
    Operator(Operator),
    Variable,
    Identifier,
    StringLiteral,
    Number,
    Comma,
    Semicolon,
    Unknown,
}

impl TokenKind {
    pub fn is_whitespace(self) -> bool {
        matches!(self, TokenKind::Whitespace)
    }

    /// Any comment token, including every part of a doc comment.
    pub fn is_comment(self) -> bool {
        matches!(self, TokenKind::Comment) || self.is_doc_comment()
    }

    pub fn is_doc_comment(self) -> bool {
        matches!(
            self,
            TokenKind::DocCommentOpen
                | TokenKind::DocCommentClose
                | TokenKind::DocCommentStar
                | TokenKind::DocCommentWhitespace
                | TokenKind::DocCommentTag
                | TokenKind::DocCommentString
        )
    }

    /// Whitespace or comment: tokens that carry no code.
    pub fn is_trivia(self) -> bool {
        self.is_whitespace() || self.is_comment()
    }

    pub fn is_opener(self) -> bool {
        matches!(
            self,
            TokenKind::OpenParen
                | TokenKind::OpenCurly
                | TokenKind::OpenSquare
                | TokenKind::OpenShortArray
                | TokenKind::DocCommentOpen
        )
    }

    pub fn is_closer(self) -> bool {
        matches!(
            self,
            TokenKind::CloseParen
                | TokenKind::CloseCurly
                | TokenKind::CloseSquare
                | TokenKind::CloseShortArray
                | TokenKind::DocCommentClose
        )
    }

    /// Code brackets only; doc comment delimiters are paired but are not brackets.
    pub fn is_bracket(self) -> bool {
        (self.is_opener() || self.is_closer()) && !self.is_doc_comment()
    }

    /// The closer kind that pairs with this opener.
    pub fn closer(self) -> Option<TokenKind> {
        match self {
            TokenKind::OpenParen => Some(TokenKind::CloseParen),
            TokenKind::OpenCurly => Some(TokenKind::CloseCurly),
            TokenKind::OpenSquare => Some(TokenKind::CloseSquare),
            TokenKind::OpenShortArray => Some(TokenKind::CloseShortArray),
            TokenKind::DocCommentOpen => Some(TokenKind::DocCommentClose),
            _ => None,
        }
    }

    /// True when `self` and `other` form an opener/closer pair in either order.
    pub fn pairs_with(self, other: TokenKind) -> bool {
        self.closer() == Some(other) || other.closer() == Some(self)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Keyword(k) => write!(f, "keyword `{}`", k.as_str()),
            TokenKind::Operator(o) => write!(f, "operator `{}`", o.as_str()),
            other => write!(f, "{:?}", other),
        }
    }
}

macro_rules! keywords {
    ($($variant:ident => $text:literal),+ $(,)?) => {
        /// Reserved words recognized by the reference tokenizer.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum Keyword {
            $($variant),+
        }

        impl Keyword {
            pub const ALL: &'static [Keyword] = &[$(Keyword::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(Keyword::$variant => $text),+
                }
            }

            /// Case-insensitive lookup.
            pub fn from_word(word: &str) -> Option<Keyword> {
                let lower = word.to_ascii_lowercase();
                match lower.as_str() {
                    $($text => Some(Keyword::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

keywords! {
    Abstract => "abstract",
    And => "and",
    Array => "array",
    As => "as",
    Break => "break",
    Case => "case",
    Catch => "catch",
    Class => "class",
    Const => "const",
    Continue => "continue",
    Default => "default",
    Do => "do",
    Echo => "echo",
    Else => "else",
    ElseIf => "elseif",
    Extends => "extends",
    Final => "final",
    Finally => "finally",
    Fn => "fn",
    For => "for",
    Foreach => "foreach",
    Function => "function",
    If => "if",
    Implements => "implements",
    InstanceOf => "instanceof",
    Interface => "interface",
    Match => "match",
    Namespace => "namespace",
    New => "new",
    Or => "or",
    Private => "private",
    Protected => "protected",
    Public => "public",
    Return => "return",
    Static => "static",
    Switch => "switch",
    Throw => "throw",
    Trait => "trait",
    Try => "try",
    Use => "use",
    While => "while",
    Xor => "xor",
    Yield => "yield",
}

impl Keyword {
    /// Keywords that introduce a braced control structure.
    pub fn is_control_structure(self) -> bool {
        matches!(
            self,
            Keyword::If
                | Keyword::Else
                | Keyword::ElseIf
                | Keyword::Switch
                | Keyword::While
                | Keyword::For
                | Keyword::Foreach
                | Keyword::Do
                | Keyword::Try
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, Keyword::And | Keyword::Or | Keyword::Xor)
    }
}

macro_rules! operators {
    ($($variant:ident => $text:literal),+ $(,)?) => {
        /// Operator symbols recognized by the reference tokenizer.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum Operator {
            $($variant),+
        }

        impl Operator {
            pub const ALL: &'static [Operator] = &[$(Operator::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(Operator::$variant => $text),+
                }
            }
        }
    };
}

operators! {
    Assign => "=",
    PlusAssign => "+=",
    MinusAssign => "-=",
    MulAssign => "*=",
    DivAssign => "/=",
    ConcatAssign => ".=",
    ModAssign => "%=",
    PowAssign => "**=",
    CoalesceAssign => "??=",
    AndAssign => "&=",
    OrAssign => "|=",
    XorAssign => "^=",
    ShiftLeftAssign => "<<=",
    ShiftRightAssign => ">>=",
    Equal => "==",
    Identical => "===",
    NotEqual => "!=",
    NotIdentical => "!==",
    Less => "<",
    Greater => ">",
    LessEqual => "<=",
    GreaterEqual => ">=",
    Spaceship => "<=>",
    Plus => "+",
    Minus => "-",
    Mul => "*",
    Div => "/",
    Mod => "%",
    Pow => "**",
    Concat => ".",
    BooleanAnd => "&&",
    BooleanOr => "||",
    Not => "!",
    Coalesce => "??",
    InlineThen => "?",
    Colon => ":",
    ObjectOperator => "->",
    NullsafeObjectOperator => "?->",
    DoubleColon => "::",
    DoubleArrow => "=>",
    Increment => "++",
    Decrement => "--",
    BitAnd => "&",
    BitOr => "|",
    BitXor => "^",
    BitNot => "~",
    ShiftLeft => "<<",
    ShiftRight => ">>",
    Silence => "@",
    Ellipsis => "...",
}

impl Operator {
    pub fn is_assignment(self) -> bool {
        matches!(
            self,
            Operator::Assign
                | Operator::PlusAssign
                | Operator::MinusAssign
                | Operator::MulAssign
                | Operator::DivAssign
                | Operator::ConcatAssign
                | Operator::ModAssign
                | Operator::PowAssign
                | Operator::CoalesceAssign
                | Operator::AndAssign
                | Operator::OrAssign
                | Operator::XorAssign
                | Operator::ShiftLeftAssign
                | Operator::ShiftRightAssign
        )
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Operator::Equal
                | Operator::Identical
                | Operator::NotEqual
                | Operator::NotIdentical
                | Operator::Less
                | Operator::Greater
                | Operator::LessEqual
                | Operator::GreaterEqual
                | Operator::Spaceship
                | Operator::Coalesce
        )
    }

    /// Binary and ternary operators that are written with single spaces around them.
    pub fn is_spaced(self) -> bool {
        !matches!(
            self,
            Operator::ObjectOperator
                | Operator::NullsafeObjectOperator
                | Operator::DoubleColon
                | Operator::Increment
                | Operator::Decrement
                | Operator::Not
                | Operator::BitNot
                | Operator::Silence
                | Operator::Ellipsis
        )
    }
}

/// Operator spellings ordered longest first, for greedy matching.
pub(crate) fn operators_by_length() -> Vec<Operator> {
    let mut ops = Operator::ALL.to_vec();
    ops.sort_by(|a, b| b.as_str().len().cmp(&a.as_str().len()));
    ops
}
