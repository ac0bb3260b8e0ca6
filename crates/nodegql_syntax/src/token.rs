//! Token kinds and structures for type-definition documents.

use nodegql_core::Span;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum TokenKind {
    Eof,
    Error,

    Ident,
    IntLiteral,
    FloatLiteral,
    StringLiteral,
    BlockStringLiteral,

    // Definition keywords
    Type,
    Interface,
    Union,
    Enum,
    Input,
    Scalar,
    Directive,
    Extend,
    Schema,
    Implements,
    On,
    Repeatable,

    // Value keywords
    True,
    False,
    Null,

    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Colon,
    Comma,
    Eq,
    Pipe,
    Amp,
    At,
    Bang,
    Dollar,
}

/// Reserved words. Every keyword is still a valid name in name position.
const KEYWORDS: &[(&str, TokenKind)] = &[
    ("type", TokenKind::Type),
    ("interface", TokenKind::Interface),
    ("union", TokenKind::Union),
    ("enum", TokenKind::Enum),
    ("input", TokenKind::Input),
    ("scalar", TokenKind::Scalar),
    ("directive", TokenKind::Directive),
    ("extend", TokenKind::Extend),
    ("schema", TokenKind::Schema),
    ("implements", TokenKind::Implements),
    ("on", TokenKind::On),
    ("repeatable", TokenKind::Repeatable),
    ("true", TokenKind::True),
    ("false", TokenKind::False),
    ("null", TokenKind::Null),
];

impl TokenKind {
    #[must_use]
    pub fn is_keyword(self) -> bool {
        KEYWORDS.iter().any(|(_, kind)| *kind == self)
    }

    /// Returns true for tokens that can start a top-level definition.
    /// Descriptions count, since they precede the definition keyword.
    #[must_use]
    pub const fn starts_definition(self) -> bool {
        matches!(
            self,
            Self::Type
                | Self::Interface
                | Self::Union
                | Self::Enum
                | Self::Input
                | Self::Scalar
                | Self::Directive
                | Self::Extend
                | Self::Schema
                | Self::StringLiteral
                | Self::BlockStringLiteral
        )
    }

    /// Source text of a keyword or punctuator, or a placeholder for
    /// tokens with variable text.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        if let Some((text, _)) = KEYWORDS.iter().find(|(_, kind)| *kind == self) {
            return text;
        }
        match self {
            Self::Eof => "end of input",
            Self::Error => "invalid token",
            Self::Ident => "name",
            Self::IntLiteral => "integer",
            Self::FloatLiteral => "float",
            Self::StringLiteral | Self::BlockStringLiteral => "string",
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::Colon => ":",
            Self::Comma => ",",
            Self::Eq => "=",
            Self::Pipe => "|",
            Self::Amp => "&",
            Self::At => "@",
            Self::Bang => "!",
            Self::Dollar => "$",
            _ => "keyword",
        }
    }

    #[must_use]
    pub fn from_keyword(s: &str) -> Option<Self> {
        KEYWORDS
            .iter()
            .find(|(text, _)| *text == s)
            .map(|(_, kind)| *kind)
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A token with its kind and source span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    #[must_use]
    #[inline]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    #[must_use]
    #[inline]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }
}

/// Locations a directive definition may name after `on`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DirectiveLocation {
    Schema,
    Scalar,
    Object,
    FieldDefinition,
    ArgumentDefinition,
    Interface,
    Union,
    Enum,
    EnumValue,
    InputObject,
    InputFieldDefinition,
    Query,
    Mutation,
    Subscription,
    Field,
    FragmentDefinition,
    FragmentSpread,
    InlineFragment,
    VariableDefinition,
}

const LOCATIONS: &[(&str, DirectiveLocation)] = &[
    ("SCHEMA", DirectiveLocation::Schema),
    ("SCALAR", DirectiveLocation::Scalar),
    ("OBJECT", DirectiveLocation::Object),
    ("FIELD_DEFINITION", DirectiveLocation::FieldDefinition),
    ("ARGUMENT_DEFINITION", DirectiveLocation::ArgumentDefinition),
    ("INTERFACE", DirectiveLocation::Interface),
    ("UNION", DirectiveLocation::Union),
    ("ENUM", DirectiveLocation::Enum),
    ("ENUM_VALUE", DirectiveLocation::EnumValue),
    ("INPUT_OBJECT", DirectiveLocation::InputObject),
    ("INPUT_FIELD_DEFINITION", DirectiveLocation::InputFieldDefinition),
    ("QUERY", DirectiveLocation::Query),
    ("MUTATION", DirectiveLocation::Mutation),
    ("SUBSCRIPTION", DirectiveLocation::Subscription),
    ("FIELD", DirectiveLocation::Field),
    ("FRAGMENT_DEFINITION", DirectiveLocation::FragmentDefinition),
    ("FRAGMENT_SPREAD", DirectiveLocation::FragmentSpread),
    ("INLINE_FRAGMENT", DirectiveLocation::InlineFragment),
    ("VARIABLE_DEFINITION", DirectiveLocation::VariableDefinition),
];

impl DirectiveLocation {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        LOCATIONS
            .iter()
            .find(|(_, location)| *location == self)
            .map_or("", |(text, _)| text)
    }

    /// Parses a directive location name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        LOCATIONS
            .iter()
            .find(|(text, _)| *text == s)
            .map(|(_, location)| *location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords() {
        assert_eq!(TokenKind::from_keyword("implements"), Some(TokenKind::Implements));
        assert_eq!(TokenKind::from_keyword("Movie"), None);
        assert!(TokenKind::Null.is_keyword());
        assert!(!TokenKind::Ident.is_keyword());
        assert_eq!(TokenKind::Repeatable.to_string(), "repeatable");
        assert_eq!(TokenKind::Bang.as_str(), "!");
    }

    #[test]
    fn test_directive_locations() {
        for (text, location) in LOCATIONS {
            assert_eq!(DirectiveLocation::parse(text), Some(*location));
            assert_eq!(location.as_str(), *text);
        }
        assert_eq!(DirectiveLocation::parse("object"), None);
    }
}
