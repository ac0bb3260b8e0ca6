//! Recursive descent parser for type-definition documents.

use crate::ast::*;
use crate::lexer::{decode_block_string, decode_string, Lexer};
use crate::token::{DirectiveLocation, Token, TokenKind};
use nodegql_core::{diagnostics::codes, DiagnosticBag, Interner, Span, Text};

/// Parser for type-definition documents.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    /// End offset of the last consumed token.
    prev_end: u32,
    diagnostics: DiagnosticBag,
}

/// Result of parsing.
pub struct ParseResult {
    pub document: Document,
    pub diagnostics: DiagnosticBag,
}

/// Parses a source string into a document.
pub fn parse(source: &str, interner: &Interner) -> ParseResult {
    let mut parser = Parser::new(source, interner);
    let document = parser.parse_document();
    ParseResult {
        document,
        diagnostics: parser.diagnostics,
    }
}

/// Next token that is not a comma. Commas are insignificant between
/// fields, enum values, arguments and list items.
fn next_significant(lexer: &mut Lexer<'_>) -> Token {
    loop {
        let token = lexer.next_token();
        if token.kind != TokenKind::Comma {
            return token;
        }
    }
}

impl<'a> Parser<'a> {
    /// Creates a new parser.
    pub fn new(source: &'a str, interner: &'a Interner) -> Self {
        let mut lexer = Lexer::new(source, interner);
        let current = next_significant(&mut lexer);
        Self {
            lexer,
            current,
            prev_end: 0,
            diagnostics: DiagnosticBag::new(),
        }
    }

    #[inline]
    fn at(&self) -> TokenKind {
        self.current.kind
    }

    #[inline]
    fn at_kind(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    /// Advances to the next token.
    fn advance(&mut self) {
        self.prev_end = self.current.span.end;
        self.current = next_significant(&mut self.lexer);
    }

    /// Consumes `kind` if it is the current token.
    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at_kind(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expects a specific token kind.
    fn expect(&mut self, kind: TokenKind) -> bool {
        if self.eat(kind) {
            true
        } else {
            self.error_expected(kind.as_str());
            false
        }
    }

    fn current_text(&self) -> &'a str {
        self.lexer.span_text(self.current.span)
    }

    fn intern_current(&self) -> Text {
        self.lexer.intern_span(self.current.span)
    }

    fn span_from(&self, start: u32) -> Span {
        Span::new(start, self.prev_end.max(start))
    }

    /// Reports an error at the current token.
    fn error(&mut self, message: &str) {
        let code = if self.at_kind(TokenKind::Eof) {
            codes::UNEXPECTED_EOF
        } else {
            codes::INVALID_SYNTAX
        };
        self.diagnostics
            .error(code, "syntax error", self.current.span, message);
    }

    /// Reports an expected token error.
    fn error_expected(&mut self, expected: &str) {
        let code = if self.at_kind(TokenKind::Eof) {
            codes::UNEXPECTED_EOF
        } else {
            codes::UNEXPECTED_TOKEN
        };
        let found = self.at();
        self.diagnostics.error(
            code,
            "unexpected token",
            self.current.span,
            format!("expected {expected}, found {found}"),
        );
    }

    /// Parses a document.
    pub fn parse_document(&mut self) -> Document {
        let start = self.current.span.start;
        let mut definitions = Vec::new();

        while !self.at_kind(TokenKind::Eof) {
            if let Some(def) = self.parse_definition() {
                definitions.push(def);
            } else {
                self.synchronize();
            }
        }

        Document {
            definitions,
            span: Span::new(start, self.current.span.end),
        }
    }

    /// Skips the offending token, then everything up to the next token that
    /// can start a definition.
    fn synchronize(&mut self) {
        if !self.at_kind(TokenKind::Eof) {
            self.advance();
        }
        while !self.at_kind(TokenKind::Eof) && !self.at().starts_definition() {
            self.advance();
        }
    }

    /// Parses a definition.
    fn parse_definition(&mut self) -> Option<Definition> {
        let description = self.try_parse_description();

        match self.at() {
            TokenKind::Type => Some(Definition::Type(TypeDefinition::Object(
                self.parse_object_type(description),
            ))),
            TokenKind::Interface => Some(Definition::Type(TypeDefinition::Interface(
                self.parse_interface_type(description),
            ))),
            TokenKind::Union => Some(Definition::Type(TypeDefinition::Union(
                self.parse_union_type(description),
            ))),
            TokenKind::Enum => Some(Definition::Type(TypeDefinition::Enum(
                self.parse_enum_type(description),
            ))),
            TokenKind::Input => Some(Definition::Type(TypeDefinition::Input(
                self.parse_input_object_type(description),
            ))),
            TokenKind::Scalar => Some(Definition::Type(TypeDefinition::Scalar(
                self.parse_scalar_type(description),
            ))),
            TokenKind::Directive => Some(Definition::Directive(
                self.parse_directive_definition(description),
            )),
            TokenKind::Extend | TokenKind::Schema => {
                self.error("type extensions and schema definitions are not supported");
                None
            }
            _ => {
                self.error("expected definition");
                None
            }
        }
    }

    /// Tries to parse a description.
    fn try_parse_description(&mut self) -> Option<Description> {
        let value = match self.at() {
            TokenKind::StringLiteral => decode_string(self.current_text()),
            TokenKind::BlockStringLiteral => decode_block_string(self.current_text()),
            _ => return None,
        };
        let span = self.current.span;
        self.advance();
        Some(Description::new(value, span))
    }

    /// Parses a name. Keywords are valid names outside their keyword
    /// positions.
    fn parse_name(&mut self) -> Name {
        let span = self.current.span;
        let value = self.intern_current();
        if self.at_kind(TokenKind::Ident) || self.at().is_keyword() {
            self.advance();
        } else {
            self.error_expected("name");
        }
        Name::new(value, span)
    }

    /// Parses `implements A & B`.
    fn parse_implements(&mut self) -> Vec<Name> {
        let mut names = Vec::new();
        if !self.eat(TokenKind::Implements) {
            return names;
        }
        self.eat(TokenKind::Amp);
        names.push(self.parse_name());
        while self.eat(TokenKind::Amp) {
            names.push(self.parse_name());
        }
        names
    }

    /// Parses object type definition.
    fn parse_object_type(&mut self, description: Option<Description>) -> ObjectTypeDefinition {
        let start = description
            .as_ref()
            .map_or(self.current.span.start, |d| d.span.start);
        self.advance(); // type

        let name = self.parse_name();
        let implements = self.parse_implements();
        let directives = self.parse_directives();
        let fields = self.parse_fields_block();

        ObjectTypeDefinition {
            description,
            name,
            implements,
            directives,
            fields,
            span: self.span_from(start),
        }
    }

    /// Parses interface type definition.
    fn parse_interface_type(
        &mut self,
        description: Option<Description>,
    ) -> InterfaceTypeDefinition {
        let start = description
            .as_ref()
            .map_or(self.current.span.start, |d| d.span.start);
        self.advance(); // interface

        let name = self.parse_name();
        let implements = self.parse_implements();
        let directives = self.parse_directives();
        let fields = self.parse_fields_block();

        InterfaceTypeDefinition {
            description,
            name,
            implements,
            directives,
            fields,
            span: self.span_from(start),
        }
    }

    /// Parses union type definition.
    fn parse_union_type(&mut self, description: Option<Description>) -> UnionTypeDefinition {
        let start = description
            .as_ref()
            .map_or(self.current.span.start, |d| d.span.start);
        self.advance(); // union

        let name = self.parse_name();
        let directives = self.parse_directives();

        let mut members = Vec::new();
        if self.expect(TokenKind::Eq) {
            self.eat(TokenKind::Pipe);
            members.push(self.parse_name());
            while self.eat(TokenKind::Pipe) {
                members.push(self.parse_name());
            }
        }

        UnionTypeDefinition {
            description,
            name,
            directives,
            members,
            span: self.span_from(start),
        }
    }

    /// Parses enum type definition.
    fn parse_enum_type(&mut self, description: Option<Description>) -> EnumTypeDefinition {
        let start = description
            .as_ref()
            .map_or(self.current.span.start, |d| d.span.start);
        self.advance(); // enum

        let name = self.parse_name();
        let directives = self.parse_directives();

        let mut values = Vec::new();
        if self.expect(TokenKind::LBrace) {
            while !self.at_kind(TokenKind::RBrace) && !self.at_kind(TokenKind::Eof) {
                let before = self.current.span.start;
                let description = self.try_parse_description();
                let value_start = self.current.span.start;
                let name = self.parse_name();
                let directives = self.parse_directives();
                values.push(EnumValueDefinition {
                    description,
                    name,
                    directives,
                    span: self.span_from(value_start),
                });
                if self.current.span.start == before {
                    self.advance();
                }
            }
            self.expect(TokenKind::RBrace);
        }

        EnumTypeDefinition {
            description,
            name,
            directives,
            values,
            span: self.span_from(start),
        }
    }

    /// Parses input object type definition.
    fn parse_input_object_type(
        &mut self,
        description: Option<Description>,
    ) -> InputObjectTypeDefinition {
        let start = description
            .as_ref()
            .map_or(self.current.span.start, |d| d.span.start);
        self.advance(); // input

        let name = self.parse_name();
        let directives = self.parse_directives();

        let mut fields = Vec::new();
        if self.expect(TokenKind::LBrace) {
            fields = self.parse_input_value_definitions(TokenKind::RBrace);
            self.expect(TokenKind::RBrace);
        }

        InputObjectTypeDefinition {
            description,
            name,
            directives,
            fields,
            span: self.span_from(start),
        }
    }

    /// Parses scalar type definition.
    fn parse_scalar_type(&mut self, description: Option<Description>) -> ScalarTypeDefinition {
        let start = description
            .as_ref()
            .map_or(self.current.span.start, |d| d.span.start);
        self.advance(); // scalar

        let name = self.parse_name();
        let directives = self.parse_directives();

        ScalarTypeDefinition {
            description,
            name,
            directives,
            span: self.span_from(start),
        }
    }

    /// Parses `directive @name(args) repeatable on A | B`.
    fn parse_directive_definition(
        &mut self,
        description: Option<Description>,
    ) -> DirectiveDefinition {
        let start = description
            .as_ref()
            .map_or(self.current.span.start, |d| d.span.start);
        self.advance(); // directive

        self.expect(TokenKind::At);
        let name = self.parse_name();

        let arguments = if self.eat(TokenKind::LParen) {
            let args = self.parse_input_value_definitions(TokenKind::RParen);
            self.expect(TokenKind::RParen);
            args
        } else {
            Vec::new()
        };

        let repeatable = self.eat(TokenKind::Repeatable);

        let mut locations = Vec::new();
        if self.expect(TokenKind::On) {
            self.eat(TokenKind::Pipe);
            loop {
                let text = self.current_text();
                match DirectiveLocation::parse(text) {
                    Some(location) if self.at_kind(TokenKind::Ident) => {
                        locations.push(location);
                        self.advance();
                    }
                    _ => {
                        self.error_expected("directive location");
                        break;
                    }
                }
                if !self.eat(TokenKind::Pipe) {
                    break;
                }
            }
        }

        DirectiveDefinition {
            description,
            name,
            arguments,
            repeatable,
            locations,
            span: self.span_from(start),
        }
    }

    /// Parses `{ field... }` of an object or interface.
    fn parse_fields_block(&mut self) -> Vec<FieldDefinition> {
        let mut fields = Vec::new();
        if !self.expect(TokenKind::LBrace) {
            return fields;
        }

        while !self.at_kind(TokenKind::RBrace) && !self.at_kind(TokenKind::Eof) {
            let before = self.current.span.start;
            fields.push(self.parse_field_definition());
            if self.current.span.start == before {
                self.advance();
            }
        }

        self.expect(TokenKind::RBrace);
        fields
    }

    /// Parses a field definition.
    fn parse_field_definition(&mut self) -> FieldDefinition {
        let description = self.try_parse_description();
        let start = self.current.span.start;
        let name = self.parse_name();

        let arguments = if self.eat(TokenKind::LParen) {
            let args = self.parse_input_value_definitions(TokenKind::RParen);
            self.expect(TokenKind::RParen);
            args
        } else {
            Vec::new()
        };

        self.expect(TokenKind::Colon);
        let ty = self.parse_type();
        let directives = self.parse_directives();

        FieldDefinition {
            description,
            name,
            arguments,
            ty,
            directives,
            span: self.span_from(start),
        }
    }

    /// Parses input value definitions up to (not including) `close`.
    fn parse_input_value_definitions(&mut self, close: TokenKind) -> Vec<InputValueDefinition> {
        let mut values = Vec::new();

        while !self.at_kind(close) && !self.at_kind(TokenKind::Eof) {
            let before = self.current.span.start;
            let description = self.try_parse_description();
            let start = self.current.span.start;
            let name = self.parse_name();
            self.expect(TokenKind::Colon);
            let ty = self.parse_type();
            let default_value = if self.eat(TokenKind::Eq) {
                Some(self.parse_value())
            } else {
                None
            };
            let directives = self.parse_directives();

            values.push(InputValueDefinition {
                description,
                name,
                ty,
                default_value,
                directives,
                span: self.span_from(start),
            });

            if self.current.span.start == before {
                self.advance();
            }
        }

        values
    }

    /// Parses a type reference.
    fn parse_type(&mut self) -> Type {
        let start = self.current.span.start;

        let base = if self.eat(TokenKind::LBracket) {
            let inner = self.parse_type();
            self.expect(TokenKind::RBracket);
            Type::List(Box::new(inner), self.span_from(start))
        } else {
            let span = self.current.span;
            let name = self.intern_current();
            if self.at_kind(TokenKind::Ident) {
                self.advance();
            } else {
                self.error_expected("type");
            }
            Type::Named(NamedType { name, span })
        };

        if self.eat(TokenKind::Bang) {
            Type::NonNull(Box::new(base), self.span_from(start))
        } else {
            base
        }
    }

    /// Parses zero or more directive applications.
    fn parse_directives(&mut self) -> Vec<Directive> {
        let mut directives = Vec::new();

        while self.at_kind(TokenKind::At) {
            let start = self.current.span.start;
            self.advance();
            let name = self.parse_name();

            let mut arguments = Vec::new();
            if self.eat(TokenKind::LParen) {
                while !self.at_kind(TokenKind::RParen) && !self.at_kind(TokenKind::Eof) {
                    let before = self.current.span.start;
                    let arg_start = self.current.span.start;
                    let arg_name = self.parse_name();
                    self.expect(TokenKind::Colon);
                    let value = self.parse_value();
                    arguments.push(Argument {
                        name: arg_name,
                        value,
                        span: self.span_from(arg_start),
                    });
                    if self.current.span.start == before {
                        self.advance();
                    }
                }
                self.expect(TokenKind::RParen);
            }

            directives.push(Directive {
                name,
                arguments,
                span: self.span_from(start),
            });
        }

        directives
    }

    /// Parses a constant value.
    fn parse_value(&mut self) -> Value {
        let span = self.current.span;
        match self.at() {
            TokenKind::IntLiteral => {
                let value = self.current_text().parse::<i64>();
                self.advance();
                match value {
                    Ok(value) => Value::Int(value, span),
                    Err(_) => {
                        self.diagnostics.error(
                            codes::INVALID_SYNTAX,
                            "syntax error",
                            span,
                            "integer literal out of range",
                        );
                        Value::Null(span)
                    }
                }
            }
            TokenKind::FloatLiteral => {
                let value = self.current_text().parse::<f64>().unwrap_or_default();
                self.advance();
                Value::Float(value, span)
            }
            TokenKind::StringLiteral => {
                let value = decode_string(self.current_text());
                self.advance();
                Value::String(value, span)
            }
            TokenKind::BlockStringLiteral => {
                let value = decode_block_string(self.current_text());
                self.advance();
                Value::String(value, span)
            }
            TokenKind::True | TokenKind::False => {
                let value = self.at_kind(TokenKind::True);
                self.advance();
                Value::Boolean(value, span)
            }
            TokenKind::Null => {
                self.advance();
                Value::Null(span)
            }
            TokenKind::LBracket => {
                self.advance();
                let mut items = Vec::new();
                while !self.at_kind(TokenKind::RBracket) && !self.at_kind(TokenKind::Eof) {
                    let before = self.current.span.start;
                    items.push(self.parse_value());
                    if self.current.span.start == before {
                        self.advance();
                    }
                }
                self.expect(TokenKind::RBracket);
                Value::List(items, self.span_from(span.start))
            }
            TokenKind::LBrace => {
                self.advance();
                let mut entries = Vec::new();
                while !self.at_kind(TokenKind::RBrace) && !self.at_kind(TokenKind::Eof) {
                    let before = self.current.span.start;
                    let name = self.parse_name();
                    self.expect(TokenKind::Colon);
                    entries.push((name, self.parse_value()));
                    if self.current.span.start == before {
                        self.advance();
                    }
                }
                self.expect(TokenKind::RBrace);
                Value::Object(entries, self.span_from(span.start))
            }
            kind if kind == TokenKind::Ident || kind.is_keyword() => {
                Value::Enum(self.parse_name())
            }
            _ => {
                self.error_expected("value");
                Value::Null(span)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(source: &str, interner: &Interner) -> Document {
        let result = parse(source, interner);
        assert!(
            !result.diagnostics.has_errors(),
            "unexpected diagnostics: {:?}",
            result.diagnostics.iter().collect::<Vec<_>>()
        );
        result.document
    }

    #[test]
    fn test_parse_node_with_relationship() {
        let interner = Interner::new();
        let doc = parse_ok(
            r#"
            "A film."
            type Movie @node(labels: ["Movie", "Film"]) {
                title: String!
                actors: [Actor!]! @relationship(type: "ACTED_IN", direction: IN, properties: "ActedIn")
            }
            "#,
            &interner,
        );

        let Some(TypeDefinition::Object(movie)) = doc.types().next() else {
            panic!("expected object type");
        };
        assert_eq!(interner.get(movie.name.value), "Movie");
        assert_eq!(movie.description.as_ref().map(|d| d.value.as_str()), Some("A film."));
        assert_eq!(movie.fields.len(), 2);

        let actors = &movie.fields[1];
        assert!(matches!(actors.ty, Type::NonNull(..)));
        assert_eq!(interner.get(actors.ty.named().name), "Actor");
        let directive = &actors.directives[0];
        assert_eq!(interner.get(directive.name.value), "relationship");
        assert_eq!(directive.arguments.len(), 3);
        assert!(matches!(directive.arguments[1].value, Value::Enum(_)));

        let Value::List(labels, _) = &movie.directives[0].arguments[0].value else {
            panic!("expected list value");
        };
        assert_eq!(labels.len(), 2);
    }

    #[test]
    fn test_parse_interface_union_enum() {
        let interner = Interner::new();
        let doc = parse_ok(
            r#"
            interface Production { title: String! }
            type Movie implements Production & Node { title: String! }
            union Search = | Movie | Series
            enum Genre { ACTION "Comedy" COMEDY @deprecated }
            scalar DateTime
            "#,
            &interner,
        );

        let defs: Vec<_> = doc.types().collect();
        assert_eq!(defs.len(), 5);
        let TypeDefinition::Object(movie) = defs[1] else {
            panic!("expected object");
        };
        assert_eq!(movie.implements.len(), 2);
        let TypeDefinition::Union(search) = defs[2] else {
            panic!("expected union");
        };
        assert_eq!(search.members.len(), 2);
        let TypeDefinition::Enum(genre) = defs[3] else {
            panic!("expected enum");
        };
        assert_eq!(genre.values.len(), 2);
        assert_eq!(genre.values[1].directives.len(), 1);
    }

    #[test]
    fn test_commas_are_insignificant() {
        let interner = Interner::new();
        let doc = parse_ok(
            r#"
            type Movie { genre: Genre, home: String, }
            enum Genre { ACTION, COMEDY }
            input Range { min: Int, max: Int }
            "#,
            &interner,
        );

        let defs: Vec<_> = doc.types().collect();
        let TypeDefinition::Object(movie) = defs[0] else {
            panic!("expected object");
        };
        assert_eq!(movie.fields.len(), 2);
        assert_eq!(interner.get(movie.fields[1].name.value), "home");
        let TypeDefinition::Enum(genre) = defs[1] else {
            panic!("expected enum");
        };
        assert_eq!(genre.values.len(), 2);
        let TypeDefinition::Input(range) = defs[2] else {
            panic!("expected input");
        };
        assert_eq!(range.fields.len(), 2);
    }

    #[test]
    fn test_parse_directive_definition() {
        let interner = Interner::new();
        let doc = parse_ok(
            "directive @customDirectiveField(level: Int = 1) repeatable on FIELD_DEFINITION | OBJECT",
            &interner,
        );
        let def = doc.directive_definitions().next().unwrap();
        assert!(def.repeatable);
        assert_eq!(
            def.locations,
            vec![DirectiveLocation::FieldDefinition, DirectiveLocation::Object]
        );
        assert!(matches!(def.arguments[0].default_value, Some(Value::Int(1, _))));
    }

    #[test]
    fn test_field_named_like_keyword() {
        let interner = Interner::new();
        let doc = parse_ok("type Edge { type: String input: Int }", &interner);
        let Some(TypeDefinition::Object(edge)) = doc.types().next() else {
            panic!("expected object");
        };
        assert_eq!(interner.get(edge.fields[0].name.value), "type");
        assert_eq!(interner.get(edge.fields[1].name.value), "input");
    }

    #[test]
    fn test_errors_are_collected_with_recovery() {
        let interner = Interner::new();
        let result = parse(
            r#"
            type Broken { title String }
            type Fine { id: ID! }
            extend type Fine { name: String }
            "#,
            &interner,
        );

        assert!(result.diagnostics.error_count() >= 2);
        assert!(result.document.types().any(|t| interner.is(t.name().value, "Fine")));
    }

    #[test]
    fn test_unexpected_eof() {
        let interner = Interner::new();
        let result = parse("type Movie { title: ", &interner);
        assert!(result.diagnostics.contains_code(codes::UNEXPECTED_EOF));
    }
}
