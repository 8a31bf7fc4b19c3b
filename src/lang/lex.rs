use super::chars::*;
use super::codes;
use super::number;
use super::token::{Kind, Token};
use super::{Dialect, Error, LineNumber, Scope, ScopeStack, Statement};

/// Tokenize one source line, reading its line number from the text.
/// Lines that start with `#` are directives and have no line number.
pub fn lex(line: &str, dialect: Dialect) -> Result<Statement, Error> {
    let line = from_glyphs(line);
    let (line_number, rest) = parse_line_number(&line)?;
    let pos = line[..line.len() - rest.len()].chars().count();
    BasicLexer::new(&line, pos, line_number, dialect).lex()
}

/// Tokenize a line that carries no number of its own, such as one read
/// while `#autoline` is active.
pub fn lex_with_line_number(
    line: &str,
    line_number: LineNumber,
    dialect: Dialect,
) -> Result<Statement, Error> {
    let line = from_glyphs(line);
    BasicLexer::new(&line, 0, line_number, dialect).lex()
}

/// Split the leading line number from a source line, returning the number
/// and the remaining text. A single space after the number is dropped.
pub fn parse_line_number(line: &str) -> Result<(LineNumber, &str), Error> {
    if line.starts_with('#') {
        return Ok((None, line));
    }
    let body = line.trim_start();
    let digits = body
        .chars()
        .take(4)
        .take_while(|c| c.is_ascii_digit())
        .count();
    if digits == 0 {
        return Err(error!(InvalidLineNumber; "Line number is missing"));
    }
    let number = body[..digits]
        .parse::<u16>()
        .map_err(|_| error!(InvalidLineNumber; "Line number is missing"))?;
    let mut rest = &body[digits..];
    if let Some(c) = rest.chars().next() {
        if c.is_whitespace() {
            rest = &rest[c.len_utf8()..];
        }
    }
    if rest.is_empty() {
        return Err(error!(SyntaxError, Some(number); "Empty line"));
    }
    Ok((Some(number), rest))
}

/// What the previous keyword says about the next literal.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Hint {
    Binary,
    Comment,
    LineNumber,
}

struct BasicLexer {
    line: Vec<char>,
    pos: usize,
    line_number: LineNumber,
    dialect: Dialect,
    in_int_expression: bool,
    /// The whole statement started as an integer assignment.
    int_sub_statement: bool,
    hint: Option<Hint>,
    scope: ScopeStack,
    tokens: Vec<Token>,
}

impl BasicLexer {
    fn new(line: &str, pos: usize, line_number: LineNumber, dialect: Dialect) -> BasicLexer {
        BasicLexer {
            line: line.chars().collect(),
            pos,
            line_number,
            dialect,
            in_int_expression: false,
            int_sub_statement: false,
            hint: None,
            scope: ScopeStack::new(),
            tokens: vec![],
        }
    }

    fn lex(mut self) -> Result<Statement, Error> {
        while self.next_token()?.is_some() {}
        let tokens = drop_implied_spaces(self.tokens);
        tracing::trace!(line_number = ?self.line_number, tokens = tokens.len(), "lexed");
        Ok(Statement::new(self.line_number, tokens))
    }

    fn err(&self, msg: String) -> Error {
        error!(LexicalError, self.line_number; msg)
    }

    fn char_at(&self, at: usize) -> Option<char> {
        self.line.get(at).copied()
    }

    fn text(&self, start: usize, end: usize) -> String {
        self.line[start..end.min(self.line.len())].iter().collect()
    }

    fn last_token(&self) -> Option<&Token> {
        self.tokens.last()
    }

    fn last_significant(&self) -> Option<&Token> {
        self.tokens.iter().rev().find(|t| !t.is_whitespace())
    }

    fn capture(&mut self, token: Token) {
        self.tokens.push(token);
    }

    fn reset_int_expression(&mut self) {
        self.in_int_expression = false;
        self.int_sub_statement = false;
    }

    fn next_token(&mut self) -> Result<Option<Token>, Error> {
        let token = match self.token(false)? {
            Some(token) => token,
            None => return Ok(None),
        };
        let token = self.manage_token_state(token)?;
        if token.kind != Kind::Keyword {
            return Ok(Some(token));
        }
        if self.char_at(self.pos) == Some(' ') {
            let ws = self.process_whitespace();
            self.capture(ws);
        }
        match token.text.as_str() {
            "INT" => self.p_int()?,
            "BIN" => self.p_bin()?,
            "REM" | ";" => {
                let comment = self.process_to_end(Kind::Comment);
                self.capture(comment);
            }
            _ => {}
        }
        Ok(Some(token))
    }

    /// `INT {...}` suspends the integer expression until the closing brace.
    fn p_int(&mut self) -> Result<(), Error> {
        if self.char_at(self.pos) != Some('{') {
            return Ok(());
        }
        let in_int = self.in_int_expression;
        let int_sub = self.int_sub_statement;
        self.reset_int_expression();
        while self.next_token()?.is_some() {
            if self.last_token().map_or(false, |t| t.is_symbol("}")) {
                self.in_int_expression = in_int;
                self.int_sub_statement = int_sub;
                break;
            }
        }
        Ok(())
    }

    fn p_bin(&mut self) -> Result<(), Error> {
        let token = self.process_binary();
        if token.is_empty() || self.char_at(self.pos).map_or(false, is_digit) {
            return Err(self
                .err("BIN expects binary to follow".to_string())
                .in_column(&(token.pos..token.pos + 1)));
        }
        self.capture(token);
        Ok(())
    }

    fn manage_token_state(&mut self, mut token: Token) -> Result<Token, Error> {
        if token.kind == Kind::Identifier {
            let word = token.text.to_ascii_uppercase();
            if word == "DEF" {
                if let Some((peek, end)) = self.peek_token(self.pos)? {
                    if peek.is_keyword("FN") {
                        token = Token::keyword(codes::DEF_FN, token.pos);
                        self.pos = end;
                    }
                }
            } else if word == "OPEN" || word == "CLOSE" {
                if self.char_at(self.pos + 1) == Some('#') {
                    let code = if word == "OPEN" {
                        codes::OPEN_HASH
                    } else {
                        codes::CLOSE_HASH
                    };
                    token = Token::keyword(code, token.pos);
                    self.pos += 2;
                }
            } else if word == "GO" {
                if let Some((peek, end)) = self.peek_token(self.pos)? {
                    let sub = peek.kind == Kind::Identifier && peek.text.eq_ignore_ascii_case("SUB");
                    if sub || peek.is_keyword("TO") {
                        let code = if sub { codes::GO_SUB } else { codes::GO_TO };
                        token = Token::keyword(code, token.pos);
                        self.pos = end;
                    }
                }
            }
        }

        if self.dialect == Dialect::V208
            && token.is_code(codes::IF)
            && !self.statement_contains("THEN")
        {
            token = Token::keyword(codes::ELSEIF, token.pos);
        }

        if token.kind != Kind::Whitespace {
            if !token.is_symbol("%") {
                self.hint = None;
            }
            // the decoder writes this space back after every keyword
            if token.kind == Kind::Keyword
                && !token.is_code(codes::SEMICOLON)
                && self.char_at(self.pos) == Some(' ')
            {
                self.pos += 1;
            }
        }

        if token.kind == Kind::Symbol {
            match token.text.as_str() {
                "(" => {
                    self.scope.push(Scope::OpenParens);
                    if self.scope.includes(Scope::DefFnSig) {
                        self.scope.push(Scope::DefFnArgs);
                    }
                    if self.scope.includes(Scope::IntExpression) {
                        self.scope.push(Scope::IntParens);
                    }
                }
                "{" => {
                    if self.last_significant().map_or(false, |t| t.is_keyword("SGN")) {
                        self.scope.push(Scope::SgnExpression);
                    }
                    self.scope.push(Scope::OpenBraces);
                }
                "[" => {
                    self.scope.push(Scope::OpenBrackets);
                    if self.scope.includes(Scope::StringExpression) {
                        self.scope.push(Scope::Modifier);
                    }
                }
                ")" => {
                    self.scope.pop_to(Scope::OpenParens);
                }
                "}" => {
                    self.scope.pop_to(Scope::OpenBraces);
                    if self.scope.includes(Scope::SgnExpression) {
                        self.scope.pop_to(Scope::SgnExpression);
                    }
                }
                "]" => {
                    self.scope.pop_to(Scope::OpenBrackets);
                }
                ";" => {
                    if self.scope.includes(Scope::IntExpression) {
                        self.scope.pop_to(Scope::IntExpression);
                    }
                    self.reset_int_expression();
                }
                "=" => {
                    if self.scope.last() == Some(Scope::DefFnSig) {
                        self.scope.pop_to(Scope::DefFnSig);
                    }
                }
                _ => {}
            }
        }

        if token.kind == Kind::StatementSeparator {
            self.scope.clear();
        }

        if token.kind == Kind::Keyword {
            self.keyword_state(&token);
        }

        if token.is_symbol("=")
            && !self.scope.includes(Scope::If)
            && !self.scope.includes(Scope::ElseIf)
            && !self.scope.includes(Scope::Until)
        {
            self.reset_int_expression();
        }

        self.capture(token.clone());
        Ok(token)
    }

    fn keyword_state(&mut self, token: &Token) {
        let text = token.text.as_str();
        let in_int = self.in_int_expression;
        let last_is_operator = self.last_significant().map_or(false, |t| {
            t.kind == Kind::Symbol && (codes::is_operator(&t.text) || t.text == "%")
        });
        let follows_last_keyword = self
            .tokens
            .iter()
            .rev()
            .find(|t| t.kind == Kind::Keyword)
            .and_then(|t| codes::int_function_followers(&t.text))
            .map_or(false, |followers| followers.contains(&text));

        let keep = (in_int
            && (self.scope.includes(Scope::OpenParens)
                || self.scope.includes(Scope::SgnExpression)))
            || self.int_sub_statement
            || (in_int && codes::is_int_function(text) && last_is_operator)
            || (in_int && follows_last_keyword)
            || (in_int && codes::is_operator(text));
        if !keep {
            self.reset_int_expression();
        }

        match token.code {
            Some(codes::DEF_FN) => {
                self.scope.push(Scope::DefFn);
                self.scope.push(Scope::DefFnSig);
            }
            Some(codes::IF) => self.scope.push(Scope::If),
            Some(codes::ELSEIF) => self.scope.push(Scope::ElseIf),
            Some(codes::UNTIL) => self.scope.push(Scope::Until),
            Some(codes::THEN) => {
                self.scope.pop_to(Scope::If);
                self.reset_int_expression();
            }
            Some(codes::ENDIF) => {
                self.scope.pop_to(Scope::ElseIf);
                self.reset_int_expression();
            }
            Some(codes::BIN) => self.hint = Some(Hint::Binary),
            Some(codes::REM) => self.hint = Some(Hint::Comment),
            _ => {}
        }
        if codes::uses_line_numbers(text) {
            self.hint = Some(Hint::LineNumber);
        }
    }

    fn token(&mut self, peeking: bool) -> Result<Option<Token>, Error> {
        let c = match self.char_at(self.pos) {
            Some(c) => c,
            None => return Ok(None),
        };

        if is_literal_reset(c)
            && !self.scope.includes(Scope::IntParens)
            && !self.scope.includes(Scope::If)
            && !self.scope.includes(Scope::Until)
        {
            if self.scope.includes(Scope::IntExpression) {
                self.scope.pop_to(Scope::IntExpression);
            }
            self.reset_int_expression();
        }

        if is_int_expression(c) {
            self.scope.push(Scope::IntExpression);
            self.in_int_expression = true;
            if !peeking && self.start_of_int_statement()? {
                self.int_sub_statement = true;
            }
        }

        if self.start_of_statement() {
            if is_directive(c) {
                return Ok(Some(self.process_directive()));
            }
            if is_start_of_comment(c) {
                return Ok(Some(self.process_single_keyword()));
            }
            if is_dot_command(c) && self.char_at(self.pos + 1).map_or(false, is_alpha) {
                return Ok(Some(self.process_dot_command()?));
            }
        }

        if is_space(c) {
            return Ok(Some(self.process_whitespace()));
        }
        if is_statement_sep(c) {
            return Ok(Some(self.process_single(Kind::StatementSeparator)));
        }
        if !self.scope.includes(Scope::Modifier) && is_cmp_operator_start(c) {
            return Ok(Some(self.process_cmp_operator()?));
        }
        if is_alpha(c) {
            return Ok(Some(self.process_identifier()));
        }
        if is_binary_symbol(c) {
            let at = self.process_single(Kind::Symbol);
            self.capture(at);
            if let Some((peek, _)) = self.peek_token(self.pos)? {
                if peek.kind == Kind::Identifier {
                    if self.char_at(self.pos) == Some(' ') {
                        let ws = self.process_whitespace();
                        self.capture(ws);
                    }
                    return Ok(Some(self.process_identifier()));
                }
            }
            return Ok(Some(self.process_binary()));
        }
        if is_hex_symbol(c) {
            let after_string_fn = self
                .last_significant()
                .map_or(false, |t| t.kind == Kind::Keyword && codes::is_string_alt_function(&t.text));
            if after_string_fn {
                return Ok(Some(self.process_single(Kind::Symbol)));
            }
            return Ok(Some(self.process_hex()));
        }
        if is_digit(c) || is_start_of_float(c) {
            return Ok(Some(self.process_number()?));
        }
        if is_quote(c) {
            return Ok(Some(self.process_quote()?));
        }
        if is_directive(c) {
            return Ok(Some(self.process_define()));
        }
        if is_symbol(c) {
            return Ok(Some(self.process_single(Kind::Symbol)));
        }
        Ok(Some(self.process_single(Kind::Unknown)))
    }

    /// Read the token at `at` without consuming it, skipping one run of
    /// whitespace. Returns the token and the position just after it.
    fn peek_token(&mut self, at: usize) -> Result<Option<(Token, usize)>, Error> {
        let pos = self.pos;
        let in_int = self.in_int_expression;
        let int_sub = self.int_sub_statement;
        let hint = self.hint;
        let len = self.tokens.len();
        let scope = self.scope.clone();

        self.pos = at;
        let mut result = self.token(true);
        if matches!(result, Ok(Some(ref t)) if t.is_whitespace()) {
            result = self.token(true);
        }
        let end = self.pos;

        self.pos = pos;
        self.in_int_expression = in_int;
        self.int_sub_statement = int_sub;
        self.hint = hint;
        self.tokens.truncate(len);
        self.scope = scope;

        Ok(result?.map(|token| (token, end)))
    }

    fn start_of_statement(&self) -> bool {
        if let Some(last) = self.last_token() {
            if last.is_keyword("ERROR") || last.kind == Kind::StatementSeparator {
                return true;
            }
        }
        let from = self
            .tokens
            .iter()
            .rposition(|t| t.kind == Kind::StatementSeparator)
            .map_or(0, |i| i + 1);
        self.tokens[from..].iter().all(|t| t.is_whitespace())
    }

    /// Called with the scan position on a `%`.
    fn start_of_int_statement(&mut self) -> Result<bool, Error> {
        if self.start_of_statement() {
            return Ok(true);
        }
        let from = self
            .tokens
            .iter()
            .rposition(|t| t.kind == Kind::StatementSeparator || t.is_symbol("="))
            .map_or(0, |i| i + 1);
        let starter = self.tokens[from..]
            .iter()
            .find(|t| !t.is_whitespace())
            .filter(|t| t.kind == Kind::Keyword)
            .map(|t| t.text.clone());
        match starter {
            Some(text) => Ok(["IF", "ELSE", "UNTIL"].contains(&text.as_str())),
            None => Ok(match self.peek_token(self.pos + 1)? {
                Some((peek, _)) => {
                    peek.kind == Kind::Keyword && codes::is_int_function(&peek.text)
                }
                None => false,
            }),
        }
    }

    /// Does the rest of the statement, ignoring quoted text, hold `word`?
    fn statement_contains(&self, word: &str) -> bool {
        let mut rest = String::new();
        let mut quoted = false;
        let tail = self.text(self.pos, self.line.len());
        let closed = tail.matches('"').count() / 2 * 2;
        let mut seen = 0;
        for c in tail.chars() {
            if c == '"' && (quoted || seen < closed) {
                seen += 1;
                quoted = !quoted;
                continue;
            }
            if !quoted {
                rest.push(c);
            }
        }
        let mut run = String::new();
        let mut word_run = false;
        for c in rest.chars().chain(std::iter::once(' ')) {
            let is_word = c.is_ascii_alphanumeric() || c == '_';
            if is_word != word_run && !run.is_empty() {
                if word_run {
                    if run.to_ascii_uppercase() == word {
                        return true;
                    }
                } else if run.contains(':') {
                    return false;
                }
                run.clear();
            }
            word_run = is_word;
            run.push(c);
        }
        false
    }

    fn find_opcode(&mut self, end: usize) -> Option<Token> {
        let next = self.char_at(end);
        if next.map_or(false, is_alpha) {
            return None;
        }
        let curr = self.text(self.pos, end).to_ascii_uppercase();
        if let Some(next) = next {
            let longer = format!("{}{}", curr, next);
            if codes::code(&longer, self.dialect).is_some() {
                return None;
            }
        }
        let code = codes::code(&curr, self.dialect)?;
        let token = Token::keyword(code, self.pos);
        self.pos = end;
        Some(token)
    }

    fn process_identifier(&mut self) -> Token {
        let mut end = self.pos + 1;
        while self.char_at(end).map_or(false, is_alpha_num) {
            if let Some(token) = self.find_opcode(end) {
                return token;
            }
            end += 1;
        }
        if let Some(token) = self.find_opcode(end) {
            return token;
        }

        let text = self.text(self.pos, end);
        let mut kind = Kind::Identifier;
        if self.scope.includes(Scope::StringExpression) {
            self.scope.pop_to(Scope::StringExpression);
        }
        if text.ends_with('$') {
            self.scope.push(Scope::StringExpression);
        }
        if self.scope.includes(Scope::DefFnArgs) {
            kind = Kind::DefFnArg;
        }
        let token = Token::new(kind, text, self.pos);
        self.pos = end;
        token
    }

    fn process_define(&mut self) -> Token {
        let mut end = self.pos + 1;
        while self.char_at(end).map_or(false, is_define) {
            end += 1;
        }
        let kind = if self.scope.includes(Scope::DefFnArgs) {
            Kind::DefFnArg
        } else {
            Kind::Define
        };
        let token = Token::new(kind, self.text(self.pos, end), self.pos);
        self.pos = end;
        token
    }

    fn process_single(&mut self, kind: Kind) -> Token {
        let token = Token::new(kind, self.text(self.pos, self.pos + 1), self.pos);
        self.pos += 1;
        token
    }

    fn process_single_keyword(&mut self) -> Token {
        let token = Token::keyword(codes::SEMICOLON, self.pos);
        self.pos += 1;
        token
    }

    fn slurp(&mut self, test: fn(char) -> bool, kind: Kind, max: usize) -> Token {
        let mut end = self.pos;
        while end - self.pos < max && self.char_at(end).map_or(false, test) {
            end += 1;
        }
        let token = Token::new(kind, self.text(self.pos, end), self.pos);
        self.pos = end;
        token
    }

    fn process_whitespace(&mut self) -> Token {
        self.slurp(is_space, Kind::Whitespace, usize::MAX)
    }

    fn process_to_end(&mut self, kind: Kind) -> Token {
        let token = Token::new(kind, self.text(self.pos, self.line.len()), self.pos);
        self.pos = self.line.len();
        token
    }

    fn process_binary(&mut self) -> Token {
        let test: fn(char) -> bool = if self.in_int_expression {
            is_binary
        } else {
            is_binary_or_point
        };
        let mut token = self.slurp(test, Kind::Binary, usize::MAX);
        token.integer = self.in_int_expression;
        let numeric = number::parse_radix(&token.text, 2, !token.integer);
        token.line_number = self.hint == Some(Hint::LineNumber);
        token.with_numeric(numeric)
    }

    fn process_hex(&mut self) -> Token {
        let test: fn(char) -> bool = if self.in_int_expression {
            is_hex
        } else {
            is_hex_or_point
        };
        let mut token = self.slurp(test, Kind::Hex, usize::MAX);
        token.integer = self.in_int_expression;
        let numeric = number::parse_radix(&token.text[1..], 16, !token.integer);
        token.line_number = self.hint == Some(Hint::LineNumber);
        token.with_numeric(numeric)
    }

    fn process_number(&mut self) -> Result<Token, Error> {
        let mut end = self.pos + 1;
        let mut exp = false;
        while let Some(c) = self.char_at(end) {
            if is_digit(c) || c == '.' || c == 'e' || (exp && c == '-') {
                exp = c == 'e';
                end += 1;
            } else {
                break;
            }
        }
        let text = self.text(self.pos, end);
        if self.in_int_expression && text.contains('.') {
            return Err(self
                .err("Non integer used in integer expression".to_string())
                .in_column(&(self.pos..end)));
        }
        let kind = if self.in_int_expression {
            Kind::LiteralNumber
        } else {
            Kind::Number
        };
        let numeric = number::parse_decimal(&text);
        let mut token = Token::new(kind, text, self.pos).with_numeric(numeric);
        token.integer = self.in_int_expression;
        token.line_number = self.hint == Some(Hint::LineNumber);
        self.pos = end;
        Ok(token)
    }

    fn process_directive(&mut self) -> Token {
        let mut token = self.process_to_end(Kind::Directive);
        token.skip = true;
        token
    }

    fn process_dot_command(&mut self) -> Result<Token, Error> {
        let start = self.pos;
        while let Some(c) = self.char_at(self.pos) {
            if is_quote(c) {
                self.process_quote()?;
            } else if is_statement_sep(c) || c == '\n' {
                break;
            } else {
                self.pos += 1;
            }
        }
        Ok(Token::new(
            Kind::DotCommand,
            self.text(start, self.pos),
            start,
        ))
    }

    fn process_quote(&mut self) -> Result<Token, Error> {
        let close = self.line[self.pos + 1..]
            .iter()
            .position(|c| is_quote(*c))
            .map(|i| i + self.pos + 1);
        let end = match close {
            Some(end) => end,
            None => {
                let len = self.line.len();
                return Err(self
                    .err(format!("Unterminated quote at: {}:{}", self.pos + 1, len + 1))
                    .in_column(&(self.pos..len)));
            }
        };
        let token = Token::new(Kind::StringLiteral, self.text(self.pos, end + 1), self.pos);
        self.pos = end + 1;
        self.scope.pop_to(Scope::StringExpression);
        self.scope.push(Scope::StringExpression);
        Ok(token)
    }

    fn process_cmp_operator(&mut self) -> Result<Token, Error> {
        let start = self.pos;
        let mut token = self.slurp(is_cmp_operator, Kind::Keyword, 2);
        let mut code = codes::code(&token.text, self.dialect);
        if code.is_none() && token.len() > 1 {
            self.pos = start + 1;
            token.text = self.text(start, start + 1);
            code = codes::code(&token.text, self.dialect);
        }
        if self.last_significant().map_or(false, |t| t.is_symbol("=")) {
            return Err(self
                .err(format!(
                    "Invalid use of relation symbols at: {}:{}",
                    start + 1,
                    start + 2
                ))
                .in_column(&(start..self.pos)));
        }
        match code {
            Some(code) => Ok(Token::keyword(code, start)),
            None => Ok(Token::new(Kind::Symbol, token.text, start)),
        }
    }
}

/// Drop a single space between a plain token and a keyword where the
/// decoder inserts one anyway, so decoded text encodes to the same bytes.
fn drop_implied_spaces(tokens: Vec<Token>) -> Vec<Token> {
    let mut kept: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut iter = tokens.into_iter().peekable();
    while let Some(token) = iter.next() {
        if token.kind == Kind::Whitespace && token.text == " " {
            let before = kept.last().map_or(false, spaced_before_keyword);
            let after = iter.peek().map_or(false, |t| t.kind == Kind::Keyword);
            if before && after {
                continue;
            }
        }
        kept.push(token);
    }
    kept
}

fn spaced_before_keyword(token: &Token) -> bool {
    if matches!(token.kind, Kind::Keyword | Kind::Whitespace | Kind::Comment) {
        return false;
    }
    match token.text.chars().last().map(u32::from) {
        Some(c) if c == u32::from(codes::STATEMENT_SEP) || c == u32::from(codes::SEMICOLON) => true,
        Some(c) if c <= 0xff => c != 0x20 && codes::text(c as u8).is_none(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(line: &str) -> Vec<(Kind, String)> {
        lex(line, Dialect::V208)
            .unwrap()
            .tokens
            .into_iter()
            .map(|t| (t.kind, t.text))
            .collect()
    }

    #[test]
    fn test_line_number() {
        assert_eq!(parse_line_number("10 PRINT").unwrap(), (Some(10), "PRINT"));
        assert_eq!(parse_line_number("  20  CLS").unwrap(), (Some(20), " CLS"));
        assert_eq!(parse_line_number("#program x").unwrap(), (None, "#program x"));
        assert!(parse_line_number("PRINT").is_err());
        assert_eq!(
            parse_line_number("30 ").unwrap_err().detail(),
            "Empty line"
        );
    }

    #[test]
    fn test_keywords_and_identifiers() {
        let t = kinds("10 goto 20");
        assert_eq!(t[0], (Kind::Keyword, "GO TO".to_string()));
        assert_eq!(t[1], (Kind::Number, "20".to_string()));
        let t = kinds("10 LET a$=INKEY$");
        assert_eq!(t[1], (Kind::Identifier, "a$".to_string()));
        assert_eq!(t[3], (Kind::Keyword, "INKEY$".to_string()));
    }

    #[test]
    fn test_multi_word_keywords() {
        let t = kinds("10 GO SUB 100");
        assert_eq!(t[0], (Kind::Keyword, "GO SUB".to_string()));
        let t = kinds("10 DEF FN a(x)=x");
        assert_eq!(t[0], (Kind::Keyword, "DEF FN".to_string()));
        assert_eq!(t[1], (Kind::Identifier, "a".to_string()));
        assert_eq!(t[3], (Kind::DefFnArg, "x".to_string()));
        let t = kinds("10 OPEN # 4,\"o>f\"");
        assert_eq!(t[0], (Kind::Keyword, "OPEN #".to_string()));
    }

    #[test]
    fn test_int_literals() {
        let s = lex("10 LET %a=%1+2", Dialect::V208).unwrap();
        let numbers: Vec<&Token> = s
            .tokens
            .iter()
            .filter(|t| t.kind == Kind::LiteralNumber)
            .collect();
        assert_eq!(numbers.len(), 2);
        assert!(numbers.iter().all(|t| t.integer));
        assert!(lex("10 %a=%1.5", Dialect::V208).is_err());
    }

    #[test]
    fn test_comments() {
        let t = kinds("10 REM hi: there");
        assert_eq!(t[1], (Kind::Comment, "hi: there".to_string()));
        let t = kinds("10; one");
        assert_eq!(t[0], (Kind::Keyword, ";".to_string()));
        assert_eq!(t[1], (Kind::Whitespace, " ".to_string()));
        assert_eq!(t[2], (Kind::Comment, "one".to_string()));
    }

    #[test]
    fn test_line_number_hint() {
        let s = lex("10 GO TO 100", Dialect::V208).unwrap();
        assert!(s.tokens[1].line_number);
        let s = lex("10 PRINT 100", Dialect::V208).unwrap();
        assert!(!s.tokens[1].line_number);
    }

    #[test]
    fn test_elseif() {
        let s = lex("20 ELSE IF 1 < 2 PRINT \"ELSE\"", Dialect::V208).unwrap();
        assert!(s.tokens[1].is_code(codes::ELSEIF));
        let s = lex("20 IF a THEN PRINT \"ELSE\"", Dialect::V208).unwrap();
        assert!(s.tokens[0].is_code(codes::IF));
        let s = lex("20 ELSE IF 1 < 2 PRINT \"ELSE\"", Dialect::V207).unwrap();
        assert!(s.tokens[1].is_code(codes::IF));
    }

    #[test]
    fn test_lexical_errors() {
        let e = lex("10 PRINT \"abc", Dialect::V208).unwrap_err();
        assert_eq!(e.detail(), "Unterminated quote at: 10:14");
        let e = lex("10 IF a=<b THEN", Dialect::V208).unwrap_err();
        assert!(e.detail().starts_with("Invalid use of relation symbols"));
        assert!(lex("10 PRINT BIN 2", Dialect::V208).is_err());
    }

    #[test]
    fn test_whitespace_runs() {
        let t = kinds("10 PRINT a   +  b");
        assert_eq!(t[1], (Kind::Identifier, "a".to_string()));
        assert_eq!(t[2], (Kind::Whitespace, "   ".to_string()));
        assert_eq!(t[4], (Kind::Whitespace, "  ".to_string()));
        let t = kinds("10 PRINT  a");
        assert_eq!(t[1], (Kind::Whitespace, " ".to_string()));
        // restored by the decoder
        let t = kinds("10 IF a THEN CLS");
        assert_eq!(t[2], (Kind::Keyword, "THEN".to_string()));
        let t = kinds("10 LET a = 1");
        assert_eq!(t[2], (Kind::Whitespace, " ".to_string()));
    }

    #[test]
    fn test_dot_command_and_directive() {
        let t = kinds("10 .ls \"a:b\": PRINT 1");
        assert_eq!(t[0], (Kind::DotCommand, ".ls \"a:b\"".to_string()));
        let s = lex("#autostart 10", Dialect::V208).unwrap();
        assert_eq!(s.line_number, None);
        assert_eq!(s.tokens[0].kind, Kind::Directive);
        assert!(s.tokens[0].skip);
    }
}
