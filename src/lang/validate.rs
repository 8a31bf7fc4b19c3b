use super::codes;
use super::token::{Kind, Token};
use super::{Dialect, Error, LineNumber, Scope, ScopeStack, MAX_LINE_NUMBER};

/// Check a line number against the one before it.
pub fn validate_line_number(current: LineNumber, previous: LineNumber) -> Result<(), Error> {
    if let (Some(current), Some(previous)) = (current, previous) {
        if current == previous {
            return Err(error!(InvalidLineNumber, Some(current);
                format!("Duplicate line number on {}", current)));
        }
        if current < previous {
            return Err(error!(InvalidLineNumber, Some(current);
                format!("Line numbers out of order on {}", current)));
        }
    }
    match current {
        None | Some(0) => Err(error!(InvalidLineNumber; "Line number is missing")),
        Some(n) if n > MAX_LINE_NUMBER => Err(error!(InvalidLineNumber, Some(n);
            format!("Invalid line number {}", n))),
        Some(_) => Ok(()),
    }
}

/// Check the grammar of one tokenized line, stopping at the first problem.
pub fn validate_statement(
    tokens: &[Token],
    line_number: LineNumber,
    dialect: Dialect,
) -> Result<(), Error> {
    if tokens.is_empty() || (tokens.len() == 1 && tokens[0].is_whitespace()) {
        return Err(error!(SyntaxError, line_number; "Empty line (or only white space)"));
    }
    Validator::new(tokens, line_number, dialect).run()
}

type Check = Result<(), String>;

struct Validator<'a> {
    source: &'a [Token],
    index: usize,
    line_number: LineNumber,
    dialect: Dialect,
    stack: ScopeStack,
    /// Non-whitespace tokens of the statement, restarted after ELSE and THEN.
    statement_stack: Vec<&'a Token>,
    expression: Vec<&'a Token>,
    argument_expression: Vec<&'a Token>,
    int_expression: bool,
    /// A `%` appeared mid-expression; literals may be integer form.
    int_next: bool,
    previous: Option<&'a Token>,
    current: Option<&'a Token>,
    position: isize,
    expect: Option<(Kind, &'static str)>,
}

impl<'a> Validator<'a> {
    fn new(source: &'a [Token], line_number: LineNumber, dialect: Dialect) -> Validator<'a> {
        Validator {
            source,
            index: 0,
            line_number,
            dialect,
            stack: ScopeStack::new(),
            statement_stack: vec![],
            expression: vec![],
            argument_expression: vec![],
            int_expression: false,
            int_next: false,
            previous: None,
            current: None,
            position: 0,
            expect: None,
        }
    }

    fn run(mut self) -> Result<(), Error> {
        while self.index < self.source.len() {
            let token = match self.next()? {
                Some(token) => token,
                None => break,
            };
            if let Err(msg) = self.check(token) {
                let column = token.pos..token.pos + token.len();
                return Err(error!(SyntaxError, self.line_number, ..&column;
                    format!("{}, \"{}\" at: {}:{}", msg, token.text, column.start + 1, column.end + 1)));
            }
        }
        self.end_of_statement()
    }

    fn fail_end(&self, msg: String) -> Error {
        match self.current {
            Some(t) => error!(SyntaxError, self.line_number, ..&(t.pos..t.pos + t.len()); msg),
            None => error!(SyntaxError, self.line_number; msg),
        }
    }

    fn next(&mut self) -> Result<Option<&'a Token>, Error> {
        let token = loop {
            match self.source.get(self.index) {
                Some(t) => {
                    self.index += 1;
                    if !t.is_whitespace() {
                        break t;
                    }
                }
                None => return Ok(None),
            }
        };
        self.previous = self.current;
        self.statement_stack.push(token);
        if token.is_code(codes::ELSE) || token.is_code(codes::THEN) {
            self.statement_stack.clear();
        }
        self.current = Some(token);
        self.position += 1;
        if token.kind == Kind::StatementSeparator {
            self.end_of_statement()?;
            self.reset();
        }
        Ok(Some(token))
    }

    fn peek_next(&self) -> Option<&'a Token> {
        let next = self.source.get(self.index)?;
        if next.is_whitespace() {
            return self.source.get(self.index + 1);
        }
        Some(next)
    }

    fn previous_is(&self, f: impl Fn(&Token) -> bool) -> bool {
        self.previous.map_or(false, f)
    }

    fn reset(&mut self) {
        self.reset_expression();
        self.statement_stack.clear();
        self.position = -1;
        self.stack.clear();
    }

    fn reset_expression(&mut self) {
        self.int_next = false;
        self.int_expression = false;
        self.expression.clear();
        self.argument_expression.clear();
    }

    fn is_full_int_expression(&self) -> bool {
        self.int_expression && self.expression.first().map_or(false, |t| t.is_symbol("%"))
    }

    fn check(&mut self, token: &'a Token) -> Check {
        self.expression.push(token);
        if token.kind == Kind::Keyword {
            self.stack.push(Scope::Operation);
            self.argument_expression.clear();
        } else if token.kind != Kind::StatementSeparator {
            self.argument_expression.push(token);
        }

        if let Some((kind, msg)) = self.expect.take() {
            if token.kind != kind {
                return Err(msg.to_string());
            }
        }

        self.scope_state(token)?;

        self.opening_statement(token)?;
        self.identifier_declaration(token);
        self.identifier(token)?;
        char_range(token)?;
        symbol_range(token)?;
        self.number_types(token)?;
        self.expression_state(token)?;
        self.statement_starters(token)?;
        self.expression_position(token)?;
        self.int_keyword(token);
        self.comment(token)?;
        self.print_statement(token)?;

        if token.is_code(codes::DEF_FN) {
            self.stack.push(Scope::DefFn);
            self.stack.push(Scope::DefFnSig);
        }
        Ok(())
    }

    fn scope_state(&mut self, token: &'a Token) -> Check {
        if token.kind == Kind::Symbol {
            match token.text.as_str() {
                "(" => {
                    self.stack.push(Scope::OpenParens);
                    self.argument_expression.clear();
                    if self.int_expression {
                        self.stack.push(Scope::IntParens);
                    }
                }
                "{" => {
                    self.stack.push(Scope::OpenBraces);
                    self.argument_expression.clear();
                }
                "[" => {
                    self.stack.push(Scope::OpenBrackets);
                    self.argument_expression.clear();
                }
                "}" => {
                    if !self.stack.pop_to(Scope::OpenBraces) {
                        return Err("Missing opening `{` brace".to_string());
                    }
                    if self.stack.last() == Some(Scope::FloatExpression) {
                        self.stack.pop();
                        if self.stack.includes(Scope::IntExpression) {
                            self.stack.restart_int_expression();
                            self.int_expression = true;
                        }
                    }
                }
                "]" => {
                    if !self.stack.pop_to(Scope::OpenBrackets) {
                        return Err("Missing opening `[` bracket".to_string());
                    }
                }
                ")" => {
                    if !self.stack.pop_to(Scope::OpenParens) {
                        return Err("Missing opening `(` parenthesis".to_string());
                    }
                }
                _ => {}
            }
        }

        match token.code {
            Some(codes::IF) if token.kind == Kind::Keyword => {
                self.stack.push(Scope::OuterIf);
                self.stack.push(Scope::If);
            }
            Some(codes::UNTIL) => self.stack.push(Scope::Until),
            Some(codes::FOR) => self.stack.push(Scope::For),
            _ => {}
        }

        if self.stack.includes(Scope::If) && token.is_code(codes::THEN) {
            self.stack.pop_to(Scope::If);
            self.reset_expression();
        }

        if token.is_code(codes::ELSE) {
            let else_if = self
                .peek_next()
                .map_or(false, |t| t.kind == Kind::Keyword && t.text == "IF");
            if !else_if
                && self.stack.includes(Scope::OuterIf)
                && !self.previous_is(|t| t.is_code(codes::THEN))
            {
                return Err("Statement separator (:) expected before ELSE".to_string());
            }
        }

        if [codes::PRINT, codes::INPUT, codes::PLOT, codes::DRAW, codes::CIRCLE]
            .iter()
            .any(|c| token.is_code(*c))
        {
            self.stack.push(Scope::Print);
            self.stack.push(Scope::SemiColonAllowed);
        }

        if self.stack.last() == Some(Scope::DefFnSig) && self.previous_is(|t| t.is_code(codes::DEF_FN))
        {
            if token.kind != Kind::Identifier {
                return Err(match self.dialect {
                    Dialect::V207 => "Expected single letter function name",
                    Dialect::V208 => "Expected function name",
                }
                .to_string());
            }
            let len = token.len();
            let single = len == 1 || (len == 2 && token.text.ends_with('$'));
            if !single && self.dialect == Dialect::V207 {
                return Err("DEF FN must be followed by a single letter identifier".to_string());
            }
        }

        if self.dialect == Dialect::V207 {
            if token.kind == Kind::Binary && self.previous_is(|t| t.is_symbol("@")) && !token.integer
            {
                return Err("Binary values only allowed in integer expressions".to_string());
            }
            if token.kind == Kind::Hex && !token.integer {
                return Err("Hex values only allowed in integer expressions".to_string());
            }
        }

        if token.is_symbol(";") && !self.stack.includes(Scope::SemiColonAllowed) {
            let before = self.statement_stack.len().saturating_sub(1);
            if self.statement_stack[..before].iter().any(|t| !t.is_whitespace()) {
                return Err("Semicolons are either used at start of statement as a remark or as separator for PRINT, INPUT, PLOT and DRAW statements".to_string());
            }
        }

        if token.kind == Kind::Symbol {
            match token.text.as_str() {
                "," => {
                    if self
                        .stack
                        .state_is_after(Scope::SemiColonAllowed, Scope::OpenParens)
                    {
                        self.reset_expression();
                    } else {
                        self.argument_expression.clear();
                        if self.stack.last() != Some(Scope::ParamSep) {
                            self.stack.push(Scope::ParamSep);
                        }
                        if !self.stack.includes(Scope::IntParens) && !self.is_full_int_expression() {
                            self.int_expression = false;
                        }
                    }
                }
                "%" => self.stack.push(Scope::IntExpression),
                "=" => {
                    self.stack.push(Scope::Operator);
                    self.argument_expression.clear();
                    if self.stack.includes(Scope::If) || self.stack.includes(Scope::Until) {
                        self.stack.push(Scope::Comparator);
                    } else if self.stack.includes(Scope::For)
                        || self.previous_is(|t| t.is_keyword("ENDPROC"))
                    {
                        self.stack.push(Scope::Assignment);
                    } else {
                        self.stack.push(Scope::Assignment);
                        self.reset_expression();
                    }
                }
                ";" => self.reset_expression(),
                _ => {}
            }
        }
        Ok(())
    }

    /// Only a keyword, an assignment, a dot command or `%` may open a
    /// statement.
    fn opening_statement(&mut self, token: &Token) -> Check {
        if !self.stack.is_empty() {
            return Ok(());
        }
        match token.kind {
            Kind::DotCommand | Kind::Whitespace => Ok(()),
            Kind::Symbol if token.text == "%" => {
                self.expect = Some((
                    Kind::Identifier,
                    "Expected to assign an integer value to an identifier",
                ));
                Ok(())
            }
            Kind::Identifier => {
                self.expect = Some((Kind::Symbol, "Expected to assign a value to an identifier"));
                Ok(())
            }
            Kind::Number => Err(
                "A line cannot start with a number, a keyword or assignment must open a statement"
                    .to_string(),
            ),
            _ => Ok(()),
        }
    }

    fn identifier_declaration(&mut self, token: &Token) {
        if token.kind != Kind::Keyword {
            return;
        }
        if matches!(token.text.as_str(), "PROC" | "DEFPROC" | "DEF FN" | "FN") {
            self.expect = Some((
                Kind::Identifier,
                "Function names can only contain letters and numbers and must start with a letter",
            ));
        }
    }

    fn identifier(&self, token: &Token) -> Check {
        if token.kind != Kind::Identifier {
            return Ok(());
        }
        if !is_identifier_shape(&token.text) {
            return Err(
                "Identifiers can only contain letters and numbers and must start with a letter"
                    .to_string(),
            );
        }
        let len = token.len();
        if len < 2 {
            return Ok(());
        }
        let dollar = token.text.ends_with('$');
        let is_string = dollar && len == 2;

        if self.int_expression && !self.stack.includes(Scope::FloatExpression) {
            let n = self.statement_stack.len();
            let before = self.statement_stack.get(n.saturating_sub(2));
            if before.map_or(false, |t| t.text == "#") {
                return Ok(());
            }
            return Err(
                "Only integer variables (single character vars) are allowed in integer expressions"
                    .to_string(),
            );
        }
        if is_string {
            return Ok(());
        }
        if self.dialect == Dialect::V207 {
            if dollar {
                return Err("String variables are only allowed 1 character long".to_string());
            }
            if self.stack.last() == Some(Scope::DefFnSig) {
                return Err("Only single character names allowed for DEF FN".to_string());
            }
        }
        Ok(())
    }

    fn number_types(&self, token: &Token) -> Check {
        if token.kind == Kind::LiteralNumber && !self.int_expression && !self.int_next {
            return Err("Parsing error, did not expect an integer number".to_string());
        }
        Ok(())
    }

    fn expression_state(&mut self, token: &Token) -> Check {
        if token.is_symbol("%") {
            if self.int_expression {
                return Err(
                    "Cannot redeclare integer expression whilst already inside one".to_string(),
                );
            }
            if self.expression.len() == 1 {
                self.int_expression = true;
            } else {
                self.int_next = true;
            }
            return Ok(());
        }

        let resets = [codes::IF, codes::THEN, codes::UNTIL]
            .iter()
            .any(|c| token.is_code(*c));

        if token.kind == Kind::Keyword {
            let text = token.text.as_str();
            let follows = self
                .previous
                .and_then(|t| codes::int_function_followers(&t.text))
                .map_or(false, |followers| followers.contains(&text));
            if codes::is_int_function(text) {
                if self.previous_is(|t| t.is_symbol("%")) {
                    self.int_expression = true;
                    return Ok(());
                }
            } else if self.int_expression && follows {
                return Ok(());
            } else if resets {
                self.reset_expression();
            } else if self.int_expression && codes::is_function(text) {
                return Err("Only integer functions are allowed in integer expressions".to_string());
            }
        }

        if self.int_next {
            return Ok(());
        }
        if resets {
            self.reset_expression();
        }
        Ok(())
    }

    fn statement_starters(&self, token: &Token) -> Check {
        if !token.is_code(codes::DEFPROC) {
            return Ok(());
        }
        let index = self.index - 1;
        if index == 0 || (index == 1 && self.source[0].is_whitespace()) {
            return Ok(());
        }
        Err("DEFPROC must be first token in a statement".to_string())
    }

    fn expression_position(&self, token: &Token) -> Check {
        if !token.is_symbol("%") || self.statement_stack.is_empty() {
            return Ok(());
        }
        if self.argument_expression.len() > 1 {
            return Err("Integer expression should be the start of an argument".to_string());
        }
        Ok(())
    }

    fn int_keyword(&mut self, token: &Token) {
        if !token.is_keyword("INT") || !self.int_expression {
            return;
        }
        self.stack.push(Scope::FloatExpression);
        self.int_expression = false;
        self.expect = Some((
            Kind::Symbol,
            "Using INT in an integer expression requires the expression to be wrapped {braces}",
        ));
    }

    fn comment(&self, token: &Token) -> Check {
        if !token.is_keyword("REM") {
            return Ok(());
        }
        match self.peek_next() {
            Some(next) if next.kind == Kind::Comment => Ok(()),
            _ => Err("Parser error, REM keyword should be followed by COMMENT".to_string()),
        }
    }

    /// Inside PRINT-like statements only functions, modifiers and operators
    /// may follow as keywords.
    fn print_statement(&self, token: &Token) -> Check {
        if token.kind != Kind::Keyword {
            return Ok(());
        }
        let first = match self.statement_stack.first() {
            Some(first) => first,
            None => return Ok(()),
        };
        if token.pos == first.pos || self.stack.get(1) != Some(Scope::Print) {
            return Ok(());
        }
        let op = token.text.as_str();
        if codes::is_function(op) || codes::is_print_modifier(op) || codes::is_operator(op) {
            return Ok(());
        }
        if self.expression.first().map_or(false, |t| t.is_symbol("%")) {
            return Ok(());
        }
        if self.stack.state_is_after(Scope::OpenParens, Scope::Print)
            || self.stack.state_is_after(Scope::IntExpression, Scope::Print)
        {
            return Ok(());
        }
        Err(format!("Unexpected {} in {} statement", op, first.text))
    }

    fn end_of_statement(&self) -> Result<(), Error> {
        if self.stack.includes(Scope::If) && self.dialect == Dialect::V207 {
            return Err(self.fail_end("IF statement must have THEN".to_string()));
        }
        if let Some(open) = self.stack.first_open() {
            let what = match open {
                Scope::OpenBraces => "`}` brace",
                Scope::OpenBrackets => "`]` bracket",
                _ => "`)` parenthesis",
            };
            return Err(self.fail_end(format!("Expected to see closing {}", what)));
        }
        if self.position == 0 && self.current.map_or(false, |t| t.kind == Kind::Identifier) {
            return Err(self.fail_end("Unexpected token at end of statement".to_string()));
        }
        Ok(())
    }
}

fn is_identifier_shape(text: &str) -> bool {
    let body = text.strip_suffix('$').unwrap_or(text);
    let mut chars = body.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => chars.all(|c| c.is_ascii_alphanumeric()),
        _ => false,
    }
}

fn char_range(token: &Token) -> Check {
    if token.kind != Kind::Identifier {
        return Ok(());
    }
    match token.text.chars().find(|c| (*c as u32) < 32 || (*c as u32) > 255) {
        Some(c) => Err(format!("Out of range character \"{}\" ({})", c, c as u32)),
        None => Ok(()),
    }
}

fn symbol_range(token: &Token) -> Check {
    if token.kind != Kind::Symbol {
        return Ok(());
    }
    match token.text.chars().find(|c| (*c as u32) < 0x21 || (*c as u32) > 0x7f) {
        Some(c) => Err(format!("Out of range symbol character \"{}\" ({})", c, c as u32)),
        None => Ok(()),
    }
}
