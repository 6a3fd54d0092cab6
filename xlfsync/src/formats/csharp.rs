//! Support for C# `LocalizableStrings` classes.
//!
//! These are plain classes of string constants:
//!
//! ```csharp
//! internal class LocalizableStrings
//! {
//!     public const string AppDescription = "Runs the \"app\".";
//! }
//! ```
//!
//! Every variable declarator initialized with a string literal becomes a
//! translation unit whose id is the variable name. The format is extract-only.

use crate::{
    error::Error,
    source::SourceText,
    traits::{Extract, Parser, Units},
    types::TranslationUnit,
};

/// A parsed C# source file.
#[derive(Debug, Clone)]
pub struct CSharpFile {
    units: Vec<TranslationUnit>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Str(String),
    /// Interpolated, raw or character literal; never a translatable value.
    OtherLiteral,
    Punct(char),
}

impl Parser for CSharpFile {
    fn from_text(source: SourceText) -> Result<Self, Error> {
        let tokens = tokenize(source.as_str())?;
        let mut units = Vec::new();
        // Token index where the next declarator of a `, B = "b"` chain starts.
        let mut chained_at = None;

        for (i, window) in tokens.windows(4).enumerate() {
            let [Token::Ident(name), Token::Punct('='), Token::Str(value), Token::Punct(end @ (';' | ','))] =
                window
            else {
                continue;
            };
            // A declaration opens with its type; later declarators follow the
            // comma that ends the previous one. Member assignments follow `.`,
            // initializer members `{` or `,`, and plain assignments a
            // statement boundary.
            let declares = match i.checked_sub(1).map(|p| &tokens[p]) {
                Some(Token::Ident(_)) => true,
                Some(Token::Punct(',')) => chained_at == Some(i),
                _ => false,
            };
            if declares {
                units.push(TranslationUnit::new(name.clone(), value.clone()));
                chained_at = (*end == ',').then_some(i + 4);
            }
        }

        Ok(CSharpFile { units })
    }
}

impl Extract for CSharpFile {
    fn units(&self) -> Units<'_> {
        Box::new(self.units.iter().cloned())
    }
}

fn tokenize(text: &str) -> Result<Vec<Token>, Error> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    let mut line_start = true;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        if c == '\n' {
            line_start = true;
            i += 1;
            continue;
        }
        if c.is_whitespace() {
            i += 1;
            continue;
        }

        // Preprocessor directives occupy the rest of their line.
        if c == '#' && line_start {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
            continue;
        }
        line_start = false;

        match (c, next) {
            ('/', Some('/')) => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            ('/', Some('*')) => {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    i += 1;
                }
                if i >= chars.len() {
                    return Err(Error::syntax("unterminated block comment"));
                }
                i += 2;
            }
            ('"', _) if next == Some('"') && chars.get(i + 2) == Some(&'"') => {
                i = skip_raw_string(&chars, i)?;
                tokens.push(Token::OtherLiteral);
            }
            ('"', _) => {
                let (value, end) = read_regular_string(&chars, i + 1)?;
                tokens.push(Token::Str(value));
                i = end;
            }
            ('@', Some('"')) => {
                let (value, end) = read_verbatim_string(&chars, i + 2)?;
                tokens.push(Token::Str(value));
                i = end;
            }
            ('$', _) | ('@', Some('$')) => {
                i = skip_interpolated_string(&chars, i)?;
                tokens.push(Token::OtherLiteral);
            }
            ('\'', _) => {
                i = skip_char_literal(&chars, i)?;
                tokens.push(Token::OtherLiteral);
            }
            _ if c == '@' || c == '_' || c.is_alphabetic() => {
                let start = if c == '@' { i + 1 } else { i };
                i += 1;
                while i < chars.len() && (chars[i] == '_' || chars[i].is_alphanumeric()) {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            _ if c.is_ascii_digit() => {
                while i < chars.len()
                    && (chars[i].is_alphanumeric() || chars[i] == '.' || chars[i] == '_')
                {
                    i += 1;
                }
                tokens.push(Token::OtherLiteral);
            }
            _ => {
                tokens.push(Token::Punct(c));
                i += 1;
            }
        }
    }

    Ok(tokens)
}

/// Reads a `"..."` literal starting after the opening quote; returns the
/// unescaped value and the index after the closing quote.
fn read_regular_string(chars: &[char], mut i: usize) -> Result<(String, usize), Error> {
    let mut value = String::new();
    while i < chars.len() {
        match chars[i] {
            '"' => return Ok((value, i + 1)),
            '\n' => break,
            '\\' => {
                let escape = *chars
                    .get(i + 1)
                    .ok_or_else(|| Error::syntax("unterminated string literal"))?;
                i += 2;
                match escape {
                    '\'' => value.push('\''),
                    '"' => value.push('"'),
                    '\\' => value.push('\\'),
                    '0' => value.push('\0'),
                    'a' => value.push('\u{7}'),
                    'b' => value.push('\u{8}'),
                    'e' => value.push('\u{1b}'),
                    'f' => value.push('\u{c}'),
                    'n' => value.push('\n'),
                    'r' => value.push('\r'),
                    't' => value.push('\t'),
                    'v' => value.push('\u{b}'),
                    'u' => {
                        value.push(read_hex_escape(chars, &mut i, 4, 4)?);
                    }
                    'U' => {
                        value.push(read_hex_escape(chars, &mut i, 8, 8)?);
                    }
                    'x' => {
                        value.push(read_hex_escape(chars, &mut i, 1, 4)?);
                    }
                    other => {
                        return Err(Error::syntax(format!("unknown escape sequence `\\{other}`")));
                    }
                }
            }
            c => {
                value.push(c);
                i += 1;
            }
        }
    }
    Err(Error::syntax("unterminated string literal"))
}

fn read_hex_escape(chars: &[char], i: &mut usize, min: usize, max: usize) -> Result<char, Error> {
    let start = *i;
    while *i < chars.len() && *i - start < max && chars[*i].is_ascii_hexdigit() {
        *i += 1;
    }
    if *i - start < min {
        return Err(Error::syntax("incomplete hexadecimal escape sequence"));
    }
    let digits: String = chars[start..*i].iter().collect();
    u32::from_str_radix(&digits, 16)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| Error::syntax(format!("invalid character escape `{digits}`")))
}

/// Reads a `@"..."` literal starting after the opening quote; `""` is a quote.
fn read_verbatim_string(chars: &[char], mut i: usize) -> Result<(String, usize), Error> {
    let mut value = String::new();
    while i < chars.len() {
        if chars[i] == '"' {
            if chars.get(i + 1) == Some(&'"') {
                value.push('"');
                i += 2;
                continue;
            }
            return Ok((value, i + 1));
        }
        value.push(chars[i]);
        i += 1;
    }
    Err(Error::syntax("unterminated verbatim string literal"))
}

/// Skips a `"""..."""` raw literal, returning the index after it.
fn skip_raw_string(chars: &[char], start: usize) -> Result<usize, Error> {
    let mut i = start;
    while i < chars.len() && chars[i] == '"' {
        i += 1;
    }
    let fence = i - start;
    let mut run = 0;
    while i < chars.len() {
        if chars[i] == '"' {
            run += 1;
            if run == fence {
                return Ok(i + 1);
            }
        } else {
            run = 0;
        }
        i += 1;
    }
    Err(Error::syntax("unterminated raw string literal"))
}

/// Skips `$"..."`, `$@"..."` or `@$"..."`, including nested braces.
fn skip_interpolated_string(chars: &[char], start: usize) -> Result<usize, Error> {
    let mut i = start;
    let mut verbatim = false;
    while i < chars.len() && (chars[i] == '$' || chars[i] == '@') {
        verbatim |= chars[i] == '@';
        i += 1;
    }
    if chars.get(i) != Some(&'"') {
        return Err(Error::syntax("expected string after `$`"));
    }
    i += 1;
    let mut depth = 0usize;
    while i < chars.len() {
        match chars[i] {
            '\\' if !verbatim && depth == 0 => i += 1,
            '"' if verbatim && depth == 0 && chars.get(i + 1) == Some(&'"') => i += 1,
            '"' if depth == 0 => return Ok(i + 1),
            '{' if chars.get(i + 1) == Some(&'{') && depth == 0 => i += 1,
            '{' => depth += 1,
            '}' if depth > 0 => depth -= 1,
            _ => {}
        }
        i += 1;
    }
    Err(Error::syntax("unterminated interpolated string literal"))
}

fn skip_char_literal(chars: &[char], start: usize) -> Result<usize, Error> {
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            '\'' => return Ok(i + 1),
            '\n' => break,
            _ => i += 1,
        }
    }
    Err(Error::syntax("unterminated character literal"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn units(source: &str) -> Vec<TranslationUnit> {
        CSharpFile::from_str(source).unwrap().units().collect()
    }

    #[test]
    fn test_extracts_const_declarations() {
        let source = indoc! {r#"
            // Copyright header
            namespace Microsoft.DotNet.Tools.New
            {
                internal class LocalizableStrings
                {
                    public const string AppFullName = "Template Instantiation Commands";
                    public const string AppDescription = "Create a \"new\" project.\n";
                    /* "NotAString" = "x"; */
                    public const string VerbatimPath = @"C:\Users\""me""";
                }
            }
        "#};
        assert_eq!(
            units(source),
            vec![
                TranslationUnit::new("AppFullName", "Template Instantiation Commands"),
                TranslationUnit::new("AppDescription", "Create a \"new\" project.\n"),
                TranslationUnit::new("VerbatimPath", r#"C:\Users\"me""#),
            ]
        );
    }

    #[test]
    fn test_multiple_declarators_and_escaped_identifiers() {
        let source = r#"class S { const string A = "a", B = "b"; static readonly string @class = "\u00e9t\x41"; }"#;
        assert_eq!(
            units(source),
            vec![
                TranslationUnit::new("A", "a"),
                TranslationUnit::new("B", "b"),
                TranslationUnit::new("class", "étA"),
            ]
        );
    }

    #[test]
    fn test_skips_non_literal_initializers_and_assignments() {
        let source = indoc! {r#"
            #if DEBUG
            #endif
            class S
            {
                const string Joined = "a" + "b";
                const string Interpolated = $"{Joined} and {{braces}}";
                const char Letter = 'x';
                const int Count = 3;
                void M() { Other.Field = "nope"; x = "nope"; if (y == "nope") {} }
                const string Last = """raw "quoted" text""";
                const string Kept = "kept";
            }
        "#};
        assert_eq!(units(source), vec![TranslationUnit::new("Kept", "kept")]);
    }

    #[test]
    fn test_skips_initializer_members_and_named_arguments() {
        let source = indoc! {r#"
            class S
            {
                [Option(Short, Long = "long")]
                static readonly Settings Defaults = new Settings { A = "a", B = "b", C = "c" };
                static readonly object Pair = Make(First = "x", Second = "y");
                const string Real = "real", AlsoReal = "also";
            }
        "#};
        assert_eq!(
            units(source),
            vec![
                TranslationUnit::new("Real", "real"),
                TranslationUnit::new("AlsoReal", "also"),
            ]
        );
    }

    #[test]
    fn test_unterminated_string_is_error() {
        let err = CSharpFile::from_str("const string A = \"oops;\n").unwrap_err();
        assert!(err.to_string().contains("unterminated string literal"));
    }

    #[test]
    fn test_unknown_escape_is_error() {
        let err = CSharpFile::from_str(r#"const string A = "\q";"#).unwrap_err();
        assert!(err.to_string().contains("unknown escape sequence"));
    }
}
