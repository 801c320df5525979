use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::Compactor;

static HORIZONTAL_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+").expect("invalid horizontal space regex"));
static LINE_ENDING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r\n|\r|\n").expect("invalid line ending regex"));
static INDENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n +").expect("invalid indent regex"));

/// Strips comments and redundant whitespace from PHP source.
///
/// Comments are replaced by as many newlines as they spanned so that line
/// structure survives; string literals, heredocs and inline HTML are copied
/// through untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct PhpCompactor;

impl Compactor for PhpCompactor {
    fn supports(&self, file: &Path) -> bool {
        file.extension().is_some_and(|e| e == "php")
    }

    fn compact(&self, contents: &str) -> String {
        let mut out = String::with_capacity(contents.len());
        for token in Lexer::new(contents) {
            match token {
                Token::Comment(text) => out.push_str(&"\n".repeat(text.matches('\n').count())),
                Token::Whitespace(text) => out.push_str(&normalize_whitespace(text)),
                Token::Code(text) => out.push_str(text),
            }
        }
        out
    }
}

fn normalize_whitespace(text: &str) -> String {
    let collapsed = HORIZONTAL_SPACE.replace_all(text, " ");
    let unified = LINE_ENDING.replace_all(&collapsed, "\n");
    INDENT.replace_all(&unified, "\n").into_owned()
}

#[derive(Debug, PartialEq, Eq)]
enum Token<'a> {
    Comment(&'a str),
    Whitespace(&'a str),
    Code(&'a str),
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    in_php: bool,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            in_php: false,
        }
    }

    /// Length of inline text up to and including the next open tag.
    fn inline_len(&mut self, rest: &str) -> usize {
        match rest.find("<?") {
            Some(at) => {
                self.in_php = true;
                let tag = &rest[at..];
                let tag_len = if tag.starts_with("<?php") {
                    5
                } else if tag.starts_with("<?=") {
                    3
                } else {
                    2
                };
                at + tag_len
            }
            None => rest.len(),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let src = self.src;
        let rest = &src[self.pos..];
        if rest.is_empty() {
            return None;
        }

        if !self.in_php {
            let len = self.inline_len(rest);
            self.pos += len;
            return Some(Token::Code(&rest[..len]));
        }

        let (len, token): (usize, fn(&'a str) -> Token<'a>) = match rest.as_bytes()[0] {
            b' ' | b'\t' | b'\r' | b'\n' => (whitespace_len(rest), Token::Whitespace),
            b'#' if !rest.starts_with("#[") => (line_comment_len(rest), Token::Comment),
            b'/' if rest.starts_with("//") => (line_comment_len(rest), Token::Comment),
            b'/' if rest.starts_with("/*") => (block_comment_len(rest), Token::Comment),
            b'?' if rest.starts_with("?>") => {
                self.in_php = false;
                (2, Token::Code)
            }
            quote @ (b'\'' | b'"' | b'`') => (quoted_len(rest, quote), Token::Code),
            b'<' if rest.starts_with("<<<") => (heredoc_len(rest), Token::Code),
            _ => (code_len(rest), Token::Code),
        };

        self.pos += len;
        Some(token(&rest[..len]))
    }
}

fn is_special(b: u8) -> bool {
    matches!(
        b,
        b' ' | b'\t' | b'\r' | b'\n' | b'#' | b'/' | b'?' | b'\'' | b'"' | b'`' | b'<'
    )
}

fn whitespace_len(rest: &str) -> usize {
    rest.find(|c| !matches!(c, ' ' | '\t' | '\r' | '\n'))
        .unwrap_or(rest.len())
}

/// `//` and `#` comments stop before the newline or a close tag.
fn line_comment_len(rest: &str) -> usize {
    let newline = rest.find('\n').unwrap_or(rest.len());
    let close = rest.find("?>").unwrap_or(rest.len());
    newline.min(close)
}

fn block_comment_len(rest: &str) -> usize {
    rest[2..].find("*/").map_or(rest.len(), |at| at + 4)
}

fn quoted_len(rest: &str, quote: u8) -> usize {
    let bytes = rest.as_bytes();
    let mut i = 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    rest.len()
}

/// Heredoc and nowdoc bodies are copied verbatim up to the closing label.
fn heredoc_len(rest: &str) -> usize {
    let header_end = rest.find('\n').unwrap_or(rest.len());
    let label = rest[3..header_end]
        .trim()
        .trim_matches(|c| c == '"' || c == '\'');
    let valid = !label.is_empty()
        && label
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid || header_end == rest.len() {
        return 3;
    }

    let mut offset = header_end + 1;
    for line in rest[offset..].split_inclusive('\n') {
        let indent = line.len() - line.trim_start_matches([' ', '\t']).len();
        let body = &line[indent..];
        if let Some(after) = body.strip_prefix(label) {
            let terminated = after
                .chars()
                .next()
                .is_none_or(|c| !(c.is_ascii_alphanumeric() || c == '_'));
            if terminated {
                return offset + indent + label.len();
            }
        }
        offset += line.len();
    }
    rest.len()
}

fn code_len(rest: &str) -> usize {
    let first = rest.chars().next().map_or(1, char::len_utf8);
    rest.as_bytes()[first..]
        .iter()
        .position(|&b| is_special(b))
        .map_or(rest.len(), |at| first + at)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compact(src: &str) -> String {
        PhpCompactor.compact(src)
    }

    #[test]
    fn supports_only_php_files() {
        assert!(PhpCompactor.supports(Path::new("lib/Extract.php")));
        assert!(!PhpCompactor.supports(Path::new("box.json")));
        assert!(!PhpCompactor.supports(Path::new("Makefile")));
    }

    #[test]
    fn doc_comments_become_newlines() {
        let src = "<?php\n/**\n * Docs.\n */\nfunction a() {}\n";
        assert_eq!(compact(src), "<?php\n\n\n\nfunction a() {}\n");
    }

    #[test]
    fn line_comments_are_dropped() {
        let src = "<?php\n$a = 1; // one\n# two\n$b = 2;\n";
        assert_eq!(compact(src), "<?php\n$a = 1; \n\n$b = 2;\n");
    }

    #[test]
    fn indentation_is_stripped() {
        let src = "<?php\nclass A\n{\n    public $b;\n\t\tprivate $c;\n}\n";
        assert_eq!(compact(src), "<?php\nclass A\n{\npublic $b;\nprivate $c;\n}\n");
    }

    #[test]
    fn horizontal_runs_collapse() {
        assert_eq!(compact("<?php $a  =\t\t1;"), "<?php $a = 1;");
    }

    #[test]
    fn line_endings_are_normalized() {
        assert_eq!(compact("<?php\r\n$a = 1;\r$b = 2;"), "<?php\n$a = 1;\n$b = 2;");
    }

    #[test]
    fn strings_keep_comment_markers_and_spacing() {
        let src = "<?php $a = '// not   a comment'; $b = \"# nor \\\" /* this */\";";
        assert_eq!(compact(src), src);
    }

    #[test]
    fn attributes_are_not_comments() {
        let src = "<?php\n#[Attribute]\nclass A {}";
        assert_eq!(compact(src), src);
    }

    #[test]
    fn heredoc_body_is_verbatim() {
        let src = "<?php\n$a = <<<EOT\n  keep   // this\n    EOT;\n// gone\n";
        assert_eq!(compact(src), "<?php\n$a = <<<EOT\n  keep   // this\n    EOT;\n\n");
    }

    #[test]
    fn nowdoc_label_quotes_are_accepted() {
        let src = "<?php $a = <<<'TXT'\n#raw\nTXT;\n";
        assert_eq!(compact(src), src);
    }

    #[test]
    fn inline_html_is_untouched() {
        let src = "<p>  hi  </p>\n<?php   echo 1; // x\n?>  <b> // not php </b>";
        assert_eq!(
            compact(src),
            "<p>  hi  </p>\n<?php echo 1; \n?>  <b> // not php </b>"
        );
    }

    #[test]
    fn line_comment_stops_at_close_tag() {
        assert_eq!(compact("<?php echo 1; // c ?>tail"), "<?php echo 1; ?>tail");
    }

    #[test]
    fn division_and_ternary_survive() {
        let src = "<?php $a = $b / 2 ? $c < 3 : $d;";
        assert_eq!(compact(src), src);
    }

    #[test]
    fn lexer_splits_tokens() {
        let tokens: Vec<_> = Lexer::new("<?php /* c */ x").collect();
        assert_eq!(
            tokens,
            vec![
                Token::Code("<?php"),
                Token::Whitespace(" "),
                Token::Comment("/* c */"),
                Token::Whitespace(" "),
                Token::Code("x"),
            ]
        );
    }
}
