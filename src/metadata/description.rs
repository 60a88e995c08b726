//! metadata::description
//!
//! Formatter for app descriptions.
//!
//! # Markup
//!
//! Descriptions use a small wiki-like markup: blank lines separate blocks,
//! `* ` lines form bullet lists, `# ` lines form numbered lists,
//! `''italic''` and `'''bold'''` toggle inline styles, `[url]` and
//! `[url text]` insert links, and `[[appid]]` cross-references another app
//! in the repository.
//!
//! # Outputs
//!
//! [`description_txt`] produces plain text with paragraphs rewrapped to 80
//! columns; [`description_html`] produces HTML with `&`, `<` and `>`
//! escaped. Cross-references go through an optional resolver; without one
//! they are rendered as-is.

use super::{MetadataError, Warnings};

/// Column width for plain-text paragraph wrapping.
const WRAP_WIDTH: usize = 80;

/// Resolves a `[[target]]` cross-reference to `(url, link text)`.
pub type LinkResolverFn<'a> = dyn Fn(&str) -> Result<(String, String), MetadataError> + 'a;

/// Block-level parser state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    None,
    Para,
    Ul,
    Ol,
}

/// Line-oriented description formatter.
///
/// Feed lines with [`parse_line`](Self::parse_line), finish with
/// [`end`](Self::end); the accumulated `text` and `html` fields then hold
/// the results.
struct DescriptionFormatter<'a> {
    bold: bool,
    ital: bool,
    state: Block,
    last_state: Block,
    text: String,
    html: String,
    para_lines: Vec<String>,
    resolver: Option<&'a LinkResolverFn<'a>>,
    warnings: &'a Warnings,
}

impl<'a> DescriptionFormatter<'a> {
    fn new(resolver: Option<&'a LinkResolverFn<'a>>, warnings: &'a Warnings) -> Self {
        Self {
            bold: false,
            ital: false,
            state: Block::None,
            last_state: Block::None,
            text: String::new(),
            html: String::new(),
            para_lines: Vec::new(),
            resolver,
            warnings,
        }
    }

    /// Close the current block unless it is one of `keep`.
    fn end_current(&mut self, keep: &[Block]) -> Result<(), MetadataError> {
        if keep.contains(&self.state) {
            return Ok(());
        }
        match self.state {
            Block::Para => self.end_para()?,
            Block::Ul => self.end_ul(),
            Block::Ol => self.end_ol(),
            Block::None => {}
        }
        Ok(())
    }

    fn end_para(&mut self) -> Result<(), MetadataError> {
        self.last_state = self.state;
        self.state = Block::None;
        let whole_para = self.para_lines.join(" ");
        self.add_text(&whole_para)?;
        self.text.push_str(&wrap_text(&whole_para, WRAP_WIDTH));
        self.html.push_str("</p>");
        self.para_lines.clear();
        Ok(())
    }

    fn end_ul(&mut self) {
        self.html.push_str("</ul>");
        self.last_state = self.state;
        self.state = Block::None;
    }

    fn end_ol(&mut self) {
        self.html.push_str("</ol>");
        self.last_state = self.state;
        self.state = Block::None;
    }

    /// Render inline bold/italic markup to HTML, escaping as we go.
    fn formatted(&mut self, txt: &str) -> String {
        let mut res = String::new();
        let mut rest = escape_html(txt);

        loop {
            let Some(index) = rest.find("''") else {
                res.push_str(&rest);
                return res;
            };
            res.push_str(&rest[..index]);
            rest = rest.split_off(index);
            if rest.starts_with("'''") {
                res.push_str(if self.bold { "</b>" } else { "<b>" });
                self.bold = !self.bold;
                rest = rest.split_off(3);
            } else {
                res.push_str(if self.ital { "</i>" } else { "<i>" });
                self.ital = !self.ital;
                rest = rest.split_off(2);
            }
        }
    }

    /// Render inline markup including links to HTML.
    ///
    /// An unterminated `]`/`]]` is diagnosed; when the diagnostic mode lets
    /// parsing continue, the remainder is rendered as literal text.
    fn linkify(&mut self, txt: &str) -> Result<String, MetadataError> {
        let mut html = String::new();
        let mut rest = txt;

        loop {
            let Some(index) = rest.find('[') else {
                let tail = self.formatted(rest);
                html.push_str(&tail);
                return Ok(html);
            };
            let head = self.formatted(&rest[..index]);
            html.push_str(&head);
            rest = &rest[index..];

            if let Some(inner) = rest.strip_prefix("[[") {
                let Some(end) = inner.find("]]") else {
                    self.warnings.emit("Unterminated ]]")?;
                    let tail = self.formatted(rest);
                    html.push_str(&tail);
                    return Ok(html);
                };
                let target = &inner[..end];
                let (url, urltext) = match self.resolver {
                    Some(resolve) => resolve(target)?,
                    None => (target.to_string(), target.to_string()),
                };
                html.push_str("<a href=\"");
                html.push_str(&url);
                html.push_str("\">");
                html.push_str(&escape_html(&urltext));
                html.push_str("</a>");
                rest = &inner[end + 2..];
            } else {
                let inner = &rest[1..];
                let Some(end) = inner.find(']') else {
                    self.warnings.emit("Unterminated ]")?;
                    let tail = self.formatted(rest);
                    html.push_str(&tail);
                    return Ok(html);
                };
                let link = &inner[..end];
                let (url, urltxt) = match link.find(' ') {
                    None => (link, link),
                    Some(space) => {
                        let url = &link[..space];
                        let title = &link[space + 1..];
                        if url == title {
                            self.warnings.emit("Url title is just the URL - use [url]")?;
                        }
                        (url, title)
                    }
                };
                html.push_str("<a href=\"");
                html.push_str(url);
                html.push_str("\">");
                html.push_str(&escape_html(urltxt));
                html.push_str("</a>");
                rest = &inner[end + 1..];
            }
        }
    }

    fn add_text(&mut self, txt: &str) -> Result<(), MetadataError> {
        let html = self.linkify(txt)?;
        self.html.push_str(&html);
        Ok(())
    }

    fn parse_line(&mut self, line: &str) -> Result<(), MetadataError> {
        if line.is_empty() {
            self.end_current(&[])?;
        } else if line.starts_with("* ") {
            self.end_current(&[Block::Ul])?;
            if self.state != Block::Ul {
                self.html.push_str("<ul>");
                self.state = Block::Ul;
                if self.last_state != Block::None {
                    self.text.push_str("\n\n");
                }
            } else {
                self.text.push('\n');
            }
            self.text.push_str(line);
            self.html.push_str("<li>");
            self.add_text(&line[1..])?;
            self.html.push_str("</li>");
        } else if line.starts_with("# ") {
            self.end_current(&[Block::Ol])?;
            if self.state != Block::Ol {
                self.html.push_str("<ol>");
                self.state = Block::Ol;
                if self.last_state != Block::None {
                    self.text.push_str("\n\n");
                }
            } else {
                self.text.push('\n');
            }
            self.text.push_str(line);
            self.html.push_str("<li>");
            self.add_text(&line[1..])?;
            self.html.push_str("</li>");
        } else {
            self.para_lines.push(line.to_string());
            self.end_current(&[Block::Para])?;
            if self.state == Block::None {
                self.state = Block::Para;
                if self.last_state != Block::None {
                    self.text.push_str("\n\n");
                }
                self.html.push_str("<p>");
            }
        }
        Ok(())
    }

    fn end(&mut self) -> Result<(), MetadataError> {
        self.end_current(&[])
    }
}

/// Render a description to plain text, paragraphs wrapped to 80 columns.
pub fn description_txt(source: &str, warnings: &Warnings) -> Result<String, MetadataError> {
    let mut formatter = DescriptionFormatter::new(None, warnings);
    for line in source.lines() {
        formatter.parse_line(line)?;
    }
    formatter.end()?;
    Ok(formatter.text)
}

/// Render a description to HTML, resolving `[[appid]]` cross-references
/// through `resolver` when given.
pub fn description_html(
    source: &str,
    resolver: Option<&LinkResolverFn<'_>>,
    warnings: &Warnings,
) -> Result<String, MetadataError> {
    let mut formatter = DescriptionFormatter::new(resolver, warnings);
    for line in source.lines() {
        formatter.parse_line(line)?;
    }
    formatter.end()?;
    Ok(formatter.html)
}

/// Greedy-wrap text at `width` columns without breaking long words.
pub fn wrap_text(text: &str, width: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
        } else if current.len() + 1 + word.len() > width {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        } else {
            current.push(' ');
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines.join("\n")
}

/// Escape `&`, `<` and `>` for HTML bodies.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::WarningMode;
    use crate::ui::output::Verbosity;

    fn strict() -> Warnings {
        Warnings::new(WarningMode::Error, Verbosity::Quiet)
    }

    fn ignore() -> Warnings {
        Warnings::new(WarningMode::Ignore, Verbosity::Quiet)
    }

    mod html {
        use super::*;

        #[test]
        fn paragraphs() {
            let html = description_html("First para.\n\nSecond para.", None, &strict()).unwrap();
            assert_eq!(html, "<p>First para.</p><p>Second para.</p>");
        }

        #[test]
        fn joined_paragraph_lines() {
            let html = description_html("one\ntwo", None, &strict()).unwrap();
            assert_eq!(html, "<p>one two</p>");
        }

        #[test]
        fn bullet_list() {
            let html = description_html("* one\n* two", None, &strict()).unwrap();
            assert_eq!(html, "<ul><li> one</li><li> two</li></ul>");
        }

        #[test]
        fn numbered_list() {
            let html = description_html("# one\n# two", None, &strict()).unwrap();
            assert_eq!(html, "<ol><li> one</li><li> two</li></ol>");
        }

        #[test]
        fn bold_and_italic() {
            let html = description_html("'''bold''' and ''italic''", None, &strict()).unwrap();
            assert_eq!(html, "<p><b>bold</b> and <i>italic</i></p>");
        }

        #[test]
        fn escaping() {
            let html = description_html("a & b <c>", None, &strict()).unwrap();
            assert_eq!(html, "<p>a &amp; b &lt;c&gt;</p>");
        }

        #[test]
        fn plain_link() {
            let html = description_html("See [https://example.org]", None, &strict()).unwrap();
            assert_eq!(
                html,
                "<p>See <a href=\"https://example.org\">https://example.org</a></p>"
            );
        }

        #[test]
        fn titled_link() {
            let html =
                description_html("See [https://example.org the site]", None, &strict()).unwrap();
            assert_eq!(
                html,
                "<p>See <a href=\"https://example.org\">the site</a></p>"
            );
        }

        #[test]
        fn cross_reference_without_resolver() {
            let html = description_html("Also try [[org.other.app]]", None, &strict()).unwrap();
            assert_eq!(
                html,
                "<p>Also try <a href=\"org.other.app\">org.other.app</a></p>"
            );
        }

        #[test]
        fn cross_reference_with_resolver() {
            let resolver = |target: &str| Ok((format!("app:{}", target), "Other App".to_string()));
            let html =
                description_html("Also try [[org.other.app]]", Some(&resolver), &strict()).unwrap();
            assert_eq!(
                html,
                "<p>Also try <a href=\"app:org.other.app\">Other App</a></p>"
            );
        }

        #[test]
        fn resolver_error_propagates() {
            let resolver =
                |target: &str| Err(MetadataError::Invalid(format!("Cannot resolve app id {}", target)));
            let result = description_html("[[ghost.app]]", Some(&resolver), &strict());
            assert!(result.is_err());
        }

        #[test]
        fn unterminated_link_is_diagnosed() {
            assert!(description_html("broken [link", None, &strict()).is_err());
            assert!(description_html("broken [[link", None, &strict()).is_err());

            // Permissive mode renders the remainder literally
            let html = description_html("broken [link", None, &ignore()).unwrap();
            assert_eq!(html, "<p>broken [link</p>");
        }

        #[test]
        fn url_as_title_is_diagnosed() {
            let source = "[https://example.org https://example.org]";
            assert!(description_html(source, None, &strict()).is_err());
        }
    }

    mod text {
        use super::*;

        #[test]
        fn short_para_unchanged() {
            let text = description_txt("A short description.", &strict()).unwrap();
            assert_eq!(text, "A short description.");
        }

        #[test]
        fn long_para_wrapped() {
            let source = "word ".repeat(40);
            let text = description_txt(source.trim(), &strict()).unwrap();
            assert!(text.contains('\n'));
            for line in text.lines() {
                assert!(line.len() <= 80);
            }
        }

        #[test]
        fn blocks_separated_by_blank_lines() {
            let text = description_txt("First.\n\n* a\n* b\n\nLast.", &strict()).unwrap();
            assert_eq!(text, "First.\n\n* a\n* b\n\nLast.");
        }
    }

    mod wrapping {
        use super::*;

        #[test]
        fn wraps_at_width() {
            let wrapped = wrap_text("aa bb cc dd", 5);
            assert_eq!(wrapped, "aa bb\ncc dd");
        }

        #[test]
        fn long_words_not_broken() {
            let word = "x".repeat(100);
            let wrapped = wrap_text(&format!("start {} end", word), 80);
            assert_eq!(wrapped, format!("start\n{}\nend", word));
        }

        #[test]
        fn empty_input() {
            assert_eq!(wrap_text("", 80), "");
        }
    }

    #[test]
    fn escape_html_basics() {
        assert_eq!(escape_html("a&b"), "a&amp;b");
        assert_eq!(escape_html("<i>"), "&lt;i&gt;");
        assert_eq!(escape_html("\"quoted\""), "\"quoted\"");
    }
}
