//! Plain text view of a tab, used to build documents line by line.
//!
//! Tab notation lines chords up with lyrics by column, so text inside `pre`
//! is copied character for character. Everything else is treated like a
//! browser would: runs of whitespace collapse to one space.

use crate::extract::TabContent;
use crate::playlist::collapse;
use scraper::{ElementRef, Html, Node};

const TAB_STOP: usize = 8;
const SKIPPED: [&str; 6] = ["script", "style", "noscript", "button", "svg", "template"];
const BLOCKS: [&str; 25] = [
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "footer", "h1", "h2",
    "h3", "h4", "h5", "h6", "header", "hr", "li", "ol", "p", "pre", "section", "table", "tr",
    "ul",
];

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TabText {
    /// Title, artist and metadata lines.
    pub heading: Vec<String>,
    /// Tab lines, alignment intact.
    pub body: Vec<String>,
}

impl TabText {
    pub fn from_content(content: &TabContent) -> TabText {
        let heading = lines(&content.header_html)
            .iter()
            .map(|l| collapse(l))
            .filter(|l| !l.is_empty())
            .collect();

        TabText {
            heading,
            body: lines(&content.body_html),
        }
    }
}

/// Render an HTML fragment as lines of text.
pub fn lines(fragment: &str) -> Vec<String> {
    let fragment = Html::parse_fragment(fragment);
    let mut out = Lines::default();
    walk(fragment.root_element(), false, &mut out);
    out.finish()
}

fn walk(element: ElementRef, preformatted: bool, out: &mut Lines) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                if preformatted {
                    out.push_verbatim(text);
                } else {
                    out.push_collapsed(text);
                }
            }
            Node::Element(e) => {
                let name = e.name();
                if SKIPPED.contains(&name) {
                    continue;
                }
                if name == "br" {
                    out.newline();
                    continue;
                }
                let Some(child) = ElementRef::wrap(child) else {
                    continue;
                };
                let block = BLOCKS.contains(&name);
                if block {
                    out.break_line();
                }
                walk(child, preformatted || name == "pre", out);
                if block {
                    out.break_line();
                }
            }
            _ => {}
        }
    }
}

#[derive(Default)]
struct Lines {
    done: Vec<String>,
    current: String,
    /// Column of the cursor, in characters.
    column: usize,
    /// Pending collapsed whitespace, emitted only before further text.
    space: bool,
}

impl Lines {
    fn push_verbatim(&mut self, text: &str) {
        self.space = false;
        for c in text.chars() {
            match c {
                '\n' => self.newline(),
                '\r' => {}
                '\t' => {
                    let width = TAB_STOP - self.column % TAB_STOP;
                    self.push_str(&" ".repeat(width));
                }
                // Non-breaking spaces keep their width but not their glyph
                '\u{a0}' => self.push_char(' '),
                c => self.push_char(c),
            }
        }
    }

    fn push_collapsed(&mut self, text: &str) {
        if text.starts_with(char::is_whitespace) && self.column > 0 {
            self.space = true;
        }
        let mut words = text.split_whitespace().peekable();
        while let Some(word) = words.next() {
            if self.space && self.column > 0 {
                self.push_char(' ');
            }
            self.space = false;
            self.push_str(word);
            if words.peek().is_some() {
                self.space = true;
            }
        }
        if text.ends_with(char::is_whitespace) && self.column > 0 {
            self.space = true;
        }
    }

    fn push_char(&mut self, c: char) {
        self.current.push(c);
        self.column += 1;
    }

    fn push_str(&mut self, s: &str) {
        self.current.push_str(s);
        self.column += s.chars().count();
    }

    /// Hard line break, `\n` in `pre` or `<br>`.
    fn newline(&mut self) {
        let line = std::mem::take(&mut self.current);
        self.done.push(line.trim_end().to_string());
        self.column = 0;
        self.space = false;
    }

    /// Block boundary: start a new line unless already at the start of one.
    fn break_line(&mut self) {
        if self.column > 0 {
            self.newline();
        }
        self.space = false;
    }

    fn finish(mut self) -> Vec<String> {
        self.break_line();
        while self.done.last().is_some_and(|l| l.is_empty()) {
            self.done.pop();
        }
        let leading = self.done.iter().take_while(|l| l.is_empty()).count();
        self.done.drain(..leading);
        self.done
    }
}
