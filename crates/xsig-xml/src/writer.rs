#![forbid(unsafe_code)]

//! A small XML writer used to build signature markup.

/// Escape character data for element content.
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape an attribute value for a double-quoted attribute.
pub fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Builds an XML fragment as a string.
///
/// Names are written verbatim; callers pass qualified names such as
/// `ds:SignedInfo`.
#[derive(Debug, Default)]
pub struct XmlWriter {
    out: String,
}

impl XmlWriter {
    /// Create a new XML writer.
    pub fn new() -> Self {
        Self::default()
    }

    fn write_start(&mut self, name: &str, attrs: &[(&str, &str)]) {
        self.out.push('<');
        self.out.push_str(name);
        for (k, v) in attrs {
            self.out.push(' ');
            self.out.push_str(k);
            self.out.push_str("=\"");
            self.out.push_str(&escape_attr(v));
            self.out.push('"');
        }
    }

    /// Start an element with the given name and attributes.
    pub fn start_element(&mut self, name: &str, attrs: &[(&str, &str)]) {
        self.write_start(name, attrs);
        self.out.push('>');
    }

    /// Write an element with no content, as a start/end tag pair.
    pub fn empty_element(&mut self, name: &str, attrs: &[(&str, &str)]) {
        self.start_element(name, attrs);
        self.end_element(name);
    }

    /// Write an element whose only content is `text`.
    pub fn text_element(&mut self, name: &str, attrs: &[(&str, &str)], text: &str) {
        self.start_element(name, attrs);
        self.write_text(text);
        self.end_element(name);
    }

    /// End the current element.
    pub fn end_element(&mut self, name: &str) {
        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push('>');
    }

    /// Write text content.
    pub fn write_text(&mut self, text: &str) {
        self.out.push_str(&escape_text(text));
    }

    /// Finish writing and return the XML as a string.
    pub fn into_string(self) -> String {
        self.out
    }
}
