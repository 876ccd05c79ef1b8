use std::fmt;

const INDENT: &str = "  ";

/// One entry of an [`ErrorList`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorEntry {
    Message(String),
    List(ErrorList),
}

/// Named, nestable list of violations.
///
/// A validator fills a leaf list with messages; `check` collects the
/// non-empty leaf lists under one root. Rendering indents every nested list
/// one level deeper than its parent and prints messages as `* <message>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorList {
    name: String,
    indent: usize,
    entries: Vec<ErrorEntry>,
}

impl ErrorList {
    /// Create an empty list. An empty name renders no header line.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            indent: 0,
            entries: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display indent level of this list's header.
    pub fn indent(&self) -> usize {
        self.indent
    }

    /// Add a violation message.
    pub fn push(&mut self, message: impl Into<String>) {
        self.entries.push(ErrorEntry::Message(message.into()));
    }

    /// Nest `list` below this one. Empty lists are dropped.
    pub fn push_list(&mut self, mut list: ErrorList) {
        if list.is_empty() {
            return;
        }
        list.set_indent(self.child_indent());
        self.entries.push(ErrorEntry::List(list));
    }

    /// Returns true when neither messages nor nested lists were added.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of direct entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[ErrorEntry] {
        &self.entries
    }

    /// Direct messages, in insertion order.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|entry| match entry {
            ErrorEntry::Message(message) => Some(message.as_str()),
            ErrorEntry::List(_) => None,
        })
    }

    /// Direct nested lists, in insertion order.
    pub fn lists(&self) -> impl Iterator<Item = &ErrorList> {
        self.entries.iter().filter_map(|entry| match entry {
            ErrorEntry::Message(_) => None,
            ErrorEntry::List(list) => Some(list),
        })
    }

    /// First direct nested list called `name`.
    pub fn list(&self, name: &str) -> Option<&ErrorList> {
        self.lists().find(|list| list.name == name)
    }

    /// Every message of this list and its nested lists, depth first.
    pub fn all_messages(&self) -> Vec<&str> {
        let mut messages = Vec::new();
        self.collect_messages(&mut messages);
        messages
    }

    /// `Ok(())` when empty, the list itself otherwise.
    pub fn into_result(self) -> Result<(), ErrorList> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    fn child_indent(&self) -> usize {
        if self.name.is_empty() {
            self.indent
        } else {
            self.indent + 1
        }
    }

    fn set_indent(&mut self, indent: usize) {
        self.indent = indent;
        let child = self.child_indent();
        for entry in &mut self.entries {
            if let ErrorEntry::List(list) = entry {
                list.set_indent(child);
            }
        }
    }

    fn collect_messages<'a>(&'a self, messages: &mut Vec<&'a str>) {
        for entry in &self.entries {
            match entry {
                ErrorEntry::Message(message) => messages.push(message),
                ErrorEntry::List(list) => list.collect_messages(messages),
            }
        }
    }

    fn render(&self, lines: &mut Vec<String>) {
        if !self.name.is_empty() {
            lines.push(format!("{}{}:", INDENT.repeat(self.indent), self.name));
        }
        let pad = INDENT.repeat(self.child_indent());
        for entry in &self.entries {
            match entry {
                ErrorEntry::Message(message) => lines.push(format!("{pad}* {message}")),
                ErrorEntry::List(list) => list.render(lines),
            }
        }
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = Vec::new();
        self.render(&mut lines);
        f.write_str(&lines.join("\n"))
    }
}

impl std::error::Error for ErrorList {}
