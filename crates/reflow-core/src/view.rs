use std::fmt::Write as _;

#[derive(Clone, Debug, PartialEq)]
pub enum ViewKind {
    /// Renders nothing. Stands in for "no output" wherever a branch is absent.
    Empty,
    /// Transparent grouping of children (a fragment).
    Group,
    Text {
        text: String,
    },
    Element {
        tag: String,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct View {
    pub kind: ViewKind,
    pub key: Option<String>,
    pub children: Vec<View>,
}

impl Default for View {
    fn default() -> Self {
        View::empty()
    }
}

impl View {
    pub fn new(kind: ViewKind) -> Self {
        View {
            kind,
            key: None,
            children: vec![],
        }
    }

    pub fn empty() -> Self {
        View::new(ViewKind::Empty)
    }

    pub fn is_empty(&self) -> bool {
        match self.kind {
            ViewKind::Empty => true,
            ViewKind::Group => self.children.iter().all(View::is_empty),
            _ => false,
        }
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_children(mut self, kids: Vec<View>) -> Self {
        self.children = kids;
        self
    }

    pub fn child(mut self, kid: View) -> Self {
        self.children.push(kid);
        self
    }

    /// Text leaves in document order, with groups and empties flattened away.
    pub fn texts(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_texts(&mut out);
        out
    }

    fn collect_texts(&self, out: &mut Vec<String>) {
        if let ViewKind::Text { text } = &self.kind {
            out.push(text.clone());
        }
        for c in &self.children {
            c.collect_texts(out);
        }
    }

    /// Elements with the given tag, in document order.
    pub fn find_all(&self, tag: &str) -> Vec<&View> {
        let mut out = Vec::new();
        self.collect_tag(tag, &mut out);
        out
    }

    fn collect_tag<'a>(&'a self, tag: &str, out: &mut Vec<&'a View>) {
        if matches!(&self.kind, ViewKind::Element { tag: t } if t == tag) {
            out.push(self);
        }
        for c in &self.children {
            c.collect_tag(tag, out);
        }
    }

    /// Indented tree dump. Empty nodes are skipped; groups are printed as `<>`.
    pub fn dump(&self) -> String {
        let mut s = String::new();
        self.dump_into(&mut s, 0);
        s
    }

    fn dump_into(&self, s: &mut String, depth: usize) {
        let label = match &self.kind {
            ViewKind::Empty => return,
            ViewKind::Group => "<>".to_string(),
            ViewKind::Text { text } => format!("{text:?}"),
            ViewKind::Element { tag } => tag.clone(),
        };
        let _ = write!(s, "{}{}", "  ".repeat(depth), label);
        if let Some(k) = &self.key {
            let _ = write!(s, " #{k}");
        }
        s.push('\n');
        for c in &self.children {
            c.dump_into(s, depth + 1);
        }
    }
}

impl From<&str> for View {
    fn from(s: &str) -> Self {
        View::new(ViewKind::Text { text: s.into() })
    }
}

impl From<String> for View {
    fn from(text: String) -> Self {
        View::new(ViewKind::Text { text })
    }
}
