//! Prim specs authored by this tool.

use std::fmt::{self, Write as _};

/// How a prim statement contributes to the stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Specifier {
    /// `def`: a concrete, defined prim.
    Def,
    /// `over`: an override that only contributes opinions.
    Over,
    /// `class`: an abstract prim, skipped by the default traversal.
    Class,
}

impl Specifier {
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Def => "def",
            Self::Over => "over",
            Self::Class => "class",
        }
    }
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Returns true if `name` can be used as a prim name.
///
/// Prim names follow the identifier rules of the scene description:
/// a letter or underscore followed by letters, digits or underscores.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A root prim defined on a stage that has not been written out yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrimSpec {
    specifier: Specifier,
    type_name: Option<String>,
    name: String,
    kind: Option<String>,
    references: Vec<String>,
}

impl PrimSpec {
    pub fn new(specifier: Specifier, type_name: Option<&str>, name: &str) -> Self {
        Self {
            specifier,
            type_name: type_name.map(str::to_string),
            name: name.to_string(),
            kind: None,
            references: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Absolute prim path, e.g. `/assembly`.
    pub fn path(&self) -> String {
        format!("/{}", self.name)
    }

    pub const fn specifier(&self) -> Specifier {
        self.specifier
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    /// Set the model kind (`group`, `assembly`, `component`, ...).
    pub fn set_kind(&mut self, kind: &str) {
        self.kind = Some(kind.to_string());
    }

    pub fn references(&self) -> &[String] {
        &self.references
    }

    /// Prepend a reference to the default prim of the layer at `asset_path`.
    pub fn add_reference(&mut self, asset_path: &str) {
        self.references.push(asset_path.to_string());
    }

    /// Render the prim statement in the text layer format.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(128);

        let _ = write!(out, "{}", self.specifier);
        if let Some(type_name) = &self.type_name {
            let _ = write!(out, " {type_name}");
        }
        let _ = write!(out, " \"{}\"", self.name);

        let mut metadata = Vec::new();
        if let Some(kind) = &self.kind {
            metadata.push(format!("kind = \"{kind}\""));
        }
        match self.references.as_slice() {
            [] => {}
            [single] => metadata.push(format!("prepend references = {}", asset(single))),
            many => {
                let list: Vec<String> = many.iter().map(|r| asset(r)).collect();
                metadata.push(format!("prepend references = [{}]", list.join(", ")));
            }
        }

        if metadata.is_empty() {
            out.push('\n');
        } else {
            out.push_str(" (\n");
            for line in metadata {
                let _ = writeln!(out, "    {line}");
            }
            out.push_str(")\n");
        }
        out.push_str("{\n}\n");
        out
    }
}

/// Quote an asset path, switching to the triple form when it contains `@`.
fn asset(path: &str) -> String {
    if path.contains('@') {
        format!("@@@{path}@@@")
    } else {
        format!("@{path}@")
    }
}
