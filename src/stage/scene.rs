//! Stage structure read through the `openusd` layer readers.
//!
//! Both text and binary crate layers are loaded into `sdf` specs; only the
//! pseudo-root fields and the root prims' specifier and `active` opinions
//! are kept.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

use openusd::sdf::{self, schema::FieldKey, Path as SdfPath, Spec, Value};
use openusd::usda::TextReader;
use openusd::usdc::CrateData;

use super::prim::Specifier;
use super::StageError;
use crate::constants;

/// On-disk encoding of a layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerFormat {
    /// `#usda` text.
    Text,
    /// `PXR-USDC` binary crate.
    Crate,
}

impl LayerFormat {
    /// Detect the encoding from the first bytes of the file.
    pub fn sniff(bytes: &[u8]) -> Self {
        if bytes.starts_with(constants::USDC_MAGIC) {
            Self::Crate
        } else {
            Self::Text
        }
    }
}

/// A prim spec directly under the pseudo-root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RootPrim {
    pub name: String,
    pub specifier: Specifier,
    pub active: bool,
}

impl RootPrim {
    /// Whether the default child traversal visits this prim.
    pub fn is_traversable(&self) -> bool {
        self.specifier == Specifier::Def && self.active
    }
}

/// What the pipeline needs to know about a layer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SceneIndex {
    pub has_pseudo_root: bool,
    /// Authored `defaultPrim`, whether or not it resolves.
    pub default_prim: Option<String>,
    /// Root prims in child order, `reorder rootPrims` applied.
    pub roots: Vec<RootPrim>,
}

impl SceneIndex {
    /// Index of a brand new layer: a pseudo-root and nothing else.
    pub fn empty() -> Self {
        Self {
            has_pseudo_root: true,
            ..Self::default()
        }
    }

    pub fn root(&self, name: &str) -> Option<&RootPrim> {
        self.roots.iter().find(|p| p.name == name)
    }
}

/// Read a text layer from disk.
pub fn read_text(path: &Path) -> Result<SceneIndex, StageError> {
    let reader = TextReader::read(path).map_err(|err| StageError::Parse {
        reason: format!("{err:#}"),
    })?;
    Ok(index(&reader.into_specs()))
}

/// Read a binary crate layer from its bytes.
pub fn read_crate(bytes: Vec<u8>) -> Result<SceneIndex, StageError> {
    let data = CrateData::open(Cursor::new(bytes), false).map_err(|err| StageError::Parse {
        reason: format!("{err:#}"),
    })?;
    Ok(index(&data.into_specs()))
}

/// Build the index from a layer's specs.
pub fn index(specs: &HashMap<SdfPath, Spec>) -> SceneIndex {
    let Some(pseudo_root) = specs.get(&SdfPath::abs_root()) else {
        return SceneIndex::default();
    };

    let default_prim = match pseudo_root.fields.get(FieldKey::DefaultPrim.as_str()) {
        Some(Value::Token(name) | Value::String(name)) if !name.is_empty() => Some(name.clone()),
        _ => None,
    };

    let children = tokens(pseudo_root, FieldKey::PrimChildren);
    let order = tokens(pseudo_root, FieldKey::PrimOrder);
    let roots = apply_order(children, &order)
        .into_iter()
        .filter_map(|name| {
            let spec = specs.get(&sdf::path(&format!("/{name}")).ok()?)?;
            Some(root_prim(name, spec))
        })
        .collect();

    SceneIndex {
        has_pseudo_root: true,
        default_prim,
        roots,
    }
}

fn tokens(spec: &Spec, key: FieldKey) -> Vec<String> {
    match spec.fields.get(key.as_str()) {
        Some(Value::TokenVec(names) | Value::StringVec(names)) => names.clone(),
        _ => Vec::new(),
    }
}

/// Names listed in `order` come first, in that order; the rest keep their
/// authored order after them.
pub fn apply_order(children: Vec<String>, order: &[String]) -> Vec<String> {
    if order.is_empty() {
        return children;
    }
    let mut ordered: Vec<String> = order
        .iter()
        .filter(|name| children.contains(name))
        .fold(Vec::new(), |mut acc, name| {
            if !acc.contains(name) {
                acc.push(name.clone());
            }
            acc
        });
    for name in children {
        if !ordered.contains(&name) {
            ordered.push(name);
        }
    }
    ordered
}

fn root_prim(name: String, spec: &Spec) -> RootPrim {
    let specifier = match spec.fields.get(FieldKey::Specifier.as_str()) {
        Some(Value::Specifier(sdf::Specifier::Over)) => Specifier::Over,
        Some(Value::Specifier(sdf::Specifier::Class)) => Specifier::Class,
        _ => Specifier::Def,
    };
    let active = !matches!(
        spec.fields.get(FieldKey::Active.as_str()),
        Some(Value::Bool(false))
    );
    RootPrim {
        name,
        specifier,
        active,
    }
}
