//! Layer backed stage.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, trace, warn};

use super::prim::{is_valid_identifier, PrimSpec, Specifier};
use super::scene::{self, LayerFormat, RootPrim, SceneIndex};
use super::usda;
use super::{SceneStage, StageError};
use crate::constants;

/// A stage over a single layer file, text or binary crate.
///
/// Structure is read through `openusd`. Text layers are edited in place:
/// only the layer metadata is rewritten and everything else is kept byte
/// for byte. Prims defined through [`SceneStage::define_prim`] are appended
/// when the stage is saved. Crate layers are read-only.
#[derive(Debug)]
pub struct UsdStage {
    path: PathBuf,
    format: LayerFormat,
    /// Source of a text layer; empty for crate layers.
    text: String,
    scene: SceneIndex,
    defined: Vec<PrimSpec>,
    dirty: bool,
}

impl UsdStage {
    /// Open an existing layer.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StageError> {
        let path = path.as_ref().to_path_buf();
        let bytes = fs::read(&path).map_err(StageError::Read)?;

        let format = LayerFormat::sniff(&bytes);
        let (text, scene) = match format {
            LayerFormat::Crate => (String::new(), scene::read_crate(bytes)?),
            LayerFormat::Text => {
                let text = String::from_utf8(bytes).map_err(|_| StageError::NotText)?;
                (text, scene::read_text(&path)?)
            }
        };
        debug!(path = %path.display(), ?format, prims = scene.roots.len(), "opened stage");

        Ok(Self {
            path,
            format,
            text,
            scene,
            defined: Vec::new(),
            dirty: false,
        })
    }

    /// Start a new, empty text layer that will be written to `path` on save.
    ///
    /// Nothing touches the disk until [`SceneStage::save`] is called.
    pub fn create_new(path: impl AsRef<Path>) -> Result<Self, StageError> {
        let path = path.as_ref().to_path_buf();

        if path.is_dir() {
            return Err(StageError::Uncreatable {
                path,
                reason: "a directory exists at that path".to_string(),
            });
        }
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        if !parent.is_dir() {
            let reason = format!("directory {} does not exist", parent.display());
            return Err(StageError::Uncreatable { path, reason });
        }

        debug!(path = %path.display(), "created stage");
        Ok(Self {
            path,
            format: LayerFormat::Text,
            text: format!("{}\n", constants::USDA_HEADER),
            scene: SceneIndex::empty(),
            defined: Vec::new(),
            dirty: true,
        })
    }

    pub fn format(&self) -> LayerFormat {
        self.format
    }

    /// The layer as it would be written by the next save.
    pub fn to_text(&self) -> String {
        let mut out = self.text.clone();
        for prim in &self.defined {
            if !out.ends_with('\n') {
                out.push('\n');
            }
            out.push('\n');
            out.push_str(&prim.render());
        }
        out
    }

    /// Prims defined on this stage since it was opened or last saved.
    pub fn defined_prims(&self) -> &[PrimSpec] {
        &self.defined
    }

    /// Whether any root prim spec, of any specifier, has this name.
    fn has_root(&self, name: &str) -> bool {
        self.scene.root(name).is_some() || self.defined.iter().any(|p| p.name() == name)
    }

    fn ensure_editable(&self) -> Result<(), StageError> {
        match self.format {
            LayerFormat::Text => Ok(()),
            LayerFormat::Crate => Err(StageError::CrateReadOnly),
        }
    }
}

impl SceneStage for UsdStage {
    fn path(&self) -> &Path {
        &self.path
    }

    fn default_prim(&self) -> Option<&str> {
        let name = self.scene.default_prim.as_deref()?;
        self.has_root(name).then_some(name)
    }

    fn set_default_prim(&mut self, name: &str) -> Result<(), StageError> {
        if !self.has_root(name) {
            return Err(StageError::UnknownPrim(name.to_string()));
        }
        self.ensure_editable()?;

        let head = usda::scan_head(&self.text).map_err(StageError::Syntax)?;
        let literal = format!("\"{name}\"");
        let existing = head.metadata.as_ref().map(|m| {
            (
                m.span.start,
                m.field("defaultPrim").map(|f| f.value_span.clone()),
            )
        });

        match existing {
            Some((_, Some(value_span))) => {
                self.text.replace_range(value_span, &literal);
            }
            Some((block_start, None)) => {
                let insert_at = block_start + 1;
                let own_line = self.text[insert_at..]
                    .trim_start_matches([' ', '\t', '\r'])
                    .starts_with('\n');
                let mut entry = format!("\n    defaultPrim = {literal}");
                if !own_line {
                    entry.push('\n');
                }
                self.text.insert_str(insert_at, &entry);
            }
            None => {
                let insert_at = head.header_end;
                let mut block = String::new();
                if !self.text[..insert_at].ends_with('\n') {
                    block.push('\n');
                }
                block.push_str(&format!("(\n    defaultPrim = {literal}\n)\n"));
                self.text.insert_str(insert_at, &block);
            }
        }

        self.scene.default_prim = Some(name.to_string());
        self.dirty = true;
        debug!(path = %self.path.display(), default_prim = name, "set default prim");
        Ok(())
    }

    fn root_children(&self) -> Option<Vec<String>> {
        if !self.scene.has_pseudo_root {
            return None;
        }

        let mut children: Vec<String> = Vec::new();
        let read = self
            .scene
            .roots
            .iter()
            .filter(|p| p.is_traversable())
            .map(|p| p.name.as_str());
        let defined = self
            .defined
            .iter()
            .filter(|p| p.specifier() == Specifier::Def)
            .map(PrimSpec::name);

        for name in read.chain(defined) {
            if !children.iter().any(|c| c == name) {
                children.push(name.to_string());
            }
        }
        Some(children)
    }

    fn define_prim(&mut self, path: &str, type_name: &str) -> Result<&mut PrimSpec, StageError> {
        let name = path
            .strip_prefix('/')
            .filter(|name| is_valid_identifier(name))
            .ok_or_else(|| StageError::InvalidPrimPath(path.to_string()))?;

        if self.has_root(name) {
            return Err(StageError::DuplicatePrim(path.to_string()));
        }
        self.ensure_editable()?;

        let index = self.defined.len();
        self.defined
            .push(PrimSpec::new(Specifier::Def, Some(type_name), name));
        self.dirty = true;
        trace!(path, type_name, "defined prim");
        Ok(&mut self.defined[index])
    }

    fn save(&mut self) -> Result<(), StageError> {
        if !self.dirty {
            debug!(path = %self.path.display(), "stage unchanged, nothing to save");
            return Ok(());
        }

        let contents = self.to_text();
        fs::write(&self.path, &contents).map_err(StageError::Write)?;

        self.text = contents;
        self.scene.roots.extend(self.defined.drain(..).map(|prim| RootPrim {
            name: prim.name().to_string(),
            specifier: prim.specifier(),
            active: true,
        }));
        self.dirty = false;
        debug!(path = %self.path.display(), "saved stage");
        Ok(())
    }
}

impl Drop for UsdStage {
    fn drop(&mut self) {
        if self.dirty {
            warn!(path = %self.path.display(), "closing stage with unsaved changes");
        } else {
            trace!(path = %self.path.display(), "closing stage");
        }
    }
}
