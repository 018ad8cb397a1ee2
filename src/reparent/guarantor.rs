//! Default prim guarantee.
//!
//! A layer can only be referenced without an explicit prim path if it names
//! a default prim. When the input lacks one, a candidate is picked from the
//! pseudo-root's children: automatically when there is exactly one, or by
//! asking the user when there are several.

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::config::GuarantorConfig;
use crate::console::Console;
use crate::constants;
use crate::error::{MissingRootCause, ReparentError};
use crate::stage::SceneStage;

/// Ensures a stage has a default prim, skipping blacklisted names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultRootGuarantor {
    blacklist: BTreeSet<String>,
}

impl Default for DefaultRootGuarantor {
    fn default() -> Self {
        Self::from_config(&GuarantorConfig::default())
    }
}

impl DefaultRootGuarantor {
    pub fn new<I, S>(blacklist: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            blacklist: blacklist.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &GuarantorConfig) -> Self {
        Self {
            blacklist: config.blacklist.clone(),
        }
    }

    pub fn is_blacklisted(&self, name: &str) -> bool {
        self.blacklist.contains(name)
    }

    /// Drop blacklisted names, keeping the order of the rest.
    pub fn candidates(&self, children: Vec<String>) -> Vec<String> {
        children
            .into_iter()
            .filter(|name| !self.is_blacklisted(name))
            .collect()
    }

    /// True if the stage already has a default prim; reports it otherwise.
    pub fn has_default_root(&self, stage: &dyn SceneStage, console: &mut dyn Console) -> bool {
        if let Some(name) = stage.default_prim() {
            debug!(path = %stage.path().display(), default_prim = name, "default prim present");
            return true;
        }
        console.error(&format!(
            "USD stage from file {} has no default prim set",
            stage.path().display()
        ));
        false
    }

    /// Pick and persist a default prim. Returns its name.
    pub fn choose_default_root(
        &self,
        stage: &mut dyn SceneStage,
        console: &mut dyn Console,
    ) -> Result<String, ReparentError> {
        let path = stage.path().to_path_buf();
        let missing = |cause| ReparentError::MissingDefaultRoot {
            path: path.clone(),
            cause,
        };

        let children = stage
            .root_children()
            .ok_or_else(|| missing(MissingRootCause::NoPseudoRoot))?;
        let candidates = self.candidates(children);
        debug!(?candidates, "default prim candidates");

        let chosen = match candidates.as_slice() {
            [] => return Err(missing(MissingRootCause::NoValidChildren)),
            [only] => only.clone(),
            _ => {
                print_prim_list(&candidates, console)?;
                let selection = read_selection(console, candidates.len())?;
                candidates
                    .get(selection)
                    .cloned()
                    .ok_or(ReparentError::Selection {
                        selection,
                        count: candidates.len(),
                    })?
            }
        };

        let write_err = |source| ReparentError::StageWrite {
            path: path.clone(),
            source,
        };
        stage.set_default_prim(&chosen).map_err(write_err)?;
        stage.save().map_err(write_err)?;

        if stage.default_prim().is_none() {
            return Err(missing(MissingRootCause::NotPersisted));
        }
        info!(path = %path.display(), default_prim = %chosen, "assigned default prim");
        Ok(chosen)
    }

    /// Make sure the stage has a default prim, choosing one if needed.
    pub fn ensure(
        &self,
        stage: &mut dyn SceneStage,
        console: &mut dyn Console,
    ) -> Result<String, ReparentError> {
        if self.has_default_root(stage, console) {
            if let Some(name) = stage.default_prim() {
                return Ok(name.to_string());
            }
        }
        self.choose_default_root(stage, console)
    }
}

fn print_prim_list(prims: &[String], console: &mut dyn Console) -> Result<(), ReparentError> {
    console.say(constants::HEADER_CHOOSE_DEFAULT_PRIM)?;
    for (index, name) in prims.iter().enumerate() {
        console.say(&format!("{index}: {name}"))?;
    }
    Ok(())
}

/// Prompt until the user enters a number in `0..count`.
///
/// Non-numeric and out-of-range answers are reported and asked again.
pub fn read_selection(console: &mut dyn Console, count: usize) -> Result<usize, ReparentError> {
    loop {
        let Some(line) = console.prompt(constants::PROMPT_DEFAULT_PRIM)? else {
            return Err(ReparentError::InputClosed("a default prim selection"));
        };

        let Ok(selection) = line.trim().parse::<i64>() else {
            console.say(constants::MSG_INVALID_NUMBER)?;
            continue;
        };

        match usize::try_from(selection) {
            Ok(index) if index < count => return Ok(index),
            _ => console.say(&format!(
                "Invalid selection. Please enter a number between 0 and {}.",
                count.saturating_sub(1)
            ))?,
        }
    }
}
