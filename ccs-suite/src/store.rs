//! Source of body descriptions.
use crate::{Domain, SuiteError};
use anyhow::Result;
use log::debug;
use std::{
    borrow::Cow,
    fs,
    path::{Path, PathBuf},
};

/// Looks up the body description of a domain.
///
/// A file `<dir>/<domain>.xml` takes precedence over the description compiled into
/// the crate.
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    dir: Option<PathBuf>,
}

impl TemplateStore {
    /// Store reading `<dir>/<domain>.xml` before the embedded descriptions.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    /// Directory searched first, if any.
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Returns the description of `domain`.
    ///
    /// # Errors
    ///
    /// [`SuiteError::TemplateNotFound`] if neither a file nor an embedded description
    /// exists, or an I/O error if the file exists but cannot be read.
    pub fn load(&self, domain: Domain) -> Result<Cow<'static, str>> {
        if let Some(dir) = &self.dir {
            let path = dir.join(format!("{}.xml", domain.name()));
            if path.is_file() {
                debug!("Read template of {} from {:?}", domain, path);
                return Ok(Cow::Owned(fs::read_to_string(&path)?));
            }
        }
        match domain.embedded_template() {
            Some(t) => Ok(Cow::Borrowed(t)),
            None => Err(SuiteError::TemplateNotFound(domain.name().to_string()).into()),
        }
    }
}
