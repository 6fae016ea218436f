//! Directory scanners
//!
//! Rust has no runtime `require`, so a [`Loader`] maps each discovered file
//! to the descriptor it defines. The scanner walks the tree and registers
//! what the loader returns, named after the file's path relative to the
//! scanned directory (`admin/users.rs` → `admin/users`).

use crate::component::ComponentDescriptor;
use crate::error::{Result, TesseraError};
use crate::lifecycle::Application;
use crate::meta::Role;
use std::path::Path;
use walkdir::WalkDir;

pub trait Loader {
    /// File extension considered by the scanner, without the dot
    fn extension(&self) -> &str {
        "rs"
    }

    /// The descriptor defined by `path`, or `None` to skip the file.
    fn load(&self, path: &Path) -> Result<Option<ComponentDescriptor>>;
}

impl<F> Loader for F
where
    F: Fn(&Path) -> Result<Option<ComponentDescriptor>>,
{
    fn load(&self, path: &Path) -> Result<Option<ComponentDescriptor>> {
        self(path)
    }
}

pub struct Scanner<L> {
    loader: L,
}

impl<L: Loader> Scanner<L> {
    pub fn new(loader: L) -> Self {
        Self { loader }
    }

    /// Register every module found under `base`. Returns the number registered.
    pub fn modules(&self, app: &mut Application, base: impl AsRef<Path>) -> Result<usize> {
        self.scan(app, base.as_ref(), Role::Module)
    }

    pub fn resources(&self, app: &mut Application, base: impl AsRef<Path>) -> Result<usize> {
        self.scan(app, base.as_ref(), Role::Resource)
    }

    pub fn routes(&self, app: &mut Application, base: impl AsRef<Path>) -> Result<usize> {
        self.scan(app, base.as_ref(), Role::Routes)
    }

    fn scan(&self, app: &mut Application, base: &Path, role: Role) -> Result<usize> {
        if !base.is_dir() {
            return Err(TesseraError::illegal_value(format!(
                "{} is not a directory",
                base.display()
            )));
        }

        let mut registered = 0;
        for entry in WalkDir::new(base).sort_by_file_name() {
            let entry = entry.map_err(|e| TesseraError::Io(e.into()))?;
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|e| e.to_str()) != Some(self.loader.extension())
            {
                continue;
            }

            let Some(mut descriptor) = self.loader.load(path)? else {
                tracing::trace!("No component in {}", path.display());
                continue;
            };
            descriptor.discovered(path, relative_name(base, path));

            match role {
                Role::Module => app.module(descriptor)?,
                Role::Resource => app.resource(descriptor)?,
                Role::Routes => app.routes(descriptor)?,
            }
            registered += 1;
        }

        tracing::debug!("Registered {} {} components from {}", registered, role, base.display());
        Ok(registered)
    }
}

/// `base/admin/users.rs` → `admin/users`
fn relative_name(base: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(base).unwrap_or(path).with_extension("");
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
