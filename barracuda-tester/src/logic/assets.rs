use barracuda_game::{RouteCatalog, RouteDataError, RouteSource};
use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

const EMBEDDED_ROUTES: &str = include_str!("../../assets/routes.json");

/// Route tables compiled into the tester binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedRoutes;

impl RouteSource for EmbeddedRoutes {
    type Error = RouteDataError;

    fn load_routes(&self) -> Result<RouteCatalog, Self::Error> {
        RouteCatalog::from_json(EMBEDDED_ROUTES)
    }
}

/// Route tables read from a JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileRoutes {
    path: PathBuf,
}

impl FileRoutes {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[derive(Debug, Error)]
pub enum FileRoutesError {
    #[error("cannot read route file: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Data(#[from] RouteDataError),
}

impl RouteSource for FileRoutes {
    type Error = FileRoutesError;

    fn load_routes(&self) -> Result<RouteCatalog, Self::Error> {
        let json = fs::read_to_string(&self.path)?;
        Ok(RouteCatalog::from_json(&json)?)
    }
}

/// Shared data every simulation draws its routes from.
#[derive(Debug, Clone)]
pub struct TesterAssets {
    catalog: RouteCatalog,
}

impl TesterAssets {
    /// Load the embedded routes, falling back to an empty catalog if they
    /// fail validation so the run still reports per-scenario failures.
    pub fn load_default() -> Self {
        let catalog = EmbeddedRoutes.load_routes().unwrap_or_else(|err| {
            log::error!("embedded route catalog is invalid: {err}");
            RouteCatalog::empty()
        });
        Self { catalog }
    }

    /// Load routes from any source.
    pub fn from_source<S: RouteSource>(source: &S) -> Result<Self, S::Error> {
        Ok(Self {
            catalog: source.load_routes()?,
        })
    }

    pub const fn catalog(&self) -> &RouteCatalog {
        &self.catalog
    }
}
