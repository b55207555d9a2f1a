//! Dependency Declarations
//!
//! A prim declares what it depends on inside a reserved container of its
//! data (by default `__dependencies`). Each child of that container is one
//! named declaration with three optional fields:
//!
//! ```text
//! __dependencies/
//!     <name>/
//!         dependedOnPrimPath          path     (empty or absent: this prim)
//!         dependedOnDataSourceLocator locator  (absent: the whole prim)
//!         affectedDataSourceLocator   locator  (absent: the whole prim)
//! ```
//!
//! Reading is forgiving. A declaration that is not a container is skipped,
//! and a field of the wrong kind is treated as absent.

use tracing::debug;

use crate::base::{PrimPath, Token};
use crate::data_source::{locate, ContainerHandle, DataSource, RetainedContainer};
use crate::locator::DataSourceLocator;

/// Field naming the depended-on prim.
pub const DEPENDED_ON_PRIM_PATH: &str = "dependedOnPrimPath";
/// Field naming the depended-on locator.
pub const DEPENDED_ON_DATA_SOURCE_LOCATOR: &str = "dependedOnDataSourceLocator";
/// Field naming the affected locator.
pub const AFFECTED_DATA_SOURCE_LOCATOR: &str = "affectedDataSourceLocator";
/// Default name of the declaration container.
pub const DEPENDENCIES: &str = "__dependencies";

/// One named dependency declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependencyDeclaration {
    /// Name of the declaration, unique within its prim.
    pub name: Token,
    /// The prim depended on. Empty means the declaring prim itself.
    pub depended_on_prim_path: PrimPath,
    /// The data depended on.
    pub depended_on_locator: DataSourceLocator,
    /// The data of the declaring prim that is affected.
    pub affected_locator: DataSourceLocator,
}

impl DependencyDeclaration {
    /// Declare a dependency on another prim.
    pub fn new(
        name: impl Into<Token>,
        depended_on_prim_path: PrimPath,
        depended_on_locator: DataSourceLocator,
        affected_locator: DataSourceLocator,
    ) -> Self {
        Self {
            name: name.into(),
            depended_on_prim_path,
            depended_on_locator,
            affected_locator,
        }
    }

    /// Declare a dependency of one part of a prim on another part of it.
    pub fn on_self(
        name: impl Into<Token>,
        depended_on_locator: DataSourceLocator,
        affected_locator: DataSourceLocator,
    ) -> Self {
        Self::new(
            name,
            PrimPath::empty(),
            depended_on_locator,
            affected_locator,
        )
    }

    /// The depended-on prim, with the empty path resolved to `declaring`.
    pub fn resolved_prim_path(&self, declaring: &PrimPath) -> PrimPath {
        if self.depended_on_prim_path.is_empty() {
            declaring.clone()
        } else {
            self.depended_on_prim_path.clone()
        }
    }

    fn to_container(&self) -> ContainerHandle {
        let mut builder = RetainedContainer::builder();
        if !self.depended_on_prim_path.is_empty() {
            builder.set(DEPENDED_ON_PRIM_PATH, self.depended_on_prim_path.clone());
        }
        builder
            .with(DEPENDED_ON_DATA_SOURCE_LOCATOR, self.depended_on_locator.clone())
            .with(AFFECTED_DATA_SOURCE_LOCATOR, self.affected_locator.clone())
            .build()
    }
}

/// Reader over a prim's declaration container.
#[derive(Debug, Clone, Default)]
pub struct DependenciesSchema {
    container: Option<ContainerHandle>,
}

impl DependenciesSchema {
    /// Wrap a declaration container.
    pub fn new(container: Option<ContainerHandle>) -> Self {
        Self { container }
    }

    /// Find the declaration container at `locator` within a prim's data.
    pub fn from_parent(prim: &ContainerHandle, locator: &DataSourceLocator) -> Self {
        let container = locate(prim, locator).and_then(|found| match found {
            DataSource::Container(container) => Some(container),
            DataSource::Value(_) => {
                debug!(%locator, "dependency declarations are not a container");
                None
            }
        });
        Self { container }
    }

    /// The default location of the declaration container.
    pub fn default_locator() -> DataSourceLocator {
        DataSourceLocator::new([DEPENDENCIES])
    }

    /// Check whether a declaration container was found.
    pub fn is_defined(&self) -> bool {
        self.container.is_some()
    }

    /// The wrapped container.
    pub fn container(&self) -> Option<&ContainerHandle> {
        self.container.as_ref()
    }

    /// Read every well-formed declaration, in container order.
    pub fn declarations(&self) -> Vec<DependencyDeclaration> {
        let Some(container) = &self.container else {
            return Vec::new();
        };

        let mut declarations = Vec::new();
        for name in container.names() {
            let Some(child) = container.get(&name) else {
                continue;
            };
            let Some(entry) = child.as_container() else {
                debug!(declaration = %name, "skipping dependency that is not a container");
                continue;
            };
            declarations.push(DependencyDeclaration {
                depended_on_prim_path: read_field(entry, &name, DEPENDED_ON_PRIM_PATH, |ds| {
                    ds.as_path().cloned()
                })
                .unwrap_or_default(),
                depended_on_locator: read_field(
                    entry,
                    &name,
                    DEPENDED_ON_DATA_SOURCE_LOCATOR,
                    |ds| ds.as_locator().cloned(),
                )
                .unwrap_or_default(),
                affected_locator: read_field(entry, &name, AFFECTED_DATA_SOURCE_LOCATOR, |ds| {
                    ds.as_locator().cloned()
                })
                .unwrap_or_default(),
                name,
            });
        }
        declarations
    }

    /// Build a declaration container.
    pub fn build<I>(declarations: I) -> ContainerHandle
    where
        I: IntoIterator<Item = DependencyDeclaration>,
    {
        RetainedContainer::new(
            declarations
                .into_iter()
                .map(|declaration| (declaration.name.clone(), declaration.to_container())),
        )
    }
}

fn read_field<T>(
    entry: &ContainerHandle,
    declaration: &Token,
    field: &str,
    convert: impl FnOnce(&DataSource) -> Option<T>,
) -> Option<T> {
    let value = entry.get(&Token::new(field))?;
    let converted = convert(&value);
    if converted.is_none() {
        debug!(%declaration, field, "ignoring dependency field of the wrong kind");
    }
    converted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(text: &str) -> PrimPath {
        text.parse().unwrap()
    }

    fn loc(text: &str) -> DataSourceLocator {
        DataSourceLocator::parse(text)
    }

    #[test]
    fn build_then_read() {
        let declarations = vec![
            DependencyDeclaration::new("xform", path("/B"), loc("xform"), loc("xform")),
            DependencyDeclaration::on_self("color", loc("primvars/color"), loc("displayColor")),
        ];
        let prim = RetainedContainer::builder()
            .with(DEPENDENCIES, DependenciesSchema::build(declarations.clone()))
            .build();

        let schema = DependenciesSchema::from_parent(&prim, &DependenciesSchema::default_locator());
        assert!(schema.is_defined());
        assert_eq!(schema.declarations(), declarations);
    }

    #[test]
    fn missing_container_reads_empty() {
        let prim = RetainedContainer::builder().with("xform", 1_i64).build();
        let schema = DependenciesSchema::from_parent(&prim, &DependenciesSchema::default_locator());
        assert!(!schema.is_defined());
        assert!(schema.declarations().is_empty());
    }

    #[test]
    fn leaf_in_place_of_container_is_undefined() {
        let prim = RetainedContainer::builder().with(DEPENDENCIES, true).build();
        let schema = DependenciesSchema::from_parent(&prim, &DependenciesSchema::default_locator());
        assert!(!schema.is_defined());
    }

    #[test]
    fn absent_fields_default_to_whole_prim_on_self() {
        let container = RetainedContainer::builder()
            .with("bare", RetainedContainer::builder().build())
            .build();
        let declarations = DependenciesSchema::new(Some(container)).declarations();

        assert_eq!(declarations.len(), 1);
        let bare = &declarations[0];
        assert!(bare.depended_on_prim_path.is_empty());
        assert!(bare.depended_on_locator.is_empty());
        assert!(bare.affected_locator.is_empty());
        assert_eq!(bare.resolved_prim_path(&path("/P")), path("/P"));
    }

    #[test]
    fn malformed_entries_are_forgiven() {
        let wrong_kinds = RetainedContainer::builder()
            .with(DEPENDED_ON_PRIM_PATH, "not a path")
            .with(DEPENDED_ON_DATA_SOURCE_LOCATOR, loc("a"))
            .with(AFFECTED_DATA_SOURCE_LOCATOR, 7_i64)
            .build();
        let container = RetainedContainer::builder()
            .with("leaf", 3_i64)
            .with("wrong", wrong_kinds)
            .build();
        let declarations = DependenciesSchema::new(Some(container)).declarations();

        assert_eq!(declarations.len(), 1);
        assert_eq!(declarations[0].name.as_str(), "wrong");
        assert!(declarations[0].depended_on_prim_path.is_empty());
        assert_eq!(declarations[0].depended_on_locator, loc("a"));
        assert!(declarations[0].affected_locator.is_empty());
    }
}
