//! Fully qualified destination of an upload.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An immutable `(database, schema, table)` triple.
///
/// Values are snapshots taken when the user completes a selection. The
/// listing layer only hands out names it has seen in the warehouse catalog,
/// so a `CatalogPath` built by the controller always names a base table that
/// existed at selection time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatalogPath {
    pub database: String,
    pub schema: String,
    pub table: String,
}

impl CatalogPath {
    #[must_use]
    pub fn new(
        database: impl Into<String>,
        schema: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            database: database.into(),
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// The three name parts in order, for identifier quoting.
    #[must_use]
    pub fn parts(&self) -> [&str; 3] {
        [&self.database, &self.schema, &self.table]
    }
}

impl fmt::Display for CatalogPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.database, self.schema, self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_dotted() {
        let path = CatalogPath::new("ANALYTICS", "SALES", "EMP_SALARY");
        assert_eq!(path.to_string(), "ANALYTICS.SALES.EMP_SALARY");
        assert_eq!(path.parts(), ["ANALYTICS", "SALES", "EMP_SALARY"]);
    }
}
