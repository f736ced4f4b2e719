//! Load locations
//!
//! A [`LoadLocation`] records the tier a configuration fragment was
//! contributed at. The declaration order of the variants is the merge
//! precedence: later locations override earlier ones.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Origin tier of a configuration fragment
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum LoadLocation {
    /// Defaults shipped with a box
    Box,
    /// Basis-wide configuration
    Basis,
    /// Project-wide configuration
    Project,
    /// Target-specific configuration
    Target,
    /// Provider-specific configuration
    Provider,
}

impl LoadLocation {
    /// All locations in ascending precedence order
    pub const ALL: [LoadLocation; 5] = [
        LoadLocation::Box,
        LoadLocation::Basis,
        LoadLocation::Project,
        LoadLocation::Target,
        LoadLocation::Provider,
    ];

    /// Whether a finalized value stored at this location may be adopted
    /// directly as the resolved root
    pub fn is_root(self) -> bool {
        matches!(
            self,
            LoadLocation::Basis | LoadLocation::Project | LoadLocation::Target
        )
    }

    /// Stable lowercase name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Box => "box",
            Self::Basis => "basis",
            Self::Project => "project",
            Self::Target => "target",
            Self::Provider => "provider",
        }
    }
}

impl fmt::Display for LoadLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_follows_declaration_order() {
        let mut shuffled = vec![
            LoadLocation::Provider,
            LoadLocation::Box,
            LoadLocation::Target,
            LoadLocation::Basis,
            LoadLocation::Project,
        ];
        shuffled.sort();
        assert_eq!(shuffled, LoadLocation::ALL.to_vec());
    }

    #[test]
    fn test_root_locations() {
        let roots: Vec<_> = LoadLocation::ALL
            .into_iter()
            .filter(|l| l.is_root())
            .collect();
        assert_eq!(
            roots,
            vec![
                LoadLocation::Basis,
                LoadLocation::Project,
                LoadLocation::Target
            ]
        );
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&LoadLocation::Provider).unwrap();
        assert_eq!(json, "\"provider\"");
        let parsed: LoadLocation = serde_json::from_str("\"basis\"").unwrap();
        assert_eq!(parsed, LoadLocation::Basis);
    }
}
