use std::fmt;

use serde::{Deserialize, Serialize};

/// Entity families governed independently by the import options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Family {
    Window,
    Keys,
    Blocks,
    Sprites,
    Objects,
    Screens,
    Map,
    Font,
    Palette,
}

impl Family {
    pub const COUNT: usize = 9;

    pub const ALL: [Family; Self::COUNT] = [
        Family::Window,
        Family::Keys,
        Family::Blocks,
        Family::Sprites,
        Family::Objects,
        Family::Screens,
        Family::Map,
        Family::Font,
        Family::Palette,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Window => "window",
            Self::Keys => "keys",
            Self::Blocks => "blocks",
            Self::Sprites => "sprites",
            Self::Objects => "objects",
            Self::Screens => "screens",
            Self::Map => "map",
            Self::Font => "font",
            Self::Palette => "palette",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyPolicy {
    /// Skip every record of this family.
    pub ignore: bool,
    /// Clear the existing collection the first time the family is imported.
    pub overwrite: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOptions {
    policies: [FamilyPolicy; Family::COUNT],
}

impl ImportOptions {
    /// Import every family additively.
    pub fn all() -> Self {
        Self::default()
    }

    /// Import only the listed families; every other family is ignored.
    pub fn only(families: &[Family]) -> Self {
        let mut options = Self::default();
        for family in Family::ALL {
            options.policies[family.index()].ignore = !families.contains(&family);
        }
        options
    }

    pub fn with_overwrite_all(mut self, overwrite: bool) -> Self {
        for policy in &mut self.policies {
            policy.overwrite = overwrite;
        }
        self
    }

    pub fn policy(&self, family: Family) -> FamilyPolicy {
        self.policies[family.index()]
    }

    pub fn set_policy(&mut self, family: Family, policy: FamilyPolicy) {
        self.policies[family.index()] = policy;
    }

    pub fn set_ignore(&mut self, family: Family, ignore: bool) {
        self.policies[family.index()].ignore = ignore;
    }

    pub fn set_overwrite(&mut self, family: Family, overwrite: bool) {
        self.policies[family.index()].overwrite = overwrite;
    }

    pub fn ignores(&self, family: Family) -> bool {
        self.policies[family.index()].ignore
    }

    pub fn overwrites(&self, family: Family) -> bool {
        self.policies[family.index()].overwrite
    }
}
