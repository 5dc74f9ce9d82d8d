use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::SectionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SectionError {
    #[error("section name cannot be empty")]
    EmptyName,

    #[error("section cannot be its own prerequisite")]
    SelfPrerequisite,
}

//
// ─── SECTION ───────────────────────────────────────────────────────────────────
//

/// A trainable tool/skill unit with an optional single prerequisite.
///
/// Sections form a forest via `prerequisite`: each section points at zero
/// or one other section. Inactive sections are retained for history but
/// excluded from status and logging flows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    id: SectionId,
    name: String,
    prerequisite: Option<SectionId>,
    active: bool,
}

impl Section {
    /// Creates a section, validating the name and prerequisite link.
    ///
    /// # Errors
    ///
    /// Returns `SectionError::EmptyName` if the name is blank after trimming,
    /// or `SectionError::SelfPrerequisite` if the section references itself.
    pub fn new(
        id: SectionId,
        name: impl Into<String>,
        prerequisite: Option<SectionId>,
        active: bool,
    ) -> Result<Self, SectionError> {
        let name = name.into().trim().to_owned();
        if name.is_empty() {
            return Err(SectionError::EmptyName);
        }
        if prerequisite == Some(id) {
            return Err(SectionError::SelfPrerequisite);
        }

        Ok(Self {
            id,
            name,
            prerequisite,
            active,
        })
    }

    #[must_use]
    pub fn id(&self) -> SectionId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn prerequisite(&self) -> Option<SectionId> {
        self.prerequisite
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns a copy of this section with `active` replaced.
    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_rejects_blank_name() {
        let err = Section::new(SectionId::new(1), "   ", None, true).unwrap_err();
        assert_eq!(err, SectionError::EmptyName);
    }

    #[test]
    fn section_rejects_self_reference() {
        let err =
            Section::new(SectionId::new(1), "Laser Use", Some(SectionId::new(1)), true).unwrap_err();
        assert_eq!(err, SectionError::SelfPrerequisite);
    }

    #[test]
    fn section_trims_name_and_keeps_prerequisite() {
        let section =
            Section::new(SectionId::new(2), "  Laser Use  ", Some(SectionId::new(1)), true)
                .unwrap();

        assert_eq!(section.name(), "Laser Use");
        assert_eq!(section.prerequisite(), Some(SectionId::new(1)));
        assert!(section.is_active());
    }

    #[test]
    fn with_active_toggles_flag() {
        let section = Section::new(SectionId::new(3), "Mill", None, true).unwrap();
        let retired = section.with_active(false);
        assert!(!retired.is_active());
    }
}
