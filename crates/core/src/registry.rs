use std::collections::HashSet;

use axis_protocol::{Section, SectionId};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("section registry is empty")]
    Empty,
    #[error("section at position {0} has a blank id")]
    BlankId(usize),
    #[error("duplicate section id: {0}")]
    DuplicateId(String),
    #[error("unknown section id: {0}")]
    UnknownSection(String),
}

/// Sections of the Project Axis page, top to bottom.
const PROJECT_AXIS_SECTIONS: [(&str, &str); 8] = [
    ("hero", "Hero"),
    ("about", "About"),
    ("timeline", "Timeline"),
    ("forecast", "Forecast"),
    ("benchmarks", "Benchmarks"),
    ("insights", "Insights"),
    ("publications", "Publications"),
    ("contact", "Contact"),
];

/// The ordered, immutable catalog of trackable sections.
///
/// Order is page order: it defines each section's index and the direction of
/// the active-section scan. A registry is never empty and ids are unique.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionRegistry {
    sections: Vec<Section>,
}

impl SectionRegistry {
    pub fn new(sections: Vec<Section>) -> Result<Self, RegistryError> {
        if sections.is_empty() {
            return Err(RegistryError::Empty);
        }
        let mut seen = HashSet::with_capacity(sections.len());
        for (position, section) in sections.iter().enumerate() {
            if section.id.trim().is_empty() {
                return Err(RegistryError::BlankId(position));
            }
            if !seen.insert(section.id.as_str()) {
                return Err(RegistryError::DuplicateId(section.id.to_string()));
            }
        }
        Ok(Self { sections })
    }

    /// The registry the Project Axis page ships with.
    pub fn project_axis() -> Self {
        Self {
            sections: PROJECT_AXIS_SECTIONS
                .iter()
                .map(|(id, name)| Section::new(*id, *name))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Always false; kept for the `len` / `is_empty` pairing.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn first(&self) -> &Section {
        // Construction rejects empty registries.
        &self.sections[0]
    }

    pub fn get(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index_of(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &SectionId> {
        self.sections.iter().map(|s| &s.id)
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }
}

impl Default for SectionRegistry {
    fn default() -> Self {
        Self::project_axis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_axis_registry_order() {
        let reg = SectionRegistry::project_axis();
        assert_eq!(reg.len(), 8);
        assert_eq!(reg.first().id, "hero");
        let ids: Vec<&str> = reg.ids().map(|id| id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "hero",
                "about",
                "timeline",
                "forecast",
                "benchmarks",
                "insights",
                "publications",
                "contact"
            ]
        );
    }

    #[test]
    fn project_axis_passes_validation() {
        let reg = SectionRegistry::project_axis();
        let rebuilt = SectionRegistry::new(reg.sections().to_vec());
        assert_eq!(rebuilt, Ok(reg));
    }

    #[test]
    fn lookup_by_id() {
        let reg = SectionRegistry::project_axis();
        assert_eq!(reg.index_of("timeline"), Some(2));
        assert_eq!(reg.get("contact").map(|s| s.name.as_str()), Some("Contact"));
        assert!(reg.get("agi").is_none());
        assert!(!reg.contains("agi"));
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(SectionRegistry::new(vec![]), Err(RegistryError::Empty));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = SectionRegistry::new(vec![
            Section::new("hero", "Hero"),
            Section::new("about", "About"),
            Section::new("hero", "Hero again"),
        ]);
        assert_eq!(err, Err(RegistryError::DuplicateId("hero".into())));
    }

    #[test]
    fn rejects_blank_ids() {
        let err = SectionRegistry::new(vec![Section::new("hero", "Hero"), Section::new("  ", "?")]);
        assert_eq!(err, Err(RegistryError::BlankId(1)));
    }
}
