use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Astronaut {
    pub name: String,
    pub craft: String,
}

/// Raw `astros.json` body
#[derive(Debug, Deserialize)]
pub(crate) struct AstrosResponse {
    pub message: String,
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub people: Vec<Astronaut>,
}

/// People currently in space
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Census {
    pub people: Vec<Astronaut>,
    /// Head count as reported upstream
    pub number: u32,
}

impl Census {
    /// Distinct craft names, alphabetical
    pub fn crafts(&self) -> Vec<String> {
        self.people
            .iter()
            .map(|person| person.craft.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
