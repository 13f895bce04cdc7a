use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

/// An employer whose listings are ingested, keyed by its HeadHunter id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct EmployerTarget {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(range(min = 1))]
    pub id: u32,
}

impl EmployerTarget {
    pub fn new(name: impl Into<String>, id: u32) -> Self {
        Self {
            name: name.into(),
            id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployerTargets(Vec<EmployerTarget>);

impl EmployerTargets {
    pub fn new(targets: Vec<EmployerTarget>) -> Result<Self> {
        if targets.is_empty() {
            return Err(Error::InvalidInput(
                "employer list must contain at least one target".to_string(),
            ));
        }
        for target in &targets {
            target.validate()?;
        }
        Ok(Self(targets))
    }

    /// Loads a JSON array of `{"name": .., "id": ..}` objects.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read employers file {}: {}", path.display(), e))
        })?;
        let targets: Vec<EmployerTarget> = serde_json::from_str(&raw).map_err(|e| {
            Error::Config(format!("Invalid employers file {}: {}", path.display(), e))
        })?;
        Self::new(targets)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EmployerTarget> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for EmployerTargets {
    fn default() -> Self {
        Self(vec![
            EmployerTarget::new("МТС", 3776),
            EmployerTarget::new("Газпромбанк", 3388),
            EmployerTarget::new("Московский Кредитный Банк", 2492),
            EmployerTarget::new("ПАО Совкомбанк", 7944),
            EmployerTarget::new("Альфа Банк", 80),
            EmployerTarget::new("Тензор", 67611),
            EmployerTarget::new("Билайн", 4934),
            EmployerTarget::new("Яндекс", 1740),
            EmployerTarget::new("АО Россельхозбанк", 58320),
            EmployerTarget::new("Банк Открытие", 23040),
        ])
    }
}

impl<'a> IntoIterator for &'a EmployerTargets {
    type Item = &'a EmployerTarget;
    type IntoIter = std::slice::Iter<'a, EmployerTarget>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
