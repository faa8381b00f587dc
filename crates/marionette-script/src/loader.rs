//! RON content loader
//!
//! Content files are RON structs with optional sections, so one file can
//! hold a whole campaign's definitions or a single enemy. Ids must be
//! unique across every loaded file; a collision is a load error, not a
//! silent overwrite.

use crate::error::{Error, Result};
use marionette_core::{ContentDefs, EffectDef, EnemyDef, ItemDef, SkillDef, StateDef, SyncConfig};
use std::fs;
use std::path::Path;

/// One content file's worth of definitions
#[derive(Debug, Default, serde::Deserialize)]
struct ContentFile {
    #[serde(default)]
    skills: Vec<SkillDef>,
    #[serde(default)]
    items: Vec<ItemDef>,
    #[serde(default)]
    enemies: Vec<EnemyDef>,
    #[serde(default)]
    states: Vec<StateDef>,
    #[serde(default)]
    effects: Vec<EffectDef>,
}

/// Accumulates definitions from RON files into a [`ContentDefs`]
#[derive(Debug, Default)]
pub struct Loader {
    defs: ContentDefs,
}

impl Loader {
    /// Create an empty loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Load one RON file
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let content = fs::read_to_string(path.as_ref())?;
        self.load_str(&content)
    }

    /// Load definitions from a RON string
    pub fn load_str(&mut self, content: &str) -> Result<()> {
        let file: ContentFile = ron::from_str(content)?;

        for skill in file.skills {
            if self.defs.skills.contains_key(&skill.id) {
                return Err(Error::DuplicateDefinition(skill.id.to_string()));
            }
            self.defs.skills.insert(skill.id, skill);
        }
        for item in file.items {
            if self.defs.items.contains_key(&item.id) {
                return Err(Error::DuplicateDefinition(item.id.to_string()));
            }
            self.defs.items.insert(item.id, item);
        }
        for enemy in file.enemies {
            if self.defs.enemies.contains_key(&enemy.id) {
                return Err(Error::DuplicateDefinition(enemy.id.to_string()));
            }
            self.defs.enemies.insert(enemy.id, enemy);
        }
        for state in file.states {
            if self.defs.states.contains_key(&state.id) {
                return Err(Error::DuplicateDefinition(state.id.to_string()));
            }
            self.defs.states.insert(state.id, state);
        }
        for effect in file.effects {
            if self.defs.effects.contains_key(&effect.id) {
                return Err(Error::DuplicateDefinition(effect.id.to_string()));
            }
            self.defs.effects.insert(effect.id, effect);
        }
        Ok(())
    }

    /// Load every `.ron` file under a directory, recursively
    ///
    /// Returns the number of files loaded.
    pub fn load_directory(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let mut loaded = 0;
        for entry in fs::read_dir(path.as_ref())? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                loaded += self.load_directory(&path)?;
            } else if path.extension().is_some_and(|ext| ext == "ron") {
                self.load_file(&path)?;
                loaded += 1;
            }
        }
        Ok(loaded)
    }

    /// Finish loading and take the registry
    pub fn finish(self) -> ContentDefs {
        self.defs
    }
}

/// Load a [`SyncConfig`] from a RON file
pub fn load_config(path: impl AsRef<Path>) -> Result<SyncConfig> {
    let content = fs::read_to_string(path.as_ref())?;
    Ok(ron::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use marionette_core::{EnemyId, SkillId, TargetScope};

    const SAMPLE: &str = r#"(
        skills: [
            (id: 1, name: "Attack", animation: -1),
            (id: 8, name: "Fire", animation: 5, scope: enemy, mp_cost: 4),
        ],
        items: [
            (id: 7, name: "Potion", animation: 2),
        ],
        enemies: [
            (id: 3, name: "Slime", attack_animation: 6),
        ],
        effects: [
            (id: 4, commands: [
                set_switch(id: 10, value: true),
                wait(ticks: 2),
                show_text(text: "It got angry!"),
            ]),
        ],
    )"#;

    #[test]
    fn test_load_sample_content() {
        let mut loader = Loader::new();
        loader.load_str(SAMPLE).unwrap();
        let defs = loader.finish();
        assert_eq!(defs.skills.len(), 2);
        assert_eq!(defs.skill(SkillId::new(8)).unwrap().mp_cost, 4);
        assert_eq!(defs.item(marionette_core::ItemId::new(7)).unwrap().scope, TargetScope::Ally);
        assert_eq!(defs.enemy(EnemyId::new(3)).unwrap().name, "Slime");
        assert_eq!(
            defs.effect(marionette_core::EffectId::new(4)).unwrap().commands.len(),
            3
        );
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut loader = Loader::new();
        loader.load_str(SAMPLE).unwrap();
        let err = loader
            .load_str(r#"(skills: [(id: 8, name: "Other")])"#)
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateDefinition(_)));
    }

    #[test]
    fn test_sections_are_optional() {
        let mut loader = Loader::new();
        loader.load_str(r#"(states: [(id: 4, name: "Poison")])"#).unwrap();
        let defs = loader.finish();
        assert_eq!(defs.states.len(), 1);
        assert!(defs.skills.is_empty());
    }

    #[test]
    fn test_malformed_ron_is_an_error() {
        let mut loader = Loader::new();
        assert!(matches!(
            loader.load_str("(skills: [nonsense"),
            Err(Error::Ron(_))
        ));
    }

    #[test]
    fn test_directory_walk() {
        let dir = std::env::temp_dir().join(format!(
            "marionette-script-test-{}",
            std::process::id()
        ));
        let nested = dir.join("nested");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.join("skills.ron"), r#"(skills: [(id: 1, name: "Attack")])"#).unwrap();
        fs::write(
            nested.join("enemies.ron"),
            r#"(enemies: [(id: 3, name: "Slime")])"#,
        )
        .unwrap();
        fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let mut loader = Loader::new();
        let loaded = loader.load_directory(&dir).unwrap();
        fs::remove_dir_all(&dir).unwrap();

        assert_eq!(loaded, 2);
        let defs = loader.finish();
        assert!(defs.skill(SkillId::new(1)).is_some());
        assert!(defs.enemy(EnemyId::new(3)).is_some());
    }
}
