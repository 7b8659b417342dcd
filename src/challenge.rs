use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use serde::Deserialize;

static CHALLENGE_DIR: Dir = include_dir!("src/challenges");

/// A reference text the user is asked to reproduce. Immutable; built-in
/// entries are constructed once at startup from the embedded catalog.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Challenge {
    pub id: String,
    pub title: String,
    pub text: String,
}

impl Challenge {
    /// Ad-hoc challenge for a custom prompt passed on the command line.
    pub fn custom(text: String) -> Self {
        Self {
            id: "custom".to_string(),
            title: "Custom".to_string(),
            text,
        }
    }
}

/// Ordered catalog of built-in challenges.
#[derive(Clone, Debug)]
pub struct Catalog {
    challenges: Vec<Challenge>,
}

impl Catalog {
    pub fn builtin() -> Self {
        let file = CHALLENGE_DIR
            .get_file("challenges.json")
            .expect("Challenge catalog not found");

        let raw = file
            .contents_utf8()
            .expect("Unable to interpret challenge catalog as a string");

        let challenges = serde_json::from_str(raw).expect("Unable to deserialize challenge json");

        Self { challenges }
    }

    /// Default selection is the first entry.
    pub fn default_challenge(&self) -> &Challenge {
        &self.challenges[0]
    }

    pub fn by_id(&self, id: &str) -> Option<&Challenge> {
        self.challenges.iter().find(|c| c.id == id)
    }

    /// Entry following `id`, wrapping at the end. Ids not in the catalog
    /// (e.g. a custom prompt) fall back to the first entry.
    pub fn next_after(&self, id: &str) -> &Challenge {
        match self.challenges.iter().position(|c| c.id == id) {
            Some(pos) => &self.challenges[(pos + 1) % self.challenges.len()],
            None => self.default_challenge(),
        }
    }

    pub fn random(&self) -> &Challenge {
        let mut rng = rand::thread_rng();
        self.challenges
            .choose(&mut rng)
            .expect("Challenge catalog is empty")
    }

    pub fn iter(&self) -> impl Iterator<Item = &Challenge> {
        self.challenges.iter()
    }

    pub fn len(&self) -> usize {
        self.challenges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.challenges.is_empty()
    }
}
