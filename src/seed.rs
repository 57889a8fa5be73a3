//! Seed data: the seven characters of the original trilogy

use serde_json::{Map, Value};
use tracing::info;

use crate::id::DocumentId;
use crate::model::{Variant, DISCRIMINANT_FIELD};
use crate::store::DocumentStore;
use crate::types::Episode;
use crate::Result;

const ORIGINAL_TRILOGY: &[Episode] = &Episode::ALL;

/// Ids of the seeded characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeededCharacters {
    pub luke: DocumentId,
    pub vader: DocumentId,
    pub han: DocumentId,
    pub leia: DocumentId,
    pub tarkin: DocumentId,
    pub threepio: DocumentId,
    pub artoo: DocumentId,
}

impl SeededCharacters {
    pub fn all(&self) -> [DocumentId; 7] {
        [
            self.luke,
            self.vader,
            self.han,
            self.leia,
            self.tarkin,
            self.threepio,
            self.artoo,
        ]
    }
}

struct NewCharacter {
    variant: Variant,
    name: &'static str,
    appears_in: &'static [Episode],
    home_planet: Option<&'static str>,
    primary_function: Option<&'static str>,
}

impl NewCharacter {
    fn human(name: &'static str, appears_in: &'static [Episode], home_planet: Option<&'static str>) -> Self {
        Self {
            variant: Variant::Human,
            name,
            appears_in,
            home_planet,
            primary_function: None,
        }
    }

    fn droid(name: &'static str, primary_function: &'static str) -> Self {
        Self {
            variant: Variant::Droid,
            name,
            appears_in: ORIGINAL_TRILOGY,
            home_planet: None,
            primary_function: Some(primary_function),
        }
    }

    fn into_fields(self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert(DISCRIMINANT_FIELD.to_string(), self.variant.name().into());
        fields.insert("name".to_string(), self.name.into());
        fields.insert("friends".to_string(), Value::Array(Vec::new()));
        fields.insert(
            "appearsIn".to_string(),
            self.appears_in.iter().map(|e| Value::from(e.number())).collect(),
        );
        if let Some(home_planet) = self.home_planet {
            fields.insert("homePlanet".to_string(), home_planet.into());
        }
        if let Some(primary_function) = self.primary_function {
            fields.insert("primaryFunction".to_string(), primary_function.into());
        }
        fields
    }
}

async fn insert(store: &dyn DocumentStore, character: NewCharacter) -> Result<DocumentId> {
    store.insert(character.variant, character.into_fields()).await
}

async fn befriend(store: &dyn DocumentStore, id: DocumentId, friends: &[DocumentId]) -> Result<()> {
    let mut fields = Map::new();
    fields.insert(
        "friends".to_string(),
        friends.iter().map(|friend| Value::String(friend.encode())).collect(),
    );
    store.patch(&id, fields).await
}

/// Insert the canonical characters, then link their friendships
pub async fn seed_characters(store: &dyn DocumentStore) -> Result<SeededCharacters> {
    let luke = insert(
        store,
        NewCharacter::human("Luke Skywalker", ORIGINAL_TRILOGY, Some("Tatooine")),
    )
    .await?;
    let vader = insert(
        store,
        NewCharacter::human("Darth Vader", ORIGINAL_TRILOGY, Some("Tatooine")),
    )
    .await?;
    let han = insert(store, NewCharacter::human("Han Solo", ORIGINAL_TRILOGY, None)).await?;
    let leia = insert(
        store,
        NewCharacter::human("Leia Organa", ORIGINAL_TRILOGY, Some("Alderaan")),
    )
    .await?;
    let tarkin = insert(
        store,
        NewCharacter::human("Wilhuff Tarkin", &[Episode::NewHope], None),
    )
    .await?;
    let threepio = insert(store, NewCharacter::droid("C-3PO", "Protocol")).await?;
    let artoo = insert(store, NewCharacter::droid("R2-D2", "Astromech")).await?;

    befriend(store, luke, &[han, leia, threepio, artoo]).await?;
    befriend(store, vader, &[tarkin]).await?;
    befriend(store, han, &[luke, leia, artoo]).await?;
    befriend(store, leia, &[luke, han, threepio, artoo]).await?;
    befriend(store, tarkin, &[vader]).await?;
    befriend(store, threepio, &[luke, han, leia, artoo]).await?;
    befriend(store, artoo, &[luke, han, leia]).await?;

    info!(characters = 7, "seeded star wars characters");

    Ok(SeededCharacters {
        luke,
        vader,
        han,
        leia,
        tarkin,
        threepio,
        artoo,
    })
}
