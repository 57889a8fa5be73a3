//! Character model
//!
//! Characters are stored as documents carrying a `type` discriminant. The
//! discriminant picks the variant ([`Variant::of`]) and the variant's payload
//! is decoded with serde. Friends are kept as plain ids and resolved on
//! demand through the request's [`DocumentLoader`], never as live references.

use std::fmt;
use std::str::FromStr;

use async_graphql::{Context, Interface, Object};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{error, warn};

use crate::dataloaders::DocumentLoader;
use crate::id::DocumentId;
use crate::store::Document;
use crate::types::Episode;
use crate::{Error, Result};

/// Field holding the variant discriminant
pub const DISCRIMINANT_FIELD: &str = "type";

/// Concrete character shape, doubling as the table it is stored in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Human,
    Droid,
}

impl Variant {
    pub fn name(self) -> &'static str {
        match self {
            Variant::Human => "Human",
            Variant::Droid => "Droid",
        }
    }

    /// Resolve which variant a stored document belongs to
    ///
    /// A missing or unrecognised discriminant means the record is corrupt.
    pub fn of(document: &Document) -> Result<Self> {
        let discriminant = document
            .get(DISCRIMINANT_FIELD)
            .and_then(|value| value.as_str())
            .unwrap_or_default();

        discriminant.parse().inspect_err(|_| {
            error!(
                id = %document.id(),
                discriminant,
                "document has no recognised character type"
            );
        })
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Human" => Ok(Variant::Human),
            "Droid" => Ok(Variant::Droid),
            other => Err(Error::UnknownVariant(other.to_string())),
        }
    }
}

fn decode<T: DeserializeOwned>(document: &Document) -> Result<T> {
    serde_json::from_value(document.to_value()).map_err(|source| {
        error!(id = %document.id(), %source, "malformed character document");
        Error::MalformedDocument {
            id: document.id(),
            source,
        }
    })
}

/// Record `result`'s error at the current field and resolve to null
///
/// Errors are attached here instead of returned so they keep their response
/// path when the field is reached through the `Character` interface.
pub(crate) fn null_on_error<T>(ctx: &Context<'_>, result: async_graphql::Result<Option<T>>) -> Option<T> {
    result.unwrap_or_else(|err| {
        ctx.add_error(ctx.set_error_path(err.into_server_error(ctx.item.pos)));
        None
    })
}

/// Resolve stored friend ids into characters, keeping their order
async fn resolve_friends(
    ctx: &Context<'_>,
    owner: DocumentId,
    friends: &[DocumentId],
) -> async_graphql::Result<Option<Vec<Character>>> {
    let loader = ctx.data::<DocumentLoader>()?;
    let loaded = loader.load_many(friends.to_vec()).await?;

    let characters = friends
        .iter()
        .map(|friend| {
            let document = loaded.get(friend).ok_or_else(|| {
                warn!(%owner, %friend, "friend does not resolve to a character");
                Error::DanglingFriend {
                    owner,
                    friend: *friend,
                }
            })?;
            Character::from_document(document)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(characters))
}

/// A humanoid creature in the Star Wars universe.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Human {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub name: String,
    #[serde(default)]
    pub friends: Vec<DocumentId>,
    #[serde(default)]
    pub appears_in: Vec<Episode>,
    #[serde(default)]
    pub home_planet: Option<String>,
}

/// A humanoid creature in the Star Wars universe.
#[Object]
impl Human {
    /// The id of the human.
    async fn id(&self) -> String {
        self.id.encode()
    }

    /// The name of the human.
    async fn name(&self) -> Option<String> {
        Some(self.name.clone())
    }

    /// The friends of the human, or an empty list if they have none.
    async fn friends(&self, ctx: &Context<'_>) -> Option<Vec<Character>> {
        null_on_error(ctx, resolve_friends(ctx, self.id, &self.friends).await)
    }

    /// Which movies they appear in.
    async fn appears_in(&self) -> Vec<Episode> {
        self.appears_in.clone()
    }

    /// The home planet of the human, or null if unknown.
    async fn home_planet(&self) -> Option<String> {
        self.home_planet.clone()
    }

    /// Where are they from and how they came to be who they are.
    async fn secret_backstory(&self, ctx: &Context<'_>) -> Option<String> {
        null_on_error(ctx, Err(Error::SecretBackstory.into()))
    }
}

/// A mechanical creature in the Star Wars universe.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Droid {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub name: String,
    #[serde(default)]
    pub friends: Vec<DocumentId>,
    #[serde(default)]
    pub appears_in: Vec<Episode>,
    pub primary_function: String,
}

/// A mechanical creature in the Star Wars universe.
#[Object]
impl Droid {
    /// The id of the droid.
    async fn id(&self) -> String {
        self.id.encode()
    }

    /// The name of the droid.
    async fn name(&self) -> Option<String> {
        Some(self.name.clone())
    }

    /// The friends of the droid, or an empty list if they have none.
    async fn friends(&self, ctx: &Context<'_>) -> Option<Vec<Character>> {
        null_on_error(ctx, resolve_friends(ctx, self.id, &self.friends).await)
    }

    /// Which movies they appear in.
    async fn appears_in(&self) -> Vec<Episode> {
        self.appears_in.clone()
    }

    /// Construction date and the name of the designer.
    async fn secret_backstory(&self, ctx: &Context<'_>) -> Option<String> {
        null_on_error(ctx, Err(Error::SecretBackstory.into()))
    }

    /// The primary function of the droid.
    async fn primary_function(&self) -> Option<String> {
        Some(self.primary_function.clone())
    }
}

/// A character in the Star Wars Trilogy
#[derive(Interface, Debug, Clone, PartialEq)]
#[graphql(
    field(name = "id", ty = "String", desc = "The id of the character."),
    field(name = "name", ty = "Option<String>", desc = "The name of the character."),
    field(
        name = "friends",
        ty = "Option<Vec<Character>>",
        desc = "The friends of the character, or an empty list if they have none."
    ),
    field(name = "appears_in", ty = "Vec<Episode>", desc = "Which movies they appear in."),
    field(
        name = "secret_backstory",
        ty = "Option<String>",
        desc = "All secrets about their past."
    )
)]
pub enum Character {
    Human(Human),
    Droid(Droid),
}

impl Character {
    /// Decode a stored document into the variant its discriminant names
    pub fn from_document(document: &Document) -> Result<Self> {
        match Variant::of(document)? {
            Variant::Human => decode(document).map(Character::Human),
            Variant::Droid => decode(document).map(Character::Droid),
        }
    }

    pub fn variant(&self) -> Variant {
        match self {
            Character::Human(_) => Variant::Human,
            Character::Droid(_) => Variant::Droid,
        }
    }

    pub fn character_name(&self) -> &str {
        match self {
            Character::Human(human) => &human.name,
            Character::Droid(droid) => &droid.name,
        }
    }

    pub fn into_human(self) -> Option<Human> {
        match self {
            Character::Human(human) => Some(human),
            Character::Droid(_) => None,
        }
    }

    pub fn into_droid(self) -> Option<Droid> {
        match self {
            Character::Droid(droid) => Some(droid),
            Character::Human(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn document(table: Variant, value: Value) -> Document {
        match value {
            Value::Object(fields) => Document::new(DocumentId::new(table), fields),
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_variant_follows_discriminant() {
        let human = document(Variant::Human, json!({ "type": "Human" }));
        let droid = document(Variant::Droid, json!({ "type": "Droid" }));
        assert_eq!(Variant::of(&human).unwrap(), Variant::Human);
        assert_eq!(Variant::of(&droid).unwrap(), Variant::Droid);
    }

    #[test]
    fn test_unknown_discriminant_is_integrity_error() {
        let wookiee = document(Variant::Human, json!({ "type": "Wookiee" }));
        assert!(matches!(
            Variant::of(&wookiee),
            Err(Error::UnknownVariant(tag)) if tag == "Wookiee"
        ));

        let untyped = document(Variant::Human, json!({ "name": "Chewbacca" }));
        assert!(matches!(Variant::of(&untyped), Err(Error::UnknownVariant(_))));
    }

    #[test]
    fn test_decode_human() {
        let friend = DocumentId::new(Variant::Droid);
        let doc = document(
            Variant::Human,
            json!({
                "type": "Human",
                "name": "Leia Organa",
                "friends": [friend],
                "appearsIn": [4, 5, 6],
                "homePlanet": "Alderaan",
            }),
        );

        let character = Character::from_document(&doc).unwrap();
        assert_eq!(character.variant(), Variant::Human);
        assert_eq!(character.character_name(), "Leia Organa");

        let human = character.into_human().unwrap();
        assert_eq!(human.id, doc.id());
        assert_eq!(human.friends, vec![friend]);
        assert_eq!(human.appears_in, Episode::ALL.to_vec());
        assert_eq!(human.home_planet.as_deref(), Some("Alderaan"));
    }

    #[test]
    fn test_decode_droid_without_optional_fields() {
        let doc = document(
            Variant::Droid,
            json!({ "type": "Droid", "name": "C-3PO", "primaryFunction": "Protocol" }),
        );

        let droid = Character::from_document(&doc).unwrap().into_droid().unwrap();
        assert_eq!(droid.primary_function, "Protocol");
        assert!(droid.friends.is_empty());
        assert!(droid.appears_in.is_empty());
    }

    #[test]
    fn test_malformed_payload() {
        let doc = document(Variant::Droid, json!({ "type": "Droid", "name": "R5-D4" }));
        assert!(matches!(
            Character::from_document(&doc),
            Err(Error::MalformedDocument { id, .. }) if id == doc.id()
        ));

        let doc = document(
            Variant::Human,
            json!({ "type": "Human", "name": "Biggs", "appearsIn": [1] }),
        );
        assert!(Character::from_document(&doc).is_err());
    }
}
