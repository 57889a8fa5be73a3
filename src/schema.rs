//! Root query and the process-wide schema

use std::sync::LazyLock;

use async_graphql::{Context, EmptyMutation, EmptySubscription, Object, Schema};
use serde_json::Value;
use tracing::debug;

use crate::dataloaders::DocumentLoader;
use crate::id::DocumentId;
use crate::model::{null_on_error, Character, Droid, Human, Variant};
use crate::store::SharedStore;
use crate::types::Episode;

/// The full GraphQL schema type
pub type StarWarsSchema = Schema<QueryRoot, EmptyMutation, EmptySubscription>;

static SCHEMA: LazyLock<StarWarsSchema> =
    LazyLock::new(|| Schema::build(QueryRoot, EmptyMutation, EmptySubscription).finish());

/// Schema shared by every request, built on first use
///
/// The schema carries no data of its own: the store and a fresh loader are
/// attached to each request by [`crate::handler::execute`].
pub fn schema() -> &'static StarWarsSchema {
    &SCHEMA
}

/// Schema in SDL form
pub fn sdl() -> String {
    schema().sdl()
}

/// Which character is the hero of `episode`
///
/// Luke is the hero of Episode V. Artoo is the hero otherwise.
pub fn hero_of(episode: Option<Episode>) -> (Variant, &'static str) {
    match episode {
        Some(Episode::Empire) => (Variant::Human, "Luke Skywalker"),
        _ => (Variant::Droid, "R2-D2"),
    }
}

/// Load the document behind `id` if it belongs to `table`
async fn load_in(
    ctx: &Context<'_>,
    id: &str,
    table: Variant,
) -> async_graphql::Result<Option<Character>> {
    let Some(id) = DocumentId::decode_in(id, table) else {
        debug!(id, %table, "id does not name a document in table");
        return Ok(None);
    };

    let loader = ctx.data::<DocumentLoader>()?;
    match loader.load(id).await? {
        Some(document) => Ok(Some(Character::from_document(&document)?)),
        None => Ok(None),
    }
}

/// Find the hero of `episode` and prime the loader with it
async fn find_hero(
    ctx: &Context<'_>,
    episode: Option<Episode>,
) -> async_graphql::Result<Option<Character>> {
    let (table, name) = hero_of(episode);
    debug!(?episode, %table, name, "resolving hero");

    let store = ctx.data::<SharedStore>()?;
    let Some(document) = store.find_unique(table, "name", &Value::from(name)).await? else {
        return Ok(None);
    };

    let character = Character::from_document(&document)?;
    ctx.data::<DocumentLoader>()?
        .prime(document.id(), document)
        .await;
    Ok(Some(character))
}

/// Root of every query
///
/// Fetches characters by id, or the undisputed hero of the trilogy directly.
pub struct QueryRoot;

#[Object(name = "Query")]
impl QueryRoot {
    async fn hero(
        &self,
        ctx: &Context<'_>,
        #[graphql(
            desc = "If omitted, returns the hero of the whole saga. If provided, returns the hero of that particular episode."
        )]
        episode: Option<Episode>,
    ) -> Option<Character> {
        null_on_error(ctx, find_hero(ctx, episode).await)
    }

    async fn human(
        &self,
        ctx: &Context<'_>,
        #[graphql(desc = "id of the human")] id: String,
    ) -> Option<Human> {
        let found = load_in(ctx, &id, Variant::Human).await;
        null_on_error(ctx, found).and_then(Character::into_human)
    }

    async fn droid(
        &self,
        ctx: &Context<'_>,
        #[graphql(desc = "id of the droid")] id: String,
    ) -> Option<Droid> {
        let found = load_in(ctx, &id, Variant::Droid).await;
        null_on_error(ctx, found).and_then(Character::into_droid)
    }
}
