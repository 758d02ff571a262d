use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter},
};
use uuid::Uuid;

mod error;
mod store;

pub use error::Error;
pub(crate) use error::Result;
pub use store::SledStore;

#[cfg(test)]
pub(crate) use store::tests::{item, temporary_store};

/// Access to the content items of the site
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Find a content item by its key
    async fn find(&self, key: Uuid) -> Result<Option<Content>>;

    /// Open a unit of work. Nothing written through the scope is persisted
    /// until [`Scope::complete`] is called.
    async fn scope(&self) -> Result<Box<dyn Scope>>;
}

/// A unit of work against the content store
#[async_trait]
pub trait Scope: Send {
    /// Save the current values of an item
    async fn save(&mut self, content: &Content) -> Result<()>;

    /// Publish the saved state of an item for the given cultures
    async fn publish(
        &mut self,
        content: &Content,
        cultures: &[String],
        mode: PublishMode,
    ) -> Result<PublishResult>;

    /// Commit every write made in the scope
    async fn complete(self: Box<Self>) -> Result<()>;
}

/// A node in the content tree
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Content {
    pub key: Uuid,
    pub name: String,
    #[serde(default)]
    pub parent: Option<Uuid>,
    pub content_type: ContentType,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    /// The cultures the item currently has values for
    #[serde(default)]
    pub cultures: Vec<String>,
    #[serde(default)]
    pub trashed: bool,
    #[serde(default)]
    pub published: Option<Published>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ContentType {
    pub alias: String,
    #[serde(default)]
    pub varies_by_culture: bool,
}

/// A snapshot of the values that are currently live
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Published {
    pub properties: BTreeMap<String, String>,
    pub cultures: Vec<String>,
    pub revision: u64,
}

impl Content {
    /// Get the value of a property
    pub fn value(&self, alias: &str) -> Option<&str> {
        self.properties.get(alias).map(String::as_str)
    }

    /// Set the value of a property, replacing any previous value
    pub fn set_value<V: Into<String>>(&mut self, alias: &str, value: V) {
        self.properties.insert(alias.to_owned(), value.into());
    }

    /// The cultures that should be published for this item. Invariant types publish
    /// without any culture.
    pub fn publishable_cultures(&self) -> Vec<String> {
        if self.content_type.varies_by_culture {
            self.cultures.clone()
        } else {
            Vec::new()
        }
    }

    /// Check whether the item can be published for the given cultures
    pub fn check_publish(&self, cultures: &[String]) -> PublishStatus {
        if self.trashed {
            return PublishStatus::Trashed;
        }

        if self.content_type.varies_by_culture {
            if cultures.is_empty() {
                return PublishStatus::CultureRequired;
            }
            if let Some(missing) = cultures.iter().find(|c| !self.cultures.contains(c)) {
                return PublishStatus::InvalidCulture(missing.clone());
            }
        } else if let Some(culture) = cultures.first() {
            return PublishStatus::InvalidCulture(culture.clone());
        }

        PublishStatus::Success
    }

    /// Snapshot the current values as the published state
    pub(crate) fn publish(&mut self, cultures: &[String]) {
        let revision = self.published.as_ref().map_or(0, |p| p.revision) + 1;
        self.published = Some(Published {
            properties: self.properties.clone(),
            cultures: cultures.to_vec(),
            revision,
        });
    }
}

/// How far down the tree a publish should reach
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PublishMode {
    /// Only the requested item
    #[cfg(test)]
    Single,
    /// The requested item and all of its descendants
    AllLevels,
}

/// The outcome of a publish request
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PublishResult {
    pub status: PublishStatus,
    /// How many descendants were published along with the item
    pub descendants: usize,
}

impl PublishResult {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PublishStatus {
    Success,
    Trashed,
    CultureRequired,
    InvalidCulture(String),
}

impl PublishStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl Display for PublishStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Trashed => write!(f, "item is in the recycle bin"),
            Self::CultureRequired => write!(f, "item varies by culture but no cultures were given"),
            Self::InvalidCulture(c) => write!(f, "culture \"{}\" is not available", c),
        }
    }
}
