use super::{Content, ContentStore, PublishMode, PublishResult, Result, Scope};
use async_trait::async_trait;
use sled::{Batch, Db, Tree};
use std::{
    collections::{BTreeMap, HashSet, VecDeque},
    path::Path,
};
use tokio::fs;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// A content store persisted with sled
#[derive(Clone, Debug)]
pub struct SledStore {
    tree: Tree,
}

impl SledStore {
    /// Open or create the content database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<SledStore> {
        let db = sled::open(path)?;
        SledStore::from_db(&db)
    }

    /// Use the content tree of an already opened database
    pub fn from_db(db: &Db) -> Result<SledStore> {
        let tree = db.open_tree("content")?;
        Ok(SledStore { tree })
    }

    /// Add content items that do not exist yet. Existing items are left alone.
    pub fn import(&self, items: &[Content]) -> Result<usize> {
        let mut imported = 0;
        for item in items {
            if self.tree.contains_key(item.key.as_bytes())? {
                debug!(key = %item.key, "content already exists, skipping");
                continue;
            }

            self.tree.insert(item.key.as_bytes(), encode(item)?)?;
            imported += 1;
        }

        Ok(imported)
    }

    /// Import the content items listed in a JSON file
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub async fn import_file<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let raw = fs::read(path).await?;
        let items: Vec<Content> = serde_json::from_slice(&raw)?;

        let imported = self.import(&items)?;
        self.tree.flush_async().await?;

        info!(imported, total = items.len(), "seeded content");
        Ok(imported)
    }
}

#[async_trait]
impl ContentStore for SledStore {
    async fn find(&self, key: Uuid) -> Result<Option<Content>> {
        get(&self.tree, key)
    }

    async fn scope(&self) -> Result<Box<dyn Scope>> {
        Ok(Box::new(SledScope {
            tree: self.tree.clone(),
            pending: BTreeMap::new(),
        }))
    }
}

/// Buffers writes until completed, at which point they are applied as a single batch
struct SledScope {
    tree: Tree,
    pending: BTreeMap<Uuid, Content>,
}

impl SledScope {
    /// Load an item, preferring any uncommitted version
    fn load(&self, key: Uuid) -> Result<Option<Content>> {
        match self.pending.get(&key) {
            Some(content) => Ok(Some(content.clone())),
            None => get(&self.tree, key),
        }
    }

    /// Find the direct children of an item
    fn children(&self, key: Uuid) -> Result<Vec<Content>> {
        let mut children = Vec::new();
        for entry in self.tree.iter() {
            let (_, raw) = entry?;
            let stored: Content = serde_json::from_slice(&raw)?;
            let item = self.pending.get(&stored.key).cloned().unwrap_or(stored);
            if item.parent == Some(key) {
                children.push(item);
            }
        }

        Ok(children)
    }

    /// Publish every descendant of an item that can be published
    fn publish_descendants(&mut self, root: Uuid) -> Result<usize> {
        let mut published = 0;
        let mut visited = HashSet::from([root]);
        let mut queue = VecDeque::from(self.children(root)?);

        while let Some(mut item) = queue.pop_front() {
            if !visited.insert(item.key) {
                continue;
            }

            let cultures = item.publishable_cultures();
            let status = item.check_publish(&cultures);
            if !status.is_success() {
                warn!(key = %item.key, %status, "skipping descendant");
                continue;
            }

            item.publish(&cultures);
            queue.extend(self.children(item.key)?);
            self.pending.insert(item.key, item);
            published += 1;
        }

        Ok(published)
    }
}

#[async_trait]
impl Scope for SledScope {
    async fn save(&mut self, content: &Content) -> Result<()> {
        self.pending.insert(content.key, content.clone());
        Ok(())
    }

    #[instrument(skip(self, content), fields(key = %content.key))]
    async fn publish(
        &mut self,
        content: &Content,
        cultures: &[String],
        mode: PublishMode,
    ) -> Result<PublishResult> {
        let mut item = self.load(content.key)?.unwrap_or_else(|| content.clone());

        let status = item.check_publish(cultures);
        if !status.is_success() {
            return Ok(PublishResult {
                status,
                descendants: 0,
            });
        }

        item.publish(cultures);
        self.pending.insert(item.key, item);

        let descendants = match mode {
            #[cfg(test)]
            PublishMode::Single => 0,
            PublishMode::AllLevels => self.publish_descendants(content.key)?,
        };
        debug!(descendants, "published content");

        Ok(PublishResult {
            status,
            descendants,
        })
    }

    async fn complete(self: Box<Self>) -> Result<()> {
        let mut this = self;
        let pending = std::mem::take(&mut this.pending);

        let mut batch = Batch::default();
        for (key, content) in &pending {
            batch.insert(&key.as_bytes()[..], encode(content)?);
        }
        this.tree.apply_batch(batch)?;
        this.tree.flush_async().await?;

        debug!(writes = pending.len(), "completed scope");
        Ok(())
    }
}

impl Drop for SledScope {
    fn drop(&mut self) {
        if !self.pending.is_empty() {
            debug!(
                writes = self.pending.len(),
                "scope dropped without completing, discarding writes"
            );
        }
    }
}

fn get(tree: &Tree, key: Uuid) -> Result<Option<Content>> {
    match tree.get(key.as_bytes())? {
        Some(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
        None => Ok(None),
    }
}

fn encode(content: &Content) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(content)?)
}
