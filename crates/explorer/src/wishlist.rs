//! Wishlist of saved titles, split into an anime and a manga partition.
//!
//! Partitions are loaded once when the store is opened and written back in
//! full after every mutation. Membership by bare id spans both partitions;
//! the `*_key` variants match on `(kind, id)` instead.

use crate::storage::SlotStore;
use anyhow::Result;
use shared::config::WishlistConfig;
use shared::{MediaItem, MediaKey, MediaKind};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Storage slot names of the two partitions
#[derive(Debug, Clone)]
pub struct WishlistSlots {
    pub anime: String,
    pub manga: String,
}

impl Default for WishlistSlots {
    fn default() -> Self {
        Self::from(&WishlistConfig::default())
    }
}

impl From<&WishlistConfig> for WishlistSlots {
    fn from(config: &WishlistConfig) -> Self {
        Self {
            anime: config.anime_slot.clone(),
            manga: config.manga_slot.clone(),
        }
    }
}

impl WishlistSlots {
    fn for_kind(&self, kind: MediaKind) -> &str {
        match kind {
            MediaKind::Anime => &self.anime,
            MediaKind::Manga => &self.manga,
        }
    }
}

/// The user's saved titles
#[derive(Debug)]
pub struct Wishlist {
    store: SlotStore,
    slots: WishlistSlots,
    anime: Vec<MediaItem>,
    manga: Vec<MediaItem>,
}

impl Wishlist {
    /// Load both partitions from `store`.
    ///
    /// A missing or unreadable partition starts out empty.
    pub fn load(store: SlotStore, slots: WishlistSlots) -> Self {
        let anime = load_partition(&store, &slots.anime);
        let manga = load_partition(&store, &slots.manga);

        info!(anime = anime.len(), manga = manga.len(), "Wishlist loaded");

        Self {
            store,
            slots,
            anime,
            manga,
        }
    }

    /// Save `item` unless its id is already present in either partition.
    ///
    /// Returns whether the item was added.
    pub fn add(&mut self, item: MediaItem) -> Result<bool> {
        if self.contains(item.mal_id) {
            debug!(mal_id = item.mal_id, "Already in wishlist");
            return Ok(false);
        }

        let kind = item.kind();
        info!(kind = %kind, mal_id = item.mal_id, title = %item.title, "Adding to wishlist");

        let mut items = self.partition(kind).to_vec();
        items.push(item);
        self.commit(kind, items)?;

        Ok(true)
    }

    /// Remove `id` from both partitions. Returns whether anything was removed.
    ///
    /// Both partitions are attempted even if one fails to save; the first
    /// failure is returned.
    pub fn remove(&mut self, id: u32) -> Result<bool> {
        let mut removed = false;
        let mut failure = None;
        for kind in MediaKind::ALL {
            match self.remove_from(kind, id) {
                Ok(r) => removed |= r,
                Err(e) => {
                    failure.get_or_insert(e);
                }
            }
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(removed),
        }
    }

    /// Remove exactly the entry identified by `key`
    pub fn remove_key(&mut self, key: MediaKey) -> Result<bool> {
        self.remove_from(key.kind, key.id)
    }

    /// Whether `id` is saved in either partition
    pub fn contains(&self, id: u32) -> bool {
        self.anime.iter().chain(&self.manga).any(|item| item.mal_id == id)
    }

    pub fn contains_key(&self, key: MediaKey) -> bool {
        self.partition(key.kind).iter().any(|item| item.mal_id == key.id)
    }

    pub fn get(&self, key: MediaKey) -> Option<&MediaItem> {
        self.partition(key.kind).iter().find(|item| item.mal_id == key.id)
    }

    /// Empty one partition
    pub fn clear_partition(&mut self, kind: MediaKind) -> Result<()> {
        let count = self.partition(kind).len();
        self.commit(kind, Vec::new())?;
        info!(kind = %kind, removed = count, "Wishlist partition cleared");
        Ok(())
    }

    /// Empty both partitions, attempting each even if the other fails to save
    pub fn clear_all(&mut self) -> Result<()> {
        let mut failure = None;
        for kind in MediaKind::ALL {
            if let Err(e) = self.clear_partition(kind) {
                failure.get_or_insert(e);
            }
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn partition(&self, kind: MediaKind) -> &[MediaItem] {
        match kind {
            MediaKind::Anime => &self.anime,
            MediaKind::Manga => &self.manga,
        }
    }

    /// All saved items, anime first
    pub fn iter(&self) -> impl Iterator<Item = &MediaItem> {
        self.anime.iter().chain(&self.manga)
    }

    pub fn len(&self) -> usize {
        self.anime.len() + self.manga.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn partition_mut(&mut self, kind: MediaKind) -> &mut Vec<MediaItem> {
        match kind {
            MediaKind::Anime => &mut self.anime,
            MediaKind::Manga => &mut self.manga,
        }
    }

    fn remove_from(&mut self, kind: MediaKind, id: u32) -> Result<bool> {
        let partition = self.partition(kind);
        let items: Vec<MediaItem> = partition
            .iter()
            .filter(|item| item.mal_id != id)
            .cloned()
            .collect();

        if items.len() == partition.len() {
            return Ok(false);
        }

        self.commit(kind, items)?;
        info!(kind = %kind, mal_id = id, "Removed from wishlist");
        Ok(true)
    }

    /// Write `items` to the partition's slot, then adopt them in memory.
    ///
    /// On a failed write the partition keeps its previous content.
    fn commit(&mut self, kind: MediaKind, items: Vec<MediaItem>) -> Result<()> {
        if let Err(e) = self.store.set(self.slots.for_kind(kind), &items) {
            warn!(kind = %kind, error = %e, "Failed to save wishlist partition");
            return Err(e);
        }

        *self.partition_mut(kind) = items;
        Ok(())
    }
}

fn load_partition(store: &SlotStore, slot: &str) -> Vec<MediaItem> {
    let items: Vec<MediaItem> = match store.get(slot) {
        Ok(Some(items)) => items,
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!(slot = slot, error = %e, "Discarding unreadable wishlist partition");
            Vec::new()
        }
    };

    let mut seen = HashSet::new();
    let before = items.len();
    let items: Vec<MediaItem> = items
        .into_iter()
        .filter(|item| seen.insert(item.mal_id))
        .collect();

    if items.len() != before {
        warn!(slot = slot, dropped = before - items.len(), "Dropped duplicate wishlist entries");
    }

    items
}
