//! Visitor guestbook kept in local storage: comments with likes and
//! one level of replies. Newest comments come first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::config::ArcadeConfig;
use crate::rankings::{SystemClock, WallClock};
use crate::storage::{AnyStorage, KeyValueStore, StorageError};

const ANONYMOUS: &str = "Anonymous";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub id: i64,
    pub author: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub author: String,
    pub text: String,
    pub likes: u32,
    pub liked: bool,
    #[serde(default)]
    pub replies: Vec<Reply>,
    pub timestamp: DateTime<Utc>,
}

pub struct Guestbook<S, C = SystemClock> {
    storage: S,
    clock: C,
    key: String,
    last_id: i64,
}

impl<S: KeyValueStore> Guestbook<S, SystemClock> {
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        Self::with_clock(storage, SystemClock, key)
    }
}

impl<S: KeyValueStore, C: WallClock> Guestbook<S, C> {
    pub fn with_clock(storage: S, clock: C, key: impl Into<String>) -> Self {
        Self {
            storage,
            clock,
            key: key.into(),
            last_id: 0,
        }
    }

    pub fn load(&self) -> Vec<Comment> {
        let read = || -> Result<Vec<Comment>, StorageError> {
            match self.storage.get(&self.key)? {
                Some(raw) => Ok(serde_json::from_str(&raw)?),
                None => Ok(Vec::new()),
            }
        };
        read().unwrap_or_else(|err| {
            log::warn!("guestbook unreadable, treating as empty: {err}");
            Vec::new()
        })
    }

    /// Returns `None` for a blank message.
    pub fn add_comment(&mut self, author: &str, text: &str) -> Option<Comment> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let mut comments = self.load();
        let timestamp = self.clock.now();
        let comment = Comment {
            id: self.next_id(timestamp, &comments),
            author: author_or_anonymous(author),
            text: text.to_string(),
            likes: 0,
            liked: false,
            replies: Vec::new(),
            timestamp,
        };
        comments.insert(0, comment.clone());
        self.save(&comments);
        Some(comment)
    }

    /// Flip this visitor's like. Returns the new like count.
    pub fn toggle_like(&mut self, id: i64) -> Option<u32> {
        let mut comments = self.load();
        let comment = comments.iter_mut().find(|c| c.id == id)?;
        comment.liked = !comment.liked;
        comment.likes = if comment.liked {
            comment.likes.saturating_add(1)
        } else {
            comment.likes.saturating_sub(1)
        };
        let likes = comment.likes;
        self.save(&comments);
        Some(likes)
    }

    pub fn add_reply(&mut self, comment_id: i64, author: &str, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        let mut comments = self.load();
        let Some(pos) = comments.iter().position(|c| c.id == comment_id) else {
            return false;
        };
        let timestamp = self.clock.now();
        let reply = Reply {
            id: self.next_id(timestamp, &comments),
            author: author_or_anonymous(author),
            text: text.to_string(),
            timestamp,
        };
        comments[pos].replies.push(reply);
        self.save(&comments);
        true
    }

    pub fn remove_comment(&mut self, id: i64) -> bool {
        let mut comments = self.load();
        let before = comments.len();
        comments.retain(|c| c.id != id);
        if comments.len() == before {
            return false;
        }
        self.save(&comments);
        true
    }

    // Millisecond timestamps collide when two posts land in the same ms, and
    // each page call builds a fresh book, so stored ids count too.
    fn next_id(&mut self, at: DateTime<Utc>, stored: &[Comment]) -> i64 {
        let stored_max = stored
            .iter()
            .flat_map(|c| std::iter::once(c.id).chain(c.replies.iter().map(|r| r.id)))
            .max()
            .unwrap_or(0);
        let id = at.timestamp_millis().max(self.last_id.max(stored_max) + 1);
        self.last_id = id;
        id
    }

    fn save(&mut self, comments: &[Comment]) {
        let result = serde_json::to_string(comments)
            .map_err(StorageError::from)
            .and_then(|json| self.storage.set(&self.key, &json));
        if let Err(err) = result {
            log::warn!("could not save guestbook: {err}");
        }
    }
}

fn author_or_anonymous(author: &str) -> String {
    let author = author.trim();
    if author.is_empty() {
        ANONYMOUS.to_string()
    } else {
        author.to_string()
    }
}

// --- Page bindings ----------------------------------------------------------
// Ids cross into JS as plain numbers; millisecond timestamps fit in an f64.

fn browser_guestbook() -> Guestbook<AnyStorage> {
    Guestbook::new(
        AnyStorage::browser_or_memory(),
        ArcadeConfig::default().guestbook_key,
    )
}

#[wasm_bindgen]
pub fn guestbook_comments_json() -> Result<String, JsValue> {
    serde_json::to_string(&browser_guestbook().load()).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[wasm_bindgen]
pub fn guestbook_add_comment(author: &str, text: &str) -> bool {
    browser_guestbook().add_comment(author, text).is_some()
}

#[wasm_bindgen]
pub fn guestbook_toggle_like(id: f64) -> Option<u32> {
    browser_guestbook().toggle_like(id as i64)
}

#[wasm_bindgen]
pub fn guestbook_add_reply(id: f64, author: &str, text: &str) -> bool {
    browser_guestbook().add_reply(id as i64, author, text)
}

#[wasm_bindgen]
pub fn guestbook_remove_comment(id: f64) -> bool {
    browser_guestbook().remove_comment(id as i64)
}
