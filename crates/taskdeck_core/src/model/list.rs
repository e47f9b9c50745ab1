//! Task list identity and naming rules.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a list.
///
/// Slug-derived with a random suffix; immutable once created and used as
/// the bucket key for the list's task and archive sequences.
pub type ListId = String;

/// Maximum characters allowed in a list name.
pub const MAX_LIST_NAME_CHARS: usize = 25;

static SLUG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid slug regex"));

/// Named container for active and archived tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct List {
    pub id: ListId,
    /// Display name, unique among active lists (case-sensitive).
    pub name: String,
}

impl List {
    /// Creates a list with a freshly generated id.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: generate_list_id(&name),
            name,
        }
    }
}

/// Derives a readable stable id from a list name.
///
/// Lowercased slug plus a random suffix, so a deleted and recreated list of
/// the same name never collides with undo payloads of the old one.
pub fn generate_list_id(name: &str) -> ListId {
    let lowered = name.trim().to_lowercase();
    let slug = SLUG_RE.replace_all(&lowered, "-");
    let slug = slug.trim_matches('-');
    let uuid = Uuid::new_v4().simple().to_string();
    let suffix = &uuid[..8];
    if slug.is_empty() {
        format!("list-{suffix}")
    } else {
        format!("{slug}-{suffix}")
    }
}

#[cfg(test)]
mod tests {
    use super::generate_list_id;

    #[test]
    fn list_id_is_a_slug_with_suffix() {
        let id = generate_list_id("  Weekly Groceries! ");
        assert!(id.starts_with("weekly-groceries-"));
        assert_eq!(id.len(), "weekly-groceries-".len() + 8);
    }

    #[test]
    fn same_name_generates_distinct_ids() {
        assert_ne!(generate_list_id("Work"), generate_list_id("Work"));
    }

    #[test]
    fn symbol_only_name_falls_back_to_generic_prefix() {
        let id = generate_list_id("!!!");
        assert!(id.starts_with("list-"));
    }
}
