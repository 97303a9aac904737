use serde::{Deserialize, Serialize};

/// A post attributed to an author name.
///
/// The author is an opaque string. It usually names a registered user, but
/// nothing ties the post to that user: deleting the user leaves the post in
/// place.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Post {
    pub author: String,
    pub content: String,
}

impl Post {
    pub fn new(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            content: content.into(),
        }
    }

    /// Exact, case-sensitive author match.
    pub fn is_by(&self, author: &str) -> bool {
        self.author == author
    }
}
