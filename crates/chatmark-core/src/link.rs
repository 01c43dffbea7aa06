//! Link destination classification.
//!
//! Summaries generated by the chat client end with a link back to the
//! conversation they were produced from, written as
//! `[label](conversation://<id>)`. Renderers open those in-app and hand
//! every other destination to the platform.

/// URL scheme for links that point at another conversation.
pub const CONVERSATION_SCHEME: &str = "conversation://";

/// Destination of a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkTarget<'a> {
    /// `conversation://<id>`, carrying the id.
    Conversation(&'a str),
    /// Any other destination, verbatim.
    External(&'a str),
}

impl<'a> LinkTarget<'a> {
    /// Classify a link URL. A `conversation://` URL with no id is external.
    pub fn classify(url: &'a str) -> Self {
        match url.strip_prefix(CONVERSATION_SCHEME) {
            Some(id) if !id.trim().is_empty() => LinkTarget::Conversation(id.trim()),
            _ => LinkTarget::External(url),
        }
    }

    pub fn is_conversation(&self) -> bool {
        matches!(self, LinkTarget::Conversation(_))
    }
}
