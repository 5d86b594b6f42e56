//! Suggestion translator
//!
//! Turns the external engine's ranked suggestions into wire responses.
//!
//! All offsets and lengths count characters, matching how the client
//! indexes its input line.

use crate::protocol::{ChatPreviewAck, ChatSuggestions, CommandSuggestionsResponse};
use crate::source::Suggestion;

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn char_tail(text: &str, skip: usize) -> String {
    text.chars().skip(skip).collect()
}

impl Suggestion {
    /// What the candidate adds beyond the input it already matches
    pub fn continuation(&self) -> String {
        char_tail(&self.command, char_len(&self.existed_input))
    }
}

/// Build a tab completion response
///
/// All candidates share one replacement window starting at the shortest
/// matched prefix: the client replaces `length` characters at `start` with
/// each candidate's tail. `prefix_adjustment` is 1 when the client typed a
/// leading `/` that was stripped from `text`.
pub fn tab_completion(
    transaction_id: i32,
    text: &str,
    prefix_adjustment: usize,
    suggestions: &[Suggestion],
) -> CommandSuggestionsResponse {
    let text_len = char_len(text);
    let min_existed = suggestions
        .iter()
        .map(|s| char_len(&s.existed_input))
        .min()
        .unwrap_or(text_len);

    CommandSuggestionsResponse {
        transaction_id,
        start: prefix_adjustment + min_existed,
        length: text_len.saturating_sub(min_existed),
        matches: suggestions
            .iter()
            .map(|s| char_tail(&s.command, min_existed))
            .collect(),
    }
}

/// The two packets answering a chat preview query, in send order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewReply {
    /// Must reach the client first or it keeps waiting on the query
    pub ack: ChatPreviewAck,
    pub suggestions: ChatSuggestions,
}

/// Build the chat preview reply
///
/// `suggestions` is `None` when the text is not for the external engine;
/// the client then gets an empty completion set.
pub fn chat_preview(query_id: i32, suggestions: Option<&[Suggestion]>) -> PreviewReply {
    let entries = suggestions
        .unwrap_or_default()
        .iter()
        .map(Suggestion::continuation)
        .collect();

    PreviewReply {
        ack: ChatPreviewAck::unformatted(query_id),
        suggestions: ChatSuggestions::set(entries),
    }
}
