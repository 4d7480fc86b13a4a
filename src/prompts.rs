//! Prompt templates for the AI endpoints.

use serde::Deserialize;

use crate::llm::{ChatMessage, CompletionRequest};

/// Transcript and input text are cut to this many characters before prompting
pub const MAX_PROMPT_CHARS: usize = 5000;

pub const DEFAULT_MAX_TOKENS: u32 = 1024;

const ASK_SYSTEM_PROMPT: &str = "You are a helpful assistant that answers questions about a video. \
Base your answers on the transcript below. If the transcript does not contain the answer, say so.";

const SUMMARY_SYSTEM_PROMPT: &str = "You are a helpful assistant that summarizes video transcripts. \
Provide a clear, concise summary that captures the key points and main arguments.";

const EXPAND_SYSTEM_PROMPT: &str = "You are a helpful assistant that extends summaries of video transcripts. \
Reply only with the new sentences, without repeating the existing summary.";

/// One earlier turn of a conversation, as sent by the client
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryEntry {
    pub role: String,
    pub content: String,
}

impl HistoryEntry {
    /// "user" stays the user; any other role is treated as the assistant
    fn to_message(&self) -> ChatMessage {
        if self.role == "user" {
            ChatMessage::user(&self.content)
        } else {
            ChatMessage::assistant(&self.content)
        }
    }
}

/// First `max_chars` characters of `text`, cut on a char boundary
pub fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub fn ask(question: &str, transcript: &str, history: &[HistoryEntry], max_tokens: u32) -> CompletionRequest {
    let system = format!(
        "{ASK_SYSTEM_PROMPT}\n\nTranscript:\n{}",
        truncate(transcript, MAX_PROMPT_CHARS)
    );

    let mut messages: Vec<ChatMessage> = history.iter().map(HistoryEntry::to_message).collect();
    messages.push(ChatMessage::user(question));

    CompletionRequest {
        system,
        messages,
        max_tokens,
    }
}

pub fn summarize(text: &str, max_tokens: u32) -> CompletionRequest {
    CompletionRequest {
        system: SUMMARY_SYSTEM_PROMPT.to_string(),
        messages: vec![ChatMessage::user(format!(
            "Please summarize the following transcript:\n\n{}",
            truncate(text, MAX_PROMPT_CHARS)
        ))],
        max_tokens,
    }
}

pub fn expand(text: &str, current_summary: &str, max_tokens: u32) -> CompletionRequest {
    CompletionRequest {
        system: EXPAND_SYSTEM_PROMPT.to_string(),
        messages: vec![ChatMessage::user(format!(
            "Transcript:\n{}\n\nCurrent summary:\n{current_summary}\n\n\
             Write 2 more sentences that continue this summary with details it does not cover yet.",
            truncate(text, MAX_PROMPT_CHARS)
        ))],
        max_tokens,
    }
}

/// The expanded summary: the current one followed by the new sentences
pub fn append_sentences(current_summary: &str, addition: &str) -> String {
    let current = current_summary.trim_end();
    let addition = addition.trim();
    match (current.is_empty(), addition.is_empty()) {
        (true, _) => addition.to_string(),
        (_, true) => current.to_string(),
        _ => format!("{current} {addition}"),
    }
}
