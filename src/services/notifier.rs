// src/services/notifier.rs

//! Notification transports.
//!
//! Messages use Telegram's HTML subset (`<b>` for emphasis). When no
//! credentials are configured the [`DisabledNotifier`] logs and succeeds, so
//! a run without notifications still advances persisted state.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::NotifyConfig;

/// Telegram rejects messages longer than this many characters.
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4096;

/// Sends a rich-text message to subscribers.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str) -> Result<()>;
}

/// Build the notifier for the configured credentials.
pub fn from_config(config: &NotifyConfig, client: Client) -> Box<dyn Notifier> {
    match config.telegram_credentials() {
        Some((token, chat_id)) => Box::new(TelegramNotifier::new(
            client,
            &config.telegram_api_base,
            token,
            chat_id,
        )),
        None => {
            log::warn!("Telegram credentials not configured; notifications disabled");
            Box::new(DisabledNotifier)
        }
    }
}

/// No-op notifier used when credentials are missing.
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn notify(&self, message: &str) -> Result<()> {
        log::info!(
            "Notifications disabled; skipping message ({} chars)",
            message.chars().count()
        );
        Ok(())
    }
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

/// Telegram Bot API `sendMessage` transport.
pub struct TelegramNotifier {
    client: Client,
    endpoint: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(client: Client, api_base: &str, token: &str, chat_id: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/bot{}/sendMessage", api_base.trim_end_matches('/'), token),
            chat_id: chat_id.to_string(),
        }
    }

    async fn send(&self, text: &str) -> Result<()> {
        let body = SendMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };

        // The endpoint embeds the bot token; keep it out of error text.
        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::notify(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::notify(format!("Telegram HTTP {status}: {detail}")));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, message: &str) -> Result<()> {
        let chunks = split_message(message, TELEGRAM_MESSAGE_LIMIT);
        let total = chunks.len();
        for (i, chunk) in chunks.iter().enumerate() {
            self.send(chunk).await?;
            log::debug!("Sent message part {}/{}", i + 1, total);
        }
        Ok(())
    }
}

const BOLD_OPEN: &str = "<b>";
const BOLD_CLOSE: &str = "</b>";

/// Longest HTML entity the escaper produces, including `&` and `;`.
const MAX_ENTITY_LEN: usize = 5;

/// Split `message` into parts of at most `limit` chars.
///
/// Splits prefer blank-line boundaries, so records stay whole where possible.
/// An oversized record is split between its address lines, and a single
/// oversized line is cut between tags and entities, never inside one.
pub fn split_message(message: &str, limit: usize) -> Vec<String> {
    if char_len(message) <= limit {
        return vec![message.to_string()];
    }

    let mut parts = Vec::new();
    for block in pack(message.split("\n\n"), "\n\n", limit) {
        if char_len(&block) <= limit {
            parts.push(block);
            continue;
        }
        for lines in pack(block.split('\n'), "\n", limit) {
            if char_len(&lines) <= limit {
                parts.push(lines);
            } else {
                parts.extend(split_markup(&lines, limit));
            }
        }
    }
    parts
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Greedily join `pieces` with `separator` into chunks of at most `limit`
/// chars. A piece longer than `limit` becomes a chunk of its own.
fn pack<'a>(pieces: impl Iterator<Item = &'a str>, separator: &str, limit: usize) -> Vec<String> {
    let separator_len = char_len(separator);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for piece in pieces {
        let piece_len = char_len(piece);
        if !current.is_empty() && current_len + separator_len + piece_len <= limit {
            current.push_str(separator);
            current.push_str(piece);
            current_len += separator_len + piece_len;
            continue;
        }
        if !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }
        current.push_str(piece);
        current_len = piece_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Cut one oversized line without splitting a tag or an entity.
///
/// Bold text that spans a cut is closed at the end of one part and reopened
/// at the start of the next, so every part is well-formed on its own.
fn split_markup(line: &str, limit: usize) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    let mut has_content = false;
    let mut bold = false;

    for atom in markup_atoms(line) {
        let atom_len = char_len(atom);
        let bold_after = match atom {
            BOLD_OPEN => true,
            BOLD_CLOSE => false,
            _ => bold,
        };
        let reserve = if bold_after { BOLD_CLOSE.len() } else { 0 };

        if has_content && current_len + atom_len + reserve > limit {
            if bold {
                current.push_str(BOLD_CLOSE);
            }
            parts.push(std::mem::take(&mut current));
            current_len = 0;
            has_content = false;
            if bold {
                current.push_str(BOLD_OPEN);
                current_len = BOLD_OPEN.len();
            }
        }

        current.push_str(atom);
        current_len += atom_len;
        has_content |= atom != BOLD_OPEN;
        bold = bold_after;
    }

    if has_content {
        parts.push(current);
    }
    parts
}

/// Split text into tags, entities and single characters.
fn markup_atoms(text: &str) -> Vec<&str> {
    let mut atoms = Vec::new();
    let mut rest = text;

    while let Some(c) = rest.chars().next() {
        let end = match c {
            '<' => rest.find('>').map_or(1, |i| i + 1),
            '&' => rest
                .find(';')
                .filter(|&i| i < MAX_ENTITY_LEN)
                .map_or(1, |i| i + 1),
            _ => c.len_utf8(),
        };
        let (atom, tail) = rest.split_at(end);
        atoms.push(atom);
        rest = tail;
    }
    atoms
}
