//! Durable purge intents
//!
//! Every tab that closes adds its session tag to one set kept under [`PENDING_PURGE_KEY`],
//! so several tabs closing before the next start all get purged. The set is stored as a
//! JSON array; a bare tag left by an older build reads as a one-element set.

use log::warn;

use crate::constants::PENDING_PURGE_KEY;
use crate::error::RegisterError;
use crate::register::KeyValueRegister;
use crate::session::SessionTag;

/// Sessions waiting to be purged, oldest intent first. Malformed entries are dropped.
pub fn pending_purges(durable: &dyn KeyValueRegister) -> Vec<SessionTag> {
    let entries = match read_entries(durable) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Failed to read purge intents: {}", e);
            return Vec::new();
        }
    };

    let mut tags: Vec<SessionTag> = Vec::with_capacity(entries.len());
    let mut discarded = false;
    for entry in &entries {
        match SessionTag::parse(entry) {
            Ok(tag) if tags.contains(&tag) => discarded = true,
            Ok(tag) => tags.push(tag),
            Err(e) => {
                warn!("Discarding purge intent: {}", e);
                discarded = true;
            }
        }
    }

    if discarded {
        let kept: Vec<String> = tags.iter().map(|tag| tag.to_string()).collect();
        if let Err(e) = write_entries(durable, &kept) {
            warn!("Failed to rewrite purge intents: {}", e);
        }
    }
    tags
}

/// Record that `tag` should be purged at the next start
pub fn add_pending_purge(
    durable: &dyn KeyValueRegister,
    tag: &SessionTag,
) -> Result<(), RegisterError> {
    let mut entries = read_entries(durable)?;
    if entries.iter().any(|entry| entry == tag.as_str()) {
        return Ok(());
    }
    entries.push(tag.to_string());
    write_entries(durable, &entries)
}

/// Drop the intent naming `tag`. Returns true when there was one.
pub fn remove_pending_purge(
    durable: &dyn KeyValueRegister,
    tag: &SessionTag,
) -> Result<bool, RegisterError> {
    let mut entries = read_entries(durable)?;
    let before = entries.len();
    entries.retain(|entry| entry != tag.as_str());
    if entries.len() == before {
        return Ok(false);
    }
    write_entries(durable, &entries)?;
    Ok(true)
}

fn read_entries(durable: &dyn KeyValueRegister) -> Result<Vec<String>, RegisterError> {
    let Some(raw) = durable.get(PENDING_PURGE_KEY)? else {
        return Ok(Vec::new());
    };
    match serde_json::from_str::<Vec<String>>(&raw) {
        Ok(entries) => Ok(entries),
        // Bare tag from before intents were a set
        Err(_) => Ok(vec![raw]),
    }
}

fn write_entries(durable: &dyn KeyValueRegister, entries: &[String]) -> Result<(), RegisterError> {
    if entries.is_empty() {
        return durable.remove(PENDING_PURGE_KEY);
    }
    let raw = serde_json::to_string(entries)?;
    durable.set(PENDING_PURGE_KEY, &raw)
}
