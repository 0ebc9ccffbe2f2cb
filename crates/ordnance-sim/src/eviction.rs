//! Bounded-capacity admission for SecondaryLimited munitions.
//!
//! When the collection is full, the oldest record is removed and handed to
//! `evict` (which detonates it) before the new record is appended. Nothing is
//! ever dropped silently.

use std::collections::VecDeque;

use crate::record::MunitionRecord;

/// Capacity derived from the owner's current stock limit. Never below 1.
pub fn resolve_capacity(stock_limit: u32) -> usize {
    stock_limit.max(1) as usize
}

/// Admit `record`, evicting oldest-first until there is room.
/// Afterwards `limited.len() <= capacity`.
pub fn admit(
    limited: &mut VecDeque<MunitionRecord>,
    record: MunitionRecord,
    capacity: usize,
    mut evict: impl FnMut(MunitionRecord),
) {
    let capacity = capacity.max(1);
    while limited.len() >= capacity {
        match limited.pop_front() {
            Some(oldest) => evict(oldest),
            None => break,
        }
    }
    limited.push_back(record);
}
