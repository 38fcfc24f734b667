//! Entries of the auxiliary collections.
//!
//! These lists are kept next to the trees and are not derivable from them;
//! the database keeps them consistent on every mutation.

use serde::{Deserialize, Serialize};

use crate::storage::codec::{CodecError, Reader, Record, write_i32, write_i64, write_string};
use crate::types::Quest;

/// Maps an email address to the id of the user who registered it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailIndexEntry {
    pub email: String,
    pub user_id: String,
}

impl Record for EmailIndexEntry {
    fn encode(&self, buf: &mut Vec<u8>) {
        write_string(buf, &self.email);
        write_string(buf, &self.user_id);
    }

    fn decode(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            email: reader.read_string()?,
            user_id: reader.read_string()?,
        })
    }
}

/// A directed prerequisite edge: `from` must be done before `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    pub weight: i32,
}

impl Record for GraphEdge {
    fn encode(&self, buf: &mut Vec<u8>) {
        write_string(buf, &self.from);
        write_string(buf, &self.to);
        write_i32(buf, self.weight);
    }

    fn decode(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            from: reader.read_string()?,
            to: reader.read_string()?,
            weight: reader.read_i32()?,
        })
    }
}

/// A quest snapshot in the priority list.
///
/// Holds a copy of the quest as it was when added; later quest updates do
/// not reach it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityEntry {
    pub quest: Quest,
    pub priority: i32,
    /// Unix seconds at insertion.
    pub timestamp: i64,
}

impl Record for PriorityEntry {
    fn encode(&self, buf: &mut Vec<u8>) {
        self.quest.encode(buf);
        write_i32(buf, self.priority);
        write_i64(buf, self.timestamp);
    }

    fn decode(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            quest: Quest::decode(reader)?,
            priority: reader.read_i32()?,
            timestamp: reader.read_i64()?,
        })
    }
}
