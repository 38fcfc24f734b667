//! Quest records.

use serde::{Deserialize, Serialize};

use crate::storage::codec::{
    CodecError, Reader, Record, write_bool, write_i32, write_i64, write_string, write_string_list,
};

/// A quest a user can take on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    pub id: String,
    pub title: String,
    pub description: String,
    pub priority: i32,
    pub difficulty: i32,
    /// Exercise ids.
    pub required_exercises: Vec<String>,
    pub rewards: Vec<String>,
    /// Unix seconds, 0 for none.
    pub deadline: i64,
    pub completed: bool,
}

impl Default for Quest {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            description: String::new(),
            priority: 1,
            difficulty: 1,
            required_exercises: Vec::new(),
            rewards: Vec::new(),
            deadline: 0,
            completed: false,
        }
    }
}

impl Record for Quest {
    fn encode(&self, buf: &mut Vec<u8>) {
        write_string(buf, &self.id);
        write_string(buf, &self.title);
        write_string(buf, &self.description);
        write_i32(buf, self.priority);
        write_i32(buf, self.difficulty);
        write_string_list(buf, &self.required_exercises);
        write_string_list(buf, &self.rewards);
        write_i64(buf, self.deadline);
        write_bool(buf, self.completed);
    }

    fn decode(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            id: reader.read_string()?,
            title: reader.read_string()?,
            description: reader.read_string()?,
            priority: reader.read_i32()?,
            difficulty: reader.read_i32()?,
            required_exercises: reader.read_string_list()?,
            rewards: reader.read_string_list()?,
            deadline: reader.read_i64()?,
            completed: reader.read_bool()?,
        })
    }
}
