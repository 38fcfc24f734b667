//! User records.

use serde::{Deserialize, Serialize};

use crate::storage::codec::{
    CodecError, Reader, Record, write_i32, write_i64, write_string, write_string_list,
};

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub fitness_level: i32,
    pub experience_points: i32,
    /// Exercise ids.
    pub completed_exercises: Vec<String>,
    pub achievements: Vec<String>,
    /// Unix seconds.
    pub created_at: i64,
    /// Unix seconds.
    pub last_login: i64,
}

impl Default for User {
    fn default() -> Self {
        Self {
            id: String::new(),
            username: String::new(),
            email: String::new(),
            password_hash: String::new(),
            fitness_level: 1,
            experience_points: 0,
            completed_exercises: Vec::new(),
            achievements: Vec::new(),
            created_at: 0,
            last_login: 0,
        }
    }
}

impl Record for User {
    fn encode(&self, buf: &mut Vec<u8>) {
        write_string(buf, &self.id);
        write_string(buf, &self.username);
        write_string(buf, &self.email);
        write_string(buf, &self.password_hash);
        write_i32(buf, self.fitness_level);
        write_i32(buf, self.experience_points);
        write_string_list(buf, &self.completed_exercises);
        write_string_list(buf, &self.achievements);
        write_i64(buf, self.created_at);
        write_i64(buf, self.last_login);
    }

    fn decode(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            id: reader.read_string()?,
            username: reader.read_string()?,
            email: reader.read_string()?,
            password_hash: reader.read_string()?,
            fitness_level: reader.read_i32()?,
            experience_points: reader.read_i32()?,
            completed_exercises: reader.read_string_list()?,
            achievements: reader.read_string_list()?,
            created_at: reader.read_i64()?,
            last_login: reader.read_i64()?,
        })
    }
}
