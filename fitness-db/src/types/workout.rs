//! Workout session records.

use serde::{Deserialize, Serialize};

use crate::storage::codec::{
    CodecError, Reader, Record, write_bool, write_f32, write_i32, write_i64, write_string,
    write_string_list,
};

/// A workout session started by a user.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkoutSession {
    pub id: String,
    pub user_id: String,
    /// Unix seconds.
    pub start_time: i64,
    /// Unix seconds, 0 while the session is running.
    pub end_time: i64,
    /// Exercise ids.
    pub exercises: Vec<String>,
    pub total_calories: i32,
    pub validated: bool,
    pub form_score: f32,
}

impl WorkoutSession {
    /// Check if the session has been completed.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.end_time != 0
    }
}

impl Record for WorkoutSession {
    fn encode(&self, buf: &mut Vec<u8>) {
        write_string(buf, &self.id);
        write_string(buf, &self.user_id);
        write_i64(buf, self.start_time);
        write_i64(buf, self.end_time);
        write_string_list(buf, &self.exercises);
        write_i32(buf, self.total_calories);
        write_bool(buf, self.validated);
        write_f32(buf, self.form_score);
    }

    fn decode(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            id: reader.read_string()?,
            user_id: reader.read_string()?,
            start_time: reader.read_i64()?,
            end_time: reader.read_i64()?,
            exercises: reader.read_string_list()?,
            total_calories: reader.read_i32()?,
            validated: reader.read_bool()?,
            form_score: reader.read_f32()?,
        })
    }
}
