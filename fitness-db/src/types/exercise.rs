//! Exercise records.

use serde::{Deserialize, Serialize};

use crate::storage::codec::{
    CodecError, Reader, Record, write_i32, write_i64, write_string, write_string_list,
};

/// Kind of exercise. Stored as a 4-byte discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum ExerciseType {
    #[default]
    Strength = 0,
    Cardio = 1,
    Flexibility = 2,
    Balance = 3,
    Core = 4,
}

impl TryFrom<i32> for ExerciseType {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Strength),
            1 => Ok(Self::Cardio),
            2 => Ok(Self::Flexibility),
            3 => Ok(Self::Balance),
            4 => Ok(Self::Core),
            _ => Err(value),
        }
    }
}

/// Difficulty tier of an exercise. Stored as a 4-byte discriminant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum ExerciseDifficulty {
    #[default]
    Beginner = 0,
    Intermediate = 1,
    Advanced = 2,
    Expert = 3,
}

impl TryFrom<i32> for ExerciseDifficulty {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Beginner),
            1 => Ok(Self::Intermediate),
            2 => Ok(Self::Advanced),
            3 => Ok(Self::Expert),
            _ => Err(value),
        }
    }
}

/// An exercise in the catalogue.
///
/// `prerequisites` and `next_exercises` hold exercise ids. Only
/// `prerequisites` feeds the dependency graph when the exercise is added.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub exercise_type: ExerciseType,
    pub difficulty: ExerciseDifficulty,
    pub description: String,
    pub target_muscles: Vec<String>,
    pub calories_per_minute: i32,
    pub prerequisites: Vec<String>,
    pub next_exercises: Vec<String>,
    /// Unix seconds.
    pub created_at: i64,
}

impl Record for Exercise {
    fn encode(&self, buf: &mut Vec<u8>) {
        write_string(buf, &self.id);
        write_string(buf, &self.name);
        write_i32(buf, self.exercise_type as i32);
        write_i32(buf, self.difficulty as i32);
        write_string(buf, &self.description);
        write_string_list(buf, &self.target_muscles);
        write_i32(buf, self.calories_per_minute);
        write_string_list(buf, &self.prerequisites);
        write_string_list(buf, &self.next_exercises);
        write_i64(buf, self.created_at);
    }

    fn decode(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            id: reader.read_string()?,
            name: reader.read_string()?,
            exercise_type: reader.read_exercise_type()?,
            difficulty: reader.read_exercise_difficulty()?,
            description: reader.read_string()?,
            target_muscles: reader.read_string_list()?,
            calories_per_minute: reader.read_i32()?,
            prerequisites: reader.read_string_list()?,
            next_exercises: reader.read_string_list()?,
            created_at: reader.read_i64()?,
        })
    }
}
