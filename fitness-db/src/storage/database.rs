//! High-level database interface.
//!
//! `Database` owns four B-trees (exercises, users, workouts, quests) and three
//! flat auxiliary collections (email index, exercise graph, quest priority
//! queue). Every mutating operation applies its change in memory and then
//! rewrites all seven collection files.
//!
//! # Invariants
//!
//! - Every email index entry refers to a user id present in the user tree
//! - The priority queue is sorted by descending priority after each `add_quest`
//! - Reads never touch the disk

use rand::Rng;
use sha2::{Digest, Sha256};

use crate::config::DatabaseConfig;
use crate::storage::btree::BTree;
use crate::storage::codec::Record;
use crate::storage::file::{
    self, EMAIL_INDEX_FILE, EXERCISES_FILE, FileError, GRAPH_FILE, LoadReport,
    PRIORITY_QUEUE_FILE, QUESTS_FILE, USERS_FILE, WORKOUTS_FILE,
};
use crate::storage::time::{SystemTimeSource, TimeSource};
use crate::types::{
    AuxiliaryStats, DatabaseStats, EmailIndexEntry, Exercise, ExerciseDifficulty, ExerciseType,
    GraphEdge, PriorityEntry, Quest, TreeStats, User, WorkoutSession,
};

/// Upper bound (exclusive) of the random suffix of generated user ids.
const USER_ID_SUFFIX_RANGE: u32 = 10_000;

/// Upper bound (exclusive) of the random suffix of generated workout ids.
const WORKOUT_ID_SUFFIX_RANGE: u32 = 1_000;

/// A database instance.
///
/// Not internally synchronized. Share it between threads through
/// [`SharedDatabase`](crate::storage::SharedDatabase).
pub struct Database {
    exercises: BTree<String, Exercise>,
    users: BTree<String, User>,
    workouts: BTree<String, WorkoutSession>,
    quests: BTree<String, Quest>,
    email_index: Vec<EmailIndexEntry>,
    graph_edges: Vec<GraphEdge>,
    priority_queue: Vec<PriorityEntry>,
    config: DatabaseConfig,
    time: Box<dyn TimeSource + Send>,
    /// Set once `close` has persisted, so `Drop` does not save again.
    closed: bool,
}

impl Database {
    /// Open the database in `config.data_directory`, creating the directory
    /// if needed.
    ///
    /// Missing files load as empty collections. Corrupt or truncated files
    /// load as empty or partial collections with a warning. A file written in
    /// the other `FileFormat` fails with `DatabaseError::File`. If no user exists
    /// afterwards and `seed_on_empty` is set, the fixture data is inserted and
    /// persisted.
    pub fn open(config: DatabaseConfig) -> Result<Self, DatabaseError> {
        Self::open_with_time_source(config, Box::new(SystemTimeSource))
    }

    /// Open the database with a custom clock for timestamps and ids.
    pub fn open_with_time_source(
        config: DatabaseConfig,
        time: Box<dyn TimeSource + Send>,
    ) -> Result<Self, DatabaseError> {
        file::ensure_directory(&config.data_directory)?;

        let mut db = Self {
            exercises: BTree::new(),
            users: BTree::new(),
            workouts: BTree::new(),
            quests: BTree::new(),
            email_index: Vec::new(),
            graph_edges: Vec::new(),
            priority_queue: Vec::new(),
            config,
            time,
            closed: false,
        };

        if let Err(e) = db.load_all_data() {
            // A half-loaded state must not overwrite the files on drop
            db.closed = true;
            return Err(e);
        }

        if db.users.is_empty() && db.config.seed_on_empty {
            db.seed()?;
        }

        tracing::info!(
            "Opened fitness database at {}: {} users, {} exercises, {} workouts, {} quests",
            db.config.data_directory.display(),
            db.users.len(),
            db.exercises.len(),
            db.workouts.len(),
            db.quests.len()
        );

        Ok(db)
    }

    #[must_use]
    pub const fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    #[must_use]
    pub fn data_directory(&self) -> &std::path::Path {
        &self.config.data_directory
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// Register a new user and return the generated id.
    ///
    /// The password is stored as its hex SHA-256 digest. Ids are
    /// `USER_<unix seconds>_<0..10000>`; two users created in the same
    /// second can draw the same id, in which case the later one overwrites
    /// the earlier one.
    pub fn create_user(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<String, DatabaseError> {
        if self.email_index.iter().any(|entry| entry.email == email) {
            return Err(DatabaseError::AlreadyExists {
                what: "email",
                key: email.to_string(),
            });
        }

        let now = self.time.now_secs();
        let user_id = format!(
            "USER_{now}_{}",
            rand::rng().random_range(0..USER_ID_SUFFIX_RANGE)
        );

        let user = User {
            id: user_id.clone(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: hash_password(password),
            fitness_level: 1,
            experience_points: 0,
            completed_exercises: Vec::new(),
            achievements: Vec::new(),
            created_at: now,
            last_login: now,
        };

        self.users.insert(user_id.clone(), user);
        self.email_index.push(EmailIndexEntry {
            email: email.to_string(),
            user_id: user_id.clone(),
        });
        self.save_all_data()?;

        tracing::debug!("created user {user_id}");
        Ok(user_id)
    }

    pub fn get_user(&self, user_id: &str) -> Result<User, DatabaseError> {
        self.users
            .get(&user_id.to_string())
            .cloned()
            .ok_or_else(|| DatabaseError::not_found("users", user_id))
    }

    /// Look up a user through the email index.
    pub fn get_user_by_email(&self, email: &str) -> Result<User, DatabaseError> {
        let entry = self
            .email_index
            .iter()
            .find(|entry| entry.email == email)
            .ok_or_else(|| DatabaseError::not_found("email_index", email))?;
        self.get_user(&entry.user_id)
    }

    /// Email index entries, in insertion order.
    #[must_use]
    pub fn get_email_index(&self) -> &[EmailIndexEntry] {
        &self.email_index
    }

    /// Insert or replace a user by id.
    ///
    /// The email index is not touched.
    pub fn update_user(&mut self, user: User) -> Result<(), DatabaseError> {
        self.users.insert(user.id.clone(), user);
        self.save_all_data()
    }

    // ========================================================================
    // Exercises
    // ========================================================================

    /// Insert or replace an exercise and record one graph edge per
    /// prerequisite.
    ///
    /// Edges are appended on every call, so re-adding an exercise duplicates
    /// its edges.
    pub fn add_exercise(&mut self, exercise: Exercise) -> Result<(), DatabaseError> {
        for prerequisite in &exercise.prerequisites {
            self.graph_edges.push(GraphEdge {
                from: prerequisite.clone(),
                to: exercise.id.clone(),
                weight: 1,
            });
        }
        self.exercises.insert(exercise.id.clone(), exercise);
        self.save_all_data()
    }

    pub fn get_exercise(&self, exercise_id: &str) -> Result<Exercise, DatabaseError> {
        self.exercises
            .get(&exercise_id.to_string())
            .cloned()
            .ok_or_else(|| DatabaseError::not_found("exercises", exercise_id))
    }

    /// All exercises in id order.
    #[must_use]
    pub fn get_all_exercises(&self) -> Vec<Exercise> {
        collect_all(&self.exercises)
    }

    /// Prerequisite edges, in insertion order.
    #[must_use]
    pub fn get_exercise_graph(&self) -> &[GraphEdge] {
        &self.graph_edges
    }

    // ========================================================================
    // Workouts
    // ========================================================================

    /// Start a workout for `user_id` and return the generated id.
    ///
    /// Ids are `WORKOUT_<unix seconds>_<0..1000>`, with the same collision
    /// behavior as user ids. The user is not required to exist.
    pub fn start_workout(&mut self, user_id: &str) -> Result<String, DatabaseError> {
        let now = self.time.now_secs();
        let workout_id = format!(
            "WORKOUT_{now}_{}",
            rand::rng().random_range(0..WORKOUT_ID_SUFFIX_RANGE)
        );

        let workout = WorkoutSession {
            id: workout_id.clone(),
            user_id: user_id.to_string(),
            start_time: now,
            end_time: 0,
            exercises: Vec::new(),
            total_calories: 0,
            validated: false,
            form_score: 0.0,
        };

        self.workouts.insert(workout_id.clone(), workout);
        self.save_all_data()?;
        Ok(workout_id)
    }

    /// Set the end time of a workout to now.
    pub fn complete_workout(&mut self, workout_id: &str) -> Result<(), DatabaseError> {
        let mut workout = self.get_workout(workout_id)?;
        workout.end_time = self.time.now_secs();
        self.workouts.insert(workout.id.clone(), workout);
        self.save_all_data()
    }

    pub fn get_workout(&self, workout_id: &str) -> Result<WorkoutSession, DatabaseError> {
        self.workouts
            .get(&workout_id.to_string())
            .cloned()
            .ok_or_else(|| DatabaseError::not_found("workouts", workout_id))
    }

    #[must_use]
    pub fn get_all_workouts(&self) -> Vec<WorkoutSession> {
        collect_all(&self.workouts)
    }

    /// Workouts belonging to `user_id`, in id order.
    #[must_use]
    pub fn get_user_workouts(&self, user_id: &str) -> Vec<WorkoutSession> {
        self.workouts
            .values()
            .filter(|workout| workout.user_id == user_id)
            .cloned()
            .collect()
    }

    // ========================================================================
    // Quests
    // ========================================================================

    /// Insert or replace a quest and queue it.
    ///
    /// The whole queue is re-sorted by descending priority afterwards.
    pub fn add_quest(&mut self, quest: Quest) -> Result<(), DatabaseError> {
        self.priority_queue.push(PriorityEntry {
            quest: quest.clone(),
            priority: quest.priority,
            timestamp: self.time.now_secs(),
        });
        self.priority_queue.sort_by(|a, b| b.priority.cmp(&a.priority));
        self.quests.insert(quest.id.clone(), quest);
        self.save_all_data()
    }

    pub fn get_quest(&self, quest_id: &str) -> Result<Quest, DatabaseError> {
        self.quests
            .get(&quest_id.to_string())
            .cloned()
            .ok_or_else(|| DatabaseError::not_found("quests", quest_id))
    }

    #[must_use]
    pub fn get_all_quests(&self) -> Vec<Quest> {
        collect_all(&self.quests)
    }

    /// The priority queue, highest priority first.
    ///
    /// `get_next_quest` takes from the end of this slice.
    #[must_use]
    pub fn get_priority_queue(&self) -> &[PriorityEntry] {
        &self.priority_queue
    }

    /// Remove and return the entry at the back of the priority queue.
    ///
    /// The queue is sorted by descending priority, so this is the
    /// lowest-priority quest, and among equal priorities the one queued
    /// last. The quest stays in the quest tree.
    pub fn get_next_quest(&mut self) -> Result<Quest, DatabaseError> {
        let entry = self.priority_queue.pop().ok_or(DatabaseError::EmptyQueue)?;
        self.save_all_data()?;
        Ok(entry.quest)
    }

    // ========================================================================
    // Administration
    // ========================================================================

    #[must_use]
    pub fn get_stats(&self) -> DatabaseStats {
        DatabaseStats {
            btree: TreeStats {
                exercise_count: self.exercises.len(),
                user_count: self.users.len(),
                workout_count: self.workouts.len(),
                quest_count: self.quests.len(),
            },
            other: AuxiliaryStats {
                email_index_size: self.email_index.len(),
                graph_edges: self.graph_edges.len(),
                priority_queue_size: self.priority_queue.len(),
            },
        }
    }

    /// Drop every record, delete the data files, then insert the fixture
    /// data again.
    ///
    /// Seeding here does not depend on `seed_on_empty`.
    pub fn clear_all_data(&mut self) -> Result<(), DatabaseError> {
        self.exercises.clear();
        self.users.clear();
        self.workouts.clear();
        self.quests.clear();
        self.email_index.clear();
        self.graph_edges.clear();
        self.priority_queue.clear();

        for name in file::DATA_FILES {
            file::remove_if_exists(&self.config.data_directory.join(name))?;
        }
        tracing::info!(
            "Cleared all data in {}",
            self.config.data_directory.display()
        );

        self.seed()
    }

    /// Check that a freshly opened instance sees what this one persisted.
    ///
    /// Creates the user `TestUser` / `test@test.com`, opens a second
    /// instance on the same directory and looks the user up by email there.
    /// Fails with `AlreadyExists` if the test user was created before.
    pub fn test_persistence(&mut self) -> Result<bool, DatabaseError> {
        self.create_user("TestUser", "test@test.com", "password")?;

        let reopened = Self::open(self.config.clone())?;
        let found = match reopened.get_user_by_email("test@test.com") {
            Ok(user) => user.username == "TestUser",
            Err(DatabaseError::NotFound { .. }) => false,
            Err(e) => return Err(e),
        };
        reopened.close()?;

        tracing::info!("Persistence self-check {}", if found { "passed" } else { "failed" });
        Ok(found)
    }

    /// Rewrite all seven collection files.
    ///
    /// Files are written one after another; the first failure aborts the
    /// save and leaves the remaining files at their previous contents.
    pub fn save_all_data(&self) -> Result<(), DatabaseError> {
        let payloads = [
            (EXERCISES_FILE, file::encode_tree(&self.exercises)),
            (USERS_FILE, file::encode_tree(&self.users)),
            (WORKOUTS_FILE, file::encode_tree(&self.workouts)),
            (QUESTS_FILE, file::encode_tree(&self.quests)),
            (EMAIL_INDEX_FILE, file::encode_list(&self.email_index)),
            (GRAPH_FILE, file::encode_list(&self.graph_edges)),
            (PRIORITY_QUEUE_FILE, file::encode_list(&self.priority_queue)),
        ];

        for (name, payload) in payloads {
            file::write_collection(
                &self.config.data_directory.join(name),
                &payload,
                self.config.file_format,
                self.config.atomic_writes,
            )?;
            tracing::debug!("wrote {name} ({} bytes)", payload.len());
        }

        Ok(())
    }

    /// Persist everything and release the database.
    pub fn close(mut self) -> Result<(), DatabaseError> {
        self.closed = true;
        self.save_all_data()
    }

    /// Release the database without saving again.
    ///
    /// Only for callers that have just completed `save_all_data`.
    pub(crate) fn release(mut self) {
        self.closed = true;
    }

    fn load_all_data(&mut self) -> Result<(), DatabaseError> {
        load_tree(&self.config, EXERCISES_FILE, &mut self.exercises)?;
        load_tree(&self.config, USERS_FILE, &mut self.users)?;
        load_tree(&self.config, WORKOUTS_FILE, &mut self.workouts)?;
        load_tree(&self.config, QUESTS_FILE, &mut self.quests)?;
        self.email_index = load_list(&self.config, EMAIL_INDEX_FILE)?;
        self.graph_edges = load_list(&self.config, GRAPH_FILE)?;
        self.priority_queue = load_list(&self.config, PRIORITY_QUEUE_FILE)?;
        Ok(())
    }

    /// Insert the fixture data and persist it.
    fn seed(&mut self) -> Result<(), DatabaseError> {
        let now = self.time.now_secs();

        let push_up = Exercise {
            id: "EX001".to_string(),
            name: "Push-up".to_string(),
            exercise_type: ExerciseType::Strength,
            difficulty: ExerciseDifficulty::Beginner,
            description: String::new(),
            target_muscles: Vec::new(),
            calories_per_minute: 8,
            prerequisites: Vec::new(),
            next_exercises: vec!["EX002".to_string()],
            created_at: now,
        };
        let squat = Exercise {
            id: "EX002".to_string(),
            name: "Squat".to_string(),
            exercise_type: ExerciseType::Strength,
            difficulty: ExerciseDifficulty::Beginner,
            description: String::new(),
            target_muscles: Vec::new(),
            calories_per_minute: 7,
            prerequisites: vec!["EX001".to_string()],
            next_exercises: Vec::new(),
            created_at: now,
        };
        self.exercises.insert(push_up.id.clone(), push_up);
        self.exercises.insert(squat.id.clone(), squat);

        let admin = User {
            id: "ADMIN001".to_string(),
            username: "Admin".to_string(),
            email: "admin@fitnessquest.com".to_string(),
            password_hash: "hashed_password".to_string(),
            fitness_level: 10,
            experience_points: 0,
            completed_exercises: Vec::new(),
            achievements: Vec::new(),
            created_at: now,
            last_login: now,
        };
        self.email_index.push(EmailIndexEntry {
            email: admin.email.clone(),
            user_id: admin.id.clone(),
        });
        self.users.insert(admin.id.clone(), admin);

        self.graph_edges.push(GraphEdge {
            from: "EX001".to_string(),
            to: "EX002".to_string(),
            weight: 1,
        });

        let daily = Quest {
            id: "Q001".to_string(),
            title: "Daily Challenge".to_string(),
            description: "Complete basic exercises".to_string(),
            priority: 1,
            difficulty: 1,
            required_exercises: vec!["EX001".to_string(), "EX002".to_string()],
            rewards: vec!["100 XP".to_string()],
            deadline: 0,
            completed: false,
        };
        self.priority_queue.push(PriorityEntry {
            quest: daily.clone(),
            priority: daily.priority,
            timestamp: now,
        });
        self.quests.insert(daily.id.clone(), daily);

        tracing::info!("Seeded fixture data");
        self.save_all_data()
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.save_all_data() {
            tracing::error!(
                "Failed to save database at {} on drop: {e}",
                self.config.data_directory.display()
            );
        }
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("config", &self.config)
            .field("stats", &self.get_stats())
            .finish_non_exhaustive()
    }
}

fn hash_password(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

/// Enumerate the keys of `tree` and look each one up, skipping misses.
fn collect_all<V: Clone>(tree: &BTree<String, V>) -> Vec<V> {
    tree.get_all_keys()
        .iter()
        .filter_map(|key| tree.search(key).ok())
        .cloned()
        .collect()
}

/// Read one collection file.
///
/// A damaged frame is logged and treated as a missing file. A file in the
/// other format or a newer version fails the open, so the next save cannot
/// overwrite it.
fn read_payload(config: &DatabaseConfig, name: &str) -> Result<Option<Vec<u8>>, DatabaseError> {
    match file::read_collection(&config.data_directory.join(name), config.file_format) {
        Ok(payload) => Ok(payload),
        Err(e) if e.is_corruption() => {
            tracing::warn!("Ignoring {name}: {e}");
            Ok(None)
        }
        Err(e) => {
            tracing::error!("Cannot load {name}: {e}");
            Err(e.into())
        }
    }
}

fn load_tree<V: Record>(
    config: &DatabaseConfig,
    name: &str,
    tree: &mut BTree<String, V>,
) -> Result<(), DatabaseError> {
    if let Some(payload) = read_payload(config, name)? {
        let report = file::decode_tree(&payload, tree);
        log_load_report(name, &report);
    }
    Ok(())
}

fn load_list<T: Record>(config: &DatabaseConfig, name: &str) -> Result<Vec<T>, DatabaseError> {
    let Some(payload) = read_payload(config, name)? else {
        return Ok(Vec::new());
    };
    let (items, report) = file::decode_list(&payload);
    log_load_report(name, &report);
    Ok(items)
}

fn log_load_report(name: &str, report: &LoadReport) {
    if report.rejected {
        tracing::warn!(
            "Ignoring {name}: implausible record count {}",
            report.announced
        );
    } else if let Some(e) = &report.error {
        tracing::warn!(
            "Loaded {} of {} records from {name}, stopped at: {e}",
            report.loaded,
            report.announced
        );
    } else {
        tracing::debug!("loaded {} records from {name}", report.loaded);
    }
}

/// Errors that can occur during database operations.
#[derive(Debug)]
pub enum DatabaseError {
    /// No record with this key in the collection.
    NotFound {
        collection: &'static str,
        key: String,
    },
    /// A unique key is already taken.
    AlreadyExists { what: &'static str, key: String },
    /// The quest priority queue is empty.
    EmptyQueue,
    /// I/O error.
    Io(std::io::Error),
    /// A collection file could not be framed or unframed.
    File(FileError),
    /// The shared database lock is poisoned.
    LockPoisoned,
    /// The shared database was disconnected.
    NotConnected,
}

impl DatabaseError {
    fn not_found(collection: &'static str, key: &str) -> Self {
        Self::NotFound {
            collection,
            key: key.to_string(),
        }
    }
}

impl std::fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { collection, key } => write!(f, "'{key}' not found in {collection}"),
            Self::AlreadyExists { what, key } => write!(f, "{what} '{key}' already exists"),
            Self::EmptyQueue => write!(f, "no quests available"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::File(e) => write!(f, "file error: {e}"),
            Self::LockPoisoned => write!(f, "database lock poisoned"),
            Self::NotConnected => write!(f, "database is not connected"),
        }
    }
}

impl std::error::Error for DatabaseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::File(e) => Some(e),
            Self::NotFound { .. }
            | Self::AlreadyExists { .. }
            | Self::EmptyQueue
            | Self::LockPoisoned
            | Self::NotConnected => None,
        }
    }
}

impl From<std::io::Error> for DatabaseError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<FileError> for DatabaseError {
    fn from(e: FileError) -> Self {
        match e {
            FileError::Io(e) => Self::Io(e),
            other => Self::File(other),
        }
    }
}
