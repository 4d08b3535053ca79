#![allow(dead_code)]

use std::path::PathBuf;

use chrono::NaiveDate;
use facebluff_db::models::{NewUser, ProfileUpdate};
use facebluff_db::{Database, PoolConfig, QuestionRepository, UserRepository};

/// A throwaway on-disk database, removed with its WAL files on drop.
pub struct TestDb {
    pub db: Database,
    path: PathBuf,
}

impl TestDb {
    pub fn new() -> Self {
        let path = std::env::temp_dir().join(format!("facebluff_test_{}.db", uuid::Uuid::new_v4()));
        let db = Database::open(&PoolConfig::new(&path)).unwrap();
        Self { db, path }
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.db.clone())
    }

    pub fn questions(&self) -> QuestionRepository {
        QuestionRepository::new(self.db.clone())
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

pub fn new_user(email: &str, password: &str, name: &str) -> NewUser {
    NewUser {
        email: email.to_string(),
        password: password.to_string(),
        name: name.to_string(),
        gender: "f".to_string(),
        birthdate: NaiveDate::from_ymd_opt(1995, 4, 12).unwrap(),
        profile_picture: Some(format!("{}.png", name.to_lowercase())),
        points: 0,
    }
}

pub fn profile(email: &str, password: &str, name: &str) -> ProfileUpdate {
    ProfileUpdate {
        email: email.to_string(),
        password: password.to_string(),
        name: name.to_string(),
        gender: "f".to_string(),
        birthdate: NaiveDate::from_ymd_opt(1995, 4, 12).unwrap(),
        profile_picture: Some(format!("{}.png", name.to_lowercase())),
    }
}
