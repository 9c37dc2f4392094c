use crate::error::CoreError;
use crate::store::{Store, ROLL_NUMBERS_TABLE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Students carry the admission-year prefix; staff rolls are letter-prefixed.
const STUDENT_ROLL_PREFIX: &str = "2025";

/// Role is an explicit, stored attribute of every identity. It is never
/// inferred from the shape of a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

impl Role {
    pub fn parse(s: &str) -> Option<Role> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Some(Role::Student),
            "teacher" => Some(Role::Teacher),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Admin => "admin",
        }
    }

    fn format_roll(self, n: u64) -> String {
        match self {
            Role::Student => format!("{}{:04}", STUDENT_ROLL_PREFIX, n),
            Role::Teacher => format!("T{:04}", n),
            Role::Admin => format!("A{:04}", n),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RollTable {
    pub map: RoleMaps,
    pub counters: RoleCounters,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleMaps {
    #[serde(default)]
    pub student: BTreeMap<String, String>,
    #[serde(default)]
    pub teacher: BTreeMap<String, String>,
    #[serde(default)]
    pub admin: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleCounters {
    #[serde(default)]
    pub student: u64,
    #[serde(default)]
    pub teacher: u64,
    #[serde(default)]
    pub admin: u64,
}

impl RollTable {
    fn map_for(&self, role: Role) -> &BTreeMap<String, String> {
        match role {
            Role::Student => &self.map.student,
            Role::Teacher => &self.map.teacher,
            Role::Admin => &self.map.admin,
        }
    }

    fn map_for_mut(&mut self, role: Role) -> &mut BTreeMap<String, String> {
        match role {
            Role::Student => &mut self.map.student,
            Role::Teacher => &mut self.map.teacher,
            Role::Admin => &mut self.map.admin,
        }
    }

    fn counter_for_mut(&mut self, role: Role) -> &mut u64 {
        match role {
            Role::Student => &mut self.counters.student,
            Role::Teacher => &mut self.counters.teacher,
            Role::Admin => &mut self.counters.admin,
        }
    }
}

/// Returns the durable roll id for `name` under `role`, allocating the next
/// counter value on first encounter. Re-requesting an allocated name returns
/// the stored id unchanged and writes nothing.
pub fn allocate(store: &Store, name: &str, role: Role) -> Result<String, CoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CoreError::Validation("name must not be empty".to_string()));
    }

    let _guard = store.begin_write();
    let mut table: RollTable = store.read_table_or_default(ROLL_NUMBERS_TABLE)?;

    if let Some(existing) = table.map_for(role).get(name) {
        return Ok(existing.clone());
    }

    let counter = table.counter_for_mut(role);
    *counter += 1;
    let roll = role.format_roll(*counter);
    table.map_for_mut(role).insert(name.to_string(), roll.clone());
    store.write_table(ROLL_NUMBERS_TABLE, &table)?;
    Ok(roll)
}

/// Reverse index roll id -> allocation name for students, used when the
/// ledger needs a display name for a roll.
pub fn student_name_index(store: &Store) -> Result<BTreeMap<String, String>, CoreError> {
    let table: RollTable = store.read_table_or_default(ROLL_NUMBERS_TABLE)?;
    Ok(table
        .map
        .student
        .iter()
        .map(|(name, roll)| (roll.clone(), name.clone()))
        .collect())
}
