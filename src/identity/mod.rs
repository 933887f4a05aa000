//! Identity resolution: raw author identifiers to people and teams.
//!
//! The alias table is a CSV file where each record reads
//! `display name, team, alias...`. The display name is itself an alias;
//! a blank display name falls back to the record's first alias.
//! Every failed lookup through [`IdentityResolver::resolve`] is recorded
//! as an unmapped identifier. Names that already went through
//! [`IdentityResolver::display_name`] are looked up again with
//! [`IdentityResolver::user_by_display_name`], which records nothing.

use std::collections::{BTreeSet, HashMap};
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::csv_io;
use crate::error::OwnershipError;

/// Team value that counts as "no team".
pub const UNKNOWN_TEAM: &str = "Unknown";

/// Header of the unmapped-users file.
pub const UNMAPPED_HEADER: &str = "UserID";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub display_name: String,
    pub team: String,
    /// All identifiers that resolve to this user, display name first.
    pub aliases: Vec<String>,
}

impl UserInfo {
    pub fn has_team(&self) -> bool {
        !self.team.is_empty() && self.team != UNKNOWN_TEAM
    }
}

/// Maps a raw author identifier to the name its lines are filed under.
pub trait UserMapper: Send + Sync {
    fn display_name(&self, user_id: &str) -> String;
}

#[derive(Debug, Default)]
pub struct IdentityResolver {
    users: HashMap<String, Arc<UserInfo>>,
    by_display_name: HashMap<String, Arc<UserInfo>>,
    unmapped: Mutex<BTreeSet<String>>,
}

impl IdentityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an alias table file. A missing file is an error.
    pub fn from_file(path: &Path) -> Result<Self, OwnershipError> {
        if !path.is_file() {
            return Err(OwnershipError::Config(format!(
                "user mapping file does not exist: {}",
                path.display()
            )));
        }
        let contents = fs::read_to_string(path)?;
        let mut resolver = Self::new();
        resolver
            .load_alias_table(&contents)
            .map_err(|err| match err {
                OwnershipError::Csv { line, message } => OwnershipError::AliasTable {
                    path: path.to_path_buf(),
                    line,
                    message,
                },
                other => other,
            })?;
        log::info!(
            "loaded {} aliases from {}",
            resolver.users.len(),
            path.display()
        );
        Ok(resolver)
    }

    /// Add every record of an alias table. Records with fewer than two
    /// fields, or without any name, are skipped; a later record claiming
    /// an alias or a display name takes it over.
    pub fn load_alias_table(&mut self, contents: &str) -> Result<(), OwnershipError> {
        for record in csv_io::parse_records(contents)? {
            if record.fields.len() < 2 {
                log::debug!("alias table line {}: too few fields, skipped", record.line);
                continue;
            }
            let team = record.fields[1].trim().to_string();

            let mut aliases: Vec<String> = Vec::with_capacity(record.fields.len() - 1);
            for field in std::iter::once(&record.fields[0]).chain(&record.fields[2..]) {
                let alias = field.trim();
                if !alias.is_empty() && !aliases.iter().any(|a| a == alias) {
                    aliases.push(alias.to_string());
                }
            }
            let Some(display_name) = aliases.first().cloned() else {
                log::debug!("alias table line {}: no name, skipped", record.line);
                continue;
            };

            let info = Arc::new(UserInfo {
                display_name,
                team,
                aliases,
            });
            for alias in &info.aliases {
                self.users.insert(alias.clone(), Arc::clone(&info));
            }
            self.by_display_name
                .insert(info.display_name.clone(), Arc::clone(&info));
        }
        Ok(())
    }

    /// Look up `user_id`, recording it as unmapped when there is no match.
    pub fn resolve(&self, user_id: &str) -> Option<Arc<UserInfo>> {
        match self.users.get(user_id) {
            Some(info) => Some(Arc::clone(info)),
            None => {
                self.unmapped.lock().insert(user_id.to_string());
                None
            }
        }
    }

    /// Display name for `user_id`, or `user_id` itself when unmapped.
    pub fn display_name(&self, user_id: &str) -> String {
        self.resolve(user_id)
            .map(|info| info.display_name.clone())
            .unwrap_or_else(|| user_id.to_string())
    }

    /// Owner of a name returned by [`display_name`](Self::display_name).
    ///
    /// `None` means the name is an unmapped raw identifier. Nothing is
    /// recorded, and aliases taken over by later records do not apply.
    pub fn user_by_display_name(&self, name: &str) -> Option<Arc<UserInfo>> {
        self.by_display_name.get(name).cloned()
    }

    /// Unmapped identifiers seen so far, in lexical order.
    pub fn unmapped_users(&self) -> Vec<String> {
        self.unmapped.lock().iter().cloned().collect()
    }

    /// Append the unmapped identifiers to a one-column CSV file, writing the
    /// header only when the file is new.
    pub fn save_unmapped_users(&self, path: &Path) -> Result<(), OwnershipError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let is_new = !path.exists();
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut out = BufWriter::new(file);

        if is_new {
            csv_io::write_record(&mut out, &[UNMAPPED_HEADER])?;
        }
        let users = self.unmapped_users();
        for user in &users {
            csv_io::write_record(&mut out, &[user])?;
        }
        out.flush()?;

        log::info!(
            "saved {} unmapped identifiers to {}",
            users.len(),
            path.display()
        );
        Ok(())
    }
}

impl UserMapper for IdentityResolver {
    fn display_name(&self, user_id: &str) -> String {
        IdentityResolver::display_name(self, user_id)
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
