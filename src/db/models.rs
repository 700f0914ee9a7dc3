use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// A role or status column held a string outside its closed vocabulary.
#[derive(Debug, thiserror::Error)]
#[error("unrecognized value: {0}")]
pub struct ParseEnumError(pub String);

/// Global role on a user account. Comparisons are case-sensitive exact
/// matches against these literals, in SQL and in code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GlobalRole {
    Member,
    Trainer,
    Admin,
}

impl GlobalRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            GlobalRole::Member => "Member",
            GlobalRole::Trainer => "Trainer",
            GlobalRole::Admin => "Admin",
        }
    }
}

impl std::str::FromStr for GlobalRole {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Member" => Ok(GlobalRole::Member),
            "Trainer" => Ok(GlobalRole::Trainer),
            "Admin" => Ok(GlobalRole::Admin),
            other => Err(ParseEnumError(other.to_string())),
        }
    }
}

impl std::fmt::Display for GlobalRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for GlobalRole {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for GlobalRole {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: ParseEnumError| FromSqlError::Other(Box::new(e)))
    }
}

/// Per-project role on a membership row, distinct from [`GlobalRole`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectRole {
    Admin,
    #[serde(rename = "Co-Admin")]
    CoAdmin,
    Member,
}

impl ProjectRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectRole::Admin => "Admin",
            ProjectRole::CoAdmin => "Co-Admin",
            ProjectRole::Member => "Member",
        }
    }
}

impl std::str::FromStr for ProjectRole {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(ProjectRole::Admin),
            "Co-Admin" => Ok(ProjectRole::CoAdmin),
            "Member" => Ok(ProjectRole::Member),
            other => Err(ParseEnumError(other.to_string())),
        }
    }
}

impl std::fmt::Display for ProjectRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for ProjectRole {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ProjectRole {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: ParseEnumError| FromSqlError::Other(Box::new(e)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationStatus {
    Pending,
    Confirmed,
    Canceled,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Pending => "Pending",
            RegistrationStatus::Confirmed => "Confirmed",
            RegistrationStatus::Canceled => "Canceled",
        }
    }
}

impl std::str::FromStr for RegistrationStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(RegistrationStatus::Pending),
            "Confirmed" => Ok(RegistrationStatus::Confirmed),
            "Canceled" => Ok(RegistrationStatus::Canceled),
            other => Err(ParseEnumError(other.to_string())),
        }
    }
}

impl std::fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for RegistrationStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for RegistrationStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: ParseEnumError| FromSqlError::Other(Box::new(e)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: GlobalRole,
}

impl User {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            user_id: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            email: row.get(3)?,
            role: row.get(4)?,
        })
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub project_id: i64,
    /// Assigned from the acting user at creation; never rewritten from
    /// client input afterwards.
    pub creator_id: i64,
    pub name: String,
    pub description: String,
}

impl Project {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            project_id: row.get(0)?,
            creator_id: row.get(1)?,
            name: row.get(2)?,
            description: row.get(3)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMember {
    pub project_member_id: i64,
    pub project_id: i64,
    pub member_id: i64,
    pub role: ProjectRole,
}

impl ProjectMember {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            project_member_id: row.get(0)?,
            project_id: row.get(1)?,
            member_id: row.get(2)?,
            role: row.get(3)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectLink {
    pub project_link_id: i64,
    pub project_id: i64,
    pub url: String,
    pub description: String,
    pub category: String,
    /// Assigned from the acting user at creation; never rewritten on update.
    pub added_by_user_id: i64,
}

impl ProjectLink {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            project_link_id: row.get(0)?,
            project_id: row.get(1)?,
            url: row.get(2)?,
            description: row.get(3)?,
            category: row.get(4)?,
            added_by_user_id: row.get(5)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GymClass {
    pub gym_class_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub start_time: Option<chrono::NaiveTime>,
    pub end_time: Option<chrono::NaiveTime>,
    /// Denormalized display name of the trainer, captured when the class is
    /// edited through the HTML form. Goes stale if the trainer is renamed.
    pub instructor: Option<String>,
    pub trainer_id: i64,
    pub schedule_time: chrono::NaiveDateTime,
    pub max_capacity: i64,
    pub image_path: Option<String>,
}

impl GymClass {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            gym_class_id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            start_time: row.get(3)?,
            end_time: row.get(4)?,
            instructor: row.get(5)?,
            trainer_id: row.get(6)?,
            schedule_time: row.get(7)?,
            max_capacity: row.get(8)?,
            image_path: row.get(9)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassRegistration {
    pub class_registration_id: i64,
    pub member_id: i64,
    pub class_id: i64,
    pub status: RegistrationStatus,
    pub registration_date: chrono::NaiveDateTime,
}

impl ClassRegistration {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            class_registration_id: row.get(0)?,
            member_id: row.get(1)?,
            class_id: row.get(2)?,
            status: row.get(3)?,
            registration_date: row.get(4)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_role_literals_are_exact() {
        assert_eq!(ProjectRole::Admin.as_str(), "Admin");
        assert_eq!(ProjectRole::CoAdmin.as_str(), "Co-Admin");
        assert_eq!(ProjectRole::Member.as_str(), "Member");
    }

    #[test]
    fn role_parsing_is_case_sensitive() {
        assert!("admin".parse::<GlobalRole>().is_err());
        assert!("ADMIN".parse::<GlobalRole>().is_err());
        assert!("co-admin".parse::<ProjectRole>().is_err());
        assert_eq!("Admin".parse::<GlobalRole>().unwrap(), GlobalRole::Admin);
        assert_eq!(
            "Co-Admin".parse::<ProjectRole>().unwrap(),
            ProjectRole::CoAdmin
        );
    }

    #[test]
    fn status_parses_its_vocabulary() {
        for s in ["Pending", "Confirmed", "Canceled"] {
            assert_eq!(s.parse::<RegistrationStatus>().unwrap().as_str(), s);
        }
        assert!("Cancelled".parse::<RegistrationStatus>().is_err());
    }

    #[test]
    fn co_admin_serializes_with_hyphen() {
        let json = serde_json::to_string(&ProjectRole::CoAdmin).unwrap();
        assert_eq!(json, "\"Co-Admin\"");
        let back: ProjectRole = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ProjectRole::CoAdmin);
    }

    #[test]
    fn full_name_joins_first_and_last() {
        let user = User {
            user_id: 1,
            first_name: "Dana".into(),
            last_name: "Reyes".into(),
            email: "dana@example.com".into(),
            role: GlobalRole::Trainer,
        };
        assert_eq!(user.full_name(), "Dana Reyes");
    }
}
