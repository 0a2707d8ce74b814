use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Wire value of the only role that gets its own dashboard variant.
pub const CREATOR_ROLE: &str = "CREATOR";

/// User role. Only `CREATOR` is distinguished; every other value is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Role {
    Creator,
    Other(String),
}

impl Role {
    pub fn parse(value: &str) -> Self {
        if value == CREATOR_ROLE {
            Role::Creator
        } else {
            Role::Other(value.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::Creator => CREATOR_ROLE,
            Role::Other(value) => value,
        }
    }

    pub fn is_creator(&self) -> bool {
        matches!(self, Role::Creator)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Role::parse(&value))
    }
}

/// Authenticated dashboard user, as resolved from the auth token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_is_case_sensitive() {
        assert_eq!(Role::parse("CREATOR"), Role::Creator);
        assert_eq!(Role::parse("creator"), Role::Other("creator".to_string()));
        assert_eq!(Role::parse("ADMIN").as_str(), "ADMIN");
    }

    #[test]
    fn test_role_serde_uses_wire_value() {
        let json = serde_json::to_string(&Role::Creator).unwrap();
        assert_eq!(json, "\"CREATOR\"");
        let role: Role = serde_json::from_str("\"ADMIN\"").unwrap();
        assert_eq!(role, Role::Other("ADMIN".to_string()));
    }
}
