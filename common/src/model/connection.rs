use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_PORT: u16 = 5432;

/// Parameters of an ad-hoc connection to an external PostgreSQL database.
///
/// Lives only for one proxy request; never persisted. `Debug` hides the password.
#[derive(Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub host: String,
    /// Accepts either a JSON number or a numeric string.
    #[serde(default = "default_port", deserialize_with = "port_from_any")]
    pub port: u16,
    pub user: String,
    #[serde(default)]
    pub password: String,
    pub database: String,
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}

impl fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}/{}", self.user, self.host, self.port, self.database)
    }
}

/// One column of an external table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    pub name: String,
    pub data_type: String,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn port_from_any<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawPort {
        Number(u16),
        Text(String),
    }

    match RawPort::deserialize(deserializer)? {
        RawPort::Number(port) => Ok(port),
        RawPort::Text(text) if text.trim().is_empty() => Ok(DEFAULT_PORT),
        RawPort::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid port {text:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn port_accepts_string_number_or_absence() {
        let base = json!({"host": "db", "user": "u", "password": "p", "database": "gis"});

        let mut with_text = base.clone();
        with_text["port"] = json!("6543");
        let cfg: ConnectionConfig = serde_json::from_value(with_text).unwrap();
        assert_eq!(cfg.port, 6543);

        let mut with_number = base.clone();
        with_number["port"] = json!(15432);
        let cfg: ConnectionConfig = serde_json::from_value(with_number).unwrap();
        assert_eq!(cfg.port, 15432);

        let cfg: ConnectionConfig = serde_json::from_value(base).unwrap();
        assert_eq!(cfg.port, DEFAULT_PORT);
    }

    #[test]
    fn debug_output_hides_password() {
        let cfg: ConnectionConfig = serde_json::from_value(
            json!({"host": "db", "user": "u", "password": "hunter2", "database": "gis"}),
        )
        .unwrap();
        let printed = format!("{cfg:?} {cfg}");
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn column_descriptor_uses_camel_case() {
        let column = ColumnDescriptor {
            name: "lat".into(),
            data_type: "double precision".into(),
        };
        assert_eq!(
            serde_json::to_value(column).unwrap(),
            json!({"name": "lat", "dataType": "double precision"})
        );
    }
}
