use serde::Deserialize;
use serde_json::{Map, Value};

/// A tool call the model asked for
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    GetWeather {
        #[serde(default)]
        city: Option<String>,
    },
    FetchUrl {
        #[serde(default)]
        url: Option<String>,
        #[serde(default)]
        method: Option<String>,
        #[serde(default)]
        data: Option<Value>,
    },
    ManageUsers {
        #[serde(default)]
        method: Option<String>,
        #[serde(default)]
        user_id: Option<UserRef>,
        #[serde(default)]
        data: Option<Value>,
    },
}

/// Models emit ids both as numbers and as strings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum UserRef {
    Id(i64),
    Text(String),
}

impl UserRef {
    /// Path segment for the id; `None` for ids that mean "no id"
    pub fn path_segment(&self) -> Option<String> {
        match self {
            UserRef::Id(0) => None,
            UserRef::Id(id) => Some(id.to_string()),
            UserRef::Text(s) if s.trim().is_empty() => None,
            UserRef::Text(s) => Some(s.trim().to_string()),
        }
    }
}

impl Action {
    /// Interpret a parsed directive; unknown actions or malformed fields fail
    pub fn from_directive(directive: Map<String, Value>) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(directive))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Result<Action, serde_json::Error> {
        match value {
            Value::Object(map) => Action::from_directive(map),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_get_weather() {
        let action = parse(json!({"action": "get_weather", "city": "Lima"})).unwrap();
        assert_eq!(
            action,
            Action::GetWeather {
                city: Some("Lima".to_string())
            }
        );
    }

    #[test]
    fn test_fetch_url_defaults() {
        let action = parse(json!({"action": "fetch_url", "url": "https://example.com"})).unwrap();
        assert_eq!(
            action,
            Action::FetchUrl {
                url: Some("https://example.com".to_string()),
                method: None,
                data: None,
            }
        );
    }

    #[test]
    fn test_manage_users_accepts_numeric_and_string_ids() {
        let numeric = parse(json!({"action": "manage_users", "method": "GET", "user_id": 4})).unwrap();
        let text = parse(json!({"action": "manage_users", "method": "GET", "user_id": "4"})).unwrap();

        for action in [numeric, text] {
            match action {
                Action::ManageUsers { user_id, .. } => {
                    assert_eq!(user_id.and_then(|u| u.path_segment()), Some("4".to_string()));
                }
                other => panic!("unexpected action: {other:?}"),
            }
        }
    }

    #[test]
    fn test_empty_ids_mean_collection() {
        assert_eq!(UserRef::Id(0).path_segment(), None);
        assert_eq!(UserRef::Text(" ".to_string()).path_segment(), None);
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        assert!(parse(json!({"action": "launch_rockets"})).is_err());
        assert!(parse(json!({"city": "Lima"})).is_err());
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let action = parse(json!({"action": "get_weather", "city": "Lima", "units": "metric"})).unwrap();
        assert!(matches!(action, Action::GetWeather { .. }));
    }
}
