//! Outbound command parameters and their wire encoding.

use std::collections::BTreeMap;
use std::fmt;

/// A single request parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Str(String),
    Bool(bool),
    Int(i64),
}

impl ParamValue {
    /// Wire form: booleans as `Y`/`N`, integers in decimal.
    pub fn encode(&self) -> String {
        match self {
            Self::Str(s) => s.clone(),
            Self::Bool(true) => "Y".to_string(),
            Self::Bool(false) => "N".to_string(),
            Self::Int(i) => i.to_string(),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        Self::Str(value.clone())
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

pub type Params = BTreeMap<String, ParamValue>;

/// Build a [`Params`] map: `params! { "sld" => "example", "records" => -1 }`.
#[macro_export]
macro_rules! params {
    () => { $crate::request::Params::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut params = $crate::request::Params::new();
        $(params.insert(($key).to_string(), $crate::request::ParamValue::from($value));)+
        params
    }};
}

/// One API command as the caller asked for it, credentials excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    url: String,
    command: String,
    params: Params,
}

impl Request {
    /// The `command` parameter always reflects `command`, whatever the
    /// caller put in `params`.
    pub fn new(url: &str, command: &str, mut params: Params) -> Self {
        params.insert("command".to_string(), ParamValue::from(command));
        Self {
            url: url.to_string(),
            command: command.to_string(),
            params,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    /// Encoded query pairs with `extra` merged over the caller params.
    ///
    /// Panics when a name or value is not ASCII: the API only accepts
    /// punycoded input, so this is a caller bug.
    pub fn query(&self, extra: &[(&str, String)]) -> Vec<(String, String)> {
        let mut merged: BTreeMap<String, String> = self
            .params
            .iter()
            .map(|(k, v)| (k.clone(), v.encode()))
            .collect();
        for (k, v) in extra {
            merged.insert((*k).to_string(), v.clone());
        }
        for (k, v) in &merged {
            assert!(
                k.is_ascii() && v.is_ascii(),
                "non-ASCII request parameter {k}={v:?}"
            );
        }
        merged.into_iter().collect()
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (idx, (k, v)) in self.params.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{k}={}", v.encode())?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_overrides_caller_value() {
        let req = Request::new(
            "https://api.example/command.php",
            "domain_list",
            params! { "command" => "domain_del", "records" => -1 },
        );
        assert_eq!(req.command(), "domain_list");
        assert_eq!(req.get("command"), Some(&ParamValue::from("domain_list")));
        assert_eq!(req.get("records"), Some(&ParamValue::Int(-1)));
    }

    #[test]
    fn values_are_encoded_for_the_wire() {
        let req = Request::new(
            "https://api.example/command.php",
            "autorenew",
            params! { "autorenew" => true, "lock" => false, "sld" => "example", "cart_id" => 42 },
        );
        let query = req.query(&[("apiuser", "USER".to_string())]);
        assert_eq!(
            query,
            vec![
                ("apiuser".to_string(), "USER".to_string()),
                ("autorenew".to_string(), "Y".to_string()),
                ("cart_id".to_string(), "42".to_string()),
                ("command".to_string(), "autorenew".to_string()),
                ("lock".to_string(), "N".to_string()),
                ("sld".to_string(), "example".to_string()),
            ]
        );
    }

    #[test]
    #[should_panic(expected = "non-ASCII")]
    fn non_ascii_values_are_rejected() {
        let req =
            Request::new("https://api.example/", "domain_check", params! { "sld" => "bücher" });
        req.query(&[]);
    }

    #[test]
    fn display_lists_params_in_order() {
        let req = Request::new(
            "https://api.example/",
            "domain_inf",
            params! { "tld" => "nl", "sld" => "example" },
        );
        assert_eq!(req.to_string(), "{command=domain_inf, sld=example, tld=nl}");
    }
}
