use serde::{Deserialize, Serialize};

/// Build configuration as listed by the host page.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct BuildType {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default, alias = "fullName")]
    pub full_name: String,
}

/// One `<option>` of the build configuration selector.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct BuildTypeOption {
    pub value: String,
    pub text: String,
}

impl BuildTypeOption {
    pub fn placeholder() -> Self {
        BuildTypeOption {
            value: String::new(),
            text: "-- Select build configuration --".to_string(),
        }
    }
}
