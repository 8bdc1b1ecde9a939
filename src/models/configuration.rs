use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigCategory {
    Ram,
    Storage,
    Os,
}

impl ConfigCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigCategory::Ram => "ram",
            ConfigCategory::Storage => "storage",
            ConfigCategory::Os => "os",
        }
    }

    /// Accepts the tool type tags written by older clients (`ram-8`,
    /// `hdd-500`, `os-linux`) as well as the plain category names.
    pub fn from_tool_type(s: &str) -> Option<Self> {
        let s = s.to_lowercase();
        if s.contains("ram") {
            Some(ConfigCategory::Ram)
        } else if s.contains("hdd") || s.contains("storage") {
            Some(ConfigCategory::Storage)
        } else if s.contains("os") {
            Some(ConfigCategory::Os)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ConfigOption {
    pub id: &'static str,
    pub category: ConfigCategory,
    pub value: &'static str,
    pub label: &'static str,
}

const fn opt(
    id: &'static str,
    category: ConfigCategory,
    value: &'static str,
    label: &'static str,
) -> ConfigOption {
    ConfigOption {
        id,
        category,
        value,
        label,
    }
}

pub const CONFIG_OPTIONS: &[ConfigOption] = &[
    opt("ram-4", ConfigCategory::Ram, "4", "4GB"),
    opt("ram-8", ConfigCategory::Ram, "8", "8GB"),
    opt("ram-16", ConfigCategory::Ram, "16", "16GB"),
    opt("ram-32", ConfigCategory::Ram, "32", "32GB"),
    opt("ram-64", ConfigCategory::Ram, "64", "64GB"),
    opt("hdd-320", ConfigCategory::Storage, "320", "320GB"),
    opt("hdd-500", ConfigCategory::Storage, "500", "500GB"),
    opt("hdd-1000", ConfigCategory::Storage, "1", "1TB"),
    opt("hdd-2000", ConfigCategory::Storage, "2", "2TB"),
    opt("os-windows", ConfigCategory::Os, "windows", "Windows"),
    opt("os-linux", ConfigCategory::Os, "linux", "Linux"),
    opt("os-macos", ConfigCategory::Os, "macos", "MacOS"),
];

pub fn options_for(category: ConfigCategory) -> impl Iterator<Item = &'static ConfigOption> {
    CONFIG_OPTIONS
        .iter()
        .filter(move |option| option.category == category)
}

/// Resolves a selection by option id, value or label within one category.
pub fn find_option(category: ConfigCategory, selection: &str) -> Option<&'static ConfigOption> {
    let selection = selection.trim();
    options_for(category).find(|option| {
        option.id.eq_ignore_ascii_case(selection)
            || option.value.eq_ignore_ascii_case(selection)
            || option.label.eq_ignore_ascii_case(selection)
    })
}

/// The workstation choices carried by a draft, stored as display labels.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Configuration {
    pub ram: Option<String>,
    pub storage: Option<String>,
    pub os: Option<String>,
}

impl Configuration {
    pub fn set(&mut self, category: ConfigCategory, label: Option<String>) {
        match category {
            ConfigCategory::Ram => self.ram = label,
            ConfigCategory::Storage => self.storage = label,
            ConfigCategory::Os => self.os = label,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_option_by_any_identifier() {
        let by_id = find_option(ConfigCategory::Ram, "ram-16").unwrap();
        let by_value = find_option(ConfigCategory::Ram, "16").unwrap();
        let by_label = find_option(ConfigCategory::Ram, "16gb").unwrap();
        assert_eq!(by_id, by_value);
        assert_eq!(by_value, by_label);
        assert_eq!(by_id.label, "16GB");
    }

    #[test]
    fn test_find_option_respects_category() {
        // "1" is the 1TB storage value, not a RAM size
        assert!(find_option(ConfigCategory::Ram, "1").is_none());
        assert_eq!(
            find_option(ConfigCategory::Storage, "1").map(|o| o.label),
            Some("1TB")
        );
    }

    #[test]
    fn test_category_from_tool_type() {
        assert_eq!(ConfigCategory::from_tool_type("ram-8"), Some(ConfigCategory::Ram));
        assert_eq!(ConfigCategory::from_tool_type("hdd-500"), Some(ConfigCategory::Storage));
        assert_eq!(ConfigCategory::from_tool_type("os-linux"), Some(ConfigCategory::Os));
        assert_eq!(ConfigCategory::from_tool_type("monitor"), None);
    }

    #[test]
    fn test_configuration_set() {
        let mut config = Configuration::default();
        config.set(ConfigCategory::Ram, Some("8GB".to_string()));
        config.set(ConfigCategory::Os, Some("Linux".to_string()));
        config.set(ConfigCategory::Os, None);
        assert_eq!(config.ram.as_deref(), Some("8GB"));
        assert_eq!(config.storage, None);
        assert_eq!(config.os, None);
    }
}
