use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Catalog key of a signature (e.g., `nuxt`, `vuetify`, `@nuxtjs/pwa`).
///
/// Names are unique within their group and are what every classification
/// result reports.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignatureName(pub String);

impl SignatureName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SignatureName {
    fn from(value: &str) -> Self {
        SignatureName(value.to_string())
    }
}

impl fmt::Display for SignatureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The signature groups a catalog directory is made of.
///
/// Each kind maps to exactly one JSON file; `Vue` holds a single definition
/// while every other kind holds a name-keyed group.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum GroupKind {
    Vue,
    Frameworks,
    Uis,
    Plugins,
    NuxtMeta,
    NuxtModules,
}

impl GroupKind {
    pub const ALL: [GroupKind; 6] = [
        GroupKind::Vue,
        GroupKind::Frameworks,
        GroupKind::Uis,
        GroupKind::Plugins,
        GroupKind::NuxtMeta,
        GroupKind::NuxtModules,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GroupKind::Vue => "vue",
            GroupKind::Frameworks => "frameworks",
            GroupKind::Uis => "uis",
            GroupKind::Plugins => "plugins",
            GroupKind::NuxtMeta => "nuxt.meta",
            GroupKind::NuxtModules => "nuxt.modules",
        }
    }

    /// File holding this group inside a catalog directory.
    pub fn file_name(&self) -> String {
        format!("{}.json", self.as_str())
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        GroupKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| {
                let known = GroupKind::ALL.map(|kind| kind.as_str()).join(", ");
                format!("unknown signature group '{value}' (expected one of: {known})")
            })
    }
}

impl Serialize for GroupKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for GroupKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_kind_round_trips_through_json() {
        for kind in GroupKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json.trim_matches('"'), kind.as_str());
            let back: GroupKind = serde_json::from_str(&json).unwrap();
            assert_eq!(back, kind);
        }
    }

    #[test]
    fn unknown_group_kind_is_rejected() {
        let err = serde_json::from_str::<GroupKind>("\"nuxt.other\"").unwrap_err();
        assert!(err.to_string().contains("unknown signature group"));
        assert!("frameworks".parse::<GroupKind>().is_ok());
    }

    #[test]
    fn file_names_follow_catalog_layout() {
        assert_eq!(GroupKind::Vue.file_name(), "vue.json");
        assert_eq!(GroupKind::NuxtModules.file_name(), "nuxt.modules.json");
    }

    #[test]
    fn signature_name_is_transparent() {
        let name = SignatureName("@nuxtjs/pwa".to_string());
        let serialized = serde_json::to_string(&name).unwrap();
        assert_eq!(serialized, "\"@nuxtjs/pwa\"");
        let parsed: SignatureName = serde_json::from_str(&serialized).unwrap();
        assert_eq!(parsed, name);
        assert_eq!(name.to_string(), "@nuxtjs/pwa");
    }
}
