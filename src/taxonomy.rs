use schemars::JsonSchema;
use schemars::r#gen::SchemaGenerator;
use schemars::schema::Schema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Shared behavior taxonomy every detector label is unified into.
///
/// The derived ordering follows declaration order, with pass-through labels
/// last (sorted by text). Reports and advisories iterate in this order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CanonicalClass {
    Seatbelt,
    Drinking,
    Smoking,
    PhoneUsage,
    Drowsy,
    Eating,
    Distracted,
    SafeDriving,
    /// A label the mapping table does not know, kept verbatim.
    Other(String),
}

impl CanonicalClass {
    pub const DECLARED: &'static [CanonicalClass] = &[
        CanonicalClass::Seatbelt,
        CanonicalClass::Drinking,
        CanonicalClass::Smoking,
        CanonicalClass::PhoneUsage,
        CanonicalClass::Drowsy,
        CanonicalClass::Eating,
        CanonicalClass::Distracted,
        CanonicalClass::SafeDriving,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            CanonicalClass::Seatbelt => "Seatbelt",
            CanonicalClass::Drinking => "Drinking",
            CanonicalClass::Smoking => "Smoking",
            CanonicalClass::PhoneUsage => "Phone Usage",
            CanonicalClass::Drowsy => "Drowsy",
            CanonicalClass::Eating => "Eating",
            CanonicalClass::Distracted => "Distracted",
            CanonicalClass::SafeDriving => "Safe Driving",
            CanonicalClass::Other(label) => label,
        }
    }

    /// Parse a canonical display name. Anything else becomes `Other`.
    pub fn from_name(name: &str) -> Self {
        Self::DECLARED
            .iter()
            .find(|class| class.as_str() == name)
            .cloned()
            .unwrap_or_else(|| CanonicalClass::Other(name.to_string()))
    }
}

impl fmt::Display for CanonicalClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CanonicalClass {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CanonicalClass {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_name(&name))
    }
}

impl JsonSchema for CanonicalClass {
    fn schema_name() -> String {
        "CanonicalClass".to_owned()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        String::json_schema(generator)
    }
}

/// Detector label to canonical class lookup, shared by all sources.
///
/// Labels missing from the table pass through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassMapping {
    table: BTreeMap<String, CanonicalClass>,
}

impl Default for ClassMapping {
    fn default() -> Self {
        use CanonicalClass::*;

        let table = [
            ("Cigarette", Smoking),
            ("Smoking", Smoking),
            ("Drinking", Drinking),
            ("Eating", Eating),
            ("Phone", PhoneUsage),
            ("PhoneUse", PhoneUsage),
            ("Seatbelt", Seatbelt),
            ("Distracted", Distracted),
            ("Drowsy", Drowsy),
            ("SafeDriving", SafeDriving),
        ]
        .into_iter()
        .map(|(label, class)| (label.to_string(), class))
        .collect();

        Self { table }
    }
}

impl ClassMapping {
    pub fn new(table: BTreeMap<String, CanonicalClass>) -> Self {
        Self { table }
    }

    pub fn unify(&self, label: &str) -> CanonicalClass {
        match self.table.get(label) {
            Some(class) => class.clone(),
            None => CanonicalClass::from_name(label),
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &CanonicalClass)> {
        self.table.iter().map(|(label, class)| (label.as_str(), class))
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
