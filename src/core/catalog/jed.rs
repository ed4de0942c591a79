//! JED JSON documents consumed by JavaScript i18n runtimes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Metadata stored under the empty key of a domain's messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JedMetadata {
    pub domain: String,
    pub lang: String,
    #[serde(rename = "plural-forms")]
    pub plural_forms: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JedLocaleData {
    #[serde(rename = "")]
    pub metadata: JedMetadata,
    /// `msgid` or `msgctxt\u{4}msgid` to translations.
    #[serde(flatten)]
    pub messages: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JedDocument {
    pub domain: String,
    pub locale_data: BTreeMap<String, JedLocaleData>,
}

impl JedDocument {
    pub fn messages(&self) -> Option<&BTreeMap<String, Vec<String>>> {
        self.locale_data.get(&self.domain).map(|data| &data.messages)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
