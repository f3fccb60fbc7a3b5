use serde::Serialize;
use std::collections::BTreeMap;

/// Client options accepted by the installation proxy request functions.
///
/// Keys the struct does not model can be passed through
/// `additional_options`. Callers needing richer values can pass any
/// `Serialize` type to the client verbs instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InstallOptions {
    #[serde(rename = "SkipUninstall", skip_serializing_if = "Option::is_none")]
    pub skip_uninstall: Option<bool>,
    #[serde(rename = "ApplicationSINF", skip_serializing_if = "Option::is_none")]
    pub application_sinf: Option<Vec<u8>>,
    #[serde(rename = "iTunesMetadata", skip_serializing_if = "Option::is_none")]
    pub itunes_metadata: Option<Vec<u8>>,
    /// `"User"`, `"System"` or `"Any"` for browse and lookup.
    #[serde(rename = "ApplicationType", skip_serializing_if = "Option::is_none")]
    pub application_type: Option<String>,
    #[serde(rename = "ReturnAttributes", skip_serializing_if = "Option::is_none")]
    pub return_attributes: Option<Vec<String>>,
    #[serde(flatten)]
    pub additional_options: BTreeMap<String, String>,
}

impl InstallOptions {
    pub fn application_type(mut self, application_type: impl Into<String>) -> Self {
        self.application_type = Some(application_type.into());
        self
    }

    pub fn return_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.return_attributes = Some(attributes.into_iter().map(Into::into).collect());
        self
    }

    pub fn option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.additional_options.insert(key.into(), value.into());
        self
    }
}
