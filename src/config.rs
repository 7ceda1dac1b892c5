//! Compile-time defaults for the forge client, change list and overlay layers.

use serde::{Deserialize, Serialize};

pub use crate::preview::overlay::LayerVisibility;

/// GitHub REST API v3 root.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Key the access token is stored under in the extension's local storage.
pub const CREDENTIAL_KEY: &str = "gtk";

/// Top-level settings bundle.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
	pub forge: ForgeSettings,
	pub change_list: ChangeListSettings,
	pub layers: LayerVisibility,
}

/// Forge client settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForgeSettings {
	pub api_url: String,
	/// Page size requested from list endpoints.
	pub per_page: u32,
}

impl Default for ForgeSettings {
	fn default() -> Self {
		Self {
			api_url: DEFAULT_API_URL.to_string(),
			per_page: 300,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChangeListSettings {
	pub page_size: usize,
}

impl Default for ChangeListSettings {
	fn default() -> Self {
		Self { page_size: 10 }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let settings = Settings::default();
		assert_eq!(settings.forge.api_url, "https://api.github.com");
		assert_eq!(settings.forge.per_page, 300);
		assert_eq!(settings.change_list.page_size, 10);
		assert!(settings.layers.added);
		assert!(!settings.layers.layout_changed);
	}
}
