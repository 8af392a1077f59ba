//! Where things live on the developer console.
//!
//! Every page path and element the workflows touch is listed here, so a
//! markup change on the console is a change to this table only.

use crate::browser::session::Locator;

pub const LOGIN_PATH: &str = "/vui/auth/login";
pub const LICENSES_PATH: &str = "/vui/develop/licenses";
pub const DATABASES_PATH: &str = "/vui/develop/databases";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locators {
    pub login_email: Locator,
    pub login_password: Locator,
    /// Only rendered once logged in.
    pub post_login_marker: Locator,

    pub create_license_trigger: Locator,
    pub license_name_input: Locator,
    pub agree_terms: Locator,

    pub add_database_trigger: Locator,
    pub database_name_input: Locator,
    pub cloud_type_option: Locator,
    pub license_dropdown: Locator,
    /// Prepended to the normalized license name to form a dropdown option id.
    pub license_option_prefix: String,
    pub create_database_confirm: Locator,

    pub sort_by_last_modified: Locator,
    pub access_keys_tab: Locator,
    pub client_access_key: Locator,
    pub client_secret_key: Locator,
    pub server_access_key: Locator,
    pub server_secret_key: Locator,
}

impl Default for Locators {
    fn default() -> Self {
        Self {
            login_email: Locator::id("login_email"),
            login_password: Locator::id("login_password"),
            post_login_marker: Locator::id("get-development-key"),

            create_license_trigger: Locator::id("get-development-key"),
            license_name_input: Locator::id("license-name"),
            agree_terms: Locator::id("agree-terms-checkbox"),

            add_database_trigger: Locator::id("add-dialog-btn"),
            database_name_input: Locator::id("database-name"),
            cloud_type_option: Locator::id("cloud-radio-btn"),
            license_dropdown: Locator::id("cloud-license-dropdown"),
            license_option_prefix: "cloud-license-".to_string(),
            create_database_confirm: Locator::id("create-btn"),

            sort_by_last_modified: Locator::id("sort-by-last-modified-date"),
            access_keys_tab: Locator::link_text("Database Access Keys"),
            client_access_key: Locator::class_name("client-access-key"),
            client_secret_key: Locator::class_name("client-secret-key"),
            server_access_key: Locator::class_name("server-access-key"),
            server_secret_key: Locator::class_name("server-secret-key"),
        }
    }
}

impl Locators {
    /// Dropdown entry for a license. Option ids use hyphens where license
    /// names may use underscores.
    pub fn license_option(&self, license_name: &str) -> Locator {
        Locator::id(format!(
            "{}{}",
            self.license_option_prefix,
            license_name.replace('_', "-")
        ))
    }

    /// Row label of a database in the databases list. Exact match.
    pub fn database_cell(&self, database_name: &str) -> Locator {
        Locator::xpath(format!("//span[text()={}]", xpath_literal(database_name)))
    }

    /// Any element whose own text is exactly `name`.
    pub fn listed_entry(&self, name: &str) -> Locator {
        Locator::xpath(format!("//*[text()={}]", xpath_literal(name)))
    }
}

/// Quote `value` as an XPath 1.0 string literal. XPath has no escape
/// sequences, so a value holding both quote kinds becomes a `concat()`.
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{}'", value);
    }
    if !value.contains('"') {
        return format!("\"{}\"", value);
    }

    let parts: Vec<String> = value
        .split('\'')
        .map(|part| format!("'{}'", part))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::session::By;

    #[test]
    fn test_license_option_replaces_underscores() {
        let locators = Locators::default();
        assert_eq!(
            locators.license_option("my_license"),
            Locator::id("cloud-license-my-license")
        );
        assert_eq!(
            locators.license_option("a_b_c-d"),
            Locator::id("cloud-license-a-b-c-d")
        );
    }

    #[test]
    fn test_database_cell_is_exact_xpath() {
        let cell = Locators::default().database_cell("my_db");
        assert_eq!(cell.by, By::XPath);
        assert_eq!(cell.value, "//span[text()='my_db']");
    }

    #[test]
    fn test_xpath_literal_quoting() {
        assert_eq!(xpath_literal("plain"), "'plain'");
        assert_eq!(xpath_literal("it's"), "\"it's\"");
        assert_eq!(
            xpath_literal("it's \"x\""),
            "concat('it', \"'\", 's \"x\"')"
        );
        assert_eq!(xpath_literal(""), "''");
    }
}
