//! The four console workflows.
//!
//! Each workflow is a straight chain of navigate / wait / act steps. A failed
//! step aborts the workflow with its error; steps already performed on the
//! console are not undone.

use crate::browser::session::{BrowserSession, ElementHandle, Key, Locator};
use crate::config::schema::ConfirmationMode;
use crate::error::{Result, VwsError};
use crate::workflow::locators::{Locators, DATABASES_PATH, LICENSES_PATH, LOGIN_PATH};
use crate::workflow::retry::RetryOutcome;
use crate::workflow::schema::{Credentials, DatabaseCredentialSet, WorkflowSettings};
use crate::workflow::wait::{not_found_after, wait_for_element, wait_until};

/// Drives the developer console through one browser session.
///
/// The engine borrows the session for its whole lifetime; workflows are
/// awaited one after another.
pub struct WorkflowEngine<'a, S: BrowserSession + ?Sized> {
    session: &'a S,
    settings: WorkflowSettings,
    locators: Locators,
}

impl<'a, S: BrowserSession + ?Sized> WorkflowEngine<'a, S> {
    pub fn new(session: &'a S, settings: WorkflowSettings) -> Self {
        Self {
            session,
            settings,
            locators: Locators::default(),
        }
    }

    /// Use a different locator table, e.g. for a restyled console.
    pub fn with_locators(mut self, locators: Locators) -> Self {
        self.locators = locators;
        self
    }

    pub fn settings(&self) -> &WorkflowSettings {
        &self.settings
    }

    pub fn locators(&self) -> &Locators {
        &self.locators
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url, path)
    }

    async fn wait_for(&self, locator: &Locator) -> Result<ElementHandle> {
        wait_for_element(
            self.session,
            locator,
            self.settings.wait_timeout,
            self.settings.poll_interval,
        )
        .await
    }

    /// Click `element` under the retry policy until `effect` is present.
    async fn click_until(&self, label: &str, element: &ElementHandle, effect: &Locator) -> RetryOutcome {
        let session = self.session;
        self.settings
            .click_retry
            .retry(
                label,
                move || session.click(element),
                move || async move {
                    match session.find_element(effect).await {
                        Ok(found) => {
                            discard(session, &found).await;
                            true
                        }
                        Err(_) => false,
                    }
                },
            )
            .await
    }

    /// Log in with the given credentials. Succeeds once the post-login
    /// marker is present.
    pub async fn log_in(&self, credentials: &Credentials) -> Result<()> {
        tracing::info!("Logging in as {}", credentials.email_address());
        self.session.navigate(&self.url(LOGIN_PATH)).await?;

        let email = self.session.find_element(&self.locators.login_email).await?;
        self.session
            .send_keys(&email, credentials.email_address())
            .await?;

        let password = self.session.find_element(&self.locators.login_password).await?;
        self.session.send_keys(&password, credentials.password()).await?;
        self.session.press_key(&password, Key::Enter).await?;

        self.wait_for(&self.locators.post_login_marker).await?;
        tracing::info!("Logged in");
        Ok(())
    }

    /// Create a development license called `license_name`.
    ///
    /// The console does not reject duplicate names and neither does this.
    pub async fn create_license(&self, license_name: &str) -> Result<()> {
        tracing::info!("Creating license {}", license_name);
        self.session.navigate(&self.url(LICENSES_PATH)).await?;

        let trigger = self.wait_for(&self.locators.create_license_trigger).await?;
        self.click_until(
            "Click get development key",
            &trigger,
            &self.locators.license_name_input,
        )
        .await;

        let name_input = self.wait_for(&self.locators.license_name_input).await?;
        self.session.send_keys(&name_input, license_name).await?;

        let agree = self.session.find_element(&self.locators.agree_terms).await?;
        self.session.submit(&agree).await?;

        if self.settings.confirmation == ConfirmationMode::ReadBack {
            self.session.navigate(&self.url(LICENSES_PATH)).await?;
            self.confirm_listed(&self.locators.listed_entry(license_name))
                .await?;
        }

        tracing::info!("Created license {}", license_name);
        Ok(())
    }

    /// Create a cloud database called `database_name` attached to an
    /// existing license.
    pub async fn create_database(&self, database_name: &str, license_name: &str) -> Result<()> {
        tracing::info!(
            "Creating database {} with license {}",
            database_name,
            license_name
        );
        self.session.navigate(&self.url(DATABASES_PATH)).await?;

        let trigger = self.wait_for(&self.locators.add_database_trigger).await?;
        self.click_until(
            "Click add database",
            &trigger,
            &self.locators.database_name_input,
        )
        .await;

        let name_input = self.wait_for(&self.locators.database_name_input).await?;
        self.session.send_keys(&name_input, database_name).await?;

        let cloud = self
            .session
            .find_element(&self.locators.cloud_type_option)
            .await?;
        self.session.click(&cloud).await?;

        let option = self.wait_for_license_option(license_name).await?;
        self.session.click(&option).await?;

        let create = self
            .session
            .find_element(&self.locators.create_database_confirm)
            .await?;
        self.session.click(&create).await?;

        if self.settings.confirmation == ConfirmationMode::ReadBack {
            self.session.navigate(&self.url(DATABASES_PATH)).await?;
            self.sort_by_recency().await?;
            self.confirm_listed(&self.locators.database_cell(database_name))
                .await?;
        }

        tracing::info!("Created database {}", database_name);
        Ok(())
    }

    /// The license dropdown fills in asynchronously after the cloud type is
    /// picked. The dropdown is looked up again on every poll because it may
    /// be re-rendered while loading.
    async fn wait_for_license_option(&self, license_name: &str) -> Result<ElementHandle> {
        let session = self.session;
        let dropdown = &self.locators.license_dropdown;
        let option = self.locators.license_option(license_name);
        let option_ref = &option;

        wait_until(
            &option.to_string(),
            self.settings.dropdown_timeout,
            self.settings.poll_interval,
            move || async move {
                let parent = session.find_element(dropdown).await?;
                let found = session.find_child(&parent, option_ref).await;
                discard(session, &parent).await;
                found.map(Some)
            },
        )
        .await
        .map_err(|e| not_found_after(e, &option))
    }

    /// Read the access keys of `database_name`.
    ///
    /// Only the first page of the databases list is searched.
    pub async fn get_database_details(&self, database_name: &str) -> Result<DatabaseCredentialSet> {
        tracing::info!("Fetching details of database {}", database_name);
        self.session.navigate(&self.url(DATABASES_PATH)).await?;
        self.sort_by_recency().await?;

        let cell = self
            .wait_for(&self.locators.database_cell(database_name))
            .await?;
        self.click_until(
            "Click database cell",
            &cell,
            &self.locators.access_keys_tab,
        )
        .await;

        let tab = self.wait_for(&self.locators.access_keys_tab).await?;
        self.session.click(&tab).await?;

        let [client_access_key, client_secret_key, server_access_key, server_secret_key] =
            self.read_access_keys().await?;

        tracing::info!("Read access keys of database {}", database_name);
        Ok(DatabaseCredentialSet::new(
            database_name,
            server_access_key,
            server_secret_key,
            client_access_key,
            client_secret_key,
        ))
    }

    /// The databases list is not sorted by recency on load; toggling the
    /// sort twice brings the newest databases onto the first page.
    async fn sort_by_recency(&self) -> Result<()> {
        let sort = self.wait_for(&self.locators.sort_by_last_modified).await?;
        self.session.click(&sort).await?;
        // FIXME: fixed pause, the list exposes no signal for "re-sorted"
        tokio::time::sleep(self.settings.sort_settle).await;
        self.session.click(&sort).await
    }

    /// The key fields render empty right after the tab switch; wait until
    /// all four carry text.
    async fn read_access_keys(&self) -> Result<[String; 4]> {
        let session = self.session;
        let fields = [
            &self.locators.client_access_key,
            &self.locators.client_secret_key,
            &self.locators.server_access_key,
            &self.locators.server_secret_key,
        ];

        wait_until(
            "database access keys",
            self.settings.key_settle_timeout,
            self.settings.poll_interval,
            move || async move {
                let mut values: [String; 4] = Default::default();
                for (value, locator) in values.iter_mut().zip(fields) {
                    let element = session.find_element(locator).await?;
                    let text = session.text(&element).await;
                    discard(session, &element).await;
                    let text = text?;
                    if text.is_empty() {
                        return Ok(None);
                    }
                    *value = text;
                }
                Ok::<_, VwsError>(Some(values))
            },
        )
        .await
    }

    async fn confirm_listed(&self, entry: &Locator) -> Result<()> {
        let found = self.wait_for(entry).await?;
        discard(self.session, &found).await;
        tracing::info!("Confirmed {} is listed", entry);
        Ok(())
    }
}

/// Release a handle that was only needed for a probe.
async fn discard<S: BrowserSession + ?Sized>(session: &S, element: &ElementHandle) {
    if let Err(e) = session.release(element).await {
        tracing::debug!("Failed to release {}: {}", element.locator, e);
    }
}
