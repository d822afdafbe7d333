//! Typed access to the keys the gate keeps in a `tower_sessions::Session`.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tower_sessions::Session;

use crate::error::GateError;
use crate::flash::FlashMessage;
use crate::principal::PrincipalId;

/// Principal id of the logged-in user.
pub const USER_ID_KEY: &str = "user_id";
/// Locale picked with the `locale` query parameter.
pub const LOCALE_KEY: &str = "locale";
/// Path a browser was denied at, revisited after login.
pub const ORIGINAL_URI_KEY: &str = "original_uri";
/// Last bounce-back path.
pub const RETURN_TO_KEY: &str = "return_to";
/// Messages carried to the next request.
pub const FLASH_KEY: &str = "flash";

/// Wrapper over the per-client session giving each gate key a typed
/// accessor. Cloning is cheap and clones share the same session.
#[derive(Debug, Clone)]
pub struct GateSession {
    inner: Session,
}

impl GateSession {
    pub fn new(inner: Session) -> Self {
        Self { inner }
    }

    pub async fn principal_id(&self) -> Result<Option<PrincipalId>, GateError> {
        self.get(USER_ID_KEY).await
    }

    /// Replaces the session principal. `None` logs the session out.
    pub async fn set_principal_id(&self, id: Option<PrincipalId>) -> Result<(), GateError> {
        self.put(USER_ID_KEY, id).await
    }

    pub async fn locale(&self) -> Result<Option<String>, GateError> {
        self.get(LOCALE_KEY).await
    }

    pub async fn set_locale(&self, locale: Option<&str>) -> Result<(), GateError> {
        self.put(LOCALE_KEY, locale).await
    }

    pub async fn original_request_path(&self) -> Result<Option<String>, GateError> {
        self.get(ORIGINAL_URI_KEY).await
    }

    pub async fn set_original_request_path(&self, path: &str) -> Result<(), GateError> {
        self.put(ORIGINAL_URI_KEY, Some(path)).await
    }

    pub async fn take_original_request_path(&self) -> Result<Option<String>, GateError> {
        Ok(self.inner.remove(ORIGINAL_URI_KEY).await?)
    }

    pub async fn return_to(&self) -> Result<Option<String>, GateError> {
        self.get(RETURN_TO_KEY).await
    }

    pub async fn set_return_to(&self, path: &str) -> Result<(), GateError> {
        self.put(RETURN_TO_KEY, Some(path)).await
    }

    pub async fn take_return_to(&self) -> Result<Option<String>, GateError> {
        Ok(self.inner.remove(RETURN_TO_KEY).await?)
    }

    /// Queues a message for the next request.
    pub async fn push_flash(&self, message: FlashMessage) -> Result<(), GateError> {
        let mut pending: Vec<FlashMessage> = self.get(FLASH_KEY).await?.unwrap_or_default();
        pending.push(message);
        Ok(self.inner.insert(FLASH_KEY, pending).await?)
    }

    /// Removes and returns the queued messages.
    pub async fn take_flash(&self) -> Result<Vec<FlashMessage>, GateError> {
        Ok(self
            .inner
            .remove::<Vec<FlashMessage>>(FLASH_KEY)
            .await?
            .unwrap_or_default())
    }

    /// Issues a new session id, keeping the data. Called on login.
    pub async fn cycle_id(&self) -> Result<(), GateError> {
        Ok(self.inner.cycle_id().await?)
    }

    async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, GateError> {
        Ok(self.inner.get(key).await?)
    }

    // `None` removes the key rather than storing a null.
    async fn put<T: Serialize>(&self, key: &str, value: Option<T>) -> Result<(), GateError> {
        match value {
            Some(value) => self.inner.insert(key, value).await?,
            None => {
                self.inner.remove_value(key).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::memory_session;

    #[tokio::test]
    async fn principal_id_is_replaced_and_cleared() {
        let session = memory_session();
        session
            .set_principal_id(Some(PrincipalId::new(1)))
            .await
            .unwrap();
        session
            .set_principal_id(Some(PrincipalId::new(2)))
            .await
            .unwrap();
        assert_eq!(
            session.principal_id().await.unwrap(),
            Some(PrincipalId::new(2))
        );

        session.set_principal_id(None).await.unwrap();
        assert_eq!(session.principal_id().await.unwrap(), None);
    }

    #[tokio::test]
    async fn flash_is_consumed_once() {
        let session = memory_session();
        session
            .push_flash(FlashMessage::notice("one"))
            .await
            .unwrap();
        session
            .push_flash(FlashMessage::error("two"))
            .await
            .unwrap();

        let taken = session.take_flash().await.unwrap();
        assert_eq!(
            taken,
            vec![FlashMessage::notice("one"), FlashMessage::error("two")]
        );
        assert!(session.take_flash().await.unwrap().is_empty());
    }
}
