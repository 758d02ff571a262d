use crate::{
    config::Webhook,
    content::{ContentStore, PublishMode},
};
use ring::constant_time;
use serde_json::value::RawValue;
use tracing::{info, instrument, warn};
use uuid::Uuid;

mod error;

pub use error::Error;
pub(crate) use error::Result;

/// The result of a successfully handled deployment notification
#[derive(Debug)]
pub struct Receipt {
    pub key: Uuid,
    pub cultures: Vec<String>,
    pub descendants: usize,
}

/// Store a deployment notification on the configured content item and publish it.
///
/// The payload is written verbatim into the configured property. Unless
/// `atomic_publish` is enabled, the write is committed even when publishing fails.
#[instrument(skip_all, fields(alias = %settings.property_alias))]
pub async fn receive(
    store: &dyn ContentStore,
    settings: &Webhook,
    payload: &RawValue,
    token: Option<&str>,
) -> Result<Receipt> {
    authorize(token, &settings.secret)?;

    let key = Uuid::parse_str(settings.content_key.trim()).map_err(|_| {
        warn!(key = %settings.content_key, "configured content key is invalid");
        Error::InvalidContentKey
    })?;

    let mut content = store.find(key).await?.ok_or(Error::NotFound)?;

    let mut scope = store.scope().await?;
    content.set_value(&settings.property_alias, payload.get());
    scope.save(&content).await?;

    let cultures = content.publishable_cultures();
    let result = scope
        .publish(&content, &cultures, PublishMode::AllLevels)
        .await?;

    if result.is_success() || !settings.atomic_publish {
        scope.complete().await?;
    }

    if !result.is_success() {
        warn!(%key, status = %result.status, atomic = settings.atomic_publish, "publish failed");
        return Err(Error::PublishFailed(result.status));
    }

    info!(%key, ?cultures, descendants = result.descendants, "published deployment data");
    Ok(Receipt {
        key,
        cultures,
        descendants: result.descendants,
    })
}

/// Ensure the provided token matches the shared secret
pub fn authorize(token: Option<&str>, secret: &str) -> Result<()> {
    let token = token
        .filter(|t| !t.trim().is_empty())
        .ok_or(Error::Unauthorized)?;
    if secret.trim().is_empty() {
        return Err(Error::Unauthorized);
    }

    constant_time::verify_slices_are_equal(token.as_bytes(), secret.as_bytes())
        .map_err(|_| Error::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::{authorize, receive, Error};
    use crate::{
        config::Webhook,
        content::{
            self, Content, ContentStore, PublishMode, PublishResult, PublishStatus, Scope,
            SledStore,
        },
    };
    use async_trait::async_trait;
    use serde_json::value::RawValue;
    use std::sync::{Arc, Mutex};
    use uuid::Uuid;

    #[derive(Debug, PartialEq)]
    enum Call {
        Find(Uuid),
        Scope,
        Save,
        Publish(Vec<String>),
        Complete,
    }

    type Calls = Arc<Mutex<Vec<Call>>>;

    /// Records every interaction with the underlying store
    struct Recording {
        inner: SledStore,
        calls: Calls,
    }

    struct RecordingScope {
        inner: Box<dyn Scope>,
        calls: Calls,
    }

    #[async_trait]
    impl ContentStore for Recording {
        async fn find(&self, key: Uuid) -> content::Result<Option<Content>> {
            self.calls.lock().unwrap().push(Call::Find(key));
            self.inner.find(key).await
        }

        async fn scope(&self) -> content::Result<Box<dyn Scope>> {
            self.calls.lock().unwrap().push(Call::Scope);
            Ok(Box::new(RecordingScope {
                inner: self.inner.scope().await?,
                calls: self.calls.clone(),
            }))
        }
    }

    #[async_trait]
    impl Scope for RecordingScope {
        async fn save(&mut self, content: &Content) -> content::Result<()> {
            self.calls.lock().unwrap().push(Call::Save);
            self.inner.save(content).await
        }

        async fn publish(
            &mut self,
            content: &Content,
            cultures: &[String],
            mode: PublishMode,
        ) -> content::Result<PublishResult> {
            assert_eq!(PublishMode::AllLevels, mode);
            self.calls
                .lock()
                .unwrap()
                .push(Call::Publish(cultures.to_vec()));
            self.inner.publish(content, cultures, mode).await
        }

        async fn complete(self: Box<Self>) -> content::Result<()> {
            self.calls.lock().unwrap().push(Call::Complete);
            self.inner.complete().await
        }
    }

    fn recording(items: &[Content]) -> (Recording, Calls) {
        let inner = content::temporary_store();
        inner.import(items).expect("failed to import content");

        let calls = Calls::default();
        let store = Recording {
            inner,
            calls: calls.clone(),
        };
        (store, calls)
    }

    fn settings(key: &Uuid) -> Webhook {
        Webhook {
            secret: "the-amazing-test-secret".into(),
            content_key: key.to_string(),
            property_alias: "deploymentData".into(),
            atomic_publish: false,
        }
    }

    fn payload(raw: &str) -> Box<RawValue> {
        RawValue::from_string(raw.to_owned()).expect("invalid JSON payload")
    }

    #[test]
    fn validate_token() {
        let secret = "the-amazing-test-secret";

        assert!(authorize(Some(secret), secret).is_ok());
        for token in [
            None,
            Some(""),
            Some("   "),
            Some("The-Amazing-Test-Secret"),
            Some("the-amazing-test-secret "),
            Some("the-amazing-test"),
        ] {
            assert!(
                matches!(authorize(token, secret), Err(Error::Unauthorized)),
                "{:?} should be rejected",
                token
            );
        }
        assert!(matches!(authorize(Some(" "), " "), Err(Error::Unauthorized)));
    }

    #[tokio::test]
    async fn rejected_tokens_do_not_touch_content() {
        let item = content::item("Deployments", None);
        let (store, calls) = recording(&[item.clone()]);
        let cfg = settings(&item.key);

        for token in [None, Some(""), Some("THE-AMAZING-TEST-SECRET"), Some("nope")] {
            let result = receive(&store, &cfg, &payload("{}"), token).await;
            assert!(matches!(result, Err(Error::Unauthorized)));
        }

        assert!(calls.lock().unwrap().is_empty());
        let stored = store.inner.find(item.key).await.unwrap().unwrap();
        assert_eq!(None, stored.value("deploymentData"));
    }

    #[tokio::test]
    async fn invalid_content_key_is_rejected_before_lookup() {
        let (store, calls) = recording(&[]);
        let mut cfg = settings(&Uuid::new_v4());
        cfg.content_key = "not-a-uuid".into();

        let result = receive(&store, &cfg, &payload("{}"), Some(cfg.secret.as_str())).await;

        assert!(matches!(result, Err(Error::InvalidContentKey)));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_content_is_not_found() {
        let (store, calls) = recording(&[]);
        let key = Uuid::new_v4();
        let cfg = settings(&key);

        let result = receive(&store, &cfg, &payload("{}"), Some(cfg.secret.as_str())).await;

        assert!(matches!(result, Err(Error::NotFound)));
        assert_eq!(vec![Call::Find(key)], *calls.lock().unwrap());
    }

    #[tokio::test]
    async fn invariant_content_publishes_without_cultures() {
        let item = content::item("Deployments", None);
        let (store, calls) = recording(&[item.clone()]);
        let cfg = settings(&item.key);
        let raw = r#"{ "deploymentId" : "abc123",  "status": "completed" }"#;

        let receipt = receive(&store, &cfg, &payload(raw), Some(cfg.secret.as_str()))
            .await
            .expect("webhook should succeed");

        assert_eq!(item.key, receipt.key);
        assert!(receipt.cultures.is_empty());
        assert_eq!(
            vec![
                Call::Find(item.key),
                Call::Scope,
                Call::Save,
                Call::Publish(Vec::new()),
                Call::Complete
            ],
            *calls.lock().unwrap()
        );

        let stored = store.inner.find(item.key).await.unwrap().unwrap();
        assert_eq!(Some(raw), stored.value("deploymentData"));
        let published = stored.published.expect("content should be published");
        assert_eq!(Some(&raw.to_string()), published.properties.get("deploymentData"));
    }

    #[tokio::test]
    async fn variant_content_publishes_available_cultures() {
        let mut item = content::item("Home", None);
        item.content_type.varies_by_culture = true;
        item.cultures = vec!["en-US".into(), "da-DK".into()];
        let (store, calls) = recording(&[item.clone()]);
        let cfg = settings(&item.key);

        let receipt = receive(&store, &cfg, &payload("[1, 2, 3]"), Some(cfg.secret.as_str()))
            .await
            .expect("webhook should succeed");

        let expected = vec!["en-US".to_string(), "da-DK".to_string()];
        assert_eq!(expected, receipt.cultures);
        assert!(calls.lock().unwrap().contains(&Call::Publish(expected)));
    }

    #[tokio::test]
    async fn publishes_descendants() {
        let item = content::item("Deployments", None);
        let child = content::item("Release notes", Some(item.key));
        let (store, _) = recording(&[item.clone(), child.clone()]);
        let cfg = settings(&item.key);

        let receipt = receive(&store, &cfg, &payload("{}"), Some(cfg.secret.as_str()))
            .await
            .expect("webhook should succeed");

        assert_eq!(1, receipt.descendants);
        let stored = store.inner.find(child.key).await.unwrap().unwrap();
        assert!(stored.published.is_some());
    }

    #[tokio::test]
    async fn failed_publish_still_persists_the_write() {
        let mut item = content::item("Deployments", None);
        item.trashed = true;
        let (store, calls) = recording(&[item.clone()]);
        let cfg = settings(&item.key);

        let result = receive(&store, &cfg, &payload(r#"{"n":1}"#), Some(cfg.secret.as_str())).await;

        assert!(matches!(
            result,
            Err(Error::PublishFailed(PublishStatus::Trashed))
        ));
        assert_eq!(Some(&Call::Complete), calls.lock().unwrap().last());

        let stored = store.inner.find(item.key).await.unwrap().unwrap();
        assert_eq!(Some(r#"{"n":1}"#), stored.value("deploymentData"));
        assert!(stored.published.is_none());
    }

    #[tokio::test]
    async fn atomic_publish_discards_the_write_on_failure() {
        let mut item = content::item("Deployments", None);
        item.trashed = true;
        let (store, calls) = recording(&[item.clone()]);
        let mut cfg = settings(&item.key);
        cfg.atomic_publish = true;

        let result = receive(&store, &cfg, &payload(r#"{"n":1}"#), Some(cfg.secret.as_str())).await;

        assert!(matches!(result, Err(Error::PublishFailed(_))));
        assert!(!calls.lock().unwrap().contains(&Call::Complete));

        let stored = store.inner.find(item.key).await.unwrap().unwrap();
        assert_eq!(None, stored.value("deploymentData"));
    }
}
