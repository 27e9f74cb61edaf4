//! Recording mock connector.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tollgate_core::{
    AssumeRoleRequest, ClientOptions, Connector, Error, PresignRequest, PresignSigner, Result,
    StsClient, TemporaryCredential,
};
use url::Url;
use uuid::Uuid;

use super::MockBehavior;

/// Everything a [`MockConnector`] has observed.
#[derive(Debug, Clone, Default)]
pub struct MockRecord {
    /// Options of every signer built, in order.
    pub signer_options: Vec<ClientOptions>,
    /// Options of every STS client built, in order.
    pub sts_options: Vec<ClientOptions>,
    /// Every presign request received.
    pub presign_requests: Vec<PresignRequest>,
    /// Every assume-role request received.
    pub assume_role_requests: Vec<AssumeRoleRequest>,
}

#[derive(Debug, Default)]
struct Shared {
    record: Mutex<MockRecord>,
    issued: AtomicU64,
}

/// Connector whose clients record their inputs and follow scripted behavior.
///
/// # Examples
///
/// ```rust,ignore
/// use tollgate_test::{MockBehavior, MockConnector};
///
/// let connector = MockConnector::new().with_sts(MockBehavior::reject("untrusted role"));
/// let remote = TosRemote::new(info, config, Arc::new(connector.clone()))?;
/// assert!(remote.sts_token().await.is_err());
/// assert_eq!(connector.record().assume_role_requests.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    presign: MockBehavior,
    sts: MockBehavior,
    build: Option<MockBehavior>,
    shared: Arc<Shared>,
}

impl MockConnector {
    /// Creates a connector whose clients always succeed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how signers answer presign requests.
    #[must_use]
    pub fn with_presign(mut self, behavior: MockBehavior) -> Self {
        self.presign = behavior;
        self
    }

    /// Sets how STS clients answer assume-role requests.
    #[must_use]
    pub fn with_sts(mut self, behavior: MockBehavior) -> Self {
        self.sts = behavior;
        self
    }

    /// Makes client construction itself fail with the given kind.
    #[must_use]
    pub fn failing_to_build(mut self, kind: tollgate_core::ErrorKind) -> Self {
        self.build = Some(MockBehavior::Fail(kind, "client construction failed".into()));
        self
    }

    /// Returns a snapshot of everything observed so far.
    pub fn record(&self) -> MockRecord {
        self.shared
            .record
            .lock()
            .map(|record| record.clone())
            .unwrap_or_default()
    }

    fn check_build(&self) -> Result<()> {
        match &self.build {
            Some(MockBehavior::Fail(kind, message)) => {
                Err(Error::new(*kind).with_message(message.clone()))
            }
            _ => Ok(()),
        }
    }

    fn with_record(&self, f: impl FnOnce(&mut MockRecord)) {
        if let Ok(mut record) = self.shared.record.lock() {
            f(&mut record);
        }
    }
}

impl Connector for MockConnector {
    fn signer(&self, options: &ClientOptions) -> Result<Box<dyn PresignSigner>> {
        self.with_record(|record| record.signer_options.push(options.clone()));
        self.check_build()?;

        Ok(Box::new(MockSigner {
            endpoint: options.endpoint.clone(),
            behavior: self.presign.clone(),
            shared: self.shared.clone(),
        }))
    }

    fn sts(&self, options: &ClientOptions) -> Result<Box<dyn StsClient>> {
        self.with_record(|record| record.sts_options.push(options.clone()));
        self.check_build()?;

        Ok(Box::new(MockSts {
            behavior: self.sts.clone(),
            shared: self.shared.clone(),
        }))
    }
}

struct MockSigner {
    endpoint: String,
    behavior: MockBehavior,
    shared: Arc<Shared>,
}

#[async_trait]
impl PresignSigner for MockSigner {
    async fn presign(&self, request: &PresignRequest) -> Result<Url> {
        if let Ok(mut record) = self.shared.record.lock() {
            record.presign_requests.push(request.clone());
        }
        self.behavior.apply().await?;

        let host = self
            .endpoint
            .trim_start_matches("https://")
            .trim_start_matches("http://");
        let mut url = Url::parse(&format!("https://{}.{host}/", request.bucket))?;
        url.set_path(&request.key);
        url.query_pairs_mut()
            .append_pair("X-Mock-Method", request.method.as_str())
            .append_pair("X-Mock-Expires", &request.expires.as_secs().to_string())
            .append_pair("X-Mock-Signature", &Uuid::new_v4().simple().to_string());

        Ok(url)
    }
}

struct MockSts {
    behavior: MockBehavior,
    shared: Arc<Shared>,
}

#[async_trait]
impl StsClient for MockSts {
    async fn assume_role(&self, request: &AssumeRoleRequest) -> Result<TemporaryCredential> {
        if let Ok(mut record) = self.shared.record.lock() {
            record.assume_role_requests.push(request.clone());
        }
        self.behavior.apply().await?;

        let serial = self.shared.issued.fetch_add(1, Ordering::SeqCst);
        TemporaryCredential::new(
            format!("STSAK{serial:04}"),
            format!("stssecret-{serial}"),
            format!("session-{serial}-{}", Uuid::new_v4().simple()),
        )
    }
}
