//! Identifier resolution: AlunoIDs pass through, CPFs go through the Sponte API

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::ApiCredentials;
use crate::office::Office;
use crate::spreadsheet::{IdentifierKind, normalize};

/// Remote student lookup by CPF
#[async_trait]
pub trait StudentLookup: Send + Sync {
    /// AlunoID for a digits-only CPF, `None` when the service knows no such student
    async fn find_student_id(&self, cpf: &str, credentials: &ApiCredentials) -> Result<Option<String>>;
}

/// Resolves spreadsheet keys to AlunoIDs for one run
pub struct Resolver {
    kind: IdentifierKind,
    lookup: Option<Arc<dyn StudentLookup>>,
    credentials: Option<ApiCredentials>,
}

impl Resolver {
    /// Keys already are AlunoIDs
    pub fn direct() -> Self {
        Self {
            kind: IdentifierKind::StudentId,
            lookup: None,
            credentials: None,
        }
    }

    /// Keys are CPFs looked up with the target office's credentials
    pub fn by_cpf(lookup: Arc<dyn StudentLookup>, credentials: ApiCredentials) -> Self {
        Self {
            kind: IdentifierKind::Cpf,
            lookup: Some(lookup),
            credentials: Some(credentials),
        }
    }

    pub fn kind(&self) -> IdentifierKind {
        self.kind
    }

    /// Resolve one raw key. Lookup failures are logged and count as "not found".
    pub async fn resolve(&self, raw: &str, office: Office) -> Option<String> {
        let key = normalize(self.kind, raw);
        if key.is_empty() {
            return None;
        }

        let (Some(lookup), Some(credentials)) = (&self.lookup, &self.credentials) else {
            return Some(key);
        };

        log::info!("Looking up student by CPF {} ({})...", key, office);
        match lookup.find_student_id(&key, credentials).await {
            Ok(Some(id)) => Some(id),
            Ok(None) => {
                log::debug!("No AlunoID returned for CPF {}", key);
                None
            }
            Err(e) => {
                log::error!("Student lookup failed for CPF {}: {:#}", key, e);
                None
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use anyhow::anyhow;

    /// In-memory lookup: known CPFs map to ids, listed CPFs fail
    #[derive(Default)]
    pub struct FakeLookup {
        pub known: HashMap<String, String>,
        pub failing: Vec<String>,
        pub calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl StudentLookup for FakeLookup {
        async fn find_student_id(&self, cpf: &str, _: &ApiCredentials) -> Result<Option<String>> {
            self.calls.lock().unwrap().push(cpf.to_string());
            if self.failing.iter().any(|f| f == cpf) {
                return Err(anyhow!("connection reset"));
            }
            Ok(self.known.get(cpf).cloned())
        }
    }

    pub fn credentials() -> ApiCredentials {
        ApiCredentials {
            client_code: "74070".into(),
            token: "tok".into(),
        }
    }

    #[tokio::test]
    async fn test_direct_passthrough() {
        let resolver = Resolver::direct();
        assert_eq!(resolver.resolve(" 123.0 ", Office::Sul).await.as_deref(), Some("123"));
        assert_eq!(resolver.resolve("   ", Office::Sul).await, None);
    }

    #[tokio::test]
    async fn test_cpf_lookup() {
        let lookup = Arc::new(FakeLookup {
            known: [("12345678900".to_string(), "55".to_string())].into_iter().collect(),
            ..Default::default()
        });
        let resolver = Resolver::by_cpf(lookup.clone(), credentials());

        assert_eq!(resolver.resolve("123.456.789-00", Office::Sul).await.as_deref(), Some("55"));
        assert_eq!(resolver.resolve("999", Office::Sul).await, None);
        assert_eq!(*lookup.calls.lock().unwrap(), vec!["12345678900", "999"]);
    }

    #[tokio::test]
    async fn test_lookup_failure_is_absent() {
        let lookup = Arc::new(FakeLookup {
            failing: vec!["1".to_string()],
            ..Default::default()
        });
        let resolver = Resolver::by_cpf(lookup, credentials());
        assert_eq!(resolver.resolve("1", Office::Aldeota).await, None);
    }
}
