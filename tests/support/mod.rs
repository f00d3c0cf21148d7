// ABOUTME: Test support utilities.
// ABOUTME: Provides tracing setup, a store that is always down and a scriptable stub unit.

use std::sync::Once;

use async_trait::async_trait;
use stackline::deploy::{FactRead, Outputs, ProvisionContext, ProvisioningUnit, UnitError};
use stackline::facts::{Fact, FactRecord, FactShape, FactStore, FactValue, StoreError};
use stackline::namespace::FactKey;
use stackline::provision::ResourceKind;
use stackline::types::UnitId;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env().add_directive("stackline=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

#[allow(dead_code)]
pub fn unit_id(name: &str) -> UnitId {
    UnitId::new(name).unwrap()
}

/// Store whose backend can never be reached.
#[allow(dead_code)]
pub struct UnavailableStore;

#[async_trait]
impl FactStore for UnavailableStore {
    async fn put(
        &self,
        _key: &FactKey,
        _value: FactValue,
    ) -> Result<Option<FactRecord>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn get(&self, _key: &FactKey) -> Result<Option<FactRecord>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn list(&self, _prefix: &str) -> Result<Vec<FactRecord>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

/// Unit with declared facts and no real resources.
///
/// Provisioning reads every input through the context, then reports each
/// declared output as `<unit>:<fact>` (a one-element list for list facts).
#[allow(dead_code)]
pub struct StubUnit {
    id: UnitId,
    inputs: Vec<FactRead>,
    outputs: Vec<Fact>,
    reject: Option<ResourceKind>,
    undeclared_read: Option<Fact>,
}

#[allow(dead_code)]
impl StubUnit {
    pub fn new(id: &str) -> Self {
        Self {
            id: unit_id(id),
            inputs: Vec::new(),
            outputs: Vec::new(),
            reject: None,
            undeclared_read: None,
        }
    }

    pub fn eager(mut self, fact: Fact) -> Self {
        self.inputs.push(FactRead::eager(fact));
        self
    }

    pub fn deferred(mut self, fact: Fact) -> Self {
        self.inputs.push(FactRead::deferred(fact));
        self
    }

    pub fn writes(mut self, fact: Fact) -> Self {
        self.outputs.push(fact);
        self
    }

    /// Fail provisioning as if the provider declined a `kind` resource.
    pub fn rejecting(mut self, kind: ResourceKind) -> Self {
        self.reject = Some(kind);
        self
    }

    /// Read `fact` during provisioning without declaring it.
    pub fn sneaking(mut self, fact: Fact) -> Self {
        self.undeclared_read = Some(fact);
        self
    }

    pub fn value_of(id: &str, fact: Fact) -> String {
        format!("{id}:{fact}")
    }
}

#[async_trait]
impl ProvisioningUnit for StubUnit {
    fn id(&self) -> &UnitId {
        &self.id
    }

    fn label(&self) -> &str {
        "Stub"
    }

    fn inputs(&self) -> Vec<FactRead> {
        self.inputs.clone()
    }

    fn outputs(&self) -> Vec<Fact> {
        self.outputs.clone()
    }

    async fn provision(&self, ctx: &ProvisionContext<'_>) -> Result<Outputs, UnitError> {
        for read in &self.inputs {
            ctx.value(read.fact).await?;
        }
        if let Some(fact) = self.undeclared_read {
            ctx.value(fact).await?;
        }
        if let Some(resource) = self.reject {
            return Err(UnitError::ProvisioningRejected {
                resource,
                reason: "quota exceeded".to_string(),
            });
        }

        let mut out = Outputs::new();
        for fact in &self.outputs {
            let value = Self::value_of(self.id.as_str(), *fact);
            match fact.shape() {
                FactShape::Scalar => out.scalar(*fact, value),
                FactShape::List => out.list(*fact, [value]),
            };
        }
        Ok(out)
    }
}
