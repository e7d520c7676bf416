//! FOREMAN Registry - Capability Abstraction
//!
//! A capability is the executor-facing abstraction for an "agent": one
//! operation that accepts a payload and returns a result or a failure
//! signal. Capabilities are registered once at startup and are stateless
//! from the dispatcher's perspective; any internal state is owned by the
//! capability itself.

use foreman_core::{CapabilityFailure, ForemanResult, RegistryError};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Trait for capabilities invoked by the dispatcher.
/// Implementations must be thread-safe (Send + Sync).
///
/// # Example
/// ```ignore
/// struct PingCapability { /* ... */ }
///
/// #[async_trait::async_trait]
/// impl Capability for PingCapability {
///     async fn run(&self, input: &Value) -> Result<Value, CapabilityFailure> {
///         // Reach the service, report the round trip
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait Capability: Send + Sync {
    /// Execute the capability against an input payload.
    ///
    /// # Returns
    /// * `Ok(Value)` - The capability's result payload
    /// * `Err(CapabilityFailure)` - The capability's own failure signal;
    ///   absorbed by the dispatcher's retry/escalation machine
    async fn run(&self, input: &Value) -> Result<Value, CapabilityFailure>;
}

/// Future type produced by [`FnCapability`] closures.
pub type CapabilityFuture =
    Pin<Box<dyn Future<Output = Result<Value, CapabilityFailure>> + Send>>;

/// Adapter turning a closure into a [`Capability`].
///
/// Handy for tests and for registering small built-ins without a dedicated
/// struct per capability.
pub struct FnCapability<F>
where
    F: Fn(Value) -> CapabilityFuture + Send + Sync,
{
    f: F,
}

impl<F> FnCapability<F>
where
    F: Fn(Value) -> CapabilityFuture + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait::async_trait]
impl<F> Capability for FnCapability<F>
where
    F: Fn(Value) -> CapabilityFuture + Send + Sync,
{
    async fn run(&self, input: &Value) -> Result<Value, CapabilityFailure> {
        (self.f)(input.clone()).await
    }
}

/// Registry mapping capability names to capability handles.
/// Capabilities must be explicitly registered - no auto-discovery.
///
/// Populated at process start, then shared immutably behind an `Arc`.
/// Read-heavy, write-once-per-name.
///
/// # Example
/// ```ignore
/// let mut registry = CapabilityRegistry::new();
/// registry.register("ping", Box::new(PingCapability::new()))?;
/// let registry = Arc::new(registry);
///
/// // Later, from the dispatcher
/// let capability = registry.resolve("ping")?;
/// ```
pub struct CapabilityRegistry {
    capabilities: HashMap<String, Arc<dyn Capability>>,
}

impl CapabilityRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            capabilities: HashMap::new(),
        }
    }

    /// Register a capability under a name.
    ///
    /// # Errors
    /// `RegistryError::DuplicateName` if the name is already taken.
    pub fn register(
        &mut self,
        name: &str,
        capability: Box<dyn Capability>,
    ) -> ForemanResult<()> {
        if self.capabilities.contains_key(name) {
            return Err(RegistryError::DuplicateName {
                name: name.to_string(),
            }
            .into());
        }
        self.capabilities
            .insert(name.to_string(), Arc::from(capability));
        Ok(())
    }

    /// Resolve a capability by name.
    ///
    /// # Errors
    /// `RegistryError::UnknownCapability` if no capability has the name.
    pub fn resolve(&self, name: &str) -> ForemanResult<Arc<dyn Capability>> {
        self.capabilities
            .get(name)
            .cloned()
            .ok_or_else(|| {
                RegistryError::UnknownCapability {
                    name: name.to_string(),
                }
                .into()
            })
    }

    /// Check if a capability is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.capabilities.contains_key(name)
    }

    /// Names of all registered capabilities.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.capabilities.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foreman_core::{ForemanError, RegistryError};
    use serde_json::json;

    fn echo() -> Box<dyn Capability> {
        Box::new(FnCapability::new(|input| {
            Box::pin(async move { Ok(input) })
        }))
    }

    #[tokio::test]
    async fn test_register_and_resolve() {
        let mut registry = CapabilityRegistry::new();
        registry.register("echo", echo()).unwrap();

        let capability = registry.resolve("echo").unwrap();
        let result = capability.run(&json!({"x": 1})).await.unwrap();
        assert_eq!(result, json!({"x": 1}));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut registry = CapabilityRegistry::new();
        registry.register("echo", echo()).unwrap();
        let result = registry.register("echo", echo());
        assert!(matches!(
            result,
            Err(ForemanError::Registry(RegistryError::DuplicateName { name })) if name == "echo"
        ));
    }

    #[test]
    fn test_unknown_capability_rejected() {
        let registry = CapabilityRegistry::new();
        let result = registry.resolve("missing");
        assert!(matches!(
            result,
            Err(ForemanError::Registry(RegistryError::UnknownCapability { name }))
                if name == "missing"
        ));
    }

    #[tokio::test]
    async fn test_fn_capability_failure_passthrough() {
        let mut registry = CapabilityRegistry::new();
        registry
            .register(
                "always_fails",
                Box::new(FnCapability::new(|_| {
                    Box::pin(async { Err(CapabilityFailure::new("down")) })
                })),
            )
            .unwrap();

        let capability = registry.resolve("always_fails").unwrap();
        let err = capability.run(&json!({})).await.unwrap_err();
        assert_eq!(err.reason, "down");
    }

    #[test]
    fn test_names_sorted() {
        let mut registry = CapabilityRegistry::new();
        registry.register("ping", echo()).unwrap();
        registry.register("echo", echo()).unwrap();
        assert_eq!(registry.names(), vec!["echo", "ping"]);
    }
}
