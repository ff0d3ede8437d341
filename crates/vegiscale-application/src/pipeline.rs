//! Composable request pipeline.
//!
//! API bindings run every request through an ordered list of stages before
//! reaching a service: each stage either short-circuits with a `WeighError`
//! or passes an enriched context forward. This replaces the nested
//! decorator chains of the first backend generation with an explicit,
//! testable sequence.

use serde_json::Value;
use vegiscale_core::error::{Result, WeighError};
use vegiscale_core::identity::{DeviceIdentity, Principal};

/// Context flowing through the pipeline: whatever the identity context
/// resolved, plus the parsed request payload.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub principal: Option<Principal>,
    pub device: Option<DeviceIdentity>,
    pub payload: Value,
}

impl RequestContext {
    pub fn new(payload: Value) -> Self {
        Self {
            payload,
            ..Default::default()
        }
    }

    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.principal = Some(principal);
        self
    }

    pub fn with_device(mut self, device: DeviceIdentity) -> Self {
        self.device = Some(device);
        self
    }

    /// Returns the resolved user principal.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` when the request carries no user credential.
    pub fn principal(&self) -> Result<&Principal> {
        self.principal
            .as_ref()
            .ok_or_else(|| WeighError::forbidden("user authentication required"))
    }

    /// Returns the resolved device identity.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` when the request carries no device credential.
    pub fn device(&self) -> Result<&DeviceIdentity> {
        self.device
            .as_ref()
            .ok_or_else(|| WeighError::forbidden("device authentication required"))
    }
}

/// One pipeline stage.
pub trait Stage: Send + Sync {
    /// Stage name, used in short-circuit logging.
    fn name(&self) -> &'static str;

    /// Inspects or enriches the context; an error short-circuits the
    /// remaining stages.
    fn apply(&self, ctx: RequestContext) -> Result<RequestContext>;
}

/// An ordered list of stages applied front to back.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage.
    pub fn with_stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Runs the context through every stage in order.
    ///
    /// # Errors
    ///
    /// Returns the first stage failure; later stages never run.
    pub fn run(&self, mut ctx: RequestContext) -> Result<RequestContext> {
        for stage in &self.stages {
            ctx = stage.apply(ctx).map_err(|err| {
                tracing::debug!("Pipeline short-circuited at '{}': {err}", stage.name());
                err
            })?;
        }
        Ok(ctx)
    }
}

/// Rejects requests without a resolved user principal.
pub struct RequireUser;

impl Stage for RequireUser {
    fn name(&self) -> &'static str {
        "require_user"
    }

    fn apply(&self, ctx: RequestContext) -> Result<RequestContext> {
        ctx.principal()?;
        Ok(ctx)
    }
}

/// Rejects requests whose principal is not an admin.
pub struct RequireAdmin;

impl Stage for RequireAdmin {
    fn name(&self) -> &'static str {
        "require_admin"
    }

    fn apply(&self, ctx: RequestContext) -> Result<RequestContext> {
        ctx.principal()?.ensure_admin()?;
        Ok(ctx)
    }
}

/// Rejects requests without a resolved device identity.
pub struct RequireDevice;

impl Stage for RequireDevice {
    fn name(&self) -> &'static str {
        "require_device"
    }

    fn apply(&self, ctx: RequestContext) -> Result<RequestContext> {
        ctx.device()?;
        Ok(ctx)
    }
}

/// Rejects payloads that are not objects carrying every required field.
pub struct RequireFields {
    fields: Vec<&'static str>,
}

impl RequireFields {
    pub fn new(fields: impl IntoIterator<Item = &'static str>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
        }
    }
}

impl Stage for RequireFields {
    fn name(&self) -> &'static str {
        "require_fields"
    }

    fn apply(&self, ctx: RequestContext) -> Result<RequestContext> {
        let Some(object) = ctx.payload.as_object() else {
            return Err(WeighError::invalid_argument("missing JSON payload"));
        };
        let missing: Vec<&str> = self
            .fields
            .iter()
            .filter(|field| !object.contains_key(**field))
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(WeighError::invalid_argument(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        }
        Ok(ctx)
    }
}
