//! # External Collaborator Interfaces
//!
//! The engine consumes, but never owns, the land registry and the device and
//! permission layers. These traits are the seams: production wires them to
//! the geospatial registration service, the IoT device store and the role
//! storage; tests wire them to the in-memory implementation below.

use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;

use crate::models::{LotId, PlotId, UserId};

/// Point-in-time view of a lot, read before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct LotSnapshot {
    pub id: LotId,
    /// The parent plot; requests on a lot derive their plot reference from it
    pub plot: PlotId,
    pub owner: UserId,
    pub is_active: bool,
    /// Whether a 4" valve actuator device is attached to the lot
    pub has_valve4: bool,
    /// Current flow delivered by the valve, if one is attached
    pub actual_flow: Option<f64>,
}

/// Point-in-time view of a plot.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSnapshot {
    pub id: PlotId,
    pub owner: UserId,
    pub is_active: bool,
}

/// Errors surfaced by the resource layer itself (not by absent records).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResourceError {
    #[error("Resource layer unavailable: {0}")]
    Unavailable(String),
}

/// Read access to lots and plots, plus the write counterpart used when an
/// approved flow decision is applied to the valve device.
#[async_trait]
pub trait ResourceLookup: Send + Sync {
    async fn get_lot(&self, id: &LotId) -> Result<Option<LotSnapshot>, ResourceError>;

    async fn get_plot(&self, id: &PlotId) -> Result<Option<PlotSnapshot>, ResourceError>;

    /// Set the actual flow of the valve attached to `lot`.
    async fn set_actual_flow(&self, lot: &LotId, value: f64) -> Result<(), ResourceError>;

    /// Activate or deactivate a lot (definitive flow cancellation).
    async fn set_lot_active(&self, lot: &LotId, active: bool) -> Result<(), ResourceError>;
}

/// Capability checks resolved by the external role/permission storage.
#[async_trait]
pub trait Authz: Send + Sync {
    async fn has_capability(&self, user: &UserId, capability: &str) -> bool;
}

/// In-memory resource registry. Backs tests and local deployments; the
/// production build points the traits at the real registries instead.
#[derive(Debug, Default)]
pub struct InMemoryResources {
    lots: DashMap<LotId, LotSnapshot>,
    plots: DashMap<PlotId, PlotSnapshot>,
    capabilities: DashMap<UserId, Vec<String>>,
}

impl InMemoryResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_lot(&self, lot: LotSnapshot) {
        self.lots.insert(lot.id.clone(), lot);
    }

    pub fn insert_plot(&self, plot: PlotSnapshot) {
        self.plots.insert(plot.id.clone(), plot);
    }

    pub fn grant(&self, user: impl Into<UserId>, capability: impl Into<String>) {
        self.capabilities
            .entry(user.into())
            .or_default()
            .push(capability.into());
    }

    /// Read back the current flow of a lot's valve (test observability)
    pub fn actual_flow(&self, lot: &LotId) -> Option<f64> {
        self.lots.get(lot).and_then(|l| l.actual_flow)
    }

    pub fn lot_is_active(&self, lot: &LotId) -> Option<bool> {
        self.lots.get(lot).map(|l| l.is_active)
    }
}

#[async_trait]
impl ResourceLookup for InMemoryResources {
    async fn get_lot(&self, id: &LotId) -> Result<Option<LotSnapshot>, ResourceError> {
        Ok(self.lots.get(id).map(|l| l.clone()))
    }

    async fn get_plot(&self, id: &PlotId) -> Result<Option<PlotSnapshot>, ResourceError> {
        Ok(self.plots.get(id).map(|p| p.clone()))
    }

    async fn set_actual_flow(&self, lot: &LotId, value: f64) -> Result<(), ResourceError> {
        match self.lots.get_mut(lot) {
            Some(mut entry) => {
                entry.actual_flow = Some(value);
                Ok(())
            }
            None => Err(ResourceError::Unavailable(format!("unknown lot {lot}"))),
        }
    }

    async fn set_lot_active(&self, lot: &LotId, active: bool) -> Result<(), ResourceError> {
        match self.lots.get_mut(lot) {
            Some(mut entry) => {
                entry.is_active = active;
                Ok(())
            }
            None => Err(ResourceError::Unavailable(format!("unknown lot {lot}"))),
        }
    }
}

#[async_trait]
impl Authz for InMemoryResources {
    async fn has_capability(&self, user: &UserId, capability: &str) -> bool {
        self.capabilities
            .get(user)
            .is_some_and(|caps| caps.iter().any(|c| c == capability))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lot() -> LotSnapshot {
        LotSnapshot {
            id: "lot-1".into(),
            plot: "plot-1".into(),
            owner: "u-1".into(),
            is_active: true,
            has_valve4: true,
            actual_flow: Some(4.2),
        }
    }

    #[tokio::test]
    async fn test_lot_round_trip() {
        let resources = InMemoryResources::new();
        resources.insert_lot(lot());

        let found = resources.get_lot(&"lot-1".into()).await.unwrap().unwrap();
        assert_eq!(found.owner, "u-1");
        assert!(resources
            .get_lot(&"lot-9".into())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_set_actual_flow() {
        let resources = InMemoryResources::new();
        resources.insert_lot(lot());

        resources.set_actual_flow(&"lot-1".into(), 10.5).await.unwrap();
        assert_eq!(resources.actual_flow(&"lot-1".into()), Some(10.5));

        let err = resources.set_actual_flow(&"lot-9".into(), 1.0).await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn test_capabilities() {
        let resources = InMemoryResources::new();
        resources.grant("tech-1", crate::constants::capabilities::CAN_BE_ASSIGNED);

        assert!(
            resources
                .has_capability(&"tech-1".into(), crate::constants::capabilities::CAN_BE_ASSIGNED)
                .await
        );
        assert!(
            !resources
                .has_capability(&"tech-1".into(), crate::constants::capabilities::CAN_ASSIGN)
                .await
        );
    }
}
