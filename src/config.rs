//! Run-time configuration: physical parameters and the boundary table.
//!
//! These structs are plain data with serde derives so an external case
//! loader can fill them from whatever file format it likes. Validation
//! happens here, once, through [`BoundaryConfig::check`]; everything
//! downstream may assume a checked table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Number of conservative components: (w, hu, hv).
pub const N_COMPONENTS: usize = 3;

/// One of the four domain edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    West,
    East,
    South,
    North,
}

impl Edge {
    /// All edges in the order the boundary table is resolved.
    pub const ALL: [Edge; 4] = [Edge::West, Edge::East, Edge::South, Edge::North];

    /// The edge on the opposite side of the domain.
    pub fn opposite(self) -> Edge {
        match self {
            Edge::West => Edge::East,
            Edge::East => Edge::West,
            Edge::South => Edge::North,
            Edge::North => Edge::South,
        }
    }

    /// Whether this edge is normal to the x axis.
    pub fn is_x_normal(self) -> bool {
        matches!(self, Edge::West | Edge::East)
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Edge::West => "west",
            Edge::East => "east",
            Edge::South => "south",
            Edge::North => "north",
        };
        f.write_str(name)
    }
}

/// Ghost-cell boundary policy for one (edge, component) pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BcType {
    /// Zero-gradient: ghost cells copy the nearest interior cell.
    Outflow,
    /// Linear extrapolation from the two nearest interior cells.
    Extrap,
    /// Dirichlet: fixed conservative value at the boundary face.
    Const,
    /// Fixed non-conservative value (depth for w, velocity for hu/hv),
    /// converted to conservative form using local topography.
    Inflow,
    /// Handled by halo exchange (or grid wrap); no-op in this subsystem.
    Periodic,
}

impl BcType {
    /// Whether this policy requires a configured value.
    pub fn needs_value(self) -> bool {
        matches!(self, BcType::Const | BcType::Inflow)
    }

    pub fn name(self) -> &'static str {
        match self {
            BcType::Outflow => "outflow",
            BcType::Extrap => "extrap",
            BcType::Const => "const",
            BcType::Inflow => "inflow",
            BcType::Periodic => "periodic",
        }
    }
}

impl FromStr for BcType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "outflow" => Ok(BcType::Outflow),
            "extrap" => Ok(BcType::Extrap),
            "const" => Ok(BcType::Const),
            "inflow" => Ok(BcType::Inflow),
            "periodic" => Ok(BcType::Periodic),
            other => Err(ConfigError::UnknownBoundaryPolicy(other.to_string())),
        }
    }
}

impl fmt::Display for BcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Boundary declaration for one edge: a policy and an optional value per
/// conservative component, in (w, hu, hv) order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeBc {
    pub types: [BcType; N_COMPONENTS],
    #[serde(default)]
    pub values: [Option<f64>; N_COMPONENTS],
}

impl EdgeBc {
    /// Same policy for all three components, no values.
    pub fn uniform(bc_type: BcType) -> Self {
        Self {
            types: [bc_type; N_COMPONENTS],
            values: [None; N_COMPONENTS],
        }
    }

    /// True when all components share one policy and one value, so the
    /// edge qualifies for the vectorized update path.
    pub fn is_uniform(&self) -> bool {
        self.types.iter().all(|t| *t == self.types[0])
            && self.values.iter().all(|v| *v == self.values[0])
    }

    fn check(&self, edge: Edge) -> Result<(), ConfigError> {
        let any_periodic = self.types.contains(&BcType::Periodic);
        if any_periodic && !self.types.iter().all(|t| *t == BcType::Periodic) {
            return Err(ConfigError::PeriodicMismatch {
                edge,
                reason: "all three components must be periodic together".to_string(),
            });
        }
        for (component, (bc_type, value)) in self.types.iter().zip(&self.values).enumerate() {
            if bc_type.needs_value() && value.is_none() {
                return Err(ConfigError::MissingBoundaryValue {
                    edge,
                    component,
                    policy: bc_type.name(),
                });
            }
        }
        Ok(())
    }
}

/// Per-edge boundary table, loaded once and read-only during the run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundaryConfig {
    pub west: EdgeBc,
    pub east: EdgeBc,
    pub south: EdgeBc,
    pub north: EdgeBc,
}

impl BoundaryConfig {
    /// Same policy on every edge and component (e.g. all-outflow).
    pub fn uniform(bc_type: BcType) -> Self {
        Self {
            west: EdgeBc::uniform(bc_type),
            east: EdgeBc::uniform(bc_type),
            south: EdgeBc::uniform(bc_type),
            north: EdgeBc::uniform(bc_type),
        }
    }

    pub fn edge(&self, edge: Edge) -> &EdgeBc {
        match edge {
            Edge::West => &self.west,
            Edge::East => &self.east,
            Edge::South => &self.south,
            Edge::North => &self.north,
        }
    }

    /// Validate the whole table: required values present, periodic edges
    /// whole and paired with their opposite edge.
    pub fn check(&self) -> Result<(), ConfigError> {
        for edge in Edge::ALL {
            let bc = self.edge(edge);
            bc.check(edge)?;
            if bc.types[0] == BcType::Periodic
                && self.edge(edge.opposite()).types[0] != BcType::Periodic
            {
                return Err(ConfigError::PeriodicMismatch {
                    edge,
                    reason: format!("{} edge must be periodic as well", edge.opposite()),
                });
            }
        }
        Ok(())
    }

    /// Whether the x (west/east) edges are periodic.
    pub fn x_periodic(&self) -> bool {
        self.west.types[0] == BcType::Periodic
    }

    /// Whether the y (south/north) edges are periodic.
    pub fn y_periodic(&self) -> bool {
        self.south.types[0] == BcType::Periodic
    }
}

/// Physical and numerical parameters, fixed for the run.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameters {
    /// Gravitational acceleration.
    pub gravity: f64,
    /// Generalized-minmod limiter parameter, in [1, 2]. 1 is most
    /// dissipative, 2 is sharpest.
    pub theta: f64,
    /// Depth below which a cell or face counts as dry.
    pub dry_tol: f64,
    /// CFL number applied to the stable time-step estimate.
    pub cfl: f64,
    /// Collapse same-policy edges into a single ghost-cell update.
    pub vectorize_bc: bool,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            gravity: 9.81,
            theta: 1.3,
            dry_tol: 1.0e-12,
            cfl: 0.25,
            vectorize_bc: false,
        }
    }
}
