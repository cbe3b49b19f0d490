//! Capacity accounting and admission control for stockpile quantity limits.
//!
//! Agents pick storage destinations from a snapshot of the world while other
//! agents are committing to the same destinations. This crate answers "how
//! much room is really left" by adding what is physically present to what
//! other agents have already committed, and gates agent behaviour on that
//! number.
//!
//! Data flows one way per decision:
//!
//! ```text
//! TransferGuard -> AdmissionController -> { LimitRegistry, occupancy, reservations }
//! ```
//!
//! Nothing here caches world state. Every decision rescans current
//! contents and work queues, so reservations that appear or vanish between
//! calls are always reflected.
//!
//! # Modules
//!
//! - [`admission`] -- [`AdmissionController`] and the [`Capacity`] result.
//! - [`config`] -- Configuration loading from `stockcap-config.yaml`.
//! - [`guard`] -- [`TransferGuard`]: destination filtering, deposit
//!   blocking, haul clamping, opportunistic-pickup suppression.
//! - [`occupancy`] -- Physically present quantities per location.
//! - [`reservation`] -- [`ReservationScanner`]: quantities other agents
//!   are already hauling to a location.
//!
//! [`AdmissionController`]: admission::AdmissionController
//! [`Capacity`]: admission::Capacity
//! [`TransferGuard`]: guard::TransferGuard
//! [`ReservationScanner`]: reservation::ReservationScanner

pub mod admission;
pub mod config;
pub mod guard;
pub mod occupancy;
pub mod reservation;

pub use admission::{AdmissionController, Capacity};
pub use guard::{HaulDecision, TransferGuard};
pub use occupancy::OccupancySnapshot;
pub use reservation::ReservationScanner;
