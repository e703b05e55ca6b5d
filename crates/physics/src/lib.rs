#![deny(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::missing_panics_doc
)]
//! # Tubes Physics
//!
//! The physics layer of the floating-tubes arena. The rigid-body solver
//! itself is an external collaborator hidden behind [`PhysicsEngine`]; this
//! crate owns the coordination around it.
//!
//! ## Key Components
//!
//! -   **Engine seam:** [`PhysicsEngine`] is the capability set the rest of
//!     the workspace needs. [`RapierEngine`] (feature `rapier`, on by default)
//!     implements it over rapier3d, and `MockEngine` (feature `mock`)
//!     implements a scripted, call-recording stand-in for tests.
//! -   **World adapter:** [`PhysicsWorld`] builds the arena and the tubes,
//!     steps the engine with a clamped frame time, and hands back scaled
//!     world matrices in stable body-index order.
//! -   **Collision events:** [`CollisionDetector`] turns contact manifolds
//!     against the front plane into debounced [`CollisionEvent`]s.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use physics::{PhysicsWorld, RapierEngine, WorldParams};
//!
//! let params = WorldParams::new(3, 1.0, 10.0, 10.0);
//! let mut world = PhysicsWorld::initialize(Box::new(RapierEngine::new()), &params)?;
//! let out = world.step(16.0, 16.0);
//! assert_eq!(out.transforms.len(), 3);
//! ```

pub mod arena;
pub mod collision;
pub mod engine;
pub mod error;
pub mod mesh;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
#[cfg(feature = "rapier")]
pub mod rapier_engine;
pub mod transform;
pub mod world;

pub use arena::{ArenaBounds, ArenaLayout, ArenaPlane, ArenaSide, BodyTag};
pub use collision::{CollisionConfig, CollisionDetector, CollisionEvent};
pub use engine::{BodyHandle, CollisionLayers, ContactManifold, PhysicsEngine, RayHit, ShapeId};
pub use error::PhysicsError;
pub use mesh::{MeshProxy, MeshVertex, TriangleMesh};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockEngine;
#[cfg(feature = "rapier")]
pub use rapier_engine::RapierEngine;
pub use world::{PhysicsWorld, StepOutput, WorldParams, MAX_STEP_MS, SUBSTEPS};
