//! # cbdd: reduced ordered BDDs with complement edges
//!
//! **`cbdd`** is a manager-centric library for Boolean functions represented
//! as reduced ordered binary decision diagrams. Edges carry a polarity bit, so
//! a function and its negation share every node, and negation is free.
//!
//! ## What is a BDD?
//!
//! A Binary Decision Diagram represents a Boolean function as a directed
//! acyclic graph. For a fixed variable order the representation is
//! **canonical**: two edges of one manager are equal iff they denote the same
//! function. Equivalence, satisfiability and validity checks are therefore
//! constant-time comparisons.
//!
//! ## Key Features
//!
//! - **Manager-Centric Architecture**: all operations go through the [`Bdd`][crate::bdd::Bdd] manager, which owns the node arena, the unique table and the compute tables.
//! - **Checked Handles**: [`Ref`][crate::reference::Ref] edges remember their manager; mixing managers is reported as an error instead of silently producing garbage.
//! - **Explicit Lifecycle**: functions are pinned with `activate` and released with `deactivate`; collection is batched and threshold-triggered.
//! - **Rich API**: ITE and the binary connectives, cofactors and constrain, composition, quantification, support and symmetry analysis, ISOP covers and model counting.
//!
//! ## Basic Usage
//!
//! ```rust
//! use cbdd::bdd::Bdd;
//! use cbdd::types::VarId;
//!
//! # fn main() -> Result<(), cbdd::error::BddError> {
//! // 1. Initialize the manager
//! let bdd = Bdd::default();
//!
//! // 2. Create variables (declared in the order of first use)
//! let x1 = bdd.mk_var(1)?;
//! let x2 = bdd.mk_var(2)?;
//!
//! // 3. Build a formula: f = x1 AND (NOT x2)
//! let f = bdd.apply_and(x1, -x2)?;
//!
//! // 4. Check properties
//! assert!(!bdd.is_zero(f)); // It is satisfiable
//! assert!(!bdd.is_one(f)); // It is not a tautology
//!
//! // 5. Evaluate (x1=true, x2=false) -> should be true
//! let cube = bdd.mk_cube([VarId::new(1).pos(), VarId::new(2).neg()])?;
//! assert!(bdd.is_one(bdd.cofactor_cube(f, cube)?));
//!
//! // 6. Keep f across garbage collections
//! bdd.activate(f)?;
//! bdd.collect_garbage(false);
//! assert_eq!(bdd.size(f)?, 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Components
//!
//! - **[`bdd`]**: the manager, its configuration and node construction.
//! - **[`ite`]**: the ITE engine and the connectives built on it.
//! - **[`gc`]**: reference tracking and garbage collection.
//! - **[`cache`]**: the compute tables.
//!
//! For a deep dive into the canonical form and memory model, check the [`bdd`]
//! module documentation.

pub mod bdd;
pub mod cache;
pub mod cofactor;
pub mod compose;
pub mod count;
pub mod debug;
pub mod error;
pub mod gc;
pub mod isop;
pub mod ite;
pub mod node;
pub mod quant;
pub mod reference;
pub mod sat;
pub mod sets;
pub mod store;
pub mod support;
pub mod table;
pub mod types;
pub mod utils;
pub mod vars;
