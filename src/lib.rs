//! # u-discrete
//!
//! Exact calculus for finite discrete probability spaces.
//!
//! Outcomes carry symbolic names, weights and values are exact rationals,
//! and every space is checked against the law of total probability when it
//! is built. Random variables combine under an independence assumption by
//! convolution; random vectors keep the full joint distribution so that
//! covariance and joint probabilities account for dependency.
//!
//! ## Modules
//!
//! - [`numeric`]: exact `Value` type, decimal parsing, rounding
//! - [`symbol`]: canonical polynomial names (`X + Y`, `X*Y`, `X**2`)
//! - [`sample`]: `(name, value)` outcomes
//! - [`combine`]: convolution and multiplication of weight maps
//! - [`config`]: precision and simulation settings
//! - [`space`]: validated probability spaces
//! - [`joint`]: joint distributions with marginals and secondaries
//! - [`predicate`]: comparison events such as `"<= 1.0"`
//! - [`randvar`]: random variables and their algebra
//! - [`randvec`]: random vectors, expectation vectors, covariance matrices
//! - [`random`]: seeded generators and weighted sampling
//! - [`simulation`]: plot-ready density and distribution data
//! - [`process`]: random walks
//!
//! ## Design Philosophy
//!
//! - **Exact first**: rationals end to end, rounding only when a number is
//!   validated or reported
//! - **Explicit independence**: variable algebra assumes it, vector algebra
//!   does not
//! - **Property-based testing**: probability laws verified via proptest
//!
//! ```
//! use u_discrete::{RandVar, RandVec};
//!
//! let x = RandVar::from_pairs("X", [(-1, 0.5), (1, 0.5)]).unwrap();
//! let y = RandVar::from_pairs("Y", [(0, 0.25), (2, 0.75)]).unwrap();
//! let z = x.add(&y).unwrap();
//! assert_eq!(z.expectation(), x.expectation() + y.expectation());
//!
//! let v = RandVec::from_independent(&[x, y]).unwrap();
//! assert_eq!(v.covariance()[0][1], u_discrete::numeric::int(0));
//! ```

pub mod combine;
pub mod config;
pub mod error;
pub mod joint;
pub mod numeric;
pub mod predicate;
pub mod process;
pub mod random;
pub mod randvar;
pub mod randvec;
pub mod sample;
pub mod simulation;
pub mod space;
pub mod symbol;

pub use config::{Precision, SimulationConfig};
pub use error::{ErrorKind, ProbError, Result};
pub use joint::{JointDistribution, Secondary};
pub use numeric::Value;
pub use predicate::{Comparator, Predicate};
pub use process::RandomWalk;
pub use randvar::RandVar;
pub use randvec::RandVec;
pub use sample::Sample;
pub use simulation::PlotData;
pub use space::ProbabilitySpace;
pub use symbol::Name;
