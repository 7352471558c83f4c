//! Sparse input features for efficiently updatable chess networks.
//!
//! A [`FeatureSet`] turns a [`Snapshot`](chess::Snapshot) into a list of
//! active input indices per perspective, and turns the transition from one
//! snapshot to the next into a list of removed and added indices whenever
//! that is cheaper than starting over. At training time a [`Factorizer`]
//! expands each base index into its correlated factors.

pub mod arch;
pub mod chess;
pub mod error;
pub mod factorizer;
pub mod feature_set;
pub mod features;
pub mod logger;
pub mod psq;
pub mod tracker;
pub mod training;

pub use chess::{Color, Move, Position};
pub use error::{DataError, FeatureError, FenError, MoveError};
pub use factorizer::{Factorizer, TrainingFeature};
pub use feature_set::{FeatureSet, FeatureSetSettings, RefreshPolicy, Update};
pub use features::{Feature, FeatureType, IncrementalFeature, IndexList, RefreshTrigger};
pub use tracker::ActiveIndices;
