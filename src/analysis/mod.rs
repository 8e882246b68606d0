//! Evaluation stages: safety, bundling, momentum, exclusion, tiering,
//! dual-track routing and the composite scorer

pub mod bundle;
pub mod exclusion;
pub mod momentum;
pub mod safety;
pub mod scoring;
pub mod tier;
pub mod track;

pub use bundle::BundleDetector;
pub use exclusion::{ExclusionFilter, ExclusionReason};
pub use momentum::MomentumAnalyzer;
pub use safety::{SafetyChecker, SafetyContext, ScamVerdict};
pub use scoring::{OnChainScorer, ScoreInputs};
pub use tier::{MarketCapTier, PositionSizer, TierTable};
pub use track::{gates_for_track, route, RouteDecision};
