//! Point-and-Figure pipeline: transform, matrix, anchor extraction, scoring.
//!
//! Independent of the backtest engine — consumes the same candle data and
//! feeds chart annotation and the matrix confidence score.

pub mod anchor;
pub mod matrix;
pub mod score;
pub mod transform;

pub use anchor::{AnchorConfig, AnchorKind, AnchorPoint, AnchorZone};
pub use matrix::{PnfCell, PnfMatrix};
pub use score::{
    matrix_score, BoxScore, ColumnKind, MatrixScore, MatrixStrength, DEFAULT_BOX_SIZES,
    DEFAULT_REVERSAL,
};
pub use transform::{pnf_points, PnfPoint, PnfSymbol};
