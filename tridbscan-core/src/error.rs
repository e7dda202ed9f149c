//! Error types for the tridbscan core library.
//!
//! Defines error enums exposed by the public API and a convenient result alias.

use std::{fmt, num::NonZeroUsize, sync::Arc};

use thiserror::Error;

use crate::builder::ExecutionStrategy;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// An error produced while estimating or loading per-point densities.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DensityError {
    /// Kernel density estimation needs at least three points.
    #[error("density estimation needs at least 3 points (got {points})")]
    InsufficientPoints {
        /// Number of points supplied to the estimator.
        points: usize,
    },
    /// The sample covariance could not be inverted.
    #[error("sample covariance is singular (determinant {determinant})")]
    SingularCovariance {
        /// Determinant of the bandwidth matrix.
        determinant: f64,
    },
    /// The estimator produced a value that is not finite.
    #[error("density for point {index} is not finite: {value}")]
    NonFinite {
        /// Position of the offending point.
        index: usize,
        /// The non-finite value.
        value: f64,
    },
    /// A density vector did not contain exactly one value per point.
    #[error("expected {expected} density values but found {actual}")]
    LengthMismatch {
        /// Number of points in the set.
        expected: usize,
        /// Number of density values produced or loaded.
        actual: usize,
    },
    /// A density cache implementation failed.
    #[error("density cache `{key}` failed: {message}")]
    Cache {
        /// Cache key that was being resolved.
        key: Arc<str>,
        /// Human-readable description from the cache implementation.
        message: Arc<str>,
    },
}

define_error_codes! {
    /// Stable codes describing [`DensityError`] variants.
    enum DensityErrorCode for DensityError {
        /// Kernel density estimation needs at least three points.
        InsufficientPoints => InsufficientPoints { .. } => "DENSITY_INSUFFICIENT_POINTS",
        /// The sample covariance could not be inverted.
        SingularCovariance => SingularCovariance { .. } => "DENSITY_SINGULAR_COVARIANCE",
        /// The estimator produced a value that is not finite.
        NonFinite => NonFinite { .. } => "DENSITY_NON_FINITE",
        /// A density vector did not contain exactly one value per point.
        LengthMismatch => LengthMismatch { .. } => "DENSITY_LENGTH_MISMATCH",
        /// A density cache implementation failed.
        Cache => Cache { .. } => "DENSITY_CACHE_FAILURE",
    }
}

/// Which coordinate of a point was rejected.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Axis {
    /// The horizontal coordinate.
    X,
    /// The vertical coordinate.
    Y,
    /// The optional density attached to the point.
    Density,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => f.write_str("x"),
            Self::Y => f.write_str("y"),
            Self::Density => f.write_str("density"),
        }
    }
}

/// Error type produced when constructing or running [`crate::TriDbscan`].
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TriDbscanError {
    /// `min_pts` must be greater than zero.
    #[error("min_pts must be at least 1 (got {got})")]
    InvalidMinPts {
        /// The invalid value supplied by the caller.
        got: usize,
    },
    /// The local pruning multiplier must be finite and non-negative.
    #[error("local_std must be finite and non-negative (got {got})")]
    InvalidLocalStd {
        /// The invalid multiplier supplied by the caller.
        got: f64,
    },
    /// `min_sample` must be greater than zero.
    #[error("min_sample must be at least 1 (got {got})")]
    InvalidMinSample {
        /// The invalid value supplied by the caller.
        got: usize,
    },
    /// The supplied point set contained no points.
    #[error("point set `{data_source}` contains no points")]
    EmptySource {
        /// Name of the empty point set.
        data_source: Arc<str>,
    },
    /// Triangulation needs at least three points.
    #[error("point set `{data_source}` has {points} points but triangulation requires 3")]
    InsufficientPoints {
        /// Name of the undersized point set.
        data_source: Arc<str>,
        /// Number of points available.
        points: usize,
    },
    /// A coordinate or density was NaN or infinite.
    #[error("point {index} has a non-finite {axis} value")]
    NonFiniteCoordinate {
        /// Stable index of the offending point.
        index: usize,
        /// Which value was rejected.
        axis: Axis,
    },
    /// The triangulation rejected a coordinate as too large or too close to
    /// zero to be handled by its exact predicates.
    #[error("point {index} cannot be triangulated: {reason}")]
    UntriangulableCoordinate {
        /// Stable index of the offending point.
        index: usize,
        /// Description reported by the triangulation.
        reason: Arc<str>,
    },
    /// Two points carried the same stable index.
    #[error("point index {index} appears more than once")]
    DuplicateIndex {
        /// The repeated index.
        index: usize,
    },
    /// A density vector did not line up with the point set.
    #[error("point set `{data_source}` has {expected} points but {actual} densities were given")]
    DensityLengthMismatch {
        /// Name of the point set.
        data_source: Arc<str>,
        /// Number of points.
        expected: usize,
        /// Number of densities supplied.
        actual: usize,
    },
    /// The requested execution strategy is unavailable in the current build.
    #[error("the requested execution strategy {requested:?} is not available in this build")]
    BackendUnavailable {
        /// Strategy that could not be satisfied by the current build.
        requested: ExecutionStrategy,
    },
    /// Estimating or loading densities failed.
    #[error("density for point set `{data_source}` failed: {error}")]
    Density {
        /// Name of the point set being estimated.
        data_source: Arc<str>,
        #[source]
        /// Underlying estimator or cache error.
        error: DensityError,
    },
}

define_error_codes! {
    /// Stable codes describing [`TriDbscanError`] variants.
    enum TriDbscanErrorCode for TriDbscanError {
        /// `min_pts` must be greater than zero.
        InvalidMinPts => InvalidMinPts { .. } => "TRIDBSCAN_INVALID_MIN_PTS",
        /// The local pruning multiplier must be finite and non-negative.
        InvalidLocalStd => InvalidLocalStd { .. } => "TRIDBSCAN_INVALID_LOCAL_STD",
        /// `min_sample` must be greater than zero.
        InvalidMinSample => InvalidMinSample { .. } => "TRIDBSCAN_INVALID_MIN_SAMPLE",
        /// The supplied point set contained no points.
        EmptySource => EmptySource { .. } => "TRIDBSCAN_EMPTY_SOURCE",
        /// Triangulation needs at least three points.
        InsufficientPoints => InsufficientPoints { .. } => "TRIDBSCAN_INSUFFICIENT_POINTS",
        /// A coordinate or density was NaN or infinite.
        NonFiniteCoordinate => NonFiniteCoordinate { .. } => "TRIDBSCAN_NON_FINITE_COORDINATE",
        /// The triangulation rejected a coordinate.
        UntriangulableCoordinate => UntriangulableCoordinate { .. } => "TRIDBSCAN_UNTRIANGULABLE_COORDINATE",
        /// Two points carried the same stable index.
        DuplicateIndex => DuplicateIndex { .. } => "TRIDBSCAN_DUPLICATE_INDEX",
        /// A density vector did not line up with the point set.
        DensityLengthMismatch => DensityLengthMismatch { .. } => "TRIDBSCAN_DENSITY_LENGTH_MISMATCH",
        /// The requested execution strategy is unavailable in the current build.
        BackendUnavailable => BackendUnavailable { .. } => "TRIDBSCAN_BACKEND_UNAVAILABLE",
        /// Estimating or loading densities failed.
        DensityFailure => Density { .. } => "TRIDBSCAN_DENSITY_FAILURE",
    }
}

impl TriDbscanError {
    /// Retrieve the inner [`DensityErrorCode`] when the error originated in
    /// density estimation or a density cache.
    pub const fn density_code(&self) -> Option<DensityErrorCode> {
        match self {
            Self::Density { error, .. } => Some(error.code()),
            _ => None,
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, TriDbscanError>;

/// Minimum number of points accepted by the triangulation.
pub(crate) const MIN_TRIANGULATION_POINTS: usize = 3;

/// Returns `min_pts` as a [`NonZeroUsize`] or the matching validation error.
pub(crate) fn validate_min_pts(min_pts: usize) -> Result<NonZeroUsize> {
    NonZeroUsize::new(min_pts).ok_or(TriDbscanError::InvalidMinPts { got: min_pts })
}
