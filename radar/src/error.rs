use alloc::string::String;

/// Fatal configuration errors.
///
/// These are usage errors detected while measuring constants, not transient conditions, so
/// nothing retries them.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum RadarError {
    #[error("an `estimate_size` must be provided")]
    MissingEstimateSize,

    #[error("boundary markers must be attached to an item container before the radar starts")]
    ContainerNotAttached,

    #[error("no scroll container matches selector `{selector}`")]
    ScrollContainerNotFound { selector: String },

    #[error("calculated estimate size must be greater than 0, instead was {estimate}")]
    NonPositiveEstimate { estimate: f64 },

    #[error("the radar has been destroyed")]
    Destroyed,
}
