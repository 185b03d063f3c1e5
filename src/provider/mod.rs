pub mod archive;

pub use archive::CifArchive;

use crate::core::structure::Crystal;
use crate::error::WulffError;

/// Boundary collaborator that turns an opaque database identifier into a
/// bulk crystal structure.
///
/// Implementations own transport, caching, and protocol concerns; the
/// geometric core only ever sees a `Crystal` or a retrieval error, which
/// the driver treats as fatal and non-retryable. Keeping this a trait is
/// what lets the whole pipeline run offline against synthetic structures.
pub trait StructureProvider {
    fn fetch(&self, material_id: &str) -> Result<Crystal, WulffError>;
}

/// Access credential for the structure database.
#[derive(Debug, Clone)]
pub struct ApiCredential(String);

impl ApiCredential {
    pub const ENV_VAR: &'static str = "MP_API_KEY";

    /// Resolves the credential from an explicit value or the environment.
    /// This runs before any computation so a missing key aborts immediately.
    pub fn resolve(explicit: Option<String>) -> Result<Self, WulffError> {
        explicit
            .filter(|key| !key.is_empty())
            .or_else(|| std::env::var(Self::ENV_VAR).ok().filter(|key| !key.is_empty()))
            .map(Self)
            .ok_or(WulffError::MissingApiKey)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
